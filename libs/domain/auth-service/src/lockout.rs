// [libs/domain/auth-service/src/lockout.rs]
use chrono::Duration;

/// Tabla de enfriamiento tras fallos consecutivos de login:
/// 1 fallo → 0s, 2 → 30s, 3 → 2min, 4 → 10min, 5+ → 24h.
pub fn lockout_duration_for(consecutive_failures: u32) -> Duration {
    match consecutive_failures {
        0 | 1 => Duration::zero(),
        2 => Duration::seconds(30),
        3 => Duration::minutes(2),
        4 => Duration::minutes(10),
        _ => Duration::hours(24),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_the_published_schedule() {
        assert_eq!(lockout_duration_for(1), Duration::zero());
        assert_eq!(lockout_duration_for(2), Duration::seconds(30));
        assert_eq!(lockout_duration_for(3), Duration::minutes(2));
        assert_eq!(lockout_duration_for(4), Duration::minutes(10));
        assert_eq!(lockout_duration_for(5), Duration::hours(24));
        assert_eq!(lockout_duration_for(99), Duration::hours(24));
    }
}
