// [libs/infra/object-store/src/backoff.rs]
use rand::Rng;
use std::time::Duration;

/// Parámetros de reintento compartidos por todo el crate: base 250ms,
/// factor 2, jitter ±25%, tope 30s, 5 intentos.
pub const MAX_ATTEMPTS: u32 = 5;
const BASE_DELAY_MS: u64 = 250;
const FACTOR: u64 = 2;
const CAP_MS: u64 = 30_000;
const JITTER_FRACTION: f64 = 0.25;

/// Calcula el retardo antes del intento `attempt` (1-indexado). El llamador
/// decide si reintenta según `FaultClass`; esta función sólo produce el
/// tiempo de espera una vez que ya se decidió reintentar.
pub fn delay_for_attempt(attempt: u32) -> Duration {
    let exp = attempt.saturating_sub(1).min(16);
    let raw_ms = BASE_DELAY_MS.saturating_mul(FACTOR.saturating_pow(exp)).min(CAP_MS);
    let jitter_span = (raw_ms as f64 * JITTER_FRACTION) as i64;
    let jitter = if jitter_span > 0 {
        rand::thread_rng().gen_range(-jitter_span..=jitter_span)
    } else {
        0
    };
    let jittered_ms = (raw_ms as i64 + jitter).max(0) as u64;
    Duration::from_millis(jittered_ms.min(CAP_MS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_grows_and_caps() {
        let d1 = delay_for_attempt(1).as_millis();
        let d5 = delay_for_attempt(5).as_millis();
        assert!(d1 <= 350);
        assert!(d5 <= (CAP_MS as u128 + CAP_MS as u128 / 4));
    }
}
