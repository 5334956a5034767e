// [libs/core/eligibility-engine/src/distance.rs]
use crate::airports::AirportRecord;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distancia del gran círculo entre dos aeropuertos, vía Haversine.
pub fn haversine_km(from: &AirportRecord, to: &AirportRecord) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let delta_lat = (to.latitude - from.latitude).to_radians();
    let delta_lon = (to.longitude - from.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fra_iad_is_approximately_6549_km() {
        let fra = AirportRecord { iata: "FRA", latitude: 50.0379, longitude: 8.5622, taxi_out_minutes: 18.0, taxi_in_minutes: 9.0 };
        let iad = AirportRecord { iata: "IAD", latitude: 38.9531, longitude: -77.4565, taxi_out_minutes: 16.0, taxi_in_minutes: 8.0 };
        let km = haversine_km(&fra, &iad);
        assert!((km - 6549.0).abs() < 60.0, "expected ~6549km, got {km}");
    }

    #[test]
    fn same_point_is_zero() {
        let a = AirportRecord { iata: "FRA", latitude: 50.0379, longitude: 8.5622, taxi_out_minutes: 18.0, taxi_in_minutes: 9.0 };
        assert!(haversine_km(&a, &a) < 1e-6);
    }
}
