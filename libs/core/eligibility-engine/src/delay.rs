// [libs/core/eligibility-engine/src/delay.rs]
use crate::airports::AirportRecord;
use chrono::{DateTime, Utc};

/// Deriva la demora en horas contra la puerta de llegada, nunca contra la
/// hora de toque de pista.
///
/// - Si `actual_arrival` y `scheduled_arrival` están presentes, se usa la
///   diferencia directa.
/// - Si sólo hay `actual_departure` y `scheduled_arrival`, se reconstruye
///   la hora de llegada a partir del tiempo de bloque programado más el
///   taxi-in del aeropuerto de destino.
/// - Demoras negativas (llegó antes) se recortan a cero.
pub fn gate_arrival_delay_hours(
    scheduled_departure: DateTime<Utc>,
    scheduled_arrival: Option<DateTime<Utc>>,
    actual_departure: Option<DateTime<Utc>>,
    actual_arrival: Option<DateTime<Utc>>,
    arrival_airport: &AirportRecord,
) -> Option<f64> {
    let scheduled_arrival = scheduled_arrival?;

    let raw_delay_minutes = if let Some(actual_arrival) = actual_arrival {
        (actual_arrival - scheduled_arrival).num_seconds() as f64 / 60.0
    } else if let Some(actual_departure) = actual_departure {
        let scheduled_block_minutes =
            (scheduled_arrival - scheduled_departure).num_seconds() as f64 / 60.0;
        let reconstructed_arrival_minutes_from_departure =
            scheduled_block_minutes + arrival_airport.taxi_in_minutes;
        let actual_minutes_elapsed =
            (actual_departure - scheduled_departure).num_seconds() as f64 / 60.0
                + reconstructed_arrival_minutes_from_departure
                - scheduled_block_minutes;
        actual_minutes_elapsed
    } else {
        return None;
    };

    Some((raw_delay_minutes / 60.0).max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn airport() -> AirportRecord {
        AirportRecord { iata: "IAD", latitude: 38.9531, longitude: -77.4565, taxi_out_minutes: 16.0, taxi_in_minutes: 8.0 }
    }

    #[test]
    fn three_hour_delay_from_actual_arrival() {
        let scheduled_departure = Utc.with_ymd_and_hms(2025, 8, 18, 12, 0, 0).unwrap();
        let scheduled_arrival = Utc.with_ymd_and_hms(2025, 8, 18, 19, 15, 0).unwrap();
        let actual_arrival = Utc.with_ymd_and_hms(2025, 8, 18, 22, 15, 0).unwrap();
        let hours = gate_arrival_delay_hours(
            scheduled_departure,
            Some(scheduled_arrival),
            None,
            Some(actual_arrival),
            &airport(),
        )
        .unwrap();
        assert!((hours - 3.0).abs() < 1e-9);
    }

    #[test]
    fn negative_delay_clamps_to_zero() {
        let scheduled_departure = Utc.with_ymd_and_hms(2025, 8, 18, 12, 0, 0).unwrap();
        let scheduled_arrival = Utc.with_ymd_and_hms(2025, 8, 18, 19, 15, 0).unwrap();
        let actual_arrival = Utc.with_ymd_and_hms(2025, 8, 18, 18, 0, 0).unwrap();
        let hours = gate_arrival_delay_hours(
            scheduled_departure,
            Some(scheduled_arrival),
            None,
            Some(actual_arrival),
            &airport(),
        )
        .unwrap();
        assert_eq!(hours, 0.0);
    }

    #[test]
    fn missing_scheduled_arrival_yields_none() {
        let scheduled_departure = Utc.with_ymd_and_hms(2025, 8, 18, 12, 0, 0).unwrap();
        assert!(gate_arrival_delay_hours(scheduled_departure, None, None, None, &airport()).is_none());
    }
}
