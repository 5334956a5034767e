// [libs/core/eligibility-engine/src/lib.rs]
//! Motor determinista de elegibilidad y compensación.
//!
//! `evaluate` es una función pura: mismos hechos de entrada producen
//! siempre la misma salida. Ningún estado de proceso, reloj de pared ni
//! I/O externo entra en el cálculo — sólo la tabla estática de
//! aeropuertos de [`airports`].

pub mod airports;
pub mod delay;
pub mod distance;
pub mod tiers;

use rust_decimal::Decimal;
use skyclaim_claim_models::{
    EligibilityResult, ExtraordinaryCircumstance, FlightFacts, FlightStatus, IncidentType,
    PassengerRegion, Regulation,
};

const DELAY_ELIGIBILITY_THRESHOLD_HOURS: f64 = 3.0;
const PARTIAL_COMPENSATION_UPPER_BOUND_HOURS: f64 = 4.0;
const LONG_HAUL_DISTANCE_KM: f64 = 3500.0;

fn regulation_for_region(region: PassengerRegion) -> Regulation {
    match region {
        PassengerRegion::Eu => Regulation::Eu261,
        PassengerRegion::Us => Regulation::UsDot,
        PassengerRegion::Ca => Regulation::CaApr,
    }
}

fn derive_incident_type(status: FlightStatus, override_incident: Option<IncidentType>) -> IncidentType {
    if let Some(incident) = override_incident {
        return incident;
    }
    match status {
        FlightStatus::Cancelled => IncidentType::Cancellation,
        FlightStatus::DeniedBoarding => IncidentType::DeniedBoarding,
        _ => IncidentType::Delay,
    }
}

fn ineligible(
    regulation: Regulation,
    reason: &str,
    flight_distance_km: Option<f64>,
    delay_hours_at_gate: Option<f64>,
    manual_review_required: bool,
) -> EligibilityResult {
    EligibilityResult {
        eligible: false,
        amount: None,
        currency: regulation.currency(),
        regulation,
        reasons: vec![reason.to_string()],
        requirements: Vec::new(),
        flight_distance_km,
        delay_hours_at_gate,
        extraordinary_circumstances: None,
        manual_review_required,
    }
}

/// Evalúa la elegibilidad y compensación de un conjunto de hechos de
/// vuelo, bajo el régimen regulatorio que corresponde a la región del
/// pasajero.
pub fn evaluate(
    facts: &FlightFacts,
    region: PassengerRegion,
    incident_override: Option<IncidentType>,
) -> EligibilityResult {
    let regulation = regulation_for_region(region);

    if facts.departure_airport.eq_ignore_ascii_case(&facts.arrival_airport) {
        return ineligible(regulation, "invalid_route", None, None, false);
    }

    let departure = airports::lookup(&facts.departure_airport);
    let arrival = airports::lookup(&facts.arrival_airport);
    let (departure, arrival) = match (departure, arrival) {
        (Some(d), Some(a)) => (d, a),
        _ => return ineligible(regulation, "unknown_airport", None, None, true),
    };

    let distance_km = distance::haversine_km(&departure, &arrival);

    let Some(scheduled_arrival) = facts.scheduled_arrival else {
        return ineligible(regulation, "insufficient_data", Some(distance_km), None, false);
    };

    let delay_hours = delay::gate_arrival_delay_hours(
        facts.scheduled_departure,
        Some(scheduled_arrival),
        facts.actual_departure,
        facts.actual_arrival,
        &arrival,
    );

    let incident = derive_incident_type(facts.status, incident_override);

    let mut reasons = Vec::new();
    let mut requirements = Vec::new();

    if incident == IncidentType::BaggageDelay {
        return ineligible(
            regulation,
            "baggage_delay_out_of_scope",
            Some(distance_km),
            delay_hours,
            false,
        );
    }

    let full_tier_path = matches!(incident, IncidentType::Cancellation | IncidentType::DeniedBoarding);

    if !full_tier_path {
        let Some(hours) = delay_hours else {
            return ineligible(regulation, "insufficient_data", Some(distance_km), None, false);
        };
        if hours < DELAY_ELIGIBILITY_THRESHOLD_HOURS {
            return ineligible(
                regulation,
                "delay_under_threshold",
                Some(distance_km),
                Some(hours),
                false,
            );
        }
        reasons.push(format!(
            "delay of {hours:.1}h meets \u{2265}3h threshold"
        ));
    } else {
        requirements.push("no_eligibility_delay_requirement_for_this_incident_type".to_string());
    }

    let base_amount = tiers::flat_fee_tier(regulation, distance_km);
    if distance_km > LONG_HAUL_DISTANCE_KM {
        reasons.push(format!("distance {distance_km:.0}km exceeds 3500km"));
    } else {
        reasons.push(format!("distance {distance_km:.0}km within tier boundary"));
    }

    let mut amount = base_amount;
    if !full_tier_path {
        if let Some(hours) = delay_hours {
            if distance_km > LONG_HAUL_DISTANCE_KM
                && hours > DELAY_ELIGIBILITY_THRESHOLD_HOURS
                && hours < PARTIAL_COMPENSATION_UPPER_BOUND_HOURS
            {
                amount = base_amount / Decimal::new(2, 0);
                reasons.push("partial compensation: long-haul delay between 3h and 4h".to_string());
            }
        }
    }

    let extraordinary = facts.extraordinary_circumstance;
    let manual_review_required = extraordinary.is_some();
    if let Some(circumstance) = extraordinary {
        reasons.push(extraordinary_reason(circumstance));
    }

    EligibilityResult {
        eligible: true,
        amount: Some(amount),
        currency: regulation.currency(),
        regulation,
        reasons,
        requirements,
        flight_distance_km: Some(distance_km),
        delay_hours_at_gate: delay_hours,
        extraordinary_circumstances: extraordinary,
        manual_review_required,
    }
}

fn extraordinary_reason(circumstance: ExtraordinaryCircumstance) -> String {
    let label = match circumstance {
        ExtraordinaryCircumstance::Weather => "weather",
        ExtraordinaryCircumstance::AirTrafficControl => "air_traffic_control",
        ExtraordinaryCircumstance::Security => "security",
        ExtraordinaryCircumstance::Political => "political",
    };
    format!("extraordinary circumstance reported: {label}, flagged for manual review")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn base_facts() -> FlightFacts {
        FlightFacts {
            flight_number: "UA988".to_string(),
            departure_airport: "FRA".to_string(),
            arrival_airport: "IAD".to_string(),
            scheduled_departure: Utc.with_ymd_and_hms(2025, 8, 18, 12, 0, 0).unwrap(),
            scheduled_arrival: Some(Utc.with_ymd_and_hms(2025, 8, 18, 19, 15, 0).unwrap()),
            actual_departure: None,
            actual_arrival: Some(Utc.with_ymd_and_hms(2025, 8, 18, 22, 15, 0).unwrap()),
            status: FlightStatus::Delayed,
            extraordinary_circumstance: None,
        }
    }

    #[test]
    fn eligible_long_haul_delay_pays_top_tier() {
        let facts = base_facts();
        let result = evaluate(&facts, PassengerRegion::Eu, None);
        assert!(result.eligible);
        assert_eq!(result.amount, Some(Decimal::new(60000, 2)));
        assert_eq!(result.currency, "EUR");
        assert_eq!(result.regulation, Regulation::Eu261);
        assert!(!result.manual_review_required);
        assert!(result.reasons.iter().any(|r| r.contains("delay") && r.contains("3")));
        assert!(result.reasons.iter().any(|r| r.contains("3500km")));
    }

    #[test]
    fn long_haul_delay_under_four_hours_pays_half() {
        let mut facts = base_facts();
        facts.actual_arrival = Some(Utc.with_ymd_and_hms(2025, 8, 18, 22, 45, 0).unwrap());
        let result = evaluate(&facts, PassengerRegion::Eu, None);
        assert!(result.eligible);
        assert_eq!(result.amount, Some(Decimal::new(30000, 2)));
    }

    #[test]
    fn short_haul_below_threshold_is_ineligible() {
        let mut facts = base_facts();
        facts.arrival_airport = "MUC".to_string();
        facts.scheduled_arrival = Some(Utc.with_ymd_and_hms(2025, 8, 18, 13, 30, 0).unwrap());
        facts.actual_arrival = Some(Utc.with_ymd_and_hms(2025, 8, 18, 15, 30, 0).unwrap());
        let result = evaluate(&facts, PassengerRegion::Eu, None);
        assert!(!result.eligible);
        assert_eq!(result.amount, None);
        assert!(result.reasons.contains(&"delay_under_threshold".to_string()));
    }

    #[test]
    fn same_airport_is_invalid_route() {
        let mut facts = base_facts();
        facts.arrival_airport = facts.departure_airport.clone();
        let result = evaluate(&facts, PassengerRegion::Eu, None);
        assert!(!result.eligible);
        assert_eq!(result.reasons, vec!["invalid_route".to_string()]);
    }

    #[test]
    fn missing_scheduled_arrival_is_insufficient_data() {
        let mut facts = base_facts();
        facts.scheduled_arrival = None;
        let result = evaluate(&facts, PassengerRegion::Eu, None);
        assert!(!result.eligible);
        assert_eq!(result.reasons, vec!["insufficient_data".to_string()]);
    }

    #[test]
    fn early_arrival_clamps_to_zero_and_is_ineligible() {
        let mut facts = base_facts();
        facts.actual_arrival = Some(Utc.with_ymd_and_hms(2025, 8, 18, 18, 0, 0).unwrap());
        let result = evaluate(&facts, PassengerRegion::Eu, None);
        assert!(!result.eligible);
        assert_eq!(result.delay_hours_at_gate, Some(0.0));
    }

    #[test]
    fn baggage_delay_is_always_ineligible() {
        let facts = base_facts();
        let result = evaluate(&facts, PassengerRegion::Eu, Some(IncidentType::BaggageDelay));
        assert!(!result.eligible);
        assert_eq!(result.reasons, vec!["baggage_delay_out_of_scope".to_string()]);
    }

    #[test]
    fn unknown_airport_requires_manual_review() {
        let mut facts = base_facts();
        facts.arrival_airport = "ZZZ".to_string();
        let result = evaluate(&facts, PassengerRegion::Eu, None);
        assert!(!result.eligible);
        assert!(result.manual_review_required);
        assert_eq!(result.amount, None);
    }

    #[test]
    fn extraordinary_circumstance_forces_manual_review() {
        let mut facts = base_facts();
        facts.extraordinary_circumstance = Some(ExtraordinaryCircumstance::Weather);
        let result = evaluate(&facts, PassengerRegion::Eu, None);
        assert!(result.eligible);
        assert!(result.manual_review_required);
    }

    #[test]
    fn us_region_uses_usd_flat_fee() {
        let facts = base_facts();
        let result = evaluate(&facts, PassengerRegion::Us, None);
        assert_eq!(result.currency, "USD");
        assert_eq!(result.regulation, Regulation::UsDot);
    }

    #[test]
    fn determinism_same_facts_same_result() {
        let facts = base_facts();
        let a = evaluate(&facts, PassengerRegion::Eu, None);
        let b = evaluate(&facts, PassengerRegion::Eu, None);
        assert_eq!(a.eligible, b.eligible);
        assert_eq!(a.amount, b.amount);
        assert_eq!(a.reasons, b.reasons);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn delay_hours_are_never_negative(offset_minutes in -600i64..600i64) {
            let scheduled_departure = Utc.with_ymd_and_hms(2025, 8, 18, 12, 0, 0).unwrap();
            let scheduled_arrival = Utc.with_ymd_and_hms(2025, 8, 18, 19, 15, 0).unwrap();
            let actual_arrival = scheduled_arrival + chrono::Duration::minutes(offset_minutes);
            let facts = FlightFacts {
                flight_number: "TEST1".to_string(),
                departure_airport: "FRA".to_string(),
                arrival_airport: "IAD".to_string(),
                scheduled_departure,
                scheduled_arrival: Some(scheduled_arrival),
                actual_departure: None,
                actual_arrival: Some(actual_arrival),
                status: FlightStatus::Delayed,
                extraordinary_circumstance: None,
            };
            let result = evaluate(&facts, PassengerRegion::Eu, None);
            prop_assert!(result.delay_hours_at_gate.unwrap_or(0.0) >= 0.0);
        }
    }
}
