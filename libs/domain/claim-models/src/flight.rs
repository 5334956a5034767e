// [libs/domain/claim-models/src/flight.rs]
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Estado declarado del vuelo en el momento de la consulta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightStatus {
    Scheduled,
    Departed,
    Arrived,
    Delayed,
    Cancelled,
    Diverted,
    DeniedBoarding,
}

/// Régimen regulatorio seleccionado por la región del pasajero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassengerRegion {
    Eu,
    Us,
    Ca,
}

/// Regulación aplicada; distinta del `PassengerRegion` de entrada porque
/// el motor puede en el futuro exponer más de una regulación por región
/// (hoy es 1:1, pero el tipo no debe colapsarse en el de región).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regulation {
    Eu261,
    UsDot,
    CaApr,
}

impl Regulation {
    pub fn currency(&self) -> &'static str {
        match self {
            Regulation::Eu261 => "EUR",
            Regulation::UsDot => "USD",
            Regulation::CaApr => "CAD",
        }
    }
}

/// Causa de exención regulatoria que reduce o elimina la responsabilidad
/// del transportista.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtraordinaryCircumstance {
    Weather,
    AirTrafficControl,
    Security,
    Political,
}

/// Hechos de vuelo observados: la única entrada que el motor de
/// elegibilidad consume. Ningún otro campo del sistema influye en el
/// cálculo de compensación.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightFacts {
    pub flight_number: String,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub scheduled_departure: DateTime<Utc>,
    pub scheduled_arrival: Option<DateTime<Utc>>,
    pub actual_departure: Option<DateTime<Utc>>,
    pub actual_arrival: Option<DateTime<Utc>>,
    pub status: FlightStatus,
    pub extraordinary_circumstance: Option<ExtraordinaryCircumstance>,
}

/// Salida íntegra del motor de elegibilidad y compensación.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub eligible: bool,
    pub amount: Option<Decimal>,
    pub currency: &'static str,
    pub regulation: Regulation,
    pub reasons: Vec<String>,
    pub requirements: Vec<String>,
    pub flight_distance_km: Option<f64>,
    pub delay_hours_at_gate: Option<f64>,
    pub extraordinary_circumstances: Option<ExtraordinaryCircumstance>,
    pub manual_review_required: bool,
}
