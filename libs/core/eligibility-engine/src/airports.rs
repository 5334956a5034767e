// [libs/core/eligibility-engine/src/airports.rs]
//! Tabla estática de referencia: coordenadas y tiempos de rodaje por
//! aeropuerto. Cargada una sola vez y tratada como de solo lectura de ahí
//! en adelante — nunca se expone una API de mutación.

/// Coordenadas geográficas y minutos de rodaje de entrada/salida de un
/// aeropuerto IATA.
#[derive(Debug, Clone, Copy)]
pub struct AirportRecord {
    pub iata: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    pub taxi_out_minutes: f64,
    pub taxi_in_minutes: f64,
}

/// Catálogo mínimo de aeropuertos para las rutas de prueba y el uso
/// general del motor. Un catálogo de producción cargaría esto desde un
/// archivo/env en el
/// arranque del proceso; aquí se fija en tiempo de compilación porque el
/// motor es una librería pura sin I/O propio.
const AIRPORTS: &[AirportRecord] = &[
    AirportRecord { iata: "FRA", latitude: 50.0379, longitude: 8.5622, taxi_out_minutes: 18.0, taxi_in_minutes: 9.0 },
    AirportRecord { iata: "IAD", latitude: 38.9531, longitude: -77.4565, taxi_out_minutes: 16.0, taxi_in_minutes: 8.0 },
    AirportRecord { iata: "MUC", latitude: 48.3538, longitude: 11.7861, taxi_out_minutes: 14.0, taxi_in_minutes: 7.0 },
    AirportRecord { iata: "JFK", latitude: 40.6413, longitude: -73.7781, taxi_out_minutes: 22.0, taxi_in_minutes: 10.0 },
    AirportRecord { iata: "LHR", latitude: 51.4700, longitude: -0.4543, taxi_out_minutes: 17.0, taxi_in_minutes: 8.0 },
    AirportRecord { iata: "CDG", latitude: 49.0097, longitude: 2.5479, taxi_out_minutes: 16.0, taxi_in_minutes: 8.0 },
    AirportRecord { iata: "YYZ", latitude: 43.6777, longitude: -79.6248, taxi_out_minutes: 15.0, taxi_in_minutes: 8.0 },
    AirportRecord { iata: "LAX", latitude: 33.9416, longitude: -118.4085, taxi_out_minutes: 20.0, taxi_in_minutes: 9.0 },
];

/// Busca un aeropuerto por código IATA. `None` si no está en el catálogo,
/// lo que el motor traduce en `manual_review_required=true`.
pub fn lookup(iata: &str) -> Option<AirportRecord> {
    AIRPORTS.iter().copied().find(|a| a.iata.eq_ignore_ascii_case(iata))
}
