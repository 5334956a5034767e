// [libs/shared/observability/src/lib.rs]
//! Telemetría estructurada compartida por todos los binarios de SkyClaim:
//! inicialización de `tracing` (compacta en desarrollo, JSON en producción)
//! y un hook de pánico global que deja constancia en el log antes de que el
//! proceso termine.

use std::panic;
use tracing::{error, info, instrument};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Inicializa el subscriptor global de trazas y el hook de pánico.
///
/// En desarrollo produce logs compactos y coloreados; en producción, JSON de
/// una línea por evento, apto para un agregador externo. `RUST_LOG` tiene
/// prioridad sobre el filtro por defecto si está presente.
///
/// # Panics
/// Entra en pánico si ya existe un subscriptor global en este proceso.
#[instrument(skip_all)]
pub fn init_tracing(service_name: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "{}={level},tower_http=warn,hyper=warn,libsql=error",
            service_name,
            level = if cfg!(debug_assertions) { "debug" } else { "info" }
        )
        .into()
    });

    if cfg!(debug_assertions) {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_target(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().flatten_event(true))
            .init();
    }

    let service = service_name.to_string();
    panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());

        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| panic_info.payload().downcast_ref::<String>().map(|s| s.as_str()))
            .unwrap_or("<non-string panic payload>");

        error!(
            target: "panic",
            service = %service,
            location = %location,
            "el proceso entró en pánico: {}",
            payload
        );
    }));

    info!(service = service_name, "telemetría inicializada");
}

/// Contrato de redacción para valores que nunca deben llegar a un log o a una
/// respuesta de error tal cual: siempre devuelve el mismo marcador opaco,
/// nunca el valor ni su longitud ni una porción de él. `apps/api::errors` lo
/// usa como último cerrojo antes de registrar un error de dominio que pudiera
/// cargar un fragmento de PII (correo, número de boleto, referencia de reserva).
pub fn redact_pii(_value: &str) -> &'static str {
    "<redacted>"
}
