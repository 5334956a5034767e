// [apps/api/src/services/task_worker.rs]
//! Consumidor genérico de tareas: decide si un evento del outbox se
//! despacha con éxito, se reintenta, o se declara fallido de forma
//! permanente. No conoce el esquema de la tabla outbox; sólo el evento
//! ya deserializado.

use reqwest::Client;
use skyclaim_claim_models::{EventKind, OutboxEvent};
use tracing::warn;

/// Resultado de un intento de despacho. `Fail` detiene los reintentos
/// del propio evento (el relay igual sigue con el resto del lote);
/// `Retry` deja el evento pendiente para el siguiente ciclo.
pub enum RetryDecision {
    Dispatched,
    Retry(String),
    Fail(String),
}

/// Despacha un evento de outbox al colaborador externo correspondiente
/// (correo transaccional, webhook). Sin `NOTIFICATIONS_WEBHOOK_URL`
/// configurado, el despacho se considera satisfecho localmente — sólo
/// válido en desarrollo, igual que `NullScanner` en el pipeline de
/// documentos.
pub async fn dispatch(client: &Client, webhook_url: Option<&str>, event: &OutboxEvent) -> RetryDecision {
    let Some(url) = webhook_url else {
        warn!(kind = ?event.kind, "NOTIFICATIONS_WEBHOOK_URL no configurado, descartando evento en modo desarrollo");
        return RetryDecision::Dispatched;
    };

    let body = serde_json::json!({
        "id": event.id.0.to_string(),
        "kind": event_kind_name(event.kind),
        "claim_id": event.claim_id.map(|c| c.0.to_string()),
        "customer_id": event.customer_id.map(|c| c.0.to_string()),
        "payload": serde_json::from_str::<serde_json::Value>(&event.payload_json).unwrap_or(serde_json::Value::Null),
    });

    match client.post(url).json(&body).send().await {
        Ok(response) if response.status().is_success() => RetryDecision::Dispatched,
        Ok(response) if response.status().is_client_error() => {
            RetryDecision::Fail(format!("colaborador rechazó el evento: {}", response.status()))
        }
        Ok(response) => RetryDecision::Retry(format!("colaborador respondió {}", response.status())),
        Err(e) => RetryDecision::Retry(e.to_string()),
    }
}

fn event_kind_name(kind: EventKind) -> &'static str {
    match kind {
        EventKind::ClaimSubmitted => "claim_submitted",
        EventKind::ClaimApproved => "claim_approved",
        EventKind::ClaimRejected => "claim_rejected",
        EventKind::ClaimPaid => "claim_paid",
        EventKind::DraftReminder => "draft_reminder",
        EventKind::DraftDiscarded => "draft_discarded",
        EventKind::MagicLinkRequested => "magic_link_requested",
        EventKind::PasswordResetRequested => "password_reset_requested",
    }
}
