// [apps/api/src/services/outbox_relay.rs]
//! Relevo del outbox: drena `OutboxRepository` por lotes y despacha cada
//! evento vía `task_worker`, con una llave de idempotencia que convierte
//! un reintento duplicado en éxito en vez de en un segundo envío real.

use crate::services::task_worker::{self, RetryDecision};
use crate::state::AppState;
use reqwest::Client;
use skyclaim_persistence::PersistenceError;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

const RELAY_SCAN_INTERVAL_SECONDS: u64 = 10;
const RELAY_BATCH_SIZE: u32 = 25;

pub struct OutboxRelay {
    http: Client,
    webhook_url: Option<String>,
    state: AppState,
}

impl OutboxRelay {
    pub fn new(state: AppState) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent("skyclaim-outbox-relay/1.0")
            .build()
            .expect("no se pudo construir el cliente HTTP del relevo de outbox");

        Self { http, webhook_url: std::env::var("NOTIFICATIONS_WEBHOOK_URL").ok(), state }
    }

    pub fn spawn(self) {
        tokio::spawn(async move {
            info!("📬 outbox relay iniciado");
            let mut ticker = interval(Duration::from_secs(RELAY_SCAN_INTERVAL_SECONDS));
            loop {
                ticker.tick().await;
                if let Err(e) = self.drain_once().await {
                    error!(error = %e, "fallo al drenar el outbox");
                }
            }
        });
    }

    async fn drain_once(&self) -> Result<(), PersistenceError> {
        let outbox = self.state.outbox();
        let batch = outbox.fetch_pending_batch(RELAY_BATCH_SIZE).await?;
        if batch.is_empty() {
            return Ok(());
        }
        debug!(count = batch.len(), "lote de eventos pendientes recuperado");

        for event in batch {
            let idempotency_key = format!("outbox:{}", event.id.0);
            match outbox.claim_idempotency_key(&idempotency_key, event.id).await {
                Ok(()) => {}
                Err(PersistenceError::AlreadySent) => {
                    outbox.mark_dispatched(event.id).await?;
                    continue;
                }
                Err(e) => {
                    warn!(error = %e, "no se pudo reclamar la llave de idempotencia, se reintentará");
                    continue;
                }
            }

            match task_worker::dispatch(&self.http, self.webhook_url.as_deref(), &event).await {
                RetryDecision::Dispatched => {
                    outbox.mark_dispatched(event.id).await?;
                }
                RetryDecision::Retry(reason) => {
                    warn!(event_id = %event.id.0, reason = %reason, "despacho falló, se reintentará");
                    outbox.mark_failed(event.id, &reason).await?;
                }
                RetryDecision::Fail(reason) => {
                    error!(event_id = %event.id.0, reason = %reason, "despacho rechazado de forma permanente");
                    outbox.mark_failed(event.id, &reason).await?;
                }
            }
        }

        Ok(())
    }
}
