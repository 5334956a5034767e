// [apps/api/src/services/reminder_scheduler.rs]
//! Encola recordatorios de borrador a T+30min/5d/8d/11d.
//! Cada borrador lleva su propio `last_reminder_tier`; el scheduler sólo
//! avanza ese contador, nunca reenvía un nivel ya alcanzado.

use crate::state::AppState;
use chrono::Utc;
use skyclaim_claim_models::{EventKind, OutboxEvent, OutboxEventId};
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info, warn};

const SCAN_INTERVAL_SECONDS: u64 = 300;
const BATCH_LIMIT: i64 = 200;

/// Umbrales en minutos y el nivel que alcanzan, en orden creciente.
const TIERS: [(i64, i64); 4] = [
    (30, 1),          // T+30min
    (5 * 24 * 60, 2),  // T+5d
    (8 * 24 * 60, 3),  // T+8d
    (11 * 24 * 60, 4), // T+11d
];

pub fn spawn_reminder_scheduler(state: AppState) {
    tokio::spawn(async move {
        info!("\u{1F4EC} reminder scheduler iniciado");
        let mut ticker = interval(Duration::from_secs(SCAN_INTERVAL_SECONDS));

        loop {
            ticker.tick().await;

            let candidates = match state.claims().find_drafts_for_reminder_scan(BATCH_LIMIT).await {
                Ok(rows) => rows,
                Err(e) => {
                    error!(error = %e, "no se pudo listar los borradores candidatos a recordatorio");
                    continue;
                }
            };

            let mut sent = 0u32;
            for (claim_id, customer_id, created_at, last_tier) in candidates {
                let elapsed_minutes = (Utc::now() - created_at).num_minutes();
                let due_tier = TIERS
                    .iter()
                    .filter(|(threshold, _)| elapsed_minutes >= *threshold)
                    .map(|(_, tier)| *tier)
                    .max();

                let Some(due_tier) = due_tier else { continue };
                if due_tier <= last_tier {
                    continue;
                }

                let event = OutboxEvent {
                    id: OutboxEventId::new(),
                    kind: EventKind::DraftReminder,
                    claim_id: Some(claim_id),
                    customer_id: Some(customer_id),
                    payload_json: serde_json::json!({ "reminder_tier": due_tier }).to_string(),
                    dispatched_at: None,
                    attempt_count: 0,
                    last_error: None,
                    created_at: Utc::now(),
                };

                if let Err(e) = state.outbox().enqueue(&event).await {
                    warn!(claim_id = %claim_id.0, error = %e, "no se pudo encolar el recordatorio de borrador");
                    continue;
                }
                if let Err(e) = state.claims().record_reminder_tier(claim_id, due_tier).await {
                    warn!(claim_id = %claim_id.0, error = %e, "no se pudo asentar el nivel de recordatorio");
                    continue;
                }
                sent += 1;
            }

            if sent > 0 {
                info!(sent, "recordatorios de borrador encolados");
            }
        }
    });
}
