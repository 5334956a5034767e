// [apps/api/src/services/reaper.rs]
//! Descarta borradores abandonados. Un reclamo en `Draft` que nadie
//! envió en 14 días deja de ocupar espacio activo.

use crate::state::AppState;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info, warn};

const SCAN_INTERVAL_SECONDS: u64 = 3600;
const BATCH_LIMIT: i64 = 50;

pub fn spawn_draft_reaper(state: AppState) {
    tokio::spawn(async move {
        info!("💀 draft reaper iniciado");
        let mut ticker = interval(Duration::from_secs(SCAN_INTERVAL_SECONDS));

        loop {
            ticker.tick().await;

            let discardable = match state.lifecycle.find_discardable_drafts(BATCH_LIMIT).await {
                Ok(ids) => ids,
                Err(e) => {
                    error!(error = %e, "no se pudo listar los borradores descartables");
                    continue;
                }
            };

            if discardable.is_empty() {
                continue;
            }

            let mut discarded = 0u32;
            for claim_id in discardable {
                match state.lifecycle.discard_stale_draft(claim_id).await {
                    Ok(()) => discarded += 1,
                    Err(e) => warn!(claim_id = %claim_id.0, error = %e, "no se pudo descartar el borrador"),
                }
            }

            if discarded > 0 {
                info!(discarded, "borradores obsoletos descartados");
            }
        }
    });
}
