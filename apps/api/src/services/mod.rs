// [apps/api/src/services/mod.rs]
//! Trabajadores de fondo: relevo del outbox, recordatorios de borrador y
//! descarte de borradores caducados. Cada uno corre en su propia tarea de
//! Tokio, lanzada desde `kernel.rs`.

pub mod outbox_relay;
pub mod reaper;
pub mod reminder_scheduler;
pub mod task_worker;

pub use outbox_relay::OutboxRelay;
pub use reaper::spawn_draft_reaper;
pub use reminder_scheduler::spawn_reminder_scheduler;
