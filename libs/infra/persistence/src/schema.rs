// [libs/infra/persistence/src/schema.rs]
//! Esquema relacional de SkyClaim. Sigue la misma secuencia de tres
//! estratos que el esquema original: tablas base (idempotentes vía
//! `CREATE TABLE IF NOT EXISTS`), columnas evolutivas (`ALTER TABLE`,
//! toleradas si ya existen) e índices de aceleración.

use anyhow::{Context, Result};
use libsql::Connection;
use tracing::{debug, info, instrument, warn};

const BASE_TABLES: &[(&str, &str)] = &[
    ("TABLE_CUSTOMERS", r#"
        CREATE TABLE IF NOT EXISTS customers (
            id TEXT PRIMARY KEY,
            email_blind_index TEXT NOT NULL UNIQUE,
            email_encrypted TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            first_name_encrypted TEXT,
            last_name_encrypted TEXT,
            phone_encrypted TEXT,
            address_street_encrypted TEXT,
            address_city_encrypted TEXT,
            address_postal_code_encrypted TEXT,
            address_country TEXT,
            role TEXT NOT NULL DEFAULT 'customer',
            email_verified INTEGER NOT NULL DEFAULT 0,
            failed_login_count INTEGER NOT NULL DEFAULT 0,
            locked_until TEXT,
            last_login_at TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_CLAIM_GROUPS", r#"
        CREATE TABLE IF NOT EXISTS claim_groups (
            id TEXT PRIMARY KEY,
            primary_customer_id TEXT NOT NULL,
            flight_number TEXT NOT NULL,
            flight_date TEXT NOT NULL,
            expected_member_count INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_CLAIMS", r#"
        CREATE TABLE IF NOT EXISTS claims (
            id TEXT PRIMARY KEY,
            customer_id TEXT NOT NULL,
            claim_group_id TEXT,
            flight_number TEXT NOT NULL,
            flight_date TEXT NOT NULL,
            airline TEXT NOT NULL,
            departure_airport TEXT NOT NULL,
            arrival_airport TEXT NOT NULL,
            scheduled_departure TEXT NOT NULL,
            scheduled_arrival TEXT,
            actual_departure TEXT,
            actual_arrival TEXT,
            incident_type TEXT NOT NULL,
            incident_description TEXT,
            status TEXT NOT NULL DEFAULT 'draft',
            compensation_amount TEXT,
            compensation_currency TEXT,
            regulation TEXT,
            flight_distance_km REAL,
            delay_hours_at_gate REAL,
            extraordinary_circumstance TEXT,
            manual_review_required INTEGER NOT NULL DEFAULT 0,
            last_reminder_tier INTEGER NOT NULL DEFAULT 0,
            rejection_reason TEXT,
            assignee_id TEXT,
            reviewer_id TEXT,
            booking_reference_encrypted TEXT,
            ticket_number_encrypted TEXT,
            terms_consent_at TEXT,
            terms_consent_ip TEXT,
            privacy_consent_at TEXT,
            privacy_consent_ip TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            submitted_at TEXT,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            version INTEGER NOT NULL DEFAULT 0
        );
    "#),
    ("TABLE_CLAIM_FILES", r#"
        CREATE TABLE IF NOT EXISTS claim_files (
            id TEXT PRIMARY KEY,
            claim_id TEXT NOT NULL,
            uploaded_by TEXT NOT NULL,
            document_type TEXT NOT NULL,
            original_filename TEXT NOT NULL,
            declared_mime_type TEXT NOT NULL,
            sniffed_mime_type TEXT,
            size_bytes INTEGER NOT NULL,
            ciphertext_size_bytes INTEGER NOT NULL DEFAULT 0,
            storage_key TEXT NOT NULL,
            plaintext_sha256 TEXT NOT NULL,
            validation_status TEXT NOT NULL DEFAULT 'pending',
            rejection_reason TEXT,
            reviewer_id TEXT,
            reviewed_at TEXT,
            deleted_at TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_FILE_ACCESS_LOGS", r#"
        CREATE TABLE IF NOT EXISTS file_access_logs (
            id TEXT PRIMARY KEY,
            claim_file_id TEXT NOT NULL,
            actor_id TEXT NOT NULL,
            action TEXT NOT NULL,
            client_ip TEXT,
            user_agent TEXT,
            occurred_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_CLAIM_STATUS_HISTORY", r#"
        CREATE TABLE IF NOT EXISTS claim_status_history (
            id TEXT PRIMARY KEY,
            claim_id TEXT NOT NULL,
            from_status TEXT,
            to_status TEXT NOT NULL,
            actor_id TEXT,
            reason TEXT,
            occurred_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_CLAIM_NOTES", r#"
        CREATE TABLE IF NOT EXISTS claim_notes (
            id TEXT PRIMARY KEY,
            claim_id TEXT NOT NULL,
            author_id TEXT NOT NULL,
            body TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_REFRESH_TOKENS", r#"
        CREATE TABLE IF NOT EXISTS refresh_tokens (
            id TEXT PRIMARY KEY,
            customer_id TEXT NOT NULL,
            token_digest TEXT NOT NULL UNIQUE,
            replaced_by TEXT,
            revoked_at TEXT,
            expires_at TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_MAGIC_LINK_TOKENS", r#"
        CREATE TABLE IF NOT EXISTS magic_link_tokens (
            id TEXT PRIMARY KEY,
            customer_id TEXT NOT NULL,
            token_digest TEXT NOT NULL UNIQUE,
            consumed_at TEXT,
            expires_at TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_PASSWORD_RESET_TOKENS", r#"
        CREATE TABLE IF NOT EXISTS password_reset_tokens (
            id TEXT PRIMARY KEY,
            customer_id TEXT NOT NULL,
            token_digest TEXT NOT NULL UNIQUE,
            consumed_at TEXT,
            expires_at TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_OUTBOX_EVENTS", r#"
        CREATE TABLE IF NOT EXISTS outbox_events (
            id TEXT PRIMARY KEY,
            kind TEXT NOT NULL,
            claim_id TEXT,
            customer_id TEXT,
            payload_json TEXT NOT NULL,
            dispatched_at TEXT,
            attempt_count INTEGER NOT NULL DEFAULT 0,
            last_error TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_SENT_EVENTS", r#"
        CREATE TABLE IF NOT EXISTS sent_events (
            idempotency_key TEXT PRIMARY KEY,
            outbox_event_id TEXT NOT NULL,
            sent_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
    "#),
];

/// Columnas añadidas después del lanzamiento inicial; toleradas si ya
/// existen ("duplicate column name" de SQLite/libSQL se trata como éxito).
const EVOLUTIONARY_COLUMNS: &[(&str, &str)] = &[
    ("CUSTOMERS_FAILED_LOGIN_RESET_AT", "ALTER TABLE customers ADD COLUMN failed_login_reset_at TEXT"),
    ("CLAIMS_ARCHIVED_AT", "ALTER TABLE claims ADD COLUMN archived_at TEXT"),
    ("CLAIM_FILES_ENCRYPTION_NONCE", "ALTER TABLE claim_files ADD COLUMN stream_format_version INTEGER DEFAULT 1"),
    ("CLAIM_FILES_WRAPPED_KEY", "ALTER TABLE claim_files ADD COLUMN wrapped_file_key TEXT"),
    ("CLAIMS_PASSENGER_REGION", "ALTER TABLE claims ADD COLUMN passenger_region TEXT"),
];

const ACCELERATION_INDEXES: &[(&str, &str)] = &[
    ("IDX_CLAIMS_CUSTOMER", "CREATE INDEX IF NOT EXISTS idx_claims_customer ON claims(customer_id);"),
    ("IDX_CLAIMS_GROUP", "CREATE INDEX IF NOT EXISTS idx_claims_group ON claims(claim_group_id);"),
    ("IDX_CLAIMS_STATUS", "CREATE INDEX IF NOT EXISTS idx_claims_status ON claims(status);"),
    ("IDX_CLAIM_FILES_CLAIM", "CREATE INDEX IF NOT EXISTS idx_claim_files_claim ON claim_files(claim_id);"),
    ("IDX_FILE_ACCESS_LOGS_FILE", "CREATE INDEX IF NOT EXISTS idx_file_access_logs_file ON file_access_logs(claim_file_id);"),
    ("IDX_CLAIM_STATUS_HISTORY_CLAIM", "CREATE INDEX IF NOT EXISTS idx_claim_status_history_claim ON claim_status_history(claim_id);"),
    ("IDX_REFRESH_TOKENS_CUSTOMER", "CREATE INDEX IF NOT EXISTS idx_refresh_tokens_customer ON refresh_tokens(customer_id);"),
    ("IDX_MAGIC_LINK_TOKENS_CUSTOMER", "CREATE INDEX IF NOT EXISTS idx_magic_link_tokens_customer ON magic_link_tokens(customer_id);"),
    ("IDX_OUTBOX_PENDING", "CREATE INDEX IF NOT EXISTS idx_outbox_pending ON outbox_events(dispatched_at);"),
    (
        "IDX_CLAIMS_UNIQUE_NON_DRAFT",
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_claims_unique_non_draft ON claims(customer_id, flight_number, flight_date) WHERE status != 'draft';",
    ),
];

#[instrument(skip(database_connection))]
pub async fn apply_full_schema(database_connection: &Connection) -> Result<()> {
    info!("synchronizing ledger schema");

    solidify_base_tables(database_connection).await?;
    apply_evolutionary_columns(database_connection).await?;
    harden_indexes(database_connection).await?;

    info!("ledger schema synchronized");
    Ok(())
}

async fn solidify_base_tables(db: &Connection) -> Result<()> {
    for (identifier, sql) in BASE_TABLES {
        debug!(table = identifier, "solidifying base table");
        db.execute(sql, ())
            .await
            .with_context(|| format!("failed to solidify {identifier}"))?;
    }
    Ok(())
}

async fn apply_evolutionary_columns(db: &Connection) -> Result<()> {
    for (identifier, sql) in EVOLUTIONARY_COLUMNS {
        match db.execute(sql, ()).await {
            Ok(_) => info!(column = identifier, "applied evolutionary column"),
            Err(e) => {
                let message = e.to_string();
                if message.contains("duplicate column name") {
                    debug!(column = identifier, "already present, skipping");
                } else {
                    warn!(column = identifier, error = %message, "column migration incomplete");
                }
            }
        }
    }
    Ok(())
}

async fn harden_indexes(db: &Connection) -> Result<()> {
    for (identifier, sql) in ACCELERATION_INDEXES {
        debug!(index = identifier, "hardening index");
        db.execute(sql, ())
            .await
            .with_context(|| format!("failed to create index {identifier}"))?;
    }
    Ok(())
}
