// [apps/api/src/state.rs]
//! Raíz de composición: construye cada servicio de dominio a partir de la
//! configuración del proceso y los expone bajo un único `AppState`
//! clonable para inyectarlo en el router de Axum.

use crate::config::Config;
use skyclaim_auth_service::{AuthService, InProcessRateLimiter, JwtCodec, RateLimiter, RedisRateLimiter};
use skyclaim_claim_lifecycle::ClaimLifecycleService;
use skyclaim_crypto_vault::EncryptionKey;
use skyclaim_document_pipeline::{DocumentPipeline, MalwareScanner, NullScanner, RemoteScanner};
use skyclaim_object_store::WebDavClient;
use skyclaim_persistence::{
    ClaimFileRepository, ClaimGroupRepository, ClaimRepository, CustomerRepository,
    FileAccessLogRepository, LedgerClient, OutboxRepository, TokenRepository,
};
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub struct AppState {
    pub client: LedgerClient,
    pub config: Arc<Config>,
    pub auth: Arc<AuthService>,
    pub lifecycle: Arc<ClaimLifecycleService>,
    pub documents: Arc<DocumentPipeline>,
    pub jwt: Arc<JwtCodec>,
    /// Llave usada para descifrar campos de columna (correo, referencia de
    /// reserva, número de boleto) antes de devolverlos en una respuesta.
    pub field_key: Arc<EncryptionKey>,
}

impl AppState {
    pub async fn bootstrap(config: Config) -> anyhow::Result<Self> {
        let client = LedgerClient::connect(&config.database_url, config.turso_auth_token.clone()).await?;

        let db_key = EncryptionKey::from_hex(&config.db_encryption_key_hex)?;
        let file_key = EncryptionKey::from_hex(&config.file_encryption_key_hex)?;

        let jwt = JwtCodec::new(&config.jwt_secret);

        let rate_limiter: Arc<dyn RateLimiter> = match &config.redis_url {
            Some(url) => match RedisRateLimiter::new(url) {
                Ok(limiter) => Arc::new(limiter),
                Err(e) => {
                    warn!(error = %e, "no se pudo conectar a Redis, usando limitador en proceso");
                    Arc::new(InProcessRateLimiter::new())
                }
            },
            None => Arc::new(InProcessRateLimiter::new()),
        };

        let auth = AuthService::new(
            CustomerRepository::new(client.clone()),
            TokenRepository::new(client.clone()),
            EncryptionKey::from_hex(&config.db_encryption_key_hex)?,
            jwt.clone(),
            rate_limiter,
        );

        let lifecycle = ClaimLifecycleService::new(client.clone());

        let scanner: Arc<dyn MalwareScanner> = match &config.malware_scanner_url {
            Some(url) => Arc::new(RemoteScanner::new(url.clone())),
            None => {
                warn!("MALWARE_SCANNER_URL no configurado, usando escáner nulo (sólo válido en desarrollo)");
                Arc::new(NullScanner)
            }
        };

        let store = WebDavClient::new(config.webdav_url.clone(), config.webdav_user.as_deref(), config.webdav_password.as_deref());

        let documents = DocumentPipeline::new(
            ClaimRepository::new(client.clone()),
            ClaimFileRepository::new(client.clone()),
            FileAccessLogRepository::new(client.clone()),
            store,
            scanner,
            Arc::new(file_key),
            config.streaming_threshold_bytes,
        );

        Ok(Self {
            client,
            config: Arc::new(config),
            auth: Arc::new(auth),
            lifecycle: Arc::new(lifecycle),
            documents: Arc::new(documents),
            jwt: Arc::new(jwt),
            field_key: Arc::new(db_key),
        })
    }

    pub fn claim_groups(&self) -> ClaimGroupRepository {
        ClaimGroupRepository::new(self.client.clone())
    }

    pub fn claims(&self) -> ClaimRepository {
        ClaimRepository::new(self.client.clone())
    }

    pub fn customers(&self) -> CustomerRepository {
        CustomerRepository::new(self.client.clone())
    }

    pub fn claim_notes(&self) -> skyclaim_persistence::ClaimNoteRepository {
        skyclaim_persistence::ClaimNoteRepository::new(self.client.clone())
    }

    pub fn outbox(&self) -> OutboxRepository {
        OutboxRepository::new(self.client.clone())
    }
}
