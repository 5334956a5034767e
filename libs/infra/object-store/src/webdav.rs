// [libs/infra/object-store/src/webdav.rs]
/*!
 * Adaptador WebDAV mínimo para el almacén de objetos cifrados. Construido
 * sobre `reqwest::Client` con el mismo patrón de timeouts/user-agent que el
 * cliente de red del teacher; aquí además envuelve cada operación en la
 * política de reintento de `backoff` usando `ObjectStoreError::classify`
 * para decidir si vale la pena reintentar.
 */

use crate::backoff::{delay_for_attempt, MAX_ATTEMPTS};
use crate::errors::{FaultClass, ObjectStoreError};
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

pub struct WebDavClient {
    http: Client,
    base_url: String,
}

impl WebDavClient {
    pub fn new(base_url: impl Into<String>, username: Option<&str>, password: Option<&str>) -> Self {
        let mut builder = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .user_agent("SkyClaim-ObjectStore/1.0");
        if let (Some(user), Some(pass)) = (username, password) {
            let mut headers = reqwest::header::HeaderMap::new();
            let credential = base64_basic_auth(user, pass);
            if let Ok(value) = reqwest::header::HeaderValue::from_str(&credential) {
                headers.insert(reqwest::header::AUTHORIZATION, value);
            }
            builder = builder.default_headers(headers);
        }
        Self {
            http: builder.build().expect("failed to build WebDAV client"),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key.trim_start_matches('/'))
    }

    /// Crea el directorio contenedor si no existe. Un 405 (MethodNotAllowed,
    /// "ya existe") se trata como éxito — MKCOL no es idempotente por
    /// especificación, así que lo hacemos idempotente aquí.
    #[instrument(skip(self))]
    pub async fn mkcol_idempotent(&self, collection_path: &str) -> Result<(), ObjectStoreError> {
        self.with_retry(|| async {
            let response = self
                .http
                .request(
                    reqwest::Method::from_bytes(b"MKCOL").unwrap(),
                    self.url_for(collection_path),
                )
                .send()
                .await?;
            match response.status() {
                StatusCode::CREATED | StatusCode::METHOD_NOT_ALLOWED | StatusCode::CONFLICT => Ok(()),
                status => Err(remote_error(status, response).await),
            }
        })
        .await
    }

    #[instrument(skip(self, body))]
    pub async fn put(&self, key: &str, body: Bytes) -> Result<(), ObjectStoreError> {
        let url = self.url_for(key);
        self.with_retry(|| async {
            let response = self.http.put(&url).body(body.clone()).send().await?;
            if response.status().is_success() {
                Ok(())
            } else {
                Err(remote_error(response.status(), response).await)
            }
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn head(&self, key: &str) -> Result<u64, ObjectStoreError> {
        let url = self.url_for(key);
        self.with_retry(|| async {
            let response = self.http.head(&url).send().await?;
            if response.status() == StatusCode::NOT_FOUND {
                return Err(ObjectStoreError::NotFound(key.to_string()));
            }
            if !response.status().is_success() {
                return Err(remote_error(response.status(), response).await);
            }
            Ok(response
                .headers()
                .get(reqwest::header::CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(0))
        })
        .await
    }

    /// Descarga un rango de bytes vía `Range`, usado por el pipeline de
    /// documentos para la verificación de integridad post-escritura sin
    /// traer el archivo completo.
    #[instrument(skip(self))]
    pub async fn get_range(&self, key: &str, start: u64, end_inclusive: u64) -> Result<Bytes, ObjectStoreError> {
        let url = self.url_for(key);
        self.with_retry(|| async {
            let response = self
                .http
                .get(&url)
                .header(reqwest::header::RANGE, format!("bytes={start}-{end_inclusive}"))
                .send()
                .await?;
            if response.status() == StatusCode::NOT_FOUND {
                return Err(ObjectStoreError::NotFound(key.to_string()));
            }
            if !(response.status().is_success() || response.status() == StatusCode::PARTIAL_CONTENT) {
                return Err(remote_error(response.status(), response).await);
            }
            Ok(response.bytes().await?)
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, key: &str) -> Result<(), ObjectStoreError> {
        let url = self.url_for(key);
        self.with_retry(|| async {
            let response = self.http.delete(&url).send().await?;
            match response.status() {
                StatusCode::NO_CONTENT | StatusCode::OK | StatusCode::NOT_FOUND => Ok(()),
                status => Err(remote_error(status, response).await),
            }
        })
        .await
    }

    async fn with_retry<F, Fut, T>(&self, mut operation: F) -> Result<T, ObjectStoreError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, ObjectStoreError>>,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    let class = err.classify();
                    if class != FaultClass::Retryable || attempt >= MAX_ATTEMPTS {
                        return Err(err);
                    }
                    warn!(attempt, error = %err, "webdav operation failed, retrying");
                    sleep(delay_for_attempt(attempt)).await;
                    attempt += 1;
                }
            }
        }
    }
}

async fn remote_error(status: StatusCode, response: reqwest::Response) -> ObjectStoreError {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return ObjectStoreError::Unauthorized;
    }
    let detail = response.text().await.unwrap_or_default();
    debug!(status = %status, "webdav remote rejection");
    ObjectStoreError::RemoteRejection {
        status: status.as_u16(),
        detail,
    }
}

fn base64_basic_auth(user: &str, pass: &str) -> String {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    format!("Basic {}", STANDARD.encode(format!("{user}:{pass}")))
}
