// [libs/domain/auth-service/src/rate_limit.rs]
/*!
 * Ventana deslizante de límite de tasa. La variante en proceso respalda
 * pruebas y despliegues de un solo nodo; la variante Redis (`INCR` +
 * `EXPIRE`) es la de producción, elegida del mismo modo en que
 * `LedgerClient::connect` elige transporte remoto vs local según la URL
 * configurada.
 */

use async_trait::async_trait;
use chrono::Duration;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::warn;

#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Incrementa el contador de `key` y devuelve `true` si la petición
    /// debe permitirse, es decir si el contador resultante no excede
    /// `limit` dentro de `window`.
    async fn check_and_increment(&self, key: &str, limit: u32, window: Duration) -> bool;
}

struct Bucket {
    count: u32,
    window_started_at: chrono::DateTime<chrono::Utc>,
}

/// Implementación en memoria para pruebas y desarrollo de un solo nodo.
/// No sobrevive reinicios ni se comparte entre procesos — nunca usar en
/// producción multi-nodo, donde Redis es la fuente de verdad.
#[derive(Default)]
pub struct InProcessRateLimiter {
    buckets: Mutex<HashMap<String, Bucket>>,
}

impl InProcessRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimiter for InProcessRateLimiter {
    async fn check_and_increment(&self, key: &str, limit: u32, window: Duration) -> bool {
        let now = chrono::Utc::now();
        let mut buckets = self.buckets.lock().expect("rate limiter mutex poisoned");
        let bucket = buckets.entry(key.to_string()).or_insert(Bucket {
            count: 0,
            window_started_at: now,
        });
        if now - bucket.window_started_at > window {
            bucket.count = 0;
            bucket.window_started_at = now;
        }
        bucket.count += 1;
        bucket.count <= limit
    }
}

/// Respaldo Redis: una ventana deslizante aproximada vía `INCR` + `EXPIRE
/// NX`, suficiente para los umbrales de bloqueo y límite de tasa (no
/// requiere precisión de sub-segundo).
pub struct RedisRateLimiter {
    client: redis::Client,
}

impl RedisRateLimiter {
    pub fn new(redis_url: &str) -> Result<Self, redis::RedisError> {
        Ok(Self {
            client: redis::Client::open(redis_url)?,
        })
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn check_and_increment(&self, key: &str, limit: u32, window: Duration) -> bool {
        let mut conn = match self.client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(error) => {
                warn!(%error, "rate limiter redis connection failed, failing closed");
                return false;
            }
        };
        let window_seconds = window.num_seconds().max(1) as u64;
        let result: redis::RedisResult<u32> = redis::pipe()
            .atomic()
            .incr(key, 1)
            .expire(key, window_seconds as i64)
            .ignore()
            .query_async(&mut conn)
            .await;
        match result {
            Ok(count) => count <= limit,
            Err(error) => {
                warn!(%error, "rate limiter redis query failed, failing closed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_process_limiter_enforces_threshold_within_window() {
        let limiter = InProcessRateLimiter::new();
        let window = Duration::minutes(1);
        for _ in 0..5 {
            assert!(limiter.check_and_increment("login:1.2.3.4", 5, window).await);
        }
        assert!(!limiter.check_and_increment("login:1.2.3.4", 5, window).await);
    }

    #[tokio::test]
    async fn in_process_limiter_tracks_keys_independently() {
        let limiter = InProcessRateLimiter::new();
        let window = Duration::minutes(1);
        assert!(limiter.check_and_increment("a@example.com", 1, window).await);
        assert!(limiter.check_and_increment("b@example.com", 1, window).await);
        assert!(!limiter.check_and_increment("a@example.com", 1, window).await);
    }
}
