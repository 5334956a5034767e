// [apps/api/src/config.rs]
//! Carga y validación de la configuración de proceso desde variables de
//! entorno. En producción, un secreto ausente o con forma inválida debe
//! abortar el arranque en vez de degradar silenciosamente.

use anyhow::{bail, Context};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn from_env() -> Self {
        match std::env::var("ENVIRONMENT").unwrap_or_default().to_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }
}

#[derive(Clone)]
pub struct Config {
    pub environment: Environment,
    pub port: u16,
    pub database_url: String,
    pub turso_auth_token: Option<String>,
    pub redis_url: Option<String>,
    pub jwt_secret: Vec<u8>,
    pub db_encryption_key_hex: String,
    pub file_encryption_key_hex: String,
    pub webdav_url: String,
    pub webdav_user: Option<String>,
    pub webdav_password: Option<String>,
    pub malware_scanner_url: Option<String>,
    pub cors_origins: Vec<String>,
    pub max_file_size_bytes: u64,
    pub streaming_threshold_bytes: u64,
}

impl Config {
    /// Construye la configuración del proceso, fallando rápido cuando un
    /// ambiente `production` carece de un secreto o lo trae con forma
    /// incorrecta en vez de degradar silenciosamente.
    pub fn from_env() -> anyhow::Result<Self> {
        let environment = Environment::from_env();

        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL no está definido")?;
        let turso_auth_token = std::env::var("TURSO_AUTH_TOKEN").ok();
        let redis_url = std::env::var("REDIS_URL").ok();

        let jwt_secret = std::env::var("SECRET_KEY").context("SECRET_KEY no está definido")?;
        if environment.is_production() && jwt_secret.len() < 32 {
            bail!("SECRET_KEY debe tener al menos 32 bytes en producción");
        }

        let db_encryption_key_hex = std::env::var("DB_ENCRYPTION_KEY").context("DB_ENCRYPTION_KEY no está definido")?;
        validate_hex_key(&db_encryption_key_hex, "DB_ENCRYPTION_KEY")?;

        let file_encryption_key_hex =
            std::env::var("FILE_ENCRYPTION_KEY").context("FILE_ENCRYPTION_KEY no está definido")?;
        validate_hex_key(&file_encryption_key_hex, "FILE_ENCRYPTION_KEY")?;

        let webdav_url = std::env::var("WEBDAV_URL").context("WEBDAV_URL no está definido")?;
        let webdav_user = std::env::var("WEBDAV_USER").ok();
        let webdav_password = std::env::var("WEBDAV_PASS").ok();

        let malware_scanner_url = std::env::var("MALWARE_SCANNER_URL").ok();
        if environment.is_production() && malware_scanner_url.is_none() {
            bail!("MALWARE_SCANNER_URL es obligatorio en producción: el escáner nulo sólo es válido en desarrollo");
        }

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if environment.is_production() && cors_origins.is_empty() {
            bail!("CORS_ORIGINS debe listar al menos un origen permitido en producción");
        }

        let port: u16 = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().unwrap_or(3000);

        let max_file_size_bytes: u64 = std::env::var("MAX_FILE_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(25 * 1024 * 1024);

        // Por debajo de este tamaño, un solo sobre AEAD evita el costo de
        // fragmentar un archivo que de todas formas cabe entero en memoria.
        let streaming_threshold_bytes: u64 = std::env::var("STREAMING_THRESHOLD")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1024 * 1024);

        Ok(Self {
            environment,
            port,
            database_url,
            turso_auth_token,
            redis_url,
            jwt_secret: jwt_secret.into_bytes(),
            db_encryption_key_hex,
            file_encryption_key_hex,
            webdav_url,
            webdav_user,
            webdav_password,
            malware_scanner_url,
            cors_origins,
            max_file_size_bytes,
            streaming_threshold_bytes,
        })
    }
}

fn validate_hex_key(value: &str, name: &str) -> anyhow::Result<()> {
    if value.len() != 64 || hex::decode(value).is_err() {
        bail!("{name} debe ser una cadena hexadecimal de 64 caracteres (32 bytes)");
    }
    Ok(())
}
