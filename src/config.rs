// src/config.rs
use crate::error::{AppError, AppResult};
use std::{env, fmt::Display, net::SocketAddr, str::FromStr};
use tower_sessions::cookie::Key;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://wellness.db";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Configuração do servidor, lida do ambiente (com `.env` via dotenvy).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub session_secret: String,
    pub bind_addr: SocketAddr,
    pub seed_demo_data: bool,
    pub secure_cookies: bool,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let session_secret = env::var("SESSION_SECRET").map_err(|e| {
            tracing::error!("!!! Variável de ambiente SESSION_SECRET não definida: {}", e);
            AppError::EnvVarError(e)
        })?;

        Ok(Self {
            database_url: try_load("DATABASE_URL", DEFAULT_DATABASE_URL)?,
            session_secret,
            bind_addr: try_load("BIND_ADDR", DEFAULT_BIND_ADDR)?,
            seed_demo_data: try_load("SEED_DEMO_DATA", "false")?,
            secure_cookies: try_load("SESSION_SECURE_COOKIE", "false")?,
        })
    }

    /// Chave para assinar o cookie de sessão. Exige pelo menos 64 bytes.
    pub fn session_key(&self) -> AppResult<Key> {
        Key::try_from(self.session_secret.as_bytes()).map_err(|e| {
            AppError::ConfigError(format!(
                "SESSION_SECRET precisa de pelo menos 64 bytes ({})",
                e
            ))
        })
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> AppResult<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        tracing::info!("{key} não definida, usando o padrão: {default}");
        default.to_string()
    });
    raw.parse()
        .map_err(|e| AppError::ConfigError(format!("Valor inválido para {key}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_secret(secret: &str) -> Config {
        Config {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            session_secret: secret.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.parse().unwrap(),
            seed_demo_data: false,
            secure_cookies: false,
        }
    }

    #[test]
    fn short_session_secret_is_rejected() {
        let config = config_with_secret("curta");
        assert!(matches!(config.session_key(), Err(AppError::ConfigError(_))));
    }

    #[test]
    fn long_session_secret_builds_key() {
        let config = config_with_secret(&"x".repeat(64));
        assert!(config.session_key().is_ok());
    }

    #[test]
    fn try_load_falls_back_to_default() {
        let port: SocketAddr = try_load("WELLNESS_TEST_UNSET_ADDR", "127.0.0.1:4000").unwrap();
        assert_eq!(port.port(), 4000);
    }
}
