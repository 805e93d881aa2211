use secrecy::{ExposeSecret, Secret};
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub service_name: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// When `url` is absent the service runs on the in-memory store. That mode
/// is for local development and tests only; state is lost on restart.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Option<Secret<String>>,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: Secret<String>,
    pub expiry_hours: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Config {
            service_name: get_env("BANK_SERVICE_NAME", Some("bank-api"))?,
            log_level: get_env("BANK_LOG_LEVEL", Some("info"))?,
            otlp_endpoint: env::var("BANK_OTLP_ENDPOINT").ok().filter(|v| !v.is_empty()),
            server: ServerConfig {
                host: get_env("BANK_SERVER_HOST", Some("127.0.0.1"))?,
                port: parse_env("BANK_SERVER_PORT", Some("8080"))?,
            },
            database: DatabaseConfig {
                url: env::var("BANK_DATABASE_URL")
                    .ok()
                    .filter(|v| !v.is_empty())
                    .map(Secret::new),
                max_connections: parse_env("BANK_DATABASE_MAX_CONNECTIONS", Some("10"))?,
                min_connections: parse_env("BANK_DATABASE_MIN_CONNECTIONS", Some("1"))?,
            },
            jwt: JwtConfig {
                secret: Secret::new(get_env("BANK_JWT_SECRET", None)?),
                expiry_hours: parse_env("BANK_JWT_EXPIRY_HOURS", Some("24"))?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.jwt.secret.expose_secret().len() < 32 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "BANK_JWT_SECRET must be at least 32 characters"
            )));
        }
        if self.jwt.expiry_hours <= 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "BANK_JWT_EXPIRY_HOURS must be positive"
            )));
        }
        if self.database.min_connections > self.database.max_connections {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "BANK_DATABASE_MIN_CONNECTIONS must not exceed BANK_DATABASE_MAX_CONNECTIONS"
            )));
        }
        Ok(())
    }
}

fn get_env(key: &str, default: Option<&str>) -> Result<String, AppError> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => default.map(String::from).ok_or_else(|| {
            AppError::ConfigError(anyhow::anyhow!("Missing required env var: {key}"))
        }),
    }
}

fn parse_env<T>(key: &str, default: Option<&str>) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env(key, default)?
        .parse()
        .map_err(|e: T::Err| AppError::ConfigError(anyhow::anyhow!("Invalid {key}: {e}")))
}
