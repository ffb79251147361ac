//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y las reglas de negocio
//! configurables (comisión, plazas máximas, plazo de reembolso).

use std::env;
use std::str::FromStr;

use chrono::Duration;

use crate::utils::errors::{AppError, AppResult};

/// Lee una variable de entorno con valor por defecto
fn env_or<T: FromStr>(key: &str, default: T) -> AppResult<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Internal(format!("{} has an invalid value: '{}'", key, raw))),
        Err(_) => Ok(default),
    }
}

/// Backend de persistencia
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(AppError::Internal(format!("unknown storage backend '{}'", other))),
        }
    }
}

/// Reglas de negocio del marketplace
#[derive(Debug, Clone, Copy)]
pub struct BusinessRules {
    /// Créditos que paga el conductor al publicar un trajet
    pub ride_commission: i64,
    pub max_seats_per_ride: i32,
    pub refund_deadline_days: i64,
}

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            ride_commission: 2,
            max_seats_per_ride: 6,
            refund_deadline_days: 2,
        }
    }
}

impl BusinessRules {
    pub fn from_env() -> AppResult<Self> {
        let defaults = Self::default();
        let rules = Self {
            ride_commission: env_or("RIDE_COMMISSION", defaults.ride_commission)?,
            max_seats_per_ride: env_or("MAX_SEATS_PER_RIDE", defaults.max_seats_per_ride)?,
            refund_deadline_days: env_or("REFUND_DEADLINE_DAYS", defaults.refund_deadline_days)?,
        };

        if rules.ride_commission < 0 || rules.max_seats_per_ride < 1 || rules.refund_deadline_days < 0 {
            return Err(AppError::Internal(format!("invalid business rules: {:?}", rules)));
        }
        Ok(rules)
    }

    pub fn refund_deadline(&self) -> Duration {
        Duration::days(self.refund_deadline_days)
    }
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub jwt_secret: String,
    /// Duración de los tokens en segundos
    pub jwt_expiration: u64,
    pub cors_origins: Vec<String>,
    pub storage_backend: StorageBackend,
    pub rules: BusinessRules,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 3000,
            host: "0.0.0.0".to_string(),
            jwt_secret: "dev-secret-change-me".to_string(),
            jwt_expiration: 86_400,
            cors_origins: vec!["http://localhost:5173".to_string()],
            storage_backend: StorageBackend::Memory,
            rules: BusinessRules::default(),
        }
    }
}

impl EnvironmentConfig {
    pub fn from_env() -> AppResult<Self> {
        let defaults = Self::default();

        let environment = env::var("ENVIRONMENT").unwrap_or(defaults.environment);
        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) if environment != "production" => defaults.jwt_secret,
            Err(_) => return Err(AppError::Internal("JWT_SECRET must be set in production".to_string())),
        };
        let cors_origins = match env::var("CORS_ORIGINS") {
            Ok(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Err(_) => defaults.cors_origins,
        };

        Ok(Self {
            port: env_or("PORT", defaults.port)?,
            host: env::var("HOST").unwrap_or(defaults.host),
            jwt_expiration: env_or("JWT_EXPIRATION", defaults.jwt_expiration)?,
            storage_backend: env_or("STORAGE_BACKEND", StorageBackend::Postgres)?,
            rules: BusinessRules::from_env()?,
            environment,
            jwt_secret,
            cors_origins,
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
