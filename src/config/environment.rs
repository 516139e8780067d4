//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de
//! configuración del servicio de partners.

use std::env;

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub cors_origins: Vec<String>,
    /// Ventana de aceptación de ofertas en segundos
    pub offer_window_secs: u64,
    /// Tiempo de vida de un desafío OTP en segundos
    pub otp_ttl_secs: u64,
    /// Reintentos máximos contra colaboradores externos
    pub external_retry_max: u32,
    /// Delay base del backoff exponencial en milisegundos
    pub external_retry_base_ms: u64,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl EnvironmentConfig {
    /// Cargar la configuración desde el entorno con defaults de desarrollo
    pub fn from_env() -> Self {
        Self {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("PORT must be a valid number"),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "your-super-secret-jwt-key-change-in-production".to_string()),
            jwt_expiration: env::var("JWT_EXPIRATION")
                .unwrap_or_else(|_| "86400".to_string())
                .parse()
                .expect("JWT_EXPIRATION must be a valid number"),
            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            offer_window_secs: env::var("OFFER_WINDOW_SECS")
                .unwrap_or_else(|_| "45".to_string())
                .parse()
                .expect("OFFER_WINDOW_SECS must be a valid number"),
            otp_ttl_secs: env::var("OTP_TTL_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .expect("OTP_TTL_SECS must be a valid number"),
            external_retry_max: env::var("EXTERNAL_RETRY_MAX")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .expect("EXTERNAL_RETRY_MAX must be a valid number"),
            external_retry_base_ms: env::var("EXTERNAL_RETRY_BASE_MS")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .expect("EXTERNAL_RETRY_BASE_MS must be a valid number"),
        }
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
