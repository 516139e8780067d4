//! Servicio JWT
//!
//! Emisión y validación de tokens de acceso de partners.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::config::EnvironmentConfig;
use crate::models::auth::JwtClaims;
use crate::models::partner::Partner;

/// Configuración JWT
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub access_token_duration: Duration,
}

impl JwtConfig {
    pub fn new(env: &EnvironmentConfig) -> Self {
        Self {
            secret: env.jwt_secret.clone(),
            algorithm: Algorithm::HS256,
            access_token_duration: Duration::seconds(env.jwt_expiration as i64),
        }
    }
}

/// Servicio JWT
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(env: &EnvironmentConfig) -> Self {
        let config = JwtConfig::new(env);
        let encoding_key = EncodingKey::from_secret(config.secret.as_ref());
        let decoding_key = DecodingKey::from_secret(config.secret.as_ref());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Genera un token de acceso para el partner
    pub fn generate_access_token(
        &self,
        partner: &Partner,
    ) -> Result<(String, DateTime<Utc>), String> {
        let now = Utc::now();
        let exp = now + self.config.access_token_duration;

        let claims = JwtClaims {
            sub: partner.id.to_string(),
            phone: partner.phone.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(self.config.algorithm), &claims, &self.encoding_key)
            .map(|token| (token, exp))
            .map_err(|e| format!("Error generating access token: {}", e))
    }

    /// Valida y decodifica un token
    pub fn validate_token(&self, token: &str) -> Result<JwtClaims, String> {
        let validation = Validation::new(self.config.algorithm);

        decode::<JwtClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| format!("Invalid token: {}", e))
    }

    /// Extrae el partner_id del token
    pub fn get_partner_id(&self, token: &str) -> Result<Uuid, String> {
        let claims = self.validate_token(token)?;
        Uuid::parse_str(&claims.sub).map_err(|_| "Invalid partner id in token".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_partner() -> Partner {
        Partner::new(
            "Asha Verma".to_string(),
            "+919812345678".to_string(),
            "asha@example.com".to_string(),
            "Mumbai".to_string(),
            "Zone A".to_string(),
            "hash".to_string(),
        )
    }

    fn test_env() -> EnvironmentConfig {
        EnvironmentConfig {
            jwt_secret: "test-secret".to_string(),
            jwt_expiration: 3600,
            ..EnvironmentConfig::from_env()
        }
    }

    #[test]
    fn test_generate_and_validate_token() {
        let jwt_service = JwtService::new(&test_env());
        let partner = test_partner();

        let (token, expires_at) = jwt_service.generate_access_token(&partner).unwrap();
        assert!(!token.is_empty());
        assert!(expires_at > Utc::now());

        let claims = jwt_service.validate_token(&token).unwrap();
        assert_eq!(claims.sub, partner.id.to_string());
        assert_eq!(claims.phone, partner.phone);

        let id = jwt_service.get_partner_id(&token).unwrap();
        assert_eq!(id, partner.id);
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let jwt_service = JwtService::new(&test_env());
        assert!(jwt_service.validate_token("not-a-jwt").is_err());
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let jwt_service = JwtService::new(&test_env());
        let other = JwtService::new(&EnvironmentConfig {
            jwt_secret: "another-secret".to_string(),
            ..test_env()
        });

        let (token, _) = other.generate_access_token(&test_partner()).unwrap();
        assert!(jwt_service.validate_token(&token).is_err());
    }
}
