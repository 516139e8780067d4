//! Colaboradores externos
//!
//! Interfaces de los servicios externos que el core consume:
//! almacenamiento de documentos, OTP/notificaciones y pagos. Solo se
//! especifica la interfaz; las implementaciones incluidas son las
//! simuladas en memoria que respaldan el servidor de desarrollo y los
//! tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::auth::OtpPurpose;

/// Fallo de un colaborador externo; el caller decide si reintenta
#[derive(Debug, Error)]
#[error("{service}: {message}")]
pub struct CollaboratorError {
    pub service: &'static str,
    pub message: String,
}

impl CollaboratorError {
    pub fn new(service: &'static str, message: impl Into<String>) -> Self {
        Self {
            service,
            message: message.into(),
        }
    }
}

/// Almacenamiento de documentos (imágenes KYC e inspecciones)
#[async_trait]
pub trait DocumentStorage: Send + Sync {
    async fn store(
        &self,
        partner_id: Uuid,
        kind: &str,
        bytes: Vec<u8>,
    ) -> Result<String, CollaboratorError>;

    async fn fetch(&self, document_id: &str) -> Result<Vec<u8>, CollaboratorError>;
}

/// Servicio de OTP/notificaciones
#[async_trait]
pub trait OtpProvider: Send + Sync {
    async fn send(&self, phone: &str, purpose: OtpPurpose) -> Result<Uuid, CollaboratorError>;

    async fn verify(&self, challenge_id: Uuid, code: &str) -> Result<bool, CollaboratorError>;

    /// Hook para entornos de desarrollo: el código del desafío, si el
    /// proveedor lo expone. Los proveedores reales devuelven None.
    async fn dev_code(&self, _challenge_id: Uuid) -> Option<String> {
        None
    }
}

/// Servicio de pagos a partners
#[async_trait]
pub trait PayoutProvider: Send + Sync {
    async fn payout(&self, partner_id: Uuid, amount: Decimal) -> Result<String, CollaboratorError>;
}

/// Desafío OTP vivo dentro del proveedor simulado
#[derive(Debug, Clone)]
struct OtpChallenge {
    phone: String,
    code: String,
    purpose: OtpPurpose,
    expires_at: DateTime<Utc>,
    consumed: bool,
}

/// Proveedor OTP simulado. Genera códigos de 6 dígitos y los retiene en
/// memoria hasta su TTL; verify consume el desafío al primer acierto.
#[derive(Clone, Default)]
pub struct SimulatedOtpProvider {
    challenges: Arc<RwLock<HashMap<Uuid, OtpChallenge>>>,
    ttl: Duration,
}

impl SimulatedOtpProvider {
    pub fn new(ttl: Duration) -> Self {
        Self {
            challenges: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Código del desafío, solo para desarrollo y tests
    pub async fn peek_code(&self, challenge_id: Uuid) -> Option<String> {
        self.challenges
            .read()
            .await
            .get(&challenge_id)
            .map(|c| c.code.clone())
    }
}

#[async_trait]
impl OtpProvider for SimulatedOtpProvider {
    async fn send(&self, phone: &str, purpose: OtpPurpose) -> Result<Uuid, CollaboratorError> {
        let challenge_id = Uuid::new_v4();
        let code = format!("{:06}", rand::thread_rng().gen_range(0..1_000_000u32));

        let ttl = chrono::Duration::from_std(self.ttl)
            .map_err(|e| CollaboratorError::new("otp", e.to_string()))?;

        let mut challenges = self.challenges.write().await;
        challenges.insert(
            challenge_id,
            OtpChallenge {
                phone: phone.to_string(),
                code: code.clone(),
                purpose,
                expires_at: Utc::now() + ttl,
                consumed: false,
            },
        );

        log::info!("📲 OTP simulado enviado a '{}': {}", phone, code);
        Ok(challenge_id)
    }

    async fn verify(&self, challenge_id: Uuid, code: &str) -> Result<bool, CollaboratorError> {
        let mut challenges = self.challenges.write().await;

        let challenge = match challenges.get_mut(&challenge_id) {
            Some(challenge) => challenge,
            None => return Ok(false),
        };

        if challenge.consumed || Utc::now() > challenge.expires_at {
            return Ok(false);
        }

        if challenge.code != code {
            log::warn!(
                "❌ OTP incorrecto para '{}' (propósito {:?})",
                challenge.phone,
                challenge.purpose
            );
            return Ok(false);
        }

        challenge.consumed = true;
        Ok(true)
    }

    async fn dev_code(&self, challenge_id: Uuid) -> Option<String> {
        self.peek_code(challenge_id).await
    }
}

/// Almacenamiento de documentos en memoria
#[derive(Clone, Default)]
pub struct InMemoryDocumentStorage {
    documents: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryDocumentStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStorage for InMemoryDocumentStorage {
    async fn store(
        &self,
        partner_id: Uuid,
        kind: &str,
        bytes: Vec<u8>,
    ) -> Result<String, CollaboratorError> {
        if bytes.is_empty() {
            return Err(CollaboratorError::new("documents", "empty document payload"));
        }

        let document_id = format!("doc_{}", Uuid::new_v4());
        log::info!(
            "📄 Documento '{}' almacenado para partner {} ({} bytes)",
            kind,
            partner_id,
            bytes.len()
        );

        let mut documents = self.documents.write().await;
        documents.insert(document_id.clone(), bytes);
        Ok(document_id)
    }

    async fn fetch(&self, document_id: &str) -> Result<Vec<u8>, CollaboratorError> {
        self.documents
            .read()
            .await
            .get(document_id)
            .cloned()
            .ok_or_else(|| {
                CollaboratorError::new("documents", format!("document '{}' not found", document_id))
            })
    }
}

/// Proveedor de pagos simulado
#[derive(Clone, Default)]
pub struct SimulatedPayoutProvider;

impl SimulatedPayoutProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PayoutProvider for SimulatedPayoutProvider {
    async fn payout(&self, partner_id: Uuid, amount: Decimal) -> Result<String, CollaboratorError> {
        let payout_ref = format!("pay_{}", Uuid::new_v4());
        log::info!(
            "💸 Payout simulado de {} para partner {} (ref '{}')",
            amount,
            partner_id,
            payout_ref
        );
        Ok(payout_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_otp_send_verify_roundtrip() {
        let provider = SimulatedOtpProvider::new(Duration::from_secs(300));

        let challenge_id = provider.send("+5215512345678", OtpPurpose::Login).await.unwrap();
        let code = provider.peek_code(challenge_id).await.unwrap();
        let wrong_code = if code == "000000" { "000001" } else { "000000" };

        assert!(!provider.verify(challenge_id, wrong_code).await.unwrap());
        assert!(provider.verify(challenge_id, &code).await.unwrap());

        // El desafío se consume al primer acierto
        assert!(!provider.verify(challenge_id, &code).await.unwrap());
    }

    #[tokio::test]
    async fn test_otp_expired_challenge_fails() {
        let provider = SimulatedOtpProvider::new(Duration::from_secs(0));

        let challenge_id = provider.send("+5215512345678", OtpPurpose::Login).await.unwrap();
        let code = provider.peek_code(challenge_id).await.unwrap();

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!provider.verify(challenge_id, &code).await.unwrap());
    }

    #[tokio::test]
    async fn test_document_store_and_fetch() {
        let storage = InMemoryDocumentStorage::new();
        let partner_id = Uuid::new_v4();

        let document_id = storage
            .store(partner_id, "id_front", b"fake-image-bytes".to_vec())
            .await
            .unwrap();

        let bytes = storage.fetch(&document_id).await.unwrap();
        assert_eq!(bytes, b"fake-image-bytes");

        assert!(storage.fetch("doc_missing").await.is_err());
        assert!(storage.store(partner_id, "id_back", vec![]).await.is_err());
    }
}
