//! Modelo de KYC
//!
//! Documentos de identidad y cualificación subidos por el partner.
//! Los bytes viven en el almacenamiento de documentos externo; aquí solo
//! se guardan las referencias.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::partner::KycStatus;

/// Tipo de documento de identidad gubernamental
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IdType {
    Aadhaar,
    Pan,
    License,
}

/// Clase de imagen dentro del set de documentos
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    IdFront,
    IdBack,
    Selfie,
    LicenseFront,
    LicenseBack,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::IdFront => "id_front",
            DocumentKind::IdBack => "id_back",
            DocumentKind::Selfie => "selfie",
            DocumentKind::LicenseFront => "license_front",
            DocumentKind::LicenseBack => "license_back",
        }
    }

    /// Set completo requerido en cada submission
    pub fn required() -> [DocumentKind; 5] {
        [
            DocumentKind::IdFront,
            DocumentKind::IdBack,
            DocumentKind::Selfie,
            DocumentKind::LicenseFront,
            DocumentKind::LicenseBack,
        ]
    }
}

/// Referencia a un documento ya almacenado
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDocument {
    pub kind: DocumentKind,
    pub document_id: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Una submission de documentos KYC. La transición pending→{approved,
/// rejected} es de ida única; un rechazo exige una submission nueva.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KycSubmission {
    pub id: Uuid,
    pub partner_id: Uuid,
    pub id_type: IdType,
    pub documents: Vec<StoredDocument>,
    pub experience_years: Option<u8>,
    pub status: KycStatus,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
}

impl KycSubmission {
    pub fn new(
        partner_id: Uuid,
        id_type: IdType,
        documents: Vec<StoredDocument>,
        experience_years: Option<u8>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            partner_id,
            id_type,
            documents,
            experience_years,
            status: KycStatus::Pending,
            submitted_at: Utc::now(),
            reviewed_at: None,
            rejection_reason: None,
        }
    }
}

/// Recibo devuelto al partner tras una submission
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReceipt {
    pub submission_id: Uuid,
    pub status: KycStatus,
    pub submitted_at: DateTime<Utc>,
}
