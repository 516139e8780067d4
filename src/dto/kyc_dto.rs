//! DTOs de KYC

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::kyc::{IdType, KycSubmission, SubmissionReceipt};

/// Request de submission de documentos. Las imágenes viajan en base64
/// (la app móvil sube data-URLs).
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitKycRequest {
    pub id_type: IdType,

    #[validate(length(min = 1))]
    pub id_front: String,

    #[validate(length(min = 1))]
    pub id_back: String,

    #[validate(length(min = 1))]
    pub selfie: String,

    #[validate(length(min = 1))]
    pub license_front: String,

    #[validate(length(min = 1))]
    pub license_back: String,

    #[validate(range(min = 0, max = 60))]
    pub experience_years: Option<u8>,
}

/// Request del revisor externo
#[derive(Debug, Deserialize)]
pub struct ReviewKycRequest {
    pub outcome: String,
    pub reason: Option<String>,
}

/// Recibo de submission
#[derive(Debug, Serialize)]
pub struct SubmissionReceiptResponse {
    pub submission_id: String,
    pub status: String,
    pub submitted_at: String,
}

impl From<SubmissionReceipt> for SubmissionReceiptResponse {
    fn from(receipt: SubmissionReceipt) -> Self {
        Self {
            submission_id: receipt.submission_id.to_string(),
            status: receipt.status.as_str().to_string(),
            submitted_at: receipt.submitted_at.to_rfc3339(),
        }
    }
}

/// Estado KYC vigente del partner
#[derive(Debug, Serialize)]
pub struct KycStatusResponse {
    pub status: String,
    pub submission_id: Option<String>,
    pub submitted_at: Option<String>,
    pub reviewed_at: Option<String>,
    pub rejection_reason: Option<String>,
}

impl KycStatusResponse {
    pub fn from_parts(status: &str, submission: Option<KycSubmission>) -> Self {
        Self {
            status: status.to_string(),
            submission_id: submission.as_ref().map(|s| s.id.to_string()),
            submitted_at: submission.as_ref().map(|s| s.submitted_at.to_rfc3339()),
            reviewed_at: submission
                .as_ref()
                .and_then(|s| s.reviewed_at.map(|t| t.to_rfc3339())),
            rejection_reason: submission.and_then(|s| s.rejection_reason),
        }
    }
}
