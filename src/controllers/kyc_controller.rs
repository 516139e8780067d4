//! Controller de KYC
//!
//! Submission de documentos del partner, revisión externa y consulta
//! de estado.

use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::dto::kyc_dto::{
    KycStatusResponse, ReviewKycRequest, SubmissionReceiptResponse, SubmitKycRequest,
};
use crate::dto::partner_dto::ApiResponse;
use crate::models::kyc::DocumentKind;
use crate::models::partner::KycStatus;
use crate::services::kyc_service::{DocumentUpload, KycService};
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::validation::decode_image_base64;

pub struct KycController {
    kyc: KycService,
}

impl KycController {
    pub fn new(state: &AppState) -> Self {
        Self {
            kyc: state.kyc.clone(),
        }
    }

    fn decode_document(
        field: &'static str,
        kind: DocumentKind,
        value: &str,
    ) -> AppResult<DocumentUpload> {
        let bytes = decode_image_base64(value).map_err(|e| {
            let mut errors = ValidationErrors::new();
            errors.add(field, e);
            AppError::Validation(errors)
        })?;

        Ok(DocumentUpload { kind, bytes })
    }

    /// Subir el set de documentos de identidad y cualificación
    pub async fn submit(
        &self,
        partner_id: Uuid,
        request: SubmitKycRequest,
    ) -> Result<ApiResponse<SubmissionReceiptResponse>, AppError> {
        request.validate()?;

        let uploads = vec![
            Self::decode_document("id_front", DocumentKind::IdFront, &request.id_front)?,
            Self::decode_document("id_back", DocumentKind::IdBack, &request.id_back)?,
            Self::decode_document("selfie", DocumentKind::Selfie, &request.selfie)?,
            Self::decode_document(
                "license_front",
                DocumentKind::LicenseFront,
                &request.license_front,
            )?,
            Self::decode_document(
                "license_back",
                DocumentKind::LicenseBack,
                &request.license_back,
            )?,
        ];

        let receipt = self
            .kyc
            .submit_documents(partner_id, request.id_type, uploads, request.experience_years)
            .await?;

        Ok(ApiResponse::success_with_message(
            SubmissionReceiptResponse::from(receipt),
            "Documentos enviados a revisión exitosamente".to_string(),
        ))
    }

    /// Resolución del revisor externo sobre la submission pendiente
    pub async fn review(
        &self,
        partner_id: Uuid,
        request: ReviewKycRequest,
    ) -> Result<ApiResponse<KycStatusResponse>, AppError> {
        let outcome = match request.outcome.as_str() {
            "approved" => KycStatus::Approved,
            "rejected" => KycStatus::Rejected,
            other => {
                return Err(AppError::BadRequest(format!(
                    "Unknown review outcome '{}'",
                    other
                )))
            }
        };

        let submission = self
            .kyc
            .review_documents(partner_id, outcome, request.reason)
            .await?;

        Ok(ApiResponse::success_with_message(
            KycStatusResponse::from_parts(outcome.as_str(), Some(submission)),
            "Revisión registrada exitosamente".to_string(),
        ))
    }

    /// Estado KYC vigente del partner
    pub async fn status(&self, partner_id: Uuid) -> Result<KycStatusResponse, AppError> {
        let status = self.kyc.get_status(partner_id).await?;
        let submission = self.kyc.latest_submission(partner_id).await;
        Ok(KycStatusResponse::from_parts(status.as_str(), submission))
    }
}
