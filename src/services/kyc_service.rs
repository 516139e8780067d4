//! Identity & KYC Store
//!
//! Submission de documentos, revisión externa y consulta de estado.
//! La transición pending→{approved,rejected} es de ida única por
//! submission; un rechazo exige volver a subir documentos para
//! re-entrar a pending.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Utc;
use uuid::Uuid;

use crate::models::kyc::{DocumentKind, IdType, KycSubmission, StoredDocument, SubmissionReceipt};
use crate::models::partner::{Availability, KycStatus};
use crate::repositories::kyc_repository::KycRepository;
use crate::repositories::partner_repository::PartnerRepository;
use crate::services::collaborators::DocumentStorage;
use crate::services::partner_locks::PartnerLockRegistry;
use crate::services::retry::with_backoff;
use crate::utils::errors::{not_found_error, validation_error, AppError, AppResult};

/// Imagen de documento ya decodificada, lista para almacenar
pub struct DocumentUpload {
    pub kind: DocumentKind,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct KycService {
    partners: PartnerRepository,
    submissions: KycRepository,
    documents: Arc<dyn DocumentStorage>,
    locks: PartnerLockRegistry,
    retry_max: u32,
    retry_base: StdDuration,
}

impl KycService {
    pub fn new(
        partners: PartnerRepository,
        submissions: KycRepository,
        documents: Arc<dyn DocumentStorage>,
        locks: PartnerLockRegistry,
        retry_max: u32,
        retry_base: StdDuration,
    ) -> Self {
        Self {
            partners,
            submissions,
            documents,
            locks,
            retry_max,
            retry_base,
        }
    }

    /// Subir el set de documentos. Requiere las cinco imágenes; deja al
    /// partner en pending aunque viniera de un rechazo.
    pub async fn submit_documents(
        &self,
        partner_id: Uuid,
        id_type: IdType,
        uploads: Vec<DocumentUpload>,
        experience_years: Option<u8>,
    ) -> AppResult<SubmissionReceipt> {
        let lock = self.locks.lock_for(partner_id).await;
        let _guard = lock.lock().await;

        let mut partner = self
            .partners
            .find_by_id(partner_id)
            .await
            .ok_or_else(|| not_found_error("Partner", &partner_id.to_string()))?;

        // Re-verificarse con sesiones u ofertas en vuelo rompería la
        // invariante online⇒approved
        if partner.availability != Availability::Offline {
            return Err(AppError::Conflict(
                "Partner must be offline to submit KYC documents".to_string(),
            ));
        }

        for kind in DocumentKind::required() {
            let present = uploads
                .iter()
                .any(|upload| upload.kind == kind && !upload.bytes.is_empty());
            if !present {
                return Err(validation_error(
                    "documents",
                    "a required document image is missing",
                ));
            }
        }

        let mut stored = Vec::with_capacity(uploads.len());
        for upload in &uploads {
            let document_id = with_backoff(
                "documents.store",
                self.retry_max,
                self.retry_base,
                || {
                    self.documents
                        .store(partner_id, upload.kind.as_str(), upload.bytes.clone())
                },
            )
            .await?;

            stored.push(StoredDocument {
                kind: upload.kind,
                document_id,
                uploaded_at: Utc::now(),
            });
        }

        let submission = self
            .submissions
            .create(KycSubmission::new(partner_id, id_type, stored, experience_years))
            .await;

        partner.kyc_status = KycStatus::Pending;
        self.partners.update(partner).await?;

        log::info!(
            "📋 Partner {} entra a revisión KYC con submission {}",
            partner_id,
            submission.id
        );

        Ok(SubmissionReceipt {
            submission_id: submission.id,
            status: submission.status,
            submitted_at: submission.submitted_at,
        })
    }

    /// Acción del revisor externo: resolver la submission pendiente.
    /// La transición es de ida única por submission.
    pub async fn review_documents(
        &self,
        partner_id: Uuid,
        outcome: KycStatus,
        reason: Option<String>,
    ) -> AppResult<KycSubmission> {
        if outcome == KycStatus::Pending {
            return Err(AppError::BadRequest(
                "Review outcome must be 'approved' or 'rejected'".to_string(),
            ));
        }

        let lock = self.locks.lock_for(partner_id).await;
        let _guard = lock.lock().await;

        let mut submission = self
            .submissions
            .latest_for_partner(partner_id)
            .await
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "No KYC submission found for partner '{}'",
                    partner_id
                ))
            })?;

        if submission.status != KycStatus::Pending {
            return Err(AppError::IllegalTransition(format!(
                "Submission already reviewed as '{}'",
                submission.status.as_str()
            )));
        }

        submission.status = outcome;
        submission.reviewed_at = Some(Utc::now());
        submission.rejection_reason = if outcome == KycStatus::Rejected {
            reason
        } else {
            None
        };
        let submission = self.submissions.update(submission).await?;

        let mut partner = self
            .partners
            .find_by_id(partner_id)
            .await
            .ok_or_else(|| not_found_error("Partner", &partner_id.to_string()))?;
        partner.kyc_status = outcome;
        self.partners.update(partner).await?;

        log::info!(
            "🧾 KYC de partner {} revisado: '{}'",
            partner_id,
            outcome.as_str()
        );

        Ok(submission)
    }

    pub async fn get_status(&self, partner_id: Uuid) -> AppResult<KycStatus> {
        let partner = self
            .partners
            .find_by_id(partner_id)
            .await
            .ok_or_else(|| not_found_error("Partner", &partner_id.to_string()))?;
        Ok(partner.kyc_status)
    }

    pub async fn latest_submission(&self, partner_id: Uuid) -> Option<KycSubmission> {
        self.submissions.latest_for_partner(partner_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::partner::Partner;
    use crate::services::collaborators::InMemoryDocumentStorage;

    fn uploads() -> Vec<DocumentUpload> {
        DocumentKind::required()
            .into_iter()
            .map(|kind| DocumentUpload {
                kind,
                bytes: format!("fake-{}", kind.as_str()).into_bytes(),
            })
            .collect()
    }

    fn service() -> (KycService, PartnerRepository) {
        let partners = PartnerRepository::new();
        let svc = KycService::new(
            partners.clone(),
            KycRepository::new(),
            Arc::new(InMemoryDocumentStorage::new()),
            PartnerLockRegistry::new(),
            3,
            StdDuration::from_millis(1),
        );
        (svc, partners)
    }

    async fn seeded_partner(partners: &PartnerRepository) -> Partner {
        partners
            .create(Partner::new(
                "Nikhil Rao".to_string(),
                "+919833333333".to_string(),
                "nikhil@example.com".to_string(),
                "Pune".to_string(),
                "Zone D".to_string(),
                "hash".to_string(),
            ))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_submit_review_approved_roundtrip() {
        let (svc, partners) = service();
        let partner = seeded_partner(&partners).await;

        let receipt = svc
            .submit_documents(partner.id, IdType::Aadhaar, uploads(), Some(3))
            .await
            .unwrap();
        assert_eq!(receipt.status, KycStatus::Pending);

        svc.review_documents(partner.id, KycStatus::Approved, None)
            .await
            .unwrap();

        assert_eq!(svc.get_status(partner.id).await.unwrap(), KycStatus::Approved);
    }

    #[tokio::test]
    async fn test_missing_document_is_a_validation_error() {
        let (svc, partners) = service();
        let partner = seeded_partner(&partners).await;

        let mut partial = uploads();
        partial.retain(|u| u.kind != DocumentKind::Selfie);

        let err = svc
            .submit_documents(partner.id, IdType::Pan, partial, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_review_is_one_way_per_submission() {
        let (svc, partners) = service();
        let partner = seeded_partner(&partners).await;

        svc.submit_documents(partner.id, IdType::License, uploads(), None)
            .await
            .unwrap();
        svc.review_documents(partner.id, KycStatus::Rejected, Some("blurry images".to_string()))
            .await
            .unwrap();

        // Re-revisar la misma submission es una transición ilegal
        let err = svc
            .review_documents(partner.id, KycStatus::Approved, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::IllegalTransition(_)));
    }

    #[tokio::test]
    async fn test_rejected_partner_reenters_pending_with_fresh_submission() {
        let (svc, partners) = service();
        let partner = seeded_partner(&partners).await;

        svc.submit_documents(partner.id, IdType::Aadhaar, uploads(), None)
            .await
            .unwrap();
        svc.review_documents(partner.id, KycStatus::Rejected, Some("unclear".to_string()))
            .await
            .unwrap();
        assert_eq!(svc.get_status(partner.id).await.unwrap(), KycStatus::Rejected);

        svc.submit_documents(partner.id, IdType::Aadhaar, uploads(), None)
            .await
            .unwrap();
        assert_eq!(svc.get_status(partner.id).await.unwrap(), KycStatus::Pending);
    }

    #[tokio::test]
    async fn test_pending_review_outcome_is_rejected_input() {
        let (svc, partners) = service();
        let partner = seeded_partner(&partners).await;

        svc.submit_documents(partner.id, IdType::Aadhaar, uploads(), None)
            .await
            .unwrap();
        let err = svc
            .review_documents(partner.id, KycStatus::Pending, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
