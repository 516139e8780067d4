//! Repositorio de submissions KYC
//!
//! Conserva el historial completo de submissions; el estado vigente del
//! partner es el de su submission más reciente.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::kyc::KycSubmission;
use crate::utils::errors::{not_found_error, AppResult};

#[derive(Clone, Default)]
pub struct KycRepository {
    submissions: Arc<RwLock<HashMap<Uuid, KycSubmission>>>,
}

impl KycRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, submission: KycSubmission) -> KycSubmission {
        let mut submissions = self.submissions.write().await;
        log::info!(
            "💾 Submission KYC {} registrada para partner {}",
            submission.id,
            submission.partner_id
        );
        submissions.insert(submission.id, submission.clone());
        submission
    }

    pub async fn update(&self, submission: KycSubmission) -> AppResult<KycSubmission> {
        let mut submissions = self.submissions.write().await;

        if !submissions.contains_key(&submission.id) {
            return Err(not_found_error("KycSubmission", &submission.id.to_string()));
        }

        submissions.insert(submission.id, submission.clone());
        Ok(submission)
    }

    /// Submission más reciente del partner
    pub async fn latest_for_partner(&self, partner_id: Uuid) -> Option<KycSubmission> {
        self.submissions
            .read()
            .await
            .values()
            .filter(|s| s.partner_id == partner_id)
            .max_by_key(|s| s.submitted_at)
            .cloned()
    }
}
