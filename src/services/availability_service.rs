//! Máquina de estados de disponibilidad
//!
//! Estados offline/online/on_trip. Pasar a online exige KYC aprobado;
//! on_trip solo se entra aceptando una oferta y solo se sale cerrando
//! la sesión, por lo que este servicio rechaza esos ejes cuando el
//! partner los pide directamente.

use uuid::Uuid;

use crate::models::partner::{Availability, KycStatus, Partner};
use crate::repositories::partner_repository::PartnerRepository;
use crate::repositories::session_repository::SessionRepository;
use crate::services::partner_locks::PartnerLockRegistry;
use crate::utils::errors::{illegal_transition_error, not_found_error, AppError, AppResult};

#[derive(Clone)]
pub struct AvailabilityService {
    partners: PartnerRepository,
    sessions: SessionRepository,
    locks: PartnerLockRegistry,
}

impl AvailabilityService {
    pub fn new(
        partners: PartnerRepository,
        sessions: SessionRepository,
        locks: PartnerLockRegistry,
    ) -> Self {
        Self {
            partners,
            sessions,
            locks,
        }
    }

    /// Transición de disponibilidad pedida por el partner. Serializada
    /// por el lock del partner para no cruzarse con accept/cierres.
    pub async fn set_availability(
        &self,
        partner_id: Uuid,
        target: Availability,
    ) -> AppResult<Partner> {
        let lock = self.locks.lock_for(partner_id).await;
        let _guard = lock.lock().await;

        let mut partner = self
            .partners
            .find_by_id(partner_id)
            .await
            .ok_or_else(|| not_found_error("Partner", &partner_id.to_string()))?;

        let current = partner.availability;
        if current == target {
            return Ok(partner);
        }

        match (current, target) {
            (Availability::Offline, Availability::Online) => {
                if partner.kyc_status != KycStatus::Approved {
                    return Err(AppError::IllegalTransition(format!(
                        "Partner cannot go online with kyc_status '{}'",
                        partner.kyc_status.as_str()
                    )));
                }
            }

            (Availability::Online, Availability::Offline) => {}

            (Availability::OnTrip, Availability::Offline) => {
                // Con una sesión sin confirmar el return no hay salida
                // directa a offline
                if let Some(session_id) = partner.active_session_id {
                    if let Some(session) = self.sessions.find_by_id(session_id).await {
                        if !session.status.is_terminal() {
                            return Err(AppError::IllegalTransition(format!(
                                "Partner holds active session {} in state '{}'; complete or cancel it first",
                                session_id,
                                session.status.as_str()
                            )));
                        }
                    }
                    partner.active_session_id = None;
                }
            }

            // on_trip solo se entra vía aceptación de oferta y solo se
            // sale vía cierre de sesión
            (_, Availability::OnTrip) | (Availability::OnTrip, Availability::Online) => {
                return Err(illegal_transition_error(
                    "Partner",
                    current.as_str(),
                    target.as_str(),
                ));
            }

            // los pares de estados iguales ya retornaron arriba
            _ => {}
        }

        log::info!(
            "🔄 Partner {} pasa de '{}' a '{}'",
            partner.id,
            current.as_str(),
            target.as_str()
        );

        partner.availability = target;
        self.partners.update(partner).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::partner::Partner;

    fn service() -> (AvailabilityService, PartnerRepository, SessionRepository) {
        let partners = PartnerRepository::new();
        let sessions = SessionRepository::new();
        let svc = AvailabilityService::new(
            partners.clone(),
            sessions.clone(),
            PartnerLockRegistry::new(),
        );
        (svc, partners, sessions)
    }

    fn partner() -> Partner {
        Partner::new(
            "Ravi Kumar".to_string(),
            "+919876543210".to_string(),
            "ravi@example.com".to_string(),
            "Mumbai".to_string(),
            "Zone B".to_string(),
            "hash".to_string(),
        )
    }

    #[tokio::test]
    async fn test_pending_kyc_cannot_go_online() {
        let (svc, partners, _) = service();
        let p = partners.create(partner()).await.unwrap();

        let err = svc
            .set_availability(p.id, Availability::Online)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::IllegalTransition(_)));
    }

    #[tokio::test]
    async fn test_approved_partner_goes_online_and_back_offline() {
        let (svc, partners, _) = service();
        let mut p = partner();
        p.kyc_status = KycStatus::Approved;
        let p = partners.create(p).await.unwrap();

        let updated = svc.set_availability(p.id, Availability::Online).await.unwrap();
        assert_eq!(updated.availability, Availability::Online);
        // online implica KYC aprobado
        assert_eq!(updated.kyc_status, KycStatus::Approved);

        let updated = svc.set_availability(p.id, Availability::Offline).await.unwrap();
        assert_eq!(updated.availability, Availability::Offline);
    }

    #[tokio::test]
    async fn test_direct_on_trip_request_is_rejected() {
        let (svc, partners, _) = service();
        let mut p = partner();
        p.kyc_status = KycStatus::Approved;
        let p = partners.create(p).await.unwrap();

        let err = svc
            .set_availability(p.id, Availability::OnTrip)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::IllegalTransition(_)));
    }

    #[tokio::test]
    async fn test_on_trip_with_open_session_cannot_go_offline() {
        use crate::models::session::{Session, SessionStatus};
        use chrono::Utc;

        let (svc, partners, sessions) = service();
        let mut p = partner();
        p.kyc_status = KycStatus::Approved;
        p.availability = Availability::OnTrip;

        let session = Session {
            id: Uuid::new_v4(),
            partner_id: p.id,
            location_id: Uuid::new_v4(),
            vehicle_number: "MH-12-AB-1234".to_string(),
            vehicle_type: "sedan".to_string(),
            slot_number: "A-12".to_string(),
            owner_phone: "+919800000000".to_string(),
            reserved_hours: 2,
            extended_hours: 0,
            status: SessionStatus::Active,
            started_at: Some(Utc::now()),
            scheduled_end_at: Some(Utc::now()),
            pickup_inspection: None,
            return_inspection: None,
            fare: None,
            created_at: Utc::now(),
            completed_at: None,
        };
        p.active_session_id = Some(session.id);

        partners.create(p.clone()).await.unwrap();
        sessions.create(session).await;

        let err = svc
            .set_availability(p.id, Availability::Offline)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::IllegalTransition(_)));
    }

    #[tokio::test]
    async fn test_same_state_is_a_noop() {
        let (svc, partners, _) = service();
        let p = partners.create(partner()).await.unwrap();

        let updated = svc.set_availability(p.id, Availability::Offline).await.unwrap();
        assert_eq!(updated.availability, Availability::Offline);
    }
}
