//! Gate de despacho de requests
//!
//! Ofrece un ParkingRequest a un partner online con ventana de
//! aceptación acotada. El handle de la oferta se consume una sola vez:
//! accept lo convierte atómicamente en sesión, reject devuelve al
//! partner al pool y el timer de expiración es inofensivo si llega
//! tarde.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Utc;
use tokio::sync::RwLock;
use tokio::time::sleep;
use uuid::Uuid;

use crate::models::partner::Availability;
use crate::models::request::{Offer, OfferStatus, ParkingRequest};
use crate::models::session::{Session, SessionStatus};
use crate::repositories::location_repository::LocationRepository;
use crate::repositories::partner_repository::PartnerRepository;
use crate::repositories::session_repository::SessionRepository;
use crate::services::partner_locks::PartnerLockRegistry;
use crate::utils::errors::{not_found_error, AppError, AppResult};

#[derive(Clone)]
pub struct DispatchService {
    offers: Arc<RwLock<HashMap<Uuid, Offer>>>,
    partners: PartnerRepository,
    sessions: SessionRepository,
    locations: LocationRepository,
    locks: PartnerLockRegistry,
    offer_window_secs: u64,
}

impl DispatchService {
    pub fn new(
        partners: PartnerRepository,
        sessions: SessionRepository,
        locations: LocationRepository,
        locks: PartnerLockRegistry,
        offer_window_secs: u64,
    ) -> Self {
        Self {
            offers: Arc::new(RwLock::new(HashMap::new())),
            partners,
            sessions,
            locations,
            locks,
            offer_window_secs,
        }
    }

    /// Proponer un request a un partner. Solo válido con el partner
    /// online y sin otra oferta pendiente.
    pub async fn offer(&self, request: ParkingRequest, partner_id: Uuid) -> AppResult<Offer> {
        let lock = self.locks.lock_for(partner_id).await;
        let _guard = lock.lock().await;

        let mut partner = self
            .partners
            .find_by_id(partner_id)
            .await
            .ok_or_else(|| not_found_error("Partner", &partner_id.to_string()))?;

        if partner.availability != Availability::Online {
            return Err(AppError::IllegalTransition(format!(
                "Partner in state '{}' cannot receive offers",
                partner.availability.as_str()
            )));
        }

        if partner.pending_offer_id.is_some() {
            return Err(AppError::Conflict(
                "Partner already has an outstanding offer".to_string(),
            ));
        }

        let offer = Offer::new(request, partner_id, self.offer_window_secs);
        self.offers.write().await.insert(offer.id, offer.clone());

        partner.pending_offer_id = Some(offer.id);
        self.partners.update(partner).await?;

        log::info!(
            "📨 Oferta {} propuesta al partner {} (ventana {}s)",
            offer.id,
            partner_id,
            self.offer_window_secs
        );

        // Timer de expiración; el consumo del handle lo cancela de facto
        let svc = self.clone();
        let offer_id = offer.id;
        let window = StdDuration::from_secs(self.offer_window_secs);
        tokio::spawn(async move {
            sleep(window).await;
            svc.expire_offer(offer_id).await;
        });

        Ok(offer)
    }

    /// Expirar una oferta no respondida. Idempotente: un handle ya
    /// consumido deja el timer tardío sin efecto.
    async fn expire_offer(&self, offer_id: Uuid) {
        let partner_id = {
            let offers = self.offers.read().await;
            match offers.get(&offer_id) {
                Some(offer) => offer.partner_id,
                None => return,
            }
        };

        let lock = self.locks.lock_for(partner_id).await;
        let _guard = lock.lock().await;

        {
            let mut offers = self.offers.write().await;
            let offer = match offers.get_mut(&offer_id) {
                Some(offer) => offer,
                None => return,
            };

            if offer.status != OfferStatus::Offered || !offer.is_past_deadline(Utc::now()) {
                return;
            }

            offer.status = OfferStatus::Expired;
        }

        if let Some(mut partner) = self.partners.find_by_id(partner_id).await {
            if partner.pending_offer_id == Some(offer_id) {
                partner.pending_offer_id = None;
                let _ = self.partners.update(partner).await;
            }
        }

        log::info!("⏰ Oferta {} expiró sin respuesta", offer_id);
    }

    /// Aceptar una oferta: la convierte atómicamente en una sesión en
    /// pickup_pending, ocupa un slot y pasa al partner a on_trip.
    pub async fn accept(&self, offer_id: Uuid, partner_id: Uuid) -> AppResult<Session> {
        let lock = self.locks.lock_for(partner_id).await;
        let _guard = lock.lock().await;

        let mut partner = self
            .partners
            .find_by_id(partner_id)
            .await
            .ok_or_else(|| not_found_error("Partner", &partner_id.to_string()))?;

        let mut offers = self.offers.write().await;
        let offer = offers
            .get_mut(&offer_id)
            .ok_or_else(|| not_found_error("Offer", &offer_id.to_string()))?;

        if offer.partner_id != partner_id {
            return Err(AppError::Forbidden(
                "Offer belongs to another partner".to_string(),
            ));
        }

        match offer.status {
            OfferStatus::Offered => {}
            OfferStatus::Expired => {
                return Err(AppError::OfferExpired(
                    "The acceptance window has elapsed".to_string(),
                ))
            }
            OfferStatus::Accepted => {
                return Err(AppError::Conflict(
                    "Offer was already accepted".to_string(),
                ))
            }
            OfferStatus::Rejected => {
                return Err(AppError::Conflict(
                    "Offer was already rejected".to_string(),
                ))
            }
        }

        // El deadline manda aunque el timer no haya disparado todavía
        if offer.is_past_deadline(Utc::now()) {
            offer.status = OfferStatus::Expired;
            partner.pending_offer_id = None;
            self.partners.update(partner).await?;
            return Err(AppError::OfferExpired(
                "The acceptance window has elapsed".to_string(),
            ));
        }

        if partner.availability != Availability::Online {
            return Err(AppError::IllegalTransition(format!(
                "Partner in state '{}' cannot accept offers",
                partner.availability.as_str()
            )));
        }

        // Ocupación atómica del slot; si falla, la oferta queda intacta
        let location = self.locations.occupy_slot(offer.request.location_id).await?;

        let session = Session {
            id: Uuid::new_v4(),
            partner_id,
            location_id: offer.request.location_id,
            vehicle_number: offer.request.vehicle_number.clone(),
            vehicle_type: offer.request.vehicle_type.clone(),
            slot_number: format!("S-{:02}", location.occupied_slots),
            owner_phone: offer.request.owner_phone.clone(),
            reserved_hours: offer.request.reserved_hours,
            extended_hours: 0,
            status: SessionStatus::PickupPending,
            started_at: None,
            scheduled_end_at: None,
            pickup_inspection: None,
            return_inspection: None,
            fare: None,
            created_at: Utc::now(),
            completed_at: None,
        };

        offer.status = OfferStatus::Accepted;
        let session = self.sessions.create(session).await;

        partner.availability = Availability::OnTrip;
        partner.active_session_id = Some(session.id);
        partner.pending_offer_id = None;
        self.partners.update(partner).await?;

        log::info!(
            "🤝 Oferta {} aceptada, sesión {} en pickup_pending",
            offer_id,
            session.id
        );

        Ok(session)
    }

    /// Rechazar una oferta y devolver al partner al pool
    pub async fn reject(&self, offer_id: Uuid, partner_id: Uuid) -> AppResult<Offer> {
        let lock = self.locks.lock_for(partner_id).await;
        let _guard = lock.lock().await;

        let rejected = {
            let mut offers = self.offers.write().await;
            let offer = offers
                .get_mut(&offer_id)
                .ok_or_else(|| not_found_error("Offer", &offer_id.to_string()))?;

            if offer.partner_id != partner_id {
                return Err(AppError::Forbidden(
                    "Offer belongs to another partner".to_string(),
                ));
            }

            match offer.status {
                OfferStatus::Offered => {}
                OfferStatus::Expired => {
                    return Err(AppError::OfferExpired(
                        "The acceptance window has elapsed".to_string(),
                    ))
                }
                other => {
                    return Err(AppError::Conflict(format!(
                        "Offer is already '{}'",
                        other.as_str()
                    )))
                }
            }

            offer.status = OfferStatus::Rejected;
            offer.clone()
        };

        if let Some(mut partner) = self.partners.find_by_id(partner_id).await {
            if partner.pending_offer_id == Some(offer_id) {
                partner.pending_offer_id = None;
                self.partners.update(partner).await?;
            }
        }

        log::info!("🙅 Oferta {} rechazada por el partner {}", offer_id, partner_id);
        Ok(rejected)
    }

    /// Oferta pendiente del partner, si la hay
    pub async fn current_offer(&self, partner_id: Uuid) -> AppResult<Option<Offer>> {
        let partner = self
            .partners
            .find_by_id(partner_id)
            .await
            .ok_or_else(|| not_found_error("Partner", &partner_id.to_string()))?;

        let Some(offer_id) = partner.pending_offer_id else {
            return Ok(None);
        };

        Ok(self.offers.read().await.get(&offer_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::location::ParkingLocation;
    use crate::models::partner::{KycStatus, Partner};
    use rust_decimal::Decimal;

    struct Harness {
        svc: DispatchService,
        partners: PartnerRepository,
        sessions: SessionRepository,
        locations: LocationRepository,
    }

    fn harness(window_secs: u64) -> Harness {
        let partners = PartnerRepository::new();
        let sessions = SessionRepository::new();
        let locations = LocationRepository::new();

        let svc = DispatchService::new(
            partners.clone(),
            sessions.clone(),
            locations.clone(),
            PartnerLockRegistry::new(),
            window_secs,
        );

        Harness {
            svc,
            partners,
            sessions,
            locations,
        }
    }

    async fn online_partner(h: &Harness) -> Partner {
        let mut partner = Partner::new(
            "Arjun Mehta".to_string(),
            "+919822222222".to_string(),
            "arjun@example.com".to_string(),
            "Mumbai".to_string(),
            "Zone C".to_string(),
            "hash".to_string(),
        );
        partner.kyc_status = KycStatus::Approved;
        partner.availability = Availability::Online;
        h.partners.create(partner).await.unwrap()
    }

    async fn seeded_location(h: &Harness, total_slots: u32) -> ParkingLocation {
        h.locations
            .create(ParkingLocation {
                id: Uuid::new_v4(),
                partner_id: Uuid::new_v4(),
                name: "Lake View Parking".to_string(),
                address: "456 Park Ave".to_string(),
                total_slots,
                occupied_slots: 0,
                base_rate: Decimal::from(60),
                min_duration_hours: 1,
                extension_rate: Decimal::from(80),
                vehicle_types: vec!["car".to_string(), "suv".to_string()],
                is_active: true,
                created_at: Utc::now(),
            })
            .await
    }

    fn request(location_id: Uuid) -> ParkingRequest {
        ParkingRequest {
            id: Uuid::new_v4(),
            location_id,
            vehicle_number: "MH-12-CD-5678".to_string(),
            vehicle_type: "suv".to_string(),
            owner_phone: "+919800000001".to_string(),
            user_location: "456 Park Ave".to_string(),
            reserved_hours: 4,
            estimated_earnings: Decimal::from(400),
            distance_km: Decimal::new(25, 1),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_accept_converts_offer_into_session() {
        let h = harness(45);
        let partner = online_partner(&h).await;
        let location = seeded_location(&h, 20).await;

        let offer = h.svc.offer(request(location.id), partner.id).await.unwrap();
        let session = h.svc.accept(offer.id, partner.id).await.unwrap();

        assert_eq!(session.status, SessionStatus::PickupPending);
        assert_eq!(session.reserved_hours, 4);

        let partner = h.partners.find_by_id(partner.id).await.unwrap();
        assert_eq!(partner.availability, Availability::OnTrip);
        assert_eq!(partner.active_session_id, Some(session.id));
        assert_eq!(partner.pending_offer_id, None);

        let location = h.locations.find_by_id(location.id).await.unwrap();
        assert_eq!(location.available_slots(), 19);
    }

    #[tokio::test]
    async fn test_offer_requires_online_partner() {
        let h = harness(45);
        let mut partner = online_partner(&h).await;
        partner.availability = Availability::Offline;
        let partner = h.partners.update(partner).await.unwrap();
        let location = seeded_location(&h, 20).await;

        let err = h.svc.offer(request(location.id), partner.id).await.unwrap_err();
        assert!(matches!(err, AppError::IllegalTransition(_)));
    }

    #[tokio::test]
    async fn test_at_most_one_outstanding_offer() {
        let h = harness(45);
        let partner = online_partner(&h).await;
        let location = seeded_location(&h, 20).await;

        h.svc.offer(request(location.id), partner.id).await.unwrap();
        let err = h.svc.offer(request(location.id), partner.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_accept_past_deadline_fails_with_expiry() {
        let h = harness(0);
        let partner = online_partner(&h).await;
        let location = seeded_location(&h, 20).await;

        let offer = h.svc.offer(request(location.id), partner.id).await.unwrap();
        let err = h.svc.accept(offer.id, partner.id).await.unwrap_err();
        assert!(matches!(err, AppError::OfferExpired(_)));

        // Nunca se produce una sesión por una oferta vencida
        assert!(h.sessions.list_by_partner(partner.id).await.is_empty());

        let partner = h.partners.find_by_id(partner.id).await.unwrap();
        assert_eq!(partner.availability, Availability::Online);
    }

    #[tokio::test]
    async fn test_unacknowledged_offer_auto_expires() {
        let h = harness(1);
        let partner = online_partner(&h).await;
        let location = seeded_location(&h, 20).await;

        let offer = h.svc.offer(request(location.id), partner.id).await.unwrap();
        tokio::time::sleep(StdDuration::from_millis(1300)).await;

        let current = h.svc.current_offer(partner.id).await.unwrap();
        assert!(current.is_none());

        let err = h.svc.accept(offer.id, partner.id).await.unwrap_err();
        assert!(matches!(err, AppError::OfferExpired(_)));

        // Tras la expiración el partner puede recibir una oferta nueva
        h.svc.offer(request(location.id), partner.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_accepts_have_single_winner() {
        let h = harness(45);
        let partner = online_partner(&h).await;
        let location = seeded_location(&h, 20).await;

        let offer = h.svc.offer(request(location.id), partner.id).await.unwrap();

        let attempts = (0..3).map(|_| {
            let svc = h.svc.clone();
            async move { svc.accept(offer.id, partner.id).await }
        });
        let results = futures::future::join_all(attempts).await;

        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);

        for result in results {
            if let Err(err) = result {
                assert!(matches!(err, AppError::Conflict(_)));
            }
        }

        // Exactamente una sesión y un solo slot ocupado
        assert_eq!(h.sessions.list_by_partner(partner.id).await.len(), 1);
        let location = h.locations.find_by_id(location.id).await.unwrap();
        assert_eq!(location.available_slots(), 19);
    }

    #[tokio::test]
    async fn test_reject_returns_partner_to_pool() {
        let h = harness(45);
        let partner = online_partner(&h).await;
        let location = seeded_location(&h, 20).await;

        let offer = h.svc.offer(request(location.id), partner.id).await.unwrap();
        let rejected = h.svc.reject(offer.id, partner.id).await.unwrap();
        assert_eq!(rejected.status, OfferStatus::Rejected);

        let partner = h.partners.find_by_id(partner.id).await.unwrap();
        assert_eq!(partner.availability, Availability::Online);
        assert_eq!(partner.pending_offer_id, None);

        // Y puede recibir la siguiente oferta de inmediato
        h.svc.offer(request(location.id), partner.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_accept_with_full_location_conflicts_and_keeps_offer() {
        let h = harness(45);
        let partner = online_partner(&h).await;
        let location = seeded_location(&h, 1).await;
        h.locations.occupy_slot(location.id).await.unwrap();

        let offer = h.svc.offer(request(location.id), partner.id).await.unwrap();
        let err = h.svc.accept(offer.id, partner.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // La oferta sigue viva: al liberarse cupo, el accept procede
        h.locations.release_slot(location.id).await.unwrap();
        let session = h.svc.accept(offer.id, partner.id).await.unwrap();
        assert_eq!(session.status, SessionStatus::PickupPending);
    }
}
