//! Ciclo de vida de sesiones
//!
//! pickup_pending → active → return_pending → {completed, disputed}.
//! Las confirmaciones de handover exigen inspección completa más OTP
//! del dueño del vehículo; el vencimiento de la reserva lo dispara un
//! timer cancelable ligado a la sesión.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use tokio::time::sleep;
use uuid::Uuid;

use crate::models::auth::OtpPurpose;
use crate::models::earnings::{EarningsTransaction, TransactionStatus};
use crate::models::partner::Availability;
use crate::models::session::{InspectionRecord, Session, SessionStatus};
use crate::repositories::earnings_repository::EarningsRepository;
use crate::repositories::location_repository::LocationRepository;
use crate::repositories::partner_repository::PartnerRepository;
use crate::repositories::session_repository::SessionRepository;
use crate::services::collaborators::OtpProvider;
use crate::services::partner_locks::PartnerLockRegistry;
use crate::services::retry::with_backoff;
use crate::utils::errors::{
    illegal_transition_error, not_found_error, validation_error, AppError, AppResult,
};

/// Desglose de la tarifa de una sesión
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FareBreakdown {
    pub billed_hours: u32,
    pub extra_hours: u32,
    pub fare: Decimal,
}

/// Tarifa de una sesión: las horas facturadas son el techo de las horas
/// transcurridas, nunca por debajo de la duración mínima de la
/// ubicación; las horas extra son las facturadas por encima de la
/// reserva.
pub fn compute_fare(
    base_rate: Decimal,
    extension_rate: Decimal,
    min_duration_hours: u32,
    reserved_hours: u32,
    elapsed: Duration,
) -> FareBreakdown {
    let secs = elapsed.num_seconds().max(0) as u64;
    let billed_hours = (secs.div_ceil(3600) as u32).max(min_duration_hours);
    let extra_hours = billed_hours.saturating_sub(reserved_hours);

    let fare = base_rate * Decimal::from(billed_hours)
        + extension_rate * Decimal::from(extra_hours);

    FareBreakdown {
        billed_hours,
        extra_hours,
        fare,
    }
}

#[derive(Clone)]
pub struct SessionService {
    partners: PartnerRepository,
    sessions: SessionRepository,
    locations: LocationRepository,
    earnings: EarningsRepository,
    otp: Arc<dyn OtpProvider>,
    locks: PartnerLockRegistry,
    retry_max: u32,
    retry_base: StdDuration,
}

impl SessionService {
    pub fn new(
        partners: PartnerRepository,
        sessions: SessionRepository,
        locations: LocationRepository,
        earnings: EarningsRepository,
        otp: Arc<dyn OtpProvider>,
        locks: PartnerLockRegistry,
        retry_max: u32,
        retry_base: StdDuration,
    ) -> Self {
        Self {
            partners,
            sessions,
            locations,
            earnings,
            otp,
            locks,
            retry_max,
            retry_base,
        }
    }

    async fn owned_session(&self, partner_id: Uuid, session_id: Uuid) -> AppResult<Session> {
        let session = self
            .sessions
            .find_by_id(session_id)
            .await
            .ok_or_else(|| not_found_error("Session", &session_id.to_string()))?;

        if session.partner_id != partner_id {
            return Err(AppError::Forbidden(
                "Session belongs to another partner".to_string(),
            ));
        }

        Ok(session)
    }

    /// Enviar el OTP de confirmación al dueño del vehículo. El propósito
    /// depende de la fase de la sesión.
    pub async fn request_handover_otp(
        &self,
        partner_id: Uuid,
        session_id: Uuid,
    ) -> AppResult<Uuid> {
        let session = self.owned_session(partner_id, session_id).await?;

        let purpose = match session.status {
            SessionStatus::PickupPending => OtpPurpose::Handover,
            SessionStatus::ReturnPending => OtpPurpose::Return,
            other => {
                return Err(AppError::IllegalTransition(format!(
                    "No handover confirmation applies in state '{}'",
                    other.as_str()
                )))
            }
        };

        with_backoff("otp.send", self.retry_max, self.retry_base, || {
            self.otp.send(&session.owner_phone, purpose)
        })
        .await
    }

    async fn verify_owner_otp(&self, challenge_id: Uuid, code: &str) -> AppResult<()> {
        let verified = with_backoff("otp.verify", self.retry_max, self.retry_base, || {
            self.otp.verify(challenge_id, code)
        })
        .await?;

        if !verified {
            return Err(AppError::BadRequest(
                "Invalid or expired OTP code".to_string(),
            ));
        }
        Ok(())
    }

    /// pickup_pending → active. Exige inspección completa y OTP del
    /// dueño; arma el timer de vencimiento de la reserva.
    pub async fn confirm_pickup(
        &self,
        partner_id: Uuid,
        session_id: Uuid,
        inspection: InspectionRecord,
        challenge_id: Uuid,
        code: &str,
    ) -> AppResult<Session> {
        let lock = self.locks.lock_for(partner_id).await;
        let _guard = lock.lock().await;

        let mut session = self.owned_session(partner_id, session_id).await?;

        if session.status != SessionStatus::PickupPending {
            return Err(illegal_transition_error(
                "Session",
                session.status.as_str(),
                SessionStatus::Active.as_str(),
            ));
        }

        if !inspection.is_complete() {
            return Err(validation_error(
                "images",
                "all six inspection images are required",
            ));
        }

        self.verify_owner_otp(challenge_id, code).await?;

        let now = Utc::now();
        session.status = SessionStatus::Active;
        session.started_at = Some(now);
        session.scheduled_end_at =
            Some(now + Duration::hours(session.total_reserved_hours() as i64));
        session.pickup_inspection = Some(inspection);

        log::info!(
            "🚗 Handover confirmado: sesión {} activa hasta {:?}",
            session.id,
            session.scheduled_end_at
        );

        let session = self.sessions.update(session).await?;
        self.arm_deadline_timer(session.id);
        Ok(session)
    }

    /// Timer de vencimiento de la reserva. Duerme hasta el fin
    /// programado y re-lee la sesión al despertar: una extensión lo
    /// hace dormir de nuevo y un cierre previo lo vuelve inofensivo.
    pub fn arm_deadline_timer(&self, session_id: Uuid) {
        let svc = self.clone();

        tokio::spawn(async move {
            loop {
                let session = match svc.sessions.find_by_id(session_id).await {
                    Some(session) => session,
                    None => return,
                };

                if session.status != SessionStatus::Active {
                    return;
                }

                let end = match session.scheduled_end_at {
                    Some(end) => end,
                    None => return,
                };

                let now = Utc::now();
                if now < end {
                    let wait = (end - now).to_std().unwrap_or_default();
                    sleep(wait).await;
                    continue;
                }

                // Vencida: transicionar bajo el lock del partner
                let lock = svc.locks.lock_for(session.partner_id).await;
                let _guard = lock.lock().await;

                let mut current = match svc.sessions.find_by_id(session_id).await {
                    Some(session) => session,
                    None => return,
                };

                if current.status != SessionStatus::Active {
                    return;
                }

                if let Some(end) = current.scheduled_end_at {
                    // Extendida mientras esperábamos el lock
                    if Utc::now() < end {
                        continue;
                    }
                }

                current.status = SessionStatus::ReturnPending;
                if svc.sessions.update(current).await.is_ok() {
                    log::info!("⏰ Sesión {} venció su reserva, pasa a return_pending", session_id);
                }
                return;
            }
        });
    }

    /// Return anticipado iniciado por el partner: active → return_pending
    pub async fn begin_return(&self, partner_id: Uuid, session_id: Uuid) -> AppResult<Session> {
        let lock = self.locks.lock_for(partner_id).await;
        let _guard = lock.lock().await;

        let mut session = self.owned_session(partner_id, session_id).await?;

        if session.status != SessionStatus::Active {
            return Err(illegal_transition_error(
                "Session",
                session.status.as_str(),
                SessionStatus::ReturnPending.as_str(),
            ));
        }

        session.status = SessionStatus::ReturnPending;
        self.sessions.update(session).await
    }

    /// Extender la reserva de una sesión activa
    pub async fn extend_session(
        &self,
        partner_id: Uuid,
        session_id: Uuid,
        hours: u32,
    ) -> AppResult<Session> {
        let lock = self.locks.lock_for(partner_id).await;
        let _guard = lock.lock().await;

        let mut session = self.owned_session(partner_id, session_id).await?;

        if session.status != SessionStatus::Active {
            return Err(AppError::IllegalTransition(format!(
                "Session in state '{}' cannot be extended",
                session.status.as_str()
            )));
        }

        session.extended_hours += hours;
        session.scheduled_end_at = session
            .scheduled_end_at
            .map(|end| end + Duration::hours(hours as i64));

        log::info!(
            "➕ Sesión {} extendida {}h, nuevo fin {:?}",
            session.id,
            hours,
            session.scheduled_end_at
        );

        self.sessions.update(session).await
    }

    /// return_pending → {completed, disputed}. Inspección simétrica más
    /// OTP; calcula la tarifa, libera el slot, devuelve al partner al
    /// pool y registra la transacción.
    pub async fn confirm_return(
        &self,
        partner_id: Uuid,
        session_id: Uuid,
        inspection: InspectionRecord,
        challenge_id: Uuid,
        code: &str,
    ) -> AppResult<Session> {
        let lock = self.locks.lock_for(partner_id).await;
        let _guard = lock.lock().await;

        let mut session = self.owned_session(partner_id, session_id).await?;

        if session.status != SessionStatus::ReturnPending {
            return Err(illegal_transition_error(
                "Session",
                session.status.as_str(),
                SessionStatus::Completed.as_str(),
            ));
        }

        if !inspection.is_complete() {
            return Err(validation_error(
                "images",
                "all six inspection images are required",
            ));
        }

        let pickup = session
            .pickup_inspection
            .clone()
            .ok_or_else(|| AppError::Internal("Session has no pickup inspection".to_string()))?;

        let started_at = session
            .started_at
            .ok_or_else(|| AppError::Internal("Session has no start time".to_string()))?;

        let location = self
            .locations
            .find_by_id(session.location_id)
            .await
            .ok_or_else(|| not_found_error("ParkingLocation", &session.location_id.to_string()))?;

        self.verify_owner_otp(challenge_id, code).await?;

        let now = Utc::now();
        let breakdown = compute_fare(
            location.base_rate,
            location.extension_rate,
            location.min_duration_hours,
            session.total_reserved_hours(),
            now - started_at,
        );

        let new_damage = inspection.new_damage_since(&pickup);
        let disputed = !new_damage.is_empty();

        session.return_inspection = Some(inspection);
        session.fare = Some(breakdown.fare);
        session.completed_at = Some(now);
        session.status = if disputed {
            log::warn!(
                "⚠️ Sesión {} en disputa, daños nuevos: {:?}",
                session.id,
                new_damage
            );
            SessionStatus::Disputed
        } else {
            log::info!(
                "✅ Sesión {} completada, tarifa {} ({}h facturadas)",
                session.id,
                breakdown.fare,
                breakdown.billed_hours
            );
            SessionStatus::Completed
        };

        let session = self.sessions.update(session).await?;

        self.locations.release_slot(session.location_id).await?;

        let mut partner = self
            .partners
            .find_by_id(partner_id)
            .await
            .ok_or_else(|| not_found_error("Partner", &partner_id.to_string()))?;
        partner.availability = Availability::Online;
        partner.active_session_id = None;
        self.partners.update(partner).await?;

        self.earnings
            .record_transaction(EarningsTransaction {
                id: Uuid::new_v4(),
                partner_id,
                session_id: session.id,
                vehicle_number: session.vehicle_number.clone(),
                amount: breakdown.fare,
                duration_hours: breakdown.billed_hours,
                status: if disputed {
                    TransactionStatus::Disputed
                } else {
                    TransactionStatus::Completed
                },
                created_at: now,
            })
            .await;

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::location::ParkingLocation;
    use crate::models::partner::{KycStatus, Partner};
    use crate::models::session::InspectionImageKind;
    use crate::services::collaborators::SimulatedOtpProvider;
    use std::collections::HashMap;

    struct Harness {
        svc: SessionService,
        partners: PartnerRepository,
        sessions: SessionRepository,
        locations: LocationRepository,
        earnings: EarningsRepository,
        otp: Arc<SimulatedOtpProvider>,
    }

    fn harness() -> Harness {
        let partners = PartnerRepository::new();
        let sessions = SessionRepository::new();
        let locations = LocationRepository::new();
        let earnings = EarningsRepository::new();
        let otp = Arc::new(SimulatedOtpProvider::new(StdDuration::from_secs(300)));

        let svc = SessionService::new(
            partners.clone(),
            sessions.clone(),
            locations.clone(),
            earnings.clone(),
            otp.clone(),
            PartnerLockRegistry::new(),
            3,
            StdDuration::from_millis(1),
        );

        Harness {
            svc,
            partners,
            sessions,
            locations,
            earnings,
            otp,
        }
    }

    fn inspection(damage: &[&str]) -> InspectionRecord {
        let mut images = HashMap::new();
        for kind in InspectionImageKind::required() {
            images.insert(kind, format!("doc_{}", kind.as_str()));
        }
        InspectionRecord {
            images,
            fuel_level: 50,
            odometer_km: 15000,
            damage_markers: damage.iter().map(|d| d.to_string()).collect(),
            recorded_at: Utc::now(),
        }
    }

    async fn seed(h: &Harness) -> (Partner, ParkingLocation, Session) {
        let mut partner = Partner::new(
            "Meera Shah".to_string(),
            "+919811111111".to_string(),
            "meera@example.com".to_string(),
            "Mumbai".to_string(),
            "Zone A".to_string(),
            "hash".to_string(),
        );
        partner.kyc_status = KycStatus::Approved;
        partner.availability = Availability::OnTrip;

        let location = ParkingLocation {
            id: Uuid::new_v4(),
            partner_id: partner.id,
            name: "Central Plaza Parking".to_string(),
            address: "123 Main St".to_string(),
            total_slots: 20,
            occupied_slots: 1,
            base_rate: Decimal::from(50),
            min_duration_hours: 1,
            extension_rate: Decimal::from(75),
            vehicle_types: vec!["car".to_string()],
            is_active: true,
            created_at: Utc::now(),
        };

        let session = Session {
            id: Uuid::new_v4(),
            partner_id: partner.id,
            location_id: location.id,
            vehicle_number: "MH-12-AB-1234".to_string(),
            vehicle_type: "sedan".to_string(),
            slot_number: "A-12".to_string(),
            owner_phone: "+919800000000".to_string(),
            reserved_hours: 2,
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
        partner.active_session_id = Some(session.id);

        let partner = h.partners.create(partner).await.unwrap();
        let location = h.locations.create(location).await;
        let session = h.sessions.create(session).await;
        (partner, location, session)
    }

    async fn owner_otp(h: &Harness, session: &Session) -> (Uuid, String) {
        let challenge_id = h
            .svc
            .request_handover_otp(session.partner_id, session.id)
            .await
            .unwrap();
        let code = h.otp.peek_code(challenge_id).await.unwrap();
        (challenge_id, code)
    }

    #[test]
    fn test_fare_with_extension_increment() {
        // Reservadas 2h, devuelta a las 2h40m: 3 facturadas, 1 extra
        let breakdown = compute_fare(
            Decimal::from(50),
            Decimal::from(75),
            1,
            2,
            Duration::minutes(160),
        );
        assert_eq!(breakdown.billed_hours, 3);
        assert_eq!(breakdown.extra_hours, 1);
        assert_eq!(breakdown.fare, Decimal::from(225));
    }

    #[test]
    fn test_fare_respects_minimum_duration() {
        let breakdown = compute_fare(
            Decimal::from(50),
            Decimal::from(75),
            2,
            2,
            Duration::minutes(20),
        );
        assert_eq!(breakdown.billed_hours, 2);
        assert_eq!(breakdown.extra_hours, 0);
        assert!(breakdown.fare >= Decimal::from(50) * Decimal::from(2u32));
    }

    #[test]
    fn test_fare_exact_hours_have_no_extra() {
        let breakdown = compute_fare(
            Decimal::from(60),
            Decimal::from(80),
            1,
            4,
            Duration::hours(4),
        );
        assert_eq!(breakdown.billed_hours, 4);
        assert_eq!(breakdown.extra_hours, 0);
        assert_eq!(breakdown.fare, Decimal::from(240));
    }

    #[tokio::test]
    async fn test_confirm_pickup_requires_complete_inspection() {
        let h = harness();
        let (partner, _, session) = seed(&h).await;
        let (challenge_id, code) = owner_otp(&h, &session).await;

        let mut incomplete = inspection(&[]);
        incomplete.images.remove(&InspectionImageKind::Dashboard);

        let err = h
            .svc
            .confirm_pickup(partner.id, session.id, incomplete, challenge_id, &code)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_confirm_pickup_rejects_wrong_otp() {
        let h = harness();
        let (partner, _, session) = seed(&h).await;
        let (challenge_id, code) = owner_otp(&h, &session).await;
        let wrong = if code == "000000" { "000001" } else { "000000" };

        let err = h
            .svc
            .confirm_pickup(partner.id, session.id, inspection(&[]), challenge_id, wrong)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let current = h.sessions.find_by_id(session.id).await.unwrap();
        assert_eq!(current.status, SessionStatus::PickupPending);
    }

    #[tokio::test]
    async fn test_full_lifecycle_completes_with_fare() {
        let h = harness();
        let (partner, location, session) = seed(&h).await;

        let (challenge_id, code) = owner_otp(&h, &session).await;
        let active = h
            .svc
            .confirm_pickup(
                partner.id,
                session.id,
                inspection(&["scratch-left-door"]),
                challenge_id,
                &code,
            )
            .await
            .unwrap();
        assert_eq!(active.status, SessionStatus::Active);
        assert!(active.scheduled_end_at.is_some());

        h.svc.begin_return(partner.id, session.id).await.unwrap();

        let (challenge_id, code) = owner_otp(&h, &session).await;
        let done = h
            .svc
            .confirm_return(
                partner.id,
                session.id,
                inspection(&["scratch-left-door"]),
                challenge_id,
                &code,
            )
            .await
            .unwrap();

        assert_eq!(done.status, SessionStatus::Completed);
        // Un retorno inmediato factura la duración mínima
        assert_eq!(done.fare, Some(Decimal::from(50)));
        assert!(done.fare.unwrap() >= location.base_rate * Decimal::from(location.min_duration_hours));

        let partner = h.partners.find_by_id(partner.id).await.unwrap();
        assert_eq!(partner.availability, Availability::Online);
        assert_eq!(partner.active_session_id, None);

        let location = h.locations.find_by_id(location.id).await.unwrap();
        assert_eq!(location.occupied_slots, 0);

        let transactions = h.earnings.list_transactions(partner.id).await;
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].status, TransactionStatus::Completed);
    }

    #[tokio::test]
    async fn test_new_damage_at_return_disputes_session() {
        let h = harness();
        let (partner, _, session) = seed(&h).await;

        let (challenge_id, code) = owner_otp(&h, &session).await;
        h.svc
            .confirm_pickup(partner.id, session.id, inspection(&[]), challenge_id, &code)
            .await
            .unwrap();

        h.svc.begin_return(partner.id, session.id).await.unwrap();

        let (challenge_id, code) = owner_otp(&h, &session).await;
        let done = h
            .svc
            .confirm_return(
                partner.id,
                session.id,
                inspection(&["dent-rear-bumper"]),
                challenge_id,
                &code,
            )
            .await
            .unwrap();

        assert_eq!(done.status, SessionStatus::Disputed);

        let transactions = h.earnings.list_transactions(partner.id).await;
        assert_eq!(transactions[0].status, TransactionStatus::Disputed);
    }

    #[tokio::test]
    async fn test_return_confirmation_requires_return_pending() {
        let h = harness();
        let (partner, _, session) = seed(&h).await;
        let (challenge_id, code) = owner_otp(&h, &session).await;

        // Aún en pickup_pending: el return directo es ilegal
        let err = h
            .svc
            .confirm_return(partner.id, session.id, inspection(&[]), challenge_id, &code)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::IllegalTransition(_)));
    }

    #[tokio::test]
    async fn test_deadline_timer_fires_and_is_idempotent() {
        let h = harness();
        let (_partner, _, session) = seed(&h).await;

        let mut active = session.clone();
        active.status = SessionStatus::Active;
        active.started_at = Some(Utc::now());
        active.scheduled_end_at = Some(Utc::now() + Duration::milliseconds(100));
        h.sessions.update(active).await.unwrap();

        h.svc.arm_deadline_timer(session.id);
        tokio::time::sleep(StdDuration::from_millis(400)).await;

        let current = h.sessions.find_by_id(session.id).await.unwrap();
        assert_eq!(current.status, SessionStatus::ReturnPending);
    }

    #[tokio::test]
    async fn test_extension_pushes_deadline_forward() {
        let h = harness();
        let (partner, _, session) = seed(&h).await;

        let mut active = session.clone();
        active.status = SessionStatus::Active;
        active.started_at = Some(Utc::now());
        active.scheduled_end_at = Some(Utc::now() + Duration::milliseconds(250));
        h.sessions.update(active).await.unwrap();

        h.svc.arm_deadline_timer(session.id);
        h.svc.extend_session(partner.id, session.id, 1).await.unwrap();

        tokio::time::sleep(StdDuration::from_millis(500)).await;

        let current = h.sessions.find_by_id(session.id).await.unwrap();
        assert_eq!(current.status, SessionStatus::Active);
        assert_eq!(current.extended_hours, 1);
    }
}
