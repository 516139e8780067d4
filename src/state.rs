//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum: los almacenes en memoria, los servicios
//! de dominio y los colaboradores externos.

use std::sync::Arc;
use std::time::Duration;

use crate::config::EnvironmentConfig;
use crate::repositories::earnings_repository::EarningsRepository;
use crate::repositories::kyc_repository::KycRepository;
use crate::repositories::location_repository::LocationRepository;
use crate::repositories::partner_repository::PartnerRepository;
use crate::repositories::session_repository::SessionRepository;
use crate::repositories::support_repository::SupportRepository;
use crate::services::availability_service::AvailabilityService;
use crate::services::collaborators::{
    DocumentStorage, InMemoryDocumentStorage, OtpProvider, PayoutProvider, SimulatedOtpProvider,
    SimulatedPayoutProvider,
};
use crate::services::dispatch_service::DispatchService;
use crate::services::jwt_service::JwtService;
use crate::services::kyc_service::KycService;
use crate::services::partner_locks::PartnerLockRegistry;
use crate::services::session_service::SessionService;

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub partners: PartnerRepository,
    pub sessions: SessionRepository,
    pub locations: LocationRepository,
    pub earnings: EarningsRepository,
    pub support: SupportRepository,
    pub jwt: Arc<JwtService>,
    pub otp: Arc<dyn OtpProvider>,
    pub documents: Arc<dyn DocumentStorage>,
    pub payouts: Arc<dyn PayoutProvider>,
    pub availability: AvailabilityService,
    pub kyc: KycService,
    pub session_service: SessionService,
    pub dispatch: DispatchService,
}

impl AppState {
    /// Estado con los colaboradores simulados por defecto
    pub fn new(config: EnvironmentConfig) -> Self {
        let otp = Arc::new(SimulatedOtpProvider::new(Duration::from_secs(
            config.otp_ttl_secs,
        )));
        Self::with_collaborators(
            config,
            otp,
            Arc::new(InMemoryDocumentStorage::new()),
            Arc::new(SimulatedPayoutProvider::new()),
        )
    }

    /// Estado con colaboradores inyectados (tests y despliegues reales)
    pub fn with_collaborators(
        config: EnvironmentConfig,
        otp: Arc<dyn OtpProvider>,
        documents: Arc<dyn DocumentStorage>,
        payouts: Arc<dyn PayoutProvider>,
    ) -> Self {
        let partners = PartnerRepository::new();
        let kyc_submissions = KycRepository::new();
        let sessions = SessionRepository::new();
        let locations = LocationRepository::new();
        let earnings = EarningsRepository::new();
        let support = SupportRepository::new();
        let locks = PartnerLockRegistry::new();
        let jwt = Arc::new(JwtService::new(&config));

        let retry_max = config.external_retry_max;
        let retry_base = Duration::from_millis(config.external_retry_base_ms);

        let availability =
            AvailabilityService::new(partners.clone(), sessions.clone(), locks.clone());

        let kyc = KycService::new(
            partners.clone(),
            kyc_submissions,
            documents.clone(),
            locks.clone(),
            retry_max,
            retry_base,
        );

        let session_service = SessionService::new(
            partners.clone(),
            sessions.clone(),
            locations.clone(),
            earnings.clone(),
            otp.clone(),
            locks.clone(),
            retry_max,
            retry_base,
        );

        let dispatch = DispatchService::new(
            partners.clone(),
            sessions.clone(),
            locations.clone(),
            locks,
            config.offer_window_secs,
        );

        Self {
            config,
            partners,
            sessions,
            locations,
            earnings,
            support,
            jwt,
            otp,
            documents,
            payouts,
            availability,
            kyc,
            session_service,
            dispatch,
        }
    }
}
