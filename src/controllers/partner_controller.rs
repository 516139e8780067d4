//! Controller de partner
//!
//! Toggle de disponibilidad y agregado del dashboard.

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::dto::partner_dto::{
    ApiResponse, DashboardResponse, PartnerResponse, SetAvailabilityRequest,
};
use crate::models::earnings::TransactionStatus;
use crate::models::partner::Availability;
use crate::repositories::earnings_repository::EarningsRepository;
use crate::repositories::location_repository::LocationRepository;
use crate::repositories::session_repository::SessionRepository;
use crate::services::availability_service::AvailabilityService;
use crate::services::dispatch_service::DispatchService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub struct PartnerController {
    availability: AvailabilityService,
    sessions: SessionRepository,
    locations: LocationRepository,
    earnings: EarningsRepository,
    dispatch: DispatchService,
}

impl PartnerController {
    pub fn new(state: &AppState) -> Self {
        Self {
            availability: state.availability.clone(),
            sessions: state.sessions.clone(),
            locations: state.locations.clone(),
            earnings: state.earnings.clone(),
            dispatch: state.dispatch.clone(),
        }
    }

    /// Cambiar la disponibilidad del partner
    pub async fn set_availability(
        &self,
        partner_id: Uuid,
        request: SetAvailabilityRequest,
    ) -> Result<ApiResponse<PartnerResponse>, AppError> {
        let target = Availability::from_str(&request.availability).ok_or_else(|| {
            AppError::BadRequest(format!(
                "Unknown availability '{}'",
                request.availability
            ))
        })?;

        let partner = self.availability.set_availability(partner_id, target).await?;

        Ok(ApiResponse::success_with_message(
            PartnerResponse::from(partner),
            "Disponibilidad actualizada exitosamente".to_string(),
        ))
    }

    /// Agregado del dashboard: earnings de hoy, sesiones abiertas,
    /// slots disponibles y ofertas pendientes
    pub async fn dashboard(&self, partner_id: Uuid) -> Result<DashboardResponse, AppError> {
        let today = Utc::now().date_naive();

        let earnings_today: Decimal = self
            .earnings
            .list_transactions(partner_id)
            .await
            .iter()
            .filter(|t| t.status == TransactionStatus::Completed)
            .filter(|t| t.created_at.date_naive() == today)
            .map(|t| t.amount)
            .sum();

        let active_sessions = self.sessions.list_open_by_partner(partner_id).await.len();

        let available_slots: u32 = self
            .locations
            .list_by_partner(partner_id)
            .await
            .iter()
            .filter(|l| l.is_active)
            .map(|l| l.available_slots())
            .sum();

        let pending_requests = match self.dispatch.current_offer(partner_id).await? {
            Some(_) => 1,
            None => 0,
        };

        Ok(DashboardResponse {
            earnings_today: earnings_today.to_string(),
            active_sessions,
            available_slots,
            pending_requests,
        })
    }
}
