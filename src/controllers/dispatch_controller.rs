//! Controller del gate de despacho
//!
//! Creación de ofertas por el despachador y accept/reject del partner.

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::dto::partner_dto::ApiResponse;
use crate::dto::request_dto::{CreateOfferRequest, OfferResponse};
use crate::dto::session_dto::SessionResponse;
use crate::models::request::ParkingRequest;
use crate::services::dispatch_service::DispatchService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub struct DispatchController {
    dispatch: DispatchService,
}

impl DispatchController {
    pub fn new(state: &AppState) -> Self {
        Self {
            dispatch: state.dispatch.clone(),
        }
    }

    /// Proponer un request a un partner online
    pub async fn create_offer(
        &self,
        request: CreateOfferRequest,
    ) -> Result<ApiResponse<OfferResponse>, AppError> {
        request.validate()?;

        let parking_request = ParkingRequest {
            id: Uuid::new_v4(),
            location_id: request.location_id,
            vehicle_number: request.vehicle_number,
            vehicle_type: request.vehicle_type,
            owner_phone: request.owner_phone,
            user_location: request.user_location,
            reserved_hours: request.reserved_hours,
            estimated_earnings: request.estimated_earnings,
            distance_km: request.distance_km,
            created_at: Utc::now(),
        };

        let offer = self.dispatch.offer(parking_request, request.partner_id).await?;

        Ok(ApiResponse::success_with_message(
            OfferResponse::from(offer),
            "Oferta propuesta exitosamente".to_string(),
        ))
    }

    /// Oferta pendiente del partner autenticado
    pub async fn current(&self, partner_id: Uuid) -> Result<Option<OfferResponse>, AppError> {
        let offer = self.dispatch.current_offer(partner_id).await?;
        Ok(offer.map(OfferResponse::from))
    }

    /// Aceptar la oferta: produce la sesión en pickup_pending
    pub async fn accept(
        &self,
        partner_id: Uuid,
        offer_id: Uuid,
    ) -> Result<ApiResponse<SessionResponse>, AppError> {
        let session = self.dispatch.accept(offer_id, partner_id).await?;

        Ok(ApiResponse::success_with_message(
            SessionResponse::from(session),
            "Oferta aceptada exitosamente".to_string(),
        ))
    }

    /// Rechazar la oferta y volver al pool
    pub async fn reject(
        &self,
        partner_id: Uuid,
        offer_id: Uuid,
    ) -> Result<ApiResponse<OfferResponse>, AppError> {
        let offer = self.dispatch.reject(offer_id, partner_id).await?;

        Ok(ApiResponse::success_with_message(
            OfferResponse::from(offer),
            "Oferta rechazada".to_string(),
        ))
    }
}
