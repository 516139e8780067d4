//! DTOs del gate de despacho

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::request::Offer;

/// Request del despachador: proponer un trabajo a un partner
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOfferRequest {
    pub partner_id: Uuid,

    pub location_id: Uuid,

    #[validate(length(min = 4, max = 20))]
    pub vehicle_number: String,

    #[validate(length(min = 2, max = 30))]
    pub vehicle_type: String,

    #[validate(custom = "crate::utils::validation::validate_phone")]
    pub owner_phone: String,

    #[validate(length(min = 2, max = 200))]
    pub user_location: String,

    #[validate(range(min = 1, max = 48))]
    pub reserved_hours: u32,

    pub estimated_earnings: Decimal,

    pub distance_km: Decimal,
}

/// Response de oferta para la API
#[derive(Debug, Serialize)]
pub struct OfferResponse {
    pub id: String,
    pub status: String,
    pub vehicle_number: String,
    pub vehicle_type: String,
    pub user_location: String,
    pub reserved_hours: u32,
    pub estimated_earnings: String,
    pub distance_km: String,
    pub offered_at: String,
    pub deadline: String,
    pub seconds_left: i64,
}

impl From<Offer> for OfferResponse {
    fn from(offer: Offer) -> Self {
        let seconds_left = offer.seconds_left(Utc::now());
        Self {
            id: offer.id.to_string(),
            status: offer.status.as_str().to_string(),
            vehicle_number: offer.request.vehicle_number,
            vehicle_type: offer.request.vehicle_type,
            user_location: offer.request.user_location,
            reserved_hours: offer.request.reserved_hours,
            estimated_earnings: offer.request.estimated_earnings.to_string(),
            distance_km: offer.request.distance_km.to_string(),
            offered_at: offer.offered_at.to_rfc3339(),
            deadline: offer.deadline.to_rfc3339(),
            seconds_left,
        }
    }
}
