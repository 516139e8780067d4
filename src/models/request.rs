//! Modelo de ParkingRequest y Offer
//!
//! Un request es la propuesta transitoria de un trabajo de valet; una
//! oferta lo vincula a un partner con un deadline fijo de aceptación.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Solicitud de parking pendiente de asignación
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParkingRequest {
    pub id: Uuid,
    pub location_id: Uuid,
    pub vehicle_number: String,
    pub vehicle_type: String,
    /// Teléfono del dueño, necesario para los OTP de handover
    pub owner_phone: String,
    pub user_location: String,
    pub reserved_hours: u32,
    pub estimated_earnings: Decimal,
    pub distance_km: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Estado de una oferta
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OfferStatus {
    Offered,
    Accepted,
    Rejected,
    Expired,
}

impl OfferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferStatus::Offered => "offered",
            OfferStatus::Accepted => "accepted",
            OfferStatus::Rejected => "rejected",
            OfferStatus::Expired => "expired",
        }
    }
}

/// Handle de oferta: un request propuesto a un partner concreto con
/// ventana de aceptación acotada
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub id: Uuid,
    pub request: ParkingRequest,
    pub partner_id: Uuid,
    pub status: OfferStatus,
    pub offered_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
}

impl Offer {
    pub fn new(request: ParkingRequest, partner_id: Uuid, window_secs: u64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            request,
            partner_id,
            status: OfferStatus::Offered,
            offered_at: now,
            deadline: now + Duration::seconds(window_secs as i64),
        }
    }

    pub fn is_past_deadline(&self, now: DateTime<Utc>) -> bool {
        now >= self.deadline
    }

    /// Segundos restantes de la ventana de aceptación
    pub fn seconds_left(&self, now: DateTime<Utc>) -> i64 {
        (self.deadline - now).num_seconds().max(0)
    }
}
