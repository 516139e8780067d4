//! Modelo de Partner
//!
//! Este módulo contiene el struct Partner y los enums de estado KYC y
//! disponibilidad. La disponibilidad es un tri-estado canónico, sin
//! boolean sombra.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Estado de verificación KYC del partner
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum KycStatus {
    Pending,
    Approved,
    Rejected,
}

impl KycStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            KycStatus::Pending => "pending",
            KycStatus::Approved => "approved",
            KycStatus::Rejected => "rejected",
        }
    }
}

/// Disponibilidad del partner
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Offline,
    Online,
    OnTrip,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::Offline => "offline",
            Availability::Online => "online",
            Availability::OnTrip => "on_trip",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "offline" => Some(Availability::Offline),
            "online" => Some(Availability::Online),
            "on_trip" => Some(Availability::OnTrip),
            _ => None,
        }
    }
}

/// Partner principal. Dueño único de su sesión activa y de su oferta
/// pendiente; todas las transiciones se serializan por partner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partner {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub city: String,
    pub zone: String,
    pub password_hash: String,
    pub phone_verified: bool,
    pub kyc_status: KycStatus,
    pub availability: Availability,
    pub active_session_id: Option<Uuid>,
    pub pending_offer_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Partner {
    pub fn new(
        name: String,
        phone: String,
        email: String,
        city: String,
        zone: String,
        password_hash: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            phone,
            email,
            city,
            zone,
            password_hash,
            phone_verified: false,
            kyc_status: KycStatus::Pending,
            availability: Availability::Offline,
            active_session_id: None,
            pending_offer_id: None,
            created_at: Utc::now(),
        }
    }
}
