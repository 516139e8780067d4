//! DTOs de partner y autenticación

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::partner::Partner;

// Response genérica
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn success_with_message(data: T, message: String) -> Self {
        Self {
            success: true,
            message: Some(message),
            data: Some(data),
        }
    }
}

// Request para registrar un partner
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterPartnerRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: String,

    #[validate(custom = "crate::utils::validation::validate_phone")]
    pub phone: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 2, max = 50))]
    pub city: String,

    #[validate(length(min = 2, max = 50))]
    pub zone: String,

    #[validate(length(min = 8, max = 72))]
    pub password: String,
}

// Request de login con teléfono y contraseña
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(custom = "crate::utils::validation::validate_phone")]
    pub phone: String,

    #[validate(length(min = 8, max = 72))]
    pub password: String,
}

// Request para pedir un OTP de login
#[derive(Debug, Deserialize, Validate)]
pub struct RequestOtpRequest {
    #[validate(custom = "crate::utils::validation::validate_phone")]
    pub phone: String,
}

// Request para verificar un OTP (registro o login)
#[derive(Debug, Deserialize, Validate)]
pub struct VerifyOtpRequest {
    #[validate(custom = "crate::utils::validation::validate_phone")]
    pub phone: String,

    pub challenge_id: Uuid,

    #[validate(custom = "crate::utils::validation::validate_otp_code")]
    pub code: String,
}

// Request para cambiar la disponibilidad
#[derive(Debug, Deserialize)]
pub struct SetAvailabilityRequest {
    pub availability: String,
}

/// Desafío OTP emitido; el código viaja solo en desarrollo
#[derive(Debug, Serialize)]
pub struct OtpChallengeResponse {
    pub challenge_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_code: Option<String>,
}

/// Response de partner para la API
#[derive(Debug, Serialize)]
pub struct PartnerResponse {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub city: String,
    pub zone: String,
    pub phone_verified: bool,
    pub kyc_status: String,
    pub availability: String,
    pub active_session_id: Option<String>,
    pub pending_offer_id: Option<String>,
    pub created_at: String,
}

impl From<Partner> for PartnerResponse {
    fn from(partner: Partner) -> Self {
        Self {
            id: partner.id.to_string(),
            name: partner.name,
            phone: partner.phone,
            email: partner.email,
            city: partner.city,
            zone: partner.zone,
            phone_verified: partner.phone_verified,
            kyc_status: partner.kyc_status.as_str().to_string(),
            availability: partner.availability.as_str().to_string(),
            active_session_id: partner.active_session_id.map(|id| id.to_string()),
            pending_offer_id: partner.pending_offer_id.map(|id| id.to_string()),
            created_at: partner.created_at.to_rfc3339(),
        }
    }
}

/// Response de registro: el token llega tras verificar el OTP
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub partner: PartnerResponse,
    pub otp: OtpChallengeResponse,
}

/// Response con token emitido
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub expires_at: String,
    pub partner: PartnerResponse,
}

/// Agregado del dashboard del partner
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub earnings_today: String,
    pub active_sessions: usize,
    pub available_slots: u32,
    pub pending_requests: usize,
}
