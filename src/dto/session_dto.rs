//! DTOs de sesiones

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::session::{Session, SessionStatus};
use crate::models::support::ChatMessage;

/// Inspección del vehículo tal como la sube la app: las seis imágenes
/// en base64 más lectura de combustible y odómetro.
#[derive(Debug, Deserialize, Validate)]
pub struct InspectionRequest {
    #[validate(length(min = 1))]
    pub front: String,

    #[validate(length(min = 1))]
    pub back: String,

    #[validate(length(min = 1))]
    pub left: String,

    #[validate(length(min = 1))]
    pub right: String,

    #[validate(length(min = 1))]
    pub dashboard: String,

    #[validate(length(min = 1))]
    pub number_plate: String,

    #[validate(range(min = 0, max = 100))]
    pub fuel_level: u8,

    pub odometer_km: u32,

    pub damage_markers: Vec<String>,
}

/// Confirmación de handover (pickup o return) con OTP del dueño
#[derive(Debug, Deserialize, Validate)]
pub struct ConfirmHandoverRequest {
    #[validate]
    pub inspection: InspectionRequest,

    pub challenge_id: Uuid,

    #[validate(custom = "crate::utils::validation::validate_otp_code")]
    pub code: String,
}

/// Request de extensión de la reserva
#[derive(Debug, Deserialize, Validate)]
pub struct ExtendSessionRequest {
    #[validate(range(min = 1, max = 12))]
    pub hours: u32,
}

/// Mensaje de chat saliente
#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(length(min = 1, max = 500))]
    pub body: String,
}

/// Response de sesión para la API
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: String,
    pub location_id: String,
    pub vehicle_number: String,
    pub vehicle_type: String,
    pub slot_number: String,
    pub status: String,
    pub reserved_hours: u32,
    pub extended_hours: u32,
    pub started_at: Option<String>,
    pub scheduled_end_at: Option<String>,
    /// Segundos restantes de reserva mientras la sesión está activa
    pub remaining_seconds: Option<i64>,
    pub fare: Option<String>,
    pub created_at: String,
    pub completed_at: Option<String>,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        let remaining_seconds = match (session.status, session.scheduled_end_at) {
            (SessionStatus::Active, Some(end)) => Some((end - Utc::now()).num_seconds().max(0)),
            _ => None,
        };

        Self {
            id: session.id.to_string(),
            location_id: session.location_id.to_string(),
            vehicle_number: session.vehicle_number,
            vehicle_type: session.vehicle_type,
            slot_number: session.slot_number,
            status: session.status.as_str().to_string(),
            reserved_hours: session.reserved_hours,
            extended_hours: session.extended_hours,
            started_at: session.started_at.map(|t| t.to_rfc3339()),
            scheduled_end_at: session.scheduled_end_at.map(|t| t.to_rfc3339()),
            remaining_seconds,
            fare: session.fare.map(|f| f.to_string()),
            created_at: session.created_at.to_rfc3339(),
            completed_at: session.completed_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Response de mensaje de chat
#[derive(Debug, Serialize)]
pub struct ChatMessageResponse {
    pub id: String,
    pub session_id: String,
    pub sender: String,
    pub body: String,
    pub sent_at: String,
}

impl From<ChatMessage> for ChatMessageResponse {
    fn from(message: ChatMessage) -> Self {
        Self {
            id: message.id.to_string(),
            session_id: message.session_id.to_string(),
            sender: match message.sender {
                crate::models::support::MessageSender::Partner => "partner".to_string(),
                crate::models::support::MessageSender::Owner => "owner".to_string(),
            },
            body: message.body,
            sent_at: message.sent_at.to_rfc3339(),
        }
    }
}
