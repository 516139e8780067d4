//! DTOs de soporte

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::session::Session;
use crate::models::support::SupportTicket;

/// Request de creación de ticket
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTicketRequest {
    #[validate(length(min = 5, max = 100))]
    pub subject: String,

    #[validate(length(min = 2, max = 50))]
    pub category: String,

    #[validate(length(min = 10, max = 2000))]
    pub description: String,
}

/// Response de ticket
#[derive(Debug, Serialize)]
pub struct TicketResponse {
    pub id: String,
    pub subject: String,
    pub category: String,
    pub description: String,
    pub status: String,
    pub created_at: String,
}

impl From<SupportTicket> for TicketResponse {
    fn from(ticket: SupportTicket) -> Self {
        Self {
            id: ticket.id.to_string(),
            subject: ticket.subject,
            category: ticket.category,
            description: ticket.description,
            status: ticket.status.as_str().to_string(),
            created_at: ticket.created_at.to_rfc3339(),
        }
    }
}

/// Disputa derivada de una sesión en estado disputed
#[derive(Debug, Serialize)]
pub struct DisputeResponse {
    pub session_id: String,
    pub vehicle_number: String,
    pub fare: Option<String>,
    pub new_damage: Vec<String>,
    pub completed_at: Option<String>,
}

impl From<Session> for DisputeResponse {
    fn from(session: Session) -> Self {
        let new_damage = match (&session.return_inspection, &session.pickup_inspection) {
            (Some(ret), Some(pickup)) => ret.new_damage_since(pickup),
            _ => Vec::new(),
        };

        Self {
            session_id: session.id.to_string(),
            vehicle_number: session.vehicle_number,
            fare: session.fare.map(|f| f.to_string()),
            new_damage,
            completed_at: session.completed_at.map(|t| t.to_rfc3339()),
        }
    }
}
