//! Controller de soporte
//!
//! Tickets del partner y disputas derivadas de sesiones.

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::dto::partner_dto::ApiResponse;
use crate::dto::support_dto::{CreateTicketRequest, DisputeResponse, TicketResponse};
use crate::models::support::{SupportTicket, TicketStatus};
use crate::repositories::session_repository::SessionRepository;
use crate::repositories::support_repository::SupportRepository;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub struct SupportController {
    support: SupportRepository,
    sessions: SessionRepository,
}

impl SupportController {
    pub fn new(state: &AppState) -> Self {
        Self {
            support: state.support.clone(),
            sessions: state.sessions.clone(),
        }
    }

    pub async fn create_ticket(
        &self,
        partner_id: Uuid,
        request: CreateTicketRequest,
    ) -> Result<ApiResponse<TicketResponse>, AppError> {
        request.validate()?;

        let ticket = self
            .support
            .create_ticket(SupportTicket {
                id: Uuid::new_v4(),
                partner_id,
                subject: request.subject,
                category: request.category,
                description: request.description,
                status: TicketStatus::Open,
                created_at: Utc::now(),
            })
            .await;

        Ok(ApiResponse::success_with_message(
            TicketResponse::from(ticket),
            "Ticket creado exitosamente".to_string(),
        ))
    }

    pub async fn list_tickets(&self, partner_id: Uuid) -> Result<Vec<TicketResponse>, AppError> {
        let tickets = self.support.list_tickets(partner_id).await;
        Ok(tickets.into_iter().map(TicketResponse::from).collect())
    }

    /// Disputas del partner: sesiones cerradas con daños nuevos
    pub async fn list_disputes(&self, partner_id: Uuid) -> Result<Vec<DisputeResponse>, AppError> {
        let disputed = self.sessions.list_disputed_by_partner(partner_id).await;
        Ok(disputed.into_iter().map(DisputeResponse::from).collect())
    }
}
