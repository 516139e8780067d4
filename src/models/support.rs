//! Modelos de soporte
//!
//! Tickets de soporte del partner y mensajes de chat por sesión.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Estado de un ticket de soporte
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Resolved => "resolved",
        }
    }
}

/// Ticket de soporte levantado por un partner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportTicket {
    pub id: Uuid,
    pub partner_id: Uuid,
    pub subject: String,
    pub category: String,
    pub description: String,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
}

/// Remitente de un mensaje de chat
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageSender {
    Partner,
    Owner,
}

/// Mensaje de chat ligado a una sesión
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub session_id: Uuid,
    pub sender: MessageSender,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}
