//! Repositorio de soporte
//!
//! Tickets de soporte y mensajes de chat por sesión.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::support::{ChatMessage, SupportTicket};

#[derive(Clone, Default)]
pub struct SupportRepository {
    tickets: Arc<RwLock<HashMap<Uuid, SupportTicket>>>,
    messages: Arc<RwLock<HashMap<Uuid, Vec<ChatMessage>>>>,
}

impl SupportRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create_ticket(&self, ticket: SupportTicket) -> SupportTicket {
        let mut tickets = self.tickets.write().await;
        log::info!(
            "🎫 Ticket creado: '{}' ({})",
            ticket.subject,
            ticket.category
        );
        tickets.insert(ticket.id, ticket.clone());
        ticket
    }

    pub async fn list_tickets(&self, partner_id: Uuid) -> Vec<SupportTicket> {
        let mut result: Vec<SupportTicket> = self
            .tickets
            .read()
            .await
            .values()
            .filter(|t| t.partner_id == partner_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        result
    }

    pub async fn append_message(&self, message: ChatMessage) -> ChatMessage {
        let mut messages = self.messages.write().await;
        messages
            .entry(message.session_id)
            .or_default()
            .push(message.clone());
        message
    }

    pub async fn list_messages(&self, session_id: Uuid) -> Vec<ChatMessage> {
        self.messages
            .read()
            .await
            .get(&session_id)
            .cloned()
            .unwrap_or_default()
    }
}
