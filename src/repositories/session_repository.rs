//! Repositorio de sesiones
//!
//! Almacén en memoria de las sesiones de parking y sus inspecciones.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::session::{Session, SessionStatus};
use crate::utils::errors::{not_found_error, AppResult};

#[derive(Clone, Default)]
pub struct SessionRepository {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, session: Session) -> Session {
        let mut sessions = self.sessions.write().await;
        log::info!(
            "💾 Sesión creada: {} para vehículo '{}'",
            session.id,
            session.vehicle_number
        );
        sessions.insert(session.id, session.clone());
        session
    }

    pub async fn find_by_id(&self, id: Uuid) -> Option<Session> {
        self.sessions.read().await.get(&id).cloned()
    }

    pub async fn update(&self, session: Session) -> AppResult<Session> {
        let mut sessions = self.sessions.write().await;

        if !sessions.contains_key(&session.id) {
            return Err(not_found_error("Session", &session.id.to_string()));
        }

        sessions.insert(session.id, session.clone());
        Ok(session)
    }

    pub async fn list_by_partner(&self, partner_id: Uuid) -> Vec<Session> {
        let mut result: Vec<Session> = self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| s.partner_id == partner_id)
            .cloned()
            .collect();
        result.sort_by_key(|s| s.created_at);
        result
    }

    /// Sesiones no terminales del partner
    pub async fn list_open_by_partner(&self, partner_id: Uuid) -> Vec<Session> {
        self.list_by_partner(partner_id)
            .await
            .into_iter()
            .filter(|s| !s.status.is_terminal())
            .collect()
    }

    pub async fn list_disputed_by_partner(&self, partner_id: Uuid) -> Vec<Session> {
        self.list_by_partner(partner_id)
            .await
            .into_iter()
            .filter(|s| s.status == SessionStatus::Disputed)
            .collect()
    }
}
