//! Repositorio de partners
//!
//! Almacén autoritativo en memoria de los registros de Partner. Las
//! lecturas/escrituras van detrás de un RwLock; la serialización de
//! transiciones por partner la imponen los servicios con su lock
//! dedicado.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::partner::Partner;
use crate::utils::errors::{conflict_error, not_found_error, AppResult};

#[derive(Clone, Default)]
pub struct PartnerRepository {
    partners: Arc<RwLock<HashMap<Uuid, Partner>>>,
}

impl PartnerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Alta de un partner nuevo. El teléfono es único en el sistema.
    pub async fn create(&self, partner: Partner) -> AppResult<Partner> {
        let mut partners = self.partners.write().await;

        if partners.values().any(|p| p.phone == partner.phone) {
            return Err(conflict_error("Partner", "phone", &partner.phone));
        }

        log::info!("💾 Partner registrado: '{}' ({})", partner.name, partner.id);
        partners.insert(partner.id, partner.clone());
        Ok(partner)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Option<Partner> {
        self.partners.read().await.get(&id).cloned()
    }

    pub async fn find_by_phone(&self, phone: &str) -> Option<Partner> {
        self.partners
            .read()
            .await
            .values()
            .find(|p| p.phone == phone)
            .cloned()
    }

    /// Reemplazar el registro completo del partner
    pub async fn update(&self, partner: Partner) -> AppResult<Partner> {
        let mut partners = self.partners.write().await;

        if !partners.contains_key(&partner.id) {
            return Err(not_found_error("Partner", &partner.id.to_string()));
        }

        partners.insert(partner.id, partner.clone());
        Ok(partner)
    }
}
