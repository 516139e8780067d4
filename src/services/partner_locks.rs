//! Registro de locks por partner
//!
//! Cada partner tiene un único escritor lógico: toda transición de
//! estado (disponibilidad, aceptación de ofertas, ciclo de sesión) debe
//! tomar el mutex del partner antes de mutar. Esto elimina las carreras
//! accept/offline sin necesidad de locking entre partners.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct PartnerLockRegistry {
    locks: Arc<RwLock<HashMap<Uuid, Arc<Mutex<()>>>>>,
}

impl PartnerLockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Obtener (creando si hace falta) el mutex del partner
    pub async fn lock_for(&self, partner_id: Uuid) -> Arc<Mutex<()>> {
        {
            let locks = self.locks.read().await;
            if let Some(lock) = locks.get(&partner_id) {
                return lock.clone();
            }
        }

        let mut locks = self.locks.write().await;
        locks
            .entry(partner_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_same_partner_same_lock() {
        let registry = PartnerLockRegistry::new();
        let id = Uuid::new_v4();

        let a = registry.lock_for(id).await;
        let b = registry.lock_for(id).await;
        assert!(Arc::ptr_eq(&a, &b));

        let other = registry.lock_for(Uuid::new_v4()).await;
        assert!(!Arc::ptr_eq(&a, &other));
    }
}
