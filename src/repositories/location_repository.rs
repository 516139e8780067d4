//! Repositorio de ubicaciones de parking
//!
//! Los contadores de slots mutan únicamente bajo el write lock del
//! store, por lo que occupy/release son atómicos por ubicación y no hay
//! updates perdidos con inicios/cierres de sesión concurrentes.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::location::ParkingLocation;
use crate::utils::errors::{not_found_error, AppError, AppResult};

#[derive(Clone, Default)]
pub struct LocationRepository {
    locations: Arc<RwLock<HashMap<Uuid, ParkingLocation>>>,
}

impl LocationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, location: ParkingLocation) -> ParkingLocation {
        let mut locations = self.locations.write().await;
        log::info!(
            "💾 Ubicación creada: '{}' con {} slots",
            location.name,
            location.total_slots
        );
        locations.insert(location.id, location.clone());
        location
    }

    pub async fn find_by_id(&self, id: Uuid) -> Option<ParkingLocation> {
        self.locations.read().await.get(&id).cloned()
    }

    pub async fn list_by_partner(&self, partner_id: Uuid) -> Vec<ParkingLocation> {
        let mut result: Vec<ParkingLocation> = self
            .locations
            .read()
            .await
            .values()
            .filter(|l| l.partner_id == partner_id)
            .cloned()
            .collect();
        result.sort_by_key(|l| l.created_at);
        result
    }

    pub async fn update(&self, location: ParkingLocation) -> AppResult<ParkingLocation> {
        let mut locations = self.locations.write().await;

        if !locations.contains_key(&location.id) {
            return Err(not_found_error("ParkingLocation", &location.id.to_string()));
        }

        locations.insert(location.id, location.clone());
        Ok(location)
    }

    /// Ocupar un slot de forma atómica. Falla con Conflict si la
    /// ubicación está inactiva o sin cupo; no muta nada en ese caso.
    pub async fn occupy_slot(&self, id: Uuid) -> AppResult<ParkingLocation> {
        let mut locations = self.locations.write().await;

        let location = locations
            .get_mut(&id)
            .ok_or_else(|| not_found_error("ParkingLocation", &id.to_string()))?;

        if !location.is_active {
            return Err(AppError::Conflict(format!(
                "Location '{}' is not active",
                location.name
            )));
        }

        if location.available_slots() == 0 {
            return Err(AppError::Conflict(format!(
                "Location '{}' has no available slots",
                location.name
            )));
        }

        location.occupied_slots += 1;
        log::info!(
            "🅿️ Slot ocupado en '{}': {}/{}",
            location.name,
            location.occupied_slots,
            location.total_slots
        );
        Ok(location.clone())
    }

    /// Liberar un slot de forma atómica
    pub async fn release_slot(&self, id: Uuid) -> AppResult<ParkingLocation> {
        let mut locations = self.locations.write().await;

        let location = locations
            .get_mut(&id)
            .ok_or_else(|| not_found_error("ParkingLocation", &id.to_string()))?;

        location.occupied_slots = location.occupied_slots.saturating_sub(1);
        log::info!(
            "🅿️ Slot liberado en '{}': {}/{}",
            location.name,
            location.occupied_slots,
            location.total_slots
        );
        Ok(location.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn location(total_slots: u32) -> ParkingLocation {
        ParkingLocation {
            id: Uuid::new_v4(),
            partner_id: Uuid::new_v4(),
            name: "Central Plaza Parking".to_string(),
            address: "123 Main St".to_string(),
            total_slots,
            occupied_slots: 0,
            base_rate: Decimal::from(50),
            min_duration_hours: 1,
            extension_rate: Decimal::from(75),
            vehicle_types: vec!["car".to_string()],
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_occupy_and_release_slots() {
        let repo = LocationRepository::new();
        let loc = repo.create(location(20)).await;

        // Dos sesiones activas dejan 18 slots disponibles
        repo.occupy_slot(loc.id).await.unwrap();
        let after = repo.occupy_slot(loc.id).await.unwrap();
        assert_eq!(after.available_slots(), 18);

        let after = repo.release_slot(loc.id).await.unwrap();
        assert_eq!(after.available_slots(), 19);
    }

    #[tokio::test]
    async fn test_occupy_full_location_conflicts() {
        let repo = LocationRepository::new();
        let loc = repo.create(location(1)).await;

        repo.occupy_slot(loc.id).await.unwrap();
        let err = repo.occupy_slot(loc.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_occupy_inactive_location_conflicts() {
        let repo = LocationRepository::new();
        let mut loc = repo.create(location(5)).await;
        loc.is_active = false;
        repo.update(loc.clone()).await.unwrap();

        let err = repo.occupy_slot(loc.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
