//! Modelo de ParkingLocation
//!
//! Ubicación de parking administrada por un partner, con cupo de slots
//! y parámetros de pricing.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ubicación de parking. Invariante: available_slots() es siempre
/// total_slots - occupied_slots, con occupied_slots contando las
/// sesiones activas asignadas a esta ubicación.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParkingLocation {
    pub id: Uuid,
    pub partner_id: Uuid,
    pub name: String,
    pub address: String,
    pub total_slots: u32,
    pub occupied_slots: u32,
    /// Tarifa base por hora
    pub base_rate: Decimal,
    /// Duración mínima facturable en horas
    pub min_duration_hours: u32,
    /// Tarifa por hora de extensión por encima de la reserva
    pub extension_rate: Decimal,
    pub vehicle_types: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl ParkingLocation {
    pub fn available_slots(&self) -> u32 {
        self.total_slots.saturating_sub(self.occupied_slots)
    }
}
