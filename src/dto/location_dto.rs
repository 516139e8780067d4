//! DTOs de ubicaciones de parking

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::location::ParkingLocation;

/// Request para crear una ubicación
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLocationRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: String,

    #[validate(length(min = 5, max = 200))]
    pub address: String,

    #[validate(range(min = 1, max = 10000))]
    pub total_slots: u32,

    pub base_rate: Decimal,

    #[validate(range(min = 1, max = 24))]
    pub min_duration_hours: u32,

    pub extension_rate: Decimal,

    #[validate(length(min = 1))]
    pub vehicle_types: Vec<String>,
}

/// Request para actualizar una ubicación existente
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLocationRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: Option<String>,

    #[validate(length(min = 5, max = 200))]
    pub address: Option<String>,

    #[validate(range(min = 1, max = 10000))]
    pub total_slots: Option<u32>,

    pub base_rate: Option<Decimal>,

    #[validate(range(min = 1, max = 24))]
    pub min_duration_hours: Option<u32>,

    pub extension_rate: Option<Decimal>,

    pub vehicle_types: Option<Vec<String>>,

    pub is_active: Option<bool>,
}

/// Response de ubicación para la API
#[derive(Debug, Serialize)]
pub struct LocationResponse {
    pub id: String,
    pub name: String,
    pub address: String,
    pub total_slots: u32,
    pub occupied_slots: u32,
    pub available_slots: u32,
    pub base_rate: String,
    pub min_duration_hours: u32,
    pub extension_rate: String,
    pub vehicle_types: Vec<String>,
    pub is_active: bool,
    pub created_at: String,
}

impl From<ParkingLocation> for LocationResponse {
    fn from(location: ParkingLocation) -> Self {
        Self {
            id: location.id.to_string(),
            available_slots: location.available_slots(),
            name: location.name,
            address: location.address,
            total_slots: location.total_slots,
            occupied_slots: location.occupied_slots,
            base_rate: location.base_rate.to_string(),
            min_duration_hours: location.min_duration_hours,
            extension_rate: location.extension_rate.to_string(),
            vehicle_types: location.vehicle_types,
            is_active: location.is_active,
            created_at: location.created_at.to_rfc3339(),
        }
    }
}
