//! Controller de ubicaciones de parking
//!
//! CRUD de ubicaciones del partner con slots disponibles derivados.

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::dto::location_dto::{CreateLocationRequest, LocationResponse, UpdateLocationRequest};
use crate::dto::partner_dto::ApiResponse;
use crate::models::location::ParkingLocation;
use crate::repositories::location_repository::LocationRepository;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError};

pub struct LocationController {
    locations: LocationRepository,
}

impl LocationController {
    pub fn new(state: &AppState) -> Self {
        Self {
            locations: state.locations.clone(),
        }
    }

    async fn owned_location(
        &self,
        partner_id: Uuid,
        location_id: Uuid,
    ) -> Result<ParkingLocation, AppError> {
        let location = self
            .locations
            .find_by_id(location_id)
            .await
            .ok_or_else(|| not_found_error("ParkingLocation", &location_id.to_string()))?;

        if location.partner_id != partner_id {
            return Err(AppError::Forbidden(
                "Location belongs to another partner".to_string(),
            ));
        }
        Ok(location)
    }

    pub async fn create(
        &self,
        partner_id: Uuid,
        request: CreateLocationRequest,
    ) -> Result<ApiResponse<LocationResponse>, AppError> {
        request.validate()?;

        let location = self
            .locations
            .create(ParkingLocation {
                id: Uuid::new_v4(),
                partner_id,
                name: request.name,
                address: request.address,
                total_slots: request.total_slots,
                occupied_slots: 0,
                base_rate: request.base_rate,
                min_duration_hours: request.min_duration_hours,
                extension_rate: request.extension_rate,
                vehicle_types: request.vehicle_types,
                is_active: true,
                created_at: Utc::now(),
            })
            .await;

        Ok(ApiResponse::success_with_message(
            LocationResponse::from(location),
            "Ubicación creada exitosamente".to_string(),
        ))
    }

    pub async fn list(&self, partner_id: Uuid) -> Result<Vec<LocationResponse>, AppError> {
        let locations = self.locations.list_by_partner(partner_id).await;
        Ok(locations.into_iter().map(LocationResponse::from).collect())
    }

    pub async fn get(
        &self,
        partner_id: Uuid,
        location_id: Uuid,
    ) -> Result<LocationResponse, AppError> {
        let location = self.owned_location(partner_id, location_id).await?;
        Ok(LocationResponse::from(location))
    }

    pub async fn update(
        &self,
        partner_id: Uuid,
        location_id: Uuid,
        request: UpdateLocationRequest,
    ) -> Result<ApiResponse<LocationResponse>, AppError> {
        request.validate()?;

        let mut location = self.owned_location(partner_id, location_id).await?;

        if let Some(total_slots) = request.total_slots {
            // No se puede reducir el cupo por debajo de lo ocupado
            if total_slots < location.occupied_slots {
                return Err(AppError::Conflict(format!(
                    "Location has {} occupied slots; cannot shrink to {}",
                    location.occupied_slots, total_slots
                )));
            }
            location.total_slots = total_slots;
        }

        if let Some(name) = request.name {
            location.name = name;
        }
        if let Some(address) = request.address {
            location.address = address;
        }
        if let Some(base_rate) = request.base_rate {
            location.base_rate = base_rate;
        }
        if let Some(min_duration_hours) = request.min_duration_hours {
            location.min_duration_hours = min_duration_hours;
        }
        if let Some(extension_rate) = request.extension_rate {
            location.extension_rate = extension_rate;
        }
        if let Some(vehicle_types) = request.vehicle_types {
            location.vehicle_types = vehicle_types;
        }
        if let Some(is_active) = request.is_active {
            location.is_active = is_active;
        }

        let location = self.locations.update(location).await?;

        Ok(ApiResponse::success_with_message(
            LocationResponse::from(location),
            "Ubicación actualizada exitosamente".to_string(),
        ))
    }

    /// Dar de baja una ubicación; las sesiones activas terminan normal
    pub async fn deactivate(
        &self,
        partner_id: Uuid,
        location_id: Uuid,
    ) -> Result<ApiResponse<LocationResponse>, AppError> {
        let mut location = self.owned_location(partner_id, location_id).await?;
        location.is_active = false;
        let location = self.locations.update(location).await?;

        Ok(ApiResponse::success_with_message(
            LocationResponse::from(location),
            "Ubicación desactivada exitosamente".to_string(),
        ))
    }
}
