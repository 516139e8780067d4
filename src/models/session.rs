//! Modelo de Session
//!
//! Una sesión es el episodio de parking de un vehículo desde el pickup
//! hasta el return. Propiedad exclusiva de un partner a la vez.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Estado del ciclo de vida de la sesión
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    PickupPending,
    Active,
    ReturnPending,
    Completed,
    Disputed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::PickupPending => "pickup_pending",
            SessionStatus::Active => "active",
            SessionStatus::ReturnPending => "return_pending",
            SessionStatus::Completed => "completed",
            SessionStatus::Disputed => "disputed",
        }
    }

    /// Estados terminales: completed y disputed
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Disputed)
    }
}

/// Clase de imagen dentro de una inspección de vehículo
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InspectionImageKind {
    Front,
    Back,
    Left,
    Right,
    Dashboard,
    NumberPlate,
}

impl InspectionImageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InspectionImageKind::Front => "front",
            InspectionImageKind::Back => "back",
            InspectionImageKind::Left => "left",
            InspectionImageKind::Right => "right",
            InspectionImageKind::Dashboard => "dashboard",
            InspectionImageKind::NumberPlate => "number_plate",
        }
    }

    /// Las seis capturas requeridas en cada inspección
    pub fn required() -> [InspectionImageKind; 6] {
        [
            InspectionImageKind::Front,
            InspectionImageKind::Back,
            InspectionImageKind::Left,
            InspectionImageKind::Right,
            InspectionImageKind::Dashboard,
            InspectionImageKind::NumberPlate,
        ]
    }
}

/// Registro de inspección en pickup o return
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectionRecord {
    /// document_id por clase de imagen, ya subidas al almacenamiento
    pub images: HashMap<InspectionImageKind, String>,
    /// Nivel de combustible 0-100
    pub fuel_level: u8,
    pub odometer_km: u32,
    /// Zonas del vehículo con daño marcado por el partner
    pub damage_markers: Vec<String>,
    pub recorded_at: DateTime<Utc>,
}

impl InspectionRecord {
    /// Una inspección está completa con las seis imágenes presentes
    pub fn is_complete(&self) -> bool {
        InspectionImageKind::required()
            .iter()
            .all(|kind| self.images.contains_key(kind))
    }

    /// Marcadores de daño presentes aquí pero no en `baseline`
    pub fn new_damage_since(&self, baseline: &InspectionRecord) -> Vec<String> {
        self.damage_markers
            .iter()
            .filter(|marker| !baseline.damage_markers.contains(marker))
            .cloned()
            .collect()
    }
}

/// Session principal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub partner_id: Uuid,
    pub location_id: Uuid,
    pub vehicle_number: String,
    pub vehicle_type: String,
    pub slot_number: String,
    /// Teléfono del dueño del vehículo, destino de los OTP de handover
    pub owner_phone: String,
    pub reserved_hours: u32,
    pub extended_hours: u32,
    pub status: SessionStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub scheduled_end_at: Option<DateTime<Utc>>,
    pub pickup_inspection: Option<InspectionRecord>,
    pub return_inspection: Option<InspectionRecord>,
    pub fare: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn total_reserved_hours(&self) -> u32 {
        self.reserved_hours + self.extended_hours
    }
}
