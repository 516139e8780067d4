//! Controllers de la API
//!
//! Cada controller encapsula las operaciones de un área y devuelve
//! DTOs listos para serializar.

pub mod auth_controller;
pub mod dispatch_controller;
pub mod earnings_controller;
pub mod kyc_controller;
pub mod location_controller;
pub mod partner_controller;
pub mod session_controller;
pub mod support_controller;
