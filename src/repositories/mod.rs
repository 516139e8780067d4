//! Repositorios del sistema
//!
//! Almacenes autoritativos en memoria. Cada repositorio envuelve su
//! HashMap detrás de un RwLock de tokio; las invariantes multi-entidad
//! las imponen los servicios.

pub mod earnings_repository;
pub mod kyc_repository;
pub mod location_repository;
pub mod partner_repository;
pub mod session_repository;
pub mod support_repository;
