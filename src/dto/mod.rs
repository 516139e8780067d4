//! DTOs de la API
//!
//! Requests validados con validator y responses con tipos planos
//! serializables.

pub mod earnings_dto;
pub mod kyc_dto;
pub mod location_dto;
pub mod partner_dto;
pub mod request_dto;
pub mod session_dto;
pub mod support_dto;
