//! Modelos de autenticación
//!
//! Claims del JWT y propósito de los desafíos OTP.

use serde::{Deserialize, Serialize};

/// Claims del JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String, // partner_id
    pub phone: String,
    pub exp: i64, // expiration timestamp
    pub iat: i64, // issued at timestamp
}

/// Propósito de un desafío OTP
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OtpPurpose {
    Register,
    Login,
    Handover,
    Return,
}
