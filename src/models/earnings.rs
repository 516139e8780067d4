//! Modelos de earnings y pagos
//!
//! Transacciones generadas al cierre de cada sesión, métodos de cobro
//! del partner y payouts ejecutados contra el servicio de pagos.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Estado de una transacción de earnings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Completed,
    Disputed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Completed => "completed",
            TransactionStatus::Disputed => "disputed",
        }
    }
}

/// Transacción registrada al cierre de una sesión
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarningsTransaction {
    pub id: Uuid,
    pub partner_id: Uuid,
    pub session_id: Uuid,
    pub vehicle_number: String,
    pub amount: Decimal,
    pub duration_hours: u32,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

/// Tipo de método de cobro
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PayoutMethodKind {
    Upi,
    Card,
}

/// Método de cobro registrado por el partner. De las tarjetas solo se
/// guardan titular y últimos 4 dígitos.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoutMethod {
    pub id: Uuid,
    pub partner_id: Uuid,
    pub kind: PayoutMethodKind,
    pub upi_id: Option<String>,
    pub card_holder: Option<String>,
    pub card_last4: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payout ejecutado contra el servicio de pagos externo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payout {
    pub id: Uuid,
    pub partner_id: Uuid,
    pub amount: Decimal,
    /// Referencia devuelta por el colaborador de pagos
    pub payout_ref: String,
    pub created_at: DateTime<Utc>,
}
