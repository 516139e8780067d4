//! DTOs de earnings y pagos

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::earnings::{EarningsTransaction, Payout, PayoutMethod};

/// Resumen de earnings por período
#[derive(Debug, Serialize)]
pub struct EarningsSummaryResponse {
    pub period: String,
    pub total: String,
    pub sessions: usize,
    pub available_balance: String,
}

/// Response de transacción
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub id: String,
    pub session_id: String,
    pub vehicle_number: String,
    pub amount: String,
    pub duration_hours: u32,
    pub status: String,
    pub created_at: String,
}

impl From<EarningsTransaction> for TransactionResponse {
    fn from(transaction: EarningsTransaction) -> Self {
        Self {
            id: transaction.id.to_string(),
            session_id: transaction.session_id.to_string(),
            vehicle_number: transaction.vehicle_number,
            amount: transaction.amount.to_string(),
            duration_hours: transaction.duration_hours,
            status: transaction.status.as_str().to_string(),
            created_at: transaction.created_at.to_rfc3339(),
        }
    }
}

/// Alta de método de cobro: UPI o tarjeta
#[derive(Debug, Deserialize, Validate)]
pub struct AddPayoutMethodRequest {
    pub kind: String,

    #[validate(length(min = 3, max = 100))]
    pub upi_id: Option<String>,

    #[validate(length(min = 2, max = 100))]
    pub card_holder: Option<String>,

    #[validate(length(min = 12, max = 19))]
    pub card_number: Option<String>,
}

/// Response de método de cobro
#[derive(Debug, Serialize)]
pub struct PayoutMethodResponse {
    pub id: String,
    pub kind: String,
    pub upi_id: Option<String>,
    pub card_holder: Option<String>,
    pub card_last4: Option<String>,
    pub created_at: String,
}

impl From<PayoutMethod> for PayoutMethodResponse {
    fn from(method: PayoutMethod) -> Self {
        Self {
            id: method.id.to_string(),
            kind: match method.kind {
                crate::models::earnings::PayoutMethodKind::Upi => "upi".to_string(),
                crate::models::earnings::PayoutMethodKind::Card => "card".to_string(),
            },
            upi_id: method.upi_id,
            card_holder: method.card_holder,
            card_last4: method.card_last4,
            created_at: method.created_at.to_rfc3339(),
        }
    }
}

/// Request de payout; sin monto se paga el balance completo
#[derive(Debug, Deserialize)]
pub struct RequestPayoutRequest {
    pub amount: Option<Decimal>,
}

/// Response de payout ejecutado
#[derive(Debug, Serialize)]
pub struct PayoutResponse {
    pub id: String,
    pub amount: String,
    pub payout_ref: String,
    pub created_at: String,
}

impl From<Payout> for PayoutResponse {
    fn from(payout: Payout) -> Self {
        Self {
            id: payout.id.to_string(),
            amount: payout.amount.to_string(),
            payout_ref: payout.payout_ref,
            created_at: payout.created_at.to_rfc3339(),
        }
    }
}
