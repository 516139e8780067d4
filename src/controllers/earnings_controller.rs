//! Controller de earnings
//!
//! Resumen por período, transacciones, métodos de cobro y payouts.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use crate::config::EnvironmentConfig;
use crate::dto::earnings_dto::{
    AddPayoutMethodRequest, EarningsSummaryResponse, PayoutMethodResponse, PayoutResponse,
    RequestPayoutRequest, TransactionResponse,
};
use crate::dto::partner_dto::ApiResponse;
use crate::models::earnings::{Payout, PayoutMethod, PayoutMethodKind, TransactionStatus};
use crate::repositories::earnings_repository::EarningsRepository;
use crate::services::collaborators::PayoutProvider;
use crate::services::retry::with_backoff;
use crate::state::AppState;
use crate::utils::errors::{validation_error, AppError};

pub struct EarningsController {
    earnings: EarningsRepository,
    payouts: Arc<dyn PayoutProvider>,
    config: EnvironmentConfig,
    retry_base: StdDuration,
}

impl EarningsController {
    pub fn new(state: &AppState) -> Self {
        Self {
            earnings: state.earnings.clone(),
            payouts: state.payouts.clone(),
            config: state.config.clone(),
            retry_base: StdDuration::from_millis(state.config.external_retry_base_ms),
        }
    }

    /// Resumen de earnings para today | week | month
    pub async fn summary(
        &self,
        partner_id: Uuid,
        period: &str,
    ) -> Result<EarningsSummaryResponse, AppError> {
        let since = match period {
            "today" => Utc::now() - Duration::hours(24),
            "week" => Utc::now() - Duration::days(7),
            "month" => Utc::now() - Duration::days(30),
            other => {
                return Err(AppError::BadRequest(format!(
                    "Unknown period '{}'; use today, week or month",
                    other
                )))
            }
        };

        let transactions = self.earnings.list_transactions(partner_id).await;
        let in_period: Vec<_> = transactions
            .iter()
            .filter(|t| t.status == TransactionStatus::Completed)
            .filter(|t| t.created_at >= since)
            .collect();

        let total: Decimal = in_period.iter().map(|t| t.amount).sum();
        let balance = self.earnings.available_balance(partner_id).await;

        Ok(EarningsSummaryResponse {
            period: period.to_string(),
            total: total.to_string(),
            sessions: in_period.len(),
            available_balance: balance.to_string(),
        })
    }

    pub async fn transactions(
        &self,
        partner_id: Uuid,
    ) -> Result<Vec<TransactionResponse>, AppError> {
        let transactions = self.earnings.list_transactions(partner_id).await;
        Ok(transactions.into_iter().map(TransactionResponse::from).collect())
    }

    /// Registrar un método de cobro UPI o tarjeta
    pub async fn add_payout_method(
        &self,
        partner_id: Uuid,
        request: AddPayoutMethodRequest,
    ) -> Result<ApiResponse<PayoutMethodResponse>, AppError> {
        request.validate()?;

        let method = match request.kind.as_str() {
            "upi" => {
                let upi_id = request
                    .upi_id
                    .ok_or_else(|| validation_error("upi_id", "upi_id is required for UPI"))?;

                PayoutMethod {
                    id: Uuid::new_v4(),
                    partner_id,
                    kind: PayoutMethodKind::Upi,
                    upi_id: Some(upi_id),
                    card_holder: None,
                    card_last4: None,
                    created_at: Utc::now(),
                }
            }
            "card" => {
                let card_holder = request.card_holder.ok_or_else(|| {
                    validation_error("card_holder", "card_holder is required for cards")
                })?;
                let card_number = request.card_number.ok_or_else(|| {
                    validation_error("card_number", "card_number is required for cards")
                })?;

                if !card_number.chars().all(|c| c.is_ascii_digit()) {
                    return Err(validation_error("card_number", "card_number must be digits"));
                }

                // Solo se retienen los últimos 4 dígitos
                let card_last4 = card_number
                    .chars()
                    .rev()
                    .take(4)
                    .collect::<Vec<_>>()
                    .into_iter()
                    .rev()
                    .collect::<String>();

                PayoutMethod {
                    id: Uuid::new_v4(),
                    partner_id,
                    kind: PayoutMethodKind::Card,
                    upi_id: None,
                    card_holder: Some(card_holder),
                    card_last4: Some(card_last4),
                    created_at: Utc::now(),
                }
            }
            other => {
                return Err(AppError::BadRequest(format!(
                    "Unknown payout method kind '{}'",
                    other
                )))
            }
        };

        let method = self.earnings.add_payout_method(method).await;

        Ok(ApiResponse::success_with_message(
            PayoutMethodResponse::from(method),
            "Método de cobro registrado exitosamente".to_string(),
        ))
    }

    pub async fn list_payout_methods(
        &self,
        partner_id: Uuid,
    ) -> Result<Vec<PayoutMethodResponse>, AppError> {
        let methods = self.earnings.list_payout_methods(partner_id).await;
        Ok(methods.into_iter().map(PayoutMethodResponse::from).collect())
    }

    /// Ejecutar un payout contra el servicio de pagos; sin monto se
    /// paga el balance completo
    pub async fn request_payout(
        &self,
        partner_id: Uuid,
        request: RequestPayoutRequest,
    ) -> Result<ApiResponse<PayoutResponse>, AppError> {
        if self.earnings.list_payout_methods(partner_id).await.is_empty() {
            return Err(AppError::BadRequest(
                "Register a payout method first".to_string(),
            ));
        }

        let balance = self.earnings.available_balance(partner_id).await;
        let amount = request.amount.unwrap_or(balance);

        if amount <= Decimal::ZERO {
            return Err(AppError::BadRequest("No balance available".to_string()));
        }
        if amount > balance {
            return Err(AppError::BadRequest(format!(
                "Requested {} exceeds available balance {}",
                amount, balance
            )));
        }

        let payout_ref = with_backoff(
            "payouts.payout",
            self.config.external_retry_max,
            self.retry_base,
            || self.payouts.payout(partner_id, amount),
        )
        .await?;

        let payout = self
            .earnings
            .record_payout(Payout {
                id: Uuid::new_v4(),
                partner_id,
                amount,
                payout_ref,
                created_at: Utc::now(),
            })
            .await;

        Ok(ApiResponse::success_with_message(
            PayoutResponse::from(payout),
            "Payout ejecutado exitosamente".to_string(),
        ))
    }
}
