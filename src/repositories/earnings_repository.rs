//! Repositorio de earnings
//!
//! Transacciones, métodos de cobro y payouts del partner.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::earnings::{EarningsTransaction, Payout, PayoutMethod, TransactionStatus};

#[derive(Clone, Default)]
pub struct EarningsRepository {
    transactions: Arc<RwLock<HashMap<Uuid, EarningsTransaction>>>,
    payout_methods: Arc<RwLock<HashMap<Uuid, PayoutMethod>>>,
    payouts: Arc<RwLock<HashMap<Uuid, Payout>>>,
}

impl EarningsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record_transaction(&self, transaction: EarningsTransaction) -> EarningsTransaction {
        let mut transactions = self.transactions.write().await;
        log::info!(
            "💰 Transacción registrada: {} por {} ({})",
            transaction.id,
            transaction.amount,
            transaction.status.as_str()
        );
        transactions.insert(transaction.id, transaction.clone());
        transaction
    }

    pub async fn list_transactions(&self, partner_id: Uuid) -> Vec<EarningsTransaction> {
        let mut result: Vec<EarningsTransaction> = self
            .transactions
            .read()
            .await
            .values()
            .filter(|t| t.partner_id == partner_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        result
    }

    pub async fn add_payout_method(&self, method: PayoutMethod) -> PayoutMethod {
        let mut methods = self.payout_methods.write().await;
        methods.insert(method.id, method.clone());
        method
    }

    pub async fn list_payout_methods(&self, partner_id: Uuid) -> Vec<PayoutMethod> {
        let mut result: Vec<PayoutMethod> = self
            .payout_methods
            .read()
            .await
            .values()
            .filter(|m| m.partner_id == partner_id)
            .cloned()
            .collect();
        result.sort_by_key(|m| m.created_at);
        result
    }

    pub async fn record_payout(&self, payout: Payout) -> Payout {
        let mut payouts = self.payouts.write().await;
        log::info!(
            "💸 Payout registrado: {} por {} (ref '{}')",
            payout.id,
            payout.amount,
            payout.payout_ref
        );
        payouts.insert(payout.id, payout.clone());
        payout
    }

    pub async fn list_payouts(&self, partner_id: Uuid) -> Vec<Payout> {
        let mut result: Vec<Payout> = self
            .payouts
            .read()
            .await
            .values()
            .filter(|p| p.partner_id == partner_id)
            .cloned()
            .collect();
        result.sort_by_key(|p| p.created_at);
        result
    }

    /// Balance disponible: transacciones completadas menos payouts ya
    /// ejecutados. Las transacciones en disputa no suman.
    pub async fn available_balance(&self, partner_id: Uuid) -> Decimal {
        let earned: Decimal = self
            .list_transactions(partner_id)
            .await
            .iter()
            .filter(|t| t.status == TransactionStatus::Completed)
            .map(|t| t.amount)
            .sum();

        let paid: Decimal = self
            .list_payouts(partner_id)
            .await
            .iter()
            .map(|p| p.amount)
            .sum();

        earned - paid
    }
}
