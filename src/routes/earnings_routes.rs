use axum::{
    extract::{Query, State},
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;

use crate::controllers::earnings_controller::EarningsController;
use crate::dto::earnings_dto::{
    AddPayoutMethodRequest, EarningsSummaryResponse, PayoutMethodResponse, PayoutResponse,
    RequestPayoutRequest, TransactionResponse,
};
use crate::dto::partner_dto::ApiResponse;
use crate::middleware::auth::{auth_middleware, AuthenticatedPartner};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_earnings_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/summary", get(earnings_summary))
        .route("/transactions", get(list_transactions))
        .route("/payout-methods", post(add_payout_method))
        .route("/payout-methods", get(list_payout_methods))
        .route("/payouts", post(request_payout))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

#[derive(Debug, Deserialize)]
struct SummaryQuery {
    period: Option<String>,
}

async fn earnings_summary(
    State(state): State<AppState>,
    Extension(partner): Extension<AuthenticatedPartner>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<EarningsSummaryResponse>, AppError> {
    let period = query.period.unwrap_or_else(|| "today".to_string());
    let controller = EarningsController::new(&state);
    let response = controller.summary(partner.partner_id, &period).await?;
    Ok(Json(response))
}

async fn list_transactions(
    State(state): State<AppState>,
    Extension(partner): Extension<AuthenticatedPartner>,
) -> Result<Json<Vec<TransactionResponse>>, AppError> {
    let controller = EarningsController::new(&state);
    let response = controller.transactions(partner.partner_id).await?;
    Ok(Json(response))
}

async fn add_payout_method(
    State(state): State<AppState>,
    Extension(partner): Extension<AuthenticatedPartner>,
    Json(request): Json<AddPayoutMethodRequest>,
) -> Result<Json<ApiResponse<PayoutMethodResponse>>, AppError> {
    let controller = EarningsController::new(&state);
    let response = controller.add_payout_method(partner.partner_id, request).await?;
    Ok(Json(response))
}

async fn list_payout_methods(
    State(state): State<AppState>,
    Extension(partner): Extension<AuthenticatedPartner>,
) -> Result<Json<Vec<PayoutMethodResponse>>, AppError> {
    let controller = EarningsController::new(&state);
    let response = controller.list_payout_methods(partner.partner_id).await?;
    Ok(Json(response))
}

async fn request_payout(
    State(state): State<AppState>,
    Extension(partner): Extension<AuthenticatedPartner>,
    Json(request): Json<RequestPayoutRequest>,
) -> Result<Json<ApiResponse<PayoutResponse>>, AppError> {
    let controller = EarningsController::new(&state);
    let response = controller.request_payout(partner.partner_id, request).await?;
    Ok(Json(response))
}
