use axum::{
    extract::{Path, State},
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::kyc_controller::KycController;
use crate::dto::kyc_dto::{
    KycStatusResponse, ReviewKycRequest, SubmissionReceiptResponse, SubmitKycRequest,
};
use crate::dto::partner_dto::ApiResponse;
use crate::middleware::auth::{auth_middleware, AuthenticatedPartner};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_kyc_router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/documents", post(submit_documents))
        .route("/status", get(kyc_status))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        // Acción del revisor externo, fuera del JWT de partners
        .route("/review/:partner_id", post(review_documents))
        .merge(protected)
}

async fn submit_documents(
    State(state): State<AppState>,
    Extension(partner): Extension<AuthenticatedPartner>,
    Json(request): Json<SubmitKycRequest>,
) -> Result<Json<ApiResponse<SubmissionReceiptResponse>>, AppError> {
    let controller = KycController::new(&state);
    let response = controller.submit(partner.partner_id, request).await?;
    Ok(Json(response))
}

async fn review_documents(
    State(state): State<AppState>,
    Path(partner_id): Path<Uuid>,
    Json(request): Json<ReviewKycRequest>,
) -> Result<Json<ApiResponse<KycStatusResponse>>, AppError> {
    let controller = KycController::new(&state);
    let response = controller.review(partner_id, request).await?;
    Ok(Json(response))
}

async fn kyc_status(
    State(state): State<AppState>,
    Extension(partner): Extension<AuthenticatedPartner>,
) -> Result<Json<KycStatusResponse>, AppError> {
    let controller = KycController::new(&state);
    let response = controller.status(partner.partner_id).await?;
    Ok(Json(response))
}
