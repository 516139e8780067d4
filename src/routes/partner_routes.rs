use axum::{
    extract::State,
    middleware,
    routing::{get, put},
    Extension, Json, Router,
};

use crate::controllers::partner_controller::PartnerController;
use crate::dto::partner_dto::{
    ApiResponse, DashboardResponse, PartnerResponse, SetAvailabilityRequest,
};
use crate::middleware::auth::{auth_middleware, AuthenticatedPartner};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_partner_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/availability", put(set_availability))
        .route("/dashboard", get(dashboard))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

async fn set_availability(
    State(state): State<AppState>,
    Extension(partner): Extension<AuthenticatedPartner>,
    Json(request): Json<SetAvailabilityRequest>,
) -> Result<Json<ApiResponse<PartnerResponse>>, AppError> {
    let controller = PartnerController::new(&state);
    let response = controller.set_availability(partner.partner_id, request).await?;
    Ok(Json(response))
}

async fn dashboard(
    State(state): State<AppState>,
    Extension(partner): Extension<AuthenticatedPartner>,
) -> Result<Json<DashboardResponse>, AppError> {
    let controller = PartnerController::new(&state);
    let response = controller.dashboard(partner.partner_id).await?;
    Ok(Json(response))
}
