use axum::{
    extract::State,
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};

use crate::controllers::support_controller::SupportController;
use crate::dto::partner_dto::ApiResponse;
use crate::dto::support_dto::{CreateTicketRequest, DisputeResponse, TicketResponse};
use crate::middleware::auth::{auth_middleware, AuthenticatedPartner};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_support_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/tickets", post(create_ticket))
        .route("/tickets", get(list_tickets))
        .route("/disputes", get(list_disputes))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

async fn create_ticket(
    State(state): State<AppState>,
    Extension(partner): Extension<AuthenticatedPartner>,
    Json(request): Json<CreateTicketRequest>,
) -> Result<Json<ApiResponse<TicketResponse>>, AppError> {
    let controller = SupportController::new(&state);
    let response = controller.create_ticket(partner.partner_id, request).await?;
    Ok(Json(response))
}

async fn list_tickets(
    State(state): State<AppState>,
    Extension(partner): Extension<AuthenticatedPartner>,
) -> Result<Json<Vec<TicketResponse>>, AppError> {
    let controller = SupportController::new(&state);
    let response = controller.list_tickets(partner.partner_id).await?;
    Ok(Json(response))
}

async fn list_disputes(
    State(state): State<AppState>,
    Extension(partner): Extension<AuthenticatedPartner>,
) -> Result<Json<Vec<DisputeResponse>>, AppError> {
    let controller = SupportController::new(&state);
    let response = controller.list_disputes(partner.partner_id).await?;
    Ok(Json(response))
}
