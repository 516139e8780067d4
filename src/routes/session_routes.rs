use axum::{
    extract::{Path, State},
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::session_controller::SessionController;
use crate::dto::partner_dto::{ApiResponse, OtpChallengeResponse};
use crate::dto::session_dto::{
    ChatMessageResponse, ConfirmHandoverRequest, ExtendSessionRequest, SendMessageRequest,
    SessionResponse,
};
use crate::middleware::auth::{auth_middleware, AuthenticatedPartner};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_session_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_sessions))
        .route("/:id", get(get_session))
        .route("/:id/otp", post(request_otp))
        .route("/:id/pickup", post(confirm_pickup))
        .route("/:id/return/begin", post(begin_return))
        .route("/:id/return", post(confirm_return))
        .route("/:id/extend", post(extend_session))
        .route("/:id/messages", get(list_messages))
        .route("/:id/messages", post(send_message))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

async fn list_sessions(
    State(state): State<AppState>,
    Extension(partner): Extension<AuthenticatedPartner>,
) -> Result<Json<Vec<SessionResponse>>, AppError> {
    let controller = SessionController::new(&state);
    let response = controller.list(partner.partner_id).await?;
    Ok(Json(response))
}

async fn get_session(
    State(state): State<AppState>,
    Extension(partner): Extension<AuthenticatedPartner>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let controller = SessionController::new(&state);
    let response = controller.get(partner.partner_id, id).await?;
    Ok(Json(response))
}

async fn request_otp(
    State(state): State<AppState>,
    Extension(partner): Extension<AuthenticatedPartner>,
    Path(id): Path<Uuid>,
) -> Result<Json<OtpChallengeResponse>, AppError> {
    let controller = SessionController::new(&state);
    let response = controller.request_otp(partner.partner_id, id).await?;
    Ok(Json(response))
}

async fn confirm_pickup(
    State(state): State<AppState>,
    Extension(partner): Extension<AuthenticatedPartner>,
    Path(id): Path<Uuid>,
    Json(request): Json<ConfirmHandoverRequest>,
) -> Result<Json<ApiResponse<SessionResponse>>, AppError> {
    let controller = SessionController::new(&state);
    let response = controller.confirm_pickup(partner.partner_id, id, request).await?;
    Ok(Json(response))
}

async fn begin_return(
    State(state): State<AppState>,
    Extension(partner): Extension<AuthenticatedPartner>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SessionResponse>>, AppError> {
    let controller = SessionController::new(&state);
    let response = controller.begin_return(partner.partner_id, id).await?;
    Ok(Json(response))
}

async fn confirm_return(
    State(state): State<AppState>,
    Extension(partner): Extension<AuthenticatedPartner>,
    Path(id): Path<Uuid>,
    Json(request): Json<ConfirmHandoverRequest>,
) -> Result<Json<ApiResponse<SessionResponse>>, AppError> {
    let controller = SessionController::new(&state);
    let response = controller.confirm_return(partner.partner_id, id, request).await?;
    Ok(Json(response))
}

async fn extend_session(
    State(state): State<AppState>,
    Extension(partner): Extension<AuthenticatedPartner>,
    Path(id): Path<Uuid>,
    Json(request): Json<ExtendSessionRequest>,
) -> Result<Json<ApiResponse<SessionResponse>>, AppError> {
    let controller = SessionController::new(&state);
    let response = controller.extend(partner.partner_id, id, request).await?;
    Ok(Json(response))
}

async fn list_messages(
    State(state): State<AppState>,
    Extension(partner): Extension<AuthenticatedPartner>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ChatMessageResponse>>, AppError> {
    let controller = SessionController::new(&state);
    let response = controller.list_messages(partner.partner_id, id).await?;
    Ok(Json(response))
}

async fn send_message(
    State(state): State<AppState>,
    Extension(partner): Extension<AuthenticatedPartner>,
    Path(id): Path<Uuid>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<ChatMessageResponse>, AppError> {
    let controller = SessionController::new(&state);
    let response = controller.send_message(partner.partner_id, id, request).await?;
    Ok(Json(response))
}
