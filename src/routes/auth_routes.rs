use axum::{
    extract::State,
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};

use crate::controllers::auth_controller::AuthController;
use crate::dto::partner_dto::{
    ApiResponse, AuthResponse, LoginRequest, OtpChallengeResponse, PartnerResponse,
    RegisterPartnerRequest, RegisterResponse, RequestOtpRequest, VerifyOtpRequest,
};
use crate::middleware::auth::{auth_middleware, AuthenticatedPartner};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_auth_router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/me", get(me))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/register", post(register))
        .route("/verify-otp", post(verify_otp))
        .route("/login", post(login))
        .route("/login-otp", post(request_login_otp))
        .merge(protected)
}

async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterPartnerRequest>,
) -> Result<Json<ApiResponse<RegisterResponse>>, AppError> {
    let controller = AuthController::new(&state);
    let response = controller.register(request).await?;
    Ok(Json(response))
}

async fn verify_otp(
    State(state): State<AppState>,
    Json(request): Json<VerifyOtpRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let controller = AuthController::new(&state);
    let response = controller.verify_otp(request).await?;
    Ok(Json(response))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let controller = AuthController::new(&state);
    let response = controller.login(request).await?;
    Ok(Json(response))
}

async fn request_login_otp(
    State(state): State<AppState>,
    Json(request): Json<RequestOtpRequest>,
) -> Result<Json<OtpChallengeResponse>, AppError> {
    let controller = AuthController::new(&state);
    let response = controller.request_login_otp(request).await?;
    Ok(Json(response))
}

async fn me(
    State(state): State<AppState>,
    Extension(partner): Extension<AuthenticatedPartner>,
) -> Result<Json<PartnerResponse>, AppError> {
    let controller = AuthController::new(&state);
    let response = controller.me(partner.partner_id).await?;
    Ok(Json(response))
}
