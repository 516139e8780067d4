//! Middleware de autenticación JWT
//!
//! Este módulo maneja la autenticación JWT, extracción de tokens y
//! verificación del partner autenticado.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::state::AppState;
use crate::utils::errors::AppError;

/// Partner autenticado que se inyecta en las requests
#[derive(Debug, Clone)]
pub struct AuthenticatedPartner {
    pub partner_id: Uuid,
    pub phone: String,
}

/// Middleware de autenticación JWT
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Extraer token del header Authorization
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|auth_str| auth_str.to_str().ok())
        .and_then(|auth_str| auth_str.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Authorization token required".to_string()))?;

    // Decodificar y validar JWT
    let partner_id = state
        .jwt
        .get_partner_id(auth_header)
        .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))?;

    // Verificar que el partner existe en el almacén
    let partner = state
        .partners
        .find_by_id(partner_id)
        .await
        .ok_or_else(|| AppError::Unauthorized("Partner not found".to_string()))?;

    // Inyectar partner autenticado en las extensions
    request.extensions_mut().insert(AuthenticatedPartner {
        partner_id: partner.id,
        phone: partner.phone,
    });

    Ok(next.run(request).await)
}
