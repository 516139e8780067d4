//! Routers de la API
//!
//! Un router por área, anidados bajo /api en el router de la
//! aplicación.

pub mod auth_routes;
pub mod dispatch_routes;
pub mod earnings_routes;
pub mod kyc_routes;
pub mod location_routes;
pub mod partner_routes;
pub mod session_routes;
pub mod support_routes;

use axum::Router;

use crate::state::AppState;

/// Ensamblar el router completo de la aplicación
pub fn create_app_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/auth", auth_routes::create_auth_router(state.clone()))
        .nest("/api/kyc", kyc_routes::create_kyc_router(state.clone()))
        .nest(
            "/api/partner",
            partner_routes::create_partner_router(state.clone()),
        )
        .nest(
            "/api/offers",
            dispatch_routes::create_dispatch_router(state.clone()),
        )
        .nest(
            "/api/sessions",
            session_routes::create_session_router(state.clone()),
        )
        .nest(
            "/api/locations",
            location_routes::create_location_router(state.clone()),
        )
        .nest(
            "/api/earnings",
            earnings_routes::create_earnings_router(state.clone()),
        )
        .nest(
            "/api/support",
            support_routes::create_support_router(state.clone()),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvironmentConfig;
    use axum::body::Body;
    use http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    fn test_config() -> EnvironmentConfig {
        EnvironmentConfig {
            environment: "development".to_string(),
            port: 0,
            host: "127.0.0.1".to_string(),
            jwt_secret: "integration-test-secret".to_string(),
            jwt_expiration: 3600,
            cors_origins: vec!["*".to_string()],
            offer_window_secs: 45,
            otp_ttl_secs: 300,
            external_retry_max: 3,
            external_retry_base_ms: 1,
        }
    }

    fn test_app() -> Router {
        create_app_router(AppState::new(test_config()))
    }

    async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = builder
            .body(match body {
                Some(value) => Body::from(serde_json::to_vec(&value).unwrap()),
                None => Body::empty(),
            })
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    /// Registrar un partner, verificar el OTP y devolver (token, id)
    async fn register_and_login(app: &Router, phone: &str) -> (String, String) {
        let (status, body) = call(
            app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "name": "Asha Verma",
                "phone": phone,
                "email": "asha@example.com",
                "city": "Mumbai",
                "zone": "Zone A",
                "password": "super-secret-pw"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let partner_id = body["data"]["partner"]["id"].as_str().unwrap().to_string();
        let challenge_id = body["data"]["otp"]["challenge_id"].as_str().unwrap();
        let dev_code = body["data"]["otp"]["dev_code"].as_str().unwrap();

        let (status, body) = call(
            app,
            Method::POST,
            "/api/auth/verify-otp",
            None,
            Some(json!({
                "phone": phone,
                "challenge_id": challenge_id,
                "code": dev_code
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let token = body["token"].as_str().unwrap().to_string();
        (token, partner_id)
    }

    async fn approve_kyc(app: &Router, token: &str, partner_id: &str) {
        let image = "aGVsbG8td29ybGQ=";
        let (status, _) = call(
            app,
            Method::POST,
            "/api/kyc/documents",
            Some(token),
            Some(json!({
                "id_type": "aadhaar",
                "id_front": image,
                "id_back": image,
                "selfie": image,
                "license_front": image,
                "license_back": image,
                "experience_years": 3
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(
            app,
            Method::POST,
            &format!("/api/kyc/review/{}", partner_id),
            None,
            Some(json!({ "outcome": "approved" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    fn inspection_json() -> Value {
        json!({
            "front": "aGVsbG8=",
            "back": "aGVsbG8=",
            "left": "aGVsbG8=",
            "right": "aGVsbG8=",
            "dashboard": "aGVsbG8=",
            "number_plate": "aGVsbG8=",
            "fuel_level": 50,
            "odometer_km": 15000,
            "damage_markers": []
        })
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        let app = test_app();

        let (status, body) = call(&app, Method::GET, "/api/partner/dashboard", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_phone() {
        let app = test_app();

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "name": "Asha Verma",
                "phone": "12345",
                "email": "asha@example.com",
                "city": "Mumbai",
                "zone": "Zone A",
                "password": "super-secret-pw"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_login_with_password_after_register() {
        let app = test_app();
        let phone = "+919810000001";
        register_and_login(&app, phone).await;

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "phone": phone, "password": "super-secret-pw" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["token"].as_str().is_some());

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "phone": phone, "password": "wrong-password" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_online_requires_approved_kyc() {
        let app = test_app();
        let (token, _) = register_and_login(&app, "+919810000002").await;

        let (status, body) = call(
            &app,
            Method::PUT,
            "/api/partner/availability",
            Some(&token),
            Some(json!({ "availability": "online" })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "ILLEGAL_TRANSITION");
    }

    #[tokio::test]
    async fn test_kyc_roundtrip_then_online() {
        let app = test_app();
        let (token, partner_id) = register_and_login(&app, "+919810000003").await;

        approve_kyc(&app, &token, &partner_id).await;

        let (status, body) = call(&app, Method::GET, "/api/kyc/status", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "approved");

        let (status, body) = call(
            &app,
            Method::PUT,
            "/api/partner/availability",
            Some(&token),
            Some(json!({ "availability": "online" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["availability"], "online");
    }

    #[tokio::test]
    async fn test_full_valet_flow_end_to_end() {
        let app = test_app();
        let (token, partner_id) = register_and_login(&app, "+919810000004").await;
        approve_kyc(&app, &token, &partner_id).await;

        call(
            &app,
            Method::PUT,
            "/api/partner/availability",
            Some(&token),
            Some(json!({ "availability": "online" })),
        )
        .await;

        // Crear una ubicación con pricing
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/locations",
            Some(&token),
            Some(json!({
                "name": "Central Plaza Parking",
                "address": "123 Main St, Mumbai",
                "total_slots": 20,
                "base_rate": 50,
                "min_duration_hours": 1,
                "extension_rate": 75,
                "vehicle_types": ["car", "suv"]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let location_id = body["data"]["id"].as_str().unwrap().to_string();

        // El despachador propone un request
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/offers",
            None,
            Some(json!({
                "partner_id": partner_id,
                "location_id": location_id,
                "vehicle_number": "MH-12-AB-1234",
                "vehicle_type": "sedan",
                "owner_phone": "+919800000000",
                "user_location": "123 Main St",
                "reserved_hours": 2,
                "estimated_earnings": 200,
                "distance_km": 1.2
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let offer_id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = call(&app, Method::GET, "/api/offers/current", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], offer_id.as_str());

        // Aceptar: nace la sesión en pickup_pending y el partner queda on_trip
        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/api/offers/{}/accept", offer_id),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let session_id = body["data"]["id"].as_str().unwrap().to_string();
        assert_eq!(body["data"]["status"], "pickup_pending");

        // OTP del dueño y confirmación de pickup
        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/api/sessions/{}/otp", session_id),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let challenge_id = body["challenge_id"].as_str().unwrap().to_string();
        let code = body["dev_code"].as_str().unwrap().to_string();

        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/api/sessions/{}/pickup", session_id),
            Some(&token),
            Some(json!({
                "inspection": inspection_json(),
                "challenge_id": challenge_id,
                "code": code
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "active");

        // Return anticipado más confirmación simétrica
        let (status, _) = call(
            &app,
            Method::POST,
            &format!("/api/sessions/{}/return/begin", session_id),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = call(
            &app,
            Method::POST,
            &format!("/api/sessions/{}/otp", session_id),
            Some(&token),
            None,
        )
        .await;
        let challenge_id = body["challenge_id"].as_str().unwrap().to_string();
        let code = body["dev_code"].as_str().unwrap().to_string();

        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/api/sessions/{}/return", session_id),
            Some(&token),
            Some(json!({
                "inspection": inspection_json(),
                "challenge_id": challenge_id,
                "code": code
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "completed");
        // Retorno inmediato: se factura la duración mínima
        assert_eq!(body["data"]["fare"], "50");

        // El partner vuelve online y la transacción queda registrada
        let (_, body) = call(&app, Method::GET, "/api/auth/me", Some(&token), None).await;
        assert_eq!(body["availability"], "online");

        let (_, body) = call(
            &app,
            Method::GET,
            "/api/earnings/summary?period=today",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(body["total"], "50");
        assert_eq!(body["sessions"], 1);

        let (_, body) = call(&app, Method::GET, "/api/partner/dashboard", Some(&token), None).await;
        assert_eq!(body["earnings_today"], "50");
        assert_eq!(body["available_slots"], 20);
    }

    #[tokio::test]
    async fn test_support_ticket_roundtrip() {
        let app = test_app();
        let (token, _) = register_and_login(&app, "+919810000005").await;

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/support/tickets",
            Some(&token),
            Some(json!({
                "subject": "Payment not received",
                "category": "payment",
                "description": "My last payout has not arrived yet."
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "open");

        let (_, body) = call(&app, Method::GET, "/api/support/tickets", Some(&token), None).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }
}
