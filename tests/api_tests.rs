use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Json;
use serde_json::{json, Value};
use tower::util::ServiceExt;

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app();
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["service"], "valet-partner");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = create_test_app();
    let response = app
        .oneshot(Request::get("/does-not-exist").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// Función helper para crear la app de test
fn create_test_app() -> axum::Router {
    axum::Router::new().route(
        "/health",
        axum::routing::get(|| async {
            Json(json!({
                "service": "valet-partner",
                "status": "healthy",
            }))
        }),
    )
}
