mod config;
mod controllers;
mod dto;
mod middleware;
mod models;
mod repositories;
mod routes;
mod services;
mod state;
mod utils;

use anyhow::Result;
use axum::{response::Json, routing::get};
use dotenvy::dotenv;
use serde_json::json;
use std::net::SocketAddr;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use config::EnvironmentConfig;
use middleware::cors::{cors_middleware, cors_middleware_with_origins};
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("🅿️ Valet Partner State Service");
    info!("==============================");

    let config = EnvironmentConfig::from_env();
    let addr: SocketAddr = config.server_url().parse()?;

    // En producción solo los orígenes configurados
    let cors = if config.is_production() {
        cors_middleware_with_origins(config.cors_origins.clone())
    } else {
        cors_middleware()
    };

    // Estado compartido con colaboradores simulados
    let app_state = AppState::new(config);

    let app = routes::create_app_router(app_state)
        .route("/test", get(test_endpoint))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /test - Endpoint de prueba");
    info!("🔐 Endpoints - Auth:");
    info!("   POST /api/auth/register - Registrar partner");
    info!("   POST /api/auth/verify-otp - Verificar OTP");
    info!("   POST /api/auth/login - Login con contraseña");
    info!("   POST /api/auth/login-otp - Pedir OTP de login");
    info!("   GET  /api/auth/me - Partner actual");
    info!("📋 Endpoints - KYC:");
    info!("   POST /api/kyc/documents - Subir documentos");
    info!("   POST /api/kyc/review/:partner_id - Revisión externa");
    info!("   GET  /api/kyc/status - Estado KYC");
    info!("🔄 Endpoints - Partner:");
    info!("   PUT  /api/partner/availability - Cambiar disponibilidad");
    info!("   GET  /api/partner/dashboard - Dashboard");
    info!("📨 Endpoints - Ofertas:");
    info!("   POST /api/offers - Proponer request (despachador)");
    info!("   GET  /api/offers/current - Oferta pendiente");
    info!("   POST /api/offers/:id/accept - Aceptar oferta");
    info!("   POST /api/offers/:id/reject - Rechazar oferta");
    info!("🚗 Endpoints - Sesiones:");
    info!("   GET  /api/sessions - Listar sesiones");
    info!("   GET  /api/sessions/:id - Obtener sesión");
    info!("   POST /api/sessions/:id/otp - OTP de handover");
    info!("   POST /api/sessions/:id/pickup - Confirmar pickup");
    info!("   POST /api/sessions/:id/return/begin - Return anticipado");
    info!("   POST /api/sessions/:id/return - Confirmar return");
    info!("   POST /api/sessions/:id/extend - Extender reserva");
    info!("   GET  /api/sessions/:id/messages - Chat de la sesión");
    info!("   POST /api/sessions/:id/messages - Enviar mensaje");
    info!("📍 Endpoints - Ubicaciones:");
    info!("   POST /api/locations - Crear ubicación");
    info!("   GET  /api/locations - Listar ubicaciones");
    info!("   GET  /api/locations/:id - Obtener ubicación");
    info!("   PUT  /api/locations/:id - Actualizar ubicación");
    info!("   DELETE /api/locations/:id - Desactivar ubicación");
    info!("💰 Endpoints - Earnings:");
    info!("   GET  /api/earnings/summary - Resumen por período");
    info!("   GET  /api/earnings/transactions - Transacciones");
    info!("   POST /api/earnings/payout-methods - Alta método de cobro");
    info!("   GET  /api/earnings/payout-methods - Métodos de cobro");
    info!("   POST /api/earnings/payouts - Ejecutar payout");
    info!("🎫 Endpoints - Soporte:");
    info!("   POST /api/support/tickets - Crear ticket");
    info!("   GET  /api/support/tickets - Listar tickets");
    info!("   GET  /api/support/disputes - Disputas");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            anyhow::anyhow!("Server error: {}", e)
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Endpoint de prueba simple
async fn test_endpoint() -> Json<serde_json::Value> {
    Json(json!({
        "message": "¡Valet Partner State Service funcionando correctamente!",
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
