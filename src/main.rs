mod config;
mod controllers;
mod database;
mod dto;
mod events;
mod middleware;
mod models;
mod repositories;
mod routes;
mod services;
mod state;
mod utils;

use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use dotenvy::dotenv;
use serde_json::json;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

use config::environment::EnvironmentConfig;
use database::DatabaseConnection;
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

    info!("🔧 Pickup & Repair - Backend del taller a domicilio");
    info!("===================================================");

    // Inicializar base de datos
    let db_connection = match DatabaseConnection::new_default().await {
        Ok(conn) => conn,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    let pool = db_connection.pool().clone();

    // Crear router de la API
    let config = EnvironmentConfig::default();
    let cors = if config.is_development() {
        cors_middleware()
    } else {
        cors_middleware_with_origins(config.cors_origins.clone())
    };

    let app_state = AppState::new(pool, config);

    let app = Router::new()
        .route("/health", get(health_endpoint))
        .nest(
            "/api/requests",
            routes::customer_routes::create_request_router(app_state.clone()),
        )
        .nest(
            "/api/admin",
            routes::admin_routes::create_admin_router(app_state.clone()),
        )
        .layer(cors)
        .with_state(app_state.clone());

    // Puerto del servidor
    let port = app_state.config.port;
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("🚗 Endpoints de cliente:");
    info!("   POST /api/requests - Enviar solicitud (acepta visitantes)");
    info!("   POST /api/requests/raw - Reenvío post-login del payload validado");
    info!("   GET  /api/requests - Mis solicitudes activas");
    info!("   GET  /api/requests/:id - Vista de seguimiento");
    info!("   GET  /api/requests/:id/events - Stream SSE de cambios");
    info!("   POST /api/requests/:id/cancel - Cancelar solicitud");
    info!("   POST /api/requests/:id/quote/accept - Aceptar cotización");
    info!("   POST /api/requests/:id/quote/decline - Rechazar cotización");
    info!("   POST /api/requests/:id/payment - Avisar pago");
    info!("   POST /api/requests/:id/notes - Nota de recogida");
    info!("   POST /api/requests/:id/rating - Calificar servicio");
    info!("🛠️ Endpoints de admin:");
    info!("   GET  /api/admin/requests - Listar solicitudes activas");
    info!("   PUT  /api/admin/requests/:id - Corregir datos de la solicitud");
    info!("   DELETE /api/admin/requests/:id - Cancelar solicitud");
    info!("   POST /api/admin/requests/:id/driver - Asignar driver");
    info!("   POST /api/admin/requests/:id/status - Fijar estado");
    info!("   POST /api/admin/requests/:id/payment-status - Fijar estado de pago");
    info!("   GET/POST /api/admin/quotes - Cotizaciones");
    info!("   PUT/DELETE /api/admin/quotes/:id - Corregir/eliminar cotización");
    info!("   GET/POST /api/admin/drivers - Drivers");
    info!("   DELETE /api/admin/drivers/:id - Eliminar driver");
    info!("   GET/POST /api/admin/prices - Lista de precios");
    info!("   PUT/DELETE /api/admin/prices/:id - Corregir/eliminar precio");

    // Iniciar servidor
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            anyhow::anyhow!(e)
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Health check simple
async fn health_endpoint() -> Json<serde_json::Value> {
    Json(json!({
        "service": "pickup-repair",
        "status": "healthy",
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
