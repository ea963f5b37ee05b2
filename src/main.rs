use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use dotenvy::dotenv;
use serde_json::json;
use tokio::signal;
use tracing::{error, info};

use fleet_backoffice::config::environment::EnvironmentConfig;
use fleet_backoffice::database;
use fleet_backoffice::middleware::cors::{cors_middleware, cors_middleware_with_origins};
use fleet_backoffice::routes;
use fleet_backoffice::state::AppState;
use fleet_backoffice::store::postgres::PgFleetStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("🚚 Fleet Back Office - API de operaciones de flota");
    info!("==================================================");

    let config = EnvironmentConfig::default();

    // Inicializar base de datos
    let pool = match database::create_pool(None).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(e);
        }
    };

    if let Err(e) = database::connection::run_migrations(&pool).await {
        error!("❌ Error ejecutando migraciones: {}", e);
        return Err(e);
    }
    info!("✅ Migraciones aplicadas");

    let store = Arc::new(PgFleetStore::new(pool));
    let app_state = AppState::new(store, config.clone());

    // CORS: permisivo en desarrollo, orígenes explícitos en producción
    let cors = if config.cors_origins.is_empty() {
        cors_middleware()
    } else {
        cors_middleware_with_origins(config.cors_origins.clone())
    };

    let app = Router::new()
        .route("/health", get(health_endpoint))
        .nest("/api/vehicles", routes::vehicle_routes::create_vehicle_router())
        .nest("/api/drivers", routes::driver_routes::create_driver_router())
        .nest("/api/trips", routes::trip_routes::create_trip_router())
        .nest(
            "/api/maintenance",
            routes::maintenance_routes::create_maintenance_router(),
        )
        .nest("/api/fuel-logs", routes::fuel_routes::create_fuel_router())
        .layer(cors)
        .with_state(app_state);

    let addr: SocketAddr = config.server_addr().parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("🚗 Vehicles:");
    info!("   POST /api/vehicles - Registrar vehículo");
    info!("   GET  /api/vehicles - Listar vehículos");
    info!("   GET  /api/vehicles/available - Vehículos despachables");
    info!("   GET  /api/vehicles/:id - Obtener vehículo");
    info!("   GET  /api/vehicles/:id/history - Historial y resumen financiero");
    info!("   PUT  /api/vehicles/:id - Actualizar vehículo");
    info!("   POST /api/vehicles/:id/retire - Retirar vehículo");
    info!("👤 Drivers:");
    info!("   POST /api/drivers - Registrar conductor");
    info!("   GET  /api/drivers - Listar conductores");
    info!("   GET  /api/drivers/available - Conductores despachables");
    info!("   PATCH /api/drivers/:id/status - Cambiar estado de servicio");
    info!("   POST /api/drivers/:id/incidents - Reportar incidente");
    info!("   DELETE /api/drivers/:id - Baja lógica");
    info!("🚚 Trips:");
    info!("   POST /api/trips - Crear viaje (DRAFT)");
    info!("   GET  /api/trips - Listar viajes");
    info!("   GET  /api/trips/:id - Detalle del viaje");
    info!("   PATCH /api/trips/:id/status - Transición de estado");
    info!("🔧 Maintenance:");
    info!("   POST /api/maintenance - Abrir registro (vehículo a IN_SHOP)");
    info!("   GET  /api/maintenance/open - Registros abiertos");
    info!("   POST /api/maintenance/:id/complete - Cerrar registro");
    info!("⛽ Fuel:");
    info!("   POST /api/fuel-logs - Registrar carga");
    info!("   GET  /api/fuel-logs/vehicle/:id/summary - Resumen por vehículo");

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
        "service": "fleet-backoffice",
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
