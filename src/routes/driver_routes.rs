use axum::{
    extract::{Path, Query, State},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::api::ApiResponse;
use crate::models::driver::{
    CreateDriverRequest, DriverFilters, DriverResponse, IncidentResponse, LicenseCategory,
    LogIncidentRequest, UpdateDriverRequest, UpdateDriverStatusRequest,
};
use crate::services::driver_service::DriverService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_driver_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_driver).get(list_drivers))
        .route("/available", get(available_drivers))
        .route(
            "/:id",
            get(get_driver).put(update_driver).delete(deactivate_driver),
        )
        .route("/:id/status", patch(update_driver_status))
        .route("/:id/incidents", post(log_incident))
}

#[derive(Debug, Deserialize)]
struct AvailableQuery {
    license_category: Option<LicenseCategory>,
}

async fn create_driver(
    State(state): State<AppState>,
    Json(request): Json<CreateDriverRequest>,
) -> Result<Json<ApiResponse<DriverResponse>>, AppError> {
    request.validate()?;
    let service = DriverService::new(state.store.clone());
    let driver = service.create(request).await?;
    Ok(Json(ApiResponse::success_with_message(
        driver.into(),
        "Driver created successfully".to_string(),
    )))
}

async fn list_drivers(
    State(state): State<AppState>,
    Query(filters): Query<DriverFilters>,
) -> Result<Json<Vec<DriverResponse>>, AppError> {
    let service = DriverService::new(state.store.clone());
    let drivers = service.list(&filters).await?;
    Ok(Json(drivers.into_iter().map(DriverResponse::from).collect()))
}

async fn available_drivers(
    State(state): State<AppState>,
    Query(query): Query<AvailableQuery>,
) -> Result<Json<Vec<DriverResponse>>, AppError> {
    let service = DriverService::new(state.store.clone());
    let drivers = service.available(query.license_category).await?;
    Ok(Json(drivers.into_iter().map(DriverResponse::from).collect()))
}

async fn get_driver(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DriverResponse>, AppError> {
    let service = DriverService::new(state.store.clone());
    let driver = service.get_by_id(id).await?;
    Ok(Json(driver.into()))
}

async fn update_driver(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateDriverRequest>,
) -> Result<Json<ApiResponse<DriverResponse>>, AppError> {
    request.validate()?;
    let service = DriverService::new(state.store.clone());
    let driver = service.update(id, request).await?;
    Ok(Json(ApiResponse::success(driver.into())))
}

async fn update_driver_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateDriverStatusRequest>,
) -> Result<Json<ApiResponse<DriverResponse>>, AppError> {
    request.validate()?;
    let service = DriverService::new(state.store.clone());
    let driver = service.set_status(id, request).await?;
    Ok(Json(ApiResponse::success(driver.into())))
}

async fn log_incident(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<LogIncidentRequest>,
) -> Result<Json<ApiResponse<IncidentResponse>>, AppError> {
    request.validate()?;
    let service = DriverService::new(state.store.clone());
    let result = service.log_incident(id, request).await?;
    Ok(Json(ApiResponse::success(result)))
}

async fn deactivate_driver(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let service = DriverService::new(state.store.clone());
    service.deactivate(id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Driver deactivated successfully"
    })))
}
