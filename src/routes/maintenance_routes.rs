use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::models::api::ApiResponse;
use crate::models::maintenance::{
    CompleteMaintenanceResponse, CreateMaintenanceRequest, MaintenanceFilters, MaintenanceResponse,
    UpdateMaintenanceRequest,
};
use crate::services::maintenance_service::MaintenanceService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_maintenance_router() -> Router<AppState> {
    Router::new()
        .route("/", post(open_maintenance).get(list_maintenance))
        .route("/open", get(open_logs))
        .route("/:id", get(get_maintenance).put(update_maintenance))
        .route("/:id/complete", post(complete_maintenance))
}

async fn open_maintenance(
    State(state): State<AppState>,
    Json(request): Json<CreateMaintenanceRequest>,
) -> Result<Json<ApiResponse<MaintenanceResponse>>, AppError> {
    request.validate()?;
    let service = MaintenanceService::new(state.store.clone());
    let log = service.open(request).await?;
    Ok(Json(ApiResponse::success_with_message(
        log.into(),
        "Maintenance log created successfully".to_string(),
    )))
}

async fn list_maintenance(
    State(state): State<AppState>,
    Query(filters): Query<MaintenanceFilters>,
) -> Result<Json<Vec<MaintenanceResponse>>, AppError> {
    let service = MaintenanceService::new(state.store.clone());
    let logs = service.list(&filters).await?;
    Ok(Json(logs.into_iter().map(MaintenanceResponse::from).collect()))
}

async fn open_logs(
    State(state): State<AppState>,
) -> Result<Json<Vec<MaintenanceResponse>>, AppError> {
    let service = MaintenanceService::new(state.store.clone());
    let logs = service.open_logs().await?;
    Ok(Json(logs.into_iter().map(MaintenanceResponse::from).collect()))
}

async fn get_maintenance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MaintenanceResponse>, AppError> {
    let service = MaintenanceService::new(state.store.clone());
    let log = service.get_by_id(id).await?;
    Ok(Json(log.into()))
}

async fn update_maintenance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateMaintenanceRequest>,
) -> Result<Json<ApiResponse<MaintenanceResponse>>, AppError> {
    request.validate()?;
    let service = MaintenanceService::new(state.store.clone());
    let log = service.update(id, request).await?;
    Ok(Json(ApiResponse::success(log.into())))
}

async fn complete_maintenance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CompleteMaintenanceResponse>>, AppError> {
    let service = MaintenanceService::new(state.store.clone());
    let result = service.complete(id).await?;
    Ok(Json(ApiResponse::success(result)))
}
