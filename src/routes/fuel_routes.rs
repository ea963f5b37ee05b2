use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::models::api::ApiResponse;
use crate::models::fuel_log::{
    CreateFuelLogRequest, FuelLogFilters, FuelLogResponse, FuelSummaryResponse, RecordFuelResponse,
};
use crate::services::fuel_service::FuelService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_fuel_router() -> Router<AppState> {
    Router::new()
        .route("/", post(record_fuel).get(list_fuel_logs))
        .route("/:id", get(get_fuel_log))
        .route("/vehicle/:vehicle_id/summary", get(vehicle_fuel_summary))
}

async fn record_fuel(
    State(state): State<AppState>,
    Json(request): Json<CreateFuelLogRequest>,
) -> Result<Json<ApiResponse<RecordFuelResponse>>, AppError> {
    request.validate()?;
    let service = FuelService::new(state.store.clone());
    let result = service.record(request).await?;
    Ok(Json(ApiResponse::success_with_message(
        result,
        "Fuel log created successfully".to_string(),
    )))
}

async fn list_fuel_logs(
    State(state): State<AppState>,
    Query(filters): Query<FuelLogFilters>,
) -> Result<Json<Vec<FuelLogResponse>>, AppError> {
    let service = FuelService::new(state.store.clone());
    let logs = service.list(&filters).await?;
    Ok(Json(logs.into_iter().map(FuelLogResponse::from).collect()))
}

async fn get_fuel_log(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FuelLogResponse>, AppError> {
    let service = FuelService::new(state.store.clone());
    let log = service.get_by_id(id).await?;
    Ok(Json(log.into()))
}

async fn vehicle_fuel_summary(
    State(state): State<AppState>,
    Path(vehicle_id): Path<Uuid>,
) -> Result<Json<FuelSummaryResponse>, AppError> {
    let service = FuelService::new(state.store.clone());
    let summary = service.vehicle_summary(vehicle_id).await?;
    Ok(Json(summary))
}
