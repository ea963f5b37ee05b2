use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::api::ApiResponse;
use crate::models::vehicle::{
    CreateVehicleRequest, UpdateVehicleRequest, VehicleFilters, VehicleResponse, VehicleType,
};
use crate::services::vehicle_service::{VehicleHistoryResponse, VehicleService};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_vehicle).get(list_vehicles))
        .route("/available", get(available_vehicles))
        .route("/:id", get(get_vehicle).put(update_vehicle))
        .route("/:id/history", get(vehicle_history))
        .route("/:id/retire", post(retire_vehicle))
}

#[derive(Debug, Deserialize)]
struct AvailableQuery {
    #[serde(rename = "type")]
    vehicle_type: Option<VehicleType>,
}

async fn create_vehicle(
    State(state): State<AppState>,
    Json(request): Json<CreateVehicleRequest>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    request.validate()?;
    let service = VehicleService::new(state.store.clone());
    let vehicle = service.create(request).await?;
    Ok(Json(ApiResponse::success_with_message(
        vehicle.into(),
        "Vehicle created successfully".to_string(),
    )))
}

async fn list_vehicles(
    State(state): State<AppState>,
    Query(filters): Query<VehicleFilters>,
) -> Result<Json<Vec<VehicleResponse>>, AppError> {
    let service = VehicleService::new(state.store.clone());
    let vehicles = service.list(&filters).await?;
    Ok(Json(
        vehicles.into_iter().map(VehicleResponse::from).collect(),
    ))
}

async fn available_vehicles(
    State(state): State<AppState>,
    Query(query): Query<AvailableQuery>,
) -> Result<Json<Vec<VehicleResponse>>, AppError> {
    let service = VehicleService::new(state.store.clone());
    let vehicles = service.available(query.vehicle_type).await?;
    Ok(Json(
        vehicles.into_iter().map(VehicleResponse::from).collect(),
    ))
}

async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VehicleResponse>, AppError> {
    let service = VehicleService::new(state.store.clone());
    let vehicle = service.get_by_id(id).await?;
    Ok(Json(vehicle.into()))
}

async fn vehicle_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VehicleHistoryResponse>, AppError> {
    let service = VehicleService::new(state.store.clone());
    let history = service.history(id).await?;
    Ok(Json(history))
}

async fn update_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateVehicleRequest>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    request.validate()?;
    let service = VehicleService::new(state.store.clone());
    let vehicle = service.update(id, request).await?;
    Ok(Json(ApiResponse::success_with_message(
        vehicle.into(),
        "Vehicle updated successfully".to_string(),
    )))
}

async fn retire_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    let service = VehicleService::new(state.store.clone());
    let vehicle = service.retire(id).await?;
    Ok(Json(ApiResponse::success_with_message(
        vehicle.into(),
        "Vehicle retired successfully".to_string(),
    )))
}
