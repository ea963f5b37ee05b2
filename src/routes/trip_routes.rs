use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{get, patch, post},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::models::api::ApiResponse;
use crate::models::trip::{
    CreateTripRequest, TripDetailResponse, TripFilters, TripResponse, UpdateTripStatusRequest,
};
use crate::routes::requester_id;
use crate::services::trip_service::TripService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_trip_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_trip).get(list_trips))
        .route("/:id", get(get_trip))
        .route("/:id/status", patch(update_trip_status))
}

async fn create_trip(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateTripRequest>,
) -> Result<Json<ApiResponse<TripResponse>>, AppError> {
    request.validate()?;
    let service = TripService::new(state.store.clone());
    let trip = service.create(request, requester_id(&headers)).await?;
    Ok(Json(ApiResponse::success_with_message(
        trip.into(),
        "Trip created successfully".to_string(),
    )))
}

async fn list_trips(
    State(state): State<AppState>,
    Query(filters): Query<TripFilters>,
) -> Result<Json<Vec<TripResponse>>, AppError> {
    let service = TripService::new(state.store.clone());
    let trips = service.list(&filters).await?;
    Ok(Json(trips.into_iter().map(TripResponse::from).collect()))
}

async fn get_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TripDetailResponse>, AppError> {
    let service = TripService::new(state.store.clone());
    let detail = service.get_by_id(id).await?;
    Ok(Json(detail))
}

async fn update_trip_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTripStatusRequest>,
) -> Result<Json<ApiResponse<TripResponse>>, AppError> {
    request.validate()?;
    let service = TripService::new(state.store.clone());
    let trip = service.update_status(id, request).await?;
    Ok(Json(ApiResponse::success(trip.into())))
}
