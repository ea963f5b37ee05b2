//! Modelo de Trip
//!
//! Un viaje nace en DRAFT y solo se mueve por transiciones validadas.
//! Nunca se borra: los cancelados quedan como historial y el número de
//! viaje jamás se reutiliza.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;
use validator::Validate;

use crate::models::fuel_log::FuelLogResponse;
use crate::utils::numbers::{to_f64, to_f64_opt};

/// Estado del viaje - mapea al ENUM trip_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "trip_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TripStatus {
    Draft,
    Dispatched,
    InTransit,
    Completed,
    Cancelled,
}

impl TripStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Draft => "DRAFT",
            TripStatus::Dispatched => "DISPATCHED",
            TripStatus::InTransit => "IN_TRANSIT",
            TripStatus::Completed => "COMPLETED",
            TripStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for TripStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trip principal - mapea exactamente a la tabla trips
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Trip {
    pub id: Uuid,
    pub trip_number: String,
    pub status: TripStatus,
    pub vehicle_id: Uuid,
    pub driver_id: Uuid,
    pub created_by: Option<Uuid>,
    pub origin: String,
    pub destination: String,
    pub distance_km: Option<Decimal>,
    pub cargo_weight_kg: Decimal,
    pub cargo_description: Option<String>,
    pub estimated_fuel_cost: Option<Decimal>,
    pub odometer_start: Decimal,
    pub odometer_end: Option<Decimal>,
    pub revenue_generated: Option<Decimal>,
    pub cancellation_reason: Option<String>,
    pub dispatched_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request para crear un viaje (queda en DRAFT)
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTripRequest {
    pub vehicle_id: Uuid,

    pub driver_id: Uuid,

    #[validate(length(min = 2, max = 200))]
    pub origin: String,

    #[validate(length(min = 2, max = 200))]
    pub destination: String,

    #[validate(range(min = 0.1, max = 100000.0))]
    pub cargo_weight_kg: f64,

    #[validate(length(max = 500))]
    pub cargo_description: Option<String>,

    #[validate(range(min = 0.0))]
    pub estimated_fuel_cost: Option<f64>,

    #[validate(range(min = 0.0))]
    pub odometer_start: Option<f64>,

    #[validate(range(min = 0.0))]
    pub revenue_generated: Option<f64>,
}

/// Request para mover el viaje de estado
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTripStatusRequest {
    pub status: TripStatus,

    #[validate(range(min = 0.0))]
    pub odometer_end: Option<f64>,

    #[validate(range(min = 0.0))]
    pub revenue_generated: Option<f64>,

    #[validate(length(max = 500))]
    pub cancellation_reason: Option<String>,
}

/// Filtros para búsqueda de viajes
#[derive(Debug, Default, Deserialize)]
pub struct TripFilters {
    pub status: Option<TripStatus>,
    pub vehicle_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Response de viaje para la API
#[derive(Debug, Serialize)]
pub struct TripResponse {
    pub id: Uuid,
    pub trip_number: String,
    pub status: TripStatus,
    pub vehicle_id: Uuid,
    pub driver_id: Uuid,
    pub origin: String,
    pub destination: String,
    pub distance_km: Option<f64>,
    pub cargo_weight_kg: f64,
    pub cargo_description: Option<String>,
    pub estimated_fuel_cost: Option<f64>,
    pub odometer_start: f64,
    pub odometer_end: Option<f64>,
    pub revenue_generated: Option<f64>,
    pub cancellation_reason: Option<String>,
    pub dispatched_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Trip> for TripResponse {
    fn from(trip: Trip) -> Self {
        Self {
            id: trip.id,
            trip_number: trip.trip_number,
            status: trip.status,
            vehicle_id: trip.vehicle_id,
            driver_id: trip.driver_id,
            origin: trip.origin,
            destination: trip.destination,
            distance_km: to_f64_opt(trip.distance_km),
            cargo_weight_kg: to_f64(trip.cargo_weight_kg),
            cargo_description: trip.cargo_description,
            estimated_fuel_cost: to_f64_opt(trip.estimated_fuel_cost),
            odometer_start: to_f64(trip.odometer_start),
            odometer_end: to_f64_opt(trip.odometer_end),
            revenue_generated: to_f64_opt(trip.revenue_generated),
            cancellation_reason: trip.cancellation_reason,
            dispatched_at: trip.dispatched_at,
            completed_at: trip.completed_at,
            cancelled_at: trip.cancelled_at,
            created_at: trip.created_at,
        }
    }
}

/// Resumen del vehículo asignado, embebido en el detalle del viaje
#[derive(Debug, Serialize)]
pub struct TripVehicleSummary {
    pub id: Uuid,
    pub license_plate: String,
    pub make: String,
    pub model: String,
    #[serde(rename = "type")]
    pub vehicle_type: crate::models::vehicle::VehicleType,
}

/// Resumen del conductor asignado, embebido en el detalle del viaje
#[derive(Debug, Serialize)]
pub struct TripDriverSummary {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub license_category: crate::models::driver::LicenseCategory,
}

/// Detalle completo de un viaje: el registro más sus entidades asociadas
#[derive(Debug, Serialize)]
pub struct TripDetailResponse {
    #[serde(flatten)]
    pub trip: TripResponse,
    pub vehicle: Option<TripVehicleSummary>,
    pub driver: Option<TripDriverSummary>,
    pub fuel_logs: Vec<FuelLogResponse>,
}
