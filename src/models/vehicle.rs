//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle y sus variantes para CRUD
//! operations. Mapea exactamente a la tabla `vehicles` del schema.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;
use validator::Validate;

use crate::utils::numbers::to_f64;

/// Tipo de vehículo - mapea al ENUM vehicle_type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "vehicle_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleType {
    Truck,
    Van,
    Bike,
}

impl VehicleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::Truck => "TRUCK",
            VehicleType::Van => "VAN",
            VehicleType::Bike => "BIKE",
        }
    }
}

impl std::fmt::Display for VehicleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Estado del vehículo - mapea al ENUM vehicle_status
///
/// ON_TRIP e IN_SHOP implican exactamente un "dueño" del recurso:
/// un viaje activo o un conjunto de mantenimientos abiertos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "vehicle_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleStatus {
    Available,
    OnTrip,
    InShop,
    Retired,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Available => "AVAILABLE",
            VehicleStatus::OnTrip => "ON_TRIP",
            VehicleStatus::InShop => "IN_SHOP",
            VehicleStatus::Retired => "RETIRED",
        }
    }
}

impl std::fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vehicle principal - mapea exactamente a la tabla vehicles
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Vehicle {
    pub id: Uuid,
    pub license_plate: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub vehicle_type: VehicleType,
    pub max_capacity_kg: Decimal,
    pub odometer_km: Decimal,
    pub status: VehicleStatus,
    pub acquisition_cost: Decimal,
    pub notes: Option<String>,
    pub is_active: bool,
    pub retired_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request para registrar un vehículo nuevo
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 5, max = 20))]
    pub license_plate: String,

    #[validate(length(min = 2, max = 100))]
    pub make: String,

    #[validate(length(min = 1, max = 100))]
    pub model: String,

    #[validate(range(min = 1980, max = 2030))]
    pub year: i32,

    #[serde(rename = "type")]
    pub vehicle_type: VehicleType,

    #[validate(range(min = 1.0, max = 100000.0))]
    pub max_capacity_kg: f64,

    #[validate(range(min = 0.0))]
    pub odometer_km: Option<f64>,

    #[validate(range(min = 0.0))]
    pub acquisition_cost: f64,

    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

/// Request para actualizar un vehículo existente.
/// La matrícula no se puede cambiar: es el identificador físico.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    #[validate(length(min = 2, max = 100))]
    pub make: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub model: Option<String>,

    #[validate(range(min = 1980, max = 2030))]
    pub year: Option<i32>,

    #[serde(rename = "type")]
    pub vehicle_type: Option<VehicleType>,

    #[validate(range(min = 1.0, max = 100000.0))]
    pub max_capacity_kg: Option<f64>,

    #[validate(range(min = 0.0))]
    pub odometer_km: Option<f64>,

    #[validate(range(min = 0.0))]
    pub acquisition_cost: Option<f64>,

    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

/// Filtros para búsqueda de vehículos
#[derive(Debug, Default, Deserialize)]
pub struct VehicleFilters {
    pub status: Option<VehicleStatus>,
    #[serde(rename = "type")]
    pub vehicle_type: Option<VehicleType>,
    pub is_active: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Response de vehículo para la API
#[derive(Debug, Serialize)]
pub struct VehicleResponse {
    pub id: Uuid,
    pub license_plate: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    #[serde(rename = "type")]
    pub vehicle_type: VehicleType,
    pub max_capacity_kg: f64,
    pub odometer_km: f64,
    pub status: VehicleStatus,
    pub acquisition_cost: f64,
    pub notes: Option<String>,
    pub is_active: bool,
    pub retired_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Vehicle> for VehicleResponse {
    fn from(vehicle: Vehicle) -> Self {
        Self {
            id: vehicle.id,
            license_plate: vehicle.license_plate,
            make: vehicle.make,
            model: vehicle.model,
            year: vehicle.year,
            vehicle_type: vehicle.vehicle_type,
            max_capacity_kg: to_f64(vehicle.max_capacity_kg),
            odometer_km: to_f64(vehicle.odometer_km),
            status: vehicle.status,
            acquisition_cost: to_f64(vehicle.acquisition_cost),
            notes: vehicle.notes,
            is_active: vehicle.is_active,
            retired_at: vehicle.retired_at,
            created_at: vehicle.created_at,
        }
    }
}
