//! Modelo de FuelLog
//!
//! Cargas de combustible por vehículo. El costo total siempre se calcula
//! del lado del servidor y la lectura del odómetro nunca puede retroceder.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::utils::numbers::to_f64;

/// FuelLog - mapea exactamente a la tabla fuel_logs
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FuelLog {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub trip_id: Option<Uuid>,
    pub liters: Decimal,
    pub cost_per_liter: Decimal,
    pub total_cost: Decimal,
    pub odometer_km: Decimal,
    pub driver_name: Option<String>,
    pub notes: Option<String>,
    pub logged_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Request para registrar una carga de combustible.
/// No acepta total_cost: se computa siempre en el servidor.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFuelLogRequest {
    pub vehicle_id: Uuid,

    #[validate(range(min = 0.1, max = 2000.0))]
    pub liters: f64,

    #[validate(range(min = 0.01, max = 1000.0))]
    pub cost_per_liter: f64,

    #[validate(range(min = 0.0))]
    pub odometer_km: f64,

    pub trip_id: Option<Uuid>,

    #[validate(length(max = 100))]
    pub driver_name: Option<String>,

    #[validate(length(max = 500))]
    pub notes: Option<String>,

    pub logged_at: Option<DateTime<Utc>>,
}

/// Filtros para búsqueda de cargas
#[derive(Debug, Default, Deserialize)]
pub struct FuelLogFilters {
    pub vehicle_id: Option<Uuid>,
    pub trip_id: Option<Uuid>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Response de carga de combustible
#[derive(Debug, Serialize)]
pub struct FuelLogResponse {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub trip_id: Option<Uuid>,
    pub liters: f64,
    pub cost_per_liter: f64,
    pub total_cost: f64,
    pub odometer_km: f64,
    pub driver_name: Option<String>,
    pub notes: Option<String>,
    pub logged_at: DateTime<Utc>,
}

impl From<FuelLog> for FuelLogResponse {
    fn from(log: FuelLog) -> Self {
        Self {
            id: log.id,
            vehicle_id: log.vehicle_id,
            trip_id: log.trip_id,
            liters: to_f64(log.liters),
            cost_per_liter: to_f64(log.cost_per_liter),
            total_cost: to_f64(log.total_cost),
            odometer_km: to_f64(log.odometer_km),
            driver_name: log.driver_name,
            notes: log.notes,
            logged_at: log.logged_at,
        }
    }
}

/// Response al registrar una carga: incluye el rendimiento contra la
/// carga anterior del mismo vehículo (null si es la primera).
#[derive(Debug, Serialize)]
pub struct RecordFuelResponse {
    pub log: FuelLogResponse,
    pub fuel_efficiency: Option<f64>,
}

/// Resumen de combustible por vehículo
#[derive(Debug, Serialize)]
pub struct FuelSummaryResponse {
    pub total_liters: f64,
    pub total_cost: f64,
    pub avg_efficiency: Option<f64>,
    pub fill_ups: usize,
}
