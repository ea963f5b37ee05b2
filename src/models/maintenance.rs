//! Modelo de Maintenance
//!
//! Registros de servicio de taller. Mientras un vehículo tenga al menos
//! un registro abierto queda retenido en IN_SHOP.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;
use validator::Validate;

use crate::utils::numbers::{to_f64, to_f64_opt};

/// Tipo de servicio - mapea al ENUM service_type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "service_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceType {
    OilChange,
    TireRotation,
    BrakeService,
    EngineRepair,
    Electrical,
    BodyWork,
    Inspection,
    Other,
}

/// MaintenanceLog - mapea exactamente a la tabla maintenance_logs
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MaintenanceLog {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub service_type: ServiceType,
    pub description: String,
    pub cost: Decimal,
    pub vendor: Option<String>,
    pub service_date: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub odometer_at_service: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MaintenanceLog {
    pub fn is_open(&self) -> bool {
        self.completed_at.is_none()
    }
}

/// Request para abrir un registro de mantenimiento
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMaintenanceRequest {
    pub vehicle_id: Uuid,

    pub service_type: ServiceType,

    #[validate(length(min = 5, max = 1000))]
    pub description: String,

    #[validate(range(min = 0.0, max = 10000000.0))]
    pub cost: f64,

    #[validate(length(max = 200))]
    pub vendor: Option<String>,

    pub service_date: DateTime<Utc>,

    #[validate(range(min = 0.0))]
    pub odometer_at_service: Option<f64>,
}

/// Request para editar un registro abierto (el vehículo no se cambia)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMaintenanceRequest {
    pub service_type: Option<ServiceType>,

    #[validate(length(min = 5, max = 1000))]
    pub description: Option<String>,

    #[validate(range(min = 0.0, max = 10000000.0))]
    pub cost: Option<f64>,

    #[validate(length(max = 200))]
    pub vendor: Option<String>,

    pub service_date: Option<DateTime<Utc>>,

    #[validate(range(min = 0.0))]
    pub odometer_at_service: Option<f64>,
}

/// Filtros para búsqueda de registros
#[derive(Debug, Default, Deserialize)]
pub struct MaintenanceFilters {
    pub vehicle_id: Option<Uuid>,
    pub service_type: Option<ServiceType>,
    /// true = solo abiertos, false = solo completados
    pub open: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Response de registro de mantenimiento
#[derive(Debug, Serialize)]
pub struct MaintenanceResponse {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub service_type: ServiceType,
    pub description: String,
    pub cost: f64,
    pub vendor: Option<String>,
    pub service_date: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub odometer_at_service: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl From<MaintenanceLog> for MaintenanceResponse {
    fn from(log: MaintenanceLog) -> Self {
        Self {
            id: log.id,
            vehicle_id: log.vehicle_id,
            service_type: log.service_type,
            description: log.description,
            cost: to_f64(log.cost),
            vendor: log.vendor,
            service_date: log.service_date,
            completed_at: log.completed_at,
            odometer_at_service: to_f64_opt(log.odometer_at_service),
            created_at: log.created_at,
        }
    }
}

/// Resultado de completar un registro: informa si el vehículo volvió
/// a estar disponible y cuántos registros abiertos quedan.
#[derive(Debug, Serialize)]
pub struct CompleteMaintenanceResponse {
    pub log: MaintenanceResponse,
    pub vehicle_restored: bool,
    pub remaining_open_logs: i64,
}
