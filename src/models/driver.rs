//! Modelo de Driver
//!
//! Conductores de la flota: licencia, estado de servicio, puntaje de
//! seguridad e incidentes. Mapea a las tablas `drivers` y
//! `driver_incidents`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;
use validator::Validate;

use crate::domain::rules;
use crate::models::vehicle::VehicleType;

/// Estado de servicio del conductor - mapea al ENUM driver_status
///
/// ON_TRIP es el marcador de lease: lo escribe el despacho de un viaje
/// y solo lo limpia la finalización o cancelación del mismo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "driver_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DriverStatus {
    OnDuty,
    OffDuty,
    OnTrip,
    Suspended,
}

impl DriverStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverStatus::OnDuty => "ON_DUTY",
            DriverStatus::OffDuty => "OFF_DUTY",
            DriverStatus::OnTrip => "ON_TRIP",
            DriverStatus::Suspended => "SUSPENDED",
        }
    }
}

impl std::fmt::Display for DriverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Categoría de licencia - misma taxonomía que el tipo de vehículo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "license_category", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LicenseCategory {
    Truck,
    Van,
    Bike,
}

impl LicenseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            LicenseCategory::Truck => "TRUCK",
            LicenseCategory::Van => "VAN",
            LicenseCategory::Bike => "BIKE",
        }
    }

    /// La licencia habilita exactamente un tipo de vehículo
    pub fn covers(&self, vehicle_type: VehicleType) -> bool {
        self.as_str() == vehicle_type.as_str()
    }
}

impl std::fmt::Display for LicenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Estado computado de la licencia - nunca se persiste
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LicenseStatus {
    Valid,
    ExpiringSoon,
    Expired,
}

/// Driver principal - mapea exactamente a la tabla drivers
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Driver {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub license_number: String,
    pub license_category: LicenseCategory,
    pub license_expiry_date: DateTime<Utc>,
    pub status: DriverStatus,
    pub safety_score: i32,
    pub total_trips: i32,
    pub completed_trips: i32,
    pub is_active: bool,
    pub suspended_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Incidente de seguridad reportado contra un conductor
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DriverIncident {
    pub id: Uuid,
    pub driver_id: Uuid,
    pub trip_id: Option<Uuid>,
    pub description: String,
    pub severity: i32,
    pub reported_by: Option<String>,
    pub reported_at: DateTime<Utc>,
}

/// Request para registrar un conductor
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDriverRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: String,

    #[validate(length(min = 7, max = 20))]
    pub phone: String,

    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(min = 5, max = 30))]
    pub license_number: String,

    pub license_category: LicenseCategory,

    pub license_expiry_date: DateTime<Utc>,
}

/// Request para actualizar datos del conductor
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDriverRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: Option<String>,

    #[validate(length(min = 7, max = 20))]
    pub phone: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(min = 5, max = 30))]
    pub license_number: Option<String>,

    pub license_category: Option<LicenseCategory>,

    pub license_expiry_date: Option<DateTime<Utc>>,
}

/// Request para cambiar el estado de servicio
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDriverStatusRequest {
    pub status: DriverStatus,

    #[validate(length(min = 3, max = 500))]
    pub suspended_reason: Option<String>,
}

/// Request para reportar un incidente de seguridad
#[derive(Debug, Deserialize, Validate)]
pub struct LogIncidentRequest {
    #[validate(range(min = 1, max = 5))]
    pub severity: i32,

    #[validate(length(min = 5, max = 1000))]
    pub description: String,

    pub trip_id: Option<Uuid>,

    #[validate(length(max = 100))]
    pub reported_by: Option<String>,
}

/// Filtros para búsqueda de conductores
#[derive(Debug, Default, Deserialize)]
pub struct DriverFilters {
    pub status: Option<DriverStatus>,
    pub license_category: Option<LicenseCategory>,
    pub is_active: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Response de conductor con los campos computados que consume el dashboard
#[derive(Debug, Serialize)]
pub struct DriverResponse {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub license_number: String,
    pub license_category: LicenseCategory,
    pub license_expiry_date: DateTime<Utc>,
    pub license_status: LicenseStatus,
    pub status: DriverStatus,
    pub safety_score: i32,
    pub total_trips: i32,
    pub completed_trips: i32,
    pub completion_rate: f64,
    pub is_active: bool,
    pub suspended_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Driver> for DriverResponse {
    fn from(driver: Driver) -> Self {
        let license_status = rules::license_status(driver.license_expiry_date, Utc::now());
        Self {
            id: driver.id,
            name: driver.name,
            phone: driver.phone,
            email: driver.email,
            license_number: driver.license_number,
            license_category: driver.license_category,
            license_expiry_date: driver.license_expiry_date,
            license_status,
            status: driver.status,
            safety_score: driver.safety_score,
            total_trips: driver.total_trips,
            completed_trips: driver.completed_trips,
            completion_rate: rules::completion_rate(driver.completed_trips, driver.total_trips),
            is_active: driver.is_active,
            suspended_reason: driver.suspended_reason,
            created_at: driver.created_at,
        }
    }
}

/// Response al reportar un incidente
#[derive(Debug, Serialize)]
pub struct IncidentResponse {
    pub incident: DriverIncident,
    pub penalty_applied: i32,
    pub new_safety_score: i32,
}
