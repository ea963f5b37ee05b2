//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP apropiadas. Cada fallo de negocio
//! tiene un código estable que el dashboard usa para mostrar mensajes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde_json::json;
use thiserror::Error;

use crate::models::driver::LicenseCategory;
use crate::models::trip::TripStatus;
use crate::models::vehicle::VehicleType;

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    // ── Vehículos ─────────────────────────────────────────────────────────
    #[error("Vehicle not found")]
    VehicleNotFound,

    #[error("Vehicle is not available - it may be on a trip or in the shop")]
    VehicleNotAvailable,

    #[error("Vehicle is currently on a trip. Complete or cancel the trip first.")]
    VehicleOnTrip,

    #[error("Vehicle is currently in the shop. Complete all maintenance first.")]
    VehicleInShop,

    #[error("Cannot assign a retired vehicle")]
    VehicleRetired,

    #[error("A vehicle with license plate '{0}' is already registered")]
    PlateExists(String),

    // ── Conductores ───────────────────────────────────────────────────────
    #[error("Driver not found")]
    DriverNotFound,

    #[error("Driver is suspended and cannot be assigned to trips")]
    DriverSuspended,

    #[error("Driver is not available - check their duty status")]
    DriverNotAvailable,

    #[error("Cannot deactivate a driver currently on duty or on a trip")]
    DriverOnDuty,

    #[error("Driver's license has expired. Renew before assigning.")]
    LicenseExpired,

    #[error("Driver holds a {category} license but vehicle type is {vehicle_type}")]
    LicenseCategoryMismatch {
        category: LicenseCategory,
        vehicle_type: VehicleType,
    },

    #[error("A suspended driver must be set to OFF_DUTY before returning to duty")]
    DriverStillSuspended,

    #[error("A reason is required when suspending a driver")]
    SuspensionReasonRequired,

    // ── Viajes ────────────────────────────────────────────────────────────
    #[error("Trip not found")]
    TripNotFound,

    #[error("Cannot move a trip from \"{from}\" to \"{to}\"")]
    InvalidTransition { from: TripStatus, to: TripStatus },

    #[error("Cargo weight ({cargo_kg}kg) exceeds vehicle max capacity ({max_kg}kg)")]
    Overweight { cargo_kg: Decimal, max_kg: Decimal },

    #[error("A cancellation reason is required")]
    CancellationReasonRequired,

    #[error("A final odometer reading is required when completing a trip")]
    OdometerRequired,

    #[error("Odometer reading ({reading} km) cannot be less than the current value ({current} km)")]
    OdometerRegression { reading: Decimal, current: Decimal },

    // ── Mantenimiento ─────────────────────────────────────────────────────
    #[error("Maintenance log not found")]
    MaintenanceNotFound,

    #[error("This maintenance log is already marked as complete")]
    MaintenanceAlreadyComplete,

    // ── Combustible ───────────────────────────────────────────────────────
    #[error("Fuel log not found")]
    FuelLogNotFound,

    #[error("The selected trip does not belong to this vehicle")]
    TripVehicleMismatch,

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl AppError {
    /// Código estable legible por máquina para cada tipo de fallo
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DB_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::VehicleNotFound => "VEHICLE_NOT_FOUND",
            AppError::VehicleNotAvailable => "VEHICLE_NOT_AVAILABLE",
            AppError::VehicleOnTrip => "VEHICLE_ON_TRIP",
            AppError::VehicleInShop => "VEHICLE_IN_SHOP",
            AppError::VehicleRetired => "VEHICLE_RETIRED",
            AppError::PlateExists(_) => "VEHICLE_PLATE_EXISTS",
            AppError::DriverNotFound => "DRIVER_NOT_FOUND",
            AppError::DriverSuspended => "DRIVER_SUSPENDED",
            AppError::DriverNotAvailable => "DRIVER_NOT_AVAILABLE",
            AppError::DriverOnDuty => "DRIVER_ON_DUTY",
            AppError::LicenseExpired => "DRIVER_LICENSE_EXPIRED",
            AppError::LicenseCategoryMismatch { .. } => "DRIVER_LICENSE_MISMATCH",
            AppError::DriverStillSuspended => "INVALID_STATUS_TRANSITION",
            AppError::SuspensionReasonRequired => "SUSPENSION_REASON_REQUIRED",
            AppError::TripNotFound => "TRIP_NOT_FOUND",
            AppError::InvalidTransition { .. } => "INVALID_TRIP_TRANSITION",
            AppError::Overweight { .. } => "TRIP_OVERWEIGHT",
            AppError::CancellationReasonRequired => "TRIP_CANCEL_REASON_REQUIRED",
            AppError::OdometerRequired => "ODOMETER_REQUIRED",
            AppError::OdometerRegression { .. } => "INVALID_ODOMETER",
            AppError::MaintenanceNotFound => "MAINTENANCE_NOT_FOUND",
            AppError::MaintenanceAlreadyComplete => "MAINTENANCE_ALREADY_COMPLETE",
            AppError::FuelLogNotFound => "FUEL_LOG_NOT_FOUND",
            AppError::TripVehicleMismatch => "TRIP_VEHICLE_MISMATCH",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,

            AppError::VehicleNotFound
            | AppError::DriverNotFound
            | AppError::TripNotFound
            | AppError::MaintenanceNotFound
            | AppError::FuelLogNotFound => StatusCode::NOT_FOUND,

            AppError::VehicleNotAvailable
            | AppError::VehicleOnTrip
            | AppError::VehicleInShop
            | AppError::VehicleRetired
            | AppError::PlateExists(_)
            | AppError::DriverSuspended
            | AppError::DriverNotAvailable
            | AppError::DriverOnDuty
            | AppError::LicenseExpired
            | AppError::LicenseCategoryMismatch { .. }
            | AppError::MaintenanceAlreadyComplete => StatusCode::CONFLICT,

            AppError::Validation(_)
            | AppError::DriverStillSuspended
            | AppError::SuspensionReasonRequired
            | AppError::InvalidTransition { .. }
            | AppError::Overweight { .. }
            | AppError::CancellationReasonRequired
            | AppError::OdometerRequired
            | AppError::OdometerRegression { .. }
            | AppError::TripVehicleMismatch => StatusCode::BAD_REQUEST,
        }
    }

    /// Valores en conflicto para que el dashboard arme mensajes precisos
    fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::Database(e) => Some(json!({ "sql_error": e.to_string() })),
            AppError::Validation(e) => Some(json!(e)),
            AppError::LicenseCategoryMismatch { category, vehicle_type } => Some(json!({
                "license_category": category,
                "vehicle_type": vehicle_type,
            })),
            AppError::InvalidTransition { from, to } => Some(json!({
                "from": from,
                "to": to,
            })),
            AppError::Overweight { cargo_kg, max_kg } => Some(json!({
                "cargo_weight_kg": cargo_kg,
                "max_capacity_kg": max_kg,
            })),
            AppError::OdometerRegression { reading, current } => Some(json!({
                "odometer_reading_km": reading,
                "current_odometer_km": current,
            })),
            AppError::Internal(msg) => Some(json!({ "internal_error": msg })),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Los errores inesperados van al log; los de negocio son ruido normal
        match &self {
            AppError::Database(e) => eprintln!("Database error: {}", e),
            AppError::Internal(msg) => eprintln!("Internal error: {}", msg),
            _ => {}
        }

        let message = match &self {
            // No filtrar detalles internos de SQL al cliente
            AppError::Database(_) => "An error occurred while accessing the database".to_string(),
            AppError::Internal(_) => "An unexpected error occurred".to_string(),
            AppError::Validation(_) => "The provided data is invalid".to_string(),
            other => other.to_string(),
        };

        let body = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message,
            details: self.details(),
            code: Some(self.code().to_string()),
        };

        (status, Json(body)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de validación con un solo campo
pub fn validation_error(field: &'static str, message: &'static str) -> AppError {
    use validator::ValidationError;

    let mut error = ValidationError::new("custom");
    error.add_param("message".into(), &message);

    let mut errors = validator::ValidationErrors::new();
    errors.add(field, error);

    AppError::Validation(errors)
}
