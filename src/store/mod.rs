//! Abstracción de persistencia
//!
//! `FleetStore` es la única puerta a la base de datos. Los services
//! reciben un `Arc<dyn FleetStore>` y nunca tocan SQL directamente, lo
//! que permite correr toda la lógica contra la implementación en memoria
//! en los tests.
//!
//! Las mutaciones que tocan más de un registro (despacho, finalización,
//! cancelación, taller, combustible) son métodos de unidad de trabajo:
//! cada uno commitea todas sus escrituras en una sola transacción o
//! ninguna.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::driver::{Driver, DriverFilters, DriverIncident, DriverStatus, LicenseCategory};
use crate::models::fuel_log::{FuelLog, FuelLogFilters};
use crate::models::maintenance::{MaintenanceFilters, MaintenanceLog, ServiceType};
use crate::models::trip::{Trip, TripFilters};
use crate::models::vehicle::{Vehicle, VehicleFilters, VehicleType};
use crate::utils::errors::AppResult;

// ─── Registros nuevos ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub license_plate: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub vehicle_type: VehicleType,
    pub max_capacity_kg: Decimal,
    pub odometer_km: Decimal,
    pub acquisition_cost: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewDriver {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub license_number: String,
    pub license_category: LicenseCategory,
    pub license_expiry_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTrip {
    pub trip_number: String,
    pub vehicle_id: Uuid,
    pub driver_id: Uuid,
    pub created_by: Option<Uuid>,
    pub origin: String,
    pub destination: String,
    pub cargo_weight_kg: Decimal,
    pub cargo_description: Option<String>,
    pub estimated_fuel_cost: Option<Decimal>,
    pub odometer_start: Decimal,
    pub revenue_generated: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct NewMaintenanceLog {
    pub vehicle_id: Uuid,
    pub service_type: ServiceType,
    pub description: String,
    pub cost: Decimal,
    pub vendor: Option<String>,
    pub service_date: DateTime<Utc>,
    pub odometer_at_service: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct NewFuelLog {
    pub vehicle_id: Uuid,
    pub trip_id: Option<Uuid>,
    pub liters: Decimal,
    pub cost_per_liter: Decimal,
    pub total_cost: Decimal,
    pub odometer_km: Decimal,
    pub driver_name: Option<String>,
    pub notes: Option<String>,
    pub logged_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewIncident {
    pub driver_id: Uuid,
    pub trip_id: Option<Uuid>,
    pub description: String,
    pub severity: i32,
    pub reported_by: Option<String>,
}

// ─── Cambios parciales ────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct VehicleChanges {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub vehicle_type: Option<VehicleType>,
    pub max_capacity_kg: Option<Decimal>,
    pub odometer_km: Option<Decimal>,
    pub acquisition_cost: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DriverChanges {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub license_number: Option<String>,
    pub license_category: Option<LicenseCategory>,
    pub license_expiry_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct MaintenanceChanges {
    pub service_type: Option<ServiceType>,
    pub description: Option<String>,
    pub cost: Option<Decimal>,
    pub vendor: Option<String>,
    pub service_date: Option<DateTime<Utc>>,
    pub odometer_at_service: Option<Decimal>,
}

// ─── Unidades de trabajo ──────────────────────────────────────────────────

/// Despacho: viaje a DISPATCHED + lease de vehículo y conductor.
/// El store re-verifica que el vehículo siga AVAILABLE dentro de la
/// transacción; si no, falla con `VehicleNotAvailable` sin escribir nada.
#[derive(Debug, Clone)]
pub struct TripDispatch {
    pub trip_id: Uuid,
    pub vehicle_id: Uuid,
    pub driver_id: Uuid,
    pub dispatched_at: DateTime<Utc>,
}

/// Finalización: viaje a COMPLETED + liberación de vehículo (odómetro
/// avanzado) y conductor (contadores incrementados).
#[derive(Debug, Clone)]
pub struct TripCompletion {
    pub trip_id: Uuid,
    pub vehicle_id: Uuid,
    pub driver_id: Uuid,
    pub odometer_end: Decimal,
    pub distance_km: Decimal,
    pub revenue_generated: Option<Decimal>,
    pub completed_at: DateTime<Utc>,
}

/// Cancelación: `release_lease` indica si el viaje llegó a despacharse.
/// Un DRAFT cancelado solo toca el registro del viaje.
#[derive(Debug, Clone)]
pub struct TripCancellation {
    pub trip_id: Uuid,
    pub vehicle_id: Uuid,
    pub driver_id: Uuid,
    pub reason: String,
    pub release_lease: bool,
    pub cancelled_at: DateTime<Utc>,
}

/// Resultado de cerrar un registro de mantenimiento
#[derive(Debug, Clone)]
pub struct MaintenanceClosed {
    pub log: MaintenanceLog,
    pub vehicle_restored: bool,
    pub remaining_open_logs: i64,
}

// ─── Trait ────────────────────────────────────────────────────────────────

#[async_trait]
pub trait FleetStore: Send + Sync {
    // Vehículos. Las lecturas devuelven solo registros activos.
    async fn insert_vehicle(&self, vehicle: NewVehicle) -> AppResult<Vehicle>;
    async fn find_vehicle(&self, id: Uuid) -> AppResult<Option<Vehicle>>;
    async fn list_vehicles(&self, filters: &VehicleFilters) -> AppResult<Vec<Vehicle>>;
    async fn update_vehicle(&self, id: Uuid, changes: VehicleChanges) -> AppResult<Vehicle>;
    async fn retire_vehicle(&self, id: Uuid, retired_at: DateTime<Utc>) -> AppResult<Vehicle>;
    async fn plate_exists(&self, license_plate: &str) -> AppResult<bool>;

    // Conductores
    async fn insert_driver(&self, driver: NewDriver) -> AppResult<Driver>;
    async fn find_driver(&self, id: Uuid) -> AppResult<Option<Driver>>;
    async fn list_drivers(&self, filters: &DriverFilters) -> AppResult<Vec<Driver>>;
    async fn update_driver(&self, id: Uuid, changes: DriverChanges) -> AppResult<Driver>;
    async fn set_driver_status(
        &self,
        id: Uuid,
        status: DriverStatus,
        suspended_reason: Option<String>,
    ) -> AppResult<Driver>;
    async fn deactivate_driver(&self, id: Uuid) -> AppResult<()>;
    /// Inserta el incidente y fija el nuevo puntaje en la misma transacción
    async fn record_incident(
        &self,
        incident: NewIncident,
        new_safety_score: i32,
    ) -> AppResult<DriverIncident>;

    // Viajes
    /// Secuencia global y monótona; los números no se reutilizan nunca,
    /// ni siquiera tras una cancelación.
    async fn next_trip_number(&self) -> AppResult<i64>;
    async fn insert_trip(&self, trip: NewTrip) -> AppResult<Trip>;
    async fn find_trip(&self, id: Uuid) -> AppResult<Option<Trip>>;
    async fn list_trips(&self, filters: &TripFilters) -> AppResult<Vec<Trip>>;
    async fn dispatch_trip(&self, dispatch: TripDispatch) -> AppResult<Trip>;
    async fn mark_trip_in_transit(&self, trip_id: Uuid) -> AppResult<Trip>;
    async fn complete_trip(&self, completion: TripCompletion) -> AppResult<Trip>;
    async fn cancel_trip(&self, cancellation: TripCancellation) -> AppResult<Trip>;

    // Mantenimiento
    /// Crea el registro abierto y deja el vehículo IN_SHOP, atómicamente
    async fn open_maintenance(&self, log: NewMaintenanceLog) -> AppResult<MaintenanceLog>;
    async fn find_maintenance(&self, id: Uuid) -> AppResult<Option<MaintenanceLog>>;
    async fn list_maintenance(&self, filters: &MaintenanceFilters) -> AppResult<Vec<MaintenanceLog>>;
    async fn update_maintenance(
        &self,
        id: Uuid,
        changes: MaintenanceChanges,
    ) -> AppResult<MaintenanceLog>;
    /// Cierra el registro y, solo si no queda ningún otro abierto para el
    /// vehículo, lo restaura a AVAILABLE. Conteo y restauración ocurren en
    /// la misma transacción que el cierre.
    async fn close_maintenance(
        &self,
        log_id: Uuid,
        vehicle_id: Uuid,
        completed_at: DateTime<Utc>,
    ) -> AppResult<MaintenanceClosed>;

    // Combustible
    /// Inserta la carga y avanza el odómetro del vehículo, atómicamente
    async fn insert_fuel_log(&self, log: NewFuelLog) -> AppResult<FuelLog>;
    async fn find_fuel_log(&self, id: Uuid) -> AppResult<Option<FuelLog>>;
    async fn list_fuel_logs(&self, filters: &FuelLogFilters) -> AppResult<Vec<FuelLog>>;
    /// Última carga por odómetro, para el cálculo de rendimiento
    async fn latest_fuel_log(&self, vehicle_id: Uuid) -> AppResult<Option<FuelLog>>;
}
