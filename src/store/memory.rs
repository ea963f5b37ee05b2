//! Implementación en memoria del FleetStore
//!
//! Respaldada por un RwLock sobre mapas. Cada unidad de trabajo toma el
//! lock de escritura una sola vez, con lo que sus verificaciones y
//! escrituras son atómicas igual que una transacción de base de datos.
//! La usan todos los tests de services y de ciclo de vida.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::driver::{Driver, DriverFilters, DriverIncident, DriverStatus};
use crate::models::fuel_log::{FuelLog, FuelLogFilters};
use crate::models::maintenance::{MaintenanceFilters, MaintenanceLog};
use crate::models::trip::{Trip, TripFilters, TripStatus};
use crate::models::vehicle::{Vehicle, VehicleFilters, VehicleStatus};
use crate::store::{
    DriverChanges, FleetStore, MaintenanceChanges, MaintenanceClosed, NewDriver, NewFuelLog,
    NewIncident, NewMaintenanceLog, NewTrip, NewVehicle, TripCancellation, TripCompletion,
    TripDispatch, VehicleChanges,
};
use crate::utils::errors::{AppError, AppResult};

const DEFAULT_PAGE_SIZE: i64 = 50;

#[derive(Default)]
struct MemoryInner {
    vehicles: HashMap<Uuid, Vehicle>,
    drivers: HashMap<Uuid, Driver>,
    trips: HashMap<Uuid, Trip>,
    maintenance: HashMap<Uuid, MaintenanceLog>,
    fuel_logs: HashMap<Uuid, FuelLog>,
    incidents: HashMap<Uuid, DriverIncident>,
    trip_seq: i64,
}

#[derive(Default)]
pub struct MemoryFleetStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryFleetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn apply_page<T>(mut items: Vec<T>, limit: Option<i64>, offset: Option<i64>) -> Vec<T> {
    let offset = offset.unwrap_or(0).max(0) as usize;
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1) as usize;
    if offset >= items.len() {
        return Vec::new();
    }
    items.drain(..offset);
    items.truncate(limit);
    items
}

#[async_trait]
impl FleetStore for MemoryFleetStore {
    // ── Vehículos ─────────────────────────────────────────────────────────

    async fn insert_vehicle(&self, vehicle: NewVehicle) -> AppResult<Vehicle> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();
        let record = Vehicle {
            id: Uuid::new_v4(),
            license_plate: vehicle.license_plate,
            make: vehicle.make,
            model: vehicle.model,
            year: vehicle.year,
            vehicle_type: vehicle.vehicle_type,
            max_capacity_kg: vehicle.max_capacity_kg,
            odometer_km: vehicle.odometer_km,
            status: VehicleStatus::Available,
            acquisition_cost: vehicle.acquisition_cost,
            notes: vehicle.notes,
            is_active: true,
            retired_at: None,
            created_at: now,
            updated_at: now,
        };
        inner.vehicles.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_vehicle(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        let inner = self.inner.read().await;
        Ok(inner.vehicles.get(&id).filter(|v| v.is_active).cloned())
    }

    async fn list_vehicles(&self, filters: &VehicleFilters) -> AppResult<Vec<Vehicle>> {
        let inner = self.inner.read().await;
        let mut vehicles: Vec<Vehicle> = inner
            .vehicles
            .values()
            .filter(|v| v.is_active == filters.is_active.unwrap_or(true))
            .filter(|v| filters.status.map_or(true, |s| v.status == s))
            .filter(|v| filters.vehicle_type.map_or(true, |t| v.vehicle_type == t))
            .cloned()
            .collect();
        vehicles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(apply_page(vehicles, filters.limit, filters.offset))
    }

    async fn update_vehicle(&self, id: Uuid, changes: VehicleChanges) -> AppResult<Vehicle> {
        let mut inner = self.inner.write().await;
        let vehicle = inner
            .vehicles
            .get_mut(&id)
            .filter(|v| v.is_active)
            .ok_or(AppError::VehicleNotFound)?;

        if let Some(make) = changes.make {
            vehicle.make = make;
        }
        if let Some(model) = changes.model {
            vehicle.model = model;
        }
        if let Some(year) = changes.year {
            vehicle.year = year;
        }
        if let Some(vehicle_type) = changes.vehicle_type {
            vehicle.vehicle_type = vehicle_type;
        }
        if let Some(capacity) = changes.max_capacity_kg {
            vehicle.max_capacity_kg = capacity;
        }
        if let Some(odometer) = changes.odometer_km {
            vehicle.odometer_km = odometer;
        }
        if let Some(cost) = changes.acquisition_cost {
            vehicle.acquisition_cost = cost;
        }
        if let Some(notes) = changes.notes {
            vehicle.notes = Some(notes);
        }
        vehicle.updated_at = Utc::now();
        Ok(vehicle.clone())
    }

    async fn retire_vehicle(&self, id: Uuid, retired_at: DateTime<Utc>) -> AppResult<Vehicle> {
        let mut inner = self.inner.write().await;
        let vehicle = inner
            .vehicles
            .get_mut(&id)
            .filter(|v| v.is_active)
            .ok_or(AppError::VehicleNotFound)?;

        vehicle.is_active = false;
        vehicle.status = VehicleStatus::Retired;
        vehicle.retired_at = Some(retired_at);
        vehicle.updated_at = retired_at;
        Ok(vehicle.clone())
    }

    async fn plate_exists(&self, license_plate: &str) -> AppResult<bool> {
        let inner = self.inner.read().await;
        Ok(inner
            .vehicles
            .values()
            .any(|v| v.license_plate == license_plate))
    }

    // ── Conductores ───────────────────────────────────────────────────────

    async fn insert_driver(&self, driver: NewDriver) -> AppResult<Driver> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();
        let record = Driver {
            id: Uuid::new_v4(),
            name: driver.name,
            phone: driver.phone,
            email: driver.email,
            license_number: driver.license_number,
            license_category: driver.license_category,
            license_expiry_date: driver.license_expiry_date,
            status: DriverStatus::OffDuty,
            safety_score: 100,
            total_trips: 0,
            completed_trips: 0,
            is_active: true,
            suspended_reason: None,
            created_at: now,
            updated_at: now,
        };
        inner.drivers.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_driver(&self, id: Uuid) -> AppResult<Option<Driver>> {
        let inner = self.inner.read().await;
        Ok(inner.drivers.get(&id).filter(|d| d.is_active).cloned())
    }

    async fn list_drivers(&self, filters: &DriverFilters) -> AppResult<Vec<Driver>> {
        let inner = self.inner.read().await;
        let mut drivers: Vec<Driver> = inner
            .drivers
            .values()
            .filter(|d| d.is_active == filters.is_active.unwrap_or(true))
            .filter(|d| filters.status.map_or(true, |s| d.status == s))
            .filter(|d| {
                filters
                    .license_category
                    .map_or(true, |c| d.license_category == c)
            })
            .cloned()
            .collect();
        drivers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(apply_page(drivers, filters.limit, filters.offset))
    }

    async fn update_driver(&self, id: Uuid, changes: DriverChanges) -> AppResult<Driver> {
        let mut inner = self.inner.write().await;
        let driver = inner
            .drivers
            .get_mut(&id)
            .filter(|d| d.is_active)
            .ok_or(AppError::DriverNotFound)?;

        if let Some(name) = changes.name {
            driver.name = name;
        }
        if let Some(phone) = changes.phone {
            driver.phone = phone;
        }
        if let Some(email) = changes.email {
            driver.email = Some(email);
        }
        if let Some(number) = changes.license_number {
            driver.license_number = number;
        }
        if let Some(category) = changes.license_category {
            driver.license_category = category;
        }
        if let Some(expiry) = changes.license_expiry_date {
            driver.license_expiry_date = expiry;
        }
        driver.updated_at = Utc::now();
        Ok(driver.clone())
    }

    async fn set_driver_status(
        &self,
        id: Uuid,
        status: DriverStatus,
        suspended_reason: Option<String>,
    ) -> AppResult<Driver> {
        let mut inner = self.inner.write().await;
        let driver = inner
            .drivers
            .get_mut(&id)
            .filter(|d| d.is_active)
            .ok_or(AppError::DriverNotFound)?;

        driver.status = status;
        driver.suspended_reason = suspended_reason;
        driver.updated_at = Utc::now();
        Ok(driver.clone())
    }

    async fn deactivate_driver(&self, id: Uuid) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        let driver = inner
            .drivers
            .get_mut(&id)
            .filter(|d| d.is_active)
            .ok_or(AppError::DriverNotFound)?;

        driver.is_active = false;
        driver.status = DriverStatus::OffDuty;
        driver.updated_at = Utc::now();
        Ok(())
    }

    async fn record_incident(
        &self,
        incident: NewIncident,
        new_safety_score: i32,
    ) -> AppResult<DriverIncident> {
        let mut inner = self.inner.write().await;

        let driver = inner
            .drivers
            .get_mut(&incident.driver_id)
            .ok_or(AppError::DriverNotFound)?;
        driver.safety_score = new_safety_score;
        driver.updated_at = Utc::now();

        let record = DriverIncident {
            id: Uuid::new_v4(),
            driver_id: incident.driver_id,
            trip_id: incident.trip_id,
            description: incident.description,
            severity: incident.severity,
            reported_by: incident.reported_by,
            reported_at: Utc::now(),
        };
        inner.incidents.insert(record.id, record.clone());
        Ok(record)
    }

    // ── Viajes ────────────────────────────────────────────────────────────

    async fn next_trip_number(&self) -> AppResult<i64> {
        let mut inner = self.inner.write().await;
        inner.trip_seq += 1;
        Ok(inner.trip_seq)
    }

    async fn insert_trip(&self, trip: NewTrip) -> AppResult<Trip> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();
        let record = Trip {
            id: Uuid::new_v4(),
            trip_number: trip.trip_number,
            status: TripStatus::Draft,
            vehicle_id: trip.vehicle_id,
            driver_id: trip.driver_id,
            created_by: trip.created_by,
            origin: trip.origin,
            destination: trip.destination,
            distance_km: None,
            cargo_weight_kg: trip.cargo_weight_kg,
            cargo_description: trip.cargo_description,
            estimated_fuel_cost: trip.estimated_fuel_cost,
            odometer_start: trip.odometer_start,
            odometer_end: None,
            revenue_generated: trip.revenue_generated,
            cancellation_reason: None,
            dispatched_at: None,
            completed_at: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        };
        inner.trips.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_trip(&self, id: Uuid) -> AppResult<Option<Trip>> {
        let inner = self.inner.read().await;
        Ok(inner.trips.get(&id).cloned())
    }

    async fn list_trips(&self, filters: &TripFilters) -> AppResult<Vec<Trip>> {
        let inner = self.inner.read().await;
        let mut trips: Vec<Trip> = inner
            .trips
            .values()
            .filter(|t| filters.status.map_or(true, |s| t.status == s))
            .filter(|t| filters.vehicle_id.map_or(true, |v| t.vehicle_id == v))
            .filter(|t| filters.driver_id.map_or(true, |d| t.driver_id == d))
            .cloned()
            .collect();
        trips.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(apply_page(trips, filters.limit, filters.offset))
    }

    async fn dispatch_trip(&self, dispatch: TripDispatch) -> AppResult<Trip> {
        // Un solo lock de escritura: la verificación y las tres
        // escrituras son atómicas frente a otros despachos
        let mut inner = self.inner.write().await;

        let vehicle_status = inner
            .vehicles
            .get(&dispatch.vehicle_id)
            .map(|v| v.status)
            .ok_or(AppError::VehicleNotFound)?;
        if vehicle_status != VehicleStatus::Available {
            return Err(AppError::VehicleNotAvailable);
        }

        {
            let trip = inner
                .trips
                .get_mut(&dispatch.trip_id)
                .ok_or(AppError::TripNotFound)?;
            trip.status = TripStatus::Dispatched;
            trip.dispatched_at = Some(dispatch.dispatched_at);
            trip.updated_at = dispatch.dispatched_at;
        }
        if let Some(vehicle) = inner.vehicles.get_mut(&dispatch.vehicle_id) {
            vehicle.status = VehicleStatus::OnTrip;
            vehicle.updated_at = dispatch.dispatched_at;
        }
        if let Some(driver) = inner.drivers.get_mut(&dispatch.driver_id) {
            driver.status = DriverStatus::OnTrip;
            driver.updated_at = dispatch.dispatched_at;
        }

        Ok(inner.trips[&dispatch.trip_id].clone())
    }

    async fn mark_trip_in_transit(&self, trip_id: Uuid) -> AppResult<Trip> {
        let mut inner = self.inner.write().await;
        let trip = inner
            .trips
            .get_mut(&trip_id)
            .ok_or(AppError::TripNotFound)?;
        trip.status = TripStatus::InTransit;
        trip.updated_at = Utc::now();
        Ok(trip.clone())
    }

    async fn complete_trip(&self, completion: TripCompletion) -> AppResult<Trip> {
        let mut inner = self.inner.write().await;

        {
            let trip = inner
                .trips
                .get_mut(&completion.trip_id)
                .ok_or(AppError::TripNotFound)?;
            trip.status = TripStatus::Completed;
            trip.completed_at = Some(completion.completed_at);
            trip.odometer_end = Some(completion.odometer_end);
            trip.distance_km = Some(completion.distance_km);
            if completion.revenue_generated.is_some() {
                trip.revenue_generated = completion.revenue_generated;
            }
            trip.updated_at = completion.completed_at;
        }
        if let Some(vehicle) = inner.vehicles.get_mut(&completion.vehicle_id) {
            vehicle.status = VehicleStatus::Available;
            vehicle.odometer_km = completion.odometer_end;
            vehicle.updated_at = completion.completed_at;
        }
        if let Some(driver) = inner.drivers.get_mut(&completion.driver_id) {
            driver.status = DriverStatus::OnDuty;
            driver.completed_trips += 1;
            driver.total_trips += 1;
            driver.updated_at = completion.completed_at;
        }

        Ok(inner.trips[&completion.trip_id].clone())
    }

    async fn cancel_trip(&self, cancellation: TripCancellation) -> AppResult<Trip> {
        let mut inner = self.inner.write().await;

        {
            let trip = inner
                .trips
                .get_mut(&cancellation.trip_id)
                .ok_or(AppError::TripNotFound)?;
            trip.status = TripStatus::Cancelled;
            trip.cancelled_at = Some(cancellation.cancelled_at);
            trip.cancellation_reason = Some(cancellation.reason.clone());
            trip.updated_at = cancellation.cancelled_at;
        }

        if cancellation.release_lease {
            if let Some(vehicle) = inner.vehicles.get_mut(&cancellation.vehicle_id) {
                vehicle.status = VehicleStatus::Available;
                vehicle.updated_at = cancellation.cancelled_at;
            }
            if let Some(driver) = inner.drivers.get_mut(&cancellation.driver_id) {
                driver.status = DriverStatus::OnDuty;
                driver.total_trips += 1;
                driver.updated_at = cancellation.cancelled_at;
            }
        }

        Ok(inner.trips[&cancellation.trip_id].clone())
    }

    // ── Mantenimiento ─────────────────────────────────────────────────────

    async fn open_maintenance(&self, log: NewMaintenanceLog) -> AppResult<MaintenanceLog> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();
        let record = MaintenanceLog {
            id: Uuid::new_v4(),
            vehicle_id: log.vehicle_id,
            service_type: log.service_type,
            description: log.description,
            cost: log.cost,
            vendor: log.vendor,
            service_date: log.service_date,
            completed_at: None,
            odometer_at_service: log.odometer_at_service,
            created_at: now,
            updated_at: now,
        };
        inner.maintenance.insert(record.id, record.clone());

        if let Some(vehicle) = inner.vehicles.get_mut(&log.vehicle_id) {
            vehicle.status = VehicleStatus::InShop;
            vehicle.updated_at = now;
        }
        Ok(record)
    }

    async fn find_maintenance(&self, id: Uuid) -> AppResult<Option<MaintenanceLog>> {
        let inner = self.inner.read().await;
        Ok(inner.maintenance.get(&id).cloned())
    }

    async fn list_maintenance(&self, filters: &MaintenanceFilters) -> AppResult<Vec<MaintenanceLog>> {
        let inner = self.inner.read().await;
        let mut logs: Vec<MaintenanceLog> = inner
            .maintenance
            .values()
            .filter(|m| filters.vehicle_id.map_or(true, |v| m.vehicle_id == v))
            .filter(|m| filters.service_type.map_or(true, |s| m.service_type == s))
            .filter(|m| filters.open.map_or(true, |open| m.is_open() == open))
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.service_date.cmp(&a.service_date));
        Ok(apply_page(logs, filters.limit, filters.offset))
    }

    async fn update_maintenance(
        &self,
        id: Uuid,
        changes: MaintenanceChanges,
    ) -> AppResult<MaintenanceLog> {
        let mut inner = self.inner.write().await;
        let log = inner
            .maintenance
            .get_mut(&id)
            .ok_or(AppError::MaintenanceNotFound)?;

        if let Some(service_type) = changes.service_type {
            log.service_type = service_type;
        }
        if let Some(description) = changes.description {
            log.description = description;
        }
        if let Some(cost) = changes.cost {
            log.cost = cost;
        }
        if let Some(vendor) = changes.vendor {
            log.vendor = Some(vendor);
        }
        if let Some(service_date) = changes.service_date {
            log.service_date = service_date;
        }
        if let Some(odometer) = changes.odometer_at_service {
            log.odometer_at_service = Some(odometer);
        }
        log.updated_at = Utc::now();
        Ok(log.clone())
    }

    async fn close_maintenance(
        &self,
        log_id: Uuid,
        vehicle_id: Uuid,
        completed_at: DateTime<Utc>,
    ) -> AppResult<MaintenanceClosed> {
        let mut inner = self.inner.write().await;

        let log = {
            let log = inner
                .maintenance
                .get_mut(&log_id)
                .ok_or(AppError::MaintenanceNotFound)?;
            if log.completed_at.is_some() {
                return Err(AppError::MaintenanceAlreadyComplete);
            }
            log.completed_at = Some(completed_at);
            log.updated_at = completed_at;
            log.clone()
        };

        let remaining = inner
            .maintenance
            .values()
            .filter(|m| m.vehicle_id == vehicle_id && m.is_open())
            .count() as i64;

        // "El último en salir" restaura la disponibilidad
        let vehicle_restored = remaining == 0;
        if vehicle_restored {
            if let Some(vehicle) = inner.vehicles.get_mut(&vehicle_id) {
                vehicle.status = VehicleStatus::Available;
                vehicle.updated_at = completed_at;
            }
        }

        Ok(MaintenanceClosed {
            log,
            vehicle_restored,
            remaining_open_logs: remaining,
        })
    }

    // ── Combustible ───────────────────────────────────────────────────────

    async fn insert_fuel_log(&self, log: NewFuelLog) -> AppResult<FuelLog> {
        let mut inner = self.inner.write().await;
        let record = FuelLog {
            id: Uuid::new_v4(),
            vehicle_id: log.vehicle_id,
            trip_id: log.trip_id,
            liters: log.liters,
            cost_per_liter: log.cost_per_liter,
            total_cost: log.total_cost,
            odometer_km: log.odometer_km,
            driver_name: log.driver_name,
            notes: log.notes,
            logged_at: log.logged_at,
            created_at: Utc::now(),
        };
        inner.fuel_logs.insert(record.id, record.clone());

        if let Some(vehicle) = inner.vehicles.get_mut(&log.vehicle_id) {
            vehicle.odometer_km = log.odometer_km;
            vehicle.updated_at = Utc::now();
        }
        Ok(record)
    }

    async fn find_fuel_log(&self, id: Uuid) -> AppResult<Option<FuelLog>> {
        let inner = self.inner.read().await;
        Ok(inner.fuel_logs.get(&id).cloned())
    }

    async fn list_fuel_logs(&self, filters: &FuelLogFilters) -> AppResult<Vec<FuelLog>> {
        let inner = self.inner.read().await;
        let mut logs: Vec<FuelLog> = inner
            .fuel_logs
            .values()
            .filter(|f| filters.vehicle_id.map_or(true, |v| f.vehicle_id == v))
            .filter(|f| filters.trip_id.map_or(true, |t| f.trip_id == Some(t)))
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.logged_at.cmp(&a.logged_at));
        Ok(apply_page(logs, filters.limit, filters.offset))
    }

    async fn latest_fuel_log(&self, vehicle_id: Uuid) -> AppResult<Option<FuelLog>> {
        let inner = self.inner.read().await;
        Ok(inner
            .fuel_logs
            .values()
            .filter(|f| f.vehicle_id == vehicle_id)
            .max_by(|a, b| a.odometer_km.cmp(&b.odometer_km))
            .cloned())
    }
}
