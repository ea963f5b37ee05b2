//! Implementación PostgreSQL del FleetStore
//!
//! SQL crudo con sqlx sobre el pool compartido. Cada unidad de trabajo
//! abre una transacción propia; las verificaciones de carrera (vehículo
//! todavía AVAILABLE, conteo de registros abiertos) se hacen dentro de
//! esa transacción.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::driver::{Driver, DriverFilters, DriverIncident, DriverStatus};
use crate::models::fuel_log::{FuelLog, FuelLogFilters};
use crate::models::maintenance::{MaintenanceFilters, MaintenanceLog};
use crate::models::trip::{Trip, TripFilters};
use crate::models::vehicle::{Vehicle, VehicleFilters, VehicleStatus};
use crate::store::{
    DriverChanges, FleetStore, MaintenanceChanges, MaintenanceClosed, NewDriver, NewFuelLog,
    NewIncident, NewMaintenanceLog, NewTrip, NewVehicle, TripCancellation, TripCompletion,
    TripDispatch, VehicleChanges,
};
use crate::utils::errors::{AppError, AppResult};

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;

fn page(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = offset.unwrap_or(0).max(0);
    (limit, offset)
}

pub struct PgFleetStore {
    pool: PgPool,
}

impl PgFleetStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FleetStore for PgFleetStore {
    // ── Vehículos ─────────────────────────────────────────────────────────

    async fn insert_vehicle(&self, vehicle: NewVehicle) -> AppResult<Vehicle> {
        let inserted = sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles
                (id, license_plate, make, model, year, vehicle_type,
                 max_capacity_kg, odometer_km, status, acquisition_cost, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'AVAILABLE', $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(vehicle.license_plate)
        .bind(vehicle.make)
        .bind(vehicle.model)
        .bind(vehicle.year)
        .bind(vehicle.vehicle_type)
        .bind(vehicle.max_capacity_kg)
        .bind(vehicle.odometer_km)
        .bind(vehicle.acquisition_cost)
        .bind(vehicle.notes)
        .fetch_one(&self.pool)
        .await?;

        Ok(inserted)
    }

    async fn find_vehicle(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            "SELECT * FROM vehicles WHERE id = $1 AND is_active = TRUE",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(vehicle)
    }

    async fn list_vehicles(&self, filters: &VehicleFilters) -> AppResult<Vec<Vehicle>> {
        let (limit, offset) = page(filters.limit, filters.offset);

        // Por defecto solo vehículos activos, salvo que pidan lo contrario
        let vehicles = sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT * FROM vehicles
            WHERE is_active = COALESCE($1, TRUE)
              AND ($2::vehicle_status IS NULL OR status = $2)
              AND ($3::vehicle_type IS NULL OR vehicle_type = $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(filters.is_active)
        .bind(filters.status)
        .bind(filters.vehicle_type)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(vehicles)
    }

    async fn update_vehicle(&self, id: Uuid, changes: VehicleChanges) -> AppResult<Vehicle> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles SET
                make = COALESCE($2, make),
                model = COALESCE($3, model),
                year = COALESCE($4, year),
                vehicle_type = COALESCE($5, vehicle_type),
                max_capacity_kg = COALESCE($6, max_capacity_kg),
                odometer_km = COALESCE($7, odometer_km),
                acquisition_cost = COALESCE($8, acquisition_cost),
                notes = COALESCE($9, notes),
                updated_at = NOW()
            WHERE id = $1 AND is_active = TRUE
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.make)
        .bind(changes.model)
        .bind(changes.year)
        .bind(changes.vehicle_type)
        .bind(changes.max_capacity_kg)
        .bind(changes.odometer_km)
        .bind(changes.acquisition_cost)
        .bind(changes.notes)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::VehicleNotFound)?;

        Ok(vehicle)
    }

    async fn retire_vehicle(&self, id: Uuid, retired_at: DateTime<Utc>) -> AppResult<Vehicle> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles
            SET is_active = FALSE, status = 'RETIRED', retired_at = $2, updated_at = NOW()
            WHERE id = $1 AND is_active = TRUE
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(retired_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::VehicleNotFound)?;

        Ok(vehicle)
    }

    async fn plate_exists(&self, license_plate: &str) -> AppResult<bool> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM vehicles WHERE license_plate = $1)")
                .bind(license_plate)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    // ── Conductores ───────────────────────────────────────────────────────

    async fn insert_driver(&self, driver: NewDriver) -> AppResult<Driver> {
        let inserted = sqlx::query_as::<_, Driver>(
            r#"
            INSERT INTO drivers
                (id, name, phone, email, license_number, license_category, license_expiry_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(driver.name)
        .bind(driver.phone)
        .bind(driver.email)
        .bind(driver.license_number)
        .bind(driver.license_category)
        .bind(driver.license_expiry_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(inserted)
    }

    async fn find_driver(&self, id: Uuid) -> AppResult<Option<Driver>> {
        let driver =
            sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE id = $1 AND is_active = TRUE")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(driver)
    }

    async fn list_drivers(&self, filters: &DriverFilters) -> AppResult<Vec<Driver>> {
        let (limit, offset) = page(filters.limit, filters.offset);

        let drivers = sqlx::query_as::<_, Driver>(
            r#"
            SELECT * FROM drivers
            WHERE is_active = COALESCE($1, TRUE)
              AND ($2::driver_status IS NULL OR status = $2)
              AND ($3::license_category IS NULL OR license_category = $3)
            ORDER BY name ASC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(filters.is_active)
        .bind(filters.status)
        .bind(filters.license_category)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(drivers)
    }

    async fn update_driver(&self, id: Uuid, changes: DriverChanges) -> AppResult<Driver> {
        let driver = sqlx::query_as::<_, Driver>(
            r#"
            UPDATE drivers SET
                name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                email = COALESCE($4, email),
                license_number = COALESCE($5, license_number),
                license_category = COALESCE($6, license_category),
                license_expiry_date = COALESCE($7, license_expiry_date),
                updated_at = NOW()
            WHERE id = $1 AND is_active = TRUE
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.phone)
        .bind(changes.email)
        .bind(changes.license_number)
        .bind(changes.license_category)
        .bind(changes.license_expiry_date)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::DriverNotFound)?;

        Ok(driver)
    }

    async fn set_driver_status(
        &self,
        id: Uuid,
        status: DriverStatus,
        suspended_reason: Option<String>,
    ) -> AppResult<Driver> {
        let driver = sqlx::query_as::<_, Driver>(
            r#"
            UPDATE drivers
            SET status = $2, suspended_reason = $3, updated_at = NOW()
            WHERE id = $1 AND is_active = TRUE
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(suspended_reason)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::DriverNotFound)?;

        Ok(driver)
    }

    async fn deactivate_driver(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE drivers
            SET is_active = FALSE, status = 'OFF_DUTY', updated_at = NOW()
            WHERE id = $1 AND is_active = TRUE
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::DriverNotFound);
        }
        Ok(())
    }

    async fn record_incident(
        &self,
        incident: NewIncident,
        new_safety_score: i32,
    ) -> AppResult<DriverIncident> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, DriverIncident>(
            r#"
            INSERT INTO driver_incidents (id, driver_id, trip_id, description, severity, reported_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(incident.driver_id)
        .bind(incident.trip_id)
        .bind(incident.description)
        .bind(incident.severity)
        .bind(incident.reported_by)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE drivers SET safety_score = $2, updated_at = NOW() WHERE id = $1")
            .bind(incident.driver_id)
            .bind(new_safety_score)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(inserted)
    }

    // ── Viajes ────────────────────────────────────────────────────────────

    async fn next_trip_number(&self) -> AppResult<i64> {
        let (next,): (i64,) = sqlx::query_as("SELECT nextval('trip_number_seq')")
            .fetch_one(&self.pool)
            .await?;

        Ok(next)
    }

    async fn insert_trip(&self, trip: NewTrip) -> AppResult<Trip> {
        let inserted = sqlx::query_as::<_, Trip>(
            r#"
            INSERT INTO trips
                (id, trip_number, vehicle_id, driver_id, created_by, origin, destination,
                 cargo_weight_kg, cargo_description, estimated_fuel_cost, odometer_start,
                 revenue_generated, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, 'DRAFT')
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(trip.trip_number)
        .bind(trip.vehicle_id)
        .bind(trip.driver_id)
        .bind(trip.created_by)
        .bind(trip.origin)
        .bind(trip.destination)
        .bind(trip.cargo_weight_kg)
        .bind(trip.cargo_description)
        .bind(trip.estimated_fuel_cost)
        .bind(trip.odometer_start)
        .bind(trip.revenue_generated)
        .fetch_one(&self.pool)
        .await?;

        Ok(inserted)
    }

    async fn find_trip(&self, id: Uuid) -> AppResult<Option<Trip>> {
        let trip = sqlx::query_as::<_, Trip>("SELECT * FROM trips WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(trip)
    }

    async fn list_trips(&self, filters: &TripFilters) -> AppResult<Vec<Trip>> {
        let (limit, offset) = page(filters.limit, filters.offset);

        let trips = sqlx::query_as::<_, Trip>(
            r#"
            SELECT * FROM trips
            WHERE ($1::trip_status IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR vehicle_id = $2)
              AND ($3::uuid IS NULL OR driver_id = $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(filters.status)
        .bind(filters.vehicle_id)
        .bind(filters.driver_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(trips)
    }

    async fn dispatch_trip(&self, dispatch: TripDispatch) -> AppResult<Trip> {
        let mut tx = self.pool.begin().await?;

        // Re-verificación dentro de la transacción: cierra la ventana de
        // carrera entre la creación del viaje y el despacho. FOR UPDATE
        // serializa despachos concurrentes sobre el mismo vehículo.
        let status = sqlx::query_scalar::<_, VehicleStatus>(
            "SELECT status FROM vehicles WHERE id = $1 FOR UPDATE",
        )
        .bind(dispatch.vehicle_id)
        .fetch_optional(&mut *tx)
        .await?;

        match status {
            Some(VehicleStatus::Available) => {}
            Some(_) => return Err(AppError::VehicleNotAvailable),
            None => return Err(AppError::VehicleNotFound),
        }

        let trip = sqlx::query_as::<_, Trip>(
            r#"
            UPDATE trips
            SET status = 'DISPATCHED', dispatched_at = $2, updated_at = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(dispatch.trip_id)
        .bind(dispatch.dispatched_at)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE vehicles SET status = 'ON_TRIP', updated_at = NOW() WHERE id = $1")
            .bind(dispatch.vehicle_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE drivers SET status = 'ON_TRIP', updated_at = NOW() WHERE id = $1")
            .bind(dispatch.driver_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(trip)
    }

    async fn mark_trip_in_transit(&self, trip_id: Uuid) -> AppResult<Trip> {
        // Solo cambia el estado: vehículo y conductor ya tienen el lease
        let trip = sqlx::query_as::<_, Trip>(
            "UPDATE trips SET status = 'IN_TRANSIT', updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(trip_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::TripNotFound)?;

        Ok(trip)
    }

    async fn complete_trip(&self, completion: TripCompletion) -> AppResult<Trip> {
        let mut tx = self.pool.begin().await?;

        let trip = sqlx::query_as::<_, Trip>(
            r#"
            UPDATE trips
            SET status = 'COMPLETED',
                completed_at = $2,
                odometer_end = $3,
                distance_km = $4,
                revenue_generated = COALESCE($5, revenue_generated),
                updated_at = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(completion.trip_id)
        .bind(completion.completed_at)
        .bind(completion.odometer_end)
        .bind(completion.distance_km)
        .bind(completion.revenue_generated)
        .fetch_one(&mut *tx)
        .await?;

        // Liberar vehículo y avanzar su odómetro a la lectura final
        sqlx::query(
            "UPDATE vehicles SET status = 'AVAILABLE', odometer_km = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(completion.vehicle_id)
        .bind(completion.odometer_end)
        .execute(&mut *tx)
        .await?;

        // Liberar conductor e incrementar sus contadores
        sqlx::query(
            r#"
            UPDATE drivers
            SET status = 'ON_DUTY',
                completed_trips = completed_trips + 1,
                total_trips = total_trips + 1,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(completion.driver_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(trip)
    }

    async fn cancel_trip(&self, cancellation: TripCancellation) -> AppResult<Trip> {
        let mut tx = self.pool.begin().await?;

        let trip = sqlx::query_as::<_, Trip>(
            r#"
            UPDATE trips
            SET status = 'CANCELLED', cancelled_at = $2, cancellation_reason = $3, updated_at = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(cancellation.trip_id)
        .bind(cancellation.cancelled_at)
        .bind(&cancellation.reason)
        .fetch_one(&mut *tx)
        .await?;

        // Un DRAFT nunca tomó el lease: no hay recursos que devolver
        if cancellation.release_lease {
            sqlx::query(
                "UPDATE vehicles SET status = 'AVAILABLE', updated_at = NOW() WHERE id = $1",
            )
            .bind(cancellation.vehicle_id)
            .execute(&mut *tx)
            .await?;

            // El viaje cancelado cuenta como intentado
            sqlx::query(
                r#"
                UPDATE drivers
                SET status = 'ON_DUTY', total_trips = total_trips + 1, updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(cancellation.driver_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(trip)
    }

    // ── Mantenimiento ─────────────────────────────────────────────────────

    async fn open_maintenance(&self, log: NewMaintenanceLog) -> AppResult<MaintenanceLog> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, MaintenanceLog>(
            r#"
            INSERT INTO maintenance_logs
                (id, vehicle_id, service_type, description, cost, vendor,
                 service_date, odometer_at_service)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(log.vehicle_id)
        .bind(log.service_type)
        .bind(log.description)
        .bind(log.cost)
        .bind(log.vendor)
        .bind(log.service_date)
        .bind(log.odometer_at_service)
        .fetch_one(&mut *tx)
        .await?;

        // IN_SHOP incondicional: si ya estaba en taller, sigue en taller
        sqlx::query("UPDATE vehicles SET status = 'IN_SHOP', updated_at = NOW() WHERE id = $1")
            .bind(log.vehicle_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(inserted)
    }

    async fn find_maintenance(&self, id: Uuid) -> AppResult<Option<MaintenanceLog>> {
        let log = sqlx::query_as::<_, MaintenanceLog>("SELECT * FROM maintenance_logs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(log)
    }

    async fn list_maintenance(&self, filters: &MaintenanceFilters) -> AppResult<Vec<MaintenanceLog>> {
        let (limit, offset) = page(filters.limit, filters.offset);

        let logs = sqlx::query_as::<_, MaintenanceLog>(
            r#"
            SELECT * FROM maintenance_logs
            WHERE ($1::uuid IS NULL OR vehicle_id = $1)
              AND ($2::service_type IS NULL OR service_type = $2)
              AND ($3::boolean IS NULL
                   OR ($3 AND completed_at IS NULL)
                   OR (NOT $3 AND completed_at IS NOT NULL))
            ORDER BY service_date DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(filters.vehicle_id)
        .bind(filters.service_type)
        .bind(filters.open)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(logs)
    }

    async fn update_maintenance(
        &self,
        id: Uuid,
        changes: MaintenanceChanges,
    ) -> AppResult<MaintenanceLog> {
        let log = sqlx::query_as::<_, MaintenanceLog>(
            r#"
            UPDATE maintenance_logs SET
                service_type = COALESCE($2, service_type),
                description = COALESCE($3, description),
                cost = COALESCE($4, cost),
                vendor = COALESCE($5, vendor),
                service_date = COALESCE($6, service_date),
                odometer_at_service = COALESCE($7, odometer_at_service),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.service_type)
        .bind(changes.description)
        .bind(changes.cost)
        .bind(changes.vendor)
        .bind(changes.service_date)
        .bind(changes.odometer_at_service)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::MaintenanceNotFound)?;

        Ok(log)
    }

    async fn close_maintenance(
        &self,
        log_id: Uuid,
        vehicle_id: Uuid,
        completed_at: DateTime<Utc>,
    ) -> AppResult<MaintenanceClosed> {
        let mut tx = self.pool.begin().await?;

        // El WHERE sobre completed_at hace de guardia: un segundo cierre
        // concurrente no encuentra fila y falla sin tocar el vehículo
        let log = sqlx::query_as::<_, MaintenanceLog>(
            r#"
            UPDATE maintenance_logs
            SET completed_at = $2, updated_at = $2
            WHERE id = $1 AND completed_at IS NULL
            RETURNING *
            "#,
        )
        .bind(log_id)
        .bind(completed_at)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::MaintenanceAlreadyComplete)?;

        let (remaining,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM maintenance_logs WHERE vehicle_id = $1 AND completed_at IS NULL",
        )
        .bind(vehicle_id)
        .fetch_one(&mut *tx)
        .await?;

        // Solo el último cierre devuelve el vehículo a AVAILABLE
        let vehicle_restored = remaining == 0;
        if vehicle_restored {
            sqlx::query(
                "UPDATE vehicles SET status = 'AVAILABLE', updated_at = NOW() WHERE id = $1",
            )
            .bind(vehicle_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(MaintenanceClosed {
            log,
            vehicle_restored,
            remaining_open_logs: remaining,
        })
    }

    // ── Combustible ───────────────────────────────────────────────────────

    async fn insert_fuel_log(&self, log: NewFuelLog) -> AppResult<FuelLog> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, FuelLog>(
            r#"
            INSERT INTO fuel_logs
                (id, vehicle_id, trip_id, liters, cost_per_liter, total_cost,
                 odometer_km, driver_name, notes, logged_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(log.vehicle_id)
        .bind(log.trip_id)
        .bind(log.liters)
        .bind(log.cost_per_liter)
        .bind(log.total_cost)
        .bind(log.odometer_km)
        .bind(log.driver_name)
        .bind(log.notes)
        .bind(log.logged_at)
        .fetch_one(&mut *tx)
        .await?;

        // El odómetro del vehículo avanza junto con la carga
        sqlx::query("UPDATE vehicles SET odometer_km = $2, updated_at = NOW() WHERE id = $1")
            .bind(log.vehicle_id)
            .bind(log.odometer_km)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(inserted)
    }

    async fn find_fuel_log(&self, id: Uuid) -> AppResult<Option<FuelLog>> {
        let log = sqlx::query_as::<_, FuelLog>("SELECT * FROM fuel_logs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(log)
    }

    async fn list_fuel_logs(&self, filters: &FuelLogFilters) -> AppResult<Vec<FuelLog>> {
        let (limit, offset) = page(filters.limit, filters.offset);

        let logs = sqlx::query_as::<_, FuelLog>(
            r#"
            SELECT * FROM fuel_logs
            WHERE ($1::uuid IS NULL OR vehicle_id = $1)
              AND ($2::uuid IS NULL OR trip_id = $2)
            ORDER BY logged_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(filters.vehicle_id)
        .bind(filters.trip_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(logs)
    }

    async fn latest_fuel_log(&self, vehicle_id: Uuid) -> AppResult<Option<FuelLog>> {
        let log = sqlx::query_as::<_, FuelLog>(
            "SELECT * FROM fuel_logs WHERE vehicle_id = $1 ORDER BY odometer_km DESC LIMIT 1",
        )
        .bind(vehicle_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(log)
    }
}
