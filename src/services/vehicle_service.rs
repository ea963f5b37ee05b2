//! Gestión de la flota
//!
//! CRUD de vehículos más el retiro (soft delete) y el historial
//! operativo con resumen financiero.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::domain::rules;
use crate::models::fuel_log::{FuelLogFilters, FuelLogResponse};
use crate::models::maintenance::{MaintenanceFilters, MaintenanceResponse};
use crate::models::trip::{TripFilters, TripResponse};
use crate::models::vehicle::{
    CreateVehicleRequest, UpdateVehicleRequest, Vehicle, VehicleFilters, VehicleResponse,
    VehicleStatus, VehicleType,
};
use crate::store::{FleetStore, NewVehicle, VehicleChanges};
use crate::utils::errors::{AppError, AppResult};
use crate::utils::numbers::{to_decimal, to_decimal_opt, to_f64};

const HISTORY_LIMIT: i64 = 50;

/// Historial operativo de un vehículo con resumen financiero
#[derive(Debug, Serialize)]
pub struct VehicleHistoryResponse {
    pub vehicle: VehicleResponse,
    pub trips: Vec<TripResponse>,
    pub maintenance_logs: Vec<MaintenanceResponse>,
    pub fuel_logs: Vec<FuelLogResponse>,
    pub summary: VehicleHistorySummary,
}

#[derive(Debug, Serialize)]
pub struct VehicleHistorySummary {
    pub total_trips: usize,
    pub total_revenue: f64,
    pub total_fuel_cost: f64,
    pub total_maintenance_cost: f64,
    pub total_operational_cost: f64,
    pub roi: f64,
}

pub struct VehicleService {
    store: Arc<dyn FleetStore>,
}

impl VehicleService {
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, input: CreateVehicleRequest) -> AppResult<Vehicle> {
        if self.store.plate_exists(&input.license_plate).await? {
            return Err(AppError::PlateExists(input.license_plate));
        }

        let vehicle = self
            .store
            .insert_vehicle(NewVehicle {
                license_plate: input.license_plate,
                make: input.make,
                model: input.model,
                year: input.year,
                vehicle_type: input.vehicle_type,
                max_capacity_kg: to_decimal(input.max_capacity_kg, "max_capacity_kg")?,
                odometer_km: to_decimal_opt(input.odometer_km, "odometer_km")?
                    .unwrap_or(Decimal::ZERO),
                acquisition_cost: to_decimal(input.acquisition_cost, "acquisition_cost")?,
                notes: input.notes,
            })
            .await?;

        info!("🚗 Vehículo {} registrado", vehicle.license_plate);
        Ok(vehicle)
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Vehicle> {
        self.store
            .find_vehicle(id)
            .await?
            .ok_or(AppError::VehicleNotFound)
    }

    pub async fn list(&self, filters: &VehicleFilters) -> AppResult<Vec<Vehicle>> {
        self.store.list_vehicles(filters).await
    }

    /// Vehículos AVAILABLE para el formulario de despacho
    pub async fn available(&self, vehicle_type: Option<VehicleType>) -> AppResult<Vec<Vehicle>> {
        self.store
            .list_vehicles(&VehicleFilters {
                status: Some(VehicleStatus::Available),
                vehicle_type,
                ..Default::default()
            })
            .await
    }

    pub async fn update(&self, id: Uuid, input: UpdateVehicleRequest) -> AppResult<Vehicle> {
        self.store
            .update_vehicle(
                id,
                VehicleChanges {
                    make: input.make,
                    model: input.model,
                    year: input.year,
                    vehicle_type: input.vehicle_type,
                    max_capacity_kg: to_decimal_opt(input.max_capacity_kg, "max_capacity_kg")?,
                    odometer_km: to_decimal_opt(input.odometer_km, "odometer_km")?,
                    acquisition_cost: to_decimal_opt(input.acquisition_cost, "acquisition_cost")?,
                    notes: input.notes,
                },
            )
            .await
    }

    /// Retirar un vehículo de la flota. No se puede retirar uno en ruta
    /// ni uno con mantenimiento abierto; un retirado no vuelve a tomar
    /// leases nunca más.
    pub async fn retire(&self, id: Uuid) -> AppResult<Vehicle> {
        let vehicle = self.get_by_id(id).await?;

        match vehicle.status {
            VehicleStatus::OnTrip => return Err(AppError::VehicleOnTrip),
            VehicleStatus::InShop => return Err(AppError::VehicleInShop),
            VehicleStatus::Available | VehicleStatus::Retired => {}
        }

        let retired = self.store.retire_vehicle(id, Utc::now()).await?;
        info!("🏁 Vehículo {} retirado de la flota", retired.license_plate);
        Ok(retired)
    }

    /// Historial del vehículo: viajes, mantenimiento y combustible
    /// recientes más el resumen financiero con ROI.
    pub async fn history(&self, id: Uuid) -> AppResult<VehicleHistoryResponse> {
        let vehicle = self.get_by_id(id).await?;

        let trips = self
            .store
            .list_trips(&TripFilters {
                vehicle_id: Some(id),
                limit: Some(HISTORY_LIMIT),
                ..Default::default()
            })
            .await?;
        let maintenance_logs = self
            .store
            .list_maintenance(&MaintenanceFilters {
                vehicle_id: Some(id),
                limit: Some(HISTORY_LIMIT),
                ..Default::default()
            })
            .await?;
        let fuel_logs = self
            .store
            .list_fuel_logs(&FuelLogFilters {
                vehicle_id: Some(id),
                limit: Some(HISTORY_LIMIT),
                ..Default::default()
            })
            .await?;

        let total_revenue: Decimal = trips
            .iter()
            .filter_map(|t| t.revenue_generated)
            .sum();
        let total_maintenance_cost: Decimal = maintenance_logs.iter().map(|m| m.cost).sum();
        let total_fuel_cost: Decimal = fuel_logs.iter().map(|f| f.total_cost).sum();

        let roi = rules::vehicle_roi(
            total_revenue,
            total_maintenance_cost,
            total_fuel_cost,
            vehicle.acquisition_cost,
        );

        Ok(VehicleHistoryResponse {
            summary: VehicleHistorySummary {
                total_trips: trips.len(),
                total_revenue: to_f64(rules::round2(total_revenue)),
                total_fuel_cost: to_f64(rules::round2(total_fuel_cost)),
                total_maintenance_cost: to_f64(rules::round2(total_maintenance_cost)),
                total_operational_cost: to_f64(rules::round2(
                    total_fuel_cost + total_maintenance_cost,
                )),
                roi: to_f64(roi),
            },
            vehicle: VehicleResponse::from(vehicle),
            trips: trips.into_iter().map(TripResponse::from).collect(),
            maintenance_logs: maintenance_logs
                .into_iter()
                .map(MaintenanceResponse::from)
                .collect(),
            fuel_logs: fuel_logs.into_iter().map(FuelLogResponse::from).collect(),
        })
    }
}
