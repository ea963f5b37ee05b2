//! Tracker de mantenimiento
//!
//! Abrir un registro toma el vehículo para el taller (IN_SHOP); puede
//! haber varios trabajos abiertos sobre el mismo vehículo a la vez. El
//! vehículo recién vuelve a AVAILABLE cuando se cierra el último.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::models::maintenance::{
    CompleteMaintenanceResponse, CreateMaintenanceRequest, MaintenanceFilters, MaintenanceLog,
    MaintenanceResponse, UpdateMaintenanceRequest,
};
use crate::models::vehicle::VehicleStatus;
use crate::store::{FleetStore, MaintenanceChanges, NewMaintenanceLog};
use crate::utils::errors::{AppError, AppResult};
use crate::utils::numbers::{to_decimal, to_decimal_opt};

pub struct MaintenanceService {
    store: Arc<dyn FleetStore>,
}

impl MaintenanceService {
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }

    /// Abrir un registro de servicio. No se puede meter al taller un
    /// vehículo que está en ruta ni uno retirado.
    pub async fn open(&self, input: CreateMaintenanceRequest) -> AppResult<MaintenanceLog> {
        let vehicle = self
            .store
            .find_vehicle(input.vehicle_id)
            .await?
            .ok_or(AppError::VehicleNotFound)?;

        match vehicle.status {
            VehicleStatus::OnTrip => return Err(AppError::VehicleOnTrip),
            VehicleStatus::Retired => return Err(AppError::VehicleRetired),
            VehicleStatus::Available | VehicleStatus::InShop => {}
        }

        let odometer_at_service = to_decimal_opt(input.odometer_at_service, "odometer_at_service")?
            .or(Some(vehicle.odometer_km));

        let log = self
            .store
            .open_maintenance(NewMaintenanceLog {
                vehicle_id: input.vehicle_id,
                service_type: input.service_type,
                description: input.description,
                cost: to_decimal(input.cost, "cost")?,
                vendor: input.vendor,
                service_date: input.service_date,
                odometer_at_service,
            })
            .await?;

        info!(
            "🔧 Vehículo {} en taller (registro {})",
            vehicle.license_plate, log.id
        );
        Ok(log)
    }

    /// Cerrar un registro. Si era el último abierto del vehículo, el
    /// cierre y la restauración a AVAILABLE salen en la misma transacción:
    /// un cierre temprano con trabajos superpuestos no libera nada.
    pub async fn complete(&self, id: Uuid) -> AppResult<CompleteMaintenanceResponse> {
        let log = self
            .store
            .find_maintenance(id)
            .await?
            .ok_or(AppError::MaintenanceNotFound)?;

        if log.completed_at.is_some() {
            return Err(AppError::MaintenanceAlreadyComplete);
        }

        let closed = self
            .store
            .close_maintenance(log.id, log.vehicle_id, Utc::now())
            .await?;

        if closed.vehicle_restored {
            info!("🔧 Vehículo {} liberado del taller", log.vehicle_id);
        }

        Ok(CompleteMaintenanceResponse {
            log: MaintenanceResponse::from(closed.log),
            vehicle_restored: closed.vehicle_restored,
            remaining_open_logs: closed.remaining_open_logs,
        })
    }

    /// Editar un registro abierto. Los completados son historial inmutable.
    pub async fn update(&self, id: Uuid, input: UpdateMaintenanceRequest) -> AppResult<MaintenanceLog> {
        let log = self
            .store
            .find_maintenance(id)
            .await?
            .ok_or(AppError::MaintenanceNotFound)?;

        if log.completed_at.is_some() {
            return Err(AppError::MaintenanceAlreadyComplete);
        }

        self.store
            .update_maintenance(
                id,
                MaintenanceChanges {
                    service_type: input.service_type,
                    description: input.description,
                    cost: to_decimal_opt(input.cost, "cost")?,
                    vendor: input.vendor,
                    service_date: input.service_date,
                    odometer_at_service: to_decimal_opt(
                        input.odometer_at_service,
                        "odometer_at_service",
                    )?,
                },
            )
            .await
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<MaintenanceLog> {
        self.store
            .find_maintenance(id)
            .await?
            .ok_or(AppError::MaintenanceNotFound)
    }

    pub async fn list(&self, filters: &MaintenanceFilters) -> AppResult<Vec<MaintenanceLog>> {
        self.store.list_maintenance(filters).await
    }

    /// Registros abiertos de toda la flota, los más viejos primero
    pub async fn open_logs(&self) -> AppResult<Vec<MaintenanceLog>> {
        let mut logs = self
            .store
            .list_maintenance(&MaintenanceFilters {
                open: Some(true),
                ..Default::default()
            })
            .await?;
        logs.sort_by(|a, b| a.service_date.cmp(&b.service_date));
        Ok(logs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::maintenance::ServiceType;
    use crate::models::vehicle::VehicleType;
    use crate::store::memory::MemoryFleetStore;
    use crate::store::NewVehicle;
    use rust_decimal::Decimal;

    async fn setup() -> (Arc<MemoryFleetStore>, MaintenanceService, Uuid) {
        let store = Arc::new(MemoryFleetStore::new());
        let service = MaintenanceService::new(store.clone());

        let vehicle = store
            .insert_vehicle(NewVehicle {
                license_plate: "MH-05-EF-9012".into(),
                make: "Ashok Leyland".into(),
                model: "Dost+".into(),
                year: 2020,
                vehicle_type: VehicleType::Van,
                max_capacity_kg: Decimal::from(1500),
                odometer_km: Decimal::from(62000),
                acquisition_cost: Decimal::from(1_100_000),
                notes: None,
            })
            .await
            .unwrap();

        (store, service, vehicle.id)
    }

    fn open_request(vehicle_id: Uuid) -> CreateMaintenanceRequest {
        CreateMaintenanceRequest {
            vehicle_id,
            service_type: ServiceType::OilChange,
            description: "Routine oil and filter change".into(),
            cost: 3500.0,
            vendor: None,
            service_date: Utc::now(),
            odometer_at_service: None,
        }
    }

    #[tokio::test]
    async fn opening_a_log_sends_vehicle_to_shop() {
        let (store, service, vehicle_id) = setup().await;

        let log = service.open(open_request(vehicle_id)).await.unwrap();
        assert!(log.is_open());
        assert_eq!(log.odometer_at_service, Some(Decimal::from(62000)));

        let vehicle = store.find_vehicle(vehicle_id).await.unwrap().unwrap();
        assert_eq!(vehicle.status, VehicleStatus::InShop);
    }

    #[tokio::test]
    async fn last_log_out_restores_availability() {
        let (store, service, vehicle_id) = setup().await;

        let first = service.open(open_request(vehicle_id)).await.unwrap();
        let second = service.open(open_request(vehicle_id)).await.unwrap();

        // Cerrar el primero deja el vehículo en el taller
        let result = service.complete(first.id).await.unwrap();
        assert!(!result.vehicle_restored);
        assert_eq!(result.remaining_open_logs, 1);
        let vehicle = store.find_vehicle(vehicle_id).await.unwrap().unwrap();
        assert_eq!(vehicle.status, VehicleStatus::InShop);

        // Cerrar el segundo lo libera
        let result = service.complete(second.id).await.unwrap();
        assert!(result.vehicle_restored);
        assert_eq!(result.remaining_open_logs, 0);
        let vehicle = store.find_vehicle(vehicle_id).await.unwrap().unwrap();
        assert_eq!(vehicle.status, VehicleStatus::Available);
    }

    #[tokio::test]
    async fn completing_twice_fails() {
        let (_, service, vehicle_id) = setup().await;

        let log = service.open(open_request(vehicle_id)).await.unwrap();
        service.complete(log.id).await.unwrap();

        let err = service.complete(log.id).await.unwrap_err();
        assert!(matches!(err, AppError::MaintenanceAlreadyComplete));
    }

    #[tokio::test]
    async fn cannot_service_a_vehicle_on_trip() {
        let (store, service, vehicle_id) = setup().await;

        // Poner el vehículo en ruta vía un despacho real del store
        let trip = store
            .insert_trip(crate::store::NewTrip {
                trip_number: "TRP-00001".into(),
                vehicle_id,
                driver_id: Uuid::new_v4(),
                created_by: None,
                origin: "A".into(),
                destination: "B".into(),
                cargo_weight_kg: Decimal::from(100),
                cargo_description: None,
                estimated_fuel_cost: None,
                odometer_start: Decimal::from(62000),
                revenue_generated: None,
            })
            .await
            .unwrap();
        store
            .dispatch_trip(crate::store::TripDispatch {
                trip_id: trip.id,
                vehicle_id,
                driver_id: trip.driver_id,
                dispatched_at: Utc::now(),
            })
            .await
            .unwrap();

        let err = service.open(open_request(vehicle_id)).await.unwrap_err();
        assert!(matches!(err, AppError::VehicleOnTrip));
    }

    #[tokio::test]
    async fn completed_logs_cannot_be_edited() {
        let (_, service, vehicle_id) = setup().await;

        let log = service.open(open_request(vehicle_id)).await.unwrap();
        service.complete(log.id).await.unwrap();

        let err = service
            .update(
                log.id,
                UpdateMaintenanceRequest {
                    service_type: None,
                    description: None,
                    cost: Some(9999.0),
                    vendor: None,
                    service_date: None,
                    odometer_at_service: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MaintenanceAlreadyComplete));
    }
}
