//! Guardia de consistencia de combustible y odómetro
//!
//! El odómetro de un vehículo nunca retrocede y el costo total de una
//! carga jamás se acepta del cliente: se computa acá.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::rules;
use crate::models::fuel_log::{
    CreateFuelLogRequest, FuelLog, FuelLogFilters, FuelLogResponse, FuelSummaryResponse,
    RecordFuelResponse,
};
use crate::store::{FleetStore, NewFuelLog};
use crate::utils::errors::{AppError, AppResult};
use crate::utils::numbers::{to_decimal, to_f64};

pub struct FuelService {
    store: Arc<dyn FleetStore>,
}

impl FuelService {
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }

    /// Registrar una carga de combustible.
    ///
    /// La lectura del odómetro debe ser >= la actual del vehículo; si la
    /// carga referencia un viaje, tiene que ser del mismo vehículo. El
    /// alta del log y el avance del odómetro salen juntos.
    pub async fn record(&self, input: CreateFuelLogRequest) -> AppResult<RecordFuelResponse> {
        let vehicle = self
            .store
            .find_vehicle(input.vehicle_id)
            .await?
            .ok_or(AppError::VehicleNotFound)?;

        let odometer_km = to_decimal(input.odometer_km, "odometer_km")?;
        if odometer_km < vehicle.odometer_km {
            return Err(AppError::OdometerRegression {
                reading: odometer_km,
                current: vehicle.odometer_km,
            });
        }

        if let Some(trip_id) = input.trip_id {
            let trip = self
                .store
                .find_trip(trip_id)
                .await?
                .ok_or(AppError::TripNotFound)?;
            if trip.vehicle_id != input.vehicle_id {
                return Err(AppError::TripVehicleMismatch);
            }
        }

        // Carga anterior (por odómetro) para calcular el rendimiento
        let previous = self.store.latest_fuel_log(input.vehicle_id).await?;

        let liters = to_decimal(input.liters, "liters")?;
        let cost_per_liter = to_decimal(input.cost_per_liter, "cost_per_liter")?;
        // El total nunca viene del cliente
        let total_cost = rules::round2(liters * cost_per_liter);

        let log = self
            .store
            .insert_fuel_log(NewFuelLog {
                vehicle_id: input.vehicle_id,
                trip_id: input.trip_id,
                liters,
                cost_per_liter,
                total_cost,
                odometer_km,
                driver_name: input.driver_name,
                notes: input.notes,
                logged_at: input.logged_at.unwrap_or_else(Utc::now),
            })
            .await?;

        let fuel_efficiency = previous
            .map(|prev| to_f64(rules::fuel_efficiency(prev.odometer_km, odometer_km, liters)));

        Ok(RecordFuelResponse {
            log: FuelLogResponse::from(log),
            fuel_efficiency,
        })
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<FuelLog> {
        self.store
            .find_fuel_log(id)
            .await?
            .ok_or(AppError::FuelLogNotFound)
    }

    pub async fn list(&self, filters: &FuelLogFilters) -> AppResult<Vec<FuelLog>> {
        self.store.list_fuel_logs(filters).await
    }

    /// Resumen por vehículo: litros y gasto totales más el rendimiento
    /// promedio sobre el recorrido entre la primera y la última carga.
    pub async fn vehicle_summary(&self, vehicle_id: Uuid) -> AppResult<FuelSummaryResponse> {
        let mut logs = self
            .store
            .list_fuel_logs(&FuelLogFilters {
                vehicle_id: Some(vehicle_id),
                limit: Some(200),
                ..Default::default()
            })
            .await?;

        if logs.is_empty() {
            return Ok(FuelSummaryResponse {
                total_liters: 0.0,
                total_cost: 0.0,
                avg_efficiency: None,
                fill_ups: 0,
            });
        }

        logs.sort_by(|a, b| a.odometer_km.cmp(&b.odometer_km));

        let total_liters: rust_decimal::Decimal = logs.iter().map(|l| l.liters).sum();
        let total_cost: rust_decimal::Decimal = logs.iter().map(|l| l.total_cost).sum();
        let first_odometer = logs[0].odometer_km;
        let last_odometer = logs[logs.len() - 1].odometer_km;

        let avg = rules::fuel_efficiency(first_odometer, last_odometer, total_liters);
        let avg_efficiency = if avg > rust_decimal::Decimal::ZERO {
            Some(to_f64(avg))
        } else {
            None
        };

        Ok(FuelSummaryResponse {
            total_liters: to_f64(rules::round2(total_liters)),
            total_cost: to_f64(rules::round2(total_cost)),
            avg_efficiency,
            fill_ups: logs.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::driver::LicenseCategory;
    use crate::models::vehicle::VehicleType;
    use crate::store::memory::MemoryFleetStore;
    use crate::store::{NewDriver, NewTrip, NewVehicle};
    use chrono::Duration;
    use rust_decimal::Decimal;

    async fn setup() -> (Arc<MemoryFleetStore>, FuelService, Uuid) {
        let store = Arc::new(MemoryFleetStore::new());
        let service = FuelService::new(store.clone());

        let vehicle = store
            .insert_vehicle(NewVehicle {
                license_plate: "MH-05-GH-3456".into(),
                make: "TATA".into(),
                model: "Ace Gold".into(),
                year: 2023,
                vehicle_type: VehicleType::Van,
                max_capacity_kg: Decimal::from(800),
                odometer_km: Decimal::from(12000),
                acquisition_cost: Decimal::from(720_000),
                notes: None,
            })
            .await
            .unwrap();

        (store, service, vehicle.id)
    }

    fn fuel_request(vehicle_id: Uuid, odometer: f64, liters: f64) -> CreateFuelLogRequest {
        CreateFuelLogRequest {
            vehicle_id,
            liters,
            cost_per_liter: 96.5,
            odometer_km: odometer,
            trip_id: None,
            driver_name: None,
            notes: None,
            logged_at: None,
        }
    }

    #[tokio::test]
    async fn total_cost_is_computed_server_side() {
        let (_, service, vehicle_id) = setup().await;

        let result = service
            .record(fuel_request(vehicle_id, 12080.0, 45.5))
            .await
            .unwrap();

        // 45.5 * 96.5 = 4390.75
        assert_eq!(result.log.total_cost, 4390.75);
        // Primera carga: sin rendimiento
        assert!(result.fuel_efficiency.is_none());
    }

    #[tokio::test]
    async fn odometer_regression_is_rejected() {
        let (store, service, vehicle_id) = setup().await;

        let err = service
            .record(fuel_request(vehicle_id, 11000.0, 20.0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::OdometerRegression { .. }));

        // El vehículo quedó intacto y no hay log
        let vehicle = store.find_vehicle(vehicle_id).await.unwrap().unwrap();
        assert_eq!(vehicle.odometer_km, Decimal::from(12000));
        let logs = store
            .list_fuel_logs(&FuelLogFilters::default())
            .await
            .unwrap();
        assert!(logs.is_empty());
    }

    #[tokio::test]
    async fn recording_advances_vehicle_odometer_and_reports_efficiency() {
        let (store, service, vehicle_id) = setup().await;

        service
            .record(fuel_request(vehicle_id, 12080.0, 28.0))
            .await
            .unwrap();
        let second = service
            .record(fuel_request(vehicle_id, 12480.0, 40.0))
            .await
            .unwrap();

        // (12480 - 12080) / 40 = 10.0 km/l
        assert_eq!(second.fuel_efficiency, Some(10.0));

        let vehicle = store.find_vehicle(vehicle_id).await.unwrap().unwrap();
        assert_eq!(vehicle.odometer_km, Decimal::from(12480));
    }

    #[tokio::test]
    async fn trip_must_belong_to_the_vehicle() {
        let (store, service, vehicle_id) = setup().await;

        let other_vehicle = store
            .insert_vehicle(NewVehicle {
                license_plate: "MH-05-IJ-7890".into(),
                make: "Honda".into(),
                model: "CB Shine".into(),
                year: 2022,
                vehicle_type: VehicleType::Bike,
                max_capacity_kg: Decimal::from(50),
                odometer_km: Decimal::from(18000),
                acquisition_cost: Decimal::from(85_000),
                notes: None,
            })
            .await
            .unwrap();
        let driver = store
            .insert_driver(NewDriver {
                name: "Rajesh Singh".into(),
                phone: "9876543213".into(),
                email: None,
                license_number: "MH0120210045678".into(),
                license_category: LicenseCategory::Bike,
                license_expiry_date: Utc::now() + Duration::days(200),
            })
            .await
            .unwrap();
        let foreign_trip = store
            .insert_trip(NewTrip {
                trip_number: "TRP-00009".into(),
                vehicle_id: other_vehicle.id,
                driver_id: driver.id,
                created_by: None,
                origin: "Thane".into(),
                destination: "Nashik".into(),
                cargo_weight_kg: Decimal::from(40),
                cargo_description: None,
                estimated_fuel_cost: None,
                odometer_start: Decimal::from(18000),
                revenue_generated: None,
            })
            .await
            .unwrap();

        let mut request = fuel_request(vehicle_id, 12100.0, 10.0);
        request.trip_id = Some(foreign_trip.id);

        let err = service.record(request).await.unwrap_err();
        assert!(matches!(err, AppError::TripVehicleMismatch));
    }

    #[tokio::test]
    async fn summary_aggregates_over_odometer_span() {
        let (_, service, vehicle_id) = setup().await;

        service
            .record(fuel_request(vehicle_id, 12100.0, 20.0))
            .await
            .unwrap();
        service
            .record(fuel_request(vehicle_id, 12500.0, 30.0))
            .await
            .unwrap();

        let summary = service.vehicle_summary(vehicle_id).await.unwrap();
        assert_eq!(summary.fill_ups, 2);
        assert_eq!(summary.total_liters, 50.0);
        // 400 km / 50 l = 8 km/l
        assert_eq!(summary.avg_efficiency, Some(8.0));
    }

    #[tokio::test]
    async fn summary_for_vehicle_without_logs_is_empty() {
        let (_, service, vehicle_id) = setup().await;
        let summary = service.vehicle_summary(vehicle_id).await.unwrap();
        assert_eq!(summary.fill_ups, 0);
        assert!(summary.avg_efficiency.is_none());
    }
}
