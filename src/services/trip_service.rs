//! Máquina de estados de viajes
//!
//! Crear un viaje lo deja en DRAFT sin tomar recursos: un borrador se
//! puede planificar de forma especulativa. Recién el despacho toma el
//! lease del vehículo y del conductor, y la finalización o cancelación
//! lo devuelve. Toda transición multi-registro se commitea en una sola
//! unidad de trabajo del store.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::domain::{rules, transitions};
use crate::models::driver::DriverStatus;
use crate::models::fuel_log::{FuelLogFilters, FuelLogResponse};
use crate::models::trip::{
    CreateTripRequest, Trip, TripDetailResponse, TripDriverSummary, TripFilters, TripResponse,
    TripStatus, TripVehicleSummary, UpdateTripStatusRequest,
};
use crate::models::vehicle::VehicleStatus;
use crate::store::{FleetStore, NewTrip, TripCancellation, TripCompletion, TripDispatch};
use crate::utils::errors::{AppError, AppResult};
use crate::utils::numbers::{to_decimal, to_decimal_opt};

pub struct TripService {
    store: Arc<dyn FleetStore>,
}

impl TripService {
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }

    /// Crear un viaje en DRAFT.
    ///
    /// Las precondiciones se verifican en orden y cada una falla con su
    /// propio error. Ninguna escribe nada: si algo falla, no queda rastro.
    pub async fn create(&self, input: CreateTripRequest, created_by: Option<Uuid>) -> AppResult<Trip> {
        // 1-2. El vehículo existe, está activo y AVAILABLE
        let vehicle = self
            .store
            .find_vehicle(input.vehicle_id)
            .await?
            .ok_or(AppError::VehicleNotFound)?;
        if vehicle.status != VehicleStatus::Available {
            return Err(AppError::VehicleNotAvailable);
        }

        // 3. El conductor existe, está activo y ON_DUTY
        let driver = self
            .store
            .find_driver(input.driver_id)
            .await?
            .ok_or(AppError::DriverNotFound)?;
        if driver.status == DriverStatus::Suspended {
            return Err(AppError::DriverSuspended);
        }
        if driver.status != DriverStatus::OnDuty {
            return Err(AppError::DriverNotAvailable);
        }

        // 4. Licencia vigente al momento de evaluar
        if rules::is_expired(driver.license_expiry_date, Utc::now()) {
            return Err(AppError::LicenseExpired);
        }

        // 5. La categoría de licencia habilita el tipo de vehículo
        if !driver.license_category.covers(vehicle.vehicle_type) {
            return Err(AppError::LicenseCategoryMismatch {
                category: driver.license_category,
                vehicle_type: vehicle.vehicle_type,
            });
        }

        // 6. La carga entra en el vehículo
        let cargo_weight_kg = to_decimal(input.cargo_weight_kg, "cargo_weight_kg")?;
        if cargo_weight_kg > vehicle.max_capacity_kg {
            return Err(AppError::Overweight {
                cargo_kg: cargo_weight_kg,
                max_kg: vehicle.max_capacity_kg,
            });
        }

        let sequence = self.store.next_trip_number().await?;
        let trip_number = format!("TRP-{:05}", sequence);

        let odometer_start = match to_decimal_opt(input.odometer_start, "odometer_start")? {
            Some(value) => value,
            None => vehicle.odometer_km,
        };

        let trip = self
            .store
            .insert_trip(NewTrip {
                trip_number,
                vehicle_id: input.vehicle_id,
                driver_id: input.driver_id,
                created_by,
                origin: input.origin,
                destination: input.destination,
                cargo_weight_kg,
                cargo_description: input.cargo_description,
                estimated_fuel_cost: to_decimal_opt(input.estimated_fuel_cost, "estimated_fuel_cost")?,
                odometer_start,
                revenue_generated: to_decimal_opt(input.revenue_generated, "revenue_generated")?,
            })
            .await?;

        info!("📝 Viaje {} creado en DRAFT", trip.trip_number);
        Ok(trip)
    }

    /// Ejecutar una transición de estado.
    ///
    /// La tabla de transiciones decide si el movimiento es legal; cada
    /// rama arma su unidad de trabajo y el store la commitea entera o
    /// no commitea nada.
    pub async fn update_status(&self, id: Uuid, input: UpdateTripStatusRequest) -> AppResult<Trip> {
        let trip = self
            .store
            .find_trip(id)
            .await?
            .ok_or(AppError::TripNotFound)?;

        transitions::assert_transition(trip.status, input.status)?;

        let now = Utc::now();

        match input.status {
            TripStatus::Dispatched => {
                // La disponibilidad del vehículo se re-verifica dentro de
                // la transacción del store, no acá: entre la creación y el
                // despacho pudo pasar cualquier cosa.
                let updated = self
                    .store
                    .dispatch_trip(TripDispatch {
                        trip_id: trip.id,
                        vehicle_id: trip.vehicle_id,
                        driver_id: trip.driver_id,
                        dispatched_at: now,
                    })
                    .await?;
                info!(
                    "🚚 Viaje {} despachado: vehículo y conductor en ruta",
                    updated.trip_number
                );
                Ok(updated)
            }

            TripStatus::InTransit => self.store.mark_trip_in_transit(trip.id).await,

            TripStatus::Completed => {
                let odometer_end = input
                    .odometer_end
                    .ok_or(AppError::OdometerRequired)
                    .and_then(|v| to_decimal(v, "odometer_end"))?;

                if odometer_end < trip.odometer_start {
                    return Err(AppError::OdometerRegression {
                        reading: odometer_end,
                        current: trip.odometer_start,
                    });
                }

                let updated = self
                    .store
                    .complete_trip(TripCompletion {
                        trip_id: trip.id,
                        vehicle_id: trip.vehicle_id,
                        driver_id: trip.driver_id,
                        odometer_end,
                        distance_km: odometer_end - trip.odometer_start,
                        revenue_generated: to_decimal_opt(
                            input.revenue_generated,
                            "revenue_generated",
                        )?,
                        completed_at: now,
                    })
                    .await?;
                info!(
                    "✅ Viaje {} completado ({} km)",
                    updated.trip_number,
                    updated.distance_km.unwrap_or_default()
                );
                Ok(updated)
            }

            TripStatus::Cancelled => {
                let reason = input
                    .cancellation_reason
                    .as_deref()
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .ok_or(AppError::CancellationReasonRequired)?
                    .to_string();

                // Solo un viaje que llegó a despacharse tomó recursos;
                // un DRAFT cancelado no toca vehículo ni conductor
                let release_lease =
                    matches!(trip.status, TripStatus::Dispatched | TripStatus::InTransit);

                let updated = self
                    .store
                    .cancel_trip(TripCancellation {
                        trip_id: trip.id,
                        vehicle_id: trip.vehicle_id,
                        driver_id: trip.driver_id,
                        reason,
                        release_lease,
                        cancelled_at: now,
                    })
                    .await?;
                info!("🚫 Viaje {} cancelado", updated.trip_number);
                Ok(updated)
            }

            // La tabla de transiciones no permite volver a DRAFT
            TripStatus::Draft => Err(AppError::InvalidTransition {
                from: trip.status,
                to: input.status,
            }),
        }
    }

    pub async fn list(&self, filters: &TripFilters) -> AppResult<Vec<Trip>> {
        self.store.list_trips(filters).await
    }

    /// Detalle del viaje con vehículo, conductor y cargas asociadas
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<TripDetailResponse> {
        let trip = self
            .store
            .find_trip(id)
            .await?
            .ok_or(AppError::TripNotFound)?;

        let vehicle = self.store.find_vehicle(trip.vehicle_id).await?;
        let driver = self.store.find_driver(trip.driver_id).await?;
        let fuel_logs = self
            .store
            .list_fuel_logs(&FuelLogFilters {
                trip_id: Some(trip.id),
                ..Default::default()
            })
            .await?;

        Ok(TripDetailResponse {
            trip: TripResponse::from(trip),
            vehicle: vehicle.map(|v| TripVehicleSummary {
                id: v.id,
                license_plate: v.license_plate,
                make: v.make,
                model: v.model,
                vehicle_type: v.vehicle_type,
            }),
            driver: driver.map(|d| TripDriverSummary {
                id: d.id,
                name: d.name,
                phone: d.phone,
                license_category: d.license_category,
            }),
            fuel_logs: fuel_logs.into_iter().map(FuelLogResponse::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::driver::LicenseCategory;
    use crate::models::vehicle::VehicleType;
    use crate::store::memory::MemoryFleetStore;
    use crate::store::{NewDriver, NewVehicle};
    use chrono::Duration;
    use rust_decimal::Decimal;

    async fn setup() -> (Arc<MemoryFleetStore>, TripService, Uuid, Uuid) {
        let store = Arc::new(MemoryFleetStore::new());
        let service = TripService::new(store.clone());

        let vehicle = store
            .insert_vehicle(NewVehicle {
                license_plate: "MH-05-AB-1234".into(),
                make: "TATA".into(),
                model: "LPT 1109".into(),
                year: 2021,
                vehicle_type: VehicleType::Truck,
                max_capacity_kg: Decimal::from(7500),
                odometer_km: Decimal::from(45000),
                acquisition_cost: Decimal::from(1_800_000),
                notes: None,
            })
            .await
            .unwrap();

        let driver = store
            .insert_driver(NewDriver {
                name: "John Doe".into(),
                phone: "9876543210".into(),
                email: None,
                license_number: "MH0120210012345".into(),
                license_category: LicenseCategory::Truck,
                license_expiry_date: Utc::now() + Duration::days(365),
            })
            .await
            .unwrap();
        store
            .set_driver_status(driver.id, DriverStatus::OnDuty, None)
            .await
            .unwrap();

        (store, service, vehicle.id, driver.id)
    }

    fn trip_request(vehicle_id: Uuid, driver_id: Uuid, cargo_kg: f64) -> CreateTripRequest {
        CreateTripRequest {
            vehicle_id,
            driver_id,
            origin: "Mumbai".into(),
            destination: "Pune".into(),
            cargo_weight_kg: cargo_kg,
            cargo_description: None,
            estimated_fuel_cost: None,
            odometer_start: None,
            revenue_generated: None,
        }
    }

    #[tokio::test]
    async fn create_assigns_sequential_numbers_and_draft_status() {
        let (_, service, vehicle_id, driver_id) = setup().await;

        let first = service
            .create(trip_request(vehicle_id, driver_id, 5000.0), None)
            .await
            .unwrap();
        let second = service
            .create(trip_request(vehicle_id, driver_id, 5000.0), None)
            .await
            .unwrap();

        assert_eq!(first.trip_number, "TRP-00001");
        assert_eq!(second.trip_number, "TRP-00002");
        assert_eq!(first.status, TripStatus::Draft);
        // DRAFT no toma recursos: el mismo vehículo acepta otro borrador
        assert_eq!(first.odometer_start, Decimal::from(45000));
    }

    #[tokio::test]
    async fn create_rejects_overweight_cargo_and_leaves_no_trip() {
        let (store, service, vehicle_id, driver_id) = setup().await;

        let err = service
            .create(trip_request(vehicle_id, driver_id, 7501.0), None)
            .await
            .unwrap_err();

        match err {
            AppError::Overweight { cargo_kg, max_kg } => {
                assert_eq!(cargo_kg, Decimal::from(7501));
                assert_eq!(max_kg, Decimal::from(7500));
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let trips = store.list_trips(&TripFilters::default()).await.unwrap();
        assert!(trips.is_empty());
    }

    #[tokio::test]
    async fn create_rejects_suspended_driver_before_availability_check() {
        let (store, service, vehicle_id, driver_id) = setup().await;
        store
            .set_driver_status(driver_id, DriverStatus::Suspended, Some("violations".into()))
            .await
            .unwrap();

        let err = service
            .create(trip_request(vehicle_id, driver_id, 100.0), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DriverSuspended));
    }

    #[tokio::test]
    async fn create_rejects_expired_license() {
        let (store, service, vehicle_id, _) = setup().await;

        let expired = store
            .insert_driver(NewDriver {
                name: "Old License".into(),
                phone: "9876500000".into(),
                email: None,
                license_number: "MH0120150000001".into(),
                license_category: LicenseCategory::Truck,
                license_expiry_date: Utc::now() - Duration::days(1),
            })
            .await
            .unwrap();
        store
            .set_driver_status(expired.id, DriverStatus::OnDuty, None)
            .await
            .unwrap();

        let err = service
            .create(trip_request(vehicle_id, expired.id, 100.0), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::LicenseExpired));
    }

    #[tokio::test]
    async fn create_rejects_license_category_mismatch() {
        let (store, service, vehicle_id, _) = setup().await;

        let van_driver = store
            .insert_driver(NewDriver {
                name: "Van Only".into(),
                phone: "9876511111".into(),
                email: None,
                license_number: "MH0120210099999".into(),
                license_category: LicenseCategory::Van,
                license_expiry_date: Utc::now() + Duration::days(365),
            })
            .await
            .unwrap();
        store
            .set_driver_status(van_driver.id, DriverStatus::OnDuty, None)
            .await
            .unwrap();

        let err = service
            .create(trip_request(vehicle_id, van_driver.id, 100.0), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::LicenseCategoryMismatch { .. }));
    }

    #[tokio::test]
    async fn dispatch_locks_vehicle_and_driver() {
        let (store, service, vehicle_id, driver_id) = setup().await;
        let trip = service
            .create(trip_request(vehicle_id, driver_id, 5000.0), None)
            .await
            .unwrap();

        let dispatched = service
            .update_status(
                trip.id,
                UpdateTripStatusRequest {
                    status: TripStatus::Dispatched,
                    odometer_end: None,
                    revenue_generated: None,
                    cancellation_reason: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(dispatched.status, TripStatus::Dispatched);
        assert!(dispatched.dispatched_at.is_some());

        let vehicle = store.find_vehicle(vehicle_id).await.unwrap().unwrap();
        let driver = store.find_driver(driver_id).await.unwrap().unwrap();
        assert_eq!(vehicle.status, VehicleStatus::OnTrip);
        assert_eq!(driver.status, DriverStatus::OnTrip);
    }

    #[tokio::test]
    async fn completion_requires_final_odometer() {
        let (_, service, vehicle_id, driver_id) = setup().await;
        let trip = service
            .create(trip_request(vehicle_id, driver_id, 5000.0), None)
            .await
            .unwrap();

        for status in [TripStatus::Dispatched, TripStatus::InTransit] {
            service
                .update_status(
                    trip.id,
                    UpdateTripStatusRequest {
                        status,
                        odometer_end: None,
                        revenue_generated: None,
                        cancellation_reason: None,
                    },
                )
                .await
                .unwrap();
        }

        let err = service
            .update_status(
                trip.id,
                UpdateTripStatusRequest {
                    status: TripStatus::Completed,
                    odometer_end: None,
                    revenue_generated: None,
                    cancellation_reason: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::OdometerRequired));

        let err = service
            .update_status(
                trip.id,
                UpdateTripStatusRequest {
                    status: TripStatus::Completed,
                    odometer_end: Some(44000.0),
                    revenue_generated: None,
                    cancellation_reason: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::OdometerRegression { .. }));
    }

    #[tokio::test]
    async fn cancelling_a_draft_touches_no_resources() {
        let (store, service, vehicle_id, driver_id) = setup().await;
        let trip = service
            .create(trip_request(vehicle_id, driver_id, 5000.0), None)
            .await
            .unwrap();

        let cancelled = service
            .update_status(
                trip.id,
                UpdateTripStatusRequest {
                    status: TripStatus::Cancelled,
                    odometer_end: None,
                    revenue_generated: None,
                    cancellation_reason: Some("customer called off".into()),
                },
            )
            .await
            .unwrap();

        assert_eq!(cancelled.status, TripStatus::Cancelled);

        // El borrador nunca tomó el lease: nada que devolver
        let vehicle = store.find_vehicle(vehicle_id).await.unwrap().unwrap();
        let driver = store.find_driver(driver_id).await.unwrap().unwrap();
        assert_eq!(vehicle.status, VehicleStatus::Available);
        assert_eq!(driver.status, DriverStatus::OnDuty);
        assert_eq!(driver.total_trips, 0);
    }

    #[tokio::test]
    async fn cancellation_requires_a_reason() {
        let (_, service, vehicle_id, driver_id) = setup().await;
        let trip = service
            .create(trip_request(vehicle_id, driver_id, 5000.0), None)
            .await
            .unwrap();

        let err = service
            .update_status(
                trip.id,
                UpdateTripStatusRequest {
                    status: TripStatus::Cancelled,
                    odometer_end: None,
                    revenue_generated: None,
                    cancellation_reason: Some("   ".into()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CancellationReasonRequired));
    }

    #[tokio::test]
    async fn illegal_transitions_mutate_nothing() {
        let (store, service, vehicle_id, driver_id) = setup().await;
        let trip = service
            .create(trip_request(vehicle_id, driver_id, 5000.0), None)
            .await
            .unwrap();

        // DRAFT no puede saltar directo a IN_TRANSIT ni a COMPLETED
        for status in [TripStatus::InTransit, TripStatus::Completed] {
            let err = service
                .update_status(
                    trip.id,
                    UpdateTripStatusRequest {
                        status,
                        odometer_end: Some(46000.0),
                        revenue_generated: None,
                        cancellation_reason: None,
                    },
                )
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::InvalidTransition { .. }));
        }

        let unchanged = store.find_trip(trip.id).await.unwrap().unwrap();
        assert_eq!(unchanged.status, TripStatus::Draft);
        let vehicle = store.find_vehicle(vehicle_id).await.unwrap().unwrap();
        assert_eq!(vehicle.status, VehicleStatus::Available);
    }
}
