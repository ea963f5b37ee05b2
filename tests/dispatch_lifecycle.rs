//! Ciclo de vida completo de despacho sobre el store en memoria:
//! creación, despacho con lease, tránsito, finalización, cancelaciones
//! y las carreras entre despachos concurrentes.

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use fleet_backoffice::models::driver::{DriverStatus, LicenseCategory};
use fleet_backoffice::models::trip::{CreateTripRequest, TripStatus, UpdateTripStatusRequest};
use fleet_backoffice::models::vehicle::{VehicleStatus, VehicleType};
use fleet_backoffice::services::trip_service::TripService;
use fleet_backoffice::store::memory::MemoryFleetStore;
use fleet_backoffice::store::{FleetStore, NewDriver, NewVehicle, TripDispatch};
use fleet_backoffice::utils::errors::AppError;

struct Fleet {
    store: Arc<MemoryFleetStore>,
    trips: TripService,
    vehicle_id: Uuid,
    driver_id: Uuid,
}

async fn fleet_with_truck_and_driver() -> Fleet {
    let store = Arc::new(MemoryFleetStore::new());
    let trips = TripService::new(store.clone());

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
            email: Some("john@example.com".into()),
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

    Fleet {
        store,
        trips,
        vehicle_id: vehicle.id,
        driver_id: driver.id,
    }
}

fn create_request(fleet: &Fleet, cargo_kg: f64) -> CreateTripRequest {
    CreateTripRequest {
        vehicle_id: fleet.vehicle_id,
        driver_id: fleet.driver_id,
        origin: "Mumbai".into(),
        destination: "Pune".into(),
        cargo_weight_kg: cargo_kg,
        cargo_description: Some("FMCG goods".into()),
        estimated_fuel_cost: None,
        odometer_start: None,
        revenue_generated: None,
    }
}

fn transition(status: TripStatus) -> UpdateTripStatusRequest {
    UpdateTripStatusRequest {
        status,
        odometer_end: None,
        revenue_generated: None,
        cancellation_reason: None,
    }
}

#[tokio::test]
async fn full_lifecycle_from_draft_to_completed() {
    let fleet = fleet_with_truck_and_driver().await;

    // Crear: DRAFT, sin tomar recursos
    let trip = fleet
        .trips
        .create(create_request(&fleet, 5000.0), None)
        .await
        .unwrap();
    assert_eq!(trip.status, TripStatus::Draft);
    assert_eq!(trip.odometer_start, Decimal::from(45000));

    let vehicle = fleet.store.find_vehicle(fleet.vehicle_id).await.unwrap().unwrap();
    assert_eq!(vehicle.status, VehicleStatus::Available);

    // Despachar: vehículo y conductor quedan tomados
    fleet
        .trips
        .update_status(trip.id, transition(TripStatus::Dispatched))
        .await
        .unwrap();
    let vehicle = fleet.store.find_vehicle(fleet.vehicle_id).await.unwrap().unwrap();
    let driver = fleet.store.find_driver(fleet.driver_id).await.unwrap().unwrap();
    assert_eq!(vehicle.status, VehicleStatus::OnTrip);
    assert_eq!(driver.status, DriverStatus::OnTrip);

    // En tránsito: solo cambia el estado del viaje
    fleet
        .trips
        .update_status(trip.id, transition(TripStatus::InTransit))
        .await
        .unwrap();
    let vehicle = fleet.store.find_vehicle(fleet.vehicle_id).await.unwrap().unwrap();
    assert_eq!(vehicle.status, VehicleStatus::OnTrip);

    // Completar: odómetro final obligatorio, recursos liberados
    let completed = fleet
        .trips
        .update_status(
            trip.id,
            UpdateTripStatusRequest {
                status: TripStatus::Completed,
                odometer_end: Some(45220.0),
                revenue_generated: Some(120_000.0),
                cancellation_reason: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(completed.status, TripStatus::Completed);
    assert_eq!(completed.distance_km, Some(Decimal::from(220)));

    let vehicle = fleet.store.find_vehicle(fleet.vehicle_id).await.unwrap().unwrap();
    let driver = fleet.store.find_driver(fleet.driver_id).await.unwrap().unwrap();
    assert_eq!(vehicle.status, VehicleStatus::Available);
    assert_eq!(vehicle.odometer_km, Decimal::from(45220));
    assert_eq!(driver.status, DriverStatus::OnDuty);
    assert_eq!(driver.completed_trips, 1);
    assert_eq!(driver.total_trips, 1);
}

#[tokio::test]
async fn two_drafts_race_for_one_vehicle() {
    let fleet = fleet_with_truck_and_driver().await;

    // Dos despachadores planifican el mismo camión en paralelo
    let first = fleet
        .trips
        .create(create_request(&fleet, 3000.0), None)
        .await
        .unwrap();
    let second = fleet
        .trips
        .create(create_request(&fleet, 2000.0), None)
        .await
        .unwrap();

    let (a, b) = tokio::join!(
        fleet
            .trips
            .update_status(first.id, transition(TripStatus::Dispatched)),
        fleet
            .trips
            .update_status(second.id, transition(TripStatus::Dispatched)),
    );

    // Exactamente uno gana el vehículo; el otro recibe VehicleNotAvailable
    let results = [a, b];
    let wins = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1);
    let losses = results
        .iter()
        .filter(|r| matches!(r, Err(AppError::VehicleNotAvailable)))
        .count();
    assert_eq!(losses, 1);

    // Nunca dos viajes activos sobre el mismo vehículo
    let active = fleet
        .store
        .list_trips(&Default::default())
        .await
        .unwrap()
        .into_iter()
        .filter(|t| matches!(t.status, TripStatus::Dispatched | TripStatus::InTransit))
        .count();
    assert_eq!(active, 1);
}

#[tokio::test]
async fn double_dispatch_of_the_same_trip_commits_once() {
    let fleet = fleet_with_truck_and_driver().await;
    let trip = fleet
        .trips
        .create(create_request(&fleet, 3000.0), None)
        .await
        .unwrap();

    // Dos requests que ya pasaron la validación compiten en el store
    let dispatch = TripDispatch {
        trip_id: trip.id,
        vehicle_id: fleet.vehicle_id,
        driver_id: fleet.driver_id,
        dispatched_at: Utc::now(),
    };
    let first = fleet.store.dispatch_trip(dispatch.clone()).await;
    let second = fleet.store.dispatch_trip(dispatch).await;

    assert!(first.is_ok());
    assert!(matches!(second, Err(AppError::VehicleNotAvailable)));
}

#[tokio::test]
async fn cancelling_an_in_transit_trip_releases_resources() {
    let fleet = fleet_with_truck_and_driver().await;
    let trip = fleet
        .trips
        .create(create_request(&fleet, 3000.0), None)
        .await
        .unwrap();

    fleet
        .trips
        .update_status(trip.id, transition(TripStatus::Dispatched))
        .await
        .unwrap();
    fleet
        .trips
        .update_status(trip.id, transition(TripStatus::InTransit))
        .await
        .unwrap();

    let cancelled = fleet
        .trips
        .update_status(
            trip.id,
            UpdateTripStatusRequest {
                status: TripStatus::Cancelled,
                odometer_end: None,
                revenue_generated: None,
                cancellation_reason: Some("breakdown on highway".into()),
            },
        )
        .await
        .unwrap();

    assert_eq!(cancelled.status, TripStatus::Cancelled);
    assert!(cancelled.cancelled_at.is_some());

    // El vehículo vuelve; el conductor suma un viaje intentado, no completado
    let vehicle = fleet.store.find_vehicle(fleet.vehicle_id).await.unwrap().unwrap();
    let driver = fleet.store.find_driver(fleet.driver_id).await.unwrap().unwrap();
    assert_eq!(vehicle.status, VehicleStatus::Available);
    assert_eq!(driver.status, DriverStatus::OnDuty);
    assert_eq!(driver.total_trips, 1);
    assert_eq!(driver.completed_trips, 0);
}

#[tokio::test]
async fn terminal_states_reject_every_transition() {
    let fleet = fleet_with_truck_and_driver().await;
    let trip = fleet
        .trips
        .create(create_request(&fleet, 3000.0), None)
        .await
        .unwrap();

    fleet
        .trips
        .update_status(
            trip.id,
            UpdateTripStatusRequest {
                status: TripStatus::Cancelled,
                odometer_end: None,
                revenue_generated: None,
                cancellation_reason: Some("duplicate entry".into()),
            },
        )
        .await
        .unwrap();

    for status in [
        TripStatus::Dispatched,
        TripStatus::InTransit,
        TripStatus::Completed,
        TripStatus::Cancelled,
    ] {
        let err = fleet
            .trips
            .update_status(trip.id, transition(status))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));
    }
}

#[tokio::test]
async fn trip_numbers_survive_cancellations() {
    let fleet = fleet_with_truck_and_driver().await;

    let first = fleet
        .trips
        .create(create_request(&fleet, 1000.0), None)
        .await
        .unwrap();
    fleet
        .trips
        .update_status(
            first.id,
            UpdateTripStatusRequest {
                status: TripStatus::Cancelled,
                odometer_end: None,
                revenue_generated: None,
                cancellation_reason: Some("planning error".into()),
            },
        )
        .await
        .unwrap();

    // El número del cancelado no se recicla
    let second = fleet
        .trips
        .create(create_request(&fleet, 1000.0), None)
        .await
        .unwrap();
    assert_eq!(first.trip_number, "TRP-00001");
    assert_eq!(second.trip_number, "TRP-00002");
}

#[tokio::test]
async fn dispatch_fails_when_vehicle_went_to_the_shop_after_draft() {
    let fleet = fleet_with_truck_and_driver().await;
    let trip = fleet
        .trips
        .create(create_request(&fleet, 3000.0), None)
        .await
        .unwrap();

    // Entre la creación y el despacho el vehículo entró al taller
    fleet
        .store
        .open_maintenance(fleet_backoffice::store::NewMaintenanceLog {
            vehicle_id: fleet.vehicle_id,
            service_type: fleet_backoffice::models::maintenance::ServiceType::BrakeService,
            description: "Brake pads worn below limit".into(),
            cost: Decimal::from(8000),
            vendor: None,
            service_date: Utc::now(),
            odometer_at_service: None,
        })
        .await
        .unwrap();

    let err = fleet
        .trips
        .update_status(trip.id, transition(TripStatus::Dispatched))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::VehicleNotAvailable));

    // Nada cambió en el viaje
    let unchanged = fleet.store.find_trip(trip.id).await.unwrap().unwrap();
    assert_eq!(unchanged.status, TripStatus::Draft);
    assert!(unchanged.dispatched_at.is_none());
}
