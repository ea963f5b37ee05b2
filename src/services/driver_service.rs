//! Gestión de conductores
//!
//! CRUD, cambios de estado de servicio con sus reglas (una suspensión
//! necesita motivo y se levanta pasando por OFF_DUTY) e incidentes de
//! seguridad que descuentan el puntaje.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::rules;
use crate::models::driver::{
    CreateDriverRequest, Driver, DriverFilters, DriverIncident, DriverStatus, IncidentResponse,
    LicenseCategory, LogIncidentRequest, UpdateDriverRequest, UpdateDriverStatusRequest,
};
use crate::store::{DriverChanges, FleetStore, NewDriver, NewIncident};
use crate::utils::errors::{AppError, AppResult};

pub struct DriverService {
    store: Arc<dyn FleetStore>,
}

impl DriverService {
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, input: CreateDriverRequest) -> AppResult<Driver> {
        let driver = self
            .store
            .insert_driver(NewDriver {
                name: input.name,
                phone: input.phone,
                email: input.email,
                license_number: input.license_number,
                license_category: input.license_category,
                license_expiry_date: input.license_expiry_date,
            })
            .await?;

        info!("👤 Conductor {} registrado", driver.name);
        Ok(driver)
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Driver> {
        self.store
            .find_driver(id)
            .await?
            .ok_or(AppError::DriverNotFound)
    }

    pub async fn list(&self, filters: &DriverFilters) -> AppResult<Vec<Driver>> {
        self.store.list_drivers(filters).await
    }

    /// Conductores despachables: ON_DUTY con licencia vigente
    pub async fn available(&self, category: Option<LicenseCategory>) -> AppResult<Vec<Driver>> {
        let drivers = self
            .store
            .list_drivers(&DriverFilters {
                status: Some(DriverStatus::OnDuty),
                license_category: category,
                ..Default::default()
            })
            .await?;

        let now = Utc::now();
        Ok(drivers
            .into_iter()
            .filter(|d| !rules::is_expired(d.license_expiry_date, now))
            .collect())
    }

    pub async fn update(&self, id: Uuid, input: UpdateDriverRequest) -> AppResult<Driver> {
        self.store
            .update_driver(
                id,
                DriverChanges {
                    name: input.name,
                    phone: input.phone,
                    email: input.email,
                    license_number: input.license_number,
                    license_category: input.license_category,
                    license_expiry_date: input.license_expiry_date,
                },
            )
            .await
    }

    /// Cambiar el estado de servicio.
    ///
    /// Un suspendido no puede volver directo al servicio: primero
    /// OFF_DUTY, después ON_DUTY. Suspender exige un motivo, que se
    /// limpia al levantar la suspensión.
    pub async fn set_status(&self, id: Uuid, input: UpdateDriverStatusRequest) -> AppResult<Driver> {
        let driver = self.get_by_id(id).await?;

        if driver.status == DriverStatus::Suspended
            && matches!(input.status, DriverStatus::OnDuty | DriverStatus::OnTrip)
        {
            return Err(AppError::DriverStillSuspended);
        }

        let suspended_reason = if input.status == DriverStatus::Suspended {
            let reason = input
                .suspended_reason
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .ok_or(AppError::SuspensionReasonRequired)?
                .to_string();
            warn!("⚠️ Conductor {} suspendido: {}", driver.name, reason);
            Some(reason)
        } else {
            None
        };

        self.store
            .set_driver_status(id, input.status, suspended_reason)
            .await
    }

    /// Reportar un incidente. El alta del registro y el descuento del
    /// puntaje salen en la misma transacción; el puntaje tiene piso en 0.
    pub async fn log_incident(&self, id: Uuid, input: LogIncidentRequest) -> AppResult<IncidentResponse> {
        let driver = self.get_by_id(id).await?;

        if let Some(trip_id) = input.trip_id {
            self.store
                .find_trip(trip_id)
                .await?
                .ok_or(AppError::TripNotFound)?;
        }

        let penalty = rules::safety_penalty(input.severity);
        let new_score = rules::apply_incident(driver.safety_score, input.severity);

        let incident: DriverIncident = self
            .store
            .record_incident(
                NewIncident {
                    driver_id: id,
                    trip_id: input.trip_id,
                    description: input.description,
                    severity: input.severity,
                    reported_by: input.reported_by,
                },
                new_score,
            )
            .await?;

        warn!(
            "⚠️ Incidente severidad {} para {}: puntaje {} -> {}",
            input.severity, driver.name, driver.safety_score, new_score
        );

        Ok(IncidentResponse {
            incident,
            penalty_applied: penalty,
            new_safety_score: new_score,
        })
    }

    /// Baja lógica. Un conductor en servicio o en ruta no se puede dar
    /// de baja: primero cerrar o cancelar lo que tenga asignado.
    pub async fn deactivate(&self, id: Uuid) -> AppResult<()> {
        let driver = self.get_by_id(id).await?;

        if matches!(driver.status, DriverStatus::OnDuty | DriverStatus::OnTrip) {
            return Err(AppError::DriverOnDuty);
        }

        self.store.deactivate_driver(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryFleetStore;
    use chrono::Duration;

    async fn setup() -> (Arc<MemoryFleetStore>, DriverService, Uuid) {
        let store = Arc::new(MemoryFleetStore::new());
        let service = DriverService::new(store.clone());

        let driver = service
            .create(CreateDriverRequest {
                name: "Mohan Das".into(),
                phone: "9876543214".into(),
                email: None,
                license_number: "MH0120210056789".into(),
                license_category: LicenseCategory::Truck,
                license_expiry_date: Utc::now() + Duration::days(400),
            })
            .await
            .unwrap();

        (store, service, driver.id)
    }

    fn status_request(status: DriverStatus, reason: Option<&str>) -> UpdateDriverStatusRequest {
        UpdateDriverStatusRequest {
            status,
            suspended_reason: reason.map(String::from),
        }
    }

    #[tokio::test]
    async fn suspension_requires_reason_and_clears_on_lift() {
        let (_, service, driver_id) = setup().await;

        let err = service
            .set_status(driver_id, status_request(DriverStatus::Suspended, None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::SuspensionReasonRequired));

        let suspended = service
            .set_status(
                driver_id,
                status_request(DriverStatus::Suspended, Some("Multiple safety violations")),
            )
            .await
            .unwrap();
        assert_eq!(suspended.status, DriverStatus::Suspended);
        assert!(suspended.suspended_reason.is_some());

        let off_duty = service
            .set_status(driver_id, status_request(DriverStatus::OffDuty, None))
            .await
            .unwrap();
        assert_eq!(off_duty.status, DriverStatus::OffDuty);
        assert!(off_duty.suspended_reason.is_none());
    }

    #[tokio::test]
    async fn suspended_driver_must_pass_through_off_duty() {
        let (_, service, driver_id) = setup().await;

        service
            .set_status(
                driver_id,
                status_request(DriverStatus::Suspended, Some("speeding incidents")),
            )
            .await
            .unwrap();

        // Directo a ON_DUTY u ON_TRIP: rechazado
        for status in [DriverStatus::OnDuty, DriverStatus::OnTrip] {
            let err = service
                .set_status(driver_id, status_request(status, None))
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::DriverStillSuspended));
        }

        // El camino válido: OFF_DUTY y después ON_DUTY
        service
            .set_status(driver_id, status_request(DriverStatus::OffDuty, None))
            .await
            .unwrap();
        let back = service
            .set_status(driver_id, status_request(DriverStatus::OnDuty, None))
            .await
            .unwrap();
        assert_eq!(back.status, DriverStatus::OnDuty);
    }

    #[tokio::test]
    async fn incident_applies_penalty_with_floor_at_zero() {
        let (store, service, driver_id) = setup().await;

        let result = service
            .log_incident(
                driver_id,
                LogIncidentRequest {
                    severity: 4,
                    description: "Hard braking event on highway".into(),
                    trip_id: None,
                    reported_by: Some("safety officer".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(result.penalty_applied, 20);
        assert_eq!(result.new_safety_score, 80);

        // Bajar el puntaje a 10 y aplicar severidad 5: piso en 0
        for _ in 0..2 {
            service
                .log_incident(
                    driver_id,
                    LogIncidentRequest {
                        severity: 5,
                        description: "Repeated critical violation".into(),
                        trip_id: None,
                        reported_by: None,
                    },
                )
                .await
                .unwrap();
        }
        let driver = store.find_driver(driver_id).await.unwrap().unwrap();
        assert_eq!(driver.safety_score, 10);

        let result = service
            .log_incident(
                driver_id,
                LogIncidentRequest {
                    severity: 5,
                    description: "Another critical violation".into(),
                    trip_id: None,
                    reported_by: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(result.new_safety_score, 0);
    }

    #[tokio::test]
    async fn cannot_deactivate_driver_on_duty() {
        let (_, service, driver_id) = setup().await;

        service
            .set_status(driver_id, status_request(DriverStatus::OnDuty, None))
            .await
            .unwrap();

        let err = service.deactivate(driver_id).await.unwrap_err();
        assert!(matches!(err, AppError::DriverOnDuty));

        service
            .set_status(driver_id, status_request(DriverStatus::OffDuty, None))
            .await
            .unwrap();
        service.deactivate(driver_id).await.unwrap();

        let err = service.get_by_id(driver_id).await.unwrap_err();
        assert!(matches!(err, AppError::DriverNotFound));
    }

    #[tokio::test]
    async fn available_excludes_expired_licenses() {
        let (_, service, driver_id) = setup().await;
        service
            .set_status(driver_id, status_request(DriverStatus::OnDuty, None))
            .await
            .unwrap();

        let expired = service
            .create(CreateDriverRequest {
                name: "Suresh Yadav".into(),
                phone: "9876543212".into(),
                email: None,
                license_number: "MH0120210034567".into(),
                license_category: LicenseCategory::Truck,
                license_expiry_date: Utc::now() - Duration::days(2),
            })
            .await
            .unwrap();
        service
            .set_status(expired.id, status_request(DriverStatus::OnDuty, None))
            .await
            .unwrap();

        let available = service.available(Some(LicenseCategory::Truck)).await.unwrap();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].id, driver_id);
    }
}
