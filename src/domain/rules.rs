//! Reglas de negocio puras: puntaje de seguridad, ROI, rendimiento de
//! combustible y estado de licencias.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use crate::models::driver::LicenseStatus;

/// Redondeo a 2 decimales para montos y ratios
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp(2)
}

/// Penalización por incidente según severidad (1 = menor, 5 = crítico).
/// Un valor fuera de rango cae en la penalización por defecto; la
/// validación del request ya lo rechazó antes de llegar acá.
pub fn safety_penalty(severity: i32) -> i32 {
    match severity {
        1 => 2,
        2 => 5,
        3 => 10,
        4 => 20,
        5 => 35,
        _ => 5,
    }
}

/// Aplica un incidente al puntaje actual. Piso en 0, nunca negativo.
pub fn apply_incident(current_score: i32, severity: i32) -> i32 {
    (current_score - safety_penalty(severity)).max(0)
}

/// ROI = (ingresos - (mantenimiento + combustible)) / costo de adquisición * 100
pub fn vehicle_roi(
    revenue: Decimal,
    maintenance_cost: Decimal,
    fuel_cost: Decimal,
    acquisition_cost: Decimal,
) -> Decimal {
    if acquisition_cost <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    round2((revenue - maintenance_cost - fuel_cost) / acquisition_cost * Decimal::ONE_HUNDRED)
}

/// Rendimiento: km por litro entre dos lecturas de odómetro
pub fn fuel_efficiency(odometer_start_km: Decimal, odometer_end_km: Decimal, liters: Decimal) -> Decimal {
    let km = odometer_end_km - odometer_start_km;
    if km <= Decimal::ZERO || liters <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    round2(km / liters)
}

pub fn is_expired(expiry: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    expiry < now
}

/// Una licencia está EXPIRING_SOON dentro de los 30 días previos al vencimiento
pub fn license_status(expiry: DateTime<Utc>, now: DateTime<Utc>) -> LicenseStatus {
    if is_expired(expiry, now) {
        LicenseStatus::Expired
    } else if expiry <= now + Duration::days(30) {
        LicenseStatus::ExpiringSoon
    } else {
        LicenseStatus::Valid
    }
}

/// Porcentaje de viajes completados sobre intentados, 2 decimales
pub fn completion_rate(completed_trips: i32, total_trips: i32) -> f64 {
    if total_trips <= 0 {
        return 0.0;
    }
    (f64::from(completed_trips) / f64::from(total_trips) * 10000.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn penalty_table() {
        assert_eq!(safety_penalty(1), 2);
        assert_eq!(safety_penalty(2), 5);
        assert_eq!(safety_penalty(3), 10);
        assert_eq!(safety_penalty(4), 20);
        assert_eq!(safety_penalty(5), 35);
    }

    #[test]
    fn penalty_defaults_for_out_of_range_severity() {
        assert_eq!(safety_penalty(0), 5);
        assert_eq!(safety_penalty(6), 5);
        assert_eq!(safety_penalty(-3), 5);
    }

    #[test]
    fn incident_floors_score_at_zero() {
        // puntaje 10 con severidad 5 (penalización 35) termina en 0, no en -25
        assert_eq!(apply_incident(10, 5), 0);
        assert_eq!(apply_incident(100, 5), 65);
        assert_eq!(apply_incident(0, 1), 0);
    }

    #[test]
    fn roi_basic() {
        let roi = vehicle_roi(
            Decimal::from(200_000),
            Decimal::from(30_000),
            Decimal::from(20_000),
            Decimal::from(1_000_000),
        );
        assert_eq!(roi, Decimal::new(1500, 2)); // 15.00
    }

    #[test]
    fn roi_with_zero_acquisition_cost_is_zero() {
        assert_eq!(
            vehicle_roi(
                Decimal::from(100),
                Decimal::ZERO,
                Decimal::ZERO,
                Decimal::ZERO
            ),
            Decimal::ZERO
        );
        assert_eq!(
            vehicle_roi(
                Decimal::from(100),
                Decimal::ZERO,
                Decimal::ZERO,
                Decimal::from(-5)
            ),
            Decimal::ZERO
        );
    }

    #[test]
    fn efficiency_rounds_to_two_decimals() {
        let eff = fuel_efficiency(Decimal::from(44100), Decimal::from(44500), Decimal::from(45));
        assert_eq!(eff, Decimal::new(889, 2)); // 400 / 45 = 8.888... -> 8.89
    }

    #[test]
    fn efficiency_is_zero_without_forward_movement() {
        assert_eq!(
            fuel_efficiency(Decimal::from(500), Decimal::from(500), Decimal::from(30)),
            Decimal::ZERO
        );
        assert_eq!(
            fuel_efficiency(Decimal::from(500), Decimal::from(600), Decimal::ZERO),
            Decimal::ZERO
        );
    }

    #[test]
    fn license_status_boundaries() {
        let now = Utc::now();
        assert_eq!(
            license_status(now - Duration::days(1), now),
            LicenseStatus::Expired
        );
        assert_eq!(
            license_status(now + Duration::days(10), now),
            LicenseStatus::ExpiringSoon
        );
        assert_eq!(
            license_status(now + Duration::days(31), now),
            LicenseStatus::Valid
        );
    }

    #[test]
    fn completion_rate_handles_zero_trips() {
        assert_eq!(completion_rate(0, 0), 0.0);
        assert_eq!(completion_rate(46, 48), 95.83);
    }
}
