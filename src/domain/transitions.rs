//! Máquina de estados de viajes
//!
//! Tabla declarativa de transiciones válidas. Cualquier intento fuera de
//! la tabla se rechaza sin efectos secundarios.

use crate::models::trip::TripStatus;
use crate::utils::errors::{AppError, AppResult};

/// estado actual → estados alcanzables
pub static VALID_TRANSITIONS: [(TripStatus, &[TripStatus]); 5] = [
    (
        TripStatus::Draft,
        &[TripStatus::Dispatched, TripStatus::Cancelled],
    ),
    (
        TripStatus::Dispatched,
        &[TripStatus::InTransit, TripStatus::Cancelled],
    ),
    (
        TripStatus::InTransit,
        &[TripStatus::Completed, TripStatus::Cancelled],
    ),
    (TripStatus::Completed, &[]), // estado terminal
    (TripStatus::Cancelled, &[]), // estado terminal
];

pub fn allowed_targets(from: TripStatus) -> &'static [TripStatus] {
    VALID_TRANSITIONS
        .iter()
        .find(|(status, _)| *status == from)
        .map(|(_, targets)| *targets)
        .unwrap_or(&[])
}

pub fn can_transition(from: TripStatus, to: TripStatus) -> bool {
    allowed_targets(from).contains(&to)
}

pub fn assert_transition(from: TripStatus, to: TripStatus) -> AppResult<()> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(AppError::InvalidTransition { from, to })
    }
}
