//! Conversiones entre los números del wire (f64) y los NUMERIC de la base

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::utils::errors::{validation_error, AppResult};

/// Convertir un valor f64 recibido por la API a Decimal.
/// NaN o infinitos no tienen representación y se rechazan.
pub fn to_decimal(value: f64, field: &'static str) -> AppResult<Decimal> {
    Decimal::from_f64_retain(value)
        .ok_or_else(|| validation_error(field, "must be a finite number"))
}

/// Variante para campos opcionales
pub fn to_decimal_opt(value: Option<f64>, field: &'static str) -> AppResult<Option<Decimal>> {
    value.map(|v| to_decimal(v, field)).transpose()
}

/// Decimal a f64 para las respuestas JSON
pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Variante para columnas NULL
pub fn to_f64_opt(value: Option<Decimal>) -> Option<f64> {
    value.map(to_f64)
}
