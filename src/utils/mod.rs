//! Utilidades del sistema
//!
//! Este módulo contiene utilidades para manejo de errores y
//! conversiones numéricas comunes.

pub mod errors;
pub mod numbers;
