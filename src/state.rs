//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum. El store es un trait object para poder
//! levantar la app contra PostgreSQL o contra la versión en memoria.

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::store::FleetStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FleetStore>,
    pub config: EnvironmentConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn FleetStore>, config: EnvironmentConfig) -> Self {
        Self { store, config }
    }
}
