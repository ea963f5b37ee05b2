//! Routers HTTP por entidad
//!
//! Cada submódulo expone un `create_*_router()` que se monta bajo
//! `/api/...` en main. Los handlers validan el request, llaman al
//! service correspondiente y envuelven la respuesta.

pub mod driver_routes;
pub mod fuel_routes;
pub mod maintenance_routes;
pub mod trip_routes;
pub mod vehicle_routes;

use axum::http::HeaderMap;
use uuid::Uuid;

// TODO: extraer la identidad del header Authorization cuando el gateway
// de autenticación esté integrado; por ahora llega como header opaco.
pub(crate) fn requester_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get("x-requester-id")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value).ok())
}
