//! Reglas de dominio puras
//!
//! Funciones sin I/O que consumen la máquina de estados de viajes y los
//! services. Todo lo que toca la base vive en `store`, no acá.

pub mod rules;
pub mod transitions;
