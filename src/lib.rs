//! Carpool marketplace backend
//!
//! Ciclo de vida de los trajets y libro de reservas de un marketplace de
//! covoiturage con créditos internos.

pub mod config;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
