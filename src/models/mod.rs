//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean exactamente
//! al schema PostgreSQL. Las entidades protegen sus propios invariantes.

pub mod booking;
pub mod notification;
pub mod review;
pub mod ride;
pub mod stats;
pub mod user;
