//! Repositorios
//!
//! Puerto de persistencia y sus dos adaptadores: PostgreSQL y memoria.

pub mod memory_store;
pub mod postgres_store;
pub mod store;

pub use memory_store::MemoryStore;
pub use postgres_store::PgStore;
pub use store::{CarpoolStore, StoreTransaction};
