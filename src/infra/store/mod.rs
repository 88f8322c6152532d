//! Parking store backends.

pub mod file;
pub mod memory;
pub mod postgres;
mod tables;

pub use file::FileStore;
pub use memory::InMemoryStore;
pub use postgres::PostgresSchema;
