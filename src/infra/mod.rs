//! Infrastructure adapters for storage backends.

pub mod store;
pub use store::FileStore;
pub use store::InMemoryStore;
pub use store::PostgresSchema;
