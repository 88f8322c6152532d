//! Request surface consumed by an external HTTP or CLI layer.

pub mod api;

pub use api::{status_code, ApiError, ApiReply};
