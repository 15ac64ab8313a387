pub mod client;
pub mod error;
pub mod types;

pub use client::{AlertClient, AlertTransport};
pub use error::DispatchError;
pub use types::{AlertRequest, AlertResponse};
