pub mod error;
pub mod network;
pub mod provider;

pub use error::LocationError;
pub use network::NetworkLocator;
pub use provider::{Fix, FixSource, Geolocator, LocationOptions, LocationProvider};
