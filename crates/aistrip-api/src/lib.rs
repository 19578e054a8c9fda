// aistrip-api: Async Rust client for the FamilyAsyst AiStrip cloud API

pub mod client;
pub mod devices;
pub mod error;
pub mod models;
pub mod transport;

pub use client::{AiStripClient, DEFAULT_BASE_URL};
pub use error::Error;
pub use models::{ControlRequest, ControlResponse, DeviceDetail, RemoteDevice};
pub use transport::TransportConfig;
