// boardwall-api: Async Rust client for the chess game backend

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

mod boards;
mod health;
mod system;

pub use client::BackendClient;
pub use error::Error;
pub use transport::TransportConfig;
