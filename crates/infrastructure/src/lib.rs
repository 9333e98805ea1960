//! Tickwatch Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer.

pub mod adapters;
pub mod persistence;
pub mod serialization;
pub mod socketio;

pub use adapters::ReqwestApiClient;
pub use persistence::{ConfigLoadError, ConfigRepository, apply_env_overrides};
pub use serialization::{SerializationError, from_json_bytes, to_json_stable, to_json_stable_bytes};
pub use socketio::{SocketIoChannel, SocketIoSession};
