//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod push_channel;
mod records_gateway;
mod status_source;

pub use push_channel::{ChannelError, ChannelSession, PushChannel};
pub use records_gateway::RecordsGateway;
pub use status_source::StatusSource;
