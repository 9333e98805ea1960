//! Socket.IO push channel
//!
//! A minimal Socket.IO v5 client over the Engine.IO v4 WebSocket transport.
//! Only the default namespace and text events are supported.

mod channel;
pub mod packet;

pub use channel::{SocketIoChannel, SocketIoSession, socket_url};
pub use packet::{EnginePacket, Handshake, PacketBody, PacketError, SocketPacket};
