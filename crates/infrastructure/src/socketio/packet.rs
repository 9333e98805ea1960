//! Engine.IO v4 and Socket.IO v5 packet codec.
//!
//! Every WebSocket text frame carries one Engine.IO packet. Engine.IO
//! `message` packets in turn carry one Socket.IO packet:
//!
//! ```text
//! 42["tick",{"time":"...","watchers":3}]
//! ^^ ^
//! || +-- Socket.IO data (JSON)
//! |+---- Socket.IO type (2 = EVENT)
//! +----- Engine.IO type (4 = MESSAGE)
//! ```

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Namespace used when a packet names none.
pub const DEFAULT_NAMESPACE: &str = "/";

/// Packet decoding errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PacketError {
    /// Frame had no type character.
    #[error("empty packet")]
    Empty,
    /// Type character is not defined by the protocol.
    #[error("unknown {layer} packet type '{kind}'")]
    UnknownType {
        /// Protocol layer ("engine" or "socket").
        layer: &'static str,
        /// Offending character.
        kind: char,
    },
    /// Packet data is not valid JSON.
    #[error("invalid JSON in packet: {0}")]
    InvalidJson(String),
    /// Event data is not `[name, ...args]`.
    #[error("malformed event: {0}")]
    MalformedEvent(&'static str),
    /// Binary events and acks need attachments, which this client does not read.
    #[error("binary packets are not supported")]
    Binary,
}

/// One Engine.IO packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePacket<'a> {
    /// Server handshake with a JSON body.
    Open(&'a str),
    /// Transport close.
    Close,
    /// Heartbeat probe; the server sends it and expects a pong.
    Ping(&'a str),
    /// Heartbeat reply.
    Pong(&'a str),
    /// Carries a Socket.IO packet.
    Message(&'a str),
    /// Transport upgrade, unused over WebSocket.
    Upgrade,
    /// No-op.
    Noop,
}

impl<'a> EnginePacket<'a> {
    /// Parses a text frame.
    ///
    /// # Errors
    ///
    /// Returns an error for empty frames and unknown packet types.
    pub fn parse(frame: &'a str) -> Result<Self, PacketError> {
        let mut chars = frame.chars();
        let kind = chars.next().ok_or(PacketError::Empty)?;
        let data = chars.as_str();
        match kind {
            '0' => Ok(Self::Open(data)),
            '1' => Ok(Self::Close),
            '2' => Ok(Self::Ping(data)),
            '3' => Ok(Self::Pong(data)),
            '4' => Ok(Self::Message(data)),
            '5' => Ok(Self::Upgrade),
            '6' => Ok(Self::Noop),
            kind => Err(PacketError::UnknownType {
                layer: "engine",
                kind,
            }),
        }
    }

    /// Encodes the packet as a text frame.
    #[must_use]
    pub fn encode(&self) -> String {
        let (kind, data) = match *self {
            Self::Open(data) => ('0', data),
            Self::Close => ('1', ""),
            Self::Ping(data) => ('2', data),
            Self::Pong(data) => ('3', data),
            Self::Message(data) => ('4', data),
            Self::Upgrade => ('5', ""),
            Self::Noop => ('6', ""),
        };
        format!("{kind}{data}")
    }
}

/// Body of the Engine.IO open packet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    /// Engine.IO session id.
    pub sid: String,
    /// Transports the server would upgrade to.
    #[serde(default)]
    pub upgrades: Vec<String>,
    /// Milliseconds between server pings.
    pub ping_interval: u64,
    /// Milliseconds the server waits for a pong.
    pub ping_timeout: u64,
    /// Largest accepted payload in bytes.
    #[serde(default)]
    pub max_payload: u64,
}

impl Handshake {
    /// Parses the JSON carried by an open packet.
    ///
    /// # Errors
    ///
    /// Returns [`PacketError::InvalidJson`] if the body is not a handshake.
    pub fn parse(data: &str) -> Result<Self, PacketError> {
        serde_json::from_str(data).map_err(|e| PacketError::InvalidJson(e.to_string()))
    }

    /// How long the connection may stay silent before the server is
    /// considered gone: one ping interval plus the ping timeout.
    #[must_use]
    pub const fn liveness_window(&self) -> Duration {
        Duration::from_millis(self.ping_interval.saturating_add(self.ping_timeout))
    }
}

/// Decoded Socket.IO packet.
#[derive(Debug, Clone, PartialEq)]
pub struct SocketPacket {
    /// Target namespace.
    pub namespace: String,
    /// Acknowledgement id, when the sender asked for one.
    pub ack_id: Option<u64>,
    /// Packet contents.
    pub body: PacketBody,
}

/// Socket.IO packet contents by type.
#[derive(Debug, Clone, PartialEq)]
pub enum PacketBody {
    /// Namespace connect request or acknowledgement.
    Connect(Option<Value>),
    /// Namespace disconnect.
    Disconnect,
    /// Named event with its first argument.
    Event {
        /// Event name.
        name: String,
        /// First argument, `null` when absent.
        payload: Value,
    },
    /// Acknowledgement data.
    Ack(Value),
    /// Namespace connect refused.
    ConnectError(String),
}

impl SocketPacket {
    /// Packet for the default namespace.
    #[must_use]
    pub fn new(body: PacketBody) -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            ack_id: None,
            body,
        }
    }

    /// Returns true for packets addressed to the default namespace.
    #[must_use]
    pub fn is_default_namespace(&self) -> bool {
        self.namespace == DEFAULT_NAMESPACE
    }

    /// Parses the data of an Engine.IO message packet.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown types, binary packets, bad JSON, and
    /// events that are not `[name, ...args]`.
    pub fn parse(data: &str) -> Result<Self, PacketError> {
        let mut chars = data.chars();
        let kind = chars.next().ok_or(PacketError::Empty)?;
        let mut rest = chars.as_str();

        if matches!(kind, '5' | '6') {
            return Err(PacketError::Binary);
        }

        let namespace = if rest.starts_with('/') {
            let end = rest.find(',').unwrap_or(rest.len());
            let namespace = &rest[..end];
            rest = rest.get(end + 1..).unwrap_or("");
            namespace
        } else {
            DEFAULT_NAMESPACE
        };

        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        let ack_id = rest[..digits].parse().ok();
        rest = &rest[digits..];

        let value = if rest.is_empty() {
            None
        } else {
            Some(
                serde_json::from_str::<Value>(rest)
                    .map_err(|e| PacketError::InvalidJson(e.to_string()))?,
            )
        };

        let body = match kind {
            '0' => PacketBody::Connect(value),
            '1' => PacketBody::Disconnect,
            '2' => decode_event(value)?,
            '3' => PacketBody::Ack(value.unwrap_or(Value::Null)),
            '4' => PacketBody::ConnectError(connect_error_message(value)),
            kind => {
                return Err(PacketError::UnknownType {
                    layer: "socket",
                    kind,
                });
            }
        };

        Ok(Self {
            namespace: namespace.to_string(),
            ack_id,
            body,
        })
    }

    /// Encodes the packet as Engine.IO message data.
    #[must_use]
    pub fn encode(&self) -> String {
        let (kind, value) = match &self.body {
            PacketBody::Connect(value) => ('0', value.clone()),
            PacketBody::Disconnect => ('1', None),
            PacketBody::Event { name, payload } => (
                '2',
                Some(Value::Array(vec![Value::String(name.clone()), payload.clone()])),
            ),
            PacketBody::Ack(value) => ('3', Some(value.clone())),
            PacketBody::ConnectError(message) => {
                ('4', Some(serde_json::json!({ "message": message })))
            }
        };

        let mut out = String::new();
        out.push(kind);
        if !self.is_default_namespace() {
            out.push_str(&self.namespace);
            out.push(',');
        }
        if let Some(id) = self.ack_id {
            out.push_str(&id.to_string());
        }
        if let Some(value) = value {
            out.push_str(&value.to_string());
        }
        out
    }

    /// Full text frame for this packet.
    #[must_use]
    pub fn to_frame(&self) -> String {
        EnginePacket::Message(&self.encode()).encode()
    }
}

fn decode_event(value: Option<Value>) -> Result<PacketBody, PacketError> {
    let Some(Value::Array(mut args)) = value else {
        return Err(PacketError::MalformedEvent("data is not an array"));
    };
    if args.is_empty() {
        return Err(PacketError::MalformedEvent("missing event name"));
    }
    let Value::String(name) = args.remove(0) else {
        return Err(PacketError::MalformedEvent("event name is not a string"));
    };
    let payload = if args.is_empty() {
        Value::Null
    } else {
        args.swap_remove(0)
    };
    Ok(PacketBody::Event { name, payload })
}

fn connect_error_message(value: Option<Value>) -> String {
    match value {
        Some(Value::String(message)) => message,
        Some(Value::Object(map)) => match map.get("message") {
            Some(Value::String(message)) => message.clone(),
            _ => Value::Object(map).to_string(),
        },
        Some(other) => other.to_string(),
        None => "namespace connection refused".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn engine_packets_parse_by_type_digit() {
        assert_eq!(EnginePacket::parse("2").unwrap(), EnginePacket::Ping(""));
        assert_eq!(EnginePacket::parse("1").unwrap(), EnginePacket::Close);
        assert_eq!(EnginePacket::parse("40").unwrap(), EnginePacket::Message("0"));
        assert_eq!(EnginePacket::parse("").unwrap_err(), PacketError::Empty);
        assert_eq!(
            EnginePacket::parse("x").unwrap_err(),
            PacketError::UnknownType {
                layer: "engine",
                kind: 'x'
            }
        );
    }

    #[test]
    fn pong_echoes_probe_data() {
        assert_eq!(EnginePacket::Pong("").encode(), "3");
        assert_eq!(EnginePacket::Pong("probe").encode(), "3probe");
    }

    #[test]
    fn handshake_reads_timing_fields() {
        let frame = r#"0{"sid":"lv_VI97HAXpY6yYWAAAC","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#;
        let EnginePacket::Open(data) = EnginePacket::parse(frame).unwrap() else {
            panic!("expected open packet");
        };
        let handshake = Handshake::parse(data).unwrap();
        assert_eq!(handshake.sid, "lv_VI97HAXpY6yYWAAAC");
        assert_eq!(handshake.liveness_window(), Duration::from_secs(45));
    }

    #[test]
    fn handshake_rejects_garbage() {
        assert!(matches!(
            Handshake::parse("not json"),
            Err(PacketError::InvalidJson(_))
        ));
    }

    #[test]
    fn tick_event_decodes_name_and_payload() {
        let packet =
            SocketPacket::parse(r#"2["tick",{"time":"2024-01-01T00:00:00Z","watchers":3}]"#)
                .unwrap();
        assert!(packet.is_default_namespace());
        assert_eq!(packet.ack_id, None);
        assert_eq!(
            packet.body,
            PacketBody::Event {
                name: "tick".into(),
                payload: json!({ "time": "2024-01-01T00:00:00Z", "watchers": 3 }),
            }
        );
    }

    #[test]
    fn namespace_and_ack_id_are_split_off() {
        let packet = SocketPacket::parse(r#"2/admin,12["count",{"count":4}]"#).unwrap();
        assert_eq!(packet.namespace, "/admin");
        assert_eq!(packet.ack_id, Some(12));
        assert!(matches!(packet.body, PacketBody::Event { ref name, .. } if name == "count"));
    }

    #[test]
    fn event_without_arguments_has_null_payload() {
        let packet = SocketPacket::parse(r#"2["ping"]"#).unwrap();
        assert_eq!(
            packet.body,
            PacketBody::Event {
                name: "ping".into(),
                payload: Value::Null
            }
        );
    }

    #[test]
    fn malformed_events_are_rejected() {
        assert_eq!(
            SocketPacket::parse(r#"2{"tick":1}"#).unwrap_err(),
            PacketError::MalformedEvent("data is not an array")
        );
        assert_eq!(
            SocketPacket::parse("2[]").unwrap_err(),
            PacketError::MalformedEvent("missing event name")
        );
        assert_eq!(
            SocketPacket::parse("2[1,2]").unwrap_err(),
            PacketError::MalformedEvent("event name is not a string")
        );
        assert!(matches!(
            SocketPacket::parse(r#"2["tick",{"#),
            Err(PacketError::InvalidJson(_))
        ));
    }

    #[test]
    fn connect_ack_and_connect_error() {
        let ack = SocketPacket::parse(r#"0{"sid":"abc"}"#).unwrap();
        assert_eq!(ack.body, PacketBody::Connect(Some(json!({ "sid": "abc" }))));

        let refused = SocketPacket::parse(r#"4{"message":"Not authorized"}"#).unwrap();
        assert_eq!(refused.body, PacketBody::ConnectError("Not authorized".into()));

        let bare = SocketPacket::parse("4").unwrap();
        assert_eq!(
            bare.body,
            PacketBody::ConnectError("namespace connection refused".into())
        );
    }

    #[test]
    fn binary_packets_are_unsupported() {
        assert_eq!(
            SocketPacket::parse(r#"51-["upload",{"_placeholder":true,"num":0}]"#).unwrap_err(),
            PacketError::Binary
        );
    }

    #[test]
    fn client_frames() {
        assert_eq!(SocketPacket::new(PacketBody::Connect(None)).to_frame(), "40");
        assert_eq!(SocketPacket::new(PacketBody::Disconnect).to_frame(), "41");

        let mut event = SocketPacket::new(PacketBody::Event {
            name: "hello".into(),
            payload: json!(1),
        });
        event.namespace = "/chat".into();
        event.ack_id = Some(7);
        assert_eq!(event.to_frame(), r#"42/chat,7["hello",1]"#);
    }
}
