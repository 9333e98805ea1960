//! WebSocket transport for the push channel.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tickwatch_application::ports::{ChannelError, ChannelSession, PushChannel};
use tickwatch_domain::{ChannelEvent, ClockConfig};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, trace, warn};
use url::Url;

use super::packet::{EnginePacket, Handshake, PacketBody, PacketError, SocketPacket};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const ENGINE_QUERY: &str = "EIO=4&transport=websocket";

/// Builds the Engine.IO WebSocket endpoint for a server base URL.
///
/// `http` maps to `ws` and `https` to `wss`; a base path is kept.
///
/// # Errors
///
/// Returns [`ChannelError::InvalidUrl`] for unparseable URLs and schemes
/// other than http(s) or ws(s).
pub fn socket_url(server_url: &str) -> Result<Url, ChannelError> {
    let mut url =
        Url::parse(server_url).map_err(|e| ChannelError::InvalidUrl(format!("{server_url}: {e}")))?;

    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(ChannelError::InvalidUrl(format!(
                "unsupported scheme '{other}'"
            )));
        }
    };
    url.set_scheme(scheme)
        .map_err(|()| ChannelError::InvalidUrl(format!("cannot use {scheme} for {server_url}")))?;

    let path = format!("{}/socket.io/", url.path().trim_end_matches('/'));
    url.set_path(&path);
    url.set_query(Some(ENGINE_QUERY));
    url.set_fragment(None);
    Ok(url)
}

/// Push channel backed by a Socket.IO server.
#[derive(Debug, Clone)]
pub struct SocketIoChannel {
    endpoint: Url,
    connect_timeout: Duration,
}

impl SocketIoChannel {
    /// Creates a channel factory for `server_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::InvalidUrl`] if the URL cannot be mapped to a
    /// WebSocket endpoint.
    pub fn new(server_url: &str, connect_timeout: Duration) -> Result<Self, ChannelError> {
        Ok(Self {
            endpoint: socket_url(server_url)?,
            connect_timeout,
        })
    }

    /// Creates a channel factory from the client configuration.
    ///
    /// # Errors
    ///
    /// See [`SocketIoChannel::new`].
    pub fn from_config(config: &ClockConfig) -> Result<Self, ChannelError> {
        Self::new(&config.server_url, config.connect_timeout())
    }
}

#[async_trait]
impl PushChannel for SocketIoChannel {
    async fn connect(&self) -> Result<Box<dyn ChannelSession>, ChannelError> {
        debug!(endpoint = %self.endpoint, "opening push channel");
        let session = tokio::time::timeout(self.connect_timeout, SocketIoSession::open(&self.endpoint))
            .await
            .map_err(|_| ChannelError::Timeout)??;
        Ok(Box::new(session))
    }
}

/// An established Socket.IO session on the default namespace.
pub struct SocketIoSession {
    ws: WsStream,
    sid: String,
    liveness: Duration,
    remote_closed: bool,
    closed: bool,
}

impl SocketIoSession {
    async fn open(endpoint: &Url) -> Result<Self, ChannelError> {
        let (mut ws, _response) = connect_async(endpoint.as_str())
            .await
            .map_err(|e| ChannelError::ConnectionFailed(e.to_string()))?;

        let frame = read_text(&mut ws)
            .await?
            .ok_or_else(|| ChannelError::ConnectionClosed("closed before handshake".into()))?;
        let handshake = match EnginePacket::parse(&frame).map_err(protocol)? {
            EnginePacket::Open(data) => Handshake::parse(data).map_err(protocol)?,
            other => {
                return Err(ChannelError::Protocol(format!(
                    "expected open packet, got {other:?}"
                )));
            }
        };

        let mut session = Self {
            ws,
            sid: handshake.sid.clone(),
            liveness: handshake.liveness_window(),
            remote_closed: false,
            closed: false,
        };
        session
            .send(SocketPacket::new(PacketBody::Connect(None)).to_frame())
            .await?;

        loop {
            let frame = read_text(&mut session.ws).await?.ok_or_else(|| {
                ChannelError::ConnectionClosed("closed before namespace connect".into())
            })?;
            match EnginePacket::parse(&frame).map_err(protocol)? {
                EnginePacket::Ping(data) => session.send(EnginePacket::Pong(data).encode()).await?,
                EnginePacket::Close => {
                    return Err(ChannelError::ConnectionClosed(
                        "server closed during handshake".into(),
                    ));
                }
                EnginePacket::Message(data) => {
                    let packet = SocketPacket::parse(data).map_err(protocol)?;
                    if !packet.is_default_namespace() {
                        continue;
                    }
                    match packet.body {
                        PacketBody::Connect(_) => break,
                        PacketBody::ConnectError(message) => {
                            return Err(ChannelError::Rejected(message));
                        }
                        other => trace!(?other, "ignoring packet before namespace connect"),
                    }
                }
                _ => {}
            }
        }

        info!(sid = %session.sid, "push channel connected");
        Ok(session)
    }

    async fn send(&mut self, frame: String) -> Result<(), ChannelError> {
        self.ws
            .send(Message::text(frame))
            .await
            .map_err(|e| ChannelError::SendFailed(e.to_string()))
    }

    fn fail(&mut self, error: ChannelError) -> Option<Result<ChannelEvent, ChannelError>> {
        self.remote_closed = true;
        Some(Err(error))
    }
}

#[async_trait]
impl ChannelSession for SocketIoSession {
    async fn next_event(&mut self) -> Option<Result<ChannelEvent, ChannelError>> {
        if self.closed || self.remote_closed {
            return None;
        }

        loop {
            let frame = match tokio::time::timeout(self.liveness, read_text(&mut self.ws)).await {
                Err(_) => return self.fail(ChannelError::Timeout),
                Ok(Err(e)) => return self.fail(e),
                Ok(Ok(None)) => {
                    self.remote_closed = true;
                    return None;
                }
                Ok(Ok(Some(frame))) => frame,
            };

            match EnginePacket::parse(&frame) {
                Ok(EnginePacket::Ping(data)) => {
                    if let Err(e) = self.send(EnginePacket::Pong(data).encode()).await {
                        return self.fail(e);
                    }
                }
                Ok(EnginePacket::Close) => {
                    debug!(sid = %self.sid, "server closed the transport");
                    self.remote_closed = true;
                    return None;
                }
                Ok(EnginePacket::Message(data)) => match SocketPacket::parse(data) {
                    Ok(packet) if !packet.is_default_namespace() => {
                        trace!(namespace = %packet.namespace, "ignoring packet for other namespace");
                    }
                    Ok(SocketPacket {
                        body: PacketBody::Event { name, payload },
                        ..
                    }) => return Some(Ok(ChannelEvent::new(name, payload))),
                    Ok(SocketPacket {
                        body: PacketBody::Disconnect,
                        ..
                    }) => {
                        debug!(sid = %self.sid, "server disconnected the namespace");
                        self.remote_closed = true;
                        return None;
                    }
                    Ok(other) => trace!(?other, "ignoring packet"),
                    Err(e) => warn!(error = %e, "dropping undecodable packet"),
                },
                Ok(_) => {}
                Err(e) => warn!(error = %e, "dropping undecodable frame"),
            }
        }
    }

    async fn close(&mut self) -> Result<(), ChannelError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let disconnect = if self.remote_closed {
            Ok(())
        } else {
            self.send(SocketPacket::new(PacketBody::Disconnect).to_frame())
                .await
        };

        let close = match self.ws.close(None).await {
            Ok(()) | Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => Ok(()),
            Err(e) => Err(ChannelError::SendFailed(e.to_string())),
        };

        debug!(sid = %self.sid, "push channel closed");
        disconnect.and(close)
    }
}

/// Next text frame, or `None` once the WebSocket is closed.
async fn read_text(ws: &mut WsStream) -> Result<Option<String>, ChannelError> {
    while let Some(message) = ws.next().await {
        match message {
            Ok(Message::Text(text)) => return Ok(Some(text.as_str().to_owned())),
            Ok(Message::Close(frame)) => {
                debug!(?frame, "websocket closed by server");
                return Ok(None);
            }
            Ok(Message::Binary(_)) => debug!("ignoring binary frame"),
            Ok(_) => {}
            Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => return Ok(None),
            Err(e) => return Err(ChannelError::ConnectionClosed(e.to_string())),
        }
    }
    Ok(None)
}

fn protocol(error: PacketError) -> ChannelError {
    ChannelError::Protocol(error.to_string())
}
