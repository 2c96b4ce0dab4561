/// Socket.IO v4 framing over Engine.IO v4 WebSocket text frames
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::error::ChannelError;

/// Engine.IO open handshake body
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub ping_interval: u64,
    #[serde(default)]
    pub ping_timeout: u64,
}

/// Socket.IO server defaults: 25 s ping interval plus 20 s ping timeout
pub const DEFAULT_HEARTBEAT: Duration = Duration::from_millis(25_000 + 20_000);

impl Handshake {
    /// Longest silence allowed before the server counts as gone
    pub fn heartbeat(&self) -> Duration {
        match self.ping_interval + self.ping_timeout {
            0 => DEFAULT_HEARTBEAT,
            millis => Duration::from_millis(millis),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open(Handshake),
    Close,
    Ping(String),
    Pong(String),
    Message(String),
    Upgrade,
    Noop,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect(Option<Value>),
    Disconnect,
    Event { name: String, payload: Value },
    Ack,
    ConnectError(Value),
}

/// Split a frame into its leading type digit and the remaining data
fn split_type(frame: &str) -> Result<(u32, &str), ChannelError> {
    let mut chars = frame.chars();
    let kind = chars
        .next()
        .and_then(|c| c.to_digit(10))
        .ok_or_else(|| ChannelError::Malformed(format!("missing packet type in {:?}", frame)))?;
    Ok((kind, chars.as_str()))
}

/// Decode one Engine.IO frame
///
/// A frame is a single type digit followed by its data:
///
/// - `0` open, data is the JSON handshake
/// - `1` close
/// - `2` ping / `3` pong, data echoed back
/// - `4` message, data is a Socket.IO packet
/// - `5` upgrade / `6` noop
pub fn decode_engine(frame: &str) -> Result<EnginePacket, ChannelError> {
    let (kind, data) = split_type(frame)?;
    match kind {
        0 => serde_json::from_str(data)
            .map(EnginePacket::Open)
            .map_err(|e| ChannelError::Malformed(format!("bad handshake: {}", e))),
        1 => Ok(EnginePacket::Close),
        2 => Ok(EnginePacket::Ping(data.to_string())),
        3 => Ok(EnginePacket::Pong(data.to_string())),
        4 => Ok(EnginePacket::Message(data.to_string())),
        5 => Ok(EnginePacket::Upgrade),
        6 => Ok(EnginePacket::Noop),
        other => Err(ChannelError::Malformed(format!(
            "unknown engine packet type {}",
            other
        ))),
    }
}

/// Decode the Socket.IO packet carried by an Engine.IO message
///
/// A type digit, then an optional `/namespace,` prefix, an optional numeric
/// ack id and a JSON body. Only the default namespace is used here.
pub fn decode_socket(data: &str) -> Result<SocketPacket, ChannelError> {
    let (kind, mut rest) = split_type(data)?;

    // Namespace, only present for non-default namespaces
    if rest.starts_with('/') {
        rest = match rest.find(',') {
            Some(idx) => &rest[idx + 1..],
            None => "",
        };
    }

    // Ack id
    let body_start = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let body = &rest[body_start..];

    let json = |body: &str| -> Result<Value, ChannelError> {
        serde_json::from_str(body).map_err(|e| ChannelError::Malformed(e.to_string()))
    };

    match kind {
        0 if body.is_empty() => Ok(SocketPacket::Connect(None)),
        0 => Ok(SocketPacket::Connect(Some(json(body)?))),
        1 => Ok(SocketPacket::Disconnect),
        2 => {
            let mut items = match json(body)? {
                Value::Array(items) if !items.is_empty() => items,
                other => {
                    return Err(ChannelError::Malformed(format!(
                        "event body is not a non-empty array: {}",
                        other
                    )))
                }
            };
            let name = match items.remove(0) {
                Value::String(name) => name,
                other => {
                    return Err(ChannelError::Malformed(format!(
                        "event name is not a string: {}",
                        other
                    )))
                }
            };
            let payload = if items.is_empty() {
                Value::Null
            } else {
                items.remove(0)
            };
            Ok(SocketPacket::Event { name, payload })
        }
        3 => Ok(SocketPacket::Ack),
        4 => Ok(SocketPacket::ConnectError(if body.is_empty() {
            Value::Null
        } else {
            json(body)?
        })),
        other => Err(ChannelError::Malformed(format!(
            "unsupported socket packet type {}",
            other
        ))),
    }
}

/// Join the default namespace
pub fn encode_connect() -> String {
    "40".to_string()
}

pub fn encode_pong(data: &str) -> String {
    format!("3{}", data)
}
