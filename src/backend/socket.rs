/// Live push channel: Socket.IO over WebSocket with a fixed-delay reconnect loop
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Duration};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use crate::backend::packet::{
    decode_engine, decode_socket, encode_connect, encode_pong, EnginePacket, SocketPacket,
    DEFAULT_HEARTBEAT,
};
use crate::error::ChannelError;
use crate::models::SensorUpdate;
use crate::source::{SampleSource, SourceEvent};

pub struct SocketChannel {
    url: Url,
    event: String,
    reconnect_delay: Duration,
}

/// Build the Socket.IO WebSocket endpoint for a backend base URL
///
/// `http` maps to `ws` and `https` to `wss`; the Engine.IO path and query are
/// appended to whatever path the base already has.
pub fn socket_url(base: &Url) -> Result<Url, ChannelError> {
    let scheme = match base.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(ChannelError::Url(format!("unsupported scheme {}", other))),
    };

    let mut url = base.clone();
    url.set_scheme(scheme)
        .map_err(|_| ChannelError::Url(format!("cannot switch {} to {}", base, scheme)))?;

    let path = format!("{}/socket.io/", base.path().trim_end_matches('/'));
    url.set_path(&path);
    url.set_query(Some("EIO=4&transport=websocket"));
    Ok(url)
}

/// What one decoded frame asks the session to do
#[derive(Debug)]
enum Step {
    /// Engine.IO session opened with the given heartbeat; join the namespace
    Open(Duration),
    Reply(String),
    Emit(SourceEvent),
    Ignore,
    End(ChannelError),
}

impl SocketChannel {
    pub fn new(base: &Url, event: String, reconnect_delay: Duration) -> Result<Self, ChannelError> {
        Ok(Self {
            url: socket_url(base)?,
            event,
            reconnect_delay,
        })
    }

    /// Interpret one text frame from the server
    fn handle_frame(&self, frame: &str) -> Result<Step, ChannelError> {
        match decode_engine(frame)? {
            EnginePacket::Open(handshake) => {
                debug!(
                    "Engine.IO session {} (ping every {} ms)",
                    handshake.sid, handshake.ping_interval
                );
                Ok(Step::Open(handshake.heartbeat()))
            }
            EnginePacket::Ping(data) => Ok(Step::Reply(encode_pong(&data))),
            EnginePacket::Close => Ok(Step::End(ChannelError::Closed)),
            EnginePacket::Message(data) => match decode_socket(&data)? {
                SocketPacket::Connect(_) => Ok(Step::Emit(SourceEvent::Connected)),
                SocketPacket::Disconnect => Ok(Step::End(ChannelError::Closed)),
                SocketPacket::ConnectError(reason) => {
                    Ok(Step::End(ChannelError::Refused(reason.to_string())))
                }
                SocketPacket::Event { name, payload } if name == self.event => {
                    match serde_json::from_value::<SensorUpdate>(payload) {
                        Ok(update) => Ok(Step::Emit(SourceEvent::Update(update))),
                        Err(e) => {
                            warn!("Dropping malformed {} payload: {}", name, e);
                            Ok(Step::Ignore)
                        }
                    }
                }
                SocketPacket::Event { name, .. } => {
                    debug!("Ignoring event {}", name);
                    Ok(Step::Ignore)
                }
                SocketPacket::Ack => Ok(Step::Ignore),
            },
            EnginePacket::Pong(_) | EnginePacket::Upgrade | EnginePacket::Noop => Ok(Step::Ignore),
        }
    }

    /// Run one connection until it drops
    ///
    /// Sets `connected` once the namespace handshake completes so the caller
    /// knows whether a Disconnected event is owed. The session ends when the
    /// server stays silent for longer than its advertised heartbeat.
    async fn session(
        &self,
        tx: &mpsc::Sender<SourceEvent>,
        connected: &mut bool,
    ) -> Result<(), ChannelError> {
        let (stream, _) = connect_async(self.url.as_str()).await?;
        let (mut write, mut read) = stream.split();
        debug!("WebSocket open to {}", self.url);

        let mut heartbeat = DEFAULT_HEARTBEAT;
        loop {
            let message = match timeout(heartbeat, read.next()).await {
                Ok(Some(message)) => message?,
                Ok(None) => return Err(ChannelError::Closed),
                Err(_) => return Err(ChannelError::HeartbeatTimeout(heartbeat)),
            };
            let text = match message {
                Message::Text(text) => text,
                Message::Close(_) => return Err(ChannelError::Closed),
                _ => continue,
            };

            match self.handle_frame(&text) {
                Ok(Step::Open(interval)) => {
                    heartbeat = interval;
                    write.send(Message::Text(encode_connect())).await?;
                }
                Ok(Step::Reply(reply)) => write.send(Message::Text(reply.into())).await?,
                Ok(Step::Emit(event)) => {
                    if event == SourceEvent::Connected {
                        info!("Push channel connected");
                        *connected = true;
                    }
                    if tx.send(event).await.is_err() {
                        return Ok(());
                    }
                }
                Ok(Step::Ignore) => {}
                Ok(Step::End(reason)) => return Err(reason),
                Err(e) => warn!("Skipping frame: {}", e),
            }
        }
    }
}

impl SampleSource for SocketChannel {
    fn name(&self) -> &'static str {
        "live"
    }

    fn start(self: Box<Self>, tx: mpsc::Sender<SourceEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!("Connecting push channel to {}", self.url);

            // A channel that never comes up is still reported offline, once
            let mut offline_announced = false;
            loop {
                let mut connected = false;
                match self.session(&tx, &mut connected).await {
                    Ok(()) => {
                        debug!("Dashboard gone, stopping push channel");
                        break;
                    }
                    Err(e) => error!("Push channel error: {}", e),
                }

                if connected || !offline_announced {
                    if tx.send(SourceEvent::Disconnected).await.is_err() {
                        break;
                    }
                    offline_announced = true;
                }
                if tx.is_closed() {
                    break;
                }

                info!(
                    "Reconnecting push channel in {} seconds",
                    self.reconnect_delay.as_secs()
                );
                sleep(self.reconnect_delay).await;
            }
        })
    }
}
