use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async, tungstenite::protocol::Message, MaybeTlsStream, WebSocketStream,
};
use url::Url;

use crate::event::{Channel, InboundMessage, OneBotEvent, OneBotResponse};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Forward WebSocket connection to a OneBot v11 implementation.
///
/// Cloning is cheap; every clone feeds the same socket task.
#[derive(Clone)]
pub struct OneBotClient {
    tx: mpsc::Sender<String>, // Channel to send outgoing messages to WS task
}

impl OneBotClient {
    /// Connect in the background. Message events arrive on the returned receiver.
    pub fn new(
        url: &str,
        access_token: Option<&str>,
    ) -> Result<(Self, mpsc::Receiver<InboundMessage>)> {
        let ws_url = connect_url(url, access_token)?;
        let (tx, mut rx) = mpsc::channel::<String>(32);
        let (inbound_tx, inbound_rx) = mpsc::channel::<InboundMessage>(32);

        let client = Self { tx };
        let log_url = redact(&ws_url);

        // Spawn the WebSocket handler task
        tokio::spawn(async move {
            let mut retry_count = 0;
            loop {
                tracing::info!("Connecting to OneBot at {}...", log_url);
                match connect_async(&ws_url).await {
                    Ok((ws_stream, _)) => {
                        tracing::info!("Connected to OneBot!");
                        retry_count = 0; // Reset retry count on success
                        let result = Self::handle_connection(ws_stream, &mut rx, &inbound_tx).await;
                        if let Err(e) = result {
                            tracing::error!("OneBot connection error: {}", e);
                        }
                        if inbound_tx.is_closed() {
                            tracing::info!("Inbound receiver dropped, closing OneBot connection");
                            return;
                        }
                    }
                    Err(e) => {
                        let wait_secs = 5u64.min(2u64.pow(retry_count));
                        tracing::error!(
                            "Failed to connect to OneBot: {}. Retrying in {}s...",
                            e,
                            wait_secs
                        );
                        tokio::time::sleep(tokio::time::Duration::from_secs(wait_secs)).await;
                        if retry_count < 6 { retry_count += 1; }
                    }
                }
                // If handle_connection returns, it means connection lost. Wait before reconnect.
                tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;
            }
        });

        Ok((client, inbound_rx))
    }

    async fn handle_connection(
        stream: WsStream,
        rx: &mut mpsc::Receiver<String>,
        inbound_tx: &mpsc::Sender<InboundMessage>,
    ) -> Result<()> {
        let (mut write, mut read) = stream.split();

        loop {
            tokio::select! {
                // Incoming frames from OneBot
                frame = read.next() => {
                    let Some(frame) = frame else {
                        anyhow::bail!("OneBot closed the connection");
                    };
                    match frame? {
                        Message::Text(text) => {
                            if let Some(inbound) = Self::parse_frame(&text) {
                                if inbound_tx.send(inbound).await.is_err() {
                                    return Ok(());
                                }
                            }
                        }
                        Message::Ping(payload) => write.send(Message::Pong(payload)).await?,
                        Message::Close(_) => anyhow::bail!("OneBot closed the connection"),
                        _ => {}
                    }
                }

                // Outgoing actions to OneBot (from Client::send)
                Some(json_payload) = rx.recv() => {
                    write.send(Message::Text(json_payload)).await?;
                }
            }
        }
    }

    /// Message events become inbound messages; everything else is logged and dropped.
    fn parse_frame(text: &str) -> Option<InboundMessage> {
        match serde_json::from_str::<OneBotEvent>(text) {
            Ok(OneBotEvent::Message(msg_event)) => Some(msg_event.into_inbound()),
            Ok(_) => {
                tracing::trace!("Ignored non-message event");
                None
            }
            Err(_) => {
                match serde_json::from_str::<OneBotResponse>(text) {
                    Ok(resp) if resp.retcode != 0 => {
                        tracing::warn!("OneBot action failed ({}): {}", resp.retcode, resp.wording);
                    }
                    Ok(_) => {}
                    Err(_) => tracing::debug!("Ignored unparseable OneBot frame"),
                }
                None
            }
        }
    }

    pub async fn send(&self, channel: Channel, message: &str) -> Result<()> {
        let payload = channel.send_action(message);
        let json = serde_json::to_string(&payload)?;
        self.tx.send(json).await.map_err(|_| anyhow::anyhow!("WS task dropped"))?;
        Ok(())
    }
}

/// Append the access token as a query parameter, the way OneBot forward
/// WebSocket servers accept it.
fn connect_url(url: &str, access_token: Option<&str>) -> Result<Url> {
    let mut ws_url = Url::parse(url).context("Invalid OneBot WS URL")?;
    if let Some(token) = access_token.filter(|t| !t.is_empty()) {
        ws_url.query_pairs_mut().append_pair("access_token", token);
    }
    Ok(ws_url)
}

fn redact(url: &Url) -> String {
    let mut shown = url.clone();
    shown.set_query(None);
    shown.to_string()
}
