use crate::client::stats::Stats;
use anyhow::Result;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use interview_core::channel::SessionChannel;
use interview_types::{ClientEvent, ServerEvent};
use std::sync::{Arc, Mutex};
use tokio_tungstenite::tungstenite::Message;

pub(crate) mod config;
pub(crate) mod consts;
pub(crate) mod stats;
mod utils;

type ClientTx = tokio::sync::mpsc::Sender<ClientEvent>;
type ServerRx = tokio::sync::mpsc::Receiver<ServerEvent>;

/// WebSocket connection to the interview backend.
///
/// A writer task serializes outbound events; a reader task decodes inbound
/// text frames. The inbound stream ends on a close frame or a read error.
pub struct Client {
    capacity: usize,
    config: config::Config,
    c_tx: Option<ClientTx>,
    s_rx: Option<ServerRx>,
    stats: Arc<Mutex<Stats>>,
}

impl Client {
    fn new(capacity: usize, config: config::Config) -> Self {
        Self {
            capacity,
            config,
            c_tx: None,
            s_rx: None,
            stats: Arc::new(Mutex::new(Stats::new())),
        }
    }

    async fn connect(&mut self) -> Result<()> {
        if self.c_tx.is_some() {
            return Err(anyhow::anyhow!("already connected"));
        }

        let request = utils::build_request(&self.config)?;
        let (ws_stream, _) = tokio_tungstenite::connect_async(request).await?;
        tracing::info!("Connected to {}", self.config.url());

        let (mut write, mut read) = ws_stream.split();
        let (c_tx, mut c_rx) = tokio::sync::mpsc::channel::<ClientEvent>(self.capacity);
        let (s_tx, s_rx) = tokio::sync::mpsc::channel::<ServerEvent>(self.capacity);
        self.c_tx = Some(c_tx);
        self.s_rx = Some(s_rx);

        let stats = self.stats.clone();
        tokio::spawn(async move {
            while let Some(event) = c_rx.recv().await {
                match serde_json::to_string(&event) {
                    Ok(text) => {
                        if let Err(e) = write.send(Message::Text(text)).await {
                            tracing::error!("failed to send {} event: {}", event.kind(), e);
                            continue;
                        }
                        tracing::debug!("sent message: {}", event.kind());
                        if let Ok(mut stats_guard) = stats.lock() {
                            stats_guard.record_sent();
                        }
                    }
                    Err(e) => {
                        tracing::error!("failed to serialize event: {}", e);
                    }
                }
            }
            // Every sender is gone: say goodbye to the server.
            if let Err(e) = write.close().await {
                tracing::debug!("failed to close connection: {}", e);
            }
        });

        let stats = self.stats.clone();
        tokio::spawn(async move {
            while let Some(message) = read.next().await {
                let message = match message {
                    Err(e) => {
                        tracing::error!("failed to read message: {}", e);
                        break;
                    }
                    Ok(message) => message,
                };
                match message {
                    Message::Text(text) => match serde_json::from_str::<ServerEvent>(&text) {
                        Ok(event) => {
                            if let Ok(mut stats_guard) = stats.lock() {
                                stats_guard.record_received();
                            }
                            if s_tx.send(event).await.is_err() {
                                tracing::debug!("server event receiver dropped");
                                break;
                            }
                        }
                        Err(e) => {
                            if let Ok(mut stats_guard) = stats.lock() {
                                stats_guard.record_undecodable();
                            }
                            let event_type = serde_json::from_str::<serde_json::Value>(&text)
                                .ok()
                                .and_then(|json| json.get("type")?.as_str().map(str::to_string));
                            tracing::warn!(
                                "ignoring message: {}, type={}",
                                e,
                                event_type.as_deref().unwrap_or("unknown")
                            );
                        }
                    },
                    Message::Binary(bin) => {
                        tracing::warn!("unexpected binary message ({} bytes)", bin.len());
                    }
                    Message::Close(reason) => {
                        tracing::info!("connection closed: {:?}", reason);
                        break;
                    }
                    _ => {}
                }
            }
            // Dropping `s_tx` ends the inbound stream.
        });
        Ok(())
    }

    pub fn stats(&self) -> Result<Stats> {
        if let Ok(stats_guard) = self.stats.lock() {
            Ok(stats_guard.clone())
        } else {
            Err(anyhow::anyhow!("failed to get stats"))
        }
    }
}

#[async_trait]
impl SessionChannel for Client {
    async fn send(&self, event: ClientEvent) -> Result<()> {
        match self.c_tx {
            Some(ref tx) => {
                tx.send(event).await?;
                Ok(())
            }
            None => Err(anyhow::anyhow!("not connected")),
        }
    }

    async fn server_events(&mut self) -> Result<ServerRx> {
        if self.c_tx.is_none() {
            return Err(anyhow::anyhow!("not connected"));
        }
        self.s_rx
            .take()
            .ok_or_else(|| anyhow::anyhow!("server events already taken"))
    }

    async fn close(&mut self) -> Result<()> {
        // The writer task closes the socket once its last sender is dropped.
        self.c_tx.take();
        Ok(())
    }
}

pub async fn connect_with_config(capacity: usize, config: config::Config) -> Result<Client> {
    let mut client = Client::new(capacity, config);
    client.connect().await?;
    Ok(client)
}

pub async fn connect(config: config::Config) -> Result<Client> {
    connect_with_config(consts::DEFAULT_CAPACITY, config).await
}
