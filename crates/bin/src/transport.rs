//! Native WebSocket transport.
//!
//! One I/O task owns the socket. It forwards inbound text frames and
//! lifecycle changes to the game task over a channel, and writes whatever
//! the game task queues on the outbound channel. The game task is the only
//! one that touches the session.

use client::{ChannelEvent, Transport};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

/// Close code used when the connection ends without a close frame.
const ABNORMAL_CLOSURE: u16 = 1006;
const NORMAL_CLOSURE: u16 = 1000;

/// Outbound handle held by the session.
pub struct NativeTransport {
    outbound: mpsc::UnboundedSender<String>,
    open: Arc<AtomicBool>,
}

impl Transport for NativeTransport {
    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    fn send_text(&self, text: String) {
        // The I/O task is gone once the socket closed; nothing to report.
        if self.outbound.send(text).is_err() {
            debug!("Outbound channel closed, dropping message");
        }
    }
}

/// Start connecting to `url` on a background task.
///
/// Returns the outbound handle and the stream of connection events. The
/// stream always ends with exactly one [`ChannelEvent::Closed`].
pub fn connect(url: &str) -> (NativeTransport, mpsc::UnboundedReceiver<ChannelEvent>) {
    let (out_tx, out_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let open = Arc::new(AtomicBool::new(false));

    tokio::spawn(run_connection(url.to_string(), Arc::clone(&open), out_rx, event_tx));

    (NativeTransport { outbound: out_tx, open }, event_rx)
}

async fn run_connection(
    url: String,
    open: Arc<AtomicBool>,
    mut outbound: mpsc::UnboundedReceiver<String>,
    events: mpsc::UnboundedSender<ChannelEvent>,
) {
    let ws_stream = match connect_async(url.as_str()).await {
        Ok((ws_stream, _response)) => ws_stream,
        Err(e) => {
            warn!("Failed to connect to {}: {}", url, e);
            let _ = events.send(ChannelEvent::Closed {
                code: ABNORMAL_CLOSURE,
                reason: e.to_string(),
            });
            return;
        }
    };
    info!("Connected to {}", url);

    open.store(true, Ordering::Release);
    let _ = events.send(ChannelEvent::Opened);

    let (mut write, mut read) = ws_stream.split();

    let (code, reason) = loop {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if events.send(ChannelEvent::Message(text.as_str().to_owned())).is_err() {
                            break (NORMAL_CLOSURE, "client shut down".to_string());
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        break frame
                            .map(|f| (u16::from(f.code), f.reason.as_str().to_owned()))
                            .unwrap_or((NORMAL_CLOSURE, String::new()));
                    }
                    Some(Err(e)) => {
                        warn!("WebSocket error from {}: {}", url, e);
                        break (ABNORMAL_CLOSURE, e.to_string());
                    }
                    None => break (ABNORMAL_CLOSURE, String::new()),
                    // Binary, ping and pong frames carry nothing for us
                    _ => {}
                }
            }
            out = outbound.recv() => {
                match out {
                    Some(text) => {
                        if let Err(e) = write.send(Message::Text(text.into())).await {
                            warn!("Failed to send to {}: {}", url, e);
                            break (ABNORMAL_CLOSURE, e.to_string());
                        }
                    }
                    None => {
                        let _ = write.send(Message::Close(None)).await;
                        break (NORMAL_CLOSURE, "client shut down".to_string());
                    }
                }
            }
        }
    };

    open.store(false, Ordering::Release);
    info!(code, "Disconnected from {}", url);
    let _ = events.send(ChannelEvent::Closed { code, reason });
}
