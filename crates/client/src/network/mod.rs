// WebSocket connection and the transport seam the session talks through
use protocol::ClientMessage;
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::WebSocket;

use crate::console_log;

/// Lifecycle and data events coming off a connection, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Opened,
    /// One inbound text frame, not yet decoded.
    Message(String),
    Closed { code: u16, reason: String },
}

/// Outbound half of a connection.
pub trait Transport {
    fn is_open(&self) -> bool;

    /// Hand an encoded frame to the connection. Only called while open.
    fn send_text(&self, text: String);

    /// Send a message, silently dropping it when the connection is not open.
    fn send(&self, message: &ClientMessage) {
        if !self.is_open() {
            debug!(?message, "Connection not open, dropping message");
            return;
        }
        match message.encode() {
            Ok(text) => self.send_text(text),
            Err(e) => warn!("Failed to encode {:?}: {}", message, e),
        }
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn send_text(&self, text: String) {
        (**self).send_text(text)
    }
}

/// Browser WebSocket connection.
pub struct Connection {
    ws: WebSocket,
}

impl Connection {
    pub fn new(url: &str) -> Result<Self, JsValue> {
        // Construct WebSocket URL with proper protocol
        let ws_url = if url.starts_with("ws://") || url.starts_with("wss://") {
            url.to_string()
        } else {
            let is_https = web_sys::window()
                .and_then(|w| w.location().protocol().ok())
                .map(|p| p == "https:")
                .unwrap_or(false);

            format!("ws{}://{}", if is_https { "s" } else { "" }, url)
        };

        console_log!("Connecting to: {}", ws_url);
        let ws = WebSocket::new(&ws_url)?;

        Ok(Self { ws })
    }

    pub fn websocket(&self) -> &WebSocket {
        &self.ws
    }
}

impl Transport for Connection {
    fn is_open(&self) -> bool {
        self.ws.ready_state() == WebSocket::OPEN
    }

    fn send_text(&self, text: String) {
        if let Err(e) = self.ws.send_with_str(&text) {
            console_log!("WebSocket send failed: {:?}", e);
        }
    }
}
