//! Client -> Server message building.

use serde::{Deserialize, Serialize};

use crate::{Direction, ProtocolError};

/// Message sent by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Steer the local snake.
    Direction { dir: Direction },
    /// Ask for a fresh snake after elimination.
    Restart,
    /// Operator command; the server answers with `adminMsg`.
    Admin { command: AdminCommand },
}

/// Commands understood by the server's admin handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AdminCommand {
    SpawnFood,
    ResetGame,
    KickAll,
}

impl AdminCommand {
    /// Look up a command by its wire name or short alias.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "spawnFood" | "spawn" => Some(Self::SpawnFood),
            "resetGame" | "reset" => Some(Self::ResetGame),
            "kickAll" | "kick" => Some(Self::KickAll),
            _ => None,
        }
    }
}

impl ClientMessage {
    /// Encode to a text frame.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }

    /// Decode a text frame (used by test servers).
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(ProtocolError::Malformed)
    }
}
