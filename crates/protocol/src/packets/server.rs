//! Server -> Client message parsing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{GridPoint, ProtocolError};

/// Parsed server message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Assigns this connection its player identity.
    Init {
        #[serde(rename = "playerId")]
        player_id: String,
    },
    /// Full world snapshot. Replaces whatever the client held before.
    Update(Update),
    /// The local snake was eliminated.
    Dead,
    /// Reply to an admin command.
    AdminMsg { message: String },
    /// Any `type` this client does not know about.
    #[serde(other)]
    Unknown,
}

/// Payload of an `update` message.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Update {
    pub snakes: BTreeMap<String, SnakeState>,
    pub food: Vec<GridPoint>,
    pub state: SnapshotState,
}

/// One snake as carried by a snapshot. Head first.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SnakeState {
    pub cells: Vec<GridPoint>,
}

/// Round state carried by a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotState {
    #[default]
    Waiting,
    /// Servers in the wild send `"playing"` for the same state.
    #[serde(alias = "playing")]
    Active,
}

impl ServerMessage {
    /// Decode a text frame.
    ///
    /// Unknown `type` values decode to [`ServerMessage::Unknown`]; a known
    /// `type` with missing or mistyped fields is [`ProtocolError::Malformed`].
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(ProtocolError::Malformed)
    }

    /// Encode to a text frame.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }

    /// The wire `type` tag, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Init { .. } => "init",
            Self::Update(_) => "update",
            Self::Dead => "dead",
            Self::AdminMsg { .. } => "adminMsg",
            Self::Unknown => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_init() {
        let msg = ServerMessage::decode(r#"{"type":"init","playerId":"p1"}"#).unwrap();
        assert_eq!(msg, ServerMessage::Init { player_id: "p1".into() });
    }

    #[test]
    fn test_decode_update() {
        let msg = ServerMessage::decode(
            r#"{"type":"update","snakes":{"p1":{"cells":[{"x":5,"y":5},{"x":4,"y":5}]}},"food":[{"x":10,"y":10}],"state":"active"}"#,
        )
        .unwrap();
        let ServerMessage::Update(update) = msg else {
            panic!("expected update, got {msg:?}");
        };
        assert_eq!(update.state, SnapshotState::Active);
        assert_eq!(update.food, vec![GridPoint::new(10, 10)]);
        assert_eq!(
            update.snakes["p1"].cells,
            vec![GridPoint::new(5, 5), GridPoint::new(4, 5)]
        );
    }

    #[test]
    fn test_playing_is_active() {
        let msg = ServerMessage::decode(r#"{"type":"update","snakes":{},"food":[],"state":"playing"}"#).unwrap();
        assert!(matches!(msg, ServerMessage::Update(Update { state: SnapshotState::Active, .. })));
    }

    #[test]
    fn test_extra_snake_fields_ignored() {
        let msg = ServerMessage::decode(
            r#"{"type":"update","snakes":{"a":{"playerId":"a","cells":[{"x":1,"y":2}],"direction":"right","alive":true}},"food":[],"state":"waiting"}"#,
        )
        .unwrap();
        let ServerMessage::Update(update) = msg else {
            panic!("expected update");
        };
        assert_eq!(update.snakes["a"].cells, vec![GridPoint::new(1, 2)]);
    }

    #[test]
    fn test_decode_dead_and_admin() {
        assert_eq!(ServerMessage::decode(r#"{"type":"dead"}"#).unwrap(), ServerMessage::Dead);
        assert_eq!(
            ServerMessage::decode(r#"{"type":"adminMsg","message":"Food spawned!"}"#).unwrap(),
            ServerMessage::AdminMsg { message: "Food spawned!".into() }
        );
    }

    #[test]
    fn test_unknown_type_is_not_an_error() {
        let msg = ServerMessage::decode(r#"{"type":"leaderboard","entries":[]}"#).unwrap();
        assert_eq!(msg, ServerMessage::Unknown);
    }

    #[test]
    fn test_missing_fields_are_malformed() {
        for text in [
            r#"{"type":"update","snakes":{},"state":"active"}"#,
            r#"{"type":"update","food":[],"state":"active"}"#,
            r#"{"type":"update","snakes":{},"food":[]}"#,
            r#"{"type":"update","snakes":{},"food":[],"state":"paused"}"#,
            r#"{"type":"init"}"#,
            r#"{"type":"init","playerId":7}"#,
            r#"{"type":"adminMsg"}"#,
            r#"{"playerId":"p1"}"#,
            "not json",
        ] {
            let err = ServerMessage::decode(text).unwrap_err();
            assert!(matches!(err, ProtocolError::Malformed(_)), "{text}");
        }
    }
}
