// Synchronizer: applies server messages to the world state store
use protocol::{ProtocolError, ServerMessage, Update};
use thiserror::Error;
use tracing::{debug, warn};

use super::world::{Phase, WorldState};

/// Errors surfaced at the message boundary. The world is untouched when
/// one of these is returned.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Malformed(#[from] ProtocolError),
}

/// What kind of state change a message caused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// First `init` of the connection.
    Identity,
    /// A full snapshot replaced the world.
    Snapshot,
    /// The local snake was eliminated.
    Eliminated,
}

/// Why a well-formed message changed nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ignored {
    UnknownType,
    /// A second `init` on the same connection. Holds the rejected identity.
    RepeatedInit(String),
}

/// Result of applying one well-formed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Mutated(Applied),
    /// Server notice for the status line; the world is unchanged.
    Notice(String),
    Ignored(Ignored),
}

impl Outcome {
    /// Only world mutations warrant a new frame.
    pub fn needs_render(&self) -> bool {
        matches!(self, Outcome::Mutated(_))
    }
}

/// Sole writer of the [`WorldState`].
#[derive(Debug, Default)]
pub struct Synchronizer {
    world: WorldState,
}

impl Synchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    /// Decode and apply one text frame.
    pub fn apply_text(&mut self, text: &str) -> Result<Outcome, SyncError> {
        let message = ServerMessage::decode(text)?;
        Ok(self.apply(message))
    }

    /// Apply an already decoded message.
    pub fn apply(&mut self, message: ServerMessage) -> Outcome {
        match message {
            ServerMessage::Init { player_id } => self.apply_init(player_id),
            ServerMessage::Update(update) => self.apply_update(update),
            ServerMessage::Dead => {
                self.world.set_phase(Phase::Eliminated);
                Outcome::Mutated(Applied::Eliminated)
            }
            ServerMessage::AdminMsg { message } => Outcome::Notice(message),
            ServerMessage::Unknown => {
                debug!("Ignoring message of unknown type");
                Outcome::Ignored(Ignored::UnknownType)
            }
        }
    }

    fn apply_init(&mut self, player_id: String) -> Outcome {
        if let Some(current) = self.world.local_id() {
            // First init wins for the lifetime of the connection.
            warn!(current, rejected = %player_id, "Repeated init ignored");
            return Outcome::Ignored(Ignored::RepeatedInit(player_id));
        }
        debug!(player_id = %player_id, "Assigned local identity");
        self.world.set_local_id(player_id);
        self.world.set_phase(Phase::Waiting);
        Outcome::Mutated(Applied::Identity)
    }

    fn apply_update(&mut self, update: Update) -> Outcome {
        let phase = Phase::from(update.state);
        self.world.replace_snapshot(update);
        self.world.set_phase(phase);
        Outcome::Mutated(Applied::Snapshot)
    }
}
