//! Shared protocol crate for the Snake Royale client.
//!
//! This crate contains:
//! - Message definitions for both directions of the wire
//! - The JSON codec and its error type
//! - Shared types (GridPoint, Direction)

mod error;
pub mod packets;

pub use error::ProtocolError;
pub use packets::{AdminCommand, ClientMessage, ServerMessage, SnakeState, SnapshotState, Update};

use serde::{Deserialize, Serialize};

/// A discrete cell on the game grid. Origin is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<GridPoint> for glam::IVec2 {
    fn from(p: GridPoint) -> Self {
        glam::IVec2::new(p.x, p.y)
    }
}

impl From<glam::IVec2> for GridPoint {
    fn from(v: glam::IVec2) -> Self {
        Self::new(v.x, v.y)
    }
}

/// Steering direction sent to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All four directions, in wire order.
    pub const ALL: [Direction; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// The token used on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
