// Keyboard input routing: key names in, protocol messages out
use protocol::{ClientMessage, Direction};

use crate::game::Phase;

/// Map a `KeyboardEvent.key` value to a steering direction.
///
/// Exactly the arrow keys and their `w`/`a`/`s`/`d` aliases are recognized.
pub fn direction_for_key(key: &str) -> Option<Direction> {
    match key {
        "ArrowUp" | "w" => Some(Direction::Up),
        "ArrowDown" | "s" => Some(Direction::Down),
        "ArrowLeft" | "a" => Some(Direction::Left),
        "ArrowRight" | "d" => Some(Direction::Right),
        _ => None,
    }
}

#[inline]
fn is_restart_key(key: &str) -> bool {
    key.eq_ignore_ascii_case("r")
}

/// Translates raw key presses into outbound messages.
///
/// No legality checks and no debouncing: every press is routed on its own
/// and the server decides what to do with it.
#[derive(Debug, Default, Clone, Copy)]
pub struct InputRouter;

impl InputRouter {
    pub fn new() -> Self {
        Self
    }

    /// Route one key press given the current phase.
    pub fn route(&self, key: &str, phase: Phase) -> Option<ClientMessage> {
        if is_restart_key(key) {
            return (phase == Phase::Eliminated).then_some(ClientMessage::Restart);
        }
        direction_for_key(key).map(|dir| ClientMessage::Direction { dir })
    }
}
