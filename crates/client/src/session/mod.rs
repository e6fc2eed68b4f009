//! Session controller.
//!
//! The session is the one context object every front end drives: it owns the
//! synchronizer (and through it the world), the renderer, the input router
//! and the transport. Front ends feed it connection events and key presses
//! one at a time from a single task, which keeps the world single-writer.

use protocol::{AdminCommand, ClientMessage};
use tracing::{debug, info, warn};

use crate::game::{Outcome, Phase, Synchronizer, WorldState};
use crate::input::InputRouter;
use crate::network::{ChannelEvent, Transport};
use crate::render::{FrameStats, Renderer, Surface};

/// Connection state as reported by lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Open,
    Closed,
}

pub struct Session<T: Transport> {
    transport: T,
    sync: Synchronizer,
    renderer: Renderer,
    input: InputRouter,
    connection: ConnectionStatus,
    /// Latest server notice (admin replies), shown after the status.
    notice: Option<String>,
    frames: u64,
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T, renderer: Renderer) -> Self {
        Self {
            transport,
            sync: Synchronizer::new(),
            renderer,
            input: InputRouter::new(),
            connection: ConnectionStatus::Connecting,
            notice: None,
            frames: 0,
        }
    }

    pub fn world(&self) -> &WorldState {
        self.sync.world()
    }

    pub fn phase(&self) -> Phase {
        self.sync.world().phase()
    }

    pub fn connection(&self) -> ConnectionStatus {
        self.connection
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Number of frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Process one connection event. Returns the frame statistics when the
    /// event changed the world and a frame was drawn.
    pub fn handle_event<S: Surface + ?Sized>(
        &mut self,
        event: ChannelEvent,
        surface: &mut S,
    ) -> Option<FrameStats> {
        match event {
            ChannelEvent::Opened => {
                info!("Connection opened");
                self.connection = ConnectionStatus::Open;
                None
            }
            ChannelEvent::Closed { code, reason } => {
                info!(code, reason = %reason, "Connection closed");
                self.connection = ConnectionStatus::Closed;
                None
            }
            ChannelEvent::Message(text) => self.handle_message(&text, surface),
        }
    }

    fn handle_message<S: Surface + ?Sized>(&mut self, text: &str, surface: &mut S) -> Option<FrameStats> {
        let outcome = match self.sync.apply_text(text) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Dropping message: {}", e);
                return None;
            }
        };

        match outcome {
            Outcome::Mutated(applied) => {
                let stats = self.renderer.render(self.sync.world(), surface);
                self.frames += 1;
                debug!(?applied, items = stats.items, creatures = stats.creatures, "Frame rendered");
                Some(stats)
            }
            Outcome::Notice(message) => {
                info!(message = %message, "Server notice");
                self.notice = Some(message);
                None
            }
            Outcome::Ignored(_) => None,
        }
    }

    /// Route one key press and send the result. Returns the routed message,
    /// whether or not the connection was open to carry it.
    pub fn handle_key(&mut self, key: &str) -> Option<ClientMessage> {
        let message = self.input.route(key, self.phase())?;
        if message == ClientMessage::Restart {
            self.notice = None;
        }
        self.transport.send(&message);
        Some(message)
    }

    pub fn send_admin(&mut self, command: AdminCommand) {
        self.transport.send(&ClientMessage::Admin { command });
    }

    /// One-line, user-facing status. Never contains raw errors.
    pub fn status_text(&self) -> String {
        let base = match (self.connection, self.phase()) {
            (ConnectionStatus::Closed, _) => "Disconnected from server.",
            (ConnectionStatus::Connecting, _) => "Connecting...",
            (ConnectionStatus::Open, Phase::Uninitialized) => "Connected! Use arrow keys to control.",
            (ConnectionStatus::Open, Phase::Waiting) => "Game starting!",
            (ConnectionStatus::Open, Phase::Active) => "Playing. Use arrow keys or WASD to steer.",
            (ConnectionStatus::Open, Phase::Eliminated) => "You died! Press R to restart.",
        };
        match &self.notice {
            Some(notice) if self.connection == ConnectionStatus::Open => format!("{base} ({notice})"),
            _ => base.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::tests::RecordingSurface;
    use crate::render::Brush;
    use glam::IVec2;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct MockTransport {
        open: Cell<bool>,
        sent: RefCell<Vec<String>>,
    }

    impl Transport for MockTransport {
        fn is_open(&self) -> bool {
            self.open.get()
        }

        fn send_text(&self, text: String) {
            self.sent.borrow_mut().push(text);
        }
    }

    fn message(text: &str) -> ChannelEvent {
        ChannelEvent::Message(text.to_string())
    }

    const INIT_P1: &str = r#"{"type":"init","playerId":"p1"}"#;
    const UPDATE_P1: &str = r#"{"type":"update","snakes":{"p1":{"cells":[{"x":5,"y":5},{"x":4,"y":5}]}},"food":[{"x":10,"y":10}],"state":"active"}"#;

    #[test]
    fn test_join_and_first_frame() {
        let transport = MockTransport::default();
        let mut session = Session::new(&transport, Renderer::default());
        let mut surface = RecordingSurface::default();

        assert_eq!(session.status_text(), "Connecting...");
        assert_eq!(session.handle_event(ChannelEvent::Opened, &mut surface), None);
        assert_eq!(session.status_text(), "Connected! Use arrow keys to control.");

        assert!(session.handle_event(message(INIT_P1), &mut surface).is_some());
        let stats = session.handle_event(message(UPDATE_P1), &mut surface).unwrap();

        let world = session.world();
        assert_eq!(world.local_id(), Some("p1"));
        assert_eq!(world.phase(), Phase::Active);
        assert_eq!(world.creature("p1").unwrap().segments.len(), 2);
        assert_eq!(stats.creatures, 1);
        assert_eq!(stats.items, 1);
        assert_eq!(surface.circles().len(), 1);
        assert_eq!(surface.circles()[0].1, Brush::Own);
        assert_eq!(surface.cells(), vec![glam::Vec2::new(180.0, 180.0)]);
        assert_eq!(session.frames(), 2);
    }

    #[test]
    fn test_death_then_restart() {
        let transport = MockTransport::default();
        transport.open.set(true);
        let mut session = Session::new(&transport, Renderer::default());
        let mut surface = RecordingSurface::default();
        session.handle_event(ChannelEvent::Opened, &mut surface);
        session.handle_event(message(INIT_P1), &mut surface);
        session.handle_event(message(UPDATE_P1), &mut surface);

        assert_eq!(session.handle_key("r"), None);

        session.handle_event(message(r#"{"type":"dead"}"#), &mut surface);
        assert_eq!(session.phase(), Phase::Eliminated);
        assert_eq!(session.status_text(), "You died! Press R to restart.");
        assert_eq!(session.world().creature("p1").unwrap().head(), Some(IVec2::new(5, 5)));
        assert_eq!(session.world().items().len(), 1);

        assert_eq!(session.handle_key("r"), Some(ClientMessage::Restart));
        assert_eq!(transport.sent.borrow().as_slice(), [r#"{"type":"restart"}"#]);
    }

    #[test]
    fn test_keys_dropped_while_closed() {
        let transport = MockTransport::default();
        let mut session = Session::new(&transport, Renderer::default());

        assert!(session.handle_key("ArrowUp").is_some());
        session.send_admin(AdminCommand::SpawnFood);
        assert!(transport.sent.borrow().is_empty());

        transport.open.set(true);
        session.handle_key("ArrowUp");
        session.handle_key("d");
        session.handle_key("x");
        session.send_admin(AdminCommand::KickAll);
        assert_eq!(
            transport.sent.borrow().as_slice(),
            [
                r#"{"type":"direction","dir":"up"}"#,
                r#"{"type":"direction","dir":"right"}"#,
                r#"{"type":"admin","command":"kickAll"}"#,
            ]
        );
    }

    #[test]
    fn test_malformed_and_unknown_do_not_render() {
        let transport = MockTransport::default();
        let mut session = Session::new(&transport, Renderer::default());
        let mut surface = RecordingSurface::default();
        session.handle_event(message(INIT_P1), &mut surface);
        session.handle_event(message(UPDATE_P1), &mut surface);
        let before = session.world().clone();
        let frames = session.frames();

        for text in [
            r#"{"type":"update","snakes":{},"state":"active"}"#,
            r#"{"type":"ping"}"#,
            "garbage",
            r#"{"type":"init","playerId":"p2"}"#,
        ] {
            assert_eq!(session.handle_event(message(text), &mut surface), None, "{text}");
        }
        assert_eq!(session.world(), &before);
        assert_eq!(session.frames(), frames);
    }

    #[test]
    fn test_notice_and_disconnect_status() {
        let transport = MockTransport::default();
        let mut session = Session::new(&transport, Renderer::default());
        let mut surface = RecordingSurface::default();
        session.handle_event(ChannelEvent::Opened, &mut surface);
        session.handle_event(message(INIT_P1), &mut surface);
        session.handle_event(message(r#"{"type":"adminMsg","message":"Food spawned!"}"#), &mut surface);
        assert_eq!(session.status_text(), "Game starting! (Food spawned!)");

        session.handle_event(
            ChannelEvent::Closed { code: 1000, reason: "Kicked by admin.".into() },
            &mut surface,
        );
        assert_eq!(session.status_text(), "Disconnected from server.");
        assert_eq!(session.connection(), ConnectionStatus::Closed);
    }
}
