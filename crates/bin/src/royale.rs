//! Royale - terminal client.
//!
//! Type keys and press Enter: `w`/`a`/`s`/`d` (or `up`, `left`, ...) steer,
//! `r` restarts after death, `:spawn`/`:reset`/`:kick` send admin commands,
//! `:q` quits. Frames go to stdout, logs to stderr.

use client::render::{Renderer, Surface};
use client::{ChannelEvent, Session, Transport};
use glam::UVec2;
use snake_royale::terminal::{self, Command, TextSurface};
use snake_royale::{Config, transport};
use std::io::Write;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Snake Royale terminal client v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Config::load()?;
    info!("Loaded configuration");
    info!("  Server: {}", config.client.server_url);
    info!("  Surface: {}x{} @ {}px cells", config.client.surface_width, config.client.surface_height, config.client.cell_size);

    let (connection, mut events) = transport::connect(&config.client.server_url);
    let mut commands = terminal::spawn_command_reader();

    let mut surface = TextSurface::new(
        UVec2::new(config.client.surface_width, config.client.surface_height),
        config.client.cell_size,
    );
    info!("  Grid: {}x{}", surface.grid().x, surface.grid().y);
    let mut session = Session::new(connection, Renderer::new(config.client.cell_size));

    let mut stdout = std::io::stdout();
    print_status(&mut stdout, &session)?;

    loop {
        tokio::select! {
            event = events.recv() => {
                // The transport always ends the stream with Closed
                let Some(event) = event else { break };
                let closed = matches!(event, ChannelEvent::Closed { .. });

                if session.handle_event(event, &mut surface).is_some() {
                    draw(&mut stdout, &surface, &session)?;
                } else {
                    print_status(&mut stdout, &session)?;
                }
                if closed {
                    break;
                }
            }
            Some(command) = commands.recv() => {
                match command {
                    Command::Key(key) => {
                        session.handle_key(&key);
                    }
                    Command::Admin(admin) => session.send_admin(admin),
                    Command::Quit => break,
                }
            }
        }
    }

    info!("Session ended after {} frames", session.frames());
    Ok(())
}

fn draw<T: Transport>(out: &mut impl Write, surface: &TextSurface, session: &Session<T>) -> std::io::Result<()> {
    // Clear screen, cursor home
    write!(out, "\x1b[2J\x1b[H")?;
    writeln!(out, "{}", surface.frame())?;
    writeln!(out, "{}  [{}x{} px]", session.status_text(), surface.size().x, surface.size().y)?;
    out.flush()
}

fn print_status<T: Transport>(out: &mut impl Write, session: &Session<T>) -> std::io::Result<()> {
    writeln!(out, "{}", session.status_text())?;
    out.flush()
}
