//! Client configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Default configuration file, looked up in the working directory.
pub const CONFIG_FILE: &str = "royale.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub web: WebConfig,
}

impl Config {
    /// Load configuration from `royale.toml` or use defaults, then apply
    /// environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        Ok(Self::load_from(Path::new(CONFIG_FILE))?.with_env_overrides())
    }

    /// Load configuration from `path`, writing the defaults there if the
    /// file does not exist yet.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            info!("No {} found, creating default config", path.display());
            let default_config = Self::default();
            std::fs::write(path, toml::to_string_pretty(&default_config)?)?;
            Ok(default_config)
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        let cell_size = self.client.cell_size;
        anyhow::ensure!(
            cell_size.is_finite() && cell_size > 0.0,
            "client.cell_size must be a positive number, got {cell_size}"
        );
        Ok(())
    }

    /// `SNAKE_SERVER_URL` replaces the endpoint, `PORT` the web server port.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("SNAKE_SERVER_URL") {
            if !url.trim().is_empty() {
                self.client.server_url = url.trim().to_string();
            }
        }
        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse().ok()) {
            self.web.port = port;
        }
        self
    }
}

/// Game connection and drawing settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// WebSocket endpoint of the game server.
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// Pixels per grid cell.
    #[serde(default = "default_cell_size")]
    pub cell_size: f32,
    /// Drawing surface width in pixels.
    #[serde(default = "default_surface_width")]
    pub surface_width: u32,
    /// Drawing surface height in pixels.
    #[serde(default = "default_surface_height")]
    pub surface_height: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            cell_size: default_cell_size(),
            surface_width: default_surface_width(),
            surface_height: default_surface_height(),
        }
    }
}

fn default_server_url() -> String {
    "ws://localhost:8080/snake".to_string()
}
fn default_cell_size() -> f32 {
    client::render::CELL_SIZE
}
fn default_surface_width() -> u32 {
    900
}
fn default_surface_height() -> u32 {
    540
}

/// Static file server for the browser client.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebConfig {
    /// Bind address.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3000
}
