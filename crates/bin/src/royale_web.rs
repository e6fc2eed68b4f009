//! Royale Web - static server for the browser client.
//!
//! Serves `crates/client/web` (page, loader script and the wasm-pack output
//! in `pkg/`) and injects the configured game server URL into `main.js`.

use axum::{
    Router,
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::get,
};
use rust_embed::RustEmbed;
use snake_royale::Config;
use std::net::SocketAddr;
use std::sync::OnceLock;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// Embedded static assets from client/web
#[derive(RustEmbed)]
#[folder = "../client/web"]
struct Assets;

const INJECT_POINT: &str = "// ROYALE_SERVER_INJECT_POINT";

// Game server URL handed to the browser client
static SERVER_URL: OnceLock<String> = OnceLock::new();

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Royale Web - Frontend Static Server v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load()?;
    info!("  Game server: {}", config.client.server_url);
    SERVER_URL.set(config.client.server_url.clone()).ok();

    // Build the axum router for static file serving only
    let app = Router::new()
        .route("/", get(serve_index))
        .route("/index.html", get(serve_index))
        .fallback(static_handler)
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()));

    let addr: SocketAddr = format!("{}:{}", config.web.bind, config.web.port).parse()?;
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Frontend server running on http://{}", addr);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

/// Serve the main index.html page
async fn serve_index() -> Response {
    serve_static_file("index.html")
}

/// Handle static file requests
async fn static_handler(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');
    if path.is_empty() {
        return serve_static_file("index.html");
    }
    serve_static_file(path)
}

/// Serve a static file from embedded assets
fn serve_static_file(path: &str) -> Response {
    let Some(content) = Assets::get(path) else {
        warn!("Static file not found: {}", path);
        return (StatusCode::NOT_FOUND, "404 Not Found").into_response();
    };
    let mime = mime_guess::from_path(path).first_or_octet_stream();

    let body = if path == "main.js" {
        match std::str::from_utf8(&content.data) {
            Ok(script) => {
                let url = SERVER_URL.get().map(String::as_str).unwrap_or_default();
                inject_server_url(script, url).into_bytes()
            }
            Err(_) => content.data.to_vec(),
        }
    } else {
        content.data.to_vec()
    };

    ([(header::CONTENT_TYPE, mime.as_ref().to_string())], body).into_response()
}

/// Replace the inject point in the loader script with the server URL.
fn inject_server_url(script: &str, url: &str) -> String {
    // A JSON string is a valid JS string literal
    let literal = serde_json::to_string(url).unwrap_or_else(|_| "\"\"".to_string());
    script.replace(
        INJECT_POINT,
        &format!("window.ROYALE_SERVER_URL = {}; // Auto-injected by royale-web", literal),
    )
}
