mod catalog;
mod config;
mod document;
mod errors;
mod export;
mod layout;
mod models;
mod routes;
mod services;
mod state;
mod storage;
mod templates;
mod workspace;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::export::PdfFonts;
use crate::layout::EmbeddedFont;
use crate::models::ResumeDocument;
use crate::routes::build_router;
use crate::services::{http_client, HttpLocationProvider, LibreTranslateClient};
use crate::state::AppState;
use crate::storage::autosave::AutosaveTask;
use crate::storage::{DraftManager, FileStorage};
use crate::workspace::Workspace;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV Builder v{}", env!("CARGO_PKG_VERSION"));

    // Initialize draft storage
    let backend = FileStorage::open(&config.storage_dir).await?;
    info!("Draft storage at {}", config.storage_dir.display());
    let drafts = DraftManager::new(
        Arc::new(backend),
        config.max_drafts,
        config.storage_quota_bytes,
    );

    // Restore the last autosave, if any
    let document = match drafts.load_latest_autosave().await {
        Ok(Some(doc)) => {
            info!("Restored autosaved {} document", doc.resume_type);
            doc
        }
        Ok(None) => ResumeDocument::new(config.default_template.clone()),
        Err(e) => {
            warn!("Ignoring unreadable autosave: {e}");
            ResumeDocument::new(config.default_template.clone())
        }
    };
    let workspace = Arc::new(RwLock::new(Workspace::new(document)));

    // Initialize outbound service clients
    let client = http_client(config.http_timeout)?;
    let translator = Arc::new(LibreTranslateClient::new(
        client.clone(),
        config.translate_url.clone(),
    ));
    let locator = Arc::new(HttpLocationProvider::new(
        client,
        config.reverse_geocode_url.clone(),
        config.ip_lookup_url.clone(),
    ));

    // Load the PDF font, if configured
    let pdf_fonts = match &config.pdf_font_path {
        Some(path) => {
            let regular = load_font(path).await?;
            let bold = match &config.pdf_bold_font_path {
                Some(path) => Some(load_font(path).await?),
                None => None,
            };
            info!("PDF export embeds {:?}", regular);
            PdfFonts::embedded(regular, bold)
        }
        None => {
            info!("PDF export uses the built-in Helvetica faces (Latin-1 text only)");
            PdfFonts::Standard
        }
    };

    let autosave = AutosaveTask::spawn(
        workspace.clone(),
        drafts.clone(),
        config.autosave_interval,
    );

    // Build app state
    let state = AppState {
        workspace,
        drafts,
        translator,
        locator,
        pdf_fonts: Arc::new(pdf_fonts),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    autosave.shutdown().await;
    info!("Shut down cleanly");
    Ok(())
}

async fn load_font(path: &Path) -> Result<EmbeddedFont> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Cannot read PDF font {}", path.display()))?;
    EmbeddedFont::from_ttf(data)
        .with_context(|| format!("Cannot use PDF font {}", path.display()))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
