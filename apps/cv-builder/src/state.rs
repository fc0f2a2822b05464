use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::Config;
use crate::export::PdfFonts;
use crate::services::{LocationProvider, Translator};
use crate::storage::DraftManager;
use crate::workspace::Workspace;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The single live editing session. Mutating handlers hold the write lock for the
    /// whole edit, so edits apply one at a time.
    pub workspace: Arc<RwLock<Workspace>>,
    pub drafts: DraftManager,
    pub translator: Arc<dyn Translator>,
    pub locator: Arc<dyn LocationProvider>,
    pub pdf_fonts: Arc<PdfFonts>,
    pub config: Config,
}
