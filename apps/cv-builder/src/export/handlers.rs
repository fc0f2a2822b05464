use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use chrono::Local;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::export::{export_document, ExportFormat};
use crate::state::AppState;

/// `attachment` disposition with an ASCII fallback name and the RFC 5987 UTF-8 form.
pub fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| if c.is_ascii_graphic() && c != '"' && c != '\\' { c } else { '_' })
        .collect();
    let mut encoded = String::with_capacity(file_name.len() * 3);
    for byte in file_name.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}

/// POST /api/v1/export/:format
///
/// The workspace stays locked for the whole export so no edit lands between
/// rendering and the post-export reset. Failures leave the document untouched.
pub async fn handle_export(
    State(state): State<AppState>,
    Path(format): Path<String>,
) -> Result<Response, AppError> {
    let format: ExportFormat = format.parse()?;
    let mut ws = state.workspace.write().await;
    let doc = ws.document().clone();
    let today = Local::now().date_naive();

    let fonts = state.pdf_fonts.clone();
    let artifact =
        tokio::task::spawn_blocking(move || export_document(&doc, format, today, &fonts))
            .await
            .map_err(anyhow::Error::from)??;
    info!(
        "Exported {} ({} bytes) as {format}",
        artifact.file_name,
        artifact.body.len()
    );

    if state.config.reset_after_export {
        let resume_type = ws.document().resume_type.clone();
        ws.reset(resume_type);
        // The blank document is not worth an autosave.
        let revision = ws.revision();
        ws.mark_saved(revision);
        if let Err(e) = state.drafts.clear_autosave().await {
            warn!("Could not clear autosave after export: {e}");
        }
    }

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(artifact.content_type),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&content_disposition(&artifact.file_name))
            .map_err(anyhow::Error::from)?,
    );
    Ok((headers, Bytes::from(artifact.body)).into_response())
}
