//! Book generation API routes

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::book::{Book, BookPayload};
use crate::error::{AppError, Result};
use crate::export;
use crate::state::AppState;

/// Create the books router
pub fn router() -> Router<AppState> {
    Router::new().route("/generate", post(generate_book))
}

#[derive(Debug, Deserialize)]
pub struct GenerateBookRequest {
    pub book: Option<BookPayload>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBookResponse {
    pub success: bool,
    pub file_name: String,
    /// Base64-encoded document bytes
    pub content: String,
    pub mime_type: String,
}

/// Build the submitted book and return it base64-encoded
async fn generate_book(
    State(state): State<AppState>,
    payload: std::result::Result<Json<GenerateBookRequest>, JsonRejection>,
) -> Result<Json<GenerateBookResponse>> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let payload = request
        .book
        .ok_or_else(|| AppError::BadRequest("Book data is required".to_string()))?;
    let book = Book::try_from(payload)?;

    tracing::info!(
        "Generating book: {} Format: {} ({} chapters)",
        book.title,
        book.format,
        book.chapters.len()
    );

    let options = state.export_options().clone();
    let document =
        tokio::task::spawn_blocking(move || export::build_document_with(&book, &options))
            .await??;

    Ok(Json(GenerateBookResponse {
        success: true,
        file_name: document.file_name,
        content: base64::engine::general_purpose::STANDARD.encode(&document.bytes),
        mime_type: document.mime_type.to_string(),
    }))
}
