use axum::{
    extract::{Multipart, State},
    Json,
};
use chrono::Utc;
use docshuttle_core::models::ConversionJob;
use docshuttle_core::AppError;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::constants::UPLOAD_FIELD;
use crate::error::{ErrorResponse, HttpAppError};
use crate::identity::ClientId;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct ConvertResponse {
    /// Storage key of the converted document, `{namespace}/{filename}`.
    pub key: String,
}

#[utoipa::path(
    post,
    path = "/api/v0/convert",
    tag = "convert",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "PDF converted and stored", body = ConvertResponse),
        (status = 400, description = "Invalid multipart body", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Conversion or storage failure", body = ErrorResponse)
    )
)]
pub async fn convert_pdf(
    State(state): State<Arc<AppState>>,
    client: ClientId,
    mut multipart: Multipart,
) -> Result<Json<ConvertResponse>, HttpAppError> {
    let mut pdf_bytes = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() == Some(UPLOAD_FIELD) {
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::InvalidInput(format!("Failed to read upload: {}", e)))?;
            pdf_bytes = Some(data);
            break;
        }
    }

    let pdf_bytes = pdf_bytes.ok_or_else(|| {
        AppError::InvalidInput(format!("Missing multipart field '{}'", UPLOAD_FIELD))
    })?;

    if pdf_bytes.is_empty() {
        return Err(AppError::InvalidInput("Uploaded file is empty".to_string()).into());
    }

    // Time-seeded filename keeps the working directory collision-free and
    // becomes the stored key (with the extension swapped) after conversion.
    let input_path = state
        .upload_dir
        .join(format!("{}.pdf", Utc::now().timestamp_millis()));

    tokio::fs::write(&input_path, &pdf_bytes)
        .await
        .map_err(AppError::from)?;

    tracing::info!(
        user_id = %client.as_str(),
        size = pdf_bytes.len(),
        input = %input_path.display(),
        "Received PDF for conversion"
    );

    let job = ConversionJob::new(&input_path, client.as_str());
    let blob = state.lifecycle.handle_upload(&job).await?;

    Ok(Json(ConvertResponse { key: blob.key }))
}
