use axum::{extract::State, Json};
use docshuttle_core::models::FileRecord;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::identity::ClientId;
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecordRequest {
    /// Name of the PDF as the client uploaded it.
    pub original_name: String,
    /// Stored key of the converted document within the client's namespace.
    pub file_name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRecordRequest {
    pub id: Uuid,
    pub file_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRecordResponse {
    pub id: Uuid,
    pub file_name: String,
}

#[utoipa::path(
    post,
    path = "/api/v0/records",
    tag = "records",
    request_body = CreateRecordRequest,
    responses(
        (status = 200, description = "Record created", body = FileRecord),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn create_record(
    State(state): State<Arc<AppState>>,
    client: ClientId,
    ValidatedJson(body): ValidatedJson<CreateRecordRequest>,
) -> Result<Json<FileRecord>, HttpAppError> {
    let record = state
        .lifecycle
        .register_metadata(client.as_str(), &body.original_name, &body.file_name)
        .await?;

    Ok(Json(record))
}

#[utoipa::path(
    get,
    path = "/api/v0/records",
    tag = "records",
    responses(
        (status = 200, description = "Records for the calling client, newest first", body = [FileRecord]),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_records(
    State(state): State<Arc<AppState>>,
    client: ClientId,
) -> Result<Json<Vec<FileRecord>>, HttpAppError> {
    let records = state.lifecycle.list(client.as_str()).await?;

    Ok(Json(records))
}

#[utoipa::path(
    delete,
    path = "/api/v0/records",
    tag = "records",
    request_body = DeleteRecordRequest,
    responses(
        (status = 200, description = "File removed (or already gone)", body = DeleteRecordResponse),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn delete_record(
    State(state): State<Arc<AppState>>,
    client: ClientId,
    ValidatedJson(body): ValidatedJson<DeleteRecordRequest>,
) -> Result<Json<DeleteRecordResponse>, HttpAppError> {
    state
        .lifecycle
        .delete(client.as_str(), body.id, &body.file_name)
        .await?;

    Ok(Json(DeleteRecordResponse {
        id: body.id,
        file_name: body.file_name,
    }))
}
