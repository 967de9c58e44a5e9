//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use docshuttle_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Docshuttle API",
        version = "0.1.0",
        description = "PDF to DOCX conversion service. Upload a PDF, receive a converted \
                       document stored under your client namespace for 24 hours, and follow \
                       lifecycle events over WebSocket. All endpoints are versioned under /api/v0/."
    ),
    paths(
        handlers::convert::convert_pdf,
        handlers::records::create_record,
        handlers::records::list_records,
        handlers::records::delete_record,
    ),
    components(schemas(
        models::FileRecord,
        models::LifecycleEvent,
        handlers::convert::ConvertResponse,
        handlers::records::CreateRecordRequest,
        handlers::records::DeleteRecordRequest,
        handlers::records::DeleteRecordResponse,
        error::ErrorResponse,
    )),
    tags(
        (name = "convert", description = "PDF upload and conversion"),
        (name = "records", description = "Converted file metadata")
    )
)]
pub struct ApiDoc;
