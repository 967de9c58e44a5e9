//! Docshuttle API
//!
//! HTTP surface for the PDF to DOCX conversion service. Modules are public so
//! integration tests can build the router against in-memory backends.

pub mod api_doc;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod setup;
pub mod state;
pub mod telemetry;
