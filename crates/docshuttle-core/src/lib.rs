//! Docshuttle Core Library
//!
//! Domain models, error taxonomy, configuration, and shared constants for the
//! docshuttle PDF-to-DOCX conversion service.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
