use std::path::{Path, PathBuf};

use crate::constants::OUTPUT_EXTENSION;

/// One in-flight conversion. Transient: never persisted, owned by a single
/// request from upload through cleanup.
#[derive(Debug, Clone)]
pub struct ConversionJob {
    /// Path of the uploaded PDF in the working directory.
    pub input_path: PathBuf,
    /// Originating client identity; becomes the storage namespace.
    pub user_id: String,
}

impl ConversionJob {
    pub fn new(input_path: impl Into<PathBuf>, user_id: impl Into<String>) -> Self {
        ConversionJob {
            input_path: input_path.into(),
            user_id: user_id.into(),
        }
    }

    /// Sibling path the converter is expected to produce.
    pub fn expected_output_path(&self) -> PathBuf {
        self.input_path.with_extension(OUTPUT_EXTENSION)
    }

    /// Blob key for the converted output (input filename with `.docx`).
    pub fn stored_name(&self) -> Option<String> {
        self.expected_output_path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }
}
