use docshuttle_core::models::ConversionJob;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::process::Command;

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Invalid input path: {0}")]
    InvalidPath(String),

    #[error("Input file not found: {0}")]
    InputMissing(PathBuf),

    #[error("Failed to spawn converter '{program}': {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Converter exited with {status}: {stderr}")]
    ConverterFailed {
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("Converter produced no output at {0}")]
    OutputMissing(PathBuf),

    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

/// Validate that a path doesn't contain shell metacharacters or dangerous sequences
fn validate_path(path: &str) -> Result<(), ConversionError> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(ConversionError::InvalidPath(format!(
            "path contains dangerous characters: {path}"
        )));
    }

    if path.contains("..") {
        return Err(ConversionError::InvalidPath(format!(
            "path contains directory traversal: {path}"
        )));
    }

    Ok(())
}

/// Runs the configured converter program on an input PDF.
///
/// The process is invoked as `program [args..] <input_path>` and must write
/// the DOCX to the input path with its extension swapped to `.docx`. On any
/// failure after spawning, a partial output file is removed so that callers
/// never observe a half-written document.
#[derive(Clone)]
pub struct ConversionRunner {
    program: String,
    args: Vec<String>,
}

impl ConversionRunner {
    pub fn new(program: String, args: Vec<String>) -> Result<Self, ConversionError> {
        validate_path(&program)?;

        if !program
            .chars()
            .all(|c| c.is_alphanumeric() || c == '/' || c == '-' || c == '_' || c == '.')
        {
            return Err(ConversionError::InvalidPath(format!(
                "converter program contains unsafe characters: {program}"
            )));
        }

        Ok(Self { program, args })
    }

    /// Convert the job's input PDF, returning the path of the produced DOCX.
    #[tracing::instrument(skip(self, job), fields(
        process.executable.path = %self.program,
        input = %job.input_path.display(),
        user_id = %job.user_id,
    ))]
    pub async fn run(&self, job: &ConversionJob) -> Result<PathBuf, ConversionError> {
        let start = std::time::Instant::now();

        let input = &job.input_path;
        validate_path(&input.to_string_lossy())?;

        if !tokio::fs::try_exists(input).await? {
            return Err(ConversionError::InputMissing(input.clone()));
        }

        let expected_output = job.expected_output_path();

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(input)
            .output()
            .await
            .map_err(|source| ConversionError::SpawnFailed {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            remove_partial_output(&expected_output).await;
            return Err(ConversionError::ConverterFailed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        if !tokio::fs::try_exists(&expected_output).await? {
            return Err(ConversionError::OutputMissing(expected_output));
        }

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            output = %expected_output.display(),
            "Conversion completed"
        );

        Ok(expected_output)
    }
}

async fn remove_partial_output(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            tracing::warn!(path = %path.display(), "Removed partial converter output");
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove partial output");
        }
    }
}
