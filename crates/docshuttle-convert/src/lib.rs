//! Docshuttle Conversion Library
//!
//! Runs the external PDF to DOCX converter as a child process and hands back
//! the produced output path. The converter program is configurable; the
//! contract is that it takes the input path as its final argument and writes
//! its output next to the input with a `.docx` extension.

pub mod runner;

pub use runner::{ConversionError, ConversionRunner};
