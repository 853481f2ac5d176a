//! Unified error type for the svcheck crates
//!
//! Missing or partial stage data is never reported through [`SvError`]; it
//! surfaces as missing samples in the comparison instead. The variants here
//! cover structural failures only: unreadable snapshot documents, archives
//! without a state-variables entry, collaborator failures and sink I/O.
//!
//! # Example
//!
//! ```ignore
//! use svcheck_core::{SvError, SvResult};
//!
//! fn open_case(path: &str) -> SvResult<()> {
//!     let archive = locate_archive(path)?;
//!     extract_sv_file(&archive)?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SvError {
    /// I/O errors (file access, directory creation, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// A snapshot document that cannot be read as RDF/XML at all
    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),

    /// Case archive problems (unreadable zip, no SV entry)
    #[error("Archive error: {0}")]
    Archive(String),

    /// Network import failed upstream
    #[error("Import error: {0}")]
    Import(String),

    /// Load flow failed upstream
    #[error("Load flow error: {0}")]
    LoadFlow(String),

    /// Report sink failures
    #[error("Report error: {0}")]
    Report(String),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

pub type SvResult<T> = Result<T, SvError>;

impl From<anyhow::Error> for SvError {
    fn from(err: anyhow::Error) -> Self {
        SvError::Other(err.to_string())
    }
}

impl From<String> for SvError {
    fn from(s: String) -> Self {
        SvError::Other(s)
    }
}

impl From<&str> for SvError {
    fn from(s: &str) -> Self {
        SvError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for SvError {
    fn from(err: serde_json::Error) -> Self {
        SvError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SvError::Archive("SV File not found".into());
        assert!(err.to_string().contains("Archive error"));
        assert!(err.to_string().contains("SV File not found"));
    }

    #[test]
    fn test_collaborator_errors_name_their_stage() {
        let err = SvError::LoadFlow("error during loadflow SV".into());
        assert_eq!(err.to_string(), "Load flow error: error during loadflow SV");
        let err = SvError::Import("error during cgmes import SSH".into());
        assert!(err.to_string().starts_with("Import error"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let sv_err: SvError = io_err.into();
        assert!(matches!(sv_err, SvError::Io(_)));
    }

    #[test]
    fn test_json_error_is_parse() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let sv_err: SvError = json_err.into();
        assert!(matches!(sv_err, SvError::Parse(_)));
    }

    #[test]
    fn test_question_mark_operator() {
        fn inner() -> SvResult<()> {
            Err(SvError::MalformedSnapshot("unexpected EOF".into()))
        }

        fn outer() -> SvResult<()> {
            inner()?;
            Ok(())
        }

        assert!(outer().is_err());
    }
}
