//! Diagnostics collected while loading stage snapshots.
//!
//! Skipped records (no node reference, unparsable `v`/`angle`) never fail a
//! stage. They are counted here as warnings so callers can log or report
//! them. A stage whose source could not be read at all carries an error
//! issue instead; the stage is still returned, just empty.
//!
//! # Example
//!
//! ```
//! use svcheck_core::diagnostics::{Diagnostics, Severity};
//!
//! let mut diag = Diagnostics::new();
//! diag.add_warning_with_entity("malformed", "missing angle", "TN_12");
//!
//! assert_eq!(diag.warning_count(), 1);
//! assert_eq!(diag.issues[0].severity, Severity::Warning);
//! ```

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Record skipped, stage continued
    Warning,
    /// Stage could not be read
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticIssue {
    pub severity: Severity,
    /// Category for grouping (e.g. "malformed", "source")
    pub category: String,
    pub message: String,
    /// Optional entity reference (usually a topological node id)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

impl DiagnosticIssue {
    pub fn new(
        severity: Severity,
        category: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category: category.into(),
            message: message.into(),
            entity: None,
        }
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }
}

impl std::fmt::Display for DiagnosticIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "[{}:{}] {}", severity, self.category, self.message)?;
        if let Some(entity) = &self.entity {
            write!(f, " ({})", entity)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<DiagnosticIssue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_warning(&mut self, category: &str, message: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Warning, category, message));
    }

    pub fn add_warning_with_entity(&mut self, category: &str, message: &str, entity: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Warning, category, message).with_entity(entity));
    }

    pub fn add_error(&mut self, category: &str, message: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Error, category, message));
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_severity() {
        let mut diag = Diagnostics::new();
        diag.add_warning("malformed", "missing v");
        diag.add_warning_with_entity("malformed", "missing angle", "TN_1");
        assert!(!diag.has_errors());
        diag.add_error("source", "unreadable document");
        assert_eq!(diag.warning_count(), 2);
        assert!(diag.has_errors());
    }

    #[test]
    fn display_includes_entity() {
        let issue = DiagnosticIssue::new(Severity::Warning, "malformed", "missing angle")
            .with_entity("TN_7");
        assert_eq!(issue.to_string(), "[warning:malformed] missing angle (TN_7)");
    }

    #[test]
    fn error_display_names_severity() {
        let mut diag = Diagnostics::new();
        diag.add_error("source", "stage source 'x.xml' is empty");
        assert!(!diag.is_empty());
        assert_eq!(diag.issues[0].to_string(), "[error:source] stage source 'x.xml' is empty");
    }
}
