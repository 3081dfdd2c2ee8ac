//! Error types raised while loading scoring rules.
#![forbid(unsafe_code)]

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised while reading or validating a rule set.
#[derive(Debug, Error)]
pub enum RuleLoadError {
    /// Reading the rule file failed.
    #[error("failed to read rule file at {path}")]
    ReadFile {
        /// Requested rule file path.
        path: Utf8PathBuf,
        /// Source error from std I/O.
        #[source]
        source: std::io::Error,
    },
    /// The rule document is not valid JSON for a rule set.
    #[error("failed to parse rules from {origin}")]
    Parse {
        /// File path, or `inline JSON` for in-memory documents.
        origin: String,
        /// Source error from `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// A rule names an empty measure or variable.
    #[error("rule {index} has an empty {field}")]
    EmptyField {
        /// Zero-based position of the rule in the set.
        index: usize,
        /// Name of the empty field.
        field: &'static str,
    },
    /// A threshold bonus is NaN or infinite.
    #[error("rule {index} has a non-finite bonus")]
    NonFiniteBonus {
        /// Zero-based position of the rule in the set.
        index: usize,
    },
}
