//! Error types emitted by the sportfit CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use sportfit_core::{AdminError, CatalogError, SqliteCatalogError, ValidationError};
use sportfit_data::TemplateSourceBuildError;
use sportfit_scorer::RuleLoadError;
use thiserror::Error;

/// Errors emitted by the sportfit CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A `--value` argument is not of the form `key=raw`.
    #[error("measure value {raw:?} must look like key=value")]
    MalformedMeasureValue { raw: String },
    /// A `--value` names a measure the catalog does not define.
    #[error("catalog has no measure named '{key}'")]
    UnknownMeasure { key: String },
    /// A `--value` was rejected by its measure.
    #[error(transparent)]
    InvalidMeasureValue(#[from] ValidationError),
    /// Opening the `SQLite` catalog failed.
    #[error(transparent)]
    OpenCatalog(#[from] SqliteCatalogError),
    /// Reading sports or measures from the catalog failed.
    #[error("failed to load catalog: {0}")]
    LoadCatalog(#[from] CatalogError),
    /// Loading the scoring rules failed.
    #[error(transparent)]
    LoadRules(#[from] RuleLoadError),
    /// Constructing the template source failed.
    #[error("failed to build template source for {base_url:?}: {source}")]
    BuildTemplateSource {
        base_url: String,
        #[source]
        source: TemplateSourceBuildError,
    },
    /// Checking or syncing a sport failed.
    #[error(transparent)]
    Admin(#[from] AdminError),
    /// Serializing command output failed.
    #[error("failed to serialize output: {0}")]
    SerializeOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
