//! Facade crate for the Sportfit engine.
//!
//! This crate re-exports the core ranking and sync types and exposes the
//! optional evaluators and template adapters behind feature flags.

#![forbid(unsafe_code)]

pub use sportfit_core::{
    AdminError, CatalogError, CatalogSource, EvaluationError, EvaluationSession,
    FormulaEvaluator, LogNotifier, Measure, MeasureType, MeasureValueStore, MeasureValues,
    Notifier, RankedSport, Ranking, RankingEngine, Severity, Sport, SportCatalogWriter,
    SportManager, SportSync, SyncDiff, SyncError, SyncStatus, TemplateFetchError,
    TemplateSource, ValidationError, VariableValue, Variables,
};

#[cfg(feature = "store-sqlite")]
pub use sportfit_core::{SqliteCatalogError, SqliteSportCatalog};

#[cfg(feature = "scorer")]
pub use sportfit_scorer::{Rule, RuleEvaluator, RuleLoadError, WeightedSumEvaluator};

#[cfg(feature = "http-templates")]
pub use sportfit_data::{HttpTemplateSource, HttpTemplateSourceConfig, TemplateSourceBuildError};
