//! Core domain types for the Sportfit engine.
//!
//! The crate ranks sports against a user's measure answers and keeps
//! administrator-maintained sport definitions aligned with their templates.
//! Collaborators that live outside the core (catalog persistence, template
//! retrieval, user notification) are expressed as traits so callers can plug
//! in SQLite, HTTP, or in-memory implementations.
//!
//! # Examples
//!
//! ```
//! use sportfit_core::{
//!     EvaluationError, FormulaEvaluator, Measure, MeasureType, MeasureValueStore,
//!     MeasureValues, RankingEngine, Sport, Variables,
//! };
//!
//! struct HeightEvaluator;
//!
//! impl FormulaEvaluator for HeightEvaluator {
//!     fn evaluate(
//!         &self,
//!         variables: &Variables,
//!         values: &MeasureValues,
//!     ) -> Result<f64, EvaluationError> {
//!         let height = values.number("height").unwrap_or(0.0);
//!         let minimum = variables.number("minHeight")?.unwrap_or(0.0);
//!         Ok(height - minimum)
//!     }
//! }
//!
//! let height = Measure::new("height", MeasureType::Number);
//! let mut store = MeasureValueStore::new();
//! assert!(store.set_value(&height, "180"));
//!
//! let sports = vec![
//!     Sport::new("basketball", Variables::from([("minHeight", 170.0)])),
//!     Sport::new("jockeying", Variables::from([("minHeight", 190.0)])),
//! ];
//! let mut engine = RankingEngine::new(HeightEvaluator, sports);
//! let ranking = engine.rank_sports(&store.values());
//! assert_eq!(ranking.entries()[0].sport.name(), "basketball");
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod admin;
pub mod catalog;
pub mod draft;
pub mod evaluator;
pub mod measure;
pub mod notify;
pub mod ranking;
pub mod session;
pub mod sport;
pub mod store;
pub mod sync;
pub mod values;

#[doc(hidden)]
pub mod test_support;

pub use admin::{AdminError, SportManager};
pub use catalog::{CatalogError, CatalogMutationError, CatalogSource, SportCatalogWriter};
pub use draft::VariableDrafts;
pub use evaluator::{EvaluationError, FormulaEvaluator};
pub use measure::{Measure, MeasureType, ValidationError};
pub use notify::{LogNotifier, Notifier, Severity};
pub use ranking::{EvaluationWarning, RankedSport, Ranking, RankingEngine};
pub use session::EvaluationSession;
pub use sport::{Sport, SportKeyError, VariableValue, Variables, sport_key};
#[cfg(feature = "store-sqlite")]
pub use store::{SqliteCatalogError, SqliteSportCatalog};
pub use sync::{SportSync, SyncDiff, SyncError, SyncStatus, TemplateFetchError, TemplateSource};
pub use values::{MeasureValueStore, MeasureValues};
