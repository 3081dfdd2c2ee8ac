//! Formula evaluators for ranking sports against a user's answers.
//!
//! The crate provides two implementations of
//! [`FormulaEvaluator`](sportfit_core::FormulaEvaluator):
//! - [`WeightedSumEvaluator`] multiplies every numeric answer by the sport
//!   variable sharing its key and sums the products. It needs no
//!   configuration and suits catalogs whose variables are plain weights.
//! - [`RuleEvaluator`] sums an ordered list of [`Rule`]s, each relating one
//!   measure to one or more sport variables. Rule sets are plain JSON and can
//!   be loaded from disk with [`RuleEvaluator::from_path`].
//!
//! # Examples
//!
//! ```no_run
//! use camino::Utf8Path;
//! use sportfit_core::{FormulaEvaluator, MeasureValues, Variables};
//! use sportfit_scorer::RuleEvaluator;
//!
//! let evaluator = RuleEvaluator::from_path(Utf8Path::new("config/rules.json"))
//!     .expect("load scoring rules");
//! let values = MeasureValues::from_iter([("height", "180")]);
//! let variables = Variables::from([("minHeight", 170)]);
//! let score = evaluator.evaluate(&variables, &values).expect("score sport");
//! assert!(score >= 0.0);
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
mod rules;
mod weighted;

pub use error::RuleLoadError;
pub use rules::{Rule, RuleEvaluator};
pub use weighted::WeightedSumEvaluator;
