//! Rule-driven scoring loaded from JSON rule sets.
//!
//! A rule set is a JSON document of the form
//!
//! ```json
//! {
//!   "rules": [
//!     { "kind": "margin", "measure": "height", "variable": "minHeight" },
//!     { "kind": "threshold", "measure": "age", "variable": "minAge", "bonus": 5 },
//!     { "kind": "lookup", "measure": "level", "variable_prefix": "level" }
//!   ]
//! }
//! ```
//!
//! Rules are evaluated in order and their contributions summed. Every rule
//! treats a missing answer or a missing variable as a zero contribution.
#![forbid(unsafe_code)]

use camino::Utf8Path;
use log::debug;
use serde::{Deserialize, Serialize};
use sportfit_core::{EvaluationError, FormulaEvaluator, MeasureValues, Variables};
use sportfit_fs::read_utf8_file;

use crate::RuleLoadError;

const INLINE_ORIGIN: &str = "inline JSON";

/// One scoring rule relating a measure to sport variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rule {
    /// Contribute `answer - variable`, the margin by which a user exceeds a
    /// sport's requirement. A requirement of `0` means the sport places no
    /// constraint on the measure and contributes nothing.
    Margin {
        /// Numeric measure key.
        measure: String,
        /// Sport variable holding the requirement.
        variable: String,
    },
    /// Contribute `answer * variable`.
    Weight {
        /// Numeric measure key.
        measure: String,
        /// Sport variable holding the weight.
        variable: String,
    },
    /// Contribute `bonus` when `answer >= variable`.
    Threshold {
        /// Numeric measure key.
        measure: String,
        /// Sport variable holding the threshold.
        variable: String,
        /// Score added when the threshold is met.
        bonus: f64,
    },
    /// Contribute `variable` when the boolean answer is `true`.
    Flag {
        /// Boolean measure key.
        measure: String,
        /// Sport variable holding the score for a `true` answer.
        variable: String,
    },
    /// Contribute the variable named `"{variable_prefix}.{answer}"`.
    ///
    /// This supports lookup tables keyed by the options of a string measure,
    /// for example `level.novice` and `level.pro`.
    Lookup {
        /// Measure key whose raw answer selects the variable.
        measure: String,
        /// Prefix of the looked-up variable names.
        variable_prefix: String,
    },
}

impl Rule {
    /// Return the measure key the rule reads.
    #[must_use]
    pub fn measure(&self) -> &str {
        match self {
            Self::Margin { measure, .. }
            | Self::Weight { measure, .. }
            | Self::Threshold { measure, .. }
            | Self::Flag { measure, .. }
            | Self::Lookup { measure, .. } => measure,
        }
    }

    fn validate(&self, index: usize) -> Result<(), RuleLoadError> {
        if self.measure().trim().is_empty() {
            return Err(RuleLoadError::EmptyField {
                index,
                field: "measure",
            });
        }
        match self {
            Self::Margin { variable, .. }
            | Self::Weight { variable, .. }
            | Self::Threshold { variable, .. }
            | Self::Flag { variable, .. }
                if variable.trim().is_empty() =>
            {
                Err(RuleLoadError::EmptyField {
                    index,
                    field: "variable",
                })
            }
            Self::Threshold { bonus, .. } if !bonus.is_finite() => {
                Err(RuleLoadError::NonFiniteBonus { index })
            }
            Self::Lookup {
                variable_prefix, ..
            } if variable_prefix.trim().is_empty() => Err(RuleLoadError::EmptyField {
                index,
                field: "variable_prefix",
            }),
            _ => Ok(()),
        }
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "rule contributions subtract and multiply numeric answers"
    )]
    fn contribution(
        &self,
        variables: &Variables,
        values: &MeasureValues,
    ) -> Result<f64, EvaluationError> {
        let score = match self {
            Self::Margin { measure, variable } => {
                match (values.number(measure), variables.number(variable)?) {
                    (Some(answer), Some(required)) if required.abs() > 0.0 => answer - required,
                    _ => 0.0,
                }
            }
            Self::Weight { measure, variable } => {
                match (values.number(measure), variables.number(variable)?) {
                    (Some(answer), Some(weight)) => answer * weight,
                    _ => 0.0,
                }
            }
            Self::Threshold {
                measure,
                variable,
                bonus,
            } => match (values.number(measure), variables.number(variable)?) {
                (Some(answer), Some(threshold)) if answer >= threshold => *bonus,
                _ => 0.0,
            },
            Self::Flag { measure, variable } => {
                let reward = variables.number(variable)?.unwrap_or_default();
                if values.flag(measure) == Some(true) {
                    reward
                } else {
                    0.0
                }
            }
            Self::Lookup {
                measure,
                variable_prefix,
            } => match values.get(measure) {
                Some(raw) => variables
                    .number(&format!("{variable_prefix}.{}", raw.trim()))?
                    .unwrap_or_default(),
                None => 0.0,
            },
        };
        Ok(score)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleSet {
    rules: Vec<Rule>,
}

/// Score sports by summing an ordered list of [`Rule`]s.
///
/// # Examples
///
/// ```rust
/// use sportfit_core::{FormulaEvaluator, MeasureValues, Variables};
/// use sportfit_scorer::{Rule, RuleEvaluator};
///
/// let evaluator = RuleEvaluator::new(vec![Rule::Margin {
///     measure: "height".into(),
///     variable: "minHeight".into(),
/// }])
/// .expect("valid rules");
/// let values = MeasureValues::from_iter([("height", "180")]);
///
/// let basketball = Variables::from([("minHeight", 170)]);
/// let chess = Variables::from([("minHeight", 0)]);
/// assert_eq!(evaluator.evaluate(&basketball, &values), Ok(10.0));
/// assert_eq!(evaluator.evaluate(&chess, &values), Ok(0.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RuleEvaluator {
    rules: Vec<Rule>,
}

impl RuleEvaluator {
    /// Build an evaluator from validated rules.
    ///
    /// # Errors
    /// Returns [`RuleLoadError::EmptyField`] when a rule names an empty
    /// measure or variable, and [`RuleLoadError::NonFiniteBonus`] for a NaN
    /// or infinite threshold bonus.
    pub fn new(rules: Vec<Rule>) -> Result<Self, RuleLoadError> {
        for (index, rule) in rules.iter().enumerate() {
            rule.validate(index)?;
        }
        Ok(Self { rules })
    }

    /// Parse a rule set from a JSON document.
    ///
    /// # Errors
    /// Returns [`RuleLoadError::Parse`] for malformed JSON or unknown rule
    /// kinds, and the validation errors of [`RuleEvaluator::new`].
    pub fn from_json(json: &str) -> Result<Self, RuleLoadError> {
        Self::parse(json, INLINE_ORIGIN)
    }

    /// Load a rule set from a JSON file.
    ///
    /// # Errors
    /// Returns [`RuleLoadError::ReadFile`] when the file cannot be read, and
    /// the errors of [`RuleEvaluator::from_json`] for its contents.
    pub fn from_path(path: &Utf8Path) -> Result<Self, RuleLoadError> {
        let json = read_utf8_file(path).map_err(|source| RuleLoadError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let evaluator = Self::parse(&json, path.as_str())?;
        debug!(
            "loaded {} scoring rules from {path}",
            evaluator.rules.len()
        );
        Ok(evaluator)
    }

    fn parse(json: &str, origin: &str) -> Result<Self, RuleLoadError> {
        let set: RuleSet =
            serde_json::from_str(json).map_err(|source| RuleLoadError::Parse {
                origin: origin.to_owned(),
                source,
            })?;
        Self::new(set.rules)
    }

    /// Return the rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

impl FormulaEvaluator for RuleEvaluator {
    #[expect(
        clippy::float_arithmetic,
        reason = "rule contributions are summed into one score"
    )]
    fn evaluate(
        &self,
        variables: &Variables,
        values: &MeasureValues,
    ) -> Result<f64, EvaluationError> {
        let mut score = 0.0_f64;
        for rule in &self.rules {
            score += rule.contribution(variables, values)?;
        }
        Ok(score)
    }
}
