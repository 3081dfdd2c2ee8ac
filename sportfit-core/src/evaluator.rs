//! Score a sport's variables against a user's answers.
//!
//! The `FormulaEvaluator` trait is the seam between the ranking engine and a
//! concrete scoring rule language. The engine only relies on the contract
//! documented on the trait.

use std::sync::Arc;

use thiserror::Error;

use crate::{MeasureValues, Variables};

/// Calculate a compatibility score for one sport.
///
/// Higher scores indicate a better match. Implementations must:
/// - be pure: equal inputs always produce the same score;
/// - treat missing answers and missing variables as a zero contribution
///   rather than failing;
/// - be thread-safe (`Send` + `Sync`).
///
/// Errors are reserved for definitions that cannot be evaluated at all, such
/// as a numeric rule reading a text variable. The engine drops a failing
/// sport from the current ranking instead of aborting it.
///
/// # Examples
///
/// ```rust
/// use sportfit_core::{EvaluationError, FormulaEvaluator, MeasureValues, Variables};
///
/// struct CountAnswers;
///
/// impl FormulaEvaluator for CountAnswers {
///     fn evaluate(
///         &self,
///         _variables: &Variables,
///         values: &MeasureValues,
///     ) -> Result<f64, EvaluationError> {
///         Ok(values.len() as f64)
///     }
/// }
///
/// let values = MeasureValues::from_iter([("height", "180")]);
/// assert_eq!(CountAnswers.evaluate(&Variables::new(), &values), Ok(1.0));
/// ```
pub trait FormulaEvaluator: Send + Sync {
    /// Return the score of a sport described by `variables` for `values`.
    fn evaluate(
        &self,
        variables: &Variables,
        values: &MeasureValues,
    ) -> Result<f64, EvaluationError>;
}

impl<E: FormulaEvaluator + ?Sized> FormulaEvaluator for &E {
    fn evaluate(
        &self,
        variables: &Variables,
        values: &MeasureValues,
    ) -> Result<f64, EvaluationError> {
        (**self).evaluate(variables, values)
    }
}

impl<E: FormulaEvaluator + ?Sized> FormulaEvaluator for Box<E> {
    fn evaluate(
        &self,
        variables: &Variables,
        values: &MeasureValues,
    ) -> Result<f64, EvaluationError> {
        (**self).evaluate(variables, values)
    }
}

impl<E: FormulaEvaluator + ?Sized> FormulaEvaluator for Arc<E> {
    fn evaluate(
        &self,
        variables: &Variables,
        values: &MeasureValues,
    ) -> Result<f64, EvaluationError> {
        (**self).evaluate(variables, values)
    }
}

/// Errors raised while evaluating one sport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    /// A rule needed a number but the variable holds a flag or text.
    #[error("variable '{key}' must be numeric")]
    NonNumericVariable { key: String },
    /// The evaluator produced NaN or an infinite score.
    #[error("score is not a finite number")]
    NonFiniteScore,
    /// Any other formula-specific failure.
    #[error("formula failed: {message}")]
    Formula { message: String },
}
