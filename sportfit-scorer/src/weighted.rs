//! Weighted sums of numeric answers.
#![forbid(unsafe_code)]

use sportfit_core::{EvaluationError, FormulaEvaluator, MeasureValues, Variables};

/// Score a sport as the sum of `variable * answer` over shared keys.
///
/// A variable contributes only when a measure with the same key has a
/// numeric answer. Unanswered measures and non-numeric answers add nothing.
///
/// # Examples
///
/// ```rust
/// use sportfit_core::{FormulaEvaluator, MeasureValues, Variables};
/// use sportfit_scorer::WeightedSumEvaluator;
///
/// let values = MeasureValues::from_iter([("stamina", "4"), ("agility", "2")]);
/// let variables = Variables::from([("stamina", 2), ("agility", 3)]);
/// let score = WeightedSumEvaluator::new().evaluate(&variables, &values);
/// assert_eq!(score, Ok(14.0));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeightedSumEvaluator;

impl WeightedSumEvaluator {
    /// Construct the evaluator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl FormulaEvaluator for WeightedSumEvaluator {
    #[expect(
        clippy::float_arithmetic,
        reason = "weighted sums multiply and add numeric answers"
    )]
    fn evaluate(
        &self,
        variables: &Variables,
        values: &MeasureValues,
    ) -> Result<f64, EvaluationError> {
        let mut score = 0.0_f64;
        for key in variables.keys() {
            let Some(answer) = values.number(key) else {
                continue;
            };
            let weight = variables.number(key)?.unwrap_or_default();
            score += weight * answer;
        }
        Ok(score)
    }
}
