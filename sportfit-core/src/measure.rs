//! Measures a user can answer, and the rules their raw answers must satisfy.
//!
//! A [`Measure`] couples a stable key with a [`MeasureType`] and an optional
//! list of allowed options. Raw answers are kept as strings; validation checks
//! that a string encodes a value of the declared type and, when options are
//! present, that it is one of them.

use thiserror::Error;

/// The primitive type a measure's answer encodes.
///
/// # Examples
/// ```
/// use sportfit_core::MeasureType;
///
/// assert_eq!(MeasureType::Number.as_str(), "number");
/// assert_eq!("Boolean".parse::<MeasureType>(), Ok(MeasureType::Boolean));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum MeasureType {
    /// A finite decimal number such as a height in centimetres.
    Number,
    /// Free text or one of a fixed set of labels.
    String,
    /// `true` or `false`.
    Boolean,
}

impl MeasureType {
    /// Return the type as a lowercase `&str`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::String => "string",
            Self::Boolean => "boolean",
        }
    }
}

impl std::fmt::Display for MeasureType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MeasureType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "number" => Ok(Self::Number),
            "string" => Ok(Self::String),
            "boolean" => Ok(Self::Boolean),
            _ => Err(format!("unknown measure type '{s}'")),
        }
    }
}

/// Definition of one evaluable attribute.
///
/// # Examples
/// ```
/// use sportfit_core::{Measure, MeasureType};
///
/// let hand = Measure::new("dominantHand", MeasureType::String)
///     .with_options(["left", "right"]);
/// assert!(hand.validate("left").is_ok());
/// assert!(hand.validate("both").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Measure {
    /// Stable identifier, unique within the measure catalog.
    pub key: String,
    /// Type encoded by raw answers.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub measure_type: MeasureType,
    /// Allowed answers in display order; empty means free-form input.
    #[cfg_attr(feature = "serde", serde(default))]
    pub options: Vec<String>,
}

/// Reasons a raw answer is rejected for a measure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The answer was empty or whitespace.
    #[error("measure '{key}' requires a non-empty value")]
    Empty { key: String },
    /// A number measure received text that is not a finite number.
    #[error("measure '{key}' expects a number, got '{raw}'")]
    NotANumber { key: String, raw: String },
    /// A boolean measure received something other than `true` or `false`.
    #[error("measure '{key}' expects true or false, got '{raw}'")]
    NotABoolean { key: String, raw: String },
    /// The answer is well-typed but not one of the measure's options.
    #[error("'{raw}' is not an allowed option for measure '{key}'")]
    NotAnOption { key: String, raw: String },
}

impl Measure {
    /// Construct a free-form measure.
    pub fn new(key: impl Into<String>, measure_type: MeasureType) -> Self {
        Self {
            key: key.into(),
            measure_type,
            options: Vec::new(),
        }
    }

    /// Restrict the measure to the given options, in order.
    #[must_use]
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Report whether any answer of the right type is accepted.
    pub fn is_free_form(&self) -> bool {
        self.options.is_empty()
    }

    /// Check that `raw` encodes a value this measure accepts.
    ///
    /// # Errors
    /// Returns a [`ValidationError`] describing the first rule `raw` breaks.
    pub fn validate(&self, raw: &str) -> Result<(), ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty {
                key: self.key.clone(),
            });
        }
        match self.measure_type {
            MeasureType::Number => {
                if parse_number(trimmed).is_none() {
                    return Err(ValidationError::NotANumber {
                        key: self.key.clone(),
                        raw: raw.to_owned(),
                    });
                }
            }
            MeasureType::Boolean => {
                if parse_flag(trimmed).is_none() {
                    return Err(ValidationError::NotABoolean {
                        key: self.key.clone(),
                        raw: raw.to_owned(),
                    });
                }
            }
            MeasureType::String => {}
        }
        if !self.is_free_form() && !self.options.iter().any(|option| option == raw) {
            return Err(ValidationError::NotAnOption {
                key: self.key.clone(),
                raw: raw.to_owned(),
            });
        }
        Ok(())
    }

    /// Resolve the answer to store when a user submits `supplied`.
    ///
    /// Number and string measures fall back to their first option when no
    /// value (or an empty one) was supplied; boolean measures default to
    /// `"false"`. Returns `None` when there is nothing to store.
    ///
    /// # Examples
    /// ```
    /// use sportfit_core::{Measure, MeasureType};
    ///
    /// let level = Measure::new("level", MeasureType::String).with_options(["novice", "pro"]);
    /// assert_eq!(level.resolve_answer(None).as_deref(), Some("novice"));
    ///
    /// let swims = Measure::new("canSwim", MeasureType::Boolean);
    /// assert_eq!(swims.resolve_answer(None).as_deref(), Some("false"));
    /// ```
    pub fn resolve_answer(&self, supplied: Option<&str>) -> Option<String> {
        match self.measure_type {
            MeasureType::Number | MeasureType::String => match supplied {
                Some(value) if !value.is_empty() => Some(value.to_owned()),
                _ => self.options.first().cloned(),
            },
            MeasureType::Boolean => Some(supplied.unwrap_or("false").to_owned()),
        }
    }
}

/// Parse a raw numeric answer, rejecting non-finite values.
pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Parse a raw boolean answer, ignoring ASCII case.
pub(crate) fn parse_flag(raw: &str) -> Option<bool> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Some(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[rstest]
    #[case("180")]
    #[case(" 72.5 ")]
    #[case("-3")]
    fn number_accepts_finite_values(#[case] raw: &str) {
        let measure = Measure::new("height", MeasureType::Number);
        assert!(measure.validate(raw).is_ok());
    }

    #[rstest]
    #[case("tall")]
    #[case("NaN")]
    #[case("inf")]
    fn number_rejects_non_finite_or_text(#[case] raw: &str) {
        let measure = Measure::new("height", MeasureType::Number);
        assert!(matches!(
            measure.validate(raw),
            Err(ValidationError::NotANumber { .. })
        ));
    }

    #[rstest]
    #[case("true", true)]
    #[case("FALSE", true)]
    #[case("yes", false)]
    fn boolean_accepts_only_true_or_false(#[case] raw: &str, #[case] accepted: bool) {
        let measure = Measure::new("canSwim", MeasureType::Boolean);
        assert_eq!(measure.validate(raw).is_ok(), accepted);
    }

    #[rstest]
    fn empty_values_are_rejected() {
        let measure = Measure::new("nickname", MeasureType::String);
        assert!(matches!(
            measure.validate("   "),
            Err(ValidationError::Empty { .. })
        ));
    }

    #[rstest]
    fn options_restrict_well_typed_values() {
        let measure = Measure::new("shoeSize", MeasureType::Number).with_options(["40", "42"]);
        assert!(measure.validate("42").is_ok());
        assert!(matches!(
            measure.validate("41"),
            Err(ValidationError::NotAnOption { .. })
        ));
    }

    #[rstest]
    fn resolve_answer_prefers_supplied_value() {
        let measure = Measure::new("level", MeasureType::String).with_options(["novice", "pro"]);
        assert_eq!(measure.resolve_answer(Some("pro")).as_deref(), Some("pro"));
        assert_eq!(measure.resolve_answer(Some("")).as_deref(), Some("novice"));
    }

    #[rstest]
    fn resolve_answer_without_options_or_value_is_none() {
        let measure = Measure::new("height", MeasureType::Number);
        assert!(measure.resolve_answer(None).is_none());
    }

    #[test]
    fn measure_type_round_trips_through_display() {
        for kind in [MeasureType::Number, MeasureType::String, MeasureType::Boolean] {
            assert_eq!(MeasureType::from_str(&kind.to_string()), Ok(kind));
        }
        assert!(MeasureType::from_str("date").is_err());
    }
}
