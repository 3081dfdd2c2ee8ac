//! Sports and their scoring variables.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::EvaluationError;

/// Value of a sport-scoped scoring variable.
///
/// Numbers are the primary case; text and flags support lookup-style
/// formulas. With the `serde` feature the value is encoded as a bare JSON
/// number, string, or boolean.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum VariableValue {
    /// A numeric parameter such as a minimum height.
    Number(f64),
    /// A boolean switch.
    Flag(bool),
    /// A text parameter.
    Text(String),
}

impl VariableValue {
    /// Return the value as a number when it is numeric.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Flag(_) | Self::Text(_) => None,
        }
    }
}

impl fmt::Display for VariableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Flag(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<f64> for VariableValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for VariableValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<bool> for VariableValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<&str> for VariableValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for VariableValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Scoring variables of one sport, ordered by key.
///
/// # Examples
/// ```
/// use sportfit_core::{VariableValue, Variables};
///
/// let variables = Variables::from([("minHeight", 170.0)]);
/// assert_eq!(variables.get("minHeight"), Some(&VariableValue::Number(170.0)));
/// assert_eq!(variables.number("minHeight"), Ok(Some(170.0)));
/// assert_eq!(variables.number("minAge"), Ok(None));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Variables {
    entries: BTreeMap<String, VariableValue>,
}

impl Variables {
    /// Construct an empty variable set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&VariableValue> {
        self.entries.get(key)
    }

    /// Read `key` as a number for use inside a formula.
    ///
    /// Missing keys yield `Ok(None)` so formulas can treat them as neutral.
    ///
    /// # Errors
    /// Returns [`EvaluationError::NonNumericVariable`] when the key holds a
    /// flag or text value.
    pub fn number(&self, key: &str) -> Result<Option<f64>, EvaluationError> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(VariableValue::Number(value)) => Ok(Some(*value)),
            Some(VariableValue::Flag(_) | VariableValue::Text(_)) => {
                Err(EvaluationError::NonNumericVariable {
                    key: key.to_owned(),
                })
            }
        }
    }

    /// Insert or replace a variable, returning the previous value.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<VariableValue>,
    ) -> Option<VariableValue> {
        self.entries.insert(key.into(), value.into())
    }

    /// Remove a variable, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<VariableValue> {
        self.entries.remove(key)
    }

    /// Report whether `key` is defined.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate over variable keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterate over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &VariableValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Report whether no variables are defined.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Variables
where
    K: Into<String>,
    V: Into<VariableValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Variables
where
    K: Into<String>,
    V: Into<VariableValue>,
{
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl Extend<(String, VariableValue)> for Variables {
    fn extend<I: IntoIterator<Item = (String, VariableValue)>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl IntoIterator for Variables {
    type Item = (String, VariableValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, VariableValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// A ranking candidate.
///
/// The name is fixed at construction; variables and the disabled switch are
/// edited by administrators.
///
/// # Examples
/// ```
/// use sportfit_core::{Sport, Variables};
///
/// let rowing = Sport::new("rowing", Variables::from([("minAge", 16)])).with_disabled(true);
/// assert_eq!(rowing.name(), "rowing");
/// assert!(rowing.disabled);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sport {
    name: String,
    /// Scoring variables consumed by the formula evaluator.
    #[cfg_attr(feature = "serde", serde(default))]
    pub variables: Variables,
    /// Disabled sports stay in the catalog but are never ranked.
    #[cfg_attr(feature = "serde", serde(default))]
    pub disabled: bool,
}

impl Sport {
    /// Construct an enabled sport.
    pub fn new(name: impl Into<String>, variables: Variables) -> Self {
        Self {
            name: name.into(),
            variables,
            disabled: false,
        }
    }

    /// Set the disabled switch while returning `self` for chaining.
    #[must_use]
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Return a copy of this sport carrying `variables` instead.
    #[must_use]
    pub fn with_variables(&self, variables: Variables) -> Self {
        Self {
            name: self.name.clone(),
            variables,
            disabled: self.disabled,
        }
    }

    /// Start a new sport named `name` from a blank template sport.
    #[must_use]
    pub fn from_template(template: &Self, name: impl Into<String>) -> Self {
        Self::new(name, template.variables.clone())
    }

    /// Unique catalog key of the sport.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Errors returned by [`sport_key`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SportKeyError {
    /// Nothing usable remained after normalisation.
    #[error("sport key '{input}' is empty after normalisation")]
    Empty { input: String },
}

/// Normalise an administrator-entered name into a catalog key.
///
/// Surrounding whitespace is trimmed, letters are lower-cased, runs of
/// whitespace, `-` and `_` become a single `_`, and anything else outside
/// `[a-z0-9]` is dropped.
///
/// # Errors
/// Returns [`SportKeyError::Empty`] when no key characters remain.
///
/// # Examples
/// ```
/// use sportfit_core::sport_key;
///
/// assert_eq!(sport_key("  Beach Volley-ball ").as_deref(), Ok("beach_volley_ball"));
/// assert!(sport_key("!!").is_err());
/// ```
pub fn sport_key(input: &str) -> Result<String, SportKeyError> {
    let mut key = String::with_capacity(input.len());
    let mut pending_separator = false;
    for ch in input.trim().chars() {
        if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_separator = true;
            continue;
        }
        let lower = ch.to_ascii_lowercase();
        if !lower.is_ascii_alphanumeric() {
            continue;
        }
        if pending_separator && !key.is_empty() {
            key.push('_');
        }
        pending_separator = false;
        key.push(lower);
    }
    if key.is_empty() {
        return Err(SportKeyError::Empty {
            input: input.to_owned(),
        });
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Judo", "judo")]
    #[case("  table   tennis ", "table_tennis")]
    #[case("Ski-Jumping", "ski_jumping")]
    #[case("__rock climbing!__", "rock_climbing")]
    #[case("Formula 1", "formula_1")]
    fn sport_key_normalises_names(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sport_key(input).as_deref(), Ok(expected));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("ñ*")]
    fn sport_key_rejects_empty_results(#[case] input: &str) {
        assert!(matches!(sport_key(input), Err(SportKeyError::Empty { .. })));
    }

    #[rstest]
    fn number_rejects_text_variables() {
        let variables = Variables::from([("style", "freestyle")]);
        assert_eq!(
            variables.number("style"),
            Err(EvaluationError::NonNumericVariable {
                key: "style".into()
            })
        );
    }

    #[rstest]
    fn with_variables_preserves_identity() {
        let sport = Sport::new("judo", Variables::from([("minWeight", 60)])).with_disabled(true);
        let updated = sport.with_variables(Variables::from([("minWeight", 66)]));
        assert_eq!(updated.name(), "judo");
        assert!(updated.disabled);
        assert_eq!(updated.variables.number("minWeight"), Ok(Some(66.0)));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn variables_decode_from_plain_json() {
        let variables: Variables =
            serde_json::from_str(r#"{"minHeight": 170, "indoor": true, "surface": "clay"}"#)
                .expect("variables should decode");
        assert_eq!(variables.get("minHeight"), Some(&VariableValue::Number(170.0)));
        assert_eq!(variables.get("indoor"), Some(&VariableValue::Flag(true)));
        assert_eq!(
            variables.get("surface"),
            Some(&VariableValue::Text("clay".into()))
        );
    }
}
