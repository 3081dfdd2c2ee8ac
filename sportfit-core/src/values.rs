//! The user's current answers, keyed by measure.
//!
//! [`MeasureValueStore`] is the only place answers are written. Readers take
//! a [`MeasureValues`] snapshot, which shares storage with the store until
//! the next accepted write and is never affected by it.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;

use crate::Measure;
use crate::measure::{parse_flag, parse_number};

/// Immutable snapshot of measure answers.
///
/// Cloning a snapshot is cheap; two snapshots compare equal when they hold
/// the same answers.
///
/// # Examples
/// ```
/// use sportfit_core::MeasureValues;
///
/// let values = MeasureValues::from_iter([("height", "180"), ("canSwim", "true")]);
/// assert_eq!(values.number("height"), Some(180.0));
/// assert_eq!(values.flag("canSwim"), Some(true));
/// assert!(values.get("weight").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeasureValues {
    entries: Arc<BTreeMap<String, String>>,
}

impl MeasureValues {
    /// Construct an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the raw answer for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Return the answer for `key` parsed as a finite number.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(parse_number)
    }

    /// Return the answer for `key` parsed as a boolean.
    pub fn flag(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(parse_flag)
    }

    /// Number of answered measures.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Report whether no measure has been answered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(measure key, raw answer)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    fn insert(&mut self, key: String, raw: String) {
        Arc::make_mut(&mut self.entries).insert(key, raw);
    }
}

impl<K, V> FromIterator<(K, V)> for MeasureValues
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: Arc::new(
                iter.into_iter()
                    .map(|(key, value)| (key.into(), value.into()))
                    .collect(),
            ),
        }
    }
}

/// Holds the latest accepted answer for every measure.
///
/// Every write replaces the whole entry for a measure; rejected writes leave
/// the store untouched. The store never triggers ranking itself.
///
/// # Examples
/// ```
/// use sportfit_core::{Measure, MeasureType, MeasureValueStore};
///
/// let weight = Measure::new("weight", MeasureType::Number);
/// let mut store = MeasureValueStore::new();
/// assert!(store.set_value(&weight, "75"));
/// assert!(!store.set_value(&weight, "heavy"));
/// assert_eq!(store.values().get("weight"), Some("75"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MeasureValueStore {
    values: MeasureValues,
}

impl MeasureValueStore {
    /// Construct an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `raw` for `measure` and, when accepted, replace its answer.
    ///
    /// Returns `true` when the value was stored.
    pub fn set_value(&mut self, measure: &Measure, raw: &str) -> bool {
        match measure.validate(raw) {
            Ok(()) => {
                self.values.insert(measure.key.clone(), raw.to_owned());
                true
            }
            Err(err) => {
                debug!("rejected answer: {err}");
                false
            }
        }
    }

    /// Store the answer a user submitted, applying the measure's defaults.
    ///
    /// See [`Measure::resolve_answer`] for how a missing value is filled in.
    pub fn enter_measure(&mut self, measure: &Measure, supplied: Option<&str>) -> bool {
        measure
            .resolve_answer(supplied)
            .is_some_and(|answer| self.set_value(measure, &answer))
    }

    /// Return the raw answer for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key)
    }

    /// Take a snapshot of the current answers.
    pub fn values(&self) -> MeasureValues {
        self.values.clone()
    }
}
