//! Rank sports by how well they match a user's answers.
//!
//! [`RankingEngine`] owns the sport catalog and the most recent
//! [`Ranking`]. It only recomputes when a caller asks it to, either
//! unconditionally through [`RankingEngine::rank_sports`] or lazily through
//! [`RankingEngine::refresh`].

use std::cmp::Ordering;
use std::fmt;

use log::{debug, warn};

use crate::{EvaluationError, FormulaEvaluator, MeasureValues, Sport};

/// One sport's place in a ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedSport {
    /// The ranked sport as it was in the catalog when ranked.
    pub sport: Sport,
    /// Score returned by the evaluator.
    pub score: f64,
    /// One-based position; strictly increasing without gaps.
    pub position: usize,
}

/// A sport that was left out of a ranking because its formula failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationWarning {
    /// Name of the unscored sport.
    pub sport: String,
    /// Why evaluation failed.
    pub error: EvaluationError,
}

impl fmt::Display for EvaluationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sport '{}' was not ranked: {}", self.sport, self.error)
    }
}

/// Ordered result of one ranking pass.
///
/// Entries are sorted by descending score, ties broken by ascending sport
/// name, so the order never depends on catalog order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ranking {
    entries: Vec<RankedSport>,
    warnings: Vec<EvaluationWarning>,
}

impl Ranking {
    /// All ranked sports, best first.
    pub fn entries(&self) -> &[RankedSport] {
        &self.entries
    }

    /// Sports excluded from this pass because evaluation failed.
    pub fn warnings(&self) -> &[EvaluationWarning] {
        &self.warnings
    }

    /// The first `n` entries, or all of them when `n` exceeds the length.
    ///
    /// # Examples
    /// ```
    /// use sportfit_core::Ranking;
    ///
    /// let ranking = Ranking::default();
    /// assert!(ranking.top_n(8).is_empty());
    /// ```
    pub fn top_n(&self, n: usize) -> &[RankedSport] {
        let end = n.min(self.entries.len());
        self.entries.get(..end).unwrap_or_default()
    }

    /// Position of the named sport, if it was ranked.
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|entry| entry.sport.name() == name)
            .map(|entry| entry.position)
    }

    /// Number of ranked sports.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Report whether no sport was ranked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Evaluate and order the enabled sports in `sports`.
///
/// Failing sports are reported as warnings and left out.
pub fn rank<E>(evaluator: &E, sports: &[Sport], values: &MeasureValues) -> Ranking
where
    E: FormulaEvaluator + ?Sized,
{
    let mut scored = Vec::with_capacity(sports.len());
    let mut warnings = Vec::new();

    for sport in sports.iter().filter(|sport| !sport.disabled) {
        let outcome = evaluator
            .evaluate(&sport.variables, values)
            .and_then(|score| {
                if score.is_finite() {
                    Ok(score)
                } else {
                    Err(EvaluationError::NonFiniteScore)
                }
            });
        match outcome {
            Ok(score) => scored.push((sport, score)),
            Err(error) => {
                warn!("excluding sport '{}' from ranking: {error}", sport.name());
                warnings.push(EvaluationWarning {
                    sport: sport.name().to_owned(),
                    error,
                });
            }
        }
    }

    scored.sort_by(|(left, left_score), (right, right_score)| {
        compare_scored(left, *left_score, right, *right_score)
    });

    let entries = scored
        .into_iter()
        .enumerate()
        .map(|(index, (sport, score))| RankedSport {
            sport: sport.clone(),
            score,
            position: index + 1,
        })
        .collect();

    Ranking { entries, warnings }
}

fn compare_scored(left: &Sport, left_score: f64, right: &Sport, right_score: f64) -> Ordering {
    right_score
        .total_cmp(&left_score)
        .then_with(|| left.name().cmp(right.name()))
}

#[derive(Debug, Clone, PartialEq)]
struct RankMarker {
    values: MeasureValues,
    catalog_revision: u64,
}

/// Owns the sport catalog and the latest ranking.
///
/// # Examples
/// ```
/// use sportfit_core::test_support::VariableScoreEvaluator;
/// use sportfit_core::{MeasureValues, RankingEngine, Sport, Variables};
///
/// let mut engine = RankingEngine::new(
///     VariableScoreEvaluator,
///     vec![
///         Sport::new("judo", Variables::from([("score", 5)])),
///         Sport::new("archery", Variables::from([("score", 5)])),
///     ],
/// );
/// let ranking = engine.rank_sports(&MeasureValues::new());
/// let names: Vec<_> = ranking.entries().iter().map(|e| e.sport.name()).collect();
/// assert_eq!(names, ["archery", "judo"]);
/// ```
#[derive(Debug)]
pub struct RankingEngine<E> {
    evaluator: E,
    sports: Vec<Sport>,
    ranking: Ranking,
    last_ranked: Option<RankMarker>,
    catalog_revision: u64,
    initialized: bool,
}

impl<E: FormulaEvaluator> RankingEngine<E> {
    /// Construct an engine over `sports` in catalog order.
    pub fn new(evaluator: E, sports: Vec<Sport>) -> Self {
        Self {
            evaluator,
            sports,
            ranking: Ranking::default(),
            last_ranked: None,
            catalog_revision: 0,
            initialized: false,
        }
    }

    /// Rank every enabled sport against `values` and keep the result.
    pub fn rank_sports(&mut self, values: &MeasureValues) -> &Ranking {
        self.ranking = rank(&self.evaluator, &self.sports, values);
        self.initialized = true;
        self.last_ranked = Some(RankMarker {
            values: values.clone(),
            catalog_revision: self.catalog_revision,
        });
        debug!(
            "ranked {} sports against {} answers ({} unscored)",
            self.ranking.len(),
            values.len(),
            self.ranking.warnings().len()
        );
        &self.ranking
    }

    /// Report whether the kept ranking is stale for `values`.
    ///
    /// A ranking is stale before the first pass, after any catalog change,
    /// and when `values` differ from the answers it was computed from.
    pub fn needs_ranking(&self, values: &MeasureValues) -> bool {
        match &self.last_ranked {
            None => true,
            Some(marker) => {
                marker.catalog_revision != self.catalog_revision || &marker.values != values
            }
        }
    }

    /// Rank only when [`Self::needs_ranking`] says the kept ranking is stale.
    pub fn refresh(&mut self, values: &MeasureValues) -> &Ranking {
        if self.needs_ranking(values) {
            return self.rank_sports(values);
        }
        &self.ranking
    }

    /// Whether at least one ranking pass has run.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The most recent ranking; empty before the first pass.
    pub fn ranking(&self) -> &Ranking {
        &self.ranking
    }

    /// The first `n` entries of the most recent ranking.
    pub fn top_n(&self, n: usize) -> &[RankedSport] {
        self.ranking.top_n(n)
    }

    /// The evaluator used for scoring.
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Sports in catalog order, including disabled ones.
    pub fn sports(&self) -> &[Sport] {
        &self.sports
    }

    /// Look up a sport by name.
    pub fn sport(&self, name: &str) -> Option<&Sport> {
        self.sports.iter().find(|sport| sport.name() == name)
    }

    /// Replace the whole catalog.
    pub fn replace_catalog(&mut self, sports: Vec<Sport>) {
        self.sports = sports;
        self.touch_catalog();
    }

    /// Insert `sport`, replacing any sport with the same name in place.
    pub fn upsert_sport(&mut self, sport: Sport) {
        match self
            .sports
            .iter_mut()
            .find(|existing| existing.name() == sport.name())
        {
            Some(existing) => *existing = sport,
            None => self.sports.push(sport),
        }
        self.touch_catalog();
    }

    /// Remove the named sport from the catalog.
    pub fn remove_sport(&mut self, name: &str) -> Option<Sport> {
        let index = self.sports.iter().position(|sport| sport.name() == name)?;
        let removed = self.sports.remove(index);
        self.touch_catalog();
        Some(removed)
    }

    /// Enable or disable the named sport. Returns `false` for unknown names.
    pub fn set_disabled(&mut self, name: &str, disabled: bool) -> bool {
        let Some(sport) = self.sports.iter_mut().find(|sport| sport.name() == name) else {
            return false;
        };
        sport.disabled = disabled;
        self.touch_catalog();
        true
    }

    fn touch_catalog(&mut self) {
        self.catalog_revision = self.catalog_revision.wrapping_add(1);
    }
}
