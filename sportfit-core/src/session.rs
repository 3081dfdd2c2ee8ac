//! The user-facing "answer a measure, see the ranking move" flow.

use crate::{
    CatalogError, CatalogSource, FormulaEvaluator, Measure, MeasureValueStore, MeasureValues,
    Notifier, RankedSport, Ranking, RankingEngine, Severity,
};

/// Message shown when an answer cannot be stored.
pub const INVALID_MEASURE_MESSAGE: &str = "Please provide a valid value for the measure";

/// Evaluation context built from a catalog.
///
/// The session owns the measure catalog, the user's answers and the ranking
/// engine. It re-ranks after every accepted answer and forwards evaluation
/// warnings to its notifier.
///
/// # Examples
/// ```
/// use sportfit_core::test_support::{MarginEvaluator, MemoryCatalog, RecordingNotifier};
/// use sportfit_core::{EvaluationSession, Measure, MeasureType, Sport, Variables};
///
/// let catalog = MemoryCatalog::with_sports([
///     Sport::new("chess", Variables::from([("minHeight", 0)])),
///     Sport::new("basketball", Variables::from([("minHeight", 170)])),
/// ])
/// .with_measures([Measure::new("height", MeasureType::Number)]);
///
/// let mut session = EvaluationSession::load(&catalog, MarginEvaluator, RecordingNotifier::default())?;
/// assert!(session.enter_measure("height", Some("180")));
/// assert_eq!(session.top_n(1)[0].sport.name(), "basketball");
/// # Ok::<(), sportfit_core::CatalogError>(())
/// ```
#[derive(Debug)]
pub struct EvaluationSession<E, N> {
    measures: Vec<Measure>,
    store: MeasureValueStore,
    engine: RankingEngine<E>,
    notifier: N,
}

impl<E, N> EvaluationSession<E, N>
where
    E: FormulaEvaluator,
    N: Notifier,
{
    /// Load measures and sports from `source`.
    ///
    /// # Errors
    /// Returns the [`CatalogError`] raised by `source`.
    pub fn load<C>(source: &C, evaluator: E, notifier: N) -> Result<Self, CatalogError>
    where
        C: CatalogSource + ?Sized,
    {
        let measures = source.list_measures()?;
        let sports = source.list_sports()?;
        Ok(Self {
            measures,
            store: MeasureValueStore::new(),
            engine: RankingEngine::new(evaluator, sports),
            notifier,
        })
    }

    /// Reload measures and sports, keeping the user's answers.
    ///
    /// The ranking is recomputed on the next answer or explicit rank.
    ///
    /// # Errors
    /// Returns the [`CatalogError`] raised by `source`; the session keeps its
    /// previous catalog in that case.
    pub fn refresh<C>(&mut self, source: &C) -> Result<(), CatalogError>
    where
        C: CatalogSource + ?Sized,
    {
        let measures = source.list_measures()?;
        let sports = source.list_sports()?;
        self.measures = measures;
        self.engine.replace_catalog(sports);
        Ok(())
    }

    /// Store an answer for the measure `key` and re-rank.
    ///
    /// Missing values fall back to the measure's defaults (see
    /// [`Measure::resolve_answer`]). Unknown measures and rejected values
    /// leave the answers untouched, raise an error notification and return
    /// `false`.
    pub fn enter_measure(&mut self, key: &str, supplied: Option<&str>) -> bool {
        let accepted = self
            .measures
            .iter()
            .find(|measure| measure.key == key)
            .is_some_and(|measure| self.store.enter_measure(measure, supplied));
        if !accepted {
            self.notifier.notify(INVALID_MEASURE_MESSAGE, Severity::Error);
            return false;
        }
        self.rank();
        true
    }

    /// Rank once if no ranking has been computed yet.
    pub fn ensure_ranked(&mut self) -> &Ranking {
        if !self.engine.is_initialized() {
            return self.rank();
        }
        self.engine.ranking()
    }

    /// Rank against the current answers and report unscored sports.
    pub fn rank(&mut self) -> &Ranking {
        let values = self.store.values();
        let ranking = self.engine.rank_sports(&values);
        for warning in ranking.warnings() {
            self.notifier
                .notify(&warning.to_string(), Severity::Warning);
        }
        ranking
    }

    /// Measures users can answer, in display order.
    pub fn measures(&self) -> &[Measure] {
        &self.measures
    }

    /// Look up a measure by key.
    pub fn measure(&self, key: &str) -> Option<&Measure> {
        self.measures.iter().find(|measure| measure.key == key)
    }

    /// Snapshot of the current answers.
    pub fn values(&self) -> MeasureValues {
        self.store.values()
    }

    /// The ranking engine.
    pub fn engine(&self) -> &RankingEngine<E> {
        &self.engine
    }

    /// The most recent ranking.
    pub fn ranking(&self) -> &Ranking {
        self.engine.ranking()
    }

    /// The first `n` entries of the most recent ranking.
    pub fn top_n(&self, n: usize) -> &[RankedSport] {
        self.engine.top_n(n)
    }

    /// The notifier receiving session messages.
    pub fn notifier(&self) -> &N {
        &self.notifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        MarginEvaluator, MemoryCatalog, RecordingNotifier, VariableScoreEvaluator,
    };
    use crate::{MeasureType, Sport, Variables};
    use rstest::{fixture, rstest};

    #[fixture]
    fn catalog() -> MemoryCatalog {
        MemoryCatalog::with_sports([
            Sport::new("chess", Variables::from([("minHeight", 0)])),
            Sport::new("basketball", Variables::from([("minHeight", 170)])),
            Sport::new("rowing", Variables::from([("minHeight", 175)])).with_disabled(true),
        ])
        .with_measures([
            Measure::new("height", MeasureType::Number),
            Measure::new("level", MeasureType::String).with_options(["novice", "pro"]),
            Measure::new("canSwim", MeasureType::Boolean),
        ])
    }

    fn session(
        catalog: &MemoryCatalog,
    ) -> EvaluationSession<MarginEvaluator, RecordingNotifier> {
        EvaluationSession::load(catalog, MarginEvaluator, RecordingNotifier::default())
            .expect("catalog loads")
    }

    fn ranked_names<E: FormulaEvaluator, N: Notifier>(
        session: &EvaluationSession<E, N>,
    ) -> Vec<String> {
        session
            .ranking()
            .entries()
            .iter()
            .map(|entry| entry.sport.name().to_owned())
            .collect()
    }

    #[rstest]
    fn accepted_answer_reranks(catalog: MemoryCatalog) {
        let mut session = session(&catalog);
        assert!(session.enter_measure("height", Some("180")));
        assert!(session.engine().is_initialized());
        assert_eq!(ranked_names(&session), ["basketball", "chess"]);
        assert!(session.notifier().messages().is_empty());
    }

    #[rstest]
    #[case("height", Some("tall"))]
    #[case("height", None)]
    #[case("weight", Some("70"))]
    #[case("level", Some("expert"))]
    fn rejected_answer_notifies_and_keeps_state(
        catalog: MemoryCatalog,
        #[case] key: &str,
        #[case] supplied: Option<&str>,
    ) {
        let mut session = session(&catalog);
        assert!(!session.enter_measure(key, supplied));
        assert!(session.values().is_empty());
        assert!(!session.engine().is_initialized());
        assert_eq!(
            session.notifier().last(),
            Some((INVALID_MEASURE_MESSAGE.to_owned(), Severity::Error))
        );
    }

    #[rstest]
    fn missing_answers_use_measure_defaults(catalog: MemoryCatalog) {
        let mut session = session(&catalog);
        assert!(session.enter_measure("level", None));
        assert!(session.enter_measure("canSwim", None));
        assert_eq!(session.values().get("level"), Some("novice"));
        assert_eq!(session.values().get("canSwim"), Some("false"));
    }

    #[rstest]
    fn ensure_ranked_runs_only_once(catalog: MemoryCatalog) {
        let mut session = session(&catalog);
        assert_eq!(session.ensure_ranked().len(), 2);

        assert!(session.enter_measure("height", Some("150")));
        assert_eq!(session.ranking().position_of("chess"), Some(1));
        let before = session.ranking().clone();
        assert_eq!(session.ensure_ranked(), &before);
    }

    #[rstest]
    fn refresh_reloads_catalog_and_keeps_answers(catalog: MemoryCatalog) {
        let mut session = session(&catalog);
        assert!(session.enter_measure("height", Some("180")));

        let updated = MemoryCatalog::with_sports([Sport::new(
            "volleyball",
            Variables::from([("minHeight", 160)]),
        )])
        .with_measures([Measure::new("height", MeasureType::Number)]);
        session.refresh(&updated).expect("catalog reloads");

        assert_eq!(session.values().get("height"), Some("180"));
        assert_eq!(session.measures().len(), 1);
        assert!(session.engine().needs_ranking(&session.values()));
        assert_eq!(session.rank().position_of("volleyball"), Some(1));
    }

    #[rstest]
    fn failed_refresh_keeps_previous_catalog(catalog: MemoryCatalog) {
        let mut session = session(&catalog);
        catalog.fail_reads(Some("offline"));
        assert!(matches!(
            session.refresh(&catalog),
            Err(CatalogError::Unavailable { .. })
        ));
        assert_eq!(session.engine().sports().len(), 3);
        assert!(session.measure("height").is_some());
    }

    #[rstest]
    fn evaluation_failures_are_forwarded_as_warnings() {
        let catalog = MemoryCatalog::with_sports([
            Sport::new("darts", Variables::from([("score", 3)])),
            Sport::new("curling", Variables::from([("score", "many")])),
        ])
        .with_measures([Measure::new("height", MeasureType::Number)]);
        let mut session = EvaluationSession::load(
            &catalog,
            VariableScoreEvaluator,
            RecordingNotifier::default(),
        )
        .expect("catalog loads");

        assert!(session.enter_measure("height", Some("170")));

        assert_eq!(ranked_names(&session), ["darts"]);
        assert_eq!(session.notifier().count(Severity::Warning), 1);
        let (message, _) = session.notifier().last().expect("warning recorded");
        assert!(message.contains("curling"));
    }
}
