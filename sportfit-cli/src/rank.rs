//! Rank command implementation for the sportfit CLI.

use camino::Utf8PathBuf;
use clap::Parser;
use log::debug;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use sportfit_core::{
    EvaluationSession, FormulaEvaluator, LogNotifier, Notifier, Ranking, SqliteSportCatalog,
};
use sportfit_scorer::{RuleEvaluator, WeightedSumEvaluator};
use std::io::Write;

use crate::{
    ARG_RANK_CATALOG, ARG_RANK_RULES, ARG_RANK_TOP, ARG_RANK_VALUE, CliError, ENV_RANK_CATALOG,
    require_existing, write_json,
};

/// CLI arguments for the `rank` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Rank the enabled sports of a SQLite catalog for a set of \
                 measure answers. Answers are validated against the \
                 catalog's measures; sports are scored with a JSON rule \
                 file, or with weighted sums when no rules are given.",
    about = "Rank sports for a set of measure answers"
)]
#[ortho_config(prefix = "SPORTFIT")]
pub(crate) struct RankArgs {
    /// Path to the SQLite sport catalog.
    #[arg(long = ARG_RANK_CATALOG, value_name = "path")]
    #[serde(default)]
    pub(crate) catalog: Option<Utf8PathBuf>,
    /// JSON scoring rule file; weighted sums are used when omitted.
    #[arg(long = ARG_RANK_RULES, value_name = "path")]
    #[serde(default)]
    pub(crate) rules: Option<Utf8PathBuf>,
    /// Measure answer as `key=value`; repeat for each measure.
    #[arg(long = ARG_RANK_VALUE, value_name = "key=value")]
    #[serde(default)]
    pub(crate) values: Vec<String>,
    /// Only print the best `n` sports.
    #[arg(long = ARG_RANK_TOP, value_name = "n")]
    #[serde(default)]
    pub(crate) top: Option<usize>,
}

impl RankArgs {
    pub(crate) fn into_config(self) -> Result<RankConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RankConfig::try_from(merged)
    }
}

/// Resolved `rank` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RankConfig {
    /// Path to the SQLite catalog.
    pub(crate) catalog: Utf8PathBuf,
    /// Optional scoring rule file.
    pub(crate) rules: Option<Utf8PathBuf>,
    /// Measure answers in the order given.
    pub(crate) values: Vec<(String, String)>,
    /// Number of sports to print, or all of them.
    pub(crate) top: Option<usize>,
}

impl RankConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.catalog, ARG_RANK_CATALOG)?;
        if let Some(rules) = &self.rules {
            require_existing(rules, ARG_RANK_RULES)?;
        }
        Ok(())
    }
}

impl TryFrom<RankArgs> for RankConfig {
    type Error = CliError;

    fn try_from(args: RankArgs) -> Result<Self, Self::Error> {
        let catalog = args.catalog.ok_or(CliError::MissingArgument {
            field: ARG_RANK_CATALOG,
            env: ENV_RANK_CATALOG,
        })?;
        let values = args
            .values
            .iter()
            .map(|raw| parse_measure_value(raw))
            .collect::<Result<_, _>>()?;
        Ok(Self {
            catalog,
            rules: args.rules,
            values,
            top: args.top,
        })
    }
}

/// Split a `key=raw` argument; the key is trimmed, the raw answer is kept.
pub(crate) fn parse_measure_value(argument: &str) -> Result<(String, String), CliError> {
    match argument.split_once('=') {
        Some((key, raw)) if !key.trim().is_empty() => Ok((key.trim().to_owned(), raw.to_owned())),
        _ => Err(CliError::MalformedMeasureValue {
            raw: argument.to_owned(),
        }),
    }
}

/// JSON document printed by `sportfit rank`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct RankReport {
    /// Ranked sports, best first.
    pub(crate) ranking: Vec<RankedEntry>,
    /// Sports that could not be scored.
    pub(crate) warnings: Vec<WarningEntry>,
}

/// One ranked sport in a [`RankReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct RankedEntry {
    pub(crate) position: usize,
    pub(crate) sport: String,
    pub(crate) score: f64,
}

/// One unscored sport in a [`RankReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct WarningEntry {
    pub(crate) sport: String,
    pub(crate) message: String,
}

impl RankReport {
    fn from_ranking(ranking: &Ranking, top: Option<usize>) -> Self {
        let entries = top.map_or_else(|| ranking.entries(), |n| ranking.top_n(n));
        Self {
            ranking: entries
                .iter()
                .map(|entry| RankedEntry {
                    position: entry.position,
                    sport: entry.sport.name().to_owned(),
                    score: entry.score,
                })
                .collect(),
            warnings: ranking
                .warnings()
                .iter()
                .map(|warning| WarningEntry {
                    sport: warning.sport.clone(),
                    message: warning.error.to_string(),
                })
                .collect(),
        }
    }
}

pub(super) fn run_rank(args: RankArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_rank_with(args, &mut stdout)
}

pub(super) fn run_rank_with(args: RankArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let report = execute_rank(args)?;
    write_json(writer, &report)
}

fn execute_rank(args: RankArgs) -> Result<RankReport, CliError> {
    let config = resolve_rank_config(args)?;
    let catalog = SqliteSportCatalog::open(config.catalog.as_std_path())?;
    let evaluator = build_evaluator(&config)?;
    let mut session = EvaluationSession::load(&catalog, evaluator, LogNotifier)?;
    enter_values(&mut session, &config.values)?;
    let ranking = session.ensure_ranked();
    debug!(
        "ranked {} sports from {} with {} answers",
        ranking.len(),
        catalog.location(),
        config.values.len()
    );
    Ok(RankReport::from_ranking(ranking, config.top))
}

fn resolve_rank_config(args: RankArgs) -> Result<RankConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

fn build_evaluator(config: &RankConfig) -> Result<Box<dyn FormulaEvaluator>, CliError> {
    match &config.rules {
        Some(path) => Ok(Box::new(RuleEvaluator::from_path(path)?)),
        None => Ok(Box::new(WeightedSumEvaluator::new())),
    }
}

/// Validate every answer before storing it so failures carry a reason.
fn enter_values<E, N>(
    session: &mut EvaluationSession<E, N>,
    values: &[(String, String)],
) -> Result<(), CliError>
where
    E: FormulaEvaluator,
    N: Notifier,
{
    for (key, raw) in values {
        let measure = session
            .measure(key)
            .ok_or_else(|| CliError::UnknownMeasure { key: key.clone() })?;
        measure.validate(raw)?;
        session.enter_measure(key, Some(raw));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<RankConfig, CliError> {
    let merged = RankArgs::merge_from_layers(layers).map_err(CliError::from)?;
    RankConfig::try_from(merged)
}
