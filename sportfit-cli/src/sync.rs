//! Sync command implementation for the sportfit CLI.

use std::collections::BTreeSet;
use std::io::Write;
use std::time::Duration;

use camino::Utf8PathBuf;
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use sportfit_core::{
    LogNotifier, Notifier, SportCatalogWriter, SportManager, SqliteSportCatalog, SyncDiff,
    SyncStatus, TemplateSource,
};
use sportfit_data::{DEFAULT_TIMEOUT_SECS, HttpTemplateSource, HttpTemplateSourceConfig};

use crate::{
    ARG_SYNC_APPLY, ARG_SYNC_CATALOG, ARG_SYNC_SPORT, ARG_SYNC_TEMPLATE_URL,
    ARG_SYNC_TIMEOUT_SECS, CliError, ENV_SYNC_CATALOG, ENV_SYNC_TEMPLATE_URL, require_existing,
    write_json,
};

/// CLI arguments for the `sync` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Compare the sports of a SQLite catalog with the templates \
                 served at {template-url}/sports/{name}/template. With \
                 --apply, sports that are out of sync are replaced by their \
                 template variables and written back to the catalog.",
    about = "Check sports against their remote templates"
)]
#[ortho_config(prefix = "SPORTFIT")]
pub(crate) struct SyncArgs {
    /// Path to the SQLite sport catalog.
    #[arg(long = ARG_SYNC_CATALOG, value_name = "path")]
    #[serde(default)]
    pub(crate) catalog: Option<Utf8PathBuf>,
    /// Base URL of the template service.
    #[arg(long = ARG_SYNC_TEMPLATE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) template_url: Option<String>,
    /// Sport to check; repeat for several. All sports when omitted.
    #[arg(long = ARG_SYNC_SPORT, value_name = "name")]
    #[serde(default)]
    pub(crate) sports: Vec<String>,
    /// Sync out-of-sync sports and save them.
    #[arg(long = ARG_SYNC_APPLY)]
    #[serde(default)]
    pub(crate) apply: bool,
    /// Template request timeout in seconds (default 10).
    #[arg(long = ARG_SYNC_TIMEOUT_SECS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
}

impl SyncArgs {
    pub(crate) fn into_config(self) -> Result<SyncConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SyncConfig::try_from(merged)
    }
}

/// Resolved `sync` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SyncConfig {
    /// Path to the SQLite catalog.
    pub(crate) catalog: Utf8PathBuf,
    /// Base URL of the template service.
    pub(crate) template_url: String,
    /// Sports to check; empty means every catalog sport.
    pub(crate) sports: Vec<String>,
    /// Whether out-of-sync sports are synced and saved.
    pub(crate) apply: bool,
    /// Template request timeout.
    pub(crate) timeout: Duration,
}

impl TryFrom<SyncArgs> for SyncConfig {
    type Error = CliError;

    fn try_from(args: SyncArgs) -> Result<Self, Self::Error> {
        let catalog = args.catalog.ok_or(CliError::MissingArgument {
            field: ARG_SYNC_CATALOG,
            env: ENV_SYNC_CATALOG,
        })?;
        let template_url = args.template_url.ok_or(CliError::MissingArgument {
            field: ARG_SYNC_TEMPLATE_URL,
            env: ENV_SYNC_TEMPLATE_URL,
        })?;
        Ok(Self {
            catalog,
            template_url,
            sports: args.sports,
            apply: args.apply,
            timeout: Duration::from_secs(args.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        })
    }
}

/// Builds the template source for the current sync invocation.
pub(super) trait TemplateSourceBuilder {
    fn build(&self, config: &SyncConfig) -> Result<Box<dyn TemplateSource>, CliError>;
}

pub(super) struct HttpTemplateSourceBuilder;

impl TemplateSourceBuilder for HttpTemplateSourceBuilder {
    fn build(&self, config: &SyncConfig) -> Result<Box<dyn TemplateSource>, CliError> {
        let source_config =
            HttpTemplateSourceConfig::new(config.template_url.clone()).with_timeout(config.timeout);
        let source = HttpTemplateSource::with_config(source_config).map_err(|source| {
            CliError::BuildTemplateSource {
                base_url: config.template_url.clone(),
                source,
            }
        })?;
        Ok(Box::new(source))
    }
}

/// JSON document printed by `sportfit sync`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct SyncReport {
    pub(crate) sports: Vec<SportSyncEntry>,
}

/// Sync outcome of one sport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct SportSyncEntry {
    pub(crate) sport: String,
    /// `in_sync`, `out_of_sync`, or `unknown`.
    pub(crate) status: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) added: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) removed: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) changed: Vec<String>,
    /// Why the template could not be compared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<String>,
    /// Whether the sport was synced and saved.
    pub(crate) synced: bool,
}

impl SportSyncEntry {
    fn from_status(sport: &str, status: &SyncStatus) -> Self {
        let (name, diff, error) = match status {
            SyncStatus::InSync => ("in_sync", None, None),
            SyncStatus::OutOfSync(diff) => ("out_of_sync", Some(diff), None),
            SyncStatus::Unknown(error) => ("unknown", None, Some(error.to_string())),
        };
        let keys = |select: fn(&SyncDiff) -> &BTreeSet<String>| {
            diff.map(|found| select(found).iter().cloned().collect())
                .unwrap_or_default()
        };
        Self {
            sport: sport.to_owned(),
            status: name.to_owned(),
            added: keys(|found| &found.added),
            removed: keys(|found| &found.removed),
            changed: keys(|found| &found.changed),
            error,
            synced: false,
        }
    }
}

pub(super) fn run_sync(args: SyncArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_sync_with(args, &HttpTemplateSourceBuilder, &mut stdout)
}

pub(super) fn run_sync_with(
    args: SyncArgs,
    builder: &dyn TemplateSourceBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let report = execute_sync(args, builder)?;
    write_json(writer, &report)
}

fn execute_sync(
    args: SyncArgs,
    builder: &dyn TemplateSourceBuilder,
) -> Result<SyncReport, CliError> {
    let config = args.into_config()?;
    require_existing(&config.catalog, ARG_SYNC_CATALOG)?;
    let catalog = SqliteSportCatalog::open(config.catalog.as_std_path())?;
    let templates = builder.build(&config)?;
    let mut manager = SportManager::load(&catalog, &catalog, templates, LogNotifier)?;
    let names = selected_sports(&config, &manager);

    let mut sports = Vec::with_capacity(names.len());
    for name in names {
        let status = manager.sync_status(&name)?;
        let mut entry = SportSyncEntry::from_status(&name, &status);
        if config.apply && matches!(status, SyncStatus::OutOfSync(_)) {
            manager.sync_sport(&name)?;
            info!("synced {name} with its template");
            entry.synced = true;
        }
        sports.push(entry);
    }
    Ok(SyncReport { sports })
}

fn selected_sports<W, T, N>(config: &SyncConfig, manager: &SportManager<W, T, N>) -> Vec<String>
where
    W: SportCatalogWriter,
    T: TemplateSource,
    N: Notifier,
{
    if config.sports.is_empty() {
        manager
            .sports()
            .iter()
            .map(|sport| sport.name().to_owned())
            .collect()
    } else {
        config.sports.clone()
    }
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<SyncConfig, CliError> {
    let merged = SyncArgs::merge_from_layers(layers).map_err(CliError::from)?;
    SyncConfig::try_from(merged)
}
