//! Command-line interface for ranking sports and syncing sport catalogs.
//!
//! `sportfit rank` scores every enabled sport in a `SQLite` catalog against
//! measure answers supplied as `--value key=raw` and prints the ranking as
//! JSON. `sportfit sync` compares catalog sports with their remote templates
//! and, with `--apply`, writes the template variables back.
//!
//! Options layer CLI flags over environment variables (`SPORTFIT_CMDS_*`)
//! over configuration files, via `ortho_config`.
#![forbid(unsafe_code)]

use std::io::Write;

use camino::Utf8Path;
use clap::{Parser, Subcommand};
use serde::Serialize;

mod error;
mod rank;
mod sync;

pub use error::CliError;

use rank::RankArgs;
use sync::SyncArgs;

pub(crate) const ARG_RANK_CATALOG: &str = "catalog";
pub(crate) const ARG_RANK_RULES: &str = "rules";
pub(crate) const ARG_RANK_VALUE: &str = "value";
pub(crate) const ARG_RANK_TOP: &str = "top";
pub(crate) const ENV_RANK_CATALOG: &str = "SPORTFIT_CMDS_RANK_CATALOG";

pub(crate) const ARG_SYNC_CATALOG: &str = "catalog";
pub(crate) const ARG_SYNC_TEMPLATE_URL: &str = "template-url";
pub(crate) const ARG_SYNC_SPORT: &str = "sport";
pub(crate) const ARG_SYNC_APPLY: &str = "apply";
pub(crate) const ARG_SYNC_TIMEOUT_SECS: &str = "timeout-secs";
pub(crate) const ENV_SYNC_CATALOG: &str = "SPORTFIT_CMDS_SYNC_CATALOG";
pub(crate) const ENV_SYNC_TEMPLATE_URL: &str = "SPORTFIT_CMDS_SYNC_TEMPLATE_URL";

/// Run the sportfit CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when arguments or configuration are invalid, when the
/// catalog or rule files cannot be loaded, or when a command fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Rank(args) => rank::run_rank(args),
        Command::Sync(args) => sync::run_sync(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "sportfit",
    about = "Rank sports against user measures and keep sport catalogs in sync",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rank catalog sports for a set of measure answers.
    Rank(RankArgs),
    /// Compare catalog sports with their remote templates.
    Sync(SyncArgs),
}

/// Require `path` to name an existing regular file.
pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match sportfit_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) if path.is_dir() => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Ok(false) => Err(CliError::MissingSourceFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Write `payload` as pretty-printed JSON followed by a newline.
pub(crate) fn write_json<T: Serialize>(writer: &mut dyn Write, payload: &T) -> Result<(), CliError> {
    let encoded = serde_json::to_string_pretty(payload).map_err(CliError::SerializeOutput)?;
    writer
        .write_all(encoded.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
mod tests;
