//! Catalog schema creation and version checks.

use rusqlite::{Connection, Error as SqliteError, OptionalExtension, Transaction};
use thiserror::Error;

/// Version of the catalog schema this crate reads and writes.
pub const SCHEMA_VERSION: i64 = 1;

/// Create the catalog tables when missing and verify the schema version.
///
/// Variable maps and measure options are stored as JSON text. Catalog order
/// is insertion order (`rowid`).
pub(crate) fn initialise_schema(connection: &mut Connection) -> Result<(), CatalogSchemaError> {
    let transaction = connection
        .transaction()
        .map_err(|source| CatalogSchemaError::Migration {
            step: "begin schema transaction",
            source,
        })?;

    create_tables(&transaction)?;
    ensure_schema_version(&transaction)?;

    transaction
        .commit()
        .map_err(|source| CatalogSchemaError::Migration {
            step: "commit schema transaction",
            source,
        })
}

fn create_tables(transaction: &Transaction<'_>) -> Result<(), CatalogSchemaError> {
    run_migration_step(
        transaction,
        "create sports",
        "CREATE TABLE IF NOT EXISTS sports (
            name TEXT PRIMARY KEY CHECK (length(trim(name)) > 0),
            variables TEXT NOT NULL DEFAULT '{}',
            disabled INTEGER NOT NULL DEFAULT 0
        )",
    )?;
    run_migration_step(
        transaction,
        "create measures",
        "CREATE TABLE IF NOT EXISTS measures (
            key TEXT PRIMARY KEY CHECK (length(trim(key)) > 0),
            type TEXT NOT NULL,
            options TEXT NOT NULL DEFAULT '[]'
        )",
    )?;
    run_migration_step(
        transaction,
        "create sport_templates",
        "CREATE TABLE IF NOT EXISTS sport_templates (
            name TEXT PRIMARY KEY,
            variables TEXT NOT NULL
        ) WITHOUT ROWID",
    )?;
    run_migration_step(
        transaction,
        "create sport_blank_template",
        "CREATE TABLE IF NOT EXISTS sport_blank_template (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            variables TEXT NOT NULL
        )",
    )
}

fn ensure_schema_version(transaction: &Transaction<'_>) -> Result<(), CatalogSchemaError> {
    run_migration_step(
        transaction,
        "create schema version table",
        "CREATE TABLE IF NOT EXISTS catalog_schema_version (
            version INTEGER PRIMARY KEY CHECK (version > 0)
        ) WITHOUT ROWID",
    )?;

    let existing: Option<i64> = transaction
        .query_row(
            "SELECT version FROM catalog_schema_version LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(|source| CatalogSchemaError::Migration {
            step: "read schema version",
            source,
        })?;

    match existing {
        Some(version) if version == SCHEMA_VERSION => Ok(()),
        Some(found) => Err(CatalogSchemaError::VersionMismatch {
            expected: SCHEMA_VERSION,
            found,
        }),
        None => transaction
            .execute(
                "INSERT INTO catalog_schema_version (version) VALUES (?1)",
                [SCHEMA_VERSION],
            )
            .map(|_| ())
            .map_err(|source| CatalogSchemaError::Migration {
                step: "record schema version",
                source,
            }),
    }
}

fn run_migration_step(
    transaction: &Transaction<'_>,
    step: &'static str,
    sql: &str,
) -> Result<(), CatalogSchemaError> {
    transaction
        .execute(sql, [])
        .map(|_| ())
        .map_err(|source| CatalogSchemaError::Migration { step, source })
}

/// Errors raised while preparing the catalog schema.
#[derive(Debug, Error)]
pub enum CatalogSchemaError {
    #[error("failed to execute migration step '{step}'")]
    Migration {
        step: &'static str,
        #[source]
        source: SqliteError,
    },
    #[error(
        "expected catalog schema version {expected} but found {found}; apply migrations before retrying"
    )]
    VersionMismatch { expected: i64, found: i64 },
}
