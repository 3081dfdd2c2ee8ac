//! SQLite-backed sport catalog.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::debug;
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

use crate::{
    CatalogError, CatalogMutationError, CatalogSource, Measure, MeasureType, Sport,
    SportCatalogWriter, TemplateFetchError, TemplateSource, Variables,
};

use super::schema::{CatalogSchemaError, initialise_schema};

/// Name given to the blank template sport.
const BLANK_TEMPLATE_NAME: &str = "template";

/// Error raised when opening or reading the SQLite catalog.
#[derive(Debug, Error)]
pub enum SqliteCatalogError {
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path}: {source}")]
    OpenDatabase {
        /// Location of the SQLite database on disk.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// The schema could not be created or has an unexpected version.
    #[error(transparent)]
    Schema(#[from] CatalogSchemaError),
    /// A stored variable map was not valid JSON.
    #[error("failed to parse variables of '{owner}': {source}")]
    InvalidVariables {
        /// Sport or template whose variables failed to parse.
        owner: String,
        /// JSON decoding failure.
        #[source]
        source: serde_json::Error,
    },
    /// A stored measure row could not be decoded.
    #[error("measure '{key}' is invalid: {message}")]
    InvalidMeasure {
        /// Key of the measure row.
        key: String,
        /// What was wrong with it.
        message: String,
    },
    /// Encoding a value for storage failed.
    #[error("failed to encode '{owner}' for storage: {source}")]
    Encode {
        /// Sport, measure or template being written.
        owner: String,
        /// JSON encoding failure.
        #[source]
        source: serde_json::Error,
    },
    /// Generic SQLite error.
    #[error(transparent)]
    Database(#[from] rusqlite::Error),
}

/// Sport catalog persisted in a single SQLite database.
///
/// Reads return sports and measures in insertion order. Sports carry their
/// variables as a JSON object; templates live in `sport_templates` keyed by
/// sport name, and the blank template in `sport_blank_template`.
///
/// # Examples
/// ```
/// use sportfit_core::{
///     CatalogSource, Measure, MeasureType, SportCatalogWriter, SqliteSportCatalog, Sport,
///     Variables,
/// };
///
/// let catalog = SqliteSportCatalog::in_memory()?;
/// catalog.insert_measure(&Measure::new("height", MeasureType::Number))?;
/// catalog.create_sport(&Sport::new("rowing", Variables::from([("minHeight", 175)])), false)?;
///
/// assert_eq!(catalog.list_sports()?[0].name(), "rowing");
/// assert_eq!(catalog.list_measures()?.len(), 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct SqliteSportCatalog {
    connection: Mutex<Connection>,
    location: String,
}

impl fmt::Debug for SqliteSportCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteSportCatalog")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl SqliteSportCatalog {
    /// Open (creating when missing) the catalog stored at `path`.
    ///
    /// # Errors
    /// Returns [`SqliteCatalogError::OpenDatabase`] when the file cannot be
    /// opened and [`SqliteCatalogError::Schema`] when the schema cannot be
    /// prepared.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SqliteCatalogError> {
        let path = path.as_ref();
        let connection =
            Connection::open(path).map_err(|source| SqliteCatalogError::OpenDatabase {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_connection(connection, path.display().to_string())
    }

    /// Open an empty catalog held in memory.
    ///
    /// # Errors
    /// Returns an error when SQLite cannot allocate the database.
    pub fn in_memory() -> Result<Self, SqliteCatalogError> {
        let connection = Connection::open_in_memory()?;
        Self::from_connection(connection, ":memory:".to_owned())
    }

    fn from_connection(
        mut connection: Connection,
        location: String,
    ) -> Result<Self, SqliteCatalogError> {
        initialise_schema(&mut connection)?;
        debug!("opened sport catalog at {location}");
        Ok(Self {
            connection: Mutex::new(connection),
            location,
        })
    }

    /// Where the catalog is stored.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Insert or replace a measure definition.
    ///
    /// # Errors
    /// Returns an error when the options cannot be encoded or the write fails.
    pub fn insert_measure(&self, measure: &Measure) -> Result<(), SqliteCatalogError> {
        let options =
            serde_json::to_string(&measure.options).map_err(|source| SqliteCatalogError::Encode {
                owner: measure.key.clone(),
                source,
            })?;
        self.lock().execute(
            "INSERT INTO measures (key, type, options) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET type = excluded.type, options = excluded.options",
            params![measure.key, measure.measure_type.as_str(), options],
        )?;
        Ok(())
    }

    /// Insert or replace the template of `sport`.
    ///
    /// # Errors
    /// Returns an error when the variables cannot be encoded or the write
    /// fails.
    pub fn insert_template(
        &self,
        sport: &str,
        variables: &Variables,
    ) -> Result<(), SqliteCatalogError> {
        let encoded = encode_variables(sport, variables)?;
        self.lock().execute(
            "INSERT INTO sport_templates (name, variables) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET variables = excluded.variables",
            params![sport, encoded],
        )?;
        Ok(())
    }

    /// Set the variables new sports start from.
    ///
    /// # Errors
    /// Returns an error when the variables cannot be encoded or the write
    /// fails.
    pub fn set_blank_template(&self, variables: &Variables) -> Result<(), SqliteCatalogError> {
        let encoded = encode_variables(BLANK_TEMPLATE_NAME, variables)?;
        self.lock().execute(
            "INSERT INTO sport_blank_template (id, variables) VALUES (1, ?1)
             ON CONFLICT(id) DO UPDATE SET variables = excluded.variables",
            params![encoded],
        )?;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn load_sports(&self) -> Result<Vec<Sport>, SqliteCatalogError> {
        let connection = self.lock();
        let mut statement =
            connection.prepare("SELECT name, variables, disabled FROM sports ORDER BY rowid")?;
        let mut rows = statement.query([])?;
        let mut sports = Vec::new();
        while let Some(row) = rows.next()? {
            let name: String = row.get(0)?;
            let encoded: String = row.get(1)?;
            let disabled: bool = row.get(2)?;
            let variables = decode_variables(&name, &encoded)?;
            sports.push(Sport::new(name, variables).with_disabled(disabled));
        }
        Ok(sports)
    }

    fn load_measures(&self) -> Result<Vec<Measure>, SqliteCatalogError> {
        let connection = self.lock();
        let mut statement =
            connection.prepare("SELECT key, type, options FROM measures ORDER BY rowid")?;
        let mut rows = statement.query([])?;
        let mut measures = Vec::new();
        while let Some(row) = rows.next()? {
            let key: String = row.get(0)?;
            let kind: String = row.get(1)?;
            let options: String = row.get(2)?;
            let measure_type = kind
                .parse::<MeasureType>()
                .map_err(|message| SqliteCatalogError::InvalidMeasure {
                    key: key.clone(),
                    message,
                })?;
            let options: Vec<String> = serde_json::from_str(&options).map_err(|err| {
                SqliteCatalogError::InvalidMeasure {
                    key: key.clone(),
                    message: err.to_string(),
                }
            })?;
            measures.push(Measure::new(key, measure_type).with_options(options));
        }
        Ok(measures)
    }

    fn load_blank_template(&self) -> Result<Sport, SqliteCatalogError> {
        let encoded: Option<String> = self
            .lock()
            .query_row(
                "SELECT variables FROM sport_blank_template WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        let variables = match encoded {
            Some(encoded) => decode_variables(BLANK_TEMPLATE_NAME, &encoded)?,
            None => Variables::new(),
        };
        Ok(Sport::new(BLANK_TEMPLATE_NAME, variables))
    }

    fn load_template(&self, sport: &str) -> Result<Option<Variables>, SqliteCatalogError> {
        let encoded: Option<String> = self
            .lock()
            .query_row(
                "SELECT variables FROM sport_templates WHERE name = ?1",
                [sport],
                |row| row.get(0),
            )
            .optional()?;
        encoded
            .map(|encoded| decode_variables(sport, &encoded))
            .transpose()
    }

    fn update_sport<F>(&self, name: &str, update: F) -> Result<(), CatalogMutationError>
    where
        F: FnOnce(&Connection) -> Result<usize, SqliteCatalogError>,
    {
        let changed = update(&self.lock())
            .map_err(|err| CatalogMutationError::storage(name, err))?;
        if changed == 0 {
            return Err(CatalogMutationError::NotFound {
                name: name.to_owned(),
            });
        }
        Ok(())
    }
}

fn encode_variables(owner: &str, variables: &Variables) -> Result<String, SqliteCatalogError> {
    serde_json::to_string(variables).map_err(|source| SqliteCatalogError::Encode {
        owner: owner.to_owned(),
        source,
    })
}

fn decode_variables(owner: &str, encoded: &str) -> Result<Variables, SqliteCatalogError> {
    serde_json::from_str(encoded).map_err(|source| SqliteCatalogError::InvalidVariables {
        owner: owner.to_owned(),
        source,
    })
}

impl CatalogSource for SqliteSportCatalog {
    fn list_sports(&self) -> Result<Vec<Sport>, CatalogError> {
        self.load_sports().map_err(CatalogError::storage)
    }

    fn sport_template(&self) -> Result<Sport, CatalogError> {
        self.load_blank_template().map_err(CatalogError::storage)
    }

    fn list_measures(&self) -> Result<Vec<Measure>, CatalogError> {
        self.load_measures().map_err(CatalogError::storage)
    }
}

impl SportCatalogWriter for SqliteSportCatalog {
    fn create_sport(&self, sport: &Sport, disabled: bool) -> Result<Sport, CatalogMutationError> {
        let name = sport.name();
        let encoded = encode_variables(name, &sport.variables)
            .map_err(|err| CatalogMutationError::storage(name, err))?;
        let connection = self.lock();
        let exists: Option<i64> = connection
            .query_row("SELECT 1 FROM sports WHERE name = ?1", [name], |row| {
                row.get(0)
            })
            .optional()
            .map_err(|err| CatalogMutationError::storage(name, err))?;
        if exists.is_some() {
            return Err(CatalogMutationError::Duplicate {
                name: name.to_owned(),
            });
        }
        connection
            .execute(
                "INSERT INTO sports (name, variables, disabled) VALUES (?1, ?2, ?3)",
                params![name, encoded, disabled],
            )
            .map_err(|err| CatalogMutationError::storage(name, err))?;
        debug!("stored new sport '{name}'");
        Ok(sport.clone().with_disabled(disabled))
    }

    fn update_sport_variables(
        &self,
        name: &str,
        variables: &Variables,
    ) -> Result<(), CatalogMutationError> {
        let encoded =
            encode_variables(name, variables).map_err(|err| CatalogMutationError::storage(name, err))?;
        self.update_sport(name, |connection| {
            Ok(connection.execute(
                "UPDATE sports SET variables = ?2 WHERE name = ?1",
                params![name, encoded],
            )?)
        })
    }

    fn set_sport_disabled(&self, name: &str, disabled: bool) -> Result<(), CatalogMutationError> {
        self.update_sport(name, |connection| {
            Ok(connection.execute(
                "UPDATE sports SET disabled = ?2 WHERE name = ?1",
                params![name, disabled],
            )?)
        })
    }

    fn delete_sport(&self, name: &str) -> Result<(), CatalogMutationError> {
        self.update_sport(name, |connection| {
            Ok(connection.execute("DELETE FROM sports WHERE name = ?1", [name])?)
        })
    }
}

impl TemplateSource for SqliteSportCatalog {
    fn template_variables(&self, sport: &str) -> Result<Variables, TemplateFetchError> {
        match self.load_template(sport) {
            Ok(Some(variables)) => Ok(variables),
            Ok(None) => Err(TemplateFetchError::NotFound {
                sport: sport.to_owned(),
            }),
            Err(SqliteCatalogError::InvalidVariables { source, .. }) => {
                Err(TemplateFetchError::Parse {
                    message: source.to_string(),
                })
            }
            Err(err) => Err(TemplateFetchError::Unavailable {
                message: err.to_string(),
            }),
        }
    }
}
