//! Persistent catalog backends.
//!
//! The SQLite catalog implements [`CatalogSource`](crate::CatalogSource),
//! [`SportCatalogWriter`](crate::SportCatalogWriter) and
//! [`TemplateSource`](crate::TemplateSource) over a single database file.

#[cfg(feature = "store-sqlite")]
mod schema;
#[cfg(feature = "store-sqlite")]
mod sqlite;

#[cfg(feature = "store-sqlite")]
pub use schema::{CatalogSchemaError, SCHEMA_VERSION};
#[cfg(feature = "store-sqlite")]
pub use sqlite::{SqliteCatalogError, SqliteSportCatalog};
