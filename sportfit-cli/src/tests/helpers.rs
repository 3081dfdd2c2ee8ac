//! Test helpers for seeding sport catalogs, rule files, and template sources.

use crate::CliError;
use crate::sync::{SyncConfig, TemplateSourceBuilder};
use camino::{Utf8Path, Utf8PathBuf};
use sportfit_core::{
    Measure, MeasureType, Sport, SportCatalogWriter, SqliteSportCatalog, TemplateSource,
    Variables,
};
use sportfit_data::templates::test_support::StubTemplateSource;
use std::cell::RefCell;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

pub(super) const MARGIN_RULES: &str =
    r#"{"rules": [{"kind": "margin", "measure": "height", "variable": "minHeight"}]}"#;

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    fs::write(path.as_std_path(), contents).expect("write fixture file");
}

/// A temporary workspace holding a seeded `catalog.db`.
#[derive(Debug)]
pub(super) struct CatalogFiles {
    _dir: TempDir,
    root: Utf8PathBuf,
    catalog: Utf8PathBuf,
}

impl CatalogFiles {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        let catalog = root.join("catalog.db");
        seed_catalog(&catalog);
        Self {
            _dir: dir,
            root,
            catalog,
        }
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub(super) fn catalog(&self) -> &Utf8Path {
        &self.catalog
    }

    pub(super) fn write_rules(&self, contents: &str) -> Utf8PathBuf {
        let path = self.root.join("rules.json");
        write_utf8(&path, contents.as_bytes());
        path
    }

    pub(super) fn stored_sport(&self, name: &str) -> Sport {
        use sportfit_core::CatalogSource;

        let catalog = SqliteSportCatalog::open(self.catalog.as_std_path()).expect("reopen catalog");
        catalog
            .list_sports()
            .expect("list sports")
            .into_iter()
            .find(|sport| sport.name() == name)
            .expect("sport is stored")
    }
}

fn seed_catalog(path: &Utf8Path) {
    let catalog = SqliteSportCatalog::open(path.as_std_path()).expect("create catalog");
    for measure in [
        Measure::new("height", MeasureType::Number),
        Measure::new("stamina", MeasureType::Number),
        Measure::new("level", MeasureType::String).with_options(["novice", "pro"]),
    ] {
        catalog.insert_measure(&measure).expect("insert measure");
    }
    for sport in [
        Sport::new(
            "basketball",
            Variables::from([("minHeight", 170), ("stamina", 1)]),
        ),
        Sport::new("chess", Variables::from([("minHeight", 0)])),
        Sport::new(
            "rowing",
            Variables::from([("minHeight", 175), ("stamina", 2)]),
        ),
        Sport::new("curling", Variables::from([("minHeight", "tall")])),
    ] {
        catalog.create_sport(&sport, false).expect("insert sport");
    }
    catalog
        .create_sport(
            &Sport::new("sumo", Variables::from([("minHeight", 150)])),
            true,
        )
        .expect("insert disabled sport");
}

/// Builder handing out a shared stub template source and recording the
/// configuration it was built with.
#[derive(Debug)]
pub(super) struct StubTemplateSourceBuilder {
    source: Arc<StubTemplateSource>,
    built_with: RefCell<Option<SyncConfig>>,
}

impl StubTemplateSourceBuilder {
    pub(super) fn new(source: StubTemplateSource) -> Self {
        Self {
            source: Arc::new(source),
            built_with: RefCell::new(None),
        }
    }

    pub(super) fn source(&self) -> &StubTemplateSource {
        &self.source
    }

    pub(super) fn built_with(&self) -> Option<SyncConfig> {
        self.built_with.borrow().clone()
    }
}

impl TemplateSourceBuilder for StubTemplateSourceBuilder {
    fn build(&self, config: &SyncConfig) -> Result<Box<dyn TemplateSource>, CliError> {
        self.built_with.replace(Some(config.clone()));
        Ok(Box::new(Arc::clone(&self.source)))
    }
}

/// Template variables that add a minimum age to the stored rowing sport.
pub(super) fn rowing_template() -> Variables {
    Variables::from([("minAge", 16), ("minHeight", 175), ("stamina", 2)])
}
