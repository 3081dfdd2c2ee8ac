//! Behavioural tests for syncing sports through a remote template source.
//!
//! These tests use [`StubTemplateSource`] to verify behaviour without
//! requiring a running template service.

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use sportfit_core::{Sport, SportSync, SyncError, SyncStatus, TemplateFetchError, Variables};
use sportfit_data::templates::test_support::StubTemplateSource;
use std::cell::RefCell;

/// Result cell holding the outcome of a sync request.
type SyncCell = RefCell<Option<Result<Sport, SyncError>>>;
/// Sync engine under test, absent until a template service is configured.
type SyncSlot = RefCell<Option<SportSync<StubTemplateSource>>>;

#[fixture]
fn sync() -> SyncSlot {
    RefCell::new(None)
}

#[fixture]
fn status() -> RefCell<Option<SyncStatus>> {
    RefCell::new(None)
}

#[fixture]
fn synced() -> SyncCell {
    RefCell::new(None)
}

fn local_rowing() -> Sport {
    Sport::new(
        "rowing",
        Variables::from([("minHeight", 175), ("minWeight", 60)]),
    )
    .with_disabled(true)
}

// --- Given steps ---

#[given("a template service that adds a minimum age of 16 to rowing")]
fn template_adds_age(#[from(sync)] sync: &SyncSlot) {
    *sync.borrow_mut() = Some(SportSync::new(StubTemplateSource::with_variables(
        Variables::from([("minAge", 16), ("minHeight", 175), ("minWeight", 60)]),
    )));
}

#[given("a template service that only defines a minimum height of 175 for rowing")]
fn template_only_height(#[from(sync)] sync: &SyncSlot) {
    *sync.borrow_mut() = Some(SportSync::new(StubTemplateSource::with_variables(
        Variables::from([("minHeight", 175)]),
    )));
}

#[given("a template service that times out")]
fn template_times_out(#[from(sync)] sync: &SyncSlot) {
    *sync.borrow_mut() = Some(SportSync::new(StubTemplateSource::with_error(
        TemplateFetchError::Timeout {
            url: "http://example.com/sports/rowing/template".to_owned(),
            timeout_secs: 10,
        },
    )));
}

#[given("a template service without a template for rowing")]
fn template_missing(#[from(sync)] sync: &SyncSlot) {
    *sync.borrow_mut() = Some(SportSync::new(StubTemplateSource::with_error(
        TemplateFetchError::NotFound {
            sport: "rowing".to_owned(),
        },
    )));
}

// --- When steps ---

#[when("I check rowing against the template")]
fn check_rowing(
    #[from(sync)] sync: &SyncSlot,
    #[from(status)] status: &RefCell<Option<SyncStatus>>,
) {
    let guard = sync.borrow();
    let engine = guard.as_ref().expect("template service must be configured");
    *status.borrow_mut() = Some(engine.status(&local_rowing()));
}

#[when("I sync rowing")]
fn sync_rowing(#[from(sync)] sync: &SyncSlot, #[from(synced)] synced: &SyncCell) {
    let guard = sync.borrow();
    let engine = guard.as_ref().expect("template service must be configured");
    *synced.borrow_mut() = Some(engine.sync(&local_rowing()));
}

// --- Then steps ---

#[then("rowing is reported as out of sync with minAge added")]
fn then_out_of_sync(#[from(status)] status: &RefCell<Option<SyncStatus>>) {
    let borrowed = status.borrow();
    match borrowed.as_ref() {
        Some(SyncStatus::OutOfSync(diff)) => {
            assert_eq!(diff.added.iter().collect::<Vec<_>>(), ["minAge"]);
            assert!(diff.removed.is_empty(), "nothing should be removed");
            assert!(diff.changed.is_empty(), "nothing should change");
        }
        other => panic!("expected OutOfSync, got {other:?}"),
    }
}

#[then("the synced rowing only has a minimum height of 175")]
fn then_only_height(#[from(synced)] synced: &SyncCell) {
    let borrowed = synced.borrow();
    let sport = borrowed
        .as_ref()
        .and_then(|result| result.as_ref().ok())
        .expect("expected a synced sport");
    assert_eq!(sport.variables, Variables::from([("minHeight", 175)]));
    assert_eq!(sport.name(), "rowing");
    assert!(sport.disabled, "sync must keep the disabled flag");
}

#[then("the rowing status is unknown because of a timeout")]
fn then_unknown(#[from(status)] status: &RefCell<Option<SyncStatus>>) {
    let borrowed = status.borrow();
    assert!(
        matches!(
            borrowed.as_ref(),
            Some(SyncStatus::Unknown(TemplateFetchError::Timeout { .. }))
        ),
        "expected Unknown(Timeout), got {borrowed:?}"
    );
}

#[then("rowing still needs syncing")]
fn then_needs_sync(#[from(status)] status: &RefCell<Option<SyncStatus>>) {
    let borrowed = status.borrow();
    let current = borrowed.as_ref().expect("status must be recorded");
    assert!(current.needs_sync());
}

#[then("the sync fails because the template was not found")]
fn then_not_found(#[from(synced)] synced: &SyncCell) {
    let borrowed = synced.borrow();
    assert!(
        matches!(
            borrowed.as_ref(),
            Some(Err(SyncError::Fetch(TemplateFetchError::NotFound { .. })))
        ),
        "expected NotFound, got {borrowed:?}"
    );
}

// --- Scenario registrations ---

macro_rules! register_scenario {
    ($fn_name:ident, $title:literal) => {
        #[scenario(path = "tests/features/template_sync.feature", name = $title)]
        fn $fn_name(sync: SyncSlot, status: RefCell<Option<SyncStatus>>, synced: SyncCell) {
            let _ = (sync, status, synced);
        }
    };
}

register_scenario!(
    template_adds_variable,
    "reporting a sport whose template adds a variable"
);
register_scenario!(
    sync_drops_removed_variables,
    "syncing drops variables the template no longer defines"
);
register_scenario!(
    timeout_is_out_of_sync,
    "treating a timed out template as out of sync"
);
register_scenario!(
    missing_template_rejects_sync,
    "rejecting a sync for a missing template"
);
