mod common;

use common::{incident, FakeStore};
use futures::executor::block_on;
use futures::task::noop_waker;
use relief_core::{
    IncidentStatus, IncidentType, NoticeKind, ReportForm, ReportingWorkflow, Severity,
    SharedRegistry, SubmissionError, ValidationError,
};
use std::future::Future;
use std::task::Context;

fn bridge_collapse_form() -> ReportForm {
    ReportForm {
        title: "Bridge collapse".to_string(),
        kind: IncidentType::Flood,
        severity: Severity::Critical,
        latitude: String::new(),
        longitude: String::new(),
        ..ReportForm::default()
    }
}

#[test]
fn submit_prepends_store_record_and_resets_form() {
    let registry = SharedRegistry::new();
    registry.replace_all(vec![incident("old", "Older cyclone")]);
    let workflow = ReportingWorkflow::new(FakeStore::new(), registry.clone());

    let mut form = bridge_collapse_form();
    let created = block_on(workflow.submit(&mut form)).unwrap();

    let incidents = registry.snapshot();
    assert_eq!(incidents.len(), 2);
    assert_eq!(incidents[0], created);
    assert_eq!(created.id.as_str(), "srv-1");
    assert_eq!(form, ReportForm::default());

    let notice = workflow.last_notice().unwrap();
    assert_eq!(notice.kind, NoticeKind::Success);
    assert_eq!(notice.message, "Incident reported successfully!");
}

#[test]
fn blank_coordinates_become_absent_with_reported_status() {
    let workflow = ReportingWorkflow::new(FakeStore::new(), SharedRegistry::new());
    let mut form = bridge_collapse_form();

    let created = block_on(workflow.submit(&mut form)).unwrap();
    assert_eq!(created.latitude, None);
    assert_eq!(created.longitude, None);
    assert_eq!(created.status, IncidentStatus::Reported);
    assert_eq!(created.severity, Severity::Critical);
}

#[test]
fn unparseable_coordinates_are_dropped_not_rejected() {
    let workflow = ReportingWorkflow::new(FakeStore::new(), SharedRegistry::new());
    let mut form = ReportForm {
        latitude: "12,5".to_string(),
        longitude: " 77.25 ".to_string(),
        ..bridge_collapse_form()
    };

    let created = block_on(workflow.submit(&mut form)).unwrap();
    assert_eq!(created.latitude, None);
    assert_eq!(created.longitude, Some(77.25));
    assert_eq!(workflow.store().calls(), 1);
}

#[test]
fn failed_submission_leaves_registry_and_draft_untouched() {
    let registry = SharedRegistry::new();
    registry.replace_all(vec![incident("a", "Alpha"), incident("b", "Beta")]);
    let before = registry.snapshot();
    let store = FakeStore::new();
    store.fail_calls(true);
    let workflow = ReportingWorkflow::new(store, registry.clone());

    let mut form = bridge_collapse_form();
    let draft = form.clone();
    let err = block_on(workflow.submit(&mut form)).unwrap_err();

    assert!(matches!(err, SubmissionError::Remote(_)));
    assert_eq!(registry.snapshot(), before);
    assert_eq!(form, draft);
    let notice = workflow.last_notice().unwrap();
    assert_eq!(notice.kind, NoticeKind::Failure);
    assert_eq!(notice.message, "Failed to report incident. Please try again.");
}

#[test]
fn retry_after_failure_succeeds_with_preserved_draft() {
    let registry = SharedRegistry::new();
    let workflow = ReportingWorkflow::new(FakeStore::new(), registry.clone());
    let mut form = bridge_collapse_form();

    workflow.store().fail_calls(true);
    assert!(block_on(workflow.submit(&mut form)).is_err());
    assert!(registry.is_empty());

    workflow.store().fail_calls(false);
    let created = block_on(workflow.submit(&mut form)).unwrap();
    assert_eq!(created.title, "Bridge collapse");
    assert_eq!(registry.len(), 1);
}

#[test]
fn missing_title_fails_without_store_call() {
    let workflow = ReportingWorkflow::new(FakeStore::new(), SharedRegistry::new());
    let mut form = ReportForm::default();

    let err = block_on(workflow.submit(&mut form)).unwrap_err();
    assert!(matches!(
        err,
        SubmissionError::Validation(ValidationError::MissingTitle)
    ));
    assert_eq!(workflow.store().calls(), 0);
    assert!(workflow.registry().is_empty());
}

#[test]
fn identical_submissions_are_not_deduplicated() {
    let registry = SharedRegistry::new();
    let workflow = ReportingWorkflow::new(FakeStore::new(), registry.clone());

    let mut first = bridge_collapse_form();
    let mut second = bridge_collapse_form();
    let (a, b) = block_on(futures::future::join(
        workflow.submit(&mut first),
        workflow.submit(&mut second),
    ));

    let (a, b) = (a.unwrap(), b.unwrap());
    assert_ne!(a.id, b.id);
    assert_eq!(registry.len(), 2);
}

#[test]
fn load_replaces_registry_and_keeps_it_on_failure() {
    let store = FakeStore::with_incidents(vec![incident("x", "X"), incident("y", "Y")]);
    let registry = SharedRegistry::new();
    registry.replace_all(vec![incident("stale", "Stale")]);
    let workflow = ReportingWorkflow::new(store, registry.clone());

    assert_eq!(block_on(workflow.load()).unwrap(), 2);
    let ids: Vec<String> = registry
        .snapshot()
        .iter()
        .map(|i| i.id.to_string())
        .collect();
    assert_eq!(ids, ["x", "y"]);

    workflow.store().fail_calls(true);
    assert!(block_on(workflow.load()).is_err());
    assert_eq!(registry.len(), 2);
}

#[test]
fn create_response_arriving_after_reload_still_merges() {
    let store = FakeStore::with_incidents(vec![incident("I1", "Coastal cyclone")]);
    store.hold_writes(true);
    let registry = SharedRegistry::new();
    let workflow = ReportingWorkflow::new(store, registry.clone());
    let mut form = bridge_collapse_form();

    let waker = noop_waker();
    let mut cx = Context::from_waker(&waker);
    let mut pending = Box::pin(workflow.submit(&mut form));
    assert!(pending.as_mut().poll(&mut cx).is_pending());

    assert_eq!(block_on(workflow.load()).unwrap(), 1);
    workflow.store().hold_writes(false);
    let created = block_on(pending).unwrap();

    let incidents = registry.snapshot();
    assert_eq!(incidents.len(), 2);
    assert_eq!(incidents[0], created);
    assert_eq!(incidents[1].id.as_str(), "I1");
}
