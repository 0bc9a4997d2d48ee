//! Incident reporting workflow.
//!
//! # Invariants
//! - Status sent to the store is always `Reported`.
//! - Blank or unparseable coordinates are absent, never zero.
//! - The created incident reaches the registry only as the store returned it.
//! - On failure the form keeps the user's draft for a manual retry.

use crate::model::incident::{Incident, IncidentType, NewIncident, Severity};
use crate::registry::SharedRegistry;
use crate::store::RemoteStore;
use crate::workflow::{reload_registry, Notice, NoticeSlot, SubmissionError, ValidationError};
use log::{error, info, warn};
use std::time::Instant;

pub const REPORTED_MESSAGE: &str = "Incident reported successfully!";
pub const REPORT_FAILED_MESSAGE: &str = "Failed to report incident. Please try again.";

/// Raw state of the report form as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportForm {
    pub title: String,
    pub kind: IncidentType,
    pub description: String,
    pub latitude: String,
    pub longitude: String,
    pub severity: Severity,
}

impl ReportForm {
    /// Coerces the form into a create payload.
    ///
    /// Only a blank title is rejected.
    pub fn to_new_incident(&self) -> Result<NewIncident, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        let description = self.description.trim();

        Ok(NewIncident {
            title: title.to_string(),
            kind: self.kind,
            description: (!description.is_empty()).then(|| description.to_string()),
            latitude: parse_coordinate(&self.latitude),
            longitude: parse_coordinate(&self.longitude),
            severity: self.severity,
        })
    }
}

fn parse_coordinate(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Submits new incident reports and merges confirmed records.
pub struct ReportingWorkflow<S> {
    store: S,
    registry: SharedRegistry,
    notice: NoticeSlot,
}

impl<S: RemoteStore> ReportingWorkflow<S> {
    pub fn new(store: S, registry: SharedRegistry) -> Self {
        Self {
            store,
            registry,
            notice: NoticeSlot::default(),
        }
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Notice left by the most recently finished `submit`.
    pub fn last_notice(&self) -> Option<Notice> {
        self.notice.latest()
    }

    /// Loads the recent incidents list.
    pub async fn load(&self) -> Result<usize, SubmissionError> {
        reload_registry(&self.store, &self.registry).await
    }

    /// Validates `form`, creates the incident, and on success prepends the
    /// store's record to the registry and resets `form`.
    ///
    /// # Errors
    /// - `SubmissionError::Validation` before any store call.
    /// - `SubmissionError::Remote` when the store call fails; the registry
    ///   and `form` are left untouched.
    pub async fn submit(&self, form: &mut ReportForm) -> Result<Incident, SubmissionError> {
        self.notice.clear();

        let draft = match form.to_new_incident() {
            Ok(draft) => draft,
            Err(err) => {
                warn!("event=incident_report module=workflow.report status=rejected reason={err:?}");
                self.notice.post(Notice::failure(err.to_string()));
                return Err(err.into());
            }
        };

        let started_at = Instant::now();
        match self.store.create_incident(&draft).await {
            Ok(incident) => {
                self.registry.prepend(incident.clone());
                *form = ReportForm::default();
                info!(
                    "event=incident_report module=workflow.report status=ok incident_id={} duration_ms={}",
                    incident.id,
                    started_at.elapsed().as_millis()
                );
                self.notice.post(Notice::success(REPORTED_MESSAGE));
                Ok(incident)
            }
            Err(err) => {
                error!(
                    "event=incident_report module=workflow.report status=error duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                self.notice.post(Notice::failure(REPORT_FAILED_MESSAGE));
                Err(err.into())
            }
        }
    }
}
