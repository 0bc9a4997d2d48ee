//! Relief tracking workflow.
//!
//! # Invariants
//! - A blank incident selection fails before any store call.
//! - Counts are coerced, never rejected: blank or non-numeric is zero,
//!   fractions truncate, negatives clamp to zero.
//! - The update reaches the registry only after the store confirms it.

use crate::model::incident::IncidentId;
use crate::model::relief::{coerce_count, NewReliefUpdate, ReliefUpdate};
use crate::registry::SharedRegistry;
use crate::store::RemoteStore;
use crate::workflow::{reload_registry, Notice, NoticeSlot, SubmissionError, ValidationError};
use log::{error, info, warn};
use std::time::Instant;

pub const RECORDED_MESSAGE: &str = "Relief update recorded.";
pub const RECORD_FAILED_MESSAGE: &str = "Failed to add update. Please try again.";

/// Raw state of the relief form; counts hold the text of numeric inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReliefForm {
    pub description: String,
    pub food_kits: String,
    pub medical_kits: String,
    pub people_helped: String,
}

impl Default for ReliefForm {
    fn default() -> Self {
        Self::with_counts("", 0, 0, 0)
    }
}

impl ReliefForm {
    pub fn with_counts(
        description: impl Into<String>,
        food_kits: u32,
        medical_kits: u32,
        people_helped: u32,
    ) -> Self {
        Self {
            description: description.into(),
            food_kits: food_kits.to_string(),
            medical_kits: medical_kits.to_string(),
            people_helped: people_helped.to_string(),
        }
    }

    /// Coerces the form into an append payload.
    pub fn to_new_update(&self) -> NewReliefUpdate {
        NewReliefUpdate {
            description: self.description.trim().to_string(),
            food_kits: coerce_count(&self.food_kits),
            medical_kits: coerce_count(&self.medical_kits),
            people_helped: coerce_count(&self.people_helped),
        }
    }
}

/// Appends relief updates to incidents and merges confirmed records.
pub struct TrackingWorkflow<S> {
    store: S,
    registry: SharedRegistry,
    notice: NoticeSlot,
}

impl<S: RemoteStore> TrackingWorkflow<S> {
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

    /// Notice left by the most recently finished `add_update`.
    pub fn last_notice(&self) -> Option<Notice> {
        self.notice.latest()
    }

    /// Loads incidents together with their embedded updates.
    pub async fn load(&self) -> Result<usize, SubmissionError> {
        reload_registry(&self.store, &self.registry).await
    }

    /// Logs a relief update against `incident_id`.
    ///
    /// On success the store's update is prepended to the incident in the
    /// registry (skipped silently if the registry no longer holds it) and
    /// `form` is reset.
    ///
    /// # Errors
    /// - `ValidationError::NoIncidentSelected` for a blank `incident_id`,
    ///   before any store call.
    /// - `SubmissionError::Remote` when the store call fails; the registry
    ///   and `form` are left untouched.
    pub async fn add_update(
        &self,
        incident_id: &str,
        form: &mut ReliefForm,
    ) -> Result<ReliefUpdate, SubmissionError> {
        self.notice.clear();

        let incident_id = match incident_id.trim() {
            "" => {
                let err = ValidationError::NoIncidentSelected;
                warn!("event=relief_add module=workflow.relief status=rejected reason={err:?}");
                self.notice.post(Notice::failure(err.to_string()));
                return Err(err.into());
            }
            selected => IncidentId::new(selected),
        };
        let draft = form.to_new_update();

        let started_at = Instant::now();
        match self.store.add_relief(&incident_id, &draft).await {
            Ok(update) => {
                let merged = self.registry.append_relief(&incident_id, update.clone());
                *form = ReliefForm::default();
                info!(
                    "event=relief_add module=workflow.relief status=ok incident_id={incident_id} update_id={} merged={merged} duration_ms={}",
                    update.id,
                    started_at.elapsed().as_millis()
                );
                self.notice.post(Notice::success(RECORDED_MESSAGE));
                Ok(update)
            }
            Err(err) => {
                error!(
                    "event=relief_add module=workflow.relief status=error incident_id={incident_id} duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                self.notice.post(Notice::failure(RECORD_FAILED_MESSAGE));
                Err(err.into())
            }
        }
    }
}
