//! In-memory incident registry.
//!
//! # Responsibility
//! - Hold the client's single source of truth for known incidents.
//! - Expose a small mutation API; the underlying sequence is never handed out
//!   mutably.
//!
//! # Invariants
//! - Incidents are ordered most-recently-known-first.
//! - Records are only ever inserted or replaced whole, as the store returned
//!   them. The one in-place change is prepending a confirmed relief update.
//! - `SharedRegistry` holds its lock for exactly one mutation and never across
//!   an await point.

use crate::model::incident::{Incident, IncidentId};
use crate::model::relief::ReliefUpdate;
use log::debug;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Ordered collection of incidents known to the client.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncidentRegistry {
    incidents: Vec<Incident>,
}

impl IncidentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every incident with a fresh store listing, keeping its order.
    pub fn replace_all(&mut self, incidents: Vec<Incident>) {
        debug!(
            "event=registry_replace module=registry status=ok previous={} current={}",
            self.incidents.len(),
            incidents.len()
        );
        self.incidents = incidents;
    }

    /// Places a just-created incident at the front.
    pub fn prepend(&mut self, incident: Incident) {
        debug!(
            "event=registry_prepend module=registry status=ok incident_id={}",
            incident.id
        );
        self.incidents.insert(0, incident);
    }

    /// Prepends `update` to the updates of incident `incident_id`.
    ///
    /// Returns `false` and leaves the registry untouched when the incident is
    /// not present; a stale registry is expected, not an error.
    pub fn append_relief(&mut self, incident_id: &IncidentId, update: ReliefUpdate) -> bool {
        match self.incidents.iter_mut().find(|i| &i.id == incident_id) {
            Some(incident) => {
                incident.relief_updates.insert(0, update);
                true
            }
            None => {
                debug!(
                    "event=registry_append_relief module=registry status=skip reason=incident_absent incident_id={incident_id}"
                );
                false
            }
        }
    }

    pub fn incidents(&self) -> &[Incident] {
        &self.incidents
    }

    pub fn get(&self, incident_id: &IncidentId) -> Option<&Incident> {
        self.incidents.iter().find(|i| &i.id == incident_id)
    }

    pub fn len(&self) -> usize {
        self.incidents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty()
    }
}

/// Cloneable, thread-safe handle to one `IncidentRegistry`.
///
/// Workflows on any thread mutate the same registry through this handle.
#[derive(Debug, Clone, Default)]
pub struct SharedRegistry {
    inner: Arc<Mutex<IncidentRegistry>>,
}

impl SharedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_registry(registry: IncidentRegistry) -> Self {
        Self {
            inner: Arc::new(Mutex::new(registry)),
        }
    }

    pub fn replace_all(&self, incidents: Vec<Incident>) {
        self.lock().replace_all(incidents);
    }

    pub fn prepend(&self, incident: Incident) {
        self.lock().prepend(incident);
    }

    pub fn append_relief(&self, incident_id: &IncidentId, update: ReliefUpdate) -> bool {
        self.lock().append_relief(incident_id, update)
    }

    /// Runs `f` against a consistent view of the registry.
    pub fn with<T>(&self, f: impl FnOnce(&IncidentRegistry) -> T) -> T {
        f(&*self.lock())
    }

    /// Copies the current incident sequence.
    pub fn snapshot(&self) -> Vec<Incident> {
        self.with(|registry| registry.incidents().to_vec())
    }

    pub fn len(&self) -> usize {
        self.with(IncidentRegistry::len)
    }

    pub fn is_empty(&self) -> bool {
        self.with(IncidentRegistry::is_empty)
    }

    // Each mutation is a single call, so a poisoned guard still holds a whole
    // registry.
    fn lock(&self) -> MutexGuard<'_, IncidentRegistry> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
