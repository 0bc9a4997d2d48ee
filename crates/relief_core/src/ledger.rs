//! Relief ledger and display projections over the registry.
//!
//! # Responsibility
//! - Flatten every incident's relief updates into `(incident, update)` pairs.
//! - Build display rows for the incident and relief tables.
//!
//! # Invariants
//! - Holds no state: every projection is recomputed from the incidents given.
//! - Pair order is the registry's incident order, then each incident's
//!   newest-first update order. It is not globally time-sorted.
//! - Rendering never fails; absent values render as `"-"`.

use crate::model::incident::Incident;
use crate::model::relief::ReliefUpdate;
use chrono::{DateTime, Utc};

const MISSING_LABEL: &str = "-";

/// One relief update paired with the incident that owns it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedgerEntry<'a> {
    pub incident: &'a Incident,
    pub update: &'a ReliefUpdate,
}

/// Lazily flattens all relief updates across `incidents`.
pub fn entries(incidents: &[Incident]) -> impl Iterator<Item = LedgerEntry<'_>> + '_ {
    incidents.iter().flat_map(|incident| {
        incident
            .relief_updates
            .iter()
            .map(move |update| LedgerEntry { incident, update })
    })
}

/// Row of the recent relief updates table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRow {
    pub update_id: String,
    pub incident_title: String,
    pub text: String,
    pub food_kits: u32,
    pub medical_kits: u32,
    pub people_helped: u32,
    pub time_label: String,
}

impl From<LedgerEntry<'_>> for LedgerRow {
    fn from(entry: LedgerEntry<'_>) -> Self {
        Self {
            update_id: entry.update.id.to_string(),
            incident_title: entry.incident.title.clone(),
            text: entry.update.description.clone(),
            food_kits: entry.update.food_kits,
            medical_kits: entry.update.medical_kits,
            people_helped: entry.update.people_helped,
            time_label: time_label(entry.update.updated_at),
        }
    }
}

/// Display rows for the relief table, in ledger order.
pub fn rows(incidents: &[Incident]) -> Vec<LedgerRow> {
    entries(incidents).map(LedgerRow::from).collect()
}

/// Row of the recent incidents table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentRow {
    pub incident_id: String,
    pub title: String,
    pub kind: String,
    pub severity: String,
    pub status: String,
    pub reported_label: String,
}

impl From<&Incident> for IncidentRow {
    fn from(incident: &Incident) -> Self {
        Self {
            incident_id: incident.id.to_string(),
            title: incident.title.clone(),
            kind: incident.kind.to_string(),
            severity: incident.severity.to_string(),
            status: incident.status.to_string(),
            reported_label: time_label(incident.reported_at),
        }
    }
}

pub fn incident_rows(incidents: &[Incident]) -> Vec<IncidentRow> {
    incidents.iter().map(IncidentRow::from).collect()
}

/// Entry of the incident picker used before logging relief.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentOption {
    pub incident_id: String,
    pub label: String,
}

pub fn incident_options(incidents: &[Incident]) -> Vec<IncidentOption> {
    incidents
        .iter()
        .map(|incident| IncidentOption {
            incident_id: incident.id.to_string(),
            label: format!("{} — {}", incident.title, incident.kind),
        })
        .collect()
}

/// Formats epoch milliseconds as `YYYY-MM-DD HH:MM UTC`, or `"-"`.
pub fn time_label(epoch_ms: Option<i64>) -> String {
    epoch_ms
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|at| at.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| MISSING_LABEL.to_string())
}
