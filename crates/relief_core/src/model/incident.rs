//! Incident domain model.
//!
//! # Responsibility
//! - Define the canonical incident record and its classification enums.
//! - Define the create payload sent to the store.
//!
//! # Invariants
//! - `id`, `reported_at` and `status` are store-computed; the client only
//!   ever replaces them wholesale from a store response.
//! - A create payload always carries status `Reported`.

use crate::model::label_key;
use crate::model::relief::ReliefUpdate;
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Opaque store-assigned incident identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IncidentId(String);

impl IncidentId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for IncidentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IncidentId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for IncidentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Error for labels that do not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub value: String,
}

impl Display for UnknownLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown {} `{}`", self.kind, self.value)
    }
}

impl std::error::Error for UnknownLabel {}

/// Disaster classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum IncidentType {
    #[default]
    Flood,
    Fire,
    Earthquake,
    Cyclone,
}

impl IncidentType {
    pub const ALL: [IncidentType; 4] = [Self::Flood, Self::Fire, Self::Earthquake, Self::Cyclone];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flood => "Flood",
            Self::Fire => "Fire",
            Self::Earthquake => "Earthquake",
            Self::Cyclone => "Cyclone",
        }
    }
}

impl Display for IncidentType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncidentType {
    type Err = UnknownLabel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let key = label_key(value);
        Self::ALL
            .into_iter()
            .find(|kind| label_key(kind.as_str()) == key)
            .ok_or_else(|| UnknownLabel {
                kind: "incident type",
                value: value.to_string(),
            })
    }
}

/// Reported severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = UnknownLabel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let key = label_key(value);
        Self::ALL
            .into_iter()
            .find(|severity| label_key(severity.as_str()) == key)
            .ok_or_else(|| UnknownLabel {
                kind: "severity",
                value: value.to_string(),
            })
    }
}

/// Incident lifecycle state.
///
/// Only `Reported` is ever produced client-side. Transitions happen on the
/// server, which may use states this client does not know; those are kept
/// verbatim in `Other` so a reload never fails on them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(into = "String")]
pub enum IncidentStatus {
    #[default]
    Reported,
    InProgress,
    Resolved,
    Other(String),
}

impl IncidentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Reported => "Reported",
            Self::InProgress => "InProgress",
            Self::Resolved => "Resolved",
            Self::Other(value) => value.as_str(),
        }
    }
}

impl Display for IncidentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for IncidentStatus {
    fn from(value: String) -> Self {
        match label_key(&value).as_str() {
            "reported" => Self::Reported,
            "inprogress" => Self::InProgress,
            "resolved" => Self::Resolved,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for IncidentStatus {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<IncidentStatus> for String {
    fn from(value: IncidentStatus) -> Self {
        match value {
            IncidentStatus::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

/// Canonical incident record as returned by the store.
///
/// Built only by the store layer; JSON decoding goes through `store::wire`.
#[derive(Debug, Clone, PartialEq)]
pub struct Incident {
    pub id: IncidentId,
    pub title: String,
    /// `type` on the wire.
    pub kind: IncidentType,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub severity: Severity,
    pub status: IncidentStatus,
    /// Unix epoch milliseconds, assigned by the store.
    pub reported_at: Option<i64>,
    /// Newest-first.
    pub relief_updates: Vec<ReliefUpdate>,
}

impl Incident {
    /// Sum of people helped across every embedded update.
    pub fn people_helped(&self) -> u64 {
        self.relief_updates
            .iter()
            .map(|update| u64::from(update.people_helped))
            .sum()
    }
}

/// Normalized payload for creating an incident.
///
/// There is no status field: the store always receives `Reported`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewIncident {
    pub title: String,
    pub kind: IncidentType,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub severity: Severity,
}

impl NewIncident {
    /// Status every newly created incident starts with.
    pub fn status(&self) -> IncidentStatus {
        IncidentStatus::Reported
    }
}
