//! Relief update domain model.
//!
//! # Invariants
//! - Every update belongs to exactly one incident (`incident_id`).
//! - Kit and people counts are non-negative and default to zero.

use crate::model::incident::IncidentId;
use std::fmt::{Display, Formatter};

/// Opaque store-assigned relief update identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReliefUpdateId(String);

impl ReliefUpdateId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ReliefUpdateId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical relief update record as returned by the store.
///
/// Built only by the store layer; `store::wire` folds the alternate field
/// names into `description` and `updated_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReliefUpdate {
    pub id: ReliefUpdateId,
    /// Back-reference to the owning incident.
    pub incident_id: IncidentId,
    pub description: String,
    pub food_kits: u32,
    pub medical_kits: u32,
    pub people_helped: u32,
    /// Unix epoch milliseconds, assigned by the store.
    pub updated_at: Option<i64>,
}

/// Normalized payload for logging a relief update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewReliefUpdate {
    pub description: String,
    pub food_kits: u32,
    pub medical_kits: u32,
    pub people_helped: u32,
}

/// Coerces count text the way numeric inputs do: blank or non-numeric is
/// zero, fractions truncate, negatives clamp to zero.
pub(crate) fn coerce_count(text: &str) -> u32 {
    let trimmed = text.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return clamp_count(value);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => clamp_count(value.trunc() as i64),
        _ => 0,
    }
}

pub(crate) fn clamp_count(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}
