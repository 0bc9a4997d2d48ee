//! JSON wire shapes exchanged with the remote store.
//!
//! # Responsibility
//! - Decode store responses into canonical model records.
//! - Encode create payloads in the store's camelCase schema.
//!
//! # Invariants
//! - Relief update text arrives as `updateInfo` or `description`, the
//!   timestamp as `updatedAt` or `timestamp`. Both spellings are accepted and
//!   folded into the canonical fields here, so nothing downstream branches on
//!   naming. Neither spelling is treated as authoritative: the first non-blank
//!   candidate wins.
//! - Missing or null counts decode as zero; a missing update list decodes as
//!   empty.
//! - An update always belongs to the incident it is embedded in or was
//!   posted to, whatever `incidentId` the body carries.

use crate::model::incident::{Incident, IncidentId, IncidentStatus, IncidentType, NewIncident, Severity};
use crate::model::relief::{
    clamp_count, coerce_count, NewReliefUpdate, ReliefUpdate, ReliefUpdateId,
};
use crate::store::{RemoteError, RemoteResult};
use chrono::{DateTime, NaiveDateTime};
use log::warn;
use serde::{Deserialize, Serialize};

/// Decodes a full incident listing.
///
/// A record with an unknown type or severity is skipped so the rest of the
/// listing still loads.
pub fn decode_incidents(body: &[u8]) -> RemoteResult<Vec<Incident>> {
    let items: Vec<IncidentWire> = parse(body)?;
    Ok(items
        .into_iter()
        .filter_map(|item| match item.into_incident() {
            Ok(incident) => Some(incident),
            Err(err) => {
                warn!("event=incident_decode module=store.wire status=skip error={err}");
                None
            }
        })
        .collect())
}

/// Decodes the incident returned by a create call.
pub fn decode_incident(body: &[u8]) -> RemoteResult<Incident> {
    parse::<IncidentWire>(body)?.into_incident()
}

/// Decodes the update returned by an append call.
///
/// The update is attributed to `incident_id`, the incident it was posted to.
pub fn decode_relief_update(body: &[u8], incident_id: &IncidentId) -> RemoteResult<ReliefUpdate> {
    Ok(parse::<ReliefUpdateWire>(body)?.into_update(incident_id))
}

fn parse<'de, T: Deserialize<'de>>(body: &'de [u8]) -> RemoteResult<T> {
    serde_json::from_slice(body).map_err(|err| RemoteError::Decode(err.to_string()))
}

/// Body of `POST /incidents`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIncidentPayload<'a> {
    pub title: &'a str,
    #[serde(rename = "type")]
    pub kind: IncidentType,
    pub description: &'a str,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub severity: Severity,
    pub status: IncidentStatus,
}

impl<'a> From<&'a NewIncident> for CreateIncidentPayload<'a> {
    fn from(draft: &'a NewIncident) -> Self {
        Self {
            title: draft.title.as_str(),
            kind: draft.kind,
            description: draft.description.as_deref().unwrap_or_default(),
            latitude: draft.latitude,
            longitude: draft.longitude,
            severity: draft.severity,
            status: draft.status(),
        }
    }
}

/// Body of `POST /incidents/{id}/relief`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddReliefPayload<'a> {
    pub description: &'a str,
    pub food_kits: u32,
    pub medical_kits: u32,
    pub people_helped: u32,
}

impl<'a> From<&'a NewReliefUpdate> for AddReliefPayload<'a> {
    fn from(draft: &'a NewReliefUpdate) -> Self {
        Self {
            description: draft.description.as_str(),
            food_kits: draft.food_kits,
            medical_kits: draft.medical_kits,
            people_helped: draft.people_helped,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncidentWire {
    id: WireId,
    #[serde(default)]
    title: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
    severity: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    reported_at: Option<WireTimestamp>,
    #[serde(default)]
    relief_updates: Option<Vec<ReliefUpdateWire>>,
}

impl IncidentWire {
    fn into_incident(self) -> RemoteResult<Incident> {
        let id = IncidentId::new(self.id.into_string());
        let kind = self
            .kind
            .parse::<IncidentType>()
            .map_err(|err| RemoteError::Decode(format!("incident {id}: {err}")))?;
        let severity = self
            .severity
            .parse::<Severity>()
            .map_err(|err| RemoteError::Decode(format!("incident {id}: {err}")))?;
        let relief_updates = self
            .relief_updates
            .unwrap_or_default()
            .into_iter()
            .map(|update| update.into_update(&id))
            .collect();

        Ok(Incident {
            title: self.title,
            kind,
            description: self.description.filter(|value| !value.trim().is_empty()),
            latitude: self.latitude,
            longitude: self.longitude,
            severity,
            status: self.status.map(IncidentStatus::from).unwrap_or_default(),
            reported_at: self.reported_at.and_then(WireTimestamp::epoch_ms),
            relief_updates,
            id,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReliefUpdateWire {
    id: WireId,
    #[serde(default)]
    update_info: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    food_kits: Option<WireCount>,
    #[serde(default)]
    medical_kits: Option<WireCount>,
    #[serde(default)]
    people_helped: Option<WireCount>,
    #[serde(default)]
    updated_at: Option<WireTimestamp>,
    #[serde(default)]
    timestamp: Option<WireTimestamp>,
}

impl ReliefUpdateWire {
    /// `owner` is the incident the update is embedded in or was posted to;
    /// any `incidentId` in the body is ignored.
    fn into_update(self, owner: &IncidentId) -> ReliefUpdate {
        let id = ReliefUpdateId::new(self.id.into_string());
        let description = [self.update_info, self.description]
            .into_iter()
            .flatten()
            .find(|text| !text.trim().is_empty())
            .unwrap_or_default();
        let updated_at = [self.updated_at, self.timestamp]
            .into_iter()
            .flatten()
            .find_map(WireTimestamp::epoch_ms);

        ReliefUpdate {
            id,
            incident_id: owner.clone(),
            description,
            food_kits: WireCount::resolve(self.food_kits),
            medical_kits: WireCount::resolve(self.medical_kits),
            people_helped: WireCount::resolve(self.people_helped),
            updated_at,
        }
    }
}

/// Identifiers may be strings or integers depending on the store backend.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireId {
    Text(String),
    Number(i64),
}

impl WireId {
    fn into_string(self) -> String {
        match self {
            Self::Text(value) => value,
            Self::Number(value) => value.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireCount {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl WireCount {
    /// Coerces to a non-negative count; anything unusable is zero.
    fn resolve(value: Option<Self>) -> u32 {
        match value {
            Some(Self::Integer(value)) => clamp_count(value),
            Some(Self::Float(value)) if value.is_finite() => clamp_count(value.trunc() as i64),
            Some(Self::Text(text)) => coerce_count(&text),
            _ => 0,
        }
    }
}

/// Timestamps arrive as epoch milliseconds or as date-time text.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireTimestamp {
    Millis(i64),
    Float(f64),
    Text(String),
}

impl WireTimestamp {
    fn epoch_ms(self) -> Option<i64> {
        match self {
            Self::Millis(value) => Some(value),
            Self::Float(value) if value.is_finite() => Some(value.trunc() as i64),
            Self::Float(_) => None,
            Self::Text(text) => parse_timestamp_text(text.trim()),
        }
    }
}

fn parse_timestamp_text(text: &str) -> Option<i64> {
    if text.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.timestamp_millis());
    }
    // Zone-less text is taken as UTC.
    if let Ok(parsed) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(parsed.and_utc().timestamp_millis());
    }
    text.parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::{
        decode_incident, decode_incidents, decode_relief_update, AddReliefPayload,
        CreateIncidentPayload,
    };
    use crate::model::incident::{IncidentId, IncidentStatus, IncidentType, NewIncident, Severity};
    use crate::model::relief::NewReliefUpdate;
    use crate::store::RemoteError;

    #[test]
    fn decodes_listing_with_embedded_updates_and_both_namings() {
        let body = br#"[{
            "id": "inc-1",
            "title": "River overflow",
            "type": "Flood",
            "severity": "High",
            "status": "InProgress",
            "reportedAt": "2026-03-01T08:30:00Z",
            "reliefUpdates": [
                {"id": "u-2", "description": "Boats deployed", "peopleHelped": 40, "updatedAt": 1772355600000},
                {"id": "u-1", "updateInfo": "Sandbags", "foodKits": "12", "timestamp": "2026-03-01T09:00:00Z"}
            ]
        }]"#;

        let incidents = decode_incidents(body).unwrap();
        assert_eq!(incidents.len(), 1);
        let incident = &incidents[0];
        assert_eq!(incident.kind, IncidentType::Flood);
        assert_eq!(incident.status, IncidentStatus::InProgress);
        assert_eq!(incident.reported_at, Some(1_772_353_800_000));
        assert_eq!(incident.relief_updates.len(), 2);

        let first = &incident.relief_updates[0];
        assert_eq!(first.incident_id, IncidentId::new("inc-1"));
        assert_eq!(first.description, "Boats deployed");
        assert_eq!(first.food_kits, 0);
        assert_eq!(first.people_helped, 40);

        let second = &incident.relief_updates[1];
        assert_eq!(second.description, "Sandbags");
        assert_eq!(second.food_kits, 12);
        assert_eq!(second.updated_at, Some(1_772_355_600_000));
    }

    #[test]
    fn missing_update_list_and_status_use_defaults() {
        let body = br#"{"id": 7, "title": "Brush fire", "type": "fire", "severity": "low"}"#;
        let incident = decode_incident(body).unwrap();
        assert_eq!(incident.id, IncidentId::new("7"));
        assert!(incident.relief_updates.is_empty());
        assert_eq!(incident.status, IncidentStatus::Reported);
        assert_eq!(incident.reported_at, None);
    }

    #[test]
    fn alternate_text_field_wins_when_conventional_one_is_blank() {
        let body = br#"{"id": "u-9", "description": "  ", "updateInfo": "Water purifiers handed out"}"#;
        let update = decode_relief_update(body, &IncidentId::new("inc-3")).unwrap();
        assert_eq!(update.description, "Water purifiers handed out");
        assert_eq!(update.incident_id, IncidentId::new("inc-3"));
        assert_eq!(update.updated_at, None);
    }

    #[test]
    fn posted_update_reads_update_info_and_timestamp_names() {
        let body = br#"{"id": 41, "updateInfo": "Generator delivered", "foodKits": "3", "timestamp": 1700000000000}"#;
        let update = decode_relief_update(body, &IncidentId::new("inc-2")).unwrap();
        assert_eq!(update.id.as_str(), "41");
        assert_eq!(update.description, "Generator delivered");
        assert_eq!(update.food_kits, 3);
        assert_eq!(update.updated_at, Some(1_700_000_000_000));
    }

    #[test]
    fn negative_and_null_counts_decode_as_zero() {
        let body = br#"{"id": "u-1", "incidentId": "inc-1", "description": "x",
            "foodKits": -4, "medicalKits": null, "peopleHelped": 3.9}"#;
        let update = decode_relief_update(body, &IncidentId::new("inc-1")).unwrap();
        assert_eq!(update.food_kits, 0);
        assert_eq!(update.medical_kits, 0);
        assert_eq!(update.people_helped, 3);
    }

    #[test]
    fn embedded_update_is_attributed_to_its_parent() {
        let body = br#"[{
            "id": "inc-1", "title": "Flood", "type": "Flood", "severity": "Low",
            "reliefUpdates": [{"id": "u-1", "incidentId": "inc-9", "description": "Tents"}]
        }]"#;
        let incidents = decode_incidents(body).unwrap();
        assert_eq!(incidents[0].relief_updates[0].incident_id, IncidentId::new("inc-1"));
    }

    #[test]
    fn posted_update_is_attributed_to_the_target_incident() {
        let body = br#"{"id": "u-1", "incidentId": "inc-9", "description": "Tents"}"#;
        let update = decode_relief_update(body, &IncidentId::new("inc-1")).unwrap();
        assert_eq!(update.incident_id, IncidentId::new("inc-1"));
    }

    #[test]
    fn listing_skips_records_with_unknown_labels() {
        let body = br#"[
            {"id": "a", "title": "Twister", "type": "Tornado", "severity": "Low"},
            {"id": "b", "title": "Flood", "type": "Flood", "severity": "Extreme"},
            {"id": "c", "title": "Quake", "type": "Earthquake", "severity": "High"}
        ]"#;
        let incidents = decode_incidents(body).unwrap();
        assert_eq!(incidents.len(), 1);
        assert_eq!(incidents[0].id, IncidentId::new("c"));
    }

    #[test]
    fn unknown_incident_type_is_a_decode_error() {
        let body = br#"{"id": "x", "title": "t", "type": "Tornado", "severity": "Low"}"#;
        let err = decode_incident(body).unwrap_err();
        assert!(matches!(err, RemoteError::Decode(message) if message.contains("Tornado")));
    }

    #[test]
    fn create_payload_forces_reported_status_and_null_coordinates() {
        let draft = NewIncident {
            title: "Bridge collapse".to_string(),
            kind: IncidentType::Flood,
            description: None,
            latitude: None,
            longitude: None,
            severity: Severity::Critical,
        };
        let json = serde_json::to_value(CreateIncidentPayload::from(&draft)).unwrap();
        assert_eq!(json["type"], "Flood");
        assert_eq!(json["severity"], "Critical");
        assert_eq!(json["status"], "Reported");
        assert_eq!(json["description"], "");
        assert!(json["latitude"].is_null());
        assert!(json["longitude"].is_null());
    }

    #[test]
    fn relief_payload_uses_camel_case_counts() {
        let draft = NewReliefUpdate {
            description: "Distributed food".to_string(),
            food_kits: 10,
            medical_kits: 0,
            people_helped: 25,
        };
        let json = serde_json::to_value(AddReliefPayload::from(&draft)).unwrap();
        assert_eq!(json["foodKits"], 10);
        assert_eq!(json["medicalKits"], 0);
        assert_eq!(json["peopleHelped"], 25);
    }
}
