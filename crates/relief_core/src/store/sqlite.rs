//! Embedded SQLite incident store.
//!
//! # Responsibility
//! - Play the remote store's role in-process: assign ids, timestamps and the
//!   initial status, and return canonical records.
//! - Keep SQL details behind the `RemoteStore` contract.
//!
//! # Invariants
//! - Incidents list newest-first by `reported_at`, relief updates newest-first
//!   by `updated_at`; insertion order breaks timestamp ties.
//! - A relief update is only stored against an existing incident.

use crate::model::incident::{
    Incident, IncidentId, IncidentStatus, IncidentType, NewIncident, Severity,
};
use crate::model::relief::{NewReliefUpdate, ReliefUpdate, ReliefUpdateId};
use crate::store::{RemoteError, RemoteResult, RemoteStore};
use async_trait::async_trait;
use chrono::Utc;
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use uuid::Uuid;

const INCIDENT_SELECT_SQL: &str = "SELECT
    id,
    title,
    type,
    description,
    latitude,
    longitude,
    severity,
    status,
    reported_at
FROM incidents";

const RELIEF_SELECT_SQL: &str = "SELECT
    id,
    incident_id,
    description,
    food_kits,
    medical_kits,
    people_helped,
    updated_at
FROM relief_updates";

/// `RemoteStore` over a migrated SQLite connection.
pub struct SqliteIncidentStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteIncidentStore<'conn> {
    /// Wraps a connection returned by `db::open_db*`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn get_incident(&self, id: &IncidentId) -> RemoteResult<Option<Incident>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{INCIDENT_SELECT_SQL} WHERE id = ?1;"))?;
        let incident = stmt
            .query_row([id.as_str()], |row| Ok(parse_incident_row(row)))
            .optional()?
            .transpose()?;

        let Some(mut incident) = incident else {
            return Ok(None);
        };
        let mut stmt = self.conn.prepare(&format!(
            "{RELIEF_SELECT_SQL} WHERE incident_id = ?1 ORDER BY updated_at DESC, rowid DESC;"
        ))?;
        let mut rows = stmt.query([id.as_str()])?;
        while let Some(row) = rows.next()? {
            incident.relief_updates.push(parse_relief_row(row)?);
        }
        Ok(Some(incident))
    }

    fn incident_exists(&self, id: &IncidentId) -> RemoteResult<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM incidents WHERE id = ?1;",
                [id.as_str()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

#[async_trait(?Send)]
impl RemoteStore for SqliteIncidentStore<'_> {
    async fn list_incidents(&self) -> RemoteResult<Vec<Incident>> {
        let mut updates_by_incident: HashMap<String, Vec<ReliefUpdate>> = HashMap::new();
        let mut stmt = self.conn.prepare(&format!(
            "{RELIEF_SELECT_SQL} ORDER BY updated_at DESC, rowid DESC;"
        ))?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let update = parse_relief_row(row)?;
            updates_by_incident
                .entry(update.incident_id.as_str().to_string())
                .or_default()
                .push(update);
        }

        let mut stmt = self.conn.prepare(&format!(
            "{INCIDENT_SELECT_SQL} ORDER BY reported_at DESC, rowid DESC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut incidents = Vec::new();
        while let Some(row) = rows.next()? {
            let mut incident = parse_incident_row(row)?;
            incident.relief_updates = updates_by_incident
                .remove(incident.id.as_str())
                .unwrap_or_default();
            incidents.push(incident);
        }
        Ok(incidents)
    }

    async fn create_incident(&self, draft: &NewIncident) -> RemoteResult<Incident> {
        let id = IncidentId::new(Uuid::new_v4().to_string());
        self.conn.execute(
            "INSERT INTO incidents (
                id,
                title,
                type,
                description,
                latitude,
                longitude,
                severity,
                status,
                reported_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                id.as_str(),
                draft.title.as_str(),
                draft.kind.as_str(),
                draft.description.as_deref(),
                draft.latitude,
                draft.longitude,
                draft.severity.as_str(),
                draft.status().as_str(),
                Utc::now().timestamp_millis(),
            ],
        )?;
        info!("event=incident_stored module=store.sqlite status=ok incident_id={id}");

        self.get_incident(&id)?
            .ok_or_else(|| RemoteError::Decode(format!("created incident {id} missing on read-back")))
    }

    async fn add_relief(
        &self,
        incident_id: &IncidentId,
        draft: &NewReliefUpdate,
    ) -> RemoteResult<ReliefUpdate> {
        if !self.incident_exists(incident_id)? {
            return Err(RemoteError::NotFound(incident_id.clone()));
        }

        let update = ReliefUpdate {
            id: ReliefUpdateId::new(Uuid::new_v4().to_string()),
            incident_id: incident_id.clone(),
            description: draft.description.clone(),
            food_kits: draft.food_kits,
            medical_kits: draft.medical_kits,
            people_helped: draft.people_helped,
            updated_at: Some(Utc::now().timestamp_millis()),
        };
        self.conn.execute(
            "INSERT INTO relief_updates (
                id,
                incident_id,
                description,
                food_kits,
                medical_kits,
                people_helped,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                update.id.as_str(),
                update.incident_id.as_str(),
                update.description.as_str(),
                update.food_kits,
                update.medical_kits,
                update.people_helped,
                update.updated_at,
            ],
        )?;
        info!(
            "event=relief_stored module=store.sqlite status=ok incident_id={} update_id={}",
            update.incident_id, update.id
        );
        Ok(update)
    }
}

fn parse_incident_row(row: &Row<'_>) -> RemoteResult<Incident> {
    let id: String = row.get("id")?;
    let type_text: String = row.get("type")?;
    let kind = type_text
        .parse::<IncidentType>()
        .map_err(|err| RemoteError::Decode(format!("incidents.type for {id}: {err}")))?;
    let severity_text: String = row.get("severity")?;
    let severity = severity_text
        .parse::<Severity>()
        .map_err(|err| RemoteError::Decode(format!("incidents.severity for {id}: {err}")))?;
    let status: String = row.get("status")?;

    Ok(Incident {
        title: row.get("title")?,
        kind,
        description: row.get("description")?,
        latitude: row.get("latitude")?,
        longitude: row.get("longitude")?,
        severity,
        status: IncidentStatus::from(status),
        reported_at: row.get("reported_at")?,
        relief_updates: Vec::new(),
        id: IncidentId::new(id),
    })
}

fn parse_relief_row(row: &Row<'_>) -> RemoteResult<ReliefUpdate> {
    let id: String = row.get("id")?;
    Ok(ReliefUpdate {
        incident_id: IncidentId::new(row.get::<_, String>("incident_id")?),
        description: row.get("description")?,
        food_kits: row.get("food_kits")?,
        medical_kits: row.get("medical_kits")?,
        people_helped: row.get("people_helped")?,
        updated_at: row.get("updated_at")?,
        id: ReliefUpdateId::new(id),
    })
}
