use futures::executor::block_on;
use relief_core::db::migrations::latest_version;
use relief_core::db::{open_db, open_db_in_memory, DbError};
use relief_core::{
    IncidentId, IncidentStatus, IncidentType, NewIncident, NewReliefUpdate, RemoteError,
    RemoteStore, Severity, SqliteIncidentStore,
};
use rusqlite::Connection;

fn draft(title: &str) -> NewIncident {
    NewIncident {
        title: title.to_string(),
        kind: IncidentType::Earthquake,
        description: Some("Aftershocks reported".to_string()),
        latitude: Some(35.68),
        longitude: None,
        severity: Severity::High,
    }
}

#[test]
fn fresh_database_reaches_latest_schema() {
    let conn = open_db_in_memory().unwrap();
    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, latest_version());
}

#[test]
fn create_assigns_id_status_and_timestamp() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteIncidentStore::new(&conn);

    let created = block_on(store.create_incident(&draft("Quake downtown"))).unwrap();
    assert!(!created.id.as_str().is_empty());
    assert_eq!(created.status, IncidentStatus::Reported);
    assert!(created.reported_at.is_some());
    assert_eq!(created.latitude, Some(35.68));
    assert_eq!(created.longitude, None);
    assert!(created.relief_updates.is_empty());
}

#[test]
fn listing_is_newest_first_with_embedded_updates() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteIncidentStore::new(&conn);

    let first = block_on(store.create_incident(&draft("First"))).unwrap();
    let second = block_on(store.create_incident(&draft("Second"))).unwrap();
    let older = NewReliefUpdate {
        description: "Tents".to_string(),
        food_kits: 4,
        ..NewReliefUpdate::default()
    };
    let newer = NewReliefUpdate {
        description: "Water".to_string(),
        people_helped: 12,
        ..NewReliefUpdate::default()
    };
    block_on(store.add_relief(&first.id, &older)).unwrap();
    block_on(store.add_relief(&first.id, &newer)).unwrap();

    let listed = block_on(store.list_incidents()).unwrap();
    let ids: Vec<&IncidentId> = listed.iter().map(|i| &i.id).collect();
    assert_eq!(ids, [&second.id, &first.id]);

    let texts: Vec<&str> = listed[1]
        .relief_updates
        .iter()
        .map(|u| u.description.as_str())
        .collect();
    assert_eq!(texts, ["Water", "Tents"]);
    assert!(listed[1]
        .relief_updates
        .iter()
        .all(|u| u.incident_id == first.id));
    assert!(listed[0].relief_updates.is_empty());
}

#[test]
fn relief_for_unknown_incident_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteIncidentStore::new(&conn);

    let err = block_on(store.add_relief(&IncidentId::new("missing"), &NewReliefUpdate::default()))
        .unwrap_err();
    assert!(matches!(err, RemoteError::NotFound(id) if id.as_str() == "missing"));
}

#[test]
fn reopening_a_file_keeps_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("relief.sqlite3");

    let created = {
        let conn = open_db(&path).unwrap();
        let store = SqliteIncidentStore::new(&conn);
        block_on(store.create_incident(&draft("Persisted"))).unwrap()
    };

    let conn = open_db(&path).unwrap();
    let listed = block_on(SqliteIncidentStore::new(&conn).list_incidents()).unwrap();
    assert_eq!(listed, vec![created]);
}

#[test]
fn newer_schema_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version() + 1))
            .unwrap();
    }

    let err = open_db(&path).unwrap_err();
    assert!(matches!(
        err,
        DbError::SchemaTooNew { found, latest }
            if found == latest_version() + 1 && latest == latest_version()
    ));
}
