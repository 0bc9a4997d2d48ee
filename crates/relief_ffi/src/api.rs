//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose incident reporting and relief tracking to Dart via FRB.
//! - Hold the process-wide incident registry shared by every screen.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Failures come back as envelopes with `ok = false` and a UI message.
//! - The registry changes only after the embedded store confirms a write.

use futures::executor::block_on;
use log::warn;
use relief_core::config::{default_db_path, DB_PATH_ENV};
use relief_core::db::open_db;
use relief_core::ledger::{self, IncidentRow, LedgerRow};
use relief_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    reload_registry, IncidentType, Notice, ReliefForm, ReportForm, ReportingWorkflow, Severity,
    SharedRegistry, SqliteIncidentStore, TrackingWorkflow,
};
use std::path::PathBuf;
use std::sync::OnceLock;

static STORE_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static REGISTRY: OnceLock<SharedRegistry> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One row of the recent incidents table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentItem {
    pub incident_id: String,
    pub title: String,
    /// `Flood|Fire|Earthquake|Cyclone`.
    pub kind: String,
    pub severity: String,
    pub status: String,
    /// `YYYY-MM-DD HH:MM UTC`, or `-` when unknown.
    pub reported_label: String,
    /// Label for the incident picker, `"{title} — {kind}"`.
    pub option_label: String,
}

/// Incident list envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentListResponse {
    pub ok: bool,
    pub items: Vec<IncidentItem>,
    pub message: String,
}

/// One row of the relief ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerItem {
    pub update_id: String,
    pub incident_title: String,
    pub text: String,
    pub food_kits: u32,
    pub medical_kits: u32,
    pub people_helped: u32,
    pub time_label: String,
}

/// Relief ledger envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerResponse {
    pub items: Vec<LedgerItem>,
    pub message: String,
}

/// Result of a report or relief submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether the store confirmed the write.
    pub ok: bool,
    /// Store-assigned id of the created record.
    pub id: Option<String>,
    /// Notice text for the UI banner.
    pub message: String,
}

impl ActionResponse {
    fn success(notice: Option<Notice>, id: String) -> Self {
        Self {
            ok: true,
            id: Some(id),
            message: notice.map(|n| n.message).unwrap_or_default(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
        }
    }
}

/// Replaces the in-memory registry with the embedded store's incidents.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - On failure the previous registry contents are returned unchanged.
#[flutter_rust_bridge::frb(sync)]
pub fn incidents_reload() -> IncidentListResponse {
    let outcome = with_store(|store| {
        block_on(reload_registry(store, registry())).map_err(|err| err.to_string())
    })
    .and_then(|result| result);

    match outcome {
        Ok(count) => IncidentListResponse {
            ok: true,
            items: current_incidents(),
            message: format!("Loaded {count} incident(s)."),
        },
        Err(err) => IncidentListResponse {
            ok: false,
            items: current_incidents(),
            message: format!("incidents_reload failed: {err}"),
        },
    }
}

/// Returns the registry as last loaded or merged, without store access.
#[flutter_rust_bridge::frb(sync)]
pub fn incidents_list() -> IncidentListResponse {
    let items = current_incidents();
    let message = if items.is_empty() {
        "No incidents.".to_string()
    } else {
        format!("{} incident(s).", items.len())
    };
    IncidentListResponse {
        ok: true,
        items,
        message,
    }
}

/// Submits a new incident report.
///
/// Input semantics:
/// - `kind`, `severity`: labels as shown in the pickers (case-insensitive).
/// - `latitude`, `longitude`: decimal text; blank means unknown.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Returns the store-assigned incident ID on success.
#[flutter_rust_bridge::frb(sync)]
pub fn incident_report(
    title: String,
    kind: String,
    description: String,
    latitude: String,
    longitude: String,
    severity: String,
) -> ActionResponse {
    let kind = match kind.parse::<IncidentType>() {
        Ok(kind) => kind,
        Err(err) => return ActionResponse::failure(err.to_string()),
    };
    let severity = match severity.parse::<Severity>() {
        Ok(severity) => severity,
        Err(err) => return ActionResponse::failure(err.to_string()),
    };
    let mut form = ReportForm {
        title,
        kind,
        description,
        latitude,
        longitude,
        severity,
    };

    let outcome = with_store(|store| {
        let workflow = ReportingWorkflow::new(store, registry().clone());
        let result = block_on(workflow.submit(&mut form));
        (result, workflow.last_notice())
    });
    match outcome {
        Ok((Ok(incident), notice)) => ActionResponse::success(notice, incident.id.to_string()),
        Ok((Err(err), notice)) => {
            ActionResponse::failure(notice.map_or_else(|| err.to_string(), |n| n.message))
        }
        Err(err) => ActionResponse::failure(format!("incident_report failed: {err}")),
    }
}

/// Logs a relief update against an existing incident.
///
/// Input semantics:
/// - `incident_id`: picker selection; blank means nothing selected.
/// - counts: whole numbers as text; blank means zero.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Returns the store-assigned update ID on success.
#[flutter_rust_bridge::frb(sync)]
pub fn relief_add_update(
    incident_id: String,
    description: String,
    food_kits: String,
    medical_kits: String,
    people_helped: String,
) -> ActionResponse {
    let mut form = ReliefForm {
        description,
        food_kits,
        medical_kits,
        people_helped,
    };

    let outcome = with_store(|store| {
        let workflow = TrackingWorkflow::new(store, registry().clone());
        let result = block_on(workflow.add_update(&incident_id, &mut form));
        (result, workflow.last_notice())
    });
    match outcome {
        Ok((Ok(update), notice)) => ActionResponse::success(notice, update.id.to_string()),
        Ok((Err(err), notice)) => {
            ActionResponse::failure(notice.map_or_else(|| err.to_string(), |n| n.message))
        }
        Err(err) => ActionResponse::failure(format!("relief_add_update failed: {err}")),
    }
}

/// Flattens relief updates of every registry incident, newest-first per incident.
#[flutter_rust_bridge::frb(sync)]
pub fn relief_ledger() -> LedgerResponse {
    let items = registry()
        .with(|r| ledger::rows(r.incidents()))
        .into_iter()
        .map(to_ledger_item)
        .collect::<Vec<_>>();
    let message = if items.is_empty() {
        "No relief updates yet.".to_string()
    } else {
        format!("{} relief update(s).", items.len())
    };
    LedgerResponse { items, message }
}

fn registry() -> &'static SharedRegistry {
    REGISTRY.get_or_init(SharedRegistry::new)
}

fn resolve_store_db_path() -> PathBuf {
    STORE_DB_PATH
        .get_or_init(|| {
            std::env::var(DB_PATH_ENV)
                .ok()
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(default_db_path)
        })
        .clone()
}

fn with_store<T>(f: impl FnOnce(&SqliteIncidentStore<'_>) -> T) -> Result<T, String> {
    let db_path = resolve_store_db_path();
    let conn = open_db(&db_path).map_err(|err| {
        warn!("event=store_open module=ffi status=error error={err}");
        format!("store DB open failed: {err}")
    })?;
    let store = SqliteIncidentStore::new(&conn);
    Ok(f(&store))
}

fn current_incidents() -> Vec<IncidentItem> {
    registry().with(|r| {
        let options = ledger::incident_options(r.incidents());
        ledger::incident_rows(r.incidents())
            .into_iter()
            .zip(options)
            .map(|(row, option)| to_incident_item(row, option.label))
            .collect()
    })
}

fn to_incident_item(row: IncidentRow, option_label: String) -> IncidentItem {
    IncidentItem {
        incident_id: row.incident_id,
        title: row.title,
        kind: row.kind,
        severity: row.severity,
        status: row.status,
        reported_label: row.reported_label,
        option_label,
    }
}

fn to_ledger_item(row: LedgerRow) -> LedgerItem {
    LedgerItem {
        update_id: row.update_id,
        incident_title: row.incident_title,
        text: row.text,
        food_kits: row.food_kits,
        medical_kits: row.medical_kits,
        people_helped: row.people_helped,
        time_label: row.time_label,
    }
}
