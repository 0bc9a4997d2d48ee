//! Client-side sync core for disaster incident reporting and relief tracking.
//! This crate owns the registry/store consistency rules; UI layers only call in.

pub mod config;
pub mod db;
pub mod ledger;
pub mod logging;
pub mod model;
pub mod registry;
pub mod store;
pub mod workflow;

pub use config::{ClientConfig, StoreTarget};
pub use ledger::{IncidentOption, IncidentRow, LedgerEntry, LedgerRow};
pub use logging::{default_log_level, init_logging, logging_status, LogSettings};
pub use model::incident::{
    Incident, IncidentId, IncidentStatus, IncidentType, NewIncident, Severity, UnknownLabel,
};
pub use model::relief::{NewReliefUpdate, ReliefUpdate, ReliefUpdateId};
pub use registry::{IncidentRegistry, SharedRegistry};
pub use store::{
    HttpIncidentStore, RemoteError, RemoteResult, RemoteStore, SqliteIncidentStore,
};
pub use workflow::relief::{ReliefForm, TrackingWorkflow};
pub use workflow::report::{ReportForm, ReportingWorkflow};
pub use workflow::{reload_registry, Notice, NoticeKind, SubmissionError, ValidationError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
