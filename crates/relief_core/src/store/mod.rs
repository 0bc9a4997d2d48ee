//! Remote store contract and its implementations.
//!
//! # Responsibility
//! - Define the three operations the client consumes from the incident store.
//! - Keep transport and persistence details behind one trait.
//!
//! # Invariants
//! - Calls are single-shot; no retry policy lives here.
//! - Every successful call returns canonical, store-assigned records.
//! - Failures only say that the call failed; callers never branch on HTTP
//!   semantics.

use crate::db::DbError;
use crate::model::incident::{Incident, IncidentId, NewIncident};
use crate::model::relief::{NewReliefUpdate, ReliefUpdate};
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod http;
pub mod sqlite;
pub mod wire;

pub use http::HttpIncidentStore;
pub use sqlite::SqliteIncidentStore;

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Failure of a single store call.
#[derive(Debug)]
pub enum RemoteError {
    /// Endpoint configuration cannot address the store.
    InvalidEndpoint(String),
    /// Request never produced a response (connect, timeout, reset).
    Transport(String),
    /// Store answered with a non-success status.
    Status { code: u16 },
    /// Response body did not decode into canonical records.
    Decode(String),
    /// Store does not know the referenced incident.
    NotFound(IncidentId),
    /// Embedded store persistence failure.
    Storage(DbError),
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEndpoint(message) => write!(f, "invalid store endpoint: {message}"),
            Self::Transport(message) => write!(f, "store unreachable: {message}"),
            Self::Status { code } => write!(f, "store rejected request with status {code}"),
            Self::Decode(message) => write!(f, "invalid store response: {message}"),
            Self::NotFound(id) => write!(f, "incident not found in store: {id}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RemoteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RemoteError {
    fn from(value: DbError) -> Self {
        Self::Storage(value)
    }
}

impl From<rusqlite::Error> for RemoteError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(DbError::Engine(value))
    }
}

/// Client-side view of the remote incident repository.
///
/// Futures are not required to be `Send`; the client runs on a
/// single-threaded executor and suspends only at these calls.
#[async_trait(?Send)]
pub trait RemoteStore {
    /// Lists every incident with its embedded relief updates.
    async fn list_incidents(&self) -> RemoteResult<Vec<Incident>>;

    /// Creates an incident and returns the store's canonical record.
    async fn create_incident(&self, draft: &NewIncident) -> RemoteResult<Incident>;

    /// Appends a relief update to an incident and returns the stored update.
    async fn add_relief(
        &self,
        incident_id: &IncidentId,
        draft: &NewReliefUpdate,
    ) -> RemoteResult<ReliefUpdate>;
}

#[async_trait(?Send)]
impl<S: RemoteStore + ?Sized> RemoteStore for &S {
    async fn list_incidents(&self) -> RemoteResult<Vec<Incident>> {
        (**self).list_incidents().await
    }

    async fn create_incident(&self, draft: &NewIncident) -> RemoteResult<Incident> {
        (**self).create_incident(draft).await
    }

    async fn add_relief(
        &self,
        incident_id: &IncidentId,
        draft: &NewReliefUpdate,
    ) -> RemoteResult<ReliefUpdate> {
        (**self).add_relief(incident_id, draft).await
    }
}
