//! Use-case workflows that talk to the store and merge into the registry.
//!
//! # Responsibility
//! - Turn raw form input into store payloads.
//! - Merge canonical store responses into the shared registry.
//! - Convert every failure into a user-facing notice and a log event.
//!
//! # Invariants
//! - Local validation fails before any store call.
//! - The registry changes only after the store confirms; nothing is inserted
//!   optimistically under a made-up identifier.
//! - No retries; a failed operation leaves registry and form usable.

use crate::registry::SharedRegistry;
use crate::store::{RemoteError, RemoteStore};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

pub mod relief;
pub mod report;

/// Missing required local input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingTitle,
    NoIncidentSelected,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTitle => write!(f, "Title is required"),
            Self::NoIncidentSelected => write!(f, "Select an incident"),
        }
    }
}

impl Error for ValidationError {}

/// Failure of a workflow operation, local or remote.
#[derive(Debug)]
pub enum SubmissionError {
    Validation(ValidationError),
    Remote(RemoteError),
}

impl SubmissionError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl Display for SubmissionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Remote(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SubmissionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Remote(err) => Some(err),
        }
    }
}

impl From<ValidationError> for SubmissionError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RemoteError> for SubmissionError {
    fn from(value: RemoteError) -> Self {
        Self::Remote(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Failure,
}

/// User-visible outcome message of the latest workflow operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Failure,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == NoticeKind::Success
    }
}

/// Latest notice of one workflow; the last operation to finish wins.
#[derive(Debug, Default)]
pub(crate) struct NoticeSlot {
    latest: Mutex<Option<Notice>>,
}

impl NoticeSlot {
    pub(crate) fn clear(&self) {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub(crate) fn post(&self, notice: Notice) {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(notice);
    }

    pub(crate) fn latest(&self) -> Option<Notice> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Reloads the whole registry from the store.
///
/// On failure the registry keeps its previous contents.
pub async fn reload_registry<S: RemoteStore>(
    store: &S,
    registry: &SharedRegistry,
) -> Result<usize, SubmissionError> {
    let started_at = Instant::now();
    match store.list_incidents().await {
        Ok(incidents) => {
            let count = incidents.len();
            registry.replace_all(incidents);
            info!(
                "event=registry_reload module=workflow status=ok incidents={count} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(count)
        }
        Err(err) => {
            error!(
                "event=registry_reload module=workflow status=error duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            );
            Err(err.into())
        }
    }
}
