#![allow(dead_code)]

use async_trait::async_trait;
use relief_core::{
    Incident, IncidentId, IncidentStatus, IncidentType, NewIncident, NewReliefUpdate,
    ReliefUpdate, ReliefUpdateId, RemoteError, RemoteResult, RemoteStore, Severity,
};
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// In-test store that assigns ids and timestamps like a real server. It can
/// be told to fail calls, or to hold writes in flight until released.
#[derive(Default)]
pub struct FakeStore {
    incidents: RefCell<Vec<Incident>>,
    next_seq: Cell<u64>,
    fail: Cell<bool>,
    held: Cell<bool>,
    calls: Cell<usize>,
}

/// Pending while the store holds writes.
struct Held<'a>(&'a Cell<bool>);

impl Future for Held<'_> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0.get() {
            cx.waker().wake_by_ref();
            Poll::Pending
        } else {
            Poll::Ready(())
        }
    }
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_incidents(incidents: Vec<Incident>) -> Self {
        let store = Self::default();
        *store.incidents.borrow_mut() = incidents;
        store
    }

    pub fn fail_calls(&self, fail: bool) {
        self.fail.set(fail);
    }

    /// While set, create and append calls suspend before the store applies
    /// them.
    pub fn hold_writes(&self, held: bool) {
        self.held.set(held);
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    fn enter(&self) -> RemoteResult<u64> {
        self.calls.set(self.calls.get() + 1);
        if self.fail.get() {
            return Err(RemoteError::Transport("connection refused".to_string()));
        }
        let seq = self.next_seq.get() + 1;
        self.next_seq.set(seq);
        Ok(seq)
    }
}

#[async_trait(?Send)]
impl RemoteStore for FakeStore {
    async fn list_incidents(&self) -> RemoteResult<Vec<Incident>> {
        self.enter()?;
        Ok(self.incidents.borrow().clone())
    }

    async fn create_incident(&self, draft: &NewIncident) -> RemoteResult<Incident> {
        let seq = self.enter()?;
        Held(&self.held).await;
        let incident = Incident {
            id: IncidentId::new(format!("srv-{seq}")),
            title: draft.title.clone(),
            kind: draft.kind,
            description: draft.description.clone(),
            latitude: draft.latitude,
            longitude: draft.longitude,
            severity: draft.severity,
            status: draft.status(),
            reported_at: Some(1_700_000_000_000 + seq as i64),
            relief_updates: Vec::new(),
        };
        self.incidents.borrow_mut().insert(0, incident.clone());
        Ok(incident)
    }

    async fn add_relief(
        &self,
        incident_id: &IncidentId,
        draft: &NewReliefUpdate,
    ) -> RemoteResult<ReliefUpdate> {
        let seq = self.enter()?;
        Held(&self.held).await;
        let mut incidents = self.incidents.borrow_mut();
        let incident = incidents
            .iter_mut()
            .find(|i| &i.id == incident_id)
            .ok_or_else(|| RemoteError::NotFound(incident_id.clone()))?;
        let update = ReliefUpdate {
            id: ReliefUpdateId::new(format!("upd-{seq}")),
            incident_id: incident_id.clone(),
            description: draft.description.clone(),
            food_kits: draft.food_kits,
            medical_kits: draft.medical_kits,
            people_helped: draft.people_helped,
            updated_at: Some(1_700_000_000_000 + seq as i64),
        };
        incident.relief_updates.insert(0, update.clone());
        Ok(update)
    }
}

pub fn incident(id: &str, title: &str) -> Incident {
    Incident {
        id: IncidentId::new(id),
        title: title.to_string(),
        kind: IncidentType::Cyclone,
        description: None,
        latitude: Some(19.07),
        longitude: Some(72.87),
        severity: Severity::High,
        status: IncidentStatus::Reported,
        reported_at: Some(1_699_999_000_000),
        relief_updates: Vec::new(),
    }
}
