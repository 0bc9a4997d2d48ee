//! HTTP client for the remote incident service.
//!
//! Routes:
//! - `GET  {base}/incidents`
//! - `POST {base}/incidents`
//! - `POST {base}/incidents/{id}/relief`

use crate::model::incident::{Incident, IncidentId, NewIncident};
use crate::model::relief::{NewReliefUpdate, ReliefUpdate};
use crate::store::wire::{self, AddReliefPayload, CreateIncidentPayload};
use crate::store::{RemoteError, RemoteResult, RemoteStore};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, RequestBuilder, Url};
use std::time::{Duration, Instant};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// `RemoteStore` backed by the incident service's JSON API.
#[derive(Debug, Clone)]
pub struct HttpIncidentStore {
    client: Client,
    base_url: Url,
}

impl HttpIncidentStore {
    /// Creates a client rooted at `base_url` (e.g. `https://host/api`).
    pub fn new(base_url: &str, timeout: Duration) -> RemoteResult<Self> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|err| RemoteError::InvalidEndpoint(format!("`{base_url}`: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(RemoteError::InvalidEndpoint(format!(
                "`{base_url}` cannot be used as a base URL"
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| RemoteError::Transport(err.to_string()))?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> RemoteResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| RemoteError::InvalidEndpoint(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, op: &'static str, request: RequestBuilder) -> RemoteResult<Vec<u8>> {
        let started_at = Instant::now();
        let response = request.send().await.map_err(|err| {
            warn!(
                "event=store_call module=store.http op={op} status=error error_code=transport duration_ms={}",
                started_at.elapsed().as_millis()
            );
            RemoteError::Transport(err.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                "event=store_call module=store.http op={op} status=error error_code=http_{} duration_ms={}",
                status.as_u16(),
                started_at.elapsed().as_millis()
            );
            return Err(RemoteError::Status {
                code: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| RemoteError::Transport(err.to_string()))?;
        debug!(
            "event=store_call module=store.http op={op} status=ok bytes={} duration_ms={}",
            body.len(),
            started_at.elapsed().as_millis()
        );
        Ok(body.to_vec())
    }
}

#[async_trait(?Send)]
impl RemoteStore for HttpIncidentStore {
    async fn list_incidents(&self) -> RemoteResult<Vec<Incident>> {
        let url = self.endpoint(&["incidents"])?;
        let body = self.send("list_incidents", self.client.get(url)).await?;
        wire::decode_incidents(&body)
    }

    async fn create_incident(&self, draft: &NewIncident) -> RemoteResult<Incident> {
        let url = self.endpoint(&["incidents"])?;
        let request = self
            .client
            .post(url)
            .json(&CreateIncidentPayload::from(draft));
        let body = self.send("create_incident", request).await?;
        wire::decode_incident(&body)
    }

    async fn add_relief(
        &self,
        incident_id: &IncidentId,
        draft: &NewReliefUpdate,
    ) -> RemoteResult<ReliefUpdate> {
        let url = self.endpoint(&["incidents", incident_id.as_str(), "relief"])?;
        let request = self.client.post(url).json(&AddReliefPayload::from(draft));
        let body = self.send("add_relief", request).await?;
        wire::decode_relief_update(&body, incident_id)
    }
}
