//! HTTP collaborator: the single point of entry for calls to the CRM backend.
//!
//! No other module may talk to the backend directly. Requests are never
//! retried here; retry is a user action (re-fetch).

use std::marker::PhantomData;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tracing::debug;

use crate::resources::api::{ApiError, Patch, ResourceApi, ScopeParams};
use crate::resources::Resource;

#[derive(Debug, Deserialize)]
struct ListEnvelope<T> {
    data: Vec<T>,
}

/// Single-record responses may or may not be wrapped in `data`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordEnvelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> RecordEnvelope<T> {
    fn into_inner(self) -> T {
        match self {
            RecordEnvelope::Wrapped { data } => data,
            RecordEnvelope::Bare(record) => record,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Shared connection settings for every entity endpoint.
#[derive(Clone)]
pub struct CrmHttp {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl CrmHttp {
    pub fn new(base_url: &str, token: Option<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Turns a non-2xx response into `ApiError::Status`, preferring the
    /// backend's own message.
    async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    format!("Request failed with status {}", status.as_u16())
                } else {
                    body
                }
            });
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

/// `ResourceApi` over the CRM REST backend for one entity type.
pub struct HttpResourceApi<T> {
    http: CrmHttp,
    _marker: PhantomData<fn() -> T>,
}

impl<T> HttpResourceApi<T> {
    pub fn new(http: CrmHttp) -> Self {
        Self {
            http,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<T: Resource> ResourceApi<T> for HttpResourceApi<T> {
    async fn get_all(&self, scope: &ScopeParams) -> Result<Vec<T>, ApiError> {
        let request = self.http.client.get(self.http.url(T::PATH)).query(scope);
        let response = self.http.authorize(request).send().await?;
        let envelope: ListEnvelope<T> = CrmHttp::check(response).await?.json().await?;
        debug!(resource = T::NAME, count = envelope.data.len(), "Fetched collection");
        Ok(envelope.data)
    }

    async fn create(&self, patch: &Patch) -> Result<T, ApiError> {
        let request = self.http.client.post(self.http.url(T::PATH)).json(patch);
        let response = self.http.authorize(request).send().await?;
        let record: RecordEnvelope<T> = CrmHttp::check(response).await?.json().await?;
        Ok(record.into_inner())
    }

    async fn update(&self, id: &str, patch: &Patch) -> Result<T, ApiError> {
        let url = self.http.url(&format!("{}/{id}", T::PATH));
        let request = self.http.client.put(url).json(patch);
        let response = self.http.authorize(request).send().await?;
        let record: RecordEnvelope<T> = CrmHttp::check(response).await?.json().await?;
        Ok(record.into_inner())
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let url = self.http.url(&format!("{}/{id}", T::PATH));
        let response = self.http.authorize(self.http.client.delete(url)).send().await?;
        CrmHttp::check(response).await?;
        Ok(())
    }
}
