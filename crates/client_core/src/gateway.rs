//! Boundary to the remote `/api/teachers` backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use shared::{
    domain::{TeacherId, TeacherRecord},
    error::FetchError,
    protocol::{ApiEnvelope, CreateTeacherRequest, UpdateTeacherRequest},
};
use tracing::debug;
use url::Url;

/// The four calls the admin screen makes. Implementations normalize every
/// failure kind into [`FetchError`] and may be called while an earlier call is
/// still outstanding.
#[async_trait]
pub trait TeacherGateway: Send + Sync {
    async fn list(&self) -> Result<Vec<TeacherRecord>, FetchError>;
    async fn create(&self, request: &CreateTeacherRequest) -> Result<TeacherRecord, FetchError>;
    async fn update(
        &self,
        id: &TeacherId,
        request: &UpdateTeacherRequest,
    ) -> Result<TeacherRecord, FetchError>;
    async fn remove(&self, id: &TeacherId) -> Result<(), FetchError>;
}

pub struct HttpTeacherGateway {
    http: Client,
    base_url: Url,
}

impl HttpTeacherGateway {
    pub fn new(base_url: Url) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    pub fn with_timeout(base_url: Url, timeout: Duration) -> reqwest::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn teachers_url(&self, id: Option<&TeacherId>) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                FetchError::new(format!("api base url '{}' cannot carry a path", self.base_url))
            })?;
            segments.pop_if_empty().extend(["api", "teachers"]);
            if let Some(id) = id {
                segments.push(id.as_str());
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, id: Option<&TeacherId>) -> Result<RequestBuilder, FetchError> {
        let url = self.teachers_url(id)?;
        debug!(method = %method, url = %url, "teacher gateway request");
        Ok(self.http.request(method, url))
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Option<T>, FetchError> {
        let response = request
            .send()
            .await
            .map_err(|err| FetchError::new(format!("could not reach the server: {err}")))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| FetchError::new(format!("failed to read server response: {err}")))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ApiEnvelope<serde_json::Value>>(&body)
                .ok()
                .and_then(|envelope| envelope.failure_message().map(str::to_string));
            return Err(match message {
                Some(message) => FetchError::new(message),
                None => FetchError::status(status.as_u16()),
            });
        }

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        let envelope: ApiEnvelope<T> = serde_json::from_slice(&body)
            .map_err(|err| FetchError::new(format!("malformed response from server: {err}")))?;
        envelope.into_result()
    }
}

fn require_data<T>(data: Option<T>) -> Result<T, FetchError> {
    data.ok_or_else(|| FetchError::new("server response did not include teacher data"))
}

#[async_trait]
impl TeacherGateway for HttpTeacherGateway {
    async fn list(&self) -> Result<Vec<TeacherRecord>, FetchError> {
        let request = self.request(Method::GET, None)?;
        require_data(self.execute(request).await?)
    }

    async fn create(&self, request: &CreateTeacherRequest) -> Result<TeacherRecord, FetchError> {
        let request = self.request(Method::POST, None)?.json(request);
        require_data(self.execute(request).await?)
    }

    async fn update(
        &self,
        id: &TeacherId,
        request: &UpdateTeacherRequest,
    ) -> Result<TeacherRecord, FetchError> {
        let request = self.request(Method::PUT, Some(id))?.json(request);
        require_data(self.execute(request).await?)
    }

    async fn remove(&self, id: &TeacherId) -> Result<(), FetchError> {
        let request = self.request(Method::DELETE, Some(id))?;
        self.execute::<serde_json::Value>(request).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
