//! Thin wrapper over `reqwest::Client` with timeout, user agent and request
//! logging.
//!
//! Retries are not handled here: store reads go through the sync retry
//! executor and writes are never retried.

use std::time::Duration;

use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use stocksync_domain::Result;
use tracing::debug;

use crate::errors::to_domain;

/// Shared HTTP client used by every outbound adapter.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute a single request.
    ///
    /// Transport errors are returned raw so callers can tell timeouts and
    /// refused connections apart from HTTP statuses.
    pub async fn send(
        &self,
        builder: RequestBuilder,
    ) -> std::result::Result<Response, reqwest::Error> {
        let request = builder.build()?;
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, url = %redact_query(&url), "http.request.sending");

        match self.client.execute(request).await {
            Ok(response) => {
                debug!(%method, status = %response.status(), "http.request.completed");
                Ok(response)
            }
            Err(err) => {
                debug!(%method, error = %err, "http.request.failed");
                Err(err)
            }
        }
    }
}

fn redact_query(url: &reqwest::Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.to_string()
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: Option<String>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(30), user_agent: None }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn build(self) -> Result<HttpClient> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let client = builder.build().map_err(to_domain)?;
        Ok(HttpClient { client })
    }
}
