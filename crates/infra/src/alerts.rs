//! Email alert delivery over an HTTP email API.
//!
//! Posts `{from, to, subject, html, text}` as JSON with a bearer API key.
//! When alerts are disabled a logging-only transport is used instead.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use stocksync_core::AlertTransport;
use stocksync_domain::{AlertConfig, AlertMessage, Result, StockSyncError};
use tracing::{info, instrument, warn};

use crate::errors::to_domain;
use crate::http::HttpClient;

#[derive(Debug, Serialize)]
struct EmailPayload<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

/// Sends alerts through the configured email endpoint.
pub struct HttpAlertTransport {
    http: HttpClient,
    endpoint: String,
    api_key: String,
    from: String,
    to: Vec<String>,
}

impl HttpAlertTransport {
    pub fn new(config: &AlertConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| StockSyncError::Config("alerts.api_key is required".into()))?;
        if config.to.is_empty() {
            return Err(StockSyncError::Config("alerts.to needs at least one recipient".into()));
        }
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key,
            from: config.from.clone(),
            to: config.to.clone(),
        })
    }
}

#[async_trait]
impl AlertTransport for HttpAlertTransport {
    #[instrument(skip(self, message), fields(subject = %message.subject, recipients = self.to.len()))]
    async fn send(&self, message: &AlertMessage) -> Result<()> {
        let payload = EmailPayload {
            from: &self.from,
            to: &self.to,
            subject: &message.subject,
            html: &message.html,
            text: &message.text,
        };
        let builder = self
            .http
            .request(Method::POST, &self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload);

        let response = self.http.send(builder).await.map_err(to_domain)?;
        response.error_for_status().map_err(to_domain)?;
        info!("alerts.email.sent");
        Ok(())
    }
}

/// Used when alert delivery is switched off; logs the subject only.
#[derive(Debug, Default)]
pub struct LogOnlyAlertTransport;

#[async_trait]
impl AlertTransport for LogOnlyAlertTransport {
    async fn send(&self, message: &AlertMessage) -> Result<()> {
        warn!(subject = %message.subject, "alerts.delivery_disabled");
        Ok(())
    }
}

/// Transport for `config`: HTTP when enabled, log-only otherwise.
pub fn alert_transport(config: &AlertConfig) -> Result<Arc<dyn AlertTransport>> {
    if config.enabled {
        Ok(Arc::new(HttpAlertTransport::new(config)?))
    } else {
        Ok(Arc::new(LogOnlyAlertTransport))
    }
}
