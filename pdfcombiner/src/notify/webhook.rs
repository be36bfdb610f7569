//! HTTP callback delivery.
//!
//! Posts the job report as JSON to the callback URL supplied with the job
//! request. One notifier is built per job; the URL is validated up front so
//! a bad callback is rejected before any document work starts.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::job::JobReport;
use crate::notify::{Notifier, NotifyError};

/// Delivery timeout for the callback request.
const DELIVERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Notifier that POSTs the report to a callback URL.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    http: Client,
    url: Url,
}

impl WebhookNotifier {
    /// Creates a notifier for `url`.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::InvalidUrl`] when the URL does not parse.
    pub fn new(url: &str) -> Result<Self, NotifyError> {
        let url = Url::parse(url).map_err(|err| NotifyError::InvalidUrl {
            url: url.to_string(),
            reason: err.to_string(),
        })?;

        let http = Client::builder()
            .timeout(DELIVERY_TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("failed to create HTTP client");

        Ok(Self { http, url })
    }

    /// Returns the callback URL.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn deliver(&self, report: &JobReport) -> Result<(), NotifyError> {
        tracing::debug!(url = %self.url, success = report.success, "delivering job report");

        let response = self
            .http
            .post(self.url.clone())
            .json(report)
            .send()
            .await
            .map_err(|err| NotifyError::Delivery {
                url: self.url.to_string(),
                reason: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Delivery {
                url: self.url.to_string(),
                reason: format!("callback responded with status {status}"),
            });
        }

        tracing::debug!(url = %self.url, status = status.as_u16(), "job report delivered");

        Ok(())
    }
}
