//! Contact submission seam.
//!
//! The page owns its one outstanding submission: it posts the form body
//! through this gateway and feeds the outcome back in as an event. There
//! is no page-wide observer of unrelated requests.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::event::ContactSubmission;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("cancelled")]
    Cancelled,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected status code {0}")]
    Status(u16),
}

/// Server response to a contact submission.
///
/// The endpoint replies with a fragment of modal markup; the backend's
/// bot verdict is read out of its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactOutcome {
    pub modal_text: String,
}

pub trait ContactGateway: Send + Sync {
    fn submit<'a>(
        &'a self,
        form: &'a ContactSubmission,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<ContactOutcome, GatewayError>> + Send + 'a>>;
}

/// Gateway that posts the form to the catalogue's contact endpoint.
pub struct HttpContactGateway {
    http: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpContactGateway {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            timeout,
        }
    }

    async fn post(&self, form: &ContactSubmission) -> Result<ContactOutcome, GatewayError> {
        tracing::debug!(endpoint = %self.endpoint, "posting contact form");
        let resp = self
            .http
            .post(&self.endpoint)
            .form(&form.fields)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(GatewayError::Status(status.as_u16()));
        }

        let modal_text = resp
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(ContactOutcome { modal_text })
    }
}

impl ContactGateway for HttpContactGateway {
    fn submit<'a>(
        &'a self,
        form: &'a ContactSubmission,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<ContactOutcome, GatewayError>> + Send + 'a>> {
        Box::pin(async move {
            tokio::select! {
                _ = cancel.cancelled() => Err(GatewayError::Cancelled),
                result = self.post(form) => result,
            }
        })
    }
}
