//! Transport seam between the form stores and the request handlers.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::endpoints::{self, Endpoint, Reply};

/// Error returned when a store submission does not produce an acknowledgement.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("failed to encode {endpoint} payload: {source}")]
    Encode {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },

    #[error("{endpoint} rejected with status {status}: {message}")]
    Rejected {
        endpoint: Endpoint,
        status: u16,
        message: String,
    },

    #[error("{endpoint} request failed: {message}")]
    Transport { endpoint: Endpoint, message: String },
}

impl SubmitError {
    /// Endpoint the failed submission targeted.
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Self::Encode { endpoint, .. }
            | Self::Rejected { endpoint, .. }
            | Self::Transport { endpoint, .. } => *endpoint,
        }
    }
}

/// Something that can deliver a JSON body to a submission endpoint.
///
/// Implementations return the handler's reply for any HTTP status; only
/// failures to obtain a reply at all are errors.
pub trait Backend {
    fn post(
        &self,
        endpoint: Endpoint,
        body: Vec<u8>,
    ) -> impl Future<Output = Result<Reply, SubmitError>> + Send;
}

/// Calls the handlers directly, in the same process.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalBackend {
    /// Simulated processing latency applied by every handler.
    pub latency: Duration,
}

impl LocalBackend {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Backend for LocalBackend {
    async fn post(&self, endpoint: Endpoint, body: Vec<u8>) -> Result<Reply, SubmitError> {
        Ok(Reply::from(
            endpoints::process(endpoint, &body, self.latency).await,
        ))
    }
}

/// Serializes `payload`, posts it and turns non-2xx replies into errors.
///
/// # Errors
///
/// Returns [`SubmitError`] if encoding fails, the backend cannot deliver the
/// request, or the handler answers with a non-success status.
pub async fn submit_json<B, T>(
    backend: &B,
    endpoint: Endpoint,
    payload: &T,
) -> Result<Value, SubmitError>
where
    B: Backend,
    T: Serialize + ?Sized,
{
    let body =
        serde_json::to_vec(payload).map_err(|source| SubmitError::Encode { endpoint, source })?;
    debug!(%endpoint, bytes = body.len(), "submitting");

    let reply = backend.post(endpoint, body).await?;
    if reply.is_success() {
        return Ok(reply.body);
    }

    let message = reply
        .body
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unexpected response")
        .to_string();
    warn!(%endpoint, status = reply.status, %message, "submission rejected");
    Err(SubmitError::Rejected {
        endpoint,
        status: reply.status,
        message,
    })
}
