//!
//! src/probe.rs  Andrew Belles  Oct 17th, 2026
//!
//! Health check for an endpoint: reachable, successful and parseable
//! by the backend. Never commits anything to client state
//!

use tracing::{debug, warn};
use url::Url;

use crate::backend::Backend;
use crate::fetch::Transport;
use crate::ApiError;

/// Probe keeping the reason for failure
pub async fn probe_endpoint<B, T>(backend: &B, transport: &T, url: &Url) -> Result<(), ApiError>
where
    B: Backend,
    T: Transport + ?Sized
{
    let body = transport.get(url).await?.into_success_body()?;
    backend.parse(&body)?;
    Ok(())
}

/// Probe collapsed to reachable or not, failures are logged and dropped
pub async fn probe<B, T>(backend: &B, transport: &T, url: &Url) -> bool
where
    B: Backend,
    T: Transport + ?Sized
{
    match probe_endpoint(backend, transport, url).await {
        Ok(()) => {
            debug!(backend = backend.name(), url = %url, "probe.ok");
            true
        }
        Err(e @ ApiError::Malformed(_)) => {
            warn!(backend = backend.name(), url = %url, error = %e, "probe.parse.failed");
            false
        }
        Err(e) => {
            warn!(backend = backend.name(), url = %url, error = %e, "probe.transport.failed");
            false
        }
    }
}
