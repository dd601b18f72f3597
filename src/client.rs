//!
//! src/client.rs  Andrew Belles  Oct 17th, 2026
//!
//! Generic metadata client. A backend strategy does the parsing, the
//! shell fetches, keeps the last good record and normalizes on demand
//!
//! Concurrent fetches are not coordinated: no lock is held across the
//! network call, whichever parse finishes last replaces the record.
//!

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, info, warn};
use url::Url;

use crate::backend::Backend;
use crate::config::{AppConfig, BackendKind};
use crate::fetch::{HttpTransport, Transport};
use crate::json_api::JsonBackend;
use crate::probe;
use crate::types::Song;
use crate::xml_api::XmlBackend;
use crate::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    NoData,
    Ready
}

///
/// Capability set shared by every backend so the host can swap them
///
#[async_trait]
pub trait NowPlaying: Send + Sync {
    /// Refresh from the network. On failure the previous record is kept
    async fn fetch(&self) -> Result<(), ApiError>;

    /// Reachable and parseable, does not touch client state
    async fn check_access(&self) -> bool;

    /// Same check as `check_access` but hands back why it failed
    async fn verify_access(&self) -> Result<(), ApiError>;

    /// `ApiError::NoData` until a fetch succeeded
    fn current_song(&self) -> Result<Song, ApiError>;

    fn state(&self) -> ClientState;

    /// Audio stream of the station
    fn stream_url(&self) -> &Url;

    fn backend_name(&self) -> &'static str;
}

pub struct MetadataClient<B: Backend, T: Transport = HttpTransport> {
    backend: B,
    transport: T,
    endpoint: Url,
    stream_url: Url,
    current: RwLock<Option<Arc<B::Record>>>
}

pub type XmlApiClient<T = HttpTransport> = MetadataClient<XmlBackend, T>;
pub type JsonApiClient<T = HttpTransport> = MetadataClient<JsonBackend, T>;

impl<B: Backend, T: Transport> MetadataClient<B, T> {
    pub fn new(backend: B, transport: T, endpoint: Url, stream_url: Url) -> Self {
        Self {
            backend,
            transport,
            endpoint,
            stream_url,
            current: RwLock::new(None)
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Last good structured record, if any
    pub fn current_record(&self) -> Option<Arc<B::Record>> {
        self.current.read().clone()
    }

    async fn download(&self) -> Result<B::Record, ApiError> {
        let body = self.transport.get(&self.endpoint).await?.into_success_body()?;
        self.backend.parse(&body)
    }
}

#[async_trait]
impl<B: Backend, T: Transport> NowPlaying for MetadataClient<B, T> {
    async fn fetch(&self) -> Result<(), ApiError> {
        match self.download().await {
            Ok(record) => {
                *self.current.write() = Some(Arc::new(record));
                info!(backend = self.backend.name(), "client.fetch.done");
                Ok(())
            }
            Err(e) => {
                warn!(
                    backend = self.backend.name(),
                    url = %self.endpoint,
                    error = %e,
                    transient = e.is_transient(),
                    "client.fetch.failed"
                );
                Err(e)
            }
        }
    }

    async fn check_access(&self) -> bool {
        probe::probe(&self.backend, &self.transport, &self.endpoint).await
    }

    async fn verify_access(&self) -> Result<(), ApiError> {
        probe::probe_endpoint(&self.backend, &self.transport, &self.endpoint)
            .await
            .inspect_err(|e| warn!(
                backend = self.backend.name(),
                url = %self.endpoint,
                error = %e,
                "client.access.failed"
            ))
    }

    fn current_song(&self) -> Result<Song, ApiError> {
        let record = self.current_record().ok_or(ApiError::NoData)?;
        debug!(backend = self.backend.name(), record = ?record, "client.record.dump");
        Ok(self.backend.normalize(&record, Utc::now()))
    }

    fn state(&self) -> ClientState {
        if self.current.read().is_some() {
            ClientState::Ready
        } else {
            ClientState::NoData
        }
    }

    fn stream_url(&self) -> &Url {
        &self.stream_url
    }

    fn backend_name(&self) -> &'static str {
        self.backend.name()
    }
}

///
/// Client for the configured backend over real http
///
pub fn connect(cfg: &AppConfig) -> Result<Box<dyn NowPlaying>, ApiError> {
    let transport = HttpTransport::new(&cfg.http)?;
    let endpoint = cfg.api.endpoint().clone();
    let stream_url = cfg.api.stream_url.clone();

    let client: Box<dyn NowPlaying> = match cfg.api.backend {
        BackendKind::Xml => Box::new(
            MetadataClient::new(XmlBackend, transport, endpoint, stream_url)
        ),
        BackendKind::Json => Box::new(
            MetadataClient::new(JsonBackend, transport, endpoint, stream_url)
        )
    };
    Ok(client)
}
