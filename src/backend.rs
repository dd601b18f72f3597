//!
//! src/backend.rs  Andrew Belles  Oct 17th, 2026
//!
//! Parser strategy injected into the generic metadata client, one
//! implementation per wire format
//!

use std::fmt::Debug;

use chrono::{DateTime, Utc};

use crate::types::Song;
use crate::ApiError;

pub trait Backend: Send + Sync + 'static {
    /// Backend specific intermediate record, replaced wholesale on every fetch
    type Record: Debug + Send + Sync + 'static;

    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Fails with `ApiError::Malformed` when the body is not this format
    fn parse(&self, body: &[u8]) -> Result<Self::Record, ApiError>;

    /// Pure and infallible, unusable fields degrade to defaults
    fn normalize(&self, record: &Self::Record, now: DateTime<Utc>) -> Song;
}
