//!
//! src/lib.rs  Andrew Belles  Oct 17th, 2026
//!
//! Now playing metadata for the player UI. Either the legacy XML or the
//! JSON endpoint is fetched and normalized into one `Song`
//!
//!

pub mod config;
pub mod errors;
pub mod logging;

pub mod backend;
pub mod client;
pub mod fetch;
pub mod json_api;
pub mod normalize;
pub mod probe;
pub mod types;
pub mod xml_api;

pub use crate::client::{
    connect, ClientState, JsonApiClient, MetadataClient, NowPlaying, XmlApiClient
};
pub use crate::errors::ApiError;
pub use crate::types::Song;
