//!
//! src/fetch.rs  Andrew Belles  Oct 17th, 2026
//!
//! Issues the single GET each fetch or probe needs and hands back the
//! unparsed body, no retries
//!

use async_trait::async_trait;
use reqwest::{Client, header, redirect};
use url::Url;

use crate::config::HttpConfig;
use crate::ApiError;

/// Status and body of one round trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body of a successful response, non-success is `ApiError::Status`
    pub fn into_success_body(self) -> Result<Vec<u8>, ApiError> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(ApiError::Status(self.status))
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Connection level failures are `ApiError::Transport`, any status is Ok
    async fn get(&self, url: &Url) -> Result<RawResponse, ApiError>;
}

/// Client building functionality
fn client_helper(http: &HttpConfig) -> reqwest::ClientBuilder {
    Client::builder()
        .timeout(http.timeout)
        .connect_timeout(http.connect_timeout)
        .pool_max_idle_per_host(http.pool_max_idle_per_host)
        .pool_idle_timeout(Some(http.pool_idle_timeout))
        .redirect(redirect::Policy::limited(http.max_redirects as usize))
}

pub fn base_client(http: &HttpConfig) -> Result<Client, ApiError> {
    let mut h = header::HeaderMap::new();
    h.insert(
        header::ACCEPT,
        header::HeaderValue::from_static("application/json, application/xml, text/xml")
    );
    client_helper(http)
        .default_headers(h)
        .user_agent(http.user_agent.as_str())
        .build()
        .map_err(|e| ApiError::Config(format!("build client: {e}")))
}

#[derive(Clone, Debug)]
pub struct HttpTransport {
    pub http: Client
}

impl HttpTransport {
    pub fn new(http_config: &HttpConfig) -> Result<Self, ApiError> {
        Ok( Self { http: base_client(http_config)? } )
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<RawResponse, ApiError> {
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok( RawResponse { status, body } )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_range() {
        let response = |status| RawResponse { status, body: Vec::new() };
        assert!(response(200).is_success());
        assert!(response(204).is_success());
        assert!(!response(199).is_success());
        assert!(!response(301).is_success());
        assert!(!response(503).is_success());
    }

    #[test]
    fn builds_from_default_config() {
        assert!(HttpTransport::new(&HttpConfig::default()).is_ok());
    }
}
