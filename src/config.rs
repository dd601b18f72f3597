//!
//! src/config.rs  Andrew Belles  Oct 17th, 2026
//!
//! Loads endpoints, http and logger configuration from the
//! environment (and .env), every key has a default
//!

use std::{fmt, str::FromStr, time};
use url::Url;

use crate::ApiError;

/// Constants for HTTP Config
pub const HTTP_TIMEOUT: u64 = 8000;
pub const HTTP_CONNECT_TIMEOUT: u64 = 2000;
pub const HTTP_POOL_MAX_IDLE: usize = 4;
pub const HTTP_POOL_IDLE_TIMEOUT: u64 = 90000;
pub const HTTP_MAX_REDIRECTS: u8 = 4;

/// Default endpoints of the station
pub const DEFAULT_XML_URL: &str = "https://gensokyoradio.net/xml/";
pub const DEFAULT_JSON_URL: &str = "https://gensokyoradio.net/json/";
pub const DEFAULT_STREAM_URL: &str = "https://stream.gensokyoradio.net/1";

/// Ensures that url is http(s) and names a host
fn ensure_http(url: &Url) -> Result<(), String> {
    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(format!("URL must be http(s): {url}"));
    }
    match url.host_str() {
        Some(_) => Ok(()),
        None => Err(format!("URL missing host: {url}"))
    }
}

fn parse_url(key: &str, raw: &str) -> Result<Url, ApiError> {
    let url = Url::parse(raw)
        .map_err(|e| ApiError::Config(format!("{key} invalid {e}")))?;
    ensure_http(&url).map_err(ApiError::Config)?;
    Ok(url)
}

///
/// Which wire format the client speaks
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Xml,
    Json
}

impl FromStr for BackendKind {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xml" => Ok(BackendKind::Xml),
            "json" => Ok(BackendKind::Json),
            other => Err(ApiError::Config(
                format!("unknown backend {other:?}, expected xml or json")
            ))
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Xml => f.write_str("xml"),
            BackendKind::Json => f.write_str("json")
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub backend: BackendKind,
    pub xml_url: Url,
    pub json_url: Url,
    pub stream_url: Url
}

impl ApiConfig {
    /// Endpoint of the selected backend
    pub fn endpoint(&self) -> &Url {
        match self.backend {
            BackendKind::Xml => &self.xml_url,
            BackendKind::Json => &self.json_url
        }
    }
}

fn build_api(lookup: &impl Fn(&str) -> Option<String>) -> Result<ApiConfig, ApiError> {
    let backend = match lookup("NOWPLAYING_BACKEND") {
        Some(v) => v.parse()?,
        None => BackendKind::Json
    };

    let xml_url = lookup("NOWPLAYING_XML_URL")
        .unwrap_or_else(|| DEFAULT_XML_URL.to_string());
    let json_url = lookup("NOWPLAYING_JSON_URL")
        .unwrap_or_else(|| DEFAULT_JSON_URL.to_string());
    let stream_url = lookup("NOWPLAYING_STREAM_URL")
        .unwrap_or_else(|| DEFAULT_STREAM_URL.to_string());

    // endpoints are used exactly as configured
    let xml_url    = parse_url("NOWPLAYING_XML_URL", &xml_url)?;
    let json_url   = parse_url("NOWPLAYING_JSON_URL", &json_url)?;
    let stream_url = parse_url("NOWPLAYING_STREAM_URL", &stream_url)?;

    Ok( ApiConfig { backend, xml_url, json_url, stream_url } )
}

///
/// Configuration for Http timeouts, pool, etc.
///
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout: time::Duration,
    pub connect_timeout: time::Duration,
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout: time::Duration,
    pub max_redirects: u8,
    pub user_agent: String
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: time::Duration::from_millis(HTTP_TIMEOUT),
            connect_timeout: time::Duration::from_millis(HTTP_CONNECT_TIMEOUT),
            pool_max_idle_per_host: HTTP_POOL_MAX_IDLE,
            pool_idle_timeout: time::Duration::from_millis(HTTP_POOL_IDLE_TIMEOUT),
            max_redirects: HTTP_MAX_REDIRECTS,
            user_agent: format!("rs-nowplaying/{}", env!("CARGO_PKG_VERSION"))
        }
    }
}

fn build_http(lookup: &impl Fn(&str) -> Option<String>) -> Result<HttpConfig, ApiError> {
    let env_to_ms = |s: &str, default: time::Duration| -> Result<time::Duration, ApiError> {
        match lookup(s) {
            Some(v) => v.trim().parse::<u64>()
                .map(time::Duration::from_millis)
                .map_err(|e| ApiError::Config(format!("{s} invalid {e}"))),
            None => Ok(default)
        }
    };

    let defaults = HttpConfig::default();
    let timeout = env_to_ms("HTTP_TIMEOUT_MS", defaults.timeout)?;
    let connect_timeout = env_to_ms("HTTP_CONNECT_TIMEOUT_MS", defaults.connect_timeout)?;
    let user_agent = lookup("NOWPLAYING_USER_AGENT").unwrap_or(defaults.user_agent.clone());

    Ok( HttpConfig { timeout, connect_timeout, user_agent, ..defaults } )
}

///
/// Configuration for Logger
///

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub filter_directives: String,
    pub format: LogFormat,
    pub with_ansi: bool,
    pub include_file_line: bool,
    pub include_target: bool
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter_directives: "info,rs_nowplaying=debug,reqwest=warn".to_string(),
            format: LogFormat::Json,
            with_ansi: true,
            include_file_line: true,
            include_target: true
        }
    }
}

fn build_logging(lookup: &impl Fn(&str) -> Option<String>) -> Result<LoggingConfig, ApiError> {
    let format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
        None | Some("json") => LogFormat::Json,
        Some("pretty") => LogFormat::Pretty,
        Some(other) => return Err(ApiError::Config(
            format!("LOG_FORMAT invalid {other:?}")
        ))
    };
    Ok( LoggingConfig { format, ..LoggingConfig::default() } )
}

///
/// AppConfig which holds everything the clients need
///
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig
}

/// Builds the config from an arbitrary key lookup
pub fn config_from(lookup: impl Fn(&str) -> Option<String>) -> Result<AppConfig, ApiError> {
    // blank values count as unset
    let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    let api     = build_api(&lookup)?;
    let http    = build_http(&lookup)?;
    let logging = build_logging(&lookup)?;

    Ok( AppConfig { api, http, logging } )
}

///
/// Return configuration from environment variables at program start.
///
pub fn load_config() -> Result<AppConfig, ApiError> {
    dotenvy::dotenv().ok();
    config_from(|key| std::env::var(key).ok())
}
