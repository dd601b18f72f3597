//!
//! src/main.rs  Andrew Belles  Oct 17th, 2026
//!
//! Checks the configured endpoint, fetches once and prints the
//! normalized song. Polling belongs to whoever hosts the library
//!
//!

use rs_nowplaying::{config, logging, ApiError, NowPlaying};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    let cfgs = config::load_config()?;
    let _guard = logging::init_logging(&cfgs.logging)?;

    tracing::info!(
        service="rs-nowplaying",
        version=%env!("CARGO_PKG_VERSION"),
        backend=%cfgs.api.backend,
        endpoint=%cfgs.api.endpoint(),
        "starting"
    );

    let client = rs_nowplaying::connect(&cfgs)?;
    if let Err(e) = client.verify_access().await {
        tracing::error!(endpoint=%cfgs.api.endpoint(), error=%e, "api unusable");
        return Err(e);
    }

    client.fetch().await?;
    let song = client.current_song()?;
    println!("{}", serde_json::to_string_pretty(&song)?);
    println!("stream: {}", client.stream_url());

    Ok(())
}
