use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Backend agnostic snapshot of the song currently on air
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Song {
    pub title: String,
    pub year: i32,
    pub duration: Duration,
    pub played_duration: Duration,
    pub start_time: DateTime<Utc>,   // now - played_duration, never fetched
    pub album_name: String,
    pub artist_name: String,
    pub circle_name: String,
    pub api_song_id: i32,
    pub api_album_id: i32,
    pub album_art_filename: String,
    pub circle_art_filename: String
}

impl Song {
    /// Time left until the track ends, zero once it overran
    pub fn remaining(&self) -> Duration {
        self.duration.saturating_sub(self.played_duration)
    }
}
