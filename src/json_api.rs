//!
//! src/json_api.rs  Andrew Belles  Oct 17th, 2026
//!
//! JSON backend. The document deserializes straight into fixed groups,
//! leaves keep whatever string/number shape the station sent
//!

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::backend::Backend;
use crate::normalize::{coerce_int, seconds_from, start_time};
use crate::types::Song;
use crate::ApiError;

///
/// A leaf value, the station mixes quoted and bare numbers
///
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Text(String)
}

impl Scalar {
    /// Whole number view, fractional or non numeric text is None
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Scalar::Int(n) => Some(*n),
            Scalar::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            Scalar::Float(_) => None,
            Scalar::Text(s) => s.trim().parse().ok()
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            Scalar::Int(n) => n.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Text(s) => s.clone()
        }
    }
}

fn int_of(value: &Option<Scalar>) -> i32 {
    match value {
        Some(Scalar::Text(s)) => coerce_int(s),
        Some(other) => other.as_int()
            .and_then(|n| i32::try_from(n).ok())
            .unwrap_or(0),
        None => 0
    }
}

fn seconds_of(value: &Option<Scalar>) -> Duration {
    seconds_from(value.as_ref().and_then(Scalar::as_int).unwrap_or(0))
}

fn text_of(value: &Option<Scalar>) -> String {
    value.as_ref().map(Scalar::to_text).unwrap_or_default()
}

/// Unix epoch seconds to an instant, None when out of range
pub fn epoch_to_instant(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

/// Lenient like every other leaf: non integer or out of range epochs are None
fn deserialize_epoch<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>
{
    let raw = Option::<Scalar>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.as_int()).and_then(epoch_to_instant))
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ServerInfo {
    #[serde(rename = "LASTUPDATE", default, deserialize_with = "deserialize_epoch")]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(rename = "SERVERS", default)]
    pub servers: Option<Scalar>,
    #[serde(rename = "STATUS", default)]
    pub status: Option<Scalar>,
    #[serde(rename = "LISTENERS", default)]
    pub listeners: Option<Scalar>,
    #[serde(rename = "MODE", default)]
    pub mode: Option<Scalar>
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SongInfo {
    #[serde(rename = "TITLE", default)]
    pub title: Option<Scalar>,
    #[serde(rename = "ARTIST", default)]
    pub artist: Option<Scalar>,
    #[serde(rename = "ALBUM", default)]
    pub album: Option<Scalar>,
    #[serde(rename = "YEAR", default)]
    pub year: Option<Scalar>,
    #[serde(rename = "CIRCLE", default)]
    pub circle: Option<Scalar>
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SongTimes {
    #[serde(rename = "DURATION", default)]
    pub duration: Option<Scalar>,
    #[serde(rename = "PLAYED", default)]
    pub played: Option<Scalar>,
    #[serde(rename = "REMAINING", default)]
    pub remaining: Option<Scalar>
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SongData {
    #[serde(rename = "SONGID", default)]
    pub song_id: Option<Scalar>,
    #[serde(rename = "ALBUMID", default)]
    pub album_id: Option<Scalar>,
    #[serde(rename = "RATING", default)]
    pub rating: Option<Scalar>,
    #[serde(rename = "TIMESRATED", default)]
    pub times_rated: Option<Scalar>
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Misc {
    #[serde(rename = "CIRCLELINK", default)]
    pub circle_link: Option<Scalar>,
    #[serde(rename = "ALBUMART", default)]
    pub album_art: Option<Scalar>,
    #[serde(rename = "CIRCLEART", default)]
    pub circle_art: Option<Scalar>
}

/// Whole document, groups other than SERVERINFO are required
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JsonRecord {
    #[serde(rename = "SERVERINFO", default)]
    pub server_info: ServerInfo,
    #[serde(rename = "SONGINFO")]
    pub song_info: SongInfo,
    #[serde(rename = "SONGTIMES")]
    pub song_times: SongTimes,
    #[serde(rename = "SONGDATA")]
    pub song_data: SongData,
    #[serde(rename = "MISC")]
    pub misc: Misc
}

pub fn parse_document(body: &[u8]) -> Result<JsonRecord, ApiError> {
    Ok(serde_json::from_slice(body)?)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBackend;

impl Backend for JsonBackend {
    type Record = JsonRecord;

    fn name(&self) -> &'static str {
        "json"
    }

    fn parse(&self, body: &[u8]) -> Result<JsonRecord, ApiError> {
        parse_document(body)
    }

    fn normalize(&self, record: &JsonRecord, now: DateTime<Utc>) -> Song {
        let played = seconds_of(&record.song_times.played);

        Song {
            title: text_of(&record.song_info.title),
            year: int_of(&record.song_info.year),
            duration: seconds_of(&record.song_times.duration),
            played_duration: played,
            start_time: start_time(now, played),
            album_name: text_of(&record.song_info.album),
            artist_name: text_of(&record.song_info.artist),
            circle_name: text_of(&record.song_info.circle),
            api_song_id: int_of(&record.song_data.song_id),
            api_album_id: int_of(&record.song_data.album_id),
            album_art_filename: text_of(&record.misc.album_art),
            circle_art_filename: text_of(&record.misc.circle_art)
        }
    }
}
