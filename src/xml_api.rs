//!
//! src/xml_api.rs  Andrew Belles  Oct 17th, 2026
//!
//! Legacy XML backend. The document carries four sections whose
//! children are flattened into string maps, normalization pulls
//! the song out of those maps
//!

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use chrono::{DateTime, Utc};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use tracing::debug;

use crate::backend::Backend;
use crate::normalize::{coerce_int, coerce_seconds, start_time};
use crate::types::Song;
use crate::ApiError;

pub const SERVER_INFO: &str = "SERVERINFO";
pub const SONG_INFO: &str = "SONGINFO";
pub const SONG_TIMES: &str = "SONGTIMES";
pub const MISC: &str = "MISC";

const SECTIONS: [&str; 4] = [SERVER_INFO, SONG_INFO, SONG_TIMES, MISC];

/// Stored in place of empty child text so lookups always find the key
pub const EMPTY_SENTINEL: &str = "0";

///
/// Children of one section, tag name -> inner text
///
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    values: HashMap<String, String>,
    blank: HashSet<String>
}

impl Section {
    /// First occurrence of a tag wins
    fn insert(&mut self, key: String, text: String) {
        if self.values.contains_key(&key) {
            debug!(key = %key, "xml.section.duplicate");
            return;
        }
        if text.is_empty() {
            self.blank.insert(key.clone());
            self.values.insert(key, EMPTY_SENTINEL.to_string());
        } else {
            self.values.insert(key, text);
        }
    }

    /// Raw stored value, sentinel included
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn number(&self, key: &str) -> i32 {
        self.get(key).map(coerce_int).unwrap_or(0)
    }

    pub fn seconds(&self, key: &str) -> Duration {
        self.get(key).map(coerce_seconds).unwrap_or(Duration::ZERO)
    }

    /// Text fields read blank children back as "" instead of the sentinel
    pub fn text(&self, key: &str) -> String {
        if self.blank.contains(key) {
            return String::new();
        }
        self.get(key).unwrap_or_default().to_string()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlRecord {
    pub server_info: Section,
    pub song_info: Section,
    pub song_times: Section,
    pub misc: Section
}

fn malformed(e: impl std::fmt::Display) -> ApiError {
    ApiError::Malformed(format!("xml: {e}"))
}

fn tag_name(name: &[u8]) -> String {
    String::from_utf8_lossy(name).into_owned()
}

fn section_index(name: &str) -> Option<usize> {
    SECTIONS.iter().position(|s| *s == name)
}

/// Parse the document and collect the four sections. Sections are looked
/// up anywhere in the tree, the first one of each name is used
pub fn parse_document(body: &[u8]) -> Result<XmlRecord, ApiError> {
    // no trimming, leaf text is kept exactly as sent
    let mut reader = Reader::from_reader(body);

    let mut buf = Vec::new();
    let mut depth = 0_usize;
    let mut saw_root = false;
    let mut found: [Option<Section>; 4] = Default::default();

    // (section index, element depth, collected children)
    let mut active: Option<(usize, usize, Section)> = None;
    // (tag, element depth, inner text so far)
    let mut child: Option<(String, usize, String)> = None;

    loop {
        match reader.read_event_into(&mut buf).map_err(malformed)? {
            Event::Start(e) => {
                if depth == 0 {
                    if saw_root {
                        return Err(malformed("multiple root elements"));
                    }
                    saw_root = true;
                }
                depth += 1;
                let name = tag_name(e.name().as_ref());

                match active.as_ref().map(|(_, d, _)| *d) {
                    Some(section_depth) => {
                        if child.is_none() && depth == section_depth + 1 {
                            child = Some((name, depth, String::new()));
                        }
                    }
                    None => {
                        if let Some(idx) = section_index(&name) {
                            if found[idx].is_none() {
                                active = Some((idx, depth, Section::default()));
                            }
                        }
                    }
                }
            }
            Event::Empty(e) => {
                if depth == 0 {
                    if saw_root {
                        return Err(malformed("multiple root elements"));
                    }
                    saw_root = true;
                }
                let name = tag_name(e.name().as_ref());

                match active.as_mut() {
                    Some((_, section_depth, section)) => {
                        if child.is_none() && depth == *section_depth {
                            section.insert(name, String::new());
                        }
                    }
                    None => {
                        if let Some(idx) = section_index(&name) {
                            if found[idx].is_none() {
                                found[idx] = Some(Section::default());
                            }
                        }
                    }
                }
            }
            Event::Text(e) => {
                // whitespace around the root element is not content
                if depth == 0 && !e.iter().all(u8::is_ascii_whitespace) {
                    return Err(malformed("text outside of root element"));
                }
                if let Some((_, _, text)) = child.as_mut() {
                    text.push_str(&e.unescape().map_err(malformed)?);
                }
            }
            Event::CData(e) => {
                if let Some((_, _, text)) = child.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(_) => {
                if depth == 0 {
                    return Err(malformed("unbalanced end tag"));
                }
                if child.as_ref().is_some_and(|(_, d, _)| *d == depth) {
                    if let (Some((name, _, text)), Some((_, _, section))) =
                        (child.take(), active.as_mut()) {
                        section.insert(name, text);
                    }
                } else if active.as_ref().is_some_and(|(_, d, _)| *d == depth) {
                    if let Some((idx, _, section)) = active.take() {
                        found[idx] = Some(section);
                    }
                }
                depth -= 1;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if depth != 0 {
        return Err(malformed("unexpected end of document"));
    }
    if !saw_root {
        return Err(malformed("no root element"));
    }

    let [server_info, song_info, song_times, misc] = found;
    let require = |section: Option<Section>, name: &str| {
        section.ok_or_else(|| malformed(format!("missing section {name}")))
    };

    Ok( XmlRecord {
        server_info: require(server_info, SERVER_INFO)?,
        song_info: require(song_info, SONG_INFO)?,
        song_times: require(song_times, SONG_TIMES)?,
        misc: require(misc, MISC)?
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct XmlBackend;

impl Backend for XmlBackend {
    type Record = XmlRecord;

    fn name(&self) -> &'static str {
        "xml"
    }

    fn parse(&self, body: &[u8]) -> Result<XmlRecord, ApiError> {
        parse_document(body)
    }

    fn normalize(&self, record: &XmlRecord, now: DateTime<Utc>) -> Song {
        let played = record.song_times.seconds("PLAYED");

        Song {
            title: record.song_info.text("TITLE"),
            year: record.song_info.number("YEAR"),
            duration: record.song_times.seconds("DURATION"),
            played_duration: played,
            start_time: start_time(now, played),
            album_name: record.song_info.text("ALBUM"),
            artist_name: record.song_info.text("ARTIST"),
            circle_name: record.song_info.text("CIRCLE"),
            api_song_id: record.misc.number("SONGID"),
            api_album_id: record.misc.number("ALBUMID"),
            album_art_filename: record.misc.text("ALBUMART"),
            circle_art_filename: record.misc.text("CIRCLEART")
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use super::*;

    const DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<GENSOKYORADIODATA>
  <SERVERINFO>
    <LASTUPDATE>1573941300</LASTUPDATE>
    <STATUS>ONLINE</STATUS>
    <LISTENERS>212</LISTENERS>
  </SERVERINFO>
  <SONGINFO>
    <TITLE>Reblue</TITLE>
    <ARTIST>foo</ARTIST>
    <ALBUM>Touhou &amp; Friends</ALBUM>
    <YEAR>2019</YEAR>
    <CIRCLE>Liz Triangle</CIRCLE>
  </SONGINFO>
  <SONGTIMES>
    <DURATION>240</DURATION>
    <PLAYED>60</PLAYED>
    <REMAINING>180</REMAINING>
  </SONGTIMES>
  <MISC>
    <SONGID>7012</SONGID>
    <ALBUMID>933</ALBUMID>
    <ALBUMART>reblue.jpg</ALBUMART>
    <CIRCLEART>liz.png</CIRCLEART>
  </MISC>
</GENSOKYORADIODATA>"#;

    #[test]
    fn parses_all_sections() {
        let record = parse_document(DOCUMENT.as_bytes()).unwrap();
        assert_eq!(record.server_info.get("LISTENERS"), Some("212"));
        assert_eq!(record.song_info.get("ALBUM"), Some("Touhou & Friends"));
        assert_eq!(record.song_times.len(), 3);
        let mut times: Vec<_> = record.song_times.iter().collect();
        times.sort();
        assert_eq!(times, vec![("DURATION", "240"), ("PLAYED", "60"), ("REMAINING", "180")]);
        assert_eq!(record.misc.get("ALBUMART"), Some("reblue.jpg"));
    }

    #[test]
    fn normalizes_document() {
        let now = Utc::now();
        let song = XmlBackend.normalize(&parse_document(DOCUMENT.as_bytes()).unwrap(), now);
        assert_eq!(song.title, "Reblue");
        assert_eq!(song.year, 2019);
        assert_eq!(song.duration, Duration::from_secs(240));
        assert_eq!(song.played_duration, Duration::from_secs(60));
        assert_eq!(now - song.start_time, TimeDelta::seconds(60));
        assert_eq!(song.artist_name, "foo");
        assert_eq!(song.circle_name, "Liz Triangle");
        assert_eq!(song.album_art_filename, "reblue.jpg");
        assert_eq!(song.circle_art_filename, "liz.png");
    }

    #[test]
    fn song_and_album_ids_are_independent() {
        let song = XmlBackend.normalize(&parse_document(DOCUMENT.as_bytes()).unwrap(), Utc::now());
        assert_eq!(song.api_song_id, 7012);
        assert_eq!(song.api_album_id, 933);
    }

    #[test]
    fn empty_children_become_sentinel() {
        let doc = DOCUMENT
            .replace("<YEAR>2019</YEAR>", "<YEAR></YEAR>")
            .replace("<SONGID>7012</SONGID>", "<SONGID/>")
            .replace("<TITLE>Reblue</TITLE>", "<TITLE></TITLE>");
        let record = parse_document(doc.as_bytes()).unwrap();
        assert_eq!(record.song_info.get("YEAR"), Some(EMPTY_SENTINEL));
        assert_eq!(record.misc.get("SONGID"), Some(EMPTY_SENTINEL));

        let song = XmlBackend.normalize(&record, Utc::now());
        assert_eq!(song.year, 0);
        assert_eq!(song.api_song_id, 0);
        assert_eq!(song.api_album_id, 933);
        assert_eq!(song.title, "");
    }

    #[test]
    fn text_fields_are_copied_verbatim() {
        let doc = DOCUMENT
            .replace("<TITLE>Reblue</TITLE>", "<TITLE> Reblue </TITLE>")
            .replace("<ALBUMART>reblue.jpg</ALBUMART>", "<ALBUMART>\treblue.jpg\n</ALBUMART>")
            .replace("<YEAR>2019</YEAR>", "<YEAR> 2019 </YEAR>");
        let song = XmlBackend.normalize(&parse_document(doc.as_bytes()).unwrap(), Utc::now());
        assert_eq!(song.title, " Reblue ");
        assert_eq!(song.album_art_filename, "\treblue.jpg\n");
        assert_eq!(song.year, 2019);
    }

    #[test]
    fn both_backends_agree_on_padded_text() {
        let xml = DOCUMENT.replace("<TITLE>Reblue</TITLE>", "<TITLE> Reblue </TITLE>");
        let json = r#"{"SONGINFO":{"TITLE":" Reblue "},"SONGTIMES":{},"SONGDATA":{},"MISC":{}}"#;
        let now = Utc::now();
        let from_xml = XmlBackend.normalize(&parse_document(xml.as_bytes()).unwrap(), now);
        let from_json = crate::json_api::JsonBackend
            .normalize(&crate::json_api::parse_document(json.as_bytes()).unwrap(), now);
        assert_eq!(from_xml.title, from_json.title);
    }

    #[test]
    fn literal_zero_title_is_kept() {
        let doc = DOCUMENT.replace("<TITLE>Reblue</TITLE>", "<TITLE>0</TITLE>");
        let song = XmlBackend.normalize(&parse_document(doc.as_bytes()).unwrap(), Utc::now());
        assert_eq!(song.title, "0");
    }

    #[test]
    fn unparsable_numbers_degrade_to_zero() {
        let doc = DOCUMENT
            .replace("<YEAR>2019</YEAR>", "<YEAR>unknown</YEAR>")
            .replace("<DURATION>240</DURATION>", "<DURATION>4:00</DURATION>")
            .replace("<PLAYED>60</PLAYED>", "");
        let now = Utc::now();
        let song = XmlBackend.normalize(&parse_document(doc.as_bytes()).unwrap(), now);
        assert_eq!(song.year, 0);
        assert_eq!(song.duration, Duration::ZERO);
        assert_eq!(song.played_duration, Duration::ZERO);
        assert_eq!(song.start_time, now);
    }

    #[test]
    fn huge_played_keeps_start_time_consistent() {
        let doc = DOCUMENT.replace("<PLAYED>60</PLAYED>", "<PLAYED>99999999999999</PLAYED>");
        let now = Utc::now();
        let song = XmlBackend.normalize(&parse_document(doc.as_bytes()).unwrap(), now);
        assert_eq!(song.played_duration, Duration::ZERO);
        assert_eq!(song.start_time, now);
    }

    #[test]
    fn missing_section_is_malformed() {
        for section in SECTIONS {
            let open = format!("<{section}>");
            let close = format!("</{section}>");
            let start = DOCUMENT.find(&open).unwrap();
            let end = DOCUMENT.find(&close).unwrap() + close.len();
            let doc = format!("{}{}", &DOCUMENT[..start], &DOCUMENT[end..]);
            let result = parse_document(doc.as_bytes());
            assert!(matches!(result, Err(ApiError::Malformed(_))), "{section} not required");
        }
    }

    #[test]
    fn empty_section_counts_as_present() {
        let doc = DOCUMENT.replace(
            &DOCUMENT[DOCUMENT.find("<SERVERINFO>").unwrap()
                ..DOCUMENT.find("</SERVERINFO>").unwrap() + "</SERVERINFO>".len()],
            "<SERVERINFO/>"
        );
        let record = parse_document(doc.as_bytes()).unwrap();
        assert!(record.server_info.is_empty());
    }

    #[test]
    fn first_duplicate_wins() {
        let doc = DOCUMENT.replace("<TITLE>Reblue</TITLE>", "<TITLE>Reblue</TITLE><TITLE>Other</TITLE>");
        let record = parse_document(doc.as_bytes()).unwrap();
        assert_eq!(record.song_info.get("TITLE"), Some("Reblue"));
    }

    #[test]
    fn sections_found_at_any_depth() {
        let doc = "<ROOT><DATA><SERVERINFO/><SONGINFO><TITLE>x</TITLE></SONGINFO></DATA>\
                   <SONGTIMES><PLAYED>5</PLAYED></SONGTIMES><MISC/></ROOT>";
        let record = parse_document(doc.as_bytes()).unwrap();
        assert_eq!(record.song_info.get("TITLE"), Some("x"));
        assert_eq!(record.song_times.seconds("PLAYED"), Duration::from_secs(5));
    }

    #[test]
    fn nested_child_text_is_concatenated() {
        let doc = DOCUMENT.replace("<CIRCLE>Liz Triangle</CIRCLE>", "<CIRCLE><NAME>Liz</NAME></CIRCLE>");
        let record = parse_document(doc.as_bytes()).unwrap();
        assert_eq!(record.song_info.get("CIRCLE"), Some("Liz"));
        assert!(record.song_info.get("NAME").is_none());
    }

    #[test]
    fn broken_documents_are_malformed() {
        let truncated = &DOCUMENT[..DOCUMENT.len() / 2];
        let cases = [
            "",
            "not xml at all",
            truncated,
            "<A><SERVERINFO></A>",
            "<A/><B/>",
        ];
        for case in cases {
            assert!(
                matches!(parse_document(case.as_bytes()), Err(ApiError::Malformed(_))),
                "{case:?} accepted"
            );
        }
    }
}
