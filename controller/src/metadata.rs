//! Parsers for what remote players print.
//!
//! None of these fail. Players print whatever they like, a line that is not understood is
//! skipped and a field that never shows up keeps its default.

use nom::branch::alt;
use nom::bytes::complete::{tag, take_till1};
use nom::character::complete::{multispace0, space1};
use nom::combinator::{map, rest};
use nom::sequence::{pair, preceded, separated_pair};
use nom::{IResult, Parser};
use std::path::PathBuf;

use crate::artwork::DEFAULT_ARTWORK;
use crate::state::{PlayState, RepeatMode, Volume};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackMetadata {
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Local artwork file.
    pub image: PathBuf,
    /// Artwork path on the remote host, still to be mirrored into [`TrackMetadata::image`].
    pub remote_art: Option<String>,
}

impl Default for TrackMetadata {
    fn default() -> Self {
        Self {
            title: "Unknown Track".to_string(),
            artist: "Unknown Artist".to_string(),
            album: "Unknown Album".to_string(),
            image: PathBuf::from(DEFAULT_ARTWORK),
            remote_art: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Artist,
    Album,
    Title,
    ArtUrl,
}

impl Marker {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "xesam:artist" => Some(Marker::Artist),
            "xesam:album" => Some(Marker::Album),
            "xesam:title" => Some(Marker::Title),
            "mpris:artUrl" => Some(Marker::ArtUrl),
            _ => None,
        }
    }
}

fn token(input: &str) -> IResult<&str, &str> {
    preceded(multispace0, take_till1(char::is_whitespace)).parse(input)
}

/// Finds the first marker on a line, together with the rest of the line.
fn marker_value(line: &str) -> Option<(Marker, &str)> {
    let mut input = line;
    while let Ok((remaining, word)) = token(input) {
        if let Some(marker) = Marker::from_token(word) {
            return Some((marker, remaining.trim()));
        }
        input = remaining;
    }
    None
}

/// Reduces an `mpris:artUrl` value to a plain path.
///
/// Only `file://` URLs point at something that can be copied.
fn art_path(url: &str) -> Option<String> {
    let (_, path) = url.split_once("file://")?;
    let path = path.trim();
    if path.is_empty() {
        return None;
    }
    let decoded = match urlencoding::decode(path) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => path.replace("%20", " "),
    };
    Some(decoded)
}

/// Parses `playerctl metadata` output.
///
/// Each line is scanned for the `xesam:artist`, `xesam:album`, `xesam:title` and `mpris:artUrl`
/// markers, the value is whatever follows the marker on that line. Later lines win.
pub fn parse_metadata(text: &str) -> TrackMetadata {
    let mut metadata = TrackMetadata::default();
    for line in text.lines() {
        match marker_value(line) {
            Some((Marker::Artist, value)) => value.clone_into(&mut metadata.artist),
            Some((Marker::Album, value)) => value.clone_into(&mut metadata.album),
            Some((Marker::Title, value)) => value.clone_into(&mut metadata.title),
            Some((Marker::ArtUrl, value)) => {
                metadata.remote_art = art_path(value);
                if metadata.remote_art.is_none() {
                    log::debug!("ignoring artwork `{value}`, not a local file");
                }
            }
            None => {}
        }
    }
    metadata
}

/// Parses `playerctl status` output.
pub fn parse_status(text: &str) -> PlayState {
    match text.trim().to_lowercase().as_str() {
        "playing" => PlayState::Playing,
        "paused" => PlayState::Paused,
        _ => PlayState::Stopped,
    }
}

/// Parses the output of `playerctl loop` followed by `playerctl shuffle`.
///
/// Both values are newline terminated, so the text must not be trimmed beforehand.
/// Returns `None` unless exactly two lines are present and the first is a repeat mode.
pub fn parse_loop_and_shuffle(text: &str) -> Option<(RepeatMode, bool)> {
    let mut lines: Vec<&str> = text.split('\n').collect();
    lines.pop();
    let [repeat, shuffle] = lines.as_slice() else {
        return None;
    };
    let repeat = repeat.trim().parse().ok()?;
    Some((repeat, *shuffle == "On"))
}

/// Parses `pactl get-sink-volume` output, e.g.
/// `Volume: front-left: 42597 /  65% / -11.23 dB, ...`.
pub fn parse_volume(text: &str) -> Option<Volume> {
    let before = text.split('%').next()?;
    let percent = before.split(' ').next_back()?;
    Volume::try_from(percent.parse::<i64>().ok()?).ok()
}

/// Everything `cmus-remote -Q` reports that the panel shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CmusStatus {
    pub metadata: TrackMetadata,
    pub play: PlayState,
    pub repeat: Option<RepeatMode>,
    pub shuffle: Option<bool>,
    pub volume: Option<Volume>,
}

enum CmusLine<'a> {
    Status(&'a str),
    Tag(&'a str, &'a str),
    Set(&'a str, &'a str),
}

fn key_value(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(take_till1(char::is_whitespace), space1, rest).parse(input)
}

fn cmus_line(input: &str) -> IResult<&str, CmusLine<'_>> {
    alt((
        map(preceded(pair(tag("status"), space1), rest), CmusLine::Status),
        map(preceded(pair(tag("tag"), space1), key_value), |(k, v)| {
            CmusLine::Tag(k, v)
        }),
        map(preceded(pair(tag("set"), space1), key_value), |(k, v)| {
            CmusLine::Set(k, v)
        }),
    ))
    .parse(input)
}

/// Parses `cmus-remote -Q` output.
pub fn parse_cmus_status(text: &str) -> CmusStatus {
    let mut status = CmusStatus {
        play: PlayState::Stopped,
        ..CmusStatus::default()
    };
    let mut repeat = None;
    let mut repeat_current = None;

    for line in text.lines() {
        let Ok((_, parsed)) = cmus_line(line.trim_end()) else {
            continue;
        };
        match parsed {
            CmusLine::Status(value) => status.play = parse_status(value),
            CmusLine::Tag("title", value) => value.trim().clone_into(&mut status.metadata.title),
            CmusLine::Tag("artist", value) => {
                value.trim().clone_into(&mut status.metadata.artist);
            }
            CmusLine::Tag("album", value) => value.trim().clone_into(&mut status.metadata.album),
            CmusLine::Set("vol_left", value) => {
                status.volume = value
                    .trim()
                    .parse::<i64>()
                    .ok()
                    .and_then(|v| Volume::try_from(v).ok());
            }
            // Older versions say true/false, newer ones off/tracks/albums
            CmusLine::Set("shuffle", value) => {
                status.shuffle = Some(!matches!(value.trim(), "false" | "off"));
            }
            CmusLine::Set("repeat", value) => repeat = Some(value.trim() == "true"),
            CmusLine::Set("repeat_current", value) => {
                repeat_current = Some(value.trim() == "true");
            }
            CmusLine::Tag(..) | CmusLine::Set(..) => {}
        }
    }

    status.repeat = match (repeat_current, repeat) {
        (Some(true), _) => Some(RepeatMode::Track),
        (_, Some(true)) => Some(RepeatMode::Playlist),
        (None, None) => None,
        _ => Some(RepeatMode::None),
    };
    status
}
