//! Playback state as last observed on the remote player.
//!
//! The state is a plain value, transitions hand back a new one. Anything that may have changed
//! it remotely makes the local copy stale until the next refresh.

use std::fmt;
use std::str::FromStr;

use crate::config::ConfigError;
use crate::utils::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepeatMode {
    #[default]
    Playlist,
    Track,
    None,
}

impl RepeatMode {
    /// The mode after this one when the repeat button is pressed.
    pub fn next(self) -> Self {
        match self {
            RepeatMode::Playlist => RepeatMode::Track,
            RepeatMode::Track => RepeatMode::None,
            RepeatMode::None => RepeatMode::Playlist,
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            RepeatMode::Playlist => "↻",
            RepeatMode::Track => "⇂",
            RepeatMode::None => "→",
        }
    }
}

impl FromStr for RepeatMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "playlist" => Ok(RepeatMode::Playlist),
            "track" => Ok(RepeatMode::Track),
            "none" => Ok(RepeatMode::None),
            _ => Err(ParseError::InvalidArgument),
        }
    }
}

impl fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RepeatMode::Playlist => "Playlist",
            RepeatMode::Track => "Track",
            RepeatMode::None => "None",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayState {
    Playing,
    #[default]
    Paused,
    /// Stopped, or the player said something we do not understand.
    Stopped,
}

impl fmt::Display for PlayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PlayState::Playing => "playing",
            PlayState::Paused => "paused",
            PlayState::Stopped => "stopped",
        })
    }
}

/// Volume in percent, always within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Volume(u8);

impl Volume {
    pub const MAX: Volume = Volume(100);

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::MAX
    }
}

impl TryFrom<i64> for Volume {
    type Error = ConfigError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match u8::try_from(value) {
            Ok(percent) if percent <= 100 => Ok(Volume(percent)),
            _ => Err(ConfigError::VolumeOutOfRange(value)),
        }
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackState {
    pub repeat: RepeatMode,
    pub shuffle: bool,
    pub play: PlayState,
    pub volume: Volume,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            repeat: RepeatMode::Playlist,
            shuffle: true,
            play: PlayState::Paused,
            volume: Volume::MAX,
        }
    }
}

impl PlaybackState {
    #[must_use]
    pub fn with_repeat(self, repeat: RepeatMode) -> Self {
        Self { repeat, ..self }
    }

    #[must_use]
    pub fn with_shuffle(self, shuffle: bool) -> Self {
        Self { shuffle, ..self }
    }

    #[must_use]
    pub fn with_play(self, play: PlayState) -> Self {
        Self { play, ..self }
    }

    #[must_use]
    pub fn with_volume(self, volume: Volume) -> Self {
        Self { volume, ..self }
    }

    #[must_use]
    pub fn cycled_repeat(self) -> Self {
        self.with_repeat(self.repeat.next())
    }

    #[must_use]
    pub fn toggled_shuffle(self) -> Self {
        self.with_shuffle(!self.shuffle)
    }
}
