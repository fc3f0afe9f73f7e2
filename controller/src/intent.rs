//! Playback intents and their wire forms.
//!
//! An [`Intent`] is what the user asked for, independent of how the player is reached.
//! [`translate`] turns it into the [`WireCommand`] of a given [`Mode`], or `None` if that mode
//! cannot express it.

use std::fmt;

use crate::config::{Mode, SeekDuration};
use crate::state::{RepeatMode, Volume};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    PlayPause,
    Previous,
    Next,
    SeekBack,
    SeekForward,
    ShuffleToggle,
    RepeatSet(RepeatMode),
    VolumeSet(Volume),
}

/// Read-only requests used to refresh the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    Metadata,
    Status,
    Loop,
    Shuffle,
    Volume,
    /// Everything at once, only cmus can do that.
    Everything,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Program {
    CmusRemote,
    Playerctl,
    Pactl,
}

impl Program {
    pub fn binary(self) -> &'static str {
        match self {
            Program::CmusRemote => "cmus-remote",
            Program::Playerctl => "playerctl",
            Program::Pactl => "pactl",
        }
    }
}

/// A program and the arguments it is run with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireCommand {
    pub program: Program,
    pub args: Vec<String>,
}

impl WireCommand {
    fn new(program: Program, args: &[&str]) -> Self {
        Self {
            program,
            args: args.iter().map(ToString::to_string).collect(),
        }
    }
}

/// The player program of a mode is implied, anything else is spelled out.
impl fmt::Display for WireCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.program == Program::Pactl {
            write!(f, "{} ", self.program.binary())?;
        }
        f.write_str(&self.args.join(" "))
    }
}

/// Translates an [`Intent`] for the given [`Mode`].
///
/// Returns `None` when the mode has no equivalent, currently only repeat under cmus.
pub fn translate(intent: Intent, mode: Mode, seek: &SeekDuration) -> Option<WireCommand> {
    let wire = match (mode, intent) {
        (Mode::Cmus, Intent::PlayPause) => WireCommand::new(Program::CmusRemote, &["-u"]),
        (Mode::Cmus, Intent::Previous) => WireCommand::new(Program::CmusRemote, &["-r"]),
        (Mode::Cmus, Intent::Next) => WireCommand::new(Program::CmusRemote, &["-n"]),
        (Mode::Cmus, Intent::SeekBack) => {
            WireCommand::new(Program::CmusRemote, &["-k", &format!("-{seek}")])
        }
        (Mode::Cmus, Intent::SeekForward) => {
            WireCommand::new(Program::CmusRemote, &["-k", &format!("+{seek}")])
        }
        (Mode::Cmus, Intent::ShuffleToggle) => WireCommand::new(Program::CmusRemote, &["-S"]),
        // TODO: cmus-remote can set repeat with `-R` and `-C "set repeat_current=true"`
        (Mode::Cmus, Intent::RepeatSet(_)) => return None,
        (Mode::Cmus, Intent::VolumeSet(volume)) => {
            WireCommand::new(Program::CmusRemote, &["-v", &format!("{volume}%")])
        }

        (Mode::Ssh, Intent::PlayPause) => WireCommand::new(Program::Playerctl, &["play-pause"]),
        (Mode::Ssh, Intent::Previous) => WireCommand::new(Program::Playerctl, &["previous"]),
        (Mode::Ssh, Intent::Next) => WireCommand::new(Program::Playerctl, &["next"]),
        (Mode::Ssh, Intent::SeekBack) => {
            WireCommand::new(Program::Playerctl, &["position", &format!("{seek}-")])
        }
        (Mode::Ssh, Intent::SeekForward) => {
            WireCommand::new(Program::Playerctl, &["position", &format!("{seek}+")])
        }
        (Mode::Ssh, Intent::ShuffleToggle) => {
            WireCommand::new(Program::Playerctl, &["shuffle", "toggle"])
        }
        (Mode::Ssh, Intent::RepeatSet(repeat)) => {
            WireCommand::new(Program::Playerctl, &["loop", &repeat.to_string()])
        }
        // playerctl cannot change the volume of every player, go through the sound server
        (Mode::Ssh, Intent::VolumeSet(volume)) => WireCommand::new(
            Program::Pactl,
            &["set-sink-volume", "@DEFAULT_SINK@", &format!("{volume}%")],
        ),
    };
    Some(wire)
}

/// The [`WireCommand`] answering a [`Query`] in the given [`Mode`].
pub fn query(query: Query, mode: Mode) -> Option<WireCommand> {
    let wire = match (mode, query) {
        (Mode::Cmus, Query::Everything) => WireCommand::new(Program::CmusRemote, &["-Q"]),
        (Mode::Cmus, _) | (Mode::Ssh, Query::Everything) => return None,
        (Mode::Ssh, Query::Metadata) => WireCommand::new(Program::Playerctl, &["metadata"]),
        (Mode::Ssh, Query::Status) => WireCommand::new(Program::Playerctl, &["status"]),
        (Mode::Ssh, Query::Loop) => WireCommand::new(Program::Playerctl, &["loop"]),
        (Mode::Ssh, Query::Shuffle) => WireCommand::new(Program::Playerctl, &["shuffle"]),
        (Mode::Ssh, Query::Volume) => {
            WireCommand::new(Program::Pactl, &["get-sink-volume", "@DEFAULT_SINK@"])
        }
    };
    Some(wire)
}
