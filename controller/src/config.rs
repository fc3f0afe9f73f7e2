//! Start-up configuration.
//!
//! The front end collects its arguments into a flat key/value map, [`Parameters::from_map`] turns
//! the recognised keys into typed values. [`Paths`] holds the fixed on-disk locations.

use nix::unistd::getuid;
use nom::character::complete::{alpha1, digit1};
use nom::combinator::{all_consuming, opt, recognize};
use nom::{IResult, Parser};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

use crate::artwork::DEFAULT_ARTWORK;
use crate::utils::ParseError;
use crate::utils::address::HostAddress;

/// Keys [`Parameters::from_map`] understands.
pub const RECOGNISED_KEYS: [&str; 7] = [
    "mode",
    "remoteHost",
    "remotePort",
    "remoteUser",
    "password",
    "ssh_keyfile",
    "seek",
];

#[derive(Debug, PartialEq, Error)]
pub enum ConfigError {
    #[error("no recognised parameters were given")]
    NoParameters,
    #[error("unknown mode `{0}`, expected cmus, ssh or playerctl")]
    InvalidMode(String),
    #[error("invalid port `{0}`")]
    InvalidPort(String),
    #[error("invalid remote host `{0}`, expected a dotted-quad address")]
    InvalidHost(String),
    #[error("invalid seek duration `{0}`")]
    InvalidSeek(String),
    #[error("invalid volume {0}, expected 0 to 100")]
    VolumeOutOfRange(i64),
}

/// How the remote player is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// `cmus-remote` talking to a cmus server.
    Cmus,
    /// `playerctl` and `pactl` run through ssh.
    Ssh,
}

impl Mode {
    pub fn default_port(self) -> u16 {
        match self {
            Mode::Cmus => 3000,
            Mode::Ssh => 22,
        }
    }
}

impl FromStr for Mode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cmus" => Ok(Mode::Cmus),
            "ssh" | "playerctl" => Ok(Mode::Ssh),
            _ => Err(ParseError::InvalidArgument),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Cmus => "cmus",
            Mode::Ssh => "ssh",
        })
    }
}

/// Seek step handed verbatim to the player, e.g. `5S`.
///
/// Digits with an optional alphabetic unit, nothing else ends up on a remote command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeekDuration(String);

fn seek_step(input: &str) -> IResult<&str, &str> {
    recognize((digit1, opt(alpha1))).parse(input)
}

impl Default for SeekDuration {
    fn default() -> Self {
        Self("5S".to_string())
    }
}

impl FromStr for SeekDuration {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        all_consuming(seek_step)
            .parse(s)
            .map(|(_, step)| Self(step.to_string()))
            .map_err(|_| ParseError::InvalidArgument)
    }
}

impl fmt::Display for SeekDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub mode: Mode,
    pub host: Option<HostAddress>,
    pub port: u16,
    pub user: Option<String>,
    /// Password of the cmus server, ssh asks for its own.
    pub password: Option<String>,
    pub keyfile: Option<PathBuf>,
    pub seek: SeekDuration,
}

impl Parameters {
    /// Builds [`Parameters`] from the recognised keys of `map`, unknown keys are ignored.
    ///
    /// # Errors
    /// [`ConfigError::NoParameters`] if none of [`RECOGNISED_KEYS`] is present, otherwise the
    /// first value that fails to parse.
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self, ConfigError> {
        if !RECOGNISED_KEYS.iter().any(|key| map.contains_key(*key)) {
            return Err(ConfigError::NoParameters);
        }

        let mode = match map.get("mode") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidMode(value.clone()))?,
            None => Mode::Ssh,
        };
        let host = map
            .get("remoteHost")
            .map(|value| {
                value
                    .parse::<HostAddress>()
                    .map_err(|_| ConfigError::InvalidHost(value.clone()))
            })
            .transpose()?;
        let port = match map.get("remotePort") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidPort(value.clone()))?,
            None => mode.default_port(),
        };
        let seek = match map.get("seek") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidSeek(value.clone()))?,
            None => SeekDuration::default(),
        };

        Ok(Self {
            mode,
            host,
            port,
            user: map.get("remoteUser").cloned(),
            password: map.get("password").cloned(),
            keyfile: map.get("ssh_keyfile").map(PathBuf::from),
            seek,
        })
    }
}

/// Where things live on disk.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Host lock markers and ssh control sockets.
    pub lock_dir: PathBuf,
    /// Downloaded artwork.
    pub cache_dir: PathBuf,
    /// Shown when there is no artwork.
    pub placeholder: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            lock_dir: PathBuf::from("/tmp/remote-media-controller"),
            cache_dir: sys_cache_dir(),
            placeholder: PathBuf::from(DEFAULT_ARTWORK),
        }
    }
}

// Does not survive a reboot
fn sys_cache_dir() -> PathBuf {
    PathBuf::from(format!("/tmp/user/{}", getuid()))
}
