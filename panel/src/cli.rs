//! Command line of `rmc-panel`

use clap::{ArgAction, CommandFactory, Parser};
use std::collections::HashMap;

#[derive(Debug, Parser)]
#[command(
    version,
    about = "Control a media player on another host",
    disable_help_flag = true
)]
pub struct Cli {
    #[arg(
        short = 'm',
        long = "mode",
        value_name = "MODE",
        help = "Backend to use: cmus, ssh or playerctl."
    )]
    pub mode: Option<String>,

    #[arg(
        short = 'h',
        long = "ip",
        value_name = "ADDRESS",
        help = "Dotted-quad address of the host to control."
    )]
    pub ip: Option<String>,

    #[arg(
        short = 'P',
        long = "port",
        value_name = "PORT",
        help = "Port of the cmus server or the ssh daemon."
    )]
    pub port: Option<String>,

    #[arg(
        short = 'u',
        long = "user",
        value_name = "USER",
        help = "User to log in as over ssh."
    )]
    pub user: Option<String>,

    #[arg(
        short = 'p',
        long = "password",
        value_name = "PASSWORD",
        help = "Password of the cmus server."
    )]
    pub password: Option<String>,

    #[arg(
        short = 'k',
        long = "keyfile",
        value_name = "FILE",
        help = "Private key used by ssh."
    )]
    pub keyfile: Option<String>,

    #[arg(
        short = 's',
        long = "seek",
        value_name = "DURATION",
        help = "How far to seek, e.g. 5S or 1M."
    )]
    pub seek: Option<String>,

    #[arg(short = 'v', long = "verbose", help = "Log debug messages.")]
    pub verbose: bool,

    #[arg(long = "help", action = ArgAction::Help, help = "Print help.")]
    help: Option<bool>,
}

impl Cli {
    /// Parameters in the form the controller reads them.
    pub fn to_map(&self) -> HashMap<String, String> {
        [
            ("mode", &self.mode),
            ("remoteHost", &self.ip),
            ("remotePort", &self.port),
            ("remoteUser", &self.user),
            ("password", &self.password),
            ("ssh_keyfile", &self.keyfile),
            ("seek", &self.seek),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_ref().map(|v| (key.to_string(), v.clone())))
        .collect()
    }
}

pub fn usage() -> String {
    Cli::command().render_help().to_string()
}
