//! Generates `cmus-remote` invocations.

use std::path::Path;
use std::process::Command;

use crate::backends::Backend;
use crate::config::Mode;
use crate::intent::WireCommand;
use crate::session::Target;

/// Talks to a cmus server, each command opens its own connection.
pub struct Cmus;

impl Backend for Cmus {
    fn mode(&self) -> Mode {
        Mode::Cmus
    }

    fn sys_command(&self, target: &Target<'_>, wire: &WireCommand) -> Command {
        let mut sys_cmd = Command::new(wire.program.binary());
        sys_cmd
            .arg("--server")
            .arg(format!("{}:{}", target.host, target.port));
        if let Some(password) = target.password {
            sys_cmd.arg("--passwd").arg(password);
        }
        sys_cmd.args(&wire.args);
        sys_cmd
    }

    /// cmus has no way to transfer files.
    fn fetch_command(&self, _target: &Target<'_>, _remote: &str, _local: &Path) -> Option<Command> {
        None
    }
}
