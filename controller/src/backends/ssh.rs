//! Generates `ssh` and `scp` invocations running `playerctl` and `pactl` remotely.
//!
//! All of them go through one master connection per host, so the password is only asked once.
//! The remote side joins the arguments into a shell command line, which is why each of them is
//! quoted here.

use smol::process::Stdio;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use crate::backends::Backend;
use crate::config::Mode;
use crate::intent::WireCommand;
use crate::session::{Channel, SessionError, SshMaster, Target};
use crate::utils::interrupt::InterruptGuard;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct Ssh {
    control_dir: PathBuf,
    program: String,
    leading: Vec<String>,
}

impl Ssh {
    /// Control sockets of master connections are created inside `control_dir`.
    pub fn new(control_dir: impl Into<PathBuf>) -> Self {
        Self::with_program(control_dir, "ssh", &[])
    }

    /// Runs `program` followed by `leading` wherever `ssh` would run, e.g. a wrapper script.
    pub fn with_program(control_dir: impl Into<PathBuf>, program: &str, leading: &[&str]) -> Self {
        Self {
            control_dir: control_dir.into(),
            program: program.to_string(),
            leading: leading.iter().map(ToString::to_string).collect(),
        }
    }

    fn ssh(&self) -> Command {
        let mut sys_cmd = Command::new(&self.program);
        sys_cmd.args(&self.leading);
        sys_cmd
    }

    pub fn control_path(&self, target: &Target<'_>) -> PathBuf {
        self.control_dir
            .join(format!("{}-{}.sock", target.host.file_stem(), target.port))
    }
}

/// Quotes an argument for a POSIX shell.
fn quote(arg: &str) -> String {
    format!("'{}'", arg.replace('\'', r"'\''"))
}

impl Backend for Ssh {
    fn mode(&self) -> Mode {
        Mode::Ssh
    }

    fn sys_command(&self, target: &Target<'_>, wire: &WireCommand) -> Command {
        let mut sys_cmd = self.ssh();
        sys_cmd
            .arg("-S")
            .arg(self.control_path(target))
            .arg("-o")
            .arg("ControlMaster=no")
            .arg("-o")
            .arg("BatchMode=yes")
            .arg("-p")
            .arg(target.port.to_string());
        if let Some(keyfile) = target.keyfile {
            sys_cmd.arg("-i").arg(keyfile);
        }
        sys_cmd
            .arg(target.destination())
            .arg("--")
            .arg(wire.program.binary())
            .args(wire.args.iter().map(|arg| quote(arg)));
        sys_cmd
    }

    fn fetch_command(&self, target: &Target<'_>, remote: &str, local: &Path) -> Option<Command> {
        let mut sys_cmd = Command::new("scp");
        sys_cmd
            .arg("-q")
            .arg("-o")
            .arg(format!(
                "ControlPath={}",
                self.control_path(target).to_string_lossy()
            ))
            .arg("-o")
            .arg("BatchMode=yes")
            .arg("-P")
            .arg(target.port.to_string());
        if let Some(keyfile) = target.keyfile {
            sys_cmd.arg("-i").arg(keyfile);
        }
        sys_cmd
            .arg(format!("{}:{remote}", target.destination()))
            .arg(local);
        Some(sys_cmd)
    }

    /// Starts the master connection and waits until its control socket shows up.
    ///
    /// ssh reads the password or key passphrase from the terminal itself. Pressing Ctrl-C during
    /// the prompt stops ssh and yields [`SessionError::Interrupted`].
    async fn connect(&self, target: &Target<'_>) -> Result<Channel, SessionError> {
        let control = self.control_path(target);
        std::fs::create_dir_all(&self.control_dir)?;
        // Left behind by a crashed instance, ssh refuses to bind over it
        if control.exists() {
            std::fs::remove_file(&control)?;
        }

        let mut sys_cmd = self.ssh();
        sys_cmd
            .arg("-M")
            .arg("-N")
            .arg("-S")
            .arg(&control)
            .arg("-o")
            .arg(format!("ConnectTimeout={}", CONNECT_TIMEOUT.as_secs()))
            .arg("-o")
            .arg("ControlPersist=no")
            .arg("-p")
            .arg(target.port.to_string());
        if let Some(keyfile) = target.keyfile {
            sys_cmd.arg("-i").arg(keyfile);
        }
        sys_cmd.arg(target.destination());

        let guard = InterruptGuard::install()?;
        let mut child = smol::process::Command::from(sys_cmd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .spawn()?;
        log::debug!("waiting for ssh master on {}", control.to_string_lossy());

        loop {
            if control.exists() {
                return Ok(Channel::Master(SshMaster::new(child, control)));
            }
            if let Some(status) = child.try_status()? {
                return Err(if guard.triggered() {
                    SessionError::Interrupted
                } else {
                    SessionError::ConnectFailed(status)
                });
            }
            if guard.triggered() {
                // Do not leave a half-open master behind
                if let Err(err) = child.kill() {
                    log::warn!("failed to stop ssh master: {err}");
                }
                let _ = child.status().await;
                return Err(SessionError::Interrupted);
            }
            smol::Timer::after(POLL_INTERVAL).await;
        }
    }
}
