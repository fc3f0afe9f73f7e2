//! Runs wire commands and collects what they print.
//!
//! Failures never reach the caller: a command that cannot be spawned or exits unsuccessfully
//! reads as empty output, which every parser treats as "unknown".

use smol::process::{Command, Stdio};
use std::path::Path;

use crate::artwork::Fetcher;
use crate::backends::Backend;
use crate::intent::WireCommand;
use crate::session::Target;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Output {
    pub stdout: String,
    pub stderr: String,
}

/// Whether surrounding whitespace is stripped from the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trim {
    /// Keep the text as printed, e.g. to split newline terminated values.
    Keep,
    Strip,
}

/// Runs `wire` against `target` and waits for it to finish.
pub async fn execute<B: Backend>(
    backend: &B,
    target: &Target<'_>,
    wire: &WireCommand,
    trim: Trim,
) -> Output {
    log::debug!("{} {}: {wire}", backend.mode(), target.host);
    let mut sys_cmd = Command::from(backend.sys_command(target, wire));
    let output = match sys_cmd.stdin(Stdio::null()).output().await {
        Ok(output) => output,
        Err(err) => {
            log::warn!("cannot run `{wire}`: {err}");
            return Output::default();
        }
    };

    let stderr = String::from_utf8_lossy(&output.stderr);
    if !output.status.success() {
        log::debug!("`{wire}` failed with {}: {}", output.status, stderr.trim());
        return Output::default();
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    match trim {
        Trim::Keep => Output {
            stdout: stdout.into_owned(),
            stderr: stderr.into_owned(),
        },
        Trim::Strip => Output {
            stdout: stdout.trim().to_string(),
            stderr: stderr.trim().to_string(),
        },
    }
}

/// Copies files from the bound host with whatever the backend offers.
pub struct RemoteFetcher<'a, B> {
    backend: &'a B,
    target: Target<'a>,
}

impl<'a, B: Backend> RemoteFetcher<'a, B> {
    pub fn new(backend: &'a B, target: Target<'a>) -> Self {
        Self { backend, target }
    }
}

impl<B: Backend> Fetcher for RemoteFetcher<'_, B> {
    async fn fetch(&self, remote: &str, local: &Path) -> bool {
        let Some(sys_cmd) = self.backend.fetch_command(&self.target, remote, local) else {
            log::debug!("{} cannot transfer files", self.backend.mode());
            return false;
        };
        match Command::from(sys_cmd)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
        {
            Ok(status) => status.success(),
            Err(err) => {
                log::warn!("cannot copy {remote}: {err}");
                false
            }
        }
    }
}
