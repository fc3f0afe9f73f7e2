//! Host binding and the lifetime of its remote session.
//!
//! A [`SessionManager`] moves through three states:
//! 1. Unlocked: no lock is held, either no host is bound yet or it has been released.
//! 2. Locked: the lock marker of the bound host exists.
//! 3. Open: a [`Channel`] to the host is up as well.
//!
//! Dropping the manager closes the channel and releases the lock.

use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use smol::process::Child;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::backends::Backend;
use crate::config::{Mode, Parameters};
use crate::utils::address::HostAddress;
use crate::utils::lock::{LockDir, LockError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error("interrupted while connecting")]
    Interrupted,
    #[error("ssh exited before the connection was up ({0})")]
    ConnectFailed(std::process::ExitStatus),
    #[error("cannot run ssh: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("cannot watch for interrupts: {0}")]
    Signal(#[from] nix::Error),
}

/// Which host is controlled, and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostBinding {
    pub host: Option<HostAddress>,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub keyfile: Option<PathBuf>,
    pub mode: Mode,
}

/// Borrowed view of a [`HostBinding`] that has a host.
#[derive(Debug, Clone, Copy)]
pub struct Target<'a> {
    pub host: &'a HostAddress,
    pub port: u16,
    pub user: Option<&'a str>,
    pub password: Option<&'a str>,
    pub keyfile: Option<&'a Path>,
}

impl Target<'_> {
    /// `user@host`, or just the host.
    pub fn destination(&self) -> String {
        match self.user {
            Some(user) => format!("{user}@{}", self.host),
            None => self.host.to_string(),
        }
    }
}

impl HostBinding {
    pub fn from_parameters(parameters: &Parameters) -> Self {
        Self {
            host: parameters.host.clone(),
            port: parameters.port,
            user: parameters.user.clone(),
            password: parameters.password.clone(),
            keyfile: parameters.keyfile.clone(),
            mode: parameters.mode,
        }
    }

    pub fn target(&self) -> Option<Target<'_>> {
        Some(Target {
            host: self.host.as_ref()?,
            port: self.port,
            user: self.user.as_deref(),
            password: self.password.as_deref(),
            keyfile: self.keyfile.as_deref(),
        })
    }

    /// Same credentials, another host.
    #[must_use]
    pub fn rebound(&self, host: HostAddress, user: Option<String>, port: u16) -> Self {
        Self {
            host: Some(host),
            port,
            user,
            ..self.clone()
        }
    }
}

/// An ssh master connection other ssh and scp invocations multiplex over.
pub struct SshMaster {
    child: Child,
    control: PathBuf,
}

impl SshMaster {
    pub fn new(child: Child, control: PathBuf) -> Self {
        Self { child, control }
    }

    pub fn control_path(&self) -> &Path {
        &self.control
    }

    /// Terminates the master.
    pub fn close(mut self) {
        // If it is still alive, SIGTERM rather than SIGKILL so it removes its socket
        if let Ok(None) = self.child.try_status() {
            match i32::try_from(self.child.id()) {
                Ok(pid) => {
                    if let Err(err) = kill(Pid::from_raw(pid), Signal::SIGTERM) {
                        log::warn!("failed to terminate ssh master: {err}");
                    }
                }
                Err(_) => log::warn!("ssh master has an unexpected pid"),
            }
        }
        if self.control.exists() {
            let _ = std::fs::remove_file(&self.control);
        }
    }
}

pub enum Channel {
    /// Every command connects on its own.
    Stateless,
    Master(SshMaster),
}

impl Channel {
    fn close(self) {
        if let Channel::Master(master) = self {
            master.close();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unlocked,
    Locked,
    Open,
}

enum Phase {
    Unlocked,
    Locked,
    Open(Channel),
}

pub struct SessionManager {
    binding: HostBinding,
    locks: LockDir,
    phase: Phase,
}

impl SessionManager {
    pub fn new(binding: HostBinding, locks: LockDir) -> Self {
        Self {
            binding,
            locks,
            phase: Phase::Unlocked,
        }
    }

    pub fn binding(&self) -> &HostBinding {
        &self.binding
    }

    pub fn state(&self) -> SessionState {
        match self.phase {
            Phase::Unlocked => SessionState::Unlocked,
            Phase::Locked => SessionState::Locked,
            Phase::Open(_) => SessionState::Open,
        }
    }

    /// Locks the bound host. Without a host there is nothing to lock.
    ///
    /// # Errors
    /// See [`LockDir::acquire`].
    pub fn acquire(&mut self) -> Result<(), LockError> {
        if !matches!(self.phase, Phase::Unlocked) {
            return Ok(());
        }
        if let Some(host) = &self.binding.host {
            self.locks.acquire(host)?;
            self.phase = Phase::Locked;
        }
        Ok(())
    }

    /// Closes the session if needed, then unlocks the bound host.
    ///
    /// # Errors
    /// See [`LockDir::release`].
    pub fn release(&mut self) -> Result<(), LockError> {
        self.close_session();
        if !matches!(self.phase, Phase::Locked) {
            return Ok(());
        }
        self.phase = Phase::Unlocked;
        match &self.binding.host {
            Some(host) => self.locks.release(host),
            None => Ok(()),
        }
    }

    /// Connects to the bound host. Only valid while locked, otherwise nothing happens.
    ///
    /// # Errors
    /// Whatever [`Backend::connect`] reports, the manager stays locked.
    pub async fn open<B: Backend>(&mut self, backend: &B) -> Result<(), SessionError> {
        if !matches!(self.phase, Phase::Locked) {
            return Ok(());
        }
        let Some(target) = self.binding.target() else {
            return Ok(());
        };
        let channel = backend.connect(&target).await?;
        log::info!("connected to {} over {}", target.host, backend.mode());
        self.phase = Phase::Open(channel);
        Ok(())
    }

    /// Closes the session, keeping the lock.
    pub fn close_session(&mut self) {
        if let Phase::Open(_) = self.phase {
            if let Phase::Open(channel) = std::mem::replace(&mut self.phase, Phase::Locked) {
                channel.close();
            }
        }
    }

    /// Points the manager at another host.
    ///
    /// Only a dotted-quad `address` different from the bound one is taken, anything else is
    /// ignored and `Ok(false)` returned. The old host is unlocked, the new one locked, and the
    /// session reopened if one was open or if no host was bound before.
    ///
    /// # Errors
    /// If the new host is already controlled, the previous binding and its lock are restored and
    /// the contention is returned. Connection failures leave the new host locked without a
    /// session.
    pub async fn rebind<B: Backend>(
        &mut self,
        backend: &B,
        address: &str,
        user: Option<String>,
        port: u16,
    ) -> Result<bool, SessionError> {
        let Ok(address) = address.trim().parse::<HostAddress>() else {
            return Ok(false);
        };
        if self.binding.host.as_ref() == Some(&address) {
            return Ok(false);
        }

        let reopen = matches!(self.phase, Phase::Open(_)) || self.binding.host.is_none();
        let previous = self.binding.clone();
        if let Err(err) = self.release() {
            log::warn!("{err}");
        }
        self.binding = previous.rebound(address, user, port);

        if let Err(err) = self.acquire() {
            log::warn!("staying on the previous host: {err}");
            self.binding = previous;
            self.acquire()?;
            if reopen {
                self.open(backend).await?;
            }
            return Err(err.into());
        }
        if reopen {
            self.open(backend).await?;
        }
        Ok(true)
    }

    /// Closes the session and releases the lock, logging failures.
    pub fn close(&mut self) {
        if let Err(err) = self.release() {
            log::warn!("{err}");
        }
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.close();
    }
}
