mod cmus;
mod ssh;

pub use cmus::Cmus;
pub use ssh::Ssh;

use std::path::Path;
use std::process::Command;

use crate::config::Mode;
use crate::intent::WireCommand;
use crate::session::{Channel, SessionError, Target};

/// General trait of a backend.
///
/// A backend only builds commands, running them is up to [`crate::transport`].
/// Standard output and error are captured there as well.
#[allow(async_fn_in_trait)]
pub trait Backend {
    fn mode(&self) -> Mode;

    /// Gets the [`Command`] running `wire` against `target`.
    fn sys_command(&self, target: &Target<'_>, wire: &WireCommand) -> Command;

    /// Gets the [`Command`] copying the remote file `remote` to `local`, if the backend can
    /// transfer files at all.
    fn fetch_command(&self, target: &Target<'_>, remote: &str, local: &Path) -> Option<Command>;

    /// Sets up whatever later commands need to reach `target`.
    ///
    /// # Errors
    /// Fails if the connection cannot be established.
    async fn connect(&self, target: &Target<'_>) -> Result<Channel, SessionError> {
        let _ = target;
        Ok(Channel::Stateless)
    }
}
