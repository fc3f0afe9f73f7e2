//! The controller a UI talks to.
//!
//! A [`Controller`] owns everything about the host being controlled: the backend, the session,
//! the last known [`PlaybackState`] and [`TrackMetadata`]. The UI hands it one [`UiEvent`] at a
//! time together with the current [`WidgetValues`], and gets a [`View`] back to draw.
//!
//! Handling an event runs to completion before the next one is accepted, nothing happens in the
//! background.

use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

use crate::artwork::ArtworkCache;
use crate::backends::Backend;
use crate::config::{ConfigError, Mode, Parameters, Paths, SeekDuration};
use crate::intent::{Intent, Query, query, translate};
use crate::metadata::{
    TrackMetadata, parse_cmus_status, parse_loop_and_shuffle, parse_metadata, parse_status,
    parse_volume,
};
use crate::session::{HostBinding, SessionError, SessionManager, SessionState, Target};
use crate::state::{PlayState, PlaybackState, Volume};
use crate::transport::{self, RemoteFetcher, Trim};
use crate::utils::ParseError;
use crate::utils::lock::{LockDir, LockError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("nothing is playing on {0}")]
    NothingPlaying(String),
}

/// Events a UI can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    RefreshMetadata,
    RepeatToggle,
    ShuffleToggle,
    PlayPause,
    Previous,
    Next,
    SeekBack,
    SeekForward,
    /// The volume slider was released.
    VolumeUpdate,
}

impl FromStr for UiEvent {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "refresh_metadata" => Ok(UiEvent::RefreshMetadata),
            "repeat_toggle" => Ok(UiEvent::RepeatToggle),
            "shuffle_toggle" => Ok(UiEvent::ShuffleToggle),
            "play_pause" => Ok(UiEvent::PlayPause),
            "previous" => Ok(UiEvent::Previous),
            "next" => Ok(UiEvent::Next),
            "seek_back" => Ok(UiEvent::SeekBack),
            "seek_forward" => Ok(UiEvent::SeekForward),
            "volume_control-update" => Ok(UiEvent::VolumeUpdate),
            _ => Err(ParseError::UnknownToken),
        }
    }
}

/// Widget contents at the time of an event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetValues {
    /// Volume slider position.
    pub volume: Option<i64>,
    /// Text of the address field.
    pub address: Option<String>,
}

/// Everything the UI shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub image: PathBuf,
    pub repeat_glyph: &'static str,
    pub repeat_tooltip: String,
    pub shuffle_tooltip: String,
    pub playing: bool,
    pub volume: Volume,
    pub host: Option<String>,
    pub footer: String,
}

/// What a refresh asks the player for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Refresh {
    volume: bool,
    play_state: bool,
    controls: bool,
    metadata: bool,
}

impl Refresh {
    const ALL: Refresh = Refresh {
        volume: true,
        play_state: true,
        controls: true,
        metadata: true,
    };
    const DISPLAY: Refresh = Refresh {
        controls: false,
        ..Refresh::ALL
    };
    const PLAY_STATE: Refresh = Refresh {
        volume: false,
        play_state: true,
        controls: false,
        metadata: false,
    };
    const METADATA: Refresh = Refresh {
        volume: false,
        play_state: false,
        controls: false,
        metadata: true,
    };
}

pub struct Controller<B: Backend> {
    backend: B,
    session: SessionManager,
    state: PlaybackState,
    metadata: TrackMetadata,
    artwork: ArtworkCache,
    seek: SeekDuration,
    version: String,
}

impl<B: Backend> Controller<B> {
    /// Binds to the configured host and reads what it is playing.
    ///
    /// Without a configured host nothing is locked or fetched, every command is dropped until
    /// [`Controller::rebind`] succeeds.
    ///
    /// # Errors
    /// The host being controlled already, the connection failing, or the player having nothing
    /// to report. Nothing stays locked or connected in these cases.
    pub async fn start(
        backend: B,
        parameters: &Parameters,
        paths: &Paths,
        version: &str,
    ) -> Result<Self, StartupError> {
        let mut binding = HostBinding::from_parameters(parameters);
        binding.mode = backend.mode();
        let mut session = SessionManager::new(binding, LockDir::new(&paths.lock_dir));
        session.acquire()?;
        session.open(&backend).await?;

        let mut controller = Self {
            backend,
            session,
            state: PlaybackState::default(),
            metadata: TrackMetadata {
                image: paths.placeholder.clone(),
                ..TrackMetadata::default()
            },
            artwork: ArtworkCache::new(&paths.cache_dir, &paths.placeholder),
            seek: parameters.seek.clone(),
            version: version.trim().to_string(),
        };

        if let Some(host) = controller.session.binding().host.clone() {
            if !controller.refresh(Refresh::ALL).await {
                // Dropping the controller releases the host
                return Err(StartupError::NothingPlaying(host.to_string()));
            }
        }
        Ok(controller)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn mode(&self) -> Mode {
        self.backend.mode()
    }

    pub fn binding(&self) -> &HostBinding {
        self.session.binding()
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn metadata(&self) -> &TrackMetadata {
        &self.metadata
    }

    /// Handles one UI event and returns what to show afterwards.
    ///
    /// The address field is only applied before skipping or seeking.
    pub async fn handle(&mut self, event: UiEvent, values: &WidgetValues) -> View {
        match event {
            UiEvent::VolumeUpdate => {
                let requested = values
                    .volume
                    .unwrap_or_else(|| i64::from(self.state.volume.get()));
                if let Err(err) = self.set_volume(requested).await {
                    log::error!("{err}");
                }
            }
            UiEvent::RefreshMetadata => {
                self.refresh(Refresh::DISPLAY).await;
            }
            UiEvent::RepeatToggle => {
                self.state = self.state.cycled_repeat();
                self.send(Intent::RepeatSet(self.state.repeat)).await;
            }
            UiEvent::ShuffleToggle => {
                self.state = self.state.toggled_shuffle();
                self.send(Intent::ShuffleToggle).await;
            }
            UiEvent::PlayPause => {
                self.send(Intent::PlayPause).await;
                // Only confirm the command went through
                self.refresh(Refresh::PLAY_STATE).await;
            }
            UiEvent::Previous => self.move_playback(Intent::Previous, values).await,
            UiEvent::Next => self.move_playback(Intent::Next, values).await,
            UiEvent::SeekBack => self.move_playback(Intent::SeekBack, values).await,
            UiEvent::SeekForward => self.move_playback(Intent::SeekForward, values).await,
        }
        self.view()
    }

    /// Skips or seeks on the host in the address field, the track may have changed afterwards.
    async fn move_playback(&mut self, intent: Intent, values: &WidgetValues) {
        if let Some(address) = values.address.as_deref() {
            self.rebind(address).await;
        }
        self.send(intent).await;
        self.refresh(Refresh::METADATA).await;
    }

    /// Sets the remote volume.
    ///
    /// # Errors
    /// [`ConfigError::VolumeOutOfRange`] unless `percent` is within `0..=100`, nothing is sent
    /// and the state is kept in that case.
    pub async fn set_volume(&mut self, percent: i64) -> Result<(), ConfigError> {
        if self.session.binding().host.is_none() {
            return Ok(());
        }
        let volume = Volume::try_from(percent)?;
        self.state = self.state.with_volume(volume);
        self.send(Intent::VolumeSet(volume)).await;
        Ok(())
    }

    /// Sends an [`Intent`] to the bound host, if there is one.
    pub async fn send(&self, intent: Intent) {
        let Some(target) = self.session.binding().target() else {
            log::debug!("no host bound, dropping {intent:?}");
            return;
        };
        let Some(wire) = translate(intent, self.backend.mode(), &self.seek) else {
            log::debug!("{intent:?} is not supported by {}", self.backend.mode());
            return;
        };
        transport::execute(&self.backend, &target, &wire, Trim::Strip).await;
    }

    /// Switches to the host at `address`, keeping user and port.
    ///
    /// Returns whether the binding changed. Malformed or unchanged addresses are ignored,
    /// failures are logged and leave the controller usable.
    pub async fn rebind(&mut self, address: &str) -> bool {
        let user = self.session.binding().user.clone();
        let port = self.session.binding().port;
        match self
            .session
            .rebind(&self.backend, address, user, port)
            .await
        {
            Ok(changed) => {
                if changed {
                    log::info!("now controlling {}", address.trim());
                }
                changed
            }
            Err(err) => {
                log::error!("cannot switch to {}: {err}", address.trim());
                false
            }
        }
    }

    /// Runs a query, empty if the mode has no such query.
    async fn ask(&self, target: &Target<'_>, what: Query, trim: Trim) -> String {
        match query(what, self.backend.mode()) {
            Some(wire) => {
                transport::execute(&self.backend, target, &wire, trim)
                    .await
                    .stdout
            }
            None => String::new(),
        }
    }

    /// Reads the requested parts back from the player.
    ///
    /// Returns whether the player reported any metadata, always `true` if none was requested.
    async fn refresh(&mut self, what: Refresh) -> bool {
        let Some(target) = self.session.binding().target() else {
            return true;
        };
        match self.backend.mode() {
            Mode::Ssh => {
                if what.volume {
                    let text = self.ask(&target, Query::Volume, Trim::Strip).await;
                    if let Some(volume) = parse_volume(&text) {
                        self.state = self.state.with_volume(volume);
                    }
                }
                if what.play_state {
                    let text = self.ask(&target, Query::Status, Trim::Strip).await;
                    self.state = self.state.with_play(parse_status(&text));
                }
                if what.controls {
                    let mut text = self.ask(&target, Query::Loop, Trim::Keep).await;
                    text.push_str(&self.ask(&target, Query::Shuffle, Trim::Keep).await);
                    if let Some((repeat, shuffle)) = parse_loop_and_shuffle(&text) {
                        self.state = self.state.with_repeat(repeat).with_shuffle(shuffle);
                    }
                }
                if !what.metadata {
                    return true;
                }
                let text = self.ask(&target, Query::Metadata, Trim::Keep).await;
                let mut metadata = parse_metadata(&text);
                metadata.image = match &metadata.remote_art {
                    Some(remote) => {
                        let fetcher = RemoteFetcher::new(&self.backend, target);
                        self.artwork.resolve(remote, &fetcher).await
                    }
                    None => self.artwork.placeholder().to_path_buf(),
                };
                self.metadata = metadata;
                !text.trim().is_empty()
            }
            Mode::Cmus => {
                let text = self.ask(&target, Query::Everything, Trim::Keep).await;
                let status = parse_cmus_status(&text);
                if what.volume {
                    if let Some(volume) = status.volume {
                        self.state = self.state.with_volume(volume);
                    }
                }
                if what.play_state {
                    self.state = self.state.with_play(status.play);
                }
                if what.controls {
                    if let Some(repeat) = status.repeat {
                        self.state = self.state.with_repeat(repeat);
                    }
                    if let Some(shuffle) = status.shuffle {
                        self.state = self.state.with_shuffle(shuffle);
                    }
                }
                if !what.metadata {
                    return true;
                }
                self.metadata = TrackMetadata {
                    image: self.artwork.placeholder().to_path_buf(),
                    ..status.metadata
                };
                !text.trim().is_empty()
            }
        }
    }

    /// What the UI should currently show.
    pub fn view(&self) -> View {
        View {
            title: self.metadata.title.clone(),
            artist: self.metadata.artist.clone(),
            album: self.metadata.album.clone(),
            image: self.metadata.image.clone(),
            repeat_glyph: self.state.repeat.glyph(),
            repeat_tooltip: format!("Repeat: {}", self.state.repeat),
            shuffle_tooltip: format!("Shuffle: {}", if self.state.shuffle { "On" } else { "Off" }),
            playing: self.state.play == PlayState::Playing,
            volume: self.state.volume,
            host: self.session.binding().host.as_ref().map(ToString::to_string),
            footer: format!("remote-media-controller {}", self.version),
        }
    }

    /// Closes the session and releases the host.
    pub fn shutdown(mut self) {
        self.session.close();
    }
}
