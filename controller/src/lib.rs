//! Core of remote-media-controller.
//!
//! Translates playback intents into `cmus-remote` or `playerctl` commands, runs them on the
//! controlled host, and parses what the player reports back. One instance controls one host at a
//! time, guarded by an advisory lock file.

pub mod artwork;
pub mod backends;
pub mod config;
pub mod controller;
pub mod intent;
pub mod metadata;
pub mod session;
pub mod state;
pub mod transport;
pub mod utils;

pub use controller::{Controller, StartupError, UiEvent, View, WidgetValues};
