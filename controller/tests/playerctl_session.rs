//! Controlling a host over ssh

use std::path::PathBuf;

use rmc::config::Mode;
use rmc::controller::{Controller, StartupError, UiEvent, WidgetValues};
use rmc::session::SessionState;
use rmc::state::{PlayState, RepeatMode};
use rmc::utils::address::HostAddress;
use rmc::utils::lock::{LockDir, LockError};

mod common;
use common::Scripted;

const METADATA: &str =
    "xesam:title   Song A\nxesam:artist   Band B\nmpris:artUrl   file:///home/u/art%201.jpg";
const VOLUME: &str = "Volume: front-left: 42597 /  65% / -11.23 dB,   front-right: 42597 /  65% / -11.23 dB\n";

fn player() -> Scripted {
    Scripted::new(Mode::Ssh)
        .respond("metadata", METADATA)
        .respond("status", "Playing\n")
        .respond("loop", "Track\n")
        .respond("shuffle", "Off\n")
        .respond("pactl get-sink-volume @DEFAULT_SINK@", VOLUME)
}

fn host() -> HostAddress {
    "192.168.0.2".parse().unwrap()
}

#[test]
fn startup_reads_everything() {
    common::setup();
    let paths = common::paths("startup");
    let parameters = common::parameters(&[
        ("mode", "playerctl"),
        ("remoteHost", "192.168.0.2"),
        ("remoteUser", "user"),
    ]);

    let controller =
        smol::block_on(Controller::start(player(), &parameters, &paths, "1.2.0\n")).unwrap();
    let view = controller.view();

    assert_eq!(view.title, "Song A");
    assert_eq!(view.artist, "Band B");
    assert_eq!(view.album, "Unknown Album");
    assert_eq!(
        view.image,
        paths
            .cache_dir
            .join("65d51fda46c7bb4e4f1252bfc0d0898ff081b515059c73ea986cf4b85642b3d4.png")
    );
    assert_eq!(view.repeat_glyph, "⇂");
    assert_eq!(view.repeat_tooltip, "Repeat: Track");
    assert_eq!(view.shuffle_tooltip, "Shuffle: Off");
    assert!(view.playing);
    assert_eq!(view.volume.get(), 65);
    assert_eq!(view.host.as_deref(), Some("192.168.0.2"));
    assert_eq!(view.footer, "remote-media-controller 1.2.0");
    assert_eq!(controller.session_state(), SessionState::Open);

    let locks = LockDir::new(&paths.lock_dir);
    assert!(locks.is_locked(&host()));
    controller.shutdown();
    assert!(!locks.is_locked(&host()));

    common::finalise(&paths);
}

#[test]
fn artwork_is_fetched_once() {
    common::setup();
    let paths = common::paths("artwork");
    let parameters = common::parameters(&[("remoteHost", "192.168.0.2")]);

    let mut controller =
        smol::block_on(Controller::start(player(), &parameters, &paths, "1.2.0")).unwrap();
    let first = controller.view().image;
    let second = smol::block_on(
        controller.handle(UiEvent::RefreshMetadata, &WidgetValues::default()),
    )
    .image;

    assert_eq!(first, second);
    assert!(first.exists());
    assert_eq!(controller.backend().fetches(), 1);
    controller.shutdown();

    common::finalise(&paths);
}

#[test]
fn nothing_playing() {
    common::setup();
    let paths = common::paths("nothing");
    let parameters = common::parameters(&[("remoteHost", "192.168.0.2")]);
    let backend = Scripted::new(Mode::Ssh).respond("status", "Stopped\n");

    let result = smol::block_on(Controller::start(backend, &parameters, &paths, "1.2.0"));
    assert!(matches!(result, Err(StartupError::NothingPlaying(_))));
    assert!(!LockDir::new(&paths.lock_dir).is_locked(&host()));

    common::finalise(&paths);
}

#[test]
fn one_controller_per_host() {
    common::setup();
    let paths = common::paths("exclusive");
    let parameters = common::parameters(&[("remoteHost", "192.168.0.2")]);

    let first =
        smol::block_on(Controller::start(player(), &parameters, &paths, "1.2.0")).unwrap();
    let second = smol::block_on(Controller::start(player(), &parameters, &paths, "1.2.0"));
    assert!(matches!(
        second,
        Err(StartupError::Lock(LockError::Contended(_, _)))
    ));
    // The loser must not have touched the winner's lock
    assert!(LockDir::new(&paths.lock_dir).is_locked(&host()));

    first.shutdown();
    let third =
        smol::block_on(Controller::start(player(), &parameters, &paths, "1.2.0")).unwrap();
    third.shutdown();

    common::finalise(&paths);
}

#[test]
fn volume_bounds() {
    common::setup();
    let paths = common::paths("volume");
    let parameters = common::parameters(&[("remoteHost", "192.168.0.2")]);

    let mut controller =
        smol::block_on(Controller::start(player(), &parameters, &paths, "1.2.0")).unwrap();
    let before = controller.state();

    let view = smol::block_on(controller.handle(
        UiEvent::VolumeUpdate,
        &WidgetValues {
            volume: Some(101),
            address: None,
        },
    ));
    assert_eq!(view.volume.get(), 65);
    assert_eq!(controller.state(), before);
    assert!(smol::block_on(controller.set_volume(-1)).is_err());

    smol::block_on(controller.set_volume(0)).unwrap();
    assert_eq!(controller.state().volume.get(), 0);
    smol::block_on(controller.set_volume(100)).unwrap();
    assert_eq!(controller.state().volume.get(), 100);

    controller.shutdown();
    common::finalise(&paths);
}

#[test]
fn playback_controls() {
    common::setup();
    let paths = common::paths("controls");
    let parameters = common::parameters(&[("remoteHost", "192.168.0.2"), ("seek", "10")]);

    let mut controller =
        smol::block_on(Controller::start(player(), &parameters, &paths, "1.2.0")).unwrap();
    let values = WidgetValues::default();

    let view = smol::block_on(controller.handle(UiEvent::RepeatToggle, &values));
    assert_eq!(controller.state().repeat, RepeatMode::None);
    assert_eq!(view.repeat_glyph, "→");

    let view = smol::block_on(controller.handle(UiEvent::ShuffleToggle, &values));
    assert_eq!(view.shuffle_tooltip, "Shuffle: On");

    smol::block_on(controller.handle(UiEvent::PlayPause, &values));
    assert_eq!(controller.state().play, PlayState::Playing);

    smol::block_on(controller.handle(UiEvent::SeekForward, &values));
    smol::block_on(controller.handle(
        UiEvent::VolumeUpdate,
        &WidgetValues {
            volume: Some(40),
            address: None,
        },
    ));
    controller.shutdown();

    common::finalise(&paths);
}

#[test]
fn wire_commands_sent() {
    common::setup();
    let paths = common::paths("wire");
    let parameters = common::parameters(&[("remoteHost", "192.168.0.2")]);
    let mut controller =
        smol::block_on(Controller::start(player(), &parameters, &paths, "1.2.0")).unwrap();
    let values = WidgetValues::default();
    smol::block_on(controller.handle(UiEvent::Next, &values));
    smol::block_on(controller.handle(UiEvent::SeekBack, &values));
    smol::block_on(controller.handle(UiEvent::RepeatToggle, &values));
    smol::block_on(controller.handle(
        UiEvent::VolumeUpdate,
        &WidgetValues {
            volume: Some(30),
            address: None,
        },
    ));
    assert_eq!(controller.state().volume.get(), 30);
    assert_eq!(
        controller.backend().sent(),
        vec![
            "pactl get-sink-volume @DEFAULT_SINK@",
            "status",
            "loop",
            "shuffle",
            "metadata",
            "next",
            "metadata",
            "position 5S-",
            "metadata",
            "loop None",
            "pactl set-sink-volume @DEFAULT_SINK@ 30%",
        ]
    );
    controller.shutdown();

    common::finalise(&paths);
}

#[test]
fn failed_artwork_uses_placeholder() {
    common::setup();
    let paths = common::paths("placeholder");
    let parameters = common::parameters(&[("remoteHost", "192.168.0.2")]);
    let backend = player().respond(
        "metadata",
        "xesam:title Song A\nmpris:artUrl https://example.org/cover.jpg\n",
    );

    let controller =
        smol::block_on(Controller::start(backend, &parameters, &paths, "1.2.0")).unwrap();
    assert_eq!(controller.view().image, PathBuf::from("default.png"));
    controller.shutdown();

    common::finalise(&paths);
}
