//! Controlling a cmus server

use rmc::config::Mode;
use rmc::controller::{Controller, UiEvent, WidgetValues};
use rmc::session::SessionState;
use rmc::state::{PlayState, RepeatMode};
use rmc::utils::address::HostAddress;
use rmc::utils::lock::LockDir;

mod common;
use common::Scripted;

const QUERY: &str = "status paused
file /music/Band B/Song A.flac
duration 215
position 40
tag artist Band B
tag album Album C
tag title Song A
set repeat false
set repeat_current true
set shuffle true
set vol_left 70
set vol_right 70
";

fn cmus() -> Scripted {
    Scripted::new(Mode::Cmus).respond("-Q", QUERY)
}

#[test]
fn seek_back() {
    common::setup();
    let paths = common::paths("cmus-seek");
    let parameters = common::parameters(&[
        ("mode", "cmus"),
        ("remoteHost", "10.0.0.5"),
        ("password", "hunter2"),
    ]);

    let mut controller =
        smol::block_on(Controller::start(cmus(), &parameters, &paths, "1.2.0")).unwrap();
    assert_eq!(controller.binding().port, 3000);

    let view = smol::block_on(controller.handle(UiEvent::SeekBack, &WidgetValues::default()));
    assert_eq!(view.title, "Song A");
    assert_eq!(view.album, "Album C");
    assert_eq!(view.image, paths.placeholder);
    assert_eq!(controller.backend().sent(), vec!["-Q", "-k -5S", "-Q"]);

    controller.shutdown();
    common::finalise(&paths);
}

#[test]
fn startup_state() {
    common::setup();
    let paths = common::paths("cmus-state");
    let parameters = common::parameters(&[("mode", "cmus"), ("remoteHost", "10.0.0.5")]);

    let controller =
        smol::block_on(Controller::start(cmus(), &parameters, &paths, "1.2.0")).unwrap();
    let state = controller.state();
    assert_eq!(state.play, PlayState::Paused);
    assert_eq!(state.repeat, RepeatMode::Track);
    assert!(state.shuffle);
    assert_eq!(state.volume.get(), 70);
    assert_eq!(controller.session_state(), SessionState::Open);

    controller.shutdown();
    common::finalise(&paths);
}

#[test]
fn repeat_is_not_sent() {
    common::setup();
    let paths = common::paths("cmus-repeat");
    let parameters = common::parameters(&[("mode", "cmus"), ("remoteHost", "10.0.0.5")]);

    let mut controller =
        smol::block_on(Controller::start(cmus(), &parameters, &paths, "1.2.0")).unwrap();
    let view = smol::block_on(controller.handle(UiEvent::RepeatToggle, &WidgetValues::default()));
    assert_eq!(view.repeat_tooltip, "Repeat: None");
    assert_eq!(controller.backend().sent(), vec!["-Q"]);
    assert!(common::captured().contains("RepeatSet(None) is not supported by cmus"));

    controller.shutdown();
    common::finalise(&paths);
}

#[test]
fn unbound_until_an_address_is_given() {
    common::setup();
    let paths = common::paths("cmus-unbound");
    let parameters = common::parameters(&[("mode", "cmus")]);
    let locks = LockDir::new(&paths.lock_dir);
    let host: HostAddress = "10.0.0.8".parse().unwrap();

    let mut controller =
        smol::block_on(Controller::start(cmus(), &parameters, &paths, "1.2.0")).unwrap();
    assert_eq!(controller.session_state(), SessionState::Unlocked);

    let view = smol::block_on(controller.handle(UiEvent::PlayPause, &WidgetValues::default()));
    assert_eq!(view.host, None);
    assert!(controller.backend().sent().is_empty());
    smol::block_on(controller.set_volume(500)).unwrap();

    let view = smol::block_on(controller.handle(
        UiEvent::Next,
        &WidgetValues {
            volume: None,
            address: Some("10.0.0.8".to_string()),
        },
    ));
    assert_eq!(view.host.as_deref(), Some("10.0.0.8"));
    assert_eq!(controller.session_state(), SessionState::Open);
    assert!(locks.is_locked(&host));
    assert_eq!(controller.backend().sent(), vec!["-n", "-Q"]);

    controller.shutdown();
    assert!(!locks.is_locked(&host));
    common::finalise(&paths);
}

#[test]
fn rebinding() {
    common::setup();
    let paths = common::paths("cmus-rebind");
    let parameters = common::parameters(&[("mode", "cmus"), ("remoteHost", "10.0.0.5")]);
    let locks = LockDir::new(&paths.lock_dir);
    let old: HostAddress = "10.0.0.5".parse().unwrap();
    let new: HostAddress = "10.0.0.6".parse().unwrap();

    let mut controller =
        smol::block_on(Controller::start(cmus(), &parameters, &paths, "1.2.0")).unwrap();

    assert!(!smol::block_on(controller.rebind("10.0.0.5")));
    assert!(!smol::block_on(controller.rebind("cmus.local")));
    assert!(locks.is_locked(&old));
    assert_eq!(controller.binding().host.as_ref(), Some(&old));

    // Only skipping and seeking carry the address along
    let values = WidgetValues {
        volume: Some(20),
        address: Some(" 10.0.0.6 ".to_string()),
    };
    for event in [
        UiEvent::VolumeUpdate,
        UiEvent::RefreshMetadata,
        UiEvent::PlayPause,
        UiEvent::ShuffleToggle,
        UiEvent::RepeatToggle,
    ] {
        smol::block_on(controller.handle(event, &values));
        assert_eq!(controller.binding().host.as_ref(), Some(&old));
    }
    assert!(locks.is_locked(&old));
    assert!(!locks.is_locked(&new));

    let view = smol::block_on(controller.handle(UiEvent::SeekForward, &values));
    assert_eq!(view.host.as_deref(), Some("10.0.0.6"));
    assert!(!locks.is_locked(&old));
    assert!(locks.is_locked(&new));
    assert_eq!(controller.binding().port, 3000);
    assert_eq!(controller.session_state(), SessionState::Open);

    controller.shutdown();
    assert!(!locks.is_locked(&new));
    common::finalise(&paths);
}
