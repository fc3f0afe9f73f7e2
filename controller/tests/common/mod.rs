//! Do some preparations for integration tests

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, LazyLock, Once, RwLock};

use rmc::backends::Backend;
use rmc::config::{Mode, Parameters, Paths};
use rmc::intent::WireCommand;
use rmc::session::Target;

pub static CAPTURED: LazyLock<Arc<RwLock<String>>> =
    LazyLock::new(|| Arc::new(RwLock::new(String::new())));
static LOGGER: Once = Once::new();

struct Capturer {
    content: Arc<RwLock<String>>,
}
impl std::io::Write for Capturer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut locked = self.content.write().unwrap();
        locked.push_str(&String::from_utf8_lossy(buf));
        Ok(buf.len())
    }
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

pub fn setup() {
    LOGGER.call_once(|| {
        let cap = Capturer {
            content: CAPTURED.clone(),
        };
        env_logger::builder()
            .is_test(true)
            .format(|buf, record| writeln!(buf, "{}", record.args()))
            .filter_level(log::LevelFilter::Trace)
            .target(env_logger::Target::Pipe(Box::new(cap)))
            .init();
    });
}

pub fn captured() -> String {
    CAPTURED.read().expect("Cannot read captured log").clone()
}

/// Fresh on-disk locations for one test.
pub fn paths(name: &str) -> Paths {
    let base = std::env::temp_dir().join(format!("rmc-it-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&base);
    Paths {
        lock_dir: base.join("locks"),
        cache_dir: base.join("art"),
        placeholder: PathBuf::from("default.png"),
    }
}

pub fn finalise(paths: &Paths) {
    if let Some(base) = paths.lock_dir.parent() {
        let _ = std::fs::remove_dir_all(base);
    }
}

pub fn parameters(pairs: &[(&str, &str)]) -> Parameters {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    Parameters::from_map(&map).expect("test parameters should parse")
}

/// Answers wire commands with canned text and remembers what it was asked.
pub struct Scripted {
    mode: Mode,
    responses: HashMap<String, String>,
    sent: RefCell<Vec<String>>,
    fetches: Cell<usize>,
}

impl Scripted {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            responses: HashMap::new(),
            sent: RefCell::new(Vec::new()),
            fetches: Cell::new(0),
        }
    }

    /// Makes `wire` print `text`.
    pub fn respond(mut self, wire: &str, text: &str) -> Self {
        self.responses.insert(wire.to_string(), text.to_string());
        self
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.borrow().clone()
    }

    pub fn fetches(&self) -> usize {
        self.fetches.get()
    }
}

impl Backend for Scripted {
    fn mode(&self) -> Mode {
        self.mode
    }

    fn sys_command(&self, _target: &Target<'_>, wire: &WireCommand) -> Command {
        let key = wire.to_string();
        let mut cmd = Command::new("printf");
        cmd.arg("%s")
            .arg(self.responses.get(&key).map_or("", String::as_str));
        self.sent.borrow_mut().push(key);
        cmd
    }

    fn fetch_command(&self, _target: &Target<'_>, _remote: &str, local: &Path) -> Option<Command> {
        self.fetches.set(self.fetches.get() + 1);
        let mut cmd = Command::new("touch");
        cmd.arg(local);
        Some(cmd)
    }
}
