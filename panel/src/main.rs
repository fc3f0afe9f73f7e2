//! `rmc-panel` entry
//!
//! A line-oriented panel for the remote media controller. UI events are read from standard input
//! one per line, what the player is doing is printed to standard output after each of them.

mod cli;
mod input;

use clap::Parser;
use smol::Unblock;
use smol::io::{AsyncBufReadExt, BufReader};
use smol::stream::StreamExt;
use std::process::ExitCode;
use thiserror::Error;

use rmc::backends::{Backend, Cmus, Ssh};
use rmc::config::{ConfigError, Mode, Parameters, Paths};
use rmc::{Controller, StartupError, View, WidgetValues};

use crate::cli::Cli;
use crate::input::Input;

#[derive(Debug, Error)]
enum PanelError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("cannot read input: {0}")]
    Input(#[from] std::io::Error),
}

fn setup_logger(verbose: bool) -> Result<(), fern::InitError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                message
            ));
        })
        .level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .chain(std::io::stderr())
        .apply()?;
    Ok(())
}

fn draw(view: &View) {
    println!("{}", view.title);
    println!("{}", view.artist);
    println!("{}", view.album);
    println!("artwork: {}", view.image.display());
    println!(
        "{} {} | {} | {} | volume {}%",
        view.repeat_glyph,
        view.repeat_tooltip,
        view.shuffle_tooltip,
        if view.playing { "Playing" } else { "Paused" },
        view.volume
    );
    println!("host: {}", view.host.as_deref().unwrap_or("-"));
    println!("{}", view.footer);
}

async fn run<B: Backend>(
    backend: B,
    parameters: &Parameters,
    paths: &Paths,
) -> Result<(), PanelError> {
    let mut controller =
        Controller::start(backend, parameters, paths, env!("CARGO_PKG_VERSION")).await?;
    let mut address = parameters.host.as_ref().map(ToString::to_string);
    draw(&controller.view());

    let mut lines = BufReader::new(Unblock::new(std::io::stdin())).lines();
    while let Some(line) = lines.next().await {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match input::parse(&line) {
            Ok(Input::Quit) => break,
            Ok(Input::Address(text)) => address = Some(text),
            Ok(Input::Event(event, volume)) => {
                let values = WidgetValues {
                    volume,
                    address: address.clone(),
                };
                draw(&controller.handle(event, &values).await);
            }
            Err(err) => log::warn!("{err}"),
        }
    }

    controller.shutdown();
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = setup_logger(cli.verbose) {
        eprintln!("failed to set up logging: {err}");
        return ExitCode::FAILURE;
    }

    let parameters = match Parameters::from_map(&cli.to_map()) {
        Ok(parameters) => parameters,
        Err(ConfigError::NoParameters) => {
            eprintln!("{}", cli::usage());
            return ExitCode::from(2);
        }
        Err(err) => {
            log::error!("{err}");
            return ExitCode::FAILURE;
        }
    };
    let paths = Paths::default();

    let result = smol::block_on(async {
        match parameters.mode {
            Mode::Cmus => run(Cmus, &parameters, &paths).await,
            Mode::Ssh => run(Ssh::new(paths.lock_dir.clone()), &parameters, &paths).await,
        }
    });
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
