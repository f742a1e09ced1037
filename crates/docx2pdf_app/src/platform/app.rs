use std::process::ExitCode;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use docx2pdf_core::{update, AppState, AppViewModel, ConverterAvailability, FileStatus, Msg};
use docx2pdf_engine::expand_inputs;
use docx2pdf_logging::{app_debug, app_info, app_warn, parse_level};
use log::LevelFilter;

use super::cli::{self, CliArgs, CliCommand, USAGE};
use super::config::{self, LoadedConfig};
use super::effects::EffectRunner;
use super::ui;

const EXIT_FAILED: u8 = 1;
const EXIT_CONVERTER_MISSING: u8 = 2;
const EXIT_USAGE: u8 = 64;

const TICK: Duration = Duration::from_millis(75);
const RETRY_INTERVAL: Duration = Duration::from_secs(5);

pub fn run_app() -> ExitCode {
    match cli::parse(std::env::args_os().skip(1)) {
        Ok(CliCommand::Help) => {
            println!("{USAGE}");
            ExitCode::SUCCESS
        }
        Ok(CliCommand::Version) => {
            println!("docx2pdf {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        Ok(CliCommand::Run(args)) => match run(args) {
            Ok(code) => code,
            Err(err) => {
                eprintln!("error: {err:#}");
                ExitCode::from(EXIT_FAILED)
            }
        },
        Err(err) => {
            eprintln!("error: {err}\n\n{USAGE}");
            ExitCode::from(EXIT_USAGE)
        }
    }
}

fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let config_path = match args.config.clone().or_else(config::default_config_path) {
        Some(path) => path,
        None => bail!("no config directory available; pass --config"),
    };
    let LoadedConfig { config, note } = config::load_or_init(&config_path)?;

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        parse_level(&config.log_level)
    };
    docx2pdf_logging::initialize(config.log_destination(), level);
    if let Some(note) = note {
        app_info!("{}", note);
    }

    let files = expand_inputs(&args.inputs, args.recursive).context("reading inputs")?;
    if files.is_empty() {
        bail!("no .docx files found in the given paths");
    }
    app_debug!("Queued {} file(s)", files.len());

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(
        &config,
        args.check_updates && config.check_for_updates,
        args.json,
        msg_tx.clone(),
    );

    let mut session = Session::new(&args, files.iter().map(|p| p.to_string_lossy().into_owned()));
    let mut state = AppState::new();
    let mut shown = state.view();

    let _ = msg_tx.send(Msg::AppStarted);
    loop {
        let msg = match msg_rx.recv_timeout(TICK) {
            Ok(msg) => msg,
            Err(mpsc::RecvTimeoutError::Timeout) => Msg::Tick,
            Err(mpsc::RecvTimeoutError::Disconnected) => bail!("event channel closed"),
        };
        dispatch(&mut state, msg, &runner, &mut shown, args.json);

        let step = session.advance(&shown, Instant::now());
        for msg in step.send {
            let _ = msg_tx.send(msg);
        }
        if let Some(code) = step.exit {
            // Let queued messages (open requests) reach the runner before leaving.
            while let Ok(msg) = msg_rx.try_recv() {
                dispatch(&mut state, msg, &runner, &mut shown, args.json);
            }
            let view = state.view();
            if !args.json && !view.entries.is_empty() {
                println!("{}", ui::render::summary_line(&view));
            }
            return Ok(ExitCode::from(code));
        }
    }
}

fn dispatch(
    state: &mut AppState,
    msg: Msg,
    runner: &EffectRunner,
    shown: &mut AppViewModel,
    json: bool,
) {
    let current = std::mem::take(state);
    let (mut next, effects) = update(current, msg);
    let dirty = next.consume_dirty();
    *state = next;
    runner.enqueue(effects);

    if dirty {
        let view = state.view();
        if !json {
            for line in ui::render::render_changes(shown, &view) {
                println!("{line}");
            }
        }
        *shown = view;
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Phase {
    Starting,
    Missing { next_retry: Instant },
    Retrying,
    Dispatching,
    Converting,
    Done,
}

#[derive(Debug, Default, PartialEq)]
struct Step {
    send: Vec<Msg>,
    exit: Option<u8>,
}

impl Step {
    fn send(send: Vec<Msg>) -> Self {
        Self { send, exit: None }
    }

    fn exit(code: u8) -> Self {
        Self {
            send: Vec::new(),
            exit: Some(code),
        }
    }
}

/// Drives one command-line batch: waits for the converter, queues the
/// files, starts the run, then picks an exit code.
struct Session {
    phase: Phase,
    files: Vec<String>,
    output_dir: Option<String>,
    same_dir: bool,
    open: bool,
    wait: bool,
    told_to_install: bool,
}

impl Session {
    fn new(args: &CliArgs, files: impl IntoIterator<Item = String>) -> Self {
        Self {
            phase: Phase::Starting,
            files: files.into_iter().collect(),
            output_dir: args
                .output_dir
                .as_ref()
                .map(|dir| dir.to_string_lossy().into_owned()),
            same_dir: args.same_dir,
            open: args.open,
            wait: args.wait,
            told_to_install: false,
        }
    }

    fn advance(&mut self, view: &AppViewModel, now: Instant) -> Step {
        match self.phase.clone() {
            Phase::Starting => match view.availability {
                ConverterAvailability::Unknown => Step::default(),
                ConverterAvailability::Available => {
                    let mut send = vec![Msg::FilesAdded(std::mem::take(&mut self.files))];
                    if let Some(dir) = self.output_dir.take() {
                        send.push(Msg::OutputDirSelected(dir));
                    } else if self.same_dir {
                        send.push(Msg::OutputDirCleared);
                    }
                    send.push(Msg::ConvertClicked);
                    self.phase = Phase::Dispatching;
                    Step::send(send)
                }
                ConverterAvailability::Missing => {
                    if !self.told_to_install {
                        eprintln!("{}", ui::render::install_instructions());
                        self.told_to_install = true;
                    }
                    if self.wait {
                        app_info!("Waiting for LibreOffice to be installed");
                        self.phase = Phase::Missing {
                            next_retry: now + RETRY_INTERVAL,
                        };
                        Step::default()
                    } else {
                        self.phase = Phase::Done;
                        Step::exit(EXIT_CONVERTER_MISSING)
                    }
                }
            },
            Phase::Missing { next_retry } => {
                if now >= next_retry {
                    self.phase = Phase::Retrying;
                    Step::send(vec![Msg::RetryAvailabilityClicked])
                } else {
                    Step::default()
                }
            }
            Phase::Retrying => {
                if view.availability == ConverterAvailability::Unknown {
                    self.phase = Phase::Starting;
                }
                Step::default()
            }
            Phase::Dispatching => {
                if view.is_converting {
                    self.phase = Phase::Converting;
                } else if view.dispatch_error.is_some() {
                    self.phase = Phase::Done;
                    return Step::exit(EXIT_FAILED);
                }
                Step::default()
            }
            Phase::Converting => {
                if view.is_converting {
                    return Step::default();
                }
                self.phase = Phase::Done;
                let mut step = Step::exit(exit_code(view));
                if self.open {
                    step.send = view
                        .entries
                        .iter()
                        .filter(|entry| entry.status == FileStatus::Completed)
                        .map(|entry| Msg::OpenOutputClicked { index: entry.index })
                        .collect();
                }
                step
            }
            Phase::Done => {
                app_warn!("Session advanced after it finished");
                Step::default()
            }
        }
    }
}

fn exit_code(view: &AppViewModel) -> u8 {
    if view.error_count > 0 || view.dispatch_error.is_some() {
        EXIT_FAILED
    } else {
        0
    }
}
