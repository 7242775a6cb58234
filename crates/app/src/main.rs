use std::{
    io::{BufRead, Write},
    ops::ControlFlow,
    path::{Path, PathBuf},
    sync::mpsc,
    time::Duration,
};

use clap::{Parser, Subcommand};
use kenko_core::{
    catalog_listing, AppConfig, BreathingSession, Clock, CueAssets, CueId, CueOutput, CuePlayer,
    Exercise, ExerciseCatalog, ExerciseSummary, Frame, PlaybackClock, PlaybackEvent,
    RendererRegistry, Selection, SessionFrame, StopHandle, SystemClock, Ticker,
};
use tracing_subscriber::EnvFilter;

fn main() -> kenko_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    let catalog = match &cli.catalog {
        Some(path) => ExerciseCatalog::load(path)?,
        None => ExerciseCatalog::builtin(),
    };

    match cli.command {
        Commands::List => {
            print!("{}", catalog_listing(&catalog));
            Ok(())
        }
        Commands::Show { id } => {
            let id = id.unwrap_or_else(|| config.playback.default_exercise.clone());
            println!("{}", Selection::resolve(&catalog, &id));
            Ok(())
        }
        Commands::Run {
            id,
            muted,
            tick_ms,
            max_seconds,
        } => {
            let id = id.unwrap_or_else(|| config.playback.default_exercise.clone());
            let Some(exercise) = resolve(&catalog, &id) else {
                return Ok(());
            };
            let interval = tick_ms
                .map(Duration::from_millis)
                .unwrap_or_else(|| config.playback.tick_interval());
            run_live(
                exercise.clone(),
                &config,
                muted || config.audio.muted,
                interval,
                max_seconds,
            )
        }
        Commands::Simulate {
            id,
            seconds,
            tick_ms,
        } => {
            let id = id.unwrap_or_else(|| config.playback.default_exercise.clone());
            let Some(exercise) = resolve(&catalog, &id) else {
                return Ok(());
            };
            let interval = tick_ms
                .map(Duration::from_millis)
                .unwrap_or_else(|| config.playback.tick_interval());
            run_simulation(exercise.clone(), interval, seconds)
        }
    }
}

/// Unknown ids print the catalog listing rather than failing.
fn resolve<'a>(catalog: &'a ExerciseCatalog, id: &str) -> Option<&'a Exercise> {
    let selection = Selection::resolve(catalog, id);
    if selection.exercise().is_none() {
        print!("{selection}");
    }
    selection.exercise()
}

/// Commands typed on stdin while an exercise plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LiveCommand {
    ToggleMute,
    Stop,
}

impl LiveCommand {
    fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "m" | "mute" | "unmute" => Some(LiveCommand::ToggleMute),
            "q" | "quit" | "stop" => Some(LiveCommand::Stop),
            _ => None,
        }
    }
}

/// Forwards recognised stdin commands until stdin closes or the receiver is
/// dropped.
fn spawn_command_reader() -> mpsc::Receiver<LiveCommand> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            match LiveCommand::parse(&line) {
                Some(command) => {
                    if tx.send(command).is_err() {
                        break;
                    }
                }
                None => tracing::debug!(line, "ignoring unknown command"),
            }
        }
    });
    rx
}

fn run_live(
    exercise: Exercise,
    config: &AppConfig,
    muted: bool,
    interval: Duration,
    max_seconds: Option<f64>,
) -> kenko_core::Result<()> {
    tracing::info!(exercise = %exercise.id, ?interval, muted, "starting live session");

    let ticker = Ticker::new(interval)?;
    let stop = StopHandle::new();
    {
        let stop = stop.clone();
        ctrlc::set_handler(move || stop.stop())
            .map_err(|err| kenko_core::KenkoError::msg(format!("ctrl-c handler: {err}")))?;
    }

    let bell = TerminalBell::new(config.audio.cues.clone());
    let mut session = BreathingSession::new(
        CuePlayer::new(Box::new(bell)),
        RendererRegistry::with_defaults(),
    );
    session.set_muted(muted);

    println!("{}\n", ExerciseSummary::new(&exercise).instructions());
    println!("Type `m` + Enter to toggle sound, `q` + Enter to stop.\n");
    let commands = spawn_command_reader();

    let clock = SystemClock::new();
    let deadline = max_seconds.and_then(|seconds| Duration::try_from_secs_f64(seconds).ok());
    let first = session.start(exercise, clock.now())?;
    draw(&first);

    ticker.run(&clock, &stop, |now| {
        if deadline.is_some_and(|deadline| now >= deadline) {
            session.stop();
            return ControlFlow::Break(());
        }
        while let Ok(command) = commands.try_recv() {
            match command {
                LiveCommand::ToggleMute => {
                    let muted = session.toggle_mute();
                    tracing::info!(muted, "sound toggled");
                }
                LiveCommand::Stop => {
                    session.stop();
                    return ControlFlow::Break(());
                }
            }
        }
        match session.tick(now) {
            Some(frame) => {
                draw(&frame);
                ControlFlow::Continue(())
            }
            None => ControlFlow::Break(()),
        }
    });

    // Ctrl-C, `q` or the deadline may have cut playback short.
    session.stop();
    println!();
    Ok(())
}

fn run_simulation(
    exercise: Exercise,
    interval: Duration,
    seconds: Option<f64>,
) -> kenko_core::Result<()> {
    if interval.is_zero() {
        return Err(kenko_core::KenkoError::InvalidInput(
            "tick interval must be positive",
        ));
    }

    let horizon = seconds
        .or_else(|| exercise.total_duration_seconds())
        .unwrap_or_else(|| exercise.cycle_duration_seconds());
    let horizon = Duration::try_from_secs_f64(horizon)
        .unwrap_or(Duration::ZERO)
        .saturating_add(interval);

    let mut clock = PlaybackClock::new();
    let mut session = BreathingSession::new(CuePlayer::silent(), RendererRegistry::with_defaults());
    let first = session.start(exercise, clock.now())?;
    print_event(clock.now(), &first);

    while session.is_running() && clock.now() < horizon {
        clock.advance(interval);
        if let Some(frame) = session.tick(clock.now()) {
            if frame.event.is_some() {
                print_event(clock.now(), &frame);
            }
        }
    }

    if session.is_running() {
        session.stop();
        println!("{:>8.2}s  stopped", clock.now().as_secs_f64());
    }
    Ok(())
}

fn print_event(now: Duration, frame: &SessionFrame) {
    let at = now.as_secs_f64();
    match frame.event {
        Some(PlaybackEvent::StepStarted { .. }) => println!(
            "{at:>8.2}s  {:<32} {} | {}",
            frame.status.heading, frame.status.cycle_label, frame.status.step_label
        ),
        Some(PlaybackEvent::Completed { cycles }) => {
            println!("{at:>8.2}s  complete after {cycles} cycles")
        }
        None => {}
    }
}

fn draw(frame: &SessionFrame) {
    let mut out = std::io::stdout().lock();
    let _ = write!(out, "\r{} {}\x1b[K", frame.status, figure(&frame.frame));
    let _ = out.flush();
}

/// Compact text stand-in for the animation: a gauge of the figure's fill.
fn figure(frame: &Frame) -> String {
    const WIDTH: usize = 12;
    let filled = ((frame.fill.clamp(0.0, 1.0) * WIDTH as f32).round() as usize).min(WIDTH);
    let gauge = format!("{}{}", "o".repeat(filled), ".".repeat(WIDTH - filled));
    match &frame.label {
        Some(label) => format!("{} ({gauge}) {label}", frame.style),
        None => format!("{} ({gauge})", frame.style),
    }
}

/// Rings the terminal bell for each cue. Cue assets only exist as names here,
/// so a missing file is reported but does not stop the bell.
struct TerminalBell {
    assets: CueAssets,
}

impl TerminalBell {
    fn new(assets: CueAssets) -> Self {
        Self { assets }
    }
}

impl CueOutput for TerminalBell {
    fn play_from_start(&mut self, cue: CueId) -> kenko_core::Result<()> {
        let asset = self.assets.path(cue);
        if !Path::new(asset).exists() {
            tracing::debug!(%cue, asset, "cue asset not found on disk");
        }
        let mut err = std::io::stderr().lock();
        err.write_all(b"\x07")?;
        err.flush()?;
        Ok(())
    }

    fn set_muted(&mut self, muted: bool) {
        tracing::debug!(muted, "terminal bell mute changed");
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Guided breathing exercises", long_about = None)]
struct Cli {
    /// JSON configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// JSON exercise catalog to use instead of the built-in one.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the available exercises.
    List,
    /// Show the instructions for an exercise.
    Show {
        /// Exercise id; defaults to the configured default exercise.
        id: Option<String>,
    },
    /// Play an exercise in real time.
    Run {
        /// Exercise id; defaults to the configured default exercise.
        id: Option<String>,
        /// Start with audio cues muted.
        #[arg(short, long)]
        muted: bool,
        /// Tick interval in milliseconds.
        #[arg(long)]
        tick_ms: Option<u64>,
        /// Stop after this many seconds, even if the routine is unbounded.
        #[arg(long)]
        max_seconds: Option<f64>,
    },
    /// Play an exercise on a simulated clock and print every step change.
    Simulate {
        /// Exercise id; defaults to the configured default exercise.
        id: Option<String>,
        /// Simulated seconds to run; defaults to the whole routine, or one
        /// cycle when it repeats forever.
        #[arg(short, long)]
        seconds: Option<f64>,
        /// Tick interval in milliseconds.
        #[arg(long)]
        tick_ms: Option<u64>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_live_commands() {
        assert_eq!(LiveCommand::parse("m"), Some(LiveCommand::ToggleMute));
        assert_eq!(LiveCommand::parse(" Mute \n"), Some(LiveCommand::ToggleMute));
        assert_eq!(LiveCommand::parse("q"), Some(LiveCommand::Stop));
        assert_eq!(LiveCommand::parse("louder"), None);
    }

    #[test]
    fn unknown_id_resolves_to_nothing_without_error() {
        let catalog = ExerciseCatalog::builtin();
        assert!(resolve(&catalog, "sunrise").is_none());
        assert_eq!(resolve(&catalog, "stress").map(|e| e.id.as_str()), Some("stress"));
    }

    #[test]
    fn cli_accepts_run_flags() {
        let cli = Cli::try_parse_from(["kenko", "run", "timer", "--muted", "--tick-ms", "20"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Run { ref id, muted: true, tick_ms: Some(20), .. } if id.as_deref() == Some("timer")
        ));
    }
}
