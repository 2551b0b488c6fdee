//! audioimager - Main entry point
//!
//! Loads a WAV file, opens the output device, and plays the file through
//! the mono/cancellation transform until the user quits.

use std::io::BufRead;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use audioimager::audio::{self, AudioOutput};
use audioimager::config::{parse_strength, PlayerConfig, Strengths};
use audioimager::console::{self, ConsoleCommand};
use audioimager::playback::{CallbackMonitor, PlaybackSession, StrengthControl};
use audioimager::transform::StereoTransform;
use audioimager::Error;

/// Polling period of the event loop
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Command-line arguments for audioimager
#[derive(Parser, Debug)]
#[command(name = "audioimager")]
#[command(about = "Play a WAV file with adjustable mono and cancellation strength")]
#[command(version)]
#[command(allow_negative_numbers = true)]
struct Args {
    /// WAV file to play (16-bit stereo PCM)
    #[arg(required_unless_present = "list_devices")]
    wav_path: Option<PathBuf>,

    /// Weight of the mono (L+R) component
    #[arg(required_unless_present = "list_devices", value_parser = mono_arg)]
    mono_strength: Option<i32>,

    /// Weight of the cancellation (L-R) component
    #[arg(required_unless_present = "list_devices", value_parser = cancel_arg)]
    cancel_strength: Option<i32>,

    /// Output device name (default device if omitted or not found)
    #[arg(short, long, env = "AUDIOIMAGER_DEVICE")]
    device: Option<String>,

    /// Audio host/back-end name (platform default if omitted)
    #[arg(long, env = "AUDIOIMAGER_HOST")]
    host: Option<String>,

    /// Device buffer size in frames (device default if omitted)
    #[arg(short, long, env = "AUDIOIMAGER_BUFFER_SIZE")]
    buffer_size: Option<u32>,

    /// Quit when the end of the file is reached
    #[arg(long)]
    exit_on_end: bool,

    /// List output devices and exit
    #[arg(long)]
    list_devices: bool,
}

fn mono_arg(value: &str) -> audioimager::Result<i32> {
    parse_strength("mono_strength", value)
}

fn cancel_arg(value: &str) -> audioimager::Result<i32> {
    parse_strength("cancel_strength", value)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Usage errors print to stderr and exit with code 2
    let args = Args::parse();

    // Initialize tracing (stderr, so stdout stays clean for --list-devices)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "audioimager=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = if args.list_devices {
        list_devices(args.host.as_deref())
    } else {
        match player_config(args) {
            Ok(config) => play(config).await,
            Err(e) => Err(e),
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            let code = err.downcast_ref::<Error>().map(Error::exit_code).unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

fn list_devices(host: Option<&str>) -> Result<()> {
    let host = audio::output::resolve_host(host)?;
    for name in audio::output::list_devices(&host)? {
        println!("{}", name);
    }
    Ok(())
}

/// Validate arguments into a player configuration.
fn player_config(args: Args) -> Result<PlayerConfig> {
    let (Some(wav_path), Some(mono), Some(cancel)) =
        (args.wav_path, args.mono_strength, args.cancel_strength)
    else {
        return Err(Error::Usage(
            "expected <WAV_PATH> <MONO_STRENGTH> <CANCEL_STRENGTH>".to_string(),
        )
        .into());
    };

    Ok(PlayerConfig {
        wav_path,
        strengths: Strengths::new(mono, cancel)?,
        device_name: args.device,
        host_name: args.host,
        buffer_size: args.buffer_size,
        exit_on_end: args.exit_on_end,
    })
}

async fn play(config: PlayerConfig) -> Result<()> {
    info!(
        "Starting audioimager {} ({}, built {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let host = audio::output::resolve_host(config.host_name.as_deref())?;

    let buffer = audio::load_wav(&config.wav_path)?;
    info!(
        "Loaded {}: {} Hz, {} frames ({:.1}s)",
        config.wav_path.display(),
        buffer.sample_rate(),
        buffer.frame_count(),
        buffer.duration_seconds()
    );

    info!(
        "Strengths: {} (divisor {})",
        config.strengths,
        StereoTransform::new(config.strengths).divisor()
    );

    let mut output = AudioOutput::open(
        &host,
        config.device_name.as_deref(),
        buffer.format(),
        config.buffer_size,
    )?;
    info!(
        "Output: {} ({} Hz, {} channels, {:?})",
        output.device_name(),
        output.sample_rate(),
        output.channels(),
        output.sample_format()
    );

    let control = StrengthControl::new(config.strengths);
    let session = PlaybackSession::with_control(buffer, control.clone());
    let monitor = Arc::new(CallbackMonitor::new());

    output
        .start(session, Arc::clone(&monitor))
        .context("Failed to start playback")?;
    info!("Playing. {}", console::HELP);

    run_event_loop(&control, &monitor, config.exit_on_end).await;

    output.stop()?;
    let stats = monitor.poll();
    info!(
        "Stopped after {} frames ({} callbacks)",
        stats.frames_produced, stats.callback_count
    );

    Ok(())
}

/// Wait for a quit request, applying strength commands from stdin meanwhile.
async fn run_event_loop(control: &StrengthControl, monitor: &CallbackMonitor, exit_on_end: bool) {
    let mut lines = spawn_stdin_reader();
    let mut stdin_open = true;
    let mut tick = tokio::time::interval(POLL_INTERVAL);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,

            line = lines.recv(), if stdin_open => match line {
                Some(line) => {
                    if !apply_command(control, &line) {
                        info!("Quit requested");
                        break;
                    }
                }
                None => {
                    info!("stdin closed; press Ctrl+C to quit");
                    stdin_open = false;
                }
            },

            _ = tick.tick() => {
                let stats = monitor.poll();
                if exit_on_end && stats.exhausted {
                    break;
                }
            }
        }
    }
}

/// Forward stdin lines from a detached thread.
///
/// A blocking stdin read cannot be cancelled, so it stays off the runtime;
/// the thread dies with the process.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Failed to read stdin: {}", e);
                    break;
                }
            }
        }
    });

    rx
}

/// Apply one console line. Returns false when the line asks to quit.
fn apply_command(control: &StrengthControl, line: &str) -> bool {
    let result = match console::parse_command(line) {
        Ok(ConsoleCommand::Quit) => return false,
        Ok(ConsoleCommand::Help) => {
            eprintln!("{}", console::HELP);
            return true;
        }
        Ok(ConsoleCommand::SetMono(mono)) => control.set_mono(mono),
        Ok(ConsoleCommand::SetCancel(cancel)) => control.set_cancel(cancel),
        Err(e) => Err(e),
    };

    match result {
        Ok(strengths) => info!("Strengths: {}", strengths),
        Err(e) => warn!("{}", e),
    }
    true
}

/// Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
