use ringbuf::traits::{Consumer, Producer};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use stepcue::{
    AudioEngine, Command, ExportScript, ExportSettings, GaitKind, MetronomeConfig, Sprite,
    StepEvent, StepExporter, create_command_channel, create_step_event_channel,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_SECONDS: f64 = 10.0;
const POLL_INTERVAL: Duration = Duration::from_millis(10);

const USAGE: &str = "usage: stepcue [--config PATH] [--gait walk|gallop|skip] [--period SECONDS] \
[--asymmetry A] [--seconds N] [--export OUT.wav] [--dump]";

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    gait: Option<GaitKind>,
    period: Option<f64>,
    asymmetry: Option<f64>,
    seconds: Option<f64>,
    export: Option<PathBuf>,
    dump: bool,
}

impl Args {
    fn parse(mut raw: impl Iterator<Item = String>) -> Result<Self, String> {
        let mut args = Args::default();

        while let Some(flag) = raw.next() {
            let mut value = || raw.next().ok_or_else(|| format!("{} needs a value", flag));
            match flag.as_str() {
                "--config" => args.config = Some(PathBuf::from(value()?)),
                "--export" => args.export = Some(PathBuf::from(value()?)),
                "--gait" => args.gait = Some(value()?.parse().map_err(|e| format!("{}", e))?),
                "--period" => args.period = Some(parse_number(&flag, &value()?)?),
                "--asymmetry" => args.asymmetry = Some(parse_number(&flag, &value()?)?),
                "--seconds" => args.seconds = Some(parse_number(&flag, &value()?)?),
                "--dump" => args.dump = true,
                "-h" | "--help" => return Err(USAGE.to_string()),
                other => return Err(format!("unknown argument '{}'\n{}", other, USAGE)),
            }
        }

        Ok(args)
    }
}

fn parse_number(flag: &str, text: &str) -> Result<f64, String> {
    text.parse()
        .map_err(|_| format!("{} expects a number, got '{}'", flag, text))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = match Args::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            std::process::exit(2);
        }
    };

    if let Err(e) = run(args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = MetronomeConfig::load_or_default(args.config.as_deref())?;
    if let Some(gait) = args.gait {
        config.gait = gait;
    }
    if let Some(period) = args.period {
        config.period = period;
    }
    if let Some(asymmetry) = args.asymmetry {
        config.asymmetry = asymmetry;
    }
    config.validate()?;
    warn_if_clamped(&config);
    let seconds = args.seconds.unwrap_or(DEFAULT_SECONDS);

    if args.dump {
        let sequence = config
            .gait
            .build(config.period, config.asymmetry, &config.limits);
        println!("{}", serde_json::to_string_pretty(&sequence)?);
        return Ok(());
    }

    info!(
        gait = %config.gait,
        period = config.period,
        asymmetry = config.asymmetry,
        "StepCue starting"
    );

    if let Some(path) = args.export {
        let script = ExportScript::new().at(0.0, Command::Play);
        let summary = StepExporter::new(ExportSettings::default())
            .export(&path, &config, &script, seconds)?;
        info!(frames = summary.frames, peak = summary.peak, "Wrote {}", path.display());
        return Ok(());
    }

    play_live(&config, seconds)
}

/// Out-of-range values are clamped by the controller, say so up front
fn warn_if_clamped(config: &MetronomeConfig) {
    let period = config.limits.clamp_period(config.period);
    if period != config.period {
        warn!(requested = config.period, period, "Period clamped");
    }
    let asymmetry = config.limits.clamp_asymmetry(config.asymmetry);
    if asymmetry != config.asymmetry {
        warn!(requested = config.asymmetry, asymmetry, "Asymmetry clamped");
    }
}

/// Play through the default output device, printing steps as they happen
fn play_live(config: &MetronomeConfig, seconds: f64) -> Result<(), Box<dyn std::error::Error>> {
    if !(seconds.is_finite() && seconds > 0.0) {
        return Err(format!("--seconds must be finite and > 0, got {}", seconds).into());
    }

    let (mut command_tx, command_rx) = create_command_channel(config.command_capacity);
    let (event_tx, mut event_rx) = create_step_event_channel(config.event_capacity);

    let engine = AudioEngine::new(config, command_rx, event_tx)?;
    if command_tx.try_push(Command::Play).is_err() {
        return Err("command channel full".into());
    }

    let started = Instant::now();
    let run_for = Duration::from_secs_f64(seconds);

    while started.elapsed() < run_for {
        if engine.has_failed() {
            return Err("audio stream failed".into());
        }

        while let Some(event) = event_rx.try_pop() {
            match event {
                StepEvent::FootTone { foot, note, time } => {
                    println!("{:>8.3}s  {:<5} note {}", time, foot, note.midi());
                    tracing::debug!(sprite = ?Sprite::step(foot), time, "Sprite");
                }
                StepEvent::SpriteChange { sprite, time } => {
                    tracing::debug!(?sprite, time, "Sprite");
                }
                StepEvent::Transport { state, time } => {
                    info!(?state, time, "Transport");
                }
                StepEvent::CommandRejected { error, time } => {
                    warn!(time, "Command rejected: {}", error);
                }
            }
        }

        thread::sleep(POLL_INTERVAL);
    }

    if command_tx.try_push(Command::Stop).is_err() {
        warn!("Could not send stop command, dropping the stream instead");
    }
    // Let the audio thread pick up the stop before the stream is dropped
    thread::sleep(POLL_INTERVAL * 5);
    info!("StepCue stopped");

    Ok(())
}
