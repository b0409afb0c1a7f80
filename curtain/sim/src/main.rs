//! Curtain Simulator - Headless panel transition runner
//!
//! Loads a panel configuration, replays a request script against it at a
//! fixed frame rate, logs every lifecycle event and prints the final panel
//! states as JSON.
//!
//! # Usage
//!
//! ```bash
//! # Run the configured panels with their start states only
//! curtain-sim --config panels.toml
//!
//! # Replay a script at 30 fps, then settle for another second
//! curtain-sim --config panels.toml --script steps.toml --fps 30 --ticks 30
//!
//! # Slow motion with verbose logging
//! RUST_LOG=debug curtain-sim --config panels.toml --time-scale 0.25
//! ```

mod script;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{debug, info, warn};

use curtain_core::{
    load_config_from_path, AudioCue, AudioSink, ConfigOverrides, CurtainConfig, DeferredAction,
    EventStream, FrameTime, PanelEvent, PanelId, PanelOrchestrator, PanelState, VisualProperties,
};

use script::Script;

/// Curtain Simulator - drive panel transitions without a renderer
#[derive(Parser, Debug)]
#[command(name = "curtain-sim")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "CURTAIN_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Request script to replay
    #[arg(short = 's', long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// Extra frames to run after the script
    #[arg(short = 't', long, default_value_t = 0)]
    ticks: u32,

    /// Simulated frames per second
    #[arg(long, default_value_t = 60.0)]
    fps: f32,

    /// Override the orchestrator time scale
    #[arg(long, value_name = "SCALE")]
    time_scale: Option<f32>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "CURTAIN_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

/// Final state of one panel
#[derive(Debug, Clone, PartialEq, Serialize)]
struct PanelSnapshot {
    id: PanelId,
    parent: Option<PanelId>,
    state: PanelState,
    progress: f32,
    deferred: Option<DeferredAction>,
    visible: bool,
    properties: VisualProperties,
}

/// Outcome of a simulation run
#[derive(Debug, Clone, PartialEq, Serialize)]
struct Report {
    frames: u64,
    elapsed_secs: f32,
    events: Vec<PanelEvent>,
    panels: Vec<PanelSnapshot>,
}

/// Audio sink that only logs
struct LogAudio;

impl AudioSink for LogAudio {
    fn play(&mut self, cue: &AudioCue) {
        info!(panel = %cue.panel, event = %cue.kind, sound = %cue.name, "Audio cue");
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level)?;

    if !(args.fps.is_finite() && args.fps > 0.0) {
        bail!("--fps must be a positive number, got {}", args.fps);
    }

    let mut config = load_config_from_path(args.config.clone())
        .with_context(|| format!("Failed to load configuration: {:?}", args.config))?;

    let mut overrides = ConfigOverrides::new();
    if let Some(scale) = args.time_scale {
        overrides = overrides.with_time_scale(scale);
    }
    overrides.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    info!(
        source = %config.source(),
        panels = config.panels.len(),
        time_scale = config.orchestrator.time_scale,
        "Configuration loaded"
    );

    let script = match &args.script {
        Some(path) => Script::load(path)?,
        None => Script::default(),
    };

    let report = simulate(&config, &script, args.fps, args.ticks);

    info!(
        frames = report.frames,
        events = report.events.len(),
        elapsed_secs = report.elapsed_secs,
        "Simulation finished"
    );

    let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
    println!("{json}");

    Ok(())
}

/// Initialize logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("curtain_sim={level},curtain_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Build the orchestrator, replay `script`, then run `extra_ticks` frames
fn simulate(config: &CurtainConfig, script: &Script, fps: f32, extra_ticks: u32) -> Report {
    let mut orchestrator = PanelOrchestrator::from_config(config);
    orchestrator.set_audio_sink(Box::new(LogAudio));
    let mut stream = orchestrator.event_stream();

    let delta = 1.0 / fps;
    let frame = FrameTime::new(delta * orchestrator.settings().time_scale, delta);
    let mut frames: u64 = 0;
    let mut events = Vec::new();

    orchestrator.start();
    collect(&mut stream, &mut events);

    for (index, step) in script.steps.iter().enumerate() {
        for _ in 0..step.tick {
            orchestrator.tick(frame);
            frames += 1;
        }
        collect(&mut stream, &mut events);

        if let Some(request) = &step.request {
            let changed = orchestrator.turn(request.clone());
            debug!(
                step = index,
                panel = %request.panel,
                direction = ?request.direction,
                changed,
                "Scripted request"
            );
            if !changed {
                warn!(step = index, panel = %request.panel, "Scripted request had no effect");
            }
            collect(&mut stream, &mut events);
        }
    }

    for _ in 0..extra_ticks {
        orchestrator.tick(frame);
        frames += 1;
    }
    collect(&mut stream, &mut events);

    let panels = orchestrator
        .registry()
        .iter()
        .map(|(id, panel)| PanelSnapshot {
            id: id.clone(),
            parent: panel.parent().cloned(),
            state: panel.state(),
            progress: panel.progress(),
            deferred: panel.deferred(),
            visible: panel.visual().active,
            properties: panel.visual().properties,
        })
        .collect();

    orchestrator.shutdown();

    #[allow(clippy::cast_precision_loss)]
    let elapsed_secs = frames as f32 * delta;

    Report {
        frames,
        elapsed_secs,
        events,
        panels,
    }
}

/// Drain pending stream events into `events`, logging each one
fn collect(stream: &mut EventStream, events: &mut Vec<PanelEvent>) {
    while let Ok(event) = stream.try_recv() {
        info!(panel = %event.panel, event = %event.kind, "Lifecycle event");
        events.push(event);
    }
}
