//! # Frequency Finder - Command Line Tuner
//!
//! Host for `finder-core`. Reads raw frequency estimates (one or more per
//! line, whitespace separated) from a file or stdin, tracks the pitch,
//! records the samples and prints a summary when the stream ends.
//!
//! ## Architecture
//! - **Reader Thread**: parses the input and is the single producer
//! - **Main Thread**: owns the tracker and the recording session
//! - **Communication**: a bounded crossbeam channel, in arrival order
//!
//! The words `start`, `stop` and `clear` in the input drive the recording
//! session, so a captured estimator log can be replayed with its takes.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use crossbeam_channel::{Receiver, Sender};
use finder_core::{
    ModifierPreference, PitchReading, PitchTracker, RecordingExport, RecordingSession,
    SmoothingPreset, TrackerConfig,
};
use serde::Serialize;

/// Capacity of the reader -> tracker channel.
const CHANNEL_CAPACITY: usize = 256;

/// Tolerance used for the "in tune" marker in the log.
const IN_TUNE_CENTS: f32 = 5.0;

#[derive(Parser, Debug)]
#[command(name = "finder")]
#[command(about = "Track pitch and summarise a stream of frequency estimates", long_about = None)]
struct Args {
    /// File of frequency estimates in Hz (reads stdin when omitted)
    #[arg(short = 'i', long)]
    input: Option<PathBuf>,

    /// JSON tracker config ({"smoothing_factor": .., "reference_a4": ..})
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Smoothing preset, overridden by --smoothing
    #[arg(short = 'p', long, value_enum)]
    preset: Option<Preset>,

    /// Smoothing factor in (0, 1]
    #[arg(short = 's', long)]
    smoothing: Option<f32>,

    /// Frequency of A4 in Hz
    #[arg(short = 'r', long)]
    reference: Option<f32>,

    /// Spell accidentals as flats (Bb4) instead of sharps (A#4)
    #[arg(long)]
    flats: bool,

    /// Don't start recording automatically; only `start` in the input does
    #[arg(long)]
    no_record: bool,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Preset {
    Live,
    Passive,
}

impl From<Preset> for SmoothingPreset {
    fn from(preset: Preset) -> Self {
        match preset {
            Preset::Live => SmoothingPreset::LiveTuning,
            Preset::Passive => SmoothingPreset::PassiveListening,
        }
    }
}

/// One item from the input stream.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Event {
    Sample(f32),
    Start,
    Stop,
    Clear,
}

#[derive(Debug, Serialize)]
struct Summary {
    config: TrackerConfig,
    samples_seen: u64,
    samples_accepted: u64,
    reading: Option<PitchReading>,
    recording: RecordingExport,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = resolve_config(&args)?;
    log::info!(
        "Tracking with smoothing {} at A4 = {} Hz",
        config.smoothing_factor,
        config.reference_a4
    );

    let (tx, rx) = crossbeam_channel::bounded(CHANNEL_CAPACITY);
    let reader = spawn_reader(args.input.clone(), tx)?;

    let summary = track(&config, rx, !args.no_record)?;

    reader
        .join()
        .map_err(|_| anyhow!("input reader thread panicked"))??;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

/// Builds the tracker config: file first, then preset, then explicit flags.
fn resolve_config(args: &Args) -> Result<TrackerConfig> {
    let mut config = match &args.config {
        Some(path) => TrackerConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => TrackerConfig::default(),
    };
    if let Some(preset) = args.preset {
        config.smoothing_factor = SmoothingPreset::from(preset).smoothing_factor();
    }
    if let Some(smoothing) = args.smoothing {
        config.smoothing_factor = smoothing;
    }
    if let Some(reference) = args.reference {
        config.reference_a4 = reference;
    }
    if args.flats {
        config.modifier_preference = ModifierPreference::Flats;
    }
    config.validate().context("invalid tracker settings")?;
    Ok(config)
}

/// Starts the producer thread that parses input into events.
fn spawn_reader(input: Option<PathBuf>, sender: Sender<Event>) -> Result<JoinHandle<Result<()>>> {
    let source: Box<dyn BufRead + Send> = match &input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let handle = thread::Builder::new()
        .name("input-reader".into())
        .spawn(move || read_events(source, &sender))?;
    Ok(handle)
}

fn read_events(source: impl BufRead, sender: &Sender<Event>) -> Result<()> {
    for (line_no, line) in source.lines().enumerate() {
        let line = line.context("reading input")?;
        for token in line.split_whitespace() {
            let Some(event) = parse_token(token) else {
                log::warn!("line {}: skipping {token:?}", line_no + 1);
                continue;
            };
            if sender.send(event).is_err() {
                // Receiver gone, nothing left to deliver to.
                return Ok(());
            }
        }
    }
    Ok(())
}

fn parse_token(token: &str) -> Option<Event> {
    match token.to_ascii_lowercase().as_str() {
        "start" => Some(Event::Start),
        "stop" => Some(Event::Stop),
        "clear" => Some(Event::Clear),
        other => other.parse().ok().map(Event::Sample),
    }
}

/// Consumes events until the reader hangs up.
fn track(config: &TrackerConfig, events: Receiver<Event>, record: bool) -> Result<Summary> {
    let mut tracker = PitchTracker::from_config(config)?;
    let mut session = RecordingSession::new();
    if record {
        session.start();
    }

    let mut samples_seen = 0;
    for event in events {
        match event {
            Event::Start => session.start(),
            Event::Stop => session.stop(),
            Event::Clear => {
                log::info!("clearing {} recorded samples", session.len());
                session.clear();
            }
            Event::Sample(frequency) => {
                samples_seen += 1;
                if !tracker.update_pitch(frequency) {
                    continue;
                }
                session.add_pitch(frequency);
                if let Some(reading) = tracker.reading() {
                    log_reading(reading, config.modifier_preference);
                }
            }
        }
    }
    session.stop();

    Ok(Summary {
        config: *config,
        samples_seen,
        samples_accepted: tracker.update_count(),
        reading: tracker.reading().copied(),
        recording: session.export(),
    })
}

fn log_reading(reading: &PitchReading, preference: ModifierPreference) {
    let marker = if reading.in_tune(IN_TUNE_CENTS) { " *" } else { "" };
    log::info!(
        "{:>4} {:+6.1} cents  ({:.2} Hz){marker}",
        reading.closest_note.spelled(preference),
        reading.delta_cents,
        reading.smoothed_frequency
    );
}

fn print_summary(summary: &Summary) {
    println!(
        "Samples: {} seen, {} accepted",
        summary.samples_seen, summary.samples_accepted
    );
    match &summary.reading {
        Some(reading) => println!(
            "Final reading: {} {:+.1} cents ({:.2} Hz)",
            reading.closest_note.spelled(summary.config.modifier_preference),
            reading.delta_cents,
            reading.smoothed_frequency
        ),
        None => println!("Final reading: no pitch detected"),
    }
    match &summary.recording.statistics {
        Some(stats) => {
            println!("Recorded {} samples", stats.count);
            println!("  min    {:.2} Hz", stats.min);
            println!("  max    {:.2} Hz", stats.max);
            println!("  mean   {:.2} Hz", stats.mean);
            println!("  median {:.2} Hz", stats.median);
        }
        None => println!("Recording: no data"),
    }
}
