//! Command-line surface of `pa-raw`
//!
//! Stream flags are global, so they can be given before or after the
//! subcommand. Anything left unset falls back to the config file, then to
//! the built-in defaults.

use clap::{ArgAction, Args, Parser, Subcommand};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::audio::{AudioServer, StreamConfig};
use crate::codec::check_channels;
use crate::config::{AppConfig, StreamSettings};
use crate::constants::{DEFAULT_DURATION, DEFAULT_RAW_FILE};
use crate::error::{Error, Result};
use crate::workflow::{self, CheckOptions, StopSignal};

#[derive(Parser, Debug)]
#[command(name = "pa-raw")]
#[command(version, about = "Perform raw read and write actions with the audio server", long_about = None)]
pub struct Cli {
    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file [default: <config dir>/pa-raw/config.toml]
    #[arg(long, global = true, env = "PA_RAW_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub stream: StreamArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Stream parameters shared by every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct StreamArgs {
    /// Samples per second [default: 44100]
    #[arg(long, global = true)]
    pub samples_per_second: Option<u32>,

    /// Sample format [default: f32ne]
    #[arg(long, global = true)]
    pub format: Option<String>,

    /// Channel count, 1 or 2; stereo files are interleaved [default: 1]
    #[arg(long, global = true)]
    pub channels: Option<u16>,

    /// Cap on the server-side playback buffer, in bytes (0 = server default)
    #[arg(long, global = true)]
    pub buffer_max_bytes: Option<u32>,

    /// Audio server to connect to instead of the default one
    #[arg(long, global = true, env = "PULSE_SERVER")]
    pub server: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Record raw samples from the default input into a file
    Record {
        /// How long to record, e.g. "10s", "1m30s", "250ms"
        #[arg(long, default_value = DEFAULT_DURATION, value_parser = parse_duration)]
        duration: Duration,

        /// File to write raw samples to
        #[arg(long, default_value = DEFAULT_RAW_FILE)]
        output: PathBuf,
    },

    /// Play raw samples from a file on the default output
    Play {
        /// File to read raw samples from
        #[arg(long, default_value = DEFAULT_RAW_FILE)]
        input: PathBuf,
    },

    /// Repeatedly record a stretch of audio and play it back
    Check {
        /// Audio captured per pass
        #[arg(long, default_value = DEFAULT_DURATION, value_parser = parse_duration)]
        duration: Duration,

        /// Stop after this many passes instead of running until interrupted
        #[arg(long)]
        passes: Option<usize>,
    },
}

impl StreamArgs {
    /// Overlay the flags that were given onto `settings`
    pub fn apply(&self, settings: &mut StreamSettings) {
        if let Some(rate) = self.samples_per_second {
            settings.samples_per_second = rate;
        }
        if let Some(format) = &self.format {
            settings.format = format.clone();
        }
        if let Some(channels) = self.channels {
            settings.channels = channels;
        }
        if let Some(max) = self.buffer_max_bytes {
            settings.buffer_max_bytes = max;
        }
    }
}

impl Cli {
    /// Merge the config file with the command-line flags
    pub fn stream_config(&self, config: &AppConfig) -> Result<StreamConfig> {
        let mut settings = config.stream.clone();
        self.stream.apply(&mut settings);
        settings.to_stream_config()
    }
}

/// Parse a duration such as "300ms", "1.5h" or "2h45m"
///
/// Accepts a sequence of decimal numbers, each with a unit suffix of
/// `ns`, `us` (or `µs`), `ms`, `s`, `m` or `h`. A bare `0` is also accepted.
pub fn parse_duration(input: &str) -> Result<Duration> {
    let invalid = |reason: &str| Error::InvalidDuration(format!("{:?}: {}", input, reason));

    let text = input.trim();
    if text.is_empty() {
        return Err(invalid("empty"));
    }
    if text == "0" {
        return Ok(Duration::ZERO);
    }

    let mut nanos = 0f64;
    let mut rest = text;
    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_end == 0 {
            return Err(invalid("expected a number"));
        }
        let value: f64 = rest[..number_end]
            .parse()
            .map_err(|_| invalid("malformed number"))?;
        rest = &rest[number_end..];

        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let scale = match &rest[..unit_end] {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            "" => return Err(invalid("missing unit")),
            _ => return Err(invalid("unknown unit")),
        };
        nanos += value * scale;
        rest = &rest[unit_end..];
    }

    if !nanos.is_finite() || nanos > u64::MAX as f64 {
        return Err(invalid("out of range"));
    }
    Ok(Duration::from_nanos(nanos.round() as u64))
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins when set; otherwise `-v`/`-q` pick the level for this
/// crate and everything else logs warnings only.
pub fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,pa_raw={}", level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Run the selected subcommand against `server`
///
/// The stream configuration and the buffer shape it implies are checked
/// before any file is created or opened, so a bad flag never truncates an
/// existing recording.
pub fn run<S: AudioServer>(cli: &Cli, config: &AppConfig, server: &S, stop: &StopSignal) -> Result<()> {
    let stream = cli.stream_config(config)?.validate(server)?;
    check_channels(stream.channels())?;

    match &cli.command {
        Command::Record { duration, output } => {
            info!(output = %output.display(), "Writing raw samples");
            let mut sink = BufWriter::new(File::create(output)?);
            workflow::run_record(server, stream, *duration, &mut sink)?;
        }
        Command::Play { input } => {
            info!(input = %input.display(), "Reading raw samples");
            let mut source = BufReader::new(File::open(input)?);
            workflow::run_play(server, stream, &mut source)?;
        }
        Command::Check { duration, passes } => {
            let mut options = CheckOptions::new(*duration).with_stop(stop.clone());
            if let Some(passes) = passes {
                options = options.with_passes(*passes);
            }
            workflow::run_check(server, stream, &options)?;
        }
    }
    Ok(())
}
