//! # pa-raw
//!
//! Raw PCM sample exchange with the audio server, plus record, play and
//! loop-back workflows built on it.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────────┐
//! │  pa-raw record / play / check              (cli, workflow::*)         │
//! │        │                     ▲                                        │
//! │        │ StreamConfig        │ chunks of f32 / [f32; 2]               │
//! │        ▼                     │                                        │
//! │  ┌──────────────┐   ┌────────┴────────┐   ┌──────────────────────┐    │
//! │  │ validate()   │──▶│ CaptureStream   │   │ PlaybackStream       │    │
//! │  │ (format,     │   │  flush / read   │   │  write / drain       │    │
//! │  │  channels,   │   └────────┬────────┘   └──────────┬───────────┘    │
//! │  │  rate)       │            │  codec: typed ⇄ bytes │                │
//! │  └──────────────┘            ▼                       ▼                │
//! │  ┌─────────────────────────────────────────────────────────────────┐  │
//! │  │  AudioServer / Connection   (pulse::PulseServer, MemoryServer)  │  │
//! │  └─────────────────────────────────────────────────────────────────┘  │
//! └───────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Raw sample files are flat native-endian `f32` with no header; the channel
//! count of the stream decides how they are interleaved.

pub mod audio;
pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod workflow;

pub use error::{Error, Result};

/// Application-wide constants
pub mod constants {
    /// Default sample rate for both stream directions
    pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

    /// Default channel count (mono)
    pub const DEFAULT_CHANNELS: u16 = 1;

    /// Application name reported to the audio server
    pub const DEFAULT_APP_NAME: &str = "pa-raw";

    /// Stream name reported to the audio server
    pub const DEFAULT_STREAM_NAME: &str = "pa-raw";

    /// Record and play move audio in chunks of 1/10 s
    pub const CHUNKS_PER_SECOND: u32 = 10;

    /// Default recording / check duration
    pub const DEFAULT_DURATION: &str = "10s";

    /// Default raw sample file
    pub const DEFAULT_RAW_FILE: &str = "audio.raw";
}
