//! Stream parameters and their validation against a server

use std::fmt;
use std::str::FromStr;

use crate::audio::server::AudioServer;
use crate::constants::{
    DEFAULT_APP_NAME, DEFAULT_CHANNELS, DEFAULT_SAMPLE_RATE, DEFAULT_STREAM_NAME,
};
use crate::error::ConfigError;

/// Sample representations known to the audio server
///
/// Only [`SampleFormat::Float32Ne`] can be streamed; the rest exist so a
/// request for them is rejected by validation rather than by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleFormat {
    U8,
    ALaw,
    ULaw,
    S16Ne,
    S16Re,
    S32Ne,
    S32Re,
    Float32Ne,
    Float32Re,
}

impl SampleFormat {
    pub const ALL: [SampleFormat; 9] = [
        SampleFormat::U8,
        SampleFormat::ALaw,
        SampleFormat::ULaw,
        SampleFormat::S16Ne,
        SampleFormat::S16Re,
        SampleFormat::S32Ne,
        SampleFormat::S32Re,
        SampleFormat::Float32Ne,
        SampleFormat::Float32Re,
    ];

    /// Size of one sample of one channel
    pub fn bytes_per_sample(self) -> usize {
        match self {
            SampleFormat::U8 | SampleFormat::ALaw | SampleFormat::ULaw => 1,
            SampleFormat::S16Ne | SampleFormat::S16Re => 2,
            SampleFormat::S32Ne
            | SampleFormat::S32Re
            | SampleFormat::Float32Ne
            | SampleFormat::Float32Re => 4,
        }
    }

    /// Literal used on the command line and in config files
    pub fn as_str(self) -> &'static str {
        match self {
            SampleFormat::U8 => "u8",
            SampleFormat::ALaw => "alaw",
            SampleFormat::ULaw => "ulaw",
            SampleFormat::S16Ne => "s16ne",
            SampleFormat::S16Re => "s16re",
            SampleFormat::S32Ne => "s32ne",
            SampleFormat::S32Re => "s32re",
            SampleFormat::Float32Ne => "f32ne",
            SampleFormat::Float32Re => "f32re",
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SampleFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        if lower == "mulaw" {
            return Ok(SampleFormat::ULaw);
        }
        SampleFormat::ALL
            .into_iter()
            .find(|format| format.as_str() == lower)
            .ok_or_else(|| ConfigError::UnknownFormat(s.to_string()))
    }
}

/// Parameters shared by capture and playback streams
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfig {
    pub format: SampleFormat,
    /// Samples per second per channel
    pub rate: u32,
    pub channels: u16,
    pub app_name: String,
    pub stream_name: String,
    /// Server buffer cap in bytes, 0 lets the server choose
    pub buffer_max_bytes: u32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            format: SampleFormat::Float32Ne,
            rate: DEFAULT_SAMPLE_RATE,
            channels: DEFAULT_CHANNELS,
            app_name: DEFAULT_APP_NAME.to_string(),
            stream_name: DEFAULT_STREAM_NAME.to_string(),
            buffer_max_bytes: 0,
        }
    }
}

impl StreamConfig {
    /// Check the parameters against what the server accepts
    ///
    /// Format is checked first, then channels, then rate. Channel and rate
    /// ranges are whatever the server says they are.
    pub fn validate<S: AudioServer>(self, server: &S) -> Result<ValidatedConfig, ConfigError> {
        if self.format != SampleFormat::Float32Ne {
            return Err(ConfigError::UnsupportedFormat(self.format));
        }
        if !server.channels_valid(self.channels) {
            return Err(ConfigError::InvalidChannelCount(self.channels));
        }
        if !server.rate_valid(self.rate) {
            return Err(ConfigError::InvalidSampleRate(self.rate));
        }
        Ok(ValidatedConfig(self))
    }
}

/// A [`StreamConfig`] the server has accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedConfig(StreamConfig);

impl ValidatedConfig {
    pub fn format(&self) -> SampleFormat {
        self.0.format
    }

    pub fn rate(&self) -> u32 {
        self.0.rate
    }

    pub fn channels(&self) -> u16 {
        self.0.channels
    }

    pub fn app_name(&self) -> &str {
        &self.0.app_name
    }

    pub fn stream_name(&self) -> &str {
        &self.0.stream_name
    }

    pub fn buffer_max_bytes(&self) -> u32 {
        self.0.buffer_max_bytes
    }

    /// Bytes in one channel-frame
    pub fn frame_bytes(&self) -> usize {
        self.0.format.bytes_per_sample() * self.0.channels as usize
    }
}

impl AsRef<StreamConfig> for ValidatedConfig {
    fn as_ref(&self) -> &StreamConfig {
        &self.0
    }
}
