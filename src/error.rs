//! Error types for raw stream I/O and the workflows built on it

use thiserror::Error;

use crate::audio::config::SampleFormat;
use crate::audio::server::Direction;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("Sample type error: {0}")]
    Sample(#[from] SampleTypeError),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Stream parameter errors, raised before any connection is attempted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown sample format: {0:?}")]
    UnknownFormat(String),

    #[error("Unsupported stream format: {0}")]
    UnsupportedFormat(SampleFormat),

    #[error("Channels '{0}' is invalid")]
    InvalidChannelCount(u16),

    #[error("Sample rate '{0}' is invalid")]
    InvalidSampleRate(u32),
}

/// Failure reported by the audio server, with its native error code
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} (code {code})")]
pub struct ServerError {
    pub code: i32,
    pub message: String,
}

impl ServerError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Stream open and transfer errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    #[error("Failed to open {direction} stream: {source}")]
    Open {
        direction: Direction,
        source: ServerError,
    },

    #[error("Bad read: {0}")]
    Read(ServerError),

    #[error("Bad write: {0}")]
    Write(ServerError),

    #[error("Bad flush: {0}")]
    Flush(ServerError),

    #[error("Bad drain: {0}")]
    Drain(ServerError),

    #[error("Buffer of {len} bytes is not a multiple of the {frame_bytes} byte frame")]
    Misaligned { len: usize, frame_bytes: usize },

    #[error("Server stopped after {transferred} of {requested} bytes")]
    Incomplete { transferred: usize, requested: usize },
}

impl AudioError {
    /// Native server error code, when the server produced one
    pub fn code(&self) -> Option<i32> {
        match self {
            AudioError::Open { source, .. } => Some(source.code),
            AudioError::Read(e)
            | AudioError::Write(e)
            | AudioError::Flush(e)
            | AudioError::Drain(e) => Some(e.code),
            AudioError::Misaligned { .. } | AudioError::Incomplete { .. } => None,
        }
    }
}

/// Typed buffer does not fit the stream it was handed to
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SampleTypeError {
    #[error("Stream format isn't float32 NE (configured {0})")]
    FormatMismatch(SampleFormat),

    #[error("Wrong number of channels: stream has {expected}, buffer has {actual}")]
    ChannelMismatch { expected: u16, actual: u16 },

    #[error("No sample type for {0} channels")]
    UnsupportedSampleType(u16),

    #[error("{len} samples do not divide into {channels}-channel frames")]
    IncompleteFrame { len: usize, channels: u16 },
}

/// Result type alias for the crate
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_preserved() {
        let err = AudioError::Read(ServerError::new(16, "No data"));
        assert_eq!(err.code(), Some(16));
        assert_eq!(err.to_string(), "Bad read: No data (code 16)");

        let err = AudioError::Open {
            direction: Direction::Playback,
            source: ServerError::new(6, "Connection refused"),
        };
        assert_eq!(err.code(), Some(6));
        assert!(err.to_string().contains("playback"));

        let err = AudioError::Misaligned { len: 3, frame_bytes: 4 };
        assert_eq!(err.code(), None);
    }

    #[test]
    fn test_from_conversions() {
        let err: Error = ConfigError::InvalidSampleRate(0).into();
        assert!(matches!(err, Error::Config(ConfigError::InvalidSampleRate(0))));

        let err: Error = SampleTypeError::UnsupportedSampleType(3).into();
        assert!(matches!(err, Error::Sample(_)));
    }
}
