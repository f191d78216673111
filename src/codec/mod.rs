//! Typed sample buffers
//!
//! Maps in-memory sample shapes to the byte regions the streams move:
//!
//! | shape            | channels | bytes per element |
//! |------------------|----------|-------------------|
//! | `[f32]`          | 1        | 4                 |
//! | `[[f32; 2]]`     | 2        | 8                 |
//!
//! Byte views are zero-copy and keep the host's byte order, which is also
//! the layout of the raw sample files.

pub mod samples;

pub use samples::{Samples, SamplesMut};

use crate::audio::config::{SampleFormat, StreamConfig};
use crate::error::SampleTypeError;

/// Reject channel counts that have no typed buffer shape
pub fn check_channels(channels: u16) -> Result<(), SampleTypeError> {
    match channels {
        1 | 2 => Ok(()),
        other => Err(SampleTypeError::UnsupportedSampleType(other)),
    }
}

/// Check that a buffer of `channels` float samples fits the stream
pub(crate) fn check_shape(channels: u16, config: &StreamConfig) -> Result<(), SampleTypeError> {
    if config.format != SampleFormat::Float32Ne {
        return Err(SampleTypeError::FormatMismatch(config.format));
    }
    if config.channels != channels {
        return Err(SampleTypeError::ChannelMismatch {
            expected: config.channels,
            actual: channels,
        });
    }
    Ok(())
}
