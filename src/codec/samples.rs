//! Mono and stereo float buffers and their byte views

use std::mem::size_of;

use crate::audio::config::StreamConfig;
use crate::codec::check_shape;
use crate::error::SampleTypeError;

/// Read-only sample buffer handed to a playback stream
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Samples<'a> {
    /// One `f32` per frame
    Mono(&'a [f32]),
    /// Interleaved left/right pairs, one pair per frame
    Stereo(&'a [[f32; 2]]),
}

impl<'a> Samples<'a> {
    /// View a flat interleaved buffer as the shape for `channels`
    pub fn interleaved(data: &'a [f32], channels: u16) -> Result<Self, SampleTypeError> {
        match channels {
            1 => Ok(Samples::Mono(data)),
            2 => {
                if data.len() % 2 != 0 {
                    return Err(SampleTypeError::IncompleteFrame {
                        len: data.len(),
                        channels,
                    });
                }
                Ok(Samples::Stereo(bytemuck::cast_slice(data)))
            }
            other => Err(SampleTypeError::UnsupportedSampleType(other)),
        }
    }

    /// Channel count this shape requires
    pub fn channels(&self) -> u16 {
        match self {
            Samples::Mono(_) => 1,
            Samples::Stereo(_) => 2,
        }
    }

    pub fn frames(&self) -> usize {
        match self {
            Samples::Mono(s) => s.len(),
            Samples::Stereo(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    pub fn byte_len(&self) -> usize {
        match self {
            Samples::Mono(s) => s.len() * size_of::<f32>(),
            Samples::Stereo(s) => s.len() * size_of::<[f32; 2]>(),
        }
    }

    /// Native-endian bytes of the buffer, without copying
    pub fn as_bytes(&self) -> &'a [u8] {
        match *self {
            Samples::Mono(s) => bytemuck::cast_slice(s),
            Samples::Stereo(s) => bytemuck::cast_slice(s),
        }
    }

    /// Check format and channel count against a stream configuration
    pub fn check(&self, config: &StreamConfig) -> Result<(), SampleTypeError> {
        check_shape(self.channels(), config)
    }
}

impl<'a> From<&'a [f32]> for Samples<'a> {
    fn from(samples: &'a [f32]) -> Self {
        Samples::Mono(samples)
    }
}

impl<'a> From<&'a Vec<f32>> for Samples<'a> {
    fn from(samples: &'a Vec<f32>) -> Self {
        Samples::Mono(samples)
    }
}

impl<'a> From<&'a [[f32; 2]]> for Samples<'a> {
    fn from(samples: &'a [[f32; 2]]) -> Self {
        Samples::Stereo(samples)
    }
}

impl<'a> From<&'a Vec<[f32; 2]>> for Samples<'a> {
    fn from(samples: &'a Vec<[f32; 2]>) -> Self {
        Samples::Stereo(samples)
    }
}

/// Writable sample buffer filled by a capture stream
#[derive(Debug, PartialEq)]
pub enum SamplesMut<'a> {
    Mono(&'a mut [f32]),
    Stereo(&'a mut [[f32; 2]]),
}

impl<'a> SamplesMut<'a> {
    /// View a flat interleaved buffer as the shape for `channels`
    pub fn interleaved(data: &'a mut [f32], channels: u16) -> Result<Self, SampleTypeError> {
        match channels {
            1 => Ok(SamplesMut::Mono(data)),
            2 => {
                if data.len() % 2 != 0 {
                    return Err(SampleTypeError::IncompleteFrame {
                        len: data.len(),
                        channels,
                    });
                }
                Ok(SamplesMut::Stereo(bytemuck::cast_slice_mut(data)))
            }
            other => Err(SampleTypeError::UnsupportedSampleType(other)),
        }
    }

    pub fn channels(&self) -> u16 {
        match self {
            SamplesMut::Mono(_) => 1,
            SamplesMut::Stereo(_) => 2,
        }
    }

    pub fn frames(&self) -> usize {
        match self {
            SamplesMut::Mono(s) => s.len(),
            SamplesMut::Stereo(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    pub fn byte_len(&self) -> usize {
        match self {
            SamplesMut::Mono(s) => s.len() * size_of::<f32>(),
            SamplesMut::Stereo(s) => s.len() * size_of::<[f32; 2]>(),
        }
    }

    /// Writable native-endian bytes of the buffer, without copying
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        match self {
            SamplesMut::Mono(s) => bytemuck::cast_slice_mut(&mut **s),
            SamplesMut::Stereo(s) => bytemuck::cast_slice_mut(&mut **s),
        }
    }

    pub fn check(&self, config: &StreamConfig) -> Result<(), SampleTypeError> {
        check_shape(self.channels(), config)
    }
}

impl<'a> From<&'a mut [f32]> for SamplesMut<'a> {
    fn from(samples: &'a mut [f32]) -> Self {
        SamplesMut::Mono(samples)
    }
}

impl<'a> From<&'a mut Vec<f32>> for SamplesMut<'a> {
    fn from(samples: &'a mut Vec<f32>) -> Self {
        SamplesMut::Mono(samples)
    }
}

impl<'a> From<&'a mut [[f32; 2]]> for SamplesMut<'a> {
    fn from(samples: &'a mut [[f32; 2]]) -> Self {
        SamplesMut::Stereo(samples)
    }
}

impl<'a> From<&'a mut Vec<[f32; 2]>> for SamplesMut<'a> {
    fn from(samples: &'a mut Vec<[f32; 2]>) -> Self {
        SamplesMut::Stereo(samples)
    }
}
