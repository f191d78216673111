//! Boundary to the native audio server
//!
//! A server hands out one [`Connection`] per stream. Connections are owned
//! exclusively by a capture or playback stream and release their native
//! handle when dropped.

use std::fmt;

use crate::audio::config::SampleFormat;
use crate::error::ServerError;

/// Direction of a stream connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Read from the default input device
    Capture,
    /// Write to the default output device
    Playback,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Capture => f.write_str("capture"),
            Direction::Playback => f.write_str("playback"),
        }
    }
}

/// Parameters handed to the server when a connection is opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenParams<'a> {
    pub app_name: &'a str,
    pub stream_name: &'a str,
    pub format: SampleFormat,
    pub rate: u32,
    pub channels: u16,
    /// Requested cap on the server-side buffer, `None` for the server default
    pub buffer_max_bytes: Option<u32>,
}

/// An audio server able to validate stream parameters and open connections
pub trait AudioServer {
    type Connection: Connection;

    /// Whether the server accepts this channel count
    fn channels_valid(&self, channels: u16) -> bool;

    /// Whether the server accepts this sample rate
    fn rate_valid(&self, rate: u32) -> bool;

    /// Open a connection in the given direction
    fn open(
        &self,
        direction: Direction,
        params: &OpenParams<'_>,
    ) -> Result<Self::Connection, ServerError>;
}

/// One open server connection
///
/// `read` and `write` may transfer fewer bytes than asked for; returning
/// `Ok(0)` for a non-empty buffer means the connection can make no further
/// progress. The stream types turn this into full-buffer semantics.
pub trait Connection {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ServerError>;

    fn write(&mut self, buf: &[u8]) -> Result<usize, ServerError>;

    /// Discard audio buffered by the server but not yet delivered
    fn flush(&mut self) -> Result<(), ServerError>;

    /// Block until everything written has been played
    fn drain(&mut self) -> Result<(), ServerError>;
}
