//! PulseAudio backend using the blocking "simple" API
//!
//! Every connection is one `pa_simple` handle. Reads and writes block until
//! the whole buffer is transferred, so a successful call always reports the
//! full length.

use libpulse_binding as pulse;
use libpulse_simple_binding as psimple;

use pulse::def::BufferAttr;
use pulse::error::PAErr;
use pulse::sample::{Format, Spec};
use pulse::stream::Direction as PaDirection;
use psimple::Simple;

use crate::audio::config::SampleFormat;
use crate::audio::server::{AudioServer, Connection, Direction, OpenParams};
use crate::error::ServerError;

/// PA_ERR_INVALID
const ERR_INVALID: i32 = 3;

/// Sample rate used when only the channel count is being probed
const PROBE_RATE: u32 = 44100;

impl From<PAErr> for ServerError {
    fn from(err: PAErr) -> Self {
        ServerError::new(err.0, format!("{}", err))
    }
}

fn pa_format(format: SampleFormat) -> Format {
    match format {
        SampleFormat::U8 => Format::U8,
        SampleFormat::ALaw => Format::ALaw,
        SampleFormat::ULaw => Format::ULaw,
        SampleFormat::S16Ne => Format::S16NE,
        SampleFormat::S16Re => Format::S16RE,
        SampleFormat::S32Ne => Format::S32NE,
        SampleFormat::S32Re => Format::S32RE,
        SampleFormat::Float32Ne => Format::FLOAT32NE,
        SampleFormat::Float32Re => Format::FLOAT32RE,
    }
}

/// Connection factory for a PulseAudio server
#[derive(Debug, Clone, Default)]
pub struct PulseServer {
    /// Server address, `None` for the default server
    server: Option<String>,
}

impl PulseServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect to a specific server instead of the default one
    pub fn with_server(server: impl Into<String>) -> Self {
        Self {
            server: Some(server.into()),
        }
    }
}

impl AudioServer for PulseServer {
    type Connection = PulseConnection;

    fn channels_valid(&self, channels: u16) -> bool {
        match u8::try_from(channels) {
            Ok(channels) => Spec {
                format: Format::FLOAT32NE,
                channels,
                rate: PROBE_RATE,
            }
            .channels_are_valid(),
            Err(_) => false,
        }
    }

    fn rate_valid(&self, rate: u32) -> bool {
        Spec {
            format: Format::FLOAT32NE,
            channels: 1,
            rate,
        }
        .rate_is_valid()
    }

    fn open(
        &self,
        direction: Direction,
        params: &OpenParams<'_>,
    ) -> Result<PulseConnection, ServerError> {
        let channels = u8::try_from(params.channels).map_err(|_| {
            ServerError::new(ERR_INVALID, format!("Too many channels: {}", params.channels))
        })?;
        let spec = Spec {
            format: pa_format(params.format),
            channels,
            rate: params.rate,
        };

        // u32::MAX leaves a field at the server default
        let attr = params.buffer_max_bytes.map(|maxlength| BufferAttr {
            maxlength,
            tlength: u32::MAX,
            prebuf: u32::MAX,
            minreq: u32::MAX,
            fragsize: u32::MAX,
        });

        let pa_direction = match direction {
            Direction::Capture => PaDirection::Record,
            Direction::Playback => PaDirection::Playback,
        };

        let simple = Simple::new(
            self.server.as_deref(),
            params.app_name,
            pa_direction,
            None,
            params.stream_name,
            &spec,
            None,
            attr.as_ref(),
        )?;

        Ok(PulseConnection { simple })
    }
}

/// One `pa_simple` handle, freed on drop
pub struct PulseConnection {
    simple: Simple,
}

impl Connection for PulseConnection {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ServerError> {
        self.simple.read(buf)?;
        Ok(buf.len())
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize, ServerError> {
        self.simple.write(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), ServerError> {
        self.simple.flush()?;
        Ok(())
    }

    fn drain(&mut self) -> Result<(), ServerError> {
        self.simple.drain()?;
        Ok(())
    }
}
