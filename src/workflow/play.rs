//! Play-from-file loop

use std::io::{self, Read};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::audio::{AudioServer, PlaybackStream, ValidatedConfig};
use crate::codec::{check_channels, Samples};
use crate::error::Result;
use crate::workflow::chunk_frames;

/// What a finished playback consumed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaySummary {
    pub chunks: usize,
    pub frames: u64,
    /// Trailing bytes at end of input too short to form a frame
    pub dropped_bytes: usize,
    pub played: Duration,
}

/// Read as much of `buf` as the source has, stopping early only at end of data
fn fill_chunk<R: Read>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Play raw native-endian float samples from `source` until it runs out
pub fn run_play<S, R>(server: &S, config: ValidatedConfig, source: &mut R) -> Result<PlaySummary>
where
    S: AudioServer,
    R: Read,
{
    let channels = config.channels();
    check_channels(channels)?;
    let frames = chunk_frames(config.rate());
    let mut playback = PlaybackStream::open(server, config)?;
    let frame_bytes = playback.frame_bytes();

    let mut chunk = vec![0.0f32; frames * channels as usize];
    let chunk_bytes = chunk.len() * std::mem::size_of::<f32>();
    let mut summary = PlaySummary {
        chunks: 0,
        frames: 0,
        dropped_bytes: 0,
        played: Duration::ZERO,
    };

    info!("Playing");
    loop {
        let filled = fill_chunk(source, bytemuck::cast_slice_mut(&mut chunk[..]))?;
        if filled == 0 {
            break;
        }

        let whole = filled - filled % frame_bytes;
        if whole < filled {
            summary.dropped_bytes = filled - whole;
            warn!(
                dropped = summary.dropped_bytes,
                "Input ends inside a frame, dropping trailing bytes"
            );
        }

        if whole > 0 {
            let samples = whole / std::mem::size_of::<f32>();
            playback.write(Samples::interleaved(&chunk[..samples], channels)?)?;
            summary.chunks += 1;
            debug!(chunk = summary.chunks, "Wrote chunk");
        }

        if filled < chunk_bytes {
            break;
        }
    }

    playback.drain()?;
    summary.frames = playback.frames_written();
    summary.played = playback.stream_time();
    playback.close();

    info!(chunks = summary.chunks, played = ?summary.played, "Done!");
    Ok(summary)
}
