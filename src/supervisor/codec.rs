//! Line codec for target process output streams.
//!
//! Wraps [`tokio_util::codec::LinesCodec`] with a maximum line length so a
//! target program emitting an unterminated or absurdly long line cannot
//! make the watcher allocate unbounded memory. Decode-only: the supervisor
//! never writes to the target's stdio.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, LinesCodec, LinesCodecError};

use crate::{AppError, Result};

/// Maximum output line length accepted by the watcher: 64 KiB.
///
/// Inspector lifecycle signals are short single lines; anything beyond
/// this is program output we only need to scan, and a longer line is
/// rejected rather than buffered.
pub const MAX_LINE_BYTES: usize = 65_536;

/// Newline-delimited decoder for process output.
#[derive(Debug)]
pub struct OutputCodec(LinesCodec);

impl OutputCodec {
    /// Create a codec with the default [`MAX_LINE_BYTES`] limit.
    #[must_use]
    pub fn new() -> Self {
        Self(LinesCodec::new_with_max_length(MAX_LINE_BYTES))
    }
}

impl Default for OutputCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for OutputCodec {
    type Item = String;
    type Error = AppError;

    /// Decode the next newline-terminated line from `src`.
    ///
    /// Returns `Ok(None)` while no complete line is buffered yet.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Launch`] when a line exceeds [`MAX_LINE_BYTES`]
    /// and [`AppError::Io`] on underlying I/O failure.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        self.0.decode(src).map_err(map_codec_error)
    }

    /// Decode the final unterminated line when the stream reaches EOF.
    ///
    /// # Errors
    ///
    /// Same conditions as [`OutputCodec::decode`].
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        self.0.decode_eof(src).map_err(map_codec_error)
    }
}

/// Map a [`LinesCodecError`] to an [`AppError`].
fn map_codec_error(err: LinesCodecError) -> AppError {
    match err {
        LinesCodecError::MaxLineLengthExceeded => {
            AppError::Launch(format!("output line too long: exceeded {MAX_LINE_BYTES} bytes"))
        }
        LinesCodecError::Io(io_err) => AppError::Io(io_err.to_string()),
    }
}
