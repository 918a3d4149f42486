#![cfg_attr(doc, doc = include_str!("../README.md"))]
#![doc(html_logo_url = "https://cdnweb.devolutions.net/images/projects/devolutions/logos/devolutions-icon-shadow.svg")]
#![forbid(unsafe_code)]
#![warn(clippy::std_instead_of_alloc)]
#![warn(clippy::std_instead_of_core)]

mod bits;
mod encoder;
mod error;
mod framing;
mod history;
mod segment;
mod tokens;

use core::fmt;

use tracing::debug;

pub use self::error::{ZgfxError, ZgfxResult};
pub use self::framing::{
    compressed_size_hint, CompressionType, Segment, SegmentFlags, SegmentHeader, SegmentedData, MAX_SEGMENT_PAYLOAD,
    ZGFX_SEGMENTED_MULTIPART, ZGFX_SEGMENTED_SINGLE,
};
use self::segment::SegmentDecoder;

/// Size of the history window shared by all segments decoded by one context.
pub const HISTORY_SIZE: usize = 2_500_000;

/// Largest number of bytes a single segment may decode to.
pub const SEGMENT_OUTPUT_CAPACITY: usize = 65_536;

/// Direction of the channel a context serves.
///
/// The role is informational: both operations are available whatever the role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Compressor,
    Decompressor,
}

/// ZGFX codec state for one direction of a graphics channel.
///
/// Compressed segments may reference bytes decoded by earlier calls, so a context
/// must live as long as the channel and see every transfer in order.
pub struct ZgfxContext {
    role: Role,
    decoder: SegmentDecoder,
}

impl ZgfxContext {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            decoder: SegmentDecoder::new(HISTORY_SIZE, SEGMENT_OUTPUT_CAPACITY),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Decodes one RDP_SEGMENTED_DATA transfer.
    pub fn decompress(&mut self, input: &[u8]) -> ZgfxResult<Vec<u8>> {
        let mut output = Vec::new();
        self.decompress_into(input, &mut output)?;
        Ok(output)
    }

    /// Decodes one transfer, appending the result to `output`.
    ///
    /// Returns the number of bytes appended. On failure `output` is left as it was.
    pub fn decompress_into(&mut self, input: &[u8], output: &mut Vec<u8>) -> ZgfxResult<usize> {
        let start = output.len();

        let result = self.decode_envelope(input, output);
        if result.is_err() {
            output.truncate(start);
        }

        result
    }

    fn decode_envelope(&mut self, input: &[u8], output: &mut Vec<u8>) -> ZgfxResult<usize> {
        match SegmentedData::decode(input)? {
            SegmentedData::Single(segment) => {
                let decoded = self.decoder.decode(&segment)?;
                output.extend_from_slice(decoded);

                Ok(decoded.len())
            }
            SegmentedData::Multipart {
                uncompressed_size,
                segments,
            } => {
                output.reserve(uncompressed_size.min(segments.len().saturating_mul(SEGMENT_OUTPUT_CAPACITY)));

                let mut total = 0usize;
                for segment in &segments {
                    let decoded = self.decoder.decode(segment)?;
                    total += decoded.len();

                    if total > uncompressed_size {
                        debug!(total, uncompressed_size, "ZGFX segments exceed the declared size");
                        return Err(ZgfxError::InvalidDecompressedSize {
                            decompressed_size: total,
                            uncompressed_size,
                        });
                    }

                    output.extend_from_slice(decoded);
                }

                if total != uncompressed_size {
                    debug!(total, uncompressed_size, "ZGFX segments fall short of the declared size");
                    return Err(ZgfxError::InvalidDecompressedSize {
                        decompressed_size: total,
                        uncompressed_size,
                    });
                }

                Ok(total)
            }
        }
    }

    /// Frames `input` for the wire without entropy coding.
    pub fn compress(&mut self, input: &[u8]) -> ZgfxResult<Vec<u8>> {
        let mut output = Vec::with_capacity(compressed_size_hint(input.len()));
        self.compress_into(input, &mut output)?;
        Ok(output)
    }

    /// Frames `input`, appending the envelope to `output`.
    ///
    /// Returns the number of bytes appended, always `compressed_size_hint(input.len())`.
    /// On failure `output` is left as it was.
    pub fn compress_into(&mut self, input: &[u8], output: &mut Vec<u8>) -> ZgfxResult<usize> {
        let start = output.len();
        encoder::encode_stored(input, output)?;
        Ok(output.len() - start)
    }

    /// Rewinds the history write index.
    ///
    /// The history bytes are kept: a back-reference reaching past the bytes decoded
    /// since the reset reads whatever the window held before.
    pub fn reset(&mut self) {
        debug!(role = ?self.role, "Resetting ZGFX context");
        self.decoder.reset();
    }
}

impl fmt::Debug for ZgfxContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let history = self.decoder.history();

        f.debug_struct("ZgfxContext")
            .field("role", &self.role)
            .field("history_index", &history.write_index())
            .field("history_size", &history.capacity())
            .finish_non_exhaustive()
    }
}
