use tracing::trace;

use crate::bits::BitReader;
use crate::error::{ZgfxError, ZgfxResult};
use crate::framing::Segment;
use crate::history::HistoryBuffer;
use crate::tokens::{read_match_length, read_token, DecodedToken};

/// Fixed-capacity scratch space receiving the output of one segment.
struct SegmentOutput {
    bytes: Box<[u8]>,
    len: usize,
}

impl SegmentOutput {
    fn new(capacity: usize) -> Self {
        Self {
            bytes: vec![0; capacity].into_boxed_slice(),
            len: 0,
        }
    }

    fn clear(&mut self) {
        self.len = 0;
    }

    fn available(&self) -> usize {
        self.bytes.len() - self.len
    }

    fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Hands out the next `count` bytes of the buffer, already counted as written.
    fn claim(&mut self, count: usize) -> ZgfxResult<&mut [u8]> {
        if count > self.available() {
            return Err(ZgfxError::OutputOverflow {
                requested: count,
                available: self.available(),
            });
        }

        let start = self.len;
        self.len += count;

        Ok(&mut self.bytes[start..self.len])
    }
}

/// Decodes segments against a history window that survives between calls.
pub(crate) struct SegmentDecoder {
    history: HistoryBuffer,
    output: SegmentOutput,
}

impl SegmentDecoder {
    pub(crate) fn new(history_size: usize, output_capacity: usize) -> Self {
        Self {
            history: HistoryBuffer::new(history_size),
            output: SegmentOutput::new(output_capacity),
        }
    }

    pub(crate) fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub(crate) fn reset(&mut self) {
        self.history.rewind();
        self.output.clear();
    }

    /// Decodes one segment; the returned bytes stay valid until the next call.
    pub(crate) fn decode(&mut self, segment: &Segment<'_>) -> ZgfxResult<&[u8]> {
        self.output.clear();

        if segment.is_compressed() {
            self.decode_compressed(segment.payload)?;
        } else {
            self.output.claim(segment.payload.len())?.copy_from_slice(segment.payload);
            self.history.write(segment.payload);
        }

        trace!(
            compressed = segment.is_compressed(),
            payload_len = segment.payload.len(),
            output_len = self.output.len,
            "Decoded ZGFX segment"
        );

        Ok(self.output.as_slice())
    }

    fn decode_compressed(&mut self, payload: &[u8]) -> ZgfxResult<()> {
        // The last byte tells how many bits of the byte before it are padding.
        let Some((&padding, encoded)) = payload.split_last() else {
            return Err(ZgfxError::SegmentTooShort { size: 1 });
        };

        let payload_bits = encoded.len() * 8;
        let bit_budget = payload_bits
            .checked_sub(usize::from(padding))
            .ok_or(ZgfxError::InvalidPadding { padding, payload_bits })?;

        let mut bits = BitReader::new(encoded, bit_budget);

        while !bits.is_exhausted() {
            match read_token(&mut bits)? {
                DecodedToken::Literal(value) => {
                    self.output.claim(1)?[0] = value;
                    self.history.push(value);
                }
                DecodedToken::Match { distance: 0 } => {
                    let count = usize::try_from(bits.read_bits(15)?).map_err(|_| ZgfxError::TokenNotFound)?;

                    let dst = self.output.claim(count)?;
                    dst.copy_from_slice(bits.read_aligned_bytes(count)?);
                    self.history.write(dst);
                }
                DecodedToken::Match { distance } => {
                    let count = read_match_length(&mut bits, self.output.available())?;

                    let dst = self.output.claim(count)?;
                    self.history.read_with_offset(distance, dst)?;
                    self.history.write(dst);
                }
            }
        }

        Ok(())
    }
}
