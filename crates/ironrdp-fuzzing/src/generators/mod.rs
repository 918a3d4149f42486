//! Test case generators.
//!
//! Test case generators take raw, unstructured input from a fuzzer
//! (e.g. libFuzzer) and translate that into a structured test case (e.g. a
//! well-framed ZGFX envelope).
//!
//! These are generally implementations of the `Arbitrary` trait, or some
//! wrapper over an external tool, such that the wrapper implements the
//! `Arbitrary` trait for the wrapped external tool.

use arbitrary::Arbitrary;
use ironrdp_zgfx::{ZGFX_SEGMENTED_MULTIPART, ZGFX_SEGMENTED_SINGLE};

/// Raw segment bytes, header included.
#[derive(Arbitrary, Debug)]
pub struct SegmentInput<'a> {
    pub compressed: bool,
    pub payload: &'a [u8],
}

impl SegmentInput<'_> {
    fn header(&self) -> u8 {
        if self.compressed {
            0x24
        } else {
            0x04
        }
    }
}

/// An envelope whose framing is valid, leaving the segment contents to the fuzzer.
///
/// Exercising the segment decoder directly would otherwise require the fuzzer to
/// discover the descriptor and size fields first.
#[derive(Arbitrary, Debug)]
pub struct EnvelopeInput<'a> {
    pub multipart: bool,
    /// Added to the sum of segment sizes to get the declared uncompressed size.
    pub size_skew: i8,
    pub segments: Vec<SegmentInput<'a>>,
}

impl EnvelopeInput<'_> {
    pub fn to_wire(&self) -> Vec<u8> {
        let mut wire = Vec::new();

        match self.segments.as_slice() {
            [single] if !self.multipart => {
                wire.push(ZGFX_SEGMENTED_SINGLE);
                wire.push(single.header());
                wire.extend_from_slice(single.payload);
            }
            segments => {
                let count = u16::try_from(segments.len()).unwrap_or(u16::MAX);
                let total: usize = segments.iter().map(|segment| segment.payload.len()).sum();
                let declared = i64::try_from(total)
                    .unwrap_or(i64::MAX)
                    .saturating_add(i64::from(self.size_skew));
                let declared = u32::try_from(declared.max(0)).unwrap_or(u32::MAX);

                wire.push(ZGFX_SEGMENTED_MULTIPART);
                wire.extend_from_slice(&count.to_le_bytes());
                wire.extend_from_slice(&declared.to_le_bytes());

                for segment in segments.iter().take(usize::from(count)) {
                    let size = u32::try_from(segment.payload.len() + 1).unwrap_or(u32::MAX);
                    wire.extend_from_slice(&size.to_le_bytes());
                    wire.push(segment.header());
                    wire.extend_from_slice(segment.payload);
                }
            }
        }

        wire
    }
}

/// Transfers decoded one after another by the same context.
#[derive(Arbitrary, Debug)]
pub struct TransferSequence<'a> {
    pub transfers: Vec<EnvelopeInput<'a>>,
    /// Index of the transfer before which the context is reset, if any.
    pub reset_before: Option<u8>,
}
