//! Helpers shared by the integration tests.

// No need to be as strict as in production libraries
#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::as_conversions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_panics_doc)]

use ironrdp_zgfx::{ZGFX_SEGMENTED_MULTIPART, ZGFX_SEGMENTED_SINGLE};

/// Header byte of an RDP8 segment with the compressed flag set.
pub const COMPRESSED_HEADER: u8 = 0x24;

/// Header byte of an RDP8 segment holding raw bytes.
pub const STORED_HEADER: u8 = 0x04;

/// Distance classes as (prefix length, prefix code, value bits, base distance).
const DISTANCE_CLASSES: [(usize, u32, usize, u32); 14] = [
    (5, 0b10001, 5, 0),
    (5, 0b10010, 7, 32),
    (5, 0b10011, 9, 160),
    (5, 0b10100, 10, 672),
    (5, 0b10101, 12, 1_696),
    (6, 0b101100, 14, 5_792),
    (6, 0b101101, 15, 22_176),
    (7, 0b1011100, 18, 54_944),
    (7, 0b1011101, 20, 317_088),
    (8, 0b10111100, 20, 1_365_664),
    (8, 0b10111101, 21, 2_414_240),
    (9, 0b101111100, 22, 4_511_392),
    (9, 0b101111101, 23, 8_705_696),
    (9, 0b101111110, 24, 17_094_304),
];

/// Builds the token stream of a compressed segment, most significant bit first.
///
/// ```ignore
/// let payload = BitWriter::new().literal(b'A').back_reference(1, 7).finish();
/// ```
#[must_use]
#[derive(Debug, Default, Clone)]
pub struct BitWriter {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Appends the low `count` bits of `value`.
    pub fn bits(mut self, value: u32, count: usize) -> Self {
        for shift in (0..count).rev() {
            if self.bit_len % 8 == 0 {
                self.bytes.push(0);
            }

            let bit = ((value >> shift) & 1) as u8;
            let last = self.bytes.len() - 1;
            self.bytes[last] |= bit << (7 - self.bit_len % 8);
            self.bit_len += 1;
        }

        self
    }

    /// Any byte, through the `0` prefix followed by its eight bits.
    pub fn literal(self, value: u8) -> Self {
        self.bits(0, 1).bits(u32::from(value), 8)
    }

    pub fn literals(self, values: &[u8]) -> Self {
        values.iter().fold(self, |writer, &value| writer.literal(value))
    }

    /// A match token for `distance` followed by the length encoding of `length`.
    pub fn back_reference(self, distance: u32, length: u32) -> Self {
        self.distance(distance).match_length(length)
    }

    pub fn distance(self, distance: u32) -> Self {
        let (prefix_length, prefix_code, value_bits, base) = DISTANCE_CLASSES
            .iter()
            .copied()
            .take_while(|&(_, _, _, base)| base <= distance)
            .last()
            .expect("distance classes start at zero");

        assert!(distance - base < (1 << value_bits), "distance {distance} is out of range");

        self.bits(prefix_code, prefix_length).bits(distance - base, value_bits)
    }

    pub fn match_length(self, length: u32) -> Self {
        assert!(length >= 3, "match lengths start at 3");

        if length == 3 {
            return self.bits(0, 1);
        }

        // [4 << doublings, 8 << doublings) takes doublings + 2 extra bits.
        let doublings = (length / 4).ilog2();
        let base = 4 << doublings;

        let mut writer = self.bits(1, 1);
        for _ in 0..doublings {
            writer = writer.bits(1, 1);
        }

        writer.bits(0, 1).bits(length - base, doublings as usize + 2)
    }

    /// An unencoded run: distance zero, a 15-bit count, then the raw bytes on the next byte boundary.
    pub fn unencoded(self, raw: &[u8]) -> Self {
        let count = u32::try_from(raw.len()).expect("run length fits 15 bits");
        assert!(count < 1 << 15, "run length fits 15 bits");

        let mut writer = self.distance(0).bits(count, 15);
        writer.bit_len = writer.bytes.len() * 8;
        writer.bytes.extend_from_slice(raw);
        writer.bit_len += raw.len() * 8;
        writer
    }

    /// The segment payload: the token stream followed by its padding count.
    pub fn finish(mut self) -> Vec<u8> {
        let padding = (self.bytes.len() * 8 - self.bit_len) as u8;
        self.bytes.push(padding);
        self.bytes
    }
}

/// A single envelope around one segment.
pub fn single_segment(header: u8, payload: &[u8]) -> Vec<u8> {
    let mut wire = vec![ZGFX_SEGMENTED_SINGLE, header];
    wire.extend_from_slice(payload);
    wire
}

/// A multipart envelope around `(header, payload)` segments.
pub fn multipart(uncompressed_size: u32, segments: &[(u8, &[u8])]) -> Vec<u8> {
    let count = u16::try_from(segments.len()).expect("segment count fits u16");

    let mut wire = vec![ZGFX_SEGMENTED_MULTIPART];
    wire.extend_from_slice(&count.to_le_bytes());
    wire.extend_from_slice(&uncompressed_size.to_le_bytes());

    for (header, payload) in segments {
        let size = u32::try_from(payload.len() + 1).expect("segment size fits u32");
        wire.extend_from_slice(&size.to_le_bytes());
        wire.push(*header);
        wire.extend_from_slice(payload);
    }

    wire
}
