//! Segmented data envelope ([MS-RDPEGFX] 2.2.1.1).
//!
//! ```text
//! RDP_SEGMENTED_DATA
//!   descriptor (1 byte): 0xE0 (single) | 0xE1 (multipart)
//!   single:    RDP8_BULK_ENCODED_DATA filling the rest of the buffer
//!   multipart: segmentCount (2 bytes LE)
//!              uncompressedSize (4 bytes LE)
//!              segmentCount x { size (4 bytes LE), RDP8_BULK_ENCODED_DATA (size bytes) }
//!
//! RDP8_BULK_ENCODED_DATA
//!   header (1 byte): compression type (low nibble) | flags (high nibble)
//!   data
//! ```
//!
//! [MS-RDPEGFX] 2.2.1.1: https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-rdpegfx/

use bit_field::BitField as _;
use bitflags::bitflags;
use ironrdp_core::{ReadCursor, WriteCursor};
use tracing::trace;

use crate::error::{ZgfxError, ZgfxResult};

/// Descriptor of an envelope holding exactly one segment.
pub const ZGFX_SEGMENTED_SINGLE: u8 = 0xE0;

/// Descriptor of an envelope holding a counted list of sized segments.
pub const ZGFX_SEGMENTED_MULTIPART: u8 = 0xE1;

/// Largest segment payload an encoder emits.
pub const MAX_SEGMENT_PAYLOAD: usize = 65_535;

const MULTIPART_HEADER_SIZE: usize = 1 /* descriptor */ + 2 /* segmentCount */ + 4 /* uncompressedSize */;
const SEGMENT_SIZE_FIELD_SIZE: usize = 4;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum CompressionType {
    Rdp8 = 0x04,
}

impl TryFrom<u8> for CompressionType {
    type Error = ZgfxError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x04 => Ok(Self::Rdp8),
            _ => Err(ZgfxError::InvalidCompressionType(value)),
        }
    }
}

impl From<CompressionType> for u8 {
    #[expect(clippy::as_conversions, reason = "fieldless repr(u8) enum")]
    fn from(value: CompressionType) -> Self {
        value as u8
    }
}

bitflags! {
    /// Flags carried in the high nibble of a segment header.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SegmentFlags: u8 {
        const COMPRESSED = 0x2;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentHeader {
    pub compression_type: CompressionType,
    pub flags: SegmentFlags,
}

impl SegmentHeader {
    /// Header of a segment whose payload is the data itself.
    pub const STORED: Self = Self {
        compression_type: CompressionType::Rdp8,
        flags: SegmentFlags::empty(),
    };

    pub fn from_u8(value: u8) -> ZgfxResult<Self> {
        Ok(Self {
            compression_type: CompressionType::try_from(value.get_bits(..4))?,
            flags: SegmentFlags::from_bits_truncate(value.get_bits(4..)),
        })
    }

    pub fn to_u8(self) -> u8 {
        let mut value = 0u8;
        value.set_bits(..4, u8::from(self.compression_type));
        value.set_bits(4.., self.flags.bits());
        value
    }
}

/// One RDP8_BULK_ENCODED_DATA record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    pub header: SegmentHeader,
    pub payload: &'a [u8],
}

impl<'a> Segment<'a> {
    /// Header byte plus at least one payload byte.
    pub const MIN_SIZE: usize = 2;

    pub fn decode(bytes: &'a [u8]) -> ZgfxResult<Self> {
        let Some((&header, payload)) = bytes.split_first().filter(|_| bytes.len() >= Self::MIN_SIZE) else {
            return Err(ZgfxError::SegmentTooShort { size: bytes.len() });
        };

        Ok(Self {
            header: SegmentHeader::from_u8(header)?,
            payload,
        })
    }

    pub fn stored(payload: &'a [u8]) -> Self {
        Self {
            header: SegmentHeader::STORED,
            payload,
        }
    }

    pub fn is_compressed(&self) -> bool {
        self.header.flags.contains(SegmentFlags::COMPRESSED)
    }

    pub fn size(&self) -> usize {
        1 /* header */ + self.payload.len()
    }

    pub fn encode(&self, dst: &mut WriteCursor<'_>) -> ZgfxResult<()> {
        ensure_space(dst, self.size())?;

        dst.write_u8(self.header.to_u8());
        dst.write_slice(self.payload);

        Ok(())
    }
}

/// A parsed RDP_SEGMENTED_DATA envelope borrowing from the wire buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentedData<'a> {
    Single(Segment<'a>),
    Multipart {
        uncompressed_size: usize,
        segments: Vec<Segment<'a>>,
    },
}

impl<'a> SegmentedData<'a> {
    pub fn decode(input: &'a [u8]) -> ZgfxResult<Self> {
        let mut src = ReadCursor::new(input);

        let descriptor = src
            .try_read_u8()
            .map_err(ZgfxError::not_enough_bytes("segmented descriptor"))?;

        match descriptor {
            ZGFX_SEGMENTED_SINGLE => Segment::decode(src.remaining()).map(Self::Single),
            ZGFX_SEGMENTED_MULTIPART => {
                let segment_count = usize::from(
                    src.try_read_u16()
                        .map_err(ZgfxError::not_enough_bytes("segment count"))?,
                );
                let uncompressed_size = u32_to_usize(
                    src.try_read_u32()
                        .map_err(ZgfxError::not_enough_bytes("uncompressed size"))?,
                );

                // Every record carries at least its size field.
                let minimum = segment_count * SEGMENT_SIZE_FIELD_SIZE;
                if src.len() < minimum {
                    return Err(ZgfxError::SegmentOutOfBounds {
                        declared: minimum,
                        available: src.len(),
                    });
                }

                let mut segments = Vec::with_capacity(segment_count);
                for _ in 0..segment_count {
                    let size = u32_to_usize(src.try_read_u32().map_err(ZgfxError::not_enough_bytes("segment size"))?);

                    if size > src.len() {
                        return Err(ZgfxError::SegmentOutOfBounds {
                            declared: size,
                            available: src.len(),
                        });
                    }

                    segments.push(Segment::decode(src.read_slice(size))?);
                }

                if !src.is_empty() {
                    trace!(trailing = src.len(), "Ignoring bytes after the last ZGFX segment");
                }

                Ok(Self::Multipart {
                    uncompressed_size,
                    segments,
                })
            }
            _ => Err(ZgfxError::InvalidSegmentedDescriptor(descriptor)),
        }
    }
}

/// Number of bytes a stored envelope of `len` payload bytes occupies on the wire.
///
/// Saturates for lengths that cannot be framed at all.
pub fn compressed_size_hint(len: usize) -> usize {
    if (1..=MAX_SEGMENT_PAYLOAD).contains(&len) {
        1 /* descriptor */ + 1 /* header */ + len
    } else {
        let segment_count = len.div_ceil(MAX_SEGMENT_PAYLOAD);
        segment_count
            .saturating_mul(SEGMENT_SIZE_FIELD_SIZE + 1 /* header */)
            .saturating_add(MULTIPART_HEADER_SIZE)
            .saturating_add(len)
    }
}

pub(crate) fn ensure_space(dst: &WriteCursor<'_>, required: usize) -> ZgfxResult<()> {
    if dst.len() < required {
        return Err(ZgfxError::OutputOverflow {
            requested: required,
            available: dst.len(),
        });
    }

    Ok(())
}

#[expect(clippy::as_conversions, reason = "u32 always fits usize on supported targets")]
fn u32_to_usize(value: u32) -> usize {
    value as usize
}
