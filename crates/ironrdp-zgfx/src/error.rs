use core::fmt;

use ironrdp_core::NotEnoughBytesError;

pub type ZgfxResult<T> = Result<T, ZgfxError>;

/// Failure to decode or frame a ZGFX transfer.
///
/// Every decoding error means the bitstream can no longer be trusted: the owning
/// channel is expected to tear down the connection rather than retry.
#[derive(Debug)]
pub enum ZgfxError {
    /// The outer descriptor is neither single nor multipart.
    InvalidSegmentedDescriptor(u8),
    /// The low nibble of a segment header is not the RDP8 compression type.
    InvalidCompressionType(u8),
    /// A framing field could not be read because the buffer ended early.
    NotEnoughBytes {
        context: &'static str,
        source: NotEnoughBytesError,
    },
    /// A segment must hold at least its header byte and one payload byte.
    SegmentTooShort { size: usize },
    /// A multipart record declares more bytes than the buffer still holds.
    SegmentOutOfBounds { declared: usize, available: usize },
    /// The trailing padding count exceeds the bits of the compressed payload.
    InvalidPadding { padding: u8, payload_bits: usize },
    /// A token needed more bits than the segment has left.
    BitBudgetExhausted { requested: usize, remaining: usize },
    /// The bits at the current position match no prefix code.
    TokenNotFound,
    /// Writing would exceed the per-segment output capacity.
    OutputOverflow { requested: usize, available: usize },
    /// A back-reference points further back than the history window.
    InvalidMatchDistance { distance: usize, history_size: usize },
    /// An unencoded run declares more bytes than the segment carries.
    UnencodedRunOverrun { count: usize, available: usize },
    /// The multipart segments do not add up to the declared uncompressed size.
    InvalidDecompressedSize {
        decompressed_size: usize,
        uncompressed_size: usize,
    },
    /// The input cannot be represented by the multipart header fields.
    InputTooLarge { size: usize },
}

impl ZgfxError {
    pub(crate) fn not_enough_bytes(context: &'static str) -> impl FnOnce(NotEnoughBytesError) -> Self {
        move |source| Self::NotEnoughBytes { context, source }
    }
}

impl fmt::Display for ZgfxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSegmentedDescriptor(value) => write!(f, "invalid segmented descriptor: {value:#04x}"),
            Self::InvalidCompressionType(value) => write!(f, "invalid compression type: {value:#03x}"),
            Self::NotEnoughBytes { context, .. } => write!(f, "not enough bytes to read {context}"),
            Self::SegmentTooShort { size } => write!(f, "segment of {size} bytes is too short"),
            Self::SegmentOutOfBounds { declared, available } => write!(
                f,
                "segment declares {declared} bytes, but only {available} remain in the buffer"
            ),
            Self::InvalidPadding { padding, payload_bits } => write!(
                f,
                "padding of {padding} bits exceeds the {payload_bits} bits of compressed payload"
            ),
            Self::BitBudgetExhausted { requested, remaining } => write!(
                f,
                "bit budget exhausted: requested {requested} bits, but only {remaining} remain in the segment"
            ),
            Self::TokenNotFound => write!(f, "token bits not found"),
            Self::OutputOverflow { requested, available } => write!(
                f,
                "segment output overflow: {requested} bytes requested, but only {available} available"
            ),
            Self::InvalidMatchDistance { distance, history_size } => write!(
                f,
                "match distance {distance} exceeds the history size ({history_size})"
            ),
            Self::UnencodedRunOverrun { count, available } => write!(
                f,
                "unencoded run of {count} bytes overruns the segment ({available} bytes available)"
            ),
            Self::InvalidDecompressedSize {
                decompressed_size,
                uncompressed_size,
            } => write!(
                f,
                "decompressed size of segments ({decompressed_size}) does not equal to uncompressed size ({uncompressed_size})",
            ),
            Self::InputTooLarge { size } => write!(f, "input of {size} bytes is too large for ZGFX framing"),
        }
    }
}

impl core::error::Error for ZgfxError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::NotEnoughBytes { source, .. } => Some(source),
            Self::InvalidSegmentedDescriptor(_)
            | Self::InvalidCompressionType(_)
            | Self::SegmentTooShort { .. }
            | Self::SegmentOutOfBounds { .. }
            | Self::InvalidPadding { .. }
            | Self::BitBudgetExhausted { .. }
            | Self::TokenNotFound
            | Self::OutputOverflow { .. }
            | Self::InvalidMatchDistance { .. }
            | Self::UnencodedRunOverrun { .. }
            | Self::InvalidDecompressedSize { .. }
            | Self::InputTooLarge { .. } => None,
        }
    }
}
