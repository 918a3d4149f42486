//! MSB-first bit reader over one compressed segment.
//!
//! The reader refills an accumulator one byte at a time and charges every bit it
//! hands out against the segment's bit budget (payload bits minus the trailing
//! padding). Running past the budget is an error, and bytes past the end of the
//! payload read as zero without ever being indexed.

use crate::error::{ZgfxError, ZgfxResult};

/// Widest value a single read may return.
pub(crate) const MAX_READ_BITS: usize = 32;

pub(crate) struct BitReader<'a> {
    input: &'a [u8],
    /// Index of the next byte to load into the accumulator.
    position: usize,
    /// Buffered bits, right-aligned. Never holds more than `MAX_READ_BITS + 7` bits.
    accumulator: u64,
    accumulated_bits: usize,
    remaining_bits: usize,
}

impl<'a> BitReader<'a> {
    pub(crate) fn new(input: &'a [u8], bit_budget: usize) -> Self {
        Self {
            input,
            position: 0,
            accumulator: 0,
            accumulated_bits: 0,
            remaining_bits: bit_budget,
        }
    }

    pub(crate) fn is_exhausted(&self) -> bool {
        self.remaining_bits == 0
    }

    pub(crate) fn read_bit(&mut self) -> ZgfxResult<bool> {
        Ok(self.read_bits(1)? == 1)
    }

    /// Reads `count` bits, most significant first, and returns them right-aligned.
    ///
    /// Reading zero bits is a no-op returning zero.
    #[expect(
        clippy::as_conversions,
        clippy::cast_possible_truncation,
        reason = "at most MAX_READ_BITS bits remain after masking"
    )]
    pub(crate) fn read_bits(&mut self, count: usize) -> ZgfxResult<u32> {
        debug_assert!(count <= MAX_READ_BITS, "cannot read {count} bits at once");

        if count == 0 {
            return Ok(0);
        }

        if count > self.remaining_bits || count > MAX_READ_BITS {
            return Err(ZgfxError::BitBudgetExhausted {
                requested: count,
                remaining: self.remaining_bits,
            });
        }

        while self.accumulated_bits < count {
            let next = self.input.get(self.position).copied().unwrap_or(0);
            self.position = (self.position + 1).min(self.input.len());
            self.accumulator = (self.accumulator << 8) | u64::from(next);
            self.accumulated_bits += 8;
        }

        self.remaining_bits -= count;
        self.accumulated_bits -= count;

        let value = self.accumulator >> self.accumulated_bits;
        self.accumulator &= (1u64 << self.accumulated_bits) - 1;

        Ok(value as u32)
    }

    /// Drops the partially consumed byte and takes `count` whole bytes straight from the input.
    ///
    /// The dropped bits still count against the bit budget.
    pub(crate) fn read_aligned_bytes(&mut self, count: usize) -> ZgfxResult<&'a [u8]> {
        self.remaining_bits = self.remaining_bits.saturating_sub(self.accumulated_bits);
        self.accumulator = 0;
        self.accumulated_bits = 0;

        let available = self.input.len() - self.position;

        if count > self.remaining_bits / 8 || count > available {
            return Err(ZgfxError::UnencodedRunOverrun {
                count,
                available: available.min(self.remaining_bits / 8),
            });
        }

        let bytes = &self.input[self.position..self.position + count];
        self.position += count;
        self.remaining_bits -= count * 8;

        Ok(bytes)
    }
}
