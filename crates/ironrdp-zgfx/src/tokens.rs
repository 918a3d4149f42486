//! Prefix codes of the ZGFX token stream ([MS-RDPEGFX] 3.1.9.1.2).
//!
//! [MS-RDPEGFX] 3.1.9.1.2: https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-rdpegfx/

use crate::bits::{BitReader, MAX_READ_BITS};
use crate::error::{ZgfxError, ZgfxResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Literal,
    Match,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token {
    pub(crate) prefix_length: usize,
    pub(crate) prefix_code: u32,
    pub(crate) value_bits: usize,
    pub(crate) kind: TokenKind,
    pub(crate) value_base: u32,
}

impl Token {
    const fn literal(prefix_length: usize, prefix_code: u32, value_bits: usize, value_base: u32) -> Self {
        Self {
            prefix_length,
            prefix_code,
            value_bits,
            kind: TokenKind::Literal,
            value_base,
        }
    }

    const fn distance(prefix_length: usize, prefix_code: u32, value_bits: usize, value_base: u32) -> Self {
        Self {
            prefix_length,
            prefix_code,
            value_bits,
            kind: TokenKind::Match,
            value_base,
        }
    }
}

/// All prefix codes, shortest first.
///
/// Literal tokens with no value bits stand for a fixed byte (`value_base`). The one-bit
/// `0` prefix is followed by the 8-bit literal itself. Match tokens carry the base
/// distance and the number of bits added to it.
pub(crate) static TOKEN_TABLE: [Token; 40] = [
    Token::literal(1, 0b0, 8, 0),
    Token::distance(5, 0b10001, 5, 0),
    Token::distance(5, 0b10010, 7, 32),
    Token::distance(5, 0b10011, 9, 160),
    Token::distance(5, 0b10100, 10, 672),
    Token::distance(5, 0b10101, 12, 1_696),
    Token::literal(5, 0b11000, 0, 0x00),
    Token::literal(5, 0b11001, 0, 0x01),
    Token::distance(6, 0b101100, 14, 5_792),
    Token::distance(6, 0b101101, 15, 22_176),
    Token::literal(6, 0b110100, 0, 0x02),
    Token::literal(6, 0b110101, 0, 0x03),
    Token::literal(6, 0b110110, 0, 0xFF),
    Token::distance(7, 0b1011100, 18, 54_944),
    Token::distance(7, 0b1011101, 20, 317_088),
    Token::literal(7, 0b1101110, 0, 0x04),
    Token::literal(7, 0b1101111, 0, 0x05),
    Token::literal(7, 0b1110000, 0, 0x06),
    Token::literal(7, 0b1110001, 0, 0x07),
    Token::literal(7, 0b1110010, 0, 0x08),
    Token::literal(7, 0b1110011, 0, 0x09),
    Token::literal(7, 0b1110100, 0, 0x0A),
    Token::literal(7, 0b1110101, 0, 0x0B),
    Token::literal(7, 0b1110110, 0, 0x3A),
    Token::literal(7, 0b1110111, 0, 0x3B),
    Token::literal(7, 0b1111000, 0, 0x3C),
    Token::literal(7, 0b1111001, 0, 0x3D),
    Token::literal(7, 0b1111010, 0, 0x3E),
    Token::literal(7, 0b1111011, 0, 0x3F),
    Token::literal(7, 0b1111100, 0, 0x40),
    Token::literal(7, 0b1111101, 0, 0x80),
    Token::distance(8, 0b10111100, 20, 1_365_664),
    Token::distance(8, 0b10111101, 21, 2_414_240),
    Token::literal(8, 0b11111100, 0, 0x0C),
    Token::literal(8, 0b11111101, 0, 0x38),
    Token::literal(8, 0b11111110, 0, 0x39),
    Token::literal(8, 0b11111111, 0, 0x66),
    Token::distance(9, 0b101111100, 22, 4_511_392),
    Token::distance(9, 0b101111101, 23, 8_705_696),
    Token::distance(9, 0b101111110, 24, 17_094_304),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DecodedToken {
    Literal(u8),
    /// A back-reference. A distance of zero announces an unencoded run.
    Match { distance: usize },
}

/// Decodes the next token by growing the prefix one bit at a time while walking the table.
pub(crate) fn read_token(bits: &mut BitReader<'_>) -> ZgfxResult<DecodedToken> {
    let mut prefix = 0u32;
    let mut prefix_length = 0;

    for token in &TOKEN_TABLE {
        while prefix_length < token.prefix_length {
            prefix = (prefix << 1) | bits.read_bits(1)?;
            prefix_length += 1;
        }

        if prefix != token.prefix_code {
            continue;
        }

        let value = token.value_base + bits.read_bits(token.value_bits)?;

        return match token.kind {
            TokenKind::Literal => u8::try_from(value)
                .map(DecodedToken::Literal)
                .map_err(|_| ZgfxError::TokenNotFound),
            TokenKind::Match => usize::try_from(value)
                .map(|distance| DecodedToken::Match { distance })
                .map_err(|_| ZgfxError::TokenNotFound),
        };
    }

    Err(ZgfxError::TokenNotFound)
}

/// Decodes the length of a back-reference.
///
/// A single `0` bit means 3. Otherwise the count starts at 4 with 2 extra bits and
/// doubles, gaining one extra bit, for each further `1`; a `0` ends the run and the
/// extra bits are added to the count. Counts above `limit` fail as soon as they appear.
pub(crate) fn read_match_length(bits: &mut BitReader<'_>, limit: usize) -> ZgfxResult<usize> {
    if !bits.read_bit()? {
        return Ok(3);
    }

    let mut count = 4usize;
    let mut extra_bits = 2usize;

    while bits.read_bit()? {
        count *= 2;
        extra_bits += 1;

        if count > limit || extra_bits > MAX_READ_BITS {
            return Err(ZgfxError::OutputOverflow {
                requested: count,
                available: limit,
            });
        }
    }

    let extra = usize::try_from(bits.read_bits(extra_bits)?).map_err(|_| ZgfxError::TokenNotFound)?;

    Ok(count + extra)
}
