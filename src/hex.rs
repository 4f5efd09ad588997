//! Numeric primitives for the hex-encoded fields of controller responses.

use crate::error::{Error, Result};

/// Parse a hexadecimal field value.
///
/// Accepts an optional `0x`/`0X` prefix, an optional leading `-` (as produced by
/// [`hex_signed_int`]) and surrounding whitespace.
pub fn parse_hex(value: &str) -> Result<i64> {
    let trimmed = value.trim();
    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let digits = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
        .unwrap_or(unsigned);

    // from_str_radix would accept a second sign after the prefix.
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::MalformedField(value.to_owned()));
    }

    // Digits are validated, so the only remaining failure is overflow.
    let magnitude =
        i64::from_str_radix(digits, 16).map_err(|_| Error::OutOfRange(value.to_owned()))?;
    Ok(if negative { -magnitude } else { magnitude })
}

/// Interpret the low `signed_bit` bits of `value` as a signed quantity.
///
/// Bit `signed_bit - 1` is the sign bit. A `signed_bit` of zero disables sign
/// interpretation and returns `value` unchanged, as do widths that do not fit in
/// an `i64`.
pub fn signed_int(value: i64, signed_bit: u32) -> i64 {
    if signed_bit == 0 || signed_bit >= i64::BITS {
        return value;
    }

    let half = 1i64 << (signed_bit - 1);
    let low = value.rem_euclid(half);
    if value.rem_euclid(half << 1) < half {
        low
    } else {
        -1 - (low ^ (half - 1))
    }
}

/// Parse `value` as hex, apply [`signed_int`] and render the result as hex again.
///
/// Negative results render as `-0x..`, which [`parse_hex`] reads back.
pub fn hex_signed_int(value: &str, signed_bit: u32) -> Result<String> {
    let signed = signed_int(parse_hex(value)?, signed_bit);
    Ok(if signed < 0 {
        format!("-{:#x}", signed.unsigned_abs())
    } else {
        format!("{signed:#x}")
    })
}

/// Extract a 10-bit value packed into a two-byte field.
///
/// The low byte carries the eight least significant bits in the upper byte
/// position and the two most significant bits in bits 6..8 (SDR type 01h layout
/// for M and B).
pub fn ten_bit_str(value: &str) -> Result<i64> {
    let raw = parse_hex(value)?;
    Ok(((raw & 0xC0) << 2) + (raw >> 8))
}

/// Slice a field by character positions, clamping to the field length.
pub(crate) fn hex_digits(value: &str, start: usize, end: usize) -> &str {
    let byte_at = |n: usize| {
        value
            .char_indices()
            .nth(n)
            .map(|(i, _)| i)
            .unwrap_or(value.len())
    };
    let from = byte_at(start);
    let to = byte_at(end).max(from);
    &value[from..to]
}
