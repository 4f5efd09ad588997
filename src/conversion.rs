//! Sensor reading conversion (IPMI 2.0, section 36.3) and linearisation.

use crate::error::{Error, Result};
use crate::hex::{parse_hex, signed_int, ten_bit_str};

/// Linearised readings are truncated to this many fractional steps.
const SENSOR_READING_SCALE: f64 = 1000.0;

/// Linearisation formula selected by the `L` field of a full sensor record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LinearisationMethod {
    /// `y = x`.
    Linear = 0x00,
    /// `y = ln(x)`.
    Ln = 0x01,
    /// `y = log10(x)`.
    Log10 = 0x02,
    /// `y = log2(x)`.
    Log2 = 0x03,
    /// `y = e^x`.
    Euler = 0x04,
    /// `y = 10^x`.
    Exp10 = 0x05,
    /// `y = 2^x`.
    Exp2 = 0x06,
    /// `y = 1/x`.
    OneDivX = 0x07,
    /// `y = x^2`.
    Sqr = 0x08,
    /// `y = x^3`.
    Cube = 0x09,
    /// `y = 1/x^3`.
    OneDivCube = 0x0A,
}

impl LinearisationMethod {
    /// Raw wire code.
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for LinearisationMethod {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        Ok(match code {
            0x00 => Self::Linear,
            0x01 => Self::Ln,
            0x02 => Self::Log10,
            0x03 => Self::Log2,
            0x04 => Self::Euler,
            0x05 => Self::Exp10,
            0x06 => Self::Exp2,
            0x07 => Self::OneDivX,
            0x08 => Self::Sqr,
            0x09 => Self::Cube,
            0x0A => Self::OneDivCube,
            other => {
                return Err(Error::UnknownCode {
                    kind: "linearisation",
                    code: i64::from(other),
                });
            }
        })
    }
}

/// Apply the pre-linearisation reading formula `(M * x + B * 10^kb) * 10^km`.
///
/// `m` and `b` are the packed two-byte SDR fields (10-bit, two's complement),
/// `rb` carries the result exponent `km` in its high nibble and the offset
/// exponent `kb` in its low nibble (4-bit, two's complement each).
pub fn reading_conversion(data: &str, m: &str, b: &str, rb: &str) -> Result<f64> {
    let rb_raw = parse_hex(rb)?;

    let m_data = signed_int(ten_bit_str(m)?, 10);
    let b_data = signed_int(ten_bit_str(b)?, 10);
    let km_data = signed_int(rb_raw >> 4, 4);
    let kb_data = signed_int(rb_raw & 0x0F, 4);

    let raw = parse_hex(data)?;

    // Products of register-sized values are exact in f64; wide fields must not overflow.
    let offset = b_data as f64 * 10f64.powf(kb_data as f64);
    Ok((m_data as f64 * raw as f64 + offset) * 10f64.powf(km_data as f64))
}

/// Apply the linearisation formula selected by `method` to a converted reading.
///
/// Only [`LinearisationMethod::Linear`] is supported; it truncates the reading
/// toward zero to three decimal places. Every other formula fails with
/// [`Error::UnimplementedFormula`].
pub fn perform_linearisation(method: &str, reading: f64) -> Result<f64> {
    let code = parse_hex(method)?;
    let code = u8::try_from(code).map_err(|_| Error::OutOfRange(method.to_owned()))?;

    match LinearisationMethod::try_from(code) {
        Ok(LinearisationMethod::Linear) => {
            Ok((reading * SENSOR_READING_SCALE).trunc() / SENSOR_READING_SCALE)
        }
        _ => Err(Error::UnimplementedFormula(code)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reading_conversion_vectors() {
        let cases: [(&str, f64); 6] = [
            ("84", 13.200000000000001),
            ("83", 13.1),
            ("7f", 12.700000000000001),
            ("6a", 10.6),
            ("65", 10.1),
            ("64", 10.0),
        ];
        for (data, expected) in cases {
            let value = reading_conversion(data, "6400", "0000", "d0").expect("convert");
            assert_eq!(value.to_bits(), expected.to_bits(), "data {data}");
        }
    }

    #[test]
    fn reading_conversion_applies_offset_exponent() {
        // M = 1, B = 2, km = 0, kb = 1 -> x + 20
        let value = reading_conversion("05", "0100", "0200", "01").expect("convert");
        assert_eq!(value, 25.0);
    }

    #[test]
    fn reading_conversion_accepts_signed_data() {
        // M = 1, km = -1: 0x81 read as 8-bit signed is -127.
        let value = reading_conversion("-0x7f", "0100", "0000", "f0").expect("convert");
        assert!((value + 12.7).abs() < 1e-9);
    }

    #[test]
    fn reading_conversion_handles_wide_fields() {
        let value = reading_conversion("7fffffffffffffff", "6400", "0000", "d0").expect("convert");
        assert!(value.is_finite());
        assert!((value / 9.223_372_036_854_776e15 - 1.0).abs() < 1e-12);

        let value = reading_conversion("-7fffffffffffffff", "6400", "0000", "d0").expect("convert");
        assert!(value.is_finite() && value < 0.0);
    }

    #[test]
    fn linear_truncates_to_three_places() {
        let cases = [
            (5.0000001, 5.0),
            (5.0, 5.0),
            (5.7, 5.7),
            (5.6000000000000005, 5.6),
            (13.200000000000001, 13.2),
            (13.1, 13.1),
            (12.700000000000001, 12.7),
            (0.0, 0.0),
        ];
        for (reading, expected) in cases {
            let value = perform_linearisation("0", reading).expect("linearise");
            assert_eq!(value, expected, "reading {reading}");
        }
    }

    #[test]
    fn linear_truncates_toward_zero() {
        assert_eq!(perform_linearisation("00", -1.23456).expect("linearise"), -1.234);
    }

    #[test]
    fn other_formulas_are_rejected() {
        assert!(matches!(
            perform_linearisation("02", 2.0),
            Err(Error::UnimplementedFormula(0x02))
        ));
        assert!(matches!(
            perform_linearisation("7f", 2.0),
            Err(Error::UnimplementedFormula(0x7F))
        ));
        assert!(matches!(
            perform_linearisation("xyz", 2.0),
            Err(Error::MalformedField(_))
        ));
        assert!(matches!(
            perform_linearisation("100", 2.0),
            Err(Error::OutOfRange(value)) if value == "100"
        ));
    }

    #[test]
    fn linearisation_codes_round_trip() {
        for code in 0x00..=0x0A {
            let method = LinearisationMethod::try_from(code).expect("known code");
            assert_eq!(method.as_u8(), code);
        }
        assert!(LinearisationMethod::try_from(0x0B).is_err());
    }
}
