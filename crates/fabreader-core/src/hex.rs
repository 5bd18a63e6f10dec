//! Hexadecimal conversion for card identifiers and key material.
//!
//! Card UIDs leave the device as hex text and key material arrives from the
//! backend as hex text. Decoding is strict: the text length must be exactly
//! twice the target buffer length, and the whole text is validated before any
//! byte of the target is written. A failed decode leaves the target untouched.
//!
//! Digits are accepted in either case. Encoding always produces uppercase,
//! which is the form the backend stores card UIDs in.
//!
//! # Examples
//!
//! ```
//! use fabreader_core::hex;
//!
//! let mut key = [0u8; 4];
//! hex::decode_into("DeadBEEF", &mut key).unwrap();
//! assert_eq!(key, [0xde, 0xad, 0xbe, 0xef]);
//! assert_eq!(hex::encode_upper(&key), "DEADBEEF");
//!
//! // Wrong length leaves the buffer as it was
//! assert!(hex::decode_into("dead", &mut key).is_err());
//! assert_eq!(key, [0xde, 0xad, 0xbe, 0xef]);
//! ```

use ::hex::FromHexError;

use crate::error::HexError;

/// Encode bytes as uppercase hex without separators.
pub fn encode_upper(bytes: &[u8]) -> String {
    ::hex::encode_upper(bytes)
}

/// Encode bytes as lowercase hex without separators.
pub fn encode_lower(bytes: &[u8]) -> String {
    ::hex::encode(bytes)
}

/// Decode `text` into `out`, requiring `text.len() == 2 * out.len()`.
///
/// # Errors
///
/// Returns [`HexError::LengthMismatch`] when the length is wrong and
/// [`HexError::InvalidDigit`] when a character is not a hex digit. In both
/// cases `out` is not modified.
pub fn decode_into(text: &str, out: &mut [u8]) -> Result<(), HexError> {
    let expected = out.len() * 2;
    if text.len() != expected {
        return Err(HexError::LengthMismatch {
            expected,
            actual: text.len(),
        });
    }

    // `hex::decode_to_slice` writes as it goes, so decode to scratch first
    let decoded = decode_vec(text)?;
    out.copy_from_slice(&decoded);
    Ok(())
}

/// Decode `text` into a fixed-size array of `N` bytes.
///
/// # Errors
///
/// Same conditions as [`decode_into`].
pub fn decode_array<const N: usize>(text: &str) -> Result<[u8; N], HexError> {
    let mut out = [0u8; N];
    decode_into(text, &mut out)?;
    Ok(out)
}

/// Decode hex text of any even length into a byte vector.
///
/// # Errors
///
/// Returns [`HexError::OddLength`] or [`HexError::InvalidDigit`].
pub fn decode_vec(text: &str) -> Result<Vec<u8>, HexError> {
    ::hex::decode(text).map_err(|e| map_error(e, text))
}

fn map_error(err: FromHexError, text: &str) -> HexError {
    match err {
        FromHexError::InvalidHexCharacter { c, index } => HexError::InvalidDigit { index, found: c },
        FromHexError::OddLength => HexError::OddLength(text.len()),
        FromHexError::InvalidStringLength => HexError::LengthMismatch {
            expected: text.len() + text.len() % 2,
            actual: text.len(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_encode_upper() {
        assert_eq!(encode_upper(&[0x04, 0xab, 0xcd, 0xef]), "04ABCDEF");
        assert_eq!(encode_upper(&[]), "");
    }

    #[test]
    fn test_encode_lower() {
        assert_eq!(encode_lower(&[0x04, 0xab]), "04ab");
    }

    #[rstest]
    #[case("00ff10a0", [0x00, 0xff, 0x10, 0xa0])]
    #[case("00FF10A0", [0x00, 0xff, 0x10, 0xa0])]
    #[case("00Ff10a0", [0x00, 0xff, 0x10, 0xa0])]
    fn test_decode_is_case_insensitive(#[case] text: &str, #[case] expected: [u8; 4]) {
        let mut out = [0u8; 4];
        decode_into(text, &mut out).unwrap();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_most_significant_nibble_first() {
        let out: [u8; 1] = decode_array("A5").unwrap();
        assert_eq!(out[0], 0xa5);
    }

    #[rstest]
    #[case("")]
    #[case("abc")]
    #[case("abcdef")]
    #[case("abcdef0123")]
    fn test_decode_rejects_wrong_length(#[case] text: &str) {
        let mut out = [0x11u8; 4];
        let err = decode_into(text, &mut out).unwrap_err();
        assert_eq!(
            err,
            HexError::LengthMismatch {
                expected: 8,
                actual: text.len()
            }
        );
        assert_eq!(out, [0x11; 4]);
    }

    #[test]
    fn test_decode_rejects_bad_digit_without_partial_write() {
        let mut out = [0x11u8; 4];
        let err = decode_into("0102x304", &mut out).unwrap_err();
        assert_eq!(
            err,
            HexError::InvalidDigit {
                index: 4,
                found: 'x'
            }
        );
        assert_eq!(out, [0x11; 4]);
    }

    #[test]
    fn test_decode_vec_odd_length() {
        assert_eq!(decode_vec("abc").unwrap_err(), HexError::OddLength(3));
    }

    #[test]
    fn test_decode_vec_empty() {
        assert!(decode_vec("").unwrap().is_empty());
    }
}
