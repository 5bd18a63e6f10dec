use crate::{
    Result,
    constants::{KEY_LENGTH, MAX_KEY_NUMBER, MAX_UID_LENGTH, MIN_UID_LENGTH},
    error::Error,
    hex,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use subtle::ConstantTimeEq;

/// Card unique identifier (4-10 bytes).
///
/// Carried as raw bytes inside the device and as uppercase hex text on the
/// wire. Serializes to and from that hex text.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CardUid(Vec<u8>);

impl CardUid {
    /// Create a card UID with length validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidCardUid` if the UID is not 4-10 bytes long.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        let len = bytes.len();
        if !(MIN_UID_LENGTH..=MAX_UID_LENGTH).contains(&len) {
            return Err(Error::InvalidCardUid(format!(
                "UID must be {MIN_UID_LENGTH}-{MAX_UID_LENGTH} bytes, got {len}"
            )));
        }
        Ok(CardUid(bytes))
    }

    /// Parse a card UID from hex text.
    ///
    /// # Errors
    /// Returns `Error::Hex` for malformed text and `Error::InvalidCardUid`
    /// for a decoded length outside 4-10 bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use fabreader_core::CardUid;
    ///
    /// let uid = CardUid::from_hex("04a1b2c3").unwrap();
    /// assert_eq!(uid.as_bytes(), &[0x04, 0xa1, 0xb2, 0xc3]);
    /// assert_eq!(uid.to_hex(), "04A1B2C3");
    /// ```
    pub fn from_hex(text: &str) -> Result<Self> {
        let bytes = hex::decode_vec(text.trim())?;
        CardUid::new(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Uppercase hex text, the wire representation.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode_upper(&self.0)
    }
}

impl fmt::Debug for CardUid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "CardUid({})", self.to_hex())
    }
}

impl fmt::Display for CardUid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::str::FromStr for CardUid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        CardUid::from_hex(s)
    }
}

impl Serialize for CardUid {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for CardUid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        CardUid::from_hex(&text).map_err(serde::de::Error::custom)
    }
}

/// Card authentication key (AES-128, 16 bytes).
///
/// # Security
/// Comparison is constant-time and `Debug` never prints the key bytes.
#[derive(Clone, Eq)]
pub struct KeyMaterial([u8; KEY_LENGTH]);

impl KeyMaterial {
    #[must_use]
    pub fn new(bytes: [u8; KEY_LENGTH]) -> Self {
        KeyMaterial(bytes)
    }

    /// Decode key material from hex text.
    ///
    /// The text must be exactly `2 * KEY_LENGTH` hex characters.
    ///
    /// # Errors
    /// Returns `Error::Hex` on length mismatch or invalid digits.
    ///
    /// # Examples
    ///
    /// ```
    /// use fabreader_core::KeyMaterial;
    ///
    /// let key = KeyMaterial::from_hex("000102030405060708090a0b0c0d0e0f").unwrap();
    /// assert_eq!(key.as_bytes()[15], 0x0f);
    ///
    /// assert!(KeyMaterial::from_hex("0001").is_err());
    /// ```
    pub fn from_hex(text: &str) -> Result<Self> {
        Ok(KeyMaterial(hex::decode_array::<KEY_LENGTH>(text)?))
    }

    /// Replace the key in place from hex text.
    ///
    /// On error the current key is left unchanged.
    ///
    /// # Errors
    /// Same conditions as [`KeyMaterial::from_hex`].
    pub fn update_from_hex(&mut self, text: &str) -> Result<()> {
        hex::decode_into(text, &mut self.0)?;
        Ok(())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.0
    }

    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode_upper(&self.0)
    }
}

impl Default for KeyMaterial {
    /// The factory default key of a blank card (all zero).
    fn default() -> Self {
        KeyMaterial([0u8; KEY_LENGTH])
    }
}

impl PartialEq for KeyMaterial {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("KeyMaterial(<redacted>)")
    }
}

impl Serialize for KeyMaterial {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for KeyMaterial {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        KeyMaterial::from_hex(&text).map_err(serde::de::Error::custom)
    }
}

/// Key slot on a card (0-4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct KeyNumber(u8);

impl KeyNumber {
    /// # Errors
    /// Returns `Error::InvalidKeyNumber` for slots above `MAX_KEY_NUMBER`.
    pub fn new(slot: u8) -> Result<Self> {
        if slot > MAX_KEY_NUMBER {
            return Err(Error::InvalidKeyNumber(slot));
        }
        Ok(KeyNumber(slot))
    }

    #[must_use]
    pub fn as_u8(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for KeyNumber {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        KeyNumber::new(value)
    }
}

impl From<KeyNumber> for u8 {
    fn from(value: KeyNumber) -> Self {
        value.0
    }
}

impl fmt::Display for KeyNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity the backend assigns to this reader during registration.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderCredentials {
    pub id: u64,
    pub token: String,
}

impl ReaderCredentials {
    pub fn new(id: u64, token: impl Into<String>) -> Self {
        Self {
            id,
            token: token.into(),
        }
    }
}

impl fmt::Debug for ReaderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ReaderCredentials")
            .field("id", &self.id)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HexError;
    use rstest::rstest;

    #[rstest]
    #[case(4)]
    #[case(7)]
    #[case(10)]
    fn test_card_uid_valid_lengths(#[case] len: usize) {
        let uid = CardUid::new(vec![0xab; len]).unwrap();
        assert_eq!(uid.len(), len);
    }

    #[rstest]
    #[case(0)]
    #[case(3)]
    #[case(11)]
    fn test_card_uid_invalid_lengths(#[case] len: usize) {
        assert!(matches!(
            CardUid::new(vec![0xab; len]),
            Err(Error::InvalidCardUid(_))
        ));
    }

    #[test]
    fn test_card_uid_hex_roundtrip() {
        let uid: CardUid = "04a1b2c3d4e5f6".parse().unwrap();
        assert_eq!(uid.to_hex(), "04A1B2C3D4E5F6");
        assert_eq!(uid.to_string(), "04A1B2C3D4E5F6");
    }

    #[test]
    fn test_card_uid_rejects_bad_hex() {
        assert!(matches!(
            CardUid::from_hex("04a1b2cz"),
            Err(Error::Hex(HexError::InvalidDigit { .. }))
        ));
    }

    #[test]
    fn test_card_uid_serde_as_hex() {
        let uid = CardUid::new(vec![0x01, 0x02, 0x03, 0x04]).unwrap();
        let json = serde_json::to_string(&uid).unwrap();
        assert_eq!(json, "\"01020304\"");
        let back: CardUid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, uid);
    }

    #[test]
    fn test_key_material_from_hex() {
        let key = KeyMaterial::from_hex("ffeeddccbbaa99887766554433221100").unwrap();
        assert_eq!(key.as_bytes()[0], 0xff);
        assert_eq!(key.as_bytes()[15], 0x00);
    }

    #[rstest]
    #[case("")]
    #[case("ffeeddccbbaa9988776655443322110")]
    #[case("ffeeddccbbaa998877665544332211000")]
    #[case("ffeeddccbbaa99887766554433221100ff")]
    fn test_key_material_rejects_wrong_length(#[case] text: &str) {
        assert!(matches!(
            KeyMaterial::from_hex(text),
            Err(Error::Hex(HexError::LengthMismatch { expected: 32, .. }))
        ));
    }

    #[test]
    fn test_key_material_update_keeps_old_key_on_error() {
        let mut key = KeyMaterial::new([0x42; KEY_LENGTH]);
        assert!(key.update_from_hex("00112233").is_err());
        assert_eq!(key, KeyMaterial::new([0x42; KEY_LENGTH]));

        key.update_from_hex("00112233445566778899aabbccddeeff").unwrap();
        assert_eq!(key.as_bytes()[1], 0x11);
    }

    #[test]
    fn test_key_material_debug_is_redacted() {
        let key = KeyMaterial::new([0x42; KEY_LENGTH]);
        let debug = format!("{key:?}");
        assert!(!debug.contains("42"));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn test_key_number_bounds() {
        assert!(KeyNumber::new(0).is_ok());
        assert!(KeyNumber::new(MAX_KEY_NUMBER).is_ok());
        assert!(matches!(
            KeyNumber::new(MAX_KEY_NUMBER + 1),
            Err(Error::InvalidKeyNumber(_))
        ));
    }

    #[test]
    fn test_key_number_deserialize_checks_range() {
        let slot: KeyNumber = serde_json::from_str("2").unwrap();
        assert_eq!(slot.as_u8(), 2);
        assert!(serde_json::from_str::<KeyNumber>("9").is_err());
    }

    #[test]
    fn test_credentials_debug_hides_token() {
        let creds = ReaderCredentials::new(7, "s3cret");
        let debug = format!("{creds:?}");
        assert!(debug.contains('7'));
        assert!(!debug.contains("s3cret"));
    }
}
