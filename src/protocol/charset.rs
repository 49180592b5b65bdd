//! # Character Table
//!
//! Bidirectional mapping between printable characters and Erika key codes.
//!
//! The table is defined externally as a JSON object of the form
//! `{"a": "2C", "b": "3B", ...}`: every key is exactly one character, every
//! value is a two-digit hex key code. A default table ships with the crate;
//! [`CharacterCodec::from_path`] loads any other one.
//!
//! ASCII-only text is *not* passed through unchanged as with CP437 printers:
//! the typewriter has its own key numbering, so every character goes through
//! the table.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;

use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};

use crate::error::{ErikaError, Result};

/// The character table bundled with the crate.
const DEFAULT_TABLE: &str = include_str!("char_translation.json");

/// Table entries in file order. Unlike a `HashMap`, a repeated key is an
/// error instead of silently replacing the earlier entry.
struct RawTable(Vec<(String, String)>);

impl<'de> Deserialize<'de> for RawTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = RawTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping characters to hex key codes")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<RawTable, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut seen = HashSet::new();
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, String>()? {
                    if !seen.insert(key.clone()) {
                        return Err(de::Error::custom(format!("duplicate key {:?}", key)));
                    }
                    entries.push((key, value));
                }
                Ok(RawTable(entries))
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

/// Character table with lookups in both directions.
///
/// Read-only after construction. The mapping is checked to be a bijection
/// when it is built.
#[derive(Debug, Clone)]
pub struct CharacterCodec {
    to_code: HashMap<char, u8>,
    to_char: HashMap<u8, char>,
    /// Code emitted by [`encode`](Self::encode) for unmapped characters.
    /// `None` means unmapped characters are an error.
    fallback: Option<u8>,
}

impl CharacterCodec {
    /// Build the codec from the bundled table.
    ///
    /// ## Errors
    ///
    /// Fails only if the bundled table is malformed.
    pub fn bundled() -> Result<Self> {
        Self::from_json(DEFAULT_TABLE)
    }

    /// Load a character table from a JSON file.
    ///
    /// ## Errors
    ///
    /// Returns [`ErikaError::Io`] if the file cannot be read and
    /// [`ErikaError::Config`] if its contents are not a valid table.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }

    /// Parse a character table from a JSON string.
    ///
    /// ## Errors
    ///
    /// Returns [`ErikaError::Config`] if the JSON is malformed or repeats a
    /// key, if a key is not a single character, if a value is not a
    /// two-digit hex code, or if two characters share one code.
    pub fn from_json(json: &str) -> Result<Self> {
        let RawTable(raw) = serde_json::from_str(json)
            .map_err(|e| ErikaError::Config(format!("Invalid character table: {}", e)))?;

        let mut entries = Vec::with_capacity(raw.len());
        for (key, value) in &raw {
            let mut chars = key.chars();
            let ch = match (chars.next(), chars.next()) {
                (Some(ch), None) => ch,
                _ => {
                    return Err(ErikaError::Config(format!(
                        "Table key {:?} is not a single character",
                        key
                    )));
                }
            };
            if value.len() != 2 {
                return Err(ErikaError::Config(format!(
                    "Code {:?} for {:?} is not two hex digits",
                    value, ch
                )));
            }
            let code = u8::from_str_radix(value, 16).map_err(|_| {
                ErikaError::Config(format!("Code {:?} for {:?} is not hex", value, ch))
            })?;
            entries.push((ch, code));
        }

        Self::from_pairs(entries)
    }

    /// Build a codec from `(character, code)` pairs.
    ///
    /// ## Errors
    ///
    /// Returns [`ErikaError::Config`] if a character or a code appears twice.
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (char, u8)>,
    {
        let mut to_code = HashMap::new();
        let mut to_char = HashMap::new();

        for (ch, code) in pairs {
            if let Some(other) = to_char.insert(code, ch) {
                return Err(ErikaError::Config(format!(
                    "Code {:02X} is assigned to both {:?} and {:?}",
                    code, other, ch
                )));
            }
            if to_code.insert(ch, code).is_some() {
                return Err(ErikaError::Config(format!(
                    "Character {:?} is assigned twice",
                    ch
                )));
            }
        }

        Ok(Self {
            to_code,
            to_char,
            fallback: None,
        })
    }

    /// Make [`encode`](Self::encode) tolerant: unmapped characters are
    /// replaced by `replacement` instead of failing.
    ///
    /// ## Errors
    ///
    /// Returns [`ErikaError::Encoding`] if `replacement` itself is unmapped.
    pub fn with_fallback(mut self, replacement: char) -> Result<Self> {
        self.fallback = Some(self.strict_encode(replacement)?);
        Ok(self)
    }

    /// Whether unmapped characters are replaced instead of rejected.
    pub fn is_tolerant(&self) -> bool {
        self.fallback.is_some()
    }

    /// Number of characters in the table.
    pub fn len(&self) -> usize {
        self.to_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_code.is_empty()
    }

    /// Whether `ch` has a key code.
    pub fn contains(&self, ch: char) -> bool {
        self.to_code.contains_key(&ch)
    }

    /// Iterate over all mapped characters (unordered).
    pub fn characters(&self) -> impl Iterator<Item = char> + '_ {
        self.to_code.keys().copied()
    }

    /// Encode a character to its key code.
    ///
    /// If the codec was made tolerant with [`with_fallback`](Self::with_fallback),
    /// unmapped characters yield the replacement code.
    ///
    /// ## Errors
    ///
    /// Returns [`ErikaError::Encoding`] for unmapped characters on a strict codec.
    pub fn encode(&self, ch: char) -> Result<u8> {
        match (self.to_code.get(&ch), self.fallback) {
            (Some(&code), _) => Ok(code),
            (None, Some(code)) => {
                tracing::warn!(
                    "unmapped character {:?} (U+{:04X}), using fallback",
                    ch,
                    ch as u32
                );
                Ok(code)
            }
            (None, None) => Err(unmapped_char(ch)),
        }
    }

    /// Encode a character, returning `default` if it is unmapped.
    pub fn try_encode(&self, ch: char, default: u8) -> u8 {
        self.to_code.get(&ch).copied().unwrap_or(default)
    }

    /// Decode a key code to its character.
    ///
    /// ## Errors
    ///
    /// Returns [`ErikaError::Encoding`] for codes outside the table.
    pub fn decode(&self, code: u8) -> Result<char> {
        self.to_char
            .get(&code)
            .copied()
            .ok_or_else(|| ErikaError::Encoding(format!("No character for key code {:02X}", code)))
    }

    /// Decode a key code, returning `default` if it is unmapped.
    pub fn try_decode(&self, code: u8, default: char) -> char {
        self.to_char.get(&code).copied().unwrap_or(default)
    }

    /// Decode a key code as text, falling back to its lowercase hex
    /// representation (e.g. `"a5"`) when unmapped.
    pub fn decode_lossy(&self, code: u8) -> String {
        match self.to_char.get(&code) {
            Some(ch) => ch.to_string(),
            None => format!("{:02x}", code),
        }
    }

    fn strict_encode(&self, ch: char) -> Result<u8> {
        self.to_code.get(&ch).copied().ok_or_else(|| unmapped_char(ch))
    }
}

fn unmapped_char(ch: char) -> ErikaError {
    ErikaError::Encoding(format!(
        "Character {:?} (U+{:04X}) is not in the character table",
        ch, ch as u32
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn codec() -> CharacterCodec {
        CharacterCodec::bundled().unwrap()
    }

    #[test]
    fn test_bundled_table_loads() {
        let codec = codec();
        assert!(!codec.is_empty());
        for ch in "abcdefghijklmnopqrstuvwxyzäöüß!?#'\"/ ".chars() {
            assert!(codec.contains(ch), "missing {:?}", ch);
        }
    }

    #[test]
    fn test_round_trip_whole_table() {
        let codec = codec();
        for ch in codec.characters() {
            assert_eq!(codec.decode(codec.encode(ch).unwrap()).unwrap(), ch);
        }
    }

    #[test]
    fn test_space_and_newline_codes() {
        let codec = codec();
        assert_eq!(codec.encode(' ').unwrap(), 0x71);
        assert_eq!(codec.encode('\n').unwrap(), 0x77);
    }

    #[test]
    fn test_encode_unmapped_fails() {
        let err = codec().encode('\u{263A}').unwrap_err();
        assert!(matches!(err, ErikaError::Encoding(_)));
    }

    #[test]
    fn test_tolerant_codec_substitutes() {
        let codec = codec().with_fallback('?').unwrap();
        assert!(codec.is_tolerant());
        let question = codec.encode('?').unwrap();
        assert_eq!(codec.encode('\u{263A}').unwrap(), question);
    }

    #[test]
    fn test_fallback_must_be_mapped() {
        assert!(codec().with_fallback('\u{263A}').is_err());
    }

    #[test]
    fn test_try_variants_use_default() {
        let codec = codec();
        assert_eq!(codec.try_encode('\u{263A}', 0xEE), 0xEE);
        assert_eq!(codec.try_decode(0xEE, '~'), '~');
        assert_eq!(codec.decode_lossy(0xA5), "a5");
        assert_eq!(codec.decode_lossy(0x71), " ");
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let err = CharacterCodec::from_json(r#"{"a": "10", "b": "10"}"#).unwrap_err();
        assert!(matches!(err, ErikaError::Config(_)));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let err = CharacterCodec::from_json(r#"{"a": "10", "a": "11"}"#).unwrap_err();
        assert!(matches!(err, ErikaError::Config(_)));
        assert!(err.to_string().contains("duplicate key"), "{}", err);
    }

    #[test]
    fn test_malformed_entries_rejected() {
        assert!(CharacterCodec::from_json(r#"{"ab": "10"}"#).is_err());
        assert!(CharacterCodec::from_json(r#"{"a": "1"}"#).is_err());
        assert!(CharacterCodec::from_json(r#"{"a": "ZZ"}"#).is_err());
        assert!(CharacterCodec::from_json("not json").is_err());
    }

    proptest! {
        #[test]
        fn prop_decode_inverts_encode(index in 0usize..107) {
            let codec = codec();
            let mut chars: Vec<char> = codec.characters().collect();
            chars.sort_unstable();
            let ch = chars[index % chars.len()];
            prop_assert_eq!(codec.decode(codec.encode(ch).unwrap()).unwrap(), ch);
        }
    }
}
