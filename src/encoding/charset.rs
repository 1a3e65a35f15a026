//! Character sets an encode request can be hinted with.
//!
//! QR byte mode carries raw bytes; the charset decides how text becomes those
//! bytes. A charset that cannot represent a character substitutes `?`, the
//! same replacement a lossy string-to-bytes conversion produces, so
//! [`Charset::can_encode`] is checked before encoding to report whether the
//! symbol will actually carry the user's text.
//!
//! Shift_JIS goes through `encoding_rs`. Text made only of double-byte
//! characters in the QR Kanji ranges can use Kanji mode, 13 bits per
//! character instead of 16; see [`kanji_bytes`].

use encoding_rs::SHIFT_JIS;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Charset {
    #[serde(rename = "US-ASCII")]
    UsAscii,
    #[serde(rename = "ISO-8859-1")]
    Iso8859_1,
    #[serde(rename = "UTF-8")]
    Utf8,
    #[serde(rename = "Shift_JIS")]
    ShiftJis,
}

impl Charset {
    /// What the encoder assumes when no charset hint is given.
    pub const DEFAULT: Charset = Charset::Iso8859_1;

    pub const ALL: [Charset; 4] = [
        Charset::UsAscii,
        Charset::Iso8859_1,
        Charset::Utf8,
        Charset::ShiftJis,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Charset::UsAscii => "US-ASCII",
            Charset::Iso8859_1 => "ISO-8859-1",
            Charset::Utf8 => "UTF-8",
            Charset::ShiftJis => "Shift_JIS",
        }
    }

    /// ECI assignment number announcing this charset inside the symbol.
    pub fn eci(self) -> u32 {
        match self {
            Charset::Iso8859_1 => 3,
            Charset::ShiftJis => 20,
            Charset::Utf8 => 26,
            Charset::UsAscii => 27,
        }
    }

    /// Highest code point a single-byte charset maps one-to-one.
    fn max_code_point(self) -> u32 {
        match self {
            Charset::UsAscii => 0x7F,
            Charset::Iso8859_1 => 0xFF,
            Charset::Utf8 | Charset::ShiftJis => char::MAX as u32,
        }
    }

    /// Whether every character of `text` survives [`Charset::encode`].
    pub fn can_encode(self, text: &str) -> bool {
        match self {
            Charset::ShiftJis => {
                let (_, _, had_errors) = SHIFT_JIS.encode(text);
                !had_errors
            }
            _ => {
                let max = self.max_code_point();
                text.chars().all(|c| c as u32 <= max)
            }
        }
    }

    /// Encode `text`, replacing unrepresentable characters with `?`.
    pub fn encode(self, text: &str) -> Cow<'_, [u8]> {
        match self {
            Charset::Utf8 => Cow::Borrowed(text.as_bytes()),
            Charset::ShiftJis => {
                let (bytes, _, had_errors) = SHIFT_JIS.encode(text);
                if had_errors {
                    // encoding_rs writes numeric character references instead
                    Cow::Owned(text.chars().flat_map(shift_jis_char_lossy).collect())
                } else {
                    bytes
                }
            }
            _ if text.is_ascii() => Cow::Borrowed(text.as_bytes()),
            _ => {
                let max = self.max_code_point();
                Cow::Owned(
                    text.chars()
                        .map(|c| if c as u32 <= max { c as u32 as u8 } else { b'?' })
                        .collect(),
                )
            }
        }
    }
}

fn shift_jis_char_lossy(c: char) -> Vec<u8> {
    let mut buf = [0u8; 4];
    let (bytes, _, had_errors) = SHIFT_JIS.encode(c.encode_utf8(&mut buf));
    if had_errors { vec![b'?'] } else { bytes.into_owned() }
}

/// Double-byte Shift_JIS values QR Kanji mode can carry.
fn is_kanji_pair(lead: u8, trail: u8) -> bool {
    let value = u16::from_be_bytes([lead, trail]);
    matches!(value, 0x8140..=0x9FFC | 0xE040..=0xEBBF)
}

/// The Shift_JIS bytes of `text` when every character is a double-byte
/// Kanji-mode character. `None` for empty text or anything else.
pub fn kanji_bytes(text: &str) -> Option<Vec<u8>> {
    if text.is_empty() {
        return None;
    }
    let (bytes, _, had_errors) = SHIFT_JIS.encode(text);
    let all_pairs = !had_errors
        && bytes.len() == text.chars().count() * 2
        && bytes.chunks_exact(2).all(|pair| is_kanji_pair(pair[0], pair[1]));
    all_pairs.then(|| bytes.into_owned())
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Charset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "usascii" | "ascii" => Ok(Charset::UsAscii),
            "iso88591" | "latin1" => Ok(Charset::Iso8859_1),
            "utf8" => Ok(Charset::Utf8),
            "shiftjis" | "sjis" => Ok(Charset::ShiftJis),
            _ => Err(format!(
                "unsupported charset '{s}' (expected US-ASCII, ISO-8859-1, UTF-8 or Shift_JIS)"
            )),
        }
    }
}
