//! Encoder trait and the symbol it produces.
//!
//! The [`SymbolEncoder`] trait is the seam between the generator and whatever
//! turns text into a module grid. The production implementation is
//! [`QrEncoder`](super::qr_backend::QrEncoder); tests use the recording
//! `MockEncoder` from this module's tests so generator logic can be exercised
//! without real encoding.

use super::capacity::{self, Capacity};
use super::charset::{self, Charset};
use crate::types::ErrorCorrectionLevel;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("content too large: {bytes} bytes do not fit any version at level {level}")]
    ContentTooLarge {
        bytes: usize,
        level: ErrorCorrectionLevel,
    },
    #[error("encoding failed: {0}")]
    Failed(String),
}

/// Segment mode the content was encoded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingMode {
    Numeric,
    Alphanumeric,
    Byte,
    Kanji,
}

/// Characters allowed in alphanumeric mode besides digits and `A-Z`.
const ALPHANUMERIC_EXTRA: &str = " $%*+-./:";

impl EncodingMode {
    /// Pick the single mode that can carry all of `content` in `charset`.
    ///
    /// Kanji mode needs a Shift_JIS hint and nothing but double-byte
    /// Shift_JIS characters; see [`charset::kanji_bytes`].
    pub fn classify(content: &str, charset: Charset) -> Self {
        if content.is_empty() {
            EncodingMode::Byte
        } else if content.bytes().all(|b| b.is_ascii_digit()) {
            EncodingMode::Numeric
        } else if content.chars().all(|c| {
            c.is_ascii_digit() || c.is_ascii_uppercase() || ALPHANUMERIC_EXTRA.contains(c)
        }) {
            EncodingMode::Alphanumeric
        } else if charset == Charset::ShiftJis && charset::kanji_bytes(content).is_some() {
            EncodingMode::Kanji
        } else {
            EncodingMode::Byte
        }
    }

    /// Numeric and alphanumeric symbols only ever hold ASCII.
    pub fn is_ascii_only(self) -> bool {
        matches!(self, EncodingMode::Numeric | EncodingMode::Alphanumeric)
    }
}

impl fmt::Display for EncodingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EncodingMode::Numeric => "numeric",
            EncodingMode::Alphanumeric => "alphanumeric",
            EncodingMode::Byte => "byte",
            EncodingMode::Kanji => "kanji",
        };
        f.write_str(s)
    }
}

/// Optional knobs for one encode call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeHints {
    /// `None` means the encoder's default, [`Charset::DEFAULT`].
    pub charset: Option<Charset>,
}

impl EncodeHints {
    pub fn effective_charset(&self) -> Charset {
        self.charset.unwrap_or(Charset::DEFAULT)
    }
}

/// An encoded QR symbol: a square module grid plus metadata.
///
/// Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    module_count: u32,
    modules: Vec<bool>,
    version: u8,
    level: ErrorCorrectionLevel,
    mode: EncodingMode,
    capacity: Capacity,
}

impl Symbol {
    /// Build a symbol from a row-major grid of `version`'s side length
    /// (`true` = dark). Returns `None` when the grid size or version is off.
    pub fn new(
        version: u8,
        level: ErrorCorrectionLevel,
        mode: EncodingMode,
        modules: Vec<bool>,
    ) -> Option<Self> {
        let capacity = capacity::capacity(version, level)?;
        let module_count = capacity::module_count(version);
        if modules.len() != (module_count * module_count) as usize {
            return None;
        }
        Some(Self {
            module_count,
            modules,
            version,
            level,
            mode,
            capacity,
        })
    }

    /// Side length of the grid in modules.
    pub fn module_count(&self) -> u32 {
        self.module_count
    }

    /// Whether the module at column `x`, row `y` is dark. Out of range is light.
    pub fn is_dark(&self, x: u32, y: u32) -> bool {
        if x >= self.module_count || y >= self.module_count {
            return false;
        }
        self.modules[(y * self.module_count + x) as usize]
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn error_correction_level(&self) -> ErrorCorrectionLevel {
        self.level
    }

    pub fn mode(&self) -> EncodingMode {
        self.mode
    }

    pub fn total_bytes(&self) -> u32 {
        self.capacity.total_codewords
    }

    pub fn data_bytes(&self) -> u32 {
        self.capacity.data_codewords
    }

    pub fn ec_bytes(&self) -> u32 {
        self.capacity.ec_codewords
    }

    pub fn ec_blocks(&self) -> u32 {
        self.capacity.ec_blocks
    }
}

/// Turns content into a [`Symbol`].
///
/// Implementations must be deterministic: the same content, level and hints
/// always produce the same symbol.
pub trait SymbolEncoder: Send {
    fn encode(
        &self,
        content: &str,
        level: ErrorCorrectionLevel,
        hints: &EncodeHints,
    ) -> Result<Symbol, EncodeError>;
}
