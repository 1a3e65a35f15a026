//! Value types shared by the sizing policies, the encoder, and the generator.
//!
//! Everything here is immutable and `Copy`: a [`Dimension`] or a [`TriState`]
//! is passed around by value and compared by value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pixel dimensions of a rendered code (or of a requested target).
///
/// Both sides are unsigned, so the `width ≥ 0 ∧ height ≥ 0` invariant is
/// carried by the type. Square is the common case but is not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimension {
    pub width: u32,
    pub height: u32,
}

impl Dimension {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn square(side: u32) -> Self {
        Self::new(side, side)
    }

    pub fn is_square(self) -> bool {
        self.width == self.height
    }

    /// The side used when a square code has to fit inside this dimension.
    pub fn shorter_side(self) -> u32 {
        self.width.min(self.height)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A boolean answer that may not be meaningful yet.
///
/// `NotApplicable` is what every derived flag resets to when there is no
/// content or no computed result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriState {
    True,
    False,
    #[default]
    NotApplicable,
}

impl TriState {
    pub fn is_true(self) -> bool {
        self == TriState::True
    }

    /// `None` when not applicable.
    pub fn as_bool(self) -> Option<bool> {
        match self {
            TriState::True => Some(true),
            TriState::False => Some(false),
            TriState::NotApplicable => None,
        }
    }
}

impl From<bool> for TriState {
    fn from(value: bool) -> Self {
        if value { TriState::True } else { TriState::False }
    }
}

impl fmt::Display for TriState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TriState::True => "yes",
            TriState::False => "no",
            TriState::NotApplicable => "n/a",
        };
        f.write_str(s)
    }
}

/// QR error-correction level, ordered from least to most redundancy.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ErrorCorrectionLevel {
    /// ~7% of codewords recoverable.
    #[default]
    L,
    /// ~15%.
    M,
    /// ~25%.
    Q,
    /// ~30%.
    H,
}

impl ErrorCorrectionLevel {
    pub const ALL: [ErrorCorrectionLevel; 4] = [Self::L, Self::M, Self::Q, Self::H];

    /// Row index into the capacity tables.
    pub(crate) fn ordinal(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ErrorCorrectionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::L => "L",
            Self::M => "M",
            Self::Q => "Q",
            Self::H => "H",
        };
        f.write_str(s)
    }
}

impl FromStr for ErrorCorrectionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" | "LOW" => Ok(Self::L),
            "M" | "MEDIUM" => Ok(Self::M),
            "Q" | "QUARTILE" => Ok(Self::Q),
            "H" | "HIGH" => Ok(Self::H),
            other => Err(format!(
                "unknown error-correction level '{other}' (expected L, M, Q or H)"
            )),
        }
    }
}

/// Which sizing policy turns a symbol into pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SizingMode {
    /// Exact target size; fails when a module would be smaller than a pixel.
    FixedSize,
    /// Largest fit under the target, at least one pixel per module.
    #[default]
    BestFit,
    /// Caller picks the pixels per module directly.
    ModuleSize,
}

impl SizingMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SizingMode::FixedSize => "fixed-size",
            SizingMode::BestFit => "best-fit",
            SizingMode::ModuleSize => "module-size",
        }
    }
}

impl fmt::Display for SizingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed-size" | "fixed" => Ok(SizingMode::FixedSize),
            "best-fit" | "fit" => Ok(SizingMode::BestFit),
            "module-size" | "module" => Ok(SizingMode::ModuleSize),
            other => Err(format!(
                "unknown sizing mode '{other}' (expected fixed-size, best-fit or module-size)"
            )),
        }
    }
}
