//! Production encoder backed by the `qrcode` crate.
//!
//! | Step | How |
//! |---|---|
//! | Text → bytes | [`Charset::encode`], `?` for unrepresentable characters |
//! | Plain encode | `QrCode::with_error_correction_level` (smallest version, mixed segments) |
//! | Explicit charset | ECI designator + byte segment via `qrcode::bits::Bits`, version searched upward |
//! | Shift_JIS, all Kanji | one Kanji segment via `Bits::push_kanji_data`, no ECI |
//! | Metadata | [`EncodingMode::classify`] + capacity tables |

use super::backend::{EncodeError, EncodeHints, EncodingMode, Symbol, SymbolEncoder};
use super::capacity::{MAX_VERSION, MIN_VERSION};
use super::charset::Charset;
use crate::types::ErrorCorrectionLevel;
use qrcode::bits::Bits;
use qrcode::types::{QrError, QrResult};
use qrcode::{Color, EcLevel, QrCode, Version};

/// Encoder using the pure-Rust `qrcode` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct QrEncoder;

impl QrEncoder {
    pub fn new() -> Self {
        Self
    }
}

fn ec_level(level: ErrorCorrectionLevel) -> EcLevel {
    match level {
        ErrorCorrectionLevel::L => EcLevel::L,
        ErrorCorrectionLevel::M => EcLevel::M,
        ErrorCorrectionLevel::Q => EcLevel::Q,
        ErrorCorrectionLevel::H => EcLevel::H,
    }
}

/// An ECI header is only written when the caller named a charset that
/// differs from what a reader assumes, and only byte segments need it.
fn eci_charset(hints: &EncodeHints, mode: EncodingMode) -> Option<Charset> {
    hints
        .charset
        .filter(|c| *c != Charset::DEFAULT && mode == EncodingMode::Byte)
}

/// Smallest version whose bit stream takes the segment `push` writes.
fn encode_segment(level: EcLevel, push: impl Fn(&mut Bits) -> QrResult<()>) -> QrResult<QrCode> {
    for version in MIN_VERSION..=MAX_VERSION {
        let mut bits = Bits::new(Version::Normal(i16::from(version)));
        match push(&mut bits).and_then(|()| bits.push_terminator(level)) {
            Ok(()) => return QrCode::with_bits(bits, level),
            Err(QrError::DataTooLong) => continue,
            Err(e) => return Err(e),
        }
    }
    Err(QrError::DataTooLong)
}

impl SymbolEncoder for QrEncoder {
    fn encode(
        &self,
        content: &str,
        level: ErrorCorrectionLevel,
        hints: &EncodeHints,
    ) -> Result<Symbol, EncodeError> {
        let charset = hints.effective_charset();
        let data = charset.encode(content);
        let mode = EncodingMode::classify(content, charset);
        let ec = ec_level(level);

        let code = match (mode, eci_charset(hints, mode)) {
            (EncodingMode::Kanji, _) => encode_segment(ec, |bits| bits.push_kanji_data(&data)),
            (_, Some(charset)) => encode_segment(ec, |bits| {
                bits.push_eci_designator(charset.eci())?;
                bits.push_byte_data(&data)
            }),
            (_, None) => QrCode::with_error_correction_level(data.as_ref(), ec),
        }
        .map_err(|e| match e {
            QrError::DataTooLong => EncodeError::ContentTooLarge {
                bytes: data.len(),
                level,
            },
            other => EncodeError::Failed(other.to_string()),
        })?;

        let version = match code.version() {
            Version::Normal(v) | Version::Micro(v) => u8::try_from(v)
                .map_err(|_| EncodeError::Failed(format!("unexpected version {v}")))?,
        };
        let modules = code.to_colors().into_iter().map(|c| c == Color::Dark).collect();

        Symbol::new(version, level, mode, modules).ok_or_else(|| {
            EncodeError::Failed(format!(
                "encoder produced a {}-wide grid for version {version}",
                code.width()
            ))
        })
    }
}
