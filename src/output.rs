//! CLI output formatting.
//!
//! # Output Format
//!
//! ```text
//! QR code v2 (25x25 modules), byte mode, EC level M
//!     Codewords: 44 total, 28 data, 16 EC in 1 block
//!     Charset: ISO-8859-1 (default)
//!     Size: 250x250 px at 10 px/module (best-fit, requested 256x256)
//!     Content: ascii, encodable
//!     Output: code.png
//! ```
//!
//! A code that overshoots its requested size, or content the charset could
//! not represent, adds a `Warning:` line.
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::encoding::{Charset, EncodingMode, SymbolEncoder};
use crate::events::ChangeEvent;
use crate::generator::Generator;
use crate::types::{Dimension, ErrorCorrectionLevel, SizingMode, TriState};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Everything worth reporting about a generated code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeSummary {
    pub version: u8,
    pub modules: u32,
    pub encoding_mode: EncodingMode,
    pub error_correction: ErrorCorrectionLevel,
    pub charset: Charset,
    /// `false` when the encoder default was used without being named.
    pub charset_explicit: bool,
    pub total_codewords: u32,
    pub data_codewords: u32,
    pub ec_codewords: u32,
    pub ec_blocks: u32,
    pub sizing_mode: SizingMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_dimension: Option<Dimension>,
    pub dimension: Dimension,
    pub module_pixel_size: u32,
    pub exceeds_requested_dimension: TriState,
    pub was_encodable: TriState,
    pub was_ascii: TriState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

/// `None` unless the generator holds a current result.
pub fn summarize<E: SymbolEncoder>(
    generator: &Generator<E>,
    output: Option<&Path>,
) -> Option<CodeSummary> {
    let symbol = generator.symbol()?;
    Some(CodeSummary {
        version: symbol.version(),
        modules: symbol.module_count(),
        encoding_mode: symbol.mode(),
        error_correction: symbol.error_correction_level(),
        charset: generator.effective_charset(),
        charset_explicit: generator.charset().is_some(),
        total_codewords: symbol.total_bytes(),
        data_codewords: symbol.data_bytes(),
        ec_codewords: symbol.ec_bytes(),
        ec_blocks: symbol.ec_blocks(),
        sizing_mode: generator.sizing_mode(),
        requested_dimension: generator.requested_dimension(),
        dimension: generator.actual_dimension()?,
        module_pixel_size: generator.module_size()?,
        exceeds_requested_dimension: generator.exceeds_requested_dimension(),
        was_encodable: generator.was_encodable(),
        was_ascii: generator.was_ascii(),
        output: output.map(Path::to_path_buf),
    })
}

fn plural(n: u32, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

pub fn format_summary(summary: &CodeSummary) -> Vec<String> {
    let mut lines = vec![
        format!(
            "QR code v{} ({m}x{m} modules), {} mode, EC level {}",
            summary.version,
            summary.encoding_mode,
            summary.error_correction,
            m = summary.modules
        ),
        format!(
            "    Codewords: {} total, {} data, {} EC in {}",
            summary.total_codewords,
            summary.data_codewords,
            summary.ec_codewords,
            plural(summary.ec_blocks, "block")
        ),
    ];

    if summary.charset_explicit {
        lines.push(format!("    Charset: {}", summary.charset));
    } else {
        lines.push(format!("    Charset: {} (default)", summary.charset));
    }

    let sizing = match summary.requested_dimension {
        Some(requested) => format!("{}, requested {}", summary.sizing_mode, requested),
        None => summary.sizing_mode.to_string(),
    };
    lines.push(format!(
        "    Size: {} px at {} px/module ({})",
        summary.dimension, summary.module_pixel_size, sizing
    ));

    let ascii = if summary.was_ascii.is_true() { "ascii" } else { "non-ascii" };
    let encodable = if summary.was_encodable.is_true() {
        "encodable"
    } else {
        "not encodable"
    };
    lines.push(format!("    Content: {ascii}, {encodable}"));

    if summary.exceeds_requested_dimension.is_true() {
        if let Some(requested) = summary.requested_dimension {
            lines.push(format!(
                "    Warning: code is larger than the requested {requested}"
            ));
        }
    }
    if summary.was_encodable == TriState::False {
        lines.push(format!(
            "    Warning: some characters are not representable in {} and were replaced",
            summary.charset
        ));
    }

    if let Some(path) = &summary.output {
        lines.push(format!("    Output: {}", path.display()));
    }
    lines
}

pub fn print_summary(summary: &CodeSummary) {
    for line in format_summary(summary) {
        println!("{line}");
    }
}

pub fn format_json(summary: &CodeSummary) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(summary)
}

/// One line per change event, for `live` mode.
pub fn format_event(event: &ChangeEvent) -> String {
    format!("{}: {:?} -> {:?}", event.property, event.old, event.new)
}
