//! Generator configuration.
//!
//! Handles loading, validating, and merging `simple-qr.toml`. User values are
//! merged over stock defaults, so a file only needs the keys it changes.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [generator]
//! error_correction = "L"    # L, M, Q or H
//! # charset = "UTF-8"       # US-ASCII, ISO-8859-1, UTF-8 or Shift_JIS (absent = ISO-8859-1)
//! mode = "best-fit"         # fixed-size, best-fit or module-size
//! size = 256                # requested side in pixels (fixed-size, best-fit)
//! module_size = 4           # pixels per module (module-size)
//! max_image_size = 4096     # hard ceiling on the rendered side (at most 16384)
//!
//! [debounce]
//! min_delay_ms = 10
//! max_delay_ms = 100
//! ```
//!
//! Unknown keys are rejected to catch typos early. Command-line flags
//! override whatever the file says.

use crate::debounce::{DebounceBounds, MAX_DELAY, MIN_DELAY};
use crate::encoding::Charset;
use crate::raster::MAX_IMAGE_SIDE;
use crate::types::{ErrorCorrectionLevel, SizingMode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// File name looked up in the working directory when `--config` is absent.
pub const CONFIG_FILE_NAME: &str = "simple-qr.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("config file not found: {0}")]
    NotFound(PathBuf),
    #[error("Config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QrConfig {
    pub generator: GeneratorConfig,
    pub debounce: DebounceConfig,
}

impl QrConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.generator.validate()?;
        self.debounce.validate()
    }
}

/// Initial generator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    pub error_correction: ErrorCorrectionLevel,
    /// Absent means the encoder default, which is not the same as naming it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charset: Option<Charset>,
    pub mode: SizingMode,
    /// Requested square side for the dimension-driven modes.
    pub size: u32,
    pub module_size: u32,
    pub max_image_size: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            error_correction: ErrorCorrectionLevel::default(),
            charset: None,
            mode: SizingMode::default(),
            size: 256,
            module_size: 4,
            max_image_size: 4096,
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size == 0 {
            return Err(ConfigError::Validation(
                "generator.size must be at least 1".into(),
            ));
        }
        if self.module_size == 0 {
            return Err(ConfigError::Validation(
                "generator.module_size must be at least 1".into(),
            ));
        }
        if self.max_image_size == 0 {
            return Err(ConfigError::Validation(
                "generator.max_image_size must be at least 1".into(),
            ));
        }
        if self.max_image_size > MAX_IMAGE_SIDE {
            return Err(ConfigError::Validation(format!(
                "generator.max_image_size ({}) must not exceed {MAX_IMAGE_SIDE}",
                self.max_image_size
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DebounceConfig {
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: MIN_DELAY.as_millis() as u64,
            max_delay_ms: MAX_DELAY.as_millis() as u64,
        }
    }
}

impl DebounceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_delay_ms > self.max_delay_ms {
            return Err(ConfigError::Validation(format!(
                "debounce.min_delay_ms ({}) must not exceed debounce.max_delay_ms ({})",
                self.min_delay_ms, self.max_delay_ms
            )));
        }
        Ok(())
    }

    pub fn bounds(&self) -> DebounceBounds {
        DebounceBounds {
            min: Duration::from_millis(self.min_delay_ms),
            max: Duration::from_millis(self.max_delay_ms),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(QrConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value. `Ok(None)` if it doesn't exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<QrConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: QrConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `simple-qr.toml` from `dir`, falling back to stock defaults when the
/// directory has none.
pub fn load_config(dir: &Path) -> Result<QrConfig, ConfigError> {
    let overlay = load_raw_config(&dir.join(CONFIG_FILE_NAME))?;
    resolve_config(stock_defaults_value()?, overlay)
}

/// Load an explicitly named config file. Unlike [`load_config`], a missing
/// file is an error.
pub fn load_config_file(path: &Path) -> Result<QrConfig, ConfigError> {
    let overlay =
        load_raw_config(path)?.ok_or_else(|| ConfigError::NotFound(path.to_path_buf()))?;
    resolve_config(stock_defaults_value()?, Some(overlay))
}

/// Returns a fully-commented stock config with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Simple QR Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# simple-qr reads ./simple-qr.toml unless --config names another file.
# Command-line flags override values set here.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Code generation
# ---------------------------------------------------------------------------
[generator]
# Error-correction level: L (~7%), M (~15%), Q (~25%) or H (~30%).
# Higher levels survive more damage but need a larger symbol.
error_correction = "L"

# Character set for byte-mode content: US-ASCII, ISO-8859-1, UTF-8 or
# Shift_JIS. Omit to use the encoder default (ISO-8859-1). Naming a
# non-default charset adds an ECI marker so readers know how to decode the
# bytes. With Shift_JIS, all-kanji text uses the denser kanji mode instead.
# charset = "UTF-8"

# How the rendered size is chosen:
#   fixed-size  - fit `size`; fail if the code cannot fit at 1px per module
#   best-fit    - fit `size`; overshoot at 1px per module if it cannot
#   module-size - draw each module `module_size` pixels wide
mode = "best-fit"

# Requested side in pixels for fixed-size and best-fit.
size = 256

# Pixels per module for module-size.
module_size = 4

# No rendered code may be larger than this, in any mode (at most 16384).
max_image_size = 4096

# ---------------------------------------------------------------------------
# Live regeneration
# ---------------------------------------------------------------------------
[debounce]
# Edits are coalesced; the wait before regenerating tracks how long the last
# generation took, clamped to this range.
min_delay_ms = 10
max_delay_ms = 100
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_matches_documented_values() {
        let config = QrConfig::default();
        assert_eq!(config.generator.error_correction, ErrorCorrectionLevel::L);
        assert_eq!(config.generator.charset, None);
        assert_eq!(config.generator.mode, SizingMode::BestFit);
        assert_eq!(config.generator.size, 256);
        assert_eq!(config.generator.module_size, 4);
        assert_eq!(config.generator.max_image_size, 4096);
        assert_eq!(config.debounce.bounds(), DebounceBounds::default());
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[generator]
mode = "module-size"
charset = "UTF-8"
"#;
        let config: QrConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.generator.mode, SizingMode::ModuleSize);
        assert_eq!(config.generator.charset, Some(Charset::Utf8));
        // untouched keys keep defaults
        assert_eq!(config.generator.size, 256);
        assert_eq!(config.debounce.max_delay_ms, 100);
    }

    #[test]
    fn unknown_keys_rejected() {
        let toml = r#"
[generator]
colour = "black"
"#;
        assert!(toml::from_str::<QrConfig>(toml).is_err());
    }

    #[test]
    fn validate_rejects_zero_sizes() {
        for field in ["size", "module_size", "max_image_size"] {
            let overlay: toml::Value = toml::from_str(&format!("[generator]\n{field} = 0")).unwrap();
            let err = resolve_config(stock_defaults_value().unwrap(), Some(overlay)).unwrap_err();
            assert!(
                err.to_string().contains(field),
                "{field}: unexpected error {err}"
            );
        }
    }

    #[test]
    fn validate_caps_max_image_size() {
        let at_limit = GeneratorConfig {
            max_image_size: MAX_IMAGE_SIDE,
            ..GeneratorConfig::default()
        };
        assert!(at_limit.validate().is_ok());

        let overlay: toml::Value =
            toml::from_str("[generator]\nmax_image_size = 4294967295").unwrap();
        let err = resolve_config(stock_defaults_value().unwrap(), Some(overlay)).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("16384"), "unexpected error {err}");
    }

    #[test]
    fn validate_rejects_inverted_debounce_bounds() {
        let config = QrConfig {
            debounce: DebounceConfig {
                min_delay_ms: 200,
                max_delay_ms: 100,
            },
            ..QrConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // merge_toml
    // =========================================================================

    #[test]
    fn merge_overlay_keeps_sibling_keys() {
        let base = stock_defaults_value().unwrap();
        let overlay: toml::Value = toml::from_str("[generator]\nsize = 512").unwrap();
        let merged = merge_toml(base, overlay);

        let generator = merged.get("generator").unwrap();
        assert_eq!(generator.get("size").unwrap().as_integer(), Some(512));
        assert_eq!(generator.get("module_size").unwrap().as_integer(), Some(4));
        assert!(merged.get("debounce").is_some());
    }

    #[test]
    fn merge_non_table_overlay_replaces() {
        let base = toml::Value::Integer(1);
        let overlay = toml::Value::Integer(2);
        assert_eq!(merge_toml(base, overlay), toml::Value::Integer(2));
    }

    #[test]
    fn stock_defaults_omit_unset_charset() {
        let value = stock_defaults_value().unwrap();
        assert!(value.get("generator").unwrap().get("charset").is_none());
    }

    // =========================================================================
    // loading
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config, QrConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            "[generator]\nerror_correction = \"H\"\n[debounce]\nmax_delay_ms = 250\n",
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.generator.error_correction, ErrorCorrectionLevel::H);
        assert_eq!(config.debounce.max_delay_ms, 250);
        assert_eq!(config.debounce.min_delay_ms, 10);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE_NAME), "this is not valid toml [[[").unwrap();
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_file_requires_existing_file() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope.toml");
        assert!(matches!(
            load_config_file(&missing),
            Err(ConfigError::NotFound(p)) if p == missing
        ));
    }

    #[test]
    fn stock_config_toml_parses_to_defaults() {
        let config: QrConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, QrConfig::default());
    }
}
