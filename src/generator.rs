//! The generator: configuration state, the active sizing policy, and the
//! change bus.
//!
//! ```text
//!            set_content("")/clear_content()
//!        ┌────────────────────────────────────┐
//!        ▼                                    │
//!     EMPTY ──set_content(text)──▶ DIRTY ──generate_code() ok──▶ VALID
//!                                   ▲                              │
//!                                   └──────── any setter ──────────┘
//! ```
//!
//! Every setter that changes configuration discards the symbol, the raster,
//! the policy's rendered result and the derived flags in one step, so a result
//! on display always matches the current configuration. Setting a value equal
//! to the current one is a no-op: no event, no state change.
//!
//! A `Generator` is driven from one logical UI thread. It is `Send` so it can
//! be parked behind a mutex and handed between threads, but its methods are
//! not meant to race.

use crate::config::GeneratorConfig;
use crate::encoding::{Charset, EncodeError, EncodeHints, QrEncoder, Symbol, SymbolEncoder};
use crate::events::{ChangeBus, ChangeEvent, ListenerId, Property, PropertyValue};
use crate::raster::{RasterError, rasterize};
use crate::sizing::{
    SizingError, SizingPolicy, SizingSeed, build_policy, validate_dimension, validate_module_size,
};
use crate::types::{Dimension, ErrorCorrectionLevel, SizingMode, TriState};
use image::GrayImage;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeneratorError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("content too large: {bytes} bytes do not fit any version at level {level}")]
    ContentTooLarge {
        bytes: usize,
        level: ErrorCorrectionLevel,
    },
    #[error("code size exceeded: {value}px is outside {min}px..={max}px")]
    CodeSizeExceeded { min: u32, max: u32, value: u32 },
    #[error("encoding failed: {0}")]
    Encoding(String),
}

impl From<EncodeError> for GeneratorError {
    fn from(err: EncodeError) -> Self {
        match err {
            EncodeError::ContentTooLarge { bytes, level } => {
                GeneratorError::ContentTooLarge { bytes, level }
            }
            EncodeError::Failed(msg) => GeneratorError::Encoding(msg),
        }
    }
}

impl From<RasterError> for GeneratorError {
    fn from(err: RasterError) -> Self {
        GeneratorError::Encoding(err.to_string())
    }
}

impl From<SizingError> for GeneratorError {
    fn from(err: SizingError) -> Self {
        match err {
            SizingError::CodeSizeExceeded { min, max, value } => {
                GeneratorError::CodeSizeExceeded { min, max, value }
            }
            SizingError::Unsupported { .. } => GeneratorError::InvalidOperation(err.to_string()),
            SizingError::InvalidModuleSize(_) | SizingError::InvalidDimension(_) => {
                GeneratorError::InvalidArgument(err.to_string())
            }
        }
    }
}

/// Coarse lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorStatus {
    /// No content, or empty content.
    Empty,
    /// Configuration changed since the last successful generation.
    Dirty,
    /// The current result matches the current configuration.
    Valid,
}

/// Values the generator publishes after `generate_code` or `reset_state`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DerivedSnapshot {
    actual_dimension: Option<Dimension>,
    module_size: Option<u32>,
    exceeds: TriState,
    was_encodable: TriState,
    was_ascii: TriState,
    has_result: bool,
}

#[derive(Debug)]
pub struct Generator<E: SymbolEncoder = QrEncoder> {
    encoder: E,
    content: Option<String>,
    charset: Option<Charset>,
    level: ErrorCorrectionLevel,
    policy: Box<dyn SizingPolicy>,
    /// Fallbacks for settings a new policy can't carry over.
    defaults: SizingSeed,
    dirty: bool,
    was_encodable: TriState,
    was_ascii: TriState,
    symbol: Option<Symbol>,
    image: Option<GrayImage>,
    last_cost: Option<Duration>,
    bus: ChangeBus,
}

impl Generator<QrEncoder> {
    /// A generator with stock defaults and the `qrcode`-backed encoder.
    pub fn new() -> Self {
        Self::from_config(&GeneratorConfig::default())
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::with_encoder(QrEncoder::new(), config)
    }
}

impl Default for Generator<QrEncoder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: SymbolEncoder> Generator<E> {
    pub fn with_encoder(encoder: E, config: &GeneratorConfig) -> Self {
        let defaults = SizingSeed {
            dimension: Dimension::square(config.size),
            module_size: config.module_size,
        };
        Self {
            encoder,
            content: None,
            charset: config.charset,
            level: config.error_correction,
            policy: build_policy(config.mode, defaults, config.max_image_size),
            defaults,
            dirty: true,
            was_encodable: TriState::NotApplicable,
            was_ascii: TriState::NotApplicable,
            symbol: None,
            image: None,
            last_cost: None,
            bus: ChangeBus::new(),
        }
    }

    // =========================================================================
    // Observers
    // =========================================================================

    pub fn subscribe(&mut self, listener: impl FnMut(&ChangeEvent) + Send + 'static) -> ListenerId {
        self.bus.subscribe(listener)
    }

    pub fn subscribe_to(
        &mut self,
        property: Property,
        listener: impl FnMut(&ChangeEvent) + Send + 'static,
    ) -> ListenerId {
        self.bus.subscribe_to(property, listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.bus.unsubscribe(id)
    }

    // =========================================================================
    // Getters
    // =========================================================================

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Content is set and non-empty.
    pub fn has_content(&self) -> bool {
        self.content.as_deref().is_some_and(|c| !c.is_empty())
    }

    /// The explicit charset hint; `None` means the encoder default.
    pub fn charset(&self) -> Option<Charset> {
        self.charset
    }

    pub fn effective_charset(&self) -> Charset {
        self.charset.unwrap_or(Charset::DEFAULT)
    }

    pub fn error_correction_level(&self) -> ErrorCorrectionLevel {
        self.level
    }

    pub fn sizing_mode(&self) -> SizingMode {
        self.policy.mode()
    }

    pub fn max_image_size(&self) -> u32 {
        self.policy.max_image_size()
    }

    /// `None` in module-size mode.
    pub fn requested_dimension(&self) -> Option<Dimension> {
        self.policy.requested_dimension()
    }

    /// Requested pixels per module in module-size mode, otherwise the one
    /// the last render chose.
    pub fn module_size(&self) -> Option<u32> {
        self.policy
            .module_size()
            .or_else(|| self.policy.result().map(|r| r.module_pixel_size))
    }

    pub fn actual_dimension(&self) -> Option<Dimension> {
        self.policy.actual_dimension()
    }

    pub fn exceeds_requested_dimension(&self) -> TriState {
        self.policy.exceeds_requested_dimension()
    }

    /// Whether the charset could represent the content at the last generation.
    pub fn was_encodable(&self) -> TriState {
        self.was_encodable
    }

    /// Whether the last generated content was pure ASCII.
    pub fn was_ascii(&self) -> TriState {
        self.was_ascii
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn status(&self) -> GeneratorStatus {
        if !self.has_content() {
            GeneratorStatus::Empty
        } else if self.dirty {
            GeneratorStatus::Dirty
        } else {
            GeneratorStatus::Valid
        }
    }

    pub fn has_result(&self) -> bool {
        self.image.is_some()
    }

    pub fn symbol(&self) -> Option<&Symbol> {
        self.symbol.as_ref()
    }

    pub fn get_image(&self) -> Result<&GrayImage, GeneratorError> {
        self.image
            .as_ref()
            .ok_or_else(|| GeneratorError::InvalidState("no code has been generated".into()))
    }

    /// Wall-clock cost of the most recent `generate_code`, failed or not.
    pub fn last_generation_cost(&self) -> Option<Duration> {
        self.last_cost
    }

    // =========================================================================
    // Setters
    // =========================================================================

    /// Drop the symbol and everything derived from it. Fires nothing.
    fn invalidate(&mut self) {
        self.dirty = true;
        self.symbol = None;
        self.image = None;
        self.was_encodable = TriState::NotApplicable;
        self.was_ascii = TriState::NotApplicable;
        self.policy.reset_state();
    }

    fn replace_content(&mut self, content: Option<String>) {
        if self.content == content {
            return;
        }
        let old = std::mem::replace(&mut self.content, content);
        self.invalidate();
        debug!(
            chars = self.content.as_deref().map_or(0, |c| c.chars().count()),
            "content changed"
        );
        self.bus.fire(ChangeEvent {
            property: Property::Content,
            old: PropertyValue::Text(old),
            new: PropertyValue::Text(self.content.clone()),
        });
    }

    pub fn set_content(&mut self, text: impl Into<String>) {
        self.replace_content(Some(text.into()));
    }

    /// Unset the content. Unset is distinct from the empty string.
    pub fn clear_content(&mut self) {
        self.replace_content(None);
    }

    fn replace_charset(&mut self, charset: Option<Charset>) {
        if self.charset == charset {
            return;
        }
        let old = std::mem::replace(&mut self.charset, charset);
        self.invalidate();
        debug!(charset = ?self.charset, "charset changed");
        self.bus.fire(ChangeEvent {
            property: Property::Charset,
            old: PropertyValue::Charset(old),
            new: PropertyValue::Charset(charset),
        });
    }

    pub fn set_character_encoding(&mut self, charset: Charset) {
        self.replace_charset(Some(charset));
    }

    /// Go back to the encoder's default charset.
    pub fn remove_character_encoding(&mut self) {
        self.replace_charset(None);
    }

    /// `None` (no level selected) is rejected with `InvalidArgument`.
    pub fn set_error_correction_level(
        &mut self,
        level: Option<ErrorCorrectionLevel>,
    ) -> Result<(), GeneratorError> {
        let level = level.ok_or_else(|| {
            GeneratorError::InvalidArgument("error-correction level must be set".into())
        })?;
        if self.level == level {
            return Ok(());
        }
        let old = std::mem::replace(&mut self.level, level);
        self.invalidate();
        debug!(%level, "error-correction level changed");
        self.bus.fire(ChangeEvent {
            property: Property::ErrorCorrection,
            old: PropertyValue::ErrorCorrection(old),
            new: PropertyValue::ErrorCorrection(level),
        });
        Ok(())
    }

    /// Swap in the policy for `mode`, carrying over the size the user last
    /// asked for (or last saw) instead of resetting to defaults.
    pub fn set_sizing_mode(&mut self, mode: SizingMode) {
        let old = self.policy.mode();
        if old == mode {
            return;
        }
        let seed = self.defaults.carried_from(self.policy.as_ref());
        self.policy = build_policy(mode, seed, self.policy.max_image_size());
        self.invalidate();
        debug!(from = %old, to = %mode, ?seed, "sizing mode changed");
        self.bus.fire(ChangeEvent {
            property: Property::Mode,
            old: PropertyValue::Mode(old),
            new: PropertyValue::Mode(mode),
        });
    }

    /// Fails with `InvalidOperation` in module-size mode.
    pub fn set_requested_dimension(&mut self, dimension: Dimension) -> Result<(), GeneratorError> {
        let old = self.policy.requested_dimension();
        if old == Some(dimension) {
            return Ok(());
        }
        self.policy.set_requested_dimension(validate_dimension(dimension)?)?;
        self.invalidate();
        debug!(%dimension, "requested dimension changed");
        self.bus.fire(ChangeEvent {
            property: Property::RequestedDimension,
            old: PropertyValue::Dimension(old),
            new: PropertyValue::Dimension(Some(dimension)),
        });
        Ok(())
    }

    /// Fails with `InvalidArgument` for 0 and `InvalidOperation` outside
    /// module-size mode.
    pub fn set_module_size(&mut self, module_size: u32) -> Result<(), GeneratorError> {
        let module_size = validate_module_size(module_size)?;
        let old = self.policy.module_size();
        if old == Some(module_size) {
            return Ok(());
        }
        self.policy.set_module_size(module_size)?;
        self.invalidate();
        debug!(module_size, "module size changed");
        self.bus.fire(ChangeEvent {
            property: Property::ModuleSize,
            old: PropertyValue::ModuleSize(old),
            new: PropertyValue::ModuleSize(Some(module_size)),
        });
        Ok(())
    }

    // =========================================================================
    // Generation
    // =========================================================================

    fn snapshot(&self) -> DerivedSnapshot {
        DerivedSnapshot {
            actual_dimension: self.actual_dimension(),
            module_size: self.module_size(),
            exceeds: self.exceeds_requested_dimension(),
            was_encodable: self.was_encodable,
            was_ascii: self.was_ascii,
            has_result: self.has_result(),
        }
    }

    /// Fire one event per derived value that changed since `before`, then
    /// `ResultUpdated` exactly once.
    fn publish_derived(&mut self, before: DerivedSnapshot) {
        let after = self.snapshot();
        let bus = &mut self.bus;
        bus.fire_if_changed(
            Property::ActualDimension,
            PropertyValue::Dimension(before.actual_dimension),
            PropertyValue::Dimension(after.actual_dimension),
        );
        bus.fire_if_changed(
            Property::ModuleSize,
            PropertyValue::ModuleSize(before.module_size),
            PropertyValue::ModuleSize(after.module_size),
        );
        bus.fire_if_changed(
            Property::ExceedsRequestedDimension,
            PropertyValue::Flag(before.exceeds),
            PropertyValue::Flag(after.exceeds),
        );
        bus.fire_if_changed(
            Property::WasEncodable,
            PropertyValue::Flag(before.was_encodable),
            PropertyValue::Flag(after.was_encodable),
        );
        bus.fire_if_changed(
            Property::WasAscii,
            PropertyValue::Flag(before.was_ascii),
            PropertyValue::Flag(after.was_ascii),
        );
        bus.fire(ChangeEvent {
            property: Property::ResultUpdated,
            old: PropertyValue::HasResult(before.has_result),
            new: PropertyValue::HasResult(after.has_result),
        });
    }

    fn render(&mut self, symbol: Symbol) -> Result<(), GeneratorError> {
        let dimension = self.policy.render_result(&symbol)?;
        let module_pixel_size = self
            .policy
            .result()
            .map(|r| r.module_pixel_size)
            .ok_or_else(|| GeneratorError::InvalidState("policy kept no result".into()))?;
        debug!(
            version = symbol.version(),
            modules = symbol.module_count(),
            %dimension,
            module_pixel_size,
            "code rendered"
        );
        let image = match rasterize(&symbol, module_pixel_size) {
            Ok(image) => image,
            Err(err) => {
                // the policy already holds a size for an image that doesn't exist
                self.policy.reset_state();
                return Err(err.into());
            }
        };
        self.image = Some(image);
        self.symbol = Some(symbol);
        self.dirty = false;
        Ok(())
    }

    /// Encode the current content and size it with the active policy.
    ///
    /// Without content this returns `Ok(())` and does nothing; check
    /// [`has_content`](Self::has_content) first. Encoding and sizing
    /// failures are returned as-is and leave the generator dirty with no
    /// result. `ResultUpdated` fires once either way.
    pub fn generate_code(&mut self) -> Result<(), GeneratorError> {
        let content = match self.content.as_deref() {
            Some(c) if !c.is_empty() => c.to_owned(),
            _ => {
                debug!("generate_code without content, nothing to do");
                return Ok(());
            }
        };

        let started = Instant::now();
        let before = self.snapshot();
        self.invalidate();

        let hints = EncodeHints {
            charset: self.charset,
        };
        self.was_encodable = TriState::from(hints.effective_charset().can_encode(&content));

        let encoded = self.encoder.encode(&content, self.level, &hints);
        // Recomputed on success and failure alike.
        self.was_ascii = TriState::from(match &encoded {
            Ok(symbol) => symbol.mode().is_ascii_only() || content.is_ascii(),
            Err(_) => content.is_ascii(),
        });

        let outcome = encoded
            .map_err(GeneratorError::from)
            .and_then(|symbol| self.render(symbol));

        self.last_cost = Some(started.elapsed());
        if let Err(err) = &outcome {
            warn!(error = %err, "code generation failed");
        }
        self.publish_derived(before);
        outcome
    }

    /// Discard the result and derived flags; keep every setting. Idempotent.
    pub fn reset_state(&mut self) {
        let before = self.snapshot();
        self.invalidate();
        if self.snapshot() != before {
            self.bus.fire(ChangeEvent {
                property: Property::ResultUpdated,
                old: PropertyValue::HasResult(before.has_result),
                new: PropertyValue::HasResult(false),
            });
        }
    }
}
