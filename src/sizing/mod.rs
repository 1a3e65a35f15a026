//! Sizing policies: module grid → pixel dimensions.
//!
//! | Mode | Input | Too small | Over the ceiling |
//! |---|---|---|---|
//! | [`FixedSizePolicy`] | target dimension | fails | fails |
//! | [`BestFitPolicy`] | target dimension | clamps to 1 px/module | fails |
//! | [`ModuleSizePolicy`] | pixels per module | n/a | fails |
//!
//! The generator only ever talks to the [`SizingPolicy`] trait. The mode tag
//! is looked at exactly once, in [`build_policy`], when a policy is swapped in.
//!
//! The module is split into:
//! - **Calculations**: floor division, clamping and the ceiling check
//! - **Policies**: one file per mode, each holding its own rendered result

pub mod best_fit;
pub mod calculations;
pub mod fixed_size;
pub mod module_size;

pub use best_fit::BestFitPolicy;
pub use calculations::RenderedSize;
pub use fixed_size::FixedSizePolicy;
pub use module_size::ModuleSizePolicy;

use crate::encoding::Symbol;
use crate::types::{Dimension, SizingMode, TriState};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SizingError {
    /// The code cannot be drawn within bounds. `min` is the module count
    /// (the smallest possible side), `max` the bound that was hit, `value`
    /// the side that was asked for or computed.
    #[error("code size exceeded: {value}px is outside {min}px..={max}px")]
    CodeSizeExceeded { min: u32, max: u32, value: u32 },
    #[error("{setting} cannot be set in {mode} mode")]
    Unsupported {
        setting: &'static str,
        mode: SizingMode,
    },
    #[error("module size must be at least 1, got {0}")]
    InvalidModuleSize(u32),
    #[error("requested dimension must be non-zero, got {0}")]
    InvalidDimension(Dimension),
}

/// Converts a symbol's module count into concrete pixels.
///
/// A policy owns its last rendered result until [`reset_state`] or the next
/// [`render_result`].
///
/// [`reset_state`]: SizingPolicy::reset_state
/// [`render_result`]: SizingPolicy::render_result
pub trait SizingPolicy: Send + fmt::Debug {
    fn mode(&self) -> SizingMode;

    /// Largest side, in pixels, any rendered code may have.
    fn max_image_size(&self) -> u32;

    /// Size `symbol`, remember the result, and return its dimension.
    ///
    /// A failure leaves the policy without a result.
    fn render_result(&mut self, symbol: &Symbol) -> Result<Dimension, SizingError>;

    /// The last successful render, if any.
    fn result(&self) -> Option<&RenderedSize>;

    /// Forget the rendered result. Requested settings are kept.
    fn reset_state(&mut self);

    fn has_result(&self) -> bool {
        self.result().is_some()
    }

    fn actual_dimension(&self) -> Option<Dimension> {
        self.result().map(|r| r.dimension)
    }

    fn exceeds_requested_dimension(&self) -> TriState {
        self.result()
            .map_or(TriState::NotApplicable, |r| r.exceeds_requested)
    }

    /// The target dimension, for policies that have one.
    fn requested_dimension(&self) -> Option<Dimension> {
        None
    }

    fn set_requested_dimension(&mut self, _dimension: Dimension) -> Result<(), SizingError> {
        Err(SizingError::Unsupported {
            setting: "requested dimension",
            mode: self.mode(),
        })
    }

    /// The requested pixels per module, for policies that take one.
    fn module_size(&self) -> Option<u32> {
        None
    }

    fn set_module_size(&mut self, _module_size: u32) -> Result<(), SizingError> {
        Err(SizingError::Unsupported {
            setting: "module size",
            mode: self.mode(),
        })
    }
}

pub(crate) fn validate_dimension(dimension: Dimension) -> Result<Dimension, SizingError> {
    if dimension.width == 0 || dimension.height == 0 {
        return Err(SizingError::InvalidDimension(dimension));
    }
    Ok(dimension)
}

pub(crate) fn validate_module_size(module_size: u32) -> Result<u32, SizingError> {
    if module_size == 0 {
        return Err(SizingError::InvalidModuleSize(module_size));
    }
    Ok(module_size)
}

/// Settings a freshly built policy starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizingSeed {
    pub dimension: Dimension,
    pub module_size: u32,
}

impl SizingSeed {
    /// Keep what the user last asked for when switching away from `previous`.
    ///
    /// Explicit requests win over rendered values; rendered values win over
    /// `self` (the defaults).
    pub fn carried_from(self, previous: &dyn SizingPolicy) -> Self {
        let rendered = previous.result();
        Self {
            dimension: previous
                .requested_dimension()
                .or(rendered.map(|r| r.dimension))
                .unwrap_or(self.dimension),
            module_size: previous
                .module_size()
                .or(rendered.map(|r| r.module_pixel_size))
                .unwrap_or(self.module_size),
        }
    }
}

/// Build the policy for `mode`. Invalid seed values fall back to 1 pixel.
pub fn build_policy(mode: SizingMode, seed: SizingSeed, max_image_size: u32) -> Box<dyn SizingPolicy> {
    match mode {
        SizingMode::FixedSize => Box::new(FixedSizePolicy::new(seed.dimension, max_image_size)),
        SizingMode::BestFit => Box::new(BestFitPolicy::new(seed.dimension, max_image_size)),
        SizingMode::ModuleSize => {
            Box::new(ModuleSizePolicy::new(seed.module_size.max(1), max_image_size))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::backend::tests::blank_symbol;

    const DEFAULTS: SizingSeed = SizingSeed {
        dimension: Dimension::square(256),
        module_size: 4,
    };

    #[test]
    fn build_policy_selects_by_mode() {
        for mode in [SizingMode::FixedSize, SizingMode::BestFit, SizingMode::ModuleSize] {
            assert_eq!(build_policy(mode, DEFAULTS, 800).mode(), mode);
        }
    }

    #[test]
    fn module_size_policy_has_no_requested_dimension() {
        let mut policy = build_policy(SizingMode::ModuleSize, DEFAULTS, 800);
        assert_eq!(policy.requested_dimension(), None);
        assert_eq!(
            policy.set_requested_dimension(Dimension::square(100)),
            Err(SizingError::Unsupported {
                setting: "requested dimension",
                mode: SizingMode::ModuleSize
            })
        );
    }

    #[test]
    fn dimension_policies_reject_module_size() {
        for mode in [SizingMode::FixedSize, SizingMode::BestFit] {
            let mut policy = build_policy(mode, DEFAULTS, 800);
            assert!(matches!(
                policy.set_module_size(3),
                Err(SizingError::Unsupported { .. })
            ));
        }
    }

    #[test]
    fn carry_over_prefers_requested_dimension() {
        let previous = build_policy(
            SizingMode::FixedSize,
            SizingSeed {
                dimension: Dimension::square(500),
                ..DEFAULTS
            },
            800,
        );
        let seed = DEFAULTS.carried_from(previous.as_ref());
        assert_eq!(seed.dimension, Dimension::square(500));
        // No module size requested and nothing rendered: default stays.
        assert_eq!(seed.module_size, 4);
    }

    #[test]
    fn carry_over_uses_rendered_module_size() {
        let mut previous = build_policy(SizingMode::BestFit, DEFAULTS, 800);
        previous.render_result(&blank_symbol(1)).unwrap();
        // 256 / 21 = 12 px per module
        let seed = DEFAULTS.carried_from(previous.as_ref());
        assert_eq!(seed.module_size, 12);
    }

    #[test]
    fn carry_over_from_module_size_uses_rendered_dimension() {
        let mut previous = build_policy(
            SizingMode::ModuleSize,
            SizingSeed {
                module_size: 5,
                ..DEFAULTS
            },
            800,
        );
        let unrendered = DEFAULTS.carried_from(previous.as_ref());
        assert_eq!(unrendered.dimension, Dimension::square(256));
        assert_eq!(unrendered.module_size, 5);

        previous.render_result(&blank_symbol(1)).unwrap();
        let rendered = DEFAULTS.carried_from(previous.as_ref());
        assert_eq!(rendered.dimension, Dimension::square(105));
    }

    #[test]
    fn default_exceeds_is_not_applicable_without_result() {
        let policy = build_policy(SizingMode::FixedSize, DEFAULTS, 800);
        assert!(!policy.has_result());
        assert_eq!(policy.exceeds_requested_dimension(), TriState::NotApplicable);
        assert_eq!(policy.actual_dimension(), None);
    }
}
