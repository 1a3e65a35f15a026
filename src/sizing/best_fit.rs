//! Best-fit policy: as close to the target as whole pixels allow, never
//! thinner than one pixel per module.

use super::calculations::{RenderedSize, clamped_module_size, layout};
use super::{SizingError, SizingPolicy, validate_dimension};
use crate::encoding::Symbol;
use crate::types::{Dimension, SizingMode};

/// Like [`FixedSizePolicy`](super::FixedSizePolicy), but a target smaller than
/// the module count yields a one-pixel-per-module code that overshoots the
/// target instead of an error.
#[derive(Debug, Clone)]
pub struct BestFitPolicy {
    requested: Dimension,
    max_image_size: u32,
    result: Option<RenderedSize>,
}

impl BestFitPolicy {
    pub fn new(requested: Dimension, max_image_size: u32) -> Self {
        Self {
            requested,
            max_image_size,
            result: None,
        }
    }
}

impl SizingPolicy for BestFitPolicy {
    fn mode(&self) -> SizingMode {
        SizingMode::BestFit
    }

    fn max_image_size(&self) -> u32 {
        self.max_image_size
    }

    fn render_result(&mut self, symbol: &Symbol) -> Result<Dimension, SizingError> {
        self.result = None;
        let target = self.requested.shorter_side();
        let count = symbol.module_count();
        let size = layout(
            clamped_module_size(target, count),
            count,
            Some(target),
            self.max_image_size,
        )?;
        self.result = Some(size);
        Ok(size.dimension)
    }

    fn result(&self) -> Option<&RenderedSize> {
        self.result.as_ref()
    }

    fn reset_state(&mut self) {
        self.result = None;
    }

    fn requested_dimension(&self) -> Option<Dimension> {
        Some(self.requested)
    }

    fn set_requested_dimension(&mut self, dimension: Dimension) -> Result<(), SizingError> {
        self.requested = validate_dimension(dimension)?;
        Ok(())
    }
}
