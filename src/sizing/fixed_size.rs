//! Fixed-size policy: render at the requested size or not at all.

use super::calculations::{RenderedSize, layout, strict_module_size};
use super::{SizingError, SizingPolicy, validate_dimension};
use crate::encoding::Symbol;
use crate::types::{Dimension, SizingMode};

/// Fits the symbol into a square target using whole pixels per module.
///
/// When the target is smaller than the module count there is no way to draw
/// the code and [`render_result`](SizingPolicy::render_result) fails with
/// [`SizingError::CodeSizeExceeded`]. The rendered side can fall short of the
/// target by up to `module_count - 1` pixels, never exceed it.
#[derive(Debug, Clone)]
pub struct FixedSizePolicy {
    requested: Dimension,
    max_image_size: u32,
    result: Option<RenderedSize>,
}

impl FixedSizePolicy {
    pub fn new(requested: Dimension, max_image_size: u32) -> Self {
        Self {
            requested,
            max_image_size,
            result: None,
        }
    }
}

impl SizingPolicy for FixedSizePolicy {
    fn mode(&self) -> SizingMode {
        SizingMode::FixedSize
    }

    fn max_image_size(&self) -> u32 {
        self.max_image_size
    }

    fn render_result(&mut self, symbol: &Symbol) -> Result<Dimension, SizingError> {
        self.result = None;
        let target = self.requested.shorter_side();
        let count = symbol.module_count();
        let module_pixel_size = strict_module_size(target, count)?;
        let size = layout(module_pixel_size, count, Some(target), self.max_image_size)?;
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
