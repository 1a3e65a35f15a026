//! Module-size policy: the caller picks pixels per module directly.

use super::calculations::{RenderedSize, layout};
use super::{SizingError, SizingPolicy, validate_module_size};
use crate::encoding::Symbol;
use crate::types::{Dimension, SizingMode};

/// Renders `module_size × module_count` pixels square. There is no target
/// dimension, so "exceeds requested dimension" is always not applicable.
#[derive(Debug, Clone)]
pub struct ModuleSizePolicy {
    module_size: u32,
    max_image_size: u32,
    result: Option<RenderedSize>,
}

impl ModuleSizePolicy {
    pub fn new(module_size: u32, max_image_size: u32) -> Self {
        Self {
            module_size,
            max_image_size,
            result: None,
        }
    }
}

impl SizingPolicy for ModuleSizePolicy {
    fn mode(&self) -> SizingMode {
        SizingMode::ModuleSize
    }

    fn max_image_size(&self) -> u32 {
        self.max_image_size
    }

    fn render_result(&mut self, symbol: &Symbol) -> Result<Dimension, SizingError> {
        self.result = None;
        let size = layout(
            self.module_size,
            symbol.module_count(),
            None,
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

    fn module_size(&self) -> Option<u32> {
        Some(self.module_size)
    }

    fn set_module_size(&mut self, module_size: u32) -> Result<(), SizingError> {
        self.module_size = validate_module_size(module_size)?;
        Ok(())
    }
}
