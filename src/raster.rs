//! Symbol → grayscale bitmap.
//!
//! Each module becomes a solid `module_pixel_size` square. No quiet zone is
//! added, so the image side equals the sized dimension exactly.

use crate::encoding::Symbol;
use image::{GrayImage, Luma};
use thiserror::Error;

pub const DARK: Luma<u8> = Luma([0]);
pub const LIGHT: Luma<u8> = Luma([255]);

/// Largest image side drawn, one byte per pixel: 16384² is 256 MiB.
pub const MAX_IMAGE_SIDE: u32 = 16_384;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RasterError {
    #[error("image side of {modules} modules at {scale}px overflows")]
    Overflow { modules: u32, scale: u32 },
    #[error("image side {side}px exceeds the {max}px raster limit")]
    TooLarge { side: u32, max: u32 },
}

/// Draw `symbol` with `module_pixel_size` pixels per module edge.
///
/// Refuses before allocating when the side would pass [`MAX_IMAGE_SIDE`].
pub fn rasterize(symbol: &Symbol, module_pixel_size: u32) -> Result<GrayImage, RasterError> {
    let scale = module_pixel_size.max(1);
    let modules = symbol.module_count();
    let side = modules
        .checked_mul(scale)
        .ok_or(RasterError::Overflow { modules, scale })?;
    if side > MAX_IMAGE_SIDE {
        return Err(RasterError::TooLarge {
            side,
            max: MAX_IMAGE_SIDE,
        });
    }
    Ok(GrayImage::from_fn(side, side, |x, y| {
        if symbol.is_dark(x / scale, y / scale) {
            DARK
        } else {
            LIGHT
        }
    }))
}
