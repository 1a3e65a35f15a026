//! Pure pixel arithmetic shared by the sizing policies.
//!
//! All three policies reduce to the same floor division; they differ only in
//! what happens when it yields zero pixels per module.

use super::SizingError;
use crate::types::{Dimension, TriState};

/// Outcome of sizing one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderedSize {
    /// Pixels per module edge.
    pub module_pixel_size: u32,
    /// Actual pixel dimensions of the rendered code.
    pub dimension: Dimension,
    /// Whether `dimension` overshoots the requested target.
    pub exceeds_requested: TriState,
}

/// Largest module size whose grid still fits in `target_side`. May be zero.
///
/// # Examples
/// ```
/// # use simple_qr::sizing::calculations::floor_module_size;
/// assert_eq!(floor_module_size(210, 21), 10);
/// assert_eq!(floor_module_size(20, 25), 0);
/// ```
pub fn floor_module_size(target_side: u32, module_count: u32) -> u32 {
    target_side.checked_div(module_count).unwrap_or(0)
}

/// Fixed-size rule: zero pixels per module means the code cannot be drawn.
pub fn strict_module_size(target_side: u32, module_count: u32) -> Result<u32, SizingError> {
    match floor_module_size(target_side, module_count) {
        0 => Err(SizingError::CodeSizeExceeded {
            min: module_count,
            max: target_side,
            value: target_side,
        }),
        n => Ok(n),
    }
}

/// Best-fit rule: never below one pixel per module.
pub fn clamped_module_size(target_side: u32, module_count: u32) -> u32 {
    floor_module_size(target_side, module_count).max(1)
}

/// Turn a module size into a square dimension, enforcing the image ceiling.
///
/// `target_side` is `None` when the policy has no target to compare against.
pub fn layout(
    module_pixel_size: u32,
    module_count: u32,
    target_side: Option<u32>,
    max_image_size: u32,
) -> Result<RenderedSize, SizingError> {
    let side = u64::from(module_pixel_size) * u64::from(module_count);
    if side > u64::from(max_image_size) {
        return Err(SizingError::CodeSizeExceeded {
            min: module_count,
            max: max_image_size,
            value: u32::try_from(side).unwrap_or(u32::MAX),
        });
    }
    // Bounded by max_image_size above.
    let side = side as u32;
    let exceeds_requested = match target_side {
        Some(target) => TriState::from(side > target),
        None => TriState::NotApplicable,
    };
    Ok(RenderedSize {
        module_pixel_size,
        dimension: Dimension::square(side),
        exceeds_requested,
    })
}
