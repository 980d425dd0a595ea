//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or lookups.

use super::backend::Dimensions;

/// Height bound used when only the width should constrain an image.
pub const UNBOUNDED_HEIGHT: u32 = 9999;

/// Scale `current` down to fit inside `max`, preserving aspect ratio.
///
/// A zero in `max` leaves that axis unconstrained. Images are never scaled
/// up. When one side lands a single pixel short of its bound because of
/// rounding, it is rounded up to the bound.
///
/// # Arguments
/// * `current` - Source dimensions (width, height)
/// * `max` - Bounding box (width, height); 0 means unbounded
///
/// # Returns
/// * `(width, height)` - Constrained dimensions; zero sides stay zero
///
/// # Examples
/// ```
/// # use breakfit::transform::constrain_dimensions;
/// // 2000x1000 into a 400px wide column → 400x200
/// assert_eq!(constrain_dimensions((2000, 1000), (400, 9999)), (400, 200));
///
/// // Smaller images are left alone
/// assert_eq!(constrain_dimensions((300, 200), (400, 9999)), (300, 200));
/// ```
pub fn constrain_dimensions(current: (u32, u32), max: (u32, u32)) -> (u32, u32) {
    let (cur_w, cur_h) = current;
    let (max_w, max_h) = max;

    if max_w == 0 && max_h == 0 {
        return current;
    }
    if cur_w == 0 && cur_h == 0 {
        return (0, 0);
    }

    let mut width_ratio = 1.0_f64;
    let mut height_ratio = 1.0_f64;
    let mut did_width = false;
    let mut did_height = false;

    if max_w > 0 && cur_w > max_w {
        width_ratio = max_w as f64 / cur_w as f64;
        did_width = true;
    }
    if max_h > 0 && cur_h > max_h {
        height_ratio = max_h as f64 / cur_h as f64;
        did_height = true;
    }

    let smaller = width_ratio.min(height_ratio);
    let larger = width_ratio.max(height_ratio);

    // The larger ratio wins unless it would overflow either bound.
    let overflows = |ratio: f64| {
        (max_w > 0 && (cur_w as f64 * ratio).round() as u32 > max_w)
            || (max_h > 0 && (cur_h as f64 * ratio).round() as u32 > max_h)
    };
    let ratio = if overflows(larger) { smaller } else { larger };

    let scale = |side: u32| {
        if side == 0 {
            0
        } else {
            ((side as f64 * ratio).round() as u32).max(1)
        }
    };
    let mut w = scale(cur_w);
    let mut h = scale(cur_h);

    if did_width && w + 1 == max_w {
        w = max_w;
    }
    if did_height && h + 1 == max_h {
        h = max_h;
    }

    (w, h)
}

/// Vertical offset that centers a `target` crop inside the scaled source.
///
/// The source is scaled to the target width with an unbounded height. If the
/// result is taller than the target, the band starts halfway into the excess
/// (rounded down); otherwise the whole image is kept and the offset is 0.
///
/// # Examples
/// ```
/// # use breakfit::transform::{center_crop_offset, Dimensions};
/// // 1000x1000 scaled to 400 wide is 400 tall; a 225 band starts at 87
/// assert_eq!(center_crop_offset(Dimensions::new(1000, 1000), 400, 225), 87);
/// ```
pub fn center_crop_offset(natural: Dimensions, target_width: u32, target_height: u32) -> u32 {
    if natural.is_zero() {
        return 0;
    }
    let (_, scaled_height) = constrain_dimensions(
        (natural.width, natural.height),
        (target_width, UNBOUNDED_HEIGHT),
    );
    if scaled_height > target_height {
        (scaled_height - target_height) / 2
    } else {
        0
    }
}
