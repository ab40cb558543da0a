//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the largest size that fits inside `bounds` without changing the
/// aspect ratio of `source`.
///
/// Returns `None` when the source already fits, so callers can skip the
/// resample entirely. Images are never scaled up.
///
/// The side constrained by the box is taken as-is; the other side is either
/// the floor or the ceiling of the proportional value, whichever keeps the
/// ratio closest to the source. It never drops below 1.
///
/// # Examples
/// ```
/// # use imagen::imaging::fit_within;
/// // 200x400 portrait into a 100x100 box → 50x100
/// assert_eq!(fit_within((200, 400), (100, 100)), Some((50, 100)));
///
/// // Already fits → nothing to do
/// assert_eq!(fit_within((80, 60), (100, 100)), None);
/// ```
pub fn fit_within(source: (u32, u32), bounds: (u32, u32)) -> Option<(u32, u32)> {
    let (src_w, src_h) = source;
    let (box_w, box_h) = bounds;

    if box_w >= src_w && box_h >= src_h {
        return None;
    }

    let aspect = src_w as f64 / src_h as f64;

    if box_w as f64 / box_h as f64 >= aspect {
        // Box is wider than the image: height is the constraint
        let exact = box_h as f64 * aspect;
        let w = closest_side(exact, |w| (aspect - w / box_h as f64).abs());
        Some((w, box_h))
    } else {
        // Box is taller than the image: width is the constraint
        let exact = box_w as f64 / aspect;
        let h = closest_side(exact, |h| {
            if h == 0.0 {
                0.0
            } else {
                (aspect - box_w as f64 / h).abs()
            }
        });
        Some((box_w, h))
    }
}

/// Pick floor or ceil of `exact`, whichever scores lower. Clamped to ≥ 1.
fn closest_side(exact: f64, error: impl Fn(f64) -> f64) -> u32 {
    let floor = exact.floor();
    let ceil = exact.ceil();
    let best = if error(ceil) < error(floor) { ceil } else { floor };
    (best as u32).max(1)
}

/// Total pixel count, widened so it cannot overflow.
pub fn pixel_count(width: u32, height: u32) -> u64 {
    width as u64 * height as u64
}
