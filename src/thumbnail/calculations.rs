//! Dimension math for aspect-ratio-preserving resizes

/// Size of the thumbnail for a `width` x `height` image at `target_width`
///
/// The height scales by `target_width / width` and is rounded down. Returns
/// `None` when the rounded height is zero (very wide images at small widths)
/// or the source has no width.
///
/// # Examples
///
/// ```
/// use thumbnail_maker::thumbnail::target_dimensions;
///
/// assert_eq!(target_dimensions(200, 100, 32), Some((32, 16)));
/// assert_eq!(target_dimensions(50, 50, 200), Some((200, 200)));
/// assert_eq!(target_dimensions(1000, 10, 32), None);
/// ```
#[must_use]
pub fn target_dimensions(width: u32, height: u32, target_width: u32) -> Option<(u32, u32)> {
    if width == 0 {
        return None;
    }
    let hpercent = f64::from(target_width) / f64::from(width);
    let target_height = (f64::from(height) * hpercent).floor() as u32;
    (target_height > 0).then_some((target_width, target_height))
}
