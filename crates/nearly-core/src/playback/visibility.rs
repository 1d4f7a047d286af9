//! Intersection-ratio visibility.

/// Number of intersection thresholds observed per element.
pub const INTERSECTION_STEPS: usize = 11;

/// Thresholds `0.0, 0.1, ..., 1.0` for smooth visibility tracking.
pub fn intersection_thresholds() -> [f64; INTERSECTION_STEPS] {
    let mut thresholds = [0.0; INTERSECTION_STEPS];
    for (i, t) in thresholds.iter_mut().enumerate() {
        *t = i as f64 / (INTERSECTION_STEPS - 1) as f64;
    }
    thresholds
}

/// An element counts as visible when it intersects the viewport by at least
/// `threshold` of its area.
pub fn is_visible(is_intersecting: bool, ratio: f64, threshold: f64) -> bool {
    is_intersecting && ratio >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds_cover_unit_interval() {
        let t = intersection_thresholds();
        assert_eq!(t.len(), 11);
        assert_eq!(t[0], 0.0);
        assert_eq!(t[10], 1.0);
        assert!((t[6] - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_visibility_requires_intersection_and_ratio() {
        assert!(is_visible(true, 0.6, 0.6));
        assert!(!is_visible(true, 0.59, 0.6));
        assert!(!is_visible(false, 1.0, 0.6));
    }
}
