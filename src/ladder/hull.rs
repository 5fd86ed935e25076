//! Upper convex hull of a Pareto front in (bitrate, quality) space.

use super::HullPoint;

/// Cross product of `(mid - first) x (p - first)`.
///
/// Negative when `mid` lies strictly above the line from `first` to `p`,
/// zero when the three points are collinear.
#[must_use]
pub fn cross(first: &HullPoint, mid: &HullPoint, p: &HullPoint) -> f64 {
    (mid.x - first.x) * (p.y - first.y) - (mid.y - first.y) * (p.x - first.x)
}

/// Whether `mid` lies on the line through `first` and `p`, up to rounding.
#[must_use]
pub fn is_collinear(first: &HullPoint, mid: &HullPoint, p: &HullPoint) -> bool {
    let lhs = (mid.x - first.x) * (p.y - first.y);
    let rhs = (mid.y - first.y) * (p.x - first.x);
    let scale = lhs.abs().max(rhs.abs()).max(f64::MIN_POSITIVE);
    (lhs - rhs).abs() <= 1e-9 * scale
}

/// Compute the upper hull of a Pareto-filtered sequence with a monotone
/// chain scan.
///
/// Points whose turn is not strictly concave-down are popped, so collinear
/// middle points are removed. Sequences of one or two points are returned
/// unchanged.
///
/// # Example
///
/// ```
/// use bitrate_ladder::ladder::{HullPoint, upper_hull};
///
/// let front = [
///     HullPoint::new(0, 1000.0, 70.0),
///     HullPoint::new(1, 2000.0, 80.0),
///     HullPoint::new(2, 3000.0, 88.0),
///     HullPoint::new(3, 4000.0, 89.0),
///     HullPoint::new(4, 5000.0, 95.0),
/// ];
/// let hull: Vec<usize> = upper_hull(&front).iter().map(|p| p.index).collect();
/// assert_eq!(hull, vec![0, 1, 2, 4]);
/// ```
#[must_use]
pub fn upper_hull(points: &[HullPoint]) -> Vec<HullPoint> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let mut stack: Vec<HullPoint> = Vec::with_capacity(points.len());
    stack.extend_from_slice(&points[..2]);

    for p in &points[2..] {
        while stack.len() >= 2 {
            let first = &stack[stack.len() - 2];
            let mid = &stack[stack.len() - 1];
            if cross(first, mid, p) < 0.0 {
                break;
            }
            stack.pop();
        }
        stack.push(*p);
    }

    stack
}

/// Quality gained per kbps between two points.
#[must_use]
pub fn slope(from: &HullPoint, to: &HullPoint) -> f64 {
    (to.y - from.y) / (to.x - from.x)
}
