//! Pareto filtering of rate-quality points.
//!
//! A point is dominated when some other point reaches at least its quality
//! at no more bitrate. Dropping dominated points leaves a sequence that is
//! strictly increasing in both bitrate and quality, which is what the hull
//! scan expects.

use super::HullPoint;

impl HullPoint {
    /// Check if this point dominates another.
    ///
    /// A point dominates another if it's better on at least one objective
    /// and not worse on any objective.
    ///
    /// Objectives:
    /// - Lower bitrate is better
    /// - Higher quality is better
    #[must_use]
    pub fn dominates(&self, other: &Self) -> bool {
        let better_or_equal_rate = self.x <= other.x;
        let better_or_equal_quality = self.y >= other.y;
        let strictly_better = self.x < other.x || self.y > other.y;

        better_or_equal_rate && better_or_equal_quality && strictly_better
    }
}

/// Non-dominated points of an RD table, in table order.
#[derive(Debug, Clone, Default)]
pub struct ParetoFront {
    /// Surviving points, strictly increasing in bitrate and quality.
    pub points: Vec<HullPoint>,
}

impl ParetoFront {
    /// Filter points given in table order (ascending bitrate, descending
    /// quality within equal bitrate).
    ///
    /// A point is dropped when its quality does not exceed the best quality
    /// seen so far. The first point always survives.
    ///
    /// # Example
    ///
    /// ```
    /// use bitrate_ladder::ladder::{HullPoint, ParetoFront};
    ///
    /// let points = [
    ///     HullPoint::new(0, 1000.0, 80.0),
    ///     HullPoint::new(1, 2000.0, 78.0),
    ///     HullPoint::new(2, 3000.0, 90.0),
    /// ];
    /// let front = ParetoFront::compute(&points);
    /// assert_eq!(front.indices(), vec![0, 2]);
    /// ```
    #[must_use]
    pub fn compute(points: &[HullPoint]) -> Self {
        let mut best_quality = f64::NEG_INFINITY;
        let mut front = Vec::with_capacity(points.len());

        for point in points {
            if point.y <= best_quality {
                continue;
            }
            best_quality = point.y;
            front.push(*point);
        }

        Self { points: front }
    }

    /// Table indices of the surviving points.
    #[must_use]
    pub fn indices(&self) -> Vec<usize> {
        self.points.iter().map(|p| p.index).collect()
    }

    /// Check if the front is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get the number of points on the front.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the table point at `index` survived.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.points.iter().any(|p| p.index == index)
    }
}
