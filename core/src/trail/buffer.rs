use crate::prelude::{Extent, Fix, PlanarPoint};
use std::collections::VecDeque;

/// Capacity-bounded trail of projected fixes, oldest first.
#[derive(Debug, Clone)]
pub struct TrailBuffer {
    fixes: VecDeque<Fix>,
    capacity: usize,
}

impl TrailBuffer {
    /// Smallest pad applied to each axis of the extent.
    pub const MIN_PAD: f64 = 25.0;
    /// Pad as a fraction of each axis's span.
    pub const PAD_FRACTION: f64 = 0.2;

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            fixes: VecDeque::with_capacity(capacity.min(4096)),
            capacity,
        }
    }

    /// Appends a fix, evicting from the front past capacity. Returns the
    /// number of evicted fixes.
    pub fn append(&mut self, fix: Fix) -> usize {
        self.fixes.push_back(fix);
        let mut evicted = 0;
        while self.fixes.len() > self.capacity {
            self.fixes.pop_front();
            evicted += 1;
        }
        evicted
    }

    pub fn latest(&self) -> Option<&Fix> {
        self.fixes.back()
    }

    pub fn latest_point(&self) -> Option<PlanarPoint> {
        self.latest().and_then(|fix| fix.planar)
    }

    /// Padded bounding box of all projected points, `None` when empty.
    pub fn current_extent(&self) -> Option<Extent> {
        let mut points = self.points();
        let first = points.next()?;
        let init = Extent {
            min_x: first.x,
            max_x: first.x,
            min_y: first.y,
            max_y: first.y,
        };
        let bounds = points.fold(init, |acc, p| Extent {
            min_x: acc.min_x.min(p.x),
            max_x: acc.max_x.max(p.x),
            min_y: acc.min_y.min(p.y),
            max_y: acc.max_y.max(p.y),
        });

        let pad_x = Self::MIN_PAD.max(bounds.width() * Self::PAD_FRACTION);
        let pad_y = Self::MIN_PAD.max(bounds.height() * Self::PAD_FRACTION);
        Some(Extent {
            min_x: bounds.min_x - pad_x,
            max_x: bounds.max_x + pad_x,
            min_y: bounds.min_y - pad_y,
            max_y: bounds.max_y + pad_y,
        })
    }

    /// Trail coordinates as separate x and y arrays, oldest first.
    pub fn coordinates(&self) -> (Vec<f64>, Vec<f64>) {
        self.points().map(|p| (p.x, p.y)).unzip()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fix> {
        self.fixes.iter()
    }

    pub fn len(&self) -> usize {
        self.fixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn points(&self) -> impl Iterator<Item = PlanarPoint> + '_ {
        self.fixes.iter().filter_map(|fix| fix.planar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn fix_at(x: f64, y: f64) -> Fix {
        Fix {
            timestamp: Utc::now(),
            latitude_deg: y,
            longitude_deg: x,
            bearing_raw: None,
            speed_raw: None,
            altitude_raw: None,
            link: None,
            planar: Some(PlanarPoint::new(x, y)),
        }
    }

    #[test]
    fn keeps_only_most_recent_in_order() {
        let mut trail = TrailBuffer::with_capacity(3);
        let evicted: usize = (0..5).map(|i| trail.append(fix_at(i as f64, 0.0))).sum();
        let xs: Vec<f64> = trail.iter().map(|f| f.longitude_deg).collect();
        assert_eq!(xs, vec![2.0, 3.0, 4.0]);
        assert_eq!(evicted, 2);
        assert_eq!(trail.latest().map(|f| f.longitude_deg), Some(4.0));
    }

    #[test]
    fn empty_trail_has_no_extent_or_latest() {
        let trail = TrailBuffer::with_capacity(2);
        assert!(trail.current_extent().is_none());
        assert!(trail.latest().is_none());
        assert!(trail.is_empty());
    }

    #[test]
    fn single_point_extent_uses_minimum_pad() {
        let mut trail = TrailBuffer::with_capacity(1);
        trail.append(fix_at(100.0, 200.0));
        let extent = trail.current_extent().unwrap();
        assert_eq!(extent.min_x, 75.0);
        assert_eq!(extent.max_x, 125.0);
        assert_eq!(extent.min_y, 175.0);
        assert_eq!(extent.max_y, 225.0);
    }

    #[test]
    fn wide_spans_pad_by_fraction_per_axis() {
        let mut trail = TrailBuffer::with_capacity(10);
        trail.append(fix_at(0.0, 0.0));
        trail.append(fix_at(1000.0, 50.0));
        let extent = trail.current_extent().unwrap();
        assert_eq!(extent.min_x, -200.0);
        assert_eq!(extent.max_x, 1200.0);
        assert_eq!(extent.min_y, -25.0);
        assert_eq!(extent.max_y, 75.0);
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        let mut trail = TrailBuffer::with_capacity(0);
        trail.append(fix_at(1.0, 1.0));
        trail.append(fix_at(2.0, 2.0));
        assert_eq!(trail.len(), 1);
        assert_eq!(trail.capacity(), 1);
    }

    #[test]
    fn coordinates_follow_trail_order() {
        let mut trail = TrailBuffer::with_capacity(5);
        trail.append(fix_at(1.0, 10.0));
        trail.append(fix_at(2.0, 20.0));
        assert_eq!(trail.coordinates(), (vec![1.0, 2.0], vec![10.0, 20.0]));
    }
}
