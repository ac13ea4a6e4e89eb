//! Items, placements, and the layout result.
//!
//! Everything here is plain data in `f64` pixels. A [`LayoutResult`] either
//! holds one [`Placement`] per input [`Item`] or is empty; there is no partial
//! result.
//!
//! # Example
//!
//! ```
//! use zenjustify::{Item, partition, AspectRatio};
//!
//! let items = [Item::new(1.5), Item::new(1.0), Item::new(1.5)];
//! let result = partition(&items, 600.0, 250.0, AspectRatio::new(4, 3), 1.0);
//!
//! assert_eq!(result.positions.len(), 3);
//! assert_eq!(result.row_count(), 1);
//! assert!((result.total_height - 149.5).abs() < 1e-9);
//! ```

use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use num_traits::Float;

use crate::ratio::AspectRatio;

/// An image reduced to the only property the layout engine reads.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Item {
    /// `width / height`. Must be finite and positive to take part in a row.
    pub ratio: f64,
}

impl Item {
    /// Create an item from a precomputed width/height ratio.
    pub const fn new(ratio: f64) -> Self {
        Self { ratio }
    }

    /// Create an item from pixel dimensions.
    ///
    /// Returns `None` for a zero dimension, which would make the ratio
    /// zero or infinite.
    pub fn from_dimensions(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self::new(width as f64 / height as f64))
    }

    /// Whether the ratio is finite and positive.
    pub fn is_usable(&self) -> bool {
        self.ratio.is_finite() && self.ratio > 0.0
    }
}

/// Position and size of one item, relative to the container's top-left.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Placement {
    /// Right edge (`x + width`).
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (`y + height`).
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Whether this placement opens a new row.
    pub fn starts_row(&self) -> bool {
        self.x == 0.0
    }
}

/// Contiguous run of placements sharing one `y` and one height.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RowSpan {
    /// Index of the first placement in the row.
    pub start: usize,
    /// One past the last placement in the row.
    pub end: usize,
    /// Top edge of the row.
    pub y: f64,
    /// Height shared by every item in the row.
    pub height: f64,
}

impl RowSpan {
    /// Number of items in the row.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Always false for spans produced by [`LayoutResult::rows`].
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Computed arrangement: one placement per item, or nothing at all.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutResult {
    /// Placements in the same order as the input items.
    pub positions: Vec<Placement>,
    /// Bottom edge of the last row. Zero when `positions` is empty.
    pub total_height: f64,
}

impl LayoutResult {
    /// The empty result: returned for empty input and for failure.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether no placements were produced.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of placements.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Block aspect ratio `container_width / total_height`.
    ///
    /// `None` when the result is empty or the height is not a usable divisor.
    pub fn block_ratio(&self, container_width: f64) -> Option<f64> {
        if self.is_empty() || !self.total_height.is_finite() || self.total_height <= 0.0 {
            return None;
        }
        let ratio = container_width / self.total_height;
        ratio.is_finite().then_some(ratio)
    }

    /// Absolute distance between the block ratio and `target`.
    pub fn ratio_error(&self, container_width: f64, target: AspectRatio) -> Option<f64> {
        self.block_ratio(container_width)
            .map(|ratio| (ratio - target.value()).abs())
    }

    /// Iterate over rows, top to bottom.
    pub fn rows(&self) -> Rows<'_> {
        Rows {
            positions: &self.positions,
            next: 0,
        }
    }

    /// Number of rows. A row starts at every placement with `x == 0`.
    pub fn row_count(&self) -> usize {
        self.positions.iter().filter(|p| p.starts_row()).count()
    }

    /// Height of each row, top to bottom.
    pub fn row_heights(&self) -> Vec<f64> {
        self.positions
            .iter()
            .filter(|p| p.starts_row())
            .map(|p| p.height)
            .collect()
    }

    /// Population variance of the row heights. Zero for fewer than two rows.
    pub fn row_height_variance(&self) -> f64 {
        let heights = self.row_heights();
        if heights.is_empty() {
            return 0.0;
        }
        let n = heights.len() as f64;
        let mean = heights.iter().sum::<f64>() / n;
        heights.iter().map(|h| (h - mean) * (h - mean)).sum::<f64>() / n
    }
}

/// Iterator over the rows of a [`LayoutResult`].
pub struct Rows<'a> {
    positions: &'a [Placement],
    next: usize,
}

impl Iterator for Rows<'_> {
    type Item = RowSpan;

    fn next(&mut self) -> Option<RowSpan> {
        let first = self.positions.get(self.next)?;
        let start = self.next;
        let mut end = start + 1;
        while end < self.positions.len() && !self.positions[end].starts_row() {
            end += 1;
        }
        self.next = end;
        Some(RowSpan {
            start,
            end,
            y: first.y,
            height: first.height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn two_rows() -> LayoutResult {
        // Row 0: two squares of 100. Row 1: one 2:1 item of height 50.
        LayoutResult {
            positions: vec![
                Placement {
                    x: 0.0,
                    y: 0.0,
                    width: 100.0,
                    height: 100.0,
                },
                Placement {
                    x: 101.0,
                    y: 0.0,
                    width: 100.0,
                    height: 100.0,
                },
                Placement {
                    x: 0.0,
                    y: 101.0,
                    width: 100.0,
                    height: 50.0,
                },
            ],
            total_height: 151.0,
        }
    }

    #[test]
    fn item_from_dimensions() {
        assert_eq!(Item::from_dimensions(300, 200), Some(Item::new(1.5)));
        assert_eq!(Item::from_dimensions(0, 200), None);
        assert_eq!(Item::from_dimensions(300, 0), None);
    }

    #[test]
    fn item_usable() {
        assert!(Item::new(0.75).is_usable());
        assert!(!Item::new(0.0).is_usable());
        assert!(!Item::new(-1.0).is_usable());
        assert!(!Item::new(f64::NAN).is_usable());
        assert!(!Item::new(f64::INFINITY).is_usable());
    }

    #[test]
    fn rows_split_on_zero_x() {
        let result = two_rows();
        let rows: Vec<RowSpan> = result.rows().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!((rows[0].start, rows[0].end), (0, 2));
        assert_eq!((rows[1].start, rows[1].end), (2, 3));
        assert_eq!(rows[1].y, 101.0);
        assert_eq!(rows[1].height, 50.0);
        assert_eq!(result.row_count(), 2);
    }

    #[test]
    fn row_heights_and_variance() {
        let result = two_rows();
        assert_eq!(result.row_heights(), vec![100.0, 50.0]);
        // mean 75, deviations ±25
        assert!((result.row_height_variance() - 625.0).abs() < 1e-12);
    }

    #[test]
    fn block_ratio_of_empty_is_none() {
        assert_eq!(LayoutResult::empty().block_ratio(100.0), None);
        assert_eq!(LayoutResult::empty().row_height_variance(), 0.0);
        assert_eq!(LayoutResult::empty().rows().count(), 0);
    }

    #[test]
    fn ratio_error_against_target() {
        let result = two_rows();
        let err = result
            .ratio_error(302.0, AspectRatio::new(2, 1))
            .unwrap();
        assert!(err.abs() < 1e-12);
    }
}
