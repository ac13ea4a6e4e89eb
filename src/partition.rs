//! Optimal row breaking.
//!
//! Rows are chosen by dynamic programming over split points, the same shape
//! as paragraph line breaking: `costs[i]` is the cheapest way to lay out the
//! first `i` items, and each candidate last row `items[j-1..i)` adds its own
//! [`RowCostPolicy::row_cost`](crate::RowCostPolicy::row_cost). The lookback is
//! bounded by [`LayoutConfig::dp_window`], so a call is `O(n · window)`.
//!
//! Every row is justified: its height is whatever makes the items plus gaps
//! exactly span the container width.
//!
//! [`JustifiedLayout::partition_to_height`] runs the same DP with the running
//! block height as a second, bucketed dimension, so it can pick the most even
//! rows among layouts whose total height falls in a given range.

use alloc::collections::BTreeMap;
use alloc::vec;
use alloc::vec::Vec;

use crate::config::{LayoutConfig, usable};
use crate::geometry::{Item, LayoutResult, Placement};
use crate::policy;
use crate::ratio::{AspectRatio, TargetFamily};

/// Lay out `items` in rows of height near `ideal_height`, using default
/// weights and the given gap.
///
/// Returns the empty result for empty input and when no row can be resolved.
pub fn partition(
    items: &[Item],
    container_width: f64,
    ideal_height: f64,
    target: AspectRatio,
    gap: f64,
) -> LayoutResult {
    let config = LayoutConfig::default().gap(gap);
    JustifiedLayout::new(&config, container_width, target).partition(items, ideal_height)
}

/// Cheapest prefix layout found whose bottom edge falls in one height bucket.
#[derive(Copy, Clone, Debug)]
struct Bucket {
    cost: f64,
    /// Top edge of the next row: the prefix's bottom edge plus the gap.
    next_y: f64,
    /// 1-based start of the prefix's last row.
    start: usize,
    /// Bucket of the prefix before the last row.
    prev: usize,
}

/// Row partitioner bound to a container width and target ratio.
#[derive(Clone, Debug)]
pub struct JustifiedLayout<'a> {
    config: &'a LayoutConfig,
    container_width: f64,
    target: AspectRatio,
    family: TargetFamily,
}

impl<'a> JustifiedLayout<'a> {
    pub fn new(config: &'a LayoutConfig, container_width: f64, target: AspectRatio) -> Self {
        Self {
            config,
            container_width,
            target,
            family: target.family(),
        }
    }

    pub fn container_width(&self) -> f64 {
        self.container_width
    }

    pub fn target(&self) -> AspectRatio {
        self.target
    }

    /// Partition `items` into rows and compute every placement.
    pub fn partition(&self, items: &[Item], ideal_height: f64) -> LayoutResult {
        if items.is_empty() {
            return LayoutResult::empty();
        }
        let starts = self.row_starts(items, ideal_height);
        let rows = self.backtrack(&starts, items.len());
        self.place(items, &rows)
    }

    /// Partition `items` so the block height lands in `height_range`, with
    /// rows as close to `ideal_height` as that allows.
    ///
    /// Prefix layouts are grouped by running height into `bins` buckets up to
    /// the top of the range, and each bucket keeps only its cheapest prefix,
    /// so a call is `O(n · window · bins)`. Rows are scored by
    /// [`RowCostPolicy::height_cost`](crate::RowCostPolicy::height_cost)
    /// alone. The cheapest complete layout inside the range wins. If none
    /// reaches the range, the one closest to the target ratio is returned.
    ///
    /// Returns the empty result for empty input, zero `bins`, an unusable
    /// range, or when no complete layout stays under the top of the range.
    pub fn partition_to_height(
        &self,
        items: &[Item],
        ideal_height: f64,
        (min_height, max_height): (f64, f64),
        bins: usize,
    ) -> LayoutResult {
        if items.is_empty()
            || bins == 0
            || !usable(min_height)
            || !usable(max_height)
            || min_height > max_height
        {
            return LayoutResult::empty();
        }
        let n = items.len();
        let window = self.config.dp_window.max(1);
        let gap = self.config.gap;
        let bucket_size = max_height / bins as f64;

        let mut states: Vec<BTreeMap<usize, Bucket>> =
            (0..=n).map(|_| BTreeMap::new()).collect();
        states[0].insert(
            0,
            Bucket {
                cost: 0.0,
                next_y: 0.0,
                start: 0,
                prev: 0,
            },
        );

        for i in 1..=n {
            let (done, rest) = states.split_at_mut(i);
            let current = &mut rest[0];
            for j in i.saturating_sub(window).max(1)..=i {
                let prefix = &done[j - 1];
                if prefix.is_empty() {
                    continue;
                }
                let Some(h) = self.row_height(&items[j - 1..i]) else {
                    continue;
                };
                let row_cost = self.config.row_cost.height_cost(h, ideal_height);
                for (&bin, cell) in prefix {
                    let bottom = cell.next_y + h;
                    if bottom > max_height {
                        continue;
                    }
                    let cost = cell.cost + row_cost;
                    let key = (bottom / bucket_size) as usize;
                    // Strict: the first prefix to reach a bucket keeps ties.
                    if current.get(&key).is_some_and(|kept| kept.cost <= cost) {
                        continue;
                    }
                    current.insert(
                        key,
                        Bucket {
                            cost,
                            next_y: bottom + gap,
                            start: j,
                            prev: bin,
                        },
                    );
                }
            }
        }

        let target = self.target.value();
        // (inside the range, cost or ratio error, bucket)
        let mut chosen: Option<(bool, f64, usize)> = None;
        for (&bin, cell) in &states[n] {
            let total = cell.next_y - gap;
            let inside = total >= min_height;
            let key = if inside {
                cell.cost
            } else {
                (self.container_width / total - target).abs()
            };
            let better = match chosen {
                None => true,
                Some((was_inside, kept, _)) => {
                    (inside && !was_inside) || (inside == was_inside && key < kept)
                }
            };
            if better {
                chosen = Some((inside, key, bin));
            }
        }
        let Some((_, _, mut bin)) = chosen else {
            return LayoutResult::empty();
        };

        let mut rows = Vec::new();
        let mut end = n;
        while end > 0 {
            let Some(cell) = states[end].get(&bin) else {
                return LayoutResult::empty();
            };
            rows.push((cell.start - 1, end));
            bin = cell.prev;
            end = cell.start - 1;
        }
        rows.reverse();
        self.place(items, &rows)
    }

    /// Height of a justified row, or `None` if the row cannot be laid out.
    fn row_height(&self, row: &[Item]) -> Option<f64> {
        let gap_space = self.config.gap * (row.len() - 1) as f64;
        if self.container_width <= gap_space {
            return None;
        }
        if !row.iter().all(Item::is_usable) {
            return None;
        }
        let sum: f64 = row.iter().map(|item| item.ratio).sum();
        if !sum.is_finite() {
            return None;
        }
        let h = (self.container_width - gap_space) / sum;
        (h.is_finite() && h > 0.0).then_some(h)
    }

    /// Forward DP pass. `starts[i]` is the 1-based start of the last row in
    /// the best layout of the first `i` items, or 0 if there is none.
    fn row_starts(&self, items: &[Item], ideal_height: f64) -> Vec<usize> {
        let n = items.len();
        let window = self.config.dp_window.max(1);
        let target = self.target.value();
        let mut costs = vec![f64::INFINITY; n + 1];
        let mut starts = vec![0usize; n + 1];
        costs[0] = 0.0;

        for i in 1..=n {
            let mut min_cost = f64::INFINITY;
            let mut best = 0;
            for j in i.saturating_sub(window).max(1)..=i {
                let before = costs[j - 1];
                if !before.is_finite() {
                    continue;
                }
                let Some(h) = self.row_height(&items[j - 1..i]) else {
                    continue;
                };
                let cost = before
                    + self.config.row_cost.row_cost(
                        h,
                        ideal_height,
                        self.container_width,
                        target,
                        self.family,
                        self.config.near_match_tolerance,
                    );
                // Strict: the first minimum found wins ties.
                if cost < min_cost {
                    min_cost = cost;
                    best = j;
                }
            }
            costs[i] = min_cost;
            starts[i] = best;
        }
        starts
    }

    /// Recover `(start, end)` index pairs, top row first.
    fn backtrack(&self, starts: &[usize], n: usize) -> Vec<(usize, usize)> {
        let fallback_len = self
            .config
            .fallback_row_len
            .unwrap_or_else(|| policy::fallback_row_len(self.family))
            .max(1);
        let mut rows = Vec::new();
        let mut current = n;
        while current > 0 {
            let mut start = starts[current];
            if start == 0 || start > current {
                start = (current + 1).saturating_sub(fallback_len).max(1);
                log::trace!("fallback split at {current}: row starts at item {start}");
            }
            rows.push((start - 1, current));
            current = start - 1;
        }
        rows.reverse();
        rows
    }

    /// Forward placement pass over recovered rows.
    fn place(&self, items: &[Item], rows: &[(usize, usize)]) -> LayoutResult {
        let gap = self.config.gap;
        let mut positions = Vec::with_capacity(items.len());
        let mut y = 0.0;
        for &(start, end) in rows {
            let row = &items[start..end];
            let Some(h) = self.row_height(row) else {
                return LayoutResult::empty();
            };
            let mut x = 0.0;
            for item in row {
                let width = h * item.ratio;
                positions.push(Placement {
                    x,
                    y,
                    width,
                    height: h,
                });
                x += width + gap;
            }
            y += h + gap;
        }
        let total_height = y - gap;
        if !total_height.is_finite() || total_height <= 0.0 {
            return LayoutResult::empty();
        }
        LayoutResult {
            positions,
            total_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(ratios: &[f64]) -> Vec<Item> {
        ratios.iter().copied().map(Item::new).collect()
    }

    // ── row height ──────────────────────────────────────────────────────

    #[test]
    fn row_height_fills_width() {
        let config = LayoutConfig::default();
        let layout = JustifiedLayout::new(&config, 600.0, AspectRatio::STANDARD);
        let h = layout.row_height(&items(&[1.5, 1.0, 1.5])).unwrap();
        assert!((h - 149.5).abs() < 1e-12);
    }

    #[test]
    fn row_height_rejects_degenerate_rows() {
        let config = LayoutConfig::default().gap(10.0);
        let layout = JustifiedLayout::new(&config, 20.0, AspectRatio::STANDARD);
        // 3 items need 20 px of gaps: nothing left for content.
        assert_eq!(layout.row_height(&items(&[1.0, 1.0, 1.0])), None);
        assert_eq!(layout.row_height(&items(&[f64::NAN])), None);
        assert_eq!(layout.row_height(&items(&[0.0])), None);
        assert_eq!(layout.row_height(&items(&[-1.0])), None);
        // A negative ratio poisons the row even when the sum stays positive.
        assert_eq!(layout.row_height(&items(&[2.0, -0.5])), None);
        assert!(layout.row_height(&items(&[1.0])).is_some());
    }

    // ── partition ───────────────────────────────────────────────────────

    #[test]
    fn single_row_when_it_fits() {
        let result = partition(&items(&[1.5, 1.0, 1.5]), 600.0, 250.0, AspectRatio::STANDARD, 1.0);
        assert_eq!(result.positions.len(), 3);
        assert!(result.positions.iter().all(|p| p.y == 0.0));
        assert_eq!(result.positions[0].x, 0.0);
        assert!((result.positions[1].x - 225.25).abs() < 1e-9);
        assert!((result.positions[2].x - 375.75).abs() < 1e-9);
        assert!((result.positions[2].right() - 600.0).abs() < 1e-9);
        assert!((result.total_height - 149.5).abs() < 1e-9);
    }

    #[test]
    fn empty_input_is_empty_success() {
        let result = partition(&[], 600.0, 250.0, AspectRatio::STANDARD, 1.0);
        assert!(result.is_empty());
        assert_eq!(result.total_height, 0.0);
    }

    #[test]
    fn nan_only_gallery_fails() {
        let result = partition(&items(&[f64::NAN]), 600.0, 250.0, AspectRatio::STANDARD, 1.0);
        assert!(result.is_empty());
        assert_eq!(result.total_height, 0.0);
    }

    #[test]
    fn nan_anywhere_fails_whole_layout() {
        let result = partition(
            &items(&[1.0, 1.2, f64::NAN, 0.8]),
            800.0,
            200.0,
            AspectRatio::STANDARD,
            1.0,
        );
        assert!(result.is_empty());
    }

    #[test]
    fn zero_width_container_fails() {
        let result = partition(&items(&[1.0, 1.0]), 0.0, 200.0, AspectRatio::STANDARD, 1.0);
        assert!(result.is_empty());
    }

    #[test]
    fn gap_wider_than_container_forces_single_item_rows() {
        // Two items can never share a row: 10 px container, 10 px gap.
        let result = partition(&items(&[1.0, 2.0]), 10.0, 5.0, AspectRatio::STANDARD, 10.0);
        assert_eq!(result.row_count(), 2);
        assert_eq!(result.positions[1].y, 10.0 + 10.0);
        assert!((result.total_height - (10.0 + 10.0 + 5.0)).abs() < 1e-12);
    }

    #[test]
    fn window_bounds_row_length() {
        // A zero window is floored to 1: j in [i-1, i], so rows of at most two.
        let config = LayoutConfig::default().dp_window(0);
        let layout = JustifiedLayout::new(&config, 300.0, AspectRatio::STANDARD);
        let result = layout.partition(&items(&[0.2; 7]), 1000.0);
        assert_eq!(result.positions.len(), 7);
        assert!(result.rows().all(|row| row.len() <= 2));
        assert!(result.row_count() >= 4);
    }

    // ── backtracking fallback ───────────────────────────────────────────

    #[test]
    fn backtrack_follows_recorded_starts() {
        let config = LayoutConfig::default();
        let layout = JustifiedLayout::new(&config, 100.0, AspectRatio::STANDARD);
        // rows [1..=2], [3..=5]
        let starts = [0, 1, 1, 3, 3, 3];
        assert_eq!(layout.backtrack(&starts, 5), vec![(0, 2), (2, 5)]);
    }

    #[test]
    fn backtrack_fallback_uses_family_row_len() {
        let config = LayoutConfig::default();
        let standard = JustifiedLayout::new(&config, 100.0, AspectRatio::STANDARD);
        let wide = JustifiedLayout::new(&config, 100.0, AspectRatio::WIDESCREEN);
        let starts = [0usize; 13];
        assert_eq!(
            standard.backtrack(&starts, 12),
            vec![(0, 2), (2, 7), (7, 12)]
        );
        assert_eq!(wide.backtrack(&starts, 12), vec![(0, 6), (6, 12)]);
    }

    #[test]
    fn backtrack_fallback_override() {
        let config = LayoutConfig::default().fallback_row_len(2);
        let layout = JustifiedLayout::new(&config, 100.0, AspectRatio::STANDARD);
        let starts = [0usize; 6];
        assert_eq!(layout.backtrack(&starts, 5), vec![(0, 1), (1, 3), (3, 5)]);
    }

    #[test]
    fn backtrack_rejects_start_past_current() {
        let config = LayoutConfig::default();
        let layout = JustifiedLayout::new(&config, 100.0, AspectRatio::STANDARD);
        // starts[3] = 7 is inconsistent; default split takes all three.
        let starts = [0, 1, 2, 7];
        assert_eq!(layout.backtrack(&starts, 3), vec![(0, 3)]);
    }

    // ── height-constrained partition ────────────────────────────────────

    fn row_lengths(result: &LayoutResult) -> Vec<usize> {
        result.rows().map(|row| row.len()).collect()
    }

    #[test]
    fn to_height_lands_in_range() {
        // Twelve squares in 1000 px: 4+4+4 stacks to 750, any order of
        // 3+4+5 to 783.3. Only the latter fits 770..800.
        let config = LayoutConfig::default().gap(0.0);
        let layout = JustifiedLayout::new(&config, 1000.0, AspectRatio::from_value(1.28).unwrap());
        let squares = items(&[1.0; 12]);
        let plain = layout.partition(&squares, 250.0);
        assert!(plain.total_height < 770.0 || plain.total_height > 800.0);

        let result = layout.partition_to_height(&squares, 250.0, (770.0, 800.0), 200);
        assert_eq!(result.positions.len(), 12);
        assert!(result.total_height >= 770.0 && result.total_height <= 800.0);
        let mut lengths = row_lengths(&result);
        lengths.sort_unstable();
        assert_eq!(lengths, vec![3, 4, 5]);
    }

    #[test]
    fn to_height_prefers_even_rows() {
        // Six squares in 1000 px: 2+2+2 stacks three 500 px rows (1500), any
        // order of 1+2+3 stacks 1000 + 500 + 333 (1833). Both fit the range.
        let config = LayoutConfig::default().gap(0.0);
        let layout = JustifiedLayout::new(&config, 1000.0, AspectRatio::from_value(0.6).unwrap());
        let result = layout.partition_to_height(&items(&[1.0; 6]), 500.0, (1400.0, 1900.0), 100);
        assert_eq!(row_lengths(&result), vec![2, 2, 2]);
        assert!(result.row_heights().iter().all(|h| (h - 500.0).abs() < 1e-9));
    }

    #[test]
    fn to_height_falls_back_to_closest() {
        // Nothing stacks to 650..700; two rows of 2 and 10 reach 600.
        let config = LayoutConfig::default().gap(0.0);
        let layout =
            JustifiedLayout::new(&config, 1000.0, AspectRatio::from_value(1000.0 / 675.0).unwrap());
        let result = layout.partition_to_height(&items(&[1.0; 12]), 250.0, (650.0, 700.0), 200);
        assert_eq!(result.positions.len(), 12);
        assert!((result.total_height - 600.0).abs() < 1e-9);
    }

    #[test]
    fn to_height_degenerate_inputs() {
        let config = LayoutConfig::default();
        let layout = JustifiedLayout::new(&config, 1000.0, AspectRatio::STANDARD);
        let gallery = items(&[1.0, 1.5, 0.8]);
        assert!(layout.partition_to_height(&[], 250.0, (700.0, 800.0), 200).is_empty());
        assert!(layout.partition_to_height(&gallery, 250.0, (700.0, 800.0), 0).is_empty());
        assert!(layout.partition_to_height(&gallery, 250.0, (800.0, 700.0), 200).is_empty());
        assert!(layout.partition_to_height(&gallery, 250.0, (0.0, f64::INFINITY), 200).is_empty());
        // Every layout of these is taller than 100 px.
        assert!(layout.partition_to_height(&gallery, 250.0, (50.0, 100.0), 200).is_empty());
        assert!(layout.partition_to_height(&items(&[f64::NAN]), 250.0, (1.0, 900.0), 200).is_empty());
    }

    #[test]
    fn identical_inputs_identical_output() {
        let gallery = items(&[1.5, 0.66, 1.0, 1.33, 0.75, 2.0, 1.0, 1.6]);
        let a = partition(&gallery, 1000.0, 220.0, AspectRatio::WIDESCREEN, 2.0);
        let b = partition(&gallery, 1000.0, 220.0, AspectRatio::WIDESCREEN, 2.0);
        assert_eq!(a, b);
        assert_eq!(a.positions.len(), gallery.len());
    }
}
