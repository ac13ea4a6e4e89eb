//! Full arrangement: several height searches, composite selection, and
//! family-specific touch-ups.
//!
//! A single [`LayoutSearch`] optimizes block ratio alone. The arranger runs
//! it from a sequence of seed heights, nudging the seed toward the target
//! block height after each round, and picks the round with the lowest
//! [`SelectionPolicy::composite_cost`](crate::SelectionPolicy::composite_cost),
//! which also weighs row evenness and the direction of the miss. It then
//! tries an analytic correction and, for wide and tall targets, a local
//! bisection around the chosen layout. Each touch-up is kept only when it
//! lowers the block ratio error.

use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use num_traits::Float;

use crate::config::{LayoutConfig, LayoutRequest, usable};
use crate::geometry::{Item, LayoutResult};
use crate::ratio::{AspectRatio, TargetFamily};
use crate::search::{LayoutSearch, corrected_row_height};

/// Block height misses within this many pixels get a half step.
const ADJUST_DEADBAND: f64 = 20.0;
/// Partitions per local bisection.
const LOCAL_BISECT_STEPS: usize = 10;
/// Local bisection bracket, as factors of the mean row height.
const WIDE_LOCAL_BRACKET: (f64, f64) = (0.85, 1.15);
const TALL_LOCAL_BRACKET: (f64, f64) = (0.9, 1.1);
/// Row counts tried by the wide-target sweep.
const WIDE_SWEEP_ROWS: core::ops::RangeInclusive<usize> = 2..=5;

/// Arrange a request with the given configuration.
pub fn arrange(request: &LayoutRequest, config: &LayoutConfig) -> LayoutResult {
    Arranger::new(config, request.container_width, request.target)
        .arrange(&request.items, request.ideal_row_height)
}

/// Arrange the usable items of a request, skipping the rest.
///
/// See [`Arranger::arrange_filtered`].
pub fn arrange_filtered(request: &LayoutRequest, config: &LayoutConfig) -> FilteredLayout {
    Arranger::new(config, request.container_width, request.target)
        .arrange_filtered(&request.items, request.ideal_row_height)
}

/// Layout of the subset of items that could be placed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilteredLayout {
    /// Input index of each placed item: `layout.positions[k]` belongs to
    /// `items[placed[k]]`. Empty whenever `layout` is.
    pub placed: Vec<usize>,
    pub layout: LayoutResult,
}

/// Outer adjustment loop bound to a container width and target ratio.
#[derive(Clone, Debug)]
pub struct Arranger<'a> {
    config: &'a LayoutConfig,
    search: LayoutSearch<'a>,
    family: TargetFamily,
}

impl<'a> Arranger<'a> {
    pub fn new(config: &'a LayoutConfig, container_width: f64, target: AspectRatio) -> Self {
        Self {
            config,
            search: LayoutSearch::new(config, container_width, target),
            family: target.family(),
        }
    }

    fn container_width(&self) -> f64 {
        self.search.partitioner().container_width()
    }

    fn target(&self) -> AspectRatio {
        self.search.partitioner().target()
    }

    /// Block height the composite cost aims for, after
    /// [`LayoutConfig::max_block_height`].
    pub fn target_height(&self) -> f64 {
        let exact = self.search.target_height();
        match self.config.max_block_height {
            Some(cap) if usable(cap) => exact.min(cap),
            _ => exact,
        }
    }

    /// `max(2, floor(sqrt(n / target)))`.
    pub fn expected_rows(&self, item_count: usize) -> usize {
        let rows = (item_count as f64 / self.target().value()).sqrt().floor();
        (rows as usize).max(2)
    }

    /// First seed for the adjustment loop.
    ///
    /// A usable `seed` is clamped into the row height range. Otherwise the
    /// target height is split over an estimated row count: rounded down for
    /// wide targets, up for the rest.
    pub fn starting_row_height(&self, item_count: usize, seed: f64) -> f64 {
        if usable(seed) {
            return self.config.clamp_row_height(seed);
        }
        let rows = (item_count as f64 / self.target().value()).sqrt();
        let rows = match self.family {
            TargetFamily::Wide => rows.floor(),
            TargetFamily::Standard | TargetFamily::Tall => rows.ceil(),
        }
        .max(2.0);
        self.config.clamp_row_height(self.target_height() / rows)
    }

    /// Arrange `items`, starting the adjustment loop from `seed`.
    ///
    /// Returns one placement per item, or the empty result if no round
    /// produced a layout.
    pub fn arrange(&self, items: &[Item], seed: f64) -> LayoutResult {
        if items.is_empty() {
            return LayoutResult::empty();
        }
        let target_height = self.target_height();
        let expected_rows = self.expected_rows(items.len());
        let mut ideal = self.starting_row_height(items.len(), seed);
        let mut chosen: Option<(LayoutResult, f64)> = None;

        for round in 0..self.config.adjust_rounds {
            let layout = self.search.find_height_for_target_ratio(items, ideal);
            if layout.len() != items.len() {
                // Same seed gives the same failure; later seeds derive from it.
                log::debug!("arrange: round {round} failed at ideal height {ideal:.2}");
                break;
            }
            let cost = self.config.selection.composite_cost(
                &layout,
                target_height,
                self.family,
                expected_rows,
            );
            let diff = layout.total_height - target_height;
            log::trace!(
                "arrange: round {round} ideal={ideal:.2} total={:.2} cost={cost:.3}",
                layout.total_height
            );
            if chosen.as_ref().is_none_or(|(_, c)| cost < *c) {
                chosen = Some((layout, cost));
            }
            ideal = self.adjust(ideal, diff, target_height);
        }

        let Some((layout, _)) = chosen else {
            return LayoutResult::empty();
        };
        let layout = self.correct(items, layout);
        let layout = match self.family {
            TargetFamily::Wide => {
                let layout = self.bisect_locally(items, layout, WIDE_LOCAL_BRACKET);
                self.sweep_row_counts(items, layout)
            }
            TargetFamily::Tall => self.bisect_locally(items, layout, TALL_LOCAL_BRACKET),
            TargetFamily::Standard => layout,
        };
        log::debug!(
            "arrange: {} items in {} rows, block ratio {:?} for target {}",
            items.len(),
            layout.row_count(),
            layout.block_ratio(self.container_width()),
            self.target()
        );
        layout
    }

    /// Like [`arrange`](Self::arrange), but items whose ratio is not finite
    /// and positive are left out instead of failing the whole layout.
    pub fn arrange_filtered(&self, items: &[Item], seed: f64) -> FilteredLayout {
        let (placed, usable): (Vec<usize>, Vec<Item>) = items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.is_usable())
            .map(|(i, item)| (i, *item))
            .unzip();
        if placed.len() < items.len() {
            log::debug!(
                "arrange: skipping {} of {} items with unusable ratios",
                items.len() - placed.len(),
                items.len()
            );
        }
        let layout = self.arrange(&usable, seed);
        if layout.is_empty() {
            return FilteredLayout::default();
        }
        FilteredLayout { placed, layout }
    }

    /// Next seed after a round that missed the target height by `diff`.
    fn adjust(&self, ideal: f64, diff: f64, target_height: f64) -> f64 {
        let step = self.config.adjust_step;
        let scale = 1.0 + diff.abs() / target_height;
        if diff > ADJUST_DEADBAND {
            (ideal - step * scale).max(self.config.row_height_range.0)
        } else if diff < -ADJUST_DEADBAND {
            ideal + step * scale
        } else if diff > 0.0 {
            ideal - step / 2.0
        } else {
            ideal + step / 2.0
        }
    }

    fn error(&self, layout: &LayoutResult, item_count: usize) -> Option<f64> {
        if layout.len() != item_count {
            return None;
        }
        layout.ratio_error(self.container_width(), self.target())
    }

    /// Re-search at the row height that scales the block to the target.
    fn correct(&self, items: &[Item], layout: LayoutResult) -> LayoutResult {
        let Some(err) = self.error(&layout, items.len()) else {
            return layout;
        };
        if err <= self.config.fine_tolerance {
            return layout;
        }
        let Some(ideal) =
            corrected_row_height(&layout, self.container_width(), self.target())
        else {
            return layout;
        };
        let candidate = self.search.find_height_for_target_ratio(items, ideal);
        match self.error(&candidate, items.len()) {
            Some(e) if e < err => candidate,
            _ => layout,
        }
    }

    /// Bisect the partitioner directly around the layout's mean row height.
    fn bisect_locally(
        &self,
        items: &[Item],
        layout: LayoutResult,
        (low_factor, high_factor): (f64, f64),
    ) -> LayoutResult {
        let Some(mut best_err) = self.error(&layout, items.len()) else {
            return layout;
        };
        let exact_height = self.search.target_height();
        let base = layout.total_height / layout.row_count().max(1) as f64;
        let mut low = base * low_factor;
        let mut high = base * high_factor;
        let mut best = layout;

        for _ in 0..LOCAL_BISECT_STEPS {
            let mid = (low + high) / 2.0;
            let candidate = self.search.partitioner().partition(items, mid);
            let Some(err) = self.error(&candidate, items.len()) else {
                break;
            };
            let total = candidate.total_height;
            if err < best_err {
                best_err = err;
                best = candidate;
            }
            if total > exact_height {
                high = mid;
            } else {
                low = mid;
            }
        }
        best
    }

    /// Wide targets: try seeding the search with the target height split
    /// into 2..=5 rows.
    fn sweep_row_counts(&self, items: &[Item], layout: LayoutResult) -> LayoutResult {
        let Some(err) = self.error(&layout, items.len()) else {
            return layout;
        };
        let policy = &self.config.selection;
        let exact_height = self.search.target_height();
        let mut best_cost = err * policy.sweep_ratio_weight;
        let mut best = layout;

        for rows in WIDE_SWEEP_ROWS {
            let candidate = self
                .search
                .find_height_for_target_ratio(items, exact_height / rows as f64);
            let Some(e) = self.error(&candidate, items.len()) else {
                continue;
            };
            let cost = e * policy.sweep_ratio_weight
                + candidate.row_height_variance() * policy.sweep_variance_weight;
            if cost < best_cost {
                best_cost = cost;
                best = candidate;
            }
        }
        best
    }
}
