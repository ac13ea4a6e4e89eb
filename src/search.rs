//! Row height search toward a target block aspect ratio.
//!
//! Total block height is a step function of the ideal row height: each row
//! break flips at some threshold, so there is no smooth curve to solve. The
//! search brackets the ideal height, bisects on whether the block came out
//! too tall or too short, and keeps the best probe seen anywhere rather than
//! trusting the final bracket. One analytic correction runs afterwards if the
//! best probe is still outside [`LayoutConfig::coarse_tolerance`].
//!
//! Bisection only reaches the block heights that even rows produce, and those
//! jump by whole rows. If the best probe still misses, a last pass asks the
//! partitioner directly for rows whose total lands inside the tolerance band
//! ([`JustifiedLayout::partition_to_height`]), trading some row evenness for
//! the block ratio. Small galleries can still miss: with few items, no split
//! into contiguous rows stacks to the target height.
//!
//! # Example
//!
//! ```
//! use zenjustify::{AspectRatio, Item, LayoutConfig, LayoutSearch};
//!
//! let items: Vec<Item> = [1.5, 0.67, 1.0, 1.33, 1.5, 0.75, 1.78, 1.0]
//!     .into_iter()
//!     .map(Item::new)
//!     .collect();
//! let config = LayoutConfig::default();
//! let search = LayoutSearch::new(&config, 1000.0, AspectRatio::new(4, 3));
//! let trace = search.search(&items, 250.0);
//!
//! assert_eq!(trace.result.positions.len(), items.len());
//! let best = trace.best_probe().unwrap();
//! assert_eq!(best.total_height, Some(trace.result.total_height));
//! ```

use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use num_traits::Float;

use crate::config::{LayoutConfig, usable};
use crate::geometry::{Item, LayoutResult};
use crate::partition::JustifiedLayout;
use crate::ratio::AspectRatio;

/// Minimum row estimate used to seed the bracket.
const MIN_ESTIMATED_ROWS: f64 = 2.0;

/// Run the height search with default configuration.
///
/// Returns a layout with one placement per item whenever any probe succeeds,
/// otherwise the empty result.
pub fn find_height_for_target_ratio(
    items: &[Item],
    container_width: f64,
    target: AspectRatio,
    seed_ideal_height: f64,
) -> LayoutResult {
    let config = LayoutConfig::default();
    LayoutSearch::new(&config, container_width, target)
        .find_height_for_target_ratio(items, seed_ideal_height)
}

/// Which part of the search issued a probe.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ProbeStage {
    /// The caller's seed height.
    Seed,
    /// The estimate from item count and target ratio.
    Estimate,
    /// A bracket midpoint.
    Bisect,
    /// The analytic correction after bisection.
    Refine,
    /// The height-constrained partition, run last.
    Constrained,
}

/// One partition evaluation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Probe {
    pub stage: ProbeStage,
    /// Ideal row height passed to the partitioner.
    pub ideal_height: f64,
    /// Resulting block height, `None` if the partition failed.
    pub total_height: Option<f64>,
    /// `|block_ratio - target|`, `None` if the partition failed.
    pub error: Option<f64>,
}

/// Search outcome plus every probe it took, in order.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchTrace {
    pub result: LayoutResult,
    pub probes: Vec<Probe>,
}

impl SearchTrace {
    /// The first probe with the lowest error.
    pub fn best_probe(&self) -> Option<&Probe> {
        let mut best: Option<&Probe> = None;
        for probe in &self.probes {
            let Some(err) = probe.error else { continue };
            if best.and_then(|b| b.error).is_none_or(|b| err < b) {
                best = Some(probe);
            }
        }
        best
    }

    /// Error of the returned result, `None` if it is empty.
    pub fn error(&self) -> Option<f64> {
        self.best_probe().and_then(|p| p.error)
    }
}

struct Best {
    result: LayoutResult,
    error: f64,
}

#[derive(Default)]
struct Tracker {
    probes: Vec<Probe>,
    best: Option<Best>,
}

/// Height tuner bound to a container width and target ratio.
#[derive(Clone, Debug)]
pub struct LayoutSearch<'a> {
    config: &'a LayoutConfig,
    layout: JustifiedLayout<'a>,
}

impl<'a> LayoutSearch<'a> {
    pub fn new(config: &'a LayoutConfig, container_width: f64, target: AspectRatio) -> Self {
        Self {
            config,
            layout: JustifiedLayout::new(config, container_width, target),
        }
    }

    /// The partitioner every probe runs.
    pub fn partitioner(&self) -> &JustifiedLayout<'a> {
        &self.layout
    }

    /// Block height that would exactly hit the target ratio.
    pub fn target_height(&self) -> f64 {
        self.layout.target().height_for_width(self.layout.container_width())
    }

    /// Starting row height for `item_count` items.
    ///
    /// `target_height / max(2, round(sqrt(n / target)))`, clamped to
    /// [`LayoutConfig::row_height_range`].
    pub fn estimate_row_height(&self, item_count: usize) -> f64 {
        let target = self.layout.target().value();
        let rows = (item_count as f64 / target)
            .sqrt()
            .round()
            .max(MIN_ESTIMATED_ROWS);
        self.config.clamp_row_height(self.target_height() / rows)
    }

    /// Best layout found, or empty if every probe failed.
    pub fn find_height_for_target_ratio(&self, items: &[Item], seed: f64) -> LayoutResult {
        self.search(items, seed).result
    }

    /// Run the search and keep the probe log.
    pub fn search(&self, items: &[Item], seed: f64) -> SearchTrace {
        let mut tracker = Tracker::default();
        if items.is_empty() {
            return SearchTrace {
                result: LayoutResult::empty(),
                probes: tracker.probes,
            };
        }

        let target_height = self.target_height();
        let estimate = self.estimate_row_height(items.len());
        let seed = usable(seed).then_some(seed);

        let (floor, ceiling) = self.config.probe_range;
        let mut low = (seed.map_or(estimate, |s| s.min(estimate)) * 0.5).max(floor);
        let mut high = (seed.map_or(estimate, |s| s.max(estimate)) * 2.0).min(ceiling);
        if low > high {
            core::mem::swap(&mut low, &mut high);
        }

        if let Some(seed) = seed {
            self.probe(items, seed, ProbeStage::Seed, &mut tracker);
        }
        self.probe(items, estimate, ProbeStage::Estimate, &mut tracker);

        for _ in 0..self.config.search_iterations {
            if high - low < self.config.bracket_resolution {
                break;
            }
            let mid = (low + high) / 2.0;
            match self.probe(items, mid, ProbeStage::Bisect, &mut tracker) {
                Some(total) if total <= target_height => low = mid,
                _ => high = mid,
            }
        }

        self.refine(items, &mut tracker);
        self.constrain(items, &mut tracker);

        let result = match tracker.best {
            Some(best) => {
                log::debug!(
                    "height search: {} probes, block error {:.4}, {} rows",
                    tracker.probes.len(),
                    best.error,
                    best.result.row_count()
                );
                best.result
            }
            None => {
                log::debug!("height search: all {} probes failed", tracker.probes.len());
                LayoutResult::empty()
            }
        };
        SearchTrace {
            result,
            probes: tracker.probes,
        }
    }

    /// Re-partition once at the row height that would scale the best block
    /// to the target height. Kept only if strictly better.
    fn refine(&self, items: &[Item], tracker: &mut Tracker) {
        let Some(best) = &tracker.best else { return };
        if best.error <= self.config.coarse_tolerance {
            return;
        }
        let ideal = corrected_row_height(
            &best.result,
            self.layout.container_width(),
            self.layout.target(),
        )
        .unwrap_or(self.config.ideal_row_height);
        self.probe(items, ideal, ProbeStage::Refine, tracker);
    }

    /// Ask for a layout inside the tolerance band around the target height.
    fn constrain(&self, items: &[Item], tracker: &mut Tracker) {
        let bins = self.config.height_bins;
        if bins == 0 {
            return;
        }
        let Some(best) = &tracker.best else { return };
        if best.error <= self.config.coarse_tolerance {
            return;
        }
        let width = self.layout.container_width();
        let target = self.layout.target().value();
        let tolerance = self.config.coarse_tolerance;
        let min_height = width / (target + tolerance);
        let max_height = if target > tolerance {
            width / (target - tolerance)
        } else {
            2.0 * self.target_height()
        };
        let ideal = self.estimate_row_height(items.len());
        let result = self
            .layout
            .partition_to_height(items, ideal, (min_height, max_height), bins);
        self.record(items, ideal, ProbeStage::Constrained, result, tracker);
    }

    /// Partition at `ideal_height`, record the probe, update the best.
    /// Returns the block height on success.
    fn probe(
        &self,
        items: &[Item],
        ideal_height: f64,
        stage: ProbeStage,
        tracker: &mut Tracker,
    ) -> Option<f64> {
        let result = self.layout.partition(items, ideal_height);
        self.record(items, ideal_height, stage, result, tracker)
    }

    fn record(
        &self,
        items: &[Item],
        ideal_height: f64,
        stage: ProbeStage,
        result: LayoutResult,
        tracker: &mut Tracker,
    ) -> Option<f64> {
        let error = if result.len() == items.len() {
            result.ratio_error(self.layout.container_width(), self.layout.target())
        } else {
            None
        };
        let total_height = error.map(|_| result.total_height);
        log::trace!("probe {stage:?} ideal={ideal_height:.2} total={total_height:?} error={error:?}");
        tracker.probes.push(Probe {
            stage,
            ideal_height,
            total_height,
            error,
        });

        let err = error?;
        if tracker.best.as_ref().is_none_or(|b| err < b.error) {
            tracker.best = Some(Best { result, error: err });
        }
        total_height
    }
}

/// Ideal row height that would bring `layout` to the exact target height if
/// its row count held: `(total · achieved / target) / rows`.
pub(crate) fn corrected_row_height(
    layout: &LayoutResult,
    container_width: f64,
    target: AspectRatio,
) -> Option<f64> {
    let achieved = layout.block_ratio(container_width)?;
    let rows = layout.row_count();
    if rows == 0 {
        return None;
    }
    let corrected_total = layout.total_height * (achieved / target.value());
    let ideal = corrected_total / rows as f64;
    usable(ideal).then_some(ideal)
}
