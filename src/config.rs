//! Engine configuration, layout requests, and the error type.
//!
//! # Example
//!
//! ```
//! use zenjustify::{AspectRatio, Item, LayoutConfig, LayoutRequest, arrange};
//!
//! let config = LayoutConfig::default().gap(2.0).search_iterations(20);
//! assert!(config.validate().is_ok());
//!
//! let items = vec![Item::new(1.5); 8];
//! let request = LayoutRequest::new(items, 1200.0, AspectRatio::new(4, 3));
//! let result = arrange(&request, &config);
//! assert_eq!(result.positions.len(), 8);
//! ```

use alloc::vec::Vec;
use core::fmt;

use crate::geometry::Item;
use crate::policy::{RowCostPolicy, SelectionPolicy};
use crate::ratio::AspectRatio;

/// Default gap between items and between rows, in pixels.
pub const DEFAULT_GAP: f64 = 1.0;
/// Default ideal row height seed, in pixels.
pub const DEFAULT_IDEAL_ROW_HEIGHT: f64 = 250.0;
/// Default row height when a corrected one cannot be derived, in pixels.
pub const DEFAULT_FALLBACK_ROW_HEIGHT: f64 = 200.0;
/// Default bound on binary search steps.
pub const DEFAULT_SEARCH_ITERATIONS: usize = 15;
/// Default number of candidate row starts per split point.
pub const DEFAULT_DP_WINDOW: usize = 100;
/// Default resolution of the height-constrained partition.
pub const DEFAULT_HEIGHT_BINS: usize = 200;

/// Configuration errors and malformed ratio input.
///
/// The layout engine itself never returns an error; degenerate geometry
/// produces an empty [`LayoutResult`](crate::LayoutResult) instead.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LayoutError {
    /// Ratio string was empty.
    EmptyRatio,
    /// Ratio string could not be parsed as `w:h` or a decimal.
    MalformedRatio,
    /// A ratio term was zero.
    ZeroRatioTerm,
    /// A ratio term or value was infinite or NaN.
    NonFiniteRatio,
    /// Gap is negative or not finite.
    NegativeGap,
    /// DP window is zero.
    ZeroWindow,
    /// A tolerance is negative or not finite.
    InvalidTolerance,
    /// A `(min, max)` range is empty, non-positive, or not finite.
    InvalidRange,
    /// Container width is zero, negative, or not finite.
    InvalidContainerWidth,
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::EmptyRatio => "aspect ratio is empty",
            Self::MalformedRatio => "aspect ratio must be `w:h` or a positive decimal",
            Self::ZeroRatioTerm => "aspect ratio terms must be non-zero",
            Self::NonFiniteRatio => "aspect ratio must be finite",
            Self::NegativeGap => "gap must be a finite, non-negative number",
            Self::ZeroWindow => "dp window must be at least 1",
            Self::InvalidTolerance => "tolerances must be finite and non-negative",
            Self::InvalidRange => "height ranges must be finite, positive, and ordered",
            Self::InvalidContainerWidth => "container width must be finite and positive",
        };
        f.write_str(msg)
    }
}

impl core::error::Error for LayoutError {}

/// Tunable constants for partitioning and search.
///
/// Built with [`Default`] and consuming setters:
///
/// ```
/// use zenjustify::LayoutConfig;
///
/// let config = LayoutConfig::default()
///     .gap(4.0)
///     .dp_window(40)
///     .max_block_height(Some(900.0));
/// assert_eq!(config.dp_window, 40);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutConfig {
    /// Pixels between items in a row and between rows.
    pub gap: f64,
    /// Fallback ideal row height when a derived one is unusable.
    pub ideal_row_height: f64,
    /// Bound on binary search steps per tuner run.
    pub search_iterations: usize,
    /// Maximum candidate row starts considered per split point.
    pub dp_window: usize,
    /// Block height buckets for the height-constrained partition the tuner
    /// falls back to when bisection misses. Zero disables that stage.
    pub height_bins: usize,
    /// Row ratios closer than this to the target earn the near-match bonus.
    pub near_match_tolerance: f64,
    /// Block ratio error above which the tuner runs its analytic refinement.
    pub coarse_tolerance: f64,
    /// Block ratio error above which the arranger runs its analytic correction.
    pub fine_tolerance: f64,
    /// Binary search stops once the bracket is narrower than this, in pixels.
    pub bracket_resolution: f64,
    /// Clamp for estimated and seeded ideal row heights.
    pub row_height_range: (f64, f64),
    /// Outer limits of the binary search bracket.
    pub probe_range: (f64, f64),
    /// Bound on outer adjustment rounds in [`arrange`](fn@crate::arrange).
    pub adjust_rounds: usize,
    /// Base step for the outer adjustment, in pixels.
    pub adjust_step: f64,
    /// Optional cap on the target block height (e.g. a viewport limit).
    pub max_block_height: Option<f64>,
    pub row_cost: RowCostPolicy,
    pub selection: SelectionPolicy,
    /// Overrides the family default length of the fallback row.
    pub fallback_row_len: Option<usize>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            gap: DEFAULT_GAP,
            ideal_row_height: DEFAULT_FALLBACK_ROW_HEIGHT,
            search_iterations: DEFAULT_SEARCH_ITERATIONS,
            dp_window: DEFAULT_DP_WINDOW,
            height_bins: DEFAULT_HEIGHT_BINS,
            near_match_tolerance: 0.02,
            coarse_tolerance: 0.02,
            fine_tolerance: 0.01,
            bracket_resolution: 0.5,
            row_height_range: (80.0, 400.0),
            probe_range: (50.0, 800.0),
            adjust_rounds: 15,
            adjust_step: 15.0,
            max_block_height: None,
            row_cost: RowCostPolicy::default(),
            selection: SelectionPolicy::default(),
            fallback_row_len: None,
        }
    }
}

impl LayoutConfig {
    /// Set the gap between items and rows.
    pub fn gap(mut self, gap: f64) -> Self {
        self.gap = gap;
        self
    }

    /// Set the fallback ideal row height.
    pub fn ideal_row_height(mut self, height: f64) -> Self {
        self.ideal_row_height = height;
        self
    }

    /// Set the binary search step bound.
    pub fn search_iterations(mut self, iterations: usize) -> Self {
        self.search_iterations = iterations;
        self
    }

    /// Set the DP lookback window.
    pub fn dp_window(mut self, window: usize) -> Self {
        self.dp_window = window;
        self
    }

    /// Set the height-constrained partition resolution; zero disables it.
    pub fn height_bins(mut self, bins: usize) -> Self {
        self.height_bins = bins;
        self
    }

    /// Set the near-match bonus threshold.
    pub fn near_match_tolerance(mut self, tolerance: f64) -> Self {
        self.near_match_tolerance = tolerance;
        self
    }

    /// Set the error threshold for the tuner's refinement pass.
    pub fn coarse_tolerance(mut self, tolerance: f64) -> Self {
        self.coarse_tolerance = tolerance;
        self
    }

    /// Set the error threshold for the arranger's correction pass.
    pub fn fine_tolerance(mut self, tolerance: f64) -> Self {
        self.fine_tolerance = tolerance;
        self
    }

    /// Set the row height clamp.
    pub fn row_height_range(mut self, min: f64, max: f64) -> Self {
        self.row_height_range = (min, max);
        self
    }

    /// Set the outer limits of the binary search bracket.
    pub fn probe_range(mut self, min: f64, max: f64) -> Self {
        self.probe_range = (min, max);
        self
    }

    /// Set the number of outer adjustment rounds.
    pub fn adjust_rounds(mut self, rounds: usize) -> Self {
        self.adjust_rounds = rounds;
        self
    }

    /// Cap the block height the arranger aims for.
    pub fn max_block_height(mut self, cap: Option<f64>) -> Self {
        self.max_block_height = cap;
        self
    }

    /// Replace the row-breaking weights.
    pub fn row_cost(mut self, policy: RowCostPolicy) -> Self {
        self.row_cost = policy;
        self
    }

    /// Replace the candidate selection weights.
    pub fn selection(mut self, policy: SelectionPolicy) -> Self {
        self.selection = policy;
        self
    }

    /// Force the fallback row length for every family.
    pub fn fallback_row_len(mut self, len: usize) -> Self {
        self.fallback_row_len = Some(len);
        self
    }

    /// Check values a caller may have taken from user input.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if !self.gap.is_finite() || self.gap < 0.0 {
            return Err(LayoutError::NegativeGap);
        }
        if self.dp_window == 0 || self.fallback_row_len == Some(0) {
            return Err(LayoutError::ZeroWindow);
        }
        for tol in [
            self.near_match_tolerance,
            self.coarse_tolerance,
            self.fine_tolerance,
            self.bracket_resolution,
        ] {
            if !tol.is_finite() || tol < 0.0 {
                return Err(LayoutError::InvalidTolerance);
            }
        }
        for (min, max) in [self.row_height_range, self.probe_range] {
            if !valid_range(min, max) {
                return Err(LayoutError::InvalidRange);
            }
        }
        if !usable(self.ideal_row_height) || !usable(self.adjust_step) {
            return Err(LayoutError::InvalidRange);
        }
        if let Some(cap) = self.max_block_height
            && !usable(cap)
        {
            return Err(LayoutError::InvalidRange);
        }
        Ok(())
    }

    /// Clamp `h` into [`row_height_range`](Self::row_height_range).
    pub(crate) fn clamp_row_height(&self, h: f64) -> f64 {
        let (min, max) = self.row_height_range;
        h.max(min).min(max)
    }
}

/// Everything one layout call needs.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutRequest {
    /// Items in display order.
    pub items: Vec<Item>,
    /// Width of the container, in pixels.
    pub container_width: f64,
    /// Aspect ratio the whole block should approach.
    pub target: AspectRatio,
    /// Starting ideal row height.
    pub ideal_row_height: f64,
}

impl LayoutRequest {
    /// Request with the default ideal row height seed.
    pub fn new(items: Vec<Item>, container_width: f64, target: AspectRatio) -> Self {
        Self {
            items,
            container_width,
            target,
            ideal_row_height: DEFAULT_IDEAL_ROW_HEIGHT,
        }
    }

    /// Set the ideal row height seed.
    pub fn ideal_row_height(mut self, height: f64) -> Self {
        self.ideal_row_height = height;
        self
    }

    /// Check the container width.
    ///
    /// Items are not checked: an unusable ratio only makes its rows invalid.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if !usable(self.container_width) {
            return Err(LayoutError::InvalidContainerWidth);
        }
        Ok(())
    }
}

pub(crate) fn usable(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

fn valid_range(min: f64, max: f64) -> bool {
    usable(min) && usable(max) && min <= max
}
