//! Cost weights for row breaking and candidate selection.
//!
//! The weights are empirical. They are grouped per [`TargetFamily`] so that
//! wide and tall targets can punish their own failure direction harder;
//! callers can replace any of them through [`LayoutConfig`](crate::LayoutConfig).

#[cfg(not(feature = "std"))]
use num_traits::Float;

use crate::geometry::LayoutResult;
use crate::ratio::TargetFamily;

/// Rows in the fallback split for standard and tall targets.
pub const FALLBACK_ROW_LEN: usize = 5;
/// Rows in the fallback split for wide targets.
pub const FALLBACK_ROW_LEN_WIDE: usize = 6;

/// Row-breaking cost for a single candidate row.
///
/// ```text
/// cost = height_weight * (h - ideal)^2
///      + wide_weight * (row_ratio - target)^2               if row_ratio > target
///      + wide_weight * narrow_factor * (target - row_ratio)^2 otherwise
///      - near_match_bonus                                   if |row_ratio - target| < tolerance
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RowCostPolicy {
    pub height_weight: f64,
    /// Weight per family on rows rendered wider than the target.
    pub wide_weight: FamilyWeights,
    /// Fraction of `wide_weight` applied to rows narrower than the target.
    pub narrow_factor: f64,
    pub near_match_bonus: f64,
}

impl Default for RowCostPolicy {
    fn default() -> Self {
        Self {
            height_weight: 0.5,
            wide_weight: FamilyWeights {
                wide: 1000.0,
                standard: 700.0,
                tall: 900.0,
            },
            narrow_factor: 0.5,
            near_match_bonus: 200.0,
        }
    }
}

impl RowCostPolicy {
    /// Cost of one row of height `h` at `container_width`.
    pub fn row_cost(
        &self,
        h: f64,
        ideal_height: f64,
        container_width: f64,
        target: f64,
        family: TargetFamily,
        near_match_tolerance: f64,
    ) -> f64 {
        let row_ratio = container_width / h;
        let asym = self.wide_weight.get(family);
        let height_cost = self.height_cost(h, ideal_height);
        let ratio_cost = if row_ratio > target {
            sq(row_ratio - target) * asym
        } else {
            sq(target - row_ratio) * asym * self.narrow_factor
        };
        let bonus = if (row_ratio - target).abs() < near_match_tolerance {
            self.near_match_bonus
        } else {
            0.0
        };
        height_cost + ratio_cost - bonus
    }

    /// The height term alone. Used where the block height is already
    /// constrained and only row evenness is left to choose.
    pub fn height_cost(&self, h: f64, ideal_height: f64) -> f64 {
        sq(h - ideal_height) * self.height_weight
    }
}

/// Composite cost used to choose among complete candidate layouts.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SelectionPolicy {
    /// Weight on `|total - target_height| / target_height`.
    pub ratio_weight: FamilyWeights,
    /// Weight on the population variance of row heights.
    pub variance_weight: f64,
    /// Weight on the relative shortfall when the block is shorter than the target.
    pub short_weight: FamilyWeights,
    /// Weight on the relative excess when the block is taller than the target.
    pub tall_weight: FamilyWeights,
    /// Per extra row squared, wide targets only.
    pub extra_row_weight: f64,
    /// Ratio-error weight for the wide-target `target_height / k` sweep.
    pub sweep_ratio_weight: f64,
    /// Row-variance weight for the wide-target `target_height / k` sweep.
    pub sweep_variance_weight: f64,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            ratio_weight: FamilyWeights {
                wide: 1100.0,
                standard: 700.0,
                tall: 700.0,
            },
            variance_weight: 0.3,
            short_weight: FamilyWeights {
                wide: 1000.0,
                standard: 800.0,
                tall: 800.0,
            },
            tall_weight: FamilyWeights {
                wide: 900.0,
                standard: 900.0,
                tall: 1600.0,
            },
            extra_row_weight: 160.0,
            sweep_ratio_weight: 1100.0,
            sweep_variance_weight: 0.2,
        }
    }
}

impl SelectionPolicy {
    /// Composite cost of `layout` against `target_height`. Lower is better.
    ///
    /// `expected_rows` only matters for [`TargetFamily::Wide`].
    pub fn composite_cost(
        &self,
        layout: &LayoutResult,
        target_height: f64,
        family: TargetFamily,
        expected_rows: usize,
    ) -> f64 {
        let total = layout.total_height;
        let rel = (total - target_height).abs() / target_height;
        let mut cost = rel * self.ratio_weight.get(family)
            + layout.row_height_variance() * self.variance_weight;

        if total < target_height {
            cost += (target_height - total) / target_height * self.short_weight.get(family);
        } else if total > target_height {
            cost += (total - target_height) / target_height * self.tall_weight.get(family);
        }

        if family == TargetFamily::Wide {
            let rows = layout.row_count();
            if rows > expected_rows {
                cost += sq((rows - expected_rows) as f64) * self.extra_row_weight;
            }
        }
        cost
    }
}

/// One value per [`TargetFamily`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FamilyWeights {
    pub wide: f64,
    pub standard: f64,
    pub tall: f64,
}

impl FamilyWeights {
    /// Same value for every family.
    pub const fn uniform(value: f64) -> Self {
        Self {
            wide: value,
            standard: value,
            tall: value,
        }
    }

    pub fn get(&self, family: TargetFamily) -> f64 {
        match family {
            TargetFamily::Wide => self.wide,
            TargetFamily::Standard => self.standard,
            TargetFamily::Tall => self.tall,
        }
    }
}

/// Items in the row forced by the fallback split when backtracking finds no
/// recorded row start.
pub fn fallback_row_len(family: TargetFamily) -> usize {
    match family {
        TargetFamily::Wide => FALLBACK_ROW_LEN_WIDE,
        TargetFamily::Standard | TargetFamily::Tall => FALLBACK_ROW_LEN,
    }
}

#[inline]
pub(crate) fn sq(x: f64) -> f64 {
    x * x
}
