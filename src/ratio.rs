//! Target aspect ratios and the families that select cost weights.

use core::fmt;
use core::str::FromStr;

use crate::config::LayoutError;

/// Wide targets start above this ratio (16:9 is wide, 4:3 is not).
const WIDE_THRESHOLD: f64 = 1.5;
/// Tall targets are below this ratio (3:4, 9:16).
const TALL_THRESHOLD: f64 = 1.0;

/// Target `width / height` for the whole block.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AspectRatio {
    value: f64,
}

impl AspectRatio {
    /// 16:9.
    pub const WIDESCREEN: Self = Self { value: 16.0 / 9.0 };
    /// 4:3.
    pub const STANDARD: Self = Self { value: 4.0 / 3.0 };
    /// 3:4.
    pub const PORTRAIT: Self = Self { value: 3.0 / 4.0 };

    /// Ratio from two integer terms, e.g. `AspectRatio::new(16, 9)`.
    ///
    /// # Panics
    ///
    /// Panics if `h` is zero. Use [`str::parse`] for untrusted input.
    pub fn new(w: u32, h: u32) -> Self {
        assert!(h != 0, "aspect ratio height term must be non-zero");
        Self {
            value: w as f64 / h as f64,
        }
    }

    /// Ratio from a precomputed value.
    ///
    /// Returns an error unless `value` is finite and positive.
    pub fn from_value(value: f64) -> Result<Self, LayoutError> {
        if !value.is_finite() {
            return Err(LayoutError::NonFiniteRatio);
        }
        if value <= 0.0 {
            return Err(LayoutError::ZeroRatioTerm);
        }
        Ok(Self { value })
    }

    /// `width / height`.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Block height that realizes this ratio at `container_width`.
    pub fn height_for_width(&self, container_width: f64) -> f64 {
        container_width / self.value
    }

    /// Family used to pick penalty weights.
    pub fn family(&self) -> TargetFamily {
        TargetFamily::classify(self.value)
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.value)
    }
}

/// Parses `"16:9"`, `"16/9"`, `"16x9"` or a bare decimal such as `"1.7778"`.
impl FromStr for AspectRatio {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(LayoutError::EmptyRatio);
        }
        match s.split_once([':', '/', 'x', 'X']) {
            Some((w, h)) => {
                let w = parse_term(w)?;
                let h = parse_term(h)?;
                if w == 0.0 || h == 0.0 {
                    return Err(LayoutError::ZeroRatioTerm);
                }
                Self::from_value(w / h)
            }
            None => Self::from_value(parse_term(s)?),
        }
    }
}

fn parse_term(s: &str) -> Result<f64, LayoutError> {
    let v: f64 = s.trim().parse().map_err(|_| LayoutError::MalformedRatio)?;
    if !v.is_finite() {
        return Err(LayoutError::NonFiniteRatio);
    }
    if v < 0.0 {
        return Err(LayoutError::MalformedRatio);
    }
    Ok(v)
}

/// Coarse shape of the target, selecting per-family weights.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TargetFamily {
    /// Noticeably wider than tall (16:9 and beyond).
    Wide,
    /// Near-square landscape (4:3, 1:1, 3:2).
    Standard,
    /// Taller than wide (3:4, 9:16).
    Tall,
}

impl TargetFamily {
    /// Classify a target ratio value.
    pub fn classify(ratio: f64) -> Self {
        if ratio > WIDE_THRESHOLD {
            Self::Wide
        } else if ratio < TALL_THRESHOLD {
            Self::Tall
        } else {
            Self::Standard
        }
    }
}
