//! Justified image grid layout that converges on a target block aspect ratio.
//!
//! Pure geometry: no pixel operations, no I/O, no retained state, `no_std`
//! compatible (requires `alloc`).
//!
//! # Modules
//!
//! - [`partition`](mod@partition): Optimal row breaking for a given ideal row height
//! - [`search`]: Row height search toward a target block ratio
//! - [`arrange`](mod@arrange): Multi-round search with composite candidate selection
//! - [`policy`]: Cost weights for row breaking and selection
//! - [`config`]: Configuration, requests, and errors
//! - [`geometry`]: Items, placements, and results
//! - [`ratio`]: Target aspect ratios
//!
//! # Example
//!
//! ```
//! use zenjustify::{AspectRatio, Item, LayoutConfig, LayoutRequest, arrange};
//!
//! let items = [(4000, 3000), (3000, 4000), (1920, 1080), (1000, 1000), (3000, 2000)]
//!     .into_iter()
//!     .filter_map(|(w, h)| Item::from_dimensions(w, h))
//!     .collect();
//! let request = LayoutRequest::new(items, 1200.0, "16:9".parse().unwrap());
//! let result = arrange(&request, &LayoutConfig::default());
//!
//! assert_eq!(result.positions.len(), 5);
//! for p in &result.positions {
//!     assert!(p.right() <= 1200.0 + 1e-6);
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

pub mod arrange;
pub mod config;
pub mod geometry;
pub mod partition;
pub mod policy;
pub mod ratio;
pub mod search;
#[cfg(feature = "svg")]
pub mod svg;

// Re-exports: core types and entry points
pub use arrange::{Arranger, FilteredLayout, arrange, arrange_filtered};
pub use config::{LayoutConfig, LayoutError, LayoutRequest};
pub use geometry::{Item, LayoutResult, Placement, RowSpan, Rows};
pub use partition::{JustifiedLayout, partition};
pub use policy::{FamilyWeights, RowCostPolicy, SelectionPolicy};
pub use ratio::{AspectRatio, TargetFamily};
pub use search::{
    LayoutSearch, Probe, ProbeStage, SearchTrace, find_height_for_target_ratio,
};
