//! Structural-break detection and encoding.
//!
//! The detector seam produces candidate indices, `detector` normalizes
//! them into [`BreakPoint`]s, and `encoder` turns breakpoints into step
//! indicator regressors for the ARIMAX stage.

pub mod detector;
pub mod encoder;
pub mod pelt;

pub use detector::{breaks_from_dates, detect_breaks, BreakPoint, ChangePointDetector, PeltDetector};
pub use encoder::{encode_breaks, extend_breaks, RegimeExtension};
pub use pelt::{pelt_partition, PeltConfig, PeltPartition, SegmentCost};
