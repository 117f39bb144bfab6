//! Standard ordering of auxiliary detector modules and their sensitive strips.
//!
//! The entry points in [`sorter`] reorder descriptors in place and assign their
//! sequential indices. Sort keys are derived in [`banding`], which turns per-axis
//! tolerances into a strict total order so that the result is deterministic and
//! stable even for noisy or non-finite coordinates.

pub mod banding;
pub mod sorter;
