//! # Core Models Module
//!
//! Data structures describing the CRT geometry as seen by the sorter.
//!
//! ## Key Components
//!
//! - [`aux_det`] - One auxiliary detector module with its reference position
//! - [`sensitive`] - One sensitive strip inside a module, in module-local coordinates
//! - [`geometry`] - The full collection of modules loaded for one detector
//! - [`naming`] - Parsing of GDML volume names into subsystem, region and numbering
//! - [`descriptor`] - The trait the sorters operate on
//!
//! ## Usage
//!
//! ```ignore
//! use auxsort::core::models::{aux_det::AuxDet, sensitive::AuxDetSensitive};
//! use nalgebra::Point3;
//!
//! let mut module = AuxDet::new("volAuxDet_CERN_module_000_Top", Point3::new(0.0, 600.0, 0.0));
//! module.push_sensitive(AuxDetSensitive::new(
//!     "volAuxDetSensitive_CERN_module_000_top_strip_00",
//!     Point3::new(-80.5, 0.8, 0.0),
//! ));
//! ```

pub mod aux_det;
pub mod descriptor;
pub mod geometry;
pub mod naming;
pub mod sensitive;
