//! # AuxSort Core Library
//!
//! Deterministic ordering of cosmic ray tagger (CRT) auxiliary detector modules and
//! their sensitive strips into the standard configuration used for module and
//! channel numbering.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`AuxDet`, `AuxDetSensitive`),
//!   volume-name parsing, the tolerance-aware ordering algorithms and CSV I/O.
//!
//! - **[`engine`]: Configuration and Plumbing.** The sort configuration (axis order,
//!   directions and tolerances), error types and progress reporting.
//!
//! - **[`workflows`]: The Public API.** End-to-end procedures that sort a whole
//!   geometry, module by module, and assign the final numbering.

pub mod core;
pub mod engine;
pub mod workflows;
