//! # Workflows Module
//!
//! High-level entry points that sort a complete CRT geometry.
//!
//! - **Sort Workflow** ([`sort`]) - Orders every module, then the strips of every
//!   module, assigns the final numbering, and optionally round-trips the geometry
//!   through its CSV tables.

pub mod sort;
