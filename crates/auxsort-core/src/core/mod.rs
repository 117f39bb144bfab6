//! # Core Module
//!
//! The fundamental building blocks of AuxSort: descriptor models, the ordering
//! algorithms, and geometry I/O.
//!
//! ## Architecture
//!
//! - **Geometry Representation** ([`models`]) - Modules, sensitive strips, volume names
//! - **Ordering** ([`sorting`]) - Band-based sort keys and the standard sorters
//! - **File I/O** ([`io`]) - Reading and writing geometry tables
//!
//! Everything in this module is free of global state: tolerances and axis
//! conventions always arrive through an explicit [`crate::engine::config::SortConfig`].

pub mod io;
pub mod models;
pub mod sorting;
