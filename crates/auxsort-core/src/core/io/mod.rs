//! Reading and writing geometry tables.
//!
//! Geometry arrives as two CSV tables: one row per module in world coordinates and
//! one row per sensitive strip in the coordinates of its module. The sorted
//! geometry is written back in the same shape, extended with the assigned indices.

pub mod table;
