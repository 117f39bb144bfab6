//! # Engine Module
//!
//! Plumbing shared by the workflows: the sort configuration, the error type the
//! workflows return, and the progress channel used to report back to a front end.
//!
//! - **Configuration** ([`config`]) - Axis order, directions, tolerances, strategy and numbering origin
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress and warning events
//! - **Error Handling** ([`error`]) - Errors surfaced by the workflows

pub mod config;
pub mod error;
pub mod progress;
