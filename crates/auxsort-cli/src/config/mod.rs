//! Sort configuration as seen by the command line: a partial TOML file, merged with
//! explicit flags and `--set` overrides on top of the library defaults.

pub mod builder;
pub mod file;
pub mod models;
