pub mod config;
pub mod sort;
