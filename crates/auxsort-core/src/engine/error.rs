use thiserror::Error;

use super::config::ConfigError;
use crate::core::io::table::GeometryError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid sort configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Geometry I/O failed: {source}")]
    Geometry {
        #[from]
        source: GeometryError,
    },
}
