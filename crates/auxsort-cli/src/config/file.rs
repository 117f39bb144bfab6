use crate::error::{CliError, Result};
use auxsort::engine::config::{SortConfig, SortStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// A partial sort configuration: every field may be left out and falls back to the
/// next layer down.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<SortStrategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modules: Option<FileOrderConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensitive: Option<FileSensitiveConfig>,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileOrderConfig {
    /// Axis keys, primary first, e.g. `"z+,x+,y+"` or `"z+@0.1,x+@0.1,y+@0.1"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    /// Tolerance (cm) for every key that does not set its own.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileSensitiveConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
    /// Drop the built-in per-subsystem orderings before applying `overrides`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replace_default_overrides: Option<bool>,
    /// Per-subsystem strip orderings keyed by subsystem tag (`minos`, `cern`, `dc`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overrides: Option<BTreeMap<String, String>>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Layers `upper` on top of `self`; every value set in `upper` wins.
    pub fn overlay(self, upper: FileConfig) -> FileConfig {
        FileConfig {
            strategy: upper.strategy.or(self.strategy),
            first_index: upper.first_index.or(self.first_index),
            modules: merge_sections(self.modules, upper.modules, FileOrderConfig::overlay),
            sensitive: merge_sections(self.sensitive, upper.sensitive, FileSensitiveConfig::overlay),
        }
    }
}

impl FileOrderConfig {
    fn overlay(self, upper: FileOrderConfig) -> FileOrderConfig {
        FileOrderConfig {
            order: upper.order.or(self.order),
            tolerance: upper.tolerance.or(self.tolerance),
        }
    }
}

impl FileSensitiveConfig {
    fn overlay(self, upper: FileSensitiveConfig) -> FileSensitiveConfig {
        let overrides = merge_sections(self.overrides, upper.overrides, |mut lower, upper| {
            lower.extend(upper);
            lower
        });
        FileSensitiveConfig {
            order: upper.order.or(self.order),
            tolerance: upper.tolerance.or(self.tolerance),
            replace_default_overrides: upper
                .replace_default_overrides
                .or(self.replace_default_overrides),
            overrides,
        }
    }
}

fn merge_sections<T>(lower: Option<T>, upper: Option<T>, merge: impl FnOnce(T, T) -> T) -> Option<T> {
    match (lower, upper) {
        (Some(lower), Some(upper)) => Some(merge(lower, upper)),
        (lower, upper) => upper.or(lower),
    }
}

impl From<&SortConfig> for FileConfig {
    /// A complete file representation; reading it back yields `config` again.
    fn from(config: &SortConfig) -> Self {
        let overrides: BTreeMap<String, String> = config
            .sensitive_overrides
            .iter()
            .map(|(subsystem, order)| (subsystem.tag().to_ascii_lowercase(), order.to_string()))
            .collect();

        Self {
            strategy: Some(config.strategy),
            first_index: Some(config.first_index),
            modules: Some(FileOrderConfig {
                order: Some(config.module_order.to_string()),
                tolerance: None,
            }),
            sensitive: Some(FileSensitiveConfig {
                order: Some(config.sensitive_order.to_string()),
                tolerance: None,
                replace_default_overrides: Some(true),
                overrides: (!overrides.is_empty()).then_some(overrides),
            }),
        }
    }
}
