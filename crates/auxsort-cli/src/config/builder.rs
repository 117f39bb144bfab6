use super::file::{FileConfig, FileOrderConfig, FileSensitiveConfig};
use super::models::AppConfig;
use crate::cli::SortArgs;
use crate::error::{CliError, Result};
use crate::utils::parser;
use auxsort::core::models::naming::Subsystem;
use auxsort::engine::config::{
    AxisKey, AxisOrder, DEFAULT_MODULE_TOLERANCE_CM, DEFAULT_SENSITIVE_TOLERANCE_CM, SortConfig,
    SortConfigBuilder,
};
use tracing::debug;

/// Merges, from lowest to highest precedence: library defaults, the config file,
/// explicit flags and `--set` values.
pub fn build_config(args: &SortArgs) -> Result<AppConfig> {
    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };
    let flag_config = FileConfig {
        strategy: args.strategy,
        first_index: args.first_index,
        ..Default::default()
    };
    let set_config = apply_set_values(FileConfig::default(), &args.set_values)?;

    let merged = file_config.overlay(flag_config).overlay(set_config);
    debug!("Merged configuration layers: {:?}", merged);

    Ok(AppConfig {
        modules_path: args.modules.clone(),
        sensitive_path: args.sensitive.clone(),
        output_dir: args.output_dir.clone(),
        core_config: to_sort_config(merged)?,
    })
}

fn to_sort_config(file_config: FileConfig) -> Result<SortConfig> {
    let defaults = SortConfig::default();
    let modules = file_config.modules.unwrap_or_default();
    let sensitive = file_config.sensitive.unwrap_or_default();

    let module_keys = resolve_order(
        &modules,
        &defaults.module_order,
        DEFAULT_MODULE_TOLERANCE_CM,
    )?;
    let sensitive_section = FileOrderConfig {
        order: sensitive.order.clone(),
        tolerance: sensitive.tolerance,
    };
    let sensitive_keys = resolve_order(
        &sensitive_section,
        &defaults.sensitive_order,
        DEFAULT_SENSITIVE_TOLERANCE_CM,
    )?;

    let mut builder = SortConfigBuilder::new()
        .module_order(module_keys)
        .sensitive_order(sensitive_keys);
    if let Some(strategy) = file_config.strategy {
        builder = builder.strategy(strategy);
    }
    if let Some(first_index) = file_config.first_index {
        builder = builder.first_index(first_index);
    }
    builder = apply_overrides(builder, &sensitive, &defaults)?;

    builder.build().map_err(|e| CliError::Config(e.to_string()))
}

fn resolve_order(
    section: &FileOrderConfig,
    default_order: &AxisOrder,
    default_tolerance: f64,
) -> Result<Vec<AxisKey>> {
    let keys = match (&section.order, section.tolerance) {
        (Some(text), tolerance) => {
            parser::parse_axis_order(text, tolerance.unwrap_or(default_tolerance))
        }
        (None, Some(tolerance)) => default_order
            .with_uniform_tolerance(tolerance)
            .map(|order| order.keys().to_vec()),
        (None, None) => Ok(default_order.keys().to_vec()),
    };
    keys.map_err(|e| CliError::Config(e.to_string()))
}

/// Built-in subsystem orderings follow a configured strip tolerance unless they are
/// replaced; explicit overrides are applied last.
fn apply_overrides(
    mut builder: SortConfigBuilder,
    sensitive: &FileSensitiveConfig,
    defaults: &SortConfig,
) -> Result<SortConfigBuilder> {
    if sensitive.replace_default_overrides.unwrap_or(false) {
        builder = builder.without_default_overrides();
    } else if let Some(tolerance) = sensitive.tolerance {
        for (subsystem, order) in &defaults.sensitive_overrides {
            let order = order
                .with_uniform_tolerance(tolerance)
                .map_err(|e| CliError::Config(e.to_string()))?;
            builder = builder.sensitive_override(*subsystem, order.keys().to_vec());
        }
    }

    let fallback = sensitive.tolerance.unwrap_or(DEFAULT_SENSITIVE_TOLERANCE_CM);
    for (tag, text) in sensitive.overrides.iter().flatten() {
        let subsystem: Subsystem = tag
            .parse()
            .map_err(|e| CliError::Config(format!("In `sensitive.overrides`: {}", e)))?;
        let keys = parser::parse_axis_order(text, fallback)
            .map_err(|e| CliError::Config(format!("In `sensitive.overrides.{}`: {}", tag, e)))?;
        builder = builder.sensitive_override(subsystem, keys);
    }
    Ok(builder)
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };
        let key = key.trim();
        let value_str = value_str.trim();

        match key {
            "strategy" => {
                config.strategy = Some(value_str.parse().map_err(|e| {
                    CliError::Config(format!("Invalid value for {}: {}", key, e))
                })?);
            }
            "first-index" => {
                config.first_index = Some(value_str.parse().map_err(|_| {
                    CliError::Config(format!("Invalid integer value for {}: {}", key, value_str))
                })?);
            }
            "modules.order" => {
                config
                    .modules
                    .get_or_insert_with(Default::default)
                    .order = Some(value_str.to_string());
            }
            "modules.tolerance" => {
                config
                    .modules
                    .get_or_insert_with(Default::default)
                    .tolerance = Some(parse_float(key, value_str)?);
            }
            "sensitive.order" => {
                config
                    .sensitive
                    .get_or_insert_with(Default::default)
                    .order = Some(value_str.to_string());
            }
            "sensitive.tolerance" => {
                config
                    .sensitive
                    .get_or_insert_with(Default::default)
                    .tolerance = Some(parse_float(key, value_str)?);
            }
            "sensitive.replace-default-overrides" => {
                config
                    .sensitive
                    .get_or_insert_with(Default::default)
                    .replace_default_overrides = Some(value_str.parse().map_err(|_| {
                    CliError::Config(format!("Invalid boolean value for {}: {}", key, value_str))
                })?);
            }
            _ => {
                let Some(tag) = key.strip_prefix("sensitive.overrides.") else {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                };
                config
                    .sensitive
                    .get_or_insert_with(Default::default)
                    .overrides
                    .get_or_insert_with(Default::default)
                    .insert(tag.to_string(), value_str.to_string());
            }
        }
    }
    Ok(config)
}

fn parse_float(key: &str, value_str: &str) -> Result<f64> {
    value_str
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid float value for {}: {}", key, value_str)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use auxsort::engine::config::{Axis, SortStrategy};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn base_sort_args() -> SortArgs {
        SortArgs {
            modules: PathBuf::from("modules.csv"),
            sensitive: None,
            output_dir: PathBuf::from("out"),
            config: None,
            strategy: None,
            first_index: None,
            set_values: vec![],
        }
    }

    fn write_config(dir: &tempfile::TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("sort.toml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn defaults_when_nothing_is_configured() {
        let app = build_config(&base_sort_args()).unwrap();
        assert_eq!(app.core_config, SortConfig::default());
        assert_eq!(app.modules_path, PathBuf::from("modules.csv"));
        assert_eq!(app.sensitive_path, None);
        assert_eq!(app.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn file_values_are_applied() {
        let dir = tempdir().unwrap();
        let mut args = base_sort_args();
        args.config = Some(write_config(
            &dir,
            r#"
            strategy = "volume-name"
            first-index = 1

            [modules]
            order = "x-,z+"
            tolerance = 0.5

            [sensitive]
            order = "y-,x+@0.002,z+"
            "#,
        ));

        let cfg = build_config(&args).unwrap().core_config;

        assert_eq!(cfg.strategy, SortStrategy::VolumeName);
        assert_eq!(cfg.first_index, 1);
        assert_eq!(
            cfg.module_order.keys(),
            &[
                AxisKey::descending(Axis::X, 0.5),
                AxisKey::ascending(Axis::Z, 0.5),
            ]
        );
        assert_eq!(
            cfg.sensitive_order.keys(),
            &[
                AxisKey::descending(Axis::Y, DEFAULT_SENSITIVE_TOLERANCE_CM),
                AxisKey::ascending(Axis::X, 0.002),
                AxisKey::ascending(Axis::Z, DEFAULT_SENSITIVE_TOLERANCE_CM),
            ]
        );
        assert_eq!(
            cfg.sensitive_order_for(Some(Subsystem::Minos)),
            &AxisOrder::standard_minos_sensitive()
        );
    }

    #[test]
    fn flags_override_file_and_set_values_override_flags() {
        let dir = tempdir().unwrap();
        let mut args = base_sort_args();
        args.config = Some(write_config(&dir, "strategy = \"volume-name\"\nfirst-index = 5\n"));
        args.strategy = Some(SortStrategy::Spatial);
        args.first_index = Some(1);
        args.set_values = vec!["first-index=2".to_string()];

        let cfg = build_config(&args).unwrap().core_config;

        assert_eq!(cfg.strategy, SortStrategy::Spatial);
        assert_eq!(cfg.first_index, 2);
    }

    #[test]
    fn tolerance_alone_keeps_the_standard_axes() {
        let mut args = base_sort_args();
        args.set_values = vec![
            "modules.tolerance=0.25".to_string(),
            "sensitive.tolerance=0.01".to_string(),
        ];

        let cfg = build_config(&args).unwrap().core_config;

        assert_eq!(
            cfg.module_order,
            AxisOrder::standard_modules().with_uniform_tolerance(0.25).unwrap()
        );
        assert_eq!(
            cfg.sensitive_order,
            AxisOrder::standard_sensitive().with_uniform_tolerance(0.01).unwrap()
        );
        assert_eq!(
            cfg.sensitive_order_for(Some(Subsystem::Minos)),
            &AxisOrder::standard_minos_sensitive()
                .with_uniform_tolerance(0.01)
                .unwrap()
        );
    }

    #[test]
    fn overrides_can_replace_the_built_in_ones() {
        let mut args = base_sort_args();
        args.set_values = vec![
            "sensitive.replace-default-overrides=true".to_string(),
            "sensitive.overrides.dc=x+,y-,z+".to_string(),
        ];

        let cfg = build_config(&args).unwrap().core_config;

        assert_eq!(cfg.sensitive_overrides.len(), 1);
        assert_eq!(
            cfg.sensitive_order_for(Some(Subsystem::DoubleChooz)).keys(),
            &[
                AxisKey::ascending(Axis::X, DEFAULT_SENSITIVE_TOLERANCE_CM),
                AxisKey::descending(Axis::Y, DEFAULT_SENSITIVE_TOLERANCE_CM),
                AxisKey::ascending(Axis::Z, DEFAULT_SENSITIVE_TOLERANCE_CM),
            ]
        );
        assert_eq!(
            cfg.sensitive_order_for(Some(Subsystem::Minos)),
            &cfg.sensitive_order
        );
    }

    #[test]
    fn invalid_set_values_are_rejected() {
        for bad in [
            "first-index",
            "first-index=-1",
            "modules.tolerance=wide",
            "strategy=random",
            "unknown.key=1",
        ] {
            let mut args = base_sort_args();
            args.set_values = vec![bad.to_string()];
            assert!(
                matches!(build_config(&args), Err(CliError::Config(_))),
                "accepted '{}'",
                bad
            );
        }
    }

    #[test]
    fn oversized_first_index_is_rejected() {
        let mut args = base_sort_args();
        args.set_values = vec![format!("first-index={}", usize::MAX)];
        let err = build_config(&args).err().unwrap();
        assert!(matches!(err, CliError::Config(ref message) if message.contains("First index")));

        let mut args = base_sort_args();
        args.first_index = Some(usize::MAX);
        assert!(matches!(build_config(&args), Err(CliError::Config(_))));
    }

    #[test]
    fn invalid_orders_surface_as_config_errors() {
        for bad in [
            "modules.order=x+,x-",
            "modules.tolerance=-0.1",
            "sensitive.order=",
            "sensitive.overrides.atlas=y+",
            "sensitive.overrides.minos=q+",
        ] {
            let mut args = base_sort_args();
            args.set_values = vec![bad.to_string()];
            assert!(
                matches!(build_config(&args), Err(CliError::Config(_))),
                "accepted '{}'",
                bad
            );
        }
    }
}
