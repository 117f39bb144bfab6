use crate::cli::ConfigArgs;
use crate::config::file::FileConfig;
use crate::error::{CliError, Result};
use auxsort::engine::config::SortConfig;
use tracing::info;

pub fn run(args: ConfigArgs) -> Result<()> {
    let text = render_default_config()?;
    match args.output {
        Some(path) => {
            std::fs::write(&path, text)?;
            info!("Default configuration written to {:?}", path);
            println!("Default configuration written to: {}", path.display());
        }
        None => print!("{}", text),
    }
    Ok(())
}

/// The library defaults as a TOML document accepted by `sort --config`.
pub fn render_default_config() -> Result<String> {
    let file = FileConfig::from(&SortConfig::default());
    toml::to_string_pretty(&file).map_err(|e| CliError::Config(e.to_string()))
}
