use auxsort::engine::config::SortConfig;
use std::path::PathBuf;

pub struct AppConfig {
    pub modules_path: PathBuf,
    pub sensitive_path: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub core_config: SortConfig,
}
