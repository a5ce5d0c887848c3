use lineforge::engine::config::GenerationConfig;
use std::path::PathBuf;

/// Fully merged settings for one `generate` invocation.
#[derive(Debug)]
pub struct AppConfig {
    pub pool_path: PathBuf,
    pub output_path: Option<PathBuf>,
    pub slate_path: Option<PathBuf>,
    /// `None` when the run should not be stored.
    pub runs_dir: Option<PathBuf>,
    pub generation: GenerationConfig,
}
