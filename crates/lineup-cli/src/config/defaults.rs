use std::path::PathBuf;

/// Front-end defaults. Engine defaults live with the engine's own config types.
pub struct DefaultsConfig {
    pub runs_dir: PathBuf,
    /// Upper bound accepted for `num-lineups`, matching the site's entry limit.
    pub max_lineups: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            runs_dir: PathBuf::from("lineforge-runs"),
            max_lineups: 150,
        }
    }
}
