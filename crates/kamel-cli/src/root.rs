use kamel_core::paths;
use std::path::{Path, PathBuf};

/// Resolve the operator configuration file.
///
/// Priority:
/// 1. `--config` flag / `KAMEL_CONFIG` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `.kamel/`
/// 3. Fall back to `cwd/.kamel/config.yaml` (which may not exist)
pub fn resolve_config(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_upward(&cwd).unwrap_or_else(|| paths::config_path(&cwd))
}

fn find_upward(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        if paths::kamel_dir(&dir).is_dir() {
            return Some(paths::config_path(&dir));
        }
        match dir.parent() {
            Some(p) => dir = p.to_path_buf(),
            None => return None,
        }
    }
}
