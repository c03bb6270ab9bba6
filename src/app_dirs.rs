use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Key-value store file, under `$HOME/.local/state/mathsprint` when HOME is set
    pub fn store_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("mathsprint");
            Some(state_dir.join("store.json"))
        } else {
            ProjectDirs::from("", "", "mathsprint")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("store.json"))
        }
    }
}
