use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How to launch the Ruby runtime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RubySettings {
    /// Ruby executable, looked up on `PATH` when not absolute.
    /// Default: "ruby"
    pub executable: PathBuf,

    /// Directories added to `$LOAD_PATH` (`-I`).
    pub load_paths: Vec<PathBuf>,

    /// Libraries required before every evaluation (`-r`).
    pub requires: Vec<String>,
}

impl Default for RubySettings {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("ruby"),
            load_paths: Vec::new(),
            requires: Vec::new(),
        }
    }
}
