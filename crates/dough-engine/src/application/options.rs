//! Settings for the config subsystem itself.

use std::path::Path;

use dough_core::DEFAULT_CONFIG_EXTENSION;

/// How the document store treats the config directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigOptions {
    /// Extensions recognised as config files.  Each entry **includes** the
    /// dot, e.g. `".cfg"`.
    pub extensions: Vec<String>,
    /// Number of rotated copies kept per file under `<dir>/backups/`, taken
    /// each time the file is loaded.  `0` disables backups.
    pub backup_history: usize,
    /// Rename files that fail to parse to `<file>.corrupt.<unix secs>` so the
    /// next save does not overwrite them.
    pub quarantine_malformed: bool,
}

impl Default for ConfigOptions {
    fn default() -> Self {
        Self {
            extensions: vec![DEFAULT_CONFIG_EXTENSION.to_string()],
            backup_history: 0,
            quarantine_malformed: true,
        }
    }
}

impl ConfigOptions {
    /// Returns `true` if `path`'s extension is on the allow-list.
    pub fn recognises(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.extensions
            .iter()
            .any(|allowed| allowed.strip_prefix('.') == Some(ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_recognises_cfg_only() {
        let opts = ConfigOptions::default();
        assert!(opts.recognises(Path::new("Config/EngineCore.cfg")));
        assert!(!opts.recognises(Path::new("Config/notes.txt")));
        assert!(!opts.recognises(Path::new("Config/EngineCore.cfg.tmp")));
        assert!(!opts.recognises(Path::new("Config/README")));
    }

    #[test]
    fn test_custom_extensions() {
        let opts = ConfigOptions {
            extensions: vec![".toml".to_string(), ".cfg".to_string()],
            ..ConfigOptions::default()
        };
        assert!(opts.recognises(Path::new("a.toml")));
        assert!(opts.recognises(Path::new("b.cfg")));
    }

    #[test]
    fn test_extension_without_dot_is_not_matched() {
        // Entries must include the dot
        let opts = ConfigOptions {
            extensions: vec!["cfg".to_string()],
            ..ConfigOptions::default()
        };
        assert!(!opts.recognises(Path::new("a.cfg")));
    }
}
