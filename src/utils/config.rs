use crate::scrcpy::{self, Preset};
use serde::Deserialize;
use std::path::PathBuf;

/// Application configuration, optionally overridden by
/// `~/.adb-tools/config.yaml`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Config {
    /// Bit rate handed to every scrcpy session
    #[serde(default = "default_video_bit_rate")]
    pub video_bit_rate: String,

    /// Mirroring presets; replaces the built-in table when non-empty
    #[serde(default)]
    pub presets: Vec<Preset>,
}

fn default_video_bit_rate() -> String {
    scrcpy::DEFAULT_VIDEO_BIT_RATE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            video_bit_rate: default_video_bit_rate(),
            presets: Vec::new(),
        }
    }
}

impl Config {
    pub fn config_path() -> Option<PathBuf> {
        Some(dirs::home_dir()?.join(".adb-tools").join("config.yaml"))
    }

    /// Load the user config, falling back to defaults when the file is
    /// missing. A malformed file is reported and ignored rather than
    /// aborting an interactive session.
    pub fn load() -> Config {
        let Some(path) = Self::config_path() else {
            return Config::default();
        };
        let Ok(contents) = std::fs::read_to_string(&path) else {
            return Config::default();
        };
        match serde_yaml::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring malformed config {}: {}", path.display(), e);
                Config::default()
            }
        }
    }

    /// Preset table for the mirror menu: user-configured presets when
    /// present, the built-ins otherwise.
    pub fn presets(&self) -> Vec<Preset> {
        if self.presets.is_empty() {
            scrcpy::builtin_presets()
        } else {
            self.presets.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.video_bit_rate, "8M");
        assert_eq!(config.presets(), scrcpy::builtin_presets());
    }

    #[test]
    fn user_presets_replace_builtins() {
        let yaml = "\
video_bit_rate: 4M
presets:
  - name: Tablet
    args: [\"--crop=1200:800:0:0\"]
  - name: Plain
";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.video_bit_rate, "4M");
        let presets = config.presets();
        assert_eq!(presets.len(), 2);
        assert_eq!(presets[0].name, "Tablet");
        assert_eq!(presets[0].args, vec!["--crop=1200:800:0:0"]);
        assert!(presets[1].args.is_empty());
    }
}
