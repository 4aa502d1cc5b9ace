//! scrcpy argument assembly and session launch.

use crate::utils::binary_resolver;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::process::ExitStatus;
use tokio::process::Command;

/// Bit rate passed to every session unless overridden by config
pub const DEFAULT_VIDEO_BIT_RATE: &str = "8M";

/// A named bundle of extra scrcpy arguments
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Preset {
    pub name: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Presets shipped with the tool. The first entry is the menu default.
pub fn builtin_presets() -> Vec<Preset> {
    vec![
        Preset {
            name: "Default".to_string(),
            args: vec![],
        },
        Preset {
            name: "Quest 2".to_string(),
            args: vec![
                "--crop=1600:900:2017:510".to_string(),
                "--no-control".to_string(),
            ],
        },
    ]
}

/// Accumulates user-selected mirroring options into a scrcpy argument
/// vector. An owned value threaded through the workflow, so no menu
/// closure ever mutates shared argument state.
#[derive(Debug, Clone)]
pub struct MirrorOptions {
    max_fps: Option<u32>,
    audio: bool,
    preset_args: Vec<String>,
    video_bit_rate: String,
}

impl MirrorOptions {
    pub fn new(video_bit_rate: impl Into<String>) -> Self {
        Self {
            max_fps: None,
            audio: true,
            preset_args: Vec::new(),
            video_bit_rate: video_bit_rate.into(),
        }
    }

    pub fn max_fps(mut self, fps: u32) -> Self {
        self.max_fps = Some(fps);
        self
    }

    pub fn audio(mut self, enabled: bool) -> Self {
        self.audio = enabled;
        self
    }

    pub fn preset(mut self, preset: &Preset) -> Self {
        self.preset_args.extend(preset.args.iter().cloned());
        self
    }

    /// Final argument vector: fps cap, audio toggle, preset args, then
    /// the global bit rate.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(fps) = self.max_fps {
            args.push(format!("--max-fps={}", fps));
        }
        if !self.audio {
            args.push("--no-audio".to_string());
        }
        args.extend(self.preset_args.iter().cloned());
        args.push(format!("--video-bit-rate={}", self.video_bit_rate));
        args
    }
}

/// Launch a mirroring session and wait for it to end. scrcpy keeps the
/// console (stdio is inherited) until the window is closed.
pub async fn launch(serial: &str, options: &MirrorOptions) -> Result<ExitStatus> {
    let scrcpy_path = binary_resolver::find_scrcpy()?;
    let status = Command::new(scrcpy_path)
        .arg("-s")
        .arg(serial)
        .args(options.to_args())
        .status()
        .await
        .context("Failed to launch scrcpy")?;
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_are_assembled_in_order() {
        let quest = &builtin_presets()[1];
        let options = MirrorOptions::new("8M")
            .max_fps(60)
            .audio(false)
            .preset(quest);
        assert_eq!(
            options.to_args(),
            vec![
                "--max-fps=60",
                "--no-audio",
                "--crop=1600:900:2017:510",
                "--no-control",
                "--video-bit-rate=8M",
            ]
        );
    }

    #[test]
    fn audio_enabled_omits_the_flag() {
        let options = MirrorOptions::new("4M").max_fps(30);
        assert_eq!(options.to_args(), vec!["--max-fps=30", "--video-bit-rate=4M"]);
    }

    #[test]
    fn default_preset_adds_no_args() {
        let presets = builtin_presets();
        assert_eq!(presets[0].name, "Default");
        let options = MirrorOptions::new("8M").preset(&presets[0]);
        assert_eq!(options.to_args(), vec!["--video-bit-rate=8M"]);
    }
}
