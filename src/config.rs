use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tilecraft_world::SimSettings;
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "config/tilecraft.toml";

/// Settings for the headless frame loop.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HeadlessConfig {
    /// Simulated frames per second; each frame advances by `1 / fps` seconds.
    pub fps: f64,
    /// Stop after this many ticks.
    pub max_ticks: u64,
    /// Frame index that reports a long stall instead of the usual delta.
    pub glitch_frame: Option<u64>,
    /// Length of the injected stall in seconds.
    pub glitch_seconds: f64,
    /// Half extent, in tiles, of the region captured for `--snapshot-out`.
    pub snapshot_radius: u32,
    pub save_dir: String,
    pub slot: String,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            fps: 60.0,
            max_ticks: 32 * 60,
            glitch_frame: None,
            glitch_seconds: 1.0,
            snapshot_radius: 24,
            save_dir: "saves".to_string(),
            slot: "default".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub sim: SimSettings,
    pub headless: HeadlessConfig,
}

impl AppConfig {
    /// Load configuration from the default path.
    pub fn load() -> Self {
        Self::load_from_path(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents).unwrap_or_else(|err| {
                warn!("Failed to parse {}: {err}. Using defaults", path.display());
                AppConfig::default()
            }),
            Err(err) => {
                if path == Path::new(DEFAULT_CONFIG_PATH)
                    && err.kind() == std::io::ErrorKind::NotFound
                {
                    warn!("Config not found at {}. Using defaults", path.display());
                } else {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                }
                AppConfig::default()
            }
        }
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Seconds of wall time per simulated frame.
    pub fn frame_delta(&self) -> f64 {
        if self.headless.fps.is_finite() && self.headless.fps > 0.0 {
            1.0 / self.headless.fps
        } else {
            1.0 / HeadlessConfig::default().fps
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg = AppConfig::parse(
            r#"
            [sim]
            seed = 99
            width = 256

            [headless]
            max_ticks = 10
            "#,
        )
        .expect("parse");
        assert_eq!(cfg.sim.seed, 99);
        assert_eq!(cfg.sim.width, 256);
        assert_eq!(cfg.sim.height, SimSettings::default().height);
        assert_eq!(cfg.headless.max_ticks, 10);
        assert_eq!(cfg.headless.slot, "default");
    }

    #[test]
    fn invalid_file_is_an_error() {
        assert!(AppConfig::parse("[sim]\nseed = \"nope\"").is_err());
    }

    #[test]
    fn missing_file_uses_defaults() {
        let cfg = AppConfig::load_from_path(Path::new("does/not/exist.toml"));
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn bad_fps_falls_back() {
        let mut cfg = AppConfig::default();
        cfg.headless.fps = 0.0;
        assert!((cfg.frame_delta() - 1.0 / 60.0).abs() < 1e-12);
    }
}
