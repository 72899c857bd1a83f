use std::path::{Path, PathBuf};
use std::time::Duration;

use log::info;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::clock::DEFAULT_PERIOD;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },
}

/// Look of one gear sprite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GearStyle {
    /// Edge length of the square sprite in pixels
    pub diameter: u32,
    pub teeth: u32,
    pub color: [u8; 3],
}

impl GearStyle {
    pub const HUB: GearStyle = GearStyle {
        diameter: 24,
        teeth: 12,
        color: [176, 182, 196],
    };
    pub const MID: GearStyle = GearStyle {
        diameter: 16,
        teeth: 8,
        color: [214, 168, 72],
    };
    pub const SMALL: GearStyle = GearStyle {
        diameter: 12,
        teeth: 6,
        color: [150, 110, 80],
    };
}

/// A gear table as written in the file; missing keys keep the role's default
#[derive(Debug, Default, Deserialize)]
struct GearStyleTable {
    diameter: Option<u32>,
    teeth: Option<u32>,
    color: Option<[u8; 3]>,
}

impl GearStyleTable {
    fn over(self, base: GearStyle) -> GearStyle {
        GearStyle {
            diameter: self.diameter.unwrap_or(base.diameter),
            teeth: self.teeth.unwrap_or(base.teeth),
            color: self.color.unwrap_or(base.color),
        }
    }
}

fn hub_style<'de, D: Deserializer<'de>>(deserializer: D) -> Result<GearStyle, D::Error> {
    GearStyleTable::deserialize(deserializer).map(|table| table.over(GearStyle::HUB))
}

fn mid_style<'de, D: Deserializer<'de>>(deserializer: D) -> Result<GearStyle, D::Error> {
    GearStyleTable::deserialize(deserializer).map(|table| table.over(GearStyle::MID))
}

fn small_style<'de, D: Deserializer<'de>>(deserializer: D) -> Result<GearStyle, D::Error> {
    GearStyleTable::deserialize(deserializer).map(|table| table.over(GearStyle::SMALL))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GearsConfig {
    /// Natural size of the whole drawable in pixels
    pub intrinsic_width: u32,
    pub intrinsic_height: u32,
    /// How far adjacent gear rims overlap, in pixels
    pub tooth_depth: u32,
    /// Length of one full turn of the hub, in milliseconds
    pub period_ms: u64,
    pub fps: u32,
    /// Color behind the gears; the terminal's own background when unset
    pub background: Option<[u8; 3]>,
    #[serde(deserialize_with = "hub_style")]
    pub hub: GearStyle,
    #[serde(deserialize_with = "mid_style")]
    pub mid: GearStyle,
    #[serde(deserialize_with = "small_style")]
    pub small: GearStyle,
}

impl Default for GearsConfig {
    fn default() -> Self {
        GearsConfig {
            intrinsic_width: 48,
            intrinsic_height: 40,
            tooth_depth: 3,
            period_ms: DEFAULT_PERIOD.as_millis() as u64,
            fps: 60,
            background: None,
            hub: GearStyle::HUB,
            mid: GearStyle::MID,
            small: GearStyle::SMALL,
        }
    }
}

impl GearsConfig {
    /// Loads the config at `path`, or the defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!("loaded config from {path:?}");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Checks the values that would stall the animation loop
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.period_ms == 0 {
            return Err(ConfigError::NotPositive { field: "period_ms" });
        }
        if self.fps == 0 {
            return Err(ConfigError::NotPositive { field: "fps" });
        }
        Ok(())
    }

    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.fps.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn missing_path_gives_defaults() {
        let config = GearsConfig::load(None).unwrap();
        assert_eq!(config, GearsConfig::default());
        assert_eq!(config.period(), Duration::from_millis(3000));
        config.validate().unwrap();
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = GearsConfig::parse(
            r#"
            tooth_depth = 5
            background = [0, 0, 0]

            [mid]
            diameter = 20
            teeth = 10
            color = [1, 2, 3]
            "#,
        )
        .unwrap();
        assert_eq!(config.tooth_depth, 5);
        assert_eq!(config.background, Some([0, 0, 0]));
        assert_eq!(
            config.mid,
            GearStyle {
                diameter: 20,
                teeth: 10,
                color: [1, 2, 3]
            }
        );
        assert_eq!(config.hub, GearsConfig::default().hub);
        assert_eq!(config.period_ms, 3000);
    }

    #[test]
    fn partial_gear_table_keeps_role_defaults() {
        let config = GearsConfig::parse("[hub]\ncolor = [1, 2, 3]\n").unwrap();
        assert_eq!(
            config.hub,
            GearStyle {
                color: [1, 2, 3],
                ..GearStyle::HUB
            }
        );
        assert_eq!(config.mid, GearStyle::MID);

        let config = GearsConfig::parse("[small]\nteeth = 9\n").unwrap();
        assert_eq!(
            config.small,
            GearStyle {
                teeth: 9,
                ..GearStyle::SMALL
            }
        );
    }

    #[test]
    fn default_period_matches_clock() {
        assert_eq!(GearsConfig::default().period(), DEFAULT_PERIOD);
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "period_ms = 1500\nfps = 30").unwrap();
        let config = GearsConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.period(), Duration::from_millis(1500));
        assert_eq!(config.frame_interval(), Duration::from_secs(1) / 30);
    }

    #[test]
    fn unreadable_and_malformed_files_fail() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            GearsConfig::load(Some(&missing)),
            Err(ConfigError::Read { .. })
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "fps = \"fast\"").unwrap();
        assert!(matches!(
            GearsConfig::load(Some(file.path())),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn zero_period_or_fps_is_rejected() {
        let config = GearsConfig {
            period_ms: 0,
            ..GearsConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive { field: "period_ms" })
        ));
        let config = GearsConfig {
            fps: 0,
            ..GearsConfig::default()
        };
        assert_eq!(
            config.validate().unwrap_err().to_string(),
            "fps must be greater than zero"
        );
    }
}
