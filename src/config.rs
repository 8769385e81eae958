//! Configuration loading and validation
//!
//! Every value is a hardcoded constant; `load` exists so the constants are
//! checked once at startup instead of trusted everywhere they are used.

use std::ops::{Range, RangeInclusive};

use thiserror::Error;

use crate::confetti::Rgb;
use crate::hotkey::{Chord, ParseChordError};

/// Overlay configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Canvas width in physical pixels
    pub width: u32,

    /// Canvas height in physical pixels
    pub height: u32,

    /// Number of confetti pieces alive at any time
    pub particle_count: usize,

    /// Colors a piece may be spawned with
    pub palette: Vec<Rgb>,

    /// Side length of a piece, in pixels
    pub size: RangeInclusive<u32>,

    /// Fall speed in pixels per frame
    pub speed: Range<f32>,

    /// Frame rate cap for a running session
    pub frame_rate: u32,

    /// Chord that starts a session
    pub trigger: String,

    /// Key that ends the process
    pub exit_key: String,

    /// Overlay window title
    pub title: String,
}

/// Errors raised while validating the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("canvas must be non-empty, got {width}x{height}")]
    EmptyCanvas { width: u32, height: u32 },

    #[error("particle count must be at least 1")]
    NoParticles,

    #[error("palette must contain at least one color")]
    EmptyPalette,

    #[error("size range {min}..={max} is empty")]
    EmptySizeRange { min: u32, max: u32 },

    #[error("speed range {min}..{max} is empty")]
    EmptySpeedRange { min: f32, max: f32 },

    #[error("frame rate must be at least 1")]
    ZeroFrameRate,

    #[error("invalid hotkey {input:?}: {source}")]
    Hotkey {
        input: String,
        #[source]
        source: ParseChordError,
    },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            particle_count: 100,
            palette: vec![
                Rgb::new(255, 0, 0),
                Rgb::new(0, 255, 0),
                Rgb::new(0, 0, 255),
                Rgb::new(255, 255, 0),
                Rgb::new(255, 0, 255),
                Rgb::new(0, 255, 255),
            ],
            size: 5..=15,
            speed: 1.0..3.0,
            frame_rate: 30,
            trigger: "ctrl+shift+c".to_string(),
            exit_key: "esc".to_string(),
            title: "Confetti".to_string(),
        }
    }
}

impl Config {
    /// Load the built-in configuration and validate it
    pub fn load() -> Result<Self, ConfigError> {
        let config = Self::default();
        config.validate()?;
        Ok(config)
    }

    /// Check every constant is usable by the particle model and renderer
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyCanvas {
                width: self.width,
                height: self.height,
            });
        }
        if self.particle_count == 0 {
            return Err(ConfigError::NoParticles);
        }
        if self.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        if self.size.is_empty() {
            return Err(ConfigError::EmptySizeRange {
                min: *self.size.start(),
                max: *self.size.end(),
            });
        }
        if self.speed.is_empty() {
            return Err(ConfigError::EmptySpeedRange {
                min: self.speed.start,
                max: self.speed.end,
            });
        }
        if self.frame_rate == 0 {
            return Err(ConfigError::ZeroFrameRate);
        }
        self.trigger_chord()?;
        self.exit_chord()?;
        Ok(())
    }

    /// Parsed session trigger chord
    pub fn trigger_chord(&self) -> Result<Chord, ConfigError> {
        parse_chord(&self.trigger)
    }

    /// Parsed exit key
    pub fn exit_chord(&self) -> Result<Chord, ConfigError> {
        parse_chord(&self.exit_key)
    }
}

fn parse_chord(input: &str) -> Result<Chord, ConfigError> {
    input.parse().map_err(|source| ConfigError::Hotkey {
        input: input.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_load() {
        let config = Config::load().unwrap();
        assert_eq!((config.width, config.height), (800, 600));
        assert_eq!(config.particle_count, 100);
        assert_eq!(config.palette.len(), 6);
        assert_eq!(config.frame_rate, 30);
    }

    #[test]
    fn test_rejects_empty_palette() {
        let config = Config {
            palette: Vec::new(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyPalette)));
    }

    #[test]
    fn test_rejects_inverted_ranges() {
        #[allow(clippy::reversed_empty_ranges)]
        let config = Config {
            size: 15..=5,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptySizeRange { min: 15, max: 5 })
        ));

        let config = Config {
            speed: 3.0..3.0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptySpeedRange { .. })
        ));
    }

    #[test]
    fn test_rejects_zero_counts() {
        let config = Config {
            particle_count: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NoParticles)));

        let config = Config {
            frame_rate: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroFrameRate)));

        let config = Config {
            height: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyCanvas { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_hotkey() {
        let config = Config {
            trigger: "ctrl+shift+".to_string(),
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("ctrl+shift+"));
    }
}
