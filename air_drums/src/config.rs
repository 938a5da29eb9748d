//! Application configuration.
//!
//! Everything has a default, so an empty (or absent) file gives the classic
//! two-piece kit: hi-hat on the left, snare on the right, red stick.
//!
//! ```toml
//! [camera]
//! index  = 0
//! mirror = true
//!
//! [trigger]
//! cooldown_ms = 200
//! coverage    = 0.8
//! quit_key    = "q"
//! layout      = "legacy"      # or "symmetric"
//!
//! [audio]
//! backend = "samples"         # "midi" or "none"
//!
//! [[instrument]]
//! kind  = "hat"
//! sound = "sounds/high_hat_2.wav"
//! icon  = "images/high_hat.png"
//!
//! [[instrument]]
//! kind  = "snare"
//! sound = "sounds/snare_2.wav"
//! icon  = "images/snare_drum.png"
//!
//! [instrument.color]             # green stick for the snare only
//! first  = { lower = [35, 80, 80], upper = [85, 255, 255] }
//! second = { lower = [35, 80, 80], upper = [85, 255, 255] }
//! ```
//!
//! Relative asset paths are resolved against the directory of the config
//! file, or the working directory when no file was given.

use std::path::{Path, PathBuf};
use std::time::Duration;

use air_kit::{InstrumentKind, LoopConfig};
use region_mask::{ColorRange, ColumnMapping, Coverage, LayoutError, RangeError, MAX_INSTRUMENTS};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::audio::AudioChoice;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path:   PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("no instruments configured")]
    NoInstruments,
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Range(#[from] RangeError),
    #[error("quit key {0:?} must be a letter or digit")]
    QuitKey(char),
    #[error("cooldown must be at least 1 ms")]
    ZeroCooldown,
}

// ════════════════════════════════════════════════════════════════════════════
// Sections
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    /// Webcam index (only used with the `camera` feature).
    pub index:  u32,
    /// Flip frames horizontally so the screen acts as a mirror.
    pub mirror: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        CameraConfig { index: 0, mirror: true }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TriggerConfig {
    pub cooldown_ms: u64,
    pub coverage:    f64,
    pub quit_key:    char,
    pub layout:      ColumnMapping,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        TriggerConfig {
            cooldown_ms: 200,
            coverage:    Coverage::DEFAULT,
            quit_key:    'q',
            layout:      ColumnMapping::Legacy,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AudioConfig {
    pub backend:       AudioChoice,
    /// Note-on velocity for the MIDI backend.
    pub midi_velocity: u8,
}

impl Default for AudioConfig {
    fn default() -> Self {
        AudioConfig { backend: AudioChoice::Samples, midi_velocity: 110 }
    }
}

/// Synthetic camera used when no webcam is compiled in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    pub width:       u32,
    pub height:      u32,
    /// Size of the painted stick tip; larger than a region so one press covers it.
    pub blob_width:  u32,
    pub blob_height: u32,
    /// RGB color of the stick tip.
    pub stick:       [u8; 3],
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            width:       1280,
            height:      720,
            blob_width:  220,
            blob_height: 120,
            stick:       [230, 20, 20],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstrumentConfig {
    pub kind:  InstrumentKind,
    pub sound: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon:  Option<PathBuf>,
    /// Overrides the default red stick color for this instrument.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorRange>,
}

impl InstrumentConfig {
    pub fn new(kind: InstrumentKind, sound: &str, icon: &str) -> Self {
        InstrumentConfig {
            kind,
            sound: sound.into(),
            icon:  Some(icon.into()),
            color: None,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub camera:  CameraConfig,
    pub trigger: TriggerConfig,
    pub audio:   AudioConfig,
    pub sim:     SimConfig,
    #[serde(rename = "instrument")]
    pub instruments: Vec<InstrumentConfig>,
    /// Directory relative asset paths are resolved against.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            camera:  CameraConfig::default(),
            trigger: TriggerConfig::default(),
            audio:   AudioConfig::default(),
            sim:     SimConfig::default(),
            instruments: vec![
                InstrumentConfig::new(InstrumentKind::Hat,   "sounds/high_hat_2.wav", "images/high_hat.png"),
                InstrumentConfig::new(InstrumentKind::Snare, "sounds/snare_2.wav",    "images/snare_drum.png"),
            ],
            base_dir: None,
        }
    }
}

impl AppConfig {
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let full = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        let mut config: AppConfig = toml::from_str(&full)?;
        config.base_dir = path.parent().map(Path::to_owned);
        debug!(
            path = %path.display(),
            instruments = config.instruments.len(),
            "loaded"
        );
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Check everything that can be checked before opening devices.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let count = self.instruments.len();
        if count == 0 {
            return Err(ConfigError::NoInstruments);
        }
        if count > MAX_INSTRUMENTS {
            return Err(LayoutError::TooManyInstruments { count }.into());
        }
        self.coverage()?;
        if !self.trigger.quit_key.is_ascii_alphanumeric() {
            return Err(ConfigError::QuitKey(self.trigger.quit_key));
        }
        if self.trigger.cooldown_ms == 0 {
            return Err(ConfigError::ZeroCooldown);
        }
        Ok(())
    }

    pub fn coverage(&self) -> Result<Coverage, ConfigError> {
        Ok(Coverage::new(self.trigger.coverage)?)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.trigger.cooldown_ms)
    }

    pub fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            mirror:   self.camera.mirror,
            quit_key: self.trigger.quit_key,
            cooldown: self.cooldown(),
        }
    }

    /// Resolve an asset path against [`AppConfig::base_dir`].
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_owned(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use region_mask::{Hsv8, HsvBand};

    #[test]
    fn defaults_are_the_two_piece_kit() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.instruments.len(), 2);
        assert_eq!(cfg.instruments[0].kind, InstrumentKind::Hat);
        assert_eq!(cfg.instruments[1].sound, PathBuf::from("sounds/snare_2.wav"));
        assert_eq!(cfg.loop_config(), LoopConfig::default());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn empty_file_gives_defaults() {
        let cfg: AppConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [trigger]
            cooldown_ms = 350
            layout = "symmetric"

            [[instrument]]
            kind = "kick"
            sound = "kick.wav"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.cooldown(), Duration::from_millis(350));
        assert_eq!(cfg.trigger.layout, ColumnMapping::Symmetric);
        assert_eq!(cfg.trigger.quit_key, 'q');
        assert_eq!(cfg.instruments.len(), 1);
        assert_eq!(cfg.instruments[0].icon, None);
        assert!(cfg.camera.mirror);
    }

    #[test]
    fn per_instrument_color() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [[instrument]]
            kind = "tom"
            sound = "tom.wav"

            [instrument.color]
            first  = { lower = [35, 80, 80], upper = [85, 255, 255] }
            second = { lower = [35, 80, 80], upper = [85, 255, 255] }
            "#,
        )
        .unwrap();
        let band = HsvBand::new(Hsv8::new(35, 80, 80), Hsv8::new(85, 255, 255)).unwrap();
        assert_eq!(cfg.instruments[0].color, Some(ColorRange::single(band)));
    }

    #[test]
    fn inverted_band_is_a_parse_error() {
        let err = toml::from_str::<AppConfig>(
            r#"
            [[instrument]]
            kind = "tom"
            sound = "tom.wav"

            [instrument.color]
            first  = { lower = [90, 80, 80], upper = [85, 255, 255] }
            second = { lower = [35, 80, 80], upper = [85, 255, 255] }
            "#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<AppConfig>("[trigger]\ncooldwn_ms = 5\n").is_err());
    }

    #[test]
    fn five_instruments_is_a_layout_error() {
        let mut cfg = AppConfig::default();
        for kind in [InstrumentKind::Kick, InstrumentKind::Crash, InstrumentKind::Tom] {
            cfg.instruments.push(InstrumentConfig::new(kind, "x.wav", "x.png"));
        }
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Layout(LayoutError::TooManyInstruments { count: 5 }))
        ));
    }

    #[test]
    fn validation_errors() {
        let mut cfg = AppConfig::default();
        cfg.trigger.coverage = 1.5;
        assert!(matches!(cfg.validate(), Err(ConfigError::Range(_))));

        let mut cfg = AppConfig::default();
        cfg.trigger.quit_key = ' ';
        assert!(matches!(cfg.validate(), Err(ConfigError::QuitKey(' '))));

        let mut cfg = AppConfig::default();
        cfg.trigger.cooldown_ms = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::ZeroCooldown)));

        let mut cfg = AppConfig::default();
        cfg.instruments.clear();
        assert!(matches!(cfg.validate(), Err(ConfigError::NoInstruments)));
    }

    #[test]
    fn dump_then_reload() {
        let mut cfg = AppConfig::default();
        cfg.trigger.quit_key = 'x';
        cfg.audio.backend = AudioChoice::Midi;
        let text = cfg.to_toml_string().unwrap();
        let back: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn relative_paths_follow_the_config_file() {
        let mut cfg = AppConfig::default();
        assert_eq!(cfg.resolve(Path::new("a.wav")), PathBuf::from("a.wav"));
        cfg.base_dir = Some(PathBuf::from("/kits/rock"));
        assert_eq!(cfg.resolve(Path::new("a.wav")), PathBuf::from("/kits/rock/a.wav"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = AppConfig::load_file(Path::new("/nonexistent/air_drums.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/air_drums.toml"));
    }
}
