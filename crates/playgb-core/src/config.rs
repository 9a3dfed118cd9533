use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::host::{FileSystem, LCD_COLUMNS, LCD_ROWS};

/// Config file looked up in the data directory root.
pub const DEFAULT_CONFIG_PATH: &str = "playgb.toml";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrankConfig {
    /// Angle, measured from either end, at which a soft button counts as held.
    pub trigger_angle: f32,
    /// Half-width of the neutral band around 180 degrees.
    pub dead_angle: f32,
}

impl Default for CrankConfig {
    fn default() -> Self {
        Self {
            trigger_angle: 15.0,
            dead_angle: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RtcConfig {
    /// Upper bound on RTC seconds replayed in a single tick.
    pub max_catch_up_secs: u64,
}

impl Default for RtcConfig {
    fn default() -> Self {
        Self {
            max_catch_up_secs: crate::rtc::DEFAULT_MAX_CATCH_UP_SECS,
        }
    }
}

/// Placement of the 320x240 game area on the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LcdConfig {
    /// Left edge in pixels; must be a multiple of 8.
    pub x: usize,
    pub y: usize,
}

impl Default for LcdConfig {
    fn default() -> Self {
        Self { x: 32, y: 0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub games_dir: String,
    pub saves_dir: String,
    pub covers_dir: String,
    pub preferences_file: String,
    pub crank: CrankConfig,
    pub rtc: RtcConfig,
    pub lcd: LcdConfig,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            games_dir: "games".to_string(),
            saves_dir: "saves".to_string(),
            covers_dir: "covers".to_string(),
            preferences_file: "preferences.bin".to_string(),
            crank: CrankConfig::default(),
            rtc: RtcConfig::default(),
            lcd: LcdConfig::default(),
        }
    }
}

impl ShellConfig {
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let cfg = toml::from_str::<ShellConfig>(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let game_width = crate::display::GAME_WIDTH;
        if self.lcd.x % 8 != 0 || self.lcd.x + game_width > LCD_COLUMNS {
            return Err(ConfigError::Invalid(format!(
                "lcd.x = {} must be a multiple of 8 and leave room for {game_width} columns",
                self.lcd.x
            )));
        }
        if self.lcd.y >= LCD_ROWS {
            return Err(ConfigError::Invalid(format!(
                "lcd.y = {} is off screen",
                self.lcd.y
            )));
        }
        let crank = self.crank;
        if !(crank.trigger_angle > 0.0 && crank.dead_angle >= 0.0)
            || crank.trigger_angle >= 180.0 - crank.dead_angle
        {
            return Err(ConfigError::Invalid(format!(
                "crank trigger {} / dead {} do not fit in half a turn",
                crank.trigger_angle, crank.dead_angle
            )));
        }
        for (name, dir) in [
            ("games_dir", &self.games_dir),
            ("saves_dir", &self.saves_dir),
            ("preferences_file", &self.preferences_file),
        ] {
            if dir.is_empty() {
                return Err(ConfigError::Invalid(format!("{name} is empty")));
            }
        }
        Ok(())
    }

    /// Loads the config through the host file system. A missing file gives
    /// the defaults; an unreadable or invalid one logs and gives the defaults.
    pub fn load_from<F: FileSystem + ?Sized>(fs: &mut F, path: &str) -> Self {
        if !fs.exists(path) {
            return Self::default();
        }

        let bytes = match fs.read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Failed to read config {path}: {e}; using defaults");
                return Self::default();
            }
        };

        let text = String::from_utf8_lossy(&bytes);
        match Self::parse(&text) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("Failed to parse config {path}: {e}; using defaults");
                Self::default()
            }
        }
    }

    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}
