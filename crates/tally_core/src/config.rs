use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

/// A 24-bit RGB color, serialized as `"#RRGGBB"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(pub u32);

impl HexColor {
    pub const WHITE: HexColor = HexColor(0xFFFFFF);
    pub const BLACK: HexColor = HexColor(0x000000);
    pub const GREY_25: HexColor = HexColor(0xC0C0C0);
    pub const GREY_50: HexColor = HexColor(0x808080);

    pub fn rgb(self) -> u32 {
        self.0
    }
}

impl TryFrom<String> for HexColor {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        let digits = value.trim().trim_start_matches('#');
        if digits.len() != 6 {
            return Err(format!("expected #RRGGBB, got {value:?}"));
        }
        u32::from_str_radix(digits, 16)
            .map(HexColor)
            .map_err(|e| format!("invalid color {value:?}: {e}"))
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_string()
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0)
    }
}

// ---------------------------------------------------------------------------
// StyleConfig
// ---------------------------------------------------------------------------

/// Fonts and colors for spreadsheet output. Passed by value into each render
/// so concurrent exports never share mutable style state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub font_size: f64,
    pub title_fill: HexColor,
    pub title_font_color: HexColor,
    pub header_fill: HexColor,
    pub header_font_color: HexColor,
    pub data_fill: HexColor,
    pub data_font_color: HexColor,
    pub border_color: HexColor,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            title_fill: HexColor::GREY_50,
            title_font_color: HexColor::WHITE,
            header_fill: HexColor::GREY_25,
            header_font_color: HexColor::WHITE,
            data_fill: HexColor::WHITE,
            data_font_color: HexColor::BLACK,
            border_color: HexColor::GREY_25,
        }
    }
}

// ---------------------------------------------------------------------------
// ExportConfig
// ---------------------------------------------------------------------------

/// Export settings stored at `~/.tally/config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub style: StyleConfig,
    /// Field delimiter for delimited-text output. Must be a single ASCII char.
    pub delimiter: char,
    /// Sheets with more rows than this are written in constant-memory mode.
    pub windowed_row_threshold: usize,
    pub log_level: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            style: StyleConfig::default(),
            delimiter: ',',
            windowed_row_threshold: 5_000,
            log_level: "info".into(),
        }
    }
}

impl ExportConfig {
    /// Returns the base config directory: `~/.tally/`
    pub fn base_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".tally"))
    }

    /// Returns the config file path: `~/.tally/config.json`
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("config.json"))
    }

    /// Returns the logs directory: `~/.tally/logs/`
    pub fn logs_dir() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("logs"))
    }

    /// Loads config from `~/.tally/config.json`, writing the defaults there
    /// on first use.
    pub fn load() -> Result<Self> {
        let base = Self::base_dir()?;
        std::fs::create_dir_all(&base)
            .with_context(|| format!("Failed to create directory: {}", base.display()))?;
        let path = Self::config_path()?;
        if !path.exists() {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config at {}", path.display());
            return Ok(config);
        }
        Self::load_from_path(&path)
    }

    /// Load config from a specific file path. A missing file yields defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.validate()?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to a specific file path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.delimiter.is_ascii() || matches!(self.delimiter, '"' | '\n' | '\r') {
            bail!("delimiter must be a single ASCII character other than a quote or line break");
        }
        if !(self.style.font_size > 0.0 && self.style.font_size <= 409.0) {
            bail!("font_size must be between 0 and 409, got {}", self.style.font_size);
        }
        Ok(())
    }

    /// The delimiter as the byte the CSV writer expects.
    pub fn delimiter_byte(&self) -> u8 {
        if self.delimiter.is_ascii() {
            self.delimiter as u8
        } else {
            b','
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_report_styling() {
        let config = ExportConfig::default();
        assert_eq!(config.delimiter, ',');
        assert_eq!(config.style.font_size, 14.0);
        assert_eq!(config.style.title_fill, HexColor::GREY_50);
        assert_eq!(config.style.header_fill, HexColor::GREY_25);
        assert_eq!(config.style.data_font_color, HexColor::BLACK);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_hex_color_serde() {
        let json = serde_json::to_string(&HexColor(0x1F4E79)).unwrap();
        assert_eq!(json, "\"#1F4E79\"");
        let back: HexColor = serde_json::from_str("\"#c0c0c0\"").unwrap();
        assert_eq!(back, HexColor::GREY_25);
        assert!(serde_json::from_str::<HexColor>("\"#12345\"").is_err());
        assert!(serde_json::from_str::<HexColor>("\"#GGGGGG\"").is_err());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: ExportConfig =
            serde_json::from_str(r#"{"delimiter": ";", "style": {"font_size": 11.0}}"#).unwrap();
        assert_eq!(config.delimiter, ';');
        assert_eq!(config.style.font_size, 11.0);
        assert_eq!(config.style.title_fill, HexColor::GREY_50);
        assert_eq!(config.windowed_row_threshold, 5_000);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = ExportConfig::load_from_path(&tmp.path().join("absent.json")).unwrap();
        assert_eq!(config, ExportConfig::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        let mut config = ExportConfig::default();
        config.delimiter = '\t';
        config.style.header_fill = HexColor(0x336699);
        config.save_to_path(&path).unwrap();

        let loaded = ExportConfig::load_from_path(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.delimiter_byte(), b'\t');
    }

    #[test]
    fn test_invalid_delimiter_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, r#"{"delimiter": "\""}"#).unwrap();
        assert!(ExportConfig::load_from_path(&path).is_err());
    }

    #[test]
    fn test_unparsable_config_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = ExportConfig::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }
}
