//! Engine configuration loaded from TOML
//!
//! Every section is optional:
//!
//! ```toml
//! [storage]
//! root = "/var/lib/seals"
//!
//! [preview]
//! dpi = 150
//! pdfium_library = "/opt/pdfium/lib"
//!
//! [fonts]
//! system_fonts = false
//!
//! [[fonts.register]]
//! name = "KaiTi"
//! path = "/usr/share/fonts/kaiti.ttf"
//! description = "Regular script"
//!
//! [seal]
//! default_color = "#DC2828"
//!
//! [seal.calibration]
//! canvas_margin = 40
//! ```

use crate::preview::DEFAULT_PREVIEW_DPI;
use anyhow::{bail, Context};
use seal_render::{FontOptions, SealCalibration};
use seal_types::Rgb;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub preview: PreviewConfig,
    #[serde(default)]
    pub fonts: FontOptions,
    #[serde(default)]
    pub seal: SealConfig,
}

impl EngineConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(s).context("Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.preview.dpi == 0 {
            bail!("preview.dpi must be positive");
        }
        self.seal.color()?;
        for font in &self.fonts.register {
            if font.name.trim().is_empty() {
                bail!("registered font {} has no name", font.path.display());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Contract files, signed versions and the preview cache live under here
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("uploads")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewConfig {
    #[serde(default = "default_dpi")]
    pub dpi: u32,
    /// Directory holding the Pdfium shared library; the system library is
    /// used when unset or unusable
    #[serde(default)]
    pub pdfium_library: Option<PathBuf>,
}

fn default_dpi() -> u32 {
    DEFAULT_PREVIEW_DPI
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            dpi: default_dpi(),
            pdfium_library: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SealConfig {
    /// Hex color used when a seal request names none
    #[serde(default)]
    pub default_color: Option<String>,
    #[serde(default)]
    pub calibration: SealCalibration,
}

impl SealConfig {
    pub fn color(&self) -> anyhow::Result<Rgb> {
        Rgb::parse_or(self.default_color.as_deref(), Rgb::SEAL_RED)
            .context("seal.default_color is not a valid color")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = EngineConfig::from_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.preview.dpi, 150);
        assert_eq!(config.storage.root, PathBuf::from("uploads"));
        assert_eq!(config.seal.color().unwrap(), Rgb::SEAL_RED);
        assert!(config.fonts.system_fonts);
    }

    #[test]
    fn test_full_config() {
        let toml = r##"
            [storage]
            root = "/srv/seals"

            [preview]
            dpi = 96
            pdfium_library = "/opt/pdfium"

            [fonts]
            system_fonts = false

            [[fonts.register]]
            name = "KaiTi"
            path = "/fonts/kaiti.ttf"

            [seal]
            default_color = "#0000FF"

            [seal.calibration]
            canvas_margin = 60.0
            border_divisor = 30.0
        "##;
        let config = EngineConfig::from_str(toml).unwrap();
        assert_eq!(config.storage.root, PathBuf::from("/srv/seals"));
        assert_eq!(config.preview.dpi, 96);
        assert_eq!(config.preview.pdfium_library, Some(PathBuf::from("/opt/pdfium")));
        assert!(!config.fonts.system_fonts);
        assert_eq!(config.fonts.register.len(), 1);
        assert!(config.fonts.register[0].recommended);
        assert_eq!(config.seal.color().unwrap(), Rgb::new(0, 0, 255));
        assert_eq!(config.seal.calibration.canvas_margin, 60.0);
        assert_eq!(config.seal.calibration.border_divisor, 30.0);
        // unspecified calibration fields keep their defaults
        assert_eq!(config.seal.calibration.star_divisor, 3.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(EngineConfig::from_str("[preview]\ndpi = 0").is_err());
        assert!(EngineConfig::from_str("[seal]\ndefault_color = \"red\"").is_err());
        assert!(EngineConfig::from_str("[storage\nroot = 1").is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seal.toml");
        fs::write(&path, "[preview]\ndpi = 72\n").unwrap();
        assert_eq!(EngineConfig::from_file(&path).unwrap().preview.dpi, 72);

        let err = EngineConfig::from_file(dir.path().join("missing.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
