//! Converter configuration

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};

/// Supported MP3 target bitrates.
///
/// The encoding engine only accepts a fixed set of constant bitrates, so the
/// configured value is validated into this enum before any conversion work
/// begins rather than being discovered mid-stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Bitrate {
    Kbps64,
    Kbps96,
    Kbps128,
    Kbps160,
    Kbps192,
    Kbps256,
    Kbps320,
}

impl Bitrate {
    /// All supported bitrates, in ascending order.
    pub const ALL: [Bitrate; 7] = [
        Bitrate::Kbps64,
        Bitrate::Kbps96,
        Bitrate::Kbps128,
        Bitrate::Kbps160,
        Bitrate::Kbps192,
        Bitrate::Kbps256,
        Bitrate::Kbps320,
    ];

    /// Validate a kbps value into a supported bitrate.
    pub fn from_kbps(kbps: u32) -> Result<Self> {
        Self::try_from(kbps).map_err(ConvertError::Config)
    }

    /// The numeric kbps value.
    pub fn kbps(self) -> u32 {
        match self {
            Bitrate::Kbps64 => 64,
            Bitrate::Kbps96 => 96,
            Bitrate::Kbps128 => 128,
            Bitrate::Kbps160 => 160,
            Bitrate::Kbps192 => 192,
            Bitrate::Kbps256 => 256,
            Bitrate::Kbps320 => 320,
        }
    }
}

impl Default for Bitrate {
    fn default() -> Self {
        Bitrate::Kbps128
    }
}

impl TryFrom<u32> for Bitrate {
    type Error = String;

    fn try_from(kbps: u32) -> std::result::Result<Self, Self::Error> {
        match kbps {
            64 => Ok(Bitrate::Kbps64),
            96 => Ok(Bitrate::Kbps96),
            128 => Ok(Bitrate::Kbps128),
            160 => Ok(Bitrate::Kbps160),
            192 => Ok(Bitrate::Kbps192),
            256 => Ok(Bitrate::Kbps256),
            320 => Ok(Bitrate::Kbps320),
            _ => Err(format!("unsupported MP3 bitrate: {} kbps", kbps)),
        }
    }
}

impl From<Bitrate> for u32 {
    fn from(bitrate: Bitrate) -> u32 {
        bitrate.kbps()
    }
}

/// Converter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Target MP3 bitrate in kbps
    pub bitrate: Bitrate,

    /// Seconds to keep a completed file's progress record around before
    /// removing it (presentation settle time). Must be non-zero.
    pub progress_grace_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            bitrate: Bitrate::default(),
            progress_grace_secs: 2,
            log_level: "info".to_string(),
        }
    }
}

impl ConverterConfig {
    /// Check the configuration for values that would fail mid-conversion.
    pub fn validate(&self) -> Result<()> {
        if self.progress_grace_secs == 0 {
            return Err(ConvertError::Config(
                "progress_grace_secs must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Grace period as a [`std::time::Duration`].
    pub fn progress_grace(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.progress_grace_secs)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> std::result::Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: ConverterConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: &str) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConverterConfig::default();
        assert_eq!(config.bitrate, Bitrate::Kbps128);
        assert_eq!(config.progress_grace_secs, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bitrate_from_kbps() {
        for bitrate in Bitrate::ALL {
            assert_eq!(Bitrate::from_kbps(bitrate.kbps()).unwrap(), bitrate);
        }
    }

    #[test]
    fn test_bitrate_rejects_unsupported() {
        assert!(Bitrate::from_kbps(0).is_err());
        assert!(Bitrate::from_kbps(112).is_err());
        assert!(Bitrate::from_kbps(384).is_err());
    }

    #[test]
    fn test_zero_grace_rejected() {
        let config = ConverterConfig {
            progress_grace_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_roundtrip() {
        let toml_str = "bitrate = 192\nprogress_grace_secs = 5\n";
        let config: ConverterConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.bitrate, Bitrate::Kbps192);
        assert_eq!(config.progress_grace_secs, 5);
        // unspecified fields fall back to defaults
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_toml_rejects_bad_bitrate() {
        let toml_str = "bitrate = 100\n";
        assert!(toml::from_str::<ConverterConfig>(toml_str).is_err());
    }
}
