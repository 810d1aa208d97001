use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ConfigError;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub const ENV_MAX_UPLOAD_BYTES: &str = "SHEETCHART_MAX_UPLOAD_BYTES";
pub const ENV_CSV_DELIMITER: &str = "SHEETCHART_CSV_DELIMITER";

/// Runtime policy for ingestion.
///
/// ```toml
/// max_upload_bytes = 10485760
/// csv_delimiter = ","
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SheetchartConfig {
    pub max_upload_bytes: usize,
    pub csv_delimiter: char,
}

impl Default for SheetchartConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            csv_delimiter: ',',
        }
    }
}

impl SheetchartConfig {
    /// Read a TOML config file. Missing keys keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an optional file, then apply `SHEETCHART_*` overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a key lookup. Split out from [`load`](Self::load)
    /// so tests do not have to touch the process environment.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_MAX_UPLOAD_BYTES) {
            self.max_upload_bytes = raw.trim().parse().map_err(|_| {
                ConfigError::invalid(ENV_MAX_UPLOAD_BYTES, format!("'{}' is not a byte count", raw))
            })?;
            debug!("max_upload_bytes overridden to {}", self.max_upload_bytes);
        }

        if let Some(raw) = lookup(ENV_CSV_DELIMITER) {
            let mut chars = raw.chars();
            self.csv_delimiter = match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => {
                    return Err(ConfigError::invalid(
                        ENV_CSV_DELIMITER,
                        "expected a single character",
                    ))
                }
            };
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::invalid(
                "max_upload_bytes",
                "must be greater than zero",
            ));
        }
        if !self.csv_delimiter.is_ascii() {
            return Err(ConfigError::invalid(
                "csv_delimiter",
                "must be a single ASCII character",
            ));
        }
        Ok(())
    }

    /// The delimiter as the single byte the csv reader wants. Fields are
    /// public, so this checks again instead of trusting `validate()`.
    pub fn csv_delimiter_byte(&self) -> Result<u8, ConfigError> {
        u8::try_from(self.csv_delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                ConfigError::invalid("csv_delimiter", "must be a single ASCII character")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SheetchartConfig::default();
        assert_eq!(config.max_upload_bytes, 10_485_760);
        assert_eq!(config.csv_delimiter_byte().expect("comma is ascii"), b',');
    }

    #[test]
    fn test_from_file_keeps_defaults_for_missing_keys() {
        let mut file = tempfile::NamedTempFile::new().expect("Should create temp file");
        writeln!(file, "max_upload_bytes = 2048").expect("Should write config");

        let config = SheetchartConfig::from_file(file.path()).expect("Should load config");
        assert_eq!(config.max_upload_bytes, 2048);
        assert_eq!(config.csv_delimiter, ',');
    }

    #[test]
    fn test_from_file_rejects_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().expect("Should create temp file");
        writeln!(file, "max_upload_bytes = \"lots\"").expect("Should write config");

        let err = SheetchartConfig::from_file(file.path()).expect_err("Should reject config");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> =
            HashMap::from([(ENV_MAX_UPLOAD_BYTES, "512"), (ENV_CSV_DELIMITER, ";")]);
        let config = SheetchartConfig::default()
            .with_overrides(|key| env.get(key).map(|v| v.to_string()))
            .expect("Should apply overrides");
        assert_eq!(config.max_upload_bytes, 512);
        assert_eq!(config.csv_delimiter_byte().expect("semicolon is ascii"), b';');
    }

    #[test]
    fn test_invalid_overrides() {
        let zero = SheetchartConfig::default()
            .with_overrides(|key| (key == ENV_MAX_UPLOAD_BYTES).then(|| "0".to_string()));
        assert!(matches!(zero, Err(ConfigError::InvalidValue { .. })));

        let word = SheetchartConfig::default()
            .with_overrides(|key| (key == ENV_MAX_UPLOAD_BYTES).then(|| "ten".to_string()));
        assert!(matches!(word, Err(ConfigError::InvalidValue { .. })));

        let long = SheetchartConfig::default()
            .with_overrides(|key| (key == ENV_CSV_DELIMITER).then(|| "||".to_string()));
        assert!(matches!(long, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_delimiter_byte_rejects_non_ascii() {
        let config = SheetchartConfig {
            csv_delimiter: 'é',
            ..SheetchartConfig::default()
        };
        assert!(matches!(
            config.csv_delimiter_byte(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
