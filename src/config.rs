//! @ai:module:intent Configuration for raised-error fallbacks and report rendering
//! @ai:module:layer infrastructure
//! @ai:module:public_api BagConfig, ThrowableConfig, ReportConfig
//! @ai:module:stateless true

use crate::error::{Error, Result};
use crate::output::OutputFormat;
use crate::throwable::FALLBACK_MESSAGE;
use serde::{Deserialize, Serialize};

/// @ai:intent Top-level configuration
/// @ai:effects pure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BagConfig {
    #[serde(default)]
    pub throwable: ThrowableConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// @ai:intent Defaults applied when a raised error's arguments leave fields unset
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThrowableConfig {
    #[serde(default = "default_fallback_message")]
    pub fallback_message: String,
    #[serde(default)]
    pub default_code: i64,
}

/// @ai:intent Rendering options for stacks, pools and raised errors
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportConfig {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default = "default_true")]
    pub color: bool,
    #[serde(default = "default_true")]
    pub show_data: bool,
}

impl Default for ThrowableConfig {
    fn default() -> Self {
        Self {
            fallback_message: default_fallback_message(),
            default_code: 0,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            color: default_true(),
            show_data: default_true(),
        }
    }
}

fn default_fallback_message() -> String {
    FALLBACK_MESSAGE.to_string()
}

fn default_true() -> bool {
    true
}

impl BagConfig {
    /// @ai:intent Parse and validate configuration from TOML text
    /// @ai:effects pure
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// @ai:intent Render configuration as TOML text
    /// @ai:effects pure
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// @ai:intent Reject settings that would break the non-empty message guarantee
    pub fn validate(&self) -> Result<()> {
        if self.throwable.fallback_message.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "throwable.fallback_message must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = BagConfig::from_toml_str("").unwrap();
        assert_eq!(config, BagConfig::default());
        assert_eq!(config.throwable.fallback_message, FALLBACK_MESSAGE);
        assert!(config.report.color);
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = BagConfig::from_toml_str(
            r#"
[throwable]
default_code = 500

[report]
format = "json-pretty"
color = false
"#,
        )
        .unwrap();

        assert_eq!(config.throwable.default_code, 500);
        assert_eq!(config.throwable.fallback_message, FALLBACK_MESSAGE);
        assert_eq!(config.report.format, OutputFormat::JsonPretty);
        assert!(!config.report.color);
        assert!(config.report.show_data);
    }

    #[test]
    fn test_round_trip_through_toml() {
        let mut config = BagConfig::default();
        config.throwable.fallback_message = "request rejected".to_string();
        config.report.show_data = false;

        let text = config.to_toml_string().unwrap();
        assert_eq!(BagConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_rejects_empty_fallback() {
        let err = BagConfig::from_toml_str("[throwable]\nfallback_message = \"  \"\n").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = BagConfig::from_toml_str("[report\nformat = 1").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }
}
