//! Environment-based configuration.

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(&'static str),
}

const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
const WEATHER_API_KEY: &str = "WEATHER_API_KEY";

/// API credentials, both required. Missing keys fail at startup instead
/// of surfacing later as a provider authentication error.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gemini_api_key: String,
    pub weather_api_key: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let require = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::MissingEnv(key))
        };
        Ok(Self {
            gemini_api_key: require(GEMINI_API_KEY)?,
            weather_api_key: require(WEATHER_API_KEY)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_keys_required() {
        let config = AppConfig::from_lookup(|key| match key {
            "GEMINI_API_KEY" => Some("g-key".to_string()),
            "WEATHER_API_KEY" => Some("w-key".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.gemini_api_key, "g-key");
        assert_eq!(config.weather_api_key, "w-key");
    }

    #[test]
    fn missing_or_blank_key_reported_by_name() {
        let err = AppConfig::from_lookup(|_| None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv("GEMINI_API_KEY")));

        let err = AppConfig::from_lookup(|key| match key {
            "GEMINI_API_KEY" => Some("g-key".to_string()),
            "WEATHER_API_KEY" => Some("   ".to_string()),
            _ => None,
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv("WEATHER_API_KEY")));
    }
}
