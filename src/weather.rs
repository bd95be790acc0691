//! weatherstack API client.
//!
//! Two read-only GET endpoints: current conditions and forecast. The
//! provider's JSON body is returned untouched so the model sees exactly
//! what the API produced.

use tracing::debug;

const WEATHERSTACK_API_BASE: &str = "http://api.weatherstack.com";

/// Largest forecast window weatherstack serves.
const MAX_FORECAST_DAYS: u32 = 14;

#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// weatherstack client configuration.
#[derive(Debug, Clone)]
pub struct WeatherConfig {
    pub api_key: String,
    pub base_url: String,
}

impl WeatherConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: WEATHERSTACK_API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// weatherstack API client.
pub struct WeatherClient {
    config: WeatherConfig,
    http: reqwest::Client,
}

impl WeatherClient {
    pub fn new(config: WeatherConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::builder()
                .connect_timeout(std::time::Duration::from_secs(10))
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("failed to build HTTP client"),
        }
    }

    /// Current conditions for a location.
    pub async fn current(&self, location: &str) -> Result<serde_json::Value, WeatherError> {
        let params = self.current_params(location)?;
        self.get("current", &params).await
    }

    /// Forecast for a location over `days` days, segmented every `hourly`
    /// hours.
    pub async fn forecast(
        &self,
        location: &str,
        days: u32,
        hourly: u32,
    ) -> Result<serde_json::Value, WeatherError> {
        let params = self.forecast_params(location, days, hourly)?;
        self.get("forecast", &params).await
    }

    fn current_params(&self, location: &str) -> Result<Vec<(&'static str, String)>, WeatherError> {
        let location = validate_location(location)?;
        Ok(vec![
            ("access_key", self.config.api_key.clone()),
            ("query", location.to_string()),
        ])
    }

    fn forecast_params(
        &self,
        location: &str,
        days: u32,
        hourly: u32,
    ) -> Result<Vec<(&'static str, String)>, WeatherError> {
        let location = validate_location(location)?;
        if days == 0 || days > MAX_FORECAST_DAYS {
            return Err(WeatherError::InvalidArgument(format!(
                "forecast days must be 1-{MAX_FORECAST_DAYS}, got {days}"
            )));
        }
        Ok(vec![
            ("access_key", self.config.api_key.clone()),
            ("query", location.to_string()),
            ("forecast_days", days.to_string()),
            ("hourly", hourly.to_string()),
        ])
    }

    async fn get(
        &self,
        endpoint: &str,
        params: &[(&'static str, String)],
    ) -> Result<serde_json::Value, WeatherError> {
        let url = format!("{}/{}", self.config.base_url, endpoint);

        debug!(%endpoint, "weatherstack request");

        let response = self
            .http
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| WeatherError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(WeatherError::Api(format!("HTTP {status}: {text}")));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))?;

        interpret_body(json)
    }
}

fn validate_location(location: &str) -> Result<&str, WeatherError> {
    let trimmed = location.trim();
    if trimmed.is_empty() {
        return Err(WeatherError::InvalidArgument(
            "location must not be empty".to_string(),
        ));
    }
    Ok(trimmed)
}

/// weatherstack reports failures as HTTP 200 with `{"success": false}`;
/// surface those as API errors instead of feeding them to the model.
fn interpret_body(json: serde_json::Value) -> Result<serde_json::Value, WeatherError> {
    if json["success"] == serde_json::Value::Bool(false) {
        let info = json["error"]["info"]
            .as_str()
            .unwrap_or("unknown provider error");
        return Err(WeatherError::Api(info.to_string()));
    }
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> WeatherClient {
        WeatherClient::new(
            WeatherConfig::new("test-key").with_base_url("http://127.0.0.1:1"),
        )
    }

    #[test]
    fn current_params_carry_key_and_query() {
        let params = client().current_params("New York").unwrap();
        assert_eq!(
            params,
            vec![
                ("access_key", "test-key".to_string()),
                ("query", "New York".to_string()),
            ]
        );
    }

    #[test]
    fn forecast_params_carry_days_and_hourly() {
        let params = client().forecast_params("London", 3, 1).unwrap();
        assert_eq!(params[2], ("forecast_days", "3".to_string()));
        assert_eq!(params[3], ("hourly", "1".to_string()));
    }

    #[test]
    fn empty_location_rejected() {
        let err = client().current_params("   ").unwrap_err();
        assert!(matches!(err, WeatherError::InvalidArgument(_)));
    }

    #[test]
    fn forecast_day_range_enforced() {
        assert!(matches!(
            client().forecast_params("London", 0, 1).unwrap_err(),
            WeatherError::InvalidArgument(_)
        ));
        assert!(matches!(
            client().forecast_params("London", 15, 1).unwrap_err(),
            WeatherError::InvalidArgument(_)
        ));
        assert!(client().forecast_params("London", 14, 1).is_ok());
    }

    #[test]
    fn provider_error_body_surfaced() {
        let body = serde_json::json!({
            "success": false,
            "error": { "code": 615, "info": "Your API request failed." }
        });
        let err = interpret_body(body).unwrap_err();
        assert!(matches!(err, WeatherError::Api(ref info) if info.contains("failed")));
    }

    #[test]
    fn successful_body_passed_through_verbatim() {
        let body = serde_json::json!({
            "current": { "temperature": 21, "weather_descriptions": ["Sunny"] }
        });
        assert_eq!(interpret_body(body.clone()).unwrap(), body);
    }
}
