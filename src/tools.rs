//! Weather tool definitions and dispatch.
//!
//! The two functions exposed to the model, plus the registry that maps a
//! model-issued tool name onto the weather client.

use async_trait::async_trait;

use crate::weather::{WeatherClient, WeatherError};
use crate::ToolDefinition;

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Bad arguments for {tool}: {reason}")]
    BadArguments { tool: String, reason: String },
    #[error(transparent)]
    Weather(#[from] WeatherError),
}

/// The tool declarations sent to the model.
pub fn weather_tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "getWeather".to_string(),
            description: "Get the current weather for a given location.".to_string(),
            parameters: serde_json::json!({
                "type": "OBJECT",
                "properties": {
                    "location": {
                        "type": "STRING",
                        "description": "Location of where we want to know the weather."
                    }
                },
                "required": ["location"]
            }),
        },
        ToolDefinition {
            name: "getWeatherForecast".to_string(),
            description: "Get the weather forecast for a given location.".to_string(),
            parameters: serde_json::json!({
                "type": "OBJECT",
                "properties": {
                    "location": {
                        "type": "STRING",
                        "description": "Location of where we want to know the weather forecast."
                    },
                    "days": {
                        "type": "NUMBER",
                        "description": "Number of days for the forecast."
                    },
                    "hours": {
                        "type": "NUMBER",
                        "description": "Number of hours to segment the data by, defaults to 1."
                    }
                },
                "required": ["location", "days"]
            }),
        },
    ]
}

/// Convert a tool definition to the Gemini functionDeclaration format.
pub fn to_gemini_tool(tool: &ToolDefinition) -> serde_json::Value {
    serde_json::json!({
        "name": tool.name,
        "description": tool.description,
        "parameters": tool.parameters,
    })
}

/// Executes a named tool with model-provided arguments. The session only
/// sees this seam; tests substitute a scripted runner.
#[async_trait]
pub trait ToolRunner: Send + Sync {
    async fn run(
        &self,
        name: &str,
        arguments: &serde_json::Value,
    ) -> Result<serde_json::Value, ToolError>;
}

/// Registry backed by the weatherstack client.
pub struct WeatherToolbox {
    weather: WeatherClient,
}

impl WeatherToolbox {
    pub fn new(weather: WeatherClient) -> Self {
        Self { weather }
    }
}

#[async_trait]
impl ToolRunner for WeatherToolbox {
    async fn run(
        &self,
        name: &str,
        arguments: &serde_json::Value,
    ) -> Result<serde_json::Value, ToolError> {
        match name {
            "getWeather" => {
                let location = str_arg(name, arguments, "location")?;
                Ok(self.weather.current(location).await?)
            }
            "getWeatherForecast" => {
                let location = str_arg(name, arguments, "location")?;
                let days = num_arg(name, arguments, "days")?;
                // The schema tells the model 1 is the default segmentation.
                let hours = match arguments.get("hours") {
                    Some(v) if !v.is_null() => num_arg(name, arguments, "hours")?,
                    _ => 1,
                };
                Ok(self.weather.forecast(location, days, hours).await?)
            }
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }
}

fn str_arg<'a>(
    tool: &str,
    arguments: &'a serde_json::Value,
    key: &str,
) -> Result<&'a str, ToolError> {
    arguments[key].as_str().ok_or_else(|| ToolError::BadArguments {
        tool: tool.to_string(),
        reason: format!("missing or non-string field '{key}'"),
    })
}

/// Gemini serializes NUMBER arguments as floats as often as integers;
/// accept both, reject negatives.
fn num_arg(tool: &str, arguments: &serde_json::Value, key: &str) -> Result<u32, ToolError> {
    let bad = |reason: String| ToolError::BadArguments {
        tool: tool.to_string(),
        reason,
    };
    let value = arguments
        .get(key)
        .ok_or_else(|| bad(format!("missing field '{key}'")))?;

    if let Some(n) = value.as_u64() {
        return u32::try_from(n).map_err(|_| bad(format!("'{key}' out of range: {n}")));
    }
    if let Some(f) = value.as_f64() {
        if f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 {
            return Ok(f as u32);
        }
    }
    Err(bad(format!("'{key}' must be a non-negative integer, got {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::WeatherConfig;

    fn toolbox() -> WeatherToolbox {
        // Unroutable base URL: these tests must fail before any request.
        WeatherToolbox::new(WeatherClient::new(
            WeatherConfig::new("test-key").with_base_url("http://127.0.0.1:1"),
        ))
    }

    #[test]
    fn declarations_expose_both_tools() {
        let tools = weather_tools();
        let names: Vec<_> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["getWeather", "getWeatherForecast"]);

        let decl = to_gemini_tool(&tools[0]);
        assert_eq!(decl["name"], "getWeather");
        assert_eq!(decl["parameters"]["required"][0], "location");
    }

    #[tokio::test]
    async fn unknown_tool_is_a_typed_error() {
        let err = toolbox()
            .run("selfDestruct", &serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool(ref name) if name == "selfDestruct"));
    }

    #[tokio::test]
    async fn missing_location_rejected_before_any_request() {
        let err = toolbox()
            .run("getWeather", &serde_json::json!({ "city": "New York" }))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::BadArguments { .. }));
    }

    #[tokio::test]
    async fn negative_days_rejected() {
        let err = toolbox()
            .run(
                "getWeatherForecast",
                &serde_json::json!({ "location": "London", "days": -2 }),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::BadArguments { .. }));
    }

    #[test]
    fn float_encoded_numbers_accepted() {
        let args = serde_json::json!({ "days": 3.0 });
        assert_eq!(num_arg("getWeatherForecast", &args, "days").unwrap(), 3);

        let args = serde_json::json!({ "days": 2.5 });
        assert!(num_arg("getWeatherForecast", &args, "days").is_err());
    }
}
