use clap::Parser;
use tokio::io::BufReader;

use weather_chat::gemini::{GeminiClient, GeminiConfig};
use weather_chat::session::ChatSession;
use weather_chat::tools::{weather_tools, WeatherToolbox};
use weather_chat::weather::{WeatherClient, WeatherConfig};
use weather_chat::{repl, AppConfig};

const SYSTEM_PROMPT: &str = "Your sole purpose is to provide weather information. \
    The user will ask for the weather in a particular location. \
    Use the weather functions available to you to get the weather information.";

/// Weather Chat — ask about the weather, answered by Gemini with live
/// weatherstack data.
#[derive(Parser, Debug)]
#[command(name = "weather-chat", version, about)]
struct Args {
    /// Gemini model to use.
    #[arg(short, long, default_value = "gemini-1.5-flash-8b")]
    model: String,

    /// Log level override (debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

/// Load environment variables from a .env file (KEY=VALUE lines).
fn load_dotenv() {
    let candidates = [
        std::path::PathBuf::from(".env"),
        std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(".env"),
    ];

    for path in &candidates {
        if let Ok(contents) = std::fs::read_to_string(path) {
            for line in contents.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                if let Some((key, value)) = line.split_once('=') {
                    let key = key.trim();
                    let value = value.trim().trim_matches('"').trim_matches('\'');
                    if std::env::var(key).is_err() {
                        std::env::set_var(key, value);
                    }
                }
            }
            return;
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env before reading any configuration
    load_dotenv();

    let args = Args::parse();

    let log_directive = args.log_level.as_deref().unwrap_or("weather_chat=warn");
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_directive.into()),
        )
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let model = GeminiClient::new(GeminiConfig::new(config.gemini_api_key).with_model(args.model));
    let toolbox = WeatherToolbox::new(WeatherClient::new(WeatherConfig::new(
        config.weather_api_key,
    )));
    let mut session = ChatSession::new()
        .with_system_prompt(SYSTEM_PROMPT)
        .with_tools(weather_tools());

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    if let Err(e) = repl::run(&mut session, &model, &toolbox, stdin, stdout).await {
        tracing::error!("I/O error: {e}");
        std::process::exit(1);
    }
}
