//! Interactive prompt loop.
//!
//! Reads one line at a time, runs the turn through the session, prints
//! the reply. A failed turn is logged and the prompt comes back; only
//! `exit` (any case) or end-of-input ends the loop.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::error;

use crate::session::ChatSession;
use crate::tools::ToolRunner;
use crate::ChatModel;

const BANNER: &str = "Welcome to Weather Chat! (Type \"exit\" to quit)";

/// What one line of user input asks for.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Exit,
    Empty,
    Ask(String),
}

fn parse_input(line: &str) -> Input {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        Input::Empty
    } else if trimmed.eq_ignore_ascii_case("exit") {
        Input::Exit
    } else {
        Input::Ask(trimmed.to_string())
    }
}

/// Run the prompt loop until `exit` or EOF.
pub async fn run(
    session: &mut ChatSession,
    model: &dyn ChatModel,
    runner: &dyn ToolRunner,
    reader: impl AsyncBufRead + Unpin,
    mut writer: impl AsyncWrite + Unpin,
) -> std::io::Result<()> {
    let mut lines = reader.lines();

    writer.write_all(BANNER.as_bytes()).await?;
    writer.write_all(b"\n").await?;

    loop {
        writer.write_all(b"\nYou: ").await?;
        writer.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break; // EOF
        };

        match parse_input(&line) {
            Input::Exit => break,
            Input::Empty => continue,
            Input::Ask(question) => match session.chat(model, runner, question).await {
                Ok(answer) => {
                    writer.write_all(b"\nAI: ").await?;
                    writer.write_all(answer.as_bytes()).await?;
                    writer.write_all(b"\n").await?;
                }
                Err(e) => {
                    error!(error = %e, "Turn failed");
                }
            },
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::io::BufReader;

    use super::*;
    use crate::tools::ToolError;
    use crate::{ChatError, Message, ModelReply, TokenUsage, ToolDefinition};

    struct CannedModel {
        replies: Mutex<Vec<Result<String, ()>>>,
    }

    impl CannedModel {
        fn new(mut replies: Vec<Result<String, ()>>) -> Self {
            replies.reverse();
            Self {
                replies: Mutex::new(replies),
            }
        }
    }

    #[async_trait]
    impl ChatModel for CannedModel {
        async fn generate(
            &self,
            _messages: &[Message],
            _tools: &[ToolDefinition],
        ) -> Result<ModelReply, ChatError> {
            match self.replies.lock().unwrap().pop() {
                Some(Ok(text)) => Ok(ModelReply {
                    content: text,
                    tool_calls: Vec::new(),
                    usage: TokenUsage::default(),
                }),
                _ => Err(ChatError::Network("scripted failure".to_string())),
            }
        }
    }

    struct NoTools;

    #[async_trait]
    impl ToolRunner for NoTools {
        async fn run(
            &self,
            name: &str,
            _arguments: &serde_json::Value,
        ) -> Result<serde_json::Value, ToolError> {
            panic!("registry must not be invoked, got {name}");
        }
    }

    async fn drive(input: &str, replies: Vec<Result<String, ()>>) -> String {
        let model = CannedModel::new(replies);
        let mut session = ChatSession::new();
        let mut output = Vec::new();

        run(
            &mut session,
            &model,
            &NoTools,
            BufReader::new(input.as_bytes()),
            &mut output,
        )
        .await
        .unwrap();

        String::from_utf8(output).unwrap()
    }

    #[test]
    fn exit_matches_any_case() {
        assert_eq!(parse_input("exit"), Input::Exit);
        assert_eq!(parse_input("Exit"), Input::Exit);
        assert_eq!(parse_input("EXIT"), Input::Exit);
        assert_eq!(parse_input("  exit  "), Input::Exit);
        assert_eq!(parse_input(""), Input::Empty);
        assert_eq!(
            parse_input("weather in Oslo"),
            Input::Ask("weather in Oslo".to_string())
        );
    }

    #[tokio::test]
    async fn one_ai_line_per_question() {
        let output = drive(
            "weather?\nexit\n",
            vec![Ok("Sunny.".to_string())],
        )
        .await;

        assert_eq!(output.matches("AI:").count(), 1);
        assert!(output.contains("AI: Sunny."));
        // Prompt shown for the question and again before exit.
        assert_eq!(output.matches("You: ").count(), 2);
    }

    #[tokio::test]
    async fn uppercase_exit_terminates_without_model_call() {
        let output = drive("EXIT\n", vec![]).await;
        assert!(!output.contains("AI:"));
        assert_eq!(output.matches("You: ").count(), 1);
    }

    #[tokio::test]
    async fn empty_lines_reprompt_without_model_call() {
        let output = drive("\n\nexit\n", vec![]).await;
        assert!(!output.contains("AI:"));
        assert_eq!(output.matches("You: ").count(), 3);
    }

    #[tokio::test]
    async fn failed_turn_reprompts_and_recovers() {
        let output = drive(
            "first?\nsecond?\nexit\n",
            vec![Err(()), Ok("Recovered.".to_string())],
        )
        .await;

        assert_eq!(output.matches("AI:").count(), 1);
        assert!(output.contains("AI: Recovered."));
        assert_eq!(output.matches("You: ").count(), 3);
    }

    #[tokio::test]
    async fn eof_ends_the_loop() {
        let output = drive("", vec![]).await;
        assert!(output.starts_with(BANNER));
    }
}
