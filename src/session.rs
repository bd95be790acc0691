//! Conversation session management.
//!
//! A `ChatSession` owns the ordered conversation history and runs the
//! per-turn state machine: send the user's text, inspect the reply for
//! tool calls, execute at most one, feed its result back, and return the
//! final text. A failed turn leaves the session usable for the next one.

use tracing::debug;

use crate::tools::{ToolError, ToolRunner};
use crate::{ChatError, ChatModel, Content, Message, ModelReply, Role, ToolDefinition};

/// Everything that can go wrong inside one user turn.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error(transparent)]
    Model(#[from] ChatError),
    #[error(transparent)]
    Tool(#[from] ToolError),
}

/// A conversation session with message history and tool execution.
pub struct ChatSession {
    /// Conversation message history.
    messages: Vec<Message>,
    /// System prompt (prepended to every API call).
    system_prompt: Option<String>,
    /// Tool declarations sent to the model.
    tools: Vec<ToolDefinition>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            system_prompt: None,
            tools: Vec::new(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    /// Run one user turn: at most one tool round, then the final reply.
    pub async fn chat(
        &mut self,
        model: &dyn ChatModel,
        runner: &dyn ToolRunner,
        user_message: impl Into<String>,
    ) -> Result<String, TurnError> {
        self.messages
            .push(Message::text(Role::User, user_message.into()));

        let reply = model.generate(&self.build_messages(), &self.tools).await?;
        self.record_usage(&reply);

        let Some(call) = reply.tool_calls.first().cloned() else {
            // No tool calls, the first reply is the final one.
            self.messages
                .push(Message::text(Role::Model, reply.content.clone()));
            return Ok(reply.content);
        };

        if reply.tool_calls.len() > 1 {
            debug!(
                extra = reply.tool_calls.len() - 1,
                "Discarding extra tool calls, only the first is executed"
            );
        }

        // Record the call before its response so the follow-up request
        // replays a well-formed functionCall/functionResponse pair.
        self.messages.push(Message {
            role: Role::Model,
            content: Content::FunctionCall {
                name: call.name.clone(),
                args: call.arguments.clone(),
            },
        });

        debug!(tool = %call.name, "Executing tool");
        let result = runner.run(&call.name, &call.arguments).await?;

        self.messages.push(Message {
            role: Role::User,
            content: Content::FunctionResponse {
                name: call.name.clone(),
                response: result,
            },
        });

        let followup = model.generate(&self.build_messages(), &self.tools).await?;
        self.record_usage(&followup);

        if !followup.tool_calls.is_empty() {
            debug!("Ignoring tool calls in follow-up reply, one round per turn");
        }

        self.messages
            .push(Message::text(Role::Model, followup.content.clone()));
        Ok(followup.content)
    }

    fn record_usage(&self, reply: &ModelReply) {
        debug!(
            input_tokens = reply.usage.input_tokens,
            output_tokens = reply.usage.output_tokens,
            "Model reply"
        );
    }

    fn build_messages(&self) -> Vec<Message> {
        let mut msgs = Vec::new();
        if let Some(ref system) = self.system_prompt {
            msgs.push(Message::text(Role::System, system.clone()));
        }
        msgs.extend(self.messages.clone());
        msgs
    }

    /// Get the full conversation history.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages in history.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Clear conversation history.
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}
