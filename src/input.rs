//! Event selector and payload parsing for hook invocations.

use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when parsing hook input.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown event type: {0}")]
    UnknownEvent(String),
}

/// Lifecycle event selected by the `--event` flag. One process invocation
/// handles exactly one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookEvent {
    SessionStart,
    UserPromptSubmit,
    PreToolUse,
    PostToolUse,
}

impl FromStr for HookEvent {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SessionStart" => Ok(HookEvent::SessionStart),
            "UserPromptSubmit" => Ok(HookEvent::UserPromptSubmit),
            "PreToolUse" => Ok(HookEvent::PreToolUse),
            "PostToolUse" => Ok(HookEvent::PostToolUse),
            other => Err(InputError::UnknownEvent(other.to_string())),
        }
    }
}

/// The raw JSON payload delivered on stdin. Only the fields the policy
/// engine reads are modeled; extra fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EventPayload {
    /// Opaque session identifier for audit correlation.
    pub session_id: Option<String>,

    /// The submitted prompt text (UserPromptSubmit).
    pub prompt: Option<String>,

    /// The tool being invoked (PreToolUse / PostToolUse).
    pub tool_name: Option<String>,

    /// The tool's input parameters as raw JSON (PreToolUse).
    pub tool_input: Value,

    /// The tool's result, object or string (PostToolUse). The host has
    /// shipped this under both `tool_result` and `tool_response`.
    #[serde(alias = "tool_response")]
    pub tool_result: Value,
}

impl EventPayload {
    /// Parse from a JSON string.
    pub fn parse(json: &str) -> Result<Self, InputError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The tool name, or an empty string when absent.
    pub fn tool_name(&self) -> &str {
        self.tool_name.as_deref().unwrap_or("")
    }

    /// Stringified tool result for output scanning. Object results expose
    /// their `content` field; anything else is rendered whole.
    pub fn tool_result_text(&self) -> String {
        match &self.tool_result {
            Value::Object(map) => match map.get("content") {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => String::new(),
            },
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}
