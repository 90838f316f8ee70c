//! Language-model backends.
//!
//! Each provider is a small blocking HTTP client behind the [`Backend`] trait.
//! The concrete client is picked once at startup from a [`BackendKind`] and
//! passed around by reference.

mod anthropic;
mod gemini;
mod ollama;
mod openai;

pub use anthropic::ClaudeClient;
pub use gemini::GeminiClient;
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

use crate::error::BackendError;
use crate::types::recent;
use std::{env, fmt, str::FromStr};

/// Overrides the provider's default model.
pub const MODEL_ENV: &str = "DAVIDGNOME_MODEL";

pub trait Backend {
    fn name(&self) -> &'static str;

    /// Send a request with shell context and return the raw reply text.
    fn query(
        &self,
        prompt: &str,
        history: &[String],
        system_info: &str,
    ) -> Result<String, BackendError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Gpt,
    Claude,
    Gemini,
    Ollama,
}

impl BackendKind {
    pub const ALL: [BackendKind; 4] = [
        BackendKind::Gpt,
        BackendKind::Claude,
        BackendKind::Gemini,
        BackendKind::Ollama,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Gpt => "gpt",
            BackendKind::Claude => "claude",
            BackendKind::Gemini => "gemini",
            BackendKind::Ollama => "ollama",
        }
    }

    /// Environment variable holding the API key, if the provider needs one.
    pub fn api_key_var(&self) -> Option<&'static str> {
        match self {
            BackendKind::Gpt => Some("OPENAI_API_KEY"),
            BackendKind::Claude => Some("ANTHROPIC_API_KEY"),
            BackendKind::Gemini => Some("GEMINI_API_KEY"),
            BackendKind::Ollama => None,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        BackendKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| BackendError::UnknownBackend(s.trim().to_string()))
    }
}

/// Build the client for `kind` from the environment.
pub fn connect(kind: BackendKind) -> Result<Box<dyn Backend>, BackendError> {
    let model = env::var(MODEL_ENV).ok().filter(|m| !m.trim().is_empty());

    let backend: Box<dyn Backend> = match kind {
        BackendKind::Gpt => Box::new(OpenAiClient::new(api_key(kind)?, model)),
        BackendKind::Claude => Box::new(ClaudeClient::new(api_key(kind)?, model)),
        BackendKind::Gemini => Box::new(GeminiClient::new(api_key(kind)?, model)),
        BackendKind::Ollama => Box::new(OllamaClient::from_env(model)),
    };
    tracing::debug!(backend = backend.name(), "backend ready");
    Ok(backend)
}

fn api_key(kind: BackendKind) -> Result<String, BackendError> {
    let Some(var) = kind.api_key_var() else {
        return Ok(String::new());
    };
    env::var(var)
        .ok()
        .filter(|key| !key.trim().is_empty())
        .ok_or(BackendError::MissingApiKey { var })
}

/// The user turn shared by every provider: recent history, host, question.
pub fn build_user_prompt(prompt: &str, history: &[String], system_info: &str) -> String {
    format!(
        "Terminal history: {}\n\nSystem: {}\n\nQuestion: {}",
        recent(history).join(", "),
        system_info,
        prompt
    )
}

/// Follow-up question used when the user asks why a command is dangerous.
pub fn risk_prompt(command: &str) -> String {
    format!(
        "Explain the potential risks and dangers of running this command: '{}'. \
         What could go wrong? What precautions should be taken?",
        command
    )
}

pub const SYSTEM_PROMPT: &str = "You are a terminal assistant for Linux power users on Ubuntu.";

/// Local models need more steering to produce fenced commands.
pub const SYSTEM_PROMPT_DETAILED: &str = r#"You are a terminal assistant for Linux power users on Ubuntu. You help users solve Linux terminal problems by outputting clean, secure commands.

RESPONSE FORMAT RULES:
- Always give a brief explanation followed by a bash code block
- Use triple backticks with the 'bash' language identifier
- Put a short comment above each command
- If several approaches exist, give them in separate code blocks, most preferred first
"#;

/// Read an error body for a non-2xx response, keeping it short enough to print.
pub(crate) fn status_error(
    backend: &'static str,
    response: reqwest::blocking::Response,
) -> BackendError {
    let status = response.status().as_u16();
    let body: String = response
        .text()
        .unwrap_or_default()
        .chars()
        .take(500)
        .collect();
    tracing::warn!(backend, status, "backend returned an error status");
    BackendError::Status {
        backend,
        status,
        body,
    }
}
