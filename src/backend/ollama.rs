use super::{build_user_prompt, status_error, Backend, SYSTEM_PROMPT_DETAILED};
use crate::error::BackendError;
use serde::{Deserialize, Serialize};
use std::env;

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "linux_gnome";

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct OllamaChat<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
}

#[derive(Deserialize)]
struct OllamaMessage {
    content: String,
}

pub struct OllamaClient {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Honors `OLLAMA_HOST`, the same variable the ollama CLI reads.
    pub fn from_env(model: Option<String>) -> Self {
        let base_url = env::var("OLLAMA_HOST")
            .ok()
            .filter(|h| !h.trim().is_empty())
            .map(|h| normalize_host(&h))
            .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());
        Self::new(&base_url, model.as_deref().unwrap_or(DEFAULT_MODEL))
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.trim();
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    }
}

impl Backend for OllamaClient {
    fn name(&self) -> &'static str {
        "ollama"
    }

    fn query(
        &self,
        prompt: &str,
        history: &[String],
        system_info: &str,
    ) -> Result<String, BackendError> {
        let user = build_user_prompt(prompt, history, system_info);
        let body = OllamaChat {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT_DETAILED,
                },
                ChatMessage {
                    role: "user",
                    content: &user,
                },
            ],
            stream: false,
        };

        tracing::debug!(url = %self.chat_url(), model = %self.model, "querying ollama");
        let response = self.client.post(self.chat_url()).json(&body).send()?;
        if !response.status().is_success() {
            return Err(status_error(self.name(), response));
        }

        let resp: OllamaChatResponse = response.json()?;
        if resp.message.content.trim().is_empty() {
            return Err(BackendError::EmptyResponse(self.name()));
        }
        Ok(resp.message.content)
    }
}
