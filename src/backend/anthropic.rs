use super::{build_user_prompt, status_error, Backend, SYSTEM_PROMPT};
use crate::error::BackendError;
use serde::{Deserialize, Serialize};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";
const MAX_TOKENS: u32 = 1000;

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

pub struct ClaudeClient {
    api_key: String,
    model: String,
    client: reqwest::blocking::Client,
}

impl ClaudeClient {
    pub fn new(api_key: String, model: Option<String>) -> Self {
        Self {
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl Backend for ClaudeClient {
    fn name(&self) -> &'static str {
        "claude"
    }

    fn query(
        &self,
        prompt: &str,
        history: &[String],
        system_info: &str,
    ) -> Result<String, BackendError> {
        let user = build_user_prompt(prompt, history, system_info);
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            system: SYSTEM_PROMPT,
            messages: vec![Message {
                role: "user",
                content: &user,
            }],
        };

        tracing::debug!(model = %self.model, "querying anthropic");
        let response = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()?;
        if !response.status().is_success() {
            return Err(status_error(self.name(), response));
        }

        let resp: MessagesResponse = response.json()?;
        let text: String = resp.content.into_iter().filter_map(|c| c.text).collect();
        if text.trim().is_empty() {
            return Err(BackendError::EmptyResponse(self.name()));
        }
        Ok(text)
    }
}
