use super::{build_user_prompt, status_error, Backend, SYSTEM_PROMPT};
use crate::error::BackendError;
use serde::{Deserialize, Serialize};

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

pub struct OpenAiClient {
    api_key: String,
    model: String,
    client: reqwest::blocking::Client,
}

impl OpenAiClient {
    pub fn new(api_key: String, model: Option<String>) -> Self {
        Self {
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl Backend for OpenAiClient {
    fn name(&self) -> &'static str {
        "gpt"
    }

    fn query(
        &self,
        prompt: &str,
        history: &[String],
        system_info: &str,
    ) -> Result<String, BackendError> {
        let user = build_user_prompt(prompt, history, system_info);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Message {
                    role: "user",
                    content: &user,
                },
            ],
        };

        tracing::debug!(model = %self.model, "querying openai");
        let response = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()?;
        if !response.status().is_success() {
            return Err(status_error(self.name(), response));
        }

        let resp: ChatResponse = response.json()?;
        resp.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(BackendError::EmptyResponse(self.name()))
    }
}
