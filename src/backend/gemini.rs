use super::{build_user_prompt, status_error, Backend, SYSTEM_PROMPT};
use crate::error::BackendError;
use serde::{Deserialize, Serialize};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

pub struct GeminiClient {
    api_key: String,
    model: String,
    client: reqwest::blocking::Client,
}

impl GeminiClient {
    pub fn new(api_key: String, model: Option<String>) -> Self {
        Self {
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            client: reqwest::blocking::Client::new(),
        }
    }

    fn generate_url(&self) -> String {
        format!("{}/{}:generateContent", API_BASE, self.model)
    }
}

impl Backend for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn query(
        &self,
        prompt: &str,
        history: &[String],
        system_info: &str,
    ) -> Result<String, BackendError> {
        let user = build_user_prompt(prompt, history, system_info);
        let body = GenerateRequest {
            system_instruction: Content {
                parts: vec![Part {
                    text: SYSTEM_PROMPT,
                }],
            },
            contents: vec![Content {
                parts: vec![Part { text: &user }],
            }],
        };

        tracing::debug!(model = %self.model, "querying gemini");
        let response = self
            .client
            .post(self.generate_url())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()?;
        if !response.status().is_success() {
            return Err(status_error(self.name(), response));
        }

        let resp: GenerateResponse = response.json()?;
        let text: String = resp
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(BackendError::EmptyResponse(self.name()));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_camel_case_system_instruction() {
        let body = GenerateRequest {
            system_instruction: Content {
                parts: vec![Part { text: "sys" }],
            },
            contents: vec![Content {
                parts: vec![Part { text: "hi" }],
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "sys");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
    }

    #[test]
    fn url_embeds_model() {
        let client = GeminiClient::new("k".into(), Some("gemini-pro".into()));
        assert!(client.generate_url().ends_with("/models/gemini-pro:generateContent"));
    }
}
