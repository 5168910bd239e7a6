//! OpenAI-compatible chat-completions categorizer

use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CategorizationError, Result};
use crate::parsing::{build_user_prompt, parse_suggestions, SYSTEM_PROMPT};
use crate::service::{CategorizationRequest, CategorizationService, Suggestion};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

#[derive(Debug, Clone)]
pub struct OpenAiCategorizer {
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
}

impl OpenAiCategorizer {
    pub fn new(api_key: Option<String>) -> Result<Self> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(CategorizationError::MissingApiKey)?;
        Ok(Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, user_prompt: String) -> Result<String> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct ResponseFormat {
            #[serde(rename = "type")]
            t: &'static str,
        }

        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            response_format: ResponseFormat,
            temperature: f32,
        }

        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: MsgOut,
        }

        #[derive(Deserialize)]
        struct MsgOut {
            content: Option<String>,
        }

        let body = Req {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Msg {
                    role: "user",
                    content: &user_prompt,
                },
            ],
            response_format: ResponseFormat { t: "json_object" },
            temperature: self.temperature,
        };

        let client = reqwest::Client::new();
        let resp = client
            .post(format!("{}/chat/completions", self.base_url))
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CategorizationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let out: Resp = resp.json().await?;
        out.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(CategorizationError::EmptyResponse)
    }
}

impl CategorizationService for OpenAiCategorizer {
    fn name(&self) -> &str {
        "openai"
    }

    fn suggest(&self, request: &CategorizationRequest<'_>) -> Result<Vec<Suggestion>> {
        if request.is_empty() {
            return Ok(Vec::new());
        }
        let prompt = build_user_prompt(request)?;
        debug!(model = %self.model, items = request.len(), "requesting categorizations");

        // The CLI runs under #[tokio::main]; block_on inside a running runtime
        // panics, so hop out with block_in_place when one is present.
        let content = if let Ok(handle) = tokio::runtime::Handle::try_current() {
            tokio::task::block_in_place(|| handle.block_on(self.complete(prompt)))?
        } else {
            let rt = tokio::runtime::Runtime::new().map_err(|e| CategorizationError::Runtime(e.to_string()))?;
            rt.block_on(self.complete(prompt))?
        };
        debug!(bytes = content.len(), "received categorization response");

        parse_suggestions(&content, request.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key() {
        assert!(matches!(OpenAiCategorizer::new(None), Err(CategorizationError::MissingApiKey)));
        assert!(matches!(
            OpenAiCategorizer::new(Some("  ".into())),
            Err(CategorizationError::MissingApiKey)
        ));
    }

    #[test]
    fn test_builder() {
        let c = OpenAiCategorizer::new(Some("sk-test".into()))
            .unwrap()
            .with_model("gpt-4o")
            .with_base_url("http://localhost:8080/v1/")
            .with_temperature(0.0);
        assert_eq!(c.model(), "gpt-4o");
        assert_eq!(c.base_url, "http://localhost:8080/v1");
        assert_eq!(c.temperature, 0.0);
    }
}
