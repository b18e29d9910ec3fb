//! Proposer backed by an OpenAI-compatible chat completions endpoint.
use super::prompt::system_prompt;
use super::{parse_proposal, ChatMessage, FragmentProposer, Proposal, Role};
use crate::config::InferenceConfig;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

const MAX_TOKENS: u32 = 500;
const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Clone)]
pub struct HttpProposer {
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl HttpProposer {
    /// Build from config; the API key is read from `api_key_env` when set.
    pub fn from_config(config: &InferenceConfig) -> Result<Self> {
        let api_key = match &config.api_key_env {
            Some(var) => Some(
                std::env::var(var)
                    .with_context(|| format!("read inference API key from ${var}"))?,
            ),
            None => None,
        };
        Ok(HttpProposer {
            endpoint: completions_endpoint(&config.url),
            model: config.model.clone(),
            api_key,
        })
    }

    fn request_body<'a>(
        &'a self,
        system: &'a str,
        context: &'a str,
        user_message: &'a str,
        history: &'a [ChatMessage],
    ) -> CompletionRequest<'a> {
        let mut messages = vec![
            WireMessage {
                role: Role::System.as_str(),
                content: system,
            },
            WireMessage {
                role: Role::System.as_str(),
                content: context,
            },
        ];
        messages.extend(history.iter().map(|turn| WireMessage {
            role: turn.role.as_str(),
            content: &turn.content,
        }));
        messages.push(WireMessage {
            role: Role::User.as_str(),
            content: user_message,
        });
        CompletionRequest {
            model: &self.model,
            messages,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            stream: false,
        }
    }
}

impl FragmentProposer for HttpProposer {
    fn propose_fragment(
        &self,
        user_message: &str,
        history: &[ChatMessage],
        session: &Value,
    ) -> Result<Proposal> {
        let system = system_prompt();
        let session_text =
            serde_json::to_string_pretty(session).context("serialize session for prompt")?;
        let context = format!("Current session:\n{session_text}");
        let body = self.request_body(&system, &context, user_message, history);

        let start = Instant::now();
        let mut request = ureq::post(&self.endpoint).header("Content-Type", "application/json");
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }
        let mut response = request
            .send_json(&body)
            .with_context(|| format!("POST {}", self.endpoint))?;
        let completion: CompletionResponse = response
            .body_mut()
            .read_json()
            .context("decode chat completion response")?;
        tracing::info!(
            elapsed_ms = start.elapsed().as_millis(),
            model = %self.model,
            "inference request complete"
        );

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("chat completion response has no message content"))?;
        Ok(parse_proposal(&content))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// `<base>/v1/chat/completions`, unless the URL already names the endpoint.
fn completions_endpoint(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    if trimmed.ends_with("/chat/completions") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/v1/chat/completions")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> InferenceConfig {
        InferenceConfig {
            url: "https://inference.example.com/".to_string(),
            model: "gpt-oss-120b".to_string(),
            api_key_env: None,
        }
    }

    #[test]
    fn endpoint_appends_completions_path_once() {
        assert_eq!(
            completions_endpoint("https://inference.example.com/"),
            "https://inference.example.com/v1/chat/completions"
        );
        assert_eq!(
            completions_endpoint("http://localhost:11434/v1/chat/completions"),
            "http://localhost:11434/v1/chat/completions"
        );
    }

    #[test]
    fn request_body_orders_system_history_then_user() {
        let proposer = HttpProposer::from_config(&config()).expect("proposer");
        let history = [ChatMessage::user("hi"), ChatMessage::assistant("hello")];
        let body = proposer.request_body("sys", "ctx", "make a bot", &history);
        let value = serde_json::to_value(&body).expect("serialize");
        let roles: Vec<&str> = value["messages"]
            .as_array()
            .expect("messages")
            .iter()
            .map(|message| message["role"].as_str().unwrap_or_default())
            .collect();
        assert_eq!(roles, ["system", "system", "user", "assistant", "user"]);
        assert_eq!(value["messages"][4]["content"], "make a bot");
        assert_eq!(value["model"], "gpt-oss-120b");
        assert_eq!(value["stream"], json!(false));
    }

    #[test]
    fn missing_api_key_variable_is_an_error() {
        let mut config = config();
        config.api_key_env = Some("GORB_TEST_KEY_THAT_IS_NOT_SET".to_string());
        let err = HttpProposer::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("GORB_TEST_KEY_THAT_IS_NOT_SET"));
    }

    #[test]
    fn completion_content_is_read_from_first_choice() {
        let response: CompletionResponse = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": "{\"message\": \"ok\"}"}}]
        }))
        .expect("decode");
        let content = response.choices[0].message.content.as_deref().unwrap_or_default();
        assert_eq!(parse_proposal(content).message, "ok");
    }
}
