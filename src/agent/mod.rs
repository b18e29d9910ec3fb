//! Conversational agent boundary.
//!
//! A proposer turns one user message (plus prior turns and the current
//! session) into a [`Proposal`]: a reply to show, an optional session
//! fragment to merge, and a flag saying the session looks ready to generate.
//! Proposers never touch the session themselves; the caller merges the
//! fragment and re-validates.
mod command;
mod http;
mod prompt;

pub use command::CommandProposer;
pub use http::HttpProposer;
pub use prompt::build_prompt;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Who produced a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One prior conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        ChatMessage {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Agent reply for one turn.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub message: String,
    #[serde(default)]
    pub session_fragment: Option<Map<String, Value>>,
    #[serde(default)]
    pub ready_to_generate: bool,
}

/// Boundary to whatever produces proposals.
pub trait FragmentProposer {
    fn propose_fragment(
        &self,
        user_message: &str,
        history: &[ChatMessage],
        session: &Value,
    ) -> Result<Proposal>;

    /// Short name for logs and run metadata.
    fn name(&self) -> &'static str;
}

/// Decode a proposer reply.
///
/// Replies that carry no JSON object are kept as a plain message with no
/// fragment, so a chatty model still produces a usable turn.
pub fn parse_proposal(text: &str) -> Proposal {
    let json_text = extract_json(text);
    match serde_json::from_str::<Proposal>(json_text) {
        Ok(proposal) => proposal,
        Err(err) => {
            tracing::debug!(error = %err, "proposer reply is not a proposal object");
            Proposal {
                message: text.trim().to_string(),
                ..Proposal::default()
            }
        }
    }
}

/// Extract JSON from text that might be wrapped in markdown code fences.
pub fn extract_json(text: &str) -> &str {
    let text = text.trim();

    if let Some(start) = text.find("```json") {
        let start = start + "```json".len();
        if let Some(end) = text[start..].find("```") {
            return text[start..start + end].trim();
        }
    }

    if let Some(start) = text.find("```") {
        let start = start + 3;
        let start = text[start..]
            .find('\n')
            .map(|i| start + i + 1)
            .unwrap_or(start);
        if let Some(end) = text[start..].find("```") {
            return text[start..start + end].trim();
        }
    }

    // Prose around a bare object.
    if let (Some(open), Some(close)) = (text.find('{'), text.rfind('}')) {
        if open < close {
            return &text[open..=close];
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extract_json_plain() {
        let text = r#"{"message": "hi"}"#;
        assert_eq!(extract_json(text), r#"{"message": "hi"}"#);
    }

    #[test]
    fn extract_json_with_fences() {
        let text = "Here is my answer:\n```json\n{\"message\": \"hi\"}\n```\n";
        assert_eq!(extract_json(text), r#"{"message": "hi"}"#);
    }

    #[test]
    fn extract_json_plain_fences() {
        let text = "```\n{\"message\": \"hi\"}\n```";
        assert_eq!(extract_json(text), r#"{"message": "hi"}"#);
    }

    #[test]
    fn extract_json_from_surrounding_prose() {
        let text = "Sure thing. {\"message\": \"hi\"} Let me know.";
        assert_eq!(extract_json(text), r#"{"message": "hi"}"#);
    }

    #[test]
    fn parses_full_proposal() {
        let proposal = parse_proposal(
            r#"{"message": "Sounds like a feature.", "sessionFragment": {"setupType": "feature"}, "readyToGenerate": true}"#,
        );
        assert_eq!(proposal.message, "Sounds like a feature.");
        assert!(proposal.ready_to_generate);
        let fragment = proposal.session_fragment.expect("fragment");
        assert_eq!(fragment.get("setupType"), Some(&json!("feature")));
    }

    #[test]
    fn plain_text_reply_has_no_fragment() {
        let proposal = parse_proposal("Could you tell me more about the agent?\n");
        assert_eq!(proposal.message, "Could you tell me more about the agent?");
        assert!(proposal.session_fragment.is_none());
        assert!(!proposal.ready_to_generate);
    }

    #[test]
    fn roles_serialize_lowercase() {
        let message = ChatMessage::assistant("ok");
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({"role": "assistant", "content": "ok"})
        );
        assert_eq!(Role::System.as_str(), "system");
    }
}
