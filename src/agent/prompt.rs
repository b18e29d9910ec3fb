//! Prompt text for proposers.
use super::ChatMessage;
use crate::setup_type::CATALOG;
use serde_json::Value;

/// System instructions shared by every proposer.
pub fn system_prompt() -> String {
    let mut prompt = String::from(
        "You are a setup page configuration assistant. You help a user describe a \
configuration page request and translate it into a session record.\n\n\
## Setup types\n\n",
    );
    for info in &CATALOG {
        prompt.push_str(&format!(
            "- `{}` ({}): {}. Requires: {}. Examples: {}.\n",
            info.id,
            info.name,
            info.description,
            info.requirements.join(", "),
            info.examples.join(", "),
        ));
    }
    prompt.push_str(
        r#"
## Session record

Top-level keys: setupType, metadata {name, description, cloud, jtbd,
belongsToFeatureSet}, features [{name, soldToCustomers, description}],
agentforce {needed, templates [{name, steps [{title, validation, links}]}]},
assets {screenshotUrl, videoUrl, guidedTourUrl, resources {helpTopicUrl,
releaseNotesUrl, blogUrl, trailheadBadges [{title, url}]}}.

Rules: a feature set needs at least two features and a JTBD; a solution
setup has no JTBD; an agent setup needs agentforce.needed and at least one
template; step validation is one of system, manual, none; at most three
trailhead badges and at most three links per step.

## Response format

Respond ONLY with a JSON object, no other text:
{"message": "<reply to the user>",
 "sessionFragment": {<top-level keys to set, or omit>},
 "readyToGenerate": <true when the session is complete>}

A fragment replaces whole top-level keys, so always send complete values
(for example the full metadata object).
"#,
    );
    prompt
}

/// Single-text prompt for command proposers: instructions, session, turns.
pub fn build_prompt(user_message: &str, history: &[ChatMessage], session: &Value) -> String {
    let mut prompt = system_prompt();
    prompt.push_str("\n## Current session\n\n```json\n");
    prompt.push_str(&serde_json::to_string_pretty(session).unwrap_or_else(|_| "{}".to_string()));
    prompt.push_str("\n```\n");

    if !history.is_empty() {
        prompt.push_str("\n## Conversation so far\n\n");
        for turn in history {
            prompt.push_str(&format!("{}: {}\n", turn.role.as_str(), turn.content));
        }
    }

    prompt.push_str("\n## User message\n\n");
    prompt.push_str(user_message);
    prompt.push('\n');
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn system_prompt_lists_every_setup_type() {
        let prompt = system_prompt();
        for info in &CATALOG {
            assert!(prompt.contains(info.id.as_str()), "missing {}", info.id);
        }
        assert!(prompt.contains("readyToGenerate"));
    }

    #[test]
    fn prompt_carries_session_history_and_message() {
        let prompt = build_prompt(
            "It is a support bot",
            &[
                ChatMessage::user("I need a page"),
                ChatMessage::assistant("What does it do?"),
            ],
            &json!({"setupType": "agent-setup"}),
        );
        assert!(prompt.contains("\"setupType\": \"agent-setup\""));
        assert!(prompt.contains("user: I need a page\nassistant: What does it do?"));
        assert!(prompt.trim_end().ends_with("It is a support bot"));
    }
}
