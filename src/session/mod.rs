//! Session records, their typed view, and session file I/O.
//!
//! The session file is the only artifact exchanged between classification,
//! validation, and page generation, so re-generation never needs the answers.
mod merge;
pub mod record;
mod typed;

pub use merge::merge_fragment_value;
pub use record::{
    non_empty, AgentTemplate, Agentforce, Assets, Benefit, Feature, Labels, Metadata,
    SessionRecord, Step, StepValidation,
};
pub use typed::{Archetype, Session, SetupTypeError};

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Read a session file as raw JSON so structural checks see the real shape.
pub fn load_session_value(path: &Path) -> Result<Value> {
    let bytes = fs::read(path).with_context(|| format!("read session {}", path.display()))?;
    let value: Value = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse session JSON {}", path.display()))?;
    Ok(value)
}

/// Decode a JSON value into a record.
pub fn record_from_value(value: Value) -> Result<SessionRecord> {
    let record: SessionRecord = serde_json::from_value(value).context("decode session record")?;
    Ok(record)
}

/// Persist a session in a stable, pretty JSON format.
pub fn write_session(path: &Path, record: &SessionRecord) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let text = serde_json::to_string_pretty(record).context("serialize session")?;
    fs::write(path, text.as_bytes()).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::record::DEFAULT_VERSION;
    use super::*;

    #[test]
    fn session_file_round_trip_keeps_camel_case_keys() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("nested/session.json");
        let record = SessionRecord {
            setup_type: Some("feature".to_string()),
            metadata: Metadata {
                name: "Smart Search".to_string(),
                belongs_to_feature_set: Some("Discovery".to_string()),
                ..Metadata::default()
            },
            ..SessionRecord::default()
        };
        write_session(&path, &record).expect("write session");

        let raw = load_session_value(&path).expect("load raw");
        assert_eq!(raw["setupType"], "feature");
        assert_eq!(raw["metadata"]["belongsToFeatureSet"], "Discovery");
        assert_eq!(raw["metadata"]["version"], DEFAULT_VERSION);

        let loaded = record_from_value(raw).expect("decode record");
        assert_eq!(loaded, record);
    }

    #[test]
    fn questionnaire_output_with_nulls_decodes() {
        let value = serde_json::json!({
            "setupType": "feature",
            "metadata": {"name": "Upload", "belongsToFeatureSet": null},
            "features": [{"name": "Upload", "soldToCustomers": true, "belongsToFeatureSet": null}],
            "agentforce": {"needed": false, "templates": []},
            "assets": {"screenshotUrl": ""}
        });
        let record = record_from_value(value).expect("decode");
        assert_eq!(record.features.len(), 1);
        assert_eq!(record.metadata.version, DEFAULT_VERSION);
        assert_eq!(non_empty(&record.assets.screenshot_url), None);
    }
}
