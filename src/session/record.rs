//! Session interchange records.
//!
//! These types mirror the session file so malformed-but-well-typed sessions
//! still load and reach the validator. Strings that the rules constrain
//! (setup type, step validation kind) stay strings here on purpose.
use crate::setup_type::{SetupType, UnknownSetupType};
use serde::{Deserialize, Serialize};

/// Version recorded when the front end leaves it blank.
pub const DEFAULT_VERSION: &str = "1.0.0";

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

/// The central aggregate, identified by `metadata.name`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    #[serde(default)]
    pub setup_type: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(default)]
    pub agentforce: Agentforce,
    #[serde(default)]
    pub assets: Assets,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Labels>,
}

impl SessionRecord {
    /// Parse the recorded setup type, if any.
    pub fn parsed_setup_type(&self) -> Option<Result<SetupType, UnknownSetupType>> {
        self.setup_type
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::parse)
    }

    /// Recognized setup type, `None` when absent or unknown.
    pub fn known_setup_type(&self) -> Option<SetupType> {
        self.parsed_setup_type().and_then(Result::ok)
    }

    /// Non-empty JTBD narrative.
    pub fn jtbd(&self) -> Option<&str> {
        non_empty(&self.metadata.jtbd)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jtbd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub belongs_to_feature_set: Option<String>,
    /// Answer to "your setup involves…" for solution setups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup_pattern: Option<String>,
    /// Answer to "what is the agent setup for?" for agent setups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_purpose: Option<String>,
}

impl Default for Metadata {
    fn default() -> Self {
        Metadata {
            name: String::new(),
            description: None,
            cloud: None,
            version: default_version(),
            jtbd: None,
            belongs_to_feature_set: None,
            setup_pattern: None,
            agent_purpose: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sold_to_customers: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub belongs_to_feature_set: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Run-time status owned by the hosting system (`configured` counts as done).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Feature {
    pub fn is_configured(&self) -> bool {
        self.status.as_deref() == Some("configured")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agentforce {
    #[serde(default)]
    pub needed: bool,
    #[serde(default)]
    pub templates: Vec<AgentTemplate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentTemplate {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl AgentTemplate {
    pub fn is_active(&self) -> bool {
        self.status.as_deref() == Some("active")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    #[serde(default)]
    pub title: String,
    /// One of `system`, `manual`, `none`; anything else fails validation.
    #[serde(default)]
    pub validation: String,
    #[serde(default)]
    pub links: Vec<String>,
}

/// How a step's progress is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepValidation {
    System,
    Manual,
    #[serde(rename = "none")]
    NoTracking,
}

impl StepValidation {
    pub const ALL: [StepValidation; 3] = [
        StepValidation::System,
        StepValidation::Manual,
        StepValidation::NoTracking,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StepValidation::System => "system",
            StepValidation::Manual => "manual",
            StepValidation::NoTracking => "none",
        }
    }

    pub fn parse(value: &str) -> Option<StepValidation> {
        StepValidation::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assets {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guided_tour_url: Option<String>,
    #[serde(default)]
    pub resources: Resources,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resources {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_topic_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_notes_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blog_url: Option<String>,
    #[serde(default)]
    pub trailhead_badges: Vec<Badge>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,
    #[serde(default)]
    pub url: String,
}

/// Page copy supplied with the session or from content front matter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Labels {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benefits: Option<Benefits>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disclaimers: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Benefits {
    #[serde(default)]
    pub items: Vec<Benefit>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Benefit {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Treat blank strings the same as absent ones.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
