//! Setup-type identifiers and the discovery catalog.
//!
//! The catalog is static data for front ends; classification never consults it.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed classification assigned to a session.
///
/// `Feature2` is a template alias of `Feature`: rules treat both the same,
/// page composition keeps the alias for template and route selection.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum SetupType {
    Feature,
    #[serde(rename = "feature-2")]
    Feature2,
    FeatureSetAndFeatures,
    SolutionInitialSetup,
    AgentSetup,
}

impl SetupType {
    /// Every recognized setup type, alias included.
    pub const ALL: [SetupType; 5] = [
        SetupType::FeatureSetAndFeatures,
        SetupType::Feature,
        SetupType::Feature2,
        SetupType::SolutionInitialSetup,
        SetupType::AgentSetup,
    ];

    /// Return the stable string identifier used in session files.
    pub fn as_str(&self) -> &'static str {
        match self {
            SetupType::Feature => "feature",
            SetupType::Feature2 => "feature-2",
            SetupType::FeatureSetAndFeatures => "feature-set-and-features",
            SetupType::SolutionInitialSetup => "solution-initial-setup",
            SetupType::AgentSetup => "agent-setup",
        }
    }

    /// Human-readable label shown on rendered pages.
    pub fn label(&self) -> &'static str {
        match self {
            SetupType::Feature => "Feature",
            SetupType::Feature2 => "Feature 2",
            SetupType::FeatureSetAndFeatures => "Feature Set and Features",
            SetupType::SolutionInitialSetup => "Solution / Initial Setup",
            SetupType::AgentSetup => "Agent Setup",
        }
    }

    /// True for `feature` and its `feature-2` alias.
    pub fn is_single_feature(&self) -> bool {
        matches!(self, SetupType::Feature | SetupType::Feature2)
    }
}

impl fmt::Display for SetupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a string is not one of the recognized setup types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown setup type: {0:?}")]
pub struct UnknownSetupType(pub String);

impl FromStr for SetupType {
    type Err = UnknownSetupType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        SetupType::ALL
            .iter()
            .copied()
            .find(|setup_type| setup_type.as_str() == value)
            .ok_or_else(|| UnknownSetupType(value.to_string()))
    }
}

/// Catalog entry exposed for discovery.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupTypeInfo {
    pub id: SetupType,
    pub name: &'static str,
    pub description: &'static str,
    pub requirements: &'static [&'static str],
    pub examples: &'static [&'static str],
}

/// The four supported setup types, in presentation order.
pub const CATALOG: [SetupTypeInfo; 4] = [
    SetupTypeInfo {
        id: SetupType::FeatureSetAndFeatures,
        name: "Feature Set and Features",
        description: "Group multiple features with a Job to be Done",
        requirements: &["≥2 features", "Clear JTBD"],
        examples: &["Authentication Suite", "Document Management", "Analytics Package"],
    },
    SetupTypeInfo {
        id: SetupType::Feature,
        name: "Feature",
        description: "Single feature or capability",
        requirements: &["Customer-facing or sold capability"],
        examples: &["File Upload", "Email Notifications", "Advanced Search"],
    },
    SetupTypeInfo {
        id: SetupType::SolutionInitialSetup,
        name: "Solution / Initial Setup",
        description: "Foundational automated setup",
        requirements: &["Automation-handled", "Required for cloud function"],
        examples: &["E-commerce Platform", "CRM Setup", "Platform Initialization"],
    },
    SetupTypeInfo {
        id: SetupType::AgentSetup,
        name: "Agent Setup",
        description: "Agentforce AI agent configuration",
        requirements: &["Agentforce needed"],
        examples: &["Customer Service Bot", "Sales Assistant", "Support Agent"],
    },
];
