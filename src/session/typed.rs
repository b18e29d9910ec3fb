//! Typed session view used by page construction.
//!
//! A record becomes a `Session` once its setup type is known; each archetype
//! carries only the payload that is meaningful for it.
use super::record::{non_empty, Agentforce, Assets, Feature, Labels, Metadata, SessionRecord};
use crate::setup_type::SetupType;

/// Template flavour for single-feature pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureTemplate {
    Feature,
    Feature2,
}

/// Setup-type-specific payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Archetype {
    Feature {
        template: FeatureTemplate,
        feature: Option<Feature>,
    },
    FeatureSet {
        jtbd: Option<String>,
        features: Vec<Feature>,
    },
    Solution {
        features: Vec<Feature>,
    },
    Agent {
        agentforce: Agentforce,
    },
}

impl Archetype {
    pub fn setup_type(&self) -> SetupType {
        match self {
            Archetype::Feature {
                template: FeatureTemplate::Feature,
                ..
            } => SetupType::Feature,
            Archetype::Feature {
                template: FeatureTemplate::Feature2,
                ..
            } => SetupType::Feature2,
            Archetype::FeatureSet { .. } => SetupType::FeatureSetAndFeatures,
            Archetype::Solution { .. } => SetupType::SolutionInitialSetup,
            Archetype::Agent { .. } => SetupType::AgentSetup,
        }
    }
}

/// Why a record could not be typed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SetupTypeError {
    #[error("session has no setup type")]
    Missing,
    #[error("unknown setup type: {0:?}")]
    Unknown(String),
}

/// Common envelope plus archetype payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub metadata: Metadata,
    pub archetype: Archetype,
    pub assets: Assets,
    pub labels: Labels,
    /// Whether Agentforce is enabled, independent of archetype.
    pub agentforce_needed: bool,
}

impl Session {
    /// Type a record. Missing optional data degrades to empty values so
    /// partially valid sessions can still be previewed.
    pub fn from_record(record: &SessionRecord) -> Result<Session, SetupTypeError> {
        let setup_type = match record.parsed_setup_type() {
            None => return Err(SetupTypeError::Missing),
            Some(Err(err)) => return Err(SetupTypeError::Unknown(err.0)),
            Some(Ok(setup_type)) => setup_type,
        };

        let archetype = match setup_type {
            SetupType::Feature | SetupType::Feature2 => Archetype::Feature {
                template: if setup_type == SetupType::Feature2 {
                    FeatureTemplate::Feature2
                } else {
                    FeatureTemplate::Feature
                },
                feature: record.features.first().cloned(),
            },
            SetupType::FeatureSetAndFeatures => Archetype::FeatureSet {
                jtbd: non_empty(&record.metadata.jtbd).map(str::to_string),
                features: record.features.clone(),
            },
            SetupType::SolutionInitialSetup => Archetype::Solution {
                features: record.features.clone(),
            },
            SetupType::AgentSetup => Archetype::Agent {
                agentforce: record.agentforce.clone(),
            },
        };

        Ok(Session {
            metadata: record.metadata.clone(),
            archetype,
            assets: record.assets.clone(),
            labels: record.labels.clone().unwrap_or_default(),
            agentforce_needed: record.agentforce.needed,
        })
    }

    pub fn setup_type(&self) -> SetupType {
        self.archetype.setup_type()
    }

    /// Features carried by the archetype, in session order.
    pub fn features(&self) -> &[Feature] {
        match &self.archetype {
            Archetype::Feature { feature, .. } => feature.as_slice(),
            Archetype::FeatureSet { features, .. } | Archetype::Solution { features } => features,
            Archetype::Agent { .. } => &[],
        }
    }

    pub fn agentforce(&self) -> Option<&Agentforce> {
        match &self.archetype {
            Archetype::Agent { agentforce } => Some(agentforce),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(setup_type: Option<&str>) -> SessionRecord {
        SessionRecord {
            setup_type: setup_type.map(str::to_string),
            metadata: Metadata {
                name: "Smart Search".to_string(),
                ..Metadata::default()
            },
            ..SessionRecord::default()
        }
    }

    #[test]
    fn missing_and_unknown_setup_types_are_rejected() {
        assert_eq!(
            Session::from_record(&record(None)),
            Err(SetupTypeError::Missing)
        );
        assert_eq!(
            Session::from_record(&record(Some("  "))),
            Err(SetupTypeError::Missing)
        );
        assert_eq!(
            Session::from_record(&record(Some("wizard"))),
            Err(SetupTypeError::Unknown("wizard".to_string()))
        );
    }

    #[test]
    fn feature_alias_keeps_template_and_tolerates_no_feature() {
        let session = Session::from_record(&record(Some("feature-2"))).unwrap();
        assert_eq!(session.setup_type(), SetupType::Feature2);
        assert!(session.features().is_empty());
    }

    #[test]
    fn agent_archetype_carries_agentforce_only() {
        let mut rec = record(Some("agent-setup"));
        rec.agentforce.needed = true;
        rec.features.push(Feature {
            name: "ignored".to_string(),
            ..Feature::default()
        });
        let session = Session::from_record(&rec).unwrap();
        assert!(session.features().is_empty());
        assert!(session.agentforce().is_some_and(|agent| agent.needed));
    }
}
