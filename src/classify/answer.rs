//! Questions and typed answers exchanged with the front end.
use crate::session::StepValidation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// First-level intent the user describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Intent {
    InitialSetup,
    StandardFeature,
    Agent,
    ComplexMultiStep,
    Custom,
}

/// One feature collected for a feature set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureAnswer {
    pub name: String,
    #[serde(default)]
    pub sold_to_customers: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One agent template step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepAnswer {
    pub title: String,
    pub validation: StepValidation,
    #[serde(default)]
    pub links: Vec<String>,
}

/// A discrete answer, tagged with the question it answers.
///
/// Serialized as `{"question": "automated", "value": true}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "question", content = "value", rename_all = "kebab-case")]
pub enum Answer {
    Intent(Intent),
    RetryStandard(bool),
    Automated(bool),
    Foundational(bool),
    HasJtbd(bool),
    JtbdText(String),
    GroupsFeatures(bool),
    Feature(FeatureAnswer),
    AddAnotherFeature(bool),
    InExistingFeatureSet(bool),
    FeatureSetName(String),
    SoldToCustomers(bool),
    TemplateName(String),
    Step(StepAnswer),
    AddAnotherStep(bool),
    AddAnotherTemplate(bool),
}

impl Answer {
    /// Key of the question this answer responds to.
    pub fn key(&self) -> &'static str {
        match self {
            Answer::Intent(_) => "intent",
            Answer::RetryStandard(_) => "retry-standard",
            Answer::Automated(_) => "automated",
            Answer::Foundational(_) => "foundational",
            Answer::HasJtbd(_) => "has-jtbd",
            Answer::JtbdText(_) => "jtbd-text",
            Answer::GroupsFeatures(_) => "groups-features",
            Answer::Feature(_) => "feature",
            Answer::AddAnotherFeature(_) => "add-another-feature",
            Answer::InExistingFeatureSet(_) => "in-existing-feature-set",
            Answer::FeatureSetName(_) => "feature-set-name",
            Answer::SoldToCustomers(_) => "sold-to-customers",
            Answer::TemplateName(_) => "template-name",
            Answer::Step(_) => "step",
            Answer::AddAnotherStep(_) => "add-another-step",
            Answer::AddAnotherTemplate(_) => "add-another-template",
        }
    }
}

/// The question a front end must ask next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Question {
    Intent,
    RetryStandard,
    Automated,
    Foundational,
    HasJtbd,
    JtbdText,
    GroupsFeatures,
    Feature,
    AddAnotherFeature,
    InExistingFeatureSet,
    FeatureSetName,
    SoldToCustomers,
    TemplateName,
    Step,
    AddAnotherStep,
    AddAnotherTemplate,
}

impl Question {
    /// Key matched against [`Answer::key`].
    pub fn key(&self) -> &'static str {
        match self {
            Question::Intent => "intent",
            Question::RetryStandard => "retry-standard",
            Question::Automated => "automated",
            Question::Foundational => "foundational",
            Question::HasJtbd => "has-jtbd",
            Question::JtbdText => "jtbd-text",
            Question::GroupsFeatures => "groups-features",
            Question::Feature => "feature",
            Question::AddAnotherFeature => "add-another-feature",
            Question::InExistingFeatureSet => "in-existing-feature-set",
            Question::FeatureSetName => "feature-set-name",
            Question::SoldToCustomers => "sold-to-customers",
            Question::TemplateName => "template-name",
            Question::Step => "step",
            Question::AddAnotherStep => "add-another-step",
            Question::AddAnotherTemplate => "add-another-template",
        }
    }

    /// Prompt text a front end can show verbatim.
    pub fn prompt(&self) -> &'static str {
        match self {
            Question::Intent => "What type of experience are you creating? (initial-setup, standard-feature, agent, complex-multi-step, custom)",
            Question::RetryStandard => "Complex and custom patterns need a design consultation. Continue with a standard setup type anyway?",
            Question::Automated => "Is the setup handled by automation?",
            Question::Foundational => "Is this setup required for a cloud to function and set up subsequent features?",
            Question::HasJtbd => "Is there a clear Job to be Done (JTBD) that users are trying to accomplish?",
            Question::JtbdText => "Describe the Job to be Done:",
            Question::GroupsFeatures => "Are you grouping multiple features together?",
            Question::Feature => "Feature name and whether it is sold to customers:",
            Question::AddAnotherFeature => "Add another feature?",
            Question::InExistingFeatureSet => "Does this feature belong to an existing Feature Set?",
            Question::FeatureSetName => "Which Feature Set does it belong to?",
            Question::SoldToCustomers => "Is this feature sold to customers or a user-facing capability?",
            Question::TemplateName => "Template name:",
            Question::Step => "Step title, validation type (system, manual, none), and up to 3 links:",
            Question::AddAnotherStep => "Add another step to this template?",
            Question::AddAnotherTemplate => "Add another template?",
        }
    }

    pub fn accepts(&self, answer: &Answer) -> bool {
        self.key() == answer.key()
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
