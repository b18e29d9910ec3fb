//! Setup-type classification as a pure state machine.
//!
//! The classifier never prompts. A front end asks [`Classifier::question`],
//! collects the answer however it likes, and feeds it back through
//! [`Classifier::answer`]; [`classify`] does the same over a pre-supplied
//! answer vector.
//!
//! ## Decision tree
//! - `initial-setup`: automated ∧ foundational ∧ ¬JTBD ⇒ `solution-initial-setup`,
//!   otherwise fall through to the feature branch (never to agent setup).
//!   The JTBD answer is carried over and not asked again.
//! - `standard-feature`: JTBD ∧ grouping ⇒ `feature-set-and-features` with at
//!   least two features, otherwise `feature` with exactly one.
//! - `agent`: always `agent-setup`; one or more templates of one or more steps.
//! - `complex-multi-step` / `custom`: refused unless the caller retries from
//!   the top.
mod answer;

pub use answer::{Answer, Intent, Question};

use crate::session::{AgentTemplate, Agentforce, Feature, Metadata, SessionRecord, Step};
use crate::setup_type::SetupType;

/// Minimum number of features collected for a feature set.
pub const MIN_FEATURE_SET_FEATURES: usize = 2;
/// Maximum supporting links per agent step.
pub const MAX_STEP_LINKS: usize = 3;

/// Classification failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifyError {
    /// The answers describe a pattern the system refuses to support.
    #[error("complex or custom patterns are not supported; retry with a standard setup type")]
    InconsistentRequirements,
    #[error("expected an answer to {expected}, got {found}")]
    UnexpectedAnswer {
        expected: Question,
        found: &'static str,
    },
    #[error("invalid answer to {question}: {reason}")]
    InvalidAnswer { question: Question, reason: String },
    #[error("classification incomplete; next question: {next}")]
    Incomplete { next: Question },
    #[error("classification finished with {count} unused answer(s)")]
    TrailingAnswers { count: usize },
}

impl ClassifyError {
    /// Only a refused pattern can succeed by re-invoking with other answers.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClassifyError::InconsistentRequirements)
    }
}

/// Result of a completed classification.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub setup_type: SetupType,
    pub session: SessionRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Intent,
    RetryStandard,
    Refused,
    Automated,
    Foundational,
    SolutionJtbd,
    FeatureJtbd,
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
    Done(SetupType),
}

/// Incremental classifier over one session's answers.
#[derive(Debug, Clone)]
pub struct Classifier {
    stage: Stage,
    metadata: Metadata,
    automated: bool,
    foundational: bool,
    has_jtbd: Option<bool>,
    jtbd: Option<String>,
    belongs_to_feature_set: Option<String>,
    features: Vec<Feature>,
    templates: Vec<AgentTemplate>,
    current_template: Option<AgentTemplate>,
}

impl Classifier {
    /// Start a classification for the given basic metadata.
    pub fn new(metadata: Metadata) -> Self {
        Classifier {
            stage: Stage::Intent,
            metadata,
            automated: false,
            foundational: false,
            has_jtbd: None,
            jtbd: None,
            belongs_to_feature_set: None,
            features: Vec::new(),
            templates: Vec::new(),
            current_template: None,
        }
    }

    /// Next question to ask, or `None` once classification ended.
    pub fn question(&self) -> Option<Question> {
        let question = match self.stage {
            Stage::Intent => Question::Intent,
            Stage::RetryStandard => Question::RetryStandard,
            Stage::Automated => Question::Automated,
            Stage::Foundational => Question::Foundational,
            Stage::SolutionJtbd | Stage::FeatureJtbd => Question::HasJtbd,
            Stage::JtbdText => Question::JtbdText,
            Stage::GroupsFeatures => Question::GroupsFeatures,
            Stage::Feature => Question::Feature,
            Stage::AddAnotherFeature => Question::AddAnotherFeature,
            Stage::InExistingFeatureSet => Question::InExistingFeatureSet,
            Stage::FeatureSetName => Question::FeatureSetName,
            Stage::SoldToCustomers => Question::SoldToCustomers,
            Stage::TemplateName => Question::TemplateName,
            Stage::Step => Question::Step,
            Stage::AddAnotherStep => Question::AddAnotherStep,
            Stage::AddAnotherTemplate => Question::AddAnotherTemplate,
            Stage::Refused | Stage::Done(_) => return None,
        };
        Some(question)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.stage, Stage::Done(_) | Stage::Refused)
    }

    /// Apply one answer to the pending question.
    ///
    /// A rejected answer leaves the classifier unchanged, except for a
    /// refused pattern which ends classification.
    pub fn answer(&mut self, answer: Answer) -> Result<(), ClassifyError> {
        let Some(expected) = self.question() else {
            return Err(match self.stage {
                Stage::Refused => ClassifyError::InconsistentRequirements,
                _ => ClassifyError::TrailingAnswers { count: 1 },
            });
        };
        if !expected.accepts(&answer) {
            return Err(ClassifyError::UnexpectedAnswer {
                expected,
                found: answer.key(),
            });
        }

        self.stage = match answer {
            Answer::Intent(intent) => match intent {
                Intent::InitialSetup => Stage::Automated,
                Intent::StandardFeature => Stage::FeatureJtbd,
                Intent::Agent => Stage::TemplateName,
                Intent::ComplexMultiStep | Intent::Custom => Stage::RetryStandard,
            },
            Answer::RetryStandard(true) => Stage::Intent,
            Answer::RetryStandard(false) => {
                self.stage = Stage::Refused;
                return Err(ClassifyError::InconsistentRequirements);
            }
            Answer::Automated(value) => {
                self.automated = value;
                Stage::Foundational
            }
            Answer::Foundational(value) => {
                self.foundational = value;
                Stage::SolutionJtbd
            }
            Answer::HasJtbd(value) => {
                self.has_jtbd = Some(value);
                if self.stage == Stage::SolutionJtbd
                    && self.automated
                    && self.foundational
                    && !value
                {
                    Stage::Done(SetupType::SolutionInitialSetup)
                } else if value {
                    Stage::JtbdText
                } else {
                    Stage::GroupsFeatures
                }
            }
            Answer::JtbdText(text) => {
                let text = required_text(Question::JtbdText, text)?;
                self.jtbd = Some(text);
                Stage::GroupsFeatures
            }
            Answer::GroupsFeatures(groups) => {
                if groups && self.has_jtbd == Some(true) {
                    Stage::Feature
                } else {
                    Stage::InExistingFeatureSet
                }
            }
            Answer::Feature(feature) => {
                let name = required_text(Question::Feature, feature.name)?;
                self.features.push(Feature {
                    name,
                    sold_to_customers: feature.sold_to_customers,
                    belongs_to_feature_set: Some(self.metadata.name.clone()),
                    description: feature.description,
                    status: None,
                });
                if self.features.len() < MIN_FEATURE_SET_FEATURES {
                    Stage::Feature
                } else {
                    Stage::AddAnotherFeature
                }
            }
            Answer::AddAnotherFeature(true) => Stage::Feature,
            Answer::AddAnotherFeature(false) => Stage::Done(SetupType::FeatureSetAndFeatures),
            Answer::InExistingFeatureSet(true) => Stage::FeatureSetName,
            Answer::InExistingFeatureSet(false) => Stage::SoldToCustomers,
            Answer::FeatureSetName(name) => {
                let name = required_text(Question::FeatureSetName, name)?;
                self.belongs_to_feature_set = Some(name);
                Stage::SoldToCustomers
            }
            Answer::SoldToCustomers(sold) => {
                self.features.push(Feature {
                    name: self.metadata.name.clone(),
                    sold_to_customers: sold,
                    belongs_to_feature_set: self.belongs_to_feature_set.clone(),
                    description: None,
                    status: None,
                });
                Stage::Done(SetupType::Feature)
            }
            Answer::TemplateName(name) => {
                let name = required_text(Question::TemplateName, name)?;
                self.current_template = Some(AgentTemplate {
                    name,
                    status: None,
                    steps: Vec::new(),
                });
                Stage::Step
            }
            Answer::Step(step) => {
                let title = required_text(Question::Step, step.title)?;
                if step.links.len() > MAX_STEP_LINKS {
                    return Err(ClassifyError::InvalidAnswer {
                        question: Question::Step,
                        reason: format!(
                            "at most {MAX_STEP_LINKS} links per step (got {})",
                            step.links.len()
                        ),
                    });
                }
                let links = step
                    .links
                    .into_iter()
                    .map(|link| link.trim().to_string())
                    .filter(|link| !link.is_empty())
                    .collect();
                if let Some(template) = self.current_template.as_mut() {
                    template.steps.push(Step {
                        title,
                        validation: step.validation.as_str().to_string(),
                        links,
                    });
                }
                Stage::AddAnotherStep
            }
            Answer::AddAnotherStep(true) => Stage::Step,
            Answer::AddAnotherStep(false) => {
                if let Some(template) = self.current_template.take() {
                    self.templates.push(template);
                }
                Stage::AddAnotherTemplate
            }
            Answer::AddAnotherTemplate(true) => Stage::TemplateName,
            Answer::AddAnotherTemplate(false) => Stage::Done(SetupType::AgentSetup),
        };
        Ok(())
    }

    /// Build the partial session once a setup type is decided.
    pub fn finish(self) -> Result<Classification, ClassifyError> {
        let setup_type = match self.stage {
            Stage::Done(setup_type) => setup_type,
            Stage::Refused => return Err(ClassifyError::InconsistentRequirements),
            _ => {
                return Err(ClassifyError::Incomplete {
                    // Every non-terminal stage has a question.
                    next: self.question().unwrap_or(Question::Intent),
                })
            }
        };

        let mut metadata = self.metadata;
        metadata.jtbd = match setup_type {
            SetupType::SolutionInitialSetup => None,
            _ => self.jtbd,
        };
        if setup_type.is_single_feature() {
            metadata.belongs_to_feature_set = self.belongs_to_feature_set;
        }
        let agentforce = if setup_type == SetupType::AgentSetup {
            Agentforce {
                needed: true,
                templates: self.templates,
            }
        } else {
            Agentforce::default()
        };

        Ok(Classification {
            setup_type,
            session: SessionRecord {
                setup_type: Some(setup_type.as_str().to_string()),
                metadata,
                features: self.features,
                agentforce,
                ..SessionRecord::default()
            },
        })
    }
}

/// Classify a pre-supplied answer sequence.
///
/// Pure: the same metadata and answers always yield the same result.
pub fn classify<I>(metadata: Metadata, answers: I) -> Result<Classification, ClassifyError>
where
    I: IntoIterator<Item = Answer>,
{
    let mut classifier = Classifier::new(metadata);
    let answers: Vec<Answer> = answers.into_iter().collect();
    let total = answers.len();
    for (index, answer) in answers.into_iter().enumerate() {
        if classifier.is_finished() {
            if classifier.stage == Stage::Refused {
                return Err(ClassifyError::InconsistentRequirements);
            }
            return Err(ClassifyError::TrailingAnswers {
                count: total - index,
            });
        }
        classifier.answer(answer)?;
    }
    classifier.finish()
}

fn required_text(question: Question, text: String) -> Result<String, ClassifyError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ClassifyError::InvalidAnswer {
            question,
            reason: "must not be empty".to_string(),
        });
    }
    Ok(trimmed.to_string())
}
