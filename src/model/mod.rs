//! Render-ready page models derived from a typed session.
//!
//! Building never validates and never fails: partial sessions degrade to
//! empty collections so previews still render.
mod route;
mod slug;

pub use route::{PageKind, HOME_ROUTE};
pub use slug::slugify;

use crate::session::{Agentforce, Archetype, Assets, Feature, Labels, Metadata, Session};
use crate::setup_type::SetupType;
use serde::Serialize;

/// Bucket for solution features without a feature set.
pub const DEFAULT_COMPONENT: &str = "Core Features";

/// Session metadata plus its slug.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelMetadata {
    #[serde(flatten)]
    pub metadata: Metadata,
    pub slug: String,
}

/// Link to another page of the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub title: String,
    pub slug: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: PageKind,
}

impl NavLink {
    pub fn new(kind: PageKind, title: &str) -> Self {
        let slug = slugify(title);
        NavLink {
            title: title.to_string(),
            url: kind.route(&slug),
            slug,
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigation {
    pub home: String,
    /// Route of the page this model renders.
    pub current: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<NavLink>,
    pub related: Vec<NavLink>,
}

/// Group of solution features sharing a feature set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub features: Vec<Feature>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetupStep {
    pub title: &'static str,
    pub automated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Integration {
    pub name: &'static str,
    pub description: &'static str,
    pub config_url: &'static str,
}

/// Flattened projection of a session for one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageModel {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub setup_type: SetupType,
    pub setup_type_label: &'static str,
    /// Slug of the page this model renders.
    pub slug: String,
    pub metadata: ModelMetadata,
    pub assets: Assets,
    pub features: Vec<Feature>,
    pub agentforce: Agentforce,
    pub labels: Labels,
    pub agentforce_on: bool,
    pub agentforce_toggleable: bool,
    pub salesforce_foundations_active: bool,
    pub features_configured: usize,
    pub templates_on: usize,
    pub is_configured: bool,
    pub components: Vec<Component>,
    pub setup_steps: Vec<SetupStep>,
    pub integrations: Vec<Integration>,
    pub navigation: Navigation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_feature: Option<Feature>,
}

/// Build the main-page model for a session.
pub fn build_page_model(session: &Session) -> PageModel {
    let setup_type = session.setup_type();
    let slug = slugify(&session.metadata.name);
    let features = session.features().to_vec();
    let agentforce = session.agentforce().cloned().unwrap_or_else(|| Agentforce {
        needed: session.agentforce_needed,
        templates: Vec::new(),
    });

    PageModel {
        title: session.metadata.name.clone(),
        description: session.metadata.description.clone(),
        setup_type,
        setup_type_label: setup_type.label(),
        navigation: main_navigation(session, &slug),
        metadata: ModelMetadata {
            metadata: session.metadata.clone(),
            slug: slug.clone(),
        },
        slug,
        assets: session.assets.clone(),
        features_configured: features.iter().filter(|f| f.is_configured()).count(),
        templates_on: agentforce.templates.iter().filter(|t| t.is_active()).count(),
        is_configured: is_configured(session),
        components: build_components(session),
        setup_steps: build_setup_steps(session),
        integrations: build_integrations(session),
        features,
        agentforce_on: session.agentforce_needed,
        agentforce_toggleable: setup_type == SetupType::AgentSetup,
        salesforce_foundations_active: true,
        agentforce,
        labels: session.labels.clone(),
        current_feature: None,
    }
}

/// Overall progress; solution status is owned elsewhere and reads false.
pub fn is_configured(session: &Session) -> bool {
    match &session.archetype {
        Archetype::FeatureSet { features, .. } => features.iter().any(Feature::is_configured),
        Archetype::Feature { feature, .. } => feature.as_ref().is_some_and(Feature::is_configured),
        Archetype::Agent { agentforce } => agentforce.templates.iter().any(|t| t.is_active()),
        Archetype::Solution { .. } => false,
    }
}

/// Solution features bucketed by feature set, in first-seen order.
pub fn build_components(session: &Session) -> Vec<Component> {
    let Archetype::Solution { features } = &session.archetype else {
        return Vec::new();
    };
    let mut groups: Vec<(String, Vec<Feature>)> = Vec::new();
    for feature in features {
        let group = feature
            .belongs_to_feature_set
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_COMPONENT);
        match groups.iter_mut().find(|(name, _)| name == group) {
            Some((_, members)) => members.push(feature.clone()),
            None => groups.push((group.to_string(), vec![feature.clone()])),
        }
    }
    groups
        .into_iter()
        .map(|(name, features)| Component {
            id: slugify(&name),
            description: format!(
                "{} feature{} in this component",
                features.len(),
                if features.len() == 1 { "" } else { "s" }
            ),
            name,
            kind: "feature-group",
            features,
        })
        .collect()
}

const SOLUTION_STEPS: [&str; 4] = [
    "Initialize cloud environment",
    "Configure base settings",
    "Setup user permissions",
    "Deploy core components",
];

pub fn build_setup_steps(session: &Session) -> Vec<SetupStep> {
    if session.setup_type() != SetupType::SolutionInitialSetup {
        return Vec::new();
    }
    SOLUTION_STEPS
        .into_iter()
        .map(|title| SetupStep {
            title,
            automated: true,
        })
        .collect()
}

pub fn build_integrations(session: &Session) -> Vec<Integration> {
    if session.setup_type() != SetupType::SolutionInitialSetup {
        return Vec::new();
    }
    let mut integrations = Vec::new();
    let sales_cloud = session
        .metadata
        .cloud
        .as_deref()
        .is_some_and(|cloud| cloud.to_lowercase().contains("sales"));
    if sales_cloud {
        integrations.push(Integration {
            name: "Salesforce CRM Integration",
            description: "Connect with existing CRM data and workflows",
            config_url: "#configure-crm",
        });
    }
    if session.agentforce_needed {
        integrations.push(Integration {
            name: "Agentforce Integration",
            description: "Enable AI-powered agent capabilities",
            config_url: "#configure-agentforce",
        });
    }
    integrations
}

/// Feature set a single feature belongs to, from metadata or the feature.
pub fn parent_feature_set(session: &Session) -> Option<&str> {
    let Archetype::Feature { feature, .. } = &session.archetype else {
        return None;
    };
    let from_feature = feature
        .as_ref()
        .and_then(|feature| feature.belongs_to_feature_set.as_deref());
    session
        .metadata
        .belongs_to_feature_set
        .as_deref()
        .or(from_feature)
        .map(str::trim)
        .filter(|name| !name.is_empty())
}

fn main_navigation(session: &Session, slug: &str) -> Navigation {
    let kind = PageKind::main_for(session.setup_type());
    let mut parent = None;
    let mut related = Vec::new();
    match &session.archetype {
        Archetype::FeatureSet { features, .. } => {
            related.extend(
                features
                    .iter()
                    .map(|feature| NavLink::new(PageKind::Feature, &feature.name)),
            );
        }
        Archetype::Feature { .. } => {
            if let Some(set) = parent_feature_set(session) {
                let link = NavLink::new(PageKind::FeatureSet, set);
                related.push(link.clone());
                parent = Some(link);
            }
        }
        Archetype::Solution { .. } | Archetype::Agent { .. } => {}
    }
    Navigation {
        home: HOME_ROUTE.to_string(),
        current: kind.route(slug),
        parent,
        related,
    }
}
