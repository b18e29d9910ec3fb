//! Canonical business rules as a declarative descriptor table.
//!
//! Each descriptor pairs a predicate with a severity and a message template;
//! the evaluator never branches on rule identity. Templates use `{name}`
//! placeholders filled from the violation's variables.
use super::{Finding, FindingKind};
use crate::config::{validate_config, BuilderConfig, Limits};
use crate::model::slugify;
use crate::session::{non_empty, SessionRecord, StepValidation};
use crate::setup_type::SetupType;
use anyhow::Result;
use url::Url;

/// Which validation stage a rule belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RuleStage {
    /// General rules, independent of setup type.
    Canonical,
    /// Rules keyed on the session's setup type.
    SetupType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    fn finding_kind(self) -> FindingKind {
        match self {
            Severity::Error => FindingKind::CanonicalRuleError,
            Severity::Warning => FindingKind::CanonicalWarning,
        }
    }
}

/// Inputs shared by every predicate.
#[derive(Debug, Clone)]
pub struct RuleContext {
    pub limits: Limits,
    pub approved_domains: Vec<String>,
    pub trailhead_domain: String,
}

/// One failed predicate instance.
#[derive(Debug, Clone, Default)]
pub struct Violation {
    pub path: Option<String>,
    pub vars: Vec<(&'static str, String)>,
}

impl Violation {
    fn at(path: impl Into<String>) -> Self {
        Violation {
            path: Some(path.into()),
            vars: Vec::new(),
        }
    }

    fn var(mut self, name: &'static str, value: impl ToString) -> Self {
        self.vars.push((name, value.to_string()));
        self
    }
}

type Predicate = fn(&RuleContext, &SessionRecord) -> Vec<Violation>;

/// `(id, stage, severity, message template, predicate)`.
#[derive(Clone, Copy)]
pub struct RuleDescriptor {
    pub id: &'static str,
    pub stage: RuleStage,
    pub severity: Severity,
    pub message: &'static str,
    check: Predicate,
}

impl std::fmt::Debug for RuleDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleDescriptor")
            .field("id", &self.id)
            .field("stage", &self.stage)
            .field("severity", &self.severity)
            .finish()
    }
}

const RULES: &[RuleDescriptor] = &[
    RuleDescriptor {
        id: "badge-limit",
        stage: RuleStage::Canonical,
        severity: Severity::Error,
        message: "At most {limit} Trailhead badges are allowed (found {count})",
        check: badge_limit,
    },
    RuleDescriptor {
        id: "badge-url",
        stage: RuleStage::Canonical,
        severity: Severity::Error,
        message: "Trailhead badge {index} URL is not a valid URL",
        check: badge_url,
    },
    RuleDescriptor {
        id: "badge-domain",
        stage: RuleStage::Canonical,
        severity: Severity::Warning,
        message: "Trailhead badge {index} should link to {domain}",
        check: badge_domain,
    },
    RuleDescriptor {
        id: "asset-url",
        stage: RuleStage::Canonical,
        severity: Severity::Error,
        message: "{field} must be a valid URL",
        check: asset_url,
    },
    RuleDescriptor {
        id: "asset-domain",
        stage: RuleStage::Canonical,
        severity: Severity::Warning,
        message: "{field} should use an approved Salesforce domain",
        check: asset_domain,
    },
    RuleDescriptor {
        id: "template-steps",
        stage: RuleStage::Canonical,
        severity: Severity::Warning,
        message: "Agent template '{template}' should have at least one step",
        check: template_steps,
    },
    RuleDescriptor {
        id: "step-link-limit",
        stage: RuleStage::Canonical,
        severity: Severity::Error,
        message: "Agent template '{template}', step {step} has {count} links (max {limit})",
        check: step_link_limit,
    },
    RuleDescriptor {
        id: "step-link-url",
        stage: RuleStage::Canonical,
        severity: Severity::Error,
        message: "Agent template '{template}', step {step}, link {link} must be a valid URL",
        check: step_link_url,
    },
    RuleDescriptor {
        id: "step-validation",
        stage: RuleStage::Canonical,
        severity: Severity::Error,
        message: "Agent template '{template}', step {step} has validation type {value}; expected system, manual or none",
        check: step_validation,
    },
    RuleDescriptor {
        id: "benefit-count",
        stage: RuleStage::Canonical,
        severity: Severity::Warning,
        message: "Benefits should list {min} to {max} items (found {count})",
        check: benefit_count,
    },
    RuleDescriptor {
        id: "benefit-title-length",
        stage: RuleStage::Canonical,
        severity: Severity::Warning,
        message: "Benefit {index} title exceeds the recommended {limit} characters",
        check: benefit_title_length,
    },
    RuleDescriptor {
        id: "benefit-description-length",
        stage: RuleStage::Canonical,
        severity: Severity::Warning,
        message: "Benefit {index} description exceeds the recommended {limit} characters",
        check: benefit_description_length,
    },
    RuleDescriptor {
        id: "ai-compliance-review",
        stage: RuleStage::Canonical,
        severity: Severity::Warning,
        message: "AI/ML related content requires legal/compliance review before publication",
        check: ai_compliance_review,
    },
    RuleDescriptor {
        id: "ai-disclaimer",
        stage: RuleStage::Canonical,
        severity: Severity::Warning,
        message: "Consider adding AI/agent-specific disclaimers for transparency",
        check: ai_disclaimer,
    },
    RuleDescriptor {
        id: "page-slug",
        stage: RuleStage::Canonical,
        severity: Severity::Error,
        message: "{field} '{name}' has no letters or digits to build a page address from",
        check: page_slug,
    },
    RuleDescriptor {
        id: "feature-set-min-features",
        stage: RuleStage::SetupType,
        severity: Severity::Error,
        message: "Feature Set requires at least {min} features (found {count})",
        check: feature_set_min_features,
    },
    RuleDescriptor {
        id: "feature-set-jtbd",
        stage: RuleStage::SetupType,
        severity: Severity::Error,
        message: "Feature Set requires a Job to be Done (JTBD)",
        check: feature_set_jtbd,
    },
    RuleDescriptor {
        id: "feature-slug-unique",
        stage: RuleStage::SetupType,
        severity: Severity::Error,
        message: "Features '{first}' and '{name}' share the page address feature/{slug}.html",
        check: feature_slug_unique,
    },
    RuleDescriptor {
        id: "single-feature",
        stage: RuleStage::SetupType,
        severity: Severity::Error,
        message: "Single Feature setup should not have multiple features (found {count}; use Feature Set instead)",
        check: single_feature,
    },
    RuleDescriptor {
        id: "solution-no-jtbd",
        stage: RuleStage::SetupType,
        severity: Severity::Error,
        message: "Solution / Initial Setup should not have a JTBD (foundational setup)",
        check: solution_no_jtbd,
    },
    RuleDescriptor {
        id: "agent-enabled",
        stage: RuleStage::SetupType,
        severity: Severity::Error,
        message: "Agent Setup requires Agentforce to be enabled",
        check: agent_enabled,
    },
    RuleDescriptor {
        id: "agent-templates",
        stage: RuleStage::SetupType,
        severity: Severity::Error,
        message: "Agent Setup requires at least one agent template",
        check: agent_templates,
    },
];

/// Rule table plus the configured limits it is evaluated with.
#[derive(Debug, Clone)]
pub struct CanonicalRuleSet {
    context: RuleContext,
    rules: Vec<RuleDescriptor>,
}

impl Default for CanonicalRuleSet {
    fn default() -> Self {
        CanonicalRuleSet::standard()
    }
}

impl CanonicalRuleSet {
    /// Stock rules with stock limits.
    pub fn standard() -> Self {
        CanonicalRuleSet::with_context(RuleContext::from(&BuilderConfig::default()))
    }

    /// Stock rules with configured limits; fails on an unusable config.
    pub fn from_config(config: &BuilderConfig) -> Result<Self> {
        validate_config(config)?;
        Ok(CanonicalRuleSet::with_context(RuleContext::from(config)))
    }

    fn with_context(context: RuleContext) -> Self {
        let mut rules = RULES.to_vec();
        // Stable: declaration order is kept within a stage.
        rules.sort_by_key(|rule| rule.stage);
        CanonicalRuleSet { context, rules }
    }

    pub fn rules(&self) -> &[RuleDescriptor] {
        &self.rules
    }

    /// Findings for a well-typed record, canonical stage first.
    pub fn evaluate(&self, record: &SessionRecord) -> Vec<Finding> {
        let mut findings = Vec::new();
        for rule in &self.rules {
            for violation in (rule.check)(&self.context, record) {
                findings.push(Finding {
                    kind: rule.severity.finding_kind(),
                    rule: rule.id.to_string(),
                    path: violation.path,
                    message: render_message(rule.message, &violation.vars),
                });
            }
        }
        findings
    }
}

impl From<&BuilderConfig> for RuleContext {
    fn from(config: &BuilderConfig) -> Self {
        RuleContext {
            limits: config.limits,
            approved_domains: config.approved_domains.clone(),
            trailhead_domain: config.trailhead_domain.clone(),
        }
    }
}

fn render_message(template: &str, vars: &[(&'static str, String)]) -> String {
    let mut message = template.to_string();
    for (name, value) in vars {
        message = message.replace(&format!("{{{name}}}"), value);
    }
    message
}

const BADGES_PATH: &str = "assets.resources.trailheadBadges";

fn badge_limit(ctx: &RuleContext, record: &SessionRecord) -> Vec<Violation> {
    let count = record.assets.resources.trailhead_badges.len();
    if count <= ctx.limits.max_badges {
        return Vec::new();
    }
    vec![Violation::at(BADGES_PATH)
        .var("limit", ctx.limits.max_badges)
        .var("count", count)]
}

fn badge_url(_ctx: &RuleContext, record: &SessionRecord) -> Vec<Violation> {
    record
        .assets
        .resources
        .trailhead_badges
        .iter()
        .enumerate()
        .filter(|(_, badge)| parse_url(&badge.url).is_none())
        .map(|(index, _)| {
            Violation::at(format!("{BADGES_PATH}[{index}].url")).var("index", index + 1)
        })
        .collect()
}

fn badge_domain(ctx: &RuleContext, record: &SessionRecord) -> Vec<Violation> {
    record
        .assets
        .resources
        .trailhead_badges
        .iter()
        .enumerate()
        .filter_map(|(index, badge)| {
            let url = parse_url(&badge.url)?;
            if host_within(&url, std::slice::from_ref(&ctx.trailhead_domain)) {
                return None;
            }
            Some(
                Violation::at(format!("{BADGES_PATH}[{index}].url"))
                    .var("index", index + 1)
                    .var("domain", &ctx.trailhead_domain),
            )
        })
        .collect()
}

/// Populated asset and resource URL fields as `(path, label, value)`.
fn asset_urls(record: &SessionRecord) -> Vec<(&'static str, &'static str, &str)> {
    let assets = &record.assets;
    let resources = &assets.resources;
    [
        ("assets.screenshotUrl", "Screenshot URL", &assets.screenshot_url),
        ("assets.videoUrl", "Video URL", &assets.video_url),
        ("assets.guidedTourUrl", "Guided Tour URL", &assets.guided_tour_url),
        (
            "assets.resources.helpTopicUrl",
            "Help Topic URL",
            &resources.help_topic_url,
        ),
        (
            "assets.resources.releaseNotesUrl",
            "Release Notes URL",
            &resources.release_notes_url,
        ),
        ("assets.resources.blogUrl", "Blog URL", &resources.blog_url),
    ]
    .into_iter()
    .filter_map(|(path, label, value)| non_empty(value).map(|value| (path, label, value)))
    .collect()
}

fn asset_url(_ctx: &RuleContext, record: &SessionRecord) -> Vec<Violation> {
    asset_urls(record)
        .into_iter()
        .filter(|(_, _, value)| parse_url(value).is_none())
        .map(|(path, label, _)| Violation::at(path).var("field", label))
        .collect()
}

fn asset_domain(ctx: &RuleContext, record: &SessionRecord) -> Vec<Violation> {
    asset_urls(record)
        .into_iter()
        .filter(|(_, _, value)| {
            parse_url(value).is_some_and(|url| !host_within(&url, &ctx.approved_domains))
        })
        .map(|(path, label, _)| Violation::at(path).var("field", label))
        .collect()
}

fn template_steps(_ctx: &RuleContext, record: &SessionRecord) -> Vec<Violation> {
    record
        .agentforce
        .templates
        .iter()
        .enumerate()
        .filter(|(_, template)| template.steps.is_empty())
        .map(|(index, template)| {
            Violation::at(format!("agentforce.templates[{index}].steps"))
                .var("template", &template.name)
        })
        .collect()
}

/// Every step as `(path, template name, 1-based step number, step)`.
fn steps(record: &SessionRecord) -> Vec<(String, &str, usize, &crate::session::Step)> {
    let mut out = Vec::new();
    for (t, template) in record.agentforce.templates.iter().enumerate() {
        for (s, step) in template.steps.iter().enumerate() {
            out.push((
                format!("agentforce.templates[{t}].steps[{s}]"),
                template.name.as_str(),
                s + 1,
                step,
            ));
        }
    }
    out
}

fn step_link_limit(ctx: &RuleContext, record: &SessionRecord) -> Vec<Violation> {
    steps(record)
        .into_iter()
        .filter(|(_, _, _, step)| step.links.len() > ctx.limits.max_step_links)
        .map(|(path, template, number, step)| {
            Violation::at(format!("{path}.links"))
                .var("template", template)
                .var("step", number)
                .var("count", step.links.len())
                .var("limit", ctx.limits.max_step_links)
        })
        .collect()
}

fn step_link_url(_ctx: &RuleContext, record: &SessionRecord) -> Vec<Violation> {
    let mut violations = Vec::new();
    for (path, template, number, step) in steps(record) {
        for (index, link) in step.links.iter().enumerate() {
            if link.trim().is_empty() || parse_url(link).is_some() {
                continue;
            }
            violations.push(
                Violation::at(format!("{path}.links[{index}]"))
                    .var("template", template)
                    .var("step", number)
                    .var("link", index + 1),
            );
        }
    }
    violations
}

fn step_validation(_ctx: &RuleContext, record: &SessionRecord) -> Vec<Violation> {
    if record.known_setup_type() != Some(SetupType::AgentSetup) {
        return Vec::new();
    }
    steps(record)
        .into_iter()
        .filter(|(_, _, _, step)| StepValidation::parse(&step.validation).is_none())
        .map(|(path, template, number, step)| {
            Violation::at(format!("{path}.validation"))
                .var("template", template)
                .var("step", number)
                .var("value", format!("{:?}", step.validation))
        })
        .collect()
}

fn benefit_items(record: &SessionRecord) -> Option<&[crate::session::Benefit]> {
    record
        .labels
        .as_ref()
        .and_then(|labels| labels.benefits.as_ref())
        .map(|benefits| benefits.items.as_slice())
}

fn benefit_count(ctx: &RuleContext, record: &SessionRecord) -> Vec<Violation> {
    let Some(items) = benefit_items(record) else {
        return Vec::new();
    };
    let count = items.len();
    if (ctx.limits.benefits_min..=ctx.limits.benefits_max).contains(&count) {
        return Vec::new();
    }
    vec![Violation::at("labels.benefits.items")
        .var("min", ctx.limits.benefits_min)
        .var("max", ctx.limits.benefits_max)
        .var("count", count)]
}

fn benefit_title_length(ctx: &RuleContext, record: &SessionRecord) -> Vec<Violation> {
    let limit = ctx.limits.benefit_title_max;
    benefit_items(record)
        .unwrap_or_default()
        .iter()
        .enumerate()
        .filter(|(_, benefit)| benefit.title.chars().count() > limit)
        .map(|(index, _)| {
            Violation::at(format!("labels.benefits.items[{index}].title"))
                .var("index", index + 1)
                .var("limit", limit)
        })
        .collect()
}

fn benefit_description_length(ctx: &RuleContext, record: &SessionRecord) -> Vec<Violation> {
    let limit = ctx.limits.benefit_description_max;
    benefit_items(record)
        .unwrap_or_default()
        .iter()
        .enumerate()
        .filter(|(_, benefit)| {
            benefit
                .description
                .as_deref()
                .is_some_and(|description| description.chars().count() > limit)
        })
        .map(|(index, _)| {
            Violation::at(format!("labels.benefits.items[{index}].description"))
                .var("index", index + 1)
                .var("limit", limit)
        })
        .collect()
}

fn ai_compliance_review(_ctx: &RuleContext, record: &SessionRecord) -> Vec<Violation> {
    if record.known_setup_type() != Some(SetupType::AgentSetup) {
        return Vec::new();
    }
    vec![Violation::default()]
}

fn ai_disclaimer(_ctx: &RuleContext, record: &SessionRecord) -> Vec<Violation> {
    if record.known_setup_type() != Some(SetupType::AgentSetup) {
        return Vec::new();
    }
    let has_disclaimers = record
        .labels
        .as_ref()
        .and_then(|labels| labels.disclaimers.as_ref())
        .is_some_and(|disclaimers| disclaimers.iter().any(|text| !text.trim().is_empty()));
    if has_disclaimers {
        return Vec::new();
    }
    vec![Violation::at("labels.disclaimers")]
}

fn feature_set_min_features(ctx: &RuleContext, record: &SessionRecord) -> Vec<Violation> {
    let min = ctx.limits.feature_set_min_features;
    if record.known_setup_type() != Some(SetupType::FeatureSetAndFeatures)
        || record.features.len() >= min
    {
        return Vec::new();
    }
    vec![Violation::at("features")
        .var("min", min)
        .var("count", record.features.len())]
}

fn feature_set_jtbd(_ctx: &RuleContext, record: &SessionRecord) -> Vec<Violation> {
    if record.known_setup_type() != Some(SetupType::FeatureSetAndFeatures)
        || record.jtbd().is_some()
    {
        return Vec::new();
    }
    vec![Violation::at("metadata.jtbd")]
}

fn page_slug(_ctx: &RuleContext, record: &SessionRecord) -> Vec<Violation> {
    let mut violations = Vec::new();
    let name = &record.metadata.name;
    if !name.trim().is_empty() && slugify(name).is_empty() {
        violations.push(
            Violation::at("metadata.name")
                .var("field", "Session name")
                .var("name", name),
        );
    }
    if record.known_setup_type() == Some(SetupType::FeatureSetAndFeatures) {
        for (index, feature) in record.features.iter().enumerate() {
            if !feature.name.trim().is_empty() && slugify(&feature.name).is_empty() {
                violations.push(
                    Violation::at(format!("features[{index}].name"))
                        .var("field", format!("Feature {}", index + 1))
                        .var("name", &feature.name),
                );
            }
        }
    }
    violations
}

/// Feature pages are addressed by slug, so two features must not share one.
fn feature_slug_unique(_ctx: &RuleContext, record: &SessionRecord) -> Vec<Violation> {
    if record.known_setup_type() != Some(SetupType::FeatureSetAndFeatures) {
        return Vec::new();
    }
    let mut seen: Vec<(String, &str)> = Vec::new();
    let mut violations = Vec::new();
    for (index, feature) in record.features.iter().enumerate() {
        let slug = slugify(&feature.name);
        if slug.is_empty() {
            continue;
        }
        match seen.iter().find(|(other, _)| *other == slug) {
            Some((_, first)) => violations.push(
                Violation::at(format!("features[{index}].name"))
                    .var("first", *first)
                    .var("name", &feature.name)
                    .var("slug", &slug),
            ),
            None => seen.push((slug, feature.name.as_str())),
        }
    }
    violations
}

fn single_feature(_ctx: &RuleContext, record: &SessionRecord) -> Vec<Violation> {
    let single = record
        .known_setup_type()
        .is_some_and(|setup_type| setup_type.is_single_feature());
    if !single || record.features.len() <= 1 {
        return Vec::new();
    }
    vec![Violation::at("features").var("count", record.features.len())]
}

fn solution_no_jtbd(_ctx: &RuleContext, record: &SessionRecord) -> Vec<Violation> {
    if record.known_setup_type() != Some(SetupType::SolutionInitialSetup)
        || record.jtbd().is_none()
    {
        return Vec::new();
    }
    vec![Violation::at("metadata.jtbd")]
}

fn agent_enabled(_ctx: &RuleContext, record: &SessionRecord) -> Vec<Violation> {
    if record.known_setup_type() != Some(SetupType::AgentSetup) || record.agentforce.needed {
        return Vec::new();
    }
    vec![Violation::at("agentforce.needed")]
}

fn agent_templates(_ctx: &RuleContext, record: &SessionRecord) -> Vec<Violation> {
    if record.known_setup_type() != Some(SetupType::AgentSetup)
        || !record.agentforce.templates.is_empty()
    {
        return Vec::new();
    }
    vec![Violation::at("agentforce.templates")]
}

fn parse_url(value: &str) -> Option<Url> {
    Url::parse(value.trim()).ok()
}

/// Host equals a listed domain or is one of its subdomains.
fn host_within(url: &Url, domains: &[String]) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();
    domains.iter().any(|domain| {
        let domain = domain.to_ascii_lowercase();
        host == domain || host.ends_with(&format!(".{domain}"))
    })
}
