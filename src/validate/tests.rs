use super::rules::RuleStage;
use super::*;
use crate::config::default_config;
use crate::session::record::{Badge, Benefits};
use crate::session::{AgentTemplate, Benefit, Feature, Labels, Metadata, Step};
use serde_json::json;

fn feature(name: &str) -> Feature {
    Feature {
        name: name.to_string(),
        ..Feature::default()
    }
}

fn session(setup_type: &str) -> SessionRecord {
    SessionRecord {
        setup_type: Some(setup_type.to_string()),
        metadata: Metadata {
            name: "Smart Search".to_string(),
            ..Metadata::default()
        },
        features: vec![feature("Smart Search")],
        ..SessionRecord::default()
    }
}

fn badge(index: usize) -> Badge {
    Badge {
        title: format!("Badge {index}"),
        module_id: None,
        url: format!("https://trailhead.salesforce.com/content/learn/modules/m{index}"),
    }
}

fn agent_session(validation: &str) -> SessionRecord {
    let mut record = session("agent-setup");
    record.features.clear();
    record.agentforce.needed = true;
    record.agentforce.templates = vec![AgentTemplate {
        name: "Triage".to_string(),
        status: None,
        steps: vec![Step {
            title: "Connect data".to_string(),
            validation: validation.to_string(),
            links: Vec::new(),
        }],
    }];
    record
}

fn rules(findings: &[Finding]) -> Vec<&str> {
    findings.iter().map(|finding| finding.rule.as_str()).collect()
}

#[test]
fn well_formed_feature_session_is_valid() {
    let report = Validator::default().validate(&session("feature"));
    assert!(report.valid, "{:?}", report.errors);
    assert!(report.warnings.is_empty());
    assert_eq!(report.summary(), "0 errors, 0 warnings");
}

#[test]
fn four_badges_fail_with_one_limit_error() {
    let mut record = session("feature");
    record.assets.resources.trailhead_badges = (1..=4).map(badge).collect();
    let report = Validator::default().validate(&record);

    assert!(!report.valid);
    assert_eq!(report.errors.len(), 1);
    let error = &report.errors[0];
    assert_eq!(error.kind, FindingKind::CanonicalRuleError);
    assert_eq!(error.rule, "badge-limit");
    assert!(error.message.contains("At most 3 Trailhead badges"));
    assert_eq!(
        error.path.as_deref(),
        Some("assets.resources.trailheadBadges")
    );
}

#[test]
fn three_badges_pass_the_limit() {
    let mut record = session("feature");
    record.assets.resources.trailhead_badges = (1..=3).map(badge).collect();
    let report = Validator::default().validate(&record);
    assert!(report.valid);
    assert!(!rules(&report.warnings).contains(&"badge-limit"));
}

#[test]
fn badge_urls_are_checked_for_syntax_and_domain() {
    let mut record = session("feature");
    record.assets.resources.trailhead_badges = vec![
        Badge {
            title: "Broken".to_string(),
            module_id: None,
            url: "not a url".to_string(),
        },
        Badge {
            title: "Elsewhere".to_string(),
            module_id: None,
            url: "https://example.com/badge".to_string(),
        },
    ];
    let report = Validator::default().validate(&record);
    assert_eq!(rules(&report.errors), ["badge-url"]);
    assert_eq!(
        report.errors[0].path.as_deref(),
        Some("assets.resources.trailheadBadges[0].url")
    );
    assert_eq!(rules(&report.warnings), ["badge-domain"]);
    assert!(report.warnings[0].message.contains("Trailhead badge 2"));
}

#[test]
fn feature_set_with_one_feature_names_minimum_rule() {
    let mut record = session("feature-set-and-features");
    record.metadata.jtbd = Some("Find things fast".to_string());
    let report = Validator::default().validate(&record);

    assert!(!report.valid);
    assert_eq!(rules(&report.errors), ["feature-set-min-features"]);
    assert!(report.errors[0]
        .message
        .contains("Feature Set requires at least 2 features"));
}

#[test]
fn feature_set_without_jtbd_or_features_reports_both_in_order() {
    let mut record = session("feature-set-and-features");
    record.features.clear();
    let report = Validator::default().validate(&record);
    assert_eq!(
        rules(&report.errors),
        ["feature-set-min-features", "feature-set-jtbd"]
    );
}

#[test]
fn feature_set_features_need_distinct_page_slugs() {
    let mut record = session("feature-set-and-features");
    record.metadata.jtbd = Some("Find things fast".to_string());
    record.features = vec![feature("Smart Search"), feature("smart-search"), feature("***")];
    let report = Validator::default().validate(&record);

    assert_eq!(rules(&report.errors), ["page-slug", "feature-slug-unique"]);
    assert_eq!(report.errors[0].path.as_deref(), Some("features[2].name"));
    assert_eq!(
        report.errors[1].message,
        "Features 'Smart Search' and 'smart-search' share the page address feature/smart-search.html"
    );
}

#[test]
fn session_name_without_slug_characters_is_rejected() {
    let mut record = session("feature");
    record.metadata.name = "!!!".to_string();
    let report = Validator::default().validate(&record);
    assert_eq!(rules(&report.errors), ["page-slug"]);
    assert!(report.errors[0].message.starts_with("Session name '!!!'"));
}

#[test]
fn single_feature_session_rejects_extra_features() {
    let mut record = session("feature-2");
    record.features.push(feature("Second"));
    let report = Validator::default().validate(&record);
    assert_eq!(rules(&report.errors), ["single-feature"]);
}

#[test]
fn solution_with_jtbd_is_invalid() {
    let mut record = session("solution-initial-setup");
    record.metadata.jtbd = Some("Do a job".to_string());
    let report = Validator::default().validate(&record);
    assert_eq!(rules(&report.errors), ["solution-no-jtbd"]);
}

#[test]
fn unknown_step_validation_is_a_canonical_error() {
    let report = Validator::default().validate(&agent_session("urgent"));
    assert!(!report.valid);
    assert_eq!(rules(&report.errors), ["step-validation"]);
    assert_eq!(report.errors[0].kind, FindingKind::CanonicalRuleError);
    assert!(report.errors[0].message.contains("\"urgent\""));

    let report = Validator::default().validate(&agent_session("manual"));
    assert!(report.valid, "{:?}", report.errors);
}

#[test]
fn step_validation_kind_only_binds_agent_setups() {
    let mut record = agent_session("urgent");
    record.setup_type = Some("feature".to_string());
    record.features = vec![feature("Smart Search")];
    let report = Validator::default().validate(&record);
    assert!(report.valid, "{:?}", report.errors);
    assert!(!rules(&report.warnings).contains(&"step-validation"));
}

#[test]
fn agent_setup_always_warns_about_compliance() {
    let report = Validator::default().validate(&agent_session("system"));
    assert_eq!(
        rules(&report.warnings),
        ["ai-compliance-review", "ai-disclaimer"]
    );

    let mut record = agent_session("system");
    record.labels = Some(Labels {
        benefits: None,
        disclaimers: Some(vec!["Responses are AI generated".to_string()]),
    });
    let report = Validator::default().validate(&record);
    assert_eq!(rules(&report.warnings), ["ai-compliance-review"]);
}

#[test]
fn agent_setup_requires_enablement_and_templates() {
    let mut record = agent_session("none");
    record.agentforce.needed = false;
    record.agentforce.templates.clear();
    let report = Validator::default().validate(&record);
    assert_eq!(rules(&report.errors), ["agent-enabled", "agent-templates"]);
}

#[test]
fn step_links_are_limited_and_checked() {
    let mut record = agent_session("system");
    record.agentforce.templates[0].steps[0].links = vec![
        "https://help.salesforce.com/a".to_string(),
        "nope".to_string(),
        "https://help.salesforce.com/c".to_string(),
        "https://help.salesforce.com/d".to_string(),
    ];
    let report = Validator::default().validate(&record);
    assert_eq!(rules(&report.errors), ["step-link-limit", "step-link-url"]);
    assert_eq!(
        report.errors[1].path.as_deref(),
        Some("agentforce.templates[0].steps[0].links[1]")
    );
}

#[test]
fn asset_urls_error_when_malformed_and_warn_off_allow_list() {
    let mut record = session("feature");
    record.assets.screenshot_url = Some("screenshot.png".to_string());
    record.assets.video_url = Some("https://play.vidyard.com/abc".to_string());
    record.assets.resources.blog_url = Some("https://blog.example.com/post".to_string());
    record.assets.resources.help_topic_url = Some(String::new());

    let report = Validator::default().validate(&record);
    assert_eq!(rules(&report.errors), ["asset-url"]);
    assert_eq!(report.errors[0].message, "Screenshot URL must be a valid URL");
    assert_eq!(rules(&report.warnings), ["asset-domain"]);
    assert_eq!(
        report.warnings[0].path.as_deref(),
        Some("assets.resources.blogUrl")
    );
}

#[test]
fn subdomains_of_approved_hosts_are_accepted() {
    let mut record = session("feature");
    record.assets.resources.help_topic_url =
        Some("https://sub.help.salesforce.com/articles/1".to_string());
    let report = Validator::default().validate(&record);
    assert!(report.warnings.is_empty());
}

#[test]
fn benefit_recommendations_are_warnings_only() {
    let mut record = session("feature");
    record.labels = Some(Labels {
        benefits: Some(Benefits {
            items: vec![Benefit {
                title: "x".repeat(51),
                description: Some("y".repeat(151)),
            }],
        }),
        disclaimers: None,
    });
    let report = Validator::default().validate(&record);
    assert!(report.valid);
    assert_eq!(
        rules(&report.warnings),
        [
            "benefit-count",
            "benefit-title-length",
            "benefit-description-length"
        ]
    );
}

#[test]
fn ill_typed_json_reports_only_structural_errors() {
    let value = json!({
        "setupType": "feature-set-and-features",
        "metadata": {"name": "Suite"},
        "features": "Login, SSO",
        "assets": {"resources": {"trailheadBadges": [{}, {}, {}, {}]}}
    });
    let report = Validator::default().validate_value(&value);
    assert!(!report.valid);
    assert!(report
        .errors
        .iter()
        .all(|finding| finding.kind == FindingKind::StructuralError));
    let paths: Vec<&str> = report
        .errors
        .iter()
        .filter_map(|finding| finding.path.as_deref())
        .collect();
    assert_eq!(paths[0], "features");
    assert!(paths.contains(&"assets.resources.trailheadBadges[3].url"));
}

#[test]
fn structural_errors_precede_canonical_ones() {
    let value = json!({
        "setupType": "feature-set-and-features",
        "metadata": {"name": ""},
        "features": []
    });
    let report = Validator::default().validate_value(&value);
    let kinds: Vec<FindingKind> = report.errors.iter().map(|finding| finding.kind).collect();
    assert_eq!(
        kinds,
        [
            FindingKind::StructuralError,
            FindingKind::CanonicalRuleError,
            FindingKind::CanonicalRuleError,
        ]
    );
    assert_eq!(report.errors[0].path.as_deref(), Some("metadata.name"));
}

#[test]
fn missing_setup_type_is_structural() {
    let mut record = session("feature");
    record.setup_type = None;
    let report = Validator::default().validate(&record);
    assert_eq!(rules(&report.errors), ["required"]);
    assert_eq!(report.errors[0].path.as_deref(), Some("setupType"));
}

#[test]
fn configured_limits_change_rule_thresholds() {
    let mut config = default_config();
    config.limits.max_badges = 5;
    let validator = Validator::from_config(&config).expect("validator");
    let mut record = session("feature");
    record.assets.resources.trailhead_badges = (1..=4).map(badge).collect();
    assert!(validator.validate(&record).valid);

    config.limits.max_badges = 0;
    assert!(Validator::from_config(&config).is_err());
}

#[test]
fn rule_table_orders_canonical_before_setup_type() {
    let validator = Validator::default();
    let stages: Vec<RuleStage> = validator
        .rules()
        .rules()
        .iter()
        .map(|rule| rule.stage)
        .collect();
    let first_setup = stages
        .iter()
        .position(|stage| *stage == RuleStage::SetupType)
        .expect("setup-type rules");
    assert!(stages[first_setup..]
        .iter()
        .all(|stage| *stage == RuleStage::SetupType));
}

#[test]
fn report_file_carries_counts() {
    let record = agent_session("urgent");
    let report = Validator::default().validate(&record);
    let file = ReportFile::new(&report, Some(&record)).expect("report file");
    let value = serde_json::to_value(&file).expect("serialize");
    assert_eq!(value["session_name"], "Smart Search");
    assert_eq!(value["setup_type"], "agent-setup");
    assert_eq!(value["error_count"], 1);
    assert_eq!(value["warning_count"], 2);
    assert_eq!(value["errors"][0]["kind"], "canonical-rule-error");
    assert_eq!(value["errors"][0]["rule"], "step-validation");
}
