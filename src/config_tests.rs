use super::*;

fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent directory");
    }
    std::fs::write(path, contents.as_bytes()).expect("write file");
}

#[test]
fn stock_config_validates_and_round_trips() {
    let config = default_config();
    validate_config(&config).expect("stock config is valid");
    assert_eq!(config.limits.max_badges, 3);
    assert!(config
        .approved_domains
        .iter()
        .any(|domain| domain == "trailhead.salesforce.com"));

    let stub = config_stub().expect("stub");
    let parsed: BuilderConfig = serde_json::from_str(&stub).expect("parse stub");
    assert_eq!(parsed, config);
}

#[test]
fn partial_file_fills_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("config.json");
    write_file(
        &path,
        r#"{"schema_version": 1, "limits": {"max_badges": 5}, "lm_command": "llm -m local"}"#,
    );

    let config = load_config(&path).expect("load config");
    assert_eq!(config.limits.max_badges, 5);
    assert_eq!(config.limits.max_step_links, 3);
    assert_eq!(config.trailhead_domain, "trailhead.salesforce.com");
    assert_eq!(
        resolve_lm_command(None, &config).as_deref(),
        Some("llm -m local")
    );
    assert_eq!(
        resolve_lm_command(Some("other"), &config).as_deref(),
        Some("other")
    );
}

#[test]
fn explicit_path_wins_resolution() {
    let path = Path::new("/tmp/explicit.json");
    assert_eq!(resolve_config_path(Some(path)), Some(path.to_path_buf()));
}

#[test]
fn rejects_unusable_rule_tables() {
    let mut config = default_config();
    config.schema_version = 2;
    assert!(validate_config(&config).is_err());

    let mut config = default_config();
    config.approved_domains.clear();
    assert!(validate_config(&config).is_err());

    let mut config = default_config();
    config.approved_domains.push("https://example.com".to_string());
    assert!(validate_config(&config).is_err());

    let mut config = default_config();
    config.limits.benefits_min = 5;
    assert!(validate_config(&config).is_err());

    let mut config = default_config();
    config.limits.max_badges = 0;
    let err = validate_config(&config).unwrap_err();
    assert!(err.to_string().contains("max_badges"));

    let mut config = default_config();
    config.inference = Some(InferenceConfig {
        url: "not a url".to_string(),
        model: "m".to_string(),
        api_key_env: None,
    });
    assert!(validate_config(&config).is_err());
}

#[test]
fn unknown_fields_are_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("config.json");
    write_file(&path, r#"{"schema_version": 1, "colour": "blue"}"#);
    assert!(load_config(&path).is_err());
}
