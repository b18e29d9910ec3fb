//! Structural shape of a session file.
//!
//! Field specs are checked against the raw JSON so type problems are
//! reported per field instead of as a single decode failure. Paths use `[]`
//! for "every element of"; reported paths carry concrete indices.
use super::{Finding, FindingKind};
use crate::setup_type::SetupType;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// JSON type a field must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    String,
    Bool,
    Array,
    Object,
}

impl JsonKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JsonKind::String => "string",
            JsonKind::Bool => "boolean",
            JsonKind::Array => "array",
            JsonKind::Object => "object",
        }
    }

    fn matches(&self, value: &Value) -> bool {
        match self {
            JsonKind::String => value.is_string(),
            JsonKind::Bool => value.is_boolean(),
            JsonKind::Array => value.is_array(),
            JsonKind::Object => value.is_object(),
        }
    }
}

/// Extra constraint on a string field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    NonEmpty,
    SetupType,
    Version,
}

/// One declared field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub path: &'static str,
    pub kind: JsonKind,
    pub required: bool,
    /// `null` is accepted and means absent.
    pub nullable: bool,
    pub format: Option<Format>,
}

const fn field(path: &'static str, kind: JsonKind) -> FieldSpec {
    FieldSpec {
        path,
        kind,
        required: false,
        nullable: false,
        format: None,
    }
}

const fn required(path: &'static str, kind: JsonKind) -> FieldSpec {
    FieldSpec {
        required: true,
        ..field(path, kind)
    }
}

const fn optional_text(path: &'static str) -> FieldSpec {
    FieldSpec {
        nullable: true,
        ..field(path, JsonKind::String)
    }
}

const fn formatted(spec: FieldSpec, format: Format) -> FieldSpec {
    FieldSpec {
        format: Some(format),
        ..spec
    }
}

const fn nullable(spec: FieldSpec) -> FieldSpec {
    FieldSpec {
        nullable: true,
        ..spec
    }
}

const SESSION_FIELDS: &[FieldSpec] = &[
    formatted(required("setupType", JsonKind::String), Format::SetupType),
    required("metadata", JsonKind::Object),
    formatted(required("metadata.name", JsonKind::String), Format::NonEmpty),
    optional_text("metadata.description"),
    optional_text("metadata.cloud"),
    formatted(field("metadata.version", JsonKind::String), Format::Version),
    optional_text("metadata.jtbd"),
    optional_text("metadata.belongsToFeatureSet"),
    optional_text("metadata.setupPattern"),
    optional_text("metadata.agentPurpose"),
    field("features", JsonKind::Array),
    required("features[]", JsonKind::Object),
    formatted(required("features[].name", JsonKind::String), Format::NonEmpty),
    field("features[].soldToCustomers", JsonKind::Bool),
    optional_text("features[].belongsToFeatureSet"),
    optional_text("features[].description"),
    optional_text("features[].status"),
    field("agentforce", JsonKind::Object),
    field("agentforce.needed", JsonKind::Bool),
    field("agentforce.templates", JsonKind::Array),
    required("agentforce.templates[]", JsonKind::Object),
    formatted(
        required("agentforce.templates[].name", JsonKind::String),
        Format::NonEmpty,
    ),
    optional_text("agentforce.templates[].status"),
    field("agentforce.templates[].steps", JsonKind::Array),
    required("agentforce.templates[].steps[]", JsonKind::Object),
    formatted(
        required("agentforce.templates[].steps[].title", JsonKind::String),
        Format::NonEmpty,
    ),
    required("agentforce.templates[].steps[].validation", JsonKind::String),
    field("agentforce.templates[].steps[].links", JsonKind::Array),
    required("agentforce.templates[].steps[].links[]", JsonKind::String),
    field("assets", JsonKind::Object),
    optional_text("assets.screenshotUrl"),
    optional_text("assets.videoUrl"),
    optional_text("assets.guidedTourUrl"),
    field("assets.resources", JsonKind::Object),
    optional_text("assets.resources.helpTopicUrl"),
    optional_text("assets.resources.releaseNotesUrl"),
    optional_text("assets.resources.blogUrl"),
    field("assets.resources.trailheadBadges", JsonKind::Array),
    required("assets.resources.trailheadBadges[]", JsonKind::Object),
    required("assets.resources.trailheadBadges[].title", JsonKind::String),
    optional_text("assets.resources.trailheadBadges[].moduleId"),
    required("assets.resources.trailheadBadges[].url", JsonKind::String),
    nullable(field("labels", JsonKind::Object)),
    nullable(field("labels.benefits", JsonKind::Object)),
    field("labels.benefits.items", JsonKind::Array),
    required("labels.benefits.items[]", JsonKind::Object),
    required("labels.benefits.items[].title", JsonKind::String),
    optional_text("labels.benefits.items[].description"),
    nullable(field("labels.disclaimers", JsonKind::Array)),
    required("labels.disclaimers[]", JsonKind::String),
];

/// Declared shape of a session record, checked in declaration order.
#[derive(Debug, Clone)]
pub struct SchemaDescriptor {
    fields: &'static [FieldSpec],
}

impl Default for SchemaDescriptor {
    fn default() -> Self {
        SchemaDescriptor::session()
    }
}

impl SchemaDescriptor {
    /// The session file schema.
    pub fn session() -> Self {
        SchemaDescriptor {
            fields: SESSION_FIELDS,
        }
    }

    /// Structural findings for `value`, in field declaration order.
    pub fn check(&self, value: &Value) -> Vec<Finding> {
        if !value.is_object() {
            return vec![structural(
                "type",
                "(root)",
                format!("session must be a JSON object, got {}", json_type(value)),
            )];
        }
        let mut findings = Vec::new();
        for spec in self.fields {
            for (path, node) in resolve(value, spec.path) {
                if let Some(finding) = check_field(spec, &path, node) {
                    findings.push(finding);
                }
            }
        }
        findings
    }
}

fn check_field(spec: &FieldSpec, path: &str, node: Option<&Value>) -> Option<Finding> {
    let value = match node {
        None | Some(Value::Null) if spec.required => {
            return Some(structural("required", path, format!("{path} is required")));
        }
        None => return None,
        Some(Value::Null) if spec.nullable => return None,
        Some(value) => value,
    };
    if !spec.kind.matches(value) {
        return Some(structural(
            "type",
            path,
            format!(
                "{path} must be a {}, got {}",
                spec.kind.as_str(),
                json_type(value)
            ),
        ));
    }
    let text = value.as_str()?;
    match spec.format? {
        Format::NonEmpty if text.trim().is_empty() => Some(structural(
            "non-empty",
            path,
            format!("{path} must not be empty"),
        )),
        Format::SetupType if text.parse::<SetupType>().is_err() => {
            let known: Vec<&str> = SetupType::ALL.iter().map(SetupType::as_str).collect();
            Some(structural(
                "setup-type",
                path,
                format!(
                    "{path} {text:?} is not a known setup type (expected one of {})",
                    known.join(", ")
                ),
            ))
        }
        Format::Version if !version_regex().is_match(text) => Some(structural(
            "version-format",
            path,
            format!("{path} must look like 1.0.0 (got {text:?})"),
        )),
        _ => None,
    }
}

/// Expand a spec path into concrete `(path, node)` pairs.
///
/// Missing or ill-typed parents yield nothing; their own specs report them.
fn resolve<'a>(root: &'a Value, spec_path: &str) -> Vec<(String, Option<&'a Value>)> {
    let mut nodes: Vec<(String, Option<&'a Value>)> = vec![(String::new(), Some(root))];
    for segment in spec_path.split('.') {
        let (key, each) = match segment.strip_suffix("[]") {
            Some(key) => (key, true),
            None => (segment, false),
        };
        let mut next = Vec::new();
        for (parent_path, parent) in nodes {
            let Some(Value::Object(map)) = parent else {
                continue;
            };
            let path = if parent_path.is_empty() {
                key.to_string()
            } else {
                format!("{parent_path}.{key}")
            };
            let child = map.get(key);
            if each {
                if let Some(Value::Array(items)) = child {
                    for (index, item) in items.iter().enumerate() {
                        next.push((format!("{path}[{index}]"), Some(item)));
                    }
                }
            } else {
                next.push((path, child));
            }
        }
        nodes = next;
    }
    nodes
}

fn version_regex() -> &'static Regex {
    static VERSION: OnceLock<Regex> = OnceLock::new();
    VERSION.get_or_init(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("regex for version format"))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn structural(rule: &'static str, path: &str, message: String) -> Finding {
    Finding {
        kind: FindingKind::StructuralError,
        rule: rule.to_string(),
        path: Some(path.to_string()),
        message,
    }
}
