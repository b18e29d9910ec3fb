//! Two-tier session validation.
//!
//! Structural checks run over the raw JSON; canonical and setup-type rules run
//! over the decoded record. Findings keep a stable order: structural, then
//! canonical, then setup-type, each in declaration order. Data problems never
//! surface as `Err`.
mod rules;
mod schema;

pub use rules::CanonicalRuleSet;
pub use schema::SchemaDescriptor;

use crate::config::BuilderConfig;
use crate::session::SessionRecord;
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

pub const REPORT_SCHEMA_VERSION: u32 = 1;

/// Error taxonomy for findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindingKind {
    StructuralError,
    CanonicalRuleError,
    CanonicalWarning,
}

impl FindingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingKind::StructuralError => "structural-error",
            FindingKind::CanonicalRuleError => "canonical-rule-error",
            FindingKind::CanonicalWarning => "canonical-warning",
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, FindingKind::CanonicalWarning)
    }
}

/// One structured validation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub kind: FindingKind,
    /// Rule identifier, e.g. `badge-limit` or `required`.
    pub rule: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub message: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.path.as_deref() {
            Some(path) if !self.message.contains(path) => {
                write!(f, "{} ({path})", self.message)
            }
            _ => f.write_str(&self.message),
        }
    }
}

/// Outcome of validating one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
}

impl ValidationReport {
    fn from_findings(findings: Vec<Finding>) -> Self {
        let (errors, warnings): (Vec<Finding>, Vec<Finding>) =
            findings.into_iter().partition(|finding| finding.kind.is_error());
        ValidationReport {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// One-line counts, e.g. `2 errors, 1 warning`.
    pub fn summary(&self) -> String {
        format!(
            "{} error{}, {} warning{}",
            self.errors.len(),
            plural(self.errors.len()),
            self.warnings.len(),
            plural(self.warnings.len())
        )
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Persistable report with counts and a timestamp.
#[derive(Debug, Clone, Serialize)]
pub struct ReportFile<'a> {
    pub schema_version: u32,
    pub generated_at_epoch_ms: u128,
    pub session_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setup_type: Option<&'a str>,
    pub valid: bool,
    pub error_count: usize,
    pub warning_count: usize,
    pub errors: &'a [Finding],
    pub warnings: &'a [Finding],
}

impl<'a> ReportFile<'a> {
    pub fn new(report: &'a ValidationReport, record: Option<&'a SessionRecord>) -> Result<Self> {
        let generated_at_epoch_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .context("compute timestamp")?
            .as_millis();
        Ok(ReportFile {
            schema_version: REPORT_SCHEMA_VERSION,
            generated_at_epoch_ms,
            session_name: record
                .map(|record| record.metadata.name.as_str())
                .unwrap_or_default(),
            setup_type: record.and_then(|record| record.setup_type.as_deref()),
            valid: report.valid,
            error_count: report.errors.len(),
            warning_count: report.warnings.len(),
            errors: &report.errors,
            warnings: &report.warnings,
        })
    }
}

/// Runs the schema and the canonical rule table.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    schema: SchemaDescriptor,
    rules: CanonicalRuleSet,
}

impl Validator {
    pub fn new(rules: CanonicalRuleSet) -> Self {
        Validator {
            schema: SchemaDescriptor::session(),
            rules,
        }
    }

    /// Build from config; fails only when the rule tables are unusable.
    pub fn from_config(config: &BuilderConfig) -> Result<Self> {
        Ok(Validator::new(CanonicalRuleSet::from_config(config)?))
    }

    pub fn rules(&self) -> &CanonicalRuleSet {
        &self.rules
    }

    /// Validate a decoded record.
    pub fn validate(&self, record: &SessionRecord) -> ValidationReport {
        match serde_json::to_value(record) {
            Ok(value) => self.validate_value(&value),
            Err(err) => ValidationReport::from_findings(vec![Finding {
                kind: FindingKind::StructuralError,
                rule: "type".to_string(),
                path: None,
                message: format!("session could not be encoded: {err}"),
            }]),
        }
    }

    /// Validate raw session JSON.
    ///
    /// When the JSON does not decode into a record, only structural findings
    /// are reported.
    pub fn validate_value(&self, value: &Value) -> ValidationReport {
        let mut findings = self.schema.check(value);
        match serde_json::from_value::<SessionRecord>(value.clone()) {
            Ok(record) => findings.extend(self.rules.evaluate(&record)),
            Err(err) => {
                if findings.is_empty() {
                    findings.push(Finding {
                        kind: FindingKind::StructuralError,
                        rule: "type".to_string(),
                        path: None,
                        message: format!("session does not match the record shape: {err}"),
                    });
                }
                tracing::debug!(error = %err, "skipping canonical rules for ill-typed session");
            }
        }
        let report = ValidationReport::from_findings(findings);
        tracing::debug!(
            valid = report.valid,
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "validated session"
        );
        report
    }
}

#[cfg(test)]
mod tests;
