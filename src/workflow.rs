//! One `run_*` function per CLI command.
//!
//! Each returns `Ok(true)` when the command succeeded cleanly and `Ok(false)`
//! when it completed but found problems (invalid session, failed batch
//! entries). I/O and setup failures are `Err`.
use crate::agent::{ChatMessage, CommandProposer, FragmentProposer, HttpProposer};
use crate::classify::{classify, Answer, ClassifyError};
use crate::cli::{BuildArgs, ChatArgs, ClassifyArgs, InfoArgs, MergeArgs, ValidateArgs};
use crate::config::{config_stub, resolve_lm_command, BuilderConfig};
use crate::content::load_content_labels;
use crate::graph::compose_record;
use crate::model::slugify;
use crate::output::{session_output, stage_meta, stage_pages, SessionFailure, SessionOutput};
use crate::render::{JsonRenderer, Renderer, TemplateDirRenderer};
use crate::session::{
    load_session_value, merge_fragment_value, record_from_value, write_session, Metadata,
    SessionRecord,
};
use crate::setup_type::CATALOG;
use crate::staging::StagedOutput;
use crate::util::{display_path, session_label};
use crate::validate::{ReportFile, ValidationReport, Validator};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Input for `classify`: basic metadata plus the ordered answers.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct AnswersFile {
    #[serde(default)]
    metadata: Metadata,
    answers: Vec<Answer>,
}

pub fn run_classify(args: ClassifyArgs, config: &BuilderConfig) -> Result<bool> {
    if args.out.exists() && !args.force {
        return Err(anyhow!(
            "session already exists at {} (use --force to overwrite)",
            args.out.display()
        ));
    }
    let bytes = fs::read(&args.answers)
        .with_context(|| format!("read answers {}", args.answers.display()))?;
    let input: AnswersFile = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse answers {}", args.answers.display()))?;

    let answer_count = input.answers.len();
    let classification = classify(input.metadata, input.answers).map_err(|err| match err {
        ClassifyError::Incomplete { next } => anyhow!("{err} ({})", next.prompt()),
        _ if err.is_retryable() => {
            anyhow!("{err} (answer `retry-standard: true` to start over)")
        }
        _ => anyhow!(err),
    })?;
    tracing::info!(
        setup_type = %classification.setup_type,
        answers = answer_count,
        "classified session"
    );

    write_session(&args.out, &classification.session)?;
    let report = Validator::from_config(config)?.validate(&classification.session);
    println!(
        "{}: {} ({})",
        args.out.display(),
        classification.setup_type.label(),
        report.summary()
    );
    print_findings(&report);
    Ok(report.valid)
}

pub fn run_validate(args: ValidateArgs, config: &BuilderConfig) -> Result<bool> {
    let validator = Validator::from_config(config)?;
    tracing::debug!(rules = validator.rules().rules().len(), "loaded rule table");
    let value = load_session_value(&args.session)?;
    let report = validator.validate_value(&value);
    let record = record_from_value(value).ok();
    let report_file = ReportFile::new(&report, record.as_ref())?;

    if let Some(path) = args.report.as_deref() {
        write_json(path, &report_file)?;
    }
    if args.json {
        let text = serde_json::to_string_pretty(&report_file).context("serialize report")?;
        println!("{text}");
    } else {
        println!("{}: {}", args.session.display(), report.summary());
        print_findings(&report);
    }
    tracing::info!(
        session = %args.session.display(),
        valid = report.valid,
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "validated session file"
    );
    Ok(report.valid)
}

pub fn run_build(args: BuildArgs, config: &BuilderConfig) -> Result<bool> {
    let validator = Validator::from_config(config)?;
    let renderer: Box<dyn Renderer> = match args.templates.as_deref() {
        Some(dir) => Box::new(TemplateDirRenderer::new(dir)?),
        None => Box::new(JsonRenderer),
    };

    let staged = StagedOutput::new(&args.out)?;
    let mut sessions = Vec::new();
    let mut failures = Vec::new();
    let mut overwritten = Vec::new();

    for path in &args.sessions {
        match build_session(path, &args, &validator, &staged, renderer.as_ref()) {
            Ok((row, replaced)) => {
                tracing::info!(
                    session = %session_label(path),
                    pages = row.pages.len(),
                    "staged session pages"
                );
                for route in &replaced {
                    eprintln!(
                        "warning: {} overwrote {route}, which was already staged in this build",
                        path.display()
                    );
                }
                overwritten.extend(replaced);
                sessions.push(row);
            }
            Err(err) => {
                eprintln!("error: {}: {err:#}", path.display());
                failures.push(SessionFailure {
                    session_path: path.display().to_string(),
                    error: format!("{err:#}"),
                });
            }
        }
    }

    stage_meta(&staged, renderer.name(), &sessions, &failures, &overwritten)?;
    tracing::debug!(files = staged.staged_files()?.len(), "publishing build");
    let published = staged.publish()?;
    for file in &published {
        println!("{}", display_path(file, std::env::current_dir().ok().as_deref()));
    }
    println!(
        "built {} session(s), {} failed",
        sessions.len(),
        failures.len()
    );
    Ok(failures.is_empty())
}

fn build_session(
    path: &Path,
    args: &BuildArgs,
    validator: &Validator,
    staged: &StagedOutput,
    renderer: &dyn Renderer,
) -> Result<(SessionOutput, Vec<String>)> {
    let value = load_session_value(path)?;
    let (record, report) = match record_from_value(value.clone()) {
        Ok(mut record) => {
            if let Some(root) = args.content.as_deref() {
                fill_content_labels(&mut record, root)?;
            }
            let report = validator.validate(&record);
            (Some(record), report)
        }
        Err(_) => (None, validator.validate_value(&value)),
    };
    if !report.valid {
        if !args.preview {
            print_findings(&report);
            return Err(anyhow!(
                "session is invalid ({}); fix it or build with --preview",
                report.summary()
            ));
        }
        tracing::warn!(
            session = %session_label(path),
            errors = report.errors.len(),
            "building preview of invalid session"
        );
    }

    let record = match record {
        Some(record) => record,
        None => record_from_value(value)
            .with_context(|| format!("decode session {}", path.display()))?,
    };
    let graph = compose_record(&record)?;
    tracing::debug!(routes = ?graph.routes(), "composed session pages");
    let (pages, replaced) = stage_pages(staged, &graph, renderer)?;
    let row = session_output(path.display().to_string(), &graph, &report, pages);
    Ok((row, replaced))
}

/// Session labels win; content front matter only fills a gap.
fn fill_content_labels(record: &mut SessionRecord, root: &Path) -> Result<()> {
    if record.labels.is_some() {
        return Ok(());
    }
    let Some(setup_type) = record.known_setup_type() else {
        return Ok(());
    };
    let slug = slugify(&record.metadata.name);
    record.labels = load_content_labels(root, setup_type, &slug)?;
    Ok(())
}

pub fn run_merge(args: MergeArgs, config: &BuilderConfig) -> Result<bool> {
    let validator = Validator::from_config(config)?;
    let base = load_session_value(&args.session)?;
    let fragment = read_fragment(&args.fragment)?;
    let keys: Vec<&str> = fragment.keys().map(String::as_str).collect();
    tracing::info!(keys = ?keys, "merging session fragment");

    let merged = merge_fragment_value(&base, &fragment);
    let report = validator.validate_value(&merged);
    let out = args.out.as_deref().unwrap_or(args.session.as_path());
    write_json(out, &merged)?;
    println!("{}: {}", out.display(), report.summary());
    print_findings(&report);
    Ok(report.valid)
}

fn read_fragment(path: &Path) -> Result<Map<String, Value>> {
    let bytes = fs::read(path).with_context(|| format!("read fragment {}", path.display()))?;
    let value: Value = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse fragment {}", path.display()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(anyhow!(
            "fragment {} must be a JSON object",
            path.display()
        )),
    }
}

pub fn run_chat(args: ChatArgs, config: &BuilderConfig) -> Result<bool> {
    let proposer = resolve_proposer(args.lm.as_deref(), config)?;
    let session = if args.session.exists() {
        load_session_value(&args.session)?
    } else {
        Value::Object(Map::new())
    };
    let mut history = match args.history.as_deref() {
        Some(path) if path.exists() => read_history(path)?,
        _ => Vec::new(),
    };

    let proposal = proposer.propose_fragment(&args.message, &history, &session)?;
    tracing::info!(
        proposer = proposer.name(),
        has_fragment = proposal.session_fragment.is_some(),
        ready = proposal.ready_to_generate,
        "received proposal"
    );
    println!("{}", proposal.message);

    let mut valid = true;
    if let Some(fragment) = proposal.session_fragment.as_ref() {
        let merged = merge_fragment_value(&session, fragment);
        let report = Validator::from_config(config)?.validate_value(&merged);
        valid = report.valid;
        if args.dry_run {
            let text = serde_json::to_string_pretty(fragment).context("serialize fragment")?;
            println!("{text}");
        } else {
            write_json(&args.session, &merged)?;
        }
        eprintln!("session: {}", report.summary());
        print_findings(&report);
    }
    if proposal.ready_to_generate {
        if valid {
            eprintln!("session is ready to build");
        } else {
            eprintln!("agent considers the session ready, but validation still fails");
        }
    }

    if let Some(path) = args.history.as_deref() {
        history.push(ChatMessage::user(args.message.as_str()));
        history.push(ChatMessage::assistant(proposal.message.as_str()));
        write_json(path, &history)?;
    }
    Ok(valid)
}

/// Command proposer when any LM command is configured, else HTTP inference.
fn resolve_proposer(flag: Option<&str>, config: &BuilderConfig) -> Result<Box<dyn FragmentProposer>> {
    if let Some(command) = resolve_lm_command(flag, config) {
        return Ok(Box::new(CommandProposer::new(&command)?));
    }
    if let Some(inference) = config.inference.as_ref() {
        return Ok(Box::new(HttpProposer::from_config(inference)?));
    }
    Err(anyhow!(
        "no agent configured: pass --lm, set lm_command or inference in the config, or set {}",
        crate::config::LM_COMMAND_ENV
    ))
}

fn read_history(path: &Path) -> Result<Vec<ChatMessage>> {
    let bytes = fs::read(path).with_context(|| format!("read history {}", path.display()))?;
    let history: Vec<ChatMessage> = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse history {}", path.display()))?;
    Ok(history)
}

pub fn run_info(args: InfoArgs) -> Result<bool> {
    let text = if args.config_stub {
        config_stub()?
    } else {
        serde_json::to_string_pretty(&CATALOG).context("serialize setup type catalog")?
    };
    println!("{text}");
    Ok(true)
}

fn print_findings(report: &ValidationReport) {
    for finding in report.errors.iter().chain(report.warnings.iter()) {
        eprintln!("{}[{}]: {finding}", finding.kind.as_str(), finding.rule);
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let mut text = serde_json::to_string_pretty(value).context("serialize JSON")?;
    text.push('\n');
    fs::write(path, text).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
