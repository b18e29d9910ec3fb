//! Rendering page graphs into a staged output transaction.
//!
//! Each build also stages `meta.json`, a per-run record of which sessions
//! produced which pages and which failed.
use crate::graph::PageGraph;
use crate::render::Renderer;
use crate::staging::StagedOutput;
use crate::validate::ValidationReport;
use anyhow::{Context, Result};
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

pub const META_REL: &str = "meta.json";
const META_SCHEMA_VERSION: u32 = 1;

/// Pages staged for one session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionOutput {
    pub session_path: String,
    pub session_name: String,
    pub setup_type: String,
    pub valid: bool,
    pub error_count: usize,
    pub warning_count: usize,
    pub pages: Vec<String>,
}

/// A session that produced no pages.
#[derive(Debug, Clone, Serialize)]
pub struct SessionFailure {
    pub session_path: String,
    pub error: String,
}

#[derive(Serialize)]
struct Meta<'a> {
    schema_version: u32,
    generated_at_epoch_ms: u128,
    tool_name: &'static str,
    tool_version: &'static str,
    renderer: &'a str,
    sessions: &'a [SessionOutput],
    failures: &'a [SessionFailure],
    overwritten: &'a [String],
}

/// Output route for a page under a renderer's extension.
pub fn output_route(route: &str, renderer: &dyn Renderer) -> String {
    let extension = renderer.extension();
    match route.strip_suffix(".html") {
        Some(stem) if extension != "html" => format!("{stem}.{extension}"),
        _ => route.to_string(),
    }
}

/// Render every page of `graph`, in graph order.
///
/// Nothing is returned unless every page renders.
fn render_pages(graph: &PageGraph, renderer: &dyn Renderer) -> Result<Vec<(String, String)>> {
    graph
        .pages
        .iter()
        .map(|page| {
            let text = renderer
                .render(page.template_id, &page.model)
                .with_context(|| format!("render {}", page.route))?;
            Ok((output_route(&page.route, renderer), text))
        })
        .collect()
}

/// Render and stage every page of `graph`.
///
/// A render failure stages nothing. Returns the staged routes and the routes
/// that replaced a page staged earlier in the same run.
pub fn stage_pages(
    staged: &StagedOutput,
    graph: &PageGraph,
    renderer: &dyn Renderer,
) -> Result<(Vec<String>, Vec<String>)> {
    let rendered = render_pages(graph, renderer)?;
    let mut routes = Vec::with_capacity(rendered.len());
    let mut overwritten = Vec::new();
    for (route, text) in rendered {
        if staged.stage_text(&route, &text)? {
            overwritten.push(route.clone());
        }
        routes.push(route);
    }
    Ok((routes, overwritten))
}

/// Summary row for a session whose pages were staged.
pub fn session_output(
    session_path: String,
    graph: &PageGraph,
    report: &ValidationReport,
    pages: Vec<String>,
) -> SessionOutput {
    let main = graph.main_page();
    SessionOutput {
        session_path,
        session_name: main
            .map(|page| page.model.metadata.metadata.name.clone())
            .unwrap_or_default(),
        setup_type: main
            .map(|page| page.model.setup_type.to_string())
            .unwrap_or_default(),
        valid: report.valid,
        error_count: report.errors.len(),
        warning_count: report.warnings.len(),
        pages,
    }
}

/// Stage `meta.json` for the run.
pub fn stage_meta(
    staged: &StagedOutput,
    renderer: &str,
    sessions: &[SessionOutput],
    failures: &[SessionFailure],
    overwritten: &[String],
) -> Result<()> {
    let generated_at_epoch_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("compute timestamp")?
        .as_millis();
    let meta = Meta {
        schema_version: META_SCHEMA_VERSION,
        generated_at_epoch_ms,
        tool_name: env!("CARGO_PKG_NAME"),
        tool_version: env!("CARGO_PKG_VERSION"),
        renderer,
        sessions,
        failures,
        overwritten,
    };
    staged.stage_json(META_REL, &meta)?;
    Ok(())
}
