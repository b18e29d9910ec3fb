//! Optional page copy stored as Markdown with YAML front matter.
//!
//! Layout: `<content_root>/<kind>/<slug>/content.md`, where `kind` is the
//! setup type with a trailing `-and-features` dropped. Only the `labels`
//! key of the front matter is read.
use crate::session::Labels;
use crate::setup_type::SetupType;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
struct FrontMatter {
    #[serde(default)]
    labels: Option<Labels>,
}

/// Location of the content file for a session.
pub fn content_path(root: &Path, setup_type: SetupType, slug: &str) -> PathBuf {
    let kind = setup_type.as_str();
    let kind = kind.strip_suffix("-and-features").unwrap_or(kind);
    root.join(kind).join(slug).join("content.md")
}

/// Labels from the content file, `None` when the file does not exist.
pub fn load_content_labels(root: &Path, setup_type: SetupType, slug: &str) -> Result<Option<Labels>> {
    let path = content_path(root, setup_type, slug);
    if !path.is_file() {
        tracing::debug!(path = %path.display(), "no content file");
        return Ok(None);
    }
    let text = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let labels = parse_front_matter_labels(&text)
        .with_context(|| format!("parse front matter {}", path.display()))?;
    Ok(labels)
}

/// Parse `labels` out of a `---`-delimited YAML header.
pub fn parse_front_matter_labels(text: &str) -> Result<Option<Labels>> {
    let Some(yaml) = split_front_matter(text) else {
        return Ok(None);
    };
    if yaml.trim().is_empty() {
        return Ok(None);
    }
    let front: FrontMatter = serde_yaml::from_str(yaml).context("decode YAML front matter")?;
    Ok(front.labels)
}

fn split_front_matter(text: &str) -> Option<&str> {
    let rest = text.strip_prefix("---")?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some(&rest[..offset]);
        }
        offset += line.len();
    }
    None
}
