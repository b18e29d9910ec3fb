//! Renderer boundary.
//!
//! Renderers turn `(template id, page model)` into text. The core only picks
//! the template id; template syntax belongs to the renderer.
use crate::model::{slugify, PageModel};
use crate::setup_type::SetupType;
use anyhow::{anyhow, Context, Result};
use minijinja::Environment;
use std::path::{Path, PathBuf};

/// Text renderer for one page.
pub trait Renderer {
    fn render(&self, template_id: &str, model: &PageModel) -> Result<String>;

    /// Short name recorded in run metadata.
    fn name(&self) -> &'static str;

    /// File extension for rendered pages when written under a different name.
    fn extension(&self) -> &'static str {
        "html"
    }
}

/// Emits the model itself as pretty JSON; used for previews and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, template_id: &str, model: &PageModel) -> Result<String> {
        let value = serde_json::json!({
            "templateId": template_id,
            "model": model,
        });
        let mut text = serde_json::to_string_pretty(&value).context("serialize page model")?;
        text.push('\n');
        Ok(text)
    }

    fn name(&self) -> &'static str {
        "json"
    }

    fn extension(&self) -> &'static str {
        "json"
    }
}

/// Renders `<dir>/<template id>.html` with minijinja.
///
/// Registered filters: `slugify` and `setup_type_label`.
pub struct TemplateDirRenderer {
    dir: PathBuf,
    env: Environment<'static>,
}

impl std::fmt::Debug for TemplateDirRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateDirRenderer")
            .field("dir", &self.dir)
            .finish()
    }
}

impl TemplateDirRenderer {
    pub fn new(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(anyhow!("template dir {} does not exist", dir.display()));
        }
        let mut env = Environment::new();
        env.set_loader(minijinja::path_loader(dir.to_path_buf()));
        env.add_filter("slugify", |value: String| slugify(&value));
        env.add_filter("setup_type_label", |value: String| {
            value
                .parse::<SetupType>()
                .map(|setup_type| setup_type.label().to_string())
                .unwrap_or(value)
        });
        Ok(TemplateDirRenderer {
            dir: dir.to_path_buf(),
            env,
        })
    }
}

impl Renderer for TemplateDirRenderer {
    fn render(&self, template_id: &str, model: &PageModel) -> Result<String> {
        let name = format!("{template_id}.html");
        let template = self
            .env
            .get_template(&name)
            .with_context(|| format!("load template {}", self.dir.join(&name).display()))?;
        template
            .render(model)
            .with_context(|| format!("render template {name}"))
    }

    fn name(&self) -> &'static str {
        "templates"
    }
}
