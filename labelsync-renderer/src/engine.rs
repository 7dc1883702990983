//! Tera rendering engine: [`ReportKind`] and [`Renderer`].
//!
//! | Kind       | Template                  | Content                                  |
//! |------------|---------------------------|------------------------------------------|
//! | `Overview` | `overview/report.md.tera` | per-repository label changes or failure  |
//! | `Siblings` | `siblings/report.md.tera` | issues that gained renamed labels        |

use std::collections::BTreeMap;
use std::path::Path;

use tera::Tera;

use labelsync_sync::SyncReport;

use crate::context::TemplateContext;
use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Embedded templates, baked into the binary at compile time via include_str!
// ---------------------------------------------------------------------------

const TPLS: &[(&str, &str)] = &[
    ("shared/_macros.tera", include_str!("templates/_partials/macros.tera")),
    ("overview/report.md.tera", include_str!("templates/report.md.tera")),
    ("siblings/report.md.tera", include_str!("templates/siblings.md.tera")),
];

// ---------------------------------------------------------------------------
// Overrides
// ---------------------------------------------------------------------------

/// Template name of an override: its path below the templates directory,
/// `/`-separated. Case is kept, so `Overview/Report.md.tera` overrides nothing.
fn override_name(rel: &Path) -> String {
    rel.iter()
        .map(|segment| segment.to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn read_err(path: &Path) -> impl FnOnce(std::io::Error) -> RenderError {
    let path = path.to_path_buf();
    move |source| RenderError::Override { path, source }
}

/// Every `.tera` file below `dir`, keyed by [`override_name`].
///
/// A missing directory means no overrides.
fn load_overrides(dir: &Path) -> Result<BTreeMap<String, String>, RenderError> {
    let mut overrides = BTreeMap::new();
    if !dir.exists() {
        return Ok(overrides);
    }
    if !dir.is_dir() {
        return Err(RenderError::NotADirectory { path: dir.to_path_buf() });
    }

    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        for entry in std::fs::read_dir(&current).map_err(read_err(&current))? {
            let path = entry.map_err(read_err(&current))?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "tera") {
                let contents = std::fs::read_to_string(&path).map_err(read_err(&path))?;
                let name = override_name(path.strip_prefix(dir).unwrap_or(path.as_path()));
                overrides.insert(name, contents);
            }
        }
    }
    Ok(overrides)
}

fn build_tera(overrides_dir: Option<&Path>) -> Result<Tera, RenderError> {
    let mut templates: BTreeMap<String, String> = TPLS
        .iter()
        .map(|(name, content)| ((*name).to_owned(), (*content).to_owned()))
        .collect();
    if let Some(dir) = overrides_dir {
        for (name, content) in load_overrides(dir)? {
            if templates.contains_key(&name) {
                tracing::debug!(template = %name, "using template override");
            } else {
                tracing::debug!(template = %name, "adding user template");
            }
            templates.insert(name, content);
        }
    }

    let mut tera = Tera::default();
    tera.add_raw_templates(templates)?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// ReportKind
// ---------------------------------------------------------------------------

/// Reports the renderer can produce from one sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    Overview,
    Siblings,
}

impl ReportKind {
    pub fn all() -> &'static [ReportKind] {
        &[ReportKind::Overview, ReportKind::Siblings]
    }

    /// Template name, also the relative path of an override in the
    /// templates directory.
    pub fn template_name(&self) -> &'static str {
        match self {
            ReportKind::Overview => "overview/report.md.tera",
            ReportKind::Siblings => "siblings/report.md.tera",
        }
    }
}

// ---------------------------------------------------------------------------
// TemplateEngine
// ---------------------------------------------------------------------------

/// Tera engine over the embedded templates plus optional overrides.
///
/// An override replaces the embedded template with the same name; other
/// `.tera` files are added and can be imported or included.
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    pub fn new(overrides_dir: Option<&Path>) -> Result<Self, RenderError> {
        let tera = build_tera(overrides_dir)?;
        Ok(TemplateEngine { tera })
    }

    pub fn render(&self, ctx: &TemplateContext, kind: ReportKind) -> Result<String, RenderError> {
        let tera_ctx = ctx.to_tera_context()?;
        let rendered = self.tera.render(kind.template_name(), &tera_ctx)?;
        Ok(rendered.replace("\r\n", "\n"))
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Renders sync reports as Markdown. Create once and reuse.
pub struct Renderer {
    engine: TemplateEngine,
}

impl Renderer {
    /// Embedded templates only.
    pub fn new() -> Result<Self, RenderError> {
        Ok(Renderer { engine: TemplateEngine::new(None)? })
    }

    /// Embedded templates, overridden by `.tera` files found in `dir`.
    pub fn with_templates(dir: &Path) -> Result<Self, RenderError> {
        Ok(Renderer { engine: TemplateEngine::new(Some(dir))? })
    }

    pub fn render(&self, reports: &[SyncReport], kind: ReportKind) -> Result<String, RenderError> {
        self.render_with_context(&TemplateContext::from_reports(reports), kind)
    }

    pub fn render_with_context(
        &self,
        ctx: &TemplateContext,
        kind: ReportKind,
    ) -> Result<String, RenderError> {
        self.engine.render(ctx, kind)
    }
}
