use std::sync::Arc;

use chrono::NaiveDateTime;
use derive_more::Debug;

use crate::config::Config;
use crate::context::{self, Clock, Context, SystemClock};
use crate::document::Document;
use crate::error::{Chainable, Result};
use crate::markdown::Markdown;
use crate::templating::{Engine, MiniJinjaEngine};
use crate::value::{Dict, Value};

/// The metadata key naming a document's layout.
pub const TEMPLATE: &str = "template";

/// The layout used when a document doesn't name one.
pub const DEFAULT_TEMPLATE: &str = "single";

/// Renders documents into complete pages.
///
/// Rendering a document runs these steps, in order:
///
///   1. The page [`Context`] is built from the extra data, the clock, the site
///      title, and the document's metadata.
///   2. Each auxiliary template is rendered with that context and stored
///      under `files.<name>`.
///   3. The body is rendered as a template, producing Markdown.
///   4. The Markdown is converted to HTML and stored under `content`.
///   5. The layout named by the `template` metadata key, `single` by default,
///      is loaded from the templates directory.
///   6. The layout is rendered with the final context.
#[derive(Debug)]
pub struct Pipeline {
    #[debug(ignore)]
    config: Arc<Config>,
    engine: Arc<dyn Engine>,
    markdown: Markdown,
    clock: Arc<dyn Clock>,
    /// Auxiliary template name and source, in configuration order.
    files: Vec<(Arc<str>, String)>,
}

impl Pipeline {
    /// Creates a pipeline, loading every auxiliary template in `config`.
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let files = config.files.iter()
            .map(|name| {
                let path = config.template_path(name);
                let source = crate::fs::read_text(&path).chain_with(|| error! {
                    "auxiliary template not found",
                    "template" => name,
                    "expected path" => path.display(),
                })?;

                Ok((name.clone(), source))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Pipeline {
            config,
            engine: Arc::new(MiniJinjaEngine::new()),
            markdown: Markdown::new(),
            clock: Arc::new(SystemClock),
            files,
        })
    }

    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// The current time according to the pipeline's clock.
    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    /// The base context for `document` at `now`: step 1 of rendering.
    pub fn context(&self, document: &Document, extra: &Dict, now: NaiveDateTime) -> Context {
        Context::page(extra, now, &self.config.site_title, &document.metadata)
    }

    /// Renders `document` into a complete page, stamped with the current time.
    pub fn render(&self, document: &Document, extra: &Dict) -> Result<String> {
        self.render_at(document, extra, self.now())
    }

    /// Renders `document` into a complete page, stamped with `now`.
    pub fn render_at(&self, document: &Document, extra: &Dict, now: NaiveDateTime) -> Result<String> {
        let path = document.relative_path.to_string_lossy();
        let mut context = self.context(document, extra, now);

        if !self.files.is_empty() {
            let mut files = Dict::new();
            for (name, source) in &self.files {
                let template = format!("{name}.html");
                let rendered = self.engine.render_str(Some(template.as_str()), source, &context)
                    .chain_with(|| error! {
                        "failed to render auxiliary template",
                        "template" => name,
                        "document" => &path,
                    })?;

                files.insert(name.clone(), Value::from(rendered));
            }

            context = context.with(context::FILES, files);
        }

        let markdown = self.engine.render_str(Some(&*path), &document.body, &context)
            .chain_with(|| error!("failed to render document body", "document" => &path))?;

        let context = context.with(context::CONTENT, self.markdown.to_html(&markdown));
        let layout = layout_name(document)?;
        let layout_path = self.config.template_path(layout);
        let layout_source = crate::fs::read_text(&layout_path).chain_with(|| error! {
            "layout not found",
            "layout" => layout,
            "expected path" => layout_path.display(),
            "document" => &path,
        })?;

        let template = format!("{layout}.html");
        self.engine.render_str(Some(template.as_str()), &layout_source, &context)
            .chain_with(|| error! {
                "failed to render layout",
                "layout" => layout,
                "document" => &path,
            })
    }
}

/// The layout `document` asks for, or [`DEFAULT_TEMPLATE`].
pub fn layout_name(document: &Document) -> Result<&str> {
    match document.get(TEMPLATE) {
        None => Ok(DEFAULT_TEMPLATE),
        Some(value) => value.as_str().ok_or_else(|| error! {
            "invalid `template` metadata value",
            "expected" => "string",
            "found" => value.kind(),
            "document" => document.relative_path.display(),
        }),
    }
}
