use std::sync::Arc;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::config::Config;
use crate::context::Clock;
use crate::document::{self, Document, Skip};
use crate::error::{Chainable, Result};
use crate::output::Output;
use crate::render::Pipeline;
use crate::value::Dict;

/// What happened to one candidate document.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The page was rendered and written to this path.
    Written(PathBuf),
    /// The document was left out of the build.
    Skipped(Skip),
}

/// A summary of a completed build.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BuildReport {
    /// Output paths, in processing order.
    pub written: Vec<PathBuf>,
    /// Input paths relative to the input root, with the reason for skipping.
    pub skipped: Vec<(PathBuf, Skip)>,
}

impl BuildReport {
    pub fn pages_written(&self) -> usize {
        self.written.len()
    }

    pub fn pages_skipped(&self) -> usize {
        self.skipped.len()
    }
}

/// Drives a full build: every Markdown file under the input root is parsed,
/// rendered, and written, one after another.
///
/// Documents that fail to parse are skipped with a warning. Every other
/// failure ends the build.
#[derive(Debug)]
pub struct Builder {
    config: Arc<Config>,
    pipeline: Pipeline,
    output: Output,
    extra: Dict,
}

impl Builder {
    pub fn new(config: Arc<Config>) -> Result<Self> {
        Ok(Builder {
            pipeline: Pipeline::new(config.clone())?,
            output: Output::new(config.output.clone()),
            extra: Dict::new(),
            config,
        })
    }

    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.pipeline = self.pipeline.with_clock(clock);
        self
    }

    /// Sets extra variables made available to every page. Page metadata and
    /// the built-in variables take precedence over these.
    pub fn with_extra(mut self, extra: Dict) -> Self {
        self.extra = extra;
        self
    }

    /// All Markdown files under the input root, sorted by path.
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let root = &self.config.input;
        if !root.is_dir() {
            return err! {
                "input path must point to an existing directory",
                "input path" => root.display(),
            };
        }

        let walker = jwalk::WalkDir::new(root)
            .parallelism(jwalk::Parallelism::Serial)
            .follow_links(true)
            .skip_hidden(false);

        let mut files = vec![];
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("failed to read an input directory entry: {e}");
                    continue;
                }
            };

            if entry.file_type().is_file() && is_markdown(&entry.file_name().to_string_lossy()) {
                files.push(entry.path());
            }
        }

        files.sort();
        Ok(files)
    }

    /// Runs the build, returning a report of what was written and skipped.
    /// The clock is read once, so every page shares the same `time` and `date`.
    pub fn run(&self) -> Result<BuildReport> {
        crate::fs::create_dir_all(&self.config.output)
            .chain(error!("failed to create the output directory"))?;

        let now = self.pipeline.now();
        let mut report = BuildReport::default();
        for file in self.discover()? {
            let relative_path = document::relative_path(&file, &self.config.input);
            match self.build_file(&file, now)? {
                Outcome::Written(path) => report.written.push(path),
                Outcome::Skipped(skip) => report.skipped.push((relative_path, skip)),
            }
        }

        log::debug!("{} pages written, {} skipped",
            report.pages_written(), report.pages_skipped());

        Ok(report)
    }

    /// Parses, renders, and writes the single document at `file`, stamping it
    /// with `now`.
    pub fn build_file(&self, file: &Path, now: NaiveDateTime) -> Result<Outcome> {
        let raw = crate::fs::read_text(file)?;
        let relative_path = document::relative_path(file, &self.config.input);
        let document = match Document::parse(&raw, relative_path) {
            Ok(document) => document,
            Err(skip) => {
                log::warn!("{} {skip}. Skipping build!", file.display());
                return Ok(Outcome::Skipped(skip));
            }
        };

        log::debug!("rendering {}", document.relative_path.display());
        let html = self.pipeline.render_at(&document, &self.extra, now)?;
        let page = self.output.page(&document.relative_path, html);
        self.output.write(&page)?;
        Ok(Outcome::Written(page.path))
    }
}

/// Whether the last `.`-separated part of `file_name` is exactly `md`.
pub fn is_markdown(file_name: &str) -> bool {
    file_name.rsplit('.').next() == Some("md")
}
