//! A small static site builder for trees of Markdown documents.
//!
//! # Overview
//!
//! Board turns a directory of Markdown files with YAML front matter into a
//! directory of HTML pages with the same shape. A project is configured by a
//! [`config.yaml`](config::CONFIG_FILE) at its root, naming three directories
//! (input, output, templates), a site title, and optionally a list of
//! auxiliary templates.
//!
//! A document looks like this:
//!
//! ```text
//! +++
//! title: Hello
//! template: post
//! +++
//! Welcome to {{site_title}}, built on {{date}}.
//! ```
//!
//! ## Building
//!
//! A build runs the following steps for every `.md` file under the input
//! root, in path order:
//!
//! 1. The file is split into a YAML header and a body. Files without a header
//!    or without a `title` are skipped with a warning.
//! 2. A page context is assembled from the build time, the site title, and the
//!    document's metadata.
//! 3. Each auxiliary template is rendered with that context and stored under
//!    `files.<name>`.
//! 4. The body is rendered as a mustache template, then converted from
//!    Markdown to HTML and stored under `content`.
//! 5. The page's layout, `templates/<template>.html`, is rendered with the
//!    final context.
//! 6. The result is written to the output root at the document's relative
//!    path, with `.md` swapped for `.html`.
//!
//! Any other failure ends the build. See [`Builder`] for the entry point and
//! [`Pipeline`] for the rendering steps.

#[macro_use]
pub mod error;
#[macro_use]
pub mod value;
pub mod fs;
pub mod config;
pub mod document;
pub mod context;
pub mod templating;
pub mod markdown;
pub mod render;
pub mod output;
pub mod build;
pub mod logger;

pub use build::{Builder, BuildReport, Outcome};
pub use config::Config;
pub use document::{Document, Skip};
pub use render::Pipeline;
