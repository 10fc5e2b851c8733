use std::fmt;
use std::sync::Arc;
use std::path::{Path, PathBuf};

use crate::value::{Dict, Value};

/// Separates the preamble, the metadata header, and the body.
pub const DELIMITER: &str = "+++";

/// The metadata key every document must define.
pub const TITLE: &str = "title";

/// Why a document was left out of the build.
///
/// Skips are authoring problems confined to a single document, so they are
/// reported and the build moves on. Anything else that goes wrong is an
/// [`Error`](crate::error::Error) and stops the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Skip {
    /// The header is absent or isn't a YAML mapping.
    HeaderMissing,
    /// The header parsed but has no `title`.
    TitleMissing,
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Skip::HeaderMissing => f.write_str("contains no config in header"),
            Skip::TitleMissing => f.write_str("contains no title"),
        }
    }
}

/// A source document: header metadata plus the raw, unrendered body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Path relative to the input root, without a leading separator.
    pub relative_path: PathBuf,
    pub metadata: Arc<Dict>,
    pub body: String,
}

impl Document {
    /// Splits `raw` into metadata and body.
    ///
    /// The text is split at every [`DELIMITER`]. The first segment is ignored,
    /// the second is parsed as YAML metadata and the third is the body. Any
    /// segments after the third are dropped.
    ///
    /// ```rust
    /// use board::document::{Document, Skip};
    ///
    /// let doc = Document::parse("\n+++\ntitle: Hello\n+++\nHi", "hello.md").unwrap();
    /// assert_eq!(doc.metadata["title"].as_str(), Some("Hello"));
    /// assert_eq!(doc.body, "\nHi");
    ///
    /// let skip = Document::parse("+++\nauthor: me\n+++\nHi", "hello.md").unwrap_err();
    /// assert_eq!(skip, Skip::TitleMissing);
    /// ```
    pub fn parse<P: Into<PathBuf>>(raw: &str, relative_path: P) -> Result<Document, Skip> {
        let mut segments = raw.split(DELIMITER).skip(1);
        let (header, body) = match (segments.next(), segments.next()) {
            (Some(header), Some(body)) => (header, body),
            _ => return Err(Skip::HeaderMissing),
        };

        let relative_path = relative_path.into();
        if segments.next().is_some() {
            log::debug!("{}: ignoring text after the third `{DELIMITER}`", relative_path.display());
        }

        let metadata = Value::from_yaml(header)
            .ok()
            .and_then(|value| value.into_dict().ok())
            .ok_or(Skip::HeaderMissing)?;

        if !metadata.contains_key(TITLE) {
            return Err(Skip::TitleMissing);
        }

        Ok(Document { relative_path, metadata, body: body.to_string() })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }
}

/// The path of `file` relative to `root`, without leading separators.
///
/// Paths outside of `root` are returned as-is, minus any leading separator.
pub fn relative_path(file: &Path, root: &Path) -> PathBuf {
    if let Ok(relative) = file.strip_prefix(root) {
        return relative.to_path_buf();
    }

    let file = file.to_string_lossy();
    let root = root.to_string_lossy();
    let relative = file.strip_prefix(&*root).unwrap_or(&*file);
    PathBuf::from(relative.trim_start_matches(std::path::is_separator))
}
