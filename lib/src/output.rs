use std::path::{Path, PathBuf};

use crate::error::Result;

/// A rendered page and the path it will be written to.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    pub path: PathBuf,
    pub html: String,
}

/// Maps documents to files under the output root.
#[derive(Debug, Clone)]
pub struct Output {
    root: PathBuf,
}

impl Output {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Output { root: root.into() }
    }

    /// The output path for the document at `relative_path`.
    ///
    /// The relative path is appended to the output root, every trailing `m`
    /// or `d` is trimmed from the result, and `html` is appended. For the
    /// `.md` files the build considers, that swaps the extension.
    ///
    /// ```rust
    /// use std::path::Path;
    /// use board::output::Output;
    ///
    /// let output = Output::new("/site/out");
    /// let path = output.path_for(Path::new("posts/2021/hello.md"));
    /// assert_eq!(path, Path::new("/site/out/posts/2021/hello.html"));
    /// ```
    pub fn path_for(&self, relative_path: &Path) -> PathBuf {
        let root = self.root.to_string_lossy();
        let root = match root.trim_end_matches('/') {
            "" if root.starts_with('/') => "/",
            trimmed => trimmed,
        };

        let joined = match root.ends_with('/') {
            true => format!("{root}{}", relative_path.display()),
            false => format!("{root}/{}", relative_path.display()),
        };

        let mut path = joined.trim_end_matches(&['m', 'd'][..]).to_string();
        path.push_str("html");
        PathBuf::from(path)
    }

    pub fn page(&self, relative_path: &Path, html: String) -> RenderedPage {
        RenderedPage { path: self.path_for(relative_path), html }
    }

    /// Writes `page`, creating parent directories and replacing any existing
    /// file.
    pub fn write(&self, page: &RenderedPage) -> Result<()> {
        crate::fs::write_text(&page.path, &page.html)?;
        log::info!("Wrote {}", page.path.display());
        Ok(())
    }
}
