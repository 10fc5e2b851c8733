use std::sync::Arc;
use std::path::{Path, PathBuf};

use log::LevelFilter;
use serde::Deserialize;

use crate::error::{Chainable, Result};

/// Name of the configuration file, relative to the project root.
pub const CONFIG_FILE: &str = "config.yaml";

/// Name of the build log, relative to the project root.
pub const LOG_FILE: &str = "board_build.log";

/// The on-disk shape of [`CONFIG_FILE`].
#[derive(Debug, Deserialize)]
struct Settings {
    input: String,
    output: String,
    templates: String,
    site_title: String,
    #[serde(default)]
    log_level: Option<String>,
    #[serde(default)]
    files: Vec<String>,
}

/// Site-wide, read-only build settings.
///
/// All paths are resolved against the project root when the configuration is
/// loaded, so components never consult the working directory themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub input: PathBuf,
    pub output: PathBuf,
    pub templates: PathBuf,
    pub site_title: Arc<str>,
    /// Auxiliary templates rendered into every page's `files` context.
    pub files: Vec<Arc<str>>,
    pub log_level: LevelFilter,
}

impl Config {
    pub fn new<I, O, T, S>(input: I, output: O, templates: T, site_title: S) -> Self
        where I: Into<PathBuf>, O: Into<PathBuf>, T: Into<PathBuf>, S: Into<Arc<str>>
    {
        Config {
            input: input.into(),
            output: output.into(),
            templates: templates.into(),
            site_title: site_title.into(),
            files: vec![],
            log_level: LevelFilter::Info,
        }
    }

    pub fn with_files<I, S>(mut self, files: I) -> Self
        where I: IntoIterator<Item = S>, S: Into<Arc<str>>
    {
        self.files = files.into_iter().map(Into::into).collect();
        self
    }

    /// Loads [`CONFIG_FILE`] from the project directory `root`.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        let string = crate::fs::read_text(&path)
            .chain(error!("failed to read the site configuration"))?;

        Config::parse(&string, root).chain_with(|| error! {
            "invalid site configuration",
            "config path" => path.display(),
        })
    }

    /// Parses configuration YAML, resolving relative paths against `root`.
    pub fn parse(yaml: &str, root: &Path) -> Result<Self> {
        let settings: Settings = serde_yaml_ng::from_str(yaml)?;
        let log_level = match settings.log_level.as_deref() {
            Some("debug") => LevelFilter::Debug,
            _ => LevelFilter::Info,
        };

        Ok(Config {
            input: resolve(root, &settings.input, "input")?,
            output: resolve(root, &settings.output, "output")?,
            templates: resolve(root, &settings.templates, "templates")?,
            site_title: settings.site_title.into(),
            files: settings.files.into_iter().map(Into::into).collect(),
            log_level,
        })
    }

    /// Path of the layout or auxiliary template called `name`.
    pub fn template_path(&self, name: &str) -> PathBuf {
        self.templates.join(format!("{name}.html"))
    }
}

/// Paths beginning with `/` are absolute; all others are relative to `root`.
fn resolve(root: &Path, path: &str, key: &str) -> Result<PathBuf> {
    if path.is_empty() {
        return err!(format!("`{key}` must be a non-empty path"));
    }

    match path.starts_with('/') {
        true => Ok(PathBuf::from(path)),
        false => Ok(root.join(path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = "
input: content
output: /var/www/site
templates: layouts
site_title: My Site
";

    #[test]
    fn paths_resolve_against_root() {
        let config = Config::parse(YAML, Path::new("/home/me/blog")).unwrap();
        assert_eq!(config.input, Path::new("/home/me/blog/content"));
        assert_eq!(config.output, Path::new("/var/www/site"));
        assert_eq!(config.templates, Path::new("/home/me/blog/layouts"));
        assert_eq!(&*config.site_title, "My Site");
        assert_eq!(config.log_level, LevelFilter::Info);
        assert!(config.files.is_empty());
    }

    #[test]
    fn optional_settings() {
        let yaml = format!("{YAML}log_level: debug\nfiles: [nav, footer]\n");
        let config = Config::parse(&yaml, Path::new("/r")).unwrap();
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert_eq!(config.files, vec![Arc::from("nav"), Arc::from("footer")]);

        let yaml = format!("{YAML}log_level: verbose\n");
        let config = Config::parse(&yaml, Path::new("/r")).unwrap();
        assert_eq!(config.log_level, LevelFilter::Info);
    }

    #[test]
    fn missing_required_key() {
        let error = Config::parse("input: a\noutput: b\ntemplates: c\n", Path::new("/r"))
            .unwrap_err();

        assert!(error.to_string().contains("site_title"));
    }

    #[test]
    fn template_paths() {
        let config = Config::new("/in", "/out", "/tmpl", "Site");
        assert_eq!(config.template_path("single"), Path::new("/tmpl/single.html"));
    }
}
