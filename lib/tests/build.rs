use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{Duration, NaiveDate, NaiveDateTime};

use board::context::{Clock, FixedClock};
use board::{Builder, Config, Skip};

const LAYOUT: &str = "<html><title>{{title}} | {{site_title}}</title>{{{content}}}</html>";

struct Site {
    _dir: tempfile::TempDir,
    root: PathBuf,
}

impl Site {
    fn new() -> Site {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        let site = Site { _dir: dir, root };
        site.write("templates/single.html", LAYOUT);
        site.write("config.yaml", "input: input\noutput: output\ntemplates: templates\nsite_title: Board\n");
        site
    }

    fn write(&self, path: &str, contents: &str) {
        let path = self.root.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn read(&self, path: &str) -> String {
        fs::read_to_string(self.root.join(path)).unwrap()
    }

    fn config(&self) -> Config {
        Config::load(&self.root).unwrap()
    }

    fn builder(&self) -> Builder {
        let date = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
        Builder::new(Arc::new(self.config())).unwrap()
            .with_clock(FixedClock(date.and_hms_opt(8, 30, 0).unwrap()))
    }
}

fn tree(root: &Path) -> Vec<(PathBuf, String)> {
    let mut files: Vec<_> = jwalk::WalkDir::new(root)
        .sort(true)
        .skip_hidden(false)
        .into_iter()
        .map(|entry| entry.unwrap())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let path = entry.path();
            let contents = fs::read_to_string(&path).unwrap();
            (path.strip_prefix(root).unwrap().to_path_buf(), contents)
        })
        .collect();

    files.sort();
    files
}

#[test]
fn mirrors_the_input_tree() {
    let site = Site::new();
    site.write("input/index.md", "+++\ntitle: Home\n+++\n# Welcome\n");
    site.write("input/posts/2023/first.md", "+++\ntitle: First\n+++\nPosted {{date}}.");

    let report = site.builder().run().unwrap();
    assert_eq!(report.pages_written(), 2);
    assert_eq!(report.pages_skipped(), 0);
    assert_eq!(report.written, vec![
        site.root.join("output/index.html"),
        site.root.join("output/posts/2023/first.html"),
    ]);

    assert_eq!(site.read("output/index.html"),
        "<html><title>Home | Board</title><h1>Welcome</h1>\n</html>");

    assert_eq!(site.read("output/posts/2023/first.html"),
        "<html><title>First | Board</title><p>Posted 2023-06-01.</p>\n</html>");
}

#[test]
fn bad_documents_are_skipped() {
    let site = Site::new();
    site.write("input/a.md", "no header at all");
    site.write("input/b.md", "+++\nauthor: me\n+++\nuntitled");
    site.write("input/c.md", "+++\ntitle: Fine\n+++\nok");

    let report = site.builder().run().unwrap();
    assert_eq!(report.pages_written(), 1);
    assert_eq!(report.skipped, vec![
        (PathBuf::from("a.md"), Skip::HeaderMissing),
        (PathBuf::from("b.md"), Skip::TitleMissing),
    ]);

    assert!(!site.root.join("output/a.html").exists());
    assert!(!site.root.join("output/b.html").exists());
    assert!(site.root.join("output/c.html").exists());
}

#[test]
fn only_markdown_is_built() {
    let site = Site::new();
    site.write("input/page.md", "+++\ntitle: P\n+++\nx");
    site.write("input/notes.txt", "+++\ntitle: N\n+++\nx");
    site.write("input/style.css", "body {}");
    site.write("input/.hidden.md", "+++\ntitle: H\n+++\nx");

    let report = site.builder().run().unwrap();
    assert_eq!(report.pages_written(), 2);

    let outputs: Vec<_> = tree(&site.root.join("output")).into_iter().map(|(p, _)| p).collect();
    assert_eq!(outputs, vec![PathBuf::from(".hidden.html"), PathBuf::from("page.html")]);
}

#[test]
fn missing_layout_aborts_the_build() {
    let site = Site::new();
    site.write("input/a.md", "+++\ntitle: A\ntemplate: missing\n+++\nx");

    let error = site.builder().run().unwrap_err();
    let message = error.to_string();
    assert!(message.contains("layout not found"));
    assert!(message.contains("missing.html"));
}

#[test]
fn missing_input_directory_is_fatal() {
    let site = Site::new();
    let error = site.builder().run().unwrap_err();
    assert!(error.to_string().contains("input path"));
}

#[test]
fn builds_are_repeatable() {
    let site = Site::new();
    site.write("templates/post.html", "<article>{{{content}}}</article>");
    site.write("input/a.md", "+++\ntitle: A\n+++\nAt {{time}}");
    site.write("input/b/c.md", "+++\ntitle: C\ntemplate: post\n+++\n*{{title}}*");

    site.builder().run().unwrap();
    let first = tree(&site.root.join("output"));

    site.builder().run().unwrap();
    let second = tree(&site.root.join("output"));

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert_eq!(first[1], (PathBuf::from("b/c.html"), "<article><p><em>C</em></p>\n</article>".into()));
}

/// A clock that moves forward a minute every time it's read.
#[derive(Debug, Default)]
struct TickingClock(AtomicI64);

impl Clock for TickingClock {
    fn now(&self) -> NaiveDateTime {
        let ticks = self.0.fetch_add(1, Ordering::SeqCst);
        let start = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap().and_hms_opt(23, 59, 0).unwrap();
        start + Duration::minutes(ticks)
    }
}

#[test]
fn every_page_shares_one_timestamp() {
    let site = Site::new();
    site.write("templates/single.html", "{{date}} {{time}}");
    site.write("input/a.md", "+++\ntitle: A\n+++\n");
    site.write("input/b.md", "+++\ntitle: B\n+++\n");
    site.write("input/c.md", "+++\ntitle: C\n+++\n");

    let builder = Builder::new(Arc::new(site.config())).unwrap()
        .with_clock(TickingClock::default());

    builder.run().unwrap();
    for page in ["a", "b", "c"] {
        assert_eq!(site.read(&format!("output/{page}.html")), "2023-06-01 23:59");
    }
}

#[test]
fn auxiliary_files_are_shared_by_every_page() {
    let site = Site::new();
    site.write("config.yaml", "input: input\noutput: output\ntemplates: templates\n\
        site_title: Board\nfiles: [nav]\n");
    site.write("templates/nav.html", "<nav>{{site_title}}: {{title}}</nav>");
    site.write("templates/single.html", "{{{files.nav}}}{{{content}}}");
    site.write("input/one.md", "+++\ntitle: One\n+++\nfirst");
    site.write("input/two.md", "+++\ntitle: Two\n+++\nsecond");

    site.builder().run().unwrap();
    assert_eq!(site.read("output/one.html"), "<nav>Board: One</nav><p>first</p>\n");
    assert_eq!(site.read("output/two.html"), "<nav>Board: Two</nav><p>second</p>\n");
}

#[test]
fn extra_variables_yield_to_metadata() {
    let site = Site::new();
    site.write("templates/single.html", "{{author}} {{kind}}");
    site.write("input/a.md", "+++\ntitle: A\nauthor: Ada\n+++\n");

    let extra = board::dict! { "author" => "nobody", "kind" => "page" };
    site.builder().with_extra(extra).run().unwrap();
    assert_eq!(site.read("output/a.html"), "Ada page");
}

#[test]
fn config_is_read_from_the_project_root() {
    let site = Site::new();
    site.write("config.yaml", "input: src\noutput: /tmp/elsewhere\ntemplates: t\n\
        site_title: Other\nlog_level: debug\n");

    let config = site.config();
    assert_eq!(config.input, site.root.join("src"));
    assert_eq!(config.output, Path::new("/tmp/elsewhere"));
    assert_eq!(config.templates, site.root.join("t"));
    assert_eq!(&*config.site_title, "Other");
    assert_eq!(config.log_level, log::LevelFilter::Debug);
}
