use pulldown_cmark::{html, Options, Parser};

/// Converts Markdown into HTML.
#[derive(Debug, Clone, Copy)]
pub struct Markdown {
    options: Options,
}

impl Markdown {
    pub fn new() -> Self {
        Markdown {
            options: Options::ENABLE_TABLES
                | Options::ENABLE_FOOTNOTES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_HEADING_ATTRIBUTES,
        }
    }

    pub fn to_html(&self, input: &str) -> String {
        let mut html_output = String::with_capacity(input.len() * 3 / 2);
        html::push_html(&mut html_output, Parser::new_ext(input, self.options));
        html_output
    }
}

impl Default for Markdown {
    fn default() -> Self {
        Markdown::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraphs_and_inline() {
        let md = Markdown::new();
        assert_eq!(md.to_html("Hi Hello"), "<p>Hi Hello</p>\n");
        assert_eq!(md.to_html("\n# Head\n\n*a* ~~b~~"), "<h1>Head</h1>\n<p><em>a</em> <del>b</del></p>\n");
    }

    #[test]
    fn tables() {
        let html = Markdown::new().to_html("| a |\n|---|\n| 1 |\n");
        assert!(html.starts_with("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn smart_punctuation_is_off() {
        assert_eq!(Markdown::new().to_html("it's -- x..."), "<p>it's -- x...</p>\n");
    }

    #[test]
    fn empty_input() {
        assert_eq!(Markdown::new().to_html(""), "");
    }
}
