//! Translation of mustache templates into minijinja templates.
//!
//! Every mustache tag becomes a call to one of the functions named below,
//! which the engine registers. Names are passed as string literals, so any
//! mustache name works, including ones that aren't valid jinja identifiers.
//!
//! | mustache               | minijinja                                          |
//! |------------------------|----------------------------------------------------|
//! | `{{name}}`             | `{{ mustache_var("name") }}`                       |
//! | `{{{name}}}`, `{{&name}}` | `{{ mustache_raw("name") }}`                    |
//! | `{{#name}}`            | `{% for mustache_scope_0 in mustache_section("name") %}` |
//! | `{{^name}}`            | `{% if not mustache_section("name") %}`            |
//! | `{{/name}}`            | `{% endfor %}` or `{% endif %}`                    |
//! | `{{! comment }}`       | nothing                                            |
//!
//! `mustache_section` yields the items of a list, a truthy value as a single
//! item, and nothing otherwise. Each open section's item is a scope: it is
//! passed, innermost first, to every lookup inside the section, so `{{name}}`
//! finds `name` in the nearest map that has it before falling back to the
//! page context, and `{{.}}` is the innermost item itself.
//!
//! Section, inverted, and comment tags that are alone on a line remove that
//! whole line, indentation and line break included.
//!
//! Partials (`{{> name}}`) and delimiter changes (`{{=<% %>=}}`) are rejected.

use crate::error::Result;

pub const VAR_FN: &str = "mustache_var";
pub const RAW_FN: &str = "mustache_raw";
pub const SECTION_FN: &str = "mustache_section";

/// Prefix of the loop variable holding the item of each open section.
pub const SCOPE_VAR: &str = "mustache_scope_";

/// Returns `true` if `input` contains a mustache tag opening.
pub fn is_template(input: &str) -> bool {
    memchr::memmem::find(input.as_bytes(), b"{{").is_some()
}

#[derive(Debug, PartialEq)]
enum Tag<'a> {
    Var(&'a str),
    Raw(&'a str),
    Section(&'a str),
    Inverted(&'a str),
    Close(&'a str),
    Comment,
}

impl Tag<'_> {
    /// Whether the tag renders nothing in place, and so may stand alone.
    fn can_stand_alone(&self) -> bool {
        matches!(self, Tag::Section(_) | Tag::Inverted(_) | Tag::Close(_) | Tag::Comment)
    }
}

struct Section<'a> {
    name: &'a str,
    inverted: bool,
}

/// Translates the mustache template `input` into minijinja source.
pub fn translate(input: &str) -> Result<String> {
    let mut output = String::with_capacity(input.len() + input.len() / 4);
    let mut sections: Vec<Section<'_>> = vec![];
    let mut scopes = 0;
    let mut at_line_start = true;
    let mut rest = input;

    while let Some(start) = rest.find("{{") {
        let (tag, len) = parse_tag(&rest[start..], offset(input, rest) + start)?;
        let (text, after) = (&rest[..start], &rest[start + len..]);
        let line = match tag.can_stand_alone() {
            true => standalone_line(text, after, at_line_start),
            false => None,
        };

        at_line_start = line.is_some();
        rest = match line {
            Some((indent, line_end)) => {
                push_text(&mut output, &text[..indent]);
                &after[line_end..]
            }
            None => {
                push_text(&mut output, text);
                after
            }
        };

        match tag {
            Tag::Var(name) => push_call(&mut output, "{{ ", VAR_FN, name, scopes, " }}"),
            Tag::Raw(name) => push_call(&mut output, "{{ ", RAW_FN, name, scopes, " }}"),
            Tag::Section(name) => {
                let open = format!("{{% for {SCOPE_VAR}{scopes} in ");
                push_call(&mut output, &open, SECTION_FN, name, scopes, " %}");
                sections.push(Section { name, inverted: false });
                scopes += 1;
            }
            Tag::Inverted(name) => {
                push_call(&mut output, "{% if not ", SECTION_FN, name, scopes, " %}");
                sections.push(Section { name, inverted: true });
            }
            Tag::Close(name) => match sections.pop() {
                Some(open) if open.name == name && open.inverted => output.push_str("{% endif %}"),
                Some(open) if open.name == name => {
                    scopes -= 1;
                    output.push_str("{% endfor %}");
                }
                Some(open) => return err! {
                    "mismatched mustache section",
                    "open section" => open.name,
                    "closing tag" => name,
                },
                None => return err! {
                    "mustache section closed without being opened",
                    "closing tag" => name,
                },
            },
            Tag::Comment => {}
        }
    }

    push_text(&mut output, rest);
    match sections.pop() {
        Some(open) => err!("unclosed mustache section", "section" => open.name),
        None => Ok(output),
    }
}

fn offset(input: &str, rest: &str) -> usize {
    input.len() - rest.len()
}

/// If the tag between `before` and `after` is alone on its line, returns the
/// offset of the line's start in `before` and of its end, past the line
/// break, in `after`.
fn standalone_line(before: &str, after: &str, at_line_start: bool) -> Option<(usize, usize)> {
    let indent = match before.rfind('\n') {
        Some(i) => i + 1,
        None if at_line_start => 0,
        None => return None,
    };

    let line_end = after.find('\n').map_or(after.len(), |i| i + 1);
    let blank = |s: &str| s.chars().all(|c| matches!(c, ' ' | '\t' | '\r' | '\n'));
    (blank(&before[indent..]) && blank(&after[..line_end])).then_some((indent, line_end))
}

/// Parses the tag at the start of `input`, returning it and its length.
fn parse_tag(input: &str, at: usize) -> Result<(Tag<'_>, usize)> {
    let (close, inner) = match input.strip_prefix("{{{") {
        Some(inner) => ("}}}", inner),
        None => ("}}", &input[2..]),
    };

    let Some(end) = inner.find(close) else {
        return err!("unclosed mustache tag", "byte offset" => at);
    };

    let body = inner[..end].trim();
    let len = input.len() - inner.len() + end + close.len();
    if close == "}}}" {
        return Ok((Tag::Raw(name(body, at)?), len));
    }

    let tag = match body.chars().next() {
        Some('!') => Tag::Comment,
        Some('&') => Tag::Raw(name(&body[1..], at)?),
        Some('#') => Tag::Section(name(&body[1..], at)?),
        Some('^') => Tag::Inverted(name(&body[1..], at)?),
        Some('/') => Tag::Close(name(&body[1..], at)?),
        Some('>') => return err!("mustache partials are not supported", "byte offset" => at),
        Some('=') => return err!("mustache delimiter changes are not supported", "byte offset" => at),
        _ => Tag::Var(name(body, at)?),
    };

    Ok((tag, len))
}

fn name(name: &str, at: usize) -> Result<&str> {
    match name.trim() {
        "" => err!("empty mustache tag", "byte offset" => at),
        name => Ok(name),
    }
}

/// Pushes `open function("name", scope_n, .., scope_0) close`.
fn push_call(output: &mut String, open: &str, function: &str, name: &str, scopes: usize, close: &str) {
    output.push_str(open);
    output.push_str(function);
    output.push_str("(\"");
    for c in name.chars() {
        if c == '"' || c == '\\' {
            output.push('\\');
        }

        output.push(c);
    }

    output.push('"');
    for scope in (0..scopes).rev() {
        output.push_str(", ");
        output.push_str(SCOPE_VAR);
        output.push_str(&scope.to_string());
    }

    output.push(')');
    output.push_str(close);
}

/// Pushes literal text, escaping any `{` that jinja could read as the start
/// of a tag, comment, or block.
fn push_text(output: &mut String, text: &str) {
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('{', Some('{' | '%' | '#') | None) => output.push_str("{{ \"{\" }}"),
            _ => output.push(c),
        }
    }
}
