use minijinja::{AutoEscape, Environment, UndefinedBehavior};

use crate::context::Context;
use crate::error::{Chainable, Result};
use crate::templating::{mustache, Engine};

/// Renders mustache templates with minijinja.
///
/// Templates are translated by [`mustache::translate()`] and rendered in an
/// environment set up for mustache semantics: every template is HTML-escaped
/// with mustache's escape set, lookups through missing values render as
/// nothing, and a template's trailing newline is preserved.
#[derive(Debug)]
pub struct MiniJinjaEngine {
    env: Environment<'static>,
}

impl MiniJinjaEngine {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        env.set_undefined_behavior(UndefinedBehavior::Chainable);
        env.set_keep_trailing_newline(true);
        env.set_formatter(ext::write_escaped);
        env.add_function(mustache::VAR_FN, ext::var);
        env.add_function(mustache::RAW_FN, ext::raw);
        env.add_function(mustache::SECTION_FN, ext::section);
        MiniJinjaEngine { env }
    }
}

impl Default for MiniJinjaEngine {
    fn default() -> Self {
        MiniJinjaEngine::new()
    }
}

impl Engine for MiniJinjaEngine {
    fn render_str(
        &self,
        name: Option<&str>,
        template_str: &str,
        context: &Context,
    ) -> Result<String> {
        if !mustache::is_template(template_str) {
            return Ok(template_str.to_string());
        }

        let name = name.unwrap_or("<string>");
        let source = mustache::translate(template_str)
            .chain_with(|| error!("invalid mustache template", "template" => name))?;

        Ok(self.env.render_named_str(name, &source, context)?)
    }
}

mod ext {
    use std::fmt::{self, Write};

    use minijinja::value::{Rest, Value, ValueKind};
    use minijinja::{AutoEscape, Error, ErrorKind, Output, State};

    /// Resolves a possibly dotted mustache name, first against the open
    /// section scopes, innermost first, then against the template context.
    fn resolve(state: &State, name: &str, scopes: &[Value]) -> Value {
        if name == "." {
            return scopes.first().cloned().unwrap_or(Value::UNDEFINED);
        }

        let mut parts = name.split('.');
        let base = parts.next().unwrap_or(name);
        let found = scopes.iter()
            .filter(|scope| scope.kind() == ValueKind::Map)
            .map(|scope| scope.get_attr(base).unwrap_or(Value::UNDEFINED))
            .find(|value| !value.is_undefined())
            .or_else(|| state.lookup(base));

        let Some(mut value) = found else {
            return Value::UNDEFINED;
        };

        for attr in parts {
            value = match value.get_attr(attr) {
                Ok(value) if !value.is_undefined() => value,
                _ => return Value::UNDEFINED,
            };
        }

        value
    }

    fn is_missing(value: &Value) -> bool {
        value.is_undefined() || value.is_none()
    }

    pub fn var(state: &State, name: &str, scopes: Rest<Value>) -> Value {
        let value = resolve(state, name, &scopes);
        match is_missing(&value) {
            true => Value::from(""),
            false => value,
        }
    }

    pub fn raw(state: &State, name: &str, scopes: Rest<Value>) -> Value {
        let value = resolve(state, name, &scopes);
        match is_missing(&value) {
            true => Value::from(""),
            false => Value::from_safe_string(value.to_string()),
        }
    }

    /// The items a section renders once each: a list's items, a single truthy
    /// value, or nothing.
    pub fn section(state: &State, name: &str, scopes: Rest<Value>) -> Value {
        let value = resolve(state, name, &scopes);
        match (value.is_true(), value.kind()) {
            (false, _) => Value::from(Vec::<Value>::new()),
            (true, ValueKind::Seq) => value,
            (true, _) => Value::from(vec![value]),
        }
    }

    /// Writes `value`, escaping `&`, `<`, `>` and `"` unless it's safe.
    pub fn write_escaped(out: &mut Output, state: &State, value: &Value) -> Result<(), Error> {
        let string = value.to_string();
        let result = match value.is_safe() || matches!(state.auto_escape(), AutoEscape::None) {
            true => out.write_str(&string),
            false => escape_html(out, &string),
        };

        result.map_err(|_| Error::new(ErrorKind::WriteFailure, "failed to write template output"))
    }

    fn escape_html<W: Write>(out: &mut W, string: &str) -> fmt::Result {
        let mut last = 0;
        for (i, c) in string.char_indices() {
            let escaped = match c {
                '&' => "&amp;",
                '<' => "&lt;",
                '>' => "&gt;",
                '"' => "&quot;",
                _ => continue,
            };

            out.write_str(&string[last..i])?;
            out.write_str(escaped)?;
            last = i + 1;
        }

        out.write_str(&string[last..])
    }
}
