use std::fmt::Debug;
use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use serde::{Serialize, Serializer};

use crate::value::{Dict, Value};

pub const TIME: &str = "time";
pub const DATE: &str = "date";
pub const SITE_TITLE: &str = "site_title";
pub const FILES: &str = "files";
pub const CONTENT: &str = "content";

/// A source of the current time for `time` and `date`.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> NaiveDateTime;
}

/// The wall clock, in UTC.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().naive_utc()
    }
}

/// A clock stopped at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// The variables visible to a substitution pass.
///
/// A context is never modified in place: [`Context::with()`] and
/// [`Context::merge()`] return a new context, leaving `self` untouched, so
/// nothing set while rendering one page can leak into the next.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    vars: Arc<Dict>,
}

impl Context {
    pub fn new() -> Self {
        Context::default()
    }

    /// Builds the base context for a page. Later layers override earlier ones:
    /// `extra`, then `time`/`date` from `now`, then `site_title`, then
    /// `metadata`.
    pub fn page(extra: &Dict, now: NaiveDateTime, site_title: &str, metadata: &Dict) -> Self {
        Context::new()
            .merge(extra)
            .with(TIME, now.format("%H:%M").to_string())
            .with(DATE, now.format("%Y-%m-%d").to_string())
            .with(SITE_TITLE, site_title)
            .merge(metadata)
    }

    pub fn with<K, V>(&self, key: K, value: V) -> Context
        where K: Into<Arc<str>>, V: Into<Value>
    {
        let mut vars = (*self.vars).clone();
        vars.insert(key.into(), value.into());
        Context { vars: Arc::new(vars) }
    }

    pub fn merge(&self, dict: &Dict) -> Context {
        let mut vars = (*self.vars).clone();
        vars.extend(dict.iter().map(|(k, v)| (k.clone(), v.clone())));
        Context { vars: Arc::new(vars) }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.vars.get(key)
    }

    pub fn as_dict(&self) -> &Dict {
        &self.vars
    }
}

impl Serialize for Context {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.vars.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn morning() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 3, 4).unwrap().and_hms_opt(9, 5, 0).unwrap()
    }

    #[test]
    fn page_context_layers() {
        let extra = dict! { "time" => "extra", "author" => "extra", "lang" => "en" };
        let metadata = dict! { "title" => "T", "author" => "meta" };
        let ctx = Context::page(&extra, morning(), "Site", &metadata);

        assert_eq!(ctx.get(TIME).and_then(Value::as_str), Some("09:05"));
        assert_eq!(ctx.get(DATE).and_then(Value::as_str), Some("2021-03-04"));
        assert_eq!(ctx.get(SITE_TITLE).and_then(Value::as_str), Some("Site"));
        assert_eq!(ctx.get("author").and_then(Value::as_str), Some("meta"));
        assert_eq!(ctx.get("lang").and_then(Value::as_str), Some("en"));
        assert_eq!(ctx.get("title").and_then(Value::as_str), Some("T"));
    }

    #[test]
    fn metadata_overrides_defaults() {
        let metadata = dict! { "title" => "T", "date" => "yesterday", "site_title" => "Mine" };
        let ctx = Context::page(&Dict::new(), morning(), "Site", &metadata);
        assert_eq!(ctx.get(DATE).and_then(Value::as_str), Some("yesterday"));
        assert_eq!(ctx.get(SITE_TITLE).and_then(Value::as_str), Some("Mine"));
    }

    #[test]
    fn contexts_are_immutable() {
        let base = Context::new().with("a", 1);
        let derived = base.with("b", 2).merge(&dict! { "a" => 3 });

        assert_eq!(base.as_dict().len(), 1);
        assert_eq!(base.get("a"), Some(&Value::Int(1)));
        assert_eq!(derived.get("a"), Some(&Value::Int(3)));
        assert_eq!(derived.get("b"), Some(&Value::Int(2)));
    }

    #[test]
    fn fixed_clock() {
        assert_eq!(FixedClock(morning()).now(), morning());
    }
}
