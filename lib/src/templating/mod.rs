pub mod mustache;
pub mod minijinja;

use std::fmt::Debug;

use crate::context::Context;
use crate::error::Result;

pub use self::minijinja::MiniJinjaEngine;

/// A mustache-style substitution engine.
pub trait Engine: Send + Sync + Debug {
    /// Renders `template_str` with the variables in `context`. `name`, when
    /// given, identifies the template in error messages.
    fn render_str(
        &self,
        name: Option<&str>,
        template_str: &str,
        context: &Context,
    ) -> Result<String>;
}
