//! Turn resolver failures into messages that name what was being resolved
//!
//! The message depends on the request in flight, never on the concrete error
//! variant, so listeners and callers always see which locators failed.

use crate::categorize::ManagedDependency;
use crate::error::ResolverError;

/// The request a failure belongs to
#[derive(Debug, Clone, Copy)]
pub enum RequestContext<'a> {
    Transitive(&'a [ManagedDependency]),
    Single(&'a ManagedDependency),
}

impl RequestContext<'_> {
    pub fn locators(&self) -> Vec<&str> {
        match self {
            RequestContext::Transitive(deps) => deps.iter().map(|d| d.locator.as_str()).collect(),
            RequestContext::Single(dep) => vec![dep.locator.as_str()],
        }
    }
}

pub fn describe_failure(context: &RequestContext<'_>, error: &ResolverError) -> String {
    match context {
        RequestContext::Transitive(_) => format!(
            "error while resolving dependencies [{}]: {}",
            context.locators().join(", "),
            error
        ),
        RequestContext::Single(dep) => format!(
            "error while resolving dependency {}: {}",
            dep.locator, error
        ),
    }
}
