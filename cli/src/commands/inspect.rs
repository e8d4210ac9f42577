//! `artifetch inspect`: show how a batch would be resolved

use crate::config;
use anyhow::{Context, Result};
use artifetch_core::{CategorizedRequest, ExclusionPattern, ManagedDependency, categorize, parse_all};
use std::fmt::Write;

pub fn run(locators: &[String]) -> Result<()> {
    let locators = parse_all(locators).context("Invalid dependency locator")?;
    let config = config::load_config().context("Failed to load config")?;

    let request = categorize(locators).with_additional_exclusions(
        config.default_exclusions.iter().map(ExclusionPattern::new),
    );

    print!("{}", render(&request));
    Ok(())
}

/// Human readable view of a categorized request
pub fn render(request: &CategorizedRequest) -> String {
    let mut out = String::new();

    section(&mut out, "Transitive", request.transitive(), describe_managed);
    section(&mut out, "Single", request.single(), describe_managed);
    section(&mut out, "Exclusions", request.exclusions(), |p| p.to_string());
    section(&mut out, "Direct links", request.direct_links(), |l| l.to_string());

    out
}

fn describe_managed(dependency: &ManagedDependency) -> String {
    format!(
        "{} [{}] ({})",
        dependency.coordinate, dependency.scope, dependency.locator
    )
}

fn section<T>(out: &mut String, title: &str, items: &[T], describe: impl Fn(&T) -> String) {
    let _ = writeln!(out, "{} ({}):", title, items.len());
    if items.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for item in items {
        let _ = writeln!(out, "  {}", describe(item));
    }
}
