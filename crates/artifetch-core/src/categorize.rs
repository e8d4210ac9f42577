//! Partition a locator batch into resolution categories
//!
//! The batch is sorted first so that equal input sets always produce the same
//! requests in the same order, whatever order the caller passed them in.

use crate::artifact::{Coordinate, ExclusionPattern};
use crate::locator::DependencyLocator;

/// A managed locator together with the coordinate and scope it resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedDependency {
    pub locator: DependencyLocator,
    pub coordinate: Coordinate,
    pub scope: String,
}

/// The categorized form of one resolve call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorizedRequest {
    transitive: Vec<ManagedDependency>,
    single: Vec<ManagedDependency>,
    exclusions: Vec<ExclusionPattern>,
    direct_links: Vec<DependencyLocator>,
}

impl CategorizedRequest {
    /// Managed locators resolved together with their dependency graph
    pub fn transitive(&self) -> &[ManagedDependency] {
        &self.transitive
    }

    /// Managed locators resolved on their own, one request each
    pub fn single(&self) -> &[ManagedDependency] {
        &self.single
    }

    /// Exclusions collected from every managed locator of the batch
    ///
    /// They apply to the whole transitive resolution, not only to the locator
    /// that declared them.
    pub fn exclusions(&self) -> &[ExclusionPattern] {
        &self.exclusions
    }

    pub fn direct_links(&self) -> &[DependencyLocator] {
        &self.direct_links
    }

    pub fn has_managed(&self) -> bool {
        !self.transitive.is_empty() || !self.single.is_empty()
    }

    /// Append patterns after the batch's own, skipping duplicates
    pub fn with_additional_exclusions<I>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = ExclusionPattern>,
    {
        for pattern in patterns {
            push_unique(&mut self.exclusions, pattern);
        }
        self
    }
}

/// Sort and partition a batch of parsed locators
pub fn categorize<I>(locators: I) -> CategorizedRequest
where
    I: IntoIterator<Item = DependencyLocator>,
{
    let mut sorted: Vec<DependencyLocator> = locators.into_iter().collect();
    sorted.sort();

    let mut request = CategorizedRequest::default();

    for locator in sorted {
        let Some(coordinate) = locator.coordinate().cloned() else {
            request.direct_links.push(locator);
            continue;
        };

        for pattern in locator.exclusions() {
            push_unique(&mut request.exclusions, pattern);
        }

        let transitive = locator.is_transitive();
        let dependency = ManagedDependency {
            scope: locator.scope().to_string(),
            coordinate,
            locator,
        };

        if transitive {
            request.transitive.push(dependency);
        } else {
            request.single.push(dependency);
        }
    }

    request
}

fn push_unique(patterns: &mut Vec<ExclusionPattern>, pattern: ExclusionPattern) {
    if !patterns.contains(&pattern) {
        patterns.push(pattern);
    }
}
