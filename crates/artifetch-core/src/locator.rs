//! Dependency locator parsing
//!
//! A locator is a URI-shaped string. Locators using the managed scheme name an
//! artifact coordinate plus resolution options:
//!
//! ```text
//! mvn://org.example:lib-a:1.0.0?scope=test&transitive=false&exclude=org.bad:evil
//! └┬┘   └──────────┬─────────┘ └──────────────────────┬────────────────────────┘
//! scheme      coordinate                        query options
//! ```
//!
//! Any other scheme (`https://…/x.jar`, `file:///…`) is a direct link. Direct
//! links are kept verbatim and carry no further structure.
//!
//! ## Query options
//!
//! | key          | default     | notes                                        |
//! |--------------|-------------|----------------------------------------------|
//! | `scope`      | `compile`   | empty value also means `compile`             |
//! | `transitive` | `true`      | only a case-insensitive `true` is true       |
//! | `exclude`    | none        | repeatable, `group:artifact` with `*`        |
//!
//! The `transitive` coercion is lenient: `transitive=yes` and
//! `transitive=1` both mean **false**.

use crate::artifact::{Coordinate, ExclusionPattern};
use crate::error::LocatorError;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Scheme reserved for managed coordinates.
pub const MAVEN_SCHEME: &str = "mvn";

pub const SCOPE_KEY: &str = "scope";
pub const TRANSITIVE_KEY: &str = "transitive";
pub const EXCLUDE_KEY: &str = "exclude";

pub const DEFAULT_SCOPE: &str = "compile";

/// Ordered multimap of decoded query keys to their values
///
/// Keys keep first-seen order, values keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: Vec<(String, Vec<String>)>,
}

impl QueryParams {
    pub fn push(&mut self, key: String, value: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }

    pub fn get_first(&self, key: &str) -> Option<&str> {
        self.get_all(key).first().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(k, values)| (k.as_str(), values.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocatorKind {
    /// Resolved through the external repository service
    Managed(Coordinate),
    /// Passed through untouched
    Direct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyLocator {
    raw: String,
    scheme: String,
    authority: Option<String>,
    query: QueryParams,
    kind: LocatorKind,
}

impl DependencyLocator {
    /// Parse a single locator string
    ///
    /// # Errors
    ///
    /// - [`LocatorError::MissingScheme`] when the string has no `scheme:` prefix
    /// - [`LocatorError::InvalidCoordinate`] when a managed authority is malformed
    /// - [`LocatorError::MissingPairSeparator`] / [`LocatorError::InvalidPercentEncoding`]
    ///   when a managed query is malformed
    pub fn parse(locator: &str) -> Result<Self, LocatorError> {
        let (scheme, rest) = split_scheme(locator).ok_or_else(|| LocatorError::MissingScheme {
            locator: locator.to_string(),
        })?;

        if !scheme.eq_ignore_ascii_case(MAVEN_SCHEME) {
            return Ok(Self {
                raw: locator.to_string(),
                scheme: scheme.to_string(),
                authority: authority_of(rest).map(|(authority, _)| authority.to_string()),
                query: QueryParams::default(),
                kind: LocatorKind::Direct,
            });
        }

        // Drop the fragment, it carries nothing for managed locators
        let rest = rest.split_once('#').map_or(rest, |(before, _)| before);

        let hier = rest.strip_prefix("//").unwrap_or(rest);
        let (authority, tail) = hier.split_at(hier.find(['/', '?']).unwrap_or(hier.len()));
        let coordinate =
            Coordinate::parse(authority).map_err(|reason| LocatorError::InvalidCoordinate {
                locator: locator.to_string(),
                authority: authority.to_string(),
                reason,
            })?;

        let query = match tail.split_once('?') {
            Some((_, query)) => parse_query(locator, query)?,
            None => QueryParams::default(),
        };

        Ok(Self {
            raw: locator.to_string(),
            scheme: scheme.to_string(),
            authority: Some(authority.to_string()),
            query,
            kind: LocatorKind::Managed(coordinate),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn authority(&self) -> Option<&str> {
        self.authority.as_deref()
    }

    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    pub fn kind(&self) -> &LocatorKind {
        &self.kind
    }

    pub fn is_managed(&self) -> bool {
        matches!(self.kind, LocatorKind::Managed(_))
    }

    pub fn coordinate(&self) -> Option<&Coordinate> {
        match &self.kind {
            LocatorKind::Managed(coordinate) => Some(coordinate),
            LocatorKind::Direct => None,
        }
    }

    pub fn scope(&self) -> &str {
        match self.query.get_first(SCOPE_KEY) {
            Some(scope) if !scope.is_empty() => scope,
            _ => DEFAULT_SCOPE,
        }
    }

    pub fn is_transitive(&self) -> bool {
        self.query
            .get_first(TRANSITIVE_KEY)
            .map_or(true, |value| value.eq_ignore_ascii_case("true"))
    }

    pub fn exclusions(&self) -> impl Iterator<Item = ExclusionPattern> + '_ {
        self.query
            .get_all(EXCLUDE_KEY)
            .iter()
            .map(|pattern| ExclusionPattern::new(pattern.as_str()))
    }

    /// Sort key: the locator text with a lower-cased scheme
    pub fn canonical_form(&self) -> String {
        let rest = &self.raw[self.scheme.len()..];
        format!("{}{}", self.scheme.to_ascii_lowercase(), rest)
    }
}

impl FromStr for DependencyLocator {
    type Err = LocatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DependencyLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PartialOrd for DependencyLocator {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DependencyLocator {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical_form()
            .cmp(&other.canonical_form())
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

/// Parse a batch of locators, failing on the first malformed one
pub fn parse_all<I, S>(locators: I) -> Result<Vec<DependencyLocator>, LocatorError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    locators
        .into_iter()
        .map(|locator| DependencyLocator::parse(locator.as_ref()))
        .collect()
}

/// Split `scheme:rest`, validating the scheme grammar
fn split_scheme(locator: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = locator.split_once(':')?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        return None;
    }
    Some((scheme, rest))
}

/// `//authority/path?query` → (`authority`, `/path?query`)
fn authority_of(rest: &str) -> Option<(&str, &str)> {
    let hier = rest.strip_prefix("//")?;
    let end = hier.find(['/', '?', '#']).unwrap_or(hier.len());
    Some(hier.split_at(end))
}

fn parse_query(locator: &str, query: &str) -> Result<QueryParams, LocatorError> {
    let mut params = QueryParams::default();
    if query.is_empty() {
        return Ok(params);
    }

    let mut pairs: Vec<&str> = query.split('&').collect();
    // Trailing separators produce empty pairs that carry nothing
    while pairs.last().is_some_and(|pair| pair.is_empty()) {
        pairs.pop();
    }

    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| LocatorError::MissingPairSeparator {
                locator: locator.to_string(),
                pair: pair.to_string(),
            })?;

        params.push(decode(locator, key)?, decode(locator, value)?);
    }

    Ok(params)
}

/// Form-style percent decoding: `+` is a space, `%XX` must be complete and
/// the result must be UTF-8.
fn decode(locator: &str, component: &str) -> Result<String, LocatorError> {
    let invalid = |fragment: &str| LocatorError::InvalidPercentEncoding {
        locator: locator.to_string(),
        fragment: fragment.to_string(),
    };

    let bytes = component.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let escape = bytes.get(i + 1..i + 3);
            if !escape.is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit)) {
                let end = (i + 3).min(bytes.len());
                return Err(invalid(&String::from_utf8_lossy(&bytes[i..end])));
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    let spaced = component.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| invalid(component))
}
