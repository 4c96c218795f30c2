//! Compile options.

use serde::Deserialize;

/// How the range accessor selects versions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RangeFilter {
    /// Versions whose date equals `start`. `end` is accepted but unused.
    #[default]
    StartEquality,
    /// Versions with `start <= date < end`.
    HalfOpen,
}

impl RangeFilter {
    /// Parses the kebab-case option name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<RangeFilter> {
        match name {
            "start-equality" => Some(RangeFilter::StartEquality),
            "half-open" => Some(RangeFilter::HalfOpen),
            _ => None,
        }
    }
}

/// Options for one compilation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompileOptions {
    /// Range accessor filter.
    pub range_filter: RangeFilter,
    /// Reject classes carrying more than one temporal stereotype.
    pub strict_shapes: bool,
}
