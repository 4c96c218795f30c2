//! Generated member names and tags.
//!
//! Deterministic mappings from a milestoned property name to the names of the
//! members generated for it.

/// Profile that declares the generated-member stereotypes.
pub const MILESTONING_PROFILE: &str = "meta::pure::profiles::milestoning";

/// Stereotype on edge points and generated accessors.
pub const GENERATED_PROPERTY_TAG: &str = "generatedmilestoningproperty";

/// Stereotype on synthesized date and range-relation properties.
pub const GENERATED_DATE_PROPERTY_TAG: &str = "generatedmilestoningdateproperty";

/// Name of the synthesized range-relation property.
pub const RANGE_RELATION_PROPERTY: &str = "milestoning";

/// Name of the lambda parameter in generated filters.
pub const FILTER_VARIABLE: &str = "v_milestoning";

/// Name of the implicit receiver parameter.
pub const THIS: &str = "this";

/// Range accessor parameter names.
pub const RANGE_START: &str = "start";
/// See [`RANGE_START`].
pub const RANGE_END: &str = "end";

const EDGE_POINT_SUFFIX: &str = "AllVersions";
const RANGE_SUFFIX: &str = "AllVersionsInRange";

/// Edge-point name for a property: `address` → `addressAllVersions`.
#[must_use]
pub fn edge_point_property_name(name: &str) -> String {
    format!("{name}{EDGE_POINT_SUFFIX}")
}

/// Range accessor name for a property: `address` → `addressAllVersionsInRange`.
#[must_use]
pub fn range_property_name(name: &str) -> String {
    format!("{name}{RANGE_SUFFIX}")
}

/// Returns true for names produced by [`range_property_name`].
#[must_use]
pub fn is_range_property_name(name: &str) -> bool {
    name.len() > RANGE_SUFFIX.len() && name.ends_with(RANGE_SUFFIX)
}

/// Strips the edge-point suffix, when present.
#[must_use]
pub fn original_property_name(edge_point: &str) -> Option<&str> {
    edge_point
        .strip_suffix(EDGE_POINT_SUFFIX)
        .filter(|name| !name.is_empty())
}
