//! Queries over members the pass generated.

use milestone_model::{Model, Property, QualifiedProperty};

use crate::error::CompileError;
use crate::naming::{is_range_property_name, GENERATED_DATE_PROPERTY_TAG, GENERATED_PROPERTY_TAG};
use crate::shape::{classify, TemporalShape};

/// Edge points carry this tag.
#[must_use]
pub fn is_generated_milestoning_property(property: &Property) -> bool {
    property.has_stereotype(GENERATED_PROPERTY_TAG)
}

/// Synthesized date and range-relation properties carry this tag.
#[must_use]
pub fn is_generated_milestoning_date_property(property: &Property) -> bool {
    property.has_stereotype(GENERATED_DATE_PROPERTY_TAG)
}

/// Properties the rewriter never touches.
#[must_use]
pub fn is_generated(property: &Property) -> bool {
    is_generated_milestoning_property(property) || is_generated_milestoning_date_property(property)
}

/// Any accessor generated for a milestoned property.
#[must_use]
pub fn is_generated_qualified_property(qualified: &QualifiedProperty) -> bool {
    qualified.has_stereotype(GENERATED_PROPERTY_TAG)
}

/// The generated `(start, end)` range accessor.
#[must_use]
pub fn is_all_versions_in_range_property(qualified: &QualifiedProperty) -> bool {
    is_generated_qualified_property(qualified) && is_range_property_name(&qualified.name)
}

/// Shape of the class a generated accessor returns.
#[must_use]
pub fn target_shape(model: &Model, qualified: &QualifiedProperty) -> Option<TemporalShape> {
    model
        .resolve_class(&qualified.generic_type)
        .and_then(|class| classify(&class.stereotypes))
}

/// Parameter count, receiver included, at which a generated accessor has
/// every date it needs.
///
/// # Errors
///
/// Returns [`CompileError::NotMilestoned`] when `qualified` was not generated
/// by the pass or its return type is not temporal.
pub fn required_parameter_count(
    model: &Model,
    qualified: &QualifiedProperty,
) -> Result<usize, CompileError> {
    let not_milestoned = || CompileError::NotMilestoned {
        property: qualified.name.clone(),
    };
    if !is_generated_qualified_property(qualified) {
        return Err(not_milestoned());
    }
    let shape = target_shape(model, qualified).ok_or_else(not_milestoned)?;
    Ok(1 + shape.date_fields().len())
}

/// Returns true when a call with `parameter_count` parameters (receiver
/// included) to a generated accessor lacks dates. Other members never do.
#[must_use]
pub fn has_missing_dates(model: &Model, qualified: &QualifiedProperty, parameter_count: usize) -> bool {
    if !is_generated_qualified_property(qualified) || is_all_versions_in_range_property(qualified) {
        return false;
    }
    required_parameter_count(model, qualified).is_ok_and(|required| parameter_count != required)
}
