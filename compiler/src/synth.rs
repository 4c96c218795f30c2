//! Synthesis of milestoning date properties on temporal classes.

use log::debug;
use milestone_model::{Class, Property, PropertyOwner, TypeRef};

use crate::error::CompileError;
use crate::naming::{GENERATED_DATE_PROPERTY_TAG, MILESTONING_PROFILE, RANGE_RELATION_PROPERTY};
use crate::shape::TemporalShape;
use crate::symbols::SymbolService;

/// The date properties and range-relation property a class of `shape` carries.
///
/// # Errors
///
/// Returns [`CompileError::UnknownSymbol`] if a built-in cannot be resolved.
pub fn milestoning_properties(
    class: &Class,
    shape: TemporalShape,
    symbols: &dyn SymbolService,
) -> Result<Vec<Property>, CompileError> {
    let tag = symbols.resolve_stereotype(MILESTONING_PROFILE, GENERATED_DATE_PROPERTY_TAG)?;
    let date_type = symbols.resolve_type("Date")?;
    let one = symbols.resolve_multiplicity("one")?;
    let owner = PropertyOwner::Class(class.path.clone());

    let mut generated: Vec<Property> = shape
        .date_fields()
        .iter()
        .map(|field| {
            let mut property = Property::new(field.name(), date_type.clone(), one, owner.clone());
            property.stereotypes.push(tag.clone());
            property
        })
        .collect();

    let mut range = Property::new(
        RANGE_RELATION_PROPERTY,
        TypeRef::class(shape.range_class()),
        symbols.resolve_multiplicity("zeroone")?,
        owner,
    );
    range.stereotypes.push(tag);
    generated.push(range);
    Ok(generated)
}

/// Appends the milestoning properties of `shape` to the class, skipping names
/// the class already declares. Returns how many were added.
///
/// # Errors
///
/// Returns [`CompileError::UnknownSymbol`] if a built-in cannot be resolved.
pub fn synthesize(
    class: &mut Class,
    shape: TemporalShape,
    symbols: &dyn SymbolService,
) -> Result<usize, CompileError> {
    let generated = milestoning_properties(class, shape, symbols)?;
    let mut properties = class.properties.clone();
    let mut added = 0;
    for property in generated {
        if properties.iter().any(|p| p.name == property.name) {
            continue;
        }
        properties.push(property);
        added += 1;
    }
    if added > 0 {
        debug!(
            "{}: synthesized {added} {} milestoning propert{}",
            class.path,
            shape.stereotype_name(),
            if added == 1 { "y" } else { "ies" }
        );
        class.properties = properties;
    }
    Ok(added)
}
