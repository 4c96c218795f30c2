//! Rewriting of properties that target temporal classes.
//!
//! Each such property is replaced in place by its edge point, its generated
//! accessors are appended to the qualified properties, and the original is
//! recorded as milestoned. Rewrites build new member lists and swap them in;
//! existing lists are never edited while they are being read.

use log::debug;
use milestone_model::{Class, Model, Property, QualifiedProperty, TypeRef};

use crate::error::CompileError;
use crate::expr::{AccessorBuilder, AccessorForm};
use crate::generated::is_generated;
use crate::naming::{edge_point_property_name, GENERATED_PROPERTY_TAG, MILESTONING_PROFILE};
use crate::options::CompileOptions;
use crate::shape::{classify, TemporalShape};
use crate::symbols::SymbolService;

/// The lists one rewrite reads and replaces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberLists {
    /// Plain properties.
    pub properties: Vec<Property>,
    /// Qualified properties.
    pub qualified_properties: Vec<QualifiedProperty>,
    /// Properties already replaced by edge points.
    pub original_milestoned_properties: Vec<Property>,
}

impl MemberLists {
    /// A class's declared lists.
    #[must_use]
    pub fn of_class(class: &Class) -> Self {
        Self {
            properties: class.properties.clone(),
            qualified_properties: class.qualified_properties.clone(),
            original_milestoned_properties: class.original_milestoned_properties.clone(),
        }
    }

    /// Swaps the lists into `class`.
    pub fn install_into_class(self, class: &mut Class) {
        class.properties = self.properties;
        class.qualified_properties = self.qualified_properties;
        class.original_milestoned_properties = self.original_milestoned_properties;
    }
}

/// The result of rewriting one set of member lists.
#[derive(Debug, Clone, PartialEq)]
pub struct Rewrite {
    /// The replacement lists.
    pub lists: MemberLists,
    /// Names of the properties that were milestoned, in list order.
    pub milestoned: Vec<String>,
    /// Number of accessors added.
    pub accessors_added: usize,
}

/// Rewrites every non-generated property in `lists` whose target is temporal.
///
/// `source_class` maps a property to the path of the class its accessors are
/// exposed on; properties it maps to `None` are left alone.
///
/// # Errors
///
/// Returns [`CompileError::UnknownSymbol`] if a built-in cannot be resolved.
pub fn rewrite_members<F>(
    model: &Model,
    symbols: &dyn SymbolService,
    options: &CompileOptions,
    lists: &MemberLists,
    source_class: F,
) -> Result<Rewrite, CompileError>
where
    F: Fn(&Property) -> Option<String>,
{
    let generated_tag = symbols.resolve_stereotype(MILESTONING_PROFILE, GENERATED_PROPERTY_TAG)?;
    let mut properties = Vec::with_capacity(lists.properties.len());
    let mut qualified_properties = lists.qualified_properties.clone();
    let mut originals = lists.original_milestoned_properties.clone();
    let mut milestoned = Vec::new();
    let mut accessors_added = 0;

    for property in &lists.properties {
        let Some((target, target_shape)) = temporal_target(model, property) else {
            properties.push(property.clone());
            continue;
        };
        let Some(source_path) = source_class(property) else {
            properties.push(property.clone());
            continue;
        };
        let source_shape = model
            .class(&source_path)
            .and_then(|class| classify(&class.stereotypes));

        let mut edge_point = property.clone();
        edge_point.name = edge_point_property_name(&property.name);
        edge_point.multiplicity = property.multiplicity.with_unbounded_upper();
        edge_point.stereotypes.push(generated_tag.clone());
        properties.push(edge_point);

        let builder =
            AccessorBuilder::new(symbols, &source_path, &target.path, target_shape, property);
        for form in accessor_forms(source_shape, target_shape, options) {
            let accessor = builder.build(form)?;
            let exists = qualified_properties
                .iter()
                .any(|q| q.name == accessor.name && q.arity() == accessor.arity());
            if !exists {
                qualified_properties.push(accessor);
                accessors_added += 1;
            }
        }

        if !originals.iter().any(|o| o.name == property.name) {
            originals.push(property.clone());
        }
        milestoned.push(property.name.clone());
    }

    Ok(Rewrite {
        lists: MemberLists {
            properties,
            qualified_properties,
            original_milestoned_properties: originals,
        },
        milestoned,
        accessors_added,
    })
}

/// The accessor forms generated for a `source_shape` to `target_shape` edge.
#[must_use]
pub fn accessor_forms(
    source_shape: Option<TemporalShape>,
    target_shape: TemporalShape,
    options: &CompileOptions,
) -> Vec<AccessorForm> {
    let mut forms = vec![AccessorForm::AllDates];
    let no_arg = match source_shape {
        Some(TemporalShape::Bitemporal) => true,
        Some(source) => source == target_shape,
        None => false,
    };
    if no_arg {
        forms.push(AccessorForm::NoArg);
    }
    if target_shape.is_uni_temporal() {
        forms.push(AccessorForm::Range(options.range_filter));
    }
    forms
}

fn temporal_target<'m>(model: &'m Model, property: &Property) -> Option<(&'m Class, TemporalShape)> {
    if is_generated(property) {
        return None;
    }
    let target = model.resolve_class(&property.generic_type)?;
    let shape = classify(&target.stereotypes)?;
    Some((target, shape))
}

/// Rewrites a class's declared properties. Returns the number of milestoned
/// properties.
///
/// # Errors
///
/// Returns [`CompileError::UnknownClass`] if `path` is not in the model, or
/// any error from [`rewrite_members`].
pub fn rewrite_class(
    model: &mut Model,
    path: &str,
    symbols: &dyn SymbolService,
    options: &CompileOptions,
) -> Result<usize, CompileError> {
    let class = model.class(path).ok_or_else(|| CompileError::UnknownClass {
        path: path.to_string(),
    })?;
    let lists = MemberLists::of_class(class);
    let owner = class.path.clone();
    let rewrite = rewrite_members(model, symbols, options, &lists, |_| Some(owner.clone()))?;
    let count = rewrite.milestoned.len();
    if count > 0 {
        debug!(
            "{path}: milestoned [{}], {} accessor(s) added",
            rewrite.milestoned.join(", "),
            rewrite.accessors_added
        );
        if let Some(class) = model.class_mut(path) {
            rewrite.lists.install_into_class(class);
        }
    }
    Ok(count)
}

/// Rewrites an association's ends, then refreshes both member classes' views.
/// Returns the number of milestoned ends.
///
/// # Errors
///
/// Returns [`CompileError::UnknownAssociation`] if `path` is not in the model,
/// or any error from [`rewrite_members`].
pub fn rewrite_association(
    model: &mut Model,
    path: &str,
    symbols: &dyn SymbolService,
    options: &CompileOptions,
) -> Result<usize, CompileError> {
    let association = model
        .association(path)
        .ok_or_else(|| CompileError::UnknownAssociation {
            path: path.to_string(),
        })?;
    let lists = MemberLists {
        properties: association.properties.clone(),
        qualified_properties: association.qualified_properties.clone(),
        original_milestoned_properties: association.original_milestoned_properties.clone(),
    };
    let rewrite = rewrite_members(model, symbols, options, &lists, |property| {
        let target = property.generic_type.class_path()?;
        let exposing = association.exposing_class(target)?;
        member_path(model, exposing)
    })?;
    let count = rewrite.milestoned.len();
    if count > 0 {
        debug!(
            "{path}: milestoned ends [{}], {} accessor(s) added",
            rewrite.milestoned.join(", "),
            rewrite.accessors_added
        );
        if let Some(association) = model.association_mut(path) {
            association.properties = rewrite.lists.properties;
            association.qualified_properties = rewrite.lists.qualified_properties;
            association.original_milestoned_properties =
                rewrite.lists.original_milestoned_properties;
        }
    }
    refresh_association_views(model, path)?;
    Ok(count)
}

/// Re-imports an association's lists into its member classes: entries owned
/// by the association are dropped from each member's views, then each
/// property is exposed on the class opposite its target.
///
/// # Errors
///
/// Returns [`CompileError::UnknownAssociation`] if `path` is not in the model.
pub fn refresh_association_views(model: &mut Model, path: &str) -> Result<(), CompileError> {
    let association = model
        .association(path)
        .cloned()
        .ok_or_else(|| CompileError::UnknownAssociation {
            path: path.to_string(),
        })?;

    let mut members: Vec<String> = association
        .members()
        .into_iter()
        .filter_map(|m| member_path(model, m))
        .collect();
    members.dedup();
    for member in &members {
        if let Some(class) = model.class_mut(member) {
            class
                .properties_from_associations
                .retain(|p| !p.owner.is_association(path));
            class
                .qualified_properties_from_associations
                .retain(|q| !q.owner.is_association(path));
            class
                .original_milestoned_properties
                .retain(|p| !p.owner.is_association(path));
        }
    }

    let exposing = |type_ref: &TypeRef| -> Option<String> {
        let target = type_ref.class_path()?;
        member_path(model, association.exposing_class(target)?)
    };
    let properties: Vec<(String, Property)> = association
        .properties
        .iter()
        .filter_map(|p| exposing(&p.generic_type).map(|e| (e, p.clone())))
        .collect();
    let qualified: Vec<(String, QualifiedProperty)> = association
        .qualified_properties
        .iter()
        .filter_map(|q| exposing(&q.generic_type).map(|e| (e, q.clone())))
        .collect();
    let originals: Vec<(String, Property)> = association
        .original_milestoned_properties
        .iter()
        .filter_map(|p| exposing(&p.generic_type).map(|e| (e, p.clone())))
        .collect();

    for (class_path, property) in properties {
        if let Some(class) = model.class_mut(&class_path) {
            class.properties_from_associations.push(property);
        }
    }
    for (class_path, qualified) in qualified {
        if let Some(class) = model.class_mut(&class_path) {
            class.qualified_properties_from_associations.push(qualified);
        }
    }
    for (class_path, original) in originals {
        if let Some(class) = model.class_mut(&class_path) {
            if !class
                .original_milestoned_properties
                .iter()
                .any(|o| o.name == original.name)
            {
                class.original_milestoned_properties.push(original);
            }
        }
    }
    Ok(())
}

/// Resolves an association member reference to a class path in the model.
fn member_path(model: &Model, reference: &str) -> Option<String> {
    model
        .resolve_class(&TypeRef::Stub(reference.to_string()))
        .map(|class| class.path.clone())
}
