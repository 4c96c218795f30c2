//! Milestoning date propagation at navigation call sites.
//!
//! A navigation to a generated accessor that omits dates gets them from the
//! milestoning context, from its receiver, or from both, according to the
//! shapes at either end of the edge. Resolved dates are spliced in after the
//! receiver and the navigation is retargeted to the accessor of matching
//! arity.

use log::trace;
use milestone_model::{
    Accessor, Class, ExprKind, Expression, Lambda, Model, Navigation, QualifiedProperty,
};

use crate::context::MilestoningContext;
use crate::error::CompileError;
use crate::generated::{is_all_versions_in_range_property, is_generated_qualified_property, target_shape};
use crate::shape::{classify, DateField, TemporalShape};

/// How many of a target's dates a call site supplies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppliedDates {
    /// Only the receiver.
    NoArgsSupplied,
    /// One date for a bi-temporal target.
    OneArgSupplied,
    /// Every date the target needs, or more.
    AllArgsSupplied,
}

impl SuppliedDates {
    /// Classifies `supplied` explicit arguments against a `target` shape.
    #[must_use]
    pub fn of(supplied: usize, target: TemporalShape) -> Self {
        match supplied {
            n if n >= target.date_fields().len() => SuppliedDates::AllArgsSupplied,
            0 => SuppliedDates::NoArgsSupplied,
            _ => SuppliedDates::OneArgSupplied,
        }
    }
}

/// Resolves every navigation in `expression`, innermost first, threading
/// `context` through the chain.
///
/// # Errors
///
/// Returns [`CompileError::MissingMilestoningDate`] when a navigation lacks
/// dates that cannot be propagated, or [`CompileError::AccessorNotFound`]
/// when no accessor of the resolved arity exists.
pub fn resolve_expression(
    model: &Model,
    expression: &Expression,
    context: &mut MilestoningContext,
) -> Result<Expression, CompileError> {
    let kind = match &expression.kind {
        ExprKind::Variable(_) | ExprKind::Literal(_) => expression.kind.clone(),
        ExprKind::Equal {
            function,
            left,
            right,
        } => ExprKind::Equal {
            function: function.clone(),
            left: Box::new(resolve_expression(model, left, context)?),
            right: Box::new(resolve_expression(model, right, context)?),
        },
        ExprKind::Compare {
            function,
            op,
            left,
            right,
        } => ExprKind::Compare {
            function: function.clone(),
            op: *op,
            left: Box::new(resolve_expression(model, left, context)?),
            right: Box::new(resolve_expression(model, right, context)?),
        },
        ExprKind::And { function, operands } => ExprKind::And {
            function: function.clone(),
            operands: operands
                .iter()
                .map(|operand| resolve_expression(model, operand, context))
                .collect::<Result<_, _>>()?,
        },
        ExprKind::Filter {
            function,
            source,
            predicate,
        } => {
            let source = resolve_expression(model, source, context)?;
            let body = resolve_expression(model, &predicate.body, context)?;
            ExprKind::Filter {
                function: function.clone(),
                source: Box::new(source),
                predicate: Box::new(Lambda {
                    body,
                    ..(**predicate).clone()
                }),
            }
        }
        ExprKind::Navigate(navigation) => {
            ExprKind::Navigate(resolve_navigation(model, navigation, context)?)
        }
    };
    Ok(Expression {
        kind,
        generic_type: expression.generic_type.clone(),
        multiplicity: expression.multiplicity,
    })
}

/// Resolves one navigation. Its receiver and arguments are resolved first.
///
/// # Errors
///
/// See [`resolve_expression`].
pub fn resolve_navigation(
    model: &Model,
    navigation: &Navigation,
    context: &mut MilestoningContext,
) -> Result<Navigation, CompileError> {
    let arguments = navigation
        .arguments
        .iter()
        .map(|argument| resolve_expression(model, argument, context))
        .collect::<Result<Vec<_>, _>>()?;
    let resolved = Navigation {
        arguments,
        ..navigation.clone()
    };

    let Some(owner) = model.class(&resolved.owner) else {
        return Ok(resolved);
    };
    let Some(accessor) = milestoned_accessor(owner, &resolved.property) else {
        return Ok(resolved);
    };
    let Some(target) = target_shape(model, accessor) else {
        return Ok(resolved);
    };
    let source = classify(&owner.stereotypes);
    let explicit = resolved.explicit_arguments();

    match SuppliedDates::of(explicit.len(), target) {
        SuppliedDates::AllArgsSupplied => {
            context.record_supplied(target, explicit);
            if explicit.len() == target.date_fields().len() {
                retarget(owner, resolved, None)
            } else {
                Ok(resolved)
            }
        }
        supplied => {
            let receiver = receiver_dates(model, &resolved);
            let dates = propagate(&resolved, source, target, supplied, &receiver, context)?;
            trace!(
                "{}.{}: {:?} {:?} -> {:?} resolved [{}]",
                resolved.owner,
                resolved.property,
                supplied,
                source,
                target,
                dates
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            context.enter(target, &dates);
            retarget(owner, resolved, Some(dates))
        }
    }
}

/// The generated date-taking accessor named `property`, if the navigation
/// targets a milestoned property.
fn milestoned_accessor<'c>(owner: &'c Class, property: &str) -> Option<&'c QualifiedProperty> {
    owner.all_qualified_properties().find(|q| {
        q.name == property
            && is_generated_qualified_property(q)
            && !is_all_versions_in_range_property(q)
    })
}

/// Dates bound by a receiver that is itself a dated navigation to a generated
/// accessor, keyed by axis.
fn receiver_dates(model: &Model, navigation: &Navigation) -> Vec<(DateField, Expression)> {
    let Some(receiver) = navigation.receiver().and_then(Expression::as_navigation) else {
        return Vec::new();
    };
    if !matches!(receiver.accessor, Accessor::Qualified { .. }) {
        return Vec::new();
    }
    let Some(owner) = model.class(&receiver.owner) else {
        return Vec::new();
    };
    let Some(shape) = milestoned_accessor(owner, &receiver.property)
        .and_then(|accessor| target_shape(model, accessor))
    else {
        return Vec::new();
    };
    let dates = receiver.explicit_arguments();
    if dates.len() != shape.date_fields().len() {
        return Vec::new();
    }
    shape
        .date_fields()
        .iter()
        .copied()
        .zip(dates.iter().cloned())
        .collect()
}

/// Fills the date slots of `target`, in parameter order.
fn propagate(
    navigation: &Navigation,
    source: Option<TemporalShape>,
    target: TemporalShape,
    supplied: SuppliedDates,
    receiver: &[(DateField, Expression)],
    context: &mut MilestoningContext,
) -> Result<Vec<Expression>, CompileError> {
    let explicit = navigation.explicit_arguments();
    let mut slots: Vec<Option<Expression>> = vec![None; target.date_fields().len()];

    let lookup = |field: DateField, context: &MilestoningContext| -> Option<Expression> {
        receiver
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, date)| date.clone())
            .or_else(|| context.date(field).cloned())
    };

    match (target, source, supplied) {
        (
            TemporalShape::Bitemporal,
            Some(TemporalShape::Bitemporal),
            SuppliedDates::OneArgSupplied,
        ) => {
            // The lone argument is taken as the business date.
            if let Some(business) = explicit.first() {
                context.set(DateField::BusinessDate, business.clone());
            }
            for field in target.date_fields() {
                slots[field.position()] = lookup(*field, context);
            }
            if let Some(business) = explicit.first() {
                slots[DateField::BusinessDate.position()] = Some(business.clone());
            }
        }
        (TemporalShape::Bitemporal, Some(source), SuppliedDates::OneArgSupplied)
            if source.is_uni_temporal() =>
        {
            let own = source.primary_date_field();
            slots[own.position()] = lookup(own, context);
            slots[own.other().position()] = explicit.first().cloned();
        }
        (
            TemporalShape::Bitemporal,
            Some(TemporalShape::Bitemporal),
            SuppliedDates::NoArgsSupplied,
        ) => {
            for field in target.date_fields() {
                slots[field.position()] = lookup(*field, context);
            }
        }
        (TemporalShape::Bitemporal, _, _) => {}
        (uni, source, SuppliedDates::NoArgsSupplied) => {
            let field = uni.primary_date_field();
            if source == Some(TemporalShape::Bitemporal) || source == Some(uni) {
                slots[0] = lookup(field, context);
            }
        }
        (_, _, _) => {}
    }

    let expected = || CompileError::MissingMilestoningDate {
        property: navigation.property.clone(),
        expected: target
            .date_property_names()
            .into_iter()
            .map(String::from)
            .collect(),
        source_information: navigation.source_information.clone(),
    };
    slots
        .into_iter()
        .map(|slot| slot.ok_or_else(&expected))
        .collect()
}

/// Splices `dates` after the receiver and points the navigation at the
/// generated accessor of the resulting arity.
fn retarget(
    owner: &Class,
    mut navigation: Navigation,
    dates: Option<Vec<Expression>>,
) -> Result<Navigation, CompileError> {
    if let Some(dates) = dates {
        if navigation.original_arguments.is_none() {
            navigation.original_arguments = Some(navigation.arguments.clone());
        }
        let receiver = navigation.arguments.into_iter().next();
        navigation.arguments = receiver.into_iter().chain(dates).collect();
    }
    let parameter_count = navigation.arguments.len();
    let found = owner.all_qualified_properties().any(|q| {
        q.name == navigation.property
            && q.arity() == parameter_count
            && is_generated_qualified_property(q)
    });
    if !found {
        return Err(CompileError::AccessorNotFound {
            property: navigation.property,
            owner: owner.path.clone(),
            parameter_count,
            source_information: navigation.source_information,
        });
    }
    navigation.accessor = Accessor::Qualified { parameter_count };
    Ok(navigation)
}
