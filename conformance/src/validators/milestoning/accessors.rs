//! Edge point and accessor conformance.
//!
//! For every property recorded as milestoned, the owner must expose exactly
//! one edge point that keeps the lower bound and lifts the upper bound, the
//! accessor set the source and target shapes call for, and no plain property
//! under the original name. Every generated edge point must in turn map back
//! to a recorded original.

use std::collections::BTreeSet;

use milestone_compiler::expr::AccessorForm;
use milestone_compiler::generated::{is_generated_milestoning_property, is_generated_qualified_property};
use milestone_compiler::naming::{
    edge_point_property_name, original_property_name, range_property_name,
};
use milestone_compiler::rewrite::accessor_forms;
use milestone_compiler::shape::classify;
use milestone_compiler::{CompileOptions, TemporalShape};
use milestone_model::{Model, Property, PropertyOwner, QualifiedProperty};

use super::member_class;
use crate::report::{ConformanceReport, TestResult};

const VALIDATOR: &str = "milestoning/accessors";

/// Checks the edge points and generated accessors of every milestoned
/// property, class-owned and association-owned.
#[must_use]
pub fn validate(model: &Model) -> ConformanceReport {
    let mut report = ConformanceReport::new();
    let mut violations: Vec<String> = Vec::new();

    for class in model.classes() {
        check_edge_points_recorded(
            &class.path,
            &class.properties,
            &class.original_milestoned_properties,
            &mut violations,
        );
        let source = classify(&class.stereotypes);
        for original in class
            .original_milestoned_properties
            .iter()
            .filter(|o| matches!(&o.owner, PropertyOwner::Class(p) if *p == class.path))
        {
            check_original(
                model,
                &class.path,
                source,
                &class.properties,
                &class.qualified_properties,
                original,
                &mut violations,
            );
        }
    }

    for association in model.associations() {
        check_edge_points_recorded(
            &association.path,
            &association.properties,
            &association.original_milestoned_properties,
            &mut violations,
        );
        for original in &association.original_milestoned_properties {
            let source = original
                .generic_type
                .class_path()
                .and_then(|target| association.exposing_class(target))
                .and_then(|exposing| member_class(model, exposing));
            let Some(source) = source else {
                violations.push(format!(
                    "{}.{} is not exposed on a member class",
                    association.path, original.name
                ));
                continue;
            };
            check_original(
                model,
                &association.path,
                classify(&source.stereotypes),
                &association.properties,
                &association.qualified_properties,
                original,
                &mut violations,
            );
        }
    }

    report.push(TestResult::from_violations(
        VALIDATOR,
        "Milestoned properties expose an edge point and their accessor set",
        "Edge point or accessor violations detected",
        violations,
    ));
    report
}

/// `(name, arity)` of the accessors generated for `original`.
fn expected_accessors(
    original: &Property,
    source: Option<TemporalShape>,
    target: TemporalShape,
) -> BTreeSet<(String, usize)> {
    accessor_forms(source, target, &CompileOptions::default())
        .into_iter()
        .map(|form| match form {
            AccessorForm::AllDates => (original.name.clone(), 1 + target.date_fields().len()),
            AccessorForm::NoArg => (original.name.clone(), 1),
            AccessorForm::Range(_) => (range_property_name(&original.name), 3),
        })
        .collect()
}

/// Generated edge points whose original is missing from `originals`.
fn check_edge_points_recorded(
    owner: &str,
    properties: &[Property],
    originals: &[Property],
    violations: &mut Vec<String>,
) {
    for edge in properties.iter().filter(|p| is_generated_milestoning_property(p)) {
        let Some(name) = original_property_name(&edge.name) else {
            continue;
        };
        if !originals.iter().any(|o| o.name == name) {
            violations.push(format!(
                "{owner}.{} has no recorded original `{name}`",
                edge.name
            ));
        }
    }
}

fn check_original(
    model: &Model,
    owner: &str,
    source: Option<TemporalShape>,
    properties: &[Property],
    qualified_properties: &[QualifiedProperty],
    original: &Property,
    violations: &mut Vec<String>,
) {
    let name = &original.name;

    let edge_name = edge_point_property_name(name);
    let edge_points: Vec<&Property> = properties.iter().filter(|p| p.name == edge_name).collect();
    match edge_points.as_slice() {
        [] => violations.push(format!("{owner}.{name} has no edge point `{edge_name}`")),
        [edge] => {
            if edge.multiplicity.lower != original.multiplicity.lower
                || !edge.multiplicity.is_unbounded()
            {
                violations.push(format!(
                    "{owner}.{edge_name} is {}, expected lower bound {} and no upper bound",
                    edge.multiplicity, original.multiplicity.lower
                ));
            }
            if !is_generated_milestoning_property(edge) {
                violations.push(format!("{owner}.{edge_name} is not tagged as generated"));
            }
        }
        _ => violations.push(format!("{owner}.{name} has {} edge points", edge_points.len())),
    }

    if properties.iter().any(|p| p.name == *name) {
        violations.push(format!("{owner}.{name} is still declared as a plain property"));
    }

    let Some(target) = model
        .resolve_class(&original.generic_type)
        .and_then(|class| classify(&class.stereotypes))
    else {
        violations.push(format!(
            "{owner}.{name} is milestoned but {} is not temporal",
            original.generic_type
        ));
        return;
    };

    let range_name = range_property_name(name);
    let expected = expected_accessors(original, source, target);
    let actual: BTreeSet<(String, usize)> = qualified_properties
        .iter()
        .filter(|q| is_generated_qualified_property(q) && (q.name == *name || q.name == range_name))
        .map(|q| (q.name.clone(), q.arity()))
        .collect();
    for (accessor, arity) in expected.difference(&actual) {
        violations.push(format!("{owner}.{accessor} lacks its {arity}-parameter accessor"));
    }
    for (accessor, arity) in actual.difference(&expected) {
        violations.push(format!("{owner}.{accessor} has an unexpected {arity}-parameter accessor"));
    }
}
