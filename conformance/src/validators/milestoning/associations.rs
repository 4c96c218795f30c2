//! Association view conformance.
//!
//! Each member class's association views must hold exactly the association's
//! entries exposed on it, in association order: an element targeting one
//! member is exposed on the other.

use std::collections::BTreeSet;

use milestone_model::{Association, Model, Property, TypeRef};

use super::member_class;
use crate::report::{ConformanceReport, TestResult};

const VALIDATOR: &str = "milestoning/associations";

/// Checks every association against its member classes' views.
#[must_use]
pub fn validate(model: &Model) -> ConformanceReport {
    let mut report = ConformanceReport::new();
    let mut violations: Vec<String> = Vec::new();

    for association in model.associations() {
        let mut members: Vec<String> = association
            .members()
            .into_iter()
            .filter_map(|m| member_class(model, m).map(|c| c.path.clone()))
            .collect();
        members.dedup();
        if members.is_empty() {
            violations.push(format!("{} has no member class in the model", association.path));
            continue;
        }

        for member in &members {
            let Some(class) = model.class(member) else {
                continue;
            };
            let expected: Vec<&str> = exposed_on(model, association, member, &association.properties);
            let actual: Vec<&str> = class
                .properties_from_associations
                .iter()
                .filter(|p| p.owner.is_association(&association.path))
                .map(|p| p.name.as_str())
                .collect();
            if expected != actual {
                violations.push(format!(
                    "{member} exposes [{}] from {}, expected [{}]",
                    actual.join(", "),
                    association.path,
                    expected.join(", ")
                ));
            }

            let expected = exposed_qualified_on(model, association, member);
            let actual: Vec<(&str, usize)> = class
                .qualified_properties_from_associations
                .iter()
                .filter(|q| q.owner.is_association(&association.path))
                .map(|q| (q.name.as_str(), q.arity()))
                .collect();
            if expected != actual {
                violations.push(format!(
                    "{member} exposes {} qualified properties from {}, expected {}",
                    actual.len(),
                    association.path,
                    expected.len()
                ));
            }

            let expected: BTreeSet<&str> = exposed_on(
                model,
                association,
                member,
                &association.original_milestoned_properties,
            )
            .into_iter()
            .collect();
            let actual: BTreeSet<&str> = class
                .original_milestoned_properties
                .iter()
                .filter(|p| p.owner.is_association(&association.path))
                .map(|p| p.name.as_str())
                .collect();
            if expected != actual {
                violations.push(format!(
                    "{member} records milestoned ends {actual:?} from {}, expected {expected:?}",
                    association.path
                ));
            }
        }
    }

    report.push(TestResult::from_violations(
        VALIDATOR,
        "Member class views mirror their associations",
        "Association view violations detected",
        violations,
    ));
    report
}

fn exposes(model: &Model, association: &Association, member: &str, target: &TypeRef) -> bool {
    target
        .class_path()
        .and_then(|t| association.exposing_class(t))
        .and_then(|exposing| member_class(model, exposing))
        .is_some_and(|class| class.path == member)
}

fn exposed_on<'a>(
    model: &Model,
    association: &Association,
    member: &str,
    properties: &'a [Property],
) -> Vec<&'a str> {
    properties
        .iter()
        .filter(|p| exposes(model, association, member, &p.generic_type))
        .map(|p| p.name.as_str())
        .collect()
}

fn exposed_qualified_on<'a>(
    model: &Model,
    association: &'a Association,
    member: &str,
) -> Vec<(&'a str, usize)> {
    association
        .qualified_properties
        .iter()
        .filter(|q| exposes(model, association, member, &q.generic_type))
        .map(|q| (q.name.as_str(), q.arity()))
        .collect()
}
