//! Date property conformance.
//!
//! Every temporal class carries exactly its shape's date properties as
//! `Date[1]` plus `milestoning[0..1]` typed as the shape's range class, all
//! tagged as generated. Classes without a shape carry none of them.

use milestone_compiler::generated::is_generated_milestoning_date_property;
use milestone_compiler::naming::RANGE_RELATION_PROPERTY;
use milestone_compiler::shape::{classify, temporal_shapes};
use milestone_compiler::TemporalShape;
use milestone_model::{Class, Model, Multiplicity, Primitive, TypeRef};

use crate::report::{ConformanceReport, TestResult};

const VALIDATOR: &str = "milestoning/shapes";

/// Checks the synthesized date properties of every class.
#[must_use]
pub fn validate(model: &Model) -> ConformanceReport {
    let mut report = ConformanceReport::new();
    let mut violations: Vec<String> = Vec::new();
    let mut ambiguous: Vec<String> = Vec::new();

    for class in model.classes() {
        let shapes = temporal_shapes(&class.stereotypes);
        if shapes.len() > 1 {
            let names: Vec<&str> = shapes.iter().map(|s| s.stereotype_name()).collect();
            ambiguous.push(format!("{} ({})", class.path, names.join(", ")));
        }
        match classify(&class.stereotypes) {
            Some(shape) => check_temporal_class(class, shape, &mut violations),
            None => {
                for property in class
                    .properties
                    .iter()
                    .filter(|p| is_generated_milestoning_date_property(p))
                {
                    violations.push(format!(
                        "{} has no temporal stereotype but carries generated `{}`",
                        class.path, property.name
                    ));
                }
            }
        }
    }

    report.push(TestResult::from_violations(
        VALIDATOR,
        "Temporal classes carry exactly their shape's date properties",
        "Date property violations detected",
        violations,
    ));
    if !ambiguous.is_empty() {
        report.push(TestResult::warn_with_details(
            VALIDATOR,
            "Classes with several temporal stereotypes use the first declared",
            ambiguous,
        ));
    }
    report
}

fn check_temporal_class(class: &Class, shape: TemporalShape, violations: &mut Vec<String>) {
    let date_type = TypeRef::Primitive(Primitive::Date);
    let expected = shape.date_property_names();

    for name in &expected {
        let matching: Vec<_> = class.properties.iter().filter(|p| p.name == *name).collect();
        match matching.as_slice() {
            [] => violations.push(format!("{} lacks `{name}`", class.path)),
            [property] => {
                if property.generic_type != date_type || property.multiplicity != Multiplicity::ONE {
                    violations.push(format!(
                        "{}.{name} is {}{}, expected Date[1]",
                        class.path, property.generic_type, property.multiplicity
                    ));
                }
                if !is_generated_milestoning_date_property(property) {
                    violations.push(format!("{}.{name} is not tagged as generated", class.path));
                }
            }
            _ => violations.push(format!("{} declares `{name}` more than once", class.path)),
        }
    }

    match class
        .properties
        .iter()
        .find(|p| p.name == RANGE_RELATION_PROPERTY)
    {
        None => violations.push(format!(
            "{} lacks `{RANGE_RELATION_PROPERTY}`",
            class.path
        )),
        Some(range) => {
            if !range.generic_type.is_class(shape.range_class())
                || range.multiplicity != Multiplicity::ZERO_ONE
            {
                violations.push(format!(
                    "{}.{RANGE_RELATION_PROPERTY} is {}{}, expected {}[0..1]",
                    class.path,
                    range.generic_type,
                    range.multiplicity,
                    shape.range_class()
                ));
            }
            if !is_generated_milestoning_date_property(range) {
                violations.push(format!(
                    "{}.{RANGE_RELATION_PROPERTY} is not tagged as generated",
                    class.path
                ));
            }
        }
    }

    for property in class.properties.iter().filter(|p| {
        is_generated_milestoning_date_property(p)
            && p.name != RANGE_RELATION_PROPERTY
            && !expected.iter().any(|name| *name == p.name)
    }) {
        violations.push(format!(
            "{} is {} but carries `{}`",
            class.path,
            shape.stereotype_name(),
            property.name
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use milestone_compiler::shape::TEMPORAL_PROFILE;
    use milestone_compiler::{compile, CompileOptions, CoreSymbols};
    use milestone_model::StereotypeRef;

    fn temporal_class(path: &str, value: &str) -> Class {
        let mut class = Class::new(path);
        class
            .stereotypes
            .push(StereotypeRef::new(TEMPORAL_PROFILE, value));
        class
    }

    #[test]
    fn compiled_classes_conform() {
        let mut model = Model::new();
        model.add_class(temporal_class("model::Trade", "bitemporal"));
        model.add_class(temporal_class("model::Price", "processingtemporal"));
        model.add_class(Class::new("model::Desk"));
        assert!(compile(&mut model, &CoreSymbols, &CompileOptions::default()).is_ok());
        let report = validate(&model);
        assert!(report.all_passed(), "{:#?}", report.results);
        assert_eq!(report.results.len(), 1);
    }

    #[test]
    fn uncompiled_temporal_class_fails() {
        let mut model = Model::new();
        model.add_class(temporal_class("model::Trade", "businesstemporal"));
        let report = validate(&model);
        assert_eq!(report.failure_count(), 1);
        let details = &report.results[0].details;
        assert!(details.contains(&"model::Trade lacks `businessDate`".to_string()));
        assert!(details.contains(&"model::Trade lacks `milestoning`".to_string()));
    }

    #[test]
    fn several_stereotypes_warn() {
        let mut class = temporal_class("model::Trade", "businesstemporal");
        class
            .stereotypes
            .push(StereotypeRef::new(TEMPORAL_PROFILE, "processingtemporal"));
        let mut model = Model::new();
        model.add_class(class);
        assert!(compile(&mut model, &CoreSymbols, &CompileOptions::default()).is_ok());
        let report = validate(&model);
        assert!(report.all_passed());
        assert_eq!(report.results.len(), 2);
        assert_eq!(
            report.results[1].details,
            vec!["model::Trade (businesstemporal, processingtemporal)".to_string()]
        );
    }
}
