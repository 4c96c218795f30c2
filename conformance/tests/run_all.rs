//! End-to-end conformance of compiled models.

use milestone_compiler::shape::TEMPORAL_PROFILE;
use milestone_compiler::{compile, CompileOptions, CoreSymbols, RangeFilter};
use milestone_conformance::{run_all, run_all_with, Severity};
use milestone_model::{
    Association, Class, Model, Multiplicity, Property, PropertyOwner, StereotypeRef, TypeRef,
};
use proptest::prelude::*;

fn class(path: &str, shape: Option<&str>) -> Class {
    let mut class = Class::new(path);
    if let Some(shape) = shape {
        class
            .stereotypes
            .push(StereotypeRef::new(TEMPORAL_PROFILE, shape));
    }
    class
}

fn edge(owner: &str, name: &str, target: &str, multiplicity: Multiplicity) -> Property {
    Property::new(
        name,
        TypeRef::class(target),
        multiplicity,
        PropertyOwner::Class(owner.into()),
    )
}

/// Trade (bi) -> Book (processing) -> Desk (business); Trader (none) bound to
/// Book through an association.
fn trading() -> Model {
    let mut trade = class("model::Trade", Some("bitemporal"));
    trade.properties.push(edge(
        "model::Trade",
        "book",
        "model::Book",
        Multiplicity::ONE,
    ));
    let mut book = class("model::Book", Some("processingtemporal"));
    book.properties.push(edge(
        "model::Book",
        "desk",
        "model::Desk",
        Multiplicity::ZERO_ONE,
    ));
    let mut model = Model::new();
    model.add_class(trade);
    model.add_class(book);
    model.add_class(class("model::Desk", Some("businesstemporal")));
    model.add_class(class("model::Trader", None));
    let owner = PropertyOwner::Association("model::Coverage".into());
    model.add_association(Association::new(
        "model::Coverage",
        vec![
            Property::new(
                "books",
                TypeRef::class("model::Book"),
                Multiplicity::ZERO_MANY,
                owner.clone(),
            ),
            Property::new(
                "trader",
                TypeRef::class("model::Trader"),
                Multiplicity::ONE,
                owner,
            ),
        ],
    ));
    model
}

// =============================================================================
// Fixed models
// =============================================================================

#[test]
fn compiled_trading_model_conforms() {
    let mut model = trading();
    assert!(compile(&mut model, &CoreSymbols, &CompileOptions::default()).is_ok());
    let report = run_all(&model);
    let failures: Vec<_> = report.failures().collect();
    assert!(failures.is_empty(), "{failures:#?}");
    assert!(report.results.iter().all(|r| r.severity == Severity::Pass));
}

#[test]
fn half_open_compilation_conforms() {
    let options = CompileOptions {
        range_filter: RangeFilter::HalfOpen,
        strict_shapes: false,
    };
    let mut model = trading();
    assert!(compile(&mut model, &CoreSymbols, &options).is_ok());
    assert!(run_all_with(&model, &options).all_passed());
}

#[test]
fn uncompiled_trading_model_fails() {
    let report = run_all(&trading());
    let failed: Vec<&str> = report.failures().map(|r| r.validator.as_str()).collect();
    assert_eq!(
        failed,
        vec!["milestoning/shapes", "milestoning/idempotence"]
    );
}

#[test]
fn empty_model_conforms() {
    let report = run_all(&Model::new());
    assert_eq!(report.results.len(), 4);
    assert!(report.all_passed());
}

// =============================================================================
// Generated models
// =============================================================================

const CLASSES: usize = 4;

fn shape_name() -> impl Strategy<Value = Option<&'static str>> {
    prop_oneof![
        Just(None),
        Just(Some("businesstemporal")),
        Just(Some("processingtemporal")),
        Just(Some("bitemporal")),
    ]
}

prop_compose! {
    fn model()(
        shapes in prop::collection::vec(shape_name(), CLASSES),
        edges in prop::collection::vec((0..CLASSES, 0..CLASSES), 0..8),
    ) -> Model {
        let mut classes: Vec<_> = shapes
            .iter()
            .enumerate()
            .map(|(i, shape)| class(&format!("model::C{i}"), *shape))
            .collect();
        for (n, (from, to)) in edges.into_iter().enumerate() {
            let owner = format!("model::C{from}");
            let target = format!("model::C{to}");
            classes[from]
                .properties
                .push(edge(&owner, &format!("p{n}"), &target, Multiplicity::ZERO_ONE));
        }
        let mut model = Model::new();
        for class in classes {
            model.add_class(class);
        }
        model
    }
}

proptest! {
    /// Every compiled model passes every validator.
    #[test]
    fn prop_compiled_models_conform(mut model in model()) {
        prop_assert!(compile(&mut model, &CoreSymbols, &CompileOptions::default()).is_ok());
        let report = run_all(&model);
        let failures: Vec<_> = report.failures().cloned().collect();
        prop_assert!(failures.is_empty(), "{:#?}", failures);
    }
}
