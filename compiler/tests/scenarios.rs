//! End-to-end milestoning scenarios over small models.

mod common;

use common::*;
use milestone_compiler::propagate::{resolve_expression, resolve_navigation};
use milestone_compiler::{
    compile, CompileError, CompileOptions, CoreSymbols, DateField, ErrorCategory,
    MilestoningContext, RangeFilter, TemporalShape,
};
use milestone_model::{
    Accessor, Expression, Model, Multiplicity, Navigation, Primitive, SourceInformation, TypeRef,
};
use serde::Deserialize;

fn compiled(mut model: Model) -> Model {
    compile(&mut model, &CoreSymbols, &CompileOptions::default()).expect("model compiles");
    model
}

fn ambient(processing: Option<&str>, business: Option<&str>) -> MilestoningContext {
    let mut context = MilestoningContext::new();
    if let Some(date) = processing {
        context.set(DateField::ProcessingDate, Expression::date(date));
    }
    if let Some(date) = business {
        context.set(DateField::BusinessDate, Expression::date(date));
    }
    context
}

fn navigation_of(expression: &Expression) -> &milestone_model::Navigation {
    expression.as_navigation().expect("navigation")
}

// =============================================================================
// Synthesis and rewriting
// =============================================================================

#[test]
fn scenario_a_unannotated_source_to_business_temporal_target() {
    let model = compiled(person_location());

    let location = model.class("model::Location").expect("Location");
    assert_eq!(property_names(location), vec!["businessDate", "milestoning"]);
    assert_eq!(
        location.properties[0].generic_type,
        TypeRef::Primitive(Primitive::Date)
    );
    assert_eq!(location.properties[0].multiplicity, Multiplicity::ONE);
    assert_eq!(location.properties[1].multiplicity, Multiplicity::ZERO_ONE);
    assert!(location.properties[1]
        .generic_type
        .is_class("meta::pure::milestoning::BusinessDateMilestoning"));

    let person = model.class("model::Person").expect("Person");
    assert_eq!(property_names(person), vec!["addressAllVersions"]);
    assert_eq!(person.properties[0].multiplicity, Multiplicity::ZERO_MANY);
    assert_eq!(
        accessor_signatures(person),
        vec![("address", 2), ("addressAllVersionsInRange", 3)]
    );
    assert_eq!(
        person.qualified_properties[0].multiplicity,
        Multiplicity::ZERO_ONE
    );
    assert_eq!(
        person.qualified_properties[1].multiplicity,
        Multiplicity::ZERO_MANY
    );
    assert!(!person
        .qualified_properties
        .iter()
        .any(|q| q.name == "address" && q.arity() == 1));
    let originals: Vec<&str> = person
        .original_milestoned_properties
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(originals, vec!["address"]);
}

#[test]
fn scenario_b_matching_bitemporal_shapes_get_no_arg_accessor() {
    let model = compiled(employment());

    let employment = model.class("model::Employment").expect("Employment");
    assert_eq!(
        property_names(employment),
        vec!["employerAllVersions", "processingDate", "businessDate", "milestoning"]
    );
    assert_eq!(
        accessor_signatures(employment),
        vec![("employer", 3), ("employer", 1)]
    );
    let with_dates = &employment.qualified_properties[0];
    let names: Vec<&str> = with_dates
        .explicit_parameters()
        .iter()
        .map(|v| v.name.as_str())
        .collect();
    assert_eq!(names, vec!["processingDate", "businessDate"]);
}

#[test]
fn mismatched_source_shape_gets_dated_accessor_only() {
    let model = compiled(employment());
    let office = model.class("model::Office").expect("Office");
    assert_eq!(accessor_signatures(office), vec![("owner", 3)]);
    assert_eq!(office.properties[0].name, "ownerAllVersions");
    assert_eq!(office.properties[0].multiplicity, Multiplicity::ONE_MANY);
}

#[test]
fn half_open_range_filter_is_opt_in() {
    let mut model = person_location();
    let options = CompileOptions {
        range_filter: RangeFilter::HalfOpen,
        ..CompileOptions::default()
    };
    compile(&mut model, &CoreSymbols, &options).expect("model compiles");
    let person = model.class("model::Person").expect("Person");
    let range = person
        .qualified_properties
        .iter()
        .find(|q| q.name == "addressAllVersionsInRange")
        .expect("range accessor");
    assert_eq!(
        range.expression_sequence[0].to_string(),
        "$this.addressAllVersions->filter(v_milestoning|$start <= $v_milestoning.businessDate && $v_milestoning.businessDate < $end)"
    );
}

#[test]
fn compiling_twice_adds_nothing() {
    for fixture in [person_location(), employment(), firm_location(), association_model()] {
        let once = compiled(fixture);
        let mut twice = once.clone();
        let report = compile(&mut twice, &CoreSymbols, &CompileOptions::default())
            .expect("model compiles");
        assert!(report.is_unchanged(), "{report:?}");
        assert_eq!(twice, once);
    }
}

// =============================================================================
// Associations
// =============================================================================

#[test]
fn association_end_rewrite_is_mirrored_on_member_views() {
    let model = compiled(association_model());

    let association = model.association("model::Employment").expect("association");
    let ends: Vec<&str> = association.properties.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(ends, vec!["firmAllVersions", "employees"]);

    let person = model.class("model::Person").expect("Person");
    let exposed: Vec<&str> = person
        .properties_from_associations
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(exposed, vec!["firmAllVersions"]);
    let accessors: Vec<(&str, usize)> = person
        .qualified_properties_from_associations
        .iter()
        .map(|q| (q.name.as_str(), q.arity()))
        .collect();
    assert_eq!(accessors, vec![("firm", 2), ("firmAllVersionsInRange", 3)]);
    assert_eq!(
        person.qualified_properties_from_associations[0].signature.parameters[0].generic_type,
        TypeRef::class("model::Person")
    );
    assert_eq!(person.original_milestoned_properties.len(), 1);
    assert_eq!(person.original_milestoned_properties[0].name, "firm");

    let firm = model.class("model::Firm").expect("Firm");
    let exposed: Vec<&str> = firm
        .properties_from_associations
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(exposed, vec!["employees"]);
}

#[test]
fn dated_navigation_through_association_end() {
    let model = compiled(association_model());
    let expression = nav(
        "model::Person",
        "firm",
        var("person", "model::Person"),
        vec![Expression::date("2021-01-01")],
        "model::Firm",
    );
    let mut context = MilestoningContext::new();
    let resolved = resolve_expression(&model, &expression, &mut context).expect("resolves");
    assert_eq!(
        navigation_of(&resolved).accessor,
        Accessor::Qualified { parameter_count: 2 }
    );
    assert_eq!(
        context.date(DateField::BusinessDate),
        Some(&Expression::date("2021-01-01"))
    );
}

// =============================================================================
// Date propagation
// =============================================================================

#[test]
fn scenario_c_bitemporal_navigation_with_only_business_date_fails() {
    let model = compiled(employment());
    let expression = nav(
        "model::Employment",
        "employer",
        var("employment", "model::Employment"),
        vec![],
        "model::Company",
    );
    let mut context = ambient(None, Some("2020-01-01"));
    let err = resolve_expression(&model, &expression, &mut context).expect_err("missing date");
    assert_eq!(
        err,
        CompileError::MissingMilestoningDate {
            property: "employer".into(),
            expected: vec!["processingDate".into(), "businessDate".into()],
            source_information: None,
        }
    );
    assert!(err.to_string().contains("[processingDate, businessDate]"));
}

#[test]
fn missing_date_is_reported_at_the_call_site() {
    let model = compiled(person_location());
    let span = SourceInformation::new("model.pure", 12, 5, 12, 19);
    let expression = Expression::navigate(
        Navigation::new("model::Person", "address", var("person", "model::Person"), vec![])
            .at(span.clone()),
        TypeRef::class("model::Location"),
        Multiplicity::ZERO_ONE,
    );
    let err = resolve_expression(&model, &expression, &mut MilestoningContext::new())
        .expect_err("no date in scope");
    assert_eq!(err.source_information(), Some(&span));
    assert_eq!(err.category(), ErrorCategory::Compilation);
}

#[test]
fn scenario_d_receiver_date_wins_over_ambient() {
    let model = compiled(firm_location());
    let firm = nav(
        "model::Person",
        "firm",
        var("person", "model::Person"),
        vec![Expression::date("2021-06-30")],
        "model::Firm",
    );
    let location = nav("model::Firm", "location", firm, vec![], "model::Location");
    let mut context = ambient(None, Some("2020-01-01"));

    let resolved = resolve_expression(&model, &location, &mut context).expect("resolves");
    let navigation = navigation_of(&resolved);
    assert_eq!(navigation.accessor, Accessor::Qualified { parameter_count: 2 });
    assert_eq!(
        navigation.explicit_arguments(),
        &[Expression::date("2021-06-30")]
    );
}

#[test]
fn undated_receiver_falls_back_to_ambient() {
    let model = compiled(firm_location());
    let location = nav(
        "model::Firm",
        "location",
        var("firm", "model::Firm"),
        vec![],
        "model::Location",
    );
    let mut context = ambient(None, Some("2020-01-01"));
    let resolved = resolve_expression(&model, &location, &mut context).expect("resolves");
    assert_eq!(
        navigation_of(&resolved).explicit_arguments(),
        &[Expression::date("2020-01-01")]
    );
}

#[test]
fn ambient_resolution_matches_explicit_dates() {
    let model = compiled(employment());
    let receiver = var("employment", "model::Employment");
    let context = ambient(Some("2020-01-01"), Some("2020-06-30"));

    let implicit = nav(
        "model::Employment",
        "employer",
        receiver.clone(),
        vec![],
        "model::Company",
    );
    let explicit = nav(
        "model::Employment",
        "employer",
        receiver.clone(),
        vec![Expression::date("2020-01-01"), Expression::date("2020-06-30")],
        "model::Company",
    );

    let implicit = resolve_expression(&model, &implicit, &mut context.clone()).expect("resolves");
    let explicit = resolve_expression(&model, &explicit, &mut context.clone()).expect("resolves");
    let (implicit, explicit) = (navigation_of(&implicit), navigation_of(&explicit));
    assert_eq!(implicit.arguments, explicit.arguments);
    assert_eq!(implicit.accessor, explicit.accessor);
    assert_eq!(implicit.original_arguments, Some(vec![receiver]));
    assert_eq!(explicit.original_arguments, None);
}

#[test]
fn uni_temporal_source_propagates_its_own_axis_into_bitemporal_target() {
    let model = compiled(employment());
    let expression = nav(
        "model::Office",
        "owner",
        var("office", "model::Office"),
        vec![Expression::date("2019-12-31")],
        "model::Company",
    );
    let mut context = ambient(None, Some("2020-06-30"));
    let resolved = resolve_expression(&model, &expression, &mut context).expect("resolves");
    assert_eq!(
        navigation_of(&resolved).explicit_arguments(),
        &[Expression::date("2019-12-31"), Expression::date("2020-06-30")]
    );
}

#[test]
fn bitemporal_single_argument_is_taken_as_business_date() {
    let model = compiled(employment());
    let expression = nav(
        "model::Employment",
        "employer",
        var("employment", "model::Employment"),
        vec![Expression::date("2021-03-01")],
        "model::Company",
    );
    let mut context = ambient(Some("2020-01-01"), Some("1999-01-01"));
    let resolved = resolve_expression(&model, &expression, &mut context).expect("resolves");
    assert_eq!(
        navigation_of(&resolved).explicit_arguments(),
        &[Expression::date("2020-01-01"), Expression::date("2021-03-01")]
    );
    assert_eq!(
        context.date(DateField::BusinessDate),
        Some(&Expression::date("2021-03-01"))
    );
}

#[test]
fn receiver_dates_win_over_context_moved_by_argument() {
    let model = compiled(mixed_shapes());
    let employment = nav(
        "model::Holder",
        "employment",
        var("holder", "model::Holder"),
        vec![Expression::date("2015-01-01"), Expression::date("2015-06-30")],
        "model::Employment",
    );
    // Resolving the argument records 2030-01-01 as the processing date.
    let other_employer = nav(
        "model::Employment",
        "employer",
        var("other", "model::Employment"),
        vec![Expression::date("2030-01-01"), Expression::date("2030-06-30")],
        "model::Company",
    );
    let founded_on = Expression::navigate(
        Navigation::new("model::Company", "foundedOn", other_employer, vec![]),
        TypeRef::Primitive(Primitive::Date),
        Multiplicity::ONE,
    );
    let employer = nav(
        "model::Employment",
        "employer",
        employment,
        vec![founded_on],
        "model::Company",
    );
    let mut context = ambient(Some("2020-01-01"), Some("2020-06-30"));

    let resolved = resolve_expression(&model, &employer, &mut context).expect("resolves");
    let navigation = navigation_of(&resolved);
    assert_eq!(navigation.accessor, Accessor::Qualified { parameter_count: 3 });
    let dates = navigation.explicit_arguments();
    assert_eq!(dates.len(), 2);
    assert_eq!(dates[0], Expression::date("2015-01-01"));
    assert_eq!(navigation_of(&dates[1]).property, "foundedOn");
}

#[test]
fn bitemporal_source_fills_uni_temporal_target_from_context() {
    let model = compiled(mixed_shapes());
    let site = nav(
        "model::Employment",
        "site",
        var("employment", "model::Employment"),
        vec![],
        "model::Location",
    );
    let mut context = ambient(Some("2001-01-01"), Some("2002-02-02"));
    let resolved = resolve_expression(&model, &site, &mut context).expect("resolves");
    let navigation = navigation_of(&resolved);
    assert_eq!(navigation.accessor, Accessor::Qualified { parameter_count: 2 });
    assert_eq!(
        navigation.explicit_arguments(),
        &[Expression::date("2002-02-02")]
    );
}

#[test]
fn processing_temporal_source_supplies_processing_date_to_bitemporal_target() {
    let model = compiled(mixed_shapes());
    let company = nav(
        "model::Account",
        "company",
        var("account", "model::Account"),
        vec![Expression::date("2009-09-09")],
        "model::Company",
    );
    let mut context = ambient(Some("2001-01-01"), None);
    let resolved = resolve_expression(&model, &company, &mut context).expect("resolves");
    let navigation = navigation_of(&resolved);
    assert_eq!(navigation.accessor, Accessor::Qualified { parameter_count: 3 });
    assert_eq!(
        navigation.explicit_arguments(),
        &[Expression::date("2001-01-01"), Expression::date("2009-09-09")]
    );
}

#[test]
fn different_uni_temporal_shapes_need_explicit_date() {
    let model = compiled(mixed_shapes());
    let branch = nav(
        "model::Account",
        "branch",
        var("account", "model::Account"),
        vec![],
        "model::Location",
    );
    let mut context = ambient(Some("2001-01-01"), Some("2002-02-02"));
    let err = resolve_expression(&model, &branch, &mut context).expect_err("missing date");
    assert_eq!(
        err,
        CompileError::MissingMilestoningDate {
            property: "branch".into(),
            expected: vec!["businessDate".into()],
            source_information: None,
        }
    );
}

#[test]
fn unannotated_source_needs_explicit_date() {
    let model = compiled(person_location());
    let address = nav(
        "model::Person",
        "address",
        var("person", "model::Person"),
        vec![],
        "model::Location",
    );
    let mut context = ambient(None, Some("2020-01-01"));
    let err = resolve_expression(&model, &address, &mut context).expect_err("missing date");
    assert!(matches!(
        err,
        CompileError::MissingMilestoningDate { ref expected, .. } if expected == &["businessDate".to_string()]
    ));
}

#[test]
fn supplied_dates_become_ambient_for_later_navigations() {
    let model = compiled(employment());
    let mut context = MilestoningContext::new();
    let explicit = nav(
        "model::Employment",
        "employer",
        var("e1", "model::Employment"),
        vec![Expression::date("2020-01-01"), Expression::date("2020-06-30")],
        "model::Company",
    );
    let navigation = navigation_of(&explicit).clone();
    resolve_navigation(&model, &navigation, &mut context).expect("resolves");

    let implicit = nav(
        "model::Employment",
        "employer",
        var("e2", "model::Employment"),
        vec![],
        "model::Company",
    );
    let resolved = resolve_expression(&model, &implicit, &mut context).expect("resolves");
    assert_eq!(
        navigation_of(&resolved).explicit_arguments(),
        &[Expression::date("2020-01-01"), Expression::date("2020-06-30")]
    );
}

#[test]
fn declared_bodies_resolve_against_receiver_dates() {
    let mut model = employment();
    let mut employment = model.class("model::Employment").expect("Employment").clone();
    employment.qualified_properties.push(declared(
        "model::Employment",
        "currentEmployer",
        "model::Company",
        nav(
            "model::Employment",
            "employer",
            var("this", "model::Employment"),
            vec![],
            "model::Company",
        ),
    ));
    model.add_class(employment);

    let report = compile(&mut model, &CoreSymbols, &CompileOptions::default()).expect("compiles");
    assert_eq!(report.bodies_resolved, 1);
    let employment = model.class("model::Employment").expect("Employment");
    let body = &employment.qualified_properties[0].expression_sequence[0];
    assert_eq!(
        body.to_string(),
        "$this.employer($this.processingDate, $this.businessDate)"
    );
}

// =============================================================================
// Failure and options
// =============================================================================

#[test]
fn failed_compilation_leaves_model_untouched() {
    let mut model = person_location();
    let mut person = model.class("model::Person").expect("Person").clone();
    person.qualified_properties.push(declared(
        "model::Person",
        "home",
        "model::Location",
        nav(
            "model::Person",
            "address",
            var("this", "model::Person"),
            vec![],
            "model::Location",
        ),
    ));
    model.add_class(person);
    let before = model.clone();

    let err = compile(&mut model, &CoreSymbols, &CompileOptions::default())
        .expect_err("missing date");
    assert!(matches!(err, CompileError::MissingMilestoningDate { ref property, .. } if property == "address"));
    assert_eq!(model, before);
}

#[test]
fn conflicting_shapes_first_wins_unless_strict() {
    let mut model = employment();
    let mut odd = class("model::Odd", Some("businesstemporal"));
    odd.stereotypes
        .push(milestone_model::StereotypeRef::new(
            milestone_compiler::shape::TEMPORAL_PROFILE,
            "bitemporal",
        ));
    model.add_class(odd);
    let before = model.clone();

    let strict = CompileOptions {
        strict_shapes: true,
        ..CompileOptions::default()
    };
    let err = compile(&mut model, &CoreSymbols, &strict).expect_err("conflict");
    assert!(matches!(err, CompileError::ConflictingShapes { ref class, .. } if class == "model::Odd"));
    assert_eq!(model, before);

    let report = compile(&mut model, &CoreSymbols, &CompileOptions::default()).expect("compiles");
    assert_eq!(
        report.temporal_classes.get("model::Odd"),
        Some(&TemporalShape::BusinessTemporal)
    );
}

#[derive(Deserialize)]
struct ConfigFile {
    #[serde(default)]
    compiler: CompileOptions,
}

#[test]
fn options_load_from_toml() {
    let file: ConfigFile = toml::from_str(
        "[compiler]\nrange_filter = \"half-open\"\nstrict_shapes = true\n",
    )
    .expect("valid config");
    assert_eq!(file.compiler.range_filter, RangeFilter::HalfOpen);
    assert!(file.compiler.strict_shapes);

    let empty: ConfigFile = toml::from_str("").expect("valid config");
    assert_eq!(empty.compiler, CompileOptions::default());

    assert!(toml::from_str::<ConfigFile>("[compiler]\nrange = \"half-open\"\n").is_err());
}
