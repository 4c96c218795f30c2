//! Model builders shared by the integration tests.

#![allow(dead_code)]

use milestone_compiler::shape::TEMPORAL_PROFILE;
use milestone_model::{
    Association, Class, Expression, FunctionType, Model, Multiplicity, Navigation, Primitive,
    Property, PropertyOwner, QualifiedProperty, StereotypeRef, TypeRef, Variable,
};

/// A class, temporal when `shape` names a temporal stereotype.
pub fn class(path: &str, shape: Option<&str>) -> Class {
    let mut class = Class::new(path);
    if let Some(shape) = shape {
        class
            .stereotypes
            .push(StereotypeRef::new(TEMPORAL_PROFILE, shape));
    }
    class
}

/// A class-owned property.
pub fn property(owner: &str, name: &str, target: &str, multiplicity: Multiplicity) -> Property {
    Property::new(
        name,
        TypeRef::class(target),
        multiplicity,
        PropertyOwner::Class(owner.into()),
    )
}

/// A class with one property.
pub fn class_with(path: &str, shape: Option<&str>, properties: Vec<Property>) -> Class {
    let mut class = class(path, shape);
    class.properties = properties;
    class
}

/// `$name`, typed as `class`.
pub fn var(name: &str, class: &str) -> Expression {
    Variable::new(name, TypeRef::class(class), Multiplicity::ONE).reference()
}

/// `receiver.property(args)` from `owner` to `target`.
pub fn nav(
    owner: &str,
    property: &str,
    receiver: Expression,
    args: Vec<Expression>,
    target: &str,
) -> Expression {
    Expression::navigate(
        Navigation::new(owner, property, receiver, args),
        TypeRef::class(target),
        Multiplicity::ZERO_ONE,
    )
}

/// A declared zero-parameter qualified property on `owner` with `body`.
pub fn declared(owner: &str, name: &str, target: &str, body: Expression) -> QualifiedProperty {
    QualifiedProperty {
        name: name.into(),
        generic_type: TypeRef::class(target),
        multiplicity: Multiplicity::ZERO_ONE,
        stereotypes: vec![],
        tagged_values: vec![],
        owner: PropertyOwner::Class(owner.into()),
        signature: FunctionType {
            parameters: vec![Variable::new("this", TypeRef::class(owner), Multiplicity::ONE)],
            return_type: TypeRef::class(target),
            return_multiplicity: Multiplicity::ZERO_ONE,
        },
        expression_sequence: vec![body],
    }
}

/// `Person` (no shape) with `address: Location[0..1]`; `Location` is business-temporal.
pub fn person_location() -> Model {
    let mut model = Model::new();
    model.add_class(class("model::Location", Some("businesstemporal")));
    model.add_class(class_with(
        "model::Person",
        None,
        vec![property(
            "model::Person",
            "address",
            "model::Location",
            Multiplicity::ZERO_ONE,
        )],
    ));
    model
}

/// Bi-temporal `Employment` with `employer: Company[0..1]`, `Company` bi-temporal;
/// business-temporal `Office` with `owner: Company[1]`.
pub fn employment() -> Model {
    let mut model = Model::new();
    model.add_class(class("model::Company", Some("bitemporal")));
    model.add_class(class_with(
        "model::Employment",
        Some("bitemporal"),
        vec![property(
            "model::Employment",
            "employer",
            "model::Company",
            Multiplicity::ZERO_ONE,
        )],
    ));
    model.add_class(class_with(
        "model::Office",
        Some("businesstemporal"),
        vec![property(
            "model::Office",
            "owner",
            "model::Company",
            Multiplicity::ONE,
        )],
    ));
    model
}

/// Business-temporal `Firm` with `location: Location[0..1]`; `Person` (no
/// shape) with `firm: Firm[0..1]`.
pub fn firm_location() -> Model {
    let mut model = Model::new();
    model.add_class(class("model::Location", Some("businesstemporal")));
    model.add_class(class_with(
        "model::Firm",
        Some("businesstemporal"),
        vec![property(
            "model::Firm",
            "location",
            "model::Location",
            Multiplicity::ZERO_ONE,
        )],
    ));
    model.add_class(class_with(
        "model::Person",
        None,
        vec![property(
            "model::Person",
            "firm",
            "model::Firm",
            Multiplicity::ZERO_ONE,
        )],
    ));
    model
}

/// One class per shape pair the other fixtures miss:
/// - bi-temporal `Company` with `foundedOn: Date[1]`
/// - business-temporal `Location`
/// - bi-temporal `Employment` with `employer: Company[0..1]` and `site: Location[0..1]`
/// - bi-temporal `Holder` with `employment: Employment[0..1]`
/// - processing-temporal `Account` with `company: Company[0..1]` and `branch: Location[0..1]`
pub fn mixed_shapes() -> Model {
    let mut model = Model::new();
    model.add_class(class_with(
        "model::Company",
        Some("bitemporal"),
        vec![Property::new(
            "foundedOn",
            TypeRef::Primitive(Primitive::Date),
            Multiplicity::ONE,
            PropertyOwner::Class("model::Company".into()),
        )],
    ));
    model.add_class(class("model::Location", Some("businesstemporal")));
    model.add_class(class_with(
        "model::Employment",
        Some("bitemporal"),
        vec![
            property("model::Employment", "employer", "model::Company", Multiplicity::ZERO_ONE),
            property("model::Employment", "site", "model::Location", Multiplicity::ZERO_ONE),
        ],
    ));
    model.add_class(class_with(
        "model::Holder",
        Some("bitemporal"),
        vec![property(
            "model::Holder",
            "employment",
            "model::Employment",
            Multiplicity::ZERO_ONE,
        )],
    ));
    model.add_class(class_with(
        "model::Account",
        Some("processingtemporal"),
        vec![
            property("model::Account", "company", "model::Company", Multiplicity::ZERO_ONE),
            property("model::Account", "branch", "model::Location", Multiplicity::ZERO_ONE),
        ],
    ));
    model
}

/// `Person` (no shape) and business-temporal `Firm` bound by
/// `Employment { firm: Firm[0..1]; employees: Person[*] }`.
pub fn association_model() -> Model {
    let mut model = Model::new();
    model.add_class(class("model::Person", None));
    model.add_class(class("model::Firm", Some("businesstemporal")));
    let owner = PropertyOwner::Association("model::Employment".into());
    model.add_association(Association::new(
        "model::Employment",
        vec![
            Property::new(
                "firm",
                TypeRef::class("model::Firm"),
                Multiplicity::ZERO_ONE,
                owner.clone(),
            ),
            Property::new(
                "employees",
                TypeRef::class("model::Person"),
                Multiplicity::ZERO_MANY,
                owner,
            ),
        ],
    ));
    model
}

/// Names of a class's declared properties.
pub fn property_names(class: &Class) -> Vec<&str> {
    class.properties.iter().map(|p| p.name.as_str()).collect()
}

/// `(name, arity)` of a class's declared qualified properties.
pub fn accessor_signatures(class: &Class) -> Vec<(&str, usize)> {
    class
        .qualified_properties
        .iter()
        .map(|q| (q.name.as_str(), q.arity()))
        .collect()
}
