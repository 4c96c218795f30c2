//! Core model types.
//!
//! These types represent a compiled data model as typed Rust data: classes,
//! their properties and qualified properties, and the associations binding
//! classes together. The top-level symbol table is [`Model`].

use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::expression::{Expression, Variable};

/// Location of a model element in its source text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SourceInformation {
    /// Identifier of the source unit (usually a file name).
    pub source_id: String,
    /// First line, 1-based.
    pub start_line: u32,
    /// First column, 1-based.
    pub start_column: u32,
    /// Last line, 1-based.
    pub end_line: u32,
    /// Last column, 1-based.
    pub end_column: u32,
}

impl SourceInformation {
    /// Creates a source span covering `start_line:start_column` to `end_line:end_column`.
    pub fn new(
        source_id: impl Into<String>,
        start_line: u32,
        start_column: u32,
        end_line: u32,
        end_column: u32,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }
}

impl fmt::Display for SourceInformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}-{}:{}",
            self.source_id, self.start_line, self.start_column, self.end_line, self.end_column
        )
    }
}

/// A multiplicity range. `upper == None` means unbounded (`*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Multiplicity {
    /// Lower bound.
    pub lower: u32,
    /// Upper bound, or `None` when unbounded.
    pub upper: Option<u32>,
}

impl Multiplicity {
    /// `[1]`
    pub const ONE: Multiplicity = Multiplicity {
        lower: 1,
        upper: Some(1),
    };
    /// `[0..1]`
    pub const ZERO_ONE: Multiplicity = Multiplicity {
        lower: 0,
        upper: Some(1),
    };
    /// `[*]`
    pub const ZERO_MANY: Multiplicity = Multiplicity {
        lower: 0,
        upper: None,
    };
    /// `[1..*]`
    pub const ONE_MANY: Multiplicity = Multiplicity {
        lower: 1,
        upper: None,
    };

    /// Creates a multiplicity from explicit bounds.
    #[must_use]
    pub const fn new(lower: u32, upper: Option<u32>) -> Self {
        Self { lower, upper }
    }

    /// Returns the same lower bound with an unbounded upper bound.
    #[must_use]
    pub const fn with_unbounded_upper(self) -> Self {
        Self {
            lower: self.lower,
            upper: None,
        }
    }

    /// Returns true if the upper bound is `*`.
    #[must_use]
    pub const fn is_unbounded(self) -> bool {
        self.upper.is_none()
    }
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.lower, self.upper) {
            (0, None) => write!(f, "[*]"),
            (lower, None) => write!(f, "[{lower}..*]"),
            (lower, Some(upper)) if lower == upper => write!(f, "[{lower}]"),
            (lower, Some(upper)) => write!(f, "[{lower}..{upper}]"),
        }
    }
}

/// Built-in primitive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Primitive {
    /// `Boolean`
    Boolean,
    /// `String`
    String,
    /// `Integer`
    Integer,
    /// `Float`
    Float,
    /// `Number`
    Number,
    /// `Date`, the supertype of `StrictDate` and `DateTime`.
    Date,
    /// `StrictDate`
    StrictDate,
    /// `DateTime`
    DateTime,
}

impl Primitive {
    /// Returns the primitive's model name (e.g. `"Date"`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Primitive::Boolean => "Boolean",
            Primitive::String => "String",
            Primitive::Integer => "Integer",
            Primitive::Float => "Float",
            Primitive::Number => "Number",
            Primitive::Date => "Date",
            Primitive::StrictDate => "StrictDate",
            Primitive::DateTime => "DateTime",
        }
    }

    /// Looks up a primitive by its model name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Primitive> {
        let primitive = match name {
            "Boolean" => Primitive::Boolean,
            "String" => Primitive::String,
            "Integer" => Primitive::Integer,
            "Float" => Primitive::Float,
            "Number" => Primitive::Number,
            "Date" => Primitive::Date,
            "StrictDate" => Primitive::StrictDate,
            "DateTime" => Primitive::DateTime,
            _ => return None,
        };
        Some(primitive)
    }
}

/// A reference to the raw type of a property, variable or expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TypeRef {
    /// A built-in primitive.
    Primitive(Primitive),
    /// A resolved class, by full path (e.g. `"model::Person"`).
    Class(String),
    /// An unresolved import stub, by the path as written in the source.
    Stub(String),
}

impl TypeRef {
    /// Shorthand for `TypeRef::Class(path)`.
    pub fn class(path: impl Into<String>) -> Self {
        TypeRef::Class(path.into())
    }

    /// Returns the class path for class references and stubs.
    #[must_use]
    pub fn class_path(&self) -> Option<&str> {
        match self {
            TypeRef::Class(path) | TypeRef::Stub(path) => Some(path),
            TypeRef::Primitive(_) => None,
        }
    }

    /// Returns the final `::` segment of the referenced path.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            TypeRef::Primitive(p) => p.as_str(),
            TypeRef::Class(path) | TypeRef::Stub(path) => local_name(path),
        }
    }

    /// Returns true if this refers to the class at `path`.
    #[must_use]
    pub fn is_class(&self, path: &str) -> bool {
        self.class_path() == Some(path)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive(p) => f.write_str(p.as_str()),
            TypeRef::Class(path) | TypeRef::Stub(path) => f.write_str(path),
        }
    }
}

/// Returns the final segment of a `::`-separated element path.
#[must_use]
pub fn local_name(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

/// A stereotype applied to a class or property.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StereotypeRef {
    /// A stereotype resolved against its profile.
    Resolved {
        /// Full path of the owning profile.
        profile: String,
        /// Stereotype value (e.g. `"businesstemporal"`).
        value: String,
    },
    /// An unresolved import stub, written `profile@value`.
    Stub(String),
}

impl StereotypeRef {
    /// Creates a resolved stereotype.
    pub fn new(profile: impl Into<String>, value: impl Into<String>) -> Self {
        StereotypeRef::Resolved {
            profile: profile.into(),
            value: value.into(),
        }
    }

    /// Returns the stereotype value. Stubs are named by the segment after `@`.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            StereotypeRef::Resolved { value, .. } => value,
            StereotypeRef::Stub(id_or_path) => id_or_path
                .rsplit_once('@')
                .map_or(id_or_path.as_str(), |(_, value)| value),
        }
    }

    /// Returns the profile path, when known.
    #[must_use]
    pub fn profile(&self) -> Option<&str> {
        match self {
            StereotypeRef::Resolved { profile, .. } => Some(profile),
            StereotypeRef::Stub(id_or_path) => id_or_path.rsplit_once('@').map(|(p, _)| p),
        }
    }
}

impl fmt::Display for StereotypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.profile() {
            Some(profile) => write!(f, "{}.{}", local_name(profile), self.value()),
            None => f.write_str(self.value()),
        }
    }
}

/// A tagged value (`profile.tag = 'value'`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TaggedValue {
    /// Full path of the owning profile.
    pub profile: String,
    /// Tag name.
    pub tag: String,
    /// Tag value.
    pub value: String,
}

/// The element that owns a property.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PropertyOwner {
    /// Owned by a class, by full path.
    Class(String),
    /// Owned by an association, by full path.
    Association(String),
}

impl PropertyOwner {
    /// Returns the owner's full path.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            PropertyOwner::Class(path) | PropertyOwner::Association(path) => path,
        }
    }

    /// Returns true if the owner is the association at `path`.
    #[must_use]
    pub fn is_association(&self, path: &str) -> bool {
        matches!(self, PropertyOwner::Association(p) if p == path)
    }
}

/// A typed edge from its owner to a target type.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Property {
    /// Property name.
    pub name: String,
    /// Target type.
    pub generic_type: TypeRef,
    /// Multiplicity of the target.
    pub multiplicity: Multiplicity,
    /// Applied stereotypes, in declaration order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub stereotypes: Vec<StereotypeRef>,
    /// Applied tagged values, in declaration order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub tagged_values: Vec<TaggedValue>,
    /// Owning class or association.
    pub owner: PropertyOwner,
    /// Where the property was declared.
    #[cfg_attr(feature = "serde", serde(default))]
    pub source_information: Option<SourceInformation>,
}

impl Property {
    /// Creates an unannotated property.
    pub fn new(
        name: impl Into<String>,
        generic_type: TypeRef,
        multiplicity: Multiplicity,
        owner: PropertyOwner,
    ) -> Self {
        Self {
            name: name.into(),
            generic_type,
            multiplicity,
            stereotypes: Vec::new(),
            tagged_values: Vec::new(),
            owner,
            source_information: None,
        }
    }

    /// Returns true if a stereotype with the given value is applied.
    #[must_use]
    pub fn has_stereotype(&self, value: &str) -> bool {
        self.stereotypes.iter().any(|s| s.value() == value)
    }
}

/// The signature of a function-like element: `{params -> return[mult]}`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FunctionType {
    /// Parameters, including an implicit receiver where applicable.
    pub parameters: Vec<Variable>,
    /// Return type.
    pub return_type: TypeRef,
    /// Return multiplicity.
    pub return_multiplicity: Multiplicity,
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, parameter) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}{}", parameter.generic_type, parameter.multiplicity)?;
        }
        write!(f, "->{}{}}}", self.return_type, self.return_multiplicity)
    }
}

/// A derived property: its value is computed by an attached expression.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QualifiedProperty {
    /// Property name.
    pub name: String,
    /// Return type.
    pub generic_type: TypeRef,
    /// Return multiplicity.
    pub multiplicity: Multiplicity,
    /// Applied stereotypes, in declaration order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub stereotypes: Vec<StereotypeRef>,
    /// Applied tagged values, in declaration order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub tagged_values: Vec<TaggedValue>,
    /// Owning class or association.
    pub owner: PropertyOwner,
    /// Classifier signature. The first parameter is the implicit `this`.
    pub signature: FunctionType,
    /// Body expressions; the last one is the value.
    #[cfg_attr(feature = "serde", serde(default))]
    pub expression_sequence: Vec<Expression>,
}

impl QualifiedProperty {
    /// Returns true if a stereotype with the given value is applied.
    #[must_use]
    pub fn has_stereotype(&self, value: &str) -> bool {
        self.stereotypes.iter().any(|s| s.value() == value)
    }

    /// Number of parameters including the implicit receiver.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.signature.parameters.len()
    }

    /// Explicit parameters, excluding the implicit receiver.
    #[must_use]
    pub fn explicit_parameters(&self) -> &[Variable] {
        self.signature.parameters.get(1..).unwrap_or(&[])
    }
}

/// A class declaration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Class {
    /// Full path (e.g. `"model::Person"`).
    pub path: String,
    /// Applied stereotypes, in declaration order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub stereotypes: Vec<StereotypeRef>,
    /// Applied tagged values, in declaration order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub tagged_values: Vec<TaggedValue>,
    /// Declared properties, followed by generated ones.
    #[cfg_attr(feature = "serde", serde(default))]
    pub properties: Vec<Property>,
    /// Declared qualified properties, followed by generated ones.
    #[cfg_attr(feature = "serde", serde(default))]
    pub qualified_properties: Vec<QualifiedProperty>,
    /// Properties exposed on this class by associations.
    #[cfg_attr(feature = "serde", serde(default))]
    pub properties_from_associations: Vec<Property>,
    /// Qualified properties exposed on this class by associations.
    #[cfg_attr(feature = "serde", serde(default))]
    pub qualified_properties_from_associations: Vec<QualifiedProperty>,
    /// Properties replaced by edge points during milestoning.
    #[cfg_attr(feature = "serde", serde(default))]
    pub original_milestoned_properties: Vec<Property>,
    /// Where the class was declared.
    #[cfg_attr(feature = "serde", serde(default))]
    pub source_information: Option<SourceInformation>,
}

impl Class {
    /// Creates an empty class.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            stereotypes: Vec::new(),
            tagged_values: Vec::new(),
            properties: Vec::new(),
            qualified_properties: Vec::new(),
            properties_from_associations: Vec::new(),
            qualified_properties_from_associations: Vec::new(),
            original_milestoned_properties: Vec::new(),
            source_information: None,
        }
    }

    /// Returns the class name (final path segment).
    #[must_use]
    pub fn name(&self) -> &str {
        local_name(&self.path)
    }

    /// Returns a type reference to this class.
    #[must_use]
    pub fn type_ref(&self) -> TypeRef {
        TypeRef::Class(self.path.clone())
    }

    /// Declared and association-exposed properties.
    pub fn all_properties(&self) -> impl Iterator<Item = &Property> {
        self.properties
            .iter()
            .chain(self.properties_from_associations.iter())
    }

    /// Declared and association-exposed qualified properties.
    pub fn all_qualified_properties(&self) -> impl Iterator<Item = &QualifiedProperty> {
        self.qualified_properties
            .iter()
            .chain(self.qualified_properties_from_associations.iter())
    }

    /// Looks up a property (declared or association-exposed) by name.
    #[must_use]
    pub fn find_property(&self, name: &str) -> Option<&Property> {
        self.all_properties().find(|p| p.name == name)
    }
}

/// An association binding two classes through one property per direction.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Association {
    /// Full path.
    pub path: String,
    /// The two ends. Each end is exposed on the class the other end targets.
    pub properties: Vec<Property>,
    /// Qualified properties owned by the association.
    #[cfg_attr(feature = "serde", serde(default))]
    pub qualified_properties: Vec<QualifiedProperty>,
    /// Ends replaced by edge points during milestoning.
    #[cfg_attr(feature = "serde", serde(default))]
    pub original_milestoned_properties: Vec<Property>,
    /// Where the association was declared.
    #[cfg_attr(feature = "serde", serde(default))]
    pub source_information: Option<SourceInformation>,
}

impl Association {
    /// Creates an association from its two ends.
    pub fn new(path: impl Into<String>, properties: Vec<Property>) -> Self {
        Self {
            path: path.into(),
            properties,
            qualified_properties: Vec::new(),
            original_milestoned_properties: Vec::new(),
            source_information: None,
        }
    }

    /// Returns the paths of the two member classes, in end order.
    #[must_use]
    pub fn members(&self) -> Vec<&str> {
        self.properties
            .iter()
            .filter_map(|p| p.generic_type.class_path())
            .collect()
    }

    /// Returns the class on which an element targeting `target` is exposed:
    /// the other member, or `target` itself for a self-association.
    #[must_use]
    pub fn exposing_class(&self, target: &str) -> Option<&str> {
        let members = self.members();
        match members.as_slice() {
            [a, b] if *a == target => Some(*b),
            [a, b] if *b == target => Some(*a),
            _ => None,
        }
    }
}

/// Serialized form of a model: flat lists of classes and associations.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ModelDocument {
    /// All classes.
    #[cfg_attr(feature = "serde", serde(default))]
    pub classes: Vec<Class>,
    /// All associations.
    #[cfg_attr(feature = "serde", serde(default))]
    pub associations: Vec<Association>,
}

/// The symbol table of classes and associations for one compilation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    classes: BTreeMap<String, Class>,
    associations: BTreeMap<String, Association>,
}

impl Model {
    /// Creates an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a model from its serialized form, importing association ends
    /// into member class views.
    #[must_use]
    pub fn from_document(document: ModelDocument) -> Self {
        let mut model = Model::new();
        for class in document.classes {
            model.add_class(class);
        }
        for association in document.associations {
            model.add_association(association);
        }
        model
    }

    /// Returns the serialized form of this model.
    #[must_use]
    pub fn to_document(&self) -> ModelDocument {
        ModelDocument {
            classes: self.classes.values().cloned().collect(),
            associations: self.associations.values().cloned().collect(),
        }
    }

    /// Adds or replaces a class.
    pub fn add_class(&mut self, class: Class) {
        self.classes.insert(class.path.clone(), class);
    }

    /// Adds or replaces an association and exposes its ends on the member
    /// classes that are already present.
    pub fn add_association(&mut self, association: Association) {
        for property in &association.properties {
            let Some(target) = property.generic_type.class_path() else {
                continue;
            };
            let Some(exposing) = association.exposing_class(target) else {
                continue;
            };
            if let Some(class) = self.classes.get_mut(exposing) {
                class.properties_from_associations.push(property.clone());
            }
        }
        for qualified in &association.qualified_properties {
            let Some(target) = qualified.generic_type.class_path() else {
                continue;
            };
            let Some(exposing) = association.exposing_class(target) else {
                continue;
            };
            if let Some(class) = self.classes.get_mut(exposing) {
                class
                    .qualified_properties_from_associations
                    .push(qualified.clone());
            }
        }
        self.associations
            .insert(association.path.clone(), association);
    }

    /// Looks up a class by full path.
    #[must_use]
    pub fn class(&self, path: &str) -> Option<&Class> {
        self.classes.get(path)
    }

    /// Looks up a class by full path, mutably.
    pub fn class_mut(&mut self, path: &str) -> Option<&mut Class> {
        self.classes.get_mut(path)
    }

    /// Resolves a type reference to a class. Stubs that do not match a full
    /// path fall back to the first class whose name equals the stub's final
    /// segment.
    #[must_use]
    pub fn resolve_class(&self, type_ref: &TypeRef) -> Option<&Class> {
        match type_ref {
            TypeRef::Primitive(_) => None,
            TypeRef::Class(path) => self.classes.get(path),
            TypeRef::Stub(path) => self.classes.get(path).or_else(|| {
                let name = local_name(path);
                self.classes.values().find(|c| c.name() == name)
            }),
        }
    }

    /// Looks up an association by full path.
    #[must_use]
    pub fn association(&self, path: &str) -> Option<&Association> {
        self.associations.get(path)
    }

    /// Looks up an association by full path, mutably.
    pub fn association_mut(&mut self, path: &str) -> Option<&mut Association> {
        self.associations.get_mut(path)
    }

    /// All classes, ordered by path.
    pub fn classes(&self) -> impl Iterator<Item = &Class> {
        self.classes.values()
    }

    /// All associations, ordered by path.
    pub fn associations(&self) -> impl Iterator<Item = &Association> {
        self.associations.values()
    }

    /// Paths of all classes, ordered.
    #[must_use]
    pub fn class_paths(&self) -> Vec<String> {
        self.classes.keys().cloned().collect()
    }

    /// Paths of all associations, ordered.
    #[must_use]
    pub fn association_paths(&self) -> Vec<String> {
        self.associations.keys().cloned().collect()
    }
}
