//! Milestone model vocabulary encoded as typed Rust data.
//!
//! The `milestone-model` crate provides the element types a temporal data
//! model is compiled from and into: classes, properties, qualified
//! properties, associations, multiplicities, stereotypes and the typed
//! expression trees that back qualified properties. [`Model`] is the symbol
//! table a compilation pass runs against.
//!
//! # Entry Point
//!
//! ```
//! use milestone_model::{Class, Model};
//!
//! let mut model = Model::new();
//! model.add_class(Class::new("model::Person"));
//! assert!(model.class("model::Person").is_some());
//! ```
//!
//! # Rendering
//!
//! ```
//! # let model = milestone_model::Model::new();
//! let text = milestone_model::render::render_model(&model);
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod expression;
pub mod model;
pub mod render;

pub use expression::{
    Accessor, Comparison, ExprKind, Expression, FunctionRef, Lambda, Literal, Navigation,
    Variable,
};
pub use model::{
    local_name, Association, Class, FunctionType, Model, ModelDocument, Multiplicity, Primitive,
    Property, PropertyOwner, QualifiedProperty, SourceInformation, StereotypeRef, TaggedValue,
    TypeRef,
};
