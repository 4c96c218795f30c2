//! Milestoning compiler pass.
//!
//! Runs over a resolved [`Model`] and makes its temporal (milestoned) classes
//! navigable by date. Every class annotated `businesstemporal`,
//! `processingtemporal` or `bitemporal` gains its date properties; every
//! property that targets such a class is replaced by an unfiltered edge point
//! plus generated date-filtered accessors; and navigations inside declared
//! qualified properties get their omitted dates propagated and are
//! retargeted to those accessors.
//!
//! # Entry Point
//!
//! ```
//! use milestone_compiler::{compile, CompileOptions, CoreSymbols};
//! use milestone_model::Model;
//!
//! let mut model = Model::new();
//! let report = compile(&mut model, &CoreSymbols, &CompileOptions::default());
//! assert!(report.is_ok());
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod context;
pub mod error;
pub mod expr;
pub mod generated;
pub mod naming;
pub mod options;
pub mod propagate;
pub mod rewrite;
pub mod shape;
pub mod symbols;
pub mod synth;

use std::collections::BTreeMap;

use milestone_model::{Expression, Model, Navigation, QualifiedProperty};

pub use context::MilestoningContext;
pub use error::{CompileError, ErrorCategory};
pub use options::{CompileOptions, RangeFilter};
pub use shape::{DateField, TemporalShape};
pub use symbols::{CoreSymbols, SymbolService};

use generated::is_generated_qualified_property;
use shape::classify;

/// Report of what one compilation changed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CompilationReport {
    /// Temporal classes found, with their shape.
    pub temporal_classes: BTreeMap<String, TemporalShape>,
    /// Date and range-relation properties added.
    pub properties_synthesized: usize,
    /// Properties and association ends replaced by edge points.
    pub properties_milestoned: usize,
    /// Declared qualified properties whose bodies had dates propagated.
    pub bodies_resolved: usize,
}

impl CompilationReport {
    /// Returns true if the pass changed nothing.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.properties_synthesized == 0
            && self.properties_milestoned == 0
            && self.bodies_resolved == 0
    }
}

/// Compiles the milestoning of `model` in place.
///
/// The pass runs on a copy and swaps it in only on success, so a failed
/// compilation leaves `model` untouched. Compiling an already-compiled model
/// adds nothing.
///
/// # Errors
///
/// Returns [`CompileError::ConflictingShapes`] under `strict_shapes`,
/// [`CompileError::MissingMilestoningDate`] when a navigation's dates cannot
/// be propagated, and [`CompileError::UnknownSymbol`] when the symbol service
/// cannot resolve a built-in.
pub fn compile(
    model: &mut Model,
    symbols: &dyn SymbolService,
    options: &CompileOptions,
) -> Result<CompilationReport, CompileError> {
    let mut working = model.clone();
    let mut report = CompilationReport::default();

    // 1. Classify
    for class in working.classes() {
        if let Some(shape) = shape::classify_class(class, options.strict_shapes)? {
            report.temporal_classes.insert(class.path.clone(), shape);
        }
    }

    // 2. Synthesize date properties
    for (path, shape) in &report.temporal_classes {
        if let Some(class) = working.class_mut(path) {
            report.properties_synthesized += synth::synthesize(class, *shape, symbols)?;
        }
    }

    // 3. Rewrite class-owned properties, then association ends
    for path in working.class_paths() {
        report.properties_milestoned +=
            rewrite::rewrite_class(&mut working, &path, symbols, options)?;
    }
    for path in working.association_paths() {
        report.properties_milestoned +=
            rewrite::rewrite_association(&mut working, &path, symbols, options)?;
    }

    // 4. Propagate dates through declared qualified property bodies
    for path in working.class_paths() {
        let Some(class) = working.class(&path) else {
            continue;
        };
        let (bodies, changed) = resolve_bodies(&working, &class.qualified_properties, symbols)?;
        if changed > 0 {
            report.bodies_resolved += changed;
            if let Some(class) = working.class_mut(&path) {
                class.qualified_properties = bodies;
            }
        }
    }
    for path in working.association_paths() {
        let Some(association) = working.association(&path) else {
            continue;
        };
        let (bodies, changed) =
            resolve_bodies(&working, &association.qualified_properties, symbols)?;
        if changed > 0 {
            report.bodies_resolved += changed;
            if let Some(association) = working.association_mut(&path) {
                association.qualified_properties = bodies;
            }
            rewrite::refresh_association_views(&mut working, &path)?;
        }
    }

    *model = working;
    Ok(report)
}

/// Resolves the bodies of declared qualified properties, each with its own
/// context. Returns the new list and how many bodies changed.
fn resolve_bodies(
    model: &Model,
    qualified_properties: &[QualifiedProperty],
    symbols: &dyn SymbolService,
) -> Result<(Vec<QualifiedProperty>, usize), CompileError> {
    let mut resolved = Vec::with_capacity(qualified_properties.len());
    let mut changed = 0;
    for qualified in qualified_properties {
        if is_generated_qualified_property(qualified) {
            resolved.push(qualified.clone());
            continue;
        }
        let mut context = receiver_context(model, qualified, symbols)?;
        let body = qualified
            .expression_sequence
            .iter()
            .map(|expression| propagate::resolve_expression(model, expression, &mut context))
            .collect::<Result<Vec<_>, _>>()?;
        if body != qualified.expression_sequence {
            changed += 1;
        }
        resolved.push(QualifiedProperty {
            expression_sequence: body,
            ..qualified.clone()
        });
    }
    Ok((resolved, changed))
}

/// A context holding the receiver's own dates (`$this.businessDate`, ...)
/// when the receiver is a temporal class.
fn receiver_context(
    model: &Model,
    qualified: &QualifiedProperty,
    symbols: &dyn SymbolService,
) -> Result<MilestoningContext, CompileError> {
    let mut context = MilestoningContext::new();
    let Some(this) = qualified.signature.parameters.first() else {
        return Ok(context);
    };
    let Some(class) = model.resolve_class(&this.generic_type) else {
        return Ok(context);
    };
    let Some(shape) = classify(&class.stereotypes) else {
        return Ok(context);
    };
    let date_type = symbols.resolve_type("Date")?;
    let one = symbols.resolve_multiplicity("one")?;
    let dates: Vec<Expression> = shape
        .date_fields()
        .iter()
        .map(|field| {
            Expression::navigate(
                Navigation::new(class.path.clone(), field.name(), this.reference(), Vec::new()),
                date_type.clone(),
                one,
            )
        })
        .collect();
    context.enter(shape, &dates);
    Ok(context)
}
