//! Milestone conformance suite.
//!
//! Validates a compiled [`Model`] against the invariants the milestoning pass
//! guarantees. Each validator produces a [`ConformanceReport`]; [`run_all`]
//! aggregates them.
//!
//! # Checks
//!
//! | Validator | Invariant |
//! |-----------|-----------|
//! | `milestoning/shapes` | Temporal classes carry their shape's `Date[1]` properties and `milestoning[0..1]` |
//! | `milestoning/accessors` | Milestoned properties have one widened edge point and their accessor set |
//! | `milestoning/associations` | Member class views mirror their associations |
//! | `milestoning/idempotence` | Recompiling changes nothing |
//!
//! # Entry Point
//!
//! ```
//! use milestone_compiler::{compile, CompileOptions, CoreSymbols};
//! use milestone_model::Model;
//!
//! let mut model = Model::new();
//! compile(&mut model, &CoreSymbols, &CompileOptions::default()).ok();
//! let report = milestone_conformance::run_all(&model);
//! assert!(report.all_passed());
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod report;
pub mod validators;

use log::debug;
use milestone_compiler::CompileOptions;
use milestone_model::Model;

pub use report::{ConformanceReport, Severity, TestResult};

/// Runs every validator with the default compile options.
#[must_use]
pub fn run_all(model: &Model) -> ConformanceReport {
    run_all_with(model, &CompileOptions::default())
}

/// Runs every validator; `options` are the ones `model` was compiled with.
///
/// Validators run in this order:
/// 1. Date properties
/// 2. Edge points and accessors
/// 3. Association views
/// 4. Idempotence
#[must_use]
pub fn run_all_with(model: &Model, options: &CompileOptions) -> ConformanceReport {
    let mut report = ConformanceReport::new();

    report.extend(validators::milestoning::shapes::validate(model));
    report.extend(validators::milestoning::accessors::validate(model));
    report.extend(validators::milestoning::associations::validate(model));
    report.extend(validators::milestoning::idempotence::validate(model, options));

    debug!(
        "conformance: {} check(s), {} failure(s)",
        report.results.len(),
        report.failure_count()
    );
    report
}
