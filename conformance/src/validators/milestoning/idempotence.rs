//! Recompilation conformance: compiling a compiled model changes nothing.

use milestone_compiler::{compile, CompileOptions, CoreSymbols};
use milestone_model::Model;

use crate::report::{ConformanceReport, TestResult};

const VALIDATOR: &str = "milestoning/idempotence";

/// Recompiles a copy of `model` with `options` and reports any change.
#[must_use]
pub fn validate(model: &Model, options: &CompileOptions) -> ConformanceReport {
    let mut report = ConformanceReport::new();
    let mut recompiled = model.clone();

    let compilation = match compile(&mut recompiled, &CoreSymbols, options) {
        Ok(compilation) => compilation,
        Err(e) => {
            report.push(TestResult::fail(
                VALIDATOR,
                format!("Recompilation failed: {e}"),
            ));
            return report;
        }
    };

    let mut changes: Vec<String> = Vec::new();
    if compilation.properties_synthesized > 0 {
        changes.push(format!(
            "date properties synthesized again: {}",
            compilation.properties_synthesized
        ));
    }
    if compilation.properties_milestoned > 0 {
        changes.push(format!(
            "properties milestoned again: {}",
            compilation.properties_milestoned
        ));
    }
    if compilation.bodies_resolved > 0 {
        changes.push(format!(
            "qualified property bodies resolved again: {}",
            compilation.bodies_resolved
        ));
    }
    for (before, after) in model.classes().zip(recompiled.classes()) {
        if before != after {
            changes.push(format!("{} changed on recompilation", before.path));
        }
    }
    for (before, after) in model.associations().zip(recompiled.associations()) {
        if before != after {
            changes.push(format!("{} changed on recompilation", before.path));
        }
    }

    report.push(TestResult::from_violations(
        VALIDATOR,
        "Recompiling adds nothing",
        "Recompilation changed the model",
        changes,
    ));
    report
}
