//! Compilation errors raised by the milestoning pass.

use milestone_model::SourceInformation;
use thiserror::Error;

/// Broad classification of a [`CompileError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// A user-facing model error.
    Compilation,
    /// An invariant violation inside the compiler.
    Internal,
}

/// Errors surfaced by classification, synthesis, rewriting and propagation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// A temporal navigation lacks date arguments and none could be propagated.
    #[error(
        "No-Arg milestoned property: '{property}' must be either called in a milestoning context or supplied with [{}] parameters",
        .expected.join(", ")
    )]
    MissingMilestoningDate {
        /// Navigated property name.
        property: String,
        /// Date fields the target requires, in parameter order.
        expected: Vec<String>,
        /// Call-site location.
        source_information: Option<SourceInformation>,
    },

    /// A parameter-count query was made on a qualified property the pass did not generate.
    #[error("Unable to get milestoning date parameters for non milestoned QualifiedProperty: {property}")]
    NotMilestoned {
        /// Qualified property name.
        property: String,
    },

    /// A class carries more than one temporal stereotype under strict classification.
    #[error("Class '{class}' has conflicting temporal stereotypes: {}", .shapes.join(", "))]
    ConflictingShapes {
        /// Class path.
        class: String,
        /// Stereotype values found, in declaration order.
        shapes: Vec<String>,
        /// Class declaration location.
        source_information: Option<SourceInformation>,
    },

    /// A class path is not present in the model.
    #[error("Can't find class '{path}'")]
    UnknownClass {
        /// Requested path.
        path: String,
    },

    /// An association path is not present in the model.
    #[error("Can't find association '{path}'")]
    UnknownAssociation {
        /// Requested path.
        path: String,
    },

    /// The symbol service could not resolve a built-in.
    #[error("Can't resolve {kind} '{name}'")]
    UnknownSymbol {
        /// Symbol kind (`type`, `multiplicity`, `function`, `stereotype`).
        kind: &'static str,
        /// Requested name.
        name: String,
    },

    /// Retargeting found no generated accessor of the required arity.
    #[error("Can't find milestoned accessor '{property}' with {parameter_count} parameter(s) on '{owner}'")]
    AccessorNotFound {
        /// Property name.
        property: String,
        /// Class the navigation starts from.
        owner: String,
        /// Required arity, receiver included.
        parameter_count: usize,
        /// Call-site location.
        source_information: Option<SourceInformation>,
    },
}

impl CompileError {
    /// Returns the error's category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            CompileError::NotMilestoned { .. } | CompileError::AccessorNotFound { .. } => {
                ErrorCategory::Internal
            }
            _ => ErrorCategory::Compilation,
        }
    }

    /// Returns the source location the error is reported at, if known.
    #[must_use]
    pub fn source_information(&self) -> Option<&SourceInformation> {
        match self {
            CompileError::MissingMilestoningDate {
                source_information, ..
            }
            | CompileError::ConflictingShapes {
                source_information, ..
            }
            | CompileError::AccessorNotFound {
                source_information, ..
            } => source_information.as_ref(),
            _ => None,
        }
    }
}
