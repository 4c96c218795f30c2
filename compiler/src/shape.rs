//! Temporal shape classification.
//!
//! A class's shape is derived from its stereotypes every time it is needed;
//! it is never stored on the class.

use log::warn;
use milestone_model::{Class, StereotypeRef};

use crate::error::CompileError;

/// Profile that declares the temporal stereotypes.
pub const TEMPORAL_PROFILE: &str = "meta::pure::profiles::temporal";

/// A milestoning date axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateField {
    /// Processing (system/knowledge) time.
    ProcessingDate,
    /// Business-effective time.
    BusinessDate,
}

impl DateField {
    /// The date property name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            DateField::ProcessingDate => "processingDate",
            DateField::BusinessDate => "businessDate",
        }
    }

    /// Position in a bi-temporal parameter list.
    #[must_use]
    pub fn position(self) -> usize {
        match self {
            DateField::ProcessingDate => 0,
            DateField::BusinessDate => 1,
        }
    }

    /// The other axis.
    #[must_use]
    pub fn other(self) -> DateField {
        match self {
            DateField::ProcessingDate => DateField::BusinessDate,
            DateField::BusinessDate => DateField::ProcessingDate,
        }
    }
}

/// The recognized temporal shapes. "No shape" is `Option::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemporalShape {
    /// Versioned along business-effective date.
    BusinessTemporal,
    /// Versioned along processing date.
    ProcessingTemporal,
    /// Versioned along both axes.
    Bitemporal,
}

impl TemporalShape {
    /// Every shape.
    pub const ALL: [TemporalShape; 3] = [
        TemporalShape::BusinessTemporal,
        TemporalShape::ProcessingTemporal,
        TemporalShape::Bitemporal,
    ];

    /// Stereotype value that declares this shape.
    #[must_use]
    pub fn stereotype_name(self) -> &'static str {
        match self {
            TemporalShape::BusinessTemporal => "businesstemporal",
            TemporalShape::ProcessingTemporal => "processingtemporal",
            TemporalShape::Bitemporal => "bitemporal",
        }
    }

    /// Looks up a shape by stereotype value.
    #[must_use]
    pub fn from_stereotype(value: &str) -> Option<TemporalShape> {
        Self::ALL.into_iter().find(|s| s.stereotype_name() == value)
    }

    /// Required date fields, in parameter order.
    #[must_use]
    pub fn date_fields(self) -> &'static [DateField] {
        match self {
            TemporalShape::BusinessTemporal => &[DateField::BusinessDate],
            TemporalShape::ProcessingTemporal => &[DateField::ProcessingDate],
            TemporalShape::Bitemporal => &[DateField::ProcessingDate, DateField::BusinessDate],
        }
    }

    /// Required date field names, in parameter order.
    #[must_use]
    pub fn date_property_names(self) -> Vec<&'static str> {
        self.date_fields().iter().map(|f| f.name()).collect()
    }

    /// The first required date field.
    #[must_use]
    pub fn primary_date_field(self) -> DateField {
        match self {
            TemporalShape::BusinessTemporal => DateField::BusinessDate,
            TemporalShape::ProcessingTemporal | TemporalShape::Bitemporal => {
                DateField::ProcessingDate
            }
        }
    }

    /// Returns true for the single-axis shapes.
    #[must_use]
    pub fn is_uni_temporal(self) -> bool {
        !matches!(self, TemporalShape::Bitemporal)
    }

    /// Class the range relation property is typed as.
    #[must_use]
    pub fn range_class(self) -> &'static str {
        match self {
            TemporalShape::BusinessTemporal => "meta::pure::milestoning::BusinessDateMilestoning",
            TemporalShape::ProcessingTemporal => {
                "meta::pure::milestoning::ProcessingDateMilestoning"
            }
            TemporalShape::Bitemporal => "meta::pure::milestoning::BiTemporalMilestoning",
        }
    }
}

/// Every recognized shape among `stereotypes`, in declaration order, without duplicates.
#[must_use]
pub fn temporal_shapes(stereotypes: &[StereotypeRef]) -> Vec<TemporalShape> {
    let mut shapes = Vec::new();
    for shape in stereotypes
        .iter()
        .filter_map(|s| TemporalShape::from_stereotype(s.value()))
    {
        if !shapes.contains(&shape) {
            shapes.push(shape);
        }
    }
    shapes
}

/// The first recognized shape among `stereotypes`. Uniqueness is not checked.
#[must_use]
pub fn classify(stereotypes: &[StereotypeRef]) -> Option<TemporalShape> {
    stereotypes
        .iter()
        .find_map(|s| TemporalShape::from_stereotype(s.value()))
}

/// Classifies a class. With `strict`, more than one shape is an error;
/// otherwise the first by declaration order wins.
///
/// # Errors
///
/// Returns [`CompileError::ConflictingShapes`] under `strict` when the class
/// carries several temporal stereotypes.
pub fn classify_class(class: &Class, strict: bool) -> Result<Option<TemporalShape>, CompileError> {
    let shapes = temporal_shapes(&class.stereotypes);
    if shapes.len() > 1 {
        let names: Vec<String> = shapes
            .iter()
            .map(|s| s.stereotype_name().to_string())
            .collect();
        if strict {
            return Err(CompileError::ConflictingShapes {
                class: class.path.clone(),
                shapes: names,
                source_information: class.source_information.clone(),
            });
        }
        warn!(
            "class {} has several temporal stereotypes ({}); using {}",
            class.path,
            names.join(", "),
            shapes[0].stereotype_name()
        );
    }
    Ok(shapes.first().copied())
}
