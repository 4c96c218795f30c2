//! The milestoning context: the dates currently in force along one
//! navigation chain.
//!
//! A context is owned by one resolution pass and threaded through it by
//! `&mut`; independent compilations each get their own.

use milestone_model::Expression;

use crate::shape::{DateField, TemporalShape};

/// Current processing and business dates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MilestoningContext {
    processing_date: Option<Expression>,
    business_date: Option<Expression>,
}

impl MilestoningContext {
    /// An empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The date currently in force for `field`.
    #[must_use]
    pub fn date(&self, field: DateField) -> Option<&Expression> {
        match field {
            DateField::ProcessingDate => self.processing_date.as_ref(),
            DateField::BusinessDate => self.business_date.as_ref(),
        }
    }

    /// Sets one slot.
    pub fn set(&mut self, field: DateField, date: Expression) {
        match field {
            DateField::ProcessingDate => self.processing_date = Some(date),
            DateField::BusinessDate => self.business_date = Some(date),
        }
    }

    /// Sets the slots of `shape` from `dates`, given in the shape's parameter
    /// order. Extra dates are ignored; missing ones leave their slot as is.
    pub fn enter(&mut self, shape: TemporalShape, dates: &[Expression]) {
        for (field, date) in shape.date_fields().iter().zip(dates) {
            self.set(*field, date.clone());
        }
    }

    /// Records dates supplied explicitly at a call site to a `shape` target.
    /// `arguments` excludes the receiver.
    pub fn record_supplied(&mut self, shape: TemporalShape, arguments: &[Expression]) {
        if arguments.len() >= shape.date_fields().len() {
            self.enter(shape, arguments);
        }
    }
}
