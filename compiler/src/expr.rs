//! Builds the generated accessors and the filter expressions behind them.
//!
//! One builder covers the three accessor forms. Every body has the shape
//! `$this.<edge point>->filter(v_milestoning | <predicate>)`; the forms differ
//! in their declared parameters and predicate.

use milestone_model::{
    Comparison, ExprKind, Expression, FunctionType, Lambda, Navigation, Property,
    QualifiedProperty, StereotypeRef, TypeRef, Variable,
};

use crate::error::CompileError;
use crate::naming::{
    edge_point_property_name, range_property_name, FILTER_VARIABLE, GENERATED_PROPERTY_TAG,
    MILESTONING_PROFILE, RANGE_END, RANGE_START, THIS,
};
use crate::options::RangeFilter;
use crate::shape::{DateField, TemporalShape};
use crate::symbols::{SymbolService, AND, EQ, FILTER, LESS_THAN, LESS_THAN_EQUAL};

/// Which accessor to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorForm {
    /// One explicit `Date` parameter per required date field.
    AllDates,
    /// No explicit parameters; dates are bound at call sites.
    NoArg,
    /// `(start, end)` over the primary date field.
    Range(RangeFilter),
}

/// Builds accessors for one milestoned property.
pub struct AccessorBuilder<'a> {
    symbols: &'a dyn SymbolService,
    source_class: &'a str,
    target_class: &'a str,
    target_shape: TemporalShape,
    original: &'a Property,
}

impl<'a> AccessorBuilder<'a> {
    /// Creates a builder for `original`, navigated from `source_class` to a
    /// `target_class` of shape `target_shape`.
    #[must_use]
    pub fn new(
        symbols: &'a dyn SymbolService,
        source_class: &'a str,
        target_class: &'a str,
        target_shape: TemporalShape,
        original: &'a Property,
    ) -> Self {
        Self {
            symbols,
            source_class,
            target_class,
            target_shape,
            original,
        }
    }

    /// Builds the qualified property for `form`.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::UnknownSymbol`] if a built-in cannot be resolved.
    pub fn build(&self, form: AccessorForm) -> Result<QualifiedProperty, CompileError> {
        let date_type = self.symbols.resolve_type("Date")?;
        let one = self.symbols.resolve_multiplicity("one")?;

        let this = Variable::new(THIS, TypeRef::Class(self.source_class.to_string()), one);
        let parameter_names: Vec<&str> = match form {
            AccessorForm::AllDates | AccessorForm::NoArg => self.target_shape.date_property_names(),
            AccessorForm::Range(_) => vec![RANGE_START, RANGE_END],
        };
        let date_parameters: Vec<Variable> = parameter_names
            .iter()
            .map(|name| Variable::new(*name, date_type.clone(), one))
            .collect();

        let mut parameters = vec![this.clone()];
        if form != AccessorForm::NoArg {
            parameters.extend(date_parameters.iter().cloned());
        }

        let (name, multiplicity) = match form {
            AccessorForm::AllDates | AccessorForm::NoArg => {
                (self.original.name.clone(), self.original.multiplicity)
            }
            AccessorForm::Range(_) => (
                range_property_name(&self.original.name),
                self.symbols.resolve_multiplicity("zeromany")?,
            ),
        };

        let body = self.filter_body(&this, &date_parameters, form)?;

        let mut stereotypes: Vec<StereotypeRef> = self.original.stereotypes.clone();
        stereotypes.push(
            self.symbols
                .resolve_stereotype(MILESTONING_PROFILE, GENERATED_PROPERTY_TAG)?,
        );

        Ok(QualifiedProperty {
            name,
            generic_type: self.original.generic_type.clone(),
            multiplicity,
            stereotypes,
            tagged_values: self.original.tagged_values.clone(),
            owner: self.original.owner.clone(),
            signature: FunctionType {
                parameters,
                return_type: self.original.generic_type.clone(),
                return_multiplicity: multiplicity,
            },
            expression_sequence: vec![body],
        })
    }

    fn filter_body(
        &self,
        this: &Variable,
        date_parameters: &[Variable],
        form: AccessorForm,
    ) -> Result<Expression, CompileError> {
        let target_type = self.original.generic_type.clone();
        let one = self.symbols.resolve_multiplicity("one")?;
        let many = self.symbols.resolve_multiplicity("zeromany")?;
        let boolean = self.symbols.resolve_type("Boolean")?;

        let edge_point = Expression::navigate(
            Navigation::new(
                self.source_class,
                edge_point_property_name(&self.original.name),
                this.reference(),
                Vec::new(),
            ),
            target_type.clone(),
            self.original.multiplicity.with_unbounded_upper(),
        );

        let version = Variable::new(FILTER_VARIABLE, target_type.clone(), one);

        let comparisons = match form {
            AccessorForm::AllDates | AccessorForm::NoArg => self
                .target_shape
                .date_fields()
                .iter()
                .zip(date_parameters)
                .map(|(field, parameter)| self.equal(&version, *field, parameter))
                .collect::<Result<Vec<_>, _>>()?,
            AccessorForm::Range(filter) => {
                let field = self.target_shape.primary_date_field();
                let date_type = self.symbols.resolve_type("Date")?;
                let start = Variable::new(RANGE_START, date_type.clone(), one);
                let end = Variable::new(RANGE_END, date_type, one);
                match filter {
                    RangeFilter::StartEquality => vec![self.equal(&version, field, &start)?],
                    RangeFilter::HalfOpen => vec![
                        self.compare(
                            Comparison::LessThanEqual,
                            start.reference(),
                            self.date_of(&version, field)?,
                        )?,
                        self.compare(
                            Comparison::LessThan,
                            self.date_of(&version, field)?,
                            end.reference(),
                        )?,
                    ],
                }
            }
        };

        let predicate = self.conjunction(comparisons)?;
        let free = predicate.free_variables();
        let open_variables = std::iter::once(this.name.clone())
            .chain(
                date_parameters
                    .iter()
                    .filter(|p| free.contains(&p.name))
                    .map(|p| p.name.clone()),
            )
            .collect();
        let lambda = Lambda {
            parameter: version.clone(),
            open_variables,
            signature: FunctionType {
                parameters: vec![version],
                return_type: boolean,
                return_multiplicity: one,
            },
            body: predicate,
        };

        Ok(Expression {
            kind: ExprKind::Filter {
                function: self.symbols.resolve_function(FILTER)?,
                source: Box::new(edge_point),
                predicate: Box::new(lambda),
            },
            generic_type: target_type,
            multiplicity: many,
        })
    }

    /// `$v_milestoning.<field>`
    fn date_of(&self, version: &Variable, field: DateField) -> Result<Expression, CompileError> {
        Ok(Expression::navigate(
            Navigation::new(self.target_class, field.name(), version.reference(), Vec::new()),
            self.symbols.resolve_type("Date")?,
            self.symbols.resolve_multiplicity("one")?,
        ))
    }

    fn equal(
        &self,
        version: &Variable,
        field: DateField,
        parameter: &Variable,
    ) -> Result<Expression, CompileError> {
        Ok(Expression {
            kind: ExprKind::Equal {
                function: self.symbols.resolve_function(EQ)?,
                left: Box::new(self.date_of(version, field)?),
                right: Box::new(parameter.reference()),
            },
            generic_type: self.symbols.resolve_type("Boolean")?,
            multiplicity: self.symbols.resolve_multiplicity("one")?,
        })
    }

    fn compare(
        &self,
        op: Comparison,
        left: Expression,
        right: Expression,
    ) -> Result<Expression, CompileError> {
        let function = match op {
            Comparison::LessThan => LESS_THAN,
            Comparison::LessThanEqual => LESS_THAN_EQUAL,
        };
        Ok(Expression {
            kind: ExprKind::Compare {
                function: self.symbols.resolve_function(function)?,
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            generic_type: self.symbols.resolve_type("Boolean")?,
            multiplicity: self.symbols.resolve_multiplicity("one")?,
        })
    }

    /// A single comparison is returned as is.
    fn conjunction(&self, mut operands: Vec<Expression>) -> Result<Expression, CompileError> {
        if operands.len() == 1 {
            if let Some(single) = operands.pop() {
                return Ok(single);
            }
        }
        Ok(Expression {
            kind: ExprKind::And {
                function: self.symbols.resolve_function(AND)?,
                operands,
            },
            generic_type: self.symbols.resolve_type("Boolean")?,
            multiplicity: self.symbols.resolve_multiplicity("one")?,
        })
    }
}
