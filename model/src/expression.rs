//! Expression trees attached to qualified properties and navigation call sites.
//!
//! Every node carries its resolved type and multiplicity. Trees are built
//! bottom-up and treated as immutable once attached to a model element;
//! rewriting produces a new tree.

use std::collections::BTreeSet;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::model::{FunctionType, Multiplicity, Primitive, SourceInformation, TypeRef};

/// A typed variable, used both as a declared parameter and as a reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Variable {
    /// Variable name, without the `$` sigil.
    pub name: String,
    /// Variable type.
    pub generic_type: TypeRef,
    /// Variable multiplicity.
    pub multiplicity: Multiplicity,
}

impl Variable {
    /// Creates a variable.
    pub fn new(name: impl Into<String>, generic_type: TypeRef, multiplicity: Multiplicity) -> Self {
        Self {
            name: name.into(),
            generic_type,
            multiplicity,
        }
    }

    /// Creates a `Date[1]` variable.
    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, TypeRef::Primitive(Primitive::Date), Multiplicity::ONE)
    }

    /// Returns an expression referencing this variable.
    #[must_use]
    pub fn reference(&self) -> Expression {
        Expression {
            kind: ExprKind::Variable(self.name.clone()),
            generic_type: self.generic_type.clone(),
            multiplicity: self.multiplicity,
        }
    }
}

/// A resolved built-in function.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FunctionRef {
    /// Full descriptor (e.g. `"meta::pure::functions::boolean::eq_Any_1__Any_1__Boolean_1_"`).
    pub path: String,
    /// Short name used at call sites (e.g. `"eq"`).
    pub name: String,
}

/// A literal value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Literal {
    /// A date literal, kept in its source form (e.g. `"2020-01-01"`).
    Date(String),
    /// A string literal.
    String(String),
    /// An integer literal.
    Integer(i64),
    /// A boolean literal.
    Boolean(bool),
}

/// Ordering comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Comparison {
    /// `<`
    LessThan,
    /// `<=`
    LessThanEqual,
}

impl Comparison {
    /// The infix symbol.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::LessThan => "<",
            Comparison::LessThanEqual => "<=",
        }
    }
}

/// A single-parameter lambda, as passed to `filter`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Lambda {
    /// The bound parameter.
    pub parameter: Variable,
    /// The enclosing receiver, then the variables the body references from
    /// the enclosing scope.
    pub open_variables: Vec<String>,
    /// Lambda body.
    pub body: Expression,
    /// Lambda classifier: `{parameter -> body type}`.
    pub signature: FunctionType,
}

/// Which member a navigation resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Accessor {
    /// A plain property reference.
    Property,
    /// A qualified property of the given arity (receiver included).
    Qualified {
        /// Number of parameters including the receiver.
        parameter_count: usize,
    },
}

/// A property navigation: `receiver.property(args...)`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Navigation {
    /// Path of the class the receiver is typed as.
    pub owner: String,
    /// Property name as written at the call site.
    pub property: String,
    /// Member the navigation currently targets.
    pub accessor: Accessor,
    /// Receiver first, then explicit arguments.
    pub arguments: Vec<Expression>,
    /// Arguments as written, kept once dates have been spliced in.
    #[cfg_attr(feature = "serde", serde(default))]
    pub original_arguments: Option<Vec<Expression>>,
    /// Call-site location.
    #[cfg_attr(feature = "serde", serde(default))]
    pub source_information: Option<SourceInformation>,
}

impl Navigation {
    /// Creates a plain property navigation with the given receiver and
    /// explicit arguments.
    pub fn new(
        owner: impl Into<String>,
        property: impl Into<String>,
        receiver: Expression,
        arguments: Vec<Expression>,
    ) -> Self {
        let mut all = Vec::with_capacity(arguments.len() + 1);
        all.push(receiver);
        all.extend(arguments);
        Self {
            owner: owner.into(),
            property: property.into(),
            accessor: Accessor::Property,
            arguments: all,
            original_arguments: None,
            source_information: None,
        }
    }

    /// Attaches a call-site location.
    #[must_use]
    pub fn at(mut self, source_information: SourceInformation) -> Self {
        self.source_information = Some(source_information);
        self
    }

    /// The receiver expression.
    #[must_use]
    pub fn receiver(&self) -> Option<&Expression> {
        self.arguments.first()
    }

    /// Arguments after the receiver.
    #[must_use]
    pub fn explicit_arguments(&self) -> &[Expression] {
        self.arguments.get(1..).unwrap_or(&[])
    }
}

/// Expression node variants.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ExprKind {
    /// `$name`
    Variable(String),
    /// A literal.
    Literal(Literal),
    /// `left == right`
    Equal {
        /// Resolved `eq` built-in.
        function: FunctionRef,
        /// Left operand.
        left: Box<Expression>,
        /// Right operand.
        right: Box<Expression>,
    },
    /// `left < right` or `left <= right`
    Compare {
        /// Resolved comparison built-in.
        function: FunctionRef,
        /// Operator.
        op: Comparison,
        /// Left operand.
        left: Box<Expression>,
        /// Right operand.
        right: Box<Expression>,
    },
    /// `a && b && ...`
    And {
        /// Resolved `and` built-in.
        function: FunctionRef,
        /// Conjuncts, at least two.
        operands: Vec<Expression>,
    },
    /// `source->filter(v | predicate)`
    Filter {
        /// Resolved `filter` built-in.
        function: FunctionRef,
        /// Collection being filtered.
        source: Box<Expression>,
        /// Predicate lambda.
        predicate: Box<Lambda>,
    },
    /// `receiver.property(args...)`
    Navigate(Navigation),
}

/// A typed expression node.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Expression {
    /// Node variant.
    pub kind: ExprKind,
    /// Resolved type.
    pub generic_type: TypeRef,
    /// Resolved multiplicity.
    pub multiplicity: Multiplicity,
}

impl Expression {
    /// A `Date[1]` literal.
    pub fn date(value: impl Into<String>) -> Self {
        Self {
            kind: ExprKind::Literal(Literal::Date(value.into())),
            generic_type: TypeRef::Primitive(Primitive::Date),
            multiplicity: Multiplicity::ONE,
        }
    }

    /// Wraps a navigation with its result type.
    #[must_use]
    pub fn navigate(navigation: Navigation, generic_type: TypeRef, multiplicity: Multiplicity) -> Self {
        Self {
            kind: ExprKind::Navigate(navigation),
            generic_type,
            multiplicity,
        }
    }

    /// Returns the navigation if this node is one.
    #[must_use]
    pub fn as_navigation(&self) -> Option<&Navigation> {
        match &self.kind {
            ExprKind::Navigate(navigation) => Some(navigation),
            _ => None,
        }
    }

    /// Variables referenced but not bound within this tree, in name order.
    #[must_use]
    pub fn free_variables(&self) -> BTreeSet<String> {
        let mut free = BTreeSet::new();
        self.collect_free(&mut Vec::new(), &mut free);
        free
    }

    fn collect_free(&self, bound: &mut Vec<String>, free: &mut BTreeSet<String>) {
        match &self.kind {
            ExprKind::Variable(name) => {
                if !bound.iter().any(|b| b == name) {
                    free.insert(name.clone());
                }
            }
            ExprKind::Literal(_) => {}
            ExprKind::Equal { left, right, .. } | ExprKind::Compare { left, right, .. } => {
                left.collect_free(bound, free);
                right.collect_free(bound, free);
            }
            ExprKind::And { operands, .. } => {
                for operand in operands {
                    operand.collect_free(bound, free);
                }
            }
            ExprKind::Filter {
                source, predicate, ..
            } => {
                source.collect_free(bound, free);
                bound.push(predicate.parameter.name.clone());
                predicate.body.collect_free(bound, free);
                bound.pop();
            }
            ExprKind::Navigate(navigation) => {
                for argument in &navigation.arguments {
                    argument.collect_free(bound, free);
                }
            }
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Variable(name) => write!(f, "${name}"),
            ExprKind::Literal(Literal::Date(value)) => write!(f, "%{value}"),
            ExprKind::Literal(Literal::String(value)) => write!(f, "'{value}'"),
            ExprKind::Literal(Literal::Integer(value)) => write!(f, "{value}"),
            ExprKind::Literal(Literal::Boolean(value)) => write!(f, "{value}"),
            ExprKind::Equal { left, right, .. } => write!(f, "{left} == {right}"),
            ExprKind::Compare {
                op, left, right, ..
            } => write!(f, "{left} {} {right}", op.symbol()),
            ExprKind::And { operands, .. } => {
                for (i, operand) in operands.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" && ")?;
                    }
                    write!(f, "{operand}")?;
                }
                Ok(())
            }
            ExprKind::Filter {
                source, predicate, ..
            } => write!(
                f,
                "{source}->filter({}|{})",
                predicate.parameter.name, predicate.body
            ),
            ExprKind::Navigate(navigation) => {
                match navigation.receiver() {
                    Some(receiver) => write!(f, "{receiver}.{}", navigation.property)?,
                    None => f.write_str(&navigation.property)?,
                }
                let explicit = navigation.explicit_arguments();
                if !explicit.is_empty() || matches!(navigation.accessor, Accessor::Qualified { .. })
                {
                    f.write_str("(")?;
                    for (i, argument) in explicit.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{argument}")?;
                    }
                    f.write_str(")")?;
                }
                Ok(())
            }
        }
    }
}
