//! The symbol service the pass resolves built-ins through.

use milestone_model::{FunctionRef, Multiplicity, Primitive, StereotypeRef, TypeRef};

use crate::error::CompileError;
use crate::naming::{GENERATED_DATE_PROPERTY_TAG, GENERATED_PROPERTY_TAG, MILESTONING_PROFILE};
use crate::shape::TEMPORAL_PROFILE;

/// `eq` over two single values.
pub const EQ: &str = "meta::pure::functions::boolean::eq_Any_1__Any_1__Boolean_1_";
/// Boolean conjunction.
pub const AND: &str = "meta::pure::functions::boolean::and_Boolean_1__Boolean_1__Boolean_1_";
/// Collection filter.
pub const FILTER: &str = "meta::pure::functions::collection::filter_T_MANY__Function_1__T_MANY_";
/// Strict date ordering.
pub const LESS_THAN: &str = "meta::pure::functions::boolean::lessThan_Date_1__Date_1__Boolean_1_";
/// Non-strict date ordering.
pub const LESS_THAN_EQUAL: &str =
    "meta::pure::functions::boolean::lessThanEqual_Date_1__Date_1__Boolean_1_";

/// Resolution of built-in types, multiplicities, functions and stereotypes.
///
/// Symbol tables must be complete before the pass runs; generated accessors
/// capture what this service returns.
pub trait SymbolService {
    /// Resolves a type by name.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::UnknownSymbol`] for unknown names.
    fn resolve_type(&self, name: &str) -> Result<TypeRef, CompileError>;

    /// Resolves a multiplicity keyword (`one`, `zeroone`, `zeromany`, `onemany`).
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::UnknownSymbol`] for unknown keywords.
    fn resolve_multiplicity(&self, name: &str) -> Result<Multiplicity, CompileError>;

    /// Resolves a built-in function by full descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::UnknownSymbol`] for unknown descriptors.
    fn resolve_function(&self, path: &str) -> Result<FunctionRef, CompileError>;

    /// Resolves a stereotype by profile and value.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::UnknownSymbol`] when the profile does not
    /// declare the value.
    fn resolve_stereotype(&self, profile: &str, value: &str) -> Result<StereotypeRef, CompileError>;
}

/// The canonical built-ins.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoreSymbols;

impl CoreSymbols {
    const FUNCTIONS: [(&'static str, &'static str); 5] = [
        (EQ, "eq"),
        (AND, "and"),
        (FILTER, "filter"),
        (LESS_THAN, "lessThan"),
        (LESS_THAN_EQUAL, "lessThanEqual"),
    ];

    const STEREOTYPES: [(&'static str, &'static str); 5] = [
        (TEMPORAL_PROFILE, "businesstemporal"),
        (TEMPORAL_PROFILE, "processingtemporal"),
        (TEMPORAL_PROFILE, "bitemporal"),
        (MILESTONING_PROFILE, GENERATED_PROPERTY_TAG),
        (MILESTONING_PROFILE, GENERATED_DATE_PROPERTY_TAG),
    ];
}

impl SymbolService for CoreSymbols {
    fn resolve_type(&self, name: &str) -> Result<TypeRef, CompileError> {
        Primitive::from_name(name)
            .map(TypeRef::Primitive)
            .ok_or_else(|| CompileError::UnknownSymbol {
                kind: "type",
                name: name.to_string(),
            })
    }

    fn resolve_multiplicity(&self, name: &str) -> Result<Multiplicity, CompileError> {
        match name {
            "one" => Ok(Multiplicity::ONE),
            "zeroone" => Ok(Multiplicity::ZERO_ONE),
            "zeromany" => Ok(Multiplicity::ZERO_MANY),
            "onemany" => Ok(Multiplicity::ONE_MANY),
            _ => Err(CompileError::UnknownSymbol {
                kind: "multiplicity",
                name: name.to_string(),
            }),
        }
    }

    fn resolve_function(&self, path: &str) -> Result<FunctionRef, CompileError> {
        Self::FUNCTIONS
            .iter()
            .find(|(p, _)| *p == path)
            .map(|(p, name)| FunctionRef {
                path: (*p).to_string(),
                name: (*name).to_string(),
            })
            .ok_or_else(|| CompileError::UnknownSymbol {
                kind: "function",
                name: path.to_string(),
            })
    }

    fn resolve_stereotype(&self, profile: &str, value: &str) -> Result<StereotypeRef, CompileError> {
        if Self::STEREOTYPES
            .iter()
            .any(|(p, v)| *p == profile && *v == value)
        {
            Ok(StereotypeRef::new(profile, value))
        } else {
            Err(CompileError::UnknownSymbol {
                kind: "stereotype",
                name: format!("{profile}.{value}"),
            })
        }
    }
}
