//! Post-compilation milestoning invariants.

pub mod accessors;
pub mod associations;
pub mod idempotence;
pub mod shapes;

use milestone_model::{Class, Model, TypeRef};

/// Resolves an association member path the way the compiler does, falling
/// back to the final path segment for unresolved stubs.
pub(crate) fn member_class<'m>(model: &'m Model, path: &str) -> Option<&'m Class> {
    model.resolve_class(&TypeRef::Stub(path.to_string()))
}
