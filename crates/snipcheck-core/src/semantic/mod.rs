//! Semantic analysis module
//!
//! Provides the lexical scope stack and the identifier classification used by
//! the unused-variable pass.

pub mod binding;
pub mod scope;

pub use binding::{declared_name, hoisted_names, is_declaration_site, parameter_names};
pub use scope::{Scope, ScopeKind, ScopeTracker};
