//! Role-based permission gate.
//!
//! A static role → (module, action) table. There are no per-user overrides and
//! no dynamic policy evaluation; every service checks the gate through
//! [`crate::context::TenantContext::require`] before touching storage.

pub mod table;
pub mod types;

#[cfg(test)]
mod table_props;

pub use table::{can_access_module, has_any_permission, has_permission, permissions_for};
pub use types::{Action, Module, Role};
