//! The static permission table.

use super::types::{Action, Module, Role};

use Action::{Approve, Create, Delete, Edit, Export, View, Void};

const ALL_ACTIONS: &[Action] = &Action::ALL;

/// Actions granted to `role` on `module`.
#[must_use]
pub fn permissions_for(role: Role, module: Module) -> &'static [Action] {
    match role {
        Role::Manager => ALL_ACTIONS,
        Role::Accountant => accountant(module),
        Role::Employee => employee(module),
    }
}

fn accountant(module: Module) -> &'static [Action] {
    match module {
        Module::Dashboard | Module::Inventory | Module::Customers | Module::Suppliers => &[View],
        Module::Sales | Module::Purchases | Module::Reports => &[View, Export],
        Module::Expenses | Module::Vouchers => &[View, Create, Edit, Export, Approve],
        Module::Accounting => &[View, Create, Edit, Export, Approve, Void],
        Module::Settings | Module::ActivityLog => &[View],
        Module::Users => &[],
    }
}

fn employee(module: Module) -> &'static [Action] {
    match module {
        Module::Dashboard | Module::Inventory | Module::Suppliers => &[View],
        Module::Sales | Module::Purchases | Module::Customers | Module::Vouchers => {
            &[View, Create]
        }
        Module::Expenses
        | Module::Accounting
        | Module::Reports
        | Module::Settings
        | Module::Users
        | Module::ActivityLog => &[],
    }
}

/// Returns true if `role` may perform `action` in `module`.
#[must_use]
pub fn has_permission(role: Role, module: Module, action: Action) -> bool {
    permissions_for(role, module).contains(&action)
}

/// Returns true if `role` holds at least one of `actions` in `module`.
#[must_use]
pub fn has_any_permission(role: Role, module: Module, actions: &[Action]) -> bool {
    actions.iter().any(|action| has_permission(role, module, *action))
}

/// Returns true if `role` may open `module` at all.
#[must_use]
pub fn can_access_module(role: Role, module: Module) -> bool {
    has_permission(role, module, View)
}
