//! Property-based tests for the permission table.

use proptest::prelude::*;

use super::table::{can_access_module, has_permission, permissions_for};
use super::types::{Action, Module, Role};

fn role_strategy() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::Manager), Just(Role::Accountant), Just(Role::Employee)]
}

fn module_strategy() -> impl Strategy<Value = Module> {
    proptest::sample::select(Module::ALL.to_vec())
}

fn action_strategy() -> impl Strategy<Value = Action> {
    proptest::sample::select(Action::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The manager holds every permission any other role holds.
    #[test]
    fn prop_manager_is_superset(
        role in role_strategy(),
        module in module_strategy(),
        action in action_strategy(),
    ) {
        if has_permission(role, module, action) {
            prop_assert!(has_permission(Role::Manager, module, action));
        }
    }

    /// Any granted action implies the module can be viewed.
    #[test]
    fn prop_any_grant_implies_view(
        role in role_strategy(),
        module in module_strategy(),
    ) {
        if !permissions_for(role, module).is_empty() {
            prop_assert!(can_access_module(role, module));
        }
    }

    /// Employees never approve, void or delete.
    #[test]
    fn prop_employee_never_approves_or_voids(
        module in module_strategy(),
    ) {
        prop_assert!(!has_permission(Role::Employee, module, Action::Approve));
        prop_assert!(!has_permission(Role::Employee, module, Action::Void));
        prop_assert!(!has_permission(Role::Employee, module, Action::Delete));
    }
}
