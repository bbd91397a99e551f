//! Explicit tenant context threaded through every service call.

use ledgerline_shared::types::{CompanyId, UserId};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::ledger::{LedgerError, LedgerResult};
use crate::permissions::{Action, Module, Role, has_permission};

/// Who is calling, for which company, in which role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantContext {
    /// Tenant the call is scoped to.
    pub company_id: CompanyId,
    /// Acting user, stamped on created/posted records.
    pub user_id: UserId,
    /// Role used for the permission gate.
    pub role: Role,
}

impl TenantContext {
    /// Creates a new context.
    #[must_use]
    pub const fn new(company_id: CompanyId, user_id: UserId, role: Role) -> Self {
        Self {
            company_id,
            user_id,
            role,
        }
    }

    /// Returns the company id, rejecting the nil tenant.
    pub fn company(&self) -> LedgerResult<CompanyId> {
        if self.company_id.is_nil() {
            return Err(LedgerError::MissingCompanyContext);
        }
        Ok(self.company_id)
    }

    /// Checks the permission gate and the tenant in one step.
    ///
    /// # Errors
    ///
    /// `MissingCompanyContext` for a nil company, `PermissionDenied` when the
    /// role lacks `action` on `module`.
    pub fn require(&self, module: Module, action: Action) -> LedgerResult<CompanyId> {
        let company_id = self.company()?;
        if !has_permission(self.role, module, action) {
            warn!(
                company_id = %company_id,
                user_id = %self.user_id,
                role = %self.role,
                module = %module,
                action = %action,
                "permission denied"
            );
            return Err(LedgerError::PermissionDenied {
                role: self.role,
                module,
                action,
            });
        }
        Ok(company_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_nil_company_is_rejected_before_permissions() {
        let nil = CompanyId::from_uuid(Uuid::nil());
        let ctx = TenantContext::new(nil, UserId::new(), Role::Manager);
        assert!(matches!(
            ctx.require(Module::Accounting, Action::View),
            Err(LedgerError::MissingCompanyContext)
        ));
    }

    #[test]
    fn test_require_returns_company() {
        let company_id = CompanyId::new();
        let ctx = TenantContext::new(company_id, UserId::new(), Role::Accountant);
        assert_eq!(ctx.require(Module::Accounting, Action::Create).unwrap(), company_id);
        assert!(matches!(
            ctx.require(Module::Accounting, Action::Delete),
            Err(LedgerError::PermissionDenied {
                role: Role::Accountant,
                module: Module::Accounting,
                action: Action::Delete,
            })
        ));
    }
}
