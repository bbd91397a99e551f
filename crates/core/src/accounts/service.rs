//! Chart of accounts registry.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use ledgerline_shared::types::{AccountId, CompanyId};
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::template::DEFAULT_CHART;
use crate::context::TenantContext;
use crate::ledger::account::{validate_code, validate_name};
use crate::ledger::balance::expand_to_ancestors;
use crate::ledger::{
    Account, AccountFilter, AccountNode, AccountPatch, AccountType, BalanceDelta,
    BalanceDirection, LedgerError, LedgerResult, NewAccount,
};
use crate::permissions::{Action, Module};
use crate::store::{LedgerStore, StoreError};

/// Hierarchical chart of accounts of each company.
pub struct AccountRegistry<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for AccountRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: LedgerStore + ?Sized> AccountRegistry<S> {
    /// Creates a registry over `store`.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Creates an account.
    ///
    /// The level is derived from the parent and the normal balance defaults
    /// from the account type.
    pub async fn create(&self, ctx: &TenantContext, input: NewAccount) -> LedgerResult<Account> {
        let company_id = ctx.require(Module::Accounting, Action::Create)?;
        self.create_in(company_id, input).await
    }

    async fn create_in(&self, company_id: CompanyId, input: NewAccount) -> LedgerResult<Account> {
        input.validate()?;
        let code = input.code.trim().to_string();

        if self.store.find_account_by_code(company_id, &code).await?.is_some() {
            return Err(LedgerError::DuplicateCode(code));
        }

        let level = match input.parent_id {
            Some(parent_id) => {
                let parent = self.fetch(company_id, parent_id).await?;
                if !parent.is_header {
                    return Err(LedgerError::ParentNotHeader(parent_id));
                }
                parent.level + 1
            }
            None => 1,
        };

        let now = Utc::now();
        let account = Account {
            id: AccountId::new(),
            company_id,
            code,
            name: input.name.trim().to_string(),
            description: input.description,
            account_type: input.account_type,
            parent_id: input.parent_id,
            level,
            is_header: input.is_header,
            normal_balance: input
                .normal_balance
                .unwrap_or_else(|| input.account_type.default_normal_balance()),
            opening_balance: input.opening_balance,
            current_balance: input.opening_balance,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        self.store
            .insert_account(&account)
            .await
            .map_err(|e| duplicate_code(e, &account.code))?;

        if !account.opening_balance.is_zero() && account.parent_id.is_some() {
            self.add_opening_to_ancestors(company_id, &account).await?;
        }

        info!(
            company_id = %company_id,
            account_id = %account.id,
            code = %account.code,
            account_type = %account.account_type,
            "account created"
        );
        Ok(account)
    }

    /// Applies a partial update.
    ///
    /// Moving an account or changing its opening balance does not touch the
    /// cached balances of the headers above it; `BalanceAggregator::recalculate`
    /// brings them back in line.
    pub async fn update(
        &self,
        ctx: &TenantContext,
        id: AccountId,
        patch: AccountPatch,
    ) -> LedgerResult<Account> {
        let company_id = ctx.require(Module::Accounting, Action::Edit)?;
        let mut account = self.fetch(company_id, id).await?;

        let type_changes = patch.account_type.is_some_and(|t| t != account.account_type);
        let header_changes = patch.is_header.is_some_and(|h| h != account.is_header);
        if (type_changes || header_changes) && self.has_postings(company_id, id).await? {
            return Err(LedgerError::AccountHasPostings(id));
        }
        if header_changes && account.is_header && self.has_children(company_id, id).await? {
            return Err(LedgerError::AccountHasChildren(id));
        }

        if let Some(code) = patch.code {
            validate_code(&code)?;
            let code = code.trim().to_string();
            if code != account.code {
                if self.store.find_account_by_code(company_id, &code).await?.is_some() {
                    return Err(LedgerError::DuplicateCode(code));
                }
                account.code = code;
            }
        }
        if let Some(name) = patch.name {
            validate_name(&name)?;
            account.name = name.trim().to_string();
        }
        if let Some(description) = patch.description {
            account.description = description;
        }
        if let Some(account_type) = patch.account_type {
            if account_type != account.account_type {
                account.normal_balance = account_type.default_normal_balance();
            }
            account.account_type = account_type;
        }
        if let Some(is_header) = patch.is_header {
            account.is_header = is_header;
        }
        if let Some(opening) = patch.opening_balance {
            account.current_balance += opening - account.opening_balance;
            account.opening_balance = opening;
        }
        if account.is_header && !account.opening_balance.is_zero() {
            return Err(LedgerError::InvalidField {
                field: "opening_balance",
                message: "header accounts carry no balance of their own".to_string(),
            });
        }

        let mut level_changed = false;
        if let Some(parent_id) = patch.parent_id
            && parent_id != account.parent_id
        {
            let level = match parent_id {
                Some(parent_id) => {
                    self.check_new_parent(company_id, id, parent_id).await?.level + 1
                }
                None => 1,
            };
            level_changed = level != account.level;
            account.parent_id = parent_id;
            account.level = level;
        }

        if patch.is_active == Some(false) && account.is_active {
            self.ensure_no_active_children(company_id, id).await?;
        }
        if let Some(is_active) = patch.is_active {
            account.is_active = is_active;
        }

        account.updated_at = Utc::now();
        self.store
            .update_account(&account)
            .await
            .map_err(|e| duplicate_code(e, &account.code))?;

        if level_changed {
            self.relevel_descendants(company_id, &account).await?;
        }

        info!(company_id = %company_id, account_id = %id, "account updated");
        Ok(account)
    }

    /// Soft-deletes an account.
    ///
    /// Fails while posted lines reference it or while it has active children.
    pub async fn delete(&self, ctx: &TenantContext, id: AccountId) -> LedgerResult<()> {
        let company_id = ctx.require(Module::Accounting, Action::Delete)?;
        let mut account = self.fetch(company_id, id).await?;

        if self.has_postings(company_id, id).await? {
            return Err(LedgerError::AccountHasPostings(id));
        }
        self.ensure_no_active_children(company_id, id).await?;

        account.is_active = false;
        account.updated_at = Utc::now();
        self.store.update_account(&account).await?;

        info!(
            company_id = %company_id,
            account_id = %id,
            code = %account.code,
            "account deactivated"
        );
        Ok(())
    }

    /// Gets an account by id.
    pub async fn get(&self, ctx: &TenantContext, id: AccountId) -> LedgerResult<Account> {
        let company_id = ctx.require(Module::Accounting, Action::View)?;
        self.fetch(company_id, id).await
    }

    /// Gets an account by code.
    pub async fn get_by_code(&self, ctx: &TenantContext, code: &str) -> LedgerResult<Account> {
        let company_id = ctx.require(Module::Accounting, Action::View)?;
        self.store
            .find_account_by_code(company_id, code)
            .await?
            .ok_or_else(|| LedgerError::AccountCodeNotFound(code.to_string()))
    }

    /// Lists accounts passing `filter`, ordered by code.
    pub async fn list(
        &self,
        ctx: &TenantContext,
        filter: AccountFilter,
    ) -> LedgerResult<Vec<Account>> {
        let company_id = ctx.require(Module::Accounting, Action::View)?;
        let accounts = self.store.list_accounts(company_id, &filter).await?;
        debug!(company_id = %company_id, count = accounts.len(), "listed accounts");
        Ok(accounts)
    }

    /// Active postable accounts of one type, ordered by code.
    pub async fn get_by_type(
        &self,
        ctx: &TenantContext,
        account_type: AccountType,
    ) -> LedgerResult<Vec<Account>> {
        self.list(ctx, AccountFilter::postable_of_type(account_type)).await
    }

    /// Direct children of `parent_id`, ordered by code.
    pub async fn get_children(
        &self,
        ctx: &TenantContext,
        parent_id: AccountId,
    ) -> LedgerResult<Vec<Account>> {
        self.list(ctx, AccountFilter::children_of(parent_id)).await
    }

    /// The active chart as a forest, roots and children ordered by code.
    pub async fn get_tree(&self, ctx: &TenantContext) -> LedgerResult<Vec<AccountNode>> {
        let accounts = self
            .list(
                ctx,
                AccountFilter {
                    is_active: Some(true),
                    ..AccountFilter::default()
                },
            )
            .await?;
        Ok(build_tree(accounts))
    }

    /// Seeds the default chart. Codes that already exist are skipped, so the
    /// call can be repeated. Returns the accounts created.
    pub async fn initialize_chart(&self, ctx: &TenantContext) -> LedgerResult<Vec<Account>> {
        let company_id = ctx.require(Module::Accounting, Action::Create)?;
        let mut ids_by_code: HashMap<&str, AccountId> = HashMap::new();
        let mut created = Vec::new();

        for template in DEFAULT_CHART {
            if let Some(existing) = self
                .store
                .find_account_by_code(company_id, template.code)
                .await?
            {
                ids_by_code.insert(template.code, existing.id);
                continue;
            }

            let parent_id = template
                .parent_code
                .map(|code| {
                    ids_by_code
                        .get(code)
                        .copied()
                        .ok_or_else(|| LedgerError::AccountCodeNotFound(code.to_string()))
                })
                .transpose()?;

            let input = NewAccount {
                code: template.code.to_string(),
                name: template.name.to_string(),
                description: None,
                account_type: template.account_type,
                parent_id,
                is_header: template.is_header,
                normal_balance: template.normal_balance,
                opening_balance: Decimal::ZERO,
            };
            let account = self.create_in(company_id, input).await?;
            ids_by_code.insert(template.code, account.id);
            created.push(account);
        }

        info!(company_id = %company_id, created = created.len(), "default chart initialized");
        Ok(created)
    }

    async fn fetch(&self, company_id: CompanyId, id: AccountId) -> LedgerResult<Account> {
        self.store
            .find_account(company_id, id)
            .await?
            .ok_or(LedgerError::AccountNotFound(id))
    }

    /// Carries a new leaf's opening balance into the cached balances of the
    /// headers above it.
    async fn add_opening_to_ancestors(
        &self,
        company_id: CompanyId,
        account: &Account,
    ) -> LedgerResult<()> {
        let net_debit =
            BalanceDirection::from(account.normal_balance).to_net_debit(account.opening_balance);
        let parents: HashMap<AccountId, Option<AccountId>> = self
            .store
            .list_accounts(company_id, &AccountFilter::default())
            .await?
            .into_iter()
            .map(|a| (a.id, a.parent_id))
            .collect();
        let delta = BalanceDelta {
            account_id: account.id,
            debit: net_debit.max(Decimal::ZERO),
            credit: (-net_debit).max(Decimal::ZERO),
        };
        let ancestors: Vec<BalanceDelta> = expand_to_ancestors(vec![delta], &parents)
            .into_iter()
            .filter(|d| d.account_id != account.id)
            .collect();
        self.store.apply_balance_deltas(company_id, &ancestors).await?;
        Ok(())
    }

    async fn has_postings(&self, company_id: CompanyId, id: AccountId) -> LedgerResult<bool> {
        Ok(self.store.count_posted_lines(company_id, id).await? > 0)
    }

    async fn has_children(&self, company_id: CompanyId, id: AccountId) -> LedgerResult<bool> {
        let children = self
            .store
            .list_accounts(company_id, &AccountFilter::children_of(id))
            .await?;
        Ok(!children.is_empty())
    }

    async fn ensure_no_active_children(
        &self,
        company_id: CompanyId,
        id: AccountId,
    ) -> LedgerResult<()> {
        let filter = AccountFilter {
            is_active: Some(true),
            ..AccountFilter::children_of(id)
        };
        if self.store.list_accounts(company_id, &filter).await?.is_empty() {
            Ok(())
        } else {
            Err(LedgerError::AccountHasChildren(id))
        }
    }

    /// Loads the proposed parent and rejects it if it is postable, is `id`,
    /// or lies below it.
    async fn check_new_parent(
        &self,
        company_id: CompanyId,
        id: AccountId,
        parent_id: AccountId,
    ) -> LedgerResult<Account> {
        if parent_id == id {
            return Err(LedgerError::CyclicHierarchy(id));
        }
        let parent = self.fetch(company_id, parent_id).await?;
        if !parent.is_header {
            return Err(LedgerError::ParentNotHeader(parent_id));
        }

        let mut visited = HashSet::from([parent.id]);
        let mut cursor = parent.parent_id;
        while let Some(ancestor_id) = cursor {
            if ancestor_id == id {
                return Err(LedgerError::CyclicHierarchy(id));
            }
            if !visited.insert(ancestor_id) {
                break;
            }
            cursor = self.fetch(company_id, ancestor_id).await?.parent_id;
        }
        Ok(parent)
    }

    async fn relevel_descendants(&self, company_id: CompanyId, root: &Account) -> LedgerResult<()> {
        let mut pending = vec![(root.id, root.level)];
        while let Some((parent_id, parent_level)) = pending.pop() {
            let children = self
                .store
                .list_accounts(company_id, &AccountFilter::children_of(parent_id))
                .await?;
            for mut child in children {
                child.level = parent_level + 1;
                child.updated_at = Utc::now();
                self.store.update_account(&child).await?;
                pending.push((child.id, child.level));
            }
        }
        Ok(())
    }
}

fn duplicate_code(err: StoreError, code: &str) -> LedgerError {
    match err {
        StoreError::Conflict(_) => LedgerError::DuplicateCode(code.to_string()),
        other => LedgerError::Storage(other),
    }
}

/// Assembles accounts into a forest without recursion.
///
/// Accounts whose parent is absent from `accounts` become roots.
pub(crate) fn build_tree(accounts: Vec<Account>) -> Vec<AccountNode> {
    let ids: HashSet<AccountId> = accounts.iter().map(|a| a.id).collect();
    let mut deepest_first = accounts;
    deepest_first.sort_by(|a, b| b.level.cmp(&a.level));

    let mut children: HashMap<AccountId, Vec<AccountNode>> = HashMap::new();
    let mut roots = Vec::new();
    for account in deepest_first {
        let mut own_children = children.remove(&account.id).unwrap_or_default();
        own_children.sort_by(|a, b| a.account.code.cmp(&b.account.code));
        let parent = account.parent_id.filter(|p| ids.contains(p));
        let node = AccountNode {
            account,
            children: own_children,
        };
        match parent {
            Some(parent_id) => children.entry(parent_id).or_default().push(node),
            None => roots.push(node),
        }
    }

    // Levels out of step with the parent chain leave orphans behind.
    roots.extend(children.into_values().flatten());
    roots.sort_by(|a, b| a.account.code.cmp(&b.account.code));
    roots
}
