//! Balance aggregation over posted journal lines.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::NaiveDate;
use ledgerline_shared::types::{AccountId, CompanyId};
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::types::{AccountBalanceRow, AccountLedger, BalanceQuery};
use crate::context::TenantContext;
use crate::ledger::balance::{activity_by_account, rollup_net_debits, running_balance};
use crate::ledger::{
    Account, AccountFilter, BalanceDirection, DateRange, LedgerError, LedgerResult, PostedLine,
};
use crate::permissions::{Action, Module};
use crate::store::LedgerStore;

/// Computes account balances from posted entries.
pub struct BalanceAggregator<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for BalanceAggregator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: LedgerStore + ?Sized> BalanceAggregator<S> {
    /// Creates an aggregator over `store`.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Balances of every account over `query`, ordered by code.
    ///
    /// Posted and reversed entries both count; a reversed entry and its
    /// reversal cancel out. Header rows carry the sums of their descendants.
    pub async fn account_balances(
        &self,
        ctx: &TenantContext,
        query: BalanceQuery,
    ) -> LedgerResult<Vec<AccountBalanceRow>> {
        let company_id = ctx.require(Module::Accounting, Action::View)?;
        self.rows_in(company_id, query).await
    }

    /// Balance of one account up to and including `as_of`.
    pub async fn balance_of(
        &self,
        ctx: &TenantContext,
        account_id: AccountId,
        as_of: NaiveDate,
    ) -> LedgerResult<AccountBalanceRow> {
        let company_id = ctx.require(Module::Accounting, Action::View)?;
        let account = self.fetch(company_id, account_id).await?;

        if account.is_header {
            return self
                .rows_in(company_id, BalanceQuery::as_of(as_of))
                .await?
                .into_iter()
                .find(|row| row.account_id == account_id)
                .ok_or(LedgerError::AccountNotFound(account_id));
        }

        let lines = self
            .store
            .posted_lines(company_id, DateRange::as_of(as_of), Some(account_id))
            .await?;
        compute_rows(std::slice::from_ref(&account), &[], &lines)
            .pop()
            .ok_or(LedgerError::AccountNotFound(account_id))
    }

    /// Posted lines of an account inside the window with running balances.
    ///
    /// For a header account the lines of all its descendants are merged.
    pub async fn account_ledger(
        &self,
        ctx: &TenantContext,
        account_id: AccountId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> LedgerResult<AccountLedger> {
        let company_id = ctx.require(Module::Accounting, Action::View)?;
        let account = self.fetch(company_id, account_id).await?;

        let subtree: Vec<Account> = if account.is_header {
            let all = self.store.list_accounts(company_id, &AccountFilter::default()).await?;
            subtree_of(account_id, all)
        } else {
            vec![account.clone()]
        };
        let members: HashSet<AccountId> = subtree.iter().map(|a| a.id).collect();
        let line_filter = (!account.is_header).then_some(account_id);

        let mut opening_net: Decimal = subtree
            .iter()
            .map(|a| BalanceDirection::from(a.normal_balance).to_net_debit(a.opening_balance))
            .sum();
        if let Some(day_before) = from.and_then(|f| f.pred_opt()) {
            let prior = self
                .store
                .posted_lines(company_id, DateRange::as_of(day_before), line_filter)
                .await?;
            opening_net += prior
                .iter()
                .filter(|l| members.contains(&l.account_id))
                .map(|l| l.debit_amount - l.credit_amount)
                .sum::<Decimal>();
        }

        let lines: Vec<PostedLine> = self
            .store
            .posted_lines(company_id, DateRange { from, to }, line_filter)
            .await?
            .into_iter()
            .filter(|l| members.contains(&l.account_id))
            .collect();

        let total_debit: Decimal = lines.iter().map(|l| l.debit_amount).sum();
        let total_credit: Decimal = lines.iter().map(|l| l.credit_amount).sum();
        let direction = BalanceDirection::from(account.normal_balance);
        let opening_balance = direction.from_net_debit(opening_net);
        let running = running_balance(direction, opening_balance, lines);
        let closing_balance = running.last().map_or(opening_balance, |r| r.balance);

        debug!(
            company_id = %company_id,
            account_id = %account_id,
            lines = running.len(),
            "account ledger built"
        );
        Ok(AccountLedger {
            account,
            from,
            to,
            opening_balance,
            lines: running,
            total_debit,
            total_credit,
            closing_balance,
        })
    }

    /// Rebuilds every account's cached `current_balance` from posted lines.
    /// Returns the number of accounts whose cached value changed.
    pub async fn recalculate(&self, ctx: &TenantContext) -> LedgerResult<usize> {
        let company_id = ctx.require(Module::Accounting, Action::Edit)?;
        let accounts = self.store.list_accounts(company_id, &AccountFilter::default()).await?;
        let lines = self
            .store
            .posted_lines(company_id, DateRange::default(), None)
            .await?;

        let cached: HashMap<AccountId, Decimal> =
            accounts.iter().map(|a| (a.id, a.current_balance)).collect();
        let changed: Vec<(AccountId, Decimal)> = compute_rows(&accounts, &[], &lines)
            .into_iter()
            .filter(|row| cached.get(&row.account_id) != Some(&row.balance))
            .map(|row| (row.account_id, row.balance))
            .collect();

        if !changed.is_empty() {
            self.store.set_current_balances(company_id, &changed).await?;
        }
        info!(
            company_id = %company_id,
            accounts = accounts.len(),
            updated = changed.len(),
            "account balances recalculated"
        );
        Ok(changed.len())
    }

    pub(crate) async fn rows_in(
        &self,
        company_id: CompanyId,
        query: BalanceQuery,
    ) -> LedgerResult<Vec<AccountBalanceRow>> {
        let accounts = self.store.list_accounts(company_id, &AccountFilter::default()).await?;
        let period = self.store.posted_lines(company_id, query, None).await?;
        let prior = match query.from.and_then(|f| f.pred_opt()) {
            Some(day_before) => {
                self.store
                    .posted_lines(company_id, DateRange::as_of(day_before), None)
                    .await?
            }
            None => Vec::new(),
        };

        let rows = compute_rows(&accounts, &prior, &period);
        debug!(
            company_id = %company_id,
            accounts = rows.len(),
            lines = period.len(),
            "account balances computed"
        );
        Ok(rows)
    }

    async fn fetch(&self, company_id: CompanyId, id: AccountId) -> LedgerResult<Account> {
        self.store
            .find_account(company_id, id)
            .await?
            .ok_or(LedgerError::AccountNotFound(id))
    }
}

/// Builds one row per account, in the order of `accounts`.
///
/// `prior` holds the lines before the window and `period` the lines inside
/// it. Opening balances of the accounts always count toward the opening.
pub(crate) fn compute_rows(
    accounts: &[Account],
    prior: &[PostedLine],
    period: &[PostedLine],
) -> Vec<AccountBalanceRow> {
    let prior_activity = activity_by_account(prior);
    let period_activity = activity_by_account(period);

    let mut opening = HashMap::with_capacity(accounts.len());
    let mut debits = HashMap::with_capacity(accounts.len());
    let mut credits = HashMap::with_capacity(accounts.len());
    for account in accounts {
        let carried = BalanceDirection::from(account.normal_balance)
            .to_net_debit(account.opening_balance)
            + prior_activity.get(&account.id).map_or(Decimal::ZERO, |a| a.net_debit());
        opening.insert(account.id, carried);
        if let Some(activity) = period_activity.get(&account.id) {
            debits.insert(account.id, activity.debit);
            credits.insert(account.id, activity.credit);
        }
    }

    let opening = rollup_net_debits(accounts, &opening);
    let debits = rollup_net_debits(accounts, &debits);
    let credits = rollup_net_debits(accounts, &credits);

    accounts
        .iter()
        .map(|account| {
            AccountBalanceRow::new(
                account,
                opening.get(&account.id).copied().unwrap_or_default(),
                debits.get(&account.id).copied().unwrap_or_default(),
                credits.get(&account.id).copied().unwrap_or_default(),
            )
        })
        .collect()
}

/// `root` and everything below it.
fn subtree_of(root: AccountId, accounts: Vec<Account>) -> Vec<Account> {
    let mut children: HashMap<AccountId, Vec<Account>> = HashMap::new();
    let mut subtree = Vec::new();
    for account in accounts {
        if account.id == root {
            subtree.push(account);
        } else if let Some(parent_id) = account.parent_id {
            children.entry(parent_id).or_default().push(account);
        }
    }

    let mut pending = vec![root];
    while let Some(parent_id) = pending.pop() {
        if let Some(kids) = children.remove(&parent_id) {
            pending.extend(kids.iter().map(|k| k.id));
            subtree.extend(kids);
        }
    }
    subtree
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use ledgerline_shared::types::JournalEntryId;

    use crate::ledger::{AccountType, NormalBalance};

    fn make_account(
        code: &str,
        account_type: AccountType,
        parent: Option<&Account>,
        is_header: bool,
    ) -> Account {
        Account {
            id: AccountId::new(),
            company_id: CompanyId::new(),
            code: code.to_string(),
            name: code.to_string(),
            description: None,
            account_type,
            parent_id: parent.map(|p| p.id),
            level: parent.map_or(1, |p| p.level + 1),
            is_header,
            normal_balance: account_type.default_normal_balance(),
            opening_balance: Decimal::ZERO,
            current_balance: Decimal::ZERO,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn posted(account_id: AccountId, day: u32, debit: Decimal, credit: Decimal) -> PostedLine {
        PostedLine {
            entry_id: JournalEntryId::new(),
            entry_number: format!("JE-2024-{day:05}"),
            entry_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            entry_description: "test".to_string(),
            account_id,
            line_number: 1,
            description: None,
            debit_amount: debit,
            credit_amount: credit,
        }
    }

    #[test]
    fn test_rows_follow_normal_direction() {
        let cash = make_account("1111", AccountType::Asset, None, false);
        let sales = make_account("4100", AccountType::Revenue, None, false);
        let lines = vec![
            posted(cash.id, 15, dec!(1000), dec!(0)),
            posted(sales.id, 15, dec!(0), dec!(1000)),
        ];

        let rows = compute_rows(&[cash.clone(), sales.clone()], &[], &lines);

        assert_eq!(rows[0].balance, dec!(1000));
        assert_eq!(rows[0].net_debit(), dec!(1000));
        assert_eq!(rows[1].balance, dec!(1000));
        assert_eq!(rows[1].normal_balance, NormalBalance::Credit);
        assert_eq!(rows[1].net_debit(), dec!(-1000));
    }

    #[test]
    fn test_opening_balance_and_prior_lines_form_the_opening() {
        let mut cash = make_account("1111", AccountType::Asset, None, false);
        cash.opening_balance = dec!(500);
        let prior = vec![posted(cash.id, 1, dec!(200), dec!(0))];
        let period = vec![posted(cash.id, 20, dec!(0), dec!(50))];

        let rows = compute_rows(std::slice::from_ref(&cash), &prior, &period);

        assert_eq!(rows[0].opening_balance, dec!(700));
        assert_eq!(rows[0].total_credit, dec!(50));
        assert_eq!(rows[0].balance, dec!(650));
    }

    #[test]
    fn test_headers_roll_up_descendants() {
        let assets = make_account("1000", AccountType::Asset, None, true);
        let current = make_account("1100", AccountType::Asset, Some(&assets), true);
        let cash = make_account("1111", AccountType::Asset, Some(&current), false);
        let bank = make_account("1112", AccountType::Asset, Some(&current), false);
        let lines = vec![
            posted(cash.id, 2, dec!(100), dec!(0)),
            posted(bank.id, 3, dec!(300), dec!(20)),
        ];

        let rows = compute_rows(&[assets, current, cash, bank], &[], &lines);

        assert_eq!(rows[0].balance, dec!(380));
        assert_eq!(rows[0].total_debit, dec!(400));
        assert_eq!(rows[0].total_credit, dec!(20));
        assert_eq!(rows[1].balance, dec!(380));
        assert_eq!(rows[2].balance, dec!(100));
    }

    #[test]
    fn test_contra_account_rolls_into_parent_by_net() {
        let revenue = make_account("4000", AccountType::Revenue, None, true);
        let sales = make_account("4100", AccountType::Revenue, Some(&revenue), false);
        let mut returns = make_account("4200", AccountType::Revenue, Some(&revenue), false);
        returns.normal_balance = NormalBalance::Debit;
        let lines = vec![
            posted(sales.id, 5, dec!(0), dec!(1000)),
            posted(returns.id, 6, dec!(150), dec!(0)),
        ];

        let rows = compute_rows(&[revenue, sales, returns], &[], &lines);

        assert_eq!(rows[0].balance, dec!(850));
        assert_eq!(rows[2].balance, dec!(150));
    }

    #[test]
    fn test_subtree_of_collects_all_levels() {
        let root = make_account("1000", AccountType::Asset, None, true);
        let mid = make_account("1100", AccountType::Asset, Some(&root), true);
        let leaf = make_account("1111", AccountType::Asset, Some(&mid), false);
        let other = make_account("2000", AccountType::Liability, None, true);

        let subtree = subtree_of(mid.id, vec![root, mid.clone(), leaf.clone(), other]);
        let ids: HashSet<AccountId> = subtree.iter().map(|a| a.id).collect();
        assert_eq!(ids, HashSet::from([mid.id, leaf.id]));
    }
}
