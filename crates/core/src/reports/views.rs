//! Tenant-scoped report views.

use std::sync::Arc;

use chrono::NaiveDate;
use ledgerline_shared::config::LedgerConfig;
use ledgerline_shared::types::CompanyId;
use tracing::debug;

use super::ratios;
use super::service::ReportService;
use super::types::{
    BalanceSheetReport, FinancialRatios, IncomeStatementReport, PeriodComparison,
    TrialBalanceReport,
};
use crate::balances::BalanceAggregator;
use crate::context::TenantContext;
use crate::ledger::{DateRange, LedgerError, LedgerResult};
use crate::permissions::{Action, Module};
use crate::store::LedgerStore;

/// Default currency label on reports.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Inclusive reporting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    /// First day.
    pub from: NaiveDate,
    /// Last day.
    pub to: NaiveDate,
}

impl Period {
    /// Creates a period, rejecting `from` after `to`.
    pub fn new(from: NaiveDate, to: NaiveDate) -> LedgerResult<Self> {
        if from > to {
            return Err(LedgerError::InvalidField {
                field: "from",
                message: format!("{from} is after {to}"),
            });
        }
        Ok(Self { from, to })
    }
}

/// Financial statements for one company, behind the `reports:view` gate.
pub struct ReportViews<S: ?Sized> {
    balances: BalanceAggregator<S>,
    currency: String,
}

impl<S: ?Sized> Clone for ReportViews<S> {
    fn clone(&self) -> Self {
        Self {
            balances: self.balances.clone(),
            currency: self.currency.clone(),
        }
    }
}

impl<S: LedgerStore + ?Sized> ReportViews<S> {
    /// Creates the views over `store`.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self {
            balances: BalanceAggregator::new(store),
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    /// Creates the views with the configured currency label.
    #[must_use]
    pub fn with_config(store: Arc<S>, config: &LedgerConfig) -> Self {
        Self {
            balances: BalanceAggregator::new(store),
            currency: config.currency.clone(),
        }
    }

    /// Trial balance as of a date.
    pub async fn trial_balance(
        &self,
        ctx: &TenantContext,
        as_of: NaiveDate,
    ) -> LedgerResult<TrialBalanceReport> {
        let company_id = ctx.require(Module::Reports, Action::View)?;
        let rows = self.balances.rows_in(company_id, DateRange::as_of(as_of)).await?;
        let report = ReportService::trial_balance(&rows, as_of, &self.currency);
        debug!(
            company_id = %company_id,
            as_of = %as_of,
            lines = report.lines.len(),
            balanced = report.is_balanced,
            "trial balance generated"
        );
        Ok(report)
    }

    /// Income statement over a period.
    pub async fn income_statement(
        &self,
        ctx: &TenantContext,
        from: NaiveDate,
        to: NaiveDate,
    ) -> LedgerResult<IncomeStatementReport> {
        let company_id = ctx.require(Module::Reports, Action::View)?;
        self.income_in(company_id, Period::new(from, to)?).await
    }

    /// Balance sheet as of a date.
    pub async fn balance_sheet(
        &self,
        ctx: &TenantContext,
        as_of: NaiveDate,
    ) -> LedgerResult<BalanceSheetReport> {
        let company_id = ctx.require(Module::Reports, Action::View)?;
        self.balance_sheet_at(company_id, as_of).await
    }

    /// Ratios from the period's income statement and the balance sheet at its end.
    pub async fn financial_ratios(
        &self,
        ctx: &TenantContext,
        from: NaiveDate,
        to: NaiveDate,
    ) -> LedgerResult<FinancialRatios> {
        let company_id = ctx.require(Module::Reports, Action::View)?;
        let income = self.income_in(company_id, Period::new(from, to)?).await?;
        let sheet = self.balance_sheet_at(company_id, to).await?;
        Ok(ratios::financial_ratios(&income, &sheet))
    }

    /// Income statement metrics of `current` against `previous`.
    pub async fn compare_periods(
        &self,
        ctx: &TenantContext,
        current: Period,
        previous: Period,
    ) -> LedgerResult<PeriodComparison> {
        let company_id = ctx.require(Module::Reports, Action::View)?;
        let now = self.income_in(company_id, current).await?;
        let before = self.income_in(company_id, previous).await?;
        Ok(ratios::compare_periods(&now, &before))
    }

    async fn income_in(
        &self,
        company_id: CompanyId,
        period: Period,
    ) -> LedgerResult<IncomeStatementReport> {
        let rows = self
            .balances
            .rows_in(company_id, DateRange::between(period.from, period.to))
            .await?;
        let report =
            ReportService::income_statement(&rows, Some(period.from), period.to, &self.currency);
        debug!(
            company_id = %company_id,
            from = %period.from,
            to = %period.to,
            net_income = %report.net_income,
            "income statement generated"
        );
        Ok(report)
    }

    async fn balance_sheet_at(
        &self,
        company_id: CompanyId,
        as_of: NaiveDate,
    ) -> LedgerResult<BalanceSheetReport> {
        let rows = self.balances.rows_in(company_id, DateRange::as_of(as_of)).await?;
        let report = ReportService::balance_sheet(&rows, as_of, &self.currency);
        debug!(
            company_id = %company_id,
            as_of = %as_of,
            balanced = report.is_balanced,
            "balance sheet generated"
        );
        Ok(report)
    }
}
