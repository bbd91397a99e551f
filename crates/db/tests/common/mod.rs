//! Shared fixture for the ledger integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use ledgerline_core::TenantContext;
use ledgerline_core::accounts::AccountRegistry;
use ledgerline_core::balances::BalanceAggregator;
use ledgerline_core::bridge::DocumentBridge;
use ledgerline_core::journal::JournalEngine;
use ledgerline_core::ledger::Account;
use ledgerline_core::permissions::Role;
use ledgerline_core::reports::ReportViews;
use ledgerline_db::OfflineStore;
use ledgerline_shared::types::{AccountId, CompanyId, UserId};

/// One company on an in-memory store with the default chart installed.
pub struct Ledger {
    pub store: Arc<OfflineStore>,
    pub ctx: TenantContext,
    pub accounts: AccountRegistry<OfflineStore>,
    pub journal: JournalEngine<OfflineStore>,
    pub balances: BalanceAggregator<OfflineStore>,
    pub bridge: DocumentBridge<OfflineStore>,
    pub reports: ReportViews<OfflineStore>,
}

impl Ledger {
    /// A fresh company whose manager is the acting user.
    pub async fn new() -> Self {
        Self::on(Arc::new(OfflineStore::new())).await
    }

    /// A fresh company on an existing store.
    pub async fn on(store: Arc<OfflineStore>) -> Self {
        let ctx = TenantContext::new(CompanyId::new(), UserId::new(), Role::Manager);
        let ledger = Self {
            accounts: AccountRegistry::new(Arc::clone(&store)),
            journal: JournalEngine::new(Arc::clone(&store)),
            balances: BalanceAggregator::new(Arc::clone(&store)),
            bridge: DocumentBridge::new(Arc::clone(&store)),
            reports: ReportViews::new(Arc::clone(&store)),
            store,
            ctx,
        };
        ledger.accounts.initialize_chart(&ledger.ctx).await.unwrap();
        ledger
    }

    /// The same company seen through another role.
    pub fn as_role(&self, role: Role) -> TenantContext {
        TenantContext::new(self.ctx.company_id, UserId::new(), role)
    }

    pub async fn account(&self, code: &str) -> Account {
        self.accounts.get_by_code(&self.ctx, code).await.unwrap()
    }

    pub async fn id(&self, code: &str) -> AccountId {
        self.account(code).await.id
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}
