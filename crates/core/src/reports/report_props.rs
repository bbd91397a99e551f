//! Property-based tests for report balancing.

use chrono::{NaiveDate, Utc};
use ledgerline_shared::types::{AccountId, CompanyId, JournalEntryId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::service::ReportService;
use crate::balances::service::compute_rows;
use crate::ledger::{Account, AccountType, NormalBalance, PostedLine};

fn chart() -> Vec<Account> {
    let now = Utc::now();
    [
        ("1111", AccountType::Asset, None),
        ("1120", AccountType::Asset, None),
        ("2110", AccountType::Liability, None),
        ("3100", AccountType::Equity, None),
        ("4100", AccountType::Revenue, None),
        ("4200", AccountType::Revenue, Some(NormalBalance::Debit)),
        ("5220", AccountType::Expense, None),
    ]
    .into_iter()
    .map(|(code, account_type, normal)| Account {
        id: AccountId::new(),
        company_id: CompanyId::new(),
        code: code.to_string(),
        name: code.to_string(),
        description: None,
        account_type,
        parent_id: None,
        level: 1,
        is_header: false,
        normal_balance: normal.unwrap_or_else(|| account_type.default_normal_balance()),
        opening_balance: Decimal::ZERO,
        current_balance: Decimal::ZERO,
        is_active: true,
        created_at: now,
        updated_at: now,
    })
    .collect()
}

fn line(
    account_id: AccountId,
    entry_id: JournalEntryId,
    debit: Decimal,
    credit: Decimal,
) -> PostedLine {
    PostedLine {
        entry_id,
        entry_number: "JE-2024-00001".to_string(),
        entry_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        entry_description: "generated".to_string(),
        account_id,
        line_number: 1,
        description: None,
        debit_amount: debit,
        credit_amount: credit,
    }
}

/// (debit account index, credit account index, amount in cents)
fn transfers() -> impl Strategy<Value = Vec<(usize, usize, i64)>> {
    prop::collection::vec((0usize..7, 0usize..7, 1i64..10_000_000), 1..40)
}

fn posted(accounts: &[Account], transfers: &[(usize, usize, i64)]) -> Vec<PostedLine> {
    transfers
        .iter()
        .flat_map(|&(dr, cr, cents)| {
            let entry_id = JournalEntryId::new();
            let amount = Decimal::new(cents, 2);
            [
                line(accounts[dr].id, entry_id, amount, Decimal::ZERO),
                line(accounts[cr].id, entry_id, Decimal::ZERO, amount),
            ]
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Balanced entries always produce a balanced trial balance.
    #[test]
    fn prop_trial_balance_balances(transfers in transfers()) {
        let accounts = chart();
        let rows = compute_rows(&accounts, &[], &posted(&accounts, &transfers));
        let year_end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let report = ReportService::trial_balance(&rows, year_end, "USD");

        prop_assert!(report.is_balanced, "difference {}", report.difference);
        for line in &report.lines {
            prop_assert!(line.debit.is_zero() || line.credit.is_zero());
        }
    }

    /// Assets equal liabilities plus equity once current earnings are included.
    #[test]
    fn prop_balance_sheet_balances(transfers in transfers()) {
        let accounts = chart();
        let rows = compute_rows(&accounts, &[], &posted(&accounts, &transfers));
        let year_end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let sheet = ReportService::balance_sheet(&rows, year_end, "USD");

        prop_assert!(
            sheet.is_balanced,
            "{} vs {}",
            sheet.total_assets,
            sheet.total_liabilities_and_equity
        );
    }

    /// Net income over all history equals the earnings shown on the balance sheet.
    #[test]
    fn prop_net_income_matches_current_earnings(transfers in transfers()) {
        let accounts = chart();
        let rows = compute_rows(&accounts, &[], &posted(&accounts, &transfers));
        let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let income = ReportService::income_statement(&rows, None, end, "USD");
        let sheet = ReportService::balance_sheet(&rows, end, "USD");

        prop_assert_eq!(income.net_income, sheet.current_earnings);
    }
}
