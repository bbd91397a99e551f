//! Journal engine scenarios against the offline store.
//!
//! Covers posting, reversal, deletion rules, numbering under concurrency and
//! the compensating path when a header lands without its lines.

#![allow(clippy::similar_names)]

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use common::{Ledger, date};
use ledgerline_core::ErrorKind;
use ledgerline_core::balances::BalanceQuery;
use ledgerline_core::ledger::{
    EntryFilter, EntryStatus, LedgerError, NewJournalEntry, NewJournalLine, ReferenceType,
};
use ledgerline_core::permissions::Role;
use ledgerline_shared::types::{AccountId, PageRequest};

fn cash_sale(cash: AccountId, sales: AccountId, amount: Decimal) -> NewJournalEntry {
    NewJournalEntry::manual(
        date(2024, 1, 15),
        "Cash sale",
        vec![
            NewJournalLine::debit(cash, amount),
            NewJournalLine::credit(sales, amount),
        ],
    )
}

async fn entry_count(ledger: &Ledger) -> u64 {
    ledger
        .journal
        .list(&ledger.ctx, EntryFilter::default(), PageRequest::default())
        .await
        .unwrap()
        .meta
        .total
}

#[tokio::test]
async fn test_simple_cash_sale_posts_and_moves_balances() {
    let ledger = Ledger::new().await;
    let cash = ledger.id("1111").await;
    let sales = ledger.id("4100").await;

    let draft = ledger
        .journal
        .create(&ledger.ctx, cash_sale(cash, sales, dec!(1000)))
        .await
        .unwrap();
    assert_eq!(draft.entry.status, EntryStatus::Draft);
    assert_eq!(draft.entry.entry_number, "JE-2024-00001");
    assert_eq!(draft.entry.total_debit, dec!(1000));
    assert_eq!(draft.entry.total_credit, dec!(1000));

    let posted = ledger.journal.post(&ledger.ctx, draft.entry.id).await.unwrap();
    assert_eq!(posted.status, EntryStatus::Posted);
    assert_eq!(posted.posted_by, Some(ledger.ctx.user_id));

    assert_eq!(ledger.account("1111").await.current_balance, dec!(1000));
    assert_eq!(ledger.account("4100").await.current_balance, dec!(1000));
    // headers above the cash account follow
    assert_eq!(ledger.account("1110").await.current_balance, dec!(1000));
    assert_eq!(ledger.account("1000").await.current_balance, dec!(1000));

    let row = ledger
        .balances
        .balance_of(&ledger.ctx, cash, date(2024, 1, 31))
        .await
        .unwrap();
    assert_eq!(row.total_debit, dec!(1000));
    assert_eq!(row.balance, dec!(1000));
}

#[tokio::test]
async fn test_unbalanced_entry_persists_nothing() {
    let ledger = Ledger::new().await;
    let cash = ledger.id("1111").await;
    let sales = ledger.id("4100").await;

    let input = NewJournalEntry::manual(
        date(2024, 1, 15),
        "Cash sale",
        vec![
            NewJournalLine::debit(cash, dec!(1000)),
            NewJournalLine::credit(sales, dec!(900)),
        ],
    );
    let err = ledger.journal.create(&ledger.ctx, input).await.unwrap_err();

    assert!(matches!(
        err,
        LedgerError::UnbalancedEntry { debit, credit, .. }
            if debit == dec!(1000) && credit == dec!(900)
    ));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(entry_count(&ledger).await, 0);

    // the rejected entry drew no number
    let next = ledger
        .journal
        .create(&ledger.ctx, cash_sale(cash, sales, dec!(10)))
        .await
        .unwrap();
    assert_eq!(next.entry.entry_number, "JE-2024-00001");
}

#[tokio::test]
async fn test_second_post_fails_and_keeps_posting_time() {
    let ledger = Ledger::new().await;
    let cash = ledger.id("1111").await;
    let sales = ledger.id("4100").await;
    let draft = ledger
        .journal
        .create(&ledger.ctx, cash_sale(cash, sales, dec!(250)))
        .await
        .unwrap();

    let first = ledger.journal.post(&ledger.ctx, draft.entry.id).await.unwrap();
    let err = ledger.journal.post(&ledger.ctx, draft.entry.id).await.unwrap_err();

    assert!(matches!(
        err,
        LedgerError::InvalidStatusTransition {
            from: EntryStatus::Posted,
            to: EntryStatus::Posted,
            ..
        }
    ));
    let stored = ledger.journal.get(&ledger.ctx, draft.entry.id).await.unwrap();
    assert_eq!(stored.entry.posted_at, first.posted_at);
    assert_eq!(ledger.account("1111").await.current_balance, dec!(250));
}

#[tokio::test]
async fn test_reversal_swaps_sides_and_nets_to_zero() {
    let ledger = Ledger::new().await;
    let cash = ledger.id("1111").await;
    let sales = ledger.id("4100").await;
    let draft = ledger
        .journal
        .create(&ledger.ctx, cash_sale(cash, sales, dec!(100)))
        .await
        .unwrap();
    ledger.journal.post(&ledger.ctx, draft.entry.id).await.unwrap();

    let outcome = ledger
        .journal
        .reverse(&ledger.ctx, draft.entry.id, "entered twice")
        .await
        .unwrap();

    assert_eq!(outcome.original.status, EntryStatus::Reversed);
    assert_eq!(outcome.original.reversal_entry_id, Some(outcome.reversal.entry.id));
    assert_eq!(outcome.original.reversal_reason.as_deref(), Some("entered twice"));
    assert_eq!(outcome.reversal.entry.status, EntryStatus::Posted);
    assert!(outcome.reversal.entry.is_reversal);
    assert_eq!(outcome.reversal.entry.reversed_entry_id, Some(draft.entry.id));
    assert_eq!(outcome.reversal.entry.reference_type, ReferenceType::Reversal);

    let lines = &outcome.reversal.lines;
    assert_eq!(lines.len(), 2);
    assert_eq!((lines[0].account_id, lines[0].credit_amount), (cash, dec!(100)));
    assert_eq!((lines[1].account_id, lines[1].debit_amount), (sales, dec!(100)));

    // both entries stay retrievable
    ledger.journal.get(&ledger.ctx, draft.entry.id).await.unwrap();
    ledger.journal.get(&ledger.ctx, outcome.reversal.entry.id).await.unwrap();

    let rows = ledger
        .balances
        .account_balances(&ledger.ctx, BalanceQuery::default())
        .await
        .unwrap();
    for id in [cash, sales] {
        let row = rows.iter().find(|r| r.account_id == id).unwrap();
        assert_eq!(row.total_debit, dec!(100));
        assert_eq!(row.total_credit, dec!(100));
        assert_eq!(row.balance, Decimal::ZERO);
    }
    assert_eq!(ledger.account("1111").await.current_balance, Decimal::ZERO);
}

#[tokio::test]
async fn test_only_posted_entries_reverse() {
    let ledger = Ledger::new().await;
    let draft = ledger
        .journal
        .create(&ledger.ctx, cash_sale(ledger.id("1111").await, ledger.id("4100").await, dec!(5)))
        .await
        .unwrap();

    let err = ledger
        .journal
        .reverse(&ledger.ctx, draft.entry.id, "oops")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::InvalidStatusTransition {
            from: EntryStatus::Draft,
            to: EntryStatus::Reversed,
            ..
        }
    ));
}

#[tokio::test]
async fn test_get_returns_lines_in_input_order() {
    let ledger = Ledger::new().await;
    let cash = ledger.id("1111").await;
    let bank = ledger.id("1112").await;
    let capital = ledger.id("3100").await;
    let input = NewJournalEntry::manual(
        date(2024, 2, 1),
        "Owner contribution",
        vec![
            NewJournalLine::debit(bank, dec!(700.50)),
            NewJournalLine::debit(cash, dec!(299.50)),
            NewJournalLine::credit(capital, dec!(1000)).with_description("capital"),
        ],
    );

    let created = ledger.journal.create(&ledger.ctx, input.clone()).await.unwrap();
    let fetched = ledger.journal.get(&ledger.ctx, created.entry.id).await.unwrap();

    assert_eq!(fetched.lines.len(), input.lines.len());
    for (number, (line, expected)) in (1..).zip(fetched.lines.iter().zip(&input.lines)) {
        assert_eq!(line.line_number, number);
        assert_eq!(line.account_id, expected.account_id);
        assert_eq!(line.debit_amount, expected.debit_amount);
        assert_eq!(line.credit_amount, expected.credit_amount);
    }
    assert_eq!(fetched.lines[2].description.as_deref(), Some("capital"));
}

#[tokio::test]
async fn test_posted_and_reversed_entries_are_not_deletable() {
    let ledger = Ledger::new().await;
    let cash = ledger.id("1111").await;
    let sales = ledger.id("4100").await;
    let entry = ledger
        .journal
        .create(&ledger.ctx, cash_sale(cash, sales, dec!(40)))
        .await
        .unwrap()
        .entry;
    ledger.journal.post(&ledger.ctx, entry.id).await.unwrap();

    let err = ledger.journal.delete(&ledger.ctx, entry.id).await.unwrap_err();
    assert!(matches!(
        err,
        LedgerError::InvalidStatusTransition {
            from: EntryStatus::Posted,
            ..
        }
    ));

    ledger.journal.reverse(&ledger.ctx, entry.id, "wrong amount").await.unwrap();
    let err = ledger.journal.delete(&ledger.ctx, entry.id).await.unwrap_err();
    assert!(matches!(
        err,
        LedgerError::InvalidStatusTransition {
            from: EntryStatus::Reversed,
            ..
        }
    ));
}

#[tokio::test]
async fn test_draft_delete_removes_entry() {
    let ledger = Ledger::new().await;
    let entry = ledger
        .journal
        .create(&ledger.ctx, cash_sale(ledger.id("1111").await, ledger.id("4100").await, dec!(40)))
        .await
        .unwrap()
        .entry;

    ledger.journal.delete(&ledger.ctx, entry.id).await.unwrap();

    let err = ledger.journal.get(&ledger.ctx, entry.id).await.unwrap_err();
    assert_eq!(err, LedgerError::EntryNotFound(entry.id));
    assert_eq!(entry_count(&ledger).await, 0);
}

#[tokio::test]
async fn test_cancelled_draft_cannot_be_posted() {
    let ledger = Ledger::new().await;
    let entry = ledger
        .journal
        .create(&ledger.ctx, cash_sale(ledger.id("1111").await, ledger.id("4100").await, dec!(40)))
        .await
        .unwrap()
        .entry;

    let cancelled = ledger.journal.cancel(&ledger.ctx, entry.id).await.unwrap();
    assert_eq!(cancelled.status, EntryStatus::Cancelled);

    let err = ledger.journal.post(&ledger.ctx, entry.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::State);
}

#[tokio::test]
async fn test_header_accounts_reject_postings() {
    let ledger = Ledger::new().await;
    let header = ledger.id("1110").await;
    let sales = ledger.id("4100").await;

    let err = ledger
        .journal
        .create(&ledger.ctx, cash_sale(header, sales, dec!(10)))
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::HeaderAccountNotPostable(header));
}

#[tokio::test]
async fn test_concurrent_creates_get_unique_numbers() {
    let ledger = Arc::new(Ledger::new().await);
    let cash = ledger.id("1111").await;
    let sales = ledger.id("4100").await;

    let tasks = (0..25).map(|i| {
        let ledger = Arc::clone(&ledger);
        tokio::spawn(async move {
            ledger
                .journal
                .create(&ledger.ctx, cash_sale(cash, sales, Decimal::from(i + 1)))
                .await
        })
    });
    let results = join_all(tasks).await;

    let numbers: HashSet<String> = results
        .into_iter()
        .map(|joined| joined.unwrap().unwrap().entry.entry_number)
        .collect();
    assert_eq!(numbers.len(), 25);
    for n in 1..=25 {
        assert!(numbers.contains(&format!("JE-2024-{n:05}")));
    }
}

#[tokio::test]
async fn test_concurrent_posts_have_one_winner() {
    let ledger = Arc::new(Ledger::new().await);
    let cash = ledger.id("1111").await;
    let sales = ledger.id("4100").await;
    let draft = ledger
        .journal
        .create(&ledger.ctx, cash_sale(cash, sales, dec!(300)))
        .await
        .unwrap();
    let id = draft.entry.id;

    let tasks = (0..2).map(|_| {
        let ledger = Arc::clone(&ledger);
        tokio::spawn(async move { ledger.journal.post(&ledger.ctx, id).await })
    });
    let results: Vec<_> = join_all(tasks).await.into_iter().map(|j| j.unwrap()).collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    let loser = results.into_iter().find_map(Result::err).unwrap();
    assert!(matches!(
        loser,
        LedgerError::InvalidStatusTransition {
            from: EntryStatus::Posted,
            to: EntryStatus::Posted,
            ..
        }
    ));
    // applied once
    assert_eq!(ledger.account("1111").await.current_balance, dec!(300));
}

#[tokio::test]
async fn test_concurrent_reversals_leave_one_reversal() {
    let ledger = Arc::new(Ledger::new().await);
    let cash = ledger.id("1111").await;
    let sales = ledger.id("4100").await;
    let draft = ledger
        .journal
        .create(&ledger.ctx, cash_sale(cash, sales, dec!(120)))
        .await
        .unwrap();
    let id = draft.entry.id;
    ledger.journal.post(&ledger.ctx, id).await.unwrap();

    let tasks = (0..2).map(|_| {
        let ledger = Arc::clone(&ledger);
        tokio::spawn(async move { ledger.journal.reverse(&ledger.ctx, id, "duplicate").await })
    });
    let results: Vec<_> = join_all(tasks).await.into_iter().map(|j| j.unwrap()).collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    let loser = results.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert!(matches!(
        loser,
        LedgerError::InvalidStatusTransition {
            from: EntryStatus::Reversed,
            to: EntryStatus::Reversed,
            ..
        }
    ));

    assert_eq!(entry_count(&ledger).await, 2);
    let drafts = ledger
        .journal
        .list(
            &ledger.ctx,
            EntryFilter {
                status: Some(EntryStatus::Draft),
                ..EntryFilter::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(drafts.meta.total, 0);
    let reversals = ledger
        .journal
        .list(
            &ledger.ctx,
            EntryFilter {
                reference_type: Some(ReferenceType::Reversal),
                ..EntryFilter::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(reversals.meta.total, 1);
    assert_eq!(ledger.account("1111").await.current_balance, Decimal::ZERO);
}

#[tokio::test]
async fn test_failed_line_write_removes_header() {
    let ledger = Ledger::new().await;
    let cash = ledger.id("1111").await;
    let sales = ledger.id("4100").await;

    ledger.store.fail_next_line_insert();
    let err = ledger
        .journal
        .create(&ledger.ctx, cash_sale(cash, sales, dec!(75)))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        LedgerError::PersistencePartialFailure {
            compensated: true,
            ..
        }
    ));
    assert_eq!(err.kind(), ErrorKind::PersistencePartialFailure);
    assert_eq!(entry_count(&ledger).await, 0);
}

#[tokio::test]
async fn test_failed_compensation_leaves_orphan_for_reconciliation() {
    let ledger = Ledger::new().await;
    let cash = ledger.id("1111").await;
    let sales = ledger.id("4100").await;

    ledger.store.fail_next_line_insert();
    ledger.store.fail_next_entry_delete();
    let err = ledger
        .journal
        .create(&ledger.ctx, cash_sale(cash, sales, dec!(75)))
        .await
        .unwrap_err();

    let LedgerError::PersistencePartialFailure {
        entry_id,
        compensated,
        ..
    } = err
    else {
        panic!("expected a partial failure, got {err:?}");
    };
    assert!(!compensated);

    let orphan = ledger.journal.get(&ledger.ctx, entry_id).await.unwrap();
    assert_eq!(orphan.entry.status, EntryStatus::Draft);
    assert!(orphan.lines.is_empty());

    // the orphan can be cleaned up afterwards
    ledger.journal.delete(&ledger.ctx, entry_id).await.unwrap();
    assert_eq!(entry_count(&ledger).await, 0);
}

#[tokio::test]
async fn test_recalculate_repairs_cache_after_failed_balance_update() {
    let ledger = Ledger::new().await;
    let cash = ledger.id("1111").await;
    let sales = ledger.id("4100").await;
    let draft = ledger
        .journal
        .create(&ledger.ctx, cash_sale(cash, sales, dec!(320)))
        .await
        .unwrap();

    ledger.store.fail_next_balance_update();
    let err = ledger.journal.post(&ledger.ctx, draft.entry.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PersistencePartialFailure);

    let stored = ledger.journal.get(&ledger.ctx, draft.entry.id).await.unwrap();
    assert_eq!(stored.entry.status, EntryStatus::Posted);
    assert_eq!(ledger.account("1111").await.current_balance, Decimal::ZERO);

    let changed = ledger.balances.recalculate(&ledger.ctx).await.unwrap();
    assert!(changed > 0);
    assert_eq!(ledger.account("1111").await.current_balance, dec!(320));
    assert_eq!(ledger.account("1000").await.current_balance, dec!(320));
    assert_eq!(ledger.account("4000").await.current_balance, dec!(320));
}

#[tokio::test]
async fn test_roles_without_accounting_rights_are_refused() {
    let ledger = Ledger::new().await;
    let cash = ledger.id("1111").await;
    let sales = ledger.id("4100").await;
    let employee = ledger.as_role(Role::Employee);
    let accountant = ledger.as_role(Role::Accountant);

    let err = ledger
        .journal
        .create(&employee, cash_sale(cash, sales, dec!(1)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);

    let entry = ledger
        .journal
        .create(&accountant, cash_sale(cash, sales, dec!(1)))
        .await
        .unwrap()
        .entry;
    let err = ledger.journal.delete(&accountant, entry.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    assert!(ledger.journal.get(&employee, entry.id).await.is_err());
}

#[tokio::test]
async fn test_companies_do_not_see_each_other() {
    let store = Arc::new(ledgerline_db::OfflineStore::new());
    let first = Ledger::on(Arc::clone(&store)).await;
    let second = Ledger::on(store).await;

    let entry = first
        .journal
        .create(&first.ctx, cash_sale(first.id("1111").await, first.id("4100").await, dec!(9)))
        .await
        .unwrap()
        .entry;

    let err = second.journal.get(&second.ctx, entry.id).await.unwrap_err();
    assert_eq!(err, LedgerError::EntryNotFound(entry.id));
    assert_eq!(entry_count(&second).await, 0);

    // numbering is per company
    let own = second
        .journal
        .create(&second.ctx, cash_sale(second.id("1111").await, second.id("4100").await, dec!(9)))
        .await
        .unwrap()
        .entry;
    assert_eq!(own.entry_number, "JE-2024-00001");
}
