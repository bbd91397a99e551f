//! Number allocation with retry on uniqueness conflicts.

use std::future::Future;

use chrono::NaiveDate;
use ledgerline_shared::types::CompanyId;
use tracing::warn;

use crate::ledger::{LedgerError, LedgerResult, NumberSeries};
use crate::store::{LedgerStore, StoreError};

/// Draws the next number of `series` and hands it to `insert`.
///
/// When `insert` reports a uniqueness conflict a fresh number is drawn, at
/// most `retry_limit` more times. Exhausting the retries yields
/// `DuplicateNumber` with the last number tried.
pub(crate) async fn with_next_number<S, T, F, Fut>(
    store: &S,
    company_id: CompanyId,
    series: NumberSeries,
    date: NaiveDate,
    retry_limit: u32,
    mut insert: F,
) -> LedgerResult<T>
where
    S: LedgerStore + ?Sized,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = LedgerResult<T>>,
{
    let key = series.sequence_key(date);
    let mut retries = 0;
    loop {
        let value = store.next_sequence_value(company_id, &key).await?;
        let number = series.format(date, value);

        match insert(number.clone()).await {
            Err(LedgerError::Storage(StoreError::Conflict(constraint))) => {
                if retries >= retry_limit {
                    return Err(LedgerError::DuplicateNumber(number));
                }
                retries += 1;
                warn!(
                    company_id = %company_id,
                    number = %number,
                    constraint = %constraint,
                    retry = retries,
                    "number already taken, drawing a new one"
                );
            }
            other => return other,
        }
    }
}
