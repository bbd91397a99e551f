//! Development seeder for Ledgerline.
//!
//! Installs the default chart of accounts for a company and, on an empty
//! ledger, books an opening capital contribution plus one approved sales
//! invoice so the reports have something to show.
//!
//! Usage: `seeder [COMPANY_UUID]`
//!
//! The backend comes from the usual configuration (`config/*.toml`,
//! `LEDGERLINE__*`).

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use ledgerline_core::TenantContext;
use ledgerline_core::accounts::AccountRegistry;
use ledgerline_core::bridge::{DocumentBridge, DocumentType, NewDocument, NewDocumentItem};
use ledgerline_core::journal::JournalEngine;
use ledgerline_core::ledger::{NewJournalEntry, NewJournalLine};
use ledgerline_core::permissions::Role;
use ledgerline_core::reports::ReportViews;
use ledgerline_db::open_store;
use ledgerline_shared::AppConfig;
use ledgerline_shared::types::{CompanyId, UserId};

/// Company seeded when none is given.
const DEV_COMPANY_ID: &str = "00000000-0000-0000-0000-000000000001";
/// Acting user for seeded records.
const DEV_USER_ID: &str = "00000000-0000-0000-0000-000000000002";

const OPENING_CAPITAL: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ledgerline=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    let company = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEV_COMPANY_ID.to_string());
    let company_id = CompanyId(Uuid::parse_str(&company).context("invalid company id")?);
    let user_id = UserId(Uuid::parse_str(DEV_USER_ID)?);
    let ctx = TenantContext::new(company_id, user_id, Role::Manager);

    let store = open_store(&config).await?;
    info!(backend = ?config.storage.backend, %company_id, "Seeding company");

    let accounts = AccountRegistry::new(Arc::clone(&store));
    let created = accounts.initialize_chart(&ctx).await?;
    info!(created = created.len(), "Chart of accounts ready");

    let today = Utc::now().date_naive();
    let reports = ReportViews::with_config(Arc::clone(&store), &config.ledger);
    let before = reports.trial_balance(&ctx, today).await?;
    if !before.total_debit.is_zero() {
        info!("Ledger already has postings, skipping sample data");
        return Ok(());
    }

    let journal = JournalEngine::with_config(Arc::clone(&store), &config.ledger);
    let bank = accounts.get_by_code(&ctx, "1112").await?.id;
    let capital = accounts.get_by_code(&ctx, "3100").await?.id;
    let opening = journal
        .create(
            &ctx,
            NewJournalEntry::manual(
                today,
                "Owner capital contribution",
                vec![
                    NewJournalLine::debit(bank, OPENING_CAPITAL),
                    NewJournalLine::credit(capital, OPENING_CAPITAL),
                ],
            ),
        )
        .await?;
    journal.post(&ctx, opening.entry.id).await?;
    info!(number = %opening.entry.entry_number, "Opening capital posted");

    let bridge = DocumentBridge::with_config(Arc::clone(&store), &config.ledger);
    let invoice = bridge
        .create_document(
            &ctx,
            NewDocument {
                document_type: DocumentType::Invoice,
                date: today,
                due_date: Some(today + chrono::Days::new(30)),
                partner_id: None,
                discount_total: Decimal::ZERO,
                notes: Some("Seeded sample".to_string()),
                items: vec![
                    NewDocumentItem::new("Consulting", Decimal::from(8), Decimal::from(150))
                        .with_tax_rate(Decimal::from(10)),
                ],
            },
        )
        .await?;
    bridge.approve_document(&ctx, invoice.document.id).await?;
    info!(number = %invoice.document.document_number, "Sample invoice approved");

    let after = reports.trial_balance(&ctx, today).await?;
    info!(
        total_debit = %after.total_debit,
        total_credit = %after.total_credit,
        balanced = after.is_balanced,
        "Seeding complete"
    );

    Ok(())
}
