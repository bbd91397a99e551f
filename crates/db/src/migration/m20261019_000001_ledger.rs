//! Ledger schema.
//!
//! Creates the chart of accounts, journal, voucher and document tables plus
//! the per-company number sequences. Every table carries `company_id`, and
//! every uniqueness rule is scoped to it.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: NUMBERING
        // ============================================================
        db.execute_unprepared(NUMBER_SEQUENCES_SQL).await?;

        // ============================================================
        // PART 2: CHART OF ACCOUNTS
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;

        // ============================================================
        // PART 3: JOURNAL
        // ============================================================
        db.execute_unprepared(JOURNAL_ENTRIES_SQL).await?;
        db.execute_unprepared(JOURNAL_ENTRY_LINES_SQL).await?;

        // ============================================================
        // PART 4: VOUCHERS & DOCUMENTS
        // ============================================================
        db.execute_unprepared(VOUCHERS_SQL).await?;
        db.execute_unprepared(DOCUMENTS_SQL).await?;
        db.execute_unprepared(DOCUMENT_ITEMS_SQL).await?;
        db.execute_unprepared(DOCUMENT_PAYMENTS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const NUMBER_SEQUENCES_SQL: &str = r"
CREATE TABLE number_sequences (
    company_id UUID NOT NULL,
    sequence_key VARCHAR(32) NOT NULL,
    last_value BIGINT NOT NULL CHECK (last_value > 0),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (company_id, sequence_key)
);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL,
    code VARCHAR(20) NOT NULL,
    name VARCHAR(255) NOT NULL,
    description TEXT,
    account_type VARCHAR(16) NOT NULL
        CHECK (account_type IN ('asset', 'liability', 'equity', 'revenue', 'expense')),
    parent_id UUID REFERENCES accounts(id),
    level INTEGER NOT NULL CHECK (level >= 1),
    is_header BOOLEAN NOT NULL DEFAULT false,
    normal_balance VARCHAR(8) NOT NULL CHECK (normal_balance IN ('debit', 'credit')),
    opening_balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    current_balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_accounts_company_code UNIQUE (company_id, code)
);

CREATE INDEX idx_accounts_company ON accounts(company_id) WHERE is_active = true;
CREATE INDEX idx_accounts_type ON accounts(company_id, account_type);
CREATE INDEX idx_accounts_parent ON accounts(parent_id) WHERE parent_id IS NOT NULL;
";

const JOURNAL_ENTRIES_SQL: &str = r"
CREATE TABLE journal_entries (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL,
    entry_number VARCHAR(32) NOT NULL,
    entry_date DATE NOT NULL,
    description TEXT NOT NULL,
    reference_type VARCHAR(16) NOT NULL,
    reference_id UUID,
    reference_number VARCHAR(64),
    total_debit NUMERIC(19, 4) NOT NULL,
    total_credit NUMERIC(19, 4) NOT NULL,
    status VARCHAR(16) NOT NULL DEFAULT 'draft'
        CHECK (status IN ('draft', 'posted', 'reversed', 'cancelled')),
    posted_at TIMESTAMPTZ,
    posted_by UUID,
    reversal_entry_id UUID REFERENCES journal_entries(id),
    reversed_entry_id UUID REFERENCES journal_entries(id),
    reversal_reason TEXT,
    is_reversal BOOLEAN NOT NULL DEFAULT false,
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_journal_entries_company_number UNIQUE (company_id, entry_number),
    CONSTRAINT chk_journal_entries_balanced CHECK (total_debit = total_credit)
);

CREATE INDEX idx_journal_entries_date ON journal_entries(company_id, entry_date, entry_number);
CREATE INDEX idx_journal_entries_reference
    ON journal_entries(company_id, reference_type, reference_id);
";

const JOURNAL_ENTRY_LINES_SQL: &str = r"
CREATE TABLE journal_entry_lines (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL,
    journal_entry_id UUID NOT NULL REFERENCES journal_entries(id) ON DELETE CASCADE,
    account_id UUID NOT NULL REFERENCES accounts(id),
    line_number INTEGER NOT NULL CHECK (line_number >= 1),
    description TEXT,
    debit_amount NUMERIC(19, 4) NOT NULL DEFAULT 0 CHECK (debit_amount >= 0),
    credit_amount NUMERIC(19, 4) NOT NULL DEFAULT 0 CHECK (credit_amount >= 0),
    party_type VARCHAR(16) CHECK (party_type IN ('customer', 'supplier', 'employee')),
    party_id UUID,
    CONSTRAINT uq_journal_entry_lines_number UNIQUE (journal_entry_id, line_number),
    CONSTRAINT chk_journal_entry_lines_one_sided
        CHECK ((debit_amount > 0 AND credit_amount = 0) OR (credit_amount > 0 AND debit_amount = 0))
);

CREATE INDEX idx_journal_entry_lines_account ON journal_entry_lines(company_id, account_id);
";

const VOUCHERS_SQL: &str = r"
CREATE TABLE vouchers (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL,
    voucher_number VARCHAR(32) NOT NULL,
    voucher_type VARCHAR(16) NOT NULL CHECK (voucher_type IN ('receipt', 'payment')),
    partner_id UUID,
    counterparty VARCHAR(16) NOT NULL CHECK (counterparty IN ('customer', 'supplier')),
    amount NUMERIC(19, 4) NOT NULL CHECK (amount > 0),
    voucher_date DATE NOT NULL,
    payment_method_id UUID,
    cash_account_id UUID REFERENCES accounts(id),
    description TEXT,
    status VARCHAR(16) NOT NULL DEFAULT 'draft' CHECK (status IN ('draft', 'posted', 'void')),
    journal_entry_id UUID REFERENCES journal_entries(id),
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_vouchers_company_number UNIQUE (company_id, voucher_number)
);

CREATE INDEX idx_vouchers_date ON vouchers(company_id, voucher_date);
";

const DOCUMENTS_SQL: &str = r"
CREATE TABLE documents (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL,
    document_type VARCHAR(16) NOT NULL
        CHECK (document_type IN ('invoice', 'bill', 'quote', 'order', 'credit_note', 'debit_note')),
    document_number VARCHAR(32) NOT NULL,
    document_date DATE NOT NULL,
    due_date DATE,
    partner_id UUID,
    subtotal NUMERIC(19, 4) NOT NULL,
    tax_total NUMERIC(19, 4) NOT NULL,
    discount_total NUMERIC(19, 4) NOT NULL,
    total_amount NUMERIC(19, 4) NOT NULL CHECK (total_amount >= 0),
    paid_amount NUMERIC(19, 4) NOT NULL DEFAULT 0 CHECK (paid_amount >= 0),
    status VARCHAR(16) NOT NULL DEFAULT 'draft'
        CHECK (status IN ('draft', 'pending', 'approved', 'paid', 'void', 'cancelled')),
    notes TEXT,
    generated_entry_id UUID REFERENCES journal_entries(id),
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_documents_company_number UNIQUE (company_id, document_number)
);

CREATE INDEX idx_documents_date ON documents(company_id, document_date);
CREATE INDEX idx_documents_partner
    ON documents(company_id, partner_id) WHERE partner_id IS NOT NULL;
";

const DOCUMENT_ITEMS_SQL: &str = r"
CREATE TABLE document_items (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL,
    document_id UUID NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    product_id UUID,
    description TEXT NOT NULL,
    quantity NUMERIC(19, 4) NOT NULL,
    unit_price NUMERIC(19, 4) NOT NULL,
    discount_amount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    tax_rate NUMERIC(7, 4) NOT NULL DEFAULT 0,
    tax_amount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    total NUMERIC(19, 4) NOT NULL
);

CREATE INDEX idx_document_items_document ON document_items(document_id, position);
";

const DOCUMENT_PAYMENTS_SQL: &str = r"
CREATE TABLE document_payments (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL,
    voucher_id UUID NOT NULL REFERENCES vouchers(id),
    document_id UUID NOT NULL REFERENCES documents(id),
    amount NUMERIC(19, 4) NOT NULL CHECK (amount > 0),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_document_payments_document ON document_payments(company_id, document_id);
CREATE INDEX idx_document_payments_voucher ON document_payments(company_id, voucher_id);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS document_payments;
DROP TABLE IF EXISTS document_items;
DROP TABLE IF EXISTS documents;
DROP TABLE IF EXISTS vouchers;
DROP TABLE IF EXISTS journal_entry_lines;
DROP TABLE IF EXISTS journal_entries;
DROP TABLE IF EXISTS accounts;
DROP TABLE IF EXISTS number_sequences;
";
