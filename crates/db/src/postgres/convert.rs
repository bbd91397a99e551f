//! Conversions between entity models and domain types.

use ledgerline_core::bridge::{
    Document, DocumentItem, DocumentPayment, DocumentStatus, DocumentType, Voucher, VoucherStatus,
    VoucherType,
};
use ledgerline_core::ledger::{
    Account, AccountType, EntryStatus, JournalEntry, JournalEntryLine, NormalBalance, PartyType,
    PostedLine, ReferenceType,
};
use ledgerline_core::store::StoreResult;
use ledgerline_shared::types::{
    AccountId, CompanyId, DocumentId, DocumentItemId, DocumentPaymentId, JournalEntryId,
    JournalLineId, PartnerId, PaymentMethodId, ProductId, UserId, VoucherId,
};
use sea_orm::ActiveValue::Set;

use crate::entities::{
    accounts, document_items, document_payments, documents, journal_entries, journal_entry_lines,
    vouchers,
};
use crate::error::corrupt;

fn parsed<T>(column: &str, value: &str, parse: impl FnOnce(&str) -> Option<T>) -> StoreResult<T> {
    parse(value).ok_or_else(|| corrupt(column, value))
}

// ========== Accounts ==========

pub(crate) fn account_from_model(m: accounts::Model) -> StoreResult<Account> {
    Ok(Account {
        id: AccountId(m.id),
        company_id: CompanyId(m.company_id),
        account_type: parsed("account_type", &m.account_type, AccountType::parse)?,
        normal_balance: parsed("normal_balance", &m.normal_balance, NormalBalance::parse)?,
        code: m.code,
        name: m.name,
        description: m.description,
        parent_id: m.parent_id.map(AccountId),
        level: m.level,
        is_header: m.is_header,
        opening_balance: m.opening_balance,
        current_balance: m.current_balance,
        is_active: m.is_active,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

pub(crate) fn account_active(a: &Account) -> accounts::ActiveModel {
    accounts::ActiveModel {
        id: Set(a.id.into_inner()),
        company_id: Set(a.company_id.into_inner()),
        code: Set(a.code.clone()),
        name: Set(a.name.clone()),
        description: Set(a.description.clone()),
        account_type: Set(a.account_type.as_str().to_string()),
        parent_id: Set(a.parent_id.map(AccountId::into_inner)),
        level: Set(a.level),
        is_header: Set(a.is_header),
        normal_balance: Set(a.normal_balance.as_str().to_string()),
        opening_balance: Set(a.opening_balance),
        current_balance: Set(a.current_balance),
        is_active: Set(a.is_active),
        created_at: Set(a.created_at),
        updated_at: Set(a.updated_at),
    }
}

// ========== Journal ==========

pub(crate) fn entry_from_model(m: journal_entries::Model) -> StoreResult<JournalEntry> {
    Ok(JournalEntry {
        id: JournalEntryId(m.id),
        company_id: CompanyId(m.company_id),
        reference_type: parsed("reference_type", &m.reference_type, ReferenceType::parse)?,
        status: parsed("status", &m.status, EntryStatus::parse)?,
        entry_number: m.entry_number,
        entry_date: m.entry_date,
        description: m.description,
        reference_id: m.reference_id,
        reference_number: m.reference_number,
        total_debit: m.total_debit,
        total_credit: m.total_credit,
        posted_at: m.posted_at,
        posted_by: m.posted_by.map(UserId),
        reversal_entry_id: m.reversal_entry_id.map(JournalEntryId),
        reversed_entry_id: m.reversed_entry_id.map(JournalEntryId),
        reversal_reason: m.reversal_reason,
        is_reversal: m.is_reversal,
        created_by: UserId(m.created_by),
        created_at: m.created_at,
    })
}

pub(crate) fn entry_active(e: &JournalEntry) -> journal_entries::ActiveModel {
    journal_entries::ActiveModel {
        id: Set(e.id.into_inner()),
        company_id: Set(e.company_id.into_inner()),
        entry_number: Set(e.entry_number.clone()),
        entry_date: Set(e.entry_date),
        description: Set(e.description.clone()),
        reference_type: Set(e.reference_type.as_str().to_string()),
        reference_id: Set(e.reference_id),
        reference_number: Set(e.reference_number.clone()),
        total_debit: Set(e.total_debit),
        total_credit: Set(e.total_credit),
        status: Set(e.status.as_str().to_string()),
        posted_at: Set(e.posted_at),
        posted_by: Set(e.posted_by.map(UserId::into_inner)),
        reversal_entry_id: Set(e.reversal_entry_id.map(JournalEntryId::into_inner)),
        reversed_entry_id: Set(e.reversed_entry_id.map(JournalEntryId::into_inner)),
        reversal_reason: Set(e.reversal_reason.clone()),
        is_reversal: Set(e.is_reversal),
        created_by: Set(e.created_by.into_inner()),
        created_at: Set(e.created_at),
    }
}

fn party_from(value: Option<&str>) -> StoreResult<Option<PartyType>> {
    value.map(|v| parsed("party_type", v, PartyType::parse)).transpose()
}

pub(crate) fn line_from_model(m: journal_entry_lines::Model) -> StoreResult<JournalEntryLine> {
    Ok(JournalEntryLine {
        id: JournalLineId(m.id),
        journal_entry_id: JournalEntryId(m.journal_entry_id),
        account_id: AccountId(m.account_id),
        line_number: m.line_number,
        party_type: party_from(m.party_type.as_deref())?,
        description: m.description,
        debit_amount: m.debit_amount,
        credit_amount: m.credit_amount,
        party_id: m.party_id.map(PartnerId),
    })
}

pub(crate) fn line_active(
    company_id: CompanyId,
    l: &JournalEntryLine,
) -> journal_entry_lines::ActiveModel {
    journal_entry_lines::ActiveModel {
        id: Set(l.id.into_inner()),
        company_id: Set(company_id.into_inner()),
        journal_entry_id: Set(l.journal_entry_id.into_inner()),
        account_id: Set(l.account_id.into_inner()),
        line_number: Set(l.line_number),
        description: Set(l.description.clone()),
        debit_amount: Set(l.debit_amount),
        credit_amount: Set(l.credit_amount),
        party_type: Set(l.party_type.map(|p| p.as_str().to_string())),
        party_id: Set(l.party_id.map(PartnerId::into_inner)),
    }
}

pub(crate) fn posted_line(
    line: journal_entry_lines::Model,
    entry: journal_entries::Model,
) -> PostedLine {
    PostedLine {
        entry_id: JournalEntryId(entry.id),
        entry_number: entry.entry_number,
        entry_date: entry.entry_date,
        entry_description: entry.description,
        account_id: AccountId(line.account_id),
        line_number: line.line_number,
        description: line.description,
        debit_amount: line.debit_amount,
        credit_amount: line.credit_amount,
    }
}

// ========== Vouchers ==========

pub(crate) fn voucher_from_model(m: vouchers::Model) -> StoreResult<Voucher> {
    Ok(Voucher {
        id: VoucherId(m.id),
        company_id: CompanyId(m.company_id),
        voucher_type: parsed("voucher_type", &m.voucher_type, VoucherType::parse)?,
        status: parsed("status", &m.status, VoucherStatus::parse)?,
        voucher_number: m.voucher_number,
        partner_id: m.partner_id.map(PartnerId),
        counterparty: parsed("counterparty", &m.counterparty, PartyType::parse)?,
        amount: m.amount,
        date: m.voucher_date,
        payment_method_id: m.payment_method_id.map(PaymentMethodId),
        cash_account_id: m.cash_account_id.map(AccountId),
        description: m.description,
        journal_entry_id: m.journal_entry_id.map(JournalEntryId),
        created_by: UserId(m.created_by),
        created_at: m.created_at,
    })
}

pub(crate) fn voucher_active(v: &Voucher) -> vouchers::ActiveModel {
    vouchers::ActiveModel {
        id: Set(v.id.into_inner()),
        company_id: Set(v.company_id.into_inner()),
        voucher_number: Set(v.voucher_number.clone()),
        voucher_type: Set(v.voucher_type.as_str().to_string()),
        partner_id: Set(v.partner_id.map(PartnerId::into_inner)),
        counterparty: Set(v.counterparty.as_str().to_string()),
        amount: Set(v.amount),
        voucher_date: Set(v.date),
        payment_method_id: Set(v.payment_method_id.map(PaymentMethodId::into_inner)),
        cash_account_id: Set(v.cash_account_id.map(AccountId::into_inner)),
        description: Set(v.description.clone()),
        status: Set(v.status.as_str().to_string()),
        journal_entry_id: Set(v.journal_entry_id.map(JournalEntryId::into_inner)),
        created_by: Set(v.created_by.into_inner()),
        created_at: Set(v.created_at),
    }
}

// ========== Documents ==========

pub(crate) fn document_from_model(m: documents::Model) -> StoreResult<Document> {
    Ok(Document {
        id: DocumentId(m.id),
        company_id: CompanyId(m.company_id),
        document_type: parsed("document_type", &m.document_type, DocumentType::parse)?,
        status: parsed("status", &m.status, DocumentStatus::parse)?,
        document_number: m.document_number,
        date: m.document_date,
        due_date: m.due_date,
        partner_id: m.partner_id.map(PartnerId),
        subtotal: m.subtotal,
        tax_total: m.tax_total,
        discount_total: m.discount_total,
        total_amount: m.total_amount,
        paid_amount: m.paid_amount,
        notes: m.notes,
        generated_entry_id: m.generated_entry_id.map(JournalEntryId),
        created_by: UserId(m.created_by),
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

pub(crate) fn document_active(d: &Document) -> documents::ActiveModel {
    documents::ActiveModel {
        id: Set(d.id.into_inner()),
        company_id: Set(d.company_id.into_inner()),
        document_type: Set(d.document_type.as_str().to_string()),
        document_number: Set(d.document_number.clone()),
        document_date: Set(d.date),
        due_date: Set(d.due_date),
        partner_id: Set(d.partner_id.map(PartnerId::into_inner)),
        subtotal: Set(d.subtotal),
        tax_total: Set(d.tax_total),
        discount_total: Set(d.discount_total),
        total_amount: Set(d.total_amount),
        paid_amount: Set(d.paid_amount),
        status: Set(d.status.as_str().to_string()),
        notes: Set(d.notes.clone()),
        generated_entry_id: Set(d.generated_entry_id.map(JournalEntryId::into_inner)),
        created_by: Set(d.created_by.into_inner()),
        created_at: Set(d.created_at),
        updated_at: Set(d.updated_at),
    }
}

pub(crate) fn item_from_model(m: document_items::Model) -> DocumentItem {
    DocumentItem {
        id: DocumentItemId(m.id),
        document_id: DocumentId(m.document_id),
        product_id: m.product_id.map(ProductId),
        description: m.description,
        quantity: m.quantity,
        unit_price: m.unit_price,
        discount_amount: m.discount_amount,
        tax_rate: m.tax_rate,
        tax_amount: m.tax_amount,
        total: m.total,
    }
}

pub(crate) fn item_active(
    company_id: CompanyId,
    position: i32,
    i: &DocumentItem,
) -> document_items::ActiveModel {
    document_items::ActiveModel {
        id: Set(i.id.into_inner()),
        company_id: Set(company_id.into_inner()),
        document_id: Set(i.document_id.into_inner()),
        position: Set(position),
        product_id: Set(i.product_id.map(ProductId::into_inner)),
        description: Set(i.description.clone()),
        quantity: Set(i.quantity),
        unit_price: Set(i.unit_price),
        discount_amount: Set(i.discount_amount),
        tax_rate: Set(i.tax_rate),
        tax_amount: Set(i.tax_amount),
        total: Set(i.total),
    }
}

pub(crate) fn payment_from_model(m: document_payments::Model) -> DocumentPayment {
    DocumentPayment {
        id: DocumentPaymentId(m.id),
        company_id: CompanyId(m.company_id),
        voucher_id: VoucherId(m.voucher_id),
        document_id: DocumentId(m.document_id),
        amount: m.amount,
        created_at: m.created_at,
    }
}

pub(crate) fn payment_active(p: &DocumentPayment) -> document_payments::ActiveModel {
    document_payments::ActiveModel {
        id: Set(p.id.into_inner()),
        company_id: Set(p.company_id.into_inner()),
        voucher_id: Set(p.voucher_id.into_inner()),
        document_id: Set(p.document_id.into_inner()),
        amount: Set(p.amount),
        created_at: Set(p.created_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn model(account_type: &str) -> accounts::Model {
        accounts::Model {
            id: Uuid::now_v7(),
            company_id: Uuid::now_v7(),
            code: "1111".to_string(),
            name: "Cash".to_string(),
            description: None,
            account_type: account_type.to_string(),
            parent_id: None,
            level: 1,
            is_header: false,
            normal_balance: "debit".to_string(),
            opening_balance: Decimal::ZERO,
            current_balance: Decimal::ZERO,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_account_model_converts() {
        let account = account_from_model(model("asset")).unwrap();
        assert_eq!(account.account_type, AccountType::Asset);
        assert_eq!(account.normal_balance, NormalBalance::Debit);
    }

    #[test]
    fn test_unknown_enum_value_is_backend_error() {
        assert!(account_from_model(model("goodwill")).is_err());
    }

    #[test]
    fn test_party_type_round_trip() {
        assert_eq!(party_from(Some("supplier")).unwrap(), Some(PartyType::Supplier));
        assert_eq!(party_from(None).unwrap(), None);
        assert!(party_from(Some("vendor")).is_err());
    }
}
