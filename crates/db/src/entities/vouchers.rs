//! `SeaORM` Entity for vouchers table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "vouchers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub voucher_number: String,
    pub voucher_type: String,
    pub partner_id: Option<Uuid>,
    pub counterparty: String,
    pub amount: Decimal,
    pub voucher_date: Date,
    pub payment_method_id: Option<Uuid>,
    pub cash_account_id: Option<Uuid>,
    pub description: Option<String>,
    pub status: String,
    pub journal_entry_id: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::document_payments::Entity")]
    DocumentPayments,
}

impl Related<super::document_payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DocumentPayments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
