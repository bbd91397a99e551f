//! `SeaORM` Entity for documents table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub document_type: String,
    pub document_number: String,
    pub document_date: Date,
    pub due_date: Option<Date>,
    pub partner_id: Option<Uuid>,
    pub subtotal: Decimal,
    pub tax_total: Decimal,
    pub discount_total: Decimal,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub status: String,
    pub notes: Option<String>,
    pub generated_entry_id: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::document_items::Entity")]
    DocumentItems,
    #[sea_orm(has_many = "super::document_payments::Entity")]
    DocumentPayments,
}

impl Related<super::document_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DocumentItems.def()
    }
}

impl Related<super::document_payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DocumentPayments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
