//! `SeaORM` Entity for journal_entries table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "journal_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub entry_number: String,
    pub entry_date: Date,
    pub description: String,
    pub reference_type: String,
    pub reference_id: Option<Uuid>,
    pub reference_number: Option<String>,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
    pub status: String,
    pub posted_at: Option<DateTimeUtc>,
    pub posted_by: Option<Uuid>,
    pub reversal_entry_id: Option<Uuid>,
    pub reversed_entry_id: Option<Uuid>,
    pub reversal_reason: Option<String>,
    pub is_reversal: bool,
    pub created_by: Uuid,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::journal_entry_lines::Entity")]
    JournalEntryLines,
}

impl Related<super::journal_entry_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalEntryLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
