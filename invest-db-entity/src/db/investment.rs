use sea_orm::entity::prelude::*;
use sea_orm::prelude::Decimal;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "investment", schema_name = "public")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub owner_account: String,
    pub amount: Decimal,
    pub status: String,
    pub proof_reference: Option<String>,
    pub decision_notes: Option<String>,
    pub created_at: i64,
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
