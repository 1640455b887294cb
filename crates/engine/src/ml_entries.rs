use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::Color;

/// One row per channel change; `color` holds [`Color::as_str`].
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ml_ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub transaction_id: String,
    pub color: String,
    pub change: i64,
    pub description: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transactions::Entity",
        from = "Column::TransactionId",
        to = "super::transactions::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn entry(
        transaction_id: Uuid,
        color: Color,
        change: i64,
        description: &str,
    ) -> Self {
        Self {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            transaction_id: ActiveValue::Set(transaction_id.to_string()),
            color: ActiveValue::Set(color.as_str().to_string()),
            change: ActiveValue::Set(change),
            description: ActiveValue::Set(description.to_string()),
        }
    }
}
