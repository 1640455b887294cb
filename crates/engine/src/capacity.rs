//! Storage capacity.
//!
//! Capacity is never stored as a counter: each purchase appends a row to
//! `capacity_purchases` and the ceilings are derived from the sum of units.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::CapacityConfig;

/// Units bought so far and the ceilings they give.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacity {
    pub potion_units: i64,
    pub ml_units: i64,
    /// Total potions across every recipe.
    pub max_potions: i64,
    /// Millilitres allowed in each channel.
    pub max_ml_per_channel: i64,
}

impl Capacity {
    /// Build the ceilings from purchased units; one unit of each is free.
    pub fn from_units(potion_units: i64, ml_units: i64, config: &CapacityConfig) -> Self {
        Self {
            potion_units,
            ml_units,
            max_potions: (1 + potion_units) * config.potions_per_unit,
            max_ml_per_channel: (1 + ml_units) * config.ml_per_unit,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "capacity_purchases")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub transaction_id: String,
    pub potion_units: i64,
    pub ml_units: i64,
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
    pub(crate) fn purchase(transaction_id: Uuid, potion_units: i64, ml_units: i64) -> Self {
        Self {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            transaction_id: ActiveValue::Set(transaction_id.to_string()),
            potion_units: ActiveValue::Set(potion_units),
            ml_units: ActiveValue::Set(ml_units),
        }
    }
}
