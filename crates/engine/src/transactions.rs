//! Transaction primitives.
//!
//! A `Transaction` groups the ledger entries written by one business
//! operation (a delivery, a checkout, a capacity purchase). It is inserted
//! together with its entries or not at all.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub description: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::gold_entries::Entity")]
    GoldEntries,
    #[sea_orm(has_many = "super::ml_entries::Entity")]
    MlEntries,
    #[sea_orm(has_many = "super::potion_entries::Entity")]
    PotionEntries,
}

impl Related<super::gold_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GoldEntries.def()
    }
}

impl Related<super::ml_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MlEntries.def()
    }
}

impl Related<super::potion_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PotionEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            description: ActiveValue::Set(tx.description.clone()),
            created_at: ActiveValue::Set(tx.created_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            description: model.description,
            created_at: model.created_at,
        })
    }
}
