//! Customer carts.
//!
//! A cart collects `(recipe, quantity)` lines until checkout. Checkout writes
//! one ledger transaction and stamps its id on the cart, so a cart can be
//! paid only once.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_name: String,
    pub character_class: String,
    pub level: i64,
}

impl Customer {
    pub fn new(
        customer_name: impl Into<String>,
        character_class: impl Into<String>,
        level: i64,
    ) -> Self {
        Self {
            customer_name: customer_name.into(),
            character_class: character_class.into(),
            level,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub id: Uuid,
    pub customer: Customer,
    pub created_at: DateTime<Utc>,
    pub checkout_transaction_id: Option<Uuid>,
}

/// Outcome of a successful checkout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutReceipt {
    pub transaction_id: Uuid,
    pub total_potions_bought: i64,
    pub total_gold_paid: i64,
    /// Stock left for each purchased sku.
    pub remaining: Vec<(String, i64)>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "carts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub customer_name: String,
    pub character_class: String,
    pub level: i64,
    pub created_at: DateTimeUtc,
    pub checkout_transaction_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::cart_items::Entity")]
    CartItems,
    #[sea_orm(
        belongs_to = "super::transactions::Entity",
        from = "Column::CheckoutTransactionId",
        to = "super::transactions::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    CheckoutTransaction,
}

impl Related<super::cart_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Cart> for ActiveModel {
    fn from(cart: &Cart) -> Self {
        Self {
            id: ActiveValue::Set(cart.id.to_string()),
            customer_name: ActiveValue::Set(cart.customer.customer_name.clone()),
            character_class: ActiveValue::Set(cart.customer.character_class.clone()),
            level: ActiveValue::Set(cart.customer.level),
            created_at: ActiveValue::Set(cart.created_at),
            checkout_transaction_id: ActiveValue::Set(
                cart.checkout_transaction_id.map(|id| id.to_string()),
            ),
        }
    }
}

impl TryFrom<Model> for Cart {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "cart")?,
            customer: Customer {
                customer_name: model.customer_name,
                character_class: model.character_class,
                level: model.level,
            },
            created_at: model.created_at,
            checkout_transaction_id: model
                .checkout_transaction_id
                .as_deref()
                .map(|id| parse_uuid(id, "transaction"))
                .transpose()?,
        })
    }
}
