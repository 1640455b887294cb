//! Potion recipes (the `potion_catalog` table).
//!
//! A recipe is fixed once defined: its component vector says how many ml of
//! each channel one bottle consumes, and production is matched back to a
//! recipe by that vector.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, PotionType, ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub price: i64,
    pub potion_type: PotionType,
}

impl Recipe {
    pub fn new(
        sku: &str,
        name: &str,
        price: i64,
        potion_type: PotionType,
    ) -> ResultEngine<Self> {
        let sku = sku.trim();
        if sku.is_empty() {
            return Err(EngineError::InvalidQuantity(
                "recipe sku must not be empty".to_string(),
            ));
        }
        if price < 0 {
            return Err(EngineError::InvalidQuantity(format!(
                "recipe {sku}: price must be >= 0"
            )));
        }
        potion_type.ensure_recipe()?;
        let name = match name.trim() {
            "" => sku.to_ascii_lowercase().replace('_', " "),
            other => other.to_string(),
        };
        Ok(Self {
            id: Uuid::new_v4(),
            sku: sku.to_string(),
            name,
            price,
            potion_type,
        })
    }
}

/// A recipe together with its current stock.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stocked {
    pub recipe: Recipe,
    pub quantity: i64,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "potion_catalog")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub sku: String,
    pub name: String,
    pub price: i64,
    pub red: i64,
    pub green: i64,
    pub blue: i64,
    pub dark: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::potion_entries::Entity")]
    PotionEntries,
}

impl Related<super::potion_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PotionEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Recipe> for ActiveModel {
    fn from(recipe: &Recipe) -> Self {
        let [red, green, blue, dark] = recipe.potion_type.0;
        Self {
            id: ActiveValue::Set(recipe.id.to_string()),
            sku: ActiveValue::Set(recipe.sku.clone()),
            name: ActiveValue::Set(recipe.name.clone()),
            price: ActiveValue::Set(recipe.price),
            red: ActiveValue::Set(red),
            green: ActiveValue::Set(green),
            blue: ActiveValue::Set(blue),
            dark: ActiveValue::Set(dark),
        }
    }
}

impl TryFrom<Model> for Recipe {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "recipe")?,
            sku: model.sku,
            name: model.name,
            price: model.price,
            potion_type: PotionType::new(model.red, model.green, model.blue, model.dark),
        })
    }
}
