//! Read models returned by the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Capacity, Color, PotionType, recipes::Stocked};

/// Current balance of every account, read in one transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balances {
    pub gold: i64,
    /// Indexed by [`Color::index`].
    pub ml: [i64; 4],
    /// Recipe id and units in stock; recipes without entries are absent.
    pub potions: Vec<(Uuid, i64)>,
}

impl Balances {
    pub fn ml(&self, color: Color) -> i64 {
        self.ml[color.index()]
    }

    pub fn potions_of(&self, recipe_id: Uuid) -> i64 {
        self.potions
            .iter()
            .find(|(id, _)| *id == recipe_id)
            .map_or(0, |(_, quantity)| *quantity)
    }

    pub fn total_potions(&self) -> i64 {
        self.potions.iter().map(|(_, quantity)| quantity).sum()
    }

    pub fn total_ml(&self) -> i64 {
        self.ml.iter().sum()
    }
}

/// Everything the shop owns, for the audit endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audit {
    pub gold: i64,
    pub ml: [i64; 4],
    pub total_ml: i64,
    pub potions: Vec<Stocked>,
    pub total_potions: i64,
    pub capacity: Capacity,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BottlePlanItem {
    pub recipe_id: Uuid,
    pub sku: String,
    pub potion_type: PotionType,
    pub quantity: i64,
}

/// Capacity units the shop should buy today; zero means none.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityPlan {
    pub potion_capacity: i64,
    pub ml_capacity: i64,
}

/// One paid cart line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// `<cart id>:<recipe id>`, unique per line.
    pub line_item_id: String,
    pub item_sku: String,
    pub customer_name: String,
    pub line_item_total: i64,
    /// When the cart was checked out.
    pub timestamp: DateTime<Utc>,
}

/// A page of order lines; tokens are empty when there is no such page.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPage {
    pub previous: String,
    pub next: String,
    pub results: Vec<OrderLine>,
}
