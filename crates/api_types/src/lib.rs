use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Component vector `[red, green, blue, dark]`.
pub type PotionType = [i64; 4];

pub mod barrel {
    use super::*;

    /// A wholesale barrel, offered in a catalog or delivered.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Barrel {
        pub sku: String,
        pub ml_per_barrel: i64,
        pub potion_type: PotionType,
        pub price: i64,
        pub quantity: i64,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct BarrelOrder {
        pub sku: String,
        pub quantity: i64,
    }
}

pub mod bottler {
    use super::*;

    /// Bottles produced (delivery) or to produce (plan) for one vector.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PotionInventory {
        pub potion_type: PotionType,
        pub quantity: i64,
    }
}

pub mod inventory {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CapacityPurchase {
        pub potion_capacity: i64,
        pub ml_capacity: i64,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct MlInventory {
        pub red_ml: i64,
        pub green_ml: i64,
        pub blue_ml: i64,
        pub dark_ml: i64,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PotionStock {
        pub sku: String,
        pub name: String,
        pub potion_type: PotionType,
        pub inventory: i64,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CapacityView {
        pub potion_units: i64,
        pub ml_units: i64,
        pub max_potions: i64,
        pub max_ml_per_channel: i64,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Audit {
        pub gold: i64,
        pub ml_in_barrels: i64,
        pub ml_inventory: MlInventory,
        pub number_of_potions: i64,
        pub potions: Vec<PotionStock>,
        pub capacity: CapacityView,
    }
}

pub mod cart {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Customer {
        pub customer_name: String,
        pub character_class: String,
        pub level: i64,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CartCreated {
        pub cart_id: Uuid,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CartItem {
        pub quantity: i64,
    }

    /// Payment as sent by the customer; parsed by the shop.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CartCheckout {
        pub payment: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PotionRemaining {
        pub sku: String,
        pub quantity: i64,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CheckoutResult {
        pub total_potions_bought: i64,
        pub total_gold_paid: i64,
        /// Stock left for each sku in the cart.
        pub remaining: Vec<PotionRemaining>,
    }

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum SortColumn {
        CustomerName,
        ItemSku,
        LineItemTotal,
        #[default]
        Timestamp,
    }

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum SortOrder {
        Asc,
        #[default]
        Desc,
    }

    /// Query string of `GET /carts/search/`; every field is optional.
    #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct SearchQuery {
        pub customer_name: String,
        pub potion_sku: String,
        pub search_page: String,
        pub sort_col: SortColumn,
        pub sort_order: SortOrder,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct LineItem {
        pub line_item_id: String,
        pub item_sku: String,
        pub customer_name: String,
        pub line_item_total: i64,
        pub timestamp: DateTime<Utc>,
    }

    /// One page of search results. Empty tokens mean there is no such page.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SearchResult {
        pub previous: String,
        pub next: String,
        pub results: Vec<LineItem>,
    }
}

pub mod catalog {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CatalogItem {
        pub sku: String,
        pub name: String,
        pub quantity: i64,
        pub price: i64,
        pub potion_type: PotionType,
    }
}

pub mod admin {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ResetResult {
        /// `None` when the shop was already in its opening state.
        pub transaction_id: Option<Uuid>,
    }
}
