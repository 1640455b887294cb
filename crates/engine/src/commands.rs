//! Command structs for engine operations.
//!
//! These types group the inputs of deliveries and plans, keeping call sites
//! readable and avoiding long argument lists.

use serde::{Deserialize, Serialize};

use crate::{
    EngineError, PotionType, ResultEngine,
    util::{checked_add, ensure_non_negative},
};

/// A wholesale barrel, as offered in a catalog or as delivered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Barrel {
    pub sku: String,
    pub ml_per_barrel: i64,
    pub potion_type: PotionType,
    pub price: i64,
    pub quantity: i64,
}

impl Barrel {
    #[must_use]
    pub fn new(sku: impl Into<String>, potion_type: PotionType, ml_per_barrel: i64) -> Self {
        Self {
            sku: sku.into(),
            ml_per_barrel,
            potion_type,
            price: 0,
            quantity: 1,
        }
    }

    #[must_use]
    pub fn price(mut self, price: i64) -> Self {
        self.price = price;
        self
    }

    #[must_use]
    pub fn quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    pub(crate) fn validate(&self) -> ResultEngine<()> {
        ensure_non_negative(self.ml_per_barrel, "ml_per_barrel")?;
        ensure_non_negative(self.price, "barrel price")?;
        ensure_non_negative(self.quantity, "barrel quantity")?;
        if self.sku.trim().is_empty() {
            return Err(EngineError::InvalidQuantity(
                "barrel sku must not be empty".to_string(),
            ));
        }
        self.potion_type.single_channel()?;
        Ok(())
    }
}

/// Bottles produced for one component vector.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PotionDelivery {
    pub potion_type: PotionType,
    pub quantity: i64,
}

impl PotionDelivery {
    #[must_use]
    pub fn new(potion_type: PotionType, quantity: i64) -> Self {
        Self {
            potion_type,
            quantity,
        }
    }
}

/// Column a cart search sorts on.
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

/// Filters and paging for [`Engine::search_orders`](crate::Engine::search_orders).
///
/// Empty filters match everything; `search_page` is a token from a previous
/// [`OrderPage`](crate::OrderPage), empty for the first page.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSearch {
    pub customer_name: String,
    pub potion_sku: String,
    pub search_page: String,
    pub sort_col: SortColumn,
    pub sort_order: SortOrder,
}

/// Capacity units to buy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityOrder {
    pub potion_capacity: i64,
    pub ml_capacity: i64,
}

impl CapacityOrder {
    #[must_use]
    pub fn new(potion_capacity: i64, ml_capacity: i64) -> Self {
        Self {
            potion_capacity,
            ml_capacity,
        }
    }

    pub fn units(&self) -> ResultEngine<i64> {
        checked_add(self.potion_capacity, self.ml_capacity, "capacity units")
    }

    pub fn is_empty(&self) -> bool {
        self.potion_capacity == 0 && self.ml_capacity == 0
    }

    pub(crate) fn validate(&self) -> ResultEngine<()> {
        ensure_non_negative(self.potion_capacity, "potion_capacity")?;
        ensure_non_negative(self.ml_capacity, "ml_capacity")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_units_reject_overflow() {
        assert_eq!(CapacityOrder::new(2, 3).units().ok(), Some(5));
        assert!(matches!(
            CapacityOrder::new(i64::MAX, 1).units(),
            Err(EngineError::InvalidQuantity(_))
        ));
        assert!(!CapacityOrder::new(i64::MAX, 1).is_empty());
        assert!(CapacityOrder::default().is_empty());
    }
}
