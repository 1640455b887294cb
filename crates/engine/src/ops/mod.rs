use sea_orm::DatabaseConnection;

use crate::{EngineError, ResultEngine, ShopConfig};

mod audit;
mod carts;
mod deliveries;
mod ledger;
mod plans;
mod recipes;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    config: ShopConfig,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn config(&self) -> &ShopConfig {
        &self.config
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    config: ShopConfig,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Pass the shop policy; defaults apply otherwise.
    pub fn config(mut self, config: ShopConfig) -> EngineBuilder {
        self.config = config;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let capacity = &self.config.capacity;
        if capacity.unit_cost <= 0 || capacity.potions_per_unit <= 0 || capacity.ml_per_unit <= 0
        {
            return Err(EngineError::InvalidQuantity(
                "capacity unit cost and sizes must be > 0".to_string(),
            ));
        }
        if self.config.starting_gold < 0 {
            return Err(EngineError::InvalidQuantity(
                "starting_gold must be >= 0".to_string(),
            ));
        }
        Ok(Engine {
            database: self.database,
            config: self.config,
        })
    }
}
