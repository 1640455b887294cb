use sea_orm::{ActiveModelTrait, TransactionTrait};
use uuid::Uuid;

use crate::{
    Account, Audit, Color, Posting, ResultEngine, capacity, entries::LockDomain,
};

use super::{
    Engine,
    ledger::{insert_transaction, lock, post, read_balances},
    recipes::stocked,
    with_tx,
};

const ALL_DOMAINS: [LockDomain; 7] = [
    LockDomain::Gold,
    LockDomain::Ml(Color::Red),
    LockDomain::Ml(Color::Green),
    LockDomain::Ml(Color::Blue),
    LockDomain::Ml(Color::Dark),
    LockDomain::Potions,
    LockDomain::Capacity,
];

impl Engine {
    /// Gold, ml per channel, stock per recipe and capacity, all from one
    /// consistent read.
    pub async fn audit(&self) -> ResultEngine<Audit> {
        with_tx!(self, |db_tx| {
            let balances = read_balances(&db_tx).await?;
            let potions = stocked(&db_tx).await?;
            let capacity = self.capacity_in(&db_tx).await?;
            Ok(Audit {
                gold: balances.gold,
                ml: balances.ml,
                total_ml: balances.total_ml(),
                total_potions: balances.total_potions(),
                potions,
                capacity,
            })
        })
    }

    /// Bring the shop back to its opening state.
    ///
    /// History is kept: the reset is itself a transaction whose entries bring
    /// gold back to the starting amount and every other balance to zero, and
    /// purchased capacity is cancelled by a negative purchase row. Returns
    /// `None` when the shop is already in that state.
    pub async fn reset(&self) -> ResultEngine<Option<Uuid>> {
        with_tx!(self, |db_tx| {
            lock(&db_tx, &ALL_DOMAINS).await?;
            let balances = read_balances(&db_tx).await?;
            let capacity = self.capacity_in(&db_tx).await?;

            let description = "Shop reset";
            let mut posting = Posting::new(description);
            let gold_change = self.config.starting_gold - balances.gold;
            if gold_change != 0 {
                posting.push(Account::Gold, gold_change, "gold back to starting amount");
            }
            for color in Color::ALL {
                let ml = balances.ml(color);
                if ml != 0 {
                    posting.push(Account::ml(color), -ml, "ml cleared");
                }
            }
            for (recipe_id, quantity) in &balances.potions {
                if *quantity != 0 {
                    posting.push(Account::potion(*recipe_id), -quantity, "stock cleared");
                }
            }

            let has_capacity = capacity.potion_units != 0 || capacity.ml_units != 0;
            if posting.is_empty() && !has_capacity {
                tracing::info!("reset: shop already in opening state");
                return Ok(None);
            }
            let tx = if posting.is_empty() {
                insert_transaction(&db_tx, description).await?
            } else {
                post(&db_tx, &posting).await?
            };
            if has_capacity {
                capacity::ActiveModel::purchase(tx.id, -capacity.potion_units, -capacity.ml_units)
                    .insert(&db_tx)
                    .await?;
            }
            tracing::info!(tx = %tx.id, gold = self.config.starting_gold, "shop reset");
            Ok(Some(tx.id))
        })
    }
}
