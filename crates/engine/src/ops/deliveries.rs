use std::collections::BTreeMap;

use sea_orm::{ActiveModelTrait, TransactionTrait};
use uuid::Uuid;

use crate::{
    Account, Barrel, CapacityOrder, Color, EngineError, PotionDelivery, Posting, ResultEngine,
    capacity,
    entries::LockDomain,
    util::{checked_add, checked_mul, ensure_non_negative},
};

use super::{
    Engine,
    ledger::{balance_of, lock, post, read_balances},
    recipes::recipe_by_type,
    with_tx,
};

impl Engine {
    /// Record delivered barrels: pay their price and add their ml.
    ///
    /// Returns `None` when nothing was delivered. A failed check leaves the
    /// ledger untouched.
    pub async fn deliver_barrels(
        &self,
        order_id: i64,
        barrels: &[Barrel],
    ) -> ResultEngine<Option<Uuid>> {
        for barrel in barrels {
            barrel.validate()?;
        }
        let barrels: Vec<&Barrel> = barrels.iter().filter(|b| b.quantity > 0).collect();
        if barrels.is_empty() {
            tracing::info!(order_id, "empty barrel delivery, nothing recorded");
            return Ok(None);
        }

        let description = format!("Barrel delivery order {order_id}");
        let mut cost = 0_i64;
        let mut added = [0_i64; 4];
        let mut posting = Posting::new(&description).lock(LockDomain::Capacity);
        for barrel in &barrels {
            let color = barrel.potion_type.single_channel()?;
            let price = checked_mul(barrel.price, barrel.quantity, "barrel cost")?;
            let ml = checked_mul(barrel.ml_per_barrel, barrel.quantity, "barrel ml")?;
            cost = checked_add(cost, price, "barrel cost")?;
            added[color.index()] = checked_add(added[color.index()], ml, "barrel ml")?;
            if ml > 0 {
                posting.push(
                    Account::ml(color),
                    ml,
                    format!("{} x{}", barrel.sku, barrel.quantity),
                );
            }
        }
        if cost > 0 {
            posting.push(Account::Gold, -cost, format!("{} barrels", barrels.len()));
        }

        with_tx!(self, |db_tx| {
            lock(&db_tx, &posting.lock_domains()).await?;

            let gold = balance_of(&db_tx, Account::Gold).await?;
            if gold < cost {
                tracing::warn!(order_id, cost, gold, "barrel delivery rejected");
                return Err(EngineError::InsufficientGold(format!(
                    "order {order_id} costs {cost}, {gold} available"
                )));
            }

            let capacity = self.capacity_in(&db_tx).await?;
            for color in Color::ALL {
                let ml = added[color.index()];
                if ml == 0 {
                    continue;
                }
                let current = balance_of(&db_tx, Account::ml(color)).await?;
                if ml > capacity.max_ml_per_channel - current {
                    return Err(EngineError::CapacityExceeded(format!(
                        "{color} ml would reach {current} + {ml}, limit is {}",
                        capacity.max_ml_per_channel
                    )));
                }
            }

            let tx = post(&db_tx, &posting).await?;
            tracing::info!(order_id, cost, tx = %tx.id, "barrels delivered");
            Ok(Some(tx.id))
        })
    }

    /// Record bottled potions: consume their ml and add them to stock.
    pub async fn deliver_bottles(
        &self,
        order_id: i64,
        deliveries: &[PotionDelivery],
    ) -> ResultEngine<Option<Uuid>> {
        for delivery in deliveries {
            ensure_non_negative(delivery.quantity, "potion quantity")?;
            delivery.potion_type.ensure_recipe()?;
        }
        let deliveries: Vec<&PotionDelivery> =
            deliveries.iter().filter(|d| d.quantity > 0).collect();
        if deliveries.is_empty() {
            tracing::info!(order_id, "empty bottle delivery, nothing recorded");
            return Ok(None);
        }

        let mut consumed = [0_i64; 4];
        let mut bottles = 0_i64;
        for delivery in &deliveries {
            for color in Color::ALL {
                let ml = checked_mul(
                    delivery.potion_type.get(color),
                    delivery.quantity,
                    "ml consumed",
                )?;
                consumed[color.index()] = checked_add(consumed[color.index()], ml, "ml consumed")?;
            }
            bottles = checked_add(bottles, delivery.quantity, "bottles")?;
        }
        let mut domains = vec![LockDomain::Potions, LockDomain::Capacity];
        domains.extend(
            Color::ALL
                .into_iter()
                .filter(|c| consumed[c.index()] > 0)
                .map(LockDomain::Ml),
        );

        let description = format!("Bottle delivery order {order_id}");
        with_tx!(self, |db_tx| {
            lock(&db_tx, &domains).await?;

            let mut produced: BTreeMap<Uuid, (String, i64)> = BTreeMap::new();
            for delivery in &deliveries {
                let recipe = recipe_by_type(&db_tx, &delivery.potion_type).await?;
                produced
                    .entry(recipe.id)
                    .or_insert((recipe.sku, 0))
                    .1 += delivery.quantity;
            }

            for color in Color::ALL {
                let needed = consumed[color.index()];
                if needed == 0 {
                    continue;
                }
                let available = balance_of(&db_tx, Account::ml(color)).await?;
                if available < needed {
                    tracing::warn!(order_id, %color, needed, available, "bottle delivery rejected");
                    return Err(EngineError::InsufficientMl(format!(
                        "{color}: {needed} ml needed, {available} available"
                    )));
                }
            }

            let capacity = self.capacity_in(&db_tx).await?;
            let stock = read_balances(&db_tx).await?.total_potions();
            if bottles > capacity.max_potions - stock {
                return Err(EngineError::CapacityExceeded(format!(
                    "{stock} + {bottles} potions would exceed the limit of {}",
                    capacity.max_potions
                )));
            }

            let mut posting = Posting::new(&description);
            for color in Color::ALL {
                let ml = consumed[color.index()];
                if ml > 0 {
                    posting.push(Account::ml(color), -ml, format!("{bottles} bottles"));
                }
            }
            for (recipe_id, (sku, quantity)) in produced {
                posting.push(Account::potion(recipe_id), quantity, format!("{sku} x{quantity}"));
            }

            let tx = post(&db_tx, &posting).await?;
            tracing::info!(order_id, bottles, tx = %tx.id, "bottles delivered");
            Ok(Some(tx.id))
        })
    }

    /// Pay for capacity units and record them.
    pub async fn deliver_capacity(
        &self,
        order_id: i64,
        order: CapacityOrder,
    ) -> ResultEngine<Option<Uuid>> {
        order.validate()?;
        if order.is_empty() {
            tracing::info!(order_id, "empty capacity order, nothing recorded");
            return Ok(None);
        }
        let cost = checked_mul(order.units()?, self.config.capacity.unit_cost, "capacity cost")?;
        let posting = Posting::new(format!("Capacity purchase order {order_id}"))
            .entry(
                Account::Gold,
                -cost,
                format!(
                    "{} potion, {} ml capacity",
                    order.potion_capacity, order.ml_capacity
                ),
            )
            .lock(LockDomain::Capacity);

        with_tx!(self, |db_tx| {
            lock(&db_tx, &posting.lock_domains()).await?;
            let gold = balance_of(&db_tx, Account::Gold).await?;
            if gold < cost {
                tracing::warn!(order_id, cost, gold, "capacity purchase rejected");
                return Err(EngineError::InsufficientGold(format!(
                    "capacity order {order_id} costs {cost}, {gold} available"
                )));
            }
            let tx = post(&db_tx, &posting).await?;
            capacity::ActiveModel::purchase(tx.id, order.potion_capacity, order.ml_capacity)
                .insert(&db_tx)
                .await?;
            tracing::info!(order_id, cost, tx = %tx.id, "capacity purchased");
            Ok(Some(tx.id))
        })
    }
}
