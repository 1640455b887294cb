use sea_orm::TransactionTrait;

use crate::{
    Barrel, BottlePlanItem, CapacityPlan, Color, EngineError, Limits, PlanItem, PotionType,
    ResultEngine, planner::{self, Candidate},
};

use super::{
    Engine,
    ledger::read_balances,
    recipes::all_recipes,
    with_tx,
};

impl Engine {
    /// Barrels to buy from today's wholesale catalog.
    ///
    /// Each barrel fills one channel; its channel is restocked only while the
    /// pure recipe of that color has fewer potions than the restock threshold.
    pub async fn barrel_plan(&self, catalog: &[Barrel]) -> ResultEngine<Vec<PlanItem>> {
        for barrel in catalog {
            barrel.validate()?;
        }
        let (balances, capacity, recipes) = with_tx!(self, |db_tx| {
            let balances = read_balances(&db_tx).await?;
            let capacity = self.capacity_in(&db_tx).await?;
            let recipes = all_recipes(&db_tx).await?;
            Ok::<_, EngineError>((balances, capacity, recipes))
        })?;

        let threshold = self.config.barrels.restock_threshold;
        let candidates = catalog
            .iter()
            .map(|barrel| {
                let color = barrel.potion_type.single_channel()?;
                let stock = recipes
                    .iter()
                    .find(|r| r.potion_type == PotionType::pure(color))
                    .map_or(0, |r| balances.potions_of(r.id));
                Ok(Candidate::new(&barrel.sku, barrel.quantity)
                    .price(barrel.price)
                    .yields(color, barrel.ml_per_barrel)
                    .value(barrel.ml_per_barrel)
                    .restock(stock, threshold))
            })
            .collect::<ResultEngine<Vec<_>>>()?;

        let limits = Limits {
            gold: balances.gold,
            ml_available: balances.ml,
            ml_headroom: balances.ml.map(|ml| capacity.max_ml_per_channel - ml),
            potion_headroom: capacity.max_potions - balances.total_potions(),
        };
        let plan = self.config.barrel_planner().plan(&candidates, &limits)?;
        tracing::info!(
            offered = catalog.len(),
            planned = plan.len(),
            gold = balances.gold,
            "barrel plan"
        );
        Ok(plan)
    }

    /// Potions to bottle from the ml in stock.
    pub async fn bottle_plan(&self) -> ResultEngine<Vec<BottlePlanItem>> {
        let (balances, capacity, recipes) = with_tx!(self, |db_tx| {
            let balances = read_balances(&db_tx).await?;
            let capacity = self.capacity_in(&db_tx).await?;
            let recipes = all_recipes(&db_tx).await?;
            Ok::<_, EngineError>((balances, capacity, recipes))
        })?;

        let policy = &self.config.bottles;
        let candidates: Vec<Candidate> = recipes
            .iter()
            .map(|recipe| {
                let stock = balances.potions_of(recipe.id);
                Candidate::new(recipe.id.to_string(), policy.max_stock_per_recipe - stock)
                    .consumes(recipe.potion_type.0)
                    .potions(1)
                    .value(recipe.price)
                    .restock(stock, policy.restock_threshold)
            })
            .collect();

        let limits = Limits {
            gold: balances.gold,
            ml_available: balances.ml,
            ml_headroom: [0; 4],
            potion_headroom: capacity.max_potions - balances.total_potions(),
        };
        let plan = self.config.bottle_planner().plan(&candidates, &limits)?;

        let items: Vec<BottlePlanItem> = plan
            .into_iter()
            .filter_map(|item| {
                recipes
                    .iter()
                    .find(|r| r.id.to_string() == item.key)
                    .map(|recipe| BottlePlanItem {
                        recipe_id: recipe.id,
                        sku: recipe.sku.clone(),
                        potion_type: recipe.potion_type,
                        quantity: item.quantity,
                    })
            })
            .collect();
        tracing::info!(
            recipes = recipes.len(),
            planned = items.len(),
            ml = ?Color::ALL.map(|c| balances.ml(c)),
            "bottle plan"
        );
        Ok(items)
    }

    /// Capacity units to buy today.
    pub async fn capacity_plan(&self) -> ResultEngine<CapacityPlan> {
        let (balances, capacity) = with_tx!(self, |db_tx| {
            let balances = read_balances(&db_tx).await?;
            let capacity = self.capacity_in(&db_tx).await?;
            Ok::<_, EngineError>((balances, capacity))
        })?;
        let plan = planner::capacity::plan(&balances, &capacity, &self.config.capacity);
        tracing::info!(
            potion_capacity = plan.potion_capacity,
            ml_capacity = plan.ml_capacity,
            "capacity plan"
        );
        Ok(plan)
    }
}
