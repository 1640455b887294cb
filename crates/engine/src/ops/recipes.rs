use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, PotionType, Recipe, ResultEngine, Stocked, entries::LockDomain, recipes,
};

use super::{
    Engine,
    ledger::{lock, read_balances},
    with_tx,
};

/// Recipes whose component vector equals `potion_type`.
async fn recipes_with_components<C: ConnectionTrait>(
    db: &C,
    potion_type: &PotionType,
) -> ResultEngine<Vec<recipes::Model>> {
    let [red, green, blue, dark] = potion_type.0;
    Ok(recipes::Entity::find()
        .filter(recipes::Column::Red.eq(red))
        .filter(recipes::Column::Green.eq(green))
        .filter(recipes::Column::Blue.eq(blue))
        .filter(recipes::Column::Dark.eq(dark))
        .order_by_asc(recipes::Column::Sku)
        .all(db)
        .await?)
}

/// Resolve produced bottles to their recipe.
///
/// The component vector is the lookup key; more than one match is refused
/// rather than guessed.
pub(super) async fn recipe_by_type<C: ConnectionTrait>(
    db: &C,
    potion_type: &PotionType,
) -> ResultEngine<Recipe> {
    potion_type.ensure_recipe()?;
    let mut models = recipes_with_components(db, potion_type).await?;
    match models.len() {
        0 => Err(EngineError::InvalidMix(format!(
            "no recipe for components {potion_type}"
        ))),
        1 => Recipe::try_from(models.remove(0)),
        _ => {
            let skus: Vec<String> = models.into_iter().map(|m| m.sku).collect();
            Err(EngineError::AmbiguousRecipe(format!(
                "components {potion_type} match {}",
                skus.join(", ")
            )))
        }
    }
}

pub(super) async fn all_recipes<C: ConnectionTrait>(db: &C) -> ResultEngine<Vec<Recipe>> {
    recipes::Entity::find()
        .order_by_asc(recipes::Column::Sku)
        .all(db)
        .await?
        .into_iter()
        .map(Recipe::try_from)
        .collect()
}

pub(super) async fn stocked<C: ConnectionTrait>(db: &C) -> ResultEngine<Vec<Stocked>> {
    let balances = read_balances(db).await?;
    Ok(all_recipes(db)
        .await?
        .into_iter()
        .map(|recipe| Stocked {
            quantity: balances.potions_of(recipe.id),
            recipe,
        })
        .collect())
}

impl Engine {
    /// Add a recipe to the catalog.
    ///
    /// Skus are unique and so are component vectors, since bottled potions are
    /// matched back to their recipe by vector.
    pub async fn new_recipe(&self, recipe: Recipe) -> ResultEngine<Uuid> {
        // Fields are public, so validate again.
        let recipe = Recipe {
            id: recipe.id,
            ..Recipe::new(&recipe.sku, &recipe.name, recipe.price, recipe.potion_type)?
        };
        with_tx!(self, |db_tx| {
            lock(&db_tx, &[LockDomain::Potions]).await?;
            let existing = recipes::Entity::find()
                .filter(recipes::Column::Sku.eq(recipe.sku.as_str()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::ExistingKey(recipe.sku));
            }
            let same_mix = recipes_with_components(&db_tx, &recipe.potion_type).await?;
            if let Some(other) = same_mix.first() {
                return Err(EngineError::AmbiguousRecipe(format!(
                    "components {} already used by {}",
                    recipe.potion_type, other.sku
                )));
            }
            recipes::ActiveModel::from(&recipe).insert(&db_tx).await?;
            tracing::info!(sku = %recipe.sku, price = recipe.price, components = %recipe.potion_type, "recipe created");
            Ok(recipe.id)
        })
    }

    /// Every recipe, ordered by sku.
    pub async fn recipes(&self) -> ResultEngine<Vec<Recipe>> {
        all_recipes(&self.database).await
    }

    pub async fn recipe_by_sku(&self, sku: &str) -> ResultEngine<Recipe> {
        let model = recipes::Entity::find()
            .filter(recipes::Column::Sku.eq(sku))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("recipe {sku}")))?;
        Recipe::try_from(model)
    }

    pub async fn recipe_by_components(&self, potion_type: PotionType) -> ResultEngine<Recipe> {
        recipe_by_type(&self.database, &potion_type).await
    }

    /// Recipes with at least one unit in stock.
    pub async fn catalog(&self) -> ResultEngine<Vec<Stocked>> {
        let stock = with_tx!(self, |db_tx| stocked(&db_tx).await)?;
        Ok(stock.into_iter().filter(|s| s.quantity > 0).collect())
    }
}
