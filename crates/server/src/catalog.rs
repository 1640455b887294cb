use api_types::catalog::CatalogItem;
use axum::{Json, extract::State};

use crate::{ServerError, server::ServerState};

/// Recipes in stock, as offered to customers.
pub async fn get(State(state): State<ServerState>) -> Result<Json<Vec<CatalogItem>>, ServerError> {
    let catalog = state.engine.catalog().await?;
    Ok(Json(
        catalog
            .into_iter()
            .map(|stocked| CatalogItem {
                sku: stocked.recipe.sku,
                name: stocked.recipe.name,
                quantity: stocked.quantity,
                price: stocked.recipe.price,
                potion_type: stocked.recipe.potion_type.0,
            })
            .collect(),
    ))
}
