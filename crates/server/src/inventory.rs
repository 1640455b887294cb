//! Inventory endpoints: capacity purchases and the audit.

use api_types::inventory::{Audit, CapacityPurchase, CapacityView, MlInventory, PotionStock};
use axum::{
    Json,
    extract::{Path, State},
};
use engine::Color;

use crate::{ServerError, server::ServerState};

pub async fn deliver(
    State(state): State<ServerState>,
    Path(order_id): Path<i64>,
    Json(payload): Json<CapacityPurchase>,
) -> Result<Json<&'static str>, ServerError> {
    let order = engine::CapacityOrder::new(payload.potion_capacity, payload.ml_capacity);
    state.engine.deliver_capacity(order_id, order).await?;
    Ok(Json("OK"))
}

pub async fn plan(State(state): State<ServerState>) -> Result<Json<CapacityPurchase>, ServerError> {
    let plan = state.engine.capacity_plan().await?;
    Ok(Json(CapacityPurchase {
        potion_capacity: plan.potion_capacity,
        ml_capacity: plan.ml_capacity,
    }))
}

pub async fn audit(State(state): State<ServerState>) -> Result<Json<Audit>, ServerError> {
    let audit = state.engine.audit().await?;
    let ml = |color: Color| audit.ml[color.index()];
    Ok(Json(Audit {
        gold: audit.gold,
        ml_in_barrels: audit.total_ml,
        ml_inventory: MlInventory {
            red_ml: ml(Color::Red),
            green_ml: ml(Color::Green),
            blue_ml: ml(Color::Blue),
            dark_ml: ml(Color::Dark),
        },
        number_of_potions: audit.total_potions,
        potions: audit
            .potions
            .iter()
            .map(|stocked| PotionStock {
                sku: stocked.recipe.sku.clone(),
                name: stocked.recipe.name.clone(),
                potion_type: stocked.recipe.potion_type.0,
                inventory: stocked.quantity,
            })
            .collect(),
        capacity: CapacityView {
            potion_units: audit.capacity.potion_units,
            ml_units: audit.capacity.ml_units,
            max_potions: audit.capacity.max_potions,
            max_ml_per_channel: audit.capacity.max_ml_per_channel,
        },
    }))
}
