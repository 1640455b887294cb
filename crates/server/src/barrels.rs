//! Barrel endpoints: wholesale deliveries and the daily barrel plan.

use api_types::barrel::{Barrel, BarrelOrder};
use axum::{
    Json,
    extract::{Path, State},
};

use crate::{ServerError, server::ServerState};

fn to_engine(barrel: &Barrel) -> engine::Barrel {
    engine::Barrel::new(
        barrel.sku.as_str(),
        engine::PotionType(barrel.potion_type),
        barrel.ml_per_barrel,
    )
    .price(barrel.price)
    .quantity(barrel.quantity)
}

pub async fn deliver(
    State(state): State<ServerState>,
    Path(order_id): Path<i64>,
    Json(payload): Json<Vec<Barrel>>,
) -> Result<Json<&'static str>, ServerError> {
    let barrels: Vec<engine::Barrel> = payload.iter().map(to_engine).collect();
    state.engine.deliver_barrels(order_id, &barrels).await?;
    Ok(Json("OK"))
}

/// Pick barrels from the wholesale catalog sent in the body.
pub async fn plan(
    State(state): State<ServerState>,
    Json(payload): Json<Vec<Barrel>>,
) -> Result<Json<Vec<BarrelOrder>>, ServerError> {
    let catalog: Vec<engine::Barrel> = payload.iter().map(to_engine).collect();
    let plan = state.engine.barrel_plan(&catalog).await?;
    Ok(Json(
        plan.into_iter()
            .map(|item| BarrelOrder {
                sku: item.key,
                quantity: item.quantity,
            })
            .collect(),
    ))
}
