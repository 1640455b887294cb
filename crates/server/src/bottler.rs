use api_types::bottler::PotionInventory;
use axum::{
    Json,
    extract::{Path, State},
};

use crate::{ServerError, server::ServerState};

pub async fn deliver(
    State(state): State<ServerState>,
    Path(order_id): Path<i64>,
    Json(payload): Json<Vec<PotionInventory>>,
) -> Result<Json<&'static str>, ServerError> {
    let deliveries: Vec<engine::PotionDelivery> = payload
        .iter()
        .map(|p| engine::PotionDelivery::new(engine::PotionType(p.potion_type), p.quantity))
        .collect();
    state.engine.deliver_bottles(order_id, &deliveries).await?;
    Ok(Json("OK"))
}

pub async fn plan(
    State(state): State<ServerState>,
) -> Result<Json<Vec<PotionInventory>>, ServerError> {
    let plan = state.engine.bottle_plan().await?;
    Ok(Json(
        plan.into_iter()
            .map(|item| PotionInventory {
                potion_type: item.potion_type.0,
                quantity: item.quantity,
            })
            .collect(),
    ))
}
