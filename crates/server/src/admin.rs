use api_types::admin::ResetResult;
use axum::{Json, extract::State};

use crate::{ServerError, server::ServerState};

pub async fn reset(State(state): State<ServerState>) -> Result<Json<ResetResult>, ServerError> {
    let transaction_id = state.engine.reset().await?;
    Ok(Json(ResetResult { transaction_id }))
}
