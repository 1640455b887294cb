use axum::{
    Json, extract::rejection::QueryRejection, http::StatusCode, response::IntoResponse,
};
use engine::{EngineError, ErrorKind};

use serde::Serialize;
pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};

mod admin;
mod barrels;
mod bottler;
mod carts;
mod catalog;
mod inventory;
mod server;

pub mod types {
    pub mod barrel {
        pub use api_types::barrel::{Barrel, BarrelOrder};
    }

    pub mod bottler {
        pub use api_types::bottler::PotionInventory;
    }

    pub mod inventory {
        pub use api_types::inventory::{
            Audit, CapacityPurchase, CapacityView, MlInventory, PotionStock,
        };
    }

    pub mod cart {
        pub use api_types::cart::{
            CartCheckout, CartCreated, CartItem, CheckoutResult, Customer, LineItem,
            PotionRemaining, SearchQuery, SearchResult, SortColumn, SortOrder,
        };
    }

    pub mod catalog {
        pub use api_types::catalog::CatalogItem;
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
    kind: &'static str,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err.kind() {
        ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Capacity | ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Integrity | ErrorKind::Storage => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::Integrity(msg) => {
            tracing::error!("integrity error: {msg}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, kind, error) = match self {
            ServerError::Engine(err) => (
                status_for_engine_error(&err),
                err.kind().as_str(),
                message_for_engine_error(err),
            ),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, "bad_request", err),
        };

        (status, Json(Error { error, kind })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<QueryRejection> for ServerError {
    fn from(value: QueryRejection) -> Self {
        Self::Generic(value.body_text())
    }
}
