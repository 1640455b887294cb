//! Cart endpoints.
//!
//! A customer opens a cart, sets line quantities by sku and checks out with a
//! payment string that must match the cart total. Paid lines can be searched
//! by customer and sku, five per page.

use api_types::cart::{
    CartCheckout, CartCreated, CartItem, CheckoutResult, Customer, LineItem, PotionRemaining,
    SearchQuery, SearchResult, SortColumn, SortOrder,
};
use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn to_engine(customer: Customer) -> engine::Customer {
    engine::Customer::new(
        customer.customer_name,
        customer.character_class,
        customer.level,
    )
}

pub async fn create_cart(
    State(state): State<ServerState>,
    Json(payload): Json<Customer>,
) -> Result<Json<CartCreated>, ServerError> {
    let cart_id = state.engine.create_cart(to_engine(payload)).await?;
    Ok(Json(CartCreated { cart_id }))
}

/// Customers who walked in; only logged.
pub async fn post_visits(
    Path(visit_id): Path<i64>,
    Json(customers): Json<Vec<Customer>>,
) -> Json<&'static str> {
    for customer in &customers {
        tracing::info!(
            visit_id,
            customer = %customer.customer_name,
            class = %customer.character_class,
            level = customer.level,
            "customer visit"
        );
    }
    Json("OK")
}

pub async fn set_item_quantity(
    State(state): State<ServerState>,
    Path((cart_id, item_sku)): Path<(Uuid, String)>,
    Json(payload): Json<CartItem>,
) -> Result<Json<&'static str>, ServerError> {
    state
        .engine
        .set_item_quantity(cart_id, &item_sku, payload.quantity)
        .await?;
    Ok(Json("OK"))
}

pub async fn checkout(
    State(state): State<ServerState>,
    Path(cart_id): Path<Uuid>,
    Json(payload): Json<CartCheckout>,
) -> Result<Json<CheckoutResult>, ServerError> {
    let receipt = state.engine.checkout(cart_id, &payload.payment).await?;
    Ok(Json(CheckoutResult {
        total_potions_bought: receipt.total_potions_bought,
        total_gold_paid: receipt.total_gold_paid,
        remaining: receipt
            .remaining
            .into_iter()
            .map(|(sku, quantity)| PotionRemaining { sku, quantity })
            .collect(),
    }))
}

fn to_search(query: SearchQuery) -> engine::OrderSearch {
    engine::OrderSearch {
        customer_name: query.customer_name,
        potion_sku: query.potion_sku,
        search_page: query.search_page,
        sort_col: match query.sort_col {
            SortColumn::CustomerName => engine::SortColumn::CustomerName,
            SortColumn::ItemSku => engine::SortColumn::ItemSku,
            SortColumn::LineItemTotal => engine::SortColumn::LineItemTotal,
            SortColumn::Timestamp => engine::SortColumn::Timestamp,
        },
        sort_order: match query.sort_order {
            SortOrder::Asc => engine::SortOrder::Asc,
            SortOrder::Desc => engine::SortOrder::Desc,
        },
    }
}

pub async fn search_orders(
    State(state): State<ServerState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<SearchResult>, ServerError> {
    let Query(query) = query?;
    let page = state.engine.search_orders(&to_search(query)).await?;
    Ok(Json(SearchResult {
        previous: page.previous,
        next: page.next,
        results: page
            .results
            .into_iter()
            .map(|line| LineItem {
                line_item_id: line.line_item_id,
                item_sku: line.item_sku,
                customer_name: line.customer_name,
                line_item_total: line.line_item_total,
                timestamp: line.timestamp,
            })
            .collect(),
    }))
}
