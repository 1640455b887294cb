use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, JoinType, Order, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait,
    prelude::*,
    sea_query::{Expr, Func, LikeExpr, SimpleExpr},
};
use uuid::Uuid;

use crate::{
    Account, Cart, CheckoutReceipt, Customer, EngineError, OrderLine, OrderPage, OrderSearch,
    Posting, Recipe, ResultEngine, SortColumn, SortOrder, cart_items, carts,
    entries::LockDomain,
    recipes, transactions,
    util::{checked_add, checked_mul, ensure_non_negative, parse_payment},
};

use super::{
    Engine,
    ledger::{balance_of, lock, post},
    with_tx,
};

/// Most lines a search returns at once.
const SEARCH_PAGE_SIZE: u64 = 5;

/// Load a cart that can still change; paid carts are frozen.
async fn open_cart<C: ConnectionTrait>(db: &C, cart_id: Uuid) -> ResultEngine<carts::Model> {
    let model = carts::Entity::find_by_id(cart_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("cart {cart_id}")))?;
    if model.checkout_transaction_id.is_some() {
        return Err(EngineError::ExistingKey(format!(
            "cart {cart_id} is already checked out"
        )));
    }
    Ok(model)
}

impl Engine {
    pub async fn create_cart(&self, customer: Customer) -> ResultEngine<Uuid> {
        if customer.customer_name.trim().is_empty() {
            return Err(EngineError::InvalidQuantity(
                "customer name must not be empty".to_string(),
            ));
        }
        let cart = Cart {
            id: Uuid::new_v4(),
            customer,
            created_at: Utc::now(),
            checkout_transaction_id: None,
        };
        carts::ActiveModel::from(&cart).insert(&self.database).await?;
        tracing::debug!(cart = %cart.id, customer = %cart.customer.customer_name, "cart created");
        Ok(cart.id)
    }

    pub async fn cart(&self, cart_id: Uuid) -> ResultEngine<Cart> {
        let model = carts::Entity::find_by_id(cart_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("cart {cart_id}")))?;
        Cart::try_from(model)
    }

    /// Lines of a cart with their recipe, ordered by sku.
    pub async fn cart_items(&self, cart_id: Uuid) -> ResultEngine<Vec<(Recipe, i64)>> {
        cart_lines(&self.database, cart_id).await
    }

    /// Set how many units of `sku` the cart holds; zero removes the line.
    pub async fn set_item_quantity(
        &self,
        cart_id: Uuid,
        sku: &str,
        quantity: i64,
    ) -> ResultEngine<()> {
        ensure_non_negative(quantity, "item quantity")?;
        with_tx!(self, |db_tx| {
            open_cart(&db_tx, cart_id).await?;
            let recipe = recipes::Entity::find()
                .filter(recipes::Column::Sku.eq(sku))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("recipe {sku}")))?;

            let key = (cart_id.to_string(), recipe.id.clone());
            let existing = cart_items::Entity::find_by_id(key.clone()).one(&db_tx).await?;
            match (existing, quantity) {
                (None, 0) => {}
                (Some(_), 0) => {
                    cart_items::Entity::delete_by_id(key).exec(&db_tx).await?;
                }
                (None, _) => {
                    cart_items::ActiveModel {
                        cart_id: ActiveValue::Set(key.0),
                        recipe_id: ActiveValue::Set(key.1),
                        quantity: ActiveValue::Set(quantity),
                    }
                    .insert(&db_tx)
                    .await?;
                }
                (Some(item), _) => {
                    let mut item: cart_items::ActiveModel = item.into();
                    item.quantity = ActiveValue::Set(quantity);
                    item.update(&db_tx).await?;
                }
            }
            tracing::debug!(cart = %cart_id, sku, quantity, "cart line set");
            Ok(())
        })
    }

    /// Paid cart lines filtered by customer name and sku, sorted and paged.
    pub async fn search_orders(&self, search: &OrderSearch) -> ResultEngine<OrderPage> {
        let offset = parse_page(&search.search_page)?;
        let line_total = Expr::col((cart_items::Entity, cart_items::Column::Quantity))
            .mul(Expr::col((recipes::Entity, recipes::Column::Price)));

        let mut query = cart_items::Entity::find()
            .select_only()
            .column(cart_items::Column::CartId)
            .column(cart_items::Column::RecipeId)
            .column_as(recipes::Column::Sku, "item_sku")
            .column_as(carts::Column::CustomerName, "customer_name")
            .column_as(line_total.clone(), "line_item_total")
            .column_as(transactions::Column::CreatedAt, "timestamp")
            .join(JoinType::InnerJoin, cart_items::Relation::Carts.def())
            .join(JoinType::InnerJoin, cart_items::Relation::Recipes.def())
            .join(JoinType::InnerJoin, carts::Relation::CheckoutTransaction.def());
        if !search.customer_name.trim().is_empty() {
            query = query.filter(contains_ignoring_case(
                Expr::col((carts::Entity, carts::Column::CustomerName)).into(),
                &search.customer_name,
            ));
        }
        if !search.potion_sku.trim().is_empty() {
            query = query.filter(contains_ignoring_case(
                Expr::col((recipes::Entity, recipes::Column::Sku)).into(),
                &search.potion_sku,
            ));
        }

        let key: SimpleExpr = match search.sort_col {
            SortColumn::CustomerName => Expr::col((carts::Entity, carts::Column::CustomerName)).into(),
            SortColumn::ItemSku => Expr::col((recipes::Entity, recipes::Column::Sku)).into(),
            SortColumn::LineItemTotal => line_total,
            SortColumn::Timestamp => {
                Expr::col((transactions::Entity, transactions::Column::CreatedAt)).into()
            }
        };
        let order = match search.sort_order {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        };

        // One extra row tells whether a next page exists.
        let mut rows: Vec<(String, String, String, String, i64, DateTimeUtc)> = query
            .order_by(key, order)
            .order_by_asc(cart_items::Column::CartId)
            .order_by_asc(cart_items::Column::RecipeId)
            .offset(offset)
            .limit(SEARCH_PAGE_SIZE + 1)
            .into_tuple()
            .all(&self.database)
            .await?;
        let has_next = rows.len() as u64 > SEARCH_PAGE_SIZE;
        rows.truncate(SEARCH_PAGE_SIZE as usize);

        let page = OrderPage {
            previous: if offset > 0 {
                offset.saturating_sub(SEARCH_PAGE_SIZE).to_string()
            } else {
                String::new()
            },
            next: if has_next {
                (offset + SEARCH_PAGE_SIZE).to_string()
            } else {
                String::new()
            },
            results: rows
                .into_iter()
                .map(
                    |(cart_id, recipe_id, item_sku, customer_name, line_item_total, timestamp)| {
                        OrderLine {
                            line_item_id: format!("{cart_id}:{recipe_id}"),
                            item_sku,
                            customer_name,
                            line_item_total,
                            timestamp,
                        }
                    },
                )
                .collect(),
        };
        tracing::debug!(offset, results = page.results.len(), "order search");
        Ok(page)
    }

    /// Pay for a cart: gold in, potions out, in one transaction.
    ///
    /// `payment` must equal the cart total exactly. Stock is checked under the
    /// potion lock, so two carts racing for the last unit cannot both win.
    pub async fn checkout(&self, cart_id: Uuid, payment: &str) -> ResultEngine<CheckoutReceipt> {
        let paid = parse_payment(payment)?;
        with_tx!(self, |db_tx| {
            lock(&db_tx, &[LockDomain::Gold, LockDomain::Potions]).await?;
            let cart = open_cart(&db_tx, cart_id).await?;
            let lines = cart_lines(&db_tx, cart_id).await?;
            if lines.is_empty() {
                return Err(EngineError::InvalidQuantity(format!("cart {cart_id} is empty")));
            }

            let mut total = 0_i64;
            let mut bought = 0_i64;
            for (recipe, quantity) in &lines {
                let line = checked_mul(recipe.price, *quantity, "cart total")?;
                total = checked_add(total, line, "cart total")?;
                bought = checked_add(bought, *quantity, "potions bought")?;
            }
            if paid != total {
                tracing::warn!(cart = %cart_id, total, paid, "checkout payment mismatch");
                return Err(EngineError::PaymentMismatch(format!(
                    "cart total is {total}, payment was {paid}"
                )));
            }

            let mut remaining = Vec::with_capacity(lines.len());
            for (recipe, quantity) in &lines {
                let stock = balance_of(&db_tx, Account::potion(recipe.id)).await?;
                if stock < *quantity {
                    tracing::warn!(cart = %cart_id, sku = %recipe.sku, stock, quantity, "checkout out of stock");
                    return Err(EngineError::InsufficientStock(format!(
                        "{}: {quantity} requested, {stock} in stock",
                        recipe.sku
                    )));
                }
                remaining.push((recipe.sku.clone(), stock - quantity));
            }

            let mut posting = Posting::new(format!(
                "Checkout cart {cart_id} ({})",
                cart.customer_name
            ));
            if total > 0 {
                posting.push(Account::Gold, total, format!("{bought} potions sold"));
            }
            for (recipe, quantity) in &lines {
                posting.push(
                    Account::potion(recipe.id),
                    -quantity,
                    format!("{} x{quantity}", recipe.sku),
                );
            }
            let tx = post(&db_tx, &posting).await?;

            let mut cart: carts::ActiveModel = cart.into();
            cart.checkout_transaction_id = ActiveValue::Set(Some(tx.id.to_string()));
            cart.update(&db_tx).await?;

            tracing::info!(cart = %cart_id, potions = bought, gold = total, tx = %tx.id, "checkout");
            Ok(CheckoutReceipt {
                transaction_id: tx.id,
                total_potions_bought: bought,
                total_gold_paid: total,
                remaining,
            })
        })
    }
}

/// Page tokens are offsets into the sorted result.
fn parse_page(token: &str) -> ResultEngine<u64> {
    let token = token.trim();
    if token.is_empty() {
        return Ok(0);
    }
    token
        .parse()
        .map_err(|_| EngineError::InvalidQuantity(format!("invalid search page \"{token}\"")))
}

/// Case-insensitive substring match, with `%` and `_` taken literally.
fn contains_ignoring_case(column: SimpleExpr, needle: &str) -> SimpleExpr {
    let needle = needle
        .trim()
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Expr::expr(Func::lower(column)).like(LikeExpr::new(format!("%{needle}%")).escape('\\'))
}

async fn cart_lines<C: ConnectionTrait>(db: &C, cart_id: Uuid) -> ResultEngine<Vec<(Recipe, i64)>> {
    let rows = cart_items::Entity::find()
        .filter(cart_items::Column::CartId.eq(cart_id.to_string()))
        .find_also_related(recipes::Entity)
        .order_by_asc(recipes::Column::Sku)
        .all(db)
        .await?;
    rows.into_iter()
        .map(|(item, recipe)| {
            let recipe = recipe.ok_or_else(|| {
                EngineError::Integrity(format!("cart line without recipe {}", item.recipe_id))
            })?;
            Ok((Recipe::try_from(recipe)?, item.quantity))
        })
        .collect()
}
