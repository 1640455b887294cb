use sea_orm::{Database, DatabaseConnection};

use engine::{
    Account, Barrel, CapacityOrder, Color, Customer, Engine, EngineError, OrderSearch, PlanItem,
    PotionDelivery, PotionType, Posting, Recipe, ShopConfig, SortColumn, SortOrder, Strategy,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    engine_with_config(ShopConfig::default()).await
}

async fn engine_with_config(config: ShopConfig) -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .config(config)
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn engine_with_file_db() -> (Engine, std::path::PathBuf) {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();

    let path = root.join(format!("shop_{}.db", Uuid::new_v4()));
    let url = format!("sqlite:{}?mode=rwc", path.display());

    let db = Database::connect(&url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();

    (engine, path)
}

fn green() -> PotionType {
    PotionType::pure(Color::Green)
}

async fn seed(engine: &Engine, account: Account, change: i64) {
    engine
        .apply(Posting::new("seed").entry(account, change, "seed"))
        .await
        .unwrap();
}

/// Green recipe priced `price` with `stock` units bottled.
async fn green_stock(engine: &Engine, price: i64, stock: i64) -> Uuid {
    let id = engine
        .new_recipe(Recipe::new("GREEN_POTION", "green potion", price, green()).unwrap())
        .await
        .unwrap();
    if stock > 0 {
        seed(engine, Account::ml(Color::Green), stock * 100).await;
        engine
            .deliver_bottles(1, &[PotionDelivery::new(green(), stock)])
            .await
            .unwrap();
    }
    id
}

#[tokio::test]
async fn barrel_plan_buys_at_most_what_gold_allows() {
    let (engine, _db) = engine_with_db().await;
    seed(&engine, Account::Gold, 100).await;

    let offer = Barrel::new("SMALL_GREEN_BARREL", green(), 500)
        .price(60)
        .quantity(2);
    let plan = engine.barrel_plan(&[offer.clone()]).await.unwrap();
    assert_eq!(
        plan,
        vec![PlanItem {
            key: "SMALL_GREEN_BARREL".to_string(),
            quantity: 1
        }]
    );

    let mut config = ShopConfig::default();
    config.barrels.strategy = Strategy::Optimize;
    let (optimizer, _db) = engine_with_config(config).await;
    seed(&optimizer, Account::Gold, 100).await;
    let plan = optimizer.barrel_plan(&[offer]).await.unwrap();
    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].quantity, 1);
}

#[tokio::test]
async fn barrel_plan_skips_well_stocked_channels() {
    let (engine, _db) = engine_with_db().await;
    green_stock(&engine, 25, 10).await;
    seed(&engine, Account::Gold, 1000).await;

    let offers = [
        Barrel::new("SMALL_GREEN_BARREL", green(), 500).price(100),
        Barrel::new("SMALL_RED_BARREL", PotionType::pure(Color::Red), 500).price(100),
    ];
    let plan = engine.barrel_plan(&offers).await.unwrap();
    assert_eq!(
        plan,
        vec![PlanItem {
            key: "SMALL_RED_BARREL".to_string(),
            quantity: 1
        }]
    );

    let err = engine
        .barrel_plan(&[Barrel::new("MIXED", PotionType::new(50, 50, 0, 0), 500)])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidMix(_)));
}

#[tokio::test]
async fn bottle_plan_uses_floor_of_available_ml() {
    let (engine, _db) = engine_with_db().await;
    let id = green_stock(&engine, 25, 0).await;
    seed(&engine, Account::ml(Color::Green), 250).await;

    let plan = engine.bottle_plan().await.unwrap();
    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].recipe_id, id);
    assert_eq!(plan[0].sku, "GREEN_POTION");
    assert_eq!(plan[0].quantity, 2);
}

#[tokio::test]
async fn bottle_plan_is_empty_without_ml_or_recipes() {
    let (engine, _db) = engine_with_db().await;
    assert!(engine.bottle_plan().await.unwrap().is_empty());

    green_stock(&engine, 25, 0).await;
    seed(&engine, Account::ml(Color::Green), 99).await;
    assert!(engine.bottle_plan().await.unwrap().is_empty());
}

#[tokio::test]
async fn capacity_plan_follows_utilization() {
    let (engine, _db) = engine_with_db().await;
    green_stock(&engine, 25, 30).await;
    seed(&engine, Account::Gold, 1200).await;

    let plan = engine.capacity_plan().await.unwrap();
    assert_eq!(plan.potion_capacity, 1);
    assert_eq!(plan.ml_capacity, 0);

    engine
        .deliver_capacity(1, CapacityOrder::new(plan.potion_capacity, plan.ml_capacity))
        .await
        .unwrap();
    let plan = engine.capacity_plan().await.unwrap();
    assert_eq!(plan.potion_capacity, 0);
}

#[tokio::test]
async fn checkout_requires_exact_payment() {
    let (engine, _db) = engine_with_db().await;
    let id = green_stock(&engine, 25, 5).await;

    let cart = engine
        .create_cart(Customer::new("Scaramouche", "Bard", 7))
        .await
        .unwrap();
    engine
        .set_item_quantity(cart, "GREEN_POTION", 3)
        .await
        .unwrap();

    let err = engine.checkout(cart, "74").await.unwrap_err();
    assert!(matches!(err, EngineError::PaymentMismatch(_)));
    assert_eq!(engine.current_balance(Account::Gold).await.unwrap(), 0);
    assert_eq!(
        engine.current_balance(Account::potion(id)).await.unwrap(),
        5
    );

    let receipt = engine.checkout(cart, "75").await.unwrap();
    assert_eq!(receipt.total_potions_bought, 3);
    assert_eq!(receipt.total_gold_paid, 75);
    assert_eq!(receipt.remaining, vec![("GREEN_POTION".to_string(), 2)]);
    assert_eq!(engine.current_balance(Account::Gold).await.unwrap(), 75);
    assert_eq!(
        engine.current_balance(Account::potion(id)).await.unwrap(),
        2
    );

    let paid = engine.cart(cart).await.unwrap();
    assert_eq!(paid.checkout_transaction_id, Some(receipt.transaction_id));
    let err = engine.checkout(cart, "75").await.unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
    let err = engine
        .set_item_quantity(cart, "GREEN_POTION", 1)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
}

#[tokio::test]
async fn cart_lines_can_be_changed_and_removed() {
    let (engine, _db) = engine_with_db().await;
    green_stock(&engine, 25, 5).await;
    let cart = engine
        .create_cart(Customer::new("Nahida", "Druid", 30))
        .await
        .unwrap();

    engine
        .set_item_quantity(cart, "GREEN_POTION", 4)
        .await
        .unwrap();
    engine
        .set_item_quantity(cart, "GREEN_POTION", 1)
        .await
        .unwrap();
    let lines = engine.cart_items(cart).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].1, 1);

    engine
        .set_item_quantity(cart, "GREEN_POTION", 0)
        .await
        .unwrap();
    assert!(engine.cart_items(cart).await.unwrap().is_empty());
    let err = engine.checkout(cart, "0").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidQuantity(_)));

    let err = engine
        .set_item_quantity(cart, "BLUE_POTION", 1)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    let err = engine
        .set_item_quantity(Uuid::new_v4(), "GREEN_POTION", 1)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn checkout_beyond_stock_fails() {
    let (engine, _db) = engine_with_db().await;
    green_stock(&engine, 25, 1).await;
    let cart = engine
        .create_cart(Customer::new("Klee", "Pyro", 5))
        .await
        .unwrap();
    engine
        .set_item_quantity(cart, "GREEN_POTION", 2)
        .await
        .unwrap();

    let err = engine.checkout(cart, "50").await.unwrap_err();
    assert!(matches!(err, EngineError::InsufficientStock(_)));
    assert_eq!(engine.current_balance(Account::Gold).await.unwrap(), 0);
}

#[tokio::test]
async fn checkout_rejects_overflowing_quantities() {
    let (engine, _db) = engine_with_db().await;
    for (sku, mix) in [
        ("FREE_RED", PotionType::pure(Color::Red)),
        ("FREE_BLUE", PotionType::pure(Color::Blue)),
    ] {
        engine
            .new_recipe(Recipe::new(sku, "", 0, mix).unwrap())
            .await
            .unwrap();
    }
    let cart = engine
        .create_cart(Customer::new("Paimon", "Guide", 1))
        .await
        .unwrap();
    for sku in ["FREE_RED", "FREE_BLUE"] {
        engine
            .set_item_quantity(cart, sku, i64::MAX / 2 + 1)
            .await
            .unwrap();
    }

    let err = engine.checkout(cart, "0").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidQuantity(_)));
    assert!(engine.cart(cart).await.unwrap().checkout_transaction_id.is_none());
}

/// Six paid lines across four customers plus one unpaid cart.
async fn shop_with_orders() -> Engine {
    let (engine, _db) = engine_with_db().await;
    let red = PotionType::pure(Color::Red);
    engine
        .new_recipe(Recipe::new("GREEN_POTION", "green potion", 25, green()).unwrap())
        .await
        .unwrap();
    engine
        .new_recipe(Recipe::new("RED_POTION", "red potion", 40, red).unwrap())
        .await
        .unwrap();
    seed(&engine, Account::ml(Color::Green), 800).await;
    seed(&engine, Account::ml(Color::Red), 600).await;
    engine
        .deliver_bottles(
            1,
            &[
                PotionDelivery::new(green(), 8),
                PotionDelivery::new(red, 6),
            ],
        )
        .await
        .unwrap();

    for (name, lines, paid) in [
        ("Scaramouche", vec![("GREEN_POTION", 2), ("RED_POTION", 1)], "90"),
        ("Nahida", vec![("GREEN_POTION", 1)], "25"),
        ("Navia", vec![("RED_POTION", 3)], "120"),
        ("Nilou", vec![("GREEN_POTION", 4), ("RED_POTION", 2)], "180"),
    ] {
        let cart = engine
            .create_cart(Customer::new(name, "Bard", 3))
            .await
            .unwrap();
        for (sku, quantity) in lines {
            engine.set_item_quantity(cart, sku, quantity).await.unwrap();
        }
        engine.checkout(cart, paid).await.unwrap();
    }
    let unpaid = engine
        .create_cart(Customer::new("Neuvillette", "Judge", 9))
        .await
        .unwrap();
    engine
        .set_item_quantity(unpaid, "GREEN_POTION", 1)
        .await
        .unwrap();
    engine
}

#[tokio::test]
async fn order_search_filters_ignore_case() {
    let engine = shop_with_orders().await;

    let page = engine
        .search_orders(&OrderSearch {
            customer_name: "nI".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    let mut names: Vec<&str> = page
        .results
        .iter()
        .map(|line| line.customer_name.as_str())
        .collect();
    names.sort();
    assert_eq!(names, vec!["Nilou", "Nilou"]);

    let page = engine
        .search_orders(&OrderSearch {
            customer_name: "a".to_string(),
            potion_sku: "red".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    let mut lines: Vec<(&str, i64)> = page
        .results
        .iter()
        .map(|line| (line.customer_name.as_str(), line.line_item_total))
        .collect();
    lines.sort();
    assert_eq!(lines, vec![("Navia", 120), ("Scaramouche", 40)]);
    assert!(page.results.iter().all(|line| line.item_sku == "RED_POTION"));

    let page = engine
        .search_orders(&OrderSearch {
            customer_name: "Neuvillette".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(page.results.is_empty());
    assert_eq!((page.previous.as_str(), page.next.as_str()), ("", ""));

    let page = engine
        .search_orders(&OrderSearch {
            potion_sku: "_".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.results.len(), 5);

    let page = engine
        .search_orders(&OrderSearch {
            potion_sku: "%".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(page.results.is_empty());
}

#[tokio::test]
async fn order_search_sorts_and_pages_by_five() {
    let engine = shop_with_orders().await;

    let first = engine
        .search_orders(&OrderSearch {
            sort_col: SortColumn::LineItemTotal,
            sort_order: SortOrder::Asc,
            ..Default::default()
        })
        .await
        .unwrap();
    let totals: Vec<i64> = first.results.iter().map(|l| l.line_item_total).collect();
    assert_eq!(totals, vec![25, 40, 50, 80, 100]);
    assert_eq!(first.previous, "");
    assert_eq!(first.next, "5");

    let second = engine
        .search_orders(&OrderSearch {
            sort_col: SortColumn::LineItemTotal,
            sort_order: SortOrder::Asc,
            search_page: first.next.clone(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(second.results.len(), 1);
    assert_eq!(second.results[0].line_item_total, 120);
    assert_eq!(second.results[0].item_sku, "RED_POTION");
    assert_eq!(second.previous, "0");
    assert_eq!(second.next, "");

    let newest = engine.search_orders(&OrderSearch::default()).await.unwrap();
    assert_eq!(newest.results.len(), 5);
    assert!(
        newest
            .results
            .windows(2)
            .all(|pair| pair[0].timestamp >= pair[1].timestamp)
    );
    assert!(newest.results.iter().all(|l| l.line_item_id.contains(':')));

    let by_name = engine
        .search_orders(&OrderSearch {
            sort_col: SortColumn::CustomerName,
            sort_order: SortOrder::Desc,
            ..Default::default()
        })
        .await
        .unwrap();
    let names: Vec<&str> = by_name
        .results
        .iter()
        .map(|l| l.customer_name.as_str())
        .collect();
    assert_eq!(names, vec!["Scaramouche", "Scaramouche", "Nilou", "Nilou", "Navia"]);

    let err = engine
        .search_orders(&OrderSearch {
            search_page: "next".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidQuantity(_)));
}

#[tokio::test]
async fn concurrent_checkouts_of_last_unit() {
    let (engine, path) = engine_with_file_db().await;
    let engine = std::sync::Arc::new(engine);
    let id = green_stock(&engine, 25, 1).await;

    let mut carts = Vec::new();
    for name in ["first", "second", "third"] {
        let cart = engine
            .create_cart(Customer::new(name, "Rogue", 1))
            .await
            .unwrap();
        engine
            .set_item_quantity(cart, "GREEN_POTION", 1)
            .await
            .unwrap();
        carts.push(cart);
    }

    let handles: Vec<_> = carts
        .into_iter()
        .map(|cart| {
            let engine = engine.clone();
            tokio::spawn(async move { engine.checkout(cart, "25").await })
        })
        .collect();
    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(err) => assert!(
                matches!(err, EngineError::InsufficientStock(_) | EngineError::Database(_)),
                "unexpected error: {err}"
            ),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(
        engine.current_balance(Account::potion(id)).await.unwrap(),
        0
    );
    assert_eq!(engine.current_balance(Account::Gold).await.unwrap(), 25);

    drop(engine);
    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn catalog_lists_only_stocked_recipes_by_sku() {
    let (engine, _db) = engine_with_db().await;
    green_stock(&engine, 25, 2).await;
    engine
        .new_recipe(
            Recipe::new("BLUE_POTION", "blue potion", 30, PotionType::pure(Color::Blue)).unwrap(),
        )
        .await
        .unwrap();
    engine
        .new_recipe(
            Recipe::new("AQUA_POTION", "", 40, PotionType::new(0, 50, 50, 0)).unwrap(),
        )
        .await
        .unwrap();
    seed(&engine, Account::ml(Color::Green), 50).await;
    seed(&engine, Account::ml(Color::Blue), 50).await;
    engine
        .deliver_bottles(
            9,
            &[PotionDelivery::new(PotionType::new(0, 50, 50, 0), 1)],
        )
        .await
        .unwrap();

    let catalog = engine.catalog().await.unwrap();
    let skus: Vec<&str> = catalog.iter().map(|s| s.recipe.sku.as_str()).collect();
    assert_eq!(skus, vec!["AQUA_POTION", "GREEN_POTION"]);
    assert_eq!(catalog[0].recipe.name, "aqua potion");
    assert_eq!(catalog[1].quantity, 2);
}

#[tokio::test]
async fn duplicate_recipes_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    green_stock(&engine, 25, 0).await;

    let err = engine
        .new_recipe(Recipe::new("GREEN_POTION", "", 10, PotionType::new(0, 0, 100, 0)).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    let err = engine
        .new_recipe(Recipe::new("GREEN_POTION_2", "", 10, green()).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::AmbiguousRecipe(_)));

    let err = Recipe::new("BAD", "", 10, PotionType::new(10, 10, 10, 10)).unwrap_err();
    assert!(matches!(err, EngineError::InvalidMix(_)));

    let recipe = engine.recipe_by_components(green()).await.unwrap();
    assert_eq!(recipe.sku, "GREEN_POTION");
    assert_eq!(engine.recipe_by_sku("GREEN_POTION").await.unwrap(), recipe);
    assert_eq!(engine.recipes().await.unwrap().len(), 1);
}

#[tokio::test]
async fn audit_reports_every_balance() {
    let (engine, _db) = engine_with_db().await;
    engine.open_shop().await.unwrap();
    green_stock(&engine, 25, 3).await;
    seed(&engine, Account::ml(Color::Red), 70).await;

    let audit = engine.audit().await.unwrap();
    assert_eq!(audit.gold, 100);
    assert_eq!(audit.ml, [70, 0, 0, 0]);
    assert_eq!(audit.total_ml, 70);
    assert_eq!(audit.total_potions, 3);
    assert_eq!(audit.potions.len(), 1);
    assert_eq!(audit.potions[0].quantity, 3);
    assert_eq!(audit.capacity.max_potions, 50);
}

#[tokio::test]
async fn reset_restores_opening_state_and_keeps_history() {
    let (engine, _db) = engine_with_db().await;
    engine.open_shop().await.unwrap();
    let id = green_stock(&engine, 25, 3).await;
    seed(&engine, Account::Gold, 2000).await;
    engine
        .deliver_capacity(1, CapacityOrder::new(1, 1))
        .await
        .unwrap();
    seed(&engine, Account::ml(Color::Dark), 15).await;

    let tx = engine.reset().await.unwrap().unwrap();
    let (reset, entries) = engine.transaction(tx).await.unwrap();
    assert_eq!(reset.description, "Shop reset");
    assert!(
        entries
            .iter()
            .any(|e| e.account == Account::potion(id) && e.change == -3)
    );

    let audit = engine.audit().await.unwrap();
    assert_eq!(audit.gold, 100);
    assert_eq!(audit.total_ml, 0);
    assert_eq!(audit.total_potions, 0);
    assert_eq!(audit.capacity.potion_units, 0);
    assert_eq!(audit.capacity.ml_units, 0);

    assert_eq!(engine.reset().await.unwrap(), None);
}
