use sea_orm::{Database, DatabaseConnection};

use engine::{
    Account, Barrel, CapacityOrder, Color, Engine, EngineError, PotionDelivery, PotionType,
    Posting, Recipe, ShopConfig,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn green() -> PotionType {
    PotionType::pure(Color::Green)
}

fn small_green_barrel() -> Barrel {
    Barrel::new("SMALL_GREEN_BARREL", green(), 500).price(100)
}

#[tokio::test]
async fn empty_ledger_has_zero_balances() {
    let (engine, _db) = engine_with_db().await;

    assert_eq!(engine.current_balance(Account::Gold).await.unwrap(), 0);
    assert_eq!(
        engine
            .current_balance(Account::ml(Color::Dark))
            .await
            .unwrap(),
        0
    );
    let balances = engine.balances().await.unwrap();
    assert_eq!(balances.gold, 0);
    assert_eq!(balances.ml, [0; 4]);
    assert!(balances.potions.is_empty());
}

#[tokio::test]
async fn open_shop_credits_starting_gold_once() {
    let (engine, _db) = engine_with_db().await;

    let first = engine.open_shop().await.unwrap();
    assert!(first.is_some());
    assert_eq!(engine.open_shop().await.unwrap(), None);
    assert_eq!(engine.current_balance(Account::Gold).await.unwrap(), 100);
}

#[tokio::test]
async fn apply_writes_one_transaction_with_its_entries() {
    let (engine, _db) = engine_with_db().await;

    let tx_id = engine
        .apply(
            Posting::new("Opening balance")
                .entry(Account::Gold, 250, "seed")
                .entry(Account::ml(Color::Red), 40, "seed"),
        )
        .await
        .unwrap();

    let (tx, entries) = engine.transaction(tx_id).await.unwrap();
    assert_eq!(tx.description, "Opening balance");
    assert_eq!(entries.len(), 2);
    assert!(
        entries
            .iter()
            .any(|e| e.account == Account::Gold && e.change == 250)
    );
    assert_eq!(
        engine
            .current_balance(Account::ml(Color::Red))
            .await
            .unwrap(),
        40
    );
}

#[tokio::test]
async fn apply_rejects_postings_that_go_negative() {
    let (engine, _db) = engine_with_db().await;
    engine
        .apply(Posting::new("seed").entry(Account::Gold, 10, "seed"))
        .await
        .unwrap();

    let err = engine
        .apply(
            Posting::new("overdraw")
                .entry(Account::Gold, -11, "too much")
                .entry(Account::ml(Color::Blue), 5, "partial"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Integrity(_)));

    // Nothing from the rejected posting survives.
    assert_eq!(engine.current_balance(Account::Gold).await.unwrap(), 10);
    assert_eq!(
        engine
            .current_balance(Account::ml(Color::Blue))
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn apply_rejects_empty_and_zero_postings() {
    let (engine, _db) = engine_with_db().await;

    let err = engine.apply(Posting::new("nothing")).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidQuantity(_)));

    let err = engine
        .apply(Posting::new("zero").entry(Account::Gold, 0, "zero"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidQuantity(_)));

    let err = engine
        .apply(Posting::new("ghost").entry(Account::potion(Uuid::new_v4()), 1, "ghost"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn barrel_delivery_moves_gold_into_ml() {
    let (engine, _db) = engine_with_db().await;
    engine.open_shop().await.unwrap();

    let tx = engine
        .deliver_barrels(7, &[small_green_barrel()])
        .await
        .unwrap();
    assert!(tx.is_some());

    let balances = engine.balances().await.unwrap();
    assert_eq!(balances.gold, 0);
    assert_eq!(balances.ml(Color::Green), 500);

    let (tx, _) = engine.transaction(tx.unwrap()).await.unwrap();
    assert_eq!(tx.description, "Barrel delivery order 7");
}

#[tokio::test]
async fn replaying_a_delivery_doubles_its_effect() {
    let (engine, _db) = engine_with_db().await;
    engine
        .apply(Posting::new("seed").entry(Account::Gold, 1000, "seed"))
        .await
        .unwrap();

    engine
        .deliver_barrels(1, &[small_green_barrel()])
        .await
        .unwrap();
    engine
        .deliver_barrels(1, &[small_green_barrel()])
        .await
        .unwrap();

    let balances = engine.balances().await.unwrap();
    assert_eq!(balances.gold, 800);
    assert_eq!(balances.ml(Color::Green), 1000);
}

#[tokio::test]
async fn barrel_delivery_without_gold_changes_nothing() {
    let (engine, _db) = engine_with_db().await;
    engine
        .apply(Posting::new("seed").entry(Account::Gold, 99, "seed"))
        .await
        .unwrap();

    let err = engine
        .deliver_barrels(3, &[small_green_barrel()])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientGold(_)));

    let balances = engine.balances().await.unwrap();
    assert_eq!(balances.gold, 99);
    assert_eq!(balances.ml(Color::Green), 0);
}

#[tokio::test]
async fn mixed_barrels_are_invalid() {
    let (engine, _db) = engine_with_db().await;
    engine.open_shop().await.unwrap();

    let mixed = Barrel::new("MIXED_BARREL", PotionType::new(50, 50, 0, 0), 500).price(10);
    let err = engine.deliver_barrels(1, &[mixed]).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidMix(_)));
}

#[tokio::test]
async fn empty_deliveries_are_noops() {
    let (engine, _db) = engine_with_db().await;

    assert_eq!(engine.deliver_barrels(1, &[]).await.unwrap(), None);
    assert_eq!(
        engine
            .deliver_barrels(1, &[small_green_barrel().quantity(0)])
            .await
            .unwrap(),
        None
    );
    assert_eq!(engine.deliver_bottles(2, &[]).await.unwrap(), None);
    assert_eq!(
        engine
            .deliver_capacity(3, CapacityOrder::default())
            .await
            .unwrap(),
        None
    );
}

#[tokio::test]
async fn bottling_consumes_ml_by_recipe_components() {
    let (engine, _db) = engine_with_db().await;
    let mix = PotionType::new(50, 0, 50, 0);
    let recipe_id = engine
        .new_recipe(Recipe::new("PURPLE_POTION", "", 40, mix).unwrap())
        .await
        .unwrap();
    engine
        .apply(
            Posting::new("seed")
                .entry(Account::ml(Color::Red), 120, "seed")
                .entry(Account::ml(Color::Blue), 300, "seed"),
        )
        .await
        .unwrap();

    engine
        .deliver_bottles(4, &[PotionDelivery::new(mix, 2)])
        .await
        .unwrap();

    let balances = engine.balances().await.unwrap();
    assert_eq!(balances.ml(Color::Red), 20);
    assert_eq!(balances.ml(Color::Blue), 200);
    assert_eq!(balances.potions_of(recipe_id), 2);

    let err = engine
        .deliver_bottles(5, &[PotionDelivery::new(mix, 1)])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientMl(_)));
}

#[tokio::test]
async fn bottling_unknown_or_malformed_mix_is_invalid() {
    let (engine, _db) = engine_with_db().await;
    engine
        .apply(Posting::new("seed").entry(Account::ml(Color::Green), 500, "seed"))
        .await
        .unwrap();

    let err = engine
        .deliver_bottles(1, &[PotionDelivery::new(green(), 1)])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidMix(_)));

    let err = engine
        .deliver_bottles(1, &[PotionDelivery::new(PotionType::new(0, 90, 0, 0), 1)])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidMix(_)));

    let err = engine
        .deliver_bottles(1, &[PotionDelivery::new(green(), -1)])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidQuantity(_)));
}

#[tokio::test]
async fn capacity_purchase_is_all_or_nothing() {
    let (engine, _db) = engine_with_db().await;
    engine
        .apply(Posting::new("seed").entry(Account::Gold, 1500, "seed"))
        .await
        .unwrap();

    let err = engine
        .deliver_capacity(1, CapacityOrder::new(1, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientGold(_)));
    assert_eq!(engine.current_balance(Account::Gold).await.unwrap(), 1500);

    engine
        .deliver_capacity(2, CapacityOrder::new(1, 0))
        .await
        .unwrap();
    assert_eq!(engine.current_balance(Account::Gold).await.unwrap(), 500);

    let capacity = engine.capacity().await.unwrap();
    assert_eq!(capacity.potion_units, 1);
    assert_eq!(capacity.max_potions, 100);
    assert_eq!(capacity.max_ml_per_channel, 10_000);
}

#[tokio::test]
async fn deliveries_respect_capacity() {
    let (engine, _db) = engine_with_db().await;
    engine
        .apply(Posting::new("seed").entry(Account::Gold, 10_000, "seed"))
        .await
        .unwrap();

    let large = Barrel::new("LARGE_GREEN_BARREL", green(), 10_000).price(400);
    engine.deliver_barrels(1, &[large.clone()]).await.unwrap();
    let err = engine
        .deliver_barrels(2, &[small_green_barrel()])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::CapacityExceeded(_)));
    assert_eq!(err.kind(), engine::ErrorKind::Capacity);

    engine
        .new_recipe(Recipe::new("GREEN_POTION", "", 25, green()).unwrap())
        .await
        .unwrap();
    let err = engine
        .deliver_bottles(3, &[PotionDelivery::new(green(), 51)])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::CapacityExceeded(_)));

    engine
        .deliver_bottles(3, &[PotionDelivery::new(green(), 50)])
        .await
        .unwrap();
}

#[tokio::test]
async fn builder_rejects_zero_capacity_cost() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let mut config = ShopConfig::default();
    config.capacity.unit_cost = 0;
    let err = Engine::builder()
        .database(db)
        .config(config)
        .build()
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidQuantity(_)));
}

#[tokio::test]
async fn oversized_deliveries_are_invalid_quantities() {
    let (engine, _db) = engine_with_db().await;
    engine.open_shop().await.unwrap();

    let big = Barrel::new("HUGE_GREEN_BARREL", green(), i64::MAX / 2 + 1);
    let err = engine
        .deliver_barrels(1, &[big.clone(), big])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidQuantity(_)));

    engine
        .new_recipe(Recipe::new("GREEN_POTION", "", 25, green()).unwrap())
        .await
        .unwrap();
    let half = i64::MAX / 200 + 1;
    let err = engine
        .deliver_bottles(
            2,
            &[
                PotionDelivery::new(green(), half),
                PotionDelivery::new(green(), half),
            ],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidQuantity(_)));

    let err = engine
        .deliver_capacity(3, CapacityOrder::new(i64::MAX, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidQuantity(_)));

    let balances = engine.balances().await.unwrap();
    assert_eq!(balances.gold, 100);
    assert_eq!(balances.ml, [0; 4]);
    assert!(balances.potions.is_empty());
}

#[tokio::test]
async fn large_barrel_is_capacity_not_overflow() {
    let (engine, _db) = engine_with_db().await;
    engine
        .apply(Posting::new("seed").entry(Account::ml(Color::Green), 500, "seed"))
        .await
        .unwrap();

    let err = engine
        .deliver_barrels(1, &[Barrel::new("HUGE_GREEN_BARREL", green(), i64::MAX)])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::CapacityExceeded(_)));
}
