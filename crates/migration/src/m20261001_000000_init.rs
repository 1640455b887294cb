//! Initial schema migration - creates all tables from scratch.
//!
//! - `transactions`: one row per business operation
//! - `gold_ledger_entries`, `ml_ledger_entries`, `potion_ledger_entries`:
//!   signed changes; balances are their sums
//! - `potion_catalog`: recipes, unique by sku and by component vector
//! - `capacity_purchases`: purchased storage units
//! - `carts`, `cart_items`: customer carts
//! - `ledger_locks`: one row per lock domain, bumped by writers

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    Description,
    CreatedAt,
}

#[derive(Iden)]
enum PotionCatalog {
    Table,
    Id,
    Sku,
    Name,
    Price,
    Red,
    Green,
    Blue,
    Dark,
}

#[derive(Iden)]
enum GoldLedgerEntries {
    Table,
    Id,
    TransactionId,
    Change,
    Description,
}

#[derive(Iden)]
enum MlLedgerEntries {
    Table,
    Id,
    TransactionId,
    Color,
    Change,
    Description,
}

#[derive(Iden)]
enum PotionLedgerEntries {
    Table,
    Id,
    TransactionId,
    RecipeId,
    Change,
    Description,
}

#[derive(Iden)]
enum CapacityPurchases {
    Table,
    Id,
    TransactionId,
    PotionUnits,
    MlUnits,
}

#[derive(Iden)]
enum Carts {
    Table,
    Id,
    CustomerName,
    CharacterClass,
    Level,
    CreatedAt,
    CheckoutTransactionId,
}

#[derive(Iden)]
enum CartItems {
    Table,
    CartId,
    RecipeId,
    Quantity,
}

#[derive(Iden)]
enum LedgerLocks {
    Table,
    Account,
    Version,
}

/// Lock domains; must match the engine's lock keys.
const LOCK_ROWS: [&str; 7] = [
    "gold",
    "ml_red",
    "ml_green",
    "ml_blue",
    "ml_dark",
    "potions",
    "capacity",
];

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::Description).string().not_null())
                    .col(ColumnDef::new(Transactions::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Potion catalog
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(PotionCatalog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PotionCatalog::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PotionCatalog::Sku)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(PotionCatalog::Name).string().not_null())
                    .col(ColumnDef::new(PotionCatalog::Price).big_integer().not_null())
                    .col(ColumnDef::new(PotionCatalog::Red).big_integer().not_null())
                    .col(ColumnDef::new(PotionCatalog::Green).big_integer().not_null())
                    .col(ColumnDef::new(PotionCatalog::Blue).big_integer().not_null())
                    .col(ColumnDef::new(PotionCatalog::Dark).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-potion_catalog-components-unique")
                    .table(PotionCatalog::Table)
                    .col(PotionCatalog::Red)
                    .col(PotionCatalog::Green)
                    .col(PotionCatalog::Blue)
                    .col(PotionCatalog::Dark)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Ledger entries
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(GoldLedgerEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GoldLedgerEntries::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(GoldLedgerEntries::TransactionId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GoldLedgerEntries::Change)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GoldLedgerEntries::Description)
                            .string()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-gold_ledger_entries-transaction_id")
                            .from(GoldLedgerEntries::Table, GoldLedgerEntries::TransactionId)
                            .to(Transactions::Table, Transactions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MlLedgerEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MlLedgerEntries::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MlLedgerEntries::TransactionId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MlLedgerEntries::Color).string().not_null())
                    .col(ColumnDef::new(MlLedgerEntries::Change).big_integer().not_null())
                    .col(
                        ColumnDef::new(MlLedgerEntries::Description)
                            .string()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-ml_ledger_entries-transaction_id")
                            .from(MlLedgerEntries::Table, MlLedgerEntries::TransactionId)
                            .to(Transactions::Table, Transactions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ml_ledger_entries-color")
                    .table(MlLedgerEntries::Table)
                    .col(MlLedgerEntries::Color)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PotionLedgerEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PotionLedgerEntries::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PotionLedgerEntries::TransactionId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PotionLedgerEntries::RecipeId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PotionLedgerEntries::Change)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PotionLedgerEntries::Description)
                            .string()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-potion_ledger_entries-transaction_id")
                            .from(PotionLedgerEntries::Table, PotionLedgerEntries::TransactionId)
                            .to(Transactions::Table, Transactions::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-potion_ledger_entries-recipe_id")
                            .from(PotionLedgerEntries::Table, PotionLedgerEntries::RecipeId)
                            .to(PotionCatalog::Table, PotionCatalog::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-potion_ledger_entries-recipe_id")
                    .table(PotionLedgerEntries::Table)
                    .col(PotionLedgerEntries::RecipeId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Capacity purchases
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(CapacityPurchases::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CapacityPurchases::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CapacityPurchases::TransactionId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CapacityPurchases::PotionUnits)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CapacityPurchases::MlUnits)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-capacity_purchases-transaction_id")
                            .from(CapacityPurchases::Table, CapacityPurchases::TransactionId)
                            .to(Transactions::Table, Transactions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Carts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Carts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Carts::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Carts::CustomerName).string().not_null())
                    .col(ColumnDef::new(Carts::CharacterClass).string().not_null())
                    .col(ColumnDef::new(Carts::Level).big_integer().not_null())
                    .col(ColumnDef::new(Carts::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Carts::CheckoutTransactionId).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-carts-checkout_transaction_id")
                            .from(Carts::Table, Carts::CheckoutTransactionId)
                            .to(Transactions::Table, Transactions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CartItems::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(CartItems::CartId).string().not_null())
                    .col(ColumnDef::new(CartItems::RecipeId).string().not_null())
                    .col(ColumnDef::new(CartItems::Quantity).big_integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(CartItems::CartId)
                            .col(CartItems::RecipeId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-cart_items-cart_id")
                            .from(CartItems::Table, CartItems::CartId)
                            .to(Carts::Table, Carts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-cart_items-recipe_id")
                            .from(CartItems::Table, CartItems::RecipeId)
                            .to(PotionCatalog::Table, PotionCatalog::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Ledger locks
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(LedgerLocks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LedgerLocks::Account)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LedgerLocks::Version)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        let mut seed = Query::insert();
        seed.into_table(LedgerLocks::Table)
            .columns([LedgerLocks::Account, LedgerLocks::Version]);
        for account in LOCK_ROWS {
            seed.values([account.into(), 0_i64.into()])
                .map_err(|err| DbErr::Migration(err.to_string()))?;
        }
        manager.exec_stmt(seed).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(LedgerLocks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CartItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Carts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CapacityPurchases::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PotionLedgerEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MlLedgerEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GoldLedgerEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PotionCatalog::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        Ok(())
    }
}
