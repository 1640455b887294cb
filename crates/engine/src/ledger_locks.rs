//! Lock rows for the read-validate-write sequence.
//!
//! Bumping `version` inside a transaction takes the row lock (PostgreSQL) or
//! the database write lock (SQLite) before any balance is read, so concurrent
//! writers on the same domain are serialized.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ledger_locks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub account: String,
    pub version: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
