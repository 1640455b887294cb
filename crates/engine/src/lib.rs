//! Ledger engine and planner for the potion shop.
//!
//! Gold, the four ml channels and every recipe's potion stock are balances
//! derived from append-only signed entries (see [`entries`]). Each business
//! operation writes one [`Transaction`] and its entries atomically, after
//! locking, reading and validating the balances it depends on.
//!
//! The [`planner`] module turns a snapshot of those balances into purchase or
//! production plans and never touches storage itself.

pub use capacity::Capacity;
pub use carts::{Cart, CheckoutReceipt, Customer};
pub use color::{Color, PotionType};
pub use commands::{Barrel, CapacityOrder, OrderSearch, PotionDelivery, SortColumn, SortOrder};
pub use config::{BarrelPolicy, BottlePolicy, CapacityConfig, ShopConfig, SolverConfig};
pub use entries::{Account, Entry, Posting};
pub use error::{EngineError, ErrorKind};
pub use ops::{Engine, EngineBuilder};
pub use planner::{Candidate, Limits, Objective, PlanItem, Planner, Strategy, Take};
pub use recipes::{Recipe, Stocked};
pub use snapshot::{Audit, Balances, BottlePlanItem, CapacityPlan, OrderLine, OrderPage};
pub use transactions::Transaction;

mod capacity;
mod cart_items;
mod carts;
mod color;
mod commands;
mod config;
pub mod entries;
mod error;
mod gold_entries;
mod ledger_locks;
mod ml_entries;
mod ops;
pub mod planner;
mod potion_entries;
mod recipes;
mod snapshot;
mod transactions;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
