//! Ledger entries.
//!
//! An [`Entry`] is a single signed change applied to an [`Account`] as part of
//! a [`Transaction`](crate::Transaction):
//! - positive values increase the balance
//! - negative values decrease the balance
//!
//! Every change to gold, ml or potion stock happens via entries. Balances are
//! never stored; they are the sum of all entries of an account.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Color, EngineError, ResultEngine};

/// What an entry moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "account", rename_all = "snake_case")]
pub enum Account {
    Gold,
    Ml { color: Color },
    Potion { recipe_id: Uuid },
}

impl Account {
    pub const fn ml(color: Color) -> Self {
        Self::Ml { color }
    }

    pub const fn potion(recipe_id: Uuid) -> Self {
        Self::Potion { recipe_id }
    }

    /// Row of `ledger_locks` guarding this account.
    pub(crate) fn lock_domain(&self) -> LockDomain {
        match self {
            Self::Gold => LockDomain::Gold,
            Self::Ml { color } => LockDomain::Ml(*color),
            Self::Potion { .. } => LockDomain::Potions,
        }
    }
}

impl core::fmt::Display for Account {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Gold => f.write_str("gold"),
            Self::Ml { color } => write!(f, "{color} ml"),
            Self::Potion { recipe_id } => write!(f, "potion {recipe_id}"),
        }
    }
}

/// Lock granularity: one row per ml channel, one for gold, one for the whole
/// potion inventory and one for capacity purchases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum LockDomain {
    Gold,
    Ml(Color),
    Potions,
    Capacity,
}

impl LockDomain {
    pub(crate) fn key(self) -> &'static str {
        match self {
            Self::Gold => "gold",
            Self::Ml(Color::Red) => "ml_red",
            Self::Ml(Color::Green) => "ml_green",
            Self::Ml(Color::Blue) => "ml_blue",
            Self::Ml(Color::Dark) => "ml_dark",
            Self::Potions => "potions",
            Self::Capacity => "capacity",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub account: Account,
    pub change: i64,
    pub description: String,
}

/// A batch of entries committed as one transaction.
///
/// # Examples
///
/// ```rust
/// use engine::{Account, Color, Posting};
///
/// let posting = Posting::new("Barrel delivery order 7")
///     .entry(Account::Gold, -100, "SMALL_RED_BARREL x1")
///     .entry(Account::ml(Color::Red), 500, "SMALL_RED_BARREL x1");
/// assert_eq!(posting.entries().len(), 2);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Posting {
    description: String,
    entries: Vec<Entry>,
    locks: Vec<LockDomain>,
}

impl Posting {
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            entries: Vec::new(),
            locks: Vec::new(),
        }
    }

    #[must_use]
    pub fn entry(mut self, account: Account, change: i64, description: impl Into<String>) -> Self {
        self.push(account, change, description);
        self
    }

    pub fn push(&mut self, account: Account, change: i64, description: impl Into<String>) {
        self.entries.push(Entry {
            account,
            change,
            description: description.into(),
        });
    }

    /// Guard an extra lock domain that has no entry in this posting.
    #[must_use]
    pub(crate) fn lock(mut self, domain: LockDomain) -> Self {
        self.locks.push(domain);
        self
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lock domains touched by the posting, sorted and deduplicated so every
    /// writer acquires them in the same order.
    pub(crate) fn lock_domains(&self) -> Vec<LockDomain> {
        let mut domains: Vec<LockDomain> = self
            .entries
            .iter()
            .map(|e| e.account.lock_domain())
            .chain(self.locks.iter().copied())
            .collect();
        domains.sort();
        domains.dedup();
        domains
    }

    /// Accounts touched by the posting, in first-seen order.
    pub(crate) fn accounts(&self) -> Vec<Account> {
        let mut accounts: Vec<Account> = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            if !accounts.contains(&entry.account) {
                accounts.push(entry.account);
            }
        }
        accounts
    }

    pub(crate) fn validate(&self) -> ResultEngine<()> {
        if self.description.trim().is_empty() {
            return Err(EngineError::InvalidQuantity(
                "transaction description must not be empty".to_string(),
            ));
        }
        if self.entries.is_empty() {
            return Err(EngineError::InvalidQuantity(
                "a transaction needs at least one entry".to_string(),
            ));
        }
        if let Some(entry) = self.entries.iter().find(|e| e.change == 0) {
            return Err(EngineError::InvalidQuantity(format!(
                "zero change for {}",
                entry.account
            )));
        }
        Ok(())
    }
}
