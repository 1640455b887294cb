use sea_orm::{
    ConnectionTrait, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    Account, Balances, Capacity, Color, EngineError, Entry, Posting, ResultEngine, Transaction,
    capacity, entries::LockDomain, gold_entries, ledger_locks, ml_entries, potion_entries,
    recipes, transactions, util::parse_uuid,
};

use super::{Engine, with_tx};

/// Take the lock rows for `domains`, one statement per row in sorted order.
///
/// Must run inside the transaction that later reads and writes the guarded
/// balances.
pub(super) async fn lock<C: ConnectionTrait>(db: &C, domains: &[LockDomain]) -> ResultEngine<()> {
    let mut domains = domains.to_vec();
    domains.sort();
    domains.dedup();
    for domain in domains {
        let result = ledger_locks::Entity::update_many()
            .col_expr(
                ledger_locks::Column::Version,
                Expr::col(ledger_locks::Column::Version).add(1),
            )
            .filter(ledger_locks::Column::Account.eq(domain.key()))
            .exec(db)
            .await?;
        if result.rows_affected != 1 {
            return Err(EngineError::Integrity(format!(
                "missing ledger lock row \"{}\"",
                domain.key()
            )));
        }
    }
    Ok(())
}

pub(super) async fn balance_of<C: ConnectionTrait>(db: &C, account: Account) -> ResultEngine<i64> {
    let total: Option<Option<i64>> = match account {
        Account::Gold => {
            gold_entries::Entity::find()
                .select_only()
                .column_as(gold_entries::Column::Change.sum(), "total")
                .into_tuple()
                .one(db)
                .await?
        }
        Account::Ml { color } => {
            ml_entries::Entity::find()
                .select_only()
                .column_as(ml_entries::Column::Change.sum(), "total")
                .filter(ml_entries::Column::Color.eq(color.as_str()))
                .into_tuple()
                .one(db)
                .await?
        }
        Account::Potion { recipe_id } => {
            potion_entries::Entity::find()
                .select_only()
                .column_as(potion_entries::Column::Change.sum(), "total")
                .filter(potion_entries::Column::RecipeId.eq(recipe_id.to_string()))
                .into_tuple()
                .one(db)
                .await?
        }
    };
    Ok(total.flatten().unwrap_or(0))
}

pub(super) async fn read_balances<C: ConnectionTrait>(db: &C) -> ResultEngine<Balances> {
    let gold = balance_of(db, Account::Gold).await?;

    let ml_rows: Vec<(String, Option<i64>)> = ml_entries::Entity::find()
        .select_only()
        .column(ml_entries::Column::Color)
        .column_as(ml_entries::Column::Change.sum(), "total")
        .group_by(ml_entries::Column::Color)
        .into_tuple()
        .all(db)
        .await?;
    let mut ml = [0_i64; 4];
    for (color, total) in ml_rows {
        let color = Color::try_from(color.as_str())
            .map_err(|_| EngineError::Integrity(format!("unknown ml channel \"{color}\"")))?;
        ml[color.index()] = total.unwrap_or(0);
    }

    let potion_rows: Vec<(String, Option<i64>)> = potion_entries::Entity::find()
        .select_only()
        .column(potion_entries::Column::RecipeId)
        .column_as(potion_entries::Column::Change.sum(), "total")
        .group_by(potion_entries::Column::RecipeId)
        .order_by_asc(potion_entries::Column::RecipeId)
        .into_tuple()
        .all(db)
        .await?;
    let potions = potion_rows
        .into_iter()
        .map(|(id, total)| Ok((parse_uuid(&id, "recipe")?, total.unwrap_or(0))))
        .collect::<ResultEngine<Vec<_>>>()?;

    Ok(Balances { gold, ml, potions })
}

/// Insert a transaction row with no entries.
pub(super) async fn insert_transaction(
    db_tx: &DatabaseTransaction,
    description: &str,
) -> ResultEngine<Transaction> {
    let tx = Transaction::new(description);
    transactions::ActiveModel::from(&tx).insert(db_tx).await?;
    Ok(tx)
}

/// Write `posting` as one transaction and check no touched balance went
/// negative.
///
/// Callers must already hold the locks of every domain they read to validate
/// the posting; the posting's own domains are locked again here.
pub(super) async fn post(db_tx: &DatabaseTransaction, posting: &Posting) -> ResultEngine<Transaction> {
    posting.validate()?;
    lock(db_tx, &posting.lock_domains()).await?;

    let tx = insert_transaction(db_tx, posting.description()).await?;
    for entry in posting.entries() {
        match entry.account {
            Account::Gold => {
                gold_entries::ActiveModel::entry(tx.id, entry.change, &entry.description)
                    .insert(db_tx)
                    .await?;
            }
            Account::Ml { color } => {
                ml_entries::ActiveModel::entry(tx.id, color, entry.change, &entry.description)
                    .insert(db_tx)
                    .await?;
            }
            Account::Potion { recipe_id } => {
                potion_entries::ActiveModel::entry(
                    tx.id,
                    recipe_id,
                    entry.change,
                    &entry.description,
                )
                .insert(db_tx)
                .await?;
            }
        }
    }

    for account in posting.accounts() {
        let balance = balance_of(db_tx, account).await?;
        if balance < 0 {
            tracing::error!(%account, balance, tx = %tx.id, "negative balance after posting");
            return Err(EngineError::Integrity(format!(
                "{account} would become {balance}"
            )));
        }
    }
    Ok(tx)
}

impl Engine {
    /// Current balance of one account, summed from its entries.
    pub async fn current_balance(&self, account: Account) -> ResultEngine<i64> {
        balance_of(&self.database, account).await
    }

    /// Every balance, read in a single transaction.
    pub async fn balances(&self) -> ResultEngine<Balances> {
        with_tx!(self, |db_tx| read_balances(&db_tx).await)
    }

    /// Purchased capacity units and the ceilings they give.
    pub async fn capacity(&self) -> ResultEngine<Capacity> {
        self.capacity_in(&self.database).await
    }

    pub(super) async fn capacity_in<C: ConnectionTrait>(&self, db: &C) -> ResultEngine<Capacity> {
        let units: Option<(Option<i64>, Option<i64>)> = capacity::Entity::find()
            .select_only()
            .column_as(capacity::Column::PotionUnits.sum(), "potion_units")
            .column_as(capacity::Column::MlUnits.sum(), "ml_units")
            .into_tuple()
            .one(db)
            .await?;
        let (potion_units, ml_units) = units.unwrap_or((None, None));
        Ok(Capacity::from_units(
            potion_units.unwrap_or(0),
            ml_units.unwrap_or(0),
            &self.config.capacity,
        ))
    }

    /// Append a raw posting to the ledger.
    ///
    /// This is the low-level write used by every operation; it rejects
    /// postings that would leave any touched balance negative.
    pub async fn apply(&self, posting: Posting) -> ResultEngine<Uuid> {
        with_tx!(self, |db_tx| {
            for account in posting.accounts() {
                if let Account::Potion { recipe_id } = account
                    && recipes::Entity::find_by_id(recipe_id.to_string())
                        .one(&db_tx)
                        .await?
                        .is_none()
                {
                    return Err(EngineError::KeyNotFound(format!("recipe {recipe_id}")));
                }
            }
            let tx = post(&db_tx, &posting).await?;
            tracing::debug!(tx = %tx.id, description = posting.description(), "posting applied");
            Ok(tx.id)
        })
    }

    /// A transaction and the entries it wrote.
    pub async fn transaction(&self, id: Uuid) -> ResultEngine<(Transaction, Vec<Entry>)> {
        let key = id.to_string();
        let model = transactions::Entity::find_by_id(key.clone())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("transaction {id}")))?;
        let tx = Transaction::try_from(model)?;

        let mut entries = Vec::new();
        for gold in gold_entries::Entity::find()
            .filter(gold_entries::Column::TransactionId.eq(key.as_str()))
            .all(&self.database)
            .await?
        {
            entries.push(Entry {
                account: Account::Gold,
                change: gold.change,
                description: gold.description,
            });
        }
        for ml in ml_entries::Entity::find()
            .filter(ml_entries::Column::TransactionId.eq(key.as_str()))
            .all(&self.database)
            .await?
        {
            let color = Color::try_from(ml.color.as_str())
                .map_err(|_| EngineError::Integrity(format!("unknown ml channel \"{}\"", ml.color)))?;
            entries.push(Entry {
                account: Account::ml(color),
                change: ml.change,
                description: ml.description,
            });
        }
        for potion in potion_entries::Entity::find()
            .filter(potion_entries::Column::TransactionId.eq(key.as_str()))
            .all(&self.database)
            .await?
        {
            entries.push(Entry {
                account: Account::potion(parse_uuid(&potion.recipe_id, "recipe")?),
                change: potion.change,
                description: potion.description,
            });
        }
        Ok((tx, entries))
    }

    /// Credit the opening gold on an empty ledger.
    ///
    /// Returns `None` when the ledger already has transactions, so calling it
    /// on every startup is safe.
    pub async fn open_shop(&self) -> ResultEngine<Option<Uuid>> {
        with_tx!(self, |db_tx| {
            lock(&db_tx, &[LockDomain::Gold]).await?;
            let existing = transactions::Entity::find().one(&db_tx).await?;
            if existing.is_some() || self.config.starting_gold == 0 {
                Ok(None)
            } else {
                let posting = Posting::new("Opening balance").entry(
                    Account::Gold,
                    self.config.starting_gold,
                    "starting gold",
                );
                let tx = post(&db_tx, &posting).await?;
                tracing::info!(gold = self.config.starting_gold, tx = %tx.id, "shop opened");
                Ok(Some(tx.id))
            }
        })
    }
}
