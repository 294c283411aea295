use chrono::{DateTime, Utc};
use sea_orm::{QueryFilter, QueryOrder, QuerySelect, Select, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{ResultEngine, TransactionDetail, transactions, users};

use super::super::{Engine, with_tx};

/// Newest first, id as tie-break so equal timestamps keep a stable order.
fn newest_first(query: Select<transactions::Entity>) -> Select<transactions::Entity> {
    query
        .order_by_desc(transactions::Column::CreatedAt)
        .order_by_desc(transactions::Column::Id)
}

impl Engine {
    /// Returns a transaction with its items and cashier name, or `None` when
    /// no transaction has this id.
    pub async fn transaction_by_id(&self, id: Uuid) -> ResultEngine<Option<TransactionDetail>> {
        with_tx!(self, |db_tx| {
            let row = transactions::Entity::find_by_id(id.to_string())
                .find_also_related(users::Entity)
                .one(&db_tx)
                .await?;
            let Some(row) = row else {
                return Ok(None);
            };
            let mut details = Self::hydrate(&db_tx, vec![row]).await?;
            Ok(details.pop())
        })
    }

    /// Lists transactions, newest first.
    ///
    /// Without `limit` every transaction is returned; `offset` alone skips
    /// that many rows and returns the rest.
    pub async fn transactions(
        &self,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> ResultEngine<Vec<TransactionDetail>> {
        with_tx!(self, |db_tx| {
            let mut query = newest_first(transactions::Entity::find());
            match (limit, offset) {
                (Some(limit), offset) => {
                    query = query.limit(limit).offset(offset.unwrap_or(0));
                }
                // SQLite rejects OFFSET without LIMIT.
                (None, Some(offset)) => {
                    query = query.limit(i64::MAX as u64).offset(offset);
                }
                (None, None) => {}
            }
            let rows = query
                .find_also_related(users::Entity)
                .all(&db_tx)
                .await?;
            Self::hydrate(&db_tx, rows).await
        })
    }

    /// Transactions whose `transaction_date` lies in `[start, end]`, newest
    /// first. An inverted range matches nothing.
    pub async fn transactions_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ResultEngine<Vec<TransactionDetail>> {
        with_tx!(self, |db_tx| {
            let rows = newest_first(
                transactions::Entity::find()
                    .filter(transactions::Column::TransactionDate.between(start, end)),
            )
            .find_also_related(users::Entity)
            .all(&db_tx)
            .await?;
            Self::hydrate(&db_tx, rows).await
        })
    }

    /// Transactions recorded by one cashier, newest first.
    pub async fn transactions_by_cashier(
        &self,
        cashier_id: Uuid,
    ) -> ResultEngine<Vec<TransactionDetail>> {
        with_tx!(self, |db_tx| {
            let rows = newest_first(
                transactions::Entity::find()
                    .filter(transactions::Column::CashierId.eq(cashier_id.to_string())),
            )
            .find_also_related(users::Entity)
            .all(&db_tx)
            .await?;
            Self::hydrate(&db_tx, rows).await
        })
    }
}
