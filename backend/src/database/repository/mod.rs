//! Repository layer for database operations
//!
//! Every read and write goes through a [`RepoTx`], a transaction opened
//! with [`Repository::begin`]. Services open one per operation and commit
//! at the end; dropping an uncommitted `RepoTx` rolls it back.

mod categories;
mod content;
mod notes;
mod tags;
mod users;

pub use categories::CATEGORY_SORT_FIELDS;
pub use notes::NOTE_SORT_FIELDS;
pub use tags::TAG_SORT_FIELDS;

use crate::error::Result;
use crate::paging::{Page, PageRequest, SortField};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Sqlite, SqlitePool, Transaction};

/// Entry point to storage
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Open a transaction scoped to one service operation.
    pub async fn begin(&self) -> Result<RepoTx> {
        let tx = self.pool.begin().await?;
        Ok(RepoTx { tx })
    }
}

/// An open storage transaction
pub struct RepoTx {
    tx: Transaction<'static, Sqlite>,
}

impl RepoTx {
    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    /// Run a count query and a windowed select over the same `from_where`
    /// clause, which must bind exactly one key parameter.
    async fn fetch_page<T>(
        &mut self,
        from_where: &str,
        alias: &str,
        key: i64,
        request: &PageRequest,
        allowed: &[SortField],
    ) -> Result<Page<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let order = request.order_clause(alias, allowed)?;

        let count_sql = format!("SELECT COUNT(*) {}", from_where);
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(key)
            .fetch_one(&mut *self.tx)
            .await?;

        let select_sql = format!(
            "SELECT {}.* {} ORDER BY {} LIMIT ? OFFSET ?",
            alias, from_where, order
        );
        let items = sqlx::query_as::<_, T>(&select_sql)
            .bind(key)
            .bind(request.limit())
            .bind(request.offset())
            .fetch_all(&mut *self.tx)
            .await?;

        Ok(Page::new(items, request, total))
    }
}
