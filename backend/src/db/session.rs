//! Per-request database session.
//!
//! A [`Session`] owns at most one open transaction on the shared pool. Handlers
//! receive it as an extractor and hand it explicitly to every persistence call.
//!
//! Transactions start with `BEGIN IMMEDIATE`: the write lock is taken up
//! front, so a read-then-write request never holds a snapshot that a
//! concurrent commit has made stale.

use axum::{extract::FromRequestParts, http::request::Parts};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};

use crate::errors::AppError;
use crate::AppState;

const BEGIN: &str = "BEGIN IMMEDIATE";

/// A database transaction scoped to one request.
///
/// Work is rolled back unless [`Session::commit`] is called. After a commit
/// the next call to [`Session::conn`] transparently begins a fresh transaction.
pub struct Session {
    pool: SqlitePool,
    tx: Option<Transaction<'static, Sqlite>>,
}

impl Session {
    /// Create a session that begins its transaction on first use.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool, tx: None }
    }

    /// Create a session with its transaction already open.
    pub async fn begin(pool: &SqlitePool) -> Result<Self, sqlx::Error> {
        let tx = pool.begin_with(BEGIN).await?;
        Ok(Self {
            pool: pool.clone(),
            tx: Some(tx),
        })
    }

    /// Whether a transaction is currently open.
    pub fn in_transaction(&self) -> bool {
        self.tx.is_some()
    }

    /// Connection of the open transaction, beginning one if needed.
    pub async fn conn(&mut self) -> Result<&mut SqliteConnection, sqlx::Error> {
        if self.tx.is_none() {
            self.tx = Some(self.pool.begin_with(BEGIN).await?);
        }
        self.tx.as_deref_mut().ok_or(sqlx::Error::PoolClosed)
    }

    /// Commit the open transaction, if any.
    pub async fn commit(&mut self) -> Result<(), sqlx::Error> {
        if let Some(tx) = self.tx.take() {
            tx.commit().await?;
            tracing::debug!("Session committed");
        }
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // Dropping the transaction queues the rollback on its connection.
        if self.in_transaction() {
            tracing::debug!("Rolling back uncommitted session");
        }
    }
}

impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Session::begin(&state.pool).await?)
    }
}
