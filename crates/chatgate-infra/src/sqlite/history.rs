//! SQLite chat history repository implementation.
//!
//! Append-only per-user exchanges. Each exchange is written by a single
//! INSERT, so concurrent appends for the same user never interleave fields.

use sqlx::Row;

use chatgate_core::repository::history::HistoryRepository;
use chatgate_types::chat::{ChatExchange, NewChatExchange};
use chatgate_types::error::RepositoryError;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime};

/// SQLite-backed implementation of `HistoryRepository`.
pub struct SqliteHistoryRepository {
    pool: DatabasePool,
}

impl SqliteHistoryRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct ChatExchangeRow {
    id: i64,
    username: String,
    user_message: String,
    assistant_message: String,
    created_at: String,
}

impl ChatExchangeRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            user_message: row.try_get("user_message")?,
            assistant_message: row.try_get("assistant_message")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_exchange(self) -> Result<ChatExchange, RepositoryError> {
        Ok(ChatExchange {
            id: self.id,
            username: self.username,
            user_message: self.user_message,
            assistant_message: self.assistant_message,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

impl HistoryRepository for SqliteHistoryRepository {
    async fn append(&self, exchange: &NewChatExchange) -> Result<ChatExchange, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO chat_history (username, user_message, assistant_message, created_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&exchange.username)
        .bind(&exchange.user_message)
        .bind(&exchange.assistant_message)
        .bind(format_datetime(&exchange.created_at))
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(done) => Ok(ChatExchange {
                id: done.last_insert_rowid(),
                username: exchange.username.clone(),
                user_message: exchange.user_message.clone(),
                assistant_message: exchange.assistant_message.clone(),
                created_at: exchange.created_at,
            }),
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("FOREIGN KEY") => {
                Err(RepositoryError::NotFound)
            }
            Err(e) => Err(RepositoryError::Query(e.to_string())),
        }
    }

    async fn list_by_user(
        &self,
        username: &str,
        limit: u32,
    ) -> Result<Vec<ChatExchange>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM chat_history WHERE username = ?
             ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(username)
        .bind(i64::from(limit))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut exchanges = Vec::with_capacity(rows.len());
        for row in &rows {
            let exchange_row =
                ChatExchangeRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            exchanges.push(exchange_row.into_exchange()?);
        }
        Ok(exchanges)
    }

    async fn delete_all_by_user(&self, username: &str) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM chat_history WHERE username = ?")
            .bind(username)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(result.rows_affected())
    }
}
