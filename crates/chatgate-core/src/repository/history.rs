//! HistoryRepository trait definition (the append-only chat history store).

use chatgate_types::chat::{ChatExchange, NewChatExchange};
use chatgate_types::error::RepositoryError;

/// Repository trait for per-user chat exchanges.
///
/// Implementations live in chatgate-infra (e.g., `SqliteHistoryRepository`).
pub trait HistoryRepository: Send + Sync {
    /// Append one exchange and return it with its store-assigned id.
    fn append(
        &self,
        exchange: &NewChatExchange,
    ) -> impl std::future::Future<Output = Result<ChatExchange, RepositoryError>> + Send;

    /// List a user's exchanges, most recent first.
    fn list_by_user(
        &self,
        username: &str,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<ChatExchange>, RepositoryError>> + Send;

    /// Delete every exchange owned by `username`, returning how many were removed.
    fn delete_all_by_user(
        &self,
        username: &str,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
