//! Player repository interface

use async_trait::async_trait;

use super::model::{Player, PlayerFilter, PlayerSortField, PlayerStatus};
use crate::domain::ListQuery;
use crate::shared::AppResult;

pub type PlayerListQuery = ListQuery<PlayerFilter, PlayerSortField>;

#[async_trait]
pub trait PlayerRepository: Send + Sync {
    /// One page of players plus the total matching the filter.
    async fn list(&self, query: &PlayerListQuery) -> AppResult<(Vec<Player>, u64)>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Player>>;
    async fn insert(&self, player: Player) -> AppResult<Player>;
    async fn update(&self, player: Player) -> AppResult<Player>;
    /// `false` when no row had that id.
    async fn delete(&self, id: &str) -> AppResult<bool>;
    /// All players when `status` is `None`.
    async fn count_by_status(&self, status: Option<PlayerStatus>) -> AppResult<u64>;
    async fn count_by_club(&self, club_id: &str) -> AppResult<u64>;
}
