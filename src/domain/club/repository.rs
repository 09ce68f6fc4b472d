//! Club repository interface

use async_trait::async_trait;

use super::model::{Club, ClubFilter, ClubSortField};
use crate::domain::ListQuery;
use crate::shared::AppResult;

pub type ClubListQuery = ListQuery<ClubFilter, ClubSortField>;

#[async_trait]
pub trait ClubRepository: Send + Sync {
    async fn list(&self, query: &ClubListQuery) -> AppResult<(Vec<Club>, u64)>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Club>>;
    async fn exists(&self, id: &str) -> AppResult<bool>;
    async fn insert(&self, club: Club) -> AppResult<Club>;
    async fn update(&self, club: Club) -> AppResult<Club>;
    async fn delete(&self, id: &str) -> AppResult<bool>;
    async fn count(&self) -> AppResult<u64>;
}
