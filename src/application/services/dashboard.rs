//! Dashboard statistics

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::cache::{CachePrefix, CacheTtl, ResponseCache};
use crate::domain::{ClubRepository, PlayerRepository, PlayerStatus};
use crate::shared::AppResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_players: u64,
    pub active_players: u64,
    pub injured_players: u64,
    pub total_clubs: u64,
}

pub struct DashboardService {
    players: Arc<dyn PlayerRepository>,
    clubs: Arc<dyn ClubRepository>,
    cache: ResponseCache,
}

impl DashboardService {
    pub fn new(
        players: Arc<dyn PlayerRepository>,
        clubs: Arc<dyn ClubRepository>,
        cache: ResponseCache,
    ) -> Self {
        Self {
            players,
            clubs,
            cache,
        }
    }

    pub fn stats_key() -> String {
        format!("{}:stats", CachePrefix::DASHBOARD)
    }

    /// Counts are cached for [`CacheTtl::SHORT`] and dropped by any player or
    /// club mutation.
    pub async fn stats(&self) -> AppResult<DashboardStats> {
        self.cache
            .get_or_fetch(&Self::stats_key(), CacheTtl::SHORT, || self.compute())
            .await
    }

    async fn compute(&self) -> AppResult<DashboardStats> {
        let (total_players, active_players, injured_players, total_clubs) = tokio::try_join!(
            self.players.count_by_status(None),
            self.players.count_by_status(Some(PlayerStatus::Active)),
            self.players.count_by_status(Some(PlayerStatus::Injured)),
            self.clubs.count(),
        )?;

        Ok(DashboardStats {
            total_players,
            active_players,
            injured_players,
            total_clubs,
        })
    }
}
