//! Player use cases

use std::sync::Arc;

use tracing::info;

use crate::cache::{CachePrefix, ResponseCache};
use crate::domain::{
    ClubRepository, ListQuery, NewPlayer, Player, PlayerChanges, PlayerFilter, PlayerRepository,
    PlayerSortField,
};
use crate::shared::{
    parse_pagination, AppError, AppResult, Paginated, PaginationLimits, PaginationQuery,
};

/// Prefixes whose cached responses a player mutation makes stale.
const INVALIDATES: &[&str] = &[
    CachePrefix::PLAYERS,
    CachePrefix::PLAYER,
    CachePrefix::DASHBOARD,
];

pub struct PlayerService {
    players: Arc<dyn PlayerRepository>,
    clubs: Arc<dyn ClubRepository>,
    cache: ResponseCache,
    limits: PaginationLimits,
}

impl PlayerService {
    pub fn new(
        players: Arc<dyn PlayerRepository>,
        clubs: Arc<dyn ClubRepository>,
        cache: ResponseCache,
        limits: PaginationLimits,
    ) -> Self {
        Self {
            players,
            clubs,
            cache,
            limits,
        }
    }

    pub async fn list(
        &self,
        pagination: &PaginationQuery,
        mut filter: PlayerFilter,
    ) -> AppResult<Paginated<Player>> {
        let parsed = parse_pagination(pagination, PlayerSortField::DEFAULT_SORT, &self.limits);
        filter.search = parsed.search.clone();

        let query = ListQuery::from_pagination(
            filter,
            &parsed,
            PlayerSortField::ALLOWED,
            PlayerSortField::CreatedAt,
        );
        let (items, total) = self.players.list(&query).await?;
        Ok(Paginated::new(items, parsed.meta(total)))
    }

    pub async fn get(&self, id: &str) -> AppResult<Player> {
        self.players
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Player", id))
    }

    pub async fn create(&self, input: NewPlayer) -> AppResult<Player> {
        if let Some(club_id) = input.club_id.as_deref() {
            self.ensure_club_exists(club_id).await?;
        }

        let player = self.players.insert(Player::new(input)).await?;
        info!(player_id = %player.id, name = %player.full_name(), "Player created");

        self.cache.invalidate_many(INVALIDATES).await;
        Ok(player)
    }

    pub async fn update(&self, id: &str, changes: PlayerChanges) -> AppResult<Player> {
        let mut player = self.get(id).await?;
        if let Some(club_id) = changes.assigned_club() {
            self.ensure_club_exists(club_id).await?;
        }

        player.apply(changes);
        let player = self.players.update(player).await?;
        info!(player_id = %player.id, "Player updated");

        self.cache.invalidate_many(INVALIDATES).await;
        Ok(player)
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        if !self.players.delete(id).await? {
            return Err(AppError::not_found("Player", id));
        }
        info!(player_id = %id, "Player deleted");

        self.cache.invalidate_many(INVALIDATES).await;
        Ok(())
    }

    async fn ensure_club_exists(&self, club_id: &str) -> AppResult<()> {
        if self.clubs.exists(club_id).await? {
            Ok(())
        } else {
            Err(AppError::Validation(format!("club {club_id} does not exist")))
        }
    }
}
