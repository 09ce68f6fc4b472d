//! Club use cases

use std::sync::Arc;

use tracing::info;

use crate::cache::{CachePrefix, ResponseCache};
use crate::domain::{
    Club, ClubChanges, ClubFilter, ClubRepository, ClubSortField, ListQuery, NewClub,
    PlayerRepository,
};
use crate::shared::{
    parse_pagination, AppError, AppResult, Paginated, PaginationLimits, PaginationQuery,
};

const INVALIDATES: &[&str] = &[CachePrefix::CLUBS, CachePrefix::CLUB, CachePrefix::DASHBOARD];

pub struct ClubService {
    clubs: Arc<dyn ClubRepository>,
    players: Arc<dyn PlayerRepository>,
    cache: ResponseCache,
    limits: PaginationLimits,
}

impl ClubService {
    pub fn new(
        clubs: Arc<dyn ClubRepository>,
        players: Arc<dyn PlayerRepository>,
        cache: ResponseCache,
        limits: PaginationLimits,
    ) -> Self {
        Self {
            clubs,
            players,
            cache,
            limits,
        }
    }

    pub async fn list(
        &self,
        pagination: &PaginationQuery,
        mut filter: ClubFilter,
    ) -> AppResult<Paginated<Club>> {
        let parsed = parse_pagination(pagination, ClubSortField::DEFAULT_SORT, &self.limits);
        filter.search = parsed.search.clone();
        let query = ListQuery::from_pagination(
            filter,
            &parsed,
            ClubSortField::ALLOWED,
            ClubSortField::CreatedAt,
        );
        let (items, total) = self.clubs.list(&query).await?;
        Ok(Paginated::new(items, parsed.meta(total)))
    }

    pub async fn get(&self, id: &str) -> AppResult<Club> {
        self.clubs
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Club", id))
    }

    pub async fn create(&self, input: NewClub) -> AppResult<Club> {
        let club = self.clubs.insert(Club::new(input)).await?;
        info!(club_id = %club.id, name = %club.name, "Club created");
        self.cache.invalidate_many(INVALIDATES).await;
        Ok(club)
    }

    pub async fn update(&self, id: &str, changes: ClubChanges) -> AppResult<Club> {
        let mut club = self.get(id).await?;
        club.apply(changes);
        let club = self.clubs.update(club).await?;
        info!(club_id = %club.id, "Club updated");
        self.cache.invalidate_many(INVALIDATES).await;
        Ok(club)
    }

    /// Refused while any player still references the club.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let assigned = self.players.count_by_club(id).await?;
        if assigned > 0 {
            return Err(AppError::Conflict(format!(
                "club has {assigned} assigned player(s)"
            )));
        }
        if !self.clubs.delete(id).await? {
            return Err(AppError::not_found("Club", id));
        }
        info!(club_id = %id, "Club deleted");
        self.cache.invalidate_many(INVALIDATES).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::testing::{fixture, Fixture};
    use crate::domain::NewPlayer;

    fn new_club(name: &str, country: &str) -> NewClub {
        NewClub {
            name: name.into(),
            country: Some(country.into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn list_filters_and_sorts_through_allow_list() {
        let Fixture { clubs, .. } = fixture().await;
        clubs.create(new_club("Al-Nassr", "SA")).await.unwrap();
        clubs.create(new_club("Al-Ahli", "SA")).await.unwrap();
        clubs.create(new_club("Al-Wahda", "AE")).await.unwrap();

        let page = clubs
            .list(
                &PaginationQuery {
                    sort: Some("name".into()),
                    order: Some("asc".into()),
                    ..Default::default()
                },
                ClubFilter {
                    country: Some("SA".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(page.meta.total, 2);
        assert_eq!(page.items[0].name, "Al-Ahli");
    }

    #[tokio::test]
    async fn delete_with_assigned_players_conflicts() {
        let Fixture { clubs, players, .. } = fixture().await;
        let club = clubs.create(new_club("Al-Hilal", "SA")).await.unwrap();
        players
            .create(NewPlayer {
                first_name: "Salem".into(),
                last_name: "Al-Dawsari".into(),
                club_id: Some(club.id.clone()),
                ..Default::default()
            })
            .await
            .unwrap();

        let err = clubs.delete(&club.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert!(clubs.get(&club.id).await.is_ok());
    }

    #[tokio::test]
    async fn delete_invalidates_club_prefixes() {
        let Fixture { clubs, cache, .. } = fixture().await;
        let club = clubs.create(new_club("Al-Hilal", "SA")).await.unwrap();
        assert!(cache.set("club:/api/v1/clubs/x:default", &1, 60).await);
        assert!(cache.set("dash:stats", &1, 60).await);
        assert!(cache.set("players:all", &1, 60).await);

        clubs.delete(&club.id).await.unwrap();

        assert!(cache.get::<u8>("club:/api/v1/clubs/x:default").await.is_none());
        assert!(cache.get::<u8>("dash:stats").await.is_none());
        assert!(cache.get::<u8>("players:all").await.is_some());

        let err = clubs.delete(&club.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { entity: "Club", .. }));
    }
}
