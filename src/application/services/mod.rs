//! Application services

mod club;
mod dashboard;
mod player;

pub use club::ClubService;
pub use dashboard::{DashboardService, DashboardStats};
pub use player::PlayerService;

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;
    use std::time::Duration;

    use sea_orm_migration::MigratorTrait;

    use super::*;
    use crate::cache::{MemoryStore, ResponseCache};
    use crate::domain::{ClubRepository, PlayerRepository};
    use crate::infrastructure::database::migrator::Migrator;
    use crate::infrastructure::database::repositories::{
        SeaOrmClubRepository, SeaOrmPlayerRepository,
    };
    use crate::infrastructure::{init_database, DatabaseConfig};
    use crate::shared::PaginationLimits;

    pub struct Fixture {
        pub players: PlayerService,
        pub clubs: ClubService,
        pub dashboard: DashboardService,
        pub club_repo: Arc<dyn ClubRepository>,
        pub cache: ResponseCache,
        pub store: Arc<MemoryStore>,
    }

    pub async fn fixture() -> Fixture {
        let db = init_database(&DatabaseConfig::sqlite_memory()).await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let player_repo: Arc<dyn PlayerRepository> =
            Arc::new(SeaOrmPlayerRepository::new(db.clone()));
        let club_repo: Arc<dyn ClubRepository> = Arc::new(SeaOrmClubRepository::new(db));
        let store = Arc::new(MemoryStore::new());
        let cache = ResponseCache::new(store.clone());
        let limits = PaginationLimits::default();

        Fixture {
            players: PlayerService::new(player_repo.clone(), club_repo.clone(), cache.clone(), limits),
            clubs: ClubService::new(club_repo.clone(), player_repo.clone(), cache.clone(), limits),
            dashboard: DashboardService::new(player_repo, club_repo.clone(), cache.clone()),
            club_repo,
            cache,
            store,
        }
    }

    /// Lets detached cache writes land.
    pub async fn settle() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
