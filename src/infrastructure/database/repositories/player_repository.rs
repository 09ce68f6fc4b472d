//! SeaORM implementation of PlayerRepository

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use tracing::debug;

use crate::domain::player::{
    Player, PlayerFilter, PlayerListQuery, PlayerRepository, PlayerSortField, PlayerStatus,
};
use crate::infrastructure::database::entities::player;
use crate::shared::{AppError, AppResult};

// ── Conversion helpers ──────────────────────────────────────────

fn entity_to_domain(m: player::Model) -> Player {
    Player {
        id: m.id,
        first_name: m.first_name,
        last_name: m.last_name,
        position: m.position,
        nationality: m.nationality,
        status: match m.status {
            player::PlayerStatus::Active => PlayerStatus::Active,
            player::PlayerStatus::Injured => PlayerStatus::Injured,
            player::PlayerStatus::Inactive => PlayerStatus::Inactive,
        },
        club_id: m.club_id,
        market_value: m.market_value,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

fn status_to_entity(s: PlayerStatus) -> player::PlayerStatus {
    match s {
        PlayerStatus::Active => player::PlayerStatus::Active,
        PlayerStatus::Injured => player::PlayerStatus::Injured,
        PlayerStatus::Inactive => player::PlayerStatus::Inactive,
    }
}

fn domain_to_active(p: Player) -> player::ActiveModel {
    player::ActiveModel {
        id: Set(p.id),
        first_name: Set(p.first_name),
        last_name: Set(p.last_name),
        position: Set(p.position),
        nationality: Set(p.nationality),
        status: Set(status_to_entity(p.status)),
        club_id: Set(p.club_id),
        market_value: Set(p.market_value),
        created_at: Set(p.created_at),
        updated_at: Set(p.updated_at),
    }
}

fn sort_column(field: PlayerSortField) -> player::Column {
    match field {
        PlayerSortField::CreatedAt => player::Column::CreatedAt,
        PlayerSortField::FirstName => player::Column::FirstName,
        PlayerSortField::LastName => player::Column::LastName,
        PlayerSortField::MarketValue => player::Column::MarketValue,
        PlayerSortField::Position => player::Column::Position,
        PlayerSortField::Status => player::Column::Status,
    }
}

fn apply_filter(mut query: Select<player::Entity>, filter: &PlayerFilter) -> Select<player::Entity> {
    if let Some(status) = filter.status {
        query = query.filter(player::Column::Status.eq(status_to_entity(status)));
    }
    if let Some(ref club_id) = filter.club_id {
        query = query.filter(player::Column::ClubId.eq(club_id.as_str()));
    }
    if let Some(ref position) = filter.position {
        query = query.filter(player::Column::Position.eq(position.as_str()));
    }
    if let Some(ref search) = filter.search {
        let pattern = format!("%{}%", search.to_lowercase());
        query = query.filter(
            Condition::any()
                .add(Expr::expr(Func::lower(Expr::col(player::Column::FirstName))).like(pattern.clone()))
                .add(Expr::expr(Func::lower(Expr::col(player::Column::LastName))).like(pattern)),
        );
    }
    query
}

// ── SeaOrmPlayerRepository ──────────────────────────────────────

pub struct SeaOrmPlayerRepository {
    db: DatabaseConnection,
}

impl SeaOrmPlayerRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PlayerRepository for SeaOrmPlayerRepository {
    async fn list(&self, query: &PlayerListQuery) -> AppResult<(Vec<Player>, u64)> {
        let select = apply_filter(player::Entity::find(), &query.filter);

        let total = select.clone().count(&self.db).await?;

        let models = select
            .order_by(sort_column(query.sort), query.order.into())
            .order_by_asc(player::Column::Id)
            .offset(query.offset)
            .limit(query.limit)
            .all(&self.db)
            .await?;

        debug!(total, returned = models.len(), "Listed players");
        Ok((models.into_iter().map(entity_to_domain).collect(), total))
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Player>> {
        let model = player::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await?;
        Ok(model.map(entity_to_domain))
    }

    async fn insert(&self, p: Player) -> AppResult<Player> {
        let model = domain_to_active(p).insert(&self.db).await?;
        Ok(entity_to_domain(model))
    }

    async fn update(&self, p: Player) -> AppResult<Player> {
        let id = p.id.clone();
        match domain_to_active(p).update(&self.db).await {
            Ok(model) => Ok(entity_to_domain(model)),
            Err(DbErr::RecordNotUpdated) => Err(AppError::not_found("Player", id)),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = player::Entity::delete_by_id(id.to_string())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn count_by_status(&self, status: Option<PlayerStatus>) -> AppResult<u64> {
        let mut query = player::Entity::find();
        if let Some(status) = status {
            query = query.filter(player::Column::Status.eq(status_to_entity(status)));
        }
        Ok(query.count(&self.db).await?)
    }

    async fn count_by_club(&self, club_id: &str) -> AppResult<u64> {
        Ok(player::Entity::find()
            .filter(player::Column::ClubId.eq(club_id))
            .count(&self.db)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::player::NewPlayer;
    use crate::domain::ListQuery;
    use crate::infrastructure::database::{init_database, migrator::Migrator, DatabaseConfig};
    use crate::shared::SortOrder;
    use sea_orm_migration::MigratorTrait;

    async fn repo() -> SeaOrmPlayerRepository {
        let db = init_database(&DatabaseConfig::sqlite_memory()).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        SeaOrmPlayerRepository::new(db)
    }

    fn player(first: &str, last: &str, status: PlayerStatus, value: i64) -> Player {
        Player::new(NewPlayer {
            first_name: first.into(),
            last_name: last.into(),
            position: Some("Forward".into()),
            status: Some(status),
            market_value: Some(value),
            ..Default::default()
        })
    }

    fn query(filter: PlayerFilter, sort: PlayerSortField, order: SortOrder) -> PlayerListQuery {
        ListQuery {
            filter,
            sort,
            order,
            offset: 0,
            limit: 20,
        }
    }

    async fn seeded() -> SeaOrmPlayerRepository {
        let repo = repo().await;
        repo.insert(player("Salem", "Al-Dawsari", PlayerStatus::Active, 300)).await.unwrap();
        repo.insert(player("Firas", "Al-Buraikan", PlayerStatus::Injured, 200)).await.unwrap();
        repo.insert(player("Saud", "Abdulhamid", PlayerStatus::Active, 100)).await.unwrap();
        repo
    }

    #[tokio::test]
    async fn list_sorts_and_counts() {
        let repo = seeded().await;
        let (items, total) = repo
            .list(&query(PlayerFilter::default(), PlayerSortField::MarketValue, SortOrder::Asc))
            .await
            .unwrap();

        assert_eq!(total, 3);
        let values: Vec<_> = items.iter().map(|p| p.market_value.unwrap()).collect();
        assert_eq!(values, vec![100, 200, 300]);
    }

    #[tokio::test]
    async fn list_pages_with_offset_and_limit() {
        let repo = seeded().await;
        let mut q = query(PlayerFilter::default(), PlayerSortField::MarketValue, SortOrder::Desc);
        q.offset = 2;
        q.limit = 2;

        let (items, total) = repo.list(&q).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].market_value, Some(100));
    }

    #[tokio::test]
    async fn search_is_case_insensitive_on_either_name() {
        let repo = seeded().await;
        let filter = PlayerFilter {
            search: Some("al-".into()),
            ..Default::default()
        };
        let (_, total) = repo
            .list(&query(filter, PlayerSortField::CreatedAt, SortOrder::Desc))
            .await
            .unwrap();
        assert_eq!(total, 2);

        let filter = PlayerFilter {
            search: Some("SAUD".into()),
            ..Default::default()
        };
        let (items, _) = repo
            .list(&query(filter, PlayerSortField::CreatedAt, SortOrder::Desc))
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].first_name, "Saud");
    }

    #[tokio::test]
    async fn status_filter_and_counts() {
        let repo = seeded().await;
        let filter = PlayerFilter {
            status: Some(PlayerStatus::Injured),
            ..Default::default()
        };
        let (items, total) = repo
            .list(&query(filter, PlayerSortField::CreatedAt, SortOrder::Desc))
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(items[0].first_name, "Firas");

        assert_eq!(repo.count_by_status(None).await.unwrap(), 3);
        assert_eq!(repo.count_by_status(Some(PlayerStatus::Active)).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_rows() {
        let repo = repo().await;
        let ghost = player("No", "One", PlayerStatus::Active, 1);

        let err = repo.update(ghost.clone()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { entity: "Player", .. }));
        assert!(!repo.delete(&ghost.id).await.unwrap());

        let saved = repo.insert(ghost).await.unwrap();
        assert!(repo.delete(&saved.id).await.unwrap());
        assert!(repo.find_by_id(&saved.id).await.unwrap().is_none());
    }
}
