//! SeaORM implementation of ClubRepository

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
};

use crate::domain::club::{Club, ClubFilter, ClubListQuery, ClubRepository, ClubSortField};
use crate::infrastructure::database::entities::club;
use crate::shared::{AppError, AppResult};

fn entity_to_domain(m: club::Model) -> Club {
    Club {
        id: m.id,
        name: m.name,
        city: m.city,
        country: m.country,
        league: m.league,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

fn domain_to_active(c: Club) -> club::ActiveModel {
    club::ActiveModel {
        id: Set(c.id),
        name: Set(c.name),
        city: Set(c.city),
        country: Set(c.country),
        league: Set(c.league),
        created_at: Set(c.created_at),
        updated_at: Set(c.updated_at),
    }
}

fn sort_column(field: ClubSortField) -> club::Column {
    match field {
        ClubSortField::CreatedAt => club::Column::CreatedAt,
        ClubSortField::Name => club::Column::Name,
        ClubSortField::City => club::Column::City,
        ClubSortField::Country => club::Column::Country,
    }
}

fn apply_filter(mut query: Select<club::Entity>, filter: &ClubFilter) -> Select<club::Entity> {
    if let Some(ref country) = filter.country {
        query = query.filter(club::Column::Country.eq(country.as_str()));
    }
    if let Some(ref league) = filter.league {
        query = query.filter(club::Column::League.eq(league.as_str()));
    }
    if let Some(ref search) = filter.search {
        let pattern = format!("%{}%", search.to_lowercase());
        query = query.filter(
            Condition::any()
                .add(Expr::expr(Func::lower(Expr::col(club::Column::Name))).like(pattern.clone()))
                .add(Expr::expr(Func::lower(Expr::col(club::Column::City))).like(pattern)),
        );
    }
    query
}

pub struct SeaOrmClubRepository {
    db: DatabaseConnection,
}

impl SeaOrmClubRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ClubRepository for SeaOrmClubRepository {
    async fn list(&self, query: &ClubListQuery) -> AppResult<(Vec<Club>, u64)> {
        let select = apply_filter(club::Entity::find(), &query.filter);
        let total = select.clone().count(&self.db).await?;
        let models = select
            .order_by(sort_column(query.sort), query.order.into())
            .order_by_asc(club::Column::Id)
            .offset(query.offset)
            .limit(query.limit)
            .all(&self.db)
            .await?;
        Ok((models.into_iter().map(entity_to_domain).collect(), total))
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Club>> {
        let model = club::Entity::find_by_id(id.to_string()).one(&self.db).await?;
        Ok(model.map(entity_to_domain))
    }

    async fn exists(&self, id: &str) -> AppResult<bool> {
        let count = club::Entity::find()
            .filter(club::Column::Id.eq(id))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn insert(&self, c: Club) -> AppResult<Club> {
        let model = domain_to_active(c).insert(&self.db).await?;
        Ok(entity_to_domain(model))
    }

    async fn update(&self, c: Club) -> AppResult<Club> {
        let id = c.id.clone();
        match domain_to_active(c).update(&self.db).await {
            Ok(model) => Ok(entity_to_domain(model)),
            Err(DbErr::RecordNotUpdated) => Err(AppError::not_found("Club", id)),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = club::Entity::delete_by_id(id.to_string())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(club::Entity::find().count(&self.db).await?)
    }
}
