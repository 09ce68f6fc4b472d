//! Player entity

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum PlayerStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "injured")]
    Injured,
    #[sea_orm(string_value = "inactive")]
    Inactive,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "players")]
pub struct Model {
    /// UUID v4
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub first_name: String,

    pub last_name: String,

    pub position: Option<String>,

    pub nationality: Option<String>,

    pub status: PlayerStatus,

    /// Current club, if signed
    pub club_id: Option<String>,

    /// Whole currency units
    pub market_value: Option<i64>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::club::Entity",
        from = "Column::ClubId",
        to = "super::club::Column::Id"
    )]
    Club,
}

impl Related<super::club::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Club.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
