//! Player DTOs

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::{NewPlayer, Player, PlayerChanges, PlayerFilter, PlayerStatus};
use crate::shared::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDto {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub position: Option<String>,
    pub nationality: Option<String>,
    /// `active`, `injured` or `inactive`
    pub status: String,
    pub club_id: Option<String>,
    pub market_value: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Player> for PlayerDto {
    fn from(p: Player) -> Self {
        Self {
            id: p.id,
            first_name: p.first_name,
            last_name: p.last_name,
            position: p.position,
            nationality: p.nationality,
            status: p.status.to_string(),
            club_id: p.club_id,
            market_value: p.market_value,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.to_rfc3339(),
        }
    }
}

fn parse_status(raw: Option<&str>) -> AppResult<Option<PlayerStatus>> {
    raw.map(str::parse::<PlayerStatus>)
        .transpose()
        .map_err(AppError::Validation)
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlayerRequest {
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,
    #[validate(length(max = 50))]
    pub position: Option<String>,
    #[validate(length(max = 80))]
    pub nationality: Option<String>,
    /// Defaults to `active`
    pub status: Option<String>,
    #[validate(length(min = 1))]
    pub club_id: Option<String>,
    #[validate(range(min = 0))]
    pub market_value: Option<i64>,
}

impl TryFrom<CreatePlayerRequest> for NewPlayer {
    type Error = AppError;

    fn try_from(r: CreatePlayerRequest) -> AppResult<Self> {
        Ok(NewPlayer {
            status: parse_status(r.status.as_deref())?,
            first_name: r.first_name.trim().to_string(),
            last_name: r.last_name.trim().to_string(),
            position: r.position,
            nationality: r.nationality,
            club_id: r.club_id,
            market_value: r.market_value,
        })
    }
}

/// Partial update. Omitted fields are left unchanged; `null` clears an
/// optional field.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlayerRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub position: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub nationality: Option<Option<String>>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub club_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<i64>)]
    pub market_value: Option<Option<i64>>,
}

impl TryFrom<UpdatePlayerRequest> for PlayerChanges {
    type Error = AppError;

    fn try_from(r: UpdatePlayerRequest) -> AppResult<Self> {
        if matches!(r.market_value, Some(Some(v)) if v < 0) {
            return Err(AppError::Validation(
                "marketValue: must be zero or greater".to_string(),
            ));
        }
        Ok(PlayerChanges {
            status: parse_status(r.status.as_deref())?,
            first_name: r.first_name.map(|v| v.trim().to_string()),
            last_name: r.last_name.map(|v| v.trim().to_string()),
            position: r.position,
            nationality: r.nationality,
            club_id: r.club_id,
            market_value: r.market_value,
        })
    }
}

/// Resource filters for `GET /api/v1/players` (pagination parameters are
/// documented separately).
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListPlayersParams {
    /// `active`, `injured` or `inactive`
    pub status: Option<String>,
    pub club_id: Option<String>,
    pub position: Option<String>,
}

impl TryFrom<ListPlayersParams> for PlayerFilter {
    type Error = AppError;

    fn try_from(p: ListPlayersParams) -> AppResult<Self> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Ok(PlayerFilter {
            status: parse_status(non_empty(p.status).as_deref())?,
            club_id: non_empty(p.club_id),
            position: non_empty(p.position),
            search: None,
        })
    }
}
