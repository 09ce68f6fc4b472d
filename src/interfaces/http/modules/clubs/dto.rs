//! Club DTOs

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::{Club, ClubChanges, ClubFilter, NewClub};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClubDto {
    pub id: String,
    pub name: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub league: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Club> for ClubDto {
    fn from(c: Club) -> Self {
        Self {
            id: c.id,
            name: c.name,
            city: c.city,
            country: c.country,
            league: c.league,
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.to_rfc3339(),
        }
    }
}

fn nullable<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClubRequest {
    #[validate(length(min = 1, max = 120, message = "Club name is required"))]
    pub name: String,
    #[validate(length(max = 80))]
    pub city: Option<String>,
    #[validate(length(max = 80))]
    pub country: Option<String>,
    #[validate(length(max = 80))]
    pub league: Option<String>,
}

impl From<CreateClubRequest> for NewClub {
    fn from(r: CreateClubRequest) -> Self {
        NewClub {
            name: r.name.trim().to_string(),
            city: r.city,
            country: r.country,
            league: r.league,
        }
    }
}

/// Omitted fields are left unchanged; `null` clears them.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClubRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub city: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub country: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub league: Option<Option<String>>,
}

impl From<UpdateClubRequest> for ClubChanges {
    fn from(r: UpdateClubRequest) -> Self {
        ClubChanges {
            name: r.name.map(|v| v.trim().to_string()),
            city: r.city,
            country: r.country,
            league: r.league,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListClubsParams {
    pub country: Option<String>,
    pub league: Option<String>,
}

impl From<ListClubsParams> for ClubFilter {
    fn from(p: ListClubsParams) -> Self {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        ClubFilter {
            country: non_empty(p.country),
            league: non_empty(p.league),
            search: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_clears_and_absent_keeps() {
        let req: UpdateClubRequest =
            serde_json::from_str(r#"{"league": null, "name": " Al Hilal "}"#).unwrap();
        let changes = ClubChanges::from(req);
        assert_eq!(changes.league, Some(None));
        assert_eq!(changes.city, None);
        assert_eq!(changes.name.as_deref(), Some("Al Hilal"));
    }

    #[test]
    fn blank_name_fails_validation() {
        let req: CreateClubRequest = serde_json::from_str(r#"{"name": ""}"#).unwrap();
        assert!(req.validate().is_err());
    }
}
