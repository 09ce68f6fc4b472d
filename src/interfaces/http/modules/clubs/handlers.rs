//! Club handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{ClubDto, CreateClubRequest, ListClubsParams, UpdateClubRequest};
use crate::application::ClubService;
use crate::interfaces::http::common::{ApiResponse, ValidatedJson};
use crate::shared::{AppResult, PaginationQuery};

#[derive(Clone)]
pub struct ClubHandlerState {
    pub service: Arc<ClubService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/clubs",
    tag = "Clubs",
    params(PaginationQuery, ListClubsParams),
    responses(
        (status = 200, description = "Page of clubs", body = ApiResponse<Vec<ClubDto>>),
        (status = 429, description = "Rate limited")
    )
)]
pub async fn list_clubs(
    State(state): State<ClubHandlerState>,
    Query(pagination): Query<PaginationQuery>,
    Query(params): Query<ListClubsParams>,
) -> AppResult<Json<ApiResponse<Vec<ClubDto>>>> {
    let page = state.service.list(&pagination, params.into()).await?;
    Ok(Json(ApiResponse::paginated(page.map(ClubDto::from))))
}

#[utoipa::path(
    get,
    path = "/api/v1/clubs/{id}",
    tag = "Clubs",
    params(("id" = String, Path, description = "Club id")),
    responses(
        (status = 200, description = "Club", body = ApiResponse<ClubDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_club(
    State(state): State<ClubHandlerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<ClubDto>>> {
    let club = state.service.get(&id).await?;
    Ok(Json(ApiResponse::success(club.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/clubs",
    tag = "Clubs",
    request_body = CreateClubRequest,
    responses(
        (status = 201, description = "Created", body = ApiResponse<ClubDto>),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create_club(
    State(state): State<ClubHandlerState>,
    ValidatedJson(request): ValidatedJson<CreateClubRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ClubDto>>)> {
    let club = state.service.create(request.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(club.into()).with_message("Club created")),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/v1/clubs/{id}",
    tag = "Clubs",
    params(("id" = String, Path, description = "Club id")),
    request_body = UpdateClubRequest,
    responses(
        (status = 200, description = "Updated", body = ApiResponse<ClubDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_club(
    State(state): State<ClubHandlerState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateClubRequest>,
) -> AppResult<Json<ApiResponse<ClubDto>>> {
    let club = state.service.update(&id, request.into()).await?;
    Ok(Json(
        ApiResponse::success(club.into()).with_message("Club updated"),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/clubs/{id}",
    tag = "Clubs",
    params(("id" = String, Path, description = "Club id")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Players are still assigned to the club")
    )
)]
pub async fn delete_club(
    State(state): State<ClubHandlerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.service.delete(&id).await?;
    Ok(Json(ApiResponse::message("Club deleted")))
}
