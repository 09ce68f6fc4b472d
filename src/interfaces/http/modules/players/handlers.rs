//! Player handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{CreatePlayerRequest, ListPlayersParams, PlayerDto, UpdatePlayerRequest};
use crate::application::PlayerService;
use crate::interfaces::http::common::{ApiResponse, ValidatedJson};
use crate::shared::{AppResult, PaginationQuery};

#[derive(Clone)]
pub struct PlayerHandlerState {
    pub service: Arc<PlayerService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/players",
    tag = "Players",
    params(PaginationQuery, ListPlayersParams),
    responses(
        (status = 200, description = "Page of players; `X-Cache` reports HIT or MISS", body = ApiResponse<Vec<PlayerDto>>),
        (status = 422, description = "Unknown status filter"),
        (status = 429, description = "Rate limited")
    )
)]
pub async fn list_players(
    State(state): State<PlayerHandlerState>,
    Query(pagination): Query<PaginationQuery>,
    Query(params): Query<ListPlayersParams>,
) -> AppResult<Json<ApiResponse<Vec<PlayerDto>>>> {
    let page = state
        .service
        .list(&pagination, params.try_into()?)
        .await?;
    Ok(Json(ApiResponse::paginated(page.map(PlayerDto::from))))
}

#[utoipa::path(
    get,
    path = "/api/v1/players/{id}",
    tag = "Players",
    params(("id" = String, Path, description = "Player id")),
    responses(
        (status = 200, description = "Player", body = ApiResponse<PlayerDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_player(
    State(state): State<PlayerHandlerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<PlayerDto>>> {
    let player = state.service.get(&id).await?;
    Ok(Json(ApiResponse::success(player.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/players",
    tag = "Players",
    request_body = CreatePlayerRequest,
    responses(
        (status = 201, description = "Created", body = ApiResponse<PlayerDto>),
        (status = 400, description = "Malformed JSON"),
        (status = 422, description = "Validation error or unknown club")
    )
)]
pub async fn create_player(
    State(state): State<PlayerHandlerState>,
    ValidatedJson(request): ValidatedJson<CreatePlayerRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<PlayerDto>>)> {
    let player = state.service.create(request.try_into()?).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(player.into()).with_message("Player created")),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/v1/players/{id}",
    tag = "Players",
    params(("id" = String, Path, description = "Player id")),
    request_body = UpdatePlayerRequest,
    responses(
        (status = 200, description = "Updated", body = ApiResponse<PlayerDto>),
        (status = 404, description = "Not found"),
        (status = 422, description = "Validation error or unknown club")
    )
)]
pub async fn update_player(
    State(state): State<PlayerHandlerState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdatePlayerRequest>,
) -> AppResult<Json<ApiResponse<PlayerDto>>> {
    let player = state.service.update(&id, request.try_into()?).await?;
    Ok(Json(
        ApiResponse::success(player.into()).with_message("Player updated"),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/players/{id}",
    tag = "Players",
    params(("id" = String, Path, description = "Player id")),
    responses(
        (status = 200, description = "Deleted", body = ApiResponse<String>),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_player(
    State(state): State<PlayerHandlerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.service.delete(&id).await?;
    Ok(Json(ApiResponse::message("Player deleted")))
}
