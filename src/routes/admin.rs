use axum::{
    Json, Router,
    body::Body,
    extract::{Path, Query, State},
    http::{HeaderMap, Request, StatusCode, header::IF_MATCH},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, patch, post, put},
};
use axum_valid::Valid;

use crate::{
    dao::models::{
        ActivityEntity, EntityId, LeagueDocument, MatchEntity, NewsEntity, RegistrationEntity,
        TeamEntity,
    },
    dto::admin::{
        ActionResponse, ActivitiesQuery, CreateMatchRequest, CreateNewsRequest, CreateTeamRequest,
        DeleteTeamResponse, DocumentResponse, GenerateRoundResponse, MinuteUpdateRequest,
        RenameTeamRequest, RescheduleMatchRequest, SaveResponse, ScoreUpdateRequest,
        SetStatRequest,
    },
    error::AppError,
    services::admin_service,
    state::SharedState,
};

const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Admin-only management endpoints.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/admin/document", get(get_document))
        .route("/admin/save", post(save_document))
        .route("/admin/teams", post(create_team))
        .route("/admin/teams/{name}", put(rename_team).delete(delete_team))
        .route("/admin/teams/{name}/stats", patch(set_stat))
        .route("/admin/teams/{name}/reset", post(reset_team))
        .route("/admin/standings/reset", post(reset_standings))
        .route("/admin/matches", post(create_match))
        .route(
            "/admin/matches/{id}",
            put(reschedule_match).delete(delete_match),
        )
        .route("/admin/matches/{id}/start", post(start_match))
        .route("/admin/matches/{id}/score", post(update_score))
        .route("/admin/matches/{id}/minute", post(update_minute))
        .route("/admin/matches/{id}/finish", post(finish_match))
        .route("/admin/matches/{id}/reopen", post(reopen_match))
        .route("/admin/rounds", post(generate_round))
        .route("/admin/registrations", get(list_registrations))
        .route(
            "/admin/registrations/{id}/approve",
            post(approve_registration),
        )
        .route("/admin/registrations/{id}/reject", post(reject_registration))
        .route("/admin/news", post(create_news))
        .route("/admin/news/{id}", delete(delete_news))
        .route("/admin/activities", get(list_activities))
        .route_layer(middleware::from_fn_with_state(state, require_admin_token))
}

/// Version token from an `If-Match` header, with ETag quotes removed.
fn if_match(headers: &HeaderMap) -> Option<String> {
    headers
        .get(IF_MATCH)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().trim_start_matches("W/").trim_matches('"'))
        .filter(|value| !value.is_empty() && *value != "*")
        .map(str::to_owned)
}

/// Return the full League Document and its version token.
#[utoipa::path(
    get,
    path = "/admin/document",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin password")),
    responses((status = 200, description = "Working copy", body = DocumentResponse))
)]
pub async fn get_document(
    State(state): State<SharedState>,
) -> Result<Json<DocumentResponse>, AppError> {
    Ok(Json(admin_service::get_document(&state).await?))
}

/// Replace the whole League Document.
///
/// With `If-Match` the write is refused when the stored document moved.
#[utoipa::path(
    post,
    path = "/admin/save",
    tag = "admin",
    params(
        ("X-Admin-Token" = String, Header, description = "Admin password"),
        ("If-Match" = Option<String>, Header, description = "Version returned by /admin/document")
    ),
    request_body = LeagueDocument,
    responses(
        (status = 200, description = "Document stored", body = SaveResponse),
        (status = 409, description = "Stored document changed since it was read")
    )
)]
pub async fn save_document(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(document): Json<LeagueDocument>,
) -> Result<Json<SaveResponse>, AppError> {
    let response = admin_service::save_document(&state, document, if_match(&headers)).await?;
    Ok(Json(response))
}

/// Add a team with zeroed counters.
#[utoipa::path(
    post,
    path = "/admin/teams",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin password")),
    request_body = CreateTeamRequest,
    responses(
        (status = 201, description = "Team created", body = TeamEntity),
        (status = 400, description = "Missing field or duplicate name")
    )
)]
pub async fn create_team(
    State(state): State<SharedState>,
    Valid(Json(request)): Valid<Json<CreateTeamRequest>>,
) -> Result<(StatusCode, Json<TeamEntity>), AppError> {
    let team = admin_service::create_team(&state, request).await?;
    Ok((StatusCode::CREATED, Json(team)))
}

/// Rename a team; its fixtures follow.
#[utoipa::path(
    put,
    path = "/admin/teams/{name}",
    tag = "admin",
    params(
        ("X-Admin-Token" = String, Header, description = "Admin password"),
        ("name" = String, Path, description = "Current team name")
    ),
    request_body = RenameTeamRequest,
    responses((status = 200, description = "Team renamed", body = TeamEntity))
)]
pub async fn rename_team(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    Valid(Json(request)): Valid<Json<RenameTeamRequest>>,
) -> Result<Json<TeamEntity>, AppError> {
    let team = admin_service::rename_team(&state, name, request.name).await?;
    Ok(Json(team))
}

/// Delete a team and every fixture it plays in.
#[utoipa::path(
    delete,
    path = "/admin/teams/{name}",
    tag = "admin",
    params(
        ("X-Admin-Token" = String, Header, description = "Admin password"),
        ("name" = String, Path, description = "Team name")
    ),
    responses((status = 200, description = "Team deleted", body = DeleteTeamResponse))
)]
pub async fn delete_team(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<DeleteTeamResponse>, AppError> {
    Ok(Json(admin_service::delete_team(&state, name).await?))
}

/// Override one counter of a team.
#[utoipa::path(
    patch,
    path = "/admin/teams/{name}/stats",
    tag = "admin",
    params(
        ("X-Admin-Token" = String, Header, description = "Admin password"),
        ("name" = String, Path, description = "Team name")
    ),
    request_body = SetStatRequest,
    responses((status = 200, description = "Updated team", body = TeamEntity))
)]
pub async fn set_stat(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    Json(request): Json<SetStatRequest>,
) -> Result<Json<TeamEntity>, AppError> {
    Ok(Json(admin_service::set_stat(&state, name, request).await?))
}

/// Zero every counter of a team.
#[utoipa::path(
    post,
    path = "/admin/teams/{name}/reset",
    tag = "admin",
    params(
        ("X-Admin-Token" = String, Header, description = "Admin password"),
        ("name" = String, Path, description = "Team name")
    ),
    responses((status = 200, description = "Team reset", body = TeamEntity))
)]
pub async fn reset_team(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<TeamEntity>, AppError> {
    Ok(Json(admin_service::reset_team(&state, name).await?))
}

/// Zero the counters of every team.
#[utoipa::path(
    post,
    path = "/admin/standings/reset",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin password")),
    responses((status = 200, description = "Standings reset", body = ActionResponse))
)]
pub async fn reset_standings(
    State(state): State<SharedState>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(admin_service::reset_standings(&state).await?))
}

/// Schedule a fixture between two existing teams.
#[utoipa::path(
    post,
    path = "/admin/matches",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin password")),
    request_body = CreateMatchRequest,
    responses(
        (status = 201, description = "Fixture scheduled", body = MatchEntity),
        (status = 400, description = "Unknown team or same team on both sides")
    )
)]
pub async fn create_match(
    State(state): State<SharedState>,
    Valid(Json(request)): Valid<Json<CreateMatchRequest>>,
) -> Result<(StatusCode, Json<MatchEntity>), AppError> {
    let fixture = admin_service::create_match(&state, request).await?;
    Ok((StatusCode::CREATED, Json(fixture)))
}

/// Move a fixture to another date or time.
#[utoipa::path(
    put,
    path = "/admin/matches/{id}",
    tag = "admin",
    params(
        ("X-Admin-Token" = String, Header, description = "Admin password"),
        ("id" = u64, Path, description = "Fixture id")
    ),
    request_body = RescheduleMatchRequest,
    responses((status = 200, description = "Fixture moved", body = MatchEntity))
)]
pub async fn reschedule_match(
    State(state): State<SharedState>,
    Path(id): Path<EntityId>,
    Valid(Json(request)): Valid<Json<RescheduleMatchRequest>>,
) -> Result<Json<MatchEntity>, AppError> {
    Ok(Json(admin_service::reschedule_match(&state, id, request).await?))
}

/// Delete a fixture; standings are not touched.
#[utoipa::path(
    delete,
    path = "/admin/matches/{id}",
    tag = "admin",
    params(
        ("X-Admin-Token" = String, Header, description = "Admin password"),
        ("id" = u64, Path, description = "Fixture id")
    ),
    responses((status = 200, description = "Fixture deleted", body = ActionResponse))
)]
pub async fn delete_match(
    State(state): State<SharedState>,
    Path(id): Path<EntityId>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(admin_service::delete_match(&state, id).await?))
}

/// Kick off a scheduled fixture.
#[utoipa::path(
    post,
    path = "/admin/matches/{id}/start",
    tag = "admin",
    params(
        ("X-Admin-Token" = String, Header, description = "Admin password"),
        ("id" = u64, Path, description = "Fixture id")
    ),
    responses(
        (status = 200, description = "Fixture live", body = MatchEntity),
        (status = 409, description = "Fixture is not scheduled")
    )
)]
pub async fn start_match(
    State(state): State<SharedState>,
    Path(id): Path<EntityId>,
) -> Result<Json<MatchEntity>, AppError> {
    Ok(Json(admin_service::start_match(&state, id).await?))
}

/// Add or remove goals on one side of a live fixture.
#[utoipa::path(
    post,
    path = "/admin/matches/{id}/score",
    tag = "admin",
    params(
        ("X-Admin-Token" = String, Header, description = "Admin password"),
        ("id" = u64, Path, description = "Fixture id")
    ),
    request_body = ScoreUpdateRequest,
    responses(
        (status = 200, description = "Score updated", body = MatchEntity),
        (status = 409, description = "Fixture is not live")
    )
)]
pub async fn update_score(
    State(state): State<SharedState>,
    Path(id): Path<EntityId>,
    Json(request): Json<ScoreUpdateRequest>,
) -> Result<Json<MatchEntity>, AppError> {
    Ok(Json(admin_service::update_score(&state, id, request).await?))
}

/// Set the clock of a live fixture.
#[utoipa::path(
    post,
    path = "/admin/matches/{id}/minute",
    tag = "admin",
    params(
        ("X-Admin-Token" = String, Header, description = "Admin password"),
        ("id" = u64, Path, description = "Fixture id")
    ),
    request_body = MinuteUpdateRequest,
    responses(
        (status = 200, description = "Minute updated", body = MatchEntity),
        (status = 409, description = "Fixture is not live")
    )
)]
pub async fn update_minute(
    State(state): State<SharedState>,
    Path(id): Path<EntityId>,
    Json(request): Json<MinuteUpdateRequest>,
) -> Result<Json<MatchEntity>, AppError> {
    Ok(Json(admin_service::update_minute(&state, id, request).await?))
}

/// Finish a live fixture and apply the result to the standings.
#[utoipa::path(
    post,
    path = "/admin/matches/{id}/finish",
    tag = "admin",
    params(
        ("X-Admin-Token" = String, Header, description = "Admin password"),
        ("id" = u64, Path, description = "Fixture id")
    ),
    responses(
        (status = 200, description = "Fixture finished", body = MatchEntity),
        (status = 409, description = "Fixture is not live")
    )
)]
pub async fn finish_match(
    State(state): State<SharedState>,
    Path(id): Path<EntityId>,
) -> Result<Json<MatchEntity>, AppError> {
    Ok(Json(admin_service::finish_match(&state, id).await?))
}

/// Reopen a finished fixture and withdraw its result.
#[utoipa::path(
    post,
    path = "/admin/matches/{id}/reopen",
    tag = "admin",
    params(
        ("X-Admin-Token" = String, Header, description = "Admin password"),
        ("id" = u64, Path, description = "Fixture id")
    ),
    responses(
        (status = 200, description = "Fixture scheduled again", body = MatchEntity),
        (status = 409, description = "Fixture is not finished")
    )
)]
pub async fn reopen_match(
    State(state): State<SharedState>,
    Path(id): Path<EntityId>,
) -> Result<Json<MatchEntity>, AppError> {
    Ok(Json(admin_service::reopen_match(&state, id).await?))
}

/// Draw a new round pairing every team at random.
#[utoipa::path(
    post,
    path = "/admin/rounds",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin password")),
    responses(
        (status = 201, description = "Round generated", body = GenerateRoundResponse),
        (status = 400, description = "Fewer than two teams")
    )
)]
pub async fn generate_round(
    State(state): State<SharedState>,
) -> Result<(StatusCode, Json<GenerateRoundResponse>), AppError> {
    let response = admin_service::generate_round(&state).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// List pending team applications.
#[utoipa::path(
    get,
    path = "/admin/registrations",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin password")),
    responses((status = 200, description = "Pending applications", body = [RegistrationEntity]))
)]
pub async fn list_registrations(
    State(state): State<SharedState>,
) -> Result<Json<Vec<RegistrationEntity>>, AppError> {
    Ok(Json(admin_service::list_registrations(&state).await?))
}

/// Accept an application; the team joins the standings.
#[utoipa::path(
    post,
    path = "/admin/registrations/{id}/approve",
    tag = "admin",
    params(
        ("X-Admin-Token" = String, Header, description = "Admin password"),
        ("id" = u64, Path, description = "Registration id")
    ),
    responses(
        (status = 200, description = "Team created", body = TeamEntity),
        (status = 400, description = "Team name taken meanwhile"),
        (status = 503, description = "Not saved; approval rolled back")
    )
)]
pub async fn approve_registration(
    State(state): State<SharedState>,
    Path(id): Path<EntityId>,
) -> Result<Json<TeamEntity>, AppError> {
    Ok(Json(admin_service::approve_registration(&state, id).await?))
}

/// Drop an application.
#[utoipa::path(
    post,
    path = "/admin/registrations/{id}/reject",
    tag = "admin",
    params(
        ("X-Admin-Token" = String, Header, description = "Admin password"),
        ("id" = u64, Path, description = "Registration id")
    ),
    responses((status = 200, description = "Application rejected", body = ActionResponse))
)]
pub async fn reject_registration(
    State(state): State<SharedState>,
    Path(id): Path<EntityId>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(admin_service::reject_registration(&state, id).await?))
}

/// Publish a news item.
#[utoipa::path(
    post,
    path = "/admin/news",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin password")),
    request_body = CreateNewsRequest,
    responses((status = 201, description = "News published", body = NewsEntity))
)]
pub async fn create_news(
    State(state): State<SharedState>,
    Valid(Json(request)): Valid<Json<CreateNewsRequest>>,
) -> Result<(StatusCode, Json<NewsEntity>), AppError> {
    let news = admin_service::create_news(&state, request).await?;
    Ok((StatusCode::CREATED, Json(news)))
}

/// Remove a news item.
#[utoipa::path(
    delete,
    path = "/admin/news/{id}",
    tag = "admin",
    params(
        ("X-Admin-Token" = String, Header, description = "Admin password"),
        ("id" = u64, Path, description = "News id")
    ),
    responses((status = 200, description = "News deleted", body = ActionResponse))
)]
pub async fn delete_news(
    State(state): State<SharedState>,
    Path(id): Path<EntityId>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(admin_service::delete_news(&state, id).await?))
}

/// Recent admin activity, newest first.
#[utoipa::path(
    get,
    path = "/admin/activities",
    tag = "admin",
    params(
        ("X-Admin-Token" = String, Header, description = "Admin password"),
        ActivitiesQuery
    ),
    responses((status = 200, description = "Activity log", body = [ActivityEntity]))
)]
pub async fn list_activities(
    State(state): State<SharedState>,
    Query(query): Query<ActivitiesQuery>,
) -> Result<Json<Vec<ActivityEntity>>, AppError> {
    Ok(Json(
        admin_service::list_activities(&state, query.limit).await?,
    ))
}

async fn require_admin_token(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let provided = req
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            AppError::Unauthorized("missing admin token header `X-Admin-Token`".into())
        })?;

    if provided != state.config().admin_password {
        return Err(AppError::Unauthorized("invalid admin token".into()));
    }

    Ok(next.run(req).await)
}
