use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dao::models::NewsEntity,
    dto::public::{
        LoginRequest, MatchView, MatchesQuery, NewsQuery, PublicLeagueView, RegistrationRequest,
        RegistrationResponse, StandingRow,
    },
    error::AppError,
    services::public_service,
    state::SharedState,
};

/// Public endpoints backing the league website.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/data", get(get_data))
        .route("/api/standings", get(get_standings))
        .route("/api/matches", get(get_matches))
        .route("/api/news", get(get_news))
        .route("/api/register", post(register))
        .route("/api/login", post(login))
}

#[utoipa::path(
    get,
    path = "/api/data",
    tag = "public",
    responses(
        (status = 200, description = "League overview", body = PublicLeagueView),
        (status = 503, description = "League not loaded yet")
    )
)]
/// Return league info, ranked standings, fixtures and the latest news.
pub async fn get_data(
    State(state): State<SharedState>,
) -> Result<Json<PublicLeagueView>, AppError> {
    Ok(Json(public_service::get_league(&state).await?))
}

#[utoipa::path(
    get,
    path = "/api/standings",
    tag = "public",
    responses((status = 200, description = "Ranked standings", body = [StandingRow]))
)]
/// Return the standings ordered by points then goal difference.
pub async fn get_standings(
    State(state): State<SharedState>,
) -> Result<Json<Vec<StandingRow>>, AppError> {
    Ok(Json(public_service::get_standings(&state).await?))
}

#[utoipa::path(
    get,
    path = "/api/matches",
    tag = "public",
    params(MatchesQuery),
    responses((status = 200, description = "Fixtures", body = [MatchView]))
)]
/// Return every fixture, or only those with the requested status.
pub async fn get_matches(
    State(state): State<SharedState>,
    Query(query): Query<MatchesQuery>,
) -> Result<Json<Vec<MatchView>>, AppError> {
    Ok(Json(public_service::get_matches(&state, query.status).await?))
}

#[utoipa::path(
    get,
    path = "/api/news",
    tag = "public",
    params(NewsQuery),
    responses((status = 200, description = "Latest news", body = [NewsEntity]))
)]
/// Return the latest news items.
pub async fn get_news(
    State(state): State<SharedState>,
    Query(query): Query<NewsQuery>,
) -> Result<Json<Vec<NewsEntity>>, AppError> {
    Ok(Json(public_service::get_news(&state, query.limit).await?))
}

#[utoipa::path(
    post,
    path = "/api/register",
    tag = "public",
    request_body = RegistrationRequest,
    responses(
        (status = 201, description = "Application queued", body = RegistrationResponse),
        (status = 400, description = "Missing field or name already taken"),
        (status = 503, description = "Application kept but not yet saved")
    )
)]
/// Submit a team application for admin approval.
pub async fn register(
    State(state): State<SharedState>,
    Valid(Json(request)): Valid<Json<RegistrationRequest>>,
) -> Result<(StatusCode, Json<RegistrationResponse>), AppError> {
    let response = public_service::register(&state, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/login",
    tag = "public",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Standings row of the team", body = StandingRow),
        (status = 404, description = "No team with that owner")
    )
)]
/// Look up a team by name and owner.
pub async fn login(
    State(state): State<SharedState>,
    Valid(Json(request)): Valid<Json<LoginRequest>>,
) -> Result<Json<StandingRow>, AppError> {
    let row = public_service::login(&state, request.team, request.owner).await?;
    Ok(Json(row))
}
