//! Business logic behind the admin REST routes. Every mutation runs against
//! the working copy, is persisted, and is announced on the public stream.

use time::OffsetDateTime;
use tracing::{info, warn};

use crate::{
    dao::models::{
        ActivityEntity, EntityId, LeagueDocument, MatchEntity, NewsEntity, RegistrationEntity,
        TeamEntity,
    },
    dto::{
        admin::{
            ActionResponse, CreateMatchRequest, CreateNewsRequest, CreateTeamRequest,
            DeleteTeamResponse, DocumentResponse, GenerateRoundResponse, MinuteUpdateRequest,
            RescheduleMatchRequest, SaveResponse, ScoreUpdateRequest, SetStatRequest,
        },
        sse::LeagueSection,
    },
    error::ServiceError,
    services::sse_events,
    state::{
        SharedState,
        league::{League, LeagueError},
    },
};

/// Apply, persist and announce a mutation.
async fn commit<T>(
    state: &SharedState,
    sections: &[LeagueSection],
    mutate: impl FnOnce(&mut League) -> Result<T, LeagueError>,
) -> Result<T, ServiceError> {
    let (output, generation) = state.mutate(mutate).await?;
    for section in sections {
        sse_events::broadcast_league_updated(state, *section, generation);
    }
    Ok(output)
}

const STANDINGS: &[LeagueSection] = &[LeagueSection::Standings];
const MATCHES: &[LeagueSection] = &[LeagueSection::Matches];
/// Results move both the fixture list and the table.
const RESULTS: &[LeagueSection] = &[LeagueSection::Matches, LeagueSection::Standings];

// ---------------------------------------------------------------------------
// Whole document
// ---------------------------------------------------------------------------

/// Full working copy with its version token.
pub async fn get_document(state: &SharedState) -> Result<DocumentResponse, ServiceError> {
    let (document, version) = state.snapshot().await?;
    Ok(DocumentResponse { version, document })
}

/// Replace the whole document, rejecting the write if `if_match` is stale.
pub async fn save_document(
    state: &SharedState,
    document: LeagueDocument,
    if_match: Option<String>,
) -> Result<SaveResponse, ServiceError> {
    let (version, generation) = state.replace_league(document, if_match).await?;
    sse_events::broadcast_league_updated(state, LeagueSection::Document, generation);
    Ok(SaveResponse {
        success: true,
        version,
    })
}

// ---------------------------------------------------------------------------
// Teams and standings
// ---------------------------------------------------------------------------

pub async fn create_team(
    state: &SharedState,
    request: CreateTeamRequest,
) -> Result<TeamEntity, ServiceError> {
    let team = commit(state, STANDINGS, |league| {
        league.add_team(request.into())
    })
    .await?;
    info!(team = %team.name, "team created");
    Ok(team.into())
}

pub async fn rename_team(
    state: &SharedState,
    current: String,
    new_name: String,
) -> Result<TeamEntity, ServiceError> {
    let team = commit(state, STANDINGS, |league| {
        league.rename_team(&current, &new_name)
    })
    .await?;
    Ok(team.into())
}

/// Delete a team together with every fixture it plays in.
pub async fn delete_team(
    state: &SharedState,
    name: String,
) -> Result<DeleteTeamResponse, ServiceError> {
    let (team, removed_matches) = commit(state, STANDINGS, |league| {
        league.delete_team(&name)
    })
    .await?;
    info!(team = %team.name, removed_matches, "team deleted");
    Ok(DeleteTeamResponse {
        team: team.into(),
        removed_matches,
    })
}

pub async fn set_stat(
    state: &SharedState,
    name: String,
    request: SetStatRequest,
) -> Result<TeamEntity, ServiceError> {
    let team = commit(state, STANDINGS, |league| {
        league.set_stat(&name, request.field.into(), request.value)
    })
    .await?;
    Ok(team.into())
}

pub async fn reset_team(state: &SharedState, name: String) -> Result<TeamEntity, ServiceError> {
    let team = commit(state, STANDINGS, |league| {
        league.reset_team_stats(&name)
    })
    .await?;
    Ok(team.into())
}

pub async fn reset_standings(state: &SharedState) -> Result<ActionResponse, ServiceError> {
    let count = commit(state, STANDINGS, |league| {
        Ok(league.reset_all_stats())
    })
    .await?;
    Ok(ActionResponse::new(format!("{count} teams reset")))
}

// ---------------------------------------------------------------------------
// Matches
// ---------------------------------------------------------------------------

pub async fn create_match(
    state: &SharedState,
    request: CreateMatchRequest,
) -> Result<MatchEntity, ServiceError> {
    let fixture = commit(state, MATCHES, |league| league.create_match(request.into())).await?;
    Ok(fixture.into())
}

pub async fn reschedule_match(
    state: &SharedState,
    id: EntityId,
    request: RescheduleMatchRequest,
) -> Result<MatchEntity, ServiceError> {
    let fixture = commit(state, MATCHES, |league| {
        league.reschedule_match(id, &request.date, request.time)
    })
    .await?;
    Ok(fixture.into())
}

/// Remove a fixture; standings keep any result it produced.
pub async fn delete_match(
    state: &SharedState,
    id: EntityId,
) -> Result<ActionResponse, ServiceError> {
    let fixture = commit(state, MATCHES, |league| league.delete_match(id)).await?;
    Ok(ActionResponse::new(format!(
        "match {} vs {} deleted",
        fixture.home_team, fixture.away_team
    )))
}

pub async fn start_match(state: &SharedState, id: EntityId) -> Result<MatchEntity, ServiceError> {
    let fixture = commit(state, MATCHES, |league| league.start_match(id)).await?;
    sse_events::broadcast_live_score(state, &fixture);
    Ok(fixture.into())
}

pub async fn update_score(
    state: &SharedState,
    id: EntityId,
    request: ScoreUpdateRequest,
) -> Result<MatchEntity, ServiceError> {
    let fixture = commit(state, MATCHES, |league| {
        league.update_score(id, request.side.into(), request.delta)
    })
    .await?;
    sse_events::broadcast_live_score(state, &fixture);
    Ok(fixture.into())
}

pub async fn update_minute(
    state: &SharedState,
    id: EntityId,
    request: MinuteUpdateRequest,
) -> Result<MatchEntity, ServiceError> {
    let minute = request.minute.resolve();
    let fixture = commit(state, MATCHES, |league| {
        league.update_minute(id, minute)
    })
    .await?;
    sse_events::broadcast_live_score(state, &fixture);
    Ok(fixture.into())
}

/// Close a live fixture and credit the result to the standings.
pub async fn finish_match(state: &SharedState, id: EntityId) -> Result<MatchEntity, ServiceError> {
    let fixture = commit(state, RESULTS, |league| league.finish_match(id)).await?;
    Ok(fixture.into())
}

/// Reopen a finished fixture, withdrawing its result from the standings.
pub async fn reopen_match(state: &SharedState, id: EntityId) -> Result<MatchEntity, ServiceError> {
    let fixture = commit(state, RESULTS, |league| league.reopen_match(id)).await?;
    Ok(fixture.into())
}

/// Draw a new round between every team, dated a configured number of days ahead.
pub async fn generate_round(state: &SharedState) -> Result<GenerateRoundResponse, ServiceError> {
    let days = i64::from(state.config().round_interval_days);
    let scheduled_for = OffsetDateTime::now_utc()
        .date()
        .saturating_add(time::Duration::days(days));

    let fixtures = commit(state, MATCHES, |league| {
        league.generate_round(&mut rand::rng(), scheduled_for)
    })
    .await?;

    let round = fixtures
        .first()
        .and_then(|fixture| fixture.round)
        .unwrap_or_default();
    info!(round, matches = fixtures.len(), "round generated");
    Ok(GenerateRoundResponse {
        round,
        matches: fixtures.into_iter().map(Into::into).collect(),
    })
}

// ---------------------------------------------------------------------------
// Registrations
// ---------------------------------------------------------------------------

pub async fn list_registrations(
    state: &SharedState,
) -> Result<Vec<RegistrationEntity>, ServiceError> {
    state
        .read_league(|league| league.registrations.clone())
        .await
}

/// Turn a queued application into a team.
///
/// If the document cannot be persisted the approval is undone in memory and
/// the storage error is returned.
pub async fn approve_registration(
    state: &SharedState,
    id: EntityId,
) -> Result<TeamEntity, ServiceError> {
    state.require_league_store().await?;
    let (approval, generation) = state
        .apply_mutation(|league| league.approve_registration(id))
        .await?;
    let team = approval.team.clone();

    if let Err(err) = state.persist_generation(generation).await {
        warn!(team = %team.name, error = %err, "approval not persisted; rolling back");
        state
            .apply_mutation(|league| {
                league.revert_approval(approval);
                Ok(())
            })
            .await?;
        return Err(err);
    }

    sse_events::broadcast_league_updated(state, LeagueSection::Registrations, generation);
    sse_events::broadcast_league_updated(state, LeagueSection::Standings, generation);
    info!(team = %team.name, "registration approved");
    Ok(team.into())
}

pub async fn reject_registration(
    state: &SharedState,
    id: EntityId,
) -> Result<ActionResponse, ServiceError> {
    let registration = commit(state, &[LeagueSection::Registrations], |league| {
        league.reject_registration(id)
    })
    .await?;
    Ok(ActionResponse::new(format!(
        "registration of {} rejected",
        registration.team
    )))
}

// ---------------------------------------------------------------------------
// News and activity log
// ---------------------------------------------------------------------------

pub async fn create_news(
    state: &SharedState,
    request: CreateNewsRequest,
) -> Result<NewsEntity, ServiceError> {
    commit(state, &[LeagueSection::News], |league| league.add_news(request.into())).await
}

pub async fn delete_news(
    state: &SharedState,
    id: EntityId,
) -> Result<ActionResponse, ServiceError> {
    let news = commit(state, &[LeagueSection::News], |league| league.delete_news(id)).await?;
    Ok(ActionResponse::new(format!("news `{}` deleted", news.title)))
}

/// Most recent activities, newest first.
pub async fn list_activities(
    state: &SharedState,
    limit: Option<usize>,
) -> Result<Vec<ActivityEntity>, ServiceError> {
    let limit = limit.unwrap_or(state.config().activity_log_limit);
    state
        .read_league(|league| league.recent_activities(limit).to_vec())
        .await
}
