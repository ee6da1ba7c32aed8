//! Read-only projections of the league for the public site, plus the two
//! public write paths (registration and team-owner login).

use tracing::info;

use crate::{
    dao::models::{MatchStatusEntity, NewsEntity},
    dto::{
        public::{
            LeagueInfoView, MatchView, PublicLeagueView, RegistrationRequest,
            RegistrationResponse, StandingRow, status_entity,
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

fn standings(league: &League) -> Vec<StandingRow> {
    league
        .sorted_standings()
        .into_iter()
        .enumerate()
        .map(|(index, team)| StandingRow::new(index + 1, team))
        .collect()
}

fn matches(league: &League, status: Option<MatchStatusEntity>) -> Vec<MatchView> {
    league
        .matches
        .iter()
        .filter(|fixture| status.is_none_or(|wanted| status_entity(fixture.status()) == wanted))
        .map(MatchView::from)
        .collect()
}

/// Everything the public home page renders.
pub async fn get_league(state: &SharedState) -> Result<PublicLeagueView, ServiceError> {
    let news_limit = state.config().public_news_limit;
    state
        .read_league(|league| PublicLeagueView {
            league: LeagueInfoView::from(&league.info),
            standings: standings(league),
            matches: matches(league, None),
            news: league.latest_news(news_limit).to_vec(),
        })
        .await
}

/// Standings ordered by points then goal difference.
pub async fn get_standings(state: &SharedState) -> Result<Vec<StandingRow>, ServiceError> {
    state.read_league(standings).await
}

/// Fixtures, optionally restricted to one status.
pub async fn get_matches(
    state: &SharedState,
    status: Option<MatchStatusEntity>,
) -> Result<Vec<MatchView>, ServiceError> {
    state.read_league(|league| matches(league, status)).await
}

/// Latest news, newest first.
pub async fn get_news(
    state: &SharedState,
    limit: Option<usize>,
) -> Result<Vec<NewsEntity>, ServiceError> {
    let limit = limit.unwrap_or(state.config().public_news_limit);
    state
        .read_league(|league| league.latest_news(limit).to_vec())
        .await
}

/// Queue a team application.
///
/// When the save fails the application stays queued in memory and is written
/// by the next auto-save; the error is still reported to the caller.
pub async fn register(
    state: &SharedState,
    request: RegistrationRequest,
) -> Result<RegistrationResponse, ServiceError> {
    let (registration, generation) = state
        .mutate(|league| league.submit_registration(request.into()))
        .await?;
    sse_events::broadcast_league_updated(state, LeagueSection::Registrations, generation);
    info!(team = %registration.team, "registration submitted");
    Ok(RegistrationResponse {
        success: true,
        id: registration.id,
    })
}

/// Standings row of the team owned by `owner`.
pub async fn login(
    state: &SharedState,
    team: String,
    owner: String,
) -> Result<StandingRow, ServiceError> {
    let row = state
        .read_league(|league| {
            let found = league.login(&team, &owner)?;
            let position = league
                .sorted_standings()
                .iter()
                .position(|candidate| candidate.name == found.name)
                .map_or(0, |index| index + 1);
            Ok::<_, LeagueError>(StandingRow::new(position, found))
        })
        .await??;
    Ok(row)
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use serde_json::json;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{league_store::memory::MemoryLeagueStore, models::LeagueDocument},
        state::{
            AppState,
            match_lifecycle::NewMatch,
            standings::{NewTeam, StatField},
        },
    };

    async fn state_with(teams: &[(&str, &str, u32)]) -> SharedState {
        let state = AppState::new(AppConfig {
            save_cooldown: Duration::ZERO,
            ..AppConfig::default()
        });
        state
            .install_league_store(Arc::new(MemoryLeagueStore::with_document(
                LeagueDocument::default(),
            )))
            .await;
        state
            .install_league(LeagueDocument::default(), Some("1".into()))
            .await;
        for (name, owner, wins) in teams {
            let (name, owner, wins) = (name.to_string(), owner.to_string(), *wins);
            state
                .mutate(move |league| {
                    league.add_team(NewTeam {
                        name: name.clone(),
                        owner,
                        email: None,
                        phone: None,
                    })?;
                    league.set_stat(&name, StatField::Wins, wins)
                })
                .await
                .unwrap();
        }
        state
    }

    #[tokio::test]
    async fn standings_are_ranked() {
        let state = state_with(&[("Owls", "Ann", 1), ("Hawks", "Bo", 3)]).await;

        let rows = get_standings(&state).await.unwrap();

        assert_eq!(rows[0].team, "Hawks");
        assert_eq!(rows[0].position, 1);
        assert_eq!(rows[1].points, 3);
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let state = state_with(&[("Owls", "Ann", 0)]).await;
        let request: RegistrationRequest =
            serde_json::from_value(json!({"team": "OWLS", "owner": "Zed"})).unwrap();

        let err = register(&state, request).await.unwrap_err();

        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn login_matches_team_and_owner() {
        let state = state_with(&[("Owls", "Ann", 0), ("Hawks", "Bo", 2)]).await;

        let row = login(&state, "owls".into(), "ANN".into()).await.unwrap();
        assert_eq!(row.team, "Owls");
        assert_eq!(row.position, 2);

        let err = login(&state, "Owls".into(), "Bo".into()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn login_ignores_cyrillic_case() {
        let state = state_with(&[("Спартак", "Иван", 1)]).await;

        let row = login(&state, "СПАРТАК".into(), "иван".into())
            .await
            .unwrap();

        assert_eq!(row.team, "Спартак");
        assert_eq!(row.position, 1);
    }

    #[tokio::test]
    async fn public_view_hides_registrations() {
        let state = state_with(&[]).await;
        let request: RegistrationRequest =
            serde_json::from_value(json!({"team": "Eagles", "owner": "Eve"})).unwrap();
        register(&state, request).await.unwrap();

        let view = serde_json::to_value(get_league(&state).await.unwrap()).unwrap();

        assert!(view.get("pendingRegistrations").is_none());
        assert!(view.get("activities").is_none());
        assert_eq!(view["standings"], json!([]));
    }

    #[tokio::test]
    async fn matches_filter_by_status() {
        let state = state_with(&[("Owls", "Ann", 0), ("Hawks", "Bo", 0)]).await;
        state
            .mutate(|league| {
                let fixture = league.create_match(NewMatch {
                    home_team: "Owls".into(),
                    away_team: "Hawks".into(),
                    date: "2026-05-02".into(),
                    time: None,
                    round: None,
                })?;
                league.start_match(fixture.id)
            })
            .await
            .unwrap();

        let live = get_matches(&state, Some(MatchStatusEntity::Live)).await.unwrap();
        let scheduled = get_matches(&state, Some(MatchStatusEntity::Scheduled))
            .await
            .unwrap();

        assert_eq!(live.len(), 1);
        assert_eq!(live[0].minute, Some(1));
        assert!(scheduled.is_empty());
    }
}
