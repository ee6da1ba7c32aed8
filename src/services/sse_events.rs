use serde::Serialize;
use tracing::warn;

use crate::{
    dto::sse::{LeagueSection, LeagueUpdatedEvent, LiveScoreEvent, ServerEvent, SystemStatus},
    state::{
        SharedState,
        match_lifecycle::{Match, MatchState},
    },
};

const EVENT_LEAGUE_UPDATED: &str = "league.updated";
const EVENT_LIVE_SCORE: &str = "match.live";
const EVENT_SYSTEM_STATUS: &str = "system.status";

/// Tell subscribers which part of the league changed so they refetch it.
pub fn broadcast_league_updated(state: &SharedState, section: LeagueSection, generation: u64) {
    let payload = LeagueUpdatedEvent {
        section,
        generation,
    };
    send_public_event(state, EVENT_LEAGUE_UPDATED, &payload);
}

/// Push the score and minute of a live fixture.
pub fn broadcast_live_score(state: &SharedState, fixture: &Match) {
    let (score, minute) = match fixture.state {
        MatchState::Live { score, minute } => (score, Some(minute)),
        _ => (fixture.state.score(), None),
    };
    let payload = LiveScoreEvent {
        match_id: fixture.id,
        home_score: score.home,
        away_score: score.away,
        minute,
    };
    send_public_event(state, EVENT_LIVE_SCORE, &payload);
}

/// Announce entering or leaving degraded mode.
pub fn broadcast_system_status(state: &SharedState, degraded: bool) {
    send_public_event(state, EVENT_SYSTEM_STATUS, &SystemStatus { degraded });
}

fn send_public_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.public_sse().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize public SSE payload"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        state::{AppState, match_lifecycle::Score},
    };

    #[tokio::test]
    async fn live_score_carries_minute() {
        let state = AppState::new(AppConfig::default());
        let mut receiver = state.public_sse().subscribe();
        let fixture = Match {
            id: 7,
            home_team: "Owls".into(),
            away_team: "Hawks".into(),
            date: "2026-03-01".into(),
            time: None,
            round: None,
            state: MatchState::Live {
                score: Score { home: 2, away: 1 },
                minute: 64,
            },
        };

        broadcast_live_score(&state, &fixture);

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.event.as_deref(), Some(EVENT_LIVE_SCORE));
        let data: serde_json::Value = serde_json::from_str(&event.data).unwrap();
        assert_eq!(data["matchId"], 7);
        assert_eq!(data["homeScore"], 2);
        assert_eq!(data["minute"], 64);
    }

    #[tokio::test]
    async fn league_updates_name_the_section() {
        let state = AppState::new(AppConfig::default());
        let mut receiver = state.public_sse().subscribe();

        broadcast_league_updated(&state, LeagueSection::Standings, 4);

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.data, r#"{"section":"standings","generation":4}"#);
    }
}
