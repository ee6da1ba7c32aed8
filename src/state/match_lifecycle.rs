//! Match Lifecycle: per-fixture state machine driving the Standings Ledger.
//!
//! ```text
//! scheduled --start--> live --finish--> finished
//!     ^                                    |
//!     +---------------reopen---------------+
//! ```
//!
//! `finish` applies the result to both teams exactly once and keeps the
//! counters they had right before, so `reopen` can restore them verbatim.

use std::fmt;

use thiserror::Error;
use tracing::warn;

use crate::dao::models::{
    ActivityKind, AppliedResultEntity, EntityId, MatchEntity, MatchStatusEntity,
};
use crate::state::league::{ADMIN_ACTOR, League, LeagueError, optional, required};

/// Coarse status of a fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    Scheduled,
    Live,
    Finished,
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::Live => "live",
            MatchStatus::Finished => "finished",
        })
    }
}

/// Events accepted by the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchEvent {
    Start,
    UpdateScore,
    UpdateMinute,
    Finish,
    Reopen,
}

/// Error returned when an event does not apply to the fixture's status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied to match {match_id} while {from}")]
pub struct InvalidTransition {
    pub match_id: EntityId,
    /// Status the fixture was in.
    pub from: MatchStatus,
    /// Rejected event.
    pub event: MatchEvent,
}

/// Home and away goals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

/// Result applied to the standings when the fixture finished.
pub type AppliedResult = AppliedResultEntity;

/// Status together with the data only meaningful in that status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchState {
    Scheduled,
    Live {
        score: Score,
        minute: u32,
    },
    Finished {
        score: Score,
        /// `None` for fixtures finished by clients that did not record it.
        applied: Option<AppliedResult>,
    },
}

impl MatchState {
    pub fn status(&self) -> MatchStatus {
        match self {
            MatchState::Scheduled => MatchStatus::Scheduled,
            MatchState::Live { .. } => MatchStatus::Live,
            MatchState::Finished { .. } => MatchStatus::Finished,
        }
    }

    /// Current score, 0-0 while scheduled.
    pub fn score(&self) -> Score {
        match self {
            MatchState::Scheduled => Score::default(),
            MatchState::Live { score, .. } | MatchState::Finished { score, .. } => *score,
        }
    }
}

/// Side of a fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Home,
    Away,
}

/// Runtime representation of a fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub id: EntityId,
    pub home_team: String,
    pub away_team: String,
    /// Calendar date (`YYYY-MM-DD`).
    pub date: String,
    pub time: Option<String>,
    pub round: Option<u32>,
    pub state: MatchState,
}

impl Match {
    pub fn status(&self) -> MatchStatus {
        self.state.status()
    }

    fn transition_error(&self, event: MatchEvent) -> LeagueError {
        InvalidTransition {
            match_id: self.id,
            from: self.status(),
            event,
        }
        .into()
    }

    fn title(&self) -> String {
        format!("{} vs {}", self.home_team, self.away_team)
    }
}

impl From<MatchEntity> for Match {
    fn from(value: MatchEntity) -> Self {
        let score = Score {
            home: value.home_score,
            away: value.away_score,
        };
        let state = match value.status {
            MatchStatusEntity::Scheduled => MatchState::Scheduled,
            MatchStatusEntity::Live => MatchState::Live {
                score,
                minute: value.minute.unwrap_or(1).max(1),
            },
            MatchStatusEntity::Finished => MatchState::Finished {
                score,
                applied: value.applied,
            },
        };

        Self {
            id: value.id,
            home_team: value.home_team,
            away_team: value.away_team,
            date: value.date,
            time: value.time,
            round: value.round,
            state,
        }
    }
}

impl From<Match> for MatchEntity {
    fn from(value: Match) -> Self {
        let score = value.state.score();
        let (status, minute, applied) = match value.state {
            MatchState::Scheduled => (MatchStatusEntity::Scheduled, None, None),
            MatchState::Live { minute, .. } => (MatchStatusEntity::Live, Some(minute), None),
            MatchState::Finished { applied, .. } => (MatchStatusEntity::Finished, None, applied),
        };

        Self {
            id: value.id,
            home_team: value.home_team,
            away_team: value.away_team,
            date: value.date,
            time: value.time,
            round: value.round,
            status,
            home_score: score.home,
            away_score: score.away,
            minute,
            applied,
        }
    }
}

/// Input accepted by [`League::create_match`].
#[derive(Debug, Clone)]
pub struct NewMatch {
    pub home_team: String,
    pub away_team: String,
    pub date: String,
    pub time: Option<String>,
    pub round: Option<u32>,
}

/// Parse a match minute, falling back to 1 for garbage or values below 1.
pub fn parse_minute(raw: &str) -> u32 {
    match raw.trim().parse::<i64>() {
        Ok(minute) => clamp_minute(minute),
        Err(_) => 1,
    }
}

/// Clamp a numeric minute into `1..=u32::MAX`.
pub fn clamp_minute(minute: i64) -> u32 {
    if minute < 1 {
        1
    } else {
        u32::try_from(minute).unwrap_or(u32::MAX)
    }
}

impl League {
    fn match_index(&self, id: EntityId) -> Result<usize, LeagueError> {
        self.matches
            .iter()
            .position(|fixture| fixture.id == id)
            .ok_or_else(|| LeagueError::not_found("match", id))
    }

    /// Fixture by id.
    pub fn fixture(&self, id: EntityId) -> Option<&Match> {
        self.matches.iter().find(|fixture| fixture.id == id)
    }

    /// Schedule a new fixture between two existing teams.
    pub fn create_match(&mut self, new_match: NewMatch) -> Result<Match, LeagueError> {
        let home = required(&new_match.home_team, "home team")?;
        let away = required(&new_match.away_team, "away team")?;
        let date = required(&new_match.date, "match date")?;

        let home_index = self
            .team_index(&home)
            .ok_or_else(|| LeagueError::validation(format!("unknown team `{home}`")))?;
        let away_index = self
            .team_index(&away)
            .ok_or_else(|| LeagueError::validation(format!("unknown team `{away}`")))?;
        if home_index == away_index {
            return Err(LeagueError::validation(
                "home and away teams must be different",
            ));
        }

        let fixture = Match {
            id: self.next_id(),
            home_team: self.teams[home_index].name.clone(),
            away_team: self.teams[away_index].name.clone(),
            date,
            time: optional(new_match.time),
            round: new_match.round,
            state: MatchState::Scheduled,
        };
        self.matches.push(fixture.clone());
        self.record(
            ActivityKind::Match,
            format!("Match scheduled: {} on {}", fixture.title(), fixture.date),
            ADMIN_ACTOR,
        );
        Ok(fixture)
    }

    /// Move a fixture to another date, and time when given.
    pub fn reschedule_match(
        &mut self,
        id: EntityId,
        date: &str,
        time: Option<String>,
    ) -> Result<Match, LeagueError> {
        let index = self.match_index(id)?;
        let date = required(date, "match date")?;

        let fixture = &mut self.matches[index];
        fixture.date = date;
        if let Some(time) = optional(time) {
            fixture.time = Some(time);
        }

        let fixture = fixture.clone();
        self.record(
            ActivityKind::Match,
            format!("Match rescheduled: {} on {}", fixture.title(), fixture.date),
            ADMIN_ACTOR,
        );
        Ok(fixture)
    }

    /// Remove a fixture. Standings are left untouched even if it finished.
    pub fn delete_match(&mut self, id: EntityId) -> Result<Match, LeagueError> {
        let index = self.match_index(id)?;
        let fixture = self.matches.remove(index);
        self.record(
            ActivityKind::Match,
            format!("Match deleted: {}", fixture.title()),
            ADMIN_ACTOR,
        );
        Ok(fixture)
    }

    /// `scheduled -> live`, kicking off at 0-0 in minute 1.
    pub fn start_match(&mut self, id: EntityId) -> Result<Match, LeagueError> {
        let index = self.match_index(id)?;
        let fixture = &mut self.matches[index];
        if fixture.state != MatchState::Scheduled {
            return Err(fixture.transition_error(MatchEvent::Start));
        }

        fixture.state = MatchState::Live {
            score: Score::default(),
            minute: 1,
        };

        let fixture = fixture.clone();
        self.record(
            ActivityKind::Match,
            format!("Match started: {}", fixture.title()),
            ADMIN_ACTOR,
        );
        Ok(fixture)
    }

    /// Add `delta` goals to one side of a live fixture, never going below zero.
    pub fn update_score(
        &mut self,
        id: EntityId,
        side: Side,
        delta: i32,
    ) -> Result<Match, LeagueError> {
        let index = self.match_index(id)?;
        let fixture = &mut self.matches[index];
        let MatchState::Live { score, .. } = &mut fixture.state else {
            return Err(fixture.transition_error(MatchEvent::UpdateScore));
        };

        let goals = match side {
            Side::Home => &mut score.home,
            Side::Away => &mut score.away,
        };
        *goals = goals.saturating_add_signed(delta);

        Ok(fixture.clone())
    }

    /// Set the clock of a live fixture.
    pub fn update_minute(&mut self, id: EntityId, minute: u32) -> Result<Match, LeagueError> {
        let index = self.match_index(id)?;
        let fixture = &mut self.matches[index];
        let MatchState::Live { minute: current, .. } = &mut fixture.state else {
            return Err(fixture.transition_error(MatchEvent::UpdateMinute));
        };

        *current = minute.max(1);
        Ok(fixture.clone())
    }

    /// `live -> finished`, applying the result to both teams.
    pub fn finish_match(&mut self, id: EntityId) -> Result<Match, LeagueError> {
        let index = self.match_index(id)?;
        let fixture = &self.matches[index];
        let MatchState::Live { score, .. } = fixture.state else {
            return Err(fixture.transition_error(MatchEvent::Finish));
        };

        let home_index = self.team_index(&fixture.home_team).ok_or_else(|| {
            LeagueError::validation(format!("unknown team `{}`", fixture.home_team))
        })?;
        let away_index = self.team_index(&fixture.away_team).ok_or_else(|| {
            LeagueError::validation(format!("unknown team `{}`", fixture.away_team))
        })?;

        let weights = self.info.points;
        let applied = AppliedResult {
            home_before: self.teams[home_index].stats,
            away_before: self.teams[away_index].stats,
            weights,
        };
        self.teams[home_index].stats =
            applied.home_before.with_result(score.home, score.away, weights);
        self.teams[away_index].stats =
            applied.away_before.with_result(score.away, score.home, weights);

        let fixture = &mut self.matches[index];
        fixture.state = MatchState::Finished {
            score,
            applied: Some(applied),
        };

        let fixture = fixture.clone();
        self.record(
            ActivityKind::Match,
            format!(
                "Match finished: {} {}-{} {}",
                fixture.home_team, score.home, score.away, fixture.away_team
            ),
            ADMIN_ACTOR,
        );
        Ok(fixture)
    }

    /// `finished -> scheduled`, taking the result back out of the standings.
    ///
    /// When both teams still hold exactly the counters the result produced,
    /// the pre-finish snapshot is restored. Otherwise the inverse is applied
    /// with every counter clamped at zero.
    pub fn reopen_match(&mut self, id: EntityId) -> Result<Match, LeagueError> {
        let index = self.match_index(id)?;
        let fixture = &self.matches[index];
        let MatchState::Finished { score, applied } = fixture.state else {
            return Err(fixture.transition_error(MatchEvent::Reopen));
        };

        let home_index = self.team_index(&fixture.home_team);
        let away_index = self.team_index(&fixture.away_team);
        let current = |index: Option<usize>| index.map(|i| self.teams[i].stats);
        let (home_now, away_now) = (current(home_index), current(away_index));

        let restored = applied.and_then(|applied| {
            let home_after = applied
                .home_before
                .with_result(score.home, score.away, applied.weights);
            let away_after = applied
                .away_before
                .with_result(score.away, score.home, applied.weights);
            (home_now == Some(home_after) && away_now == Some(away_after))
                .then_some((applied.home_before, applied.away_before))
        });

        let (home_stats, away_stats) = match restored {
            Some(snapshot) => (Some(snapshot.0), Some(snapshot.1)),
            None => {
                let weights = applied.map_or(self.info.points, |applied| applied.weights);
                warn!(
                    match_id = id,
                    has_snapshot = applied.is_some(),
                    "team stats changed since the match finished; reverting with clamped inverse"
                );
                (
                    home_now.map(|stats| stats.without_result(score.home, score.away, weights)),
                    away_now.map(|stats| stats.without_result(score.away, score.home, weights)),
                )
            }
        };

        if let (Some(i), Some(stats)) = (home_index, home_stats) {
            self.teams[i].stats = stats;
        }
        if let (Some(i), Some(stats)) = (away_index, away_stats) {
            self.teams[i].stats = stats;
        }

        let fixture = &mut self.matches[index];
        fixture.state = MatchState::Scheduled;

        let fixture = fixture.clone();
        self.record(
            ActivityKind::Match,
            format!("Match reopened: {}", fixture.title()),
            ADMIN_ACTOR,
        );
        Ok(fixture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::{PointsWeights, TeamStats};
    use crate::state::league::tests::league_with_teams;

    fn scheduled(league: &mut League) -> EntityId {
        league
            .create_match(NewMatch {
                home_team: "Owls".into(),
                away_team: "Hawks".into(),
                date: "2026-02-01".into(),
                time: Some("18:00".into()),
                round: Some(1),
            })
            .unwrap()
            .id
    }

    fn play(league: &mut League, id: EntityId, home: i32, away: i32) {
        league.start_match(id).unwrap();
        league.update_score(id, Side::Home, home).unwrap();
        league.update_score(id, Side::Away, away).unwrap();
        league.finish_match(id).unwrap();
    }

    fn total_points(league: &League) -> u32 {
        league.teams.iter().map(|team| team.stats.points).sum()
    }

    #[test]
    fn full_lifecycle_round_trip() {
        let mut league = league_with_teams(&["Owls", "Hawks"]);
        league.teams[0].stats = TeamStats {
            played: 2,
            wins: 1,
            losses: 1,
            goals_for: 3,
            goals_against: 2,
            points: 3,
            ..TeamStats::default()
        };
        let before: Vec<TeamStats> = league.teams.iter().map(|t| t.stats).collect();
        let id = scheduled(&mut league);

        let started = league.start_match(id).unwrap();
        assert_eq!(
            started.state,
            MatchState::Live {
                score: Score::default(),
                minute: 1
            }
        );

        league.update_score(id, Side::Home, 2).unwrap();
        league.update_score(id, Side::Away, 1).unwrap();
        league.update_minute(id, 67).unwrap();
        let finished = league.finish_match(id).unwrap();
        assert_eq!(finished.status(), MatchStatus::Finished);
        assert_eq!(league.teams[0].stats.wins, 2);
        assert_eq!(league.teams[1].stats.losses, 1);

        let reopened = league.reopen_match(id).unwrap();
        assert_eq!(reopened.state, MatchState::Scheduled);
        let after: Vec<TeamStats> = league.teams.iter().map(|t| t.stats).collect();
        assert_eq!(after, before);
    }

    #[test]
    fn finish_raises_total_points_by_outcome_weight() {
        let mut league = league_with_teams(&["Owls", "Hawks"]);

        let decisive = scheduled(&mut league);
        play(&mut league, decisive, 0, 2);
        assert_eq!(total_points(&league), 3);
        assert_eq!(league.teams[1].stats.points, 3);
        assert_eq!(league.teams[0].stats.losses, 1);

        let draw = scheduled(&mut league);
        play(&mut league, draw, 1, 1);
        assert_eq!(total_points(&league), 5);
        assert!(league.teams.iter().all(|t| t.stats.draws == 1));
    }

    #[test]
    fn custom_weights_are_used() {
        let mut league = league_with_teams(&["Owls", "Hawks"]);
        league.info.points = PointsWeights {
            win: 2,
            draw: 1,
            loss: 0,
        };
        let id = scheduled(&mut league);
        play(&mut league, id, 3, 0);
        assert_eq!(league.teams[0].stats.points, 2);
    }

    #[test]
    fn illegal_transitions_change_nothing() {
        let mut league = league_with_teams(&["Owls", "Hawks"]);
        let id = scheduled(&mut league);
        let snapshot = league.clone();

        for result in [
            league.finish_match(id),
            league.reopen_match(id),
            league.update_score(id, Side::Home, 1),
            league.update_minute(id, 10),
        ] {
            match result {
                Err(LeagueError::InvalidTransition(err)) => {
                    assert_eq!(err.from, MatchStatus::Scheduled)
                }
                other => panic!("unexpected result: {other:?}"),
            }
        }
        assert_eq!(league.matches, snapshot.matches);
        assert_eq!(league.teams, snapshot.teams);
        assert_eq!(league.activities, snapshot.activities);

        play(&mut league, id, 1, 0);
        let err = league.start_match(id).unwrap_err();
        assert_eq!(
            err,
            LeagueError::InvalidTransition(InvalidTransition {
                match_id: id,
                from: MatchStatus::Finished,
                event: MatchEvent::Start,
            })
        );
        assert!(matches!(
            league.finish_match(id),
            Err(LeagueError::InvalidTransition(_))
        ));
    }

    #[test]
    fn unknown_match_is_not_found() {
        let mut league = league_with_teams(&["Owls", "Hawks"]);
        assert!(matches!(
            league.start_match(42),
            Err(LeagueError::NotFound { kind: "match", .. })
        ));
    }

    #[test]
    fn score_never_goes_negative() {
        let mut league = league_with_teams(&["Owls", "Hawks"]);
        let id = scheduled(&mut league);
        league.start_match(id).unwrap();
        league.update_score(id, Side::Away, 1).unwrap();

        let fixture = league.update_score(id, Side::Away, -3).unwrap();

        assert_eq!(fixture.state.score(), Score::default());
    }

    #[test]
    fn minute_input_is_lenient() {
        assert_eq!(parse_minute("45"), 45);
        assert_eq!(parse_minute(" 120 "), 120);
        assert_eq!(parse_minute("0"), 1);
        assert_eq!(parse_minute("-5"), 1);
        assert_eq!(parse_minute("half-time"), 1);
        assert_eq!(clamp_minute(i64::MAX), u32::MAX);
    }

    #[test]
    fn finish_requires_both_teams() {
        let mut league = league_with_teams(&["Owls", "Hawks"]);
        let id = scheduled(&mut league);
        league.start_match(id).unwrap();
        league.teams.retain(|team| team.name != "Hawks");

        let err = league.finish_match(id).unwrap_err();

        assert!(matches!(err, LeagueError::Validation(_)));
        assert_eq!(league.fixture(id).unwrap().status(), MatchStatus::Live);
        assert_eq!(league.teams[0].stats, TeamStats::default());
    }

    #[test]
    fn reopen_after_manual_edit_uses_clamped_inverse() {
        let mut league = league_with_teams(&["Owls", "Hawks"]);
        let id = scheduled(&mut league);
        play(&mut league, id, 3, 1);
        league.teams[0].stats.points = 0;

        league.reopen_match(id).unwrap();

        let owls = league.teams[0].stats;
        assert_eq!(owls.points, 0);
        assert_eq!(owls.wins, 0);
        assert_eq!(owls.played, 0);
        assert_eq!(owls.goals_for, 0);
        assert_eq!(league.teams[1].stats, TeamStats::default());
    }

    #[test]
    fn legacy_finished_match_reopens_without_snapshot() {
        let mut league = league_with_teams(&["Owls", "Hawks"]);
        league.teams[0].stats = TeamStats::default().with_result(2, 2, PointsWeights::default());
        league.teams[1].stats = league.teams[0].stats;
        league.matches.push(Match::from(MatchEntity {
            id: 7,
            home_team: "Owls".into(),
            away_team: "Hawks".into(),
            date: "2025-12-01".into(),
            time: None,
            round: None,
            status: MatchStatusEntity::Finished,
            home_score: 2,
            away_score: 2,
            minute: None,
            applied: None,
        }));

        league.reopen_match(7).unwrap();

        assert!(league.teams.iter().all(|t| t.stats == TeamStats::default()));
    }

    #[test]
    fn create_match_validates_sides() {
        let mut league = league_with_teams(&["Owls", "Hawks"]);
        let same = NewMatch {
            home_team: "Owls".into(),
            away_team: "owls".into(),
            date: "2026-02-01".into(),
            time: None,
            round: None,
        };
        assert!(matches!(
            league.create_match(same),
            Err(LeagueError::Validation(_))
        ));

        let unknown = NewMatch {
            home_team: "Owls".into(),
            away_team: "Ravens".into(),
            date: "2026-02-01".into(),
            time: None,
            round: None,
        };
        assert!(league.create_match(unknown).is_err());
        assert!(league.matches.is_empty());

        let created = league
            .create_match(NewMatch {
                home_team: "owls".into(),
                away_team: "HAWKS".into(),
                date: "2026-02-01".into(),
                time: None,
                round: None,
            })
            .unwrap();
        assert_eq!(created.home_team, "Owls");
        assert_eq!(created.away_team, "Hawks");
    }

    #[test]
    fn reschedule_and_delete() {
        let mut league = league_with_teams(&["Owls", "Hawks"]);
        let id = scheduled(&mut league);

        let moved = league
            .reschedule_match(id, "2026-03-01", Some(" ".into()))
            .unwrap();
        assert_eq!(moved.date, "2026-03-01");
        assert_eq!(moved.time.as_deref(), Some("18:00"));

        play(&mut league, id, 1, 0);
        let points_before = total_points(&league);
        league.delete_match(id).unwrap();
        assert!(league.matches.is_empty());
        assert_eq!(total_points(&league), points_before);
    }

    #[test]
    fn entity_conversion_keeps_status_fields() {
        let mut league = league_with_teams(&["Owls", "Hawks"]);
        let id = scheduled(&mut league);
        league.start_match(id).unwrap();
        league.update_minute(id, 30).unwrap();

        let live = MatchEntity::from(league.fixture(id).cloned().unwrap());
        assert_eq!(live.status, MatchStatusEntity::Live);
        assert_eq!(live.minute, Some(30));
        assert!(live.applied.is_none());

        league.finish_match(id).unwrap();
        let finished = MatchEntity::from(league.fixture(id).cloned().unwrap());
        assert_eq!(finished.minute, None);
        assert!(finished.applied.is_some());
        assert_eq!(Match::from(finished), league.fixture(id).cloned().unwrap());
    }
}
