//! Standings Ledger: team records and the rules that mutate their counters.

use std::cmp::Ordering;

use crate::dao::models::{ActivityKind, PointsWeights, TeamEntity, TeamStats};
use crate::state::league::{ADMIN_ACTOR, League, LeagueError, optional, required, same_name};

/// Runtime representation of a standings entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    /// Unique (case-insensitive) team name.
    pub name: String,
    pub owner: String,
    pub stats: TeamStats,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl From<TeamEntity> for Team {
    fn from(value: TeamEntity) -> Self {
        Self {
            name: value.name,
            owner: value.owner,
            stats: value.stats,
            email: value.email,
            phone: value.phone,
        }
    }
}

impl From<Team> for TeamEntity {
    fn from(value: Team) -> Self {
        Self {
            name: value.name,
            owner: value.owner,
            stats: value.stats,
            email: value.email,
            phone: value.phone,
        }
    }
}

/// Input accepted by [`League::add_team`].
#[derive(Debug, Clone)]
pub struct NewTeam {
    pub name: String,
    pub owner: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Counter that can be overridden from the stat editor.
///
/// `played` is not listed: it always equals `wins + draws + losses`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatField {
    Wins,
    Draws,
    Losses,
    GoalsFor,
    GoalsAgainst,
    Points,
}

impl TeamStats {
    /// `goalsFor - goalsAgainst`.
    pub fn goal_difference(&self) -> i64 {
        i64::from(self.goals_for) - i64::from(self.goals_against)
    }

    /// Counters after one more match ending `scored`-`conceded`.
    pub fn with_result(self, scored: u32, conceded: u32, weights: PointsWeights) -> Self {
        let mut next = self;
        next.played = next.played.saturating_add(1);
        next.goals_for = next.goals_for.saturating_add(scored);
        next.goals_against = next.goals_against.saturating_add(conceded);
        match scored.cmp(&conceded) {
            Ordering::Greater => {
                next.wins = next.wins.saturating_add(1);
                next.points = next.points.saturating_add(weights.win);
            }
            Ordering::Less => next.losses = next.losses.saturating_add(1),
            Ordering::Equal => {
                next.draws = next.draws.saturating_add(1);
                next.points = next.points.saturating_add(weights.draw);
            }
        }
        next
    }

    /// Inverse of [`TeamStats::with_result`], clamping every counter at zero.
    pub fn without_result(self, scored: u32, conceded: u32, weights: PointsWeights) -> Self {
        let mut next = self;
        next.played = next.played.saturating_sub(1);
        next.goals_for = next.goals_for.saturating_sub(scored);
        next.goals_against = next.goals_against.saturating_sub(conceded);
        match scored.cmp(&conceded) {
            Ordering::Greater => {
                next.wins = next.wins.saturating_sub(1);
                next.points = next.points.saturating_sub(weights.win);
            }
            Ordering::Less => next.losses = next.losses.saturating_sub(1),
            Ordering::Equal => {
                next.draws = next.draws.saturating_sub(1);
                next.points = next.points.saturating_sub(weights.draw);
            }
        }
        next
    }

    fn set(&mut self, field: StatField, value: u32, weights: PointsWeights) {
        match field {
            StatField::Wins => self.wins = value,
            StatField::Draws => self.draws = value,
            StatField::Losses => self.losses = value,
            StatField::GoalsFor => self.goals_for = value,
            StatField::GoalsAgainst => self.goals_against = value,
            StatField::Points => self.points = value,
        }

        if matches!(field, StatField::Wins | StatField::Draws) {
            self.points = self
                .wins
                .saturating_mul(weights.win)
                .saturating_add(self.draws.saturating_mul(weights.draw));
        }
        if matches!(field, StatField::Wins | StatField::Draws | StatField::Losses) {
            self.played = self
                .wins
                .saturating_add(self.draws)
                .saturating_add(self.losses);
        }
    }
}

impl League {
    /// Index of the team whose name matches case-insensitively.
    pub fn team_index(&self, name: &str) -> Option<usize> {
        self.teams
            .iter()
            .position(|team| same_name(&team.name, name))
    }

    /// Team whose name matches case-insensitively.
    pub fn team(&self, name: &str) -> Option<&Team> {
        self.team_index(name).map(|index| &self.teams[index])
    }

    fn require_team(&self, name: &str) -> Result<usize, LeagueError> {
        self.team_index(name)
            .ok_or_else(|| LeagueError::not_found("team", name.trim()))
    }

    /// Whether `name` is used by a team or a pending registration.
    pub fn name_taken(&self, name: &str) -> bool {
        self.team_index(name).is_some()
            || self
                .registrations
                .iter()
                .any(|registration| same_name(&registration.team, name))
    }

    /// Add a team with zeroed counters.
    pub fn add_team(&mut self, team: NewTeam) -> Result<Team, LeagueError> {
        let name = required(&team.name, "team name")?;
        let owner = required(&team.owner, "team owner")?;
        if self.team_index(&name).is_some() {
            return Err(LeagueError::validation(format!(
                "team `{name}` already exists"
            )));
        }

        let team = Team {
            name,
            owner,
            stats: TeamStats::default(),
            email: optional(team.email),
            phone: optional(team.phone),
        };
        self.teams.push(team.clone());
        self.record(
            ActivityKind::Team,
            format!("Team added: {}", team.name),
            ADMIN_ACTOR,
        );
        Ok(team)
    }

    /// Rename a team and every fixture referencing it.
    pub fn rename_team(&mut self, current: &str, new_name: &str) -> Result<Team, LeagueError> {
        let index = self.require_team(current)?;
        let new_name = required(new_name, "new team name")?;
        if self
            .team_index(&new_name)
            .is_some_and(|other| other != index)
        {
            return Err(LeagueError::validation(format!(
                "team `{new_name}` already exists"
            )));
        }

        let old_name = std::mem::replace(&mut self.teams[index].name, new_name.clone());
        for fixture in &mut self.matches {
            if fixture.home_team == old_name {
                fixture.home_team = new_name.clone();
            }
            if fixture.away_team == old_name {
                fixture.away_team = new_name.clone();
            }
        }

        self.record(
            ActivityKind::Team,
            format!("Team renamed: {old_name} -> {new_name}"),
            ADMIN_ACTOR,
        );
        Ok(self.teams[index].clone())
    }

    /// Remove a team together with every fixture it takes part in.
    ///
    /// Returns the removed team and the number of fixtures dropped.
    pub fn delete_team(&mut self, name: &str) -> Result<(Team, usize), LeagueError> {
        let index = self.require_team(name)?;
        let team = self.teams.remove(index);

        let before = self.matches.len();
        self.matches
            .retain(|fixture| fixture.home_team != team.name && fixture.away_team != team.name);
        let dropped = before - self.matches.len();

        self.record(
            ActivityKind::Team,
            format!("Team deleted: {} ({dropped} matches removed)", team.name),
            ADMIN_ACTOR,
        );
        Ok((team, dropped))
    }

    /// Override one counter of a team, re-deriving `points` and `played`.
    pub fn set_stat(
        &mut self,
        name: &str,
        field: StatField,
        value: u32,
    ) -> Result<Team, LeagueError> {
        let index = self.require_team(name)?;
        let weights = self.info.points;
        self.teams[index].stats.set(field, value, weights);

        let team = self.teams[index].clone();
        self.record(
            ActivityKind::Standings,
            format!("Stats edited: {} {field:?} = {value}", team.name),
            ADMIN_ACTOR,
        );
        Ok(team)
    }

    /// Standings ordered by points, then goal difference, both descending.
    ///
    /// Ties keep their insertion order.
    pub fn sorted_standings(&self) -> Vec<&Team> {
        let mut rows: Vec<&Team> = self.teams.iter().collect();
        rows.sort_by(|a, b| {
            b.stats
                .points
                .cmp(&a.stats.points)
                .then_with(|| b.stats.goal_difference().cmp(&a.stats.goal_difference()))
        });
        rows
    }

    /// Zero every counter of one team.
    pub fn reset_team_stats(&mut self, name: &str) -> Result<Team, LeagueError> {
        let index = self.require_team(name)?;
        self.teams[index].stats = TeamStats::default();

        let team = self.teams[index].clone();
        self.record(
            ActivityKind::Standings,
            format!("Stats reset: {}", team.name),
            ADMIN_ACTOR,
        );
        Ok(team)
    }

    /// Zero every counter of every team, returning how many were reset.
    pub fn reset_all_stats(&mut self) -> usize {
        for team in &mut self.teams {
            team.stats = TeamStats::default();
        }
        self.record(ActivityKind::Standings, "All standings reset", ADMIN_ACTOR);
        self.teams.len()
    }

    /// Team registered under `name` by `owner`, both compared case-insensitively.
    pub fn login(&self, name: &str, owner: &str) -> Result<&Team, LeagueError> {
        self.team(name)
            .filter(|team| same_name(&team.owner, owner))
            .ok_or_else(|| LeagueError::not_found("team", name.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{league::tests::league_with_teams, match_lifecycle::NewMatch};

    fn new_team(name: &str, owner: &str) -> NewTeam {
        NewTeam {
            name: name.into(),
            owner: owner.into(),
            email: None,
            phone: None,
        }
    }

    fn schedule(league: &mut League, home: &str, away: &str) {
        league
            .create_match(NewMatch {
                home_team: home.into(),
                away_team: away.into(),
                date: "2026-01-01".into(),
                time: None,
                round: None,
            })
            .unwrap();
    }

    fn stats(points: u32, goals_for: u32, goals_against: u32) -> TeamStats {
        TeamStats {
            points,
            goals_for,
            goals_against,
            ..TeamStats::default()
        }
    }

    #[test]
    fn duplicate_names_are_rejected_case_insensitively() {
        let mut league = league_with_teams(&[]);
        league.add_team(new_team("Alpha", "Bob")).unwrap();

        let err = league.add_team(new_team("alpha", "Carol")).unwrap_err();

        assert!(matches!(err, LeagueError::Validation(_)));
        assert_eq!(league.teams.len(), 1);
        assert_eq!(league.teams[0].owner, "Bob");

        league.add_team(new_team("Спартак", "Иван")).unwrap();
        assert!(league.add_team(new_team("СПАРТАК", "Пётр")).is_err());
        assert!(league.add_team(new_team(" спартак ", "Пётр")).is_err());
        assert_eq!(league.teams.len(), 2);
    }

    #[test]
    fn lookups_ignore_non_ascii_case() {
        let mut league = league_with_teams(&["Ürdingen"]);
        league.teams[0].owner = "Ольга".into();

        assert_eq!(league.team_index("ÜRDINGEN"), Some(0));
        assert_eq!(league.login("ürdingen", "ОЛЬГА").unwrap().name, "Ürdingen");

        let renamed = league.rename_team("ürdingen", "Ürdingen 05").unwrap();
        assert_eq!(renamed.name, "Ürdingen 05");
    }

    #[test]
    fn add_team_requires_name_and_owner() {
        let mut league = league_with_teams(&[]);
        assert!(league.add_team(new_team("  ", "Bob")).is_err());
        assert!(league.add_team(new_team("Alpha", "")).is_err());
        assert!(league.teams.is_empty());
        assert!(league.activities.is_empty());
    }

    #[test]
    fn set_wins_recomputes_points_and_played() {
        let mut league = league_with_teams(&["Owls"]);
        league.teams[0].stats.draws = 2;
        league.teams[0].stats.losses = 1;

        let team = league.set_stat("Owls", StatField::Wins, 5).unwrap();

        assert_eq!(team.stats.points, 17);
        assert_eq!(team.stats.played, 8);
    }

    #[test]
    fn manual_points_override_is_kept_until_wins_or_draws_change() {
        let mut league = league_with_teams(&["Owls"]);
        league.set_stat("Owls", StatField::Wins, 2).unwrap();
        league.set_stat("Owls", StatField::Points, 10).unwrap();
        league.set_stat("Owls", StatField::GoalsFor, 4).unwrap();
        assert_eq!(league.teams[0].stats.points, 10);

        league.set_stat("Owls", StatField::Draws, 1).unwrap();
        assert_eq!(league.teams[0].stats.points, 7);
        assert_eq!(league.teams[0].stats.played, 3);
    }

    #[test]
    fn set_stat_on_unknown_team_is_not_found() {
        let mut league = league_with_teams(&["Owls"]);
        let err = league.set_stat("Hawks", StatField::Wins, 1).unwrap_err();
        assert!(matches!(err, LeagueError::NotFound { kind: "team", .. }));
    }

    #[test]
    fn sorting_uses_points_then_goal_difference() {
        let mut league = league_with_teams(&["A", "B", "C", "D"]);
        league.teams[0].stats = stats(3, 1, 1);
        league.teams[1].stats = stats(6, 0, 2);
        league.teams[2].stats = stats(3, 4, 1);
        league.teams[3].stats = stats(3, 1, 1);

        let order: Vec<&str> = league
            .sorted_standings()
            .iter()
            .map(|team| team.name.as_str())
            .collect();

        assert_eq!(order, vec!["B", "C", "A", "D"]);
    }

    #[test]
    fn sorting_is_stable_across_calls() {
        let mut league = league_with_teams(&["A", "B", "C"]);
        for team in &mut league.teams {
            team.stats = stats(4, 2, 2);
        }

        let first: Vec<String> = league
            .sorted_standings()
            .iter()
            .map(|team| team.name.clone())
            .collect();
        let second: Vec<String> = league
            .sorted_standings()
            .iter()
            .map(|team| team.name.clone())
            .collect();

        assert_eq!(first, second);
        assert_eq!(first, vec!["A", "B", "C"]);
    }

    #[test]
    fn rename_cascades_into_fixtures() {
        let mut league = league_with_teams(&["Owls", "Hawks", "Eagles"]);
        schedule(&mut league, "Owls", "Hawks");
        schedule(&mut league, "Eagles", "Owls");

        league.rename_team("owls", "Night Owls").unwrap();

        assert_eq!(league.teams[0].name, "Night Owls");
        assert_eq!(league.matches[0].home_team, "Night Owls");
        assert_eq!(league.matches[1].away_team, "Night Owls");
        assert_eq!(league.matches[1].home_team, "Eagles");
    }

    #[test]
    fn rename_to_existing_name_is_rejected() {
        let mut league = league_with_teams(&["Owls", "Hawks"]);
        assert!(league.rename_team("Owls", "HAWKS").is_err());
        assert_eq!(league.teams[0].name, "Owls");

        // Changing only the case of its own name is allowed.
        league.rename_team("Owls", "OWLS").unwrap();
        assert_eq!(league.teams[0].name, "OWLS");
    }

    #[test]
    fn delete_team_drops_its_fixtures() {
        let mut league = league_with_teams(&["Owls", "Hawks", "Eagles"]);
        for (home, away) in [("Owls", "Hawks"), ("Hawks", "Eagles"), ("Eagles", "Owls")] {
            schedule(&mut league, home, away);
        }

        let (team, dropped) = league.delete_team("Owls").unwrap();

        assert_eq!(team.name, "Owls");
        assert_eq!(dropped, 2);
        assert_eq!(league.matches.len(), 1);
        assert_eq!(league.teams.len(), 2);
    }

    #[test]
    fn reset_keeps_identity_fields() {
        let mut league = league_with_teams(&["Owls", "Hawks"]);
        league.teams[0].email = Some("owls@example.com".into());
        league.teams[0].stats = stats(9, 7, 2);
        league.teams[1].stats = stats(1, 1, 1);

        let team = league.reset_team_stats("Owls").unwrap();
        assert_eq!(team.stats, TeamStats::default());
        assert_eq!(team.email.as_deref(), Some("owls@example.com"));
        assert_eq!(league.teams[1].stats.points, 1);

        assert_eq!(league.reset_all_stats(), 2);
        assert!(league.teams.iter().all(|t| t.stats == TeamStats::default()));
        assert_eq!(league.teams[1].owner, "Hawks owner");
    }

    #[test]
    fn login_matches_team_and_owner() {
        let league = league_with_teams(&["Owls"]);
        assert_eq!(league.login("OWLS", "owls OWNER").unwrap().name, "Owls");
        assert!(league.login("Owls", "someone else").is_err());
    }

    #[test]
    fn result_round_trip_is_exact() {
        let weights = PointsWeights::default();
        let before = stats(4, 6, 3);
        for (scored, conceded) in [(2, 1), (0, 3), (2, 2)] {
            let after = before.with_result(scored, conceded, weights);
            assert_eq!(after.without_result(scored, conceded, weights), before);
        }
    }

    #[test]
    fn inverse_clamps_at_zero() {
        let weights = PointsWeights::default();
        let reverted = TeamStats::default().without_result(3, 1, weights);
        assert_eq!(reverted, TeamStats::default());
    }
}
