//! Round generation: random pairing of every team into scheduled fixtures.

use rand::{Rng, seq::SliceRandom};
use time::Date;

use crate::dao::models::ActivityKind;
use crate::state::{
    league::{ADMIN_ACTOR, League, LeagueError, format_match_date},
    match_lifecycle::{Match, MatchState},
};

impl League {
    /// Shuffle the teams and pair them two by two into a new round.
    ///
    /// With an odd number of teams the last one after the shuffle sits out.
    /// Fixtures are dated `scheduled_for` and numbered one past the highest
    /// existing round.
    pub fn generate_round<R>(
        &mut self,
        rng: &mut R,
        scheduled_for: Date,
    ) -> Result<Vec<Match>, LeagueError>
    where
        R: Rng + ?Sized,
    {
        if self.teams.len() < 2 {
            return Err(LeagueError::validation(
                "at least two teams are required to generate a round",
            ));
        }

        let mut names: Vec<String> = self.teams.iter().map(|team| team.name.clone()).collect();
        names.shuffle(rng);

        let round = self
            .matches
            .iter()
            .filter_map(|fixture| fixture.round)
            .max()
            .unwrap_or(0)
            + 1;
        let date = format_match_date(scheduled_for);

        let mut created = Vec::with_capacity(names.len() / 2);
        for pair in names.chunks_exact(2) {
            let fixture = Match {
                id: self.next_id(),
                home_team: pair[0].clone(),
                away_team: pair[1].clone(),
                date: date.clone(),
                time: None,
                round: Some(round),
                state: MatchState::Scheduled,
            };
            self.matches.push(fixture.clone());
            created.push(fixture);
        }

        self.record(
            ActivityKind::Round,
            format!("Round {round} generated: {} matches on {date}", created.len()),
            ADMIN_ACTOR,
        );
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::{SeedableRng, rngs::StdRng};
    use time::Month;

    use super::*;
    use crate::state::{league::tests::league_with_teams, match_lifecycle::MatchStatus};

    fn day() -> Date {
        Date::from_calendar_date(2026, Month::May, 2).unwrap()
    }

    #[test]
    fn odd_team_count_drops_one_team() {
        let mut league = league_with_teams(&["A", "B", "C", "D", "E"]);
        let mut rng = StdRng::seed_from_u64(7);

        let fixtures = league.generate_round(&mut rng, day()).unwrap();

        assert_eq!(fixtures.len(), 2);
        let mut seen = HashSet::new();
        for fixture in &fixtures {
            assert_ne!(fixture.home_team, fixture.away_team);
            assert_eq!(fixture.status(), MatchStatus::Scheduled);
            assert_eq!(fixture.date, "2026-05-02");
            assert_eq!(fixture.round, Some(1));
            assert!(seen.insert(fixture.home_team.clone()));
            assert!(seen.insert(fixture.away_team.clone()));
        }
        assert_eq!(league.matches.len(), 2);
    }

    #[test]
    fn rounds_are_numbered_after_existing_ones() {
        let mut league = league_with_teams(&["A", "B", "C", "D"]);
        let mut rng = StdRng::seed_from_u64(1);

        league.generate_round(&mut rng, day()).unwrap();
        let second = league.generate_round(&mut rng, day()).unwrap();

        assert!(second.iter().all(|fixture| fixture.round == Some(2)));
        assert_eq!(league.matches.len(), 4);
    }

    #[test]
    fn same_seed_gives_same_pairs() {
        let pairs = |seed| {
            let mut league = league_with_teams(&["A", "B", "C", "D", "E", "F"]);
            let mut rng = StdRng::seed_from_u64(seed);
            league
                .generate_round(&mut rng, day())
                .unwrap()
                .into_iter()
                .map(|fixture| (fixture.home_team, fixture.away_team))
                .collect::<Vec<_>>()
        };

        assert_eq!(pairs(99), pairs(99));
    }

    #[test]
    fn needs_two_teams() {
        let mut league = league_with_teams(&["A"]);
        let mut rng = StdRng::seed_from_u64(3);

        let err = league.generate_round(&mut rng, day()).unwrap_err();

        assert!(matches!(err, LeagueError::Validation(_)));
        assert!(league.matches.is_empty());
        assert!(league.activities.is_empty());
    }
}
