use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    dao::models::{EntityId, LeagueInfoEntity, MatchStatusEntity, NewsEntity, PointsWeights},
    dto::validation::{validate_display_name, validate_optional_email},
    state::{
        match_lifecycle::{Match, MatchState, MatchStatus},
        registrations::NewRegistration,
        standings::Team,
    },
};

/// League metadata exposed to anonymous readers.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeagueInfoView {
    pub name: String,
    pub description: String,
    pub season: String,
    pub points: PointsWeights,
}

impl From<&LeagueInfoEntity> for LeagueInfoView {
    fn from(value: &LeagueInfoEntity) -> Self {
        Self {
            name: value.name.clone(),
            description: value.description.clone(),
            season: value.season.clone(),
            points: value.points,
        }
    }
}

/// One line of the public standings table.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StandingRow {
    /// 1-based rank.
    pub position: usize,
    pub team: String,
    pub owner: String,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i64,
    pub points: u32,
}

impl StandingRow {
    pub fn new(position: usize, team: &Team) -> Self {
        let stats = team.stats;
        Self {
            position,
            team: team.name.clone(),
            owner: team.owner.clone(),
            played: stats.played,
            wins: stats.wins,
            draws: stats.draws,
            losses: stats.losses,
            goals_for: stats.goals_for,
            goals_against: stats.goals_against,
            goal_difference: stats.goal_difference(),
            points: stats.points,
        }
    }
}

/// Fixture as shown on the public site.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchView {
    pub id: EntityId,
    pub home_team: String,
    pub away_team: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round: Option<u32>,
    pub status: MatchStatusEntity,
    pub home_score: u32,
    pub away_score: u32,
    /// Only while live.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minute: Option<u32>,
}

impl From<&Match> for MatchView {
    fn from(value: &Match) -> Self {
        let score = value.state.score();
        let minute = match value.state {
            MatchState::Live { minute, .. } => Some(minute),
            _ => None,
        };
        Self {
            id: value.id,
            home_team: value.home_team.clone(),
            away_team: value.away_team.clone(),
            date: value.date.clone(),
            time: value.time.clone(),
            round: value.round,
            status: status_entity(value.status()),
            home_score: score.home,
            away_score: score.away,
            minute,
        }
    }
}

pub(crate) fn status_entity(status: MatchStatus) -> MatchStatusEntity {
    match status {
        MatchStatus::Scheduled => MatchStatusEntity::Scheduled,
        MatchStatus::Live => MatchStatusEntity::Live,
        MatchStatus::Finished => MatchStatusEntity::Finished,
    }
}

/// Everything the public site renders; registrations and activities are left out.
#[derive(Debug, Serialize, ToSchema)]
pub struct PublicLeagueView {
    pub league: LeagueInfoView,
    pub standings: Vec<StandingRow>,
    pub matches: Vec<MatchView>,
    /// Latest news, newest first.
    pub news: Vec<NewsEntity>,
}

/// Optional status filter for `/api/matches`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MatchesQuery {
    /// `scheduled`, `live` or `finished`.
    pub status: Option<MatchStatusEntity>,
}

/// Optional page size for `/api/news`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NewsQuery {
    pub limit: Option<usize>,
}

/// Public team application.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RegistrationRequest {
    #[validate(custom(function = "validate_display_name"))]
    pub team: String,
    #[validate(custom(function = "validate_display_name"))]
    pub owner: String,
    #[validate(custom(function = "validate_optional_email"))]
    #[serde(default)]
    pub email: Option<String>,
    #[validate(length(max = 32))]
    #[serde(default)]
    pub phone: Option<String>,
}

impl From<RegistrationRequest> for NewRegistration {
    fn from(value: RegistrationRequest) -> Self {
        Self {
            team: value.team,
            owner: value.owner,
            email: value.email,
            phone: value.phone,
        }
    }
}

/// Acknowledgement of a queued application.
#[derive(Debug, Serialize, ToSchema)]
pub struct RegistrationResponse {
    pub success: bool,
    pub id: EntityId,
}

/// Team-owner lookup from the public site.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct LoginRequest {
    #[validate(custom(function = "validate_display_name"))]
    pub team: String,
    #[validate(custom(function = "validate_display_name"))]
    pub owner: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::TeamStats;
    use serde_json::json;

    #[test]
    fn registration_treats_blank_email_as_absent() {
        let request: RegistrationRequest = serde_json::from_value(
            json!({"team": "Зенит", "owner": "Ольга", "email": "", "phone": ""}),
        )
        .unwrap();
        assert!(request.validate().is_ok());

        let request: RegistrationRequest = serde_json::from_value(
            json!({"team": "Зенит", "owner": "Ольга", "email": "olga"}),
        )
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn standing_row_carries_goal_difference() {
        let team = Team {
            name: "Owls".into(),
            owner: "Ann".into(),
            stats: TeamStats {
                goals_for: 2,
                goals_against: 5,
                ..TeamStats::default()
            },
            email: Some("ann@example.com".into()),
            phone: None,
        };

        let value = serde_json::to_value(StandingRow::new(3, &team)).unwrap();

        assert_eq!(value["position"], 3);
        assert_eq!(value["goalDifference"], -3);
        assert!(value.get("email").is_none());
    }

    #[test]
    fn registration_request_is_validated() {
        let ok: RegistrationRequest = serde_json::from_value(serde_json::json!({
            "team": "Eagles", "owner": "X", "email": "x@example.com"
        }))
        .unwrap();
        assert!(ok.validate().is_ok());

        let bad: RegistrationRequest = serde_json::from_value(serde_json::json!({
            "team": " ", "owner": "X", "email": "not-an-email"
        }))
        .unwrap();
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("team"));
        assert!(errors.field_errors().contains_key("email"));
    }
}
