//! DTO definitions used by the admin REST API and documentation layer.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    dao::models::{LeagueDocument, MatchEntity, TeamEntity},
    dto::validation::{validate_display_name, validate_not_blank, validate_optional_email},
    state::{
        league::NewNews,
        match_lifecycle::{NewMatch, Side, clamp_minute, parse_minute},
        standings::{NewTeam, StatField},
    },
};

/// Payload creating a standings entry.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateTeamRequest {
    #[serde(alias = "team")]
    #[validate(custom(function = "validate_display_name"))]
    pub name: String,
    #[validate(custom(function = "validate_display_name"))]
    pub owner: String,
    #[validate(custom(function = "validate_optional_email"))]
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl From<CreateTeamRequest> for NewTeam {
    fn from(value: CreateTeamRequest) -> Self {
        Self {
            name: value.name,
            owner: value.owner,
            email: value.email,
            phone: value.phone,
        }
    }
}

/// Payload renaming a team.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RenameTeamRequest {
    #[validate(custom(function = "validate_display_name"))]
    pub name: String,
}

/// Counter editable through the stat editor.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum StatFieldDto {
    Wins,
    Draws,
    Losses,
    GoalsFor,
    GoalsAgainst,
    Points,
}

impl From<StatFieldDto> for StatField {
    fn from(value: StatFieldDto) -> Self {
        match value {
            StatFieldDto::Wins => StatField::Wins,
            StatFieldDto::Draws => StatField::Draws,
            StatFieldDto::Losses => StatField::Losses,
            StatFieldDto::GoalsFor => StatField::GoalsFor,
            StatFieldDto::GoalsAgainst => StatField::GoalsAgainst,
            StatFieldDto::Points => StatField::Points,
        }
    }
}

/// Direct override of one team counter.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetStatRequest {
    pub field: StatFieldDto,
    pub value: u32,
}

/// Outcome of a team deletion.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteTeamResponse {
    pub team: TeamEntity,
    /// Fixtures removed together with the team.
    pub removed_matches: usize,
}

/// Payload scheduling a fixture by hand.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatchRequest {
    #[validate(custom(function = "validate_not_blank"))]
    pub home_team: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub away_team: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub date: String,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub round: Option<u32>,
}

impl From<CreateMatchRequest> for NewMatch {
    fn from(value: CreateMatchRequest) -> Self {
        Self {
            home_team: value.home_team,
            away_team: value.away_team,
            date: value.date,
            time: value.time,
            round: value.round,
        }
    }
}

/// Payload moving a fixture.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RescheduleMatchRequest {
    #[validate(custom(function = "validate_not_blank"))]
    pub date: String,
    #[serde(default)]
    pub time: Option<String>,
}

/// Side of a fixture as sent by the admin panel.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ScoreSide {
    Home,
    Away,
}

impl From<ScoreSide> for Side {
    fn from(value: ScoreSide) -> Self {
        match value {
            ScoreSide::Home => Side::Home,
            ScoreSide::Away => Side::Away,
        }
    }
}

fn one_goal() -> i32 {
    1
}

/// Signed goal adjustment on one side of a live fixture.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ScoreUpdateRequest {
    pub side: ScoreSide,
    /// Defaults to +1.
    #[serde(default = "one_goal")]
    pub delta: i32,
}

/// Minute as typed in the admin panel: a number or any string.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum MinuteInput {
    Number(i64),
    Text(String),
}

impl MinuteInput {
    /// Minute to store, 1 when the input is unusable.
    pub fn resolve(&self) -> u32 {
        match self {
            MinuteInput::Number(minute) => clamp_minute(*minute),
            MinuteInput::Text(raw) => parse_minute(raw),
        }
    }
}

/// Clock update of a live fixture.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MinuteUpdateRequest {
    pub minute: MinuteInput,
}

/// Response of a round draw.
#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateRoundResponse {
    /// Number given to the new round.
    pub round: u32,
    pub matches: Vec<MatchEntity>,
}

/// Payload publishing a news item.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateNewsRequest {
    #[validate(custom(function = "validate_not_blank"), length(max = 200))]
    pub title: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub content: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl From<CreateNewsRequest> for NewNews {
    fn from(value: CreateNewsRequest) -> Self {
        Self {
            title: value.title,
            content: value.content,
            image: value.image,
        }
    }
}

/// Full document together with the version it was read at.
#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentResponse {
    /// Pass back in `If-Match` when saving to detect concurrent edits.
    pub version: Option<String>,
    pub document: LeagueDocument,
}

/// Result of a full-document save.
#[derive(Debug, Serialize, ToSchema)]
pub struct SaveResponse {
    pub success: bool,
    /// Version of the stored document after the write.
    pub version: Option<String>,
}

/// Page size for `/admin/activities`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ActivitiesQuery {
    pub limit: Option<usize>,
}

/// Generic action acknowledgement used by admin endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResponse {
    pub message: String,
}

impl ActionResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn minute_accepts_numbers_and_text() {
        let cases = [
            (json!({"minute": 73}), 73),
            (json!({"minute": "88"}), 88),
            (json!({"minute": "stoppage"}), 1),
            (json!({"minute": 0}), 1),
            (json!({"minute": -4}), 1),
        ];

        for (raw, expected) in cases {
            let request: MinuteUpdateRequest = serde_json::from_value(raw).unwrap();
            assert_eq!(request.minute.resolve(), expected);
        }
    }

    #[test]
    fn score_delta_defaults_to_one_goal() {
        let request: ScoreUpdateRequest = serde_json::from_value(json!({"side": "away"})).unwrap();
        assert_eq!(request.delta, 1);
        assert!(matches!(Side::from(request.side), Side::Away));
    }

    #[test]
    fn stat_fields_use_camel_case() {
        let request: SetStatRequest =
            serde_json::from_value(json!({"field": "goalsAgainst", "value": 4})).unwrap();
        assert_eq!(StatField::from(request.field), StatField::GoalsAgainst);
        let played = json!({"field": "played", "value": 1});
        assert!(serde_json::from_value::<SetStatRequest>(played).is_err());
    }

    #[test]
    fn create_team_accepts_legacy_team_key() {
        let request: CreateTeamRequest =
            serde_json::from_value(json!({"team": "Owls", "owner": "Ann"})).unwrap();
        assert_eq!(request.name, "Owls");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn blank_email_passes_validation() {
        let blank: CreateTeamRequest =
            serde_json::from_value(json!({"name": "Owls", "owner": "Ann", "email": ""})).unwrap();
        assert!(blank.validate().is_ok());

        let broken: CreateTeamRequest =
            serde_json::from_value(json!({"name": "Owls", "owner": "Ann", "email": "ann@"}))
                .unwrap();
        assert!(broken.validate().is_err());
    }
}
