//! Persisted shape of the League Document.
//!
//! Field names follow the JSON written by earlier clients (camelCase keys, the
//! team name stored under `team`) so existing documents round-trip unchanged.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use serde_with::{DisplayFromStr, PickFirst, serde_as};
use utoipa::ToSchema;

/// Time-based identifier (milliseconds since the Unix epoch).
pub type EntityId = u64;

/// Entire league state stored as a single JSON document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeagueDocument {
    /// League metadata and point weights.
    #[serde(default)]
    pub league: LeagueInfoEntity,
    /// Team records making up the standings table.
    #[serde(default)]
    pub standings: Vec<TeamEntity>,
    /// Every fixture regardless of status.
    #[serde(default)]
    pub matches: Vec<MatchEntity>,
    /// News feed, newest first.
    #[serde(default)]
    pub news: Vec<NewsEntity>,
    /// Team applications waiting for an admin decision.
    #[serde(default)]
    pub pending_registrations: Vec<RegistrationEntity>,
    /// Bounded list of recent admin activity.
    #[serde(default)]
    pub activities: Vec<ActivityEntity>,
}

impl LeagueDocument {
    /// Document materialized when the store holds no league yet.
    pub fn initial(name: impl Into<String>, news_id: EntityId, date: String) -> Self {
        Self {
            league: LeagueInfoEntity {
                name: name.into(),
                ..LeagueInfoEntity::default()
            },
            news: vec![NewsEntity {
                id: news_id,
                title: "Welcome to the league!".into(),
                content: "The new season is about to start. Register your team to take part."
                    .into(),
                image: None,
                date,
            }],
            ..Self::default()
        }
    }
}

/// League metadata block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct LeagueInfoEntity {
    pub name: String,
    pub description: String,
    pub season: String,
    pub points: PointsWeights,
    /// Free-form settings, kept in their original order.
    #[schema(value_type = Object)]
    pub settings: IndexMap<String, Value>,
}

impl Default for LeagueInfoEntity {
    fn default() -> Self {
        Self {
            name: "League".into(),
            description: String::new(),
            season: String::new(),
            points: PointsWeights::default(),
            settings: IndexMap::new(),
        }
    }
}

/// Points awarded per result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct PointsWeights {
    pub win: u32,
    pub draw: u32,
    pub loss: u32,
}

impl Default for PointsWeights {
    fn default() -> Self {
        Self {
            win: 3,
            draw: 1,
            loss: 0,
        }
    }
}

/// Aggregate counters of a team. Negative values written by older clients are
/// clamped to zero on load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamStats {
    #[serde(default, deserialize_with = "non_negative")]
    pub played: u32,
    #[serde(default, deserialize_with = "non_negative")]
    pub wins: u32,
    #[serde(default, deserialize_with = "non_negative")]
    pub draws: u32,
    #[serde(default, deserialize_with = "non_negative")]
    pub losses: u32,
    #[serde(default, deserialize_with = "non_negative")]
    pub goals_for: u32,
    #[serde(default, deserialize_with = "non_negative")]
    pub goals_against: u32,
    #[serde(default, deserialize_with = "non_negative")]
    pub points: u32,
}

/// Standings entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TeamEntity {
    /// Unique team name.
    #[serde(rename = "team", alias = "name")]
    pub name: String,
    #[serde(default)]
    pub owner: String,
    #[serde(flatten)]
    pub stats: TeamStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Persisted match status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatusEntity {
    #[default]
    Scheduled,
    Live,
    Finished,
}

/// Record of the result applied to the standings when a match finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppliedResultEntity {
    /// Home team counters right before the result was applied.
    pub home_before: TeamStats,
    /// Away team counters right before the result was applied.
    pub away_before: TeamStats,
    /// Weights in force when the result was applied.
    pub weights: PointsWeights,
}

/// Fixture entry.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchEntity {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub id: EntityId,
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round: Option<u32>,
    #[serde(default)]
    pub status: MatchStatusEntity,
    #[serde(default, deserialize_with = "non_negative")]
    pub home_score: u32,
    #[serde(default, deserialize_with = "non_negative")]
    pub away_score: u32,
    /// Present while the match is live.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minute: Option<u32>,
    /// Present once the match is finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied: Option<AppliedResultEntity>,
}

/// News item.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NewsEntity {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub id: EntityId,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub date: String,
}

/// Registration status. Only pending registrations are ever stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatusEntity {
    #[default]
    Pending,
}

/// Team application awaiting approval.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RegistrationEntity {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub id: EntityId,
    pub team: String,
    pub owner: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub status: RegistrationStatusEntity,
}

/// Category of an activity log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Match,
    Team,
    Standings,
    Registration,
    News,
    Round,
    System,
    #[serde(other)]
    Other,
}

/// Human-readable activity log entry.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ActivityEntity {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub id: EntityId,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub message: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub user: String,
}

fn non_negative<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = i64::deserialize(deserializer)?;
    Ok(value.clamp(0, i64::from(u32::MAX)) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn legacy_document_loads_with_defaults() {
        let raw = json!({
            "teams": [],
            "standings": [
                {"team": "Eagles", "owner": "Ann", "played": 1, "wins": 1, "draws": 0,
                 "losses": 0, "goalsFor": 2, "goalsAgainst": -1, "points": 3}
            ],
            "matches": [
                {"id": "1737370000000", "homeTeam": "Eagles", "awayTeam": "Owls",
                 "date": "2026-01-24", "status": "live", "homeScore": 1, "minute": 12}
            ],
            "news": [{"id": 1, "title": "Hi", "content": "Welcome", "image": null,
                      "date": "2026-01-20T10:00:00Z"}]
        });

        let doc: LeagueDocument = serde_json::from_value(raw).unwrap();

        assert_eq!(doc.league.points, PointsWeights::default());
        assert_eq!(doc.standings[0].name, "Eagles");
        assert_eq!(doc.standings[0].stats.goals_against, 0);
        assert_eq!(doc.matches[0].id, 1_737_370_000_000);
        assert_eq!(doc.matches[0].away_score, 0);
        assert_eq!(doc.matches[0].minute, Some(12));
        assert!(doc.pending_registrations.is_empty());
        assert!(doc.activities.is_empty());
    }

    #[test]
    fn team_name_is_written_under_team_key() {
        let team = TeamEntity {
            name: "Owls".into(),
            owner: "Bo".into(),
            stats: TeamStats::default(),
            email: None,
            phone: None,
        };

        let value = serde_json::to_value(&team).unwrap();

        assert_eq!(value["team"], "Owls");
        assert_eq!(value["goalsFor"], 0);
        assert!(value.get("email").is_none());
    }

    #[test]
    fn unknown_activity_type_maps_to_other() {
        let raw = json!({"id": 5, "type": "login", "message": "m", "date": "", "user": "u"});
        let activity: ActivityEntity = serde_json::from_value(raw).unwrap();
        assert_eq!(activity.kind, ActivityKind::Other);
    }
}
