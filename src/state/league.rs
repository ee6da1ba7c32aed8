//! In-memory working copy of the League Document.
//!
//! [`League`] owns every collection of the document and exposes the domain
//! operations (spread over the sibling modules) that mutate it. A mutation
//! either succeeds completely or returns a [`LeagueError`] without touching
//! anything.

use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;
use time::{
    Date, OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description,
};

use crate::dao::models::{
    ActivityEntity, ActivityKind, EntityId, LeagueDocument, LeagueInfoEntity, NewsEntity,
    RegistrationEntity,
};
use crate::state::{
    match_lifecycle::{InvalidTransition, Match},
    standings::Team,
};

/// Actor recorded on activities triggered from the admin surface.
pub const ADMIN_ACTOR: &str = "admin";

/// Errors raised by domain operations on the league.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LeagueError {
    /// Input rejected before any mutation took place.
    #[error("{0}")]
    Validation(String),
    /// The referenced entity does not exist.
    #[error("{kind} `{key}` not found")]
    NotFound { kind: &'static str, key: String },
    /// The match is not in a status accepting the requested event.
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
}

impl LeagueError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        LeagueError::Validation(message.into())
    }

    pub(crate) fn not_found(kind: &'static str, key: impl ToString) -> Self {
        LeagueError::NotFound {
            kind,
            key: key.to_string(),
        }
    }
}

/// Input accepted by [`League::add_news`].
#[derive(Debug, Clone)]
pub struct NewNews {
    pub title: String,
    pub content: String,
    pub image: Option<String>,
}

/// Working copy of the league.
#[derive(Debug, Clone)]
pub struct League {
    /// League metadata, point weights and free-form settings.
    pub info: LeagueInfoEntity,
    /// Standings table in insertion order.
    pub teams: Vec<Team>,
    pub matches: Vec<Match>,
    /// News feed, newest first.
    pub news: Vec<NewsEntity>,
    /// Pending registrations in submission order.
    pub registrations: Vec<RegistrationEntity>,
    /// Activity log, newest first.
    pub activities: Vec<ActivityEntity>,
    activity_limit: usize,
    last_id: EntityId,
}

impl League {
    /// Build the working copy from a stored document.
    ///
    /// The activity log is trimmed to `activity_limit` entries.
    pub fn from_document(document: LeagueDocument, activity_limit: usize) -> Self {
        let LeagueDocument {
            league,
            standings,
            matches,
            news,
            pending_registrations,
            mut activities,
        } = document;

        activities.truncate(activity_limit);

        let last_id = matches
            .iter()
            .map(|m| m.id)
            .chain(news.iter().map(|n| n.id))
            .chain(pending_registrations.iter().map(|r| r.id))
            .chain(activities.iter().map(|a| a.id))
            .max()
            .unwrap_or_default();

        Self {
            info: league,
            teams: standings.into_iter().map(Team::from).collect(),
            matches: matches.into_iter().map(Match::from).collect(),
            news,
            registrations: pending_registrations,
            activities,
            activity_limit,
            last_id,
        }
    }

    /// Serialize the working copy back into its persisted shape.
    pub fn to_document(&self) -> LeagueDocument {
        LeagueDocument {
            league: self.info.clone(),
            standings: self.teams.iter().cloned().map(Into::into).collect(),
            matches: self.matches.iter().cloned().map(Into::into).collect(),
            news: self.news.clone(),
            pending_registrations: self.registrations.clone(),
            activities: self.activities.clone(),
        }
    }

    /// Mint a time-based identifier, strictly greater than any previous one.
    pub fn next_id(&mut self) -> EntityId {
        self.last_id = now_millis().max(self.last_id + 1);
        self.last_id
    }

    /// Prepend an activity entry and drop the oldest ones past the limit.
    pub fn record(
        &mut self,
        kind: ActivityKind,
        message: impl Into<String>,
        user: &str,
    ) -> EntityId {
        let id = self.next_id();
        self.activities.insert(
            0,
            ActivityEntity {
                id,
                kind,
                message: message.into(),
                date: now_rfc3339(),
                user: user.to_string(),
            },
        );
        self.activities.truncate(self.activity_limit);
        id
    }

    /// Remove a previously recorded activity.
    pub(crate) fn forget_activity(&mut self, id: EntityId) {
        self.activities.retain(|activity| activity.id != id);
    }

    /// The `limit` most recent activities.
    pub fn recent_activities(&self, limit: usize) -> &[ActivityEntity] {
        &self.activities[..limit.min(self.activities.len())]
    }

    /// Publish a news item at the top of the feed.
    pub fn add_news(&mut self, news: NewNews) -> Result<NewsEntity, LeagueError> {
        let title = required(&news.title, "news title")?;
        let content = required(&news.content, "news content")?;
        let image = optional(news.image);

        let item = NewsEntity {
            id: self.next_id(),
            title,
            content,
            image,
            date: now_rfc3339(),
        };
        self.news.insert(0, item.clone());
        self.record(
            ActivityKind::News,
            format!("News published: {}", item.title),
            ADMIN_ACTOR,
        );
        Ok(item)
    }

    /// Remove a news item.
    pub fn delete_news(&mut self, id: EntityId) -> Result<NewsEntity, LeagueError> {
        let index = self
            .news
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| LeagueError::not_found("news", id))?;
        let removed = self.news.remove(index);
        self.record(
            ActivityKind::News,
            format!("News deleted: {}", removed.title),
            ADMIN_ACTOR,
        );
        Ok(removed)
    }

    /// The `limit` newest news items.
    pub fn latest_news(&self, limit: usize) -> &[NewsEntity] {
        &self.news[..limit.min(self.news.len())]
    }
}

/// Trimmed copy of a required text field.
pub(crate) fn required(value: &str, field: &str) -> Result<String, LeagueError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LeagueError::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Trimmed copy of an optional text field, `None` when blank.
pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Case-insensitive name comparison over the full Unicode range, ignoring
/// surrounding whitespace.
pub fn same_name(a: &str, b: &str) -> bool {
    a.trim()
        .chars()
        .flat_map(char::to_lowercase)
        .eq(b.trim().chars().flat_map(char::to_lowercase))
}

/// Milliseconds since the Unix epoch, the base of every entity id.
pub fn now_millis() -> EntityId {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as EntityId)
        .unwrap_or_default()
}

/// Current UTC time formatted as RFC 3339.
pub fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

/// Calendar date in the `YYYY-MM-DD` form used by fixtures.
pub fn format_match_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::dao::models::TeamEntity;

    pub(crate) fn league_with_teams(names: &[&str]) -> League {
        let document = LeagueDocument {
            standings: names
                .iter()
                .map(|name| TeamEntity {
                    name: (*name).into(),
                    owner: format!("{name} owner"),
                    stats: Default::default(),
                    email: None,
                    phone: None,
                })
                .collect(),
            ..LeagueDocument::default()
        };
        League::from_document(document, 50)
    }

    #[test]
    fn ids_are_strictly_increasing() {
        let mut league = league_with_teams(&[]);
        let first = league.next_id();
        let second = league.next_id();
        let third = league.next_id();
        assert!(first < second && second < third);
    }

    #[test]
    fn ids_stay_above_loaded_ones() {
        let far_future = u64::MAX / 2;
        let document = LeagueDocument {
            news: vec![NewsEntity {
                id: far_future,
                title: "t".into(),
                content: "c".into(),
                image: None,
                date: String::new(),
            }],
            ..LeagueDocument::default()
        };
        let mut league = League::from_document(document, 50);
        assert_eq!(league.next_id(), far_future + 1);
    }

    #[test]
    fn activity_log_keeps_most_recent_entries() {
        let mut league = League::from_document(LeagueDocument::default(), 20);
        for i in 0..25 {
            league.record(ActivityKind::System, format!("event {i}"), ADMIN_ACTOR);
        }

        assert_eq!(league.activities.len(), 20);
        assert_eq!(league.activities[0].message, "event 24");
        assert_eq!(league.activities[19].message, "event 5");
    }

    #[test]
    fn loaded_activity_log_is_trimmed() {
        let mut source = League::from_document(LeagueDocument::default(), 50);
        for i in 0..40 {
            source.record(ActivityKind::System, format!("event {i}"), ADMIN_ACTOR);
        }

        let league = League::from_document(source.to_document(), 30);

        assert_eq!(league.activities.len(), 30);
        assert_eq!(league.activities[0].message, "event 39");
    }

    #[test]
    fn news_is_prepended_and_deletable() {
        let mut league = league_with_teams(&[]);
        let first = league
            .add_news(NewNews {
                title: "Kickoff".into(),
                content: "Season starts".into(),
                image: Some("  ".into()),
            })
            .unwrap();
        let second = league
            .add_news(NewNews {
                title: "Week 2".into(),
                content: "Results".into(),
                image: None,
            })
            .unwrap();

        assert_eq!(first.image, None);
        assert_eq!(league.latest_news(1)[0].id, second.id);

        league.delete_news(second.id).unwrap();
        assert_eq!(league.latest_news(6).len(), 1);
        assert!(matches!(
            league.delete_news(second.id),
            Err(LeagueError::NotFound { kind: "news", .. })
        ));
    }

    #[test]
    fn news_requires_title_and_content() {
        let mut league = league_with_teams(&[]);
        let err = league
            .add_news(NewNews {
                title: " ".into(),
                content: "body".into(),
                image: None,
            })
            .unwrap_err();
        assert!(matches!(err, LeagueError::Validation(_)));
        assert!(league.news.is_empty());
        assert!(league.activities.is_empty());
    }

    #[test]
    fn match_dates_use_iso_calendar_format() {
        let date = Date::from_calendar_date(2026, time::Month::March, 7).unwrap();
        assert_eq!(format_match_date(date), "2026-03-07");
    }
}
