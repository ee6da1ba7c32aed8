use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Subset of the gist resource returned by `GET/PATCH /gists/{id}`.
#[derive(Debug, Deserialize)]
pub struct GistResponse {
    #[serde(default)]
    pub files: IndexMap<String, GistFile>,
    #[serde(default)]
    pub history: Vec<GistRevision>,
}

impl GistResponse {
    /// Most recent revision hash, used as the document version.
    pub fn latest_version(&self) -> Option<String> {
        self.history.first().map(|revision| revision.version.clone())
    }
}

#[derive(Debug, Deserialize)]
pub struct GistFile {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub truncated: bool,
    #[serde(default)]
    pub raw_url: Option<String>,
}

/// Where the full text of a gist file can be read.
#[derive(Debug, PartialEq, Eq)]
pub enum FileSource<'a> {
    Inline(&'a str),
    /// The API cut the inline content short; fetch it from `raw_url`.
    Raw(&'a str),
    Unavailable,
}

impl GistFile {
    pub fn source(&self) -> FileSource<'_> {
        match (&self.content, self.truncated, &self.raw_url) {
            (Some(content), false, _) => FileSource::Inline(content.as_str()),
            (_, _, Some(raw_url)) => FileSource::Raw(raw_url.as_str()),
            _ => FileSource::Unavailable,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GistRevision {
    pub version: String,
}

/// Body of the `PATCH /gists/{id}` request replacing one file.
#[derive(Debug, Serialize)]
pub struct GistUpdate<'a> {
    pub files: IndexMap<&'a str, GistFileUpdate>,
}

#[derive(Debug, Serialize)]
pub struct GistFileUpdate {
    pub content: String,
}

impl<'a> GistUpdate<'a> {
    pub fn single(file_name: &'a str, content: String) -> Self {
        let mut files = IndexMap::new();
        files.insert(file_name, GistFileUpdate { content });
        Self { files }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_gist() -> GistResponse {
        serde_json::from_value(json!({
            "id": "aa5a315d61ae9438b18d",
            "files": {
                "league.json": {
                    "filename": "league.json",
                    "content": "{\"standings\":",
                    "truncated": true,
                    "raw_url": "https://gist.githubusercontent.com/raw/league.json"
                },
                "notes.md": {
                    "filename": "notes.md",
                    "content": "# notes",
                    "truncated": false,
                    "raw_url": "https://gist.githubusercontent.com/raw/notes.md"
                }
            },
            "history": [
                {
                    "version": "57a7f021a713b1c5a6a199b54cc514735d2d462f",
                    "committed_at": "2026-05-02T10:00:00Z"
                },
                {"version": "0a1b2c3d", "committed_at": "2026-04-01T10:00:00Z"}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn version_is_the_newest_revision() {
        let gist = sample_gist();
        assert_eq!(
            gist.latest_version().as_deref(),
            Some("57a7f021a713b1c5a6a199b54cc514735d2d462f")
        );

        let empty: GistResponse = serde_json::from_value(json!({"files": {}})).unwrap();
        assert_eq!(empty.latest_version(), None);
    }

    #[test]
    fn truncated_file_is_read_from_raw_url() {
        let gist = sample_gist();

        assert_eq!(
            gist.files["league.json"].source(),
            FileSource::Raw("https://gist.githubusercontent.com/raw/league.json")
        );
        assert_eq!(gist.files["notes.md"].source(), FileSource::Inline("# notes"));

        let lost: GistFile =
            serde_json::from_value(json!({"content": "{", "truncated": true})).unwrap();
        assert_eq!(lost.source(), FileSource::Unavailable);
    }

    #[test]
    fn update_body_replaces_one_file() {
        let body = serde_json::to_value(GistUpdate::single("league.json", "{}".into())).unwrap();
        assert_eq!(body, json!({"files": {"league.json": {"content": "{}"}}}));
    }
}
