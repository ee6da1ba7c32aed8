use super::error::{GistDaoError, GistResult};

const DEFAULT_API_BASE: &str = "https://api.github.com";
const DEFAULT_FILE_NAME: &str = "data.json";
const DEFAULT_USER_AGENT: &str = "league-back";

/// Runtime configuration describing which gist file holds the league.
#[derive(Debug, Clone)]
pub struct GistConfig {
    pub api_base: String,
    pub gist_id: String,
    pub token: String,
    pub file_name: String,
    pub user_agent: String,
}

impl GistConfig {
    /// Construct a configuration for the given gist and access token.
    pub fn new(gist_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.into(),
            gist_id: gist_id.into(),
            token: token.into(),
            file_name: DEFAULT_FILE_NAME.into(),
            user_agent: DEFAULT_USER_AGENT.into(),
        }
    }

    /// Store the league under another file of the gist.
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// Point the client at another GitHub API host.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Build a configuration by reading the expected environment variables.
    pub fn from_env() -> GistResult<Self> {
        let gist_id = non_empty_var("GIST_ID")?;
        let token = non_empty_var("GITHUB_TOKEN")?;

        let mut config = Self::new(gist_id, token);
        if let Ok(file_name) = non_empty_var("GIST_FILE_NAME") {
            config = config.with_file_name(file_name);
        }
        if let Ok(api_base) = non_empty_var("GITHUB_API_URL") {
            config = config.with_api_base(api_base);
        }

        Ok(config)
    }
}

fn non_empty_var(var: &'static str) -> GistResult<String> {
    std::env::var(var)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or(GistDaoError::MissingEnvVar { var })
}
