use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{
    Client, Method, StatusCode,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use tracing::debug;

use crate::dao::{
    league_store::{LeagueStore, VersionedDocument},
    models::LeagueDocument,
    storage::{StorageError, StorageResult},
};

use super::{
    config::GistConfig,
    error::{GistDaoError, GistResult},
    models::{FileSource, GistResponse, GistUpdate},
};

const GITHUB_JSON: &str = "application/vnd.github+json";

/// League store keeping the whole document as one file of a GitHub gist.
///
/// The gist revision hash doubles as the document version.
#[derive(Clone)]
pub struct GistLeagueStore {
    client: Client,
    gist_url: Arc<str>,
    file_name: Arc<str>,
}

impl GistLeagueStore {
    /// Build the HTTP client and make sure the gist is reachable.
    pub async fn connect(config: GistConfig) -> GistResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_JSON));
        if let Ok(value) = HeaderValue::from_str(&config.user_agent) {
            headers.insert(USER_AGENT, value);
        }
        if let Ok(mut value) = HeaderValue::from_str(&format!("Bearer {}", config.token)) {
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|source| GistDaoError::ClientBuilder { source })?;

        let gist_url = Arc::<str>::from(format!(
            "{}/gists/{}",
            config.api_base.trim_end_matches('/'),
            config.gist_id
        ));

        let store = Self {
            client,
            gist_url,
            file_name: Arc::from(config.file_name),
        };

        store.fetch_gist().await?;
        Ok(store)
    }

    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
        url: &str,
    ) -> GistResult<reqwest::Response> {
        let response = builder
            .send()
            .await
            .map_err(|source| GistDaoError::RequestSend {
                url: url.to_string(),
                source,
            })?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(GistDaoError::RequestStatus {
                url: url.to_string(),
                status: response.status(),
            })
        }
    }

    async fn fetch_gist(&self) -> GistResult<GistResponse> {
        let url = self.gist_url.to_string();
        let response = self
            .send(self.client.request(Method::GET, &url), &url)
            .await?;
        response
            .json::<GistResponse>()
            .await
            .map_err(|source| GistDaoError::DecodeResponse { url, source })
    }

    async fn fetch_raw(&self, raw_url: &str) -> GistResult<String> {
        let response = self.send(self.client.get(raw_url), raw_url).await?;
        response
            .text()
            .await
            .map_err(|source| GistDaoError::DecodeResponse {
                url: raw_url.to_string(),
                source,
            })
    }

    async fn read_document(&self) -> GistResult<Option<VersionedDocument>> {
        let gist = self.fetch_gist().await?;
        let version = gist.latest_version();
        let Some(file) = gist.files.get(self.file_name.as_ref()) else {
            debug!(file = %self.file_name, "league file missing from gist");
            return Ok(None);
        };

        let content = match file.source() {
            FileSource::Inline(content) => content.to_string(),
            FileSource::Raw(raw_url) => self.fetch_raw(raw_url).await?,
            FileSource::Unavailable => {
                return Err(GistDaoError::TruncatedFile {
                    file: self.file_name.to_string(),
                });
            }
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        let document = serde_json::from_str::<LeagueDocument>(&content).map_err(|source| {
            GistDaoError::DeserializeDocument {
                file: self.file_name.to_string(),
                source,
            }
        })?;

        Ok(Some(VersionedDocument { document, version }))
    }

    async fn write_document(&self, document: &LeagueDocument) -> GistResult<Option<String>> {
        let content = serde_json::to_string_pretty(document)
            .map_err(|source| GistDaoError::SerializeDocument { source })?;
        let body = GistUpdate::single(&self.file_name, content);

        let url = self.gist_url.to_string();
        let response = self
            .send(self.client.request(Method::PATCH, &url).json(&body), &url)
            .await?;
        let gist = response
            .json::<GistResponse>()
            .await
            .map_err(|source| GistDaoError::DecodeResponse { url, source })?;

        Ok(gist.latest_version())
    }
}

impl LeagueStore for GistLeagueStore {
    fn load(&self) -> BoxFuture<'static, StorageResult<Option<VersionedDocument>>> {
        let store = self.clone();
        Box::pin(async move { store.read_document().await.map_err(Into::into) })
    }

    fn save(
        &self,
        document: LeagueDocument,
        expected_version: Option<String>,
    ) -> BoxFuture<'static, StorageResult<Option<String>>> {
        let store = self.clone();
        Box::pin(async move {
            // The gist API has no conditional update; compare revisions first.
            if let Some(expected) = expected_version {
                let current = store.fetch_gist().await?.latest_version();
                if current.as_deref() != Some(expected.as_str()) {
                    return Err(StorageError::conflict(expected, current));
                }
            }

            let version = store.write_document(&document).await?;
            debug!(version = ?version, "league document written to gist");
            Ok(version)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let url = store.gist_url.to_string();
            let response = store
                .client
                .head(&url)
                .send()
                .await
                .map_err(|source| GistDaoError::RequestSend {
                    url: url.clone(),
                    source,
                })?;

            match response.status() {
                status if status.is_success() => Ok(()),
                StatusCode::METHOD_NOT_ALLOWED => {
                    store.fetch_gist().await?;
                    Ok(())
                }
                status => Err(GistDaoError::RequestStatus { url, status }.into()),
            }
        })
    }
}
