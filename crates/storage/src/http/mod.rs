//! REST adapter for the platform's category service.

use std::env;
use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::repository::{CategoryRepository, Storage, StorageError};

mod category_repo;
mod wire;

pub const API_URL_VAR: &str = "STUDY_API_URL";
pub const API_TOKEN_VAR: &str = "STUDY_API_TOKEN";

/// Where the category service lives and how to authenticate against it.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: Url,
    pub token: Option<String>,
}

impl ApiConfig {
    /// Parse and validate the service base URL.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidConfig` if the URL does not parse or is not http(s).
    pub fn new(base_url: &str) -> Result<Self, StorageError> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| StorageError::InvalidConfig(format!("{base_url}: {e}")))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(StorageError::InvalidConfig(format!(
                "unsupported scheme {}",
                base_url.scheme()
            )));
        }
        Ok(Self {
            base_url,
            token: None,
        })
    }

    /// Attach a bearer token. Blank tokens are ignored.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = Some(token.trim().to_string()).filter(|t| !t.is_empty());
        self
    }

    /// Read `STUDY_API_URL` and the optional `STUDY_API_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidConfig` if the URL is missing or invalid.
    pub fn from_env() -> Result<Self, StorageError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env` with a custom variable source.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidConfig` if the URL is missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, StorageError> {
        let url = lookup(API_URL_VAR)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| StorageError::InvalidConfig(format!("{API_URL_VAR} is not set")))?;
        let config = Self::new(&url)?;
        Ok(match lookup(API_TOKEN_VAR) {
            Some(token) => config.with_token(token),
            None => config,
        })
    }
}

/// Category repository backed by the REST API.
#[derive(Clone)]
pub struct HttpCategoryRepository {
    client: Client,
    config: ApiConfig,
}

impl HttpCategoryRepository {
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// `<base>/api/v1/categories/<segments..>`, each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, StorageError> {
        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                StorageError::InvalidConfig(format!("{} cannot be a base URL", self.config.base_url))
            })?
            .pop_if_empty()
            .extend(["api", "v1", "categories"])
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.config.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, StorageError> {
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!(url = %response.url(), %status, "category service responded");

        if status == StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound);
        }
        let body = response.text().await?;
        if !status.is_success() {
            return Err(wire::rejection(status.as_u16(), &body));
        }
        serde_json::from_str(&body).map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

impl Storage {
    /// Build a `Storage` talking to the REST category service.
    #[must_use]
    pub fn http(config: ApiConfig) -> Self {
        let categories: Arc<dyn CategoryRepository> = Arc::new(HttpCategoryRepository::new(config));
        Self { categories }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let owned: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| owned.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
    }

    #[test]
    fn config_requires_url() {
        let err = ApiConfig::from_lookup(env_of(&[])).unwrap_err();
        assert!(matches!(err, StorageError::InvalidConfig(_)));
    }

    #[test]
    fn config_reads_url_and_token() {
        let config = ApiConfig::from_lookup(env_of(&[
            (API_URL_VAR, "http://localhost:8180"),
            (API_TOKEN_VAR, " secret "),
        ]))
        .unwrap();
        assert_eq!(config.base_url.as_str(), "http://localhost:8180/");
        assert_eq!(config.token.as_deref(), Some("secret"));
    }

    #[test]
    fn blank_token_is_ignored() {
        let config = ApiConfig::new("http://localhost").unwrap().with_token("  ");
        assert!(config.token.is_none());
    }

    #[test]
    fn config_rejects_non_http_scheme() {
        assert!(ApiConfig::new("ftp://example.com").is_err());
        assert!(ApiConfig::new("not a url").is_err());
    }

    #[test]
    fn endpoint_appends_and_encodes_segments() {
        let repo = HttpCategoryRepository::new(ApiConfig::new("http://api.local/").unwrap());
        assert_eq!(
            repo.endpoint(&[]).unwrap().as_str(),
            "http://api.local/api/v1/categories"
        );
        assert_eq!(
            repo.endpoint(&["name", "Direito Penal"]).unwrap().as_str(),
            "http://api.local/api/v1/categories/name/Direito%20Penal"
        );
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let repo = HttpCategoryRepository::new(ApiConfig::new("http://api.local/study").unwrap());
        assert_eq!(
            repo.endpoint(&["cat_1"]).unwrap().as_str(),
            "http://api.local/study/api/v1/categories/cat_1"
        );
    }
}
