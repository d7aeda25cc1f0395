use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Category, Child, UserProfile},
    protocol::{Credentials, LoginResponse, ProfileInfoUpdate, Session},
};
use tokio::sync::RwLock;
use tracing::{info, warn};
use url::Url;

pub mod error;

pub use error::ClientError;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const CATEGORIES_ROUTE: &str = "category/all";
const CHILDREN_ROUTE: &str = "user/child";
const LOGIN_ROUTE: &str = "auth/login";
const MY_INFO_ROUTE: &str = "user/my-info";

/// Backend contracts the form controllers depend on.
#[async_trait]
pub trait MarketplaceApi: Send + Sync {
    async fn fetch_categories(&self) -> Result<Vec<Category>, ClientError>;
    async fn put_children(&self, children: &[Child]) -> Result<(), ClientError>;
    async fn login(&self, credentials: &Credentials, remember: bool)
        -> Result<Session, ClientError>;
    async fn fetch_profile(&self) -> Result<UserProfile, ClientError>;
    async fn update_profile(&self, info: &ProfileInfoUpdate) -> Result<UserProfile, ClientError>;
}

pub struct HttpMarketplaceClient {
    http: Client,
    base_url: Url,
    access_token: RwLock<Option<String>>,
}

impl HttpMarketplaceClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: normalize_base_url(base_url)?,
            access_token: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn set_access_token(&self, token: Option<String>) {
        *self.access_token.write().await = token;
    }

    pub async fn is_authenticated(&self) -> bool {
        self.access_token.read().await.is_some()
    }

    fn endpoint(&self, route: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(route)?)
    }

    async fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        let guard = self.access_token.read().await;
        let token = guard.as_deref().ok_or(ClientError::Unauthenticated)?;
        Ok(request.bearer_auth(token))
    }
}

#[async_trait]
impl MarketplaceApi for HttpMarketplaceClient {
    async fn fetch_categories(&self) -> Result<Vec<Category>, ClientError> {
        let url = self.endpoint(CATEGORIES_ROUTE)?;
        let res = check_status(self.http.get(url).send().await?).await?;
        let body = res.text().await?;
        let categories = parse_category_list(&body)?;
        info!(count = categories.len(), "fetched category tree");
        Ok(categories)
    }

    async fn put_children(&self, children: &[Child]) -> Result<(), ClientError> {
        let url = self.endpoint(CHILDREN_ROUTE)?;
        let request = self.authorized(self.http.put(url).json(children)).await?;
        check_status(request.send().await?).await?;
        info!(count = children.len(), "saved children");
        Ok(())
    }

    async fn login(
        &self,
        credentials: &Credentials,
        remember: bool,
    ) -> Result<Session, ClientError> {
        let url = self.endpoint(LOGIN_ROUTE)?;
        let res = self.http.post(url).json(credentials).send().await?;
        let res = match check_status(res).await {
            Ok(res) => res,
            Err(err) => {
                warn!(status = ?err.status(), "login rejected: {err}");
                return Err(err);
            }
        };
        let body: LoginResponse = read_json(res).await?;
        let session = Session::from_login(body, remember);
        self.set_access_token(Some(session.access_token.clone()))
            .await;
        info!(username = %session.username, remember, "signed in");
        Ok(session)
    }

    async fn fetch_profile(&self) -> Result<UserProfile, ClientError> {
        let url = self.endpoint(MY_INFO_ROUTE)?;
        let request = self.authorized(self.http.get(url)).await?;
        let res = check_status(request.send().await?).await?;
        read_json(res).await
    }

    async fn update_profile(&self, info: &ProfileInfoUpdate) -> Result<UserProfile, ClientError> {
        let url = self.endpoint(MY_INFO_ROUTE)?;
        let request = self.authorized(self.http.put(url).json(info)).await?;
        let res = check_status(request.send().await?).await?;
        let profile = read_json(res).await?;
        info!("updated profile info");
        Ok(profile)
    }
}

/// Ensures the base path ends with `/` so routes join beneath it instead of
/// replacing its last segment.
fn normalize_base_url(raw: &str) -> Result<Url, ClientError> {
    let trimmed = raw.trim();
    let mut url = Url::parse(trimmed).map_err(|_| ClientError::InvalidUrl(trimmed.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ClientError::InvalidUrl(trimmed.to_string()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

async fn check_status(res: Response) -> Result<Response, ClientError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    Err(ClientError::from_status_body(status.as_u16(), &body))
}

async fn read_json<T: DeserializeOwned>(res: Response) -> Result<T, ClientError> {
    let body = res.text().await?;
    serde_json::from_str(&body).map_err(|err| ClientError::MalformedResponse(err.to_string()))
}

/// An empty body or anything but a JSON array is rejected; an empty array is
/// a valid, empty tree.
fn parse_category_list(body: &str) -> Result<Vec<Category>, ClientError> {
    if body.trim().is_empty() {
        return Err(ClientError::MalformedResponse(
            "category list response is empty".into(),
        ));
    }
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|err| ClientError::MalformedResponse(err.to_string()))?;
    if !value.is_array() {
        return Err(ClientError::MalformedResponse(
            "category list response is not an array".into(),
        ));
    }
    serde_json::from_value(value).map_err(|err| ClientError::MalformedResponse(err.to_string()))
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
