use api_types::ErrorResponse;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    auth::AuthSession,
    error::{Result, TrackerError},
};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{status}: {message}")]
    Server { status: StatusCode, message: String },
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

/// Thin JSON client over the tracking backend.
///
/// Every request carries the session bearer token when one is set.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    auth: AuthSession,
}

impl ApiClient {
    pub fn new(base_url: &str, auth: AuthSession) -> Result<Self> {
        Self::with_client(Client::new(), base_url, auth)
    }

    pub fn with_client(http: Client, base_url: &str, auth: AuthSession) -> Result<Self> {
        let base_url =
            Url::parse(base_url).map_err(|err| TrackerError::InvalidUrl(err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(TrackerError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self {
            http,
            base_url,
            auth,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, segments: &[&str]) -> std::result::Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let req = self.http.request(method, url);
        match self.auth.token() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// `GET /{collection}`.
    ///
    /// Records are decoded one by one; a record that does not decode is
    /// logged and skipped so the rest of the collection still loads.
    pub async fn list<T: DeserializeOwned>(
        &self,
        collection: &str,
    ) -> std::result::Result<Vec<T>, ApiError> {
        let url = self.url(&[collection])?;
        let resp = self.request(Method::GET, url).send().await?;
        let raw: Vec<Value> = Self::json(resp).await?;
        Ok(decode_records(collection, raw))
    }

    /// `POST /{collection}`, returns the created record.
    pub async fn create<TReq, TResp>(
        &self,
        collection: &str,
        body: &TReq,
    ) -> std::result::Result<TResp, ApiError>
    where
        TReq: Serialize + ?Sized,
        TResp: DeserializeOwned,
    {
        let url = self.url(&[collection])?;
        let resp = self.request(Method::POST, url).json(body).send().await?;
        Self::json(resp).await
    }

    /// `PUT /{collection}/{id}`, returns the updated record.
    pub async fn update<TReq, TResp>(
        &self,
        collection: &str,
        id: &str,
        body: &TReq,
    ) -> std::result::Result<TResp, ApiError>
    where
        TReq: Serialize + ?Sized,
        TResp: DeserializeOwned,
    {
        let url = self.url(&[collection, id])?;
        let resp = self.request(Method::PUT, url).json(body).send().await?;
        Self::json(resp).await
    }

    /// `DELETE /{collection}/{id}`. Any response body is ignored.
    pub async fn delete(&self, collection: &str, id: &str) -> std::result::Result<(), ApiError> {
        let url = self.url(&[collection, id])?;
        let resp = self.request(Method::DELETE, url).send().await?;
        if resp.status().is_success() {
            return Ok(());
        }
        Err(Self::server_error(resp).await)
    }

    async fn json<T: DeserializeOwned>(resp: Response) -> std::result::Result<T, ApiError> {
        if resp.status().is_success() {
            return Ok(resp.json::<T>().await?);
        }
        Err(Self::server_error(resp).await)
    }

    async fn server_error(resp: Response) -> ApiError {
        let status = resp.status();
        let message = match resp.json::<ErrorResponse>().await {
            Ok(err) => err.error,
            Err(_) => "server error".to_string(),
        };
        ApiError::Server { status, message }
    }
}

fn decode_records<T: DeserializeOwned>(collection: &str, raw: Vec<Value>) -> Vec<T> {
    raw.into_iter()
        .filter_map(|record| match serde_json::from_value(record.clone()) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                tracing::warn!("skipping malformed {collection} record {record}: {err}");
                None
            }
        })
        .collect()
}
