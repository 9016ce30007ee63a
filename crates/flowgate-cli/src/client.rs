//! HTTP client for the gateway API.
//!
//! [`GatewayClient`] keeps the session cookie in a cookie store, so after
//! [`Gateway::login`] the data calls are authenticated the same way a
//! browser would be.

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use flowgate_core::{CategoryRecord, FilterSelection, FlowRecord};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A data route answered 401: the session is gone.
    #[error("Session expired. Please login again.")]
    SessionExpired,

    /// The gateway answered with an error body.
    #[error("{code} ({status}): {message}")]
    Rejected {
        status: u16,
        code: String,
        message: String,
    },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl ClientError {
    /// Whether the failure is about credentials rather than transport or data.
    pub fn is_auth(&self) -> bool {
        match self {
            ClientError::SessionExpired => true,
            ClientError::Rejected { status, .. } => *status == 401 || *status == 503,
            ClientError::Http(_) => false,
        }
    }
}

/// The signed-in user as reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionUser {
    pub email: String,
    pub name: String,
    pub oid: String,
}

#[derive(Deserialize)]
struct LoginResponse {
    user: SessionUser,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// The calls the explorer makes against the gateway.
pub trait Gateway {
    async fn login(&mut self, token: &str) -> Result<SessionUser, ClientError>;
    async fn categories(&mut self) -> Result<Vec<CategoryRecord>, ClientError>;
    async fn flows(&mut self, selection: &FilterSelection) -> Result<Vec<FlowRecord>, ClientError>;
    async fn logout(&mut self) -> Result<(), ClientError>;
}

pub struct GatewayClient {
    base: String,
    http: reqwest::Client,
}

impl GatewayClient {
    /// A client for the gateway at `base` (for example `http://localhost:3000`).
    pub fn new(base: &str) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(GatewayClient {
            base: base.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base, path)
    }
}

/// Decodes a success body, or turns an error response into a [`ClientError`].
/// `expire_on_401` marks routes where 401 means the session lapsed.
async fn decode<T: DeserializeOwned>(
    response: Response,
    expire_on_401: bool,
) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    if expire_on_401 && status == StatusCode::UNAUTHORIZED {
        return Err(ClientError::SessionExpired);
    }

    let text = response.text().await?;
    let (code, message) = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => (body.error.code, body.error.message),
        Err(_) => ("HTTP_ERROR".to_string(), text),
    };
    Err(ClientError::Rejected {
        status: status.as_u16(),
        code,
        message,
    })
}

impl Gateway for GatewayClient {
    async fn login(&mut self, token: &str) -> Result<SessionUser, ClientError> {
        let response = self
            .http
            .post(self.url("/auth/token"))
            .json(&serde_json::json!({ "token": token }))
            .send()
            .await?;
        let body: LoginResponse = decode(response, false).await?;
        Ok(body.user)
    }

    async fn categories(&mut self) -> Result<Vec<CategoryRecord>, ClientError> {
        let response = self.http.get(self.url("/filters/categories")).send().await?;
        decode(response, true).await
    }

    async fn flows(&mut self, selection: &FilterSelection) -> Result<Vec<FlowRecord>, ClientError> {
        let response = self
            .http
            .post(self.url("/data/sankey"))
            .json(&serde_json::json!({ "filters": selection }))
            .send()
            .await?;
        decode(response, true).await
    }

    async fn logout(&mut self) -> Result<(), ClientError> {
        let response = self.http.post(self.url("/auth/logout")).send().await?;
        let _: serde_json::Value = decode(response, false).await?;
        Ok(())
    }
}
