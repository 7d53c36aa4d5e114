//! HTTP client for the platform API

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use sire_auth::{AuthApi, AuthError, BearerToken, Session};

use crate::error::ApiError;
use crate::Result;

const LOGIN_PATH: &str = "auth/token/";
const REFRESH_PATH: &str = "auth/token/refresh/";

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    token: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    token: String,
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    bearer: BearerToken,
}

impl ApiClient {
    pub fn new(base_url: &str, bearer: BearerToken) -> Result<Self> {
        // A base URL without a trailing slash would drop its last path
        // segment on join
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };

        Ok(Self {
            http: reqwest::Client::new(),
            base_url: Url::parse(&normalized)?,
            bearer,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// POST a JSON body, attaching `Authorization: Bearer <token>` when a
    /// token is set, and fail on non-2xx statuses.
    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response> {
        let url = self.endpoint(path)?;
        let mut request = self.http.post(url).json(body);
        if let Some(authorization) = self.bearer.header_value() {
            request = request.header(reqwest::header::AUTHORIZATION, authorization);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(%status, path, "API request rejected");
            return Err(ApiError::Status { status });
        }
        Ok(response)
    }

    /// `POST auth/token/` — exchange credentials for a session payload.
    pub async fn login_request(&self, username: &str, password: &str) -> Result<Session> {
        let response = self
            .post_json(LOGIN_PATH, &Credentials { username, password })
            .await?;
        Ok(response.json::<Session>().await?)
    }

    /// `POST auth/token/refresh/` — exchange a token for a fresh one.
    pub async fn refresh_request(&self, token: &str) -> Result<String> {
        let response = self
            .post_json(REFRESH_PATH, &RefreshRequest { token })
            .await?;
        Ok(response.json::<RefreshResponse>().await?.token)
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn login(&self, username: &str, password: &str) -> sire_auth::Result<Session> {
        self.login_request(username, password)
            .await
            .map_err(|e| AuthError::Authentication(e.to_string()))
    }

    async fn refresh_token(&self, token: &str) -> sire_auth::Result<String> {
        self.refresh_request(token)
            .await
            .map_err(|e| AuthError::RefreshTransport(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_join() {
        let client = ApiClient::new("https://api.example.edu/v1", BearerToken::new()).unwrap();
        assert_eq!(
            client.endpoint(LOGIN_PATH).unwrap().as_str(),
            "https://api.example.edu/v1/auth/token/"
        );
        assert_eq!(
            client.endpoint(REFRESH_PATH).unwrap().as_str(),
            "https://api.example.edu/v1/auth/token/refresh/"
        );
    }

    #[test]
    fn test_request_body_shapes() {
        let creds = serde_json::to_value(&Credentials {
            username: "ana",
            password: "secret",
        })
        .unwrap();
        assert_eq!(creds, serde_json::json!({"username": "ana", "password": "secret"}));

        let refresh = serde_json::to_value(&RefreshRequest { token: "abc" }).unwrap();
        assert_eq!(refresh, serde_json::json!({"token": "abc"}));
    }

    #[test]
    fn test_rejects_bad_base_url() {
        assert!(ApiClient::new("not a url", BearerToken::new()).is_err());
    }
}
