//! The authenticated dispatcher and the typed API surface.
//!
//! [`ApiClient`] is the only path to the server. Every call goes through
//! [`dispatch`](ApiClient::dispatch): attach the stored access token, send,
//! and on a 401 renew the credentials and replay the request exactly once.
//! A replay that fails again is surfaced as-is; there is no second renewal
//! and no second replay, so a server that always rejects cannot trap the
//! client in a loop.

use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::adapters::{FileCredentialsProvider, ReqwestHttpClient};
use crate::api::error::{protocol_error, ApiError};
use crate::api::models::{ApiUser, LoginRequest, RegisterRequest, TokenResponse, UploadResponse};
use crate::api::request::{Method, Request};
use crate::auth::{extract_subject, RefreshCoordinator, TokenPair, TokenStore};
use crate::config::{ClientConfig, ConfigError};
use crate::traits::{CredentialsProvider, HttpClient, HttpError, Response};

/// Client for the Dropline API.
///
/// Owns the process-wide session state: one [`TokenStore`] and one
/// [`RefreshCoordinator`], constructed once and shared by every call.
/// Wrap the client in an [`Arc`] to share it across tasks.
///
/// # Example
///
/// ```ignore
/// use dropline::{ApiClient, ClientConfig};
///
/// let client = ApiClient::new(ClientConfig::default())?;
/// if !client.restore_session().await {
///     client.login("alice", "hunter2").await?;
/// }
/// let me = client.me().await?;
/// println!("signed in as {} ({})", client.subject().unwrap_or_default(), me.email);
/// ```
pub struct ApiClient {
    config: ClientConfig,
    http: Arc<dyn HttpClient>,
    store: Arc<TokenStore>,
    coordinator: RefreshCoordinator,
}

impl ApiClient {
    /// Create a client with the production transport and file-backed
    /// credential storage.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let provider: Arc<dyn CredentialsProvider> = match &config.credentials_path {
            Some(path) => Arc::new(FileCredentialsProvider::with_path(path.clone())),
            None => Arc::new(
                FileCredentialsProvider::new().map_err(|_| ConfigError::NoHomeDirectory)?,
            ),
        };

        let http = Arc::new(
            ReqwestHttpClient::with_timeout(config.timeout)
                .map_err(|err| ConfigError::Transport(err.to_string()))?,
        );

        Ok(Self::with_transport(config, http, provider))
    }

    /// Create a client over injected transport and storage.
    ///
    /// This is the seam tests and embedders use to swap in mocks or a
    /// custom backend.
    pub fn with_transport(
        config: ClientConfig,
        http: Arc<dyn HttpClient>,
        provider: Arc<dyn CredentialsProvider>,
    ) -> Self {
        let store = Arc::new(TokenStore::new(provider));
        let coordinator = RefreshCoordinator::new(store.clone(), http.clone(), &config.base_url);
        Self {
            config,
            http,
            store,
            coordinator,
        }
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Whether a credential pair is currently held.
    pub fn is_authenticated(&self) -> bool {
        self.store.is_authenticated()
    }

    /// The display subject embedded in the stored access token.
    ///
    /// Purely informational; nothing is validated.
    pub fn subject(&self) -> Option<String> {
        self.store
            .access_token()
            .and_then(|token| extract_subject(&token))
    }

    /// Load a persisted session, if one exists.
    ///
    /// Returns `true` when a stored pair was restored.
    pub async fn restore_session(&self) -> bool {
        let restored = self.store.hydrate().await;
        if restored {
            info!("Restored a persisted session");
        }
        restored
    }

    /// Send a request through the authenticated path.
    ///
    /// A 401 on a request that carried a token triggers one credential
    /// renewal and one replay; the replay's response is final. A 401 on an
    /// anonymous request is an ordinary protocol error.
    pub async fn dispatch(&self, request: &Request) -> Result<Response, ApiError> {
        let token = self.store.access_token();
        let response = self.send(request, token.as_deref()).await?;

        if response.status == 401 && token.is_some() {
            debug!("{} {} returned 401, renewing", request.method.as_str(), request.path);
            match self.coordinator.renew().await {
                Ok(fresh_token) => {
                    let replayed = self.send(request, Some(&fresh_token)).await?;
                    return Self::map_response(replayed);
                }
                Err(err) => {
                    warn!("Credential renewal failed: {}", err);
                    return Err(ApiError::Unauthorized);
                }
            }
        }

        Self::map_response(response)
    }

    /// Register a new account. Anonymous.
    pub async fn register(&self, request: &RegisterRequest) -> Result<ApiUser, ApiError> {
        let response = self
            .dispatch(&json_request("/auth/register", request)?)
            .await?;
        info!("Registered account for {}", request.username);
        decode_body(&response)
    }

    /// Sign in and store the resulting credential pair.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response = self.dispatch(&json_request("/auth/login", &request)?).await?;
        let tokens: TokenResponse = decode_body(&response)?;

        self.store
            .set(TokenPair::new(tokens.access_token, tokens.refresh_token))
            .await;
        info!("Signed in as {}", username);
        Ok(())
    }

    /// Sign out.
    ///
    /// The server call is best-effort; the local session is dropped no
    /// matter what, so a dead network cannot trap the user in a session.
    pub async fn logout(&self) {
        if self.is_authenticated() {
            if let Err(err) = self.dispatch(&Request::post("/auth/logout")).await {
                debug!("Logout call failed, clearing locally anyway: {}", err);
            }
        }
        self.store.clear().await;
        info!("Signed out");
    }

    /// Fetch the authenticated account.
    pub async fn me(&self) -> Result<ApiUser, ApiError> {
        let response = self.dispatch(&Request::get("/users/me")).await?;
        decode_body(&response)
    }

    /// Upload one file as `multipart/form-data`.
    pub async fn upload_file(
        &self,
        filename: &str,
        data: Bytes,
    ) -> Result<UploadResponse, ApiError> {
        let request = Request::post_multipart("/upload", "file", filename, data);
        let response = self.dispatch(&request).await?;
        decode_body(&response)
    }

    /// Issue the request with the given token attached, if any.
    async fn send(&self, request: &Request, token: Option<&str>) -> Result<Response, HttpError> {
        let url = format!("{}{}", self.config.base_url, request.path);
        let mut headers = request.headers.clone();
        if let Some(token) = token {
            headers.insert("Authorization".to_string(), format!("Bearer {}", token));
        }

        debug!("{} {}", request.method.as_str(), request.path);
        let result = match request.method {
            Method::Get => self.http.get(&url, &headers).await,
            Method::Post => {
                let body = request.body.clone().unwrap_or_else(Bytes::new);
                self.http.post(&url, body, &headers).await
            }
        };

        if let Ok(response) = &result {
            debug!(
                "{} {} -> {}",
                request.method.as_str(),
                request.path,
                response.status
            );
        }
        result
    }

    /// Fold a completed response into the error taxonomy.
    fn map_response(response: Response) -> Result<Response, ApiError> {
        if response.is_success() {
            Ok(response)
        } else {
            Err(protocol_error(&response))
        }
    }
}

/// Build a JSON request, folding the (practically unreachable) encode
/// failure into the transport class: the request never left the process.
fn json_request<T: serde::Serialize>(path: &str, payload: &T) -> Result<Request, ApiError> {
    Request::post_json(path, payload).map_err(|err| {
        ApiError::Transport(HttpError::Other(format!(
            "failed to encode request body: {}",
            err
        )))
    })
}

/// Decode a success body into its typed shape.
fn decode_body<T: DeserializeOwned>(response: &Response) -> Result<T, ApiError> {
    response.json().map_err(|err| ApiError::Protocol {
        status: response.status,
        message: format!("invalid response body: {}", err),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{InMemoryCredentials, MockHttpClient, MockResponse};
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    const BASE_URL: &str = "http://test.local";

    fn url(path: &str) -> String {
        format!("{}{}", BASE_URL, path)
    }

    fn make_jwt(subject: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"{}"}}"#, subject));
        format!("{}.{}.sig", header, payload)
    }

    async fn test_client(pair: Option<TokenPair>) -> (ApiClient, Arc<MockHttpClient>) {
        let http = Arc::new(MockHttpClient::new());
        let provider = match pair {
            Some(pair) => Arc::new(InMemoryCredentials::with_pair(pair)),
            None => Arc::new(InMemoryCredentials::new()),
        };
        let config = ClientConfig::new().with_base_url(BASE_URL);
        let client = ApiClient::with_transport(config, http.clone(), provider);
        client.restore_session().await;
        (client, http)
    }

    fn ok_json(body: &str) -> MockResponse {
        let mut headers = crate::traits::Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        MockResponse::Success(Response::with_headers(
            200,
            headers,
            Bytes::from(body.to_string()),
        ))
    }

    fn status(code: u16) -> MockResponse {
        MockResponse::Success(Response::new(code, Bytes::new()))
    }

    #[tokio::test]
    async fn test_dispatch_attaches_bearer_token() {
        let (client, http) = test_client(Some(TokenPair::new("tok-1", "ref-1"))).await;
        http.set_response(&url("/users/me"), status(200));

        client.dispatch(&Request::get("/users/me")).await.unwrap();

        let requests = http.get_requests();
        assert_eq!(
            requests[0].headers.get("Authorization"),
            Some(&"Bearer tok-1".to_string())
        );
    }

    #[tokio::test]
    async fn test_anonymous_dispatch_has_no_auth_header() {
        let (client, http) = test_client(None).await;
        http.set_response(&url("/auth/login"), status(200));

        client.dispatch(&Request::post("/auth/login")).await.unwrap();

        let requests = http.get_requests();
        assert!(!requests[0].headers.contains_key("Authorization"));
    }

    #[tokio::test]
    async fn test_401_renews_and_replays_once() {
        let (client, http) = test_client(Some(TokenPair::new("stale", "refresh-1"))).await;
        http.set_response_sequence(
            &url("/users/me"),
            vec![
                status(401),
                ok_json(r#"{"id":1,"email":"a@b.c","is_active":true}"#),
            ],
        );
        http.set_response(
            &url("/auth/refresh"),
            ok_json(r#"{"access_token":"fresh","refresh_token":"refresh-2"}"#),
        );

        let user = client.me().await.unwrap();
        assert_eq!(user.id, 1);

        // One refresh call, two calls to the protected route, and the
        // replay carried the fresh token
        assert_eq!(http.requests_to(&url("/auth/refresh")), 1);
        assert_eq!(http.requests_to(&url("/users/me")), 2);
        let requests = http.get_requests();
        let replay = requests.iter().filter(|r| r.url == url("/users/me")).last().unwrap();
        assert_eq!(
            replay.headers.get("Authorization"),
            Some(&"Bearer fresh".to_string())
        );
    }

    #[tokio::test]
    async fn test_replayed_401_is_not_renewed_again() {
        let (client, http) = test_client(Some(TokenPair::new("stale", "refresh-1"))).await;
        http.set_response(&url("/users/me"), status(401));
        http.set_response(
            &url("/auth/refresh"),
            ok_json(r#"{"access_token":"fresh","refresh_token":"refresh-2"}"#),
        );

        let err = client.me().await.unwrap_err();
        assert!(matches!(err, ApiError::Protocol { status: 401, .. }));

        assert_eq!(http.requests_to(&url("/auth/refresh")), 1);
        assert_eq!(http.requests_to(&url("/users/me")), 2);
    }

    #[tokio::test]
    async fn test_anonymous_401_is_a_protocol_error() {
        let (client, http) = test_client(None).await;
        http.set_response(&url("/users/me"), status(401));

        let err = client.me().await.unwrap_err();
        assert!(matches!(err, ApiError::Protocol { status: 401, .. }));
        assert_eq!(http.requests_to(&url("/auth/refresh")), 0);
    }

    #[tokio::test]
    async fn test_renewal_failure_surfaces_unauthorized() {
        let (client, http) = test_client(Some(TokenPair::new("stale", "bad-refresh"))).await;
        http.set_response(&url("/users/me"), status(401));
        http.set_response(&url("/auth/refresh"), status(403));

        let err = client.me().await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn test_transport_failure_never_triggers_renewal() {
        let (client, http) = test_client(Some(TokenPair::new("tok", "ref"))).await;
        http.set_response(
            &url("/users/me"),
            MockResponse::Error(HttpError::ConnectionFailed("refused".to_string())),
        );

        let err = client.me().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert_eq!(http.requests_to(&url("/auth/refresh")), 0);
        // The pair survives transport failures
        assert!(client.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_stores_pair_and_subject() {
        let (client, http) = test_client(None).await;
        let access = make_jwt("alice");
        http.set_response(
            &url("/auth/login"),
            ok_json(&format!(
                r#"{{"access_token":"{}","refresh_token":"r-1"}}"#,
                access
            )),
        );

        client.login("alice", "hunter2").await.unwrap();

        assert!(client.is_authenticated());
        assert_eq!(client.subject(), Some("alice".to_string()));

        let requests = http.get_requests();
        let body = String::from_utf8_lossy(requests[0].body.as_ref().unwrap()).to_string();
        assert!(body.contains(r#""username":"alice""#));
        assert!(body.contains(r#""password":"hunter2""#));
    }

    #[tokio::test]
    async fn test_login_rejection_is_a_protocol_error() {
        let (client, http) = test_client(None).await;
        http.set_response(
            &url("/auth/login"),
            MockResponse::Success(Response::new(401, Bytes::from("Bad credentials"))),
        );

        let err = client.login("alice", "wrong").await.unwrap_err();
        match err {
            ApiError::Protocol { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Bad credentials");
            }
            other => panic!("expected Protocol, got {:?}", other),
        }
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_clears_even_when_server_fails() {
        let (client, http) = test_client(Some(TokenPair::new("tok", "ref"))).await;
        http.set_response(&url("/auth/logout"), status(500));

        client.logout().await;
        assert!(!client.is_authenticated());
        assert_eq!(http.requests_to(&url("/auth/logout")), 1);
    }

    #[tokio::test]
    async fn test_logout_without_session_skips_server_call() {
        let (client, http) = test_client(None).await;
        client.logout().await;
        assert_eq!(http.get_requests().len(), 0);
    }

    #[tokio::test]
    async fn test_upload_file() {
        let (client, http) = test_client(Some(TokenPair::new("tok", "ref"))).await;
        http.set_response(&url("/upload"), ok_json(r#"{"filename":"report.pdf"}"#));

        let uploaded = client
            .upload_file("report.pdf", Bytes::from_static(b"%PDF"))
            .await
            .unwrap();
        assert_eq!(uploaded.filename, "report.pdf");

        let requests = http.get_requests();
        let content_type = requests[0].headers.get("Content-Type").unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary="));
    }

    #[tokio::test]
    async fn test_success_body_that_fails_to_parse() {
        let (client, http) = test_client(Some(TokenPair::new("tok", "ref"))).await;
        http.set_response(
            &url("/users/me"),
            MockResponse::Success(Response::new(200, Bytes::from("not json"))),
        );

        let err = client.me().await.unwrap_err();
        assert!(matches!(err, ApiError::Protocol { status: 200, .. }));
    }

    #[tokio::test]
    async fn test_subject_without_session() {
        let (client, _http) = test_client(None).await;
        assert_eq!(client.subject(), None);
    }

    #[test]
    fn test_new_validates_config() {
        let config = ClientConfig::new().with_base_url("ftp://nope");
        assert!(matches!(
            ApiClient::new(config),
            Err(ConfigError::InvalidBaseUrl(_))
        ));
    }
}
