//! REST clients for the marketplace backend.
//!
//! [`AuthenticatedClient`] is the gateway for every call made on behalf of
//! the signed-in user: it attaches the session's bearer credential and logs
//! the session out when the backend rejects it. [`PublicClient`] talks to the
//! same backend without ever sending a credential.

use std::fmt;
use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, trace, warn};

use etuition_core::error::InvalidInputError;
use etuition_core::{ApiError, ApiUrl, AuthRejectionHandler, Error, Result, SessionStore};

use crate::config::ClientConfig;

/// Per-call headers and JSON body.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    headers: HeaderMap,
    body: Option<Value>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header, replacing any earlier value with the same name.
    pub fn header(mut self, name: &str, value: &str) -> Result<Self> {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| InvalidInputError::Header {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| InvalidInputError::Header {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    /// Merge a prepared header map.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Serialize `body` as the JSON request body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|e| InvalidInputError::Other {
            message: format!("request body is not serializable: {e}"),
        })?;
        self.body = Some(value);
        Ok(self)
    }

    /// Use an already-built JSON value as the request body.
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// A successful (2xx) response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Parsed JSON body; `null` when the body was empty.
    pub body: Value,
}

impl ApiResponse {
    /// Decode the body into `R`.
    pub fn json<R: DeserializeOwned>(self) -> Result<R> {
        serde_json::from_value(self.body).map_err(|e| Error::Decode {
            message: e.to_string(),
        })
    }
}

/// Dispatch and status classification shared by both clients.
#[derive(Debug, Clone)]
struct Transport {
    http: reqwest::Client,
    base: ApiUrl,
}

impl Transport {
    fn new(config: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(|e| InvalidInputError::Other {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            base: config.base_url.clone(),
        })
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        headers: HeaderMap,
        body: Option<Value>,
    ) -> Result<ApiResponse> {
        let url = self.base.endpoint_url(path)?;
        debug!(%method, %url, "API request");

        let mut request = self.http.request(method, &url).headers(headers);
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(network_error)?;
        let status = response.status();
        trace!(status = %status, "API response");

        if status.is_success() {
            let bytes = response.bytes().await.map_err(network_error)?;
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).map_err(|e| Error::Decode {
                    message: e.to_string(),
                })?
            };
            Ok(ApiResponse {
                status: status.as_u16(),
                body,
            })
        } else {
            Err(Error::from_status(parse_error_response(response).await))
        }
    }
}

/// Map a transport failure. None of these carry a status, so none of them
/// can log the session out.
fn network_error(err: reqwest::Error) -> Error {
    let message = if err.is_timeout() {
        format!("request timed out: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    };
    Error::Network { message }
}

/// Build an [`ApiError`] from a non-2xx response.
///
/// The backend sends `{ "message": ... }` for most failures; anything else
/// falls back to the reason phrase.
async fn parse_error_response(response: Response) -> ApiError {
    let status = response.status();
    let payload = match response.bytes().await {
        Ok(bytes) if !bytes.is_empty() => serde_json::from_slice::<Value>(&bytes).ok(),
        _ => None,
    };

    let message = payload
        .as_ref()
        .and_then(|p| {
            p.get("message")
                .or_else(|| p.get("error"))
                .and_then(Value::as_str)
        })
        .map(str::to_string)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or_default().to_string());

    ApiError::new(status.as_u16(), message, payload)
}

/// Gateway for calls that need the caller's identity.
///
/// Reads one session snapshot per call. When the snapshot has an identity and
/// a credential, the request carries `Authorization: Bearer <credential>`
/// (replacing any caller-supplied value); otherwise it goes out
/// unauthenticated. A 401 or 403 response runs the rejection handler, which
/// by default logs the session out, and the error is still returned.
///
/// Cheap to clone. Calls are independent; dropping a returned future
/// abandons the call without running the rejection handler.
///
/// # Example
///
/// ```no_run
/// use etuition_http::{AuthenticatedClient, RequestOptions};
/// use etuition_core::{ApiUrl, SessionStore};
/// use reqwest::Method;
///
/// # async fn example() -> etuition_core::Result<()> {
/// let session = SessionStore::new();
/// let client = AuthenticatedClient::new(ApiUrl::new("https://api.etuition.test")?, session)?;
///
/// let stats = client
///     .request(Method::GET, "/admin-stats", RequestOptions::new())
///     .await?;
/// println!("{}", stats.body);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AuthenticatedClient {
    transport: Transport,
    session: SessionStore,
    on_rejected: Arc<dyn AuthRejectionHandler>,
}

impl AuthenticatedClient {
    /// Create a client for `base_url` with default settings.
    pub fn new(base_url: ApiUrl, session: SessionStore) -> Result<Self> {
        Self::with_config(ClientConfig::new(base_url), session)
    }

    /// Create a client from explicit settings.
    pub fn with_config(config: ClientConfig, session: SessionStore) -> Result<Self> {
        Ok(Self {
            transport: Transport::new(&config)?,
            on_rejected: Arc::new(session.clone()),
            session,
        })
    }

    /// Replace the reaction to 401/403 responses (default: log the session out).
    pub fn on_auth_rejected(mut self, handler: impl AuthRejectionHandler + 'static) -> Self {
        self.on_rejected = Arc::new(handler);
        self
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &ApiUrl {
        &self.transport.base
    }

    /// The session this client reads credentials from.
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// A credential-free client sharing this client's connection pool.
    pub fn public(&self) -> PublicClient {
        PublicClient {
            transport: self.transport.clone(),
        }
    }

    /// Perform a request against the backend.
    ///
    /// # Errors
    ///
    /// - [`Error::Network`] if no response arrived (session untouched)
    /// - [`Error::AuthRejected`] on 401/403, after the rejection handler ran
    /// - [`Error::Client`] / [`Error::Server`] on other non-2xx statuses
    /// - [`Error::Decode`] if a 2xx body is not JSON
    #[instrument(skip(self, options), fields(api = %self.transport.base))]
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse> {
        let session = self.session.snapshot();
        let mut headers = options.headers;

        if let Some(token) = session.credential() {
            let mut value =
                HeaderValue::from_str(&token.bearer()).map_err(|_| InvalidInputError::Header {
                    name: AUTHORIZATION.to_string(),
                    reason: "credential contains characters not allowed in a header".to_string(),
                })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let result = self
            .transport
            .send(method, path, headers, options.body)
            .await;

        if let Err(Error::AuthRejected(rejection)) = &result {
            warn!(status = rejection.status, path, "Backend rejected credential");
            self.on_rejected.on_auth_rejected(rejection.status);
        }

        result
    }

    /// GET `path` and decode the body.
    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        self.request(Method::GET, path, RequestOptions::new())
            .await?
            .json()
    }

    /// POST `body` as JSON to `path` and decode the response.
    pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.request(Method::POST, path, RequestOptions::new().json(body)?)
            .await?
            .json()
    }

    /// PUT `body` as JSON to `path` and decode the response.
    pub async fn put<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.request(Method::PUT, path, RequestOptions::new().json(body)?)
            .await?
            .json()
    }

    /// PATCH `body` as JSON to `path` and decode the response.
    pub async fn patch<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.request(Method::PATCH, path, RequestOptions::new().json(body)?)
            .await?
            .json()
    }

    /// DELETE `path` and decode the response.
    pub async fn delete<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        self.request(Method::DELETE, path, RequestOptions::new())
            .await?
            .json()
    }
}

impl fmt::Debug for AuthenticatedClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedClient")
            .field("base", &self.transport.base)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

/// Client for endpoints that need no identity (registration, public listings).
///
/// Never sends a credential and never touches the session, whatever the
/// response status.
#[derive(Debug, Clone)]
pub struct PublicClient {
    transport: Transport,
}

impl PublicClient {
    pub fn new(base_url: ApiUrl) -> Result<Self> {
        Self::with_config(ClientConfig::new(base_url))
    }

    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            transport: Transport::new(&config)?,
        })
    }

    pub fn base_url(&self) -> &ApiUrl {
        &self.transport.base
    }

    /// Perform an unauthenticated request.
    #[instrument(skip(self, options), fields(api = %self.transport.base))]
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse> {
        self.transport
            .send(method, path, options.headers, options.body)
            .await
    }

    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        self.request(Method::GET, path, RequestOptions::new())
            .await?
            .json()
    }

    pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.request(Method::POST, path, RequestOptions::new().json(body)?)
            .await?
            .json()
    }
}
