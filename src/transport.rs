//! Authenticated HTTP transport for the BloodHound API.
//!
//! Every request made by the resource client goes through [`Transport`]. It
//! owns a single pooled `reqwest::Client`, attaches the session's bearer
//! token and classifies the result into a [`ResponseBody`] or a
//! [`ClientError`].

use std::time::Duration;

use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT},
    multipart::Form,
    Client, Method, Response,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::{configuration::Configuration, error::ClientError, session::Session};

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_USER_AGENT: &str = concat!("houndtrainer/", env!("CARGO_PKG_VERSION"));

/// Settings for the HTTP transport
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Base URL of the BloodHound instance
    pub base_url: Url,
    /// Request timeout
    pub timeout: Duration,
    pub user_agent: String,
}

impl TransportConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolve the transport settings from the configuration, with an
    /// optional base URL taking precedence over the configured one.
    pub fn from_configuration(
        configuration: &Configuration,
        base_url: Option<&Url>,
    ) -> Result<Self, ClientError> {
        let base_url = base_url
            .or(configuration.base_url())
            .cloned()
            .ok_or_else(|| {
                ClientError::Configuration(
                    "no BloodHound URL configured; pass --url or run 'config set --url'"
                        .to_string(),
                )
            })?;

        Ok(Self::new(base_url).with_timeout(Duration::from_secs(configuration.timeout_secs())))
    }
}

/// Request payloads understood by the transport
pub enum RequestBody {
    Json(Value),
    Multipart(Form),
}

/// A successful response
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Document(Value),
    /// A 2xx body that is not JSON, kept as the server sent it
    Text(String),
    /// 204 or an empty 2xx body
    NoContent,
}

impl ResponseBody {
    /// Decode the document into `T`; `None` when there was no content
    pub fn decode<T: DeserializeOwned>(self) -> Result<Option<T>, ClientError> {
        match self {
            ResponseBody::Document(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| ClientError::Format(format!("unexpected response shape: {}", e))),
            ResponseBody::Text(text) => serde_json::from_str(&text)
                .map(Some)
                .map_err(|e| ClientError::Format(format!("response is not valid JSON: {}", e))),
            ResponseBody::NoContent => Ok(None),
        }
    }
}

/// Authenticated request dispatcher over one connection pool
pub struct Transport {
    client: Client,
    config: TransportConfig,
    session: Session,
}

impl Transport {
    pub fn new(config: TransportConfig, session: Session) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ClientError::Network)?;

        Ok(Self {
            client,
            config,
            session,
        })
    }

    /// Build an absolute URL from an API path and extra path segments.
    ///
    /// Each segment is percent-encoded as a single path component.
    pub fn url(&self, path: &str, segments: &[&str]) -> Result<Url, ClientError> {
        let base = self.config.base_url.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!("{}{}", base, path))
            .map_err(|e| ClientError::Configuration(format!("invalid URL path {}: {}", path, e)))?;
        if !segments.is_empty() {
            url.path_segments_mut()
                .map_err(|_| {
                    ClientError::Configuration(format!(
                        "base URL {} cannot carry path segments",
                        self.config.base_url
                    ))
                })?
                .pop_if_empty()
                .extend(segments);
        }
        Ok(url)
    }

    fn default_headers(&self) -> Result<HeaderMap, ClientError> {
        let credential = self.session.get_token()?;

        let mut headers = HeaderMap::new();
        let mut authorization = HeaderValue::from_str(&credential.bearer())
            .map_err(|_| ClientError::CredentialFormat)?;
        authorization.set_sensitive(true);
        headers.insert(AUTHORIZATION, authorization);
        let accept = HeaderValue::from_str(mime::APPLICATION_JSON.as_ref())
            .map_err(|e| ClientError::Configuration(e.to_string()))?;
        headers.insert(ACCEPT, accept);
        if let Ok(user_agent) = HeaderValue::from_str(&self.config.user_agent) {
            headers.insert(USER_AGENT, user_agent);
        }
        Ok(headers)
    }

    /// Issue a request and return the raw response once its status has been
    /// checked. The body is left unread so callers can stream it.
    pub async fn send_streaming(
        &self,
        method: Method,
        url: Url,
        body: Option<RequestBody>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<Response, ClientError> {
        let mut headers = self.default_headers()?;
        if let Some(extra_headers) = extra_headers {
            for (name, value) in extra_headers.iter() {
                headers.insert(name.clone(), value.clone());
            }
        }

        debug!("{} {}", method, url);
        let mut request = self.client.request(method, url).headers(headers);
        request = match body {
            Some(RequestBody::Json(value)) => request.json(&value),
            Some(RequestBody::Multipart(form)) => request.multipart(form),
            None => request,
        };

        let response = request.send().await.map_err(ClientError::Network)?;
        let status = response.status();
        trace!("Response status: {}", status);

        if status.is_client_error() || status.is_server_error() {
            let body = match response.text().await {
                Ok(text) => text,
                Err(e) => format!("<unreadable response body: {}>", e),
            };
            debug!("Request failed with status {}: {}", status, body);
            return Err(ClientError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    /// Issue a request and read its body.
    ///
    /// Any 2xx status is a success. The body is parsed as JSON when it is
    /// JSON and kept as text otherwise; callers that need a document decode
    /// it with [`ResponseBody::decode`].
    pub async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<RequestBody>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<ResponseBody, ClientError> {
        let response = self
            .send_streaming(method, url, body, extra_headers)
            .await?;
        let text = response.text().await.map_err(ClientError::Network)?;
        trace!("Raw response text: {}", text);

        if text.trim().is_empty() {
            return Ok(ResponseBody::NoContent);
        }

        match serde_json::from_str::<Value>(&text) {
            Ok(value) => Ok(ResponseBody::Document(value)),
            Err(e) => {
                debug!("Response body is not JSON ({}), keeping it as text", e);
                Ok(ResponseBody::Text(text))
            }
        }
    }

    pub async fn get(&self, url: Url) -> Result<ResponseBody, ClientError> {
        self.send(Method::GET, url, None, None).await
    }

    pub async fn delete(&self, url: Url) -> Result<ResponseBody, ClientError> {
        self.send(Method::DELETE, url, None, None).await
    }
}
