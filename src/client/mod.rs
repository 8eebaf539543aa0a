//! Client layer: the Fast2SMS HTTP call, its error taxonomy and batch driving.

use std::error::Error as StdError;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::{ConfigurationError, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT, RelayConfig};
use crate::domain::{
    ApiKey, GuidanceCategory, ProviderResult, SendRequest, ValidatedSend, ValidationError,
};

mod batch;
#[cfg(test)]
pub(crate) mod fake;

pub use batch::BatchCoordinator;

type BoxError = Box<dyn StdError + Send + Sync>;
type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone)]
struct HttpResponse {
    status: u16,
    body: String,
}

/// Why an HTTP exchange produced no response at all.
#[derive(Debug)]
enum HttpFailure {
    ConnectionRefused(BoxError),
    HostNotFound(BoxError),
    Timeout,
    Other(BoxError),
}

trait HttpTransport: Send + Sync {
    fn post_json<'a>(
        &'a self,
        url: &'a str,
        authorization: &'a str,
        body: serde_json::Value,
    ) -> BoxFuture<'a, Result<HttpResponse, HttpFailure>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn post_json<'a>(
        &'a self,
        url: &'a str,
        authorization: &'a str,
        body: serde_json::Value,
    ) -> BoxFuture<'a, Result<HttpResponse, HttpFailure>> {
        Box::pin(async move {
            let response = self
                .client
                .post(url)
                .header(reqwest::header::AUTHORIZATION, authorization)
                .json(&body)
                .send()
                .await
                .map_err(classify_reqwest_error)?;
            let status = response.status().as_u16();
            let body = response.text().await.map_err(classify_reqwest_error)?;
            Ok(HttpResponse { status, body })
        })
    }
}

fn classify_reqwest_error(err: reqwest::Error) -> HttpFailure {
    if err.is_timeout() {
        return HttpFailure::Timeout;
    }
    if err.is_connect() {
        if any_source(&err, |cause| {
            cause
                .downcast_ref::<io::Error>()
                .is_some_and(|io| io.kind() == io::ErrorKind::ConnectionRefused)
        }) {
            return HttpFailure::ConnectionRefused(Box::new(err));
        }
        // hyper-util reports resolver failures as "dns error: ..." over an opaque io::Error.
        if any_source(&err, |cause| {
            let text = cause.to_string();
            text.contains("dns error") || text.contains("failed to lookup address")
        }) {
            return HttpFailure::HostNotFound(Box::new(err));
        }
    }
    HttpFailure::Other(Box::new(err))
}

fn any_source(
    err: &(dyn StdError + 'static),
    predicate: impl Fn(&(dyn StdError + 'static)) -> bool,
) -> bool {
    let mut current = Some(err);
    while let Some(cause) = current {
        if predicate(cause) {
            return true;
        }
        current = cause.source();
    }
    false
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`GatewayClient`].
///
/// Provider-reported failures are normally returned as an `Ok` [`ProviderResult`]
/// with `success == false`; [`GatewayError::ProviderRejected`] only appears after
/// [`ProviderResult::into_accepted`]. Everything else keeps its cause distinguishable:
/// - request problems found before any network call (validation, configuration),
/// - network failures (refused, unresolved host, timeout),
/// - unexpected HTTP status codes or bodies.
pub enum GatewayError {
    /// One of the domain constructors rejected an invalid value.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Configuration(#[from] ConfigurationError),

    /// Fast2SMS answered but refused to send.
    #[error("{reason}")]
    ProviderRejected {
        reason: String,
        category: Option<GuidanceCategory>,
    },

    #[error("cannot connect to SMS gateway")]
    ConnectionRefused(#[source] BoxError),

    #[error("SMS gateway URL not found")]
    HostNotFound(#[source] BoxError),

    #[error("SMS gateway did not respond within {after:?}")]
    Timeout { after: Duration },

    /// Any other HTTP-level failure. `status`/`payload` are set when the gateway
    /// answered with a non-2xx response.
    #[error("{}", describe_transport(.status, .payload, .source))]
    Transport {
        status: Option<u16>,
        payload: Option<String>,
        #[source]
        source: Option<BoxError>,
    },

    /// A 2xx body that is not the documented JSON shape.
    #[error("parse error: {0}")]
    Parse(#[source] BoxError),
}

fn describe_transport(
    status: &Option<u16>,
    payload: &Option<String>,
    source: &Option<BoxError>,
) -> String {
    let provider_message = payload
        .as_deref()
        .and_then(crate::transport::provider_message_from_body);
    match (*status, provider_message, source) {
        (Some(status), Some(message), _) => {
            format!("SMS gateway returned HTTP {status}: {message}")
        }
        (Some(status), None, _) => format!("SMS gateway returned HTTP {status}"),
        (None, _, Some(source)) => format!("transport error: {source}"),
        (None, _, None) => "transport error".to_owned(),
    }
}

impl GatewayError {
    /// Whether repeating the same send could reasonably succeed.
    ///
    /// The client never retries on its own.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionRefused(_) | Self::Timeout { .. } => true,
            Self::Transport { status, .. } => {
                status.is_none_or(|status| status == 429 || status >= 500)
            }
            Self::Validation(_)
            | Self::Configuration(_)
            | Self::ProviderRejected { .. }
            | Self::HostNotFound(_)
            | Self::Parse(_) => false,
        }
    }

    /// HTTP status a request-handling layer should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::ProviderRejected { .. } => 400,
            Self::Transport {
                status: Some(status),
                ..
            } => *status,
            Self::Configuration(_)
            | Self::ConnectionRefused(_)
            | Self::HostNotFound(_)
            | Self::Timeout { .. }
            | Self::Transport { status: None, .. }
            | Self::Parse(_) => 500,
        }
    }
}

impl ProviderResult {
    /// Turn a provider-reported failure into [`GatewayError::ProviderRejected`].
    pub fn into_accepted(self) -> Result<Self, GatewayError> {
        if self.success {
            return Ok(self);
        }
        Err(GatewayError::ProviderRejected {
            reason: self.message,
            category: self.category,
        })
    }
}

#[derive(Debug, Clone)]
/// Builder for [`GatewayClient`].
///
/// Use this when you need to customize the endpoint, timeout, or user-agent.
pub struct GatewayClientBuilder {
    api_key: ApiKey,
    endpoint: String,
    timeout: Duration,
    user_agent: Option<String>,
}

impl GatewayClientBuilder {
    /// Create a builder with the Fast2SMS endpoint and the 15 second timeout.
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
        }
    }

    /// Override the bulk-send endpoint URL.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Upper bound for one provider call, connect to last body byte.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build a [`GatewayClient`].
    pub fn build(self) -> Result<GatewayClient, GatewayError> {
        let mut builder = reqwest::Client::builder().timeout(self.timeout);
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder.build().map_err(|err| GatewayError::Transport {
            status: None,
            payload: None,
            source: Some(Box::new(err)),
        })?;

        Ok(GatewayClient {
            api_key: self.api_key,
            endpoint: self.endpoint,
            timeout: self.timeout,
            http: Arc::new(ReqwestTransport { client }),
        })
    }
}

#[derive(Clone)]
/// Fast2SMS bulk-send client.
///
/// One [`GatewayClient::send`] is one POST to the provider; nothing is retried.
pub struct GatewayClient {
    api_key: ApiKey,
    endpoint: String,
    timeout: Duration,
    http: Arc<dyn HttpTransport>,
}

impl GatewayClient {
    /// Start building a client with custom settings.
    pub fn builder(api_key: ApiKey) -> GatewayClientBuilder {
        GatewayClientBuilder::new(api_key)
    }

    /// Build a client from [`RelayConfig`], failing with
    /// [`ConfigurationError::MissingApiKey`] when no key is set.
    pub fn from_config(config: &RelayConfig) -> Result<Self, GatewayError> {
        let api_key = config.require_api_key()?.clone();
        let mut builder = Self::builder(api_key)
            .endpoint(config.endpoint.clone())
            .timeout(config.timeout);
        if let Some(user_agent) = config.user_agent.as_ref() {
            builder = builder.user_agent(user_agent.clone());
        }
        builder.build()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Drive a batch through this client, one item at a time.
    pub fn batch(&self) -> BatchCoordinator<'_> {
        BatchCoordinator::new(self)
    }

    /// Validate a raw request, then send it.
    ///
    /// Validation errors are returned before the provider is contacted.
    pub async fn send_request(&self, request: &SendRequest) -> Result<ProviderResult, GatewayError> {
        let send = request.validate().inspect_err(|err| {
            warn!(phone = %request.phone, error = %err, "rejected SMS request");
        })?;
        self.send(&send).await
    }

    /// Send one SMS through the Fast2SMS quick route.
    ///
    /// Errors:
    /// - [`GatewayError::ConnectionRefused`], [`GatewayError::HostNotFound`] and
    ///   [`GatewayError::Timeout`] when no response was obtained,
    /// - [`GatewayError::Transport`] for non-2xx HTTP responses,
    /// - [`GatewayError::Parse`] when a 2xx body is not JSON.
    ///
    /// A provider-reported failure is `Ok` with `success == false`.
    pub async fn send(&self, send: &ValidatedSend) -> Result<ProviderResult, GatewayError> {
        let phone = send.phone();
        debug!(
            %phone,
            chars = send.message().char_count(),
            endpoint = %self.endpoint,
            "sending SMS via Fast2SMS"
        );

        let body = crate::transport::encode_bulk_send_body(send);
        let response = self
            .http
            .post_json(&self.endpoint, self.api_key.as_str(), body)
            .await
            .map_err(|failure| self.map_failure(failure))
            .inspect_err(|err| error!(%phone, error = %err, "Fast2SMS call failed"))?;

        if !(200..=299).contains(&response.status) {
            let payload = if response.body.trim().is_empty() {
                None
            } else {
                Some(response.body)
            };
            let err = GatewayError::Transport {
                status: Some(response.status),
                payload,
                source: None,
            };
            error!(%phone, status = response.status, error = %err, "Fast2SMS returned an error status");
            return Err(err);
        }

        let result = crate::transport::decode_bulk_send_json_response(&response.body)
            .map_err(|err| GatewayError::Parse(Box::new(err)))?;

        if result.success {
            info!(
                %phone,
                request_id = result.request_id.as_ref().map(|id| id.as_str()),
                "SMS sent"
            );
        } else {
            warn!(
                %phone,
                provider_message = result.original_error.as_deref(),
                category = ?result.category,
                "Fast2SMS rejected SMS"
            );
        }
        Ok(result)
    }

    fn map_failure(&self, failure: HttpFailure) -> GatewayError {
        match failure {
            HttpFailure::ConnectionRefused(source) => GatewayError::ConnectionRefused(source),
            HttpFailure::HostNotFound(source) => GatewayError::HostNotFound(source),
            HttpFailure::Timeout => GatewayError::Timeout {
                after: self.timeout,
            },
            HttpFailure::Other(source) => GatewayError::Transport {
                status: None,
                payload: None,
                source: Some(source),
            },
        }
    }
}
