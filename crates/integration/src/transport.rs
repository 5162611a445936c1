//! Plain-HTTP transport shared by the HTTP-speaking backends.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::header::{HeaderName, HeaderValue, HOST};
use hyper::{Method, Request, StatusCode, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use url::Url;

use crate::error::ClientError;

/// Upper bound for a single request, connect included.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Status and body of a completed request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Connection pool bound to one `http://host:port[/base]` endpoint.
///
/// Request URLs are built by appending path segments to the base path, so a
/// node published behind a path prefix keeps that prefix on every request.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client<HttpConnector, Full<Bytes>>,
    base: Url,
    endpoint: String,
    authority: String,
    timeout: Duration,
}

impl HttpTransport {
    /// Validate `endpoint` and build an idle pool for it. No connection is
    /// opened until the first request.
    pub fn new(endpoint: &str) -> Result<Self, ClientError> {
        let invalid = |reason: String| ClientError::InvalidEndpoint {
            url: endpoint.to_string(),
            reason,
        };

        let base = Url::parse(endpoint.trim()).map_err(|err| invalid(err.to_string()))?;
        if base.scheme() != "http" {
            return Err(invalid(format!("unsupported scheme {:?}", base.scheme())));
        }
        let host = match base.host_str() {
            Some(host) if !host.is_empty() => host,
            _ => return Err(invalid("missing host".to_string())),
        };
        if base.query().is_some() || base.fragment().is_some() {
            return Err(invalid("endpoint must not carry a query or fragment".to_string()));
        }
        if !base.username().is_empty() || base.password().is_some() {
            return Err(invalid("credentials in the endpoint are not supported".to_string()));
        }

        let authority = match base.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let endpoint = base.as_str().trim_end_matches('/').to_string();

        let client = Client::builder(TokioExecutor::new()).build_http();
        Ok(Self {
            client,
            base,
            endpoint,
            authority,
            timeout: REQUEST_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configured endpoint without a trailing slash.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Base URL with `segments` appended, each one percent-encoded.
    pub fn url<I>(&self, segments: I) -> Result<Url>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow!("{} cannot carry a path", self.endpoint))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send one request and collect the whole response body.
    pub async fn send(
        &self,
        method: Method,
        url: &Url,
        headers: &[(HeaderName, HeaderValue)],
        body: Bytes,
    ) -> Result<HttpResponse> {
        let uri: Uri = url
            .as_str()
            .parse()
            .with_context(|| format!("failed to convert {url} into a request URI"))?;
        let mut builder = Request::builder().method(method.clone()).uri(uri);
        for (name, value) in headers {
            builder = builder.header(name, value);
        }
        let mut request = builder
            .body(Full::new(body))
            .with_context(|| format!("failed to build {method} request"))?;
        if !request.headers().contains_key(HOST) {
            let host = HeaderValue::from_str(&self.authority).context("invalid host header")?;
            request.headers_mut().insert(HOST, host);
        }

        let exchange = async {
            let response = self
                .client
                .request(request)
                .await
                .with_context(|| format!("failed to send {method} {url}"))?;
            let status = response.status();
            let body = response
                .into_body()
                .collect()
                .await
                .context("failed to read response body")?
                .to_bytes();
            Ok::<_, anyhow::Error>(HttpResponse { status, body })
        };

        tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| anyhow!("{method} {url} timed out after {:?}", self.timeout))?
    }

    /// `HEAD` on the base path itself.
    pub async fn head_base(&self) -> Result<HttpResponse> {
        let url = self.url(std::iter::empty::<&str>())?;
        self.send(Method::HEAD, &url, &[], Bytes::new()).await
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}
