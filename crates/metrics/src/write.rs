//! Buffered write path to the metrics endpoint.
//!
//! Callers enqueue batches without waiting on the network; a single worker
//! task drains the queue and posts each batch. Backend failures end up in the
//! log, never in the caller's control flow.

use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use futures::future::BoxFuture;
use hostlink_integration::{ClientError, HttpTransport};
use hyper::body::Bytes;
use hyper::header::{HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use hyper::Method;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn, Instrument};
use url::Url;

use crate::config::WriteDestination;
use crate::point::{Point, WritePrecision};

/// Sink the metrics client hands its batches to.
pub trait PointWriter: Send + Sync + 'static {
    /// Queue `points` for `destination`. Must not block and must not fail.
    fn write(&self, destination: &WriteDestination, points: Vec<Point>);

    /// Flush everything queued and release the connection.
    fn close(self: Box<Self>) -> BoxFuture<'static, Result<()>>;
}

struct WriteBatch {
    destination: WriteDestination,
    points: Vec<Point>,
}

/// [`PointWriter`] backed by an unbounded queue and one HTTP worker.
pub struct BufferedWriteApi {
    queue: mpsc::UnboundedSender<WriteBatch>,
    worker: JoinHandle<()>,
}

impl BufferedWriteApi {
    /// Start the worker. Must be called from within a tokio runtime.
    ///
    /// An empty `token` sends unauthenticated writes; a token that cannot be
    /// carried in a header is rejected.
    pub fn start(transport: HttpTransport, token: &str) -> Result<Self, ClientError> {
        let auth = auth_header(token)?;

        let (queue, mut rx) = mpsc::unbounded_channel::<WriteBatch>();
        let worker = tokio::spawn(
            async move {
                while let Some(batch) = rx.recv().await {
                    post_batch(&transport, auth.as_ref(), batch).await;
                }
                debug!("metrics write queue drained");
            }
            .in_current_span(),
        );

        Ok(Self { queue, worker })
    }
}

fn auth_header(token: &str) -> Result<Option<HeaderValue>, ClientError> {
    if token.is_empty() {
        return Ok(None);
    }
    let mut value = HeaderValue::from_str(&format!("Token {token}")).map_err(|_| {
        ClientError::Rejected("metrics token is not a valid header value".to_string())
    })?;
    value.set_sensitive(true);
    Ok(Some(value))
}

impl PointWriter for BufferedWriteApi {
    fn write(&self, destination: &WriteDestination, points: Vec<Point>) {
        if points.is_empty() {
            return;
        }
        let batch = WriteBatch {
            destination: destination.clone(),
            points,
        };
        if self.queue.send(batch).is_err() {
            warn!("metrics write worker has stopped; dropping batch");
        }
    }

    fn close(self: Box<Self>) -> BoxFuture<'static, Result<()>> {
        let Self { queue, worker } = *self;
        drop(queue);
        Box::pin(async move {
            worker
                .await
                .map_err(|err| anyhow!("metrics write worker failed: {err}"))
        })
    }
}

/// Line protocol bodies for `points`, one per timestamp precision.
pub fn encode_batch(points: &[Point]) -> BTreeMap<WritePrecision, String> {
    let mut bodies: BTreeMap<WritePrecision, String> = BTreeMap::new();
    for point in points {
        let Some(line) = point.to_line_protocol() else {
            debug!(measurement = point.name(), "skipping point without fields");
            continue;
        };
        let body = bodies.entry(point.precision()).or_default();
        if !body.is_empty() {
            body.push('\n');
        }
        body.push_str(&line);
    }
    bodies
}

/// Write endpoint URL for one request.
pub fn write_url(
    transport: &HttpTransport,
    destination: &WriteDestination,
    precision: WritePrecision,
) -> Result<Url> {
    let mut url = transport.url(["api", "v2", "write"])?;
    url.query_pairs_mut()
        .append_pair("org", &destination.organization)
        .append_pair("bucket", &destination.bucket)
        .append_pair("precision", precision.as_str());
    Ok(url)
}

async fn post_batch(transport: &HttpTransport, auth: Option<&HeaderValue>, batch: WriteBatch) {
    let count = batch.points.len();
    for (precision, body) in encode_batch(&batch.points) {
        let mut headers: Vec<(HeaderName, HeaderValue)> = vec![(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        )];
        if let Some(auth) = auth {
            headers.push((AUTHORIZATION, auth.clone()));
        }

        let url = match write_url(transport, &batch.destination, precision) {
            Ok(url) => url,
            Err(err) => {
                warn!(error = format!("{err:#}"), "metrics write skipped");
                continue;
            }
        };
        match transport
            .send(Method::POST, &url, &headers, Bytes::from(body))
            .await
        {
            Ok(response) if response.is_success() => {
                debug!(points = count, bucket = %batch.destination.bucket, "metrics batch written");
            }
            Ok(response) => warn!(
                status = %response.status,
                body = %response.body_text(),
                bucket = %batch.destination.bucket,
                "metrics write rejected"
            ),
            Err(err) => warn!(
                endpoint = transport.endpoint(),
                error = format!("{err:#}"),
                "metrics write failed"
            ),
        }
    }
}
