use std::fs;
use std::time::Duration;

use hostlink_integration::{AttachError, ClientError, HostContext, TelemetryClient};
use hostlink_metrics::{InfluxDbConfig, MetricsBackend, MetricsClient, MetricsManager, CONFIG_FILE};
use tempfile::tempdir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

#[derive(Debug)]
struct CapturedRequest {
    head: String,
    body: String,
}

/// Loopback HTTP endpoint answering every request with `status` and
/// forwarding what it received.
async fn fake_influx(status: &'static str) -> (String, mpsc::UnboundedReceiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let tx = tx.clone();
            tokio::spawn(async move {
                loop {
                    let Some(request) = read_request(&mut stream).await else {
                        return;
                    };
                    let _ = tx.send(request);
                    let response =
                        format!("HTTP/1.1 {status}\r\ncontent-length: 0\r\n\r\n");
                    if stream.write_all(response.as_bytes()).await.is_err() {
                        return;
                    }
                }
            });
        }
    });

    (format!("http://{addr}"), rx)
}

async fn read_request(stream: &mut tokio::net::TcpStream) -> Option<CapturedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let content_length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body = String::from_utf8_lossy(&buf[header_end..header_end + content_length]).into_owned();
    Some(CapturedRequest { head, body })
}

async fn next_request(rx: &mut mpsc::UnboundedReceiver<CapturedRequest>) -> CapturedRequest {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("request within timeout")
        .expect("server still running")
}

#[tokio::test]
async fn write_ping_posts_line_protocol_to_configured_destination() {
    let (host, mut requests) = fake_influx("204 No Content").await;
    let config = InfluxDbConfig {
        host,
        token: "s3cr3t".to_string(),
        bucket: "ops".to_string(),
        organization: "acme".to_string(),
    };
    let client = MetricsClient::new(&config).unwrap();

    client.write_ping("hello");
    let request = next_request(&mut requests).await;

    let request_line = request.head.lines().next().unwrap();
    assert!(
        request_line.starts_with("POST /api/v2/write?org=acme&bucket=ops&precision=s "),
        "request line: {request_line}"
    );
    assert!(request.head.to_ascii_lowercase().contains("authorization: token s3cr3t"));
    assert!(
        request.body.starts_with(r#"ping message="hello" "#),
        "body: {}",
        request.body
    );

    client.dispose().await.unwrap();
}

#[tokio::test]
async fn dispose_flushes_queued_batches() {
    let (host, mut requests) = fake_influx("204 No Content").await;
    let config = InfluxDbConfig {
        host,
        ..InfluxDbConfig::default()
    };
    let client = MetricsClient::new(&config).unwrap();

    for i in 0..3i64 {
        client.write_points([client.make_point("tick").field("seq", i)]);
    }
    client.dispose().await.unwrap();

    let mut bodies = Vec::new();
    while let Ok(request) = requests.try_recv() {
        assert!(!request.head.to_ascii_lowercase().contains("authorization:"));
        bodies.push(request.body);
    }
    assert_eq!(bodies.len(), 3);
    assert!(bodies[0].starts_with("tick seq=0i "));
    assert!(bodies[2].starts_with("tick seq=2i "));
}

#[tokio::test]
async fn rejected_write_does_not_surface_to_caller() {
    let (host, mut requests) = fake_influx("401 Unauthorized").await;
    let config = InfluxDbConfig {
        host,
        ..InfluxDbConfig::default()
    };
    let client = MetricsClient::new(&config).unwrap();

    client.write_ping("denied");
    next_request(&mut requests).await;

    client.dispose().await.unwrap();
}

#[tokio::test]
async fn fresh_environment_attach_ping_detach() {
    let dir = tempdir().unwrap();
    let host = HostContext::new("scenario", dir.path());
    let mut manager = MetricsManager::new(MetricsBackend, &host);

    manager.attach().await;

    let written: InfluxDbConfig =
        serde_yaml::from_str(&fs::read_to_string(dir.path().join(CONFIG_FILE)).unwrap()).unwrap();
    assert_eq!(written, InfluxDbConfig::default());
    assert_eq!(written.host, "http://localhost:8086");

    let client = manager.client().expect("metrics client after attach");
    client.write_ping("ok");

    manager.detach().await;
    assert!(manager.client().is_none());
}

#[tokio::test]
async fn invalid_host_in_config_keeps_manager_unattached() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join(CONFIG_FILE),
        "host: https://metrics.example.com\nbucket: ops\n",
    )
    .unwrap();
    let host = HostContext::new("scenario", dir.path());
    let mut manager = MetricsManager::new(MetricsBackend, &host);

    manager.attach().await;

    assert!(manager.client().is_none());
    assert!(manager.last_failure().is_some());
}

#[tokio::test]
async fn token_with_control_characters_keeps_manager_unattached() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join(CONFIG_FILE),
        "host: http://127.0.0.1:9\ntoken: \"abc\\u0007def\"\n",
    )
    .unwrap();
    let host = HostContext::new("scenario", dir.path());
    let mut manager = MetricsManager::new(MetricsBackend, &host);

    manager.attach().await;

    assert!(manager.client().is_none());
    assert!(matches!(
        manager.last_failure(),
        Some(AttachError::ClientConstruction {
            source: ClientError::Rejected(_),
            ..
        })
    ));
}

#[tokio::test]
async fn writes_go_under_host_path_prefix() {
    let (host, mut requests) = fake_influx("204 No Content").await;
    let config = InfluxDbConfig {
        host: format!("{host}/influx"),
        ..InfluxDbConfig::default()
    };
    let client = MetricsClient::new(&config).unwrap();

    client.write_ping("prefixed");
    let request = next_request(&mut requests).await;
    let request_line = request.head.lines().next().unwrap();
    assert!(
        request_line.starts_with("POST /influx/api/v2/write?org=default&bucket=telemetry&precision=s "),
        "request line: {request_line}"
    );

    client.dispose().await.unwrap();
}
