//! # Example: request_log
//!
//! Simulates an HTTP request lifecycle and renders it through the built-in
//! [`LogWriter`].
//!
//! Shows how to:
//! - Build an [`Agent`] with every kind enabled.
//! - Attach the request line listeners from [`adapters`].
//! - Emit request lifecycle events with [`Agent::on_event`].
//! - Report errors through the `Result` pass-through API.
//!
//! ## Flow
//! ```text
//! handle(req)
//!     ├─► on_event(REQUEST, RequestStart)          ─► "Request 10.1.2.3 GET /"
//!     ├─► on_event(REQUEST_BODY, Body)             ─► "Request Body {...}"
//!     ├─► agent.error(result) on failure           ─► "error upstream timed out"
//!     └─► on_event(REQUEST_COMPLETE, Complete)     ─► "Request Complete ... 200 1.2ms 17B"
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example request_log
//! ```

use std::io;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use diagvisor::{
    Agent, AgentConfig, EventFlagSet, EventKind, EventPayload, LogWriter, RequestInfo, adapters,
};
use http::{Request, StatusCode};

async fn handle(agent: &Agent, req: Request<Vec<u8>>) -> (StatusCode, Vec<u8>) {
    let start = Instant::now();
    let info = RequestInfo::from_request(&req);
    agent
        .on_event(EventKind::REQUEST, EventPayload::request_start(info.clone()))
        .await;

    if !req.body().is_empty() {
        agent
            .on_event(EventKind::REQUEST_BODY, EventPayload::body(req.body().clone()))
            .await;
    }

    let (status, body) = match req.uri().path() {
        "/" => (StatusCode::OK, br#"{"status":"ok!"}"#.to_vec()),
        "/upstream" => {
            tokio::time::sleep(Duration::from_millis(5)).await;
            let res: Result<(), io::Error> =
                Err(io::Error::new(io::ErrorKind::TimedOut, "upstream timed out"));
            let _ = agent.error_with_req(res, &info).await;
            (StatusCode::BAD_GATEWAY, br#"{"status":"not ok."}"#.to_vec())
        }
        _ => (StatusCode::NOT_FOUND, Vec::new()),
    };

    agent
        .on_event(
            EventKind::REQUEST_COMPLETE,
            EventPayload::request_complete(
                info,
                status.as_u16(),
                body.len() as u64,
                start.elapsed(),
            ),
        )
        .await;
    (status, body)
}

fn request(method: &str, path: &str, body: &[u8]) -> Request<Vec<u8>> {
    let peer: SocketAddr = ([10, 1, 2, 3], 40112).into();
    let mut req = Request::builder()
        .method(method)
        .uri(path)
        .body(body.to_vec())
        .expect("valid request");
    req.extensions_mut().insert(peer);
    req
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let agent = Agent::builder(AgentConfig::default())
        .with_writer(std::sync::Arc::new(LogWriter::new().with_label("demo")))
        .with_verbosity(EventFlagSet::all())
        .with_listener(EventKind::REQUEST, adapters::write_request_listener())
        .with_listener(EventKind::REQUEST_BODY, adapters::write_request_body_listener())
        .with_listener(
            EventKind::REQUEST_COMPLETE,
            adapters::write_request_complete_listener(),
        )
        .with_listener(
            EventKind::ERROR,
            adapters::error_with_request_listener(|_writer, _ts, err, req| {
                eprintln!("[alert] {} on {} {}", err.message(), req.method(), req.path());
            }),
        )
        .build();

    agent.infof("listening on :8888").await;

    for req in [
        request("GET", "/", b""),
        request("POST", "/", br#"{"name":"diagvisor"}"#),
        request("GET", "/upstream", b""),
        request("GET", "/missing", b""),
    ] {
        let (status, _) = handle(&agent, req).await;
        agent.debugf(format!("handled with {status}")).await;
    }

    agent.drain().await?;
    println!("{:?}", agent.stats());
    Ok(())
}
