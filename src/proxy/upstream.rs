//! Shared upstream client.
//!
//! # Design Decisions
//! - One pooled hyper client for the whole process, built at startup
//! - Cloning is cheap (the pool is internally reference counted), so every
//!   handler gets its own handle without gateway-side locking
//! - The whole exchange, including the response body, runs under one deadline
//! - The buffered response body is capped; a larger body fails the exchange

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::UpstreamConfig;
use crate::error::GatewayError;
use crate::http::response::RelayedResponse;
use crate::resilience::Deadline;

#[derive(Clone)]
pub struct UpstreamClient {
    client: Client<HttpConnector, Body>,
    base_url: String,
    timeout: Duration,
    max_response_bytes: usize,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig, max_response_bytes: usize) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.connect_timeout_secs)));
        connector.set_nodelay(true);

        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout_secs))
            .build(connector);

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_secs),
            max_response_bytes,
        }
    }

    /// Absolute upstream URL for `path` (which starts with `/`).
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send one request and buffer the full response.
    pub async fn send(&self, request: Request<Body>) -> Result<RelayedResponse, GatewayError> {
        let deadline = Deadline::after(self.timeout);

        deadline
            .run(async {
                let response: hyper::Response<Incoming> = self
                    .client
                    .request(request)
                    .await
                    .map_err(GatewayError::UpstreamUnreachable)?;

                let (parts, body) = response.into_parts();
                let body = axum::body::to_bytes(Body::new(body), self.max_response_bytes)
                    .await
                    .map_err(GatewayError::UpstreamBody)?;

                Ok(RelayedResponse {
                    status: parts.status,
                    content_type: parts.headers.get(header::CONTENT_TYPE).cloned(),
                    content_encoding: parts.headers.get(header::CONTENT_ENCODING).cloned(),
                    body,
                })
            })
            .await
    }
}

impl std::fmt::Debug for UpstreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("max_response_bytes", &self.max_response_bytes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Method, StatusCode};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn config(base_url: &str) -> UpstreamConfig {
        UpstreamConfig {
            base_url: base_url.to_string(),
            timeout_secs: 1,
            ..UpstreamConfig::default()
        }
    }

    fn client_for(base_url: &str) -> UpstreamClient {
        UpstreamClient::new(&config(base_url), 1024)
    }

    /// Serve one raw HTTP/1.1 response to the first connection.
    async fn raw_upstream(response: Vec<u8>) -> std::net::SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let _ = socket.write_all(&response).await;
            let _ = socket.shutdown().await;
        });
        addr
    }

    fn get(url: String) -> Request<Body> {
        Request::builder()
            .method(Method::GET)
            .uri(url)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_url_for_joins_base_and_path() {
        let client = client_for("http://user-service:8001");
        assert_eq!(client.url_for("/register"), "http://user-service:8001/register");

        let prefixed = client_for("http://10.0.0.5:8001/api/");
        assert_eq!(prefixed.url_for("/profile"), "http://10.0.0.5:8001/api/profile");
    }

    #[tokio::test]
    async fn test_connection_refused_is_unreachable() {
        // bind then drop to get a port nobody listens on
        let addr = TcpListener::bind("127.0.0.1:0").await.unwrap().local_addr().unwrap();
        let client = client_for(&format!("http://{}", addr));

        let err = client.send(get(client.url_for("/login"))).await.unwrap_err();
        assert!(matches!(err, GatewayError::UpstreamUnreachable(_)));
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_silent_upstream_hits_deadline() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            // accept and never answer
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        let client = client_for(&format!("http://{}", addr));
        let started = std::time::Instant::now();
        let err = client.send(get(client.url_for("/profile"))).await.unwrap_err();

        assert!(matches!(err, GatewayError::UpstreamTimeout(_)));
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_buffers_status_type_and_body() {
        let body = r#"{"detail":"Invalid credentials"}"#;
        let addr = raw_upstream(
            format!(
                "HTTP/1.1 401 Unauthorized\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            )
            .into_bytes(),
        )
        .await;

        let client = client_for(&format!("http://{}", addr));
        let relayed = client.send(get(client.url_for("/profile"))).await.unwrap();

        assert_eq!(relayed.status, StatusCode::UNAUTHORIZED);
        assert_eq!(relayed.content_type.unwrap(), "application/json");
        assert!(relayed.content_encoding.is_none());
        assert_eq!(&relayed.body[..], br#"{"detail":"Invalid credentials"}"#);
    }

    #[tokio::test]
    async fn test_keeps_content_encoding_of_encoded_body() {
        let encoded = [0x1f, 0x8b, 0x08, 0x00, 0xaa, 0xbb];
        let mut response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Encoding: gzip\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            encoded.len()
        )
        .into_bytes();
        response.extend_from_slice(&encoded);
        let addr = raw_upstream(response).await;

        let client = client_for(&format!("http://{}", addr));
        let relayed = client.send(get(client.url_for("/profile"))).await.unwrap();

        assert_eq!(relayed.content_encoding.unwrap(), "gzip");
        assert_eq!(&relayed.body[..], &encoded[..]);
    }

    #[tokio::test]
    async fn test_oversized_response_body_is_upstream_failure() {
        let body = "x".repeat(4096);
        let addr = raw_upstream(
            format!(
                "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            )
            .into_bytes(),
        )
        .await;

        let client = client_for(&format!("http://{}", addr));
        let err = client.send(get(client.url_for("/profile"))).await.unwrap_err();

        assert!(matches!(err, GatewayError::UpstreamBody(_)));
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }
}
