//! HTTP transport behind the client

use std::future::Future;
use std::time::Duration;

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::Request;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client as HttpClient;
use hyper_util::rt::TokioExecutor;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::response::RawResponse;
use crate::tls::build_tls_config;

/// Sends one request and returns the complete response.
///
/// Implementations must hand back error statuses as ordinary responses and
/// reserve `Err` for failures where no response was obtained. They must not
/// retry.
///
/// Methods use RPITIT (`-> impl Future + Send`), so no `async-trait`
/// dependency is needed.
pub trait Transport: Send + Sync {
    /// Send `request`, giving up after `timeout` when one is set
    fn send(
        &self,
        request: Request<Full<Bytes>>,
        timeout: Option<Duration>,
    ) -> impl Future<Output = Result<RawResponse>> + Send;
}

type HttpsConnector = hyper_rustls::HttpsConnector<HttpConnector>;

/// Default transport: hyper over plain TCP or rustls, HTTP/1.1
#[derive(Clone)]
pub struct HyperTransport {
    http_client: HttpClient<HttpsConnector, Full<Bytes>>,
}

impl HyperTransport {
    /// Build a transport for the TLS settings in `config`
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let tls_config =
            build_tls_config(config.ssl_fingerprint.as_deref(), config.reject_unauthorized)?;

        let https_connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_tls_config(tls_config)
            .https_or_http()
            .enable_http1()
            .build();

        let http_client = HttpClient::builder(TokioExecutor::new()).build(https_connector);

        Ok(Self { http_client })
    }
}

impl Transport for HyperTransport {
    fn send(
        &self,
        request: Request<Full<Bytes>>,
        timeout: Option<Duration>,
    ) -> impl Future<Output = Result<RawResponse>> + Send {
        async move {
            let exchange = async {
                let response = self
                    .http_client
                    .request(request)
                    .await
                    .map_err(|e| Error::Connection(format!("Request failed: {}", e)))?;

                let (parts, body) = response.into_parts();
                let body = body
                    .collect()
                    .await
                    .map_err(|e| Error::Connection(format!("Failed to read body: {}", e)))?
                    .to_bytes();

                Ok::<_, Error>(RawResponse {
                    status: parts.status,
                    headers: parts.headers,
                    body,
                })
            };

            match timeout {
                Some(limit) => tokio::time::timeout(limit, exchange)
                    .await
                    .map_err(|_| Error::Timeout(millis(limit)))?,
                None => exchange.await,
            }
        }
    }
}

/// Milliseconds in `limit`, saturating at `u64::MAX`
fn millis(limit: Duration) -> u64 {
    u64::try_from(limit.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_builds_for_http_and_https() {
        assert!(HyperTransport::new(&ClientConfig::default()).is_ok());

        let config = ClientConfig {
            endpoint: "https://localhost:2379".to_string(),
            reject_unauthorized: false,
            ..Default::default()
        };
        assert!(HyperTransport::new(&config).is_ok());
    }

    #[test]
    fn test_timeout_millis_saturates() {
        assert_eq!(millis(Duration::from_millis(1500)), 1500);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn test_transport_rejects_bad_fingerprint() {
        let config = ClientConfig {
            endpoint: "https://localhost:2379".to_string(),
            ssl_fingerprint: Some("not-valid-hex".to_string()),
            ..Default::default()
        };
        assert!(matches!(HyperTransport::new(&config), Err(Error::Tls(_))));
    }
}
