//! The client façade: every keys-API operation behind one handle

use std::sync::Arc;
use std::time::Duration;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use hyper::{Method, Request, Uri};
use tracing::debug;
use url::form_urlencoded;

use crate::auth::{AuthToggle, Credentials};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::ops::{self, KeyRequest};
use crate::path::{auth_path, normalize_root, resolve, with_query};
use crate::response::{parse, parse_auth_toggle, parse_json, RawResponse};
use crate::transport::{HyperTransport, Transport};
use crate::types::*;

/// Client for the etcd v2 keys API
///
/// Construct one explicitly and pass it where it is needed; cloning is
/// cheap and each clone carries its own root and credentials.
///
/// Root and credentials change only through `&mut self`, so they cannot
/// change under a request in flight on the same handle.
///
/// # Example
/// ```rust,no_run
/// use etcd_v2_client::{Client, ClientConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), etcd_v2_client::Error> {
///     let mut client = Client::with_config(ClientConfig {
///         endpoint: "http://localhost:2379".to_string(),
///         root: "/app".to_string(),
///         ..Default::default()
///     })?;
///     client.set_credentials("root", "secret");
///
///     client.set("feature/flag", "on").await?;
///     let result = client.get("feature/flag").await?;
///     assert_eq!(result.value(), Some("on"));
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Client<T = HyperTransport> {
    config: Arc<ClientConfig>,
    credentials: Option<Credentials>,
    transport: T,
}

impl Client<HyperTransport> {
    /// Create a client for `endpoint` with default settings
    ///
    /// # Errors
    /// Returns an error if the endpoint URL is invalid
    pub fn new(endpoint: &str) -> Result<Self> {
        Self::with_config(ClientConfig {
            endpoint: endpoint.to_string(),
            ..Default::default()
        })
    }

    /// Create a client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let transport = HyperTransport::new(&config)?;
        Self::with_transport(config, transport)
    }

    /// Create a client from `ETCD_*` environment variables, including
    /// credentials when `ETCD_USERNAME` and `ETCD_PASSWORD` are set
    pub fn from_env() -> Result<Self> {
        let mut client = Self::with_config(ClientConfig::from_env())?;
        client.credentials = Credentials::from_env();
        Ok(client)
    }
}

impl<T: Transport> Client<T> {
    /// Create a client that sends requests through `transport`
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self> {
        config.validate()?;

        let uri: Uri = config
            .endpoint
            .parse()
            .map_err(|e| Error::InvalidUrl(format!("Invalid endpoint URL: {}", e)))?;
        if uri.scheme().is_none() || uri.host().is_none() {
            return Err(Error::InvalidUrl(format!(
                "Endpoint must be an absolute http(s) URL: {}",
                config.endpoint
            )));
        }

        Ok(Self {
            config: Arc::new(config.normalized()),
            credentials: None,
            transport,
        })
    }

    /// Get the endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Get the normalized root prefix (empty when none)
    pub fn root(&self) -> &str {
        &self.config.root
    }

    /// Get the protocol version tag
    pub fn version(&self) -> &str {
        &self.config.version
    }

    /// The transport this client sends through
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Set the prefix applied to every key
    pub fn set_root(&mut self, root: &str) -> &mut Self {
        Arc::make_mut(&mut self.config).root = normalize_root(root);
        self
    }

    /// Store the credentials sent with every later request.
    ///
    /// No request is made; bad credentials surface on the next call.
    pub fn set_credentials(&mut self, username: &str, password: &str) -> &mut Self {
        self.credentials = Some(Credentials::new(username, password));
        self
    }

    /// Stop sending credentials
    pub fn clear_credentials(&mut self) -> &mut Self {
        self.credentials = None;
        self
    }

    /// Username of the stored credentials, if any
    pub fn username(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.username())
    }

    /// Wire path for `key` under the configured root
    pub fn key_path(&self, key: &str) -> String {
        resolve(key, &self.config.root, &self.config.version)
    }

    /// Path and query of the watch call for `key`, without sending it.
    ///
    /// For callers that hold their own long-lived connection.
    pub fn watch_uri(&self, key: &str, recursive: bool) -> String {
        let req = ops::watch(
            key,
            &WatchOptions {
                recursive,
                wait_index: None,
            },
        );
        with_query(&self.key_path(key), &req.query)
    }

    /// Send one request: path plus query, optional form body, Basic auth
    /// when credentials are set.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        form: &[(&'static str, String)],
        blocking: bool,
    ) -> Result<RawResponse> {
        let url = format!("{}{}", self.config.endpoint, path);
        let uri: Uri = url
            .parse()
            .map_err(|e| Error::InvalidUrl(format!("Invalid request URL: {}", e)))?;

        let mut builder = Request::builder().method(method.clone()).uri(uri);

        if let Some(credentials) = &self.credentials {
            let mut value = HeaderValue::from_str(credentials.basic_auth_header().as_str())
                .map_err(|e| Error::InvalidRequest(format!("Invalid credentials: {}", e)))?;
            value.set_sensitive(true);
            builder = builder.header(AUTHORIZATION, value);
        }

        let body = if form.is_empty() {
            Bytes::new()
        } else {
            builder = builder.header(CONTENT_TYPE, "application/x-www-form-urlencoded");
            let encoded = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(form.iter().map(|(k, v)| (*k, v.as_str())))
                .finish();
            Bytes::from(encoded)
        };

        let request = builder
            .body(Full::new(body))
            .map_err(|e| Error::InvalidRequest(format!("Failed to build request: {}", e)))?;

        debug!("Sending request: {} {}", method, path);

        let timeout = if blocking {
            self.config.watch_timeout_ms
        } else {
            Some(self.config.timeout_ms)
        };
        self.transport
            .send(request, timeout.map(Duration::from_millis))
            .await
    }

    async fn run(&self, req: KeyRequest) -> Result<OperationResult> {
        let path = with_query(&self.key_path(&req.key), &req.query);
        let raw = self
            .execute(req.method, &path, &req.form, req.blocking)
            .await?;
        parse(&raw)
    }

    /// Create a key; fails with code 105 if it already exists
    ///
    /// # Example
    /// ```rust,no_run
    /// # use etcd_v2_client::Client;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), etcd_v2_client::Error> {
    /// # let client = Client::new("http://localhost:2379")?;
    /// match client.create("lock/leader", "node-1", Some(30)).await {
    ///     Ok(_) => println!("acquired"),
    ///     Err(e) if e.is_already_exists() => println!("someone else holds it"),
    ///     Err(e) => return Err(e),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create(&self, key: &str, value: &str, ttl: Option<u64>) -> Result<OperationResult> {
        self.run(ops::create_key(key, value, ttl)).await
    }

    /// Create a directory; fails with code 105 if the key exists
    pub async fn create_dir(&self, key: &str, ttl: Option<u64>) -> Result<OperationResult> {
        self.run(ops::create_dir(key, ttl)).await
    }

    /// Update an existing key; fails with code 100 if it is absent
    pub async fn update(&self, key: &str, value: &str, ttl: Option<u64>) -> Result<OperationResult> {
        self.update_with(key, value, ttl, &Conditions::default()).await
    }

    /// Update an existing key only if `conditions` hold (compare-and-swap)
    ///
    /// # Example
    /// ```rust,no_run
    /// # use etcd_v2_client::{Client, Conditions};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), etcd_v2_client::Error> {
    /// # let client = Client::new("http://localhost:2379")?;
    /// let current = client.get("counter").await?;
    /// let index = current.node.map(|n| n.modified_index).unwrap_or_default();
    /// client
    ///     .update_with("counter", "2", None, &Conditions::prev_index(index))
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn update_with(
        &self,
        key: &str,
        value: &str,
        ttl: Option<u64>,
        conditions: &Conditions,
    ) -> Result<OperationResult> {
        self.run(ops::update_key(key, value, ttl, conditions)).await
    }

    /// Refresh a directory's TTL.
    ///
    /// A zero `ttl` fails with [`Error::Precondition`] without contacting
    /// the server.
    pub async fn update_dir(&self, key: &str, ttl: u64) -> Result<OperationResult> {
        self.run(ops::update_dir(key, ttl)?).await
    }

    /// Create the key, or update it if it already exists.
    ///
    /// This is two requests, not one: another writer can create or delete
    /// the key between the failed create and the update.
    pub async fn set(&self, key: &str, value: &str) -> Result<OperationResult> {
        self.set_with_ttl(key, value, None).await
    }

    /// [`Client::set`] with a TTL
    pub async fn set_with_ttl(&self, key: &str, value: &str, ttl: Option<u64>) -> Result<OperationResult> {
        match self.create(key, value, ttl).await {
            Err(e) if e.is_already_exists() => {
                debug!("Key {} already exists, falling back to update", key);
                self.update(key, value, ttl).await
            }
            other => other,
        }
    }

    /// Create the directory, or refresh its TTL if it already exists.
    ///
    /// Same two-step race as [`Client::set`]. The update step needs a
    /// non-zero `ttl`.
    pub async fn set_dir(&self, key: &str, ttl: u64) -> Result<OperationResult> {
        match self.create_dir(key, Some(ttl)).await {
            Err(e) if e.is_already_exists() => {
                debug!("Directory {} already exists, falling back to update", key);
                self.update_dir(key, ttl).await
            }
            other => other,
        }
    }

    /// Delete a key
    pub async fn delete(&self, key: &str) -> Result<OperationResult> {
        self.delete_with(key, &Conditions::default()).await
    }

    /// Delete a key only if `conditions` hold (compare-and-delete)
    pub async fn delete_with(&self, key: &str, conditions: &Conditions) -> Result<OperationResult> {
        self.run(ops::delete_key(key, conditions)).await
    }

    /// Delete a directory; `recursive` also removes its contents
    pub async fn delete_dir(&self, key: &str, recursive: bool) -> Result<OperationResult> {
        self.run(ops::delete_dir(key, recursive)).await
    }

    /// Read a key or directory
    pub async fn get(&self, key: &str) -> Result<OperationResult> {
        self.get_with(key, &GetOptions::default()).await
    }

    /// Read with explicit flags
    pub async fn get_with(&self, key: &str, options: &GetOptions) -> Result<OperationResult> {
        self.run(ops::get(key, options)).await
    }

    /// List a directory. Children come back in `node.nodes`, nested
    /// transitively when `recursive` is set.
    ///
    /// # Example
    /// ```rust,no_run
    /// # use etcd_v2_client::Client;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), etcd_v2_client::Error> {
    /// # let client = Client::new("http://localhost:2379")?;
    /// let listing = client.list("/services", true).await?;
    /// for node in listing.node.map(|n| n.nodes).unwrap_or_default() {
    ///     println!("{} dir={}", node.key, node.dir);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn list(&self, key: &str, recursive: bool) -> Result<OperationResult> {
        self.get_with(
            key,
            &GetOptions {
                recursive,
                ..Default::default()
            },
        )
        .await
    }

    /// Wait for the next change under `key` and return it.
    ///
    /// Blocks until the server reports one event or the connection ends.
    /// Only `watch_timeout_ms` bounds the wait.
    pub async fn watch(&self, key: &str, recursive: bool) -> Result<OperationResult> {
        self.watch_with(
            key,
            &WatchOptions {
                recursive,
                wait_index: None,
            },
        )
        .await
    }

    /// Watch with an explicit `waitIndex`.
    ///
    /// # Example
    /// ```rust,no_run
    /// # use etcd_v2_client::{Client, WatchOptions};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), etcd_v2_client::Error> {
    /// # let client = Client::new("http://localhost:2379")?;
    /// let mut options = WatchOptions::default();
    /// loop {
    ///     let event = client.watch_with("/config", &options).await?;
    ///     println!("{:?} {:?}", event.action, event.node);
    ///     options.wait_index = event.next_wait_index();
    /// }
    /// # }
    /// ```
    pub async fn watch_with(&self, key: &str, options: &WatchOptions) -> Result<OperationResult> {
        self.run(ops::watch(key, options)).await
    }

    /// Turn on cluster-wide authentication
    pub async fn enable_auth(&self) -> Result<OperationResult> {
        self.toggle_auth(AuthToggle::Enable).await
    }

    /// Turn off cluster-wide authentication
    pub async fn disable_auth(&self) -> Result<OperationResult> {
        self.toggle_auth(AuthToggle::Disable).await
    }

    /// Whether cluster-wide authentication is on
    pub async fn auth_status(&self) -> Result<AuthStatus> {
        let raw = self
            .execute(Method::GET, &auth_path(&self.config.version), &[], false)
            .await?;
        parse_json(&raw)
    }

    async fn toggle_auth(&self, toggle: AuthToggle) -> Result<OperationResult> {
        let raw = self
            .execute(toggle.method(), &auth_path(&self.config.version), &[], false)
            .await?;
        parse_auth_toggle(&raw, toggle.success_message())
    }
}
