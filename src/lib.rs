//! An async client for the etcd v2 keys HTTP API
//!
//! Maps logical operations (create, conditional update, upsert, directory
//! create/update, recursive listing, blocking watch, auth toggle) onto
//! `/v2/keys` requests, and maps responses back into [`OperationResult`]s
//! or classified [`Error`]s.
//!
//! # Features
//! - Create-only / update-only writes via server-side `prevExist` checks
//! - Compare-and-swap and compare-and-delete conditions
//! - Upsert for keys and directories (create, then update on code 105)
//! - Recursive listing and long-poll watches with `waitIndex` restart
//! - HTTP Basic auth and the cluster auth toggle
//! - TLS with certificate pinning
//! - Pluggable [`Transport`] for tests or custom HTTP stacks
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use etcd_v2_client::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), etcd_v2_client::Error> {
//!     let client = Client::new("http://localhost:2379")?;
//!
//!     // Create or update a value
//!     let result = client.set("greeting", "hello").await?;
//!     println!("{} at index {:?}", result.action.unwrap(), result.meta.etcd_index);
//!
//!     // Read it back
//!     let result = client.get("greeting").await?;
//!     println!("Value: {:?}", result.value());
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs, rust_2018_idioms)]

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod ops;
pub mod path;
pub mod response;
mod tls;
pub mod transport;
pub mod types;

pub use auth::Credentials;
pub use client::Client;
pub use config::ClientConfig;
pub use error::{Error, Result, StoreError, StoreErrorKind};
pub use response::RawResponse;
pub use transport::{HyperTransport, Transport};
pub use types::*;
