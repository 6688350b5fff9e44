//! Request recipes for each logical keys-API operation
//!
//! Every operation is a method, a set of query conditions and an optional
//! form body against the key's path. Building a recipe never touches the
//! network, so preconditions are checked here, before anything is sent.

use hyper::Method;

use crate::error::{Error, Result};
use crate::types::{Conditions, GetOptions, WatchOptions};

/// A fully described keys-API call, minus the path prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRequest {
    /// HTTP method
    pub method: Method,
    /// Logical key, not yet resolved
    pub key: String,
    /// Query conditions in send order
    pub query: Vec<(&'static str, String)>,
    /// Form fields, sent url-encoded
    pub form: Vec<(&'static str, String)>,
    /// Long poll that should not be bounded by the request timeout
    pub blocking: bool,
}

impl KeyRequest {
    fn new(method: Method, key: &str) -> Self {
        Self {
            method,
            key: key.to_string(),
            query: Vec::new(),
            form: Vec::new(),
            blocking: false,
        }
    }

    fn query(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.query.push((name, value.into()));
        self
    }

    fn form(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.form.push((name, value.into()));
        self
    }

    // A zero TTL means "none" and is left out.
    fn ttl(self, ttl: Option<u64>) -> Self {
        match ttl {
            Some(ttl) if ttl > 0 => self.form("ttl", ttl.to_string()),
            _ => self,
        }
    }

    /// Value of a query condition, if set
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Value of a form field, if set
    pub fn form_value(&self, name: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Create a key; the store answers 105 if it already exists.
pub fn create_key(key: &str, value: &str, ttl: Option<u64>) -> KeyRequest {
    KeyRequest::new(Method::PUT, key)
        .query("prevExist", "false")
        .form("value", value)
        .ttl(ttl)
}

/// Create a directory; the store answers 105 if the key exists.
pub fn create_dir(key: &str, ttl: Option<u64>) -> KeyRequest {
    KeyRequest::new(Method::PUT, key)
        .query("prevExist", "false")
        .form("dir", "true")
        .ttl(ttl)
}

/// Update an existing key, optionally only if `conditions` hold.
pub fn update_key(key: &str, value: &str, ttl: Option<u64>, conditions: &Conditions) -> KeyRequest {
    let mut req = KeyRequest::new(Method::PUT, key);
    req.query = conditions.to_query();
    req.query("prevExist", "true").form("value", value).ttl(ttl)
}

/// Refresh the TTL of an existing directory.
///
/// Fails without a request when `ttl` is zero: the store has nothing else
/// to change on a directory.
pub fn update_dir(key: &str, ttl: u64) -> Result<KeyRequest> {
    if ttl == 0 {
        return Err(Error::Precondition(format!(
            "updating directory {} requires a TTL greater than zero",
            key
        )));
    }
    Ok(KeyRequest::new(Method::PUT, key)
        .query("dir", "true")
        .query("prevExist", "true")
        .form("dir", "true")
        .ttl(Some(ttl)))
}

/// Delete a key, optionally only if `conditions` hold.
pub fn delete_key(key: &str, conditions: &Conditions) -> KeyRequest {
    let mut req = KeyRequest::new(Method::DELETE, key);
    req.query = conditions.to_query();
    req
}

/// Delete a directory; `recursive` also removes its contents.
pub fn delete_dir(key: &str, recursive: bool) -> KeyRequest {
    let req = KeyRequest::new(Method::DELETE, key).query("dir", "true");
    if recursive {
        req.query("recursive", "true")
    } else {
        req
    }
}

/// Read a key or list a directory.
pub fn get(key: &str, options: &GetOptions) -> KeyRequest {
    let mut req = KeyRequest::new(Method::GET, key);
    if options.recursive {
        req = req.query("recursive", "true");
    }
    if options.sorted {
        req = req.query("sorted", "true");
    }
    if options.quorum {
        req = req.query("quorum", "true");
    }
    req
}

/// Block until the key (or its subtree) changes.
pub fn watch(key: &str, options: &WatchOptions) -> KeyRequest {
    let mut req = KeyRequest::new(Method::GET, key)
        .query("wait", "true")
        .query("recursive", options.recursive.to_string());
    if let Some(index) = options.wait_index {
        req = req.query("waitIndex", index.to_string());
    }
    req.blocking = true;
    req
}
