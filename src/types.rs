//! Data types for the etcd v2 client

use std::fmt;

use http::HeaderMap;
use serde::{Deserialize, Serialize};

/// One entry in the key tree: a leaf key or a directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Node {
    /// Absolute key path
    pub key: String,
    /// Value, absent for directories
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Whether this node is a directory
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub dir: bool,
    /// Remaining time to live in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<i64>,
    /// RFC 3339 expiration timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration: Option<String>,
    /// Index at which the node was created
    pub created_index: u64,
    /// Index of the last modification
    pub modified_index: u64,
    /// Children in server order; only for directories
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<Node>,
}

impl Node {
    /// Last path segment of the key
    pub fn name(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or("")
    }

    /// Find a direct child by its full key
    pub fn child(&self, key: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.key == key)
    }
}

/// The kind of change a response describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    /// Key created with `prevExist=false` or by POST
    Create,
    /// Unconditional write
    Set,
    /// Write with `prevExist=true`
    Update,
    /// Key or directory removed
    Delete,
    /// Read
    Get,
    /// TTL elapsed
    Expire,
    /// Conditional write on prevValue/prevIndex
    CompareAndSwap,
    /// Conditional delete on prevValue/prevIndex
    CompareAndDelete,
    /// Action name this client does not know
    #[serde(other)]
    Unknown,
}

impl Action {
    /// Wire name of the action
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Set => "set",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Get => "get",
            Action::Expire => "expire",
            Action::CompareAndSwap => "compareAndSwap",
            Action::CompareAndDelete => "compareAndDelete",
            Action::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<&str> for Action {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// Cluster indexes reported in response headers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResponseMeta {
    /// `X-Etcd-Index`
    pub etcd_index: Option<u64>,
    /// `X-Raft-Index`
    pub raft_index: Option<u64>,
    /// `X-Raft-Term`
    pub raft_term: Option<u64>,
}

impl ResponseMeta {
    /// Read the index headers, ignoring any that are missing or malformed
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let read = |name: &str| -> Option<u64> {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok())
        };

        ResponseMeta {
            etcd_index: read("x-etcd-index"),
            raft_index: read("x-raft-index"),
            raft_term: read("x-raft-term"),
        }
    }
}

/// Decoded response envelope
///
/// On success `node` is set; an `error_code` never reaches callers because
/// the parser turns it into [`crate::Error::Store`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OperationResult {
    /// What happened
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
    /// Resulting node state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<Node>,
    /// Prior node state for writes, deletes and watch events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_node: Option<Node>,
    /// etcd error code, zero or absent on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<u64>,
    /// Error description, or a synthesized status message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Error detail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    /// Store index at the time of an error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u64>,
    /// Fields this client does not model
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
    /// Header indexes; not part of the body
    #[serde(skip)]
    pub meta: ResponseMeta,
}

impl OperationResult {
    /// A result carrying only a message, for endpoints that answer with an
    /// empty body
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// Value of the resulting node, if it is a leaf
    pub fn value(&self) -> Option<&str> {
        self.node.as_ref().and_then(|n| n.value.as_deref())
    }

    /// Index to pass as `waitIndex` so the next watch starts right after
    /// this event
    pub fn next_wait_index(&self) -> Option<u64> {
        self.node.as_ref().map(|n| n.modified_index + 1)
    }
}

/// Compare-and-swap / compare-and-delete conditions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conditions {
    /// Require the current value to equal this
    pub prev_value: Option<String>,
    /// Require the current modified index to equal this
    pub prev_index: Option<u64>,
}

impl Conditions {
    /// Condition on the current value
    pub fn prev_value(value: impl Into<String>) -> Self {
        Self {
            prev_value: Some(value.into()),
            prev_index: None,
        }
    }

    /// Condition on the current modified index
    pub fn prev_index(index: u64) -> Self {
        Self {
            prev_value: None,
            prev_index: Some(index),
        }
    }

    /// True when no condition is set
    pub fn is_empty(&self) -> bool {
        self.prev_value.is_none() && self.prev_index.is_none()
    }

    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(value) = &self.prev_value {
            query.push(("prevValue", value.clone()));
        }
        if let Some(index) = self.prev_index {
            query.push(("prevIndex", index.to_string()));
        }
        query
    }
}

/// Read flags for `get`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetOptions {
    /// Return the whole subtree
    pub recursive: bool,
    /// Sort children by key
    pub sorted: bool,
    /// Go through raft for a linearizable read
    pub quorum: bool,
}

/// Parameters of a watch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    /// Watch the whole subtree
    pub recursive: bool,
    /// Return the first event at or after this index
    pub wait_index: Option<u64>,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            wait_index: None,
        }
    }
}

/// Cluster auth state from `GET /v2/auth/enable`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthStatus {
    /// Whether auth is enforced
    pub enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_node_leaf_shape() {
        let node: Node = serde_json::from_str(
            r#"{"key":"/a","value":"1","modifiedIndex":7,"createdIndex":7}"#,
        )
        .unwrap();
        assert_eq!(node.key, "/a");
        assert_eq!(node.value.as_deref(), Some("1"));
        assert!(!node.dir);
        assert!(node.nodes.is_empty());
        assert_eq!(node.name(), "a");
    }

    #[test]
    fn test_node_dir_with_ttl() {
        let node: Node = serde_json::from_str(
            r#"{"key":"/d","dir":true,"expiration":"2026-10-18T11:00:00Z","ttl":30,
                "modifiedIndex":3,"createdIndex":2}"#,
        )
        .unwrap();
        assert!(node.dir);
        assert!(node.value.is_none());
        assert_eq!(node.ttl, Some(30));
        assert_eq!(node.expiration.as_deref(), Some("2026-10-18T11:00:00Z"));
    }

    #[test]
    fn test_action_wire_names() {
        let action: Action = serde_json::from_str(r#""compareAndSwap""#).unwrap();
        assert_eq!(action, Action::CompareAndSwap);
        assert_eq!(action, "compareAndSwap");
        assert_eq!(Action::Set.to_string(), "set");
    }

    #[test]
    fn test_unknown_action_does_not_fail() {
        let action: Action = serde_json::from_str(r#""compareAndRename""#).unwrap();
        assert_eq!(action, Action::Unknown);
    }

    #[test]
    fn test_unknown_fields_land_in_extra() {
        let result: OperationResult =
            serde_json::from_str(r#"{"action":"get","node":{"key":"/a"},"shiny":1}"#).unwrap();
        assert_eq!(result.extra.get("shiny"), Some(&serde_json::json!(1)));
        assert!(!result.extra.contains_key("action"));
    }

    #[test]
    fn test_response_meta_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-etcd-index", HeaderValue::from_static("42"));
        headers.insert("x-raft-term", HeaderValue::from_static("not-a-number"));
        let meta = ResponseMeta::from_headers(&headers);
        assert_eq!(meta.etcd_index, Some(42));
        assert_eq!(meta.raft_index, None);
        assert_eq!(meta.raft_term, None);
    }

    #[test]
    fn test_next_wait_index() {
        let result = OperationResult {
            node: Some(Node {
                key: "/a".to_string(),
                modified_index: 9,
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(result.next_wait_index(), Some(10));
        assert_eq!(OperationResult::default().next_wait_index(), None);
    }

    #[test]
    fn test_conditions_query() {
        assert!(Conditions::default().to_query().is_empty());
        let both = Conditions {
            prev_value: Some("old".to_string()),
            prev_index: Some(5),
        };
        assert_eq!(
            both.to_query(),
            vec![("prevValue", "old".to_string()), ("prevIndex", "5".to_string())]
        );
    }
}
