use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single timeline record.
///
/// Posts are immutable once stored and are identified by the address of
/// their canonical encoding. Only `created_at` matters to the merkle list:
/// it is the ordering key, and it is not required to be unique.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Application-level record type (e.g. `"post"`, `"reply"`).
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Where the post originated.
    #[serde(default)]
    pub source: String,
    /// Author identifier, usually a public key.
    #[serde(default)]
    pub author: String,
    /// Logical timestamp; the ordering key.
    pub created_at: u64,
    /// Opaque structured payload.
    #[serde(default)]
    pub data: Value,
    /// Signature over the post, carried but never verified here.
    #[serde(default)]
    pub signature: String,
    /// Post this one responds to, if any.
    #[serde(default)]
    pub response_to: String,
}

impl Post {
    /// Create a post with the given key and payload; other fields empty.
    pub fn new(created_at: u64, data: impl Into<Value>) -> Self {
        Self {
            kind: String::new(),
            source: String::new(),
            author: String::new(),
            created_at,
            data: data.into(),
            signature: String::new(),
            response_to: String::new(),
        }
    }

    /// The ordering key.
    pub fn key(&self) -> u64 {
        self.created_at
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn in_response_to(mut self, parent: impl Into<String>) -> Self {
        self.response_to = parent.into();
        self
    }
}
