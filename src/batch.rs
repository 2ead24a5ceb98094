//! Resource identifiers and the ordered batch they form.
//!
//! Position in the batch is the only correlation key between an identifier,
//! its fetch outcome and its processed result.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifiers fetched when no batch is configured.
pub const REFERENCE_URLS: [&str; 5] = [
    "https://jsonplaceholder.typicode.com/todos/1",
    "https://jsonplaceholder.typicode.com/todos/2",
    "https://jsonplaceholder.typicode.com/todos/3",
    "https://jsonplaceholder.typicode.com/todos/4",
    "https://jsonplaceholder.typicode.com/todos/5",
];

/// Opaque identifier of a resource to fetch.
///
/// The pipeline never interprets it; only the transport does (as a URL for
/// [`HttpTransport`](crate::io::HttpTransport)).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Ordered, validated sequence of identifiers for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    ids: Vec<ResourceId>,
}

impl Batch {
    /// Build a batch, rejecting blank identifiers.
    ///
    /// A blank identifier is a caller bug rather than a per-item failure, so it
    /// is refused here instead of being turned into a failed outcome later.
    pub fn new<I, S>(ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<ResourceId>,
    {
        let ids: Vec<ResourceId> = ids.into_iter().map(Into::into).collect();

        if let Some(position) = ids.iter().position(|id| id.as_str().trim().is_empty()) {
            anyhow::bail!("Resource identifier {} is empty", position + 1);
        }

        Ok(Self { ids })
    }

    /// The five reference endpoints.
    pub fn reference() -> Self {
        Self {
            ids: REFERENCE_URLS.iter().map(|url| ResourceId::new(*url)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[ResourceId] {
        &self.ids
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResourceId> {
        self.ids.iter()
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a ResourceId;
    type IntoIter = std::slice::Iter<'a, ResourceId>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_preserves_order() {
        let batch = Batch::new(["b", "a", "c"]).unwrap();
        let ids: Vec<&str> = batch.iter().map(ResourceId::as_str).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_batch_rejects_blank_identifier() {
        let err = Batch::new(["a", "   ", "c"]).unwrap_err();
        assert!(err.to_string().contains("2"));

        assert!(Batch::new([""]).is_err());
    }

    #[test]
    fn test_reference_batch() {
        let batch = Batch::reference();
        assert_eq!(batch.len(), 5);
        assert_eq!(
            batch.ids()[4].as_str(),
            "https://jsonplaceholder.typicode.com/todos/5"
        );
    }

    #[test]
    fn test_empty_batch_is_allowed() {
        let batch = Batch::new(Vec::<String>::new()).unwrap();
        assert!(batch.is_empty());
    }
}
