//! Pagination over list responses
//!
//! List endpoints answer with an envelope of the form
//! `{"<plural>": [...], "<plural>_links": [{"rel": "next", "href": ...}]}`.
//! [`Page`] captures one such batch: the raw records plus the link to the
//! next batch, if the API provided one. Resource modules extract typed
//! records from the page and follow `next_url` until exhausted.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// A pagination link as returned in `*_links` fields
#[derive(Debug, Clone, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
}

/// One batch of list results plus an optional link to the next batch
#[derive(Debug, Clone)]
pub struct Page {
    items: Vec<Value>,
    next: Option<String>,
}

impl Page {
    /// Split a list envelope into records and next-page link.
    ///
    /// `resource_key` is the plural resource name, e.g. `"routingtables"`;
    /// the links are read from `"<resource_key>_links"`. A missing records
    /// field yields an empty page, a missing links field means there is no
    /// next page.
    pub fn from_envelope(body: &Value, resource_key: &str) -> Result<Self> {
        let map = body
            .as_object()
            .ok_or_else(|| Error::decode("list response", "payload is not a JSON object"))?;

        let items = map
            .get(resource_key)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let links_key = format!("{resource_key}_links");
        let next = map
            .get(&links_key)
            .and_then(Value::as_array)
            .and_then(|links| {
                let links: Vec<Link> = links
                    .iter()
                    .filter_map(|l| serde_json::from_value(l.clone()).ok())
                    .collect();
                next_url(&links)
            });

        Ok(Self { items, next })
    }

    /// Raw records on this page
    pub fn items(&self) -> &[Value] {
        &self.items
    }

    /// Whether zero records were extracted
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// URL of the next page, if the response advertised one
    pub fn next_url(&self) -> Option<&str> {
        self.next.as_deref()
    }
}

/// Pick the `rel == "next"` href out of a link list
pub fn next_url(links: &[Link]) -> Option<String> {
    links
        .iter()
        .find(|l| l.rel == "next")
        .map(|l| l.href.clone())
}
