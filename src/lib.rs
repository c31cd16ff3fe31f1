//! Client library for the NHN Cloud networking v2 API
//!
//! Bindings for internet gateways, routing tables and routes: typed request
//! options in, typed records out, with pagination traversal over list
//! endpoints.
//!
//! The API returns semi-structured payloads whose shape varies across
//! versions, regions and detail levels, so decoding is deliberately
//! tolerant:
//!
//! - [`ResourceRef`](reference::ResourceRef) accepts reference fields as
//!   either a bare ID string or an `{id, name}` object
//! - [`ApiTime`](time::ApiTime) tries the known timestamp formats in order
//!   and normalizes to UTC
//! - routing table records fall back to permissive field-by-field
//!   extraction when the strict decode fails
//!
//! # Module Structure
//!
//! - [`client`] - service client and HTTP dispatch
//! - [`error`] - error types
//! - [`pagination`] - list pages and next-page links
//! - [`reference`] - flexible resource references
//! - [`time`] - multi-format timestamp handling
//! - [`routing_tables`] - routing table and route operations
//! - [`internet_gateways`] - internet gateway operations
//!
//! # Example
//!
//! ```ignore
//! use nhncloud_networking::{routing_tables, ServiceClient};
//!
//! async fn example() -> nhncloud_networking::Result<()> {
//!     let client = ServiceClient::new("https://kr1-api-network.example/v2.0", "token")?;
//!     let tables = routing_tables::list_all(&client, &Default::default()).await?;
//!     for table in tables {
//!         println!("{} ({})", table.name, table.id);
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod internet_gateways;
pub mod pagination;
pub mod reference;
pub mod routing_tables;
pub mod time;

pub use client::{ApiResponse, ServiceClient};
pub use error::{Error, Result};
pub use pagination::Page;
pub use reference::ResourceRef;
pub use time::ApiTime;
