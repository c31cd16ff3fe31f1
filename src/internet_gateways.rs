//! Internet gateway operations
//!
//! Covers the `internetgateways` resource: list, get, create, delete.
//! Gateway payloads decode strictly; the permissive fallback used for
//! routing tables has not been observed to be necessary here.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use url::form_urlencoded;

use crate::client::{ApiResponse, ServiceClient};
use crate::error::{Error, Result};
use crate::pagination::Page;
use crate::time::ApiTime;

const RESOURCE_PATH: &str = "internetgateways";

/// Operational state of an internet gateway, for informational display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayState {
    /// Normal operational state
    Available,
    /// Not connected to any routing table
    Unavailable,
    /// Being moved to another server for maintenance
    Migrating,
    /// Connected to a routing table but not functioning properly
    Error,
}

impl GatewayState {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "available" => Some(Self::Available),
            "unavailable" => Some(Self::Unavailable),
            "migrating" => Some(Self::Migrating),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Unavailable => "unavailable",
            Self::Migrating => "migrating",
            Self::Error => "error",
        }
    }
}

/// Migration status during gateway maintenance, for informational display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrateStatus {
    /// No migration in progress, or migration completed
    None,
    UnbindingProgress,
    UnbindingError,
    BindingProgress,
    BindingError,
}

impl MigrateStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Self::None),
            "unbinding_progress" => Some(Self::UnbindingProgress),
            "unbinding_error" => Some(Self::UnbindingError),
            "binding_progress" => Some(Self::BindingProgress),
            "binding_error" => Some(Self::BindingError),
            _ => None,
        }
    }
}

/// An internet gateway resource
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InternetGateway {
    pub id: String,
    pub name: String,
    /// ID of the external network this gateway connects to
    pub external_network_id: String,
    /// ID of the connected routing table; null when unattached
    pub routingtable_id: Option<String>,
    /// Raw state string; see [`InternetGateway::state_kind`]
    pub state: String,
    pub create_time: ApiTime,
    pub tenant_id: String,
    /// Raw migration status string; see [`InternetGateway::migrate_status_kind`]
    pub migrate_status: String,
    /// Error message when migration fails
    pub migrate_error: Option<String>,
}

impl InternetGateway {
    /// The state as a typed value, `None` for states this crate does not
    /// know about
    pub fn state_kind(&self) -> Option<GatewayState> {
        GatewayState::parse(&self.state)
    }

    /// The migration status as a typed value
    pub fn migrate_status_kind(&self) -> Option<MigrateStatus> {
        MigrateStatus::parse(&self.migrate_status)
    }
}

/// Filtering options for listing internet gateways
#[derive(Debug, Clone, Default)]
pub struct ListOpts {
    pub tenant_id: Option<String>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub external_network_id: Option<String>,
    pub routingtable_id: Option<String>,
}

impl ListOpts {
    /// Format the options into a query string, `"?..."` or empty
    pub fn to_query(&self) -> String {
        let mut q = form_urlencoded::Serializer::new(String::new());
        for (key, value) in [
            ("tenant_id", &self.tenant_id),
            ("id", &self.id),
            ("name", &self.name),
            ("external_network_id", &self.external_network_id),
            ("routingtable_id", &self.routingtable_id),
        ] {
            if let Some(v) = value {
                q.append_pair(key, v);
            }
        }
        let encoded = q.finish();
        if encoded.is_empty() {
            encoded
        } else {
            format!("?{encoded}")
        }
    }
}

/// Options for creating an internet gateway
#[derive(Debug, Clone, Serialize)]
pub struct CreateOpts {
    pub name: String,
    /// ID of the external network to connect to
    pub external_network_id: String,
}

impl CreateOpts {
    /// Build the `{"internetgateway": {...}}` request body
    pub fn to_body(&self) -> Value {
        json!({ "internetgateway": self })
    }
}

/// Extract an internet gateway from a `{"internetgateway": {...}}` response
pub fn extract_internet_gateway(response: &ApiResponse) -> Result<InternetGateway> {
    let raw = response
        .body
        .get("internetgateway")
        .ok_or_else(|| Error::decode("internetgateway", "missing \"internetgateway\" envelope"))?;
    serde_json::from_value(raw.clone()).map_err(|e| Error::decode("internetgateway", e.to_string()))
}

/// Extract the internet gateways from a list page
pub fn extract_internet_gateways(page: &Page) -> Result<Vec<InternetGateway>> {
    page.items()
        .iter()
        .map(|item| {
            serde_json::from_value(item.clone())
                .map_err(|e| Error::decode("internetgateway", e.to_string()))
        })
        .collect()
}

/// List one page of internet gateways
pub async fn list(client: &ServiceClient, opts: &ListOpts) -> Result<Page> {
    let url = format!("{}{}", client.service_url(&[RESOURCE_PATH]), opts.to_query());
    let response = client.get(&url, &[]).await?;
    Page::from_envelope(&response.body, RESOURCE_PATH)
}

/// List all internet gateways, following pagination links until exhausted
pub async fn list_all(client: &ServiceClient, opts: &ListOpts) -> Result<Vec<InternetGateway>> {
    let mut url = format!("{}{}", client.service_url(&[RESOURCE_PATH]), opts.to_query());
    let mut all = Vec::new();

    loop {
        let response = client.get(&url, &[]).await?;
        let page = Page::from_envelope(&response.body, RESOURCE_PATH)?;
        all.extend(extract_internet_gateways(&page)?);
        match page.next_url() {
            Some(next) => url = next.to_string(),
            None => break,
        }
    }

    Ok(all)
}

/// Retrieve a specific internet gateway by ID
pub async fn get(client: &ServiceClient, id: &str) -> Result<InternetGateway> {
    let response = client.get(&client.service_url(&[RESOURCE_PATH, id]), &[]).await?;
    extract_internet_gateway(&response)
}

/// Create a new internet gateway
pub async fn create(client: &ServiceClient, opts: &CreateOpts) -> Result<InternetGateway> {
    let response = client
        .post(&client.service_url(&[RESOURCE_PATH]), &opts.to_body(), &[])
        .await?;
    extract_internet_gateway(&response)
}

/// Delete an internet gateway
pub async fn delete(client: &ServiceClient, id: &str) -> Result<()> {
    client
        .delete(&client.service_url(&[RESOURCE_PATH, id]), &[200, 204])
        .await?;
    Ok(())
}
