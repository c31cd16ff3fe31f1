//! Routing table and route operations
//!
//! Covers the `routingtables` and `routes` resources: CRUD, gateway
//! attach/detach, default-table promotion and related-gateway lookup.
//!
//! Routing table payloads are decoded with a two-tier strategy: a strict
//! typed decode first, then a permissive field-by-field extraction when the
//! strict pass fails. The API is observed to vary response shape across
//! versions, regions and detail levels, and failing an entire list fetch
//! because one record has one malformed field is worse than returning a
//! best-effort partial record. The permissive tier is deliberately limited
//! to routing tables; gateways and routes decode strictly.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use url::form_urlencoded;

use crate::client::{ApiResponse, ServiceClient};
use crate::error::{Error, Result};
use crate::pagination::Page;
use crate::reference::{ref_ids, ref_names, ResourceRef};
use crate::time::ApiTime;

const RESOURCE_PATH: &str = "routingtables";
const ROUTES_PATH: &str = "routes";

/// A routing table resource
///
/// Constructed once per API response and immutable thereafter; the accessor
/// methods only project the reference lists into plain ID or name lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingTable {
    pub id: String,
    pub name: String,
    /// Whether this is the default routing table of its VPC
    pub default_table: bool,
    /// Routing type: true for distributed, false for centralized
    pub distributed: bool,
    /// ID of the connected internet gateway, if any
    pub gateway_id: String,
    /// Name of the connected internet gateway, if any
    pub gateway_name: String,
    pub tenant_id: String,
    pub state: String,
    pub create_time: ApiTime,
    /// VPCs this routing table belongs to (detailed view only)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub vpcs: Vec<ResourceRef>,
    /// Subnets connected to this routing table (detailed view only)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subnets: Vec<ResourceRef>,
    /// Routes in this routing table (get operation only)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<Route>,
}

impl RoutingTable {
    /// IDs of the VPCs this table belongs to
    pub fn vpc_ids(&self) -> Vec<String> {
        ref_ids(&self.vpcs)
    }

    /// Names of the VPCs (may be shorter than `vpc_ids` when the API only
    /// returned bare IDs)
    pub fn vpc_names(&self) -> Vec<String> {
        ref_names(&self.vpcs)
    }

    /// IDs of the subnets connected to this table
    pub fn subnet_ids(&self) -> Vec<String> {
        ref_ids(&self.subnets)
    }

    /// Names of the connected subnets
    pub fn subnet_names(&self) -> Vec<String> {
        ref_names(&self.subnets)
    }
}

/// A route in a routing table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Route {
    pub id: String,
    /// Destination CIDR
    pub cidr: String,
    /// Netmask of the destination CIDR
    pub mask: i32,
    /// Gateway IP address
    pub gateway: String,
    /// ID of the internet gateway, for internet gateway routes
    pub gateway_id: String,
    /// Route description; the API may return null here
    pub description: Option<String>,
    pub routingtable_id: String,
    pub tenant_id: String,
    pub hidden: bool,
}

/// A gateway reachable through the routing policies of a table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Gateway {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Option structs
// ---------------------------------------------------------------------------

/// Filtering and sorting options for listing routing tables
#[derive(Debug, Clone, Default)]
pub struct ListOpts {
    pub tenant_id: Option<String>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub default_table: Option<bool>,
    pub gateway_id: Option<String>,
    pub distributed: Option<bool>,
    /// Include detailed information (VPC and subnet lists) in the response
    pub detail: Option<bool>,
    pub sort_dir: Option<String>,
    pub sort_key: Option<String>,
}

impl ListOpts {
    /// Format the options into a query string, `"?..."` or empty
    pub fn to_query(&self) -> String {
        let mut q = form_urlencoded::Serializer::new(String::new());
        append_opt(&mut q, "tenant_id", &self.tenant_id);
        append_opt(&mut q, "id", &self.id);
        append_opt(&mut q, "name", &self.name);
        append_opt_bool(&mut q, "default_table", self.default_table);
        append_opt(&mut q, "gateway_id", &self.gateway_id);
        append_opt_bool(&mut q, "distributed", self.distributed);
        append_opt_bool(&mut q, "detail", self.detail);
        append_opt(&mut q, "sort_dir", &self.sort_dir);
        append_opt(&mut q, "sort_key", &self.sort_key);
        finish_query(q)
    }
}

/// Options for creating a routing table
#[derive(Debug, Clone, Serialize)]
pub struct CreateOpts {
    pub name: String,
    pub vpc_id: String,
    /// Routing type; the API defaults to distributed when omitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distributed: Option<bool>,
}

impl CreateOpts {
    /// Build the `{"routingtable": {...}}` request body
    pub fn to_body(&self) -> Value {
        json!({ "routingtable": self })
    }
}

/// Options for updating a routing table
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateOpts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distributed: Option<bool>,
}

impl UpdateOpts {
    /// Build the `{"routingtable": {...}}` request body
    pub fn to_body(&self) -> Value {
        json!({ "routingtable": self })
    }
}

/// Filtering options for listing routes
#[derive(Debug, Clone, Default)]
pub struct RouteListOpts {
    pub id: Option<String>,
    pub cidr: Option<String>,
    /// Netmask of the destination CIDR (0-32)
    pub mask: Option<i32>,
    pub gateway: Option<String>,
    pub routingtable_id: Option<String>,
    pub gateway_id: Option<String>,
}

impl RouteListOpts {
    /// Format the options into a query string, `"?..."` or empty
    pub fn to_query(&self) -> String {
        let mut q = form_urlencoded::Serializer::new(String::new());
        append_opt(&mut q, "id", &self.id);
        append_opt(&mut q, "cidr", &self.cidr);
        if let Some(mask) = self.mask {
            q.append_pair("mask", &mask.to_string());
        }
        append_opt(&mut q, "gateway", &self.gateway);
        append_opt(&mut q, "routingtable_id", &self.routingtable_id);
        append_opt(&mut q, "gateway_id", &self.gateway_id);
        finish_query(q)
    }
}

/// Options for creating a route
#[derive(Debug, Clone, Serialize)]
pub struct CreateRouteOpts {
    pub routingtable_id: String,
    pub cidr: String,
    pub gateway: String,
    /// Route description (max 256 bytes)
    pub description: String,
}

impl CreateRouteOpts {
    /// Build the `{"route": {...}}` request body
    pub fn to_body(&self) -> Value {
        json!({ "route": self })
    }
}

/// Options for updating a route
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateRouteOpts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cidr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl UpdateRouteOpts {
    /// Build the `{"route": {...}}` request body
    pub fn to_body(&self) -> Value {
        json!({ "route": self })
    }
}

fn append_opt(q: &mut form_urlencoded::Serializer<'_, String>, key: &str, value: &Option<String>) {
    if let Some(v) = value {
        q.append_pair(key, v);
    }
}

fn append_opt_bool(q: &mut form_urlencoded::Serializer<'_, String>, key: &str, value: Option<bool>) {
    if let Some(v) = value {
        q.append_pair(key, if v { "true" } else { "false" });
    }
}

fn finish_query(mut q: form_urlencoded::Serializer<'_, String>) -> String {
    let encoded = q.finish();
    if encoded.is_empty() {
        encoded
    } else {
        format!("?{encoded}")
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Extract a routing table from a `{"routingtable": {...}}` response.
///
/// Tries a strict typed decode first. When that fails, falls back to
/// permissive field-by-field extraction so that one malformed field does
/// not fail the whole record. Fails only when the payload holds no
/// routing table object at all.
pub fn extract_routing_table(response: &ApiResponse) -> Result<RoutingTable> {
    let raw = response
        .body
        .get("routingtable")
        .ok_or_else(|| Error::decode("routingtable", "missing \"routingtable\" envelope"))?;
    routing_table_from_value(raw)
}

fn routing_table_from_value(raw: &Value) -> Result<RoutingTable> {
    match serde_json::from_value::<RoutingTable>(raw.clone()) {
        Ok(table) => Ok(table),
        Err(strict_err) => {
            let map = raw.as_object().ok_or_else(|| {
                Error::decode(
                    "routingtable",
                    format!("payload {raw} is not an object: {strict_err}"),
                )
            })?;
            tracing::warn!(
                "strict routingtable decode failed ({}), using permissive extraction",
                strict_err
            );
            Ok(routing_table_from_map(map))
        }
    }
}

/// Permissive extraction: wrong-typed fields are left at their defaults,
/// malformed list elements are dropped
fn routing_table_from_map(map: &Map<String, Value>) -> RoutingTable {
    let mut table = RoutingTable::default();

    if let Some(v) = map.get("id").and_then(Value::as_str) {
        table.id = v.to_string();
    }
    if let Some(v) = map.get("name").and_then(Value::as_str) {
        table.name = v.to_string();
    }
    if let Some(v) = map.get("default_table").and_then(Value::as_bool) {
        table.default_table = v;
    }
    if let Some(v) = map.get("distributed").and_then(Value::as_bool) {
        table.distributed = v;
    }
    if let Some(v) = map.get("gateway_id").and_then(Value::as_str) {
        table.gateway_id = v.to_string();
    }
    if let Some(v) = map.get("gateway_name").and_then(Value::as_str) {
        table.gateway_name = v.to_string();
    }
    if let Some(v) = map.get("tenant_id").and_then(Value::as_str) {
        table.tenant_id = v.to_string();
    }
    if let Some(v) = map.get("state").and_then(Value::as_str) {
        table.state = v.to_string();
    }
    if let Some(s) = map.get("create_time").and_then(Value::as_str) {
        if let Ok(t) = ApiTime::parse(s) {
            table.create_time = t;
        }
    }
    if let Some(list) = map.get("vpcs").and_then(Value::as_array) {
        table.vpcs = list.iter().filter_map(ResourceRef::from_value).collect();
    }
    if let Some(list) = map.get("subnets").and_then(Value::as_array) {
        table.subnets = list.iter().filter_map(ResourceRef::from_value).collect();
    }
    if let Some(list) = map.get("routes").and_then(Value::as_array) {
        // A malformed route is dropped, not partially salvaged
        table.routes = list
            .iter()
            .filter_map(|v| serde_json::from_value(v.clone()).ok())
            .collect();
    }

    table
}

/// Extract the routing tables from a list page.
///
/// Each record gets the same strict-then-permissive treatment as
/// [`extract_routing_table`]; records that are not JSON objects at all are
/// dropped, the survivors keep their relative order.
pub fn extract_routing_tables(page: &Page) -> Vec<RoutingTable> {
    page.items()
        .iter()
        .filter_map(|item| match routing_table_from_value(item) {
            Ok(table) => Some(table),
            Err(e) => {
                tracing::warn!("dropping malformed routingtable record: {e}");
                None
            }
        })
        .collect()
}

/// Extract a route from a `{"route": {...}}` response
pub fn extract_route(response: &ApiResponse) -> Result<Route> {
    let raw = response
        .body
        .get("route")
        .ok_or_else(|| Error::decode("route", "missing \"route\" envelope"))?;
    serde_json::from_value(raw.clone()).map_err(|e| Error::decode("route", e.to_string()))
}

/// Extract the routes from a list page
pub fn extract_routes(page: &Page) -> Result<Vec<Route>> {
    page.items()
        .iter()
        .map(|item| {
            serde_json::from_value(item.clone()).map_err(|e| Error::decode("route", e.to_string()))
        })
        .collect()
}

fn extract_gateways(response: &ApiResponse) -> Result<Vec<Gateway>> {
    let raw = response
        .body
        .get("gateways")
        .ok_or_else(|| Error::decode("gateways", "missing \"gateways\" envelope"))?;
    serde_json::from_value(raw.clone()).map_err(|e| Error::decode("gateways", e.to_string()))
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// List one page of routing tables
pub async fn list(client: &ServiceClient, opts: &ListOpts) -> Result<Page> {
    let url = format!("{}{}", client.service_url(&[RESOURCE_PATH]), opts.to_query());
    list_page(client, &url).await
}

/// List all routing tables, following pagination links until exhausted
pub async fn list_all(client: &ServiceClient, opts: &ListOpts) -> Result<Vec<RoutingTable>> {
    let mut url = format!("{}{}", client.service_url(&[RESOURCE_PATH]), opts.to_query());
    let mut all = Vec::new();

    loop {
        let page = list_page(client, &url).await?;
        all.extend(extract_routing_tables(&page));
        match page.next_url() {
            Some(next) => url = next.to_string(),
            None => break,
        }
    }

    Ok(all)
}

async fn list_page(client: &ServiceClient, url: &str) -> Result<Page> {
    let response = client.get(url, &[]).await?;
    Page::from_envelope(&response.body, RESOURCE_PATH)
}

/// Retrieve a specific routing table by ID
pub async fn get(client: &ServiceClient, id: &str) -> Result<RoutingTable> {
    let response = client.get(&client.service_url(&[RESOURCE_PATH, id]), &[]).await?;
    extract_routing_table(&response)
}

/// Create a new routing table
pub async fn create(client: &ServiceClient, opts: &CreateOpts) -> Result<RoutingTable> {
    let response = client
        .post(&client.service_url(&[RESOURCE_PATH]), &opts.to_body(), &[])
        .await?;
    extract_routing_table(&response)
}

/// Update an existing routing table
pub async fn update(client: &ServiceClient, id: &str, opts: &UpdateOpts) -> Result<RoutingTable> {
    let response = client
        .put(&client.service_url(&[RESOURCE_PATH, id]), Some(&opts.to_body()), &[])
        .await?;
    extract_routing_table(&response)
}

/// Delete a routing table
pub async fn delete(client: &ServiceClient, id: &str) -> Result<()> {
    client.delete(&client.service_url(&[RESOURCE_PATH, id]), &[]).await?;
    Ok(())
}

/// Attach an internet gateway to a routing table
pub async fn attach_gateway(
    client: &ServiceClient,
    id: &str,
    gateway_id: &str,
) -> Result<RoutingTable> {
    let body = json!({ "gateway_id": gateway_id });
    let url = client.service_url(&[RESOURCE_PATH, id, "attach_gateway"]);
    let response = client.put(&url, Some(&body), &[200]).await?;
    extract_routing_table(&response)
}

/// Detach the internet gateway from a routing table
pub async fn detach_gateway(client: &ServiceClient, id: &str) -> Result<RoutingTable> {
    let url = client.service_url(&[RESOURCE_PATH, id, "detach_gateway"]);
    let response = client.put(&url, None, &[200]).await?;
    extract_routing_table(&response)
}

/// Promote a routing table to the default table of its VPC
pub async fn set_as_default(client: &ServiceClient, id: &str) -> Result<RoutingTable> {
    let url = client.service_url(&[RESOURCE_PATH, id, "set_as_default"]);
    let response = client.put(&url, None, &[]).await?;
    extract_routing_table(&response)
}

/// Gateways reachable through the routing policies of a table
pub async fn related_gateways(client: &ServiceClient, id: &str) -> Result<Vec<Gateway>> {
    let url = client.service_url(&[RESOURCE_PATH, id, "related_gateways"]);
    let response = client.get(&url, &[]).await?;
    extract_gateways(&response)
}

/// List one page of routes
pub async fn list_routes(client: &ServiceClient, opts: &RouteListOpts) -> Result<Page> {
    let url = format!("{}{}", client.service_url(&[ROUTES_PATH]), opts.to_query());
    let response = client.get(&url, &[]).await?;
    Page::from_envelope(&response.body, ROUTES_PATH)
}

/// List all routes, following pagination links until exhausted
pub async fn list_routes_all(client: &ServiceClient, opts: &RouteListOpts) -> Result<Vec<Route>> {
    let mut url = format!("{}{}", client.service_url(&[ROUTES_PATH]), opts.to_query());
    let mut all = Vec::new();

    loop {
        let response = client.get(&url, &[]).await?;
        let page = Page::from_envelope(&response.body, ROUTES_PATH)?;
        all.extend(extract_routes(&page)?);
        match page.next_url() {
            Some(next) => url = next.to_string(),
            None => break,
        }
    }

    Ok(all)
}

/// Retrieve a specific route by ID
pub async fn get_route(client: &ServiceClient, id: &str) -> Result<Route> {
    let response = client.get(&client.service_url(&[ROUTES_PATH, id]), &[]).await?;
    extract_route(&response)
}

/// Create a new route
pub async fn create_route(client: &ServiceClient, opts: &CreateRouteOpts) -> Result<Route> {
    let response = client
        .post(&client.service_url(&[ROUTES_PATH]), &opts.to_body(), &[])
        .await?;
    extract_route(&response)
}

/// Update an existing route
pub async fn update_route(
    client: &ServiceClient,
    id: &str,
    opts: &UpdateRouteOpts,
) -> Result<Route> {
    let response = client
        .put(&client.service_url(&[ROUTES_PATH, id]), Some(&opts.to_body()), &[])
        .await?;
    extract_route(&response)
}

/// Delete a route
pub async fn delete_route(client: &ServiceClient, id: &str) -> Result<()> {
    client.delete(&client.service_url(&[ROUTES_PATH, id]), &[]).await?;
    Ok(())
}
