//! Integration tests for the networking API client using wiremock
//!
//! These tests verify verb/path/query/body dispatch, token authentication,
//! pagination traversal and error surfacing against mocked endpoints.

use nhncloud_networking::{internet_gateways, routing_tables, Error, ServiceClient};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client_for(server: &MockServer) -> ServiceClient {
    ServiceClient::new(&format!("{}/v2.0", server.uri()), "test-token").unwrap()
}

#[tokio::test]
async fn list_routing_tables_sends_token_and_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2.0/routingtables"))
        .and(header("X-Auth-Token", "test-token"))
        .and(query_param("detail", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "routingtables": [
                {"id": "rt-1", "name": "main", "default_table": true},
                {"id": "rt-2", "name": "spare", "default_table": false}
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let opts = routing_tables::ListOpts {
        detail: Some(true),
        ..Default::default()
    };

    let page = routing_tables::list(&client, &opts).await.unwrap();
    assert!(page.next_url().is_none());

    let tables = routing_tables::extract_routing_tables(&page);
    assert_eq!(tables.len(), 2);
    assert_eq!(tables[0].name, "main");
    assert!(tables[0].default_table);
}

#[tokio::test]
async fn list_all_follows_pagination_links() {
    let server = MockServer::start().await;

    let next_href = format!("{}/v2.0/routingtables?marker=rt-2", server.uri());
    Mock::given(method("GET"))
        .and(path("/v2.0/routingtables"))
        .and(query_param_is_missing("marker"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "routingtables": [{"id": "rt-1"}, {"id": "rt-2"}],
            "routingtables_links": [{"rel": "next", "href": next_href}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2.0/routingtables"))
        .and(query_param("marker", "rt-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "routingtables": [{"id": "rt-3"}]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let tables = routing_tables::list_all(&client, &Default::default())
        .await
        .unwrap();

    let ids: Vec<&str> = tables.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["rt-1", "rt-2", "rt-3"]);
}

#[tokio::test]
async fn get_routing_table_decodes_flexible_payload() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2.0/routingtables/rt-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "routingtable": {
                "id": "rt-1",
                "name": "rt",
                "default_table": true,
                "distributed": false,
                "tenant_id": "t1",
                "state": "ACTIVE",
                "create_time": "2024-02-13 10:45:57",
                "vpcs": ["vpc-1", {"id": "vpc-2", "name": "secondvpc"}],
                "subnets": ["subnet-1"],
                "routes": []
            }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let table = routing_tables::get(&client, "rt-1").await.unwrap();

    assert_eq!(table.vpc_ids(), vec!["vpc-1", "vpc-2"]);
    assert_eq!(table.vpc_names(), vec!["secondvpc"]);
    assert_eq!(table.subnet_ids(), vec!["subnet-1"]);
    assert_eq!(table.create_time.to_string(), "2024-02-13 10:45:57");
}

#[tokio::test]
async fn create_routing_table_posts_enveloped_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2.0/routingtables"))
        .and(body_json(json!({
            "routingtable": {"name": "new-table", "vpc_id": "vpc-1", "distributed": true}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "routingtable": {"id": "rt-9", "name": "new-table", "distributed": true}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let opts = routing_tables::CreateOpts {
        name: "new-table".to_string(),
        vpc_id: "vpc-1".to_string(),
        distributed: Some(true),
    };

    let table = routing_tables::create(&client, &opts).await.unwrap();
    assert_eq!(table.id, "rt-9");
    assert!(table.distributed);
}

#[tokio::test]
async fn attach_gateway_puts_to_action_url() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/v2.0/routingtables/rt-1/attach_gateway"))
        .and(body_json(json!({"gateway_id": "ig-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "routingtable": {"id": "rt-1", "gateway_id": "ig-1", "gateway_name": "edge"}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let table = routing_tables::attach_gateway(&client, "rt-1", "ig-1")
        .await
        .unwrap();
    assert_eq!(table.gateway_id, "ig-1");
    assert_eq!(table.gateway_name, "edge");
}

#[tokio::test]
async fn attach_gateway_rejects_non_200_success() {
    let server = MockServer::start().await;

    // 202 is a success code but outside the allowed set for this operation
    Mock::given(method("PUT"))
        .and(path("/v2.0/routingtables/rt-1/attach_gateway"))
        .respond_with(ResponseTemplate::new(202))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = routing_tables::attach_gateway(&client, "rt-1", "ig-1")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnexpectedStatus { .. }));
}

#[tokio::test]
async fn not_found_surfaces_status_code() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2.0/routingtables/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "NeutronError": {"type": "RoutingTableNotFound", "message": "not found"}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = routing_tables::get(&client, "missing").await.unwrap_err();
    assert_eq!(err.status(), Some(reqwest::StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn delete_route_accepts_empty_body() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v2.0/routes/route-1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    routing_tables::delete_route(&client, "route-1").await.unwrap();
}

#[tokio::test]
async fn route_crud_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2.0/routes"))
        .and(body_json(json!({"route": {
            "routingtable_id": "rt-1",
            "cidr": "0.0.0.0/0",
            "gateway": "10.0.0.1",
            "description": "default route"
        }})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "route": {
                "id": "route-1",
                "cidr": "0.0.0.0/0",
                "mask": 0,
                "gateway": "10.0.0.1",
                "description": "default route",
                "routingtable_id": "rt-1",
                "tenant_id": "t1"
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/v2.0/routes/route-1"))
        .and(body_json(json!({"route": {"description": "renamed"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "route": {"id": "route-1", "description": "renamed"}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;

    let created = routing_tables::create_route(
        &client,
        &routing_tables::CreateRouteOpts {
            routingtable_id: "rt-1".to_string(),
            cidr: "0.0.0.0/0".to_string(),
            gateway: "10.0.0.1".to_string(),
            description: "default route".to_string(),
        },
    )
    .await
    .unwrap();
    assert_eq!(created.id, "route-1");

    let updated = routing_tables::update_route(
        &client,
        "route-1",
        &routing_tables::UpdateRouteOpts {
            description: Some("renamed".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.description.as_deref(), Some("renamed"));
}

#[tokio::test]
async fn related_gateways_lists_typed_records() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2.0/routingtables/rt-1/related_gateways"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "gateways": [
                {"id": "ig-1", "type": "internet", "name": "edge"},
                {"id": "pg-1", "type": "peering", "name": "peer"}
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let gateways = routing_tables::related_gateways(&client, "rt-1")
        .await
        .unwrap();
    assert_eq!(gateways.len(), 2);
    assert_eq!(gateways[0].kind, "internet");
}

#[tokio::test]
async fn internet_gateway_create_and_delete() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2.0/internetgateways"))
        .and(body_json(json!({
            "internetgateway": {"name": "edge", "external_network_id": "ext-net"}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "internetgateway": {
                "id": "ig-1",
                "name": "edge",
                "external_network_id": "ext-net",
                "routingtable_id": null,
                "state": "unavailable",
                "create_time": "2024-02-13 10:45:57",
                "tenant_id": "t1",
                "migrate_status": "none"
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/v2.0/internetgateways/ig-1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = client_for(&server).await;

    let gateway = internet_gateways::create(
        &client,
        &internet_gateways::CreateOpts {
            name: "edge".to_string(),
            external_network_id: "ext-net".to_string(),
        },
    )
    .await
    .unwrap();
    assert_eq!(gateway.id, "ig-1");
    assert_eq!(gateway.routingtable_id, None);

    internet_gateways::delete(&client, "ig-1").await.unwrap();
}

#[tokio::test]
async fn internet_gateway_list_filters_by_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2.0/internetgateways"))
        .and(query_param("external_network_id", "ext-net"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "internetgateways": [{"id": "ig-1", "state": "available"}]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let opts = internet_gateways::ListOpts {
        external_network_id: Some("ext-net".to_string()),
        ..Default::default()
    };

    let gateways = internet_gateways::list_all(&client, &opts).await.unwrap();
    assert_eq!(gateways.len(), 1);
    assert_eq!(
        gateways[0].state_kind(),
        Some(internet_gateways::GatewayState::Available)
    );
}
