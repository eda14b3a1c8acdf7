use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use crate::persistence::{self, airports::upsert_airports, SqliteAirportStore};
use crate::test_support::airport;
use crate::{api, config::Config, state::AppState};

async fn setup_app() -> (axum::Router, Arc<AppState>) {
    let mut config = Config::default();
    config.database_path = ":memory:".to_string();
    config.max_leg_km = 150.0;

    let db = persistence::init_database(&config.database_path, config.database_max_connections)
        .await
        .expect("init db");

    let mut seeded = vec![
        airport(1, 0.0, 0.0),
        airport(2, 0.0, 1.0),
        airport(3, 0.0, 2.0),
        airport(4, 0.0, 3.0),
        airport(9, 40.0, 40.0),
    ];
    seeded[4].country = "Farland".to_string();
    upsert_airports(db.pool(), &seeded).await.expect("seed");

    let store = Arc::new(SqliteAirportStore::new(db.pool().clone()));
    let state = Arc::new(AppState::new(&config, store));
    let app = api::routes().with_state(state.clone());
    (app, state)
}

async fn get(app: &axum::Router, uri: &str) -> axum::response::Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}

#[tokio::test]
async fn airport_lookup_and_not_found() {
    let (app, _state) = setup_app().await;

    let res = get(&app, "/airports/2").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = read_json(res).await;
    assert_eq!(body["id"], 2);
    assert_eq!(body["airportName"], "Airport 2");

    let res = get(&app, "/airports/404").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_json(res).await["code"], "AIRPORT_NOT_FOUND");

    let res = get(&app, "/airports/abc").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(res).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn radius_search_validates_and_sorts() {
    let (app, _state) = setup_app().await;

    let res = get(&app, "/airports/radius?lat=0&lon=0&radius=150").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = read_json(res).await;
    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(body[0]["distance"], 0.0);

    let res = get(&app, "/airports/radius?lat=91&lon=0&radius=10").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = get(&app, "/airports/radius?lat=0&lon=0&radius=-1").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = get(&app, "/airports/radius?lat=0&lon=0").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn distance_between_airports() {
    let (app, _state) = setup_app().await;

    let res = get(&app, "/airports/distance?id1=1&id2=2").await;
    assert_eq!(res.status(), StatusCode::OK);
    let distance = read_json(res).await["distance"].as_f64().unwrap();
    assert!((distance - 111.19).abs() < 0.1);

    let res = get(&app, "/airports/distance?id1=1&id2=77").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = get(&app, "/airports/distance?id1=0&id2=1").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn country_comparison_endpoint() {
    let (app, _state) = setup_app().await;

    let res = get(&app, "/airports/countries?country1=Farland&country2=Testland").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = read_json(res).await;
    assert_eq!(body["airport1"]["id"], 9);
    assert_eq!(body["airport2"]["id"], 4);

    let res = get(&app, "/airports/countries?country1=Farland&country2=Nowhere").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn route_endpoint_finds_multi_hop_route() {
    let (app, state) = setup_app().await;

    let res = get(&app, "/airports/route?fromId=1&toId=4").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = read_json(res).await;
    assert_eq!(body["totalStops"], 2);
    let legs = body["legs"].as_array().unwrap();
    assert_eq!(legs.len(), 3);
    assert_eq!(legs[0]["fromId"], 1);
    assert_eq!(legs[0]["fromNode"]["name"], "Airport 1");
    assert_eq!(legs[2]["toId"], 4);

    let res = get(&app, "/airports/route?fromId=4&toId=1").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(read_json(res).await["legs"][0]["fromId"], 4);

    let route_stats = state.metrics().snapshot().namespaces["route"];
    assert_eq!((route_stats.hits, route_stats.misses), (1, 1));
}

#[tokio::test]
async fn route_endpoint_errors() {
    let (app, _state) = setup_app().await;

    let res = get(&app, "/airports/route?fromId=1&toId=9").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_json(res).await["code"], "ROUTE_NOT_FOUND");

    let res = get(&app, "/airports/route?fromId=1&toId=999").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_json(res).await["code"], "AIRPORT_NOT_FOUND");

    let res = get(&app, "/airports/route?toId=2").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = read_json(res).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["message"], "fromId is required");
}

#[tokio::test]
async fn health_metrics_and_request_id() {
    let (app, _state) = setup_app().await;

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-123")
        .body(Body::empty())
        .unwrap();
    let res = app.clone().oneshot(request).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-request-id"], "req-123");
    assert_eq!(read_json(res).await["status"], "healthy");

    let res = get(&app, "/metrics").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
    let body = read_json(res).await;
    assert!(body["cache"]["namespaces"]["neighbors"].is_object());
}
