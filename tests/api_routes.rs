//! HTTP surface tests: routes, payloads and error status mapping.

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use property_chain::PropertyService;
use property_chain::api::{self, AppState};
use serde_json::{Value, json};

fn state() -> web::Data<AppState> {
    let service = PropertyService::in_memory(1).expect("in-memory service");
    web::Data::new(AppState::new(service))
}

#[actix_web::test]
async fn health_and_empty_ledger() {
    let app = test::init_service(
        App::new()
            .app_data(state())
            .configure(api::init_routes),
    )
    .await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/v1/health/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let chain: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/v1/chain/").to_request()).await;
    assert_eq!(chain["length"], json!(1));
    assert_eq!(chain["difficulty"], json!(1));
    assert_eq!(chain["chain"][0]["index"], json!(0));
    assert!(chain["chain"][0]["hash"].as_str().unwrap().starts_with('0'));

    let valid: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/v1/validate/").to_request()).await;
    assert_eq!(valid["valid"], json!(true));
    assert_eq!(valid["violation"], Value::Null);

    let accounts: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/v1/accounts/").to_request()).await;
    assert_eq!(accounts["count"], json!(3));
}

#[actix_web::test]
async fn property_lifecycle_over_http() {
    let app = test::init_service(
        App::new()
            .app_data(state())
            .configure(api::init_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/properties/")
        .set_json(json!({"owner": "alice", "title": "Cabin", "description": "lake view"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["owner"], json!("alice"));
    assert_eq!(created["rented_to"], Value::Null);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/properties/{id}/transfer/"))
        .set_json(json!({"actor": "alice", "new_owner": "bob"}))
        .to_request();
    let mined: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(mined["mined_index"], json!(2));
    assert_eq!(mined["property"]["owner"], json!("bob"));
    assert!(mined["hash"].as_str().unwrap().starts_with('0'));

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/properties/{id}/rent/"))
        .set_json(json!({"actor": "bob", "renter": "carlos"}))
        .to_request();
    let mined: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(mined["property"]["rented_to"], json!("carlos"));

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/properties/{id}/end-rental/"))
        .set_json(json!({"actor": "carlos"}))
        .to_request();
    let mined: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(mined["property"]["rented_to"], Value::Null);
    assert_eq!(mined["property"]["history"].as_array().unwrap().len(), 4);

    let prop: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/properties/{id}/"))
            .to_request(),
    )
    .await;
    assert_eq!(prop["owner"], json!("bob"));

    let stats: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/v1/stats/").to_request()).await;
    assert_eq!(stats["height"], json!(5));
    assert_eq!(stats["properties"], json!(1));
}

#[actix_web::test]
async fn domain_errors_map_to_status_codes() {
    let app = test::init_service(
        App::new()
            .app_data(state())
            .configure(api::init_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/properties/")
        .set_json(json!({"owner": "alice", "title": "Cabin"}))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["id"].as_str().unwrap().to_string();

    let cases = [
        (
            format!("/api/v1/properties/{id}/transfer/"),
            json!({"actor": "bob", "new_owner": "carlos"}),
            StatusCode::FORBIDDEN,
        ),
        (
            format!("/api/v1/properties/{id}/transfer/"),
            json!({"actor": "alice", "new_owner": "alice"}),
            StatusCode::BAD_REQUEST,
        ),
        (
            format!("/api/v1/properties/{id}/rent/"),
            json!({"actor": "alice", "renter": "alice"}),
            StatusCode::BAD_REQUEST,
        ),
        (
            "/api/v1/properties/missing/rent/".to_string(),
            json!({"actor": "alice", "renter": "bob"}),
            StatusCode::NOT_FOUND,
        ),
        (
            "/api/v1/accounts/".to_string(),
            json!({"id": "alice", "name": "Alice Again"}),
            StatusCode::CONFLICT,
        ),
    ];

    for (uri, body, expected) in cases {
        let req = test::TestRequest::post().uri(&uri).set_json(body).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected, "POST {uri}");
        let err: Value = test::read_body_json(resp).await;
        assert!(err["error"].is_string());
    }

    // Nothing above mined a block.
    let chain: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/v1/chain/").to_request()).await;
    assert_eq!(chain["length"], json!(2));
}
