use actix_web::{http::StatusCode, test, test::TestRequest, App};

use crate::{
    endpoint_tests::helpers::{spawn_fake_scraper, TestContext},
    routes::configure_routes,
};

macro_rules! test_app {
    ($ctx:expr) => {
        test::init_service(
            App::new()
                .app_data($ctx.refresh_data())
                .app_data($ctx.observations_data())
                .app_data($ctx.sink_data())
                .configure(configure_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn health_needs_no_owner() {
    let ctx = TestContext::new("http://127.0.0.1:1").await;
    let app = test_app!(ctx);
    let resp = test::call_service(&app, TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn product_routes_reject_requests_without_an_owner_header() {
    let ctx = TestContext::new("http://127.0.0.1:1").await;
    let app = test_app!(ctx);
    let resp = test::call_service(&app, TestRequest::get().uri("/api/products").to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn unknown_products_are_not_found() {
    let ctx = TestContext::new("http://127.0.0.1:1").await;
    let app = test_app!(ctx);
    let req = TestRequest::get()
        .uri("/api/products/9999")
        .insert_header(("X-User-Email", "alice@example.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn an_unreachable_source_turns_creation_into_bad_gateway() {
    let ctx = TestContext::new("http://127.0.0.1:1").await;
    let app = test_app!(ctx);
    let req = TestRequest::post()
        .uri("/api/products/by-url")
        .insert_header(("X-User-Email", "alice@example.com"))
        .set_json(serde_json::json!({"product_url": "https://s/p/1"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
}

#[actix_web::test]
async fn observing_listing_and_deleting_a_product_end_to_end() {
    let scraper_url = spawn_fake_scraper().await;
    let ctx = TestContext::new(&scraper_url).await;
    let app = test_app!(ctx);
    let owner = ("X-User-Email", "alice@example.com");

    let req = TestRequest::post()
        .uri("/api/products/by-url")
        .insert_header(owner)
        .set_json(serde_json::json!({"product_url": "https://store.example/p/pasted"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(created["product_name"], "Fake Product");
    assert_eq!(created["current_price"], "49.99");
    assert_eq!(created["product_url"], "https://store.example/p/fake");
    let id = created["id"].as_i64().unwrap();

    let req = TestRequest::get().uri("/api/products").insert_header(owner).to_request();
    let listed: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let req = TestRequest::get().uri(&format!("/api/products/{id}")).insert_header(owner).to_request();
    let details: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(details["price_history"].as_array().unwrap().len(), 1);
    assert_eq!(details["price_history"][0]["price"], "49.99");

    // The listing is owner-scoped: someone else sees nothing and cannot delete it.
    let req = TestRequest::get().uri("/api/products").insert_header(("X-User-Email", "bob@example.com")).to_request();
    let listed: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert!(listed.as_array().unwrap().is_empty());
    let req = TestRequest::delete()
        .uri(&format!("/api/products/{id}"))
        .insert_header(("X-User-Email", "bob@example.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = TestRequest::delete().uri(&format!("/api/products/{id}")).insert_header(owner).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let req = TestRequest::get().uri(&format!("/api/products/{id}")).insert_header(owner).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
