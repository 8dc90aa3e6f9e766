use actix_web::{test, test::TestRequest, App};
use chrono::Utc;
use price_watch_engine::{db_types::NewObservation, ObservationStore};
use pw_common::{Price, PRICE_UPDATE_METRIC};

use crate::{endpoint_tests::helpers::TestContext, routes::configure_routes};

#[actix_web::test]
async fn cron_reports_attempted_count_even_when_the_source_is_down() {
    // Nothing listens on port 1, so every fetch fails with a connection error. The batch must
    // still stamp and count every item.
    let ctx = TestContext::new("http://127.0.0.1:1").await;
    let before = Utc::now();
    let price: Price = "100.00".parse().unwrap();
    let first = ctx
        .db
        .insert_observation(NewObservation::new("One", "https://s/p/1", "alice@example.com", price))
        .await
        .unwrap();
    let second = ctx
        .db
        .insert_observation(NewObservation::new("Two", "https://s/p/2", "alice@example.com", price))
        .await
        .unwrap();

    let app = test::init_service(
        App::new()
            .app_data(ctx.refresh_data())
            .app_data(ctx.observations_data())
            .app_data(ctx.sink_data())
            .configure(configure_routes),
    )
    .await;

    let req = TestRequest::post().uri("/api/cron/update-prices").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["processed"], 2);

    for seeded in [first, second] {
        let saved = ctx.db.fetch_observation(seeded.id(), "alice@example.com").await.unwrap().unwrap();
        assert_eq!(saved.current_price(), price);
        assert!(saved.history().is_empty(), "a failed fetch must not append samples");
        assert!(saved.last_checked_at().unwrap() >= before);
    }
    assert_eq!(ctx.sink.count(PRICE_UPDATE_METRIC, "failure", "transient"), 2);

    // The counters are visible over HTTP as well.
    let req = TestRequest::get().uri("/api/metrics").to_request();
    let metrics: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(metrics["product.price.update{status=\"failure\",reason=\"transient\"}"], 2);
}

#[actix_web::test]
async fn cron_is_a_no_op_on_an_empty_store() {
    let ctx = TestContext::new("http://127.0.0.1:1").await;
    let app = test::init_service(
        App::new()
            .app_data(ctx.refresh_data())
            .app_data(ctx.observations_data())
            .app_data(ctx.sink_data())
            .configure(configure_routes),
    )
    .await;

    let req = TestRequest::post().uri("/api/cron/update-prices").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["processed"], 0);
    assert!(ctx.sink.snapshot().is_empty());
}
