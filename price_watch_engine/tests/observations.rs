//! Owner-scoped CRUD flows: creating observations from source lookups, listing, details with
//! history, deletion.

use chrono::{Duration, Utc};
use price_watch_engine::{ObservationStore, ObservationsApi, ObservationsApiError, SqliteDatabase};
use pw_common::{FailureTag, FetchOutcome, SourceUnreachable};

use crate::support::{prepare_test_store, price, seed_checked, tear_down, ScriptedSource};

mod support;

const ALICE: &str = "alice@example.com";
const BOB: &str = "bob@example.com";

fn api(db: SqliteDatabase, source: &ScriptedSource) -> ObservationsApi<SqliteDatabase, ScriptedSource> {
    ObservationsApi::new(db, source.clone())
}

#[tokio::test]
async fn observing_by_url_stores_the_canonical_answer() {
    let db = prepare_test_store().await;
    let source = ScriptedSource::default();
    // The user pastes one URL; the source reports a corrected name and its own canonical URL.
    source.script_found("https://s/p/pasted?ref=campaign", "Proper Name", "123.45", "https://s/p/canonical");

    let observation =
        api(db.clone(), &source).observe_by_url(ALICE, "https://s/p/pasted?ref=campaign").await.unwrap();

    assert_eq!(observation.owner_email(), ALICE);
    assert_eq!(observation.product_name(), "Proper Name");
    assert_eq!(observation.product_url(), "https://s/p/canonical");
    assert_eq!(observation.current_price(), price("123.45"));
    assert!(observation.last_checked_at().is_some());

    let details = db.fetch_observation(observation.id(), ALICE).await.unwrap().unwrap();
    assert_eq!(details.history().len(), 1);
    assert_eq!(details.latest_sample().unwrap().price(), price("123.45"));
    tear_down(db).await;
}

#[tokio::test]
async fn observing_by_name_resolves_through_the_search_endpoint() {
    let db = prepare_test_store().await;
    let source = ScriptedSource::default();
    source.script_found("wireless earbuds", "Acme Earbuds Pro", "59.99", "https://s/p/earbuds");

    let observation = api(db.clone(), &source).observe_by_name(ALICE, "wireless earbuds").await.unwrap();

    assert_eq!(source.name_calls(), vec!["wireless earbuds".to_string()]);
    assert!(source.url_calls().is_empty());
    assert_eq!(observation.product_name(), "Acme Earbuds Pro");
    tear_down(db).await;
}

#[tokio::test]
async fn source_failures_map_to_api_errors() {
    let db = prepare_test_store().await;
    let source = ScriptedSource::default();
    source.script("missing", Ok(FetchOutcome::NotFound { message: "Could not find item".to_string() }));
    source.script("bad", Ok(FetchOutcome::InvalidInput { message: "Invalid link".to_string() }));
    source.script(
        "weird",
        Ok(FetchOutcome::Unknown { tag: FailureTag::Parsing, message: "Invalid price".to_string() }),
    );
    source.script("down", Err(SourceUnreachable("connection refused".to_string())));
    let api = api(db.clone(), &source);

    assert!(matches!(api.observe_by_name(ALICE, "missing").await, Err(ObservationsApiError::NotFoundInStore(_))));
    assert!(matches!(api.observe_by_name(ALICE, "bad").await, Err(ObservationsApiError::InvalidQuery(_))));
    assert!(matches!(api.observe_by_name(ALICE, "weird").await, Err(ObservationsApiError::SourceUnavailable(_))));
    assert!(matches!(api.observe_by_name(ALICE, "down").await, Err(ObservationsApiError::SourceUnavailable(_))));
    // Nothing was persisted along the way.
    assert!(db.fetch_observations_for_owner(ALICE).await.unwrap().is_empty());
    tear_down(db).await;
}

#[tokio::test]
async fn listing_and_details_are_owner_scoped() {
    let db = prepare_test_store().await;
    let now = Utc::now();
    let alices = seed_checked(&db, ALICE, "Alice's", "https://s/p/a", "10", now - Duration::hours(1)).await;
    seed_checked(&db, BOB, "Bob's", "https://s/p/b", "20", now - Duration::hours(1)).await;
    let source = ScriptedSource::default();
    let api = api(db.clone(), &source);

    let mine = api.my_observations(ALICE).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].product_name(), "Alice's");

    // Bob cannot see Alice's observation, not even its existence.
    assert!(matches!(
        api.observation_details(BOB, alices.id()).await,
        Err(ObservationsApiError::NotFound(_))
    ));
    let details = api.observation_details(ALICE, alices.id()).await.unwrap();
    assert_eq!(details.history().len(), 1);
    tear_down(db).await;
}

#[tokio::test]
async fn deletion_is_owner_scoped_and_final() {
    let db = prepare_test_store().await;
    let seeded = seed_checked(&db, ALICE, "Doomed", "https://s/p/d", "10", Utc::now() - Duration::hours(1)).await;
    let source = ScriptedSource::default();
    let api = api(db.clone(), &source);

    assert!(matches!(api.remove_observation(BOB, seeded.id()).await, Err(ObservationsApiError::NotFound(_))));
    api.remove_observation(ALICE, seeded.id()).await.unwrap();
    assert!(db.fetch_observation(seeded.id(), ALICE).await.unwrap().is_none());
    assert!(matches!(api.remove_observation(ALICE, seeded.id()).await, Err(ObservationsApiError::NotFound(_))));
    tear_down(db).await;
}

#[tokio::test]
async fn history_is_returned_oldest_first() {
    let db = prepare_test_store().await;
    let now = Utc::now();
    let seeded = seed_checked(&db, ALICE, "Tracked", "https://s/p/t", "30", now - Duration::days(2)).await;
    let mut obs = db.fetch_observation(seeded.id(), ALICE).await.unwrap().unwrap();
    obs.append_sample(price("25"), now - Duration::days(1));
    obs.append_sample(price("27.50"), now);
    obs.mark_checked(now);
    db.save(obs).await.unwrap();

    let details = db.fetch_observation(seeded.id(), ALICE).await.unwrap().unwrap();
    let prices: Vec<String> = details.history().iter().map(|s| s.price().to_string()).collect();
    assert_eq!(prices, vec!["30", "25", "27.50"]);
    assert_eq!(details.current_price(), price("27.50"));
    assert!(details.history().iter().all(|s| s.is_persisted()));
    tear_down(db).await;
}
