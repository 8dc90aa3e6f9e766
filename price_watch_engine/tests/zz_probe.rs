use chrono::{Duration, Utc};
use price_watch_engine::db_types::{NewObservation, Observation};
use price_watch_engine::{ObservationStore, SqliteDatabase};
use pw_common::Price;
use std::str::FromStr;

#[tokio::test]
async fn probe_bound_limit() {
    let path = format!("{}/pw_probe_{}.db", std::env::temp_dir().display(), rand::random::<u64>());
    let url = format!("sqlite://{path}");
    SqliteDatabase::create_database(&url).await.unwrap();
    let db = SqliteDatabase::new_with_url(&url, 5).await.unwrap();
    db.run_migrations().await.unwrap();

    let now = Utc::now();
    let mut a = db
        .insert_observation(NewObservation::new("Checked", "u1", "o", Price::from_str("10").unwrap()))
        .await.unwrap();
    a.append_sample(Price::from_str("10").unwrap(), now - Duration::hours(1));
    a.mark_checked(now - Duration::hours(1));
    db.save(a).await.unwrap();
    db.insert_observation(NewObservation::new("Never", "u2", "o", Price::from_str("10").unwrap()))
        .await.unwrap();

    let pool = db.pool();
    let sql = "SELECT * FROM observations ORDER BY last_checked_at ASC NULLS FIRST, id ASC LIMIT $1";

    for lim in [10i64] {
        let rows = sqlx::query_as::<_, Observation>(sql).bind(lim).fetch_all(pool).await.unwrap();
        eprintln!("PROBE bound LIMIT ${{1}}={lim} -> count = {}", rows.len());
        for o in &rows { eprintln!("  id={} lc={:?}", o.id(), o.last_checked_at()); }
    }

    // compare: literal limit
    let lit = sqlx::query_as::<_, Observation>(
        "SELECT * FROM observations ORDER BY last_checked_at ASC NULLS FIRST, id ASC LIMIT 10",
    ).fetch_all(pool).await.unwrap();
    eprintln!("PROBE literal LIMIT 10 -> count = {}", lit.len());
}
