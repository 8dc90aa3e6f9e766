//! Request handler definitions
//!
//! Define each route and its handler here. Handlers that are more than a line or two MUST go into
//! a separate module. Keep this module neat and tidy 🙏
//!
//! Handlers run concurrently on actix worker threads, so anything slow in here must be awaited,
//! never blocked on.
use actix_web::{delete, get, post, web, HttpRequest, HttpResponse, Responder};
use log::*;
use notify_queue::NotificationQueue;
use price_watch_engine::{ObservationsApi, RefreshApi, SqliteDatabase};
use pw_common::InMemoryMetrics;
use scraper_client::ScraperApi;

use crate::{
    data_objects::{BatchUpdateResult, ObserveByNameRequest, ObserveByUrlRequest, ProductDetailsResponse, ProductObservationResponse},
    errors::ServerError,
    helpers::get_owner_email,
};

/// The concrete refresh pipeline this server wires together.
pub type Refresh = RefreshApi<SqliteDatabase, ScraperApi, NotificationQueue>;
pub type Observations = ObservationsApi<SqliteDatabase, ScraperApi>;

/// Register every route. Shared between the real server and the endpoint tests.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health).service(
        web::scope("/api")
            .service(trigger_batch_update)
            .service(observe_by_name)
            .service(observe_by_url)
            .service(my_products)
            .service(product_details)
            .service(delete_product)
            .service(metrics_snapshot),
    );
}

#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().body("👍️\n")
}

/// The trigger surface: run one refresh batch now. Responds with how many observations were
/// attempted; only a failure to select the batch turns into an error status.
#[post("/cron/update-prices")]
pub async fn trigger_batch_update(api: web::Data<Refresh>) -> Result<HttpResponse, ServerError> {
    info!("🕰️ Received cron request to update prices");
    let processed = api.run_once().await.map_err(|e| ServerError::BackendError(e.to_string()))?;
    Ok(HttpResponse::Ok().json(BatchUpdateResult { processed }))
}

#[post("/products/by-name")]
pub async fn observe_by_name(
    req: HttpRequest,
    body: web::Json<ObserveByNameRequest>,
    api: web::Data<Observations>,
) -> Result<HttpResponse, ServerError> {
    let owner = get_owner_email(&req)?;
    let observation = api.observe_by_name(&owner, &body.product_name).await?;
    Ok(HttpResponse::Created().json(ProductObservationResponse::from(&observation)))
}

#[post("/products/by-url")]
pub async fn observe_by_url(
    req: HttpRequest,
    body: web::Json<ObserveByUrlRequest>,
    api: web::Data<Observations>,
) -> Result<HttpResponse, ServerError> {
    let owner = get_owner_email(&req)?;
    let observation = api.observe_by_url(&owner, &body.product_url).await?;
    Ok(HttpResponse::Created().json(ProductObservationResponse::from(&observation)))
}

#[get("/products")]
pub async fn my_products(req: HttpRequest, api: web::Data<Observations>) -> Result<HttpResponse, ServerError> {
    let owner = get_owner_email(&req)?;
    let observations = api.my_observations(&owner).await?;
    let response: Vec<ProductObservationResponse> = observations.iter().map(ProductObservationResponse::from).collect();
    Ok(HttpResponse::Ok().json(response))
}

#[get("/products/{id}")]
pub async fn product_details(
    req: HttpRequest,
    path: web::Path<i64>,
    api: web::Data<Observations>,
) -> Result<HttpResponse, ServerError> {
    let owner = get_owner_email(&req)?;
    let observation = api.observation_details(&owner, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ProductDetailsResponse::from(&observation)))
}

#[delete("/products/{id}")]
pub async fn delete_product(
    req: HttpRequest,
    path: web::Path<i64>,
    api: web::Data<Observations>,
) -> Result<HttpResponse, ServerError> {
    let owner = get_owner_email(&req)?;
    api.remove_observation(&owner, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Read-only snapshot of the in-process counters, for operators.
#[get("/metrics")]
pub async fn metrics_snapshot(sink: web::Data<InMemoryMetrics>) -> impl Responder {
    HttpResponse::Ok().json(sink.snapshot())
}
