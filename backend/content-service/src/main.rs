use actix_web::{web, App, HttpResponse, HttpServer};
use anyhow::Context;
use content_authz::{AccessPolicy, OwnershipPolicy};
use content_service::cache::{PostCache, RedisPostCache};
use content_service::db::{PgCommentRepository, PgPostRepository, MIGRATOR};
use content_service::handlers;
use content_service::metrics::serve_metrics;
use content_service::middleware::{JwtAuthMiddleware, JwtValidator, MetricsMiddleware};
use content_service::services::{CommentService, PostService};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn health(pool: web::Data<sqlx::PgPool>) -> HttpResponse {
    match sqlx::query("SELECT 1").fetch_one(pool.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "content-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": "content-service"
        })),
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=debug,sqlx=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = content_service::Config::from_env()
        .map_err(anyhow::Error::msg)
        .context("failed to load configuration")?;

    init_tracing(config.app.json_logs);

    tracing::info!("Starting content-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&config.database.url)
        .await
        .context("failed to create database pool")?;

    MIGRATOR
        .run(&db_pool)
        .await
        .context("failed to run database migrations")?;
    tracing::info!("Connected to database, migrations applied");

    let post_cache = match &config.cache.url {
        Some(url) => {
            let client = redis::Client::open(url.as_str()).context("invalid REDIS_URL")?;
            let manager = redis::aio::ConnectionManager::new(client)
                .await
                .context("failed to connect to Redis")?;
            tracing::info!("Post cache enabled (ttl {}s)", config.cache.post_ttl_secs);
            let cache: Arc<dyn PostCache> =
                Arc::new(RedisPostCache::new(manager, config.cache.post_ttl_secs));
            Some(cache)
        }
        None => {
            tracing::warn!("REDIS_URL not set; post cache disabled");
            None
        }
    };

    let policy: Arc<dyn AccessPolicy> = Arc::new(OwnershipPolicy::new());
    let post_repo = Arc::new(PgPostRepository::new(db_pool.clone()));
    let comment_repo = Arc::new(PgCommentRepository::new(db_pool.clone()));

    let post_service = Arc::new(match post_cache {
        Some(cache) => PostService::with_cache(post_repo, policy.clone(), cache),
        None => PostService::new(post_repo, policy.clone()),
    });
    let comment_service = Arc::new(CommentService::new(
        post_service.clone(),
        comment_repo,
        policy,
    ));

    let validator = Arc::new(JwtValidator::from_config(&config.auth));

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(web::Data::from(post_service.clone()))
            .app_data(web::Data::from(comment_service.clone()))
            .wrap(MetricsMiddleware)
            .wrap(TracingLogger::default())
            .route("/health", web::get().to(health))
            .route("/metrics", web::get().to(serve_metrics))
            .service(
                web::scope("/api")
                    .wrap(JwtAuthMiddleware::new(validator.clone()))
                    .configure(handlers::configure),
            )
    })
    .bind(&bind_address)
    .with_context(|| format!("failed to bind {}", bind_address))?
    .run()
    .await?;

    Ok(())
}
