use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ticketing_service::{
    cache::CacheService,
    config::Config,
    controllers,
    database::Database,
    redis_client::RedisClient,
    services::booking_commands::BookingCommandService,
    services::enrichment::EnrichmentClient,
    services::projector::Projector,
    services::publisher::EventPublisher,
    services::queries::TicketQueryService,
    services::sweeper::ExpirySweeper,
    AppState,
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    // В production логи уходят в JSON для сборщика, локально - обычный fmt.
    if config.app.environment == "production" {
        tracing_subscriber::registry()
            .with(tracing_subscriber::EnvFilter::new(&config.app.rust_log))
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(tracing_subscriber::EnvFilter::new(&config.app.rust_log))
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    info!("Starting Ticketing Service");

    let db = Database::new(&config.database)
        .await
        .expect("Failed to connect to databases");
    info!("Databases connected");

    db.run_migrations()
        .await
        .expect("Failed to run migrations");

    let redis = RedisClient::new(&config.redis)
        .await
        .expect("Failed to connect to Redis");
    info!("Redis connected");

    let cache = CacheService::new(redis.clone());

    let publisher = EventPublisher::new(&config.kafka)
        .expect("Failed to create Kafka producer");

    let commands = BookingCommandService::new(db.clone(), publisher.clone());
    let queries = TicketQueryService::new(db.clone(), cache.clone());

    // Проектор: единственный писатель витрины чтения.
    let enrichment = EnrichmentClient::new(&config.external, &config.circuit_breaker);
    let projector = Projector::new(
        &config.kafka,
        db.clone(),
        cache.clone(),
        publisher.clone(),
        enrichment,
    )
    .expect("Failed to create Kafka consumer");
    let projector_handle = task::spawn(projector.run());

    // Фоновая задача, снимающая просроченные резервы.
    let sweeper = ExpirySweeper::new(db.clone(), commands.clone(), config.sweeper.clone());
    let sweeper_handle = task::spawn(sweeper.run());

    let app_state = Arc::new(AppState {
        db: db.clone(),
        redis: redis.clone(),
        cache,
        config: config.clone(),
        commands,
        queries,
    });

    let app = Router::new()
        .route("/", get(|| async { "Ticketing Service API v1.0" }))
        .nest("/api", controllers::routes())
        .with_state(app_state.clone())
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.app.port));
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    // Порядок остановки: дослать буфер продьюсера, остановить потребителя,
    // затем закрыть пулы. Кэш закрывается вместе с процессом.
    info!("Shutting down");
    publisher.flush(Duration::from_secs(10));
    projector_handle.abort();
    sweeper_handle.abort();
    db.close().await;
    info!("Shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
