use std::{net::SocketAddr, sync::Arc};

use canvas_ledger::{
    AppState, RateLimiters, build_router,
    config::{Config, StoreBackend},
    error::Result,
    infrastructure::{cache::Cache, db::Database},
    ledger::{
        BlockSource, EventBus, MemoryStore, StateReader, StateStore,
        block::{RetryPolicy, StoreBlockSource},
    },
    middleware::rate_limit::create_limiter,
    services::{
        chain::{BlockProducer, Chain, Genesis, Mempool},
        consumer::{EventConsumer, run_consumer},
        statistics::StatisticsRecorder,
        timelapse::TimelapseMaterializer,
        view::ViewMaterializer,
    },
    utils::server::{init_tracing, shutdown_signal},
    ws::{EventRelay, RoomManager},
};
use chrono::Utc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    let config = Config::from_env()?;
    config.validate()?;
    tracing::info!("Configuration loaded");

    let db = Database::init_db(&config.database).await?;
    tracing::info!("Database initialized");

    db.run_migrations().await?;
    tracing::info!("Migrations completed");
    let db = Arc::new(db);

    let cache = Arc::new(Cache::init(&config).await?);
    tracing::info!("Cache initialized");

    let store: Arc<dyn StateStore> = match config.chain.store {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::Redis => Arc::new(cache.redis.ledger_store()),
    };
    tracing::info!(backend = ?config.chain.store, "Ledger store initialized");

    let events = EventBus::new(config.materializer.event_buffer_size);
    let chain = Arc::new(Chain::new(Arc::clone(&store), events.clone()));

    let created = chain
        .apply_genesis(&Genesis {
            admin: config.chain.admin_address,
            wallet: config.chain.wallet_address,
            balances: config.chain.genesis_balances.clone(),
            timestamp: Utc::now().timestamp(),
        })
        .await?;
    tracing::info!(created, "Genesis checked");

    let reader: Arc<dyn StateReader> = store.clone();
    let blocks: Arc<dyn BlockSource> = Arc::new(StoreBlockSource::new(Arc::clone(&store)));
    let retry = RetryPolicy {
        attempts: config.materializer.block_fetch_attempts,
        delay: config.materializer.block_fetch_delay,
    };

    let views = Arc::new(ViewMaterializer::new(
        Arc::clone(&reader),
        Arc::clone(&blocks),
        events.clone(),
        retry,
    ));
    let ws_rooms = Arc::new(RoomManager::initialize(config.ws.max_connections_per_room));

    let consumers: Vec<Arc<dyn EventConsumer>> = vec![
        views.clone(),
        Arc::new(TimelapseMaterializer::new(
            Arc::clone(&db),
            Arc::clone(&reader),
            Arc::clone(&blocks),
            retry,
            &config.timelapse,
        )),
        Arc::new(StatisticsRecorder::new(
            Arc::clone(&db),
            Arc::clone(&blocks),
            retry,
        )),
        cache.local.clone(),
        Arc::new(EventRelay::new(Arc::clone(&ws_rooms))),
    ];

    // Subscribe every consumer before the first block is produced.
    for consumer in consumers {
        let receiver = events.subscribe();
        tokio::spawn(run_consumer(consumer, receiver));
    }
    tracing::info!("Event consumers started");

    let mempool = Arc::new(Mempool::new(config.chain.mempool_capacity));
    let producer = BlockProducer::new(
        Arc::clone(&chain),
        Arc::clone(&mempool),
        config.chain.block_interval,
        config.chain.max_transactions_per_block,
    );
    tokio::spawn(producer.run());

    let rate_limit_redis_cache = Arc::new(cache.redis.clone());

    let rate_limiters = RateLimiters {
        submit: create_limiter(
            rate_limit_redis_cache,
            config.rate_limit.submit_limit,
            "submit",
        ),
    };

    let state = AppState {
        config: Arc::new(config.clone()),
        cache,
        chain,
        mempool,
        views,
        ws_rooms,
        rate_limiters: Arc::new(rate_limiters),
    };

    let app = build_router(state);

    let server_addr = format!("{}:{}", config.server.host, config.server.port);

    let listener = TcpListener::bind(server_addr).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;
    tracing::info!("Server shutdown complete");

    Ok(())
}
