//! Ideaboard server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use apalis::layers::retry::RetryPolicy;
use apalis::prelude::*;
use apalis_redis::RedisStorage;
use ideaboard_api::AppState;
use ideaboard_common::Config;
use ideaboard_core::{
    CommentService, DispatchService, IdeaService, NotificationService, StatusService,
    UserService, VoteService,
};
use ideaboard_db::repositories::{
    CategoryRepository, CommentRepository, IdeaRepository, NotificationRepository,
    StatusRepository, UserRepository, VoteRepository,
};
use ideaboard_queue::{
    NotifyAllVotersJob, NotifyVotersContext, QUEUE_NAME, RedisVoterNotificationDispatch,
    RetryConfig, notify_all_voters_worker,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ideaboard=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting ideaboard server...");

    let config = Config::load()?;

    let db = ideaboard_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    ideaboard_db::migrate(&db).await?;
    info!("Migrations completed");

    info!("Connecting to Redis...");
    let redis_conn = apalis_redis::connect(config.redis.url.as_str()).await?;
    let storage = RedisStorage::<NotifyAllVotersJob>::new(redis_conn);
    info!("Connected to Redis job queue");

    let dispatch: DispatchService = Arc::new(RedisVoterNotificationDispatch::new(storage.clone()));

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let idea_repo = IdeaRepository::new(Arc::clone(&db));
    let vote_repo = VoteRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let category_repo = CategoryRepository::new(Arc::clone(&db));
    let status_repo = StatusRepository::new(Arc::clone(&db));
    let notification_repo = NotificationRepository::new(Arc::clone(&db));

    // Initialize services
    let notification_service = NotificationService::new(
        notification_repo,
        idea_repo.clone(),
        vote_repo.clone(),
        comment_repo.clone(),
        user_repo.clone(),
        status_repo.clone(),
    )
    .with_board_config(&config.board);

    let state = AppState {
        user_service: UserService::new(user_repo.clone()),
        idea_service: IdeaService::new(idea_repo.clone(), vote_repo.clone(), category_repo),
        vote_service: VoteService::new(vote_repo),
        comment_service: CommentService::new(
            comment_repo,
            user_repo,
            status_repo.clone(),
            notification_service.clone(),
        ),
        status_service: StatusService::new(idea_repo, status_repo, dispatch),
        notification_service: notification_service.clone(),
        board_name: config.board.name.clone(),
    };

    let app = ideaboard_api::app(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    if config.queue.run_workers {
        let retry = RetryConfig::from(&config.queue);
        info!(
            queue = QUEUE_NAME,
            max_attempts = retry.max_attempts,
            concurrency = config.queue.concurrency,
            "Starting voter notification worker..."
        );

        let ctx = NotifyVotersContext::new(notification_service, retry.clone());
        let concurrency = config.queue.concurrency.max(1);

        tokio::spawn(async move {
            let monitor = Monitor::new().register({
                WorkerBuilder::new(QUEUE_NAME)
                    .concurrency(concurrency)
                    .retry(RetryPolicy::retries(retry.retries()))
                    .enable_tracing()
                    .data(ctx)
                    .backend(storage)
                    .build_fn(notify_all_voters_worker)
            });

            if let Err(e) = monitor.run().await {
                tracing::error!(error = %e, "Voter notification worker failed");
            }
        });
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
