use std::{process, sync::Arc};

use apalis::prelude::{Monitor, WorkerBuilder, WorkerFactoryFn};
use apalis_cron::CronStream;
use atelier::{
    application::{
        artworks::ArtworkService,
        error::AppError,
        jobs::{RefreshContext, process_refresh_job, refresh_schedule},
        products::ProductService,
        repos::{ArtworksRepo, ProductsRepo},
    },
    cache::{ArtworkCache, CacheConfig, MemoryCache},
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, state::ApiState},
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Refresh(_) => run_refresh(settings).await,
    }
}

struct ApplicationContext {
    api_state: ApiState,
    refresh_context: RefreshContext,
}

async fn init_repositories(settings: &config::Settings) -> Result<PostgresRepositories, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool = PostgresRepositories::connect(
        database_url,
        settings.database.max_connections.get(),
        settings.database.acquire_timeout,
    )
    .await
    .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    Ok(PostgresRepositories::new(pool))
}

fn build_application_context(
    repositories: PostgresRepositories,
    settings: &config::Settings,
) -> ApplicationContext {
    let repositories_arc = Arc::new(repositories.clone());
    let artworks_repo: Arc<dyn ArtworksRepo> = repositories_arc.clone();
    let products_repo: Arc<dyn ProductsRepo> = repositories_arc.clone();

    let cache_config = CacheConfig::from(&settings.cache);
    let cache: Arc<dyn ArtworkCache> = Arc::new(MemoryCache::new(&cache_config));

    let artworks = Arc::new(ArtworkService::new(
        artworks_repo.clone(),
        cache.clone(),
        cache_config.clone(),
    ));
    let products = Arc::new(ProductService::new(
        products_repo,
        artworks_repo,
        cache,
        cache_config,
    ));

    let refresh_context = RefreshContext::new(artworks.clone());

    ApplicationContext {
        api_state: ApiState::new(artworks, products, repositories),
        refresh_context,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let app = build_application_context(repositories, &settings);

    let monitor_handle = spawn_refresh_monitor(app.refresh_context, &settings.jobs)?;

    let result = serve_http(&settings, app.api_state).await;

    monitor_handle.abort();
    let _ = monitor_handle.await;

    result
}

async fn run_refresh(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let app = build_application_context(repositories, &settings);

    let summary = app.refresh_context.artworks().refresh().await?;
    info!(
        artworks = summary.artworks,
        updated_hashes = summary.updated_hashes,
        "refresh pass completed"
    );
    Ok(())
}

fn spawn_refresh_monitor(
    context: RefreshContext,
    jobs: &config::JobsSettings,
) -> Result<tokio::task::JoinHandle<()>, AppError> {
    let schedule = refresh_schedule(&jobs.refresh_cron)?;

    let refresh_worker = WorkerBuilder::new("refresh-cache-worker")
        .data(context)
        .backend(CronStream::new(schedule))
        .build_fn(process_refresh_job);

    let monitor = Monitor::new().register(refresh_worker);

    Ok(tokio::spawn(async move {
        if let Err(err) = monitor.run().await {
            error!(error = %err, "refresh monitor stopped");
        }
    }))
}

async fn serve_http(settings: &config::Settings, api_state: ApiState) -> Result<(), AppError> {
    let router = http::build_router(api_state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(addr = %settings.server.addr, "listening");

    axum::serve(listener, router.into_make_service())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}
