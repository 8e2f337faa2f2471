use crate::config::AppConfig;
use axum::Router;
use dotenv::dotenv;
use engine::app::{AppError, AppProperties, AppResult};
use error_stack::ResultExt;
use error_stack::fmt::ColorMode;
use feedback_core::repository::{EntityRepository, FeedbackRepository};
use feedback_core::{FeedbackEngine, LinkGenerator};
use feedback_routes::state::FeedbackAppState;
use repositories::memory::MemoryRepo;
use repositories::postgres::ConnectionDetails;
use repositories::postgres::entities::EntityRepo;
use repositories::postgres::feedback::FeedbackRepo;
use repositories::postgres::initializer::RepoCreator;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

mod config;

#[tokio::main]
async fn main() {
    match try_main().await {
        Ok(_) => info!("feedback service shutting down"),
        Err(e) => {
            error!("feedback service exited with error: {e:?}");
        }
    }
}

fn init_logging() {
    error_stack::Report::set_color_mode(ColorMode::None);

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_env("FEEDBACK_LOG"))
        .init();
}

async fn try_main() -> AppResult<()> {
    init_logging();

    if let Err(e) = dotenv() {
        warn!("failed to load .env file: {e}");
    }

    let config = AppConfig::from_env().change_context(AppError)?;
    let routes = build_routes(&config).await?;

    engine::app::run(
        routes,
        AppProperties {
            name: "feedback service",
            port: config.port,
        },
    )
    .await
}

async fn build_routes(config: &AppConfig) -> AppResult<Router> {
    let links = LinkGenerator::from_config(config.public_origin.as_deref());
    info!("feedback links will use origin {}", links.origin());

    match &config.database_url {
        Some(url) => {
            let engine = build_postgres_engine(url.clone(), config.pool_size).await?;
            build_app(engine, links, config.metrics_enabled)
        }
        None => {
            warn!("DATABASE_URL is not set, data will only be kept in memory");
            let repo = MemoryRepo::new();
            build_app(AppEngine::new(repo.clone(), repo), links, config.metrics_enabled)
        }
    }
}

fn build_app<T: FeedbackEngine>(
    engine: T,
    links: LinkGenerator,
    metrics_enabled: bool,
) -> AppResult<Router> {
    debug!("building routes..");
    let state = if metrics_enabled {
        FeedbackAppState::new_with_metrics(engine, links).change_context(AppError)?
    } else {
        FeedbackAppState::new_without_metrics(engine, links)
    };

    Ok(feedback_routes::routes::build(state)).inspect(|_| debug!("routes built"))
}

#[instrument(skip(url))]
async fn build_postgres_engine(
    url: String,
    pool_size: Option<usize>,
) -> AppResult<AppEngine<EntityRepo, FeedbackRepo>> {
    debug!("initializing postgres repositories");
    let (entities, feedback) = RepoCreator::default()
        .with_all()
        .create(ConnectionDetails::Url(url), pool_size)
        .await
        .change_context(AppError)?;

    Ok(AppEngine::new(entities, feedback))
}

#[derive(Debug, Clone)]
struct AppEngine<E, F> {
    entities: E,
    feedback: F,
}

impl<E, F> AppEngine<E, F> {
    fn new(entities: E, feedback: F) -> Self {
        Self { entities, feedback }
    }
}

impl<E, F> FeedbackEngine for AppEngine<E, F>
where
    E: EntityRepository + Clone + Send + Sync + 'static,
    F: FeedbackRepository + Clone + Send + Sync + 'static,
{
    type Entities = E;
    type Feedback = F;

    fn entities(&self) -> Self::Entities {
        self.entities.clone()
    }

    fn feedback(&self) -> Self::Feedback {
        self.feedback.clone()
    }
}
