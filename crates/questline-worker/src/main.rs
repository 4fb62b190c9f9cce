//! Questline worker entry point.

use std::sync::{Arc, Mutex};

use questline_core::clock::SystemClock;
use questline_core::rng::StdRngSource;
use questline_quest::repository::QuestGraphStore;
use questline_recurrence::domain::report::RecurrenceSettings;
use questline_store::memory::InMemoryQuestStore;
use questline_store::pg::PgQuestStore;
use questline_worker::config::WorkerConfig;
use questline_worker::error::AppError;
use questline_worker::runner::{run_job_line, run_recurrence_tick};
use questline_worker::state::WorkerState;
use sqlx::postgres::PgPoolOptions;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

async fn connect_store(config: &WorkerConfig) -> Result<Arc<dyn QuestGraphStore>, AppError> {
    let Some(database_url) = &config.database_url else {
        tracing::warn!("DATABASE_URL not set; quests are kept in memory");
        return Ok(Arc::new(InMemoryQuestStore::new()));
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(database_url)
        .await?;
    sqlx::migrate!("../../migrations").run(&pool).await?;
    tracing::info!("database ready");
    Ok(Arc::new(PgQuestStore::new(pool)))
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Questline worker");

    let config = WorkerConfig::from_env()?;
    let store = connect_store(&config).await?;
    let state = WorkerState::new(
        store,
        Arc::new(SystemClock),
        Arc::new(Mutex::new(StdRngSource::from_os())),
        RecurrenceSettings {
            batch_size: config.recurrence_batch_size,
        },
    );

    let mut ticker = tokio::time::interval(config.recurrence_interval);
    let mut jobs = BufReader::new(tokio::io::stdin()).lines();
    let mut jobs_open = true;
    tracing::info!(
        interval_secs = config.recurrence_interval.as_secs(),
        batch_size = config.recurrence_batch_size,
        "worker running"
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = run_recurrence_tick(&state).await {
                    tracing::error!(error = %e, "recurrence batch failed");
                }
            }
            line = jobs.next_line(), if jobs_open => match line? {
                Some(line) if line.trim().is_empty() => {}
                Some(line) => {
                    if let Err(e) = run_job_line(&state, &line).await {
                        tracing::error!(error = %e, "job failed");
                    }
                }
                None => {
                    tracing::info!("job input closed; running recurrence only");
                    jobs_open = false;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                break;
            }
        }
    }

    Ok(())
}
