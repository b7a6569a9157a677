//! Wiring & DI. Entry point: load config, bootstrap adapters, inject into the pipeline, run once.
//! No business logic here; the scheduler invokes this binary with no arguments.

use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use weekly_digest::adapters::mail::{LogMailer, SesMailer};
use weekly_digest::adapters::persistence::{MySqlStore, SqliteStore};
use weekly_digest::domain::DomainError;
use weekly_digest::ports::{ContentStore, DigestTrigger, InvocationBody, InvocationResult, MailPort};
use weekly_digest::shared::config::AppConfig;
use weekly_digest::usecases::{ContentAggregator, DigestDispatcher, DigestPipeline, DigestRenderer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    let result = match wire().await {
        Ok(pipeline) => pipeline.invoke().await,
        Err(e) => {
            // Startup failures still answer with the invocation result shape.
            error!(error = %e, "digest wiring failed");
            InvocationResult {
                status: 500,
                body: InvocationBody::Failed {
                    error_kind: e
                        .downcast_ref::<DomainError>()
                        .map(DomainError::kind)
                        .unwrap_or("Configuration")
                        .to_string(),
                    message: format!("{:#}", e),
                },
            }
        }
    };
    println!("{}", serde_json::to_string(&result)?);

    if !result.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

/// Build adapters from configuration and inject them into the pipeline.
async fn wire() -> anyhow::Result<Arc<dyn DigestTrigger>> {
    let cfg = AppConfig::load()?;
    let tz = cfg.timezone()?;
    let query_timeout = cfg.query_timeout();

    // --- Content store: local SQLite file if configured, MySQL otherwise ---
    let store: Arc<dyn ContentStore> = match cfg.sqlite_path() {
        Some(path) => {
            info!(path, "using SQLite content store");
            Arc::new(SqliteStore::open(path, query_timeout).await?)
        }
        None => {
            let settings = cfg.mysql_settings()?;
            info!(
                host = %settings.host,
                port = settings.port,
                database = %settings.database,
                "using MySQL content store"
            );
            Arc::new(MySqlStore::new(&settings, query_timeout))
        }
    };

    // --- Mail transport: SES, or log-only for dry runs ---
    let sender = cfg.sender_email()?;
    let mail: Arc<dyn MailPort> = if cfg.is_dry_run() {
        info!("DIGEST_DRY_RUN set, digest will be logged instead of sent");
        Arc::new(LogMailer::new())
    } else {
        let region = cfg.aws_region_or_default();
        info!(region = %region, sender = %sender, "using SES mail transport");
        Arc::new(SesMailer::from_env(region).await)
    };

    Ok(Arc::new(DigestPipeline::new(
        ContentAggregator::new(store, tz),
        DigestRenderer::new(),
        DigestDispatcher::new(mail, sender),
        tz,
    )))
}
