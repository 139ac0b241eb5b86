//! Noteworthy-differences HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use noteworthy::alignment::{AlignmentRepository, AlignmentUpdater, FileAlignmentRepository};
use noteworthy::config::Config;
use noteworthy::decision::DecisionEngine;
use noteworthy::extract::LeadExtractor;
use noteworthy::feedback::{FeedbackDeduplicator, FeedbackStore, FileFeedbackStore};
use noteworthy::gateway::{HandlerState, create_router_with_state};
use noteworthy::model::{GenaiBackend, ModelBackend, ResilientInvoker};
use noteworthy::session::ComparisonSession;
use noteworthy::wiki::{MediaWikiClient, RevisionResolver, WikiSource};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

type Upstreams = (Arc<dyn WikiSource>, Arc<dyn ModelBackend>, bool);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check().await);
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;

    let (wiki, model, mocked) = upstreams(&config)?;
    let invoker = ResilientInvoker::new(model, config.retry_policy());
    let alignments: Arc<dyn AlignmentRepository> =
        Arc::new(FileAlignmentRepository::new(&config.alignment_dir));
    let store: Arc<dyn FeedbackStore> = Arc::new(FileFeedbackStore::new(&config.feedback_dir));

    if std::env::args().any(|arg| arg == "--regenerate-alignment") {
        let updater = AlignmentUpdater::new(invoker, alignments);
        let round = updater.regenerate_from(store.as_ref(), None).await?;
        tracing::info!(
            round,
            dir = %config.alignment_dir.display(),
            "Alignment round written"
        );
        return Ok(());
    }

    let addr: SocketAddr = config.socket_addr().parse()?;
    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        model = %config.model,
        mock_provider = mocked,
        "Noteworthy starting"
    );

    let resolver = RevisionResolver::new(wiki.clone())
        .with_policy(config.history_policy())
        .with_scan_window(config.history_page_size, config.max_history_pages);
    let extractor = LeadExtractor::with_capacity(wiki, config.lead_cache_capacity);
    let session = ComparisonSession::new(
        resolver,
        extractor,
        DecisionEngine::new(invoker, alignments),
    );
    let feedback =
        FeedbackDeduplicator::new(store).with_test_probability(config.test_split_probability);

    let state = HandlerState::new(session, feedback).with_mock_provider(mocked);
    let app = create_router_with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Noteworthy shutdown complete");
    Ok(())
}

fn upstreams(config: &Config) -> anyhow::Result<Upstreams> {
    #[cfg(feature = "mock")]
    if config.mock_provider {
        tracing::warn!("Mock provider enabled, serving canned wiki and model responses");
        return Ok(mock_upstreams());
    }

    #[cfg(not(feature = "mock"))]
    if config.mock_provider {
        tracing::warn!("NOTEWORTHY_MOCK_PROVIDER ignored: built without the `mock` feature");
    }

    let wiki: Arc<dyn WikiSource> = Arc::new(MediaWikiClient::new(
        &config.wiki_api_url,
        &config.user_agent,
    )?);
    let model: Arc<dyn ModelBackend> = Arc::new(GenaiBackend::new(config.model.clone()));
    Ok((wiki, model, false))
}

#[cfg(feature = "mock")]
fn mock_upstreams() -> Upstreams {
    use noteworthy::model::MockModelBackend;
    use noteworthy::wiki::MockWikiSource;

    let wiki: Arc<dyn WikiSource> = Arc::new(
        MockWikiSource::new()
            .with_linear_history("Example", 1_000, 120, chrono::Utc::now())
            .with_render(
                1_119,
                "<p>Example is a market town in the north of the county. \
                 It merged with Sample in 2024.</p>",
            )
            .with_render(
                1_069,
                "<p>Example is a market town in the north of the county.</p>",
            )
            .with_random_title("Example"),
    );
    let model: Arc<dyn ModelBackend> = Arc::new(MockModelBackend::new());

    (wiki, model, true)
}

async fn run_health_check() -> i32 {
    let port = std::env::var("NOTEWORTHY_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let Ok(client) = reqwest::Client::builder()
        .timeout(Duration::from_secs(1))
        .build()
    else {
        return 1;
    };

    match client.get(&url).send().await {
        Ok(res) if res.status().is_success() => 0,
        _ => 1,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
