//! Tracing setup, orchestrator wiring and the control server.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use automator_api::{ApiServer, ApiState, ServerConfig};
use automator_channel::serve_control;
use automator_config::{Config, ConfigLoader, LoggingConfig, NotifyConfig};
use automator_page::TokioClock;
use automator_page_cdp::CdpTabProvider;
use automator_protocols::{Notifier, TabProvider};
use automator_queue::{
    Collaborators, FanoutNotifier, FileStateStore, FolderExporter, Orchestrator, StateStore,
    TracingNotifier, WebhookNotifier,
};

/// Pending control commands buffered between the API and the orchestrator.
const CONTROL_CAPACITY: usize = 64;

/// Initialize tracing with console and file output.
///
/// Log files are written to `logging.dir` with daily rotation.
pub(crate) fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = ConfigLoader::expand_path(&logging.dir);
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("automator")
        .filename_suffix("log")
        .max_log_files(logging.max_files)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The guard flushes the file writer when dropped.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

/// The wired orchestrator and the tab provider it talks through.
pub(crate) struct Runtime {
    pub orchestrator: Arc<Orchestrator>,
    pub tabs: Arc<CdpTabProvider>,
}

/// Build the orchestrator and its collaborators from `config`.
pub(crate) async fn build_runtime(config: &Config) -> Result<Runtime, Box<dyn std::error::Error>> {
    let clock = TokioClock::shared();
    let tabs = Arc::new(CdpTabProvider::new(
        config.browser.clone(),
        config.page.clone(),
        clock.clone(),
    ));

    let store: Option<Arc<dyn StateStore>> = if config.state.persist {
        let dir = ConfigLoader::expand_path(&config.state.dir);
        Some(Arc::new(FileStateStore::new(dir).await?))
    } else {
        None
    };

    let exporter = Arc::new(FolderExporter::new(
        ConfigLoader::expand_path(&config.export.dir),
        Duration::from_millis(config.export.download_gap_ms),
    ));

    let collaborators = Collaborators {
        tabs: tabs.clone() as Arc<dyn TabProvider>,
        notifier: build_notifier(&config.notify),
        exporter,
        store,
        clock,
    };

    Ok(Runtime {
        orchestrator: Arc::new(Orchestrator::from_config(config, collaborators)),
        tabs,
    })
}

fn build_notifier(notify: &NotifyConfig) -> Arc<dyn Notifier> {
    let mut notifiers: Vec<Arc<dyn Notifier>> = vec![Arc::new(TracingNotifier)];
    if notify.enabled {
        match &notify.webhook_url {
            Some(url) => notifiers.push(Arc::new(WebhookNotifier::new(url.clone()))),
            None => warn!("Notifications enabled without a webhook_url; logging only"),
        }
    }
    Arc::new(FanoutNotifier::new(notifiers))
}

/// Restore persisted state and serve the control API until Ctrl-C.
pub(crate) async fn run_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = build_runtime(&config).await?;

    match runtime.orchestrator.restore().await {
        Ok(true) => info!("Media job restored from saved state"),
        Ok(false) => {}
        Err(e) => warn!("Could not restore media state: {}", e),
    }

    let (client, control_task) = serve_control(runtime.orchestrator.clone(), CONTROL_CAPACITY);

    let server = ApiServer::new(
        ServerConfig::new(config.server.host.clone(), config.server.port),
        ApiState::new(Arc::new(client))
            .with_allowed_origins(config.server.allowed_origins.clone()),
    );
    info!("Browser endpoint: {}", config.browser.cdp_endpoint);

    let result = server.run().await;
    control_task.abort();
    result
}
