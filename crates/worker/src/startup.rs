use std::path::Path;
use std::sync::Arc;

use adapters::ack::LogAckSink;
use adapters::elastic::EsFindingIndex;
use adapters::github::GithubAlertClient;
use adapters::jira::JiraTicketClient;
use adapters::storage::{InMemoryRunbookStore, InMemoryTenantStore, RedbTicketLinkStore};
use application::acker::AckEmitter;
use application::create_ticket::TicketService;
use application::job_router::JobRouter;
use application::new_scan::RunbookService;
use application::transition_ticket::WorkflowService;
use application::update_finding::UpdateFindingService;
use infrastructure::config::WorkerConfig;
use infrastructure::logging::init_logging;
use ports::secondary::ack_sink::AckSink;
use ports::secondary::finding_index::FindingIndex;
use ports::secondary::runbook_store::RunbookStore;
use ports::secondary::tenant_store::TenantStore;
use ports::secondary::ticket_link_store::TicketLinkStore;
use ports::secondary::ticket_tracker::TicketTrackerApi;
use ports::secondary::vendor_alert::VendorAlertApi;
use tokio::sync::mpsc;
use tracing::info;

use crate::cli::Cli;
use crate::{feed, shutdown};

/// Run the worker startup sequence and block until shutdown.
pub async fn run(cli: &Cli) -> anyhow::Result<()> {
    // ── 1. Load config ──────────────────────────────────────────────
    let config = WorkerConfig::load(Path::new(&cli.config))?;

    // ── 2. Initialize logging ───────────────────────────────────────
    // CLI flags take precedence over the config file
    let log_level = cli.log_level.unwrap_or(config.worker.log_level);
    let log_format = cli.log_format.unwrap_or(config.worker.log_format);
    init_logging(log_level, log_format);

    // Service root span — fields appear in every subsequent log entry
    let _root_span = tracing::span!(
        tracing::Level::INFO,
        "service",
        service.name = "findings-worker",
        service.version = env!("CARGO_PKG_VERSION"),
    )
    .entered();

    info!(
        config_path = %cli.config,
        log_level = log_level.as_str(),
        log_format = log_format.as_str(),
        tenants = config.tenants.len(),
        runbooks = config.runbooks.len(),
        walk_step_cap = config.workflow.max_steps,
        "worker starting"
    );

    // ── 3. Outbound adapters ────────────────────────────────────────
    let vendor: Arc<dyn VendorAlertApi> =
        Arc::new(GithubAlertClient::with_base_url(&config.worker.vendor_api_url));
    let tracker: Arc<dyn TicketTrackerApi> = Arc::new(JiraTicketClient::new());
    let index: Arc<dyn FindingIndex> = Arc::new(EsFindingIndex::new(&config.worker.index_url));
    let links: Arc<dyn TicketLinkStore> = Arc::new(
        RedbTicketLinkStore::open(Path::new(&config.worker.link_store_path))
            .map_err(|e| anyhow::anyhow!("open ticket-link store: {e}"))?,
    );
    let tenants: Arc<dyn TenantStore> = Arc::new(InMemoryTenantStore::new(config.tenants()));
    let runbooks: Arc<dyn RunbookStore> = Arc::new(InMemoryRunbookStore::new(
        config.runbooks(),
        config.runbook_configs(),
    ));
    let sink: Arc<dyn AckSink> = Arc::new(LogAckSink);
    let acks = Arc::new(AckEmitter::new(sink));

    // ── 4. Services and router ──────────────────────────────────────
    let workflow = Arc::new(WorkflowService::new(
        Arc::clone(&tenants),
        Arc::clone(&tracker),
        config.walk_policy(),
    ));
    let update = Arc::new(UpdateFindingService::new(
        Arc::clone(&tenants),
        vendor,
        Arc::clone(&index),
        Arc::clone(&links),
        Arc::clone(&workflow),
        Arc::clone(&acks),
    ));
    let tickets = Arc::new(TicketService::new(
        Arc::clone(&tenants),
        tracker,
        Arc::clone(&index),
        links,
    ));
    let scans = Arc::new(RunbookService::new(
        tenants,
        runbooks,
        index,
        Arc::clone(&update),
        Arc::clone(&tickets),
        Arc::clone(&acks),
    ));
    let router = JobRouter::new(update, tickets, workflow, scans, acks);

    // ── 5. Job feed and run loop ────────────────────────────────────
    let cancel = shutdown::create_shutdown_token();
    let (tx, rx) = mpsc::channel(config.worker.job_channel_capacity);
    tokio::spawn(feed::read_stdin(tx, cancel.clone()));

    info!("reading job envelopes from stdin (one JSON object per line)");
    router.run(rx, cancel).await;

    info!("worker stopped");
    Ok(())
}
