use anyhow::{Context, Result};
use std::sync::Arc;
use warwatch::cli::CliOpts;
use warwatch::config::Config;
use warwatch::http_client::HttpUpstreamClient;
use warwatch::logging;
use warwatch::scheduler;
use warwatch::sheets_store::GoogleSheetsLedgerStore;
use warwatch_core::{Clock, LedgerStore, Orchestrator, SystemClock, UpstreamClient};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = CliOpts::parse_args();
    let config = Config::load(cli.clone()).context("loading configuration")?;
    logging::init(cli.log_level(), config.log_level.as_deref());

    let own_faction_id = match config.own_faction_id {
        Some(id) => id,
        None => {
            // OWN_FACTION_ID is only a startup hint (SPEC_FULL §10.2) — when
            // absent, ask the Torn API which faction this key belongs to.
            let prober = HttpUpstreamClient::new(config.torn_api_key.clone(), 0);
            prober
                .identify_own_faction()
                .await
                .context("OWN_FACTION_ID not set and could not be resolved from the Torn API")?
        }
    };

    let upstream: Arc<dyn UpstreamClient> =
        Arc::new(HttpUpstreamClient::new(config.torn_api_key.clone(), own_faction_id));

    let store: Arc<dyn LedgerStore> = Arc::new(
        GoogleSheetsLedgerStore::load(&config.google_application_credentials, config.sheets_spreadsheet_id.clone())
            .context("loading Google service-account credentials")?,
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let orchestrator = Arc::new(Orchestrator::new(upstream, store, clock, own_faction_id));

    if cli.once {
        scheduler::run_once(orchestrator).await;
    } else {
        scheduler::run_forever(orchestrator, cli.interval).await;
    }

    Ok(())
}
