//! Command routing and execution

use crate::auth::TokenStore;
use crate::cli::args::{Cli, Commands};
use crate::config::AiqConfig;
use crate::output;
use crate::report::Reporter;
use crate::source::{build_client, HttpDataSource};
use anyhow::{Context, Result};
use clap::CommandFactory;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::{debug, info};

/// Resolve configuration from the file, environment and flags.
pub fn resolve_config(cli: &Cli) -> Result<AiqConfig> {
    let mut config = AiqConfig::load(cli.auth_dir.as_deref())?;
    if let Some(url) = &cli.base_url {
        config.api_base_url = url.clone();
    }
    if let Some(concurrency) = cli.concurrency {
        config.max_concurrent_fetches = concurrency;
    }
    if let Some(timeout) = cli.timeout {
        config.request_timeout_secs = Some(timeout);
    }
    config.validate()?;
    debug!("Resolved configuration: {:?}", config);
    Ok(config)
}

/// Authenticate, then run the requested report against the live API.
pub async fn execute_command(cli: Cli) -> Result<()> {
    if cli.command.is_none() && !cli.refresh {
        Cli::command().print_help()?;
        return Ok(());
    }

    let config = resolve_config(&cli)?;
    let base_url = config.base_url()?;
    let client = build_client(&config)?;
    let store = TokenStore::new(config.refresh_token_path(), config.access_token_path());

    let mut refresh = cli.refresh;
    if !store.has_refresh_token() {
        let token = prompt_refresh_token()?;
        store
            .store_refresh_token(&token)
            .context("Failed to store refresh token")?;
        refresh = true;
    }

    if refresh {
        store.refresh(&client, &base_url).await?;
    }

    let Some(command) = cli.command else {
        info!("Tokens refreshed, no report requested");
        return Ok(());
    };

    let access_token = store.access_token()?;
    let source = Arc::new(HttpDataSource::new(client, base_url, access_token));
    let reporter = Reporter::new(source, &config);

    let stdout = io::stdout();
    run_report(&reporter, &config, command, stdout.lock()).await
}

/// Run one report and render it to `writer`.
pub async fn run_report<W: Write>(
    reporter: &Reporter,
    config: &AiqConfig,
    command: Commands,
    mut writer: W,
) -> Result<()> {
    match command {
        Commands::Lookup { name } => {
            let customers = reporter.customer_search(&name).await?;
            output::write_customers(&customers, &mut writer)?;
        }
        Commands::Inventory { customer_id, table } => {
            let rows = reporter.inventory(&customer_id).await?;
            if table {
                output::write_inventory_table(&rows, &mut writer)?;
            } else {
                output::write_inventory_csv(&rows, &mut writer)?;
            }
        }
        Commands::Capacity {
            customer_id,
            threshold,
        } => {
            let threshold = threshold.unwrap_or(config.disk_threshold);
            let entries = reporter
                .capacity_over_threshold(&customer_id, threshold)
                .await?;
            output::write_forecast(&entries, &mut writer)?;
        }
        Commands::Forecast { customer_id } => {
            let entries = reporter.forecast(&customer_id).await?;
            output::write_forecast(&entries, &mut writer)?;
        }
        Commands::Utilization {
            customer_id,
            threshold,
        } => {
            let threshold = threshold.unwrap_or(config.perf_threshold);
            let findings = reporter.utilization(&customer_id, threshold).await?;
            output::write_utilization(&findings, &mut writer)?;
        }
        Commands::Efficiency { cluster_id } => {
            let report = reporter
                .cluster_efficiency(&cluster_id)
                .await
                .with_context(|| format!("Efficiency report for cluster {} failed", cluster_id))?;
            output::write_efficiency(&report, &mut writer)?;
        }
    }
    writer.flush()?;
    Ok(())
}

fn prompt_refresh_token() -> Result<String> {
    eprintln!("Refresh token not found");
    eprintln!("Please enter a valid refresh token:");
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read refresh token from stdin")?;
    let token = line.trim().to_string();
    if token.is_empty() {
        anyhow::bail!("No refresh token entered");
    }
    Ok(token)
}
