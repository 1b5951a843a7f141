mod advisories;
mod cli;
mod config;
mod export;
mod runner;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use config::AgentConfig;
use cvmon_api::CommvaultClient;
use cvmon_collector::{all_pipelines, select_pipelines, RunContext};
use cvmon_sink::ZabbixSender;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "cvmon=debug" } else { "cvmon=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.parse()?))
        .init();

    let code = dispatch(cli).await?;
    std::process::exit(code);
}

async fn dispatch(cli: Cli) -> Result<i32> {
    match &cli.command {
        Commands::List => {
            for pipeline in all_pipelines() {
                println!("{}", pipeline.name());
            }
            return Ok(0);
        }
        Commands::Advisories { output, url } => {
            let count = advisories::export_advisories(url, output).await?;
            println!("Wrote {count} advisory(ies) to {}", output.display());
            return Ok(0);
        }
        _ => {}
    }

    let config = AgentConfig::load(cli.config.as_deref())?;
    config.validate()?;
    let api = CommvaultClient::new(&config.commvault)?;

    match cli.command {
        Commands::Run { pipelines } => {
            config.validate_trapper()?;
            let selected = select_pipelines(&pipelines)
                .map_err(|unknown| anyhow::anyhow!("Unknown pipeline(s): {}", unknown.join(", ")))?;
            let sink = ZabbixSender::new(&config.trapper);
            tracing::info!(
                server = %config.commvault.server_url,
                trapper = %config.trapper.server,
                pipelines = selected.len(),
                "cvmon-agent starting"
            );

            let ctx = RunContext {
                api: &api,
                sink: &sink,
                config: &config.commvault,
                keys: &config.trapper.keys,
                discovery_delay: config.discovery_delay(),
            };
            let report = runner::run_pipelines(&selected, &ctx).await;
            Ok(report.exit_code(config.run.legacy_exit_zero))
        }
        Commands::ExportClients { output } => {
            let summary = export::export_clients(&api, &output).await?;
            println!(
                "Wrote {} client(s) to {} ({} skipped)",
                summary.written,
                output.display(),
                summary.skipped
            );
            Ok(if summary.skipped == 0 || config.run.legacy_exit_zero { 0 } else { 1 })
        }
        Commands::List | Commands::Advisories { .. } => Ok(0),
    }
}
