use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cvmon-agent")]
#[command(
    version,
    about = "Poll a Commvault CommServe and forward its state to the Zabbix trapper"
)]
pub struct Cli {
    /// Configuration file path (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run pipelines once, in order (all of them when none are named)
    Run {
        /// Pipeline names, see `list`
        pipelines: Vec<String>,
    },

    /// Write client names and install directories to a CSV file
    ExportClients {
        #[arg(short, long, default_value = "clients_info.csv")]
        output: PathBuf,
    },

    /// Scrape the Commvault security advisories table into a JSON file
    Advisories {
        #[arg(short, long, default_value = "vulnerabilities.json")]
        output: PathBuf,

        /// Advisories page
        #[arg(long, default_value = crate::advisories::ADVISORIES_URL)]
        url: String,
    },

    /// Print pipeline names in run order
    List,
}
