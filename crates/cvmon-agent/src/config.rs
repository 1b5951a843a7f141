use anyhow::{bail, Context, Result};
use cvmon_api::ApiConfig;
use cvmon_sink::TrapperConfig;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Default, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub commvault: ApiConfig,
    #[serde(default)]
    pub trapper: TrapperConfig,
    #[serde(default)]
    pub run: RunConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    /// Pause between a discovery batch and its status values.
    #[serde(default = "default_discovery_delay_secs")]
    pub discovery_delay_secs: u64,
    /// Exit 0 even when pipelines or submissions failed.
    #[serde(default)]
    pub legacy_exit_zero: bool,
}

fn default_discovery_delay_secs() -> u64 {
    10
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            discovery_delay_secs: default_discovery_delay_secs(),
            legacy_exit_zero: false,
        }
    }
}

impl AgentConfig {
    /// TOML file (optional), then `.env`, then process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        match dotenv::dotenv() {
            Ok(env_file) => tracing::debug!(path = %env_file.display(), "Loaded .env"),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e).context("Failed to read .env"),
        }
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("COMMVAULT_SERVER") {
            self.commvault.server_url = val;
        }
        if let Some(val) = lookup("API_TOKEN") {
            self.commvault.api_token = val;
        }
        if let Some(val) = lookup("CVMON_ACCEPT_INVALID_CERTS") {
            self.commvault.accept_invalid_certs = parse_flag(&val);
        }
        if let Some(val) = lookup("ZABBIX_SERVER") {
            self.trapper.server = val;
        }
        if let Some(val) = lookup("ZABBIX_PORT") {
            match val.parse() {
                Ok(port) => self.trapper.port = Some(port),
                Err(_) => tracing::warn!(value = %val, "Ignoring invalid ZABBIX_PORT"),
            }
        }
        if let Some(val) = lookup("ZABBIX_HOST") {
            self.trapper.host = val;
        }
        if let Some(val) = lookup("ZABBIX_SENDER") {
            self.trapper.sender_path = val;
        }
        if let Some(val) = lookup("ZABBIX_KEY_MEDIAAGENT") {
            self.trapper.keys.media_agents = val;
        }
        if let Some(val) = lookup("ZABBIX_KEY_LIBRARIES") {
            self.trapper.keys.libraries = val;
        }
        if let Some(val) = lookup("ZABBIX_KEY_JOBS") {
            self.trapper.keys.jobs = Some(val);
        }
        if let Some(val) = lookup("CVMON_DISCOVERY_DELAY_SECS") {
            match val.parse() {
                Ok(secs) => self.run.discovery_delay_secs = secs,
                Err(_) => {
                    tracing::warn!(value = %val, "Ignoring invalid CVMON_DISCOVERY_DELAY_SECS")
                }
            }
        }
        if let Some(val) = lookup("CVMON_LEGACY_EXIT_ZERO") {
            self.run.legacy_exit_zero = parse_flag(&val);
        }
    }

    /// Settings every command needs.
    pub fn validate(&self) -> Result<()> {
        if self.commvault.server_url.trim().is_empty() {
            bail!("CommServe URL is not set (commvault.server_url or COMMVAULT_SERVER)");
        }
        if self.commvault.api_token.trim().is_empty() {
            bail!("API token is not set (commvault.api_token or API_TOKEN)");
        }
        Ok(())
    }

    /// Settings needed to submit to the trapper.
    pub fn validate_trapper(&self) -> Result<()> {
        if self.trapper.server.trim().is_empty() {
            bail!("Zabbix server is not set (trapper.server or ZABBIX_SERVER)");
        }
        if self.trapper.host.trim().is_empty() {
            bail!("Zabbix host is not set (trapper.host or ZABBIX_HOST)");
        }
        if self.trapper.timeout_secs == 0 {
            bail!("trapper.timeout_secs must be > 0");
        }
        Ok(())
    }

    pub fn discovery_delay(&self) -> Duration {
        Duration::from_secs(self.run.discovery_delay_secs)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
