use crate::error::{Result, SinkError};
use crate::{MetricSink, TrapperConfig};
use async_trait::async_trait;
use cvmon_common::sanitize::truncate_chars;
use cvmon_common::MetricEntry;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Sender output kept in a rejection error.
const MAX_OUTPUT_LEN: usize = 500;

/// Runs `zabbix_sender` once per entry. Arguments are passed directly to the
/// process, never through a shell.
#[derive(Debug, Clone)]
pub struct ZabbixSender {
    sender_path: String,
    server: String,
    port: Option<u16>,
    host: String,
    timeout: Duration,
}

impl ZabbixSender {
    pub fn new(config: &TrapperConfig) -> Self {
        Self {
            sender_path: config.sender_path.clone(),
            server: config.server.clone(),
            port: config.port,
            host: config.host.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Argument vector for one submission.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::InvalidKey`] when the key contains control characters.
    pub fn command_args(&self, entry: &MetricEntry) -> Result<Vec<String>> {
        if entry.key.chars().any(char::is_control) {
            return Err(SinkError::InvalidKey(entry.key.clone()));
        }
        let mut args = vec!["-z".to_string(), self.server.clone()];
        if let Some(port) = self.port {
            args.push("-p".to_string());
            args.push(port.to_string());
        }
        args.extend([
            "-s".to_string(),
            self.host.clone(),
            "-k".to_string(),
            entry.key.clone(),
            "-o".to_string(),
            flatten_value(&entry.value),
        ]);
        Ok(args)
    }
}

/// Control characters become spaces so the value stays on one line.
fn flatten_value(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

#[async_trait]
impl MetricSink for ZabbixSender {
    async fn submit(&self, entry: &MetricEntry) -> Result<()> {
        let args = self.command_args(entry)?;
        debug!(sender = %self.sender_path, key = %entry.key, "Running sender");

        let child = Command::new(&self.sender_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => return Err(SinkError::Timeout(self.timeout)),
        };

        let exit_code = output.status.code().unwrap_or(-1);
        if exit_code != 0 {
            let mut text = String::from_utf8_lossy(&output.stdout).trim().to_string();
            let stderr = String::from_utf8_lossy(&output.stderr);
            if !stderr.trim().is_empty() {
                if !text.is_empty() {
                    text.push(' ');
                }
                text.push_str(stderr.trim());
            }
            return Err(SinkError::Rejected {
                key: entry.key.clone(),
                exit_code,
                output: truncate_chars(&text, MAX_OUTPUT_LEN),
            });
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "zabbix_sender"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender(port: Option<u16>) -> ZabbixSender {
        ZabbixSender::new(&TrapperConfig {
            server: "zbx.example.com".to_string(),
            port,
            host: "commserve".to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn args_without_port() {
        let args = sender(None)
            .command_args(&MetricEntry::new("commvault.failed_jobs", "2"))
            .unwrap();
        assert_eq!(
            args,
            vec![
                "-z",
                "zbx.example.com",
                "-s",
                "commserve",
                "-k",
                "commvault.failed_jobs",
                "-o",
                "2"
            ]
        );
    }

    #[test]
    fn args_with_port() {
        let args = sender(Some(10051))
            .command_args(&MetricEntry::new("key.release", "11.32 | SP32"))
            .unwrap();
        assert_eq!(&args[2..4], &["-p", "10051"]);
    }

    #[test]
    fn quotes_in_values_are_passed_through_untouched() {
        let payload = r#"[{"{#HOSTNAME}":"ma \"01\""}]"#;
        let args = sender(None)
            .command_args(&MetricEntry::new("custom.discovery.ma", payload))
            .unwrap();
        assert_eq!(args.last().map(String::as_str), Some(payload));
    }

    #[test]
    fn control_characters_in_values_become_spaces() {
        let args = sender(None)
            .command_args(&MetricEntry::new("status.job[1]", "line one\nline\ttwo"))
            .unwrap();
        assert_eq!(args.last().map(String::as_str), Some("line one line two"));
    }

    #[test]
    fn control_characters_in_keys_are_rejected() {
        let err = sender(None)
            .command_args(&MetricEntry::new("status.ma[a\nb]", "1"))
            .unwrap_err();
        assert!(matches!(err, SinkError::InvalidKey(_)));
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let sink = ZabbixSender::new(&TrapperConfig {
            sender_path: "/nonexistent/zabbix_sender".to_string(),
            ..Default::default()
        });
        let err = sink.submit(&MetricEntry::new("k", "v")).await.unwrap_err();
        assert!(matches!(err, SinkError::Spawn(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn exit_code_decides_acceptance() {
        let accept = ZabbixSender::new(&TrapperConfig {
            sender_path: "true".to_string(),
            ..Default::default()
        });
        assert!(accept.submit(&MetricEntry::new("k", "v")).await.is_ok());

        let reject = ZabbixSender::new(&TrapperConfig {
            sender_path: "false".to_string(),
            ..Default::default()
        });
        let err = reject.submit(&MetricEntry::new("k", "v")).await.unwrap_err();
        assert!(matches!(err, SinkError::Rejected { exit_code: 1, .. }));
    }
}
