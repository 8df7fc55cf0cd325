pub mod cli;
pub mod settings;

#[cfg(feature = "cli")]
use crate::adapters::hcloud::DEFAULT_ENDPOINT;
#[cfg(feature = "cli")]
use crate::utils::error::{Result, RotationError};
#[cfg(feature = "cli")]
use crate::utils::logger::LogFormat;
#[cfg(feature = "cli")]
use crate::utils::validation::{parse_number, validate_required_field, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use settings::Settings;
#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use std::time::Duration;

/// Raw invocation inputs. Every flag falls back to the environment the
/// certbot deploy hook provides.
///
/// Values stay strings here so that bad input surfaces through
/// [`CliConfig::into_settings`] rather than clap's usage output.
#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "hetzbot")]
#[command(about = "Rotate a renewed certificate onto a Hetzner Cloud load balancer")]
pub struct CliConfig {
    #[arg(long, env = "RENEWED_LINEAGE")]
    pub lineage: Option<String>,

    #[arg(long, env = "RENEWED_DOMAINS", help = "Space-separated renewed domains")]
    pub domains: Option<String>,

    #[arg(long, env = "HETZNER_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[arg(long, env = "HETZNER_LB_ID")]
    pub load_balancer_id: Option<String>,

    #[arg(
        long,
        env = "HETZNER_LB_LISTEN_PORT",
        help = "Listen port of the HTTPS service to rotate (default: first HTTPS service)"
    )]
    pub listen_port: Option<String>,

    #[arg(long, env = "HETZNER_API_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub api_endpoint: String,

    #[arg(long, env = "HETZBOT_REQUEST_TIMEOUT", default_value = "30", help = "Seconds")]
    pub request_timeout: String,

    #[arg(long, env = "HETZBOT_POLL_INTERVAL_MS", default_value = "1000")]
    pub poll_interval_ms: String,

    #[arg(long, env = "HETZBOT_ACTION_TIMEOUT", default_value = "300", help = "Seconds")]
    pub action_timeout: String,

    #[arg(long, env = "HETZBOT_LOG_FORMAT", value_enum, default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn into_settings(self) -> Result<Settings> {
        let lineage = validate_required_field("RENEWED_LINEAGE", &self.lineage)?;

        let raw_domains = validate_required_field("RENEWED_DOMAINS", &self.domains)?;
        let domains: Vec<String> = raw_domains.split_whitespace().map(str::to_string).collect();
        if domains.is_empty() {
            return Err(RotationError::InvalidConfigValueError {
                field: "RENEWED_DOMAINS".to_string(),
                value: raw_domains.to_string(),
                reason: "No domain names after splitting on whitespace".to_string(),
            });
        }

        let token = validate_required_field("HETZNER_TOKEN", &self.token)?;
        let load_balancer_id = parse_number::<i64>(
            "HETZNER_LB_ID",
            validate_required_field("HETZNER_LB_ID", &self.load_balancer_id)?,
        )?;

        let listen_port = match self.listen_port.as_deref().map(str::trim) {
            Some(port) if !port.is_empty() => {
                Some(parse_number::<u16>("HETZNER_LB_LISTEN_PORT", port)?)
            }
            _ => None,
        };

        let settings = Settings {
            lineage_path: PathBuf::from(lineage),
            domains,
            token: token.to_string(),
            load_balancer_id,
            listen_port,
            api_endpoint: self.api_endpoint.trim().to_string(),
            request_timeout: Duration::from_secs(parse_number(
                "HETZBOT_REQUEST_TIMEOUT",
                &self.request_timeout,
            )?),
            poll_interval: Duration::from_millis(parse_number(
                "HETZBOT_POLL_INTERVAL_MS",
                &self.poll_interval_ms,
            )?),
            action_timeout: Duration::from_secs(parse_number(
                "HETZBOT_ACTION_TIMEOUT",
                &self.action_timeout,
            )?),
        };

        settings.validate()?;
        Ok(settings)
    }
}
