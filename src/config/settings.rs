use crate::core::ConfigProvider;
use crate::utils::error::{Result, RotationError};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_unique, validate_url,
    Validate,
};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Validated configuration for one invocation. Built once at the entry point.
#[derive(Clone)]
pub struct Settings {
    pub lineage_path: PathBuf,
    pub domains: Vec<String>,
    pub token: String,
    pub load_balancer_id: i64,
    pub listen_port: Option<u16>,
    pub api_endpoint: String,
    pub request_timeout: Duration,
    pub poll_interval: Duration,
    pub action_timeout: Duration,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("lineage_path", &self.lineage_path)
            .field("domains", &self.domains)
            .field("token", &"<redacted>")
            .field("load_balancer_id", &self.load_balancer_id)
            .field("listen_port", &self.listen_port)
            .field("api_endpoint", &self.api_endpoint)
            .field("request_timeout", &self.request_timeout)
            .field("poll_interval", &self.poll_interval)
            .field("action_timeout", &self.action_timeout)
            .finish()
    }
}

/// Lower bound between two `GET /actions/{id}` calls.
const MIN_POLL_INTERVAL_MS: u128 = 100;

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_path("RENEWED_LINEAGE", &self.lineage_path.to_string_lossy())?;
        // 憑證名稱取自 lineage 最後一段
        if self.lineage_path.file_name().is_none() {
            return Err(RotationError::InvalidConfigValueError {
                field: "RENEWED_LINEAGE".to_string(),
                value: self.lineage_path.to_string_lossy().into_owned(),
                reason: "Path must end in a lineage directory name".to_string(),
            });
        }

        if self.domains.is_empty() {
            return Err(RotationError::InvalidConfigValueError {
                field: "RENEWED_DOMAINS".to_string(),
                value: String::new(),
                reason: "At least one domain name is required".to_string(),
            });
        }
        validate_unique("RENEWED_DOMAINS", &self.domains)?;

        validate_non_empty_string("HETZNER_TOKEN", &self.token)?;
        validate_range("HETZNER_LB_ID", self.load_balancer_id, 1, i64::MAX)?;
        if let Some(port) = self.listen_port {
            validate_range("HETZNER_LB_LISTEN_PORT", port, 1, u16::MAX)?;
        }

        validate_url("HETZNER_API_ENDPOINT", &self.api_endpoint)?;
        validate_range(
            "HETZBOT_REQUEST_TIMEOUT",
            self.request_timeout.as_secs(),
            1,
            600,
        )?;
        validate_range(
            "HETZBOT_POLL_INTERVAL_MS",
            self.poll_interval.as_millis(),
            MIN_POLL_INTERVAL_MS,
            60_000,
        )?;
        validate_range(
            "HETZBOT_ACTION_TIMEOUT",
            self.action_timeout.as_secs(),
            1,
            3600,
        )?;

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }
}

impl ConfigProvider for Settings {
    fn lineage_path(&self) -> &Path {
        &self.lineage_path
    }

    fn domains(&self) -> &[String] {
        &self.domains
    }

    fn load_balancer_id(&self) -> i64 {
        self.load_balancer_id
    }

    fn listen_port(&self) -> Option<u16> {
        self.listen_port
    }

    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    fn action_timeout(&self) -> Duration {
        self.action_timeout
    }
}
