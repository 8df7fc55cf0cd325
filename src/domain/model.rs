use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// 發行者產出的完整憑證鏈檔名
pub const FULL_CHAIN_FILE: &str = "fullchain.pem";
/// 發行者產出的私鑰檔名
pub const PRIVATE_KEY_FILE: &str = "privkey.pem";
/// Marker label attached to every certificate this tool uploads.
pub const MARKER_LABEL: &str = "hetzbot";

/// One renewal event as handed over by the issuance hook.
#[derive(Clone, PartialEq, Eq)]
pub struct RenewalRequest {
    pub lineage_path: PathBuf,
    pub domains: Vec<String>,
    pub full_chain_pem: String,
    pub private_key_pem: String,
}

// 私鑰不得出現在日誌中
impl fmt::Debug for RenewalRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenewalRequest")
            .field("lineage_path", &self.lineage_path)
            .field("domains", &self.domains)
            .field(
                "full_chain_pem",
                &format_args!("<{} bytes>", self.full_chain_pem.len()),
            )
            .field("private_key_pem", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadBalancer {
    pub id: i64,
    pub name: String,
    pub services: Vec<Service>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceProtocol {
    Tcp,
    Http,
    Https,
}

impl ServiceProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceProtocol::Tcp => "tcp",
            ServiceProtocol::Http => "http",
            ServiceProtocol::Https => "https",
        }
    }
}

impl fmt::Display for ServiceProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A listener of a load balancer, keyed by `listen_port`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    pub listen_port: u16,
    pub destination_port: u16,
    pub protocol: ServiceProtocol,
    pub certificates: Vec<CertificateRef>,
}

/// A bound certificate as seen from a service: the id only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CertificateRef {
    pub id: i64,
}

impl From<&Certificate> for CertificateRef {
    fn from(cert: &Certificate) -> Self {
        Self { id: cert.id }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub id: i64,
    pub name: String,
    pub domain_names: Vec<String>,
    pub labels: HashMap<String, String>,
    pub fingerprint: Option<String>,
    pub not_valid_after: Option<DateTime<Utc>>,
}

impl Certificate {
    /// Uploaded by this tool, i.e. carries the marker label.
    pub fn is_managed(&self) -> bool {
        self.labels.get(MARKER_LABEL).map(String::as_str) == Some("true")
    }
}

/// Parameters for uploading a certificate. The type is always "uploaded".
#[derive(Clone, PartialEq, Eq)]
pub struct CertificateCreateOpts {
    pub name: String,
    pub certificate: String,
    pub private_key: String,
    pub labels: HashMap<String, String>,
    pub domain_names: Vec<String>,
}

impl fmt::Debug for CertificateCreateOpts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateCreateOpts")
            .field("name", &self.name)
            .field("labels", &self.labels)
            .field("domain_names", &self.domain_names)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Full replacement of one service's certificate bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceUpdate {
    pub listen_port: u16,
    pub protocol: ServiceProtocol,
    pub certificates: Vec<CertificateRef>,
}

impl ServiceUpdate {
    pub fn for_service(service: &Service, certificates: Vec<CertificateRef>) -> Self {
        Self {
            listen_port: service.listen_port,
            protocol: service.protocol,
            certificates,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStatus {
    Running,
    Success,
    Error,
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionStatus::Running => "running",
            ActionStatus::Success => "success",
            ActionStatus::Error => "error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionError {
    pub code: String,
    pub message: String,
}

/// Asynchronous control-plane action started by a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub id: i64,
    pub command: String,
    pub status: ActionStatus,
    pub progress: u8,
    pub error: Option<ActionError>,
}

impl Action {
    pub fn is_running(&self) -> bool {
        self.status == ActionStatus::Running
    }

    pub fn error_code(&self) -> &str {
        self.error.as_ref().map(|e| e.code.as_str()).unwrap_or("")
    }

    /// A mutation only counts as applied when all three conditions hold.
    pub fn is_complete(&self) -> bool {
        self.status == ActionStatus::Success
            && self.error_code().is_empty()
            && self.progress == 100
    }
}
