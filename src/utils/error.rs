use crate::domain::model::Action;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failures talking to the cloud control plane.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned {status} ({code}): {message}")]
    RemoteError {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Could not decode API response: {0}")]
    DecodeError(#[from] serde_json::Error),

    #[error("Invalid API endpoint: {0}")]
    EndpointError(#[from] url::ParseError),

    #[error("Action {id} still running after {waited:?}")]
    ActionTimeout { id: i64, waited: Duration },
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Why a load-balancer mutation did not apply.
#[derive(Error, Debug)]
pub enum PhaseFailure {
    #[error(transparent)]
    Request(#[from] ApiError),

    #[error("{}", describe_action(.0))]
    Action(Action),
}

impl PhaseFailure {
    /// The mutation was submitted but we stopped waiting before it settled,
    /// so it may still apply on the control plane.
    pub fn is_unconfirmed(&self) -> bool {
        match self {
            PhaseFailure::Request(ApiError::ActionTimeout { .. }) => true,
            PhaseFailure::Request(ApiError::RequestError(e)) => e.is_timeout(),
            _ => false,
        }
    }
}

fn describe_action(action: &Action) -> String {
    let mut text = format!(
        "action {} ({}) ended with status {}, progress {}%",
        action.id, action.command, action.status, action.progress
    );
    if let Some(error) = &action.error {
        text.push_str(&format!(", error {}: {}", error.code, error.message));
    }
    text
}

fn port_suffix(listen_port: &Option<u16>) -> String {
    match listen_port {
        Some(port) => format!(" on listen port {}", port),
        None => String::new(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Lookup,
    Publish,
    Attach,
    Detach,
}

#[derive(Error, Debug)]
pub enum RotationError {
    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Could not read {}: {source}", .path.display())]
    ArtifactError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not UTF-8 PEM text", .path.display())]
    ArtifactEncodingError { path: PathBuf },

    #[error("Could not build API client: {source}")]
    ClientError {
        #[source]
        source: ApiError,
    },

    #[error("Could not get load balancer {id}: {source}")]
    LoadBalancerLookupError {
        id: i64,
        #[source]
        source: ApiError,
    },

    #[error("Load balancer {id} does not exist")]
    LoadBalancerNotFound { id: i64 },

    #[error("Load balancer {load_balancer_id} has no HTTPS service{}", port_suffix(.listen_port))]
    NoHttpsService {
        load_balancer_id: i64,
        listen_port: Option<u16>,
    },

    #[error("Could not get certificate {id}: {source}")]
    CertificateLookupError {
        id: i64,
        #[source]
        source: ApiError,
    },

    #[error("Certificate {id} bound to listen port {listen_port} does not exist")]
    CertificateNotFound { id: i64, listen_port: u16 },

    #[error("Could not create certificate {name}: {source}")]
    PublishError {
        name: String,
        #[source]
        source: ApiError,
    },

    #[error("Could not update service on port {listen_port} with new certificate {certificate_id}: {source}")]
    AttachError {
        listen_port: u16,
        certificate_id: i64,
        #[source]
        source: PhaseFailure,
    },

    #[error("Could not remove old certificate {certificate_id} from service on port {listen_port}: {source}")]
    DetachError {
        listen_port: u16,
        certificate_id: i64,
        #[source]
        source: PhaseFailure,
    },
}

impl RotationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RotationError::MissingConfigError { .. }
            | RotationError::InvalidConfigValueError { .. }
            | RotationError::ArtifactError { .. }
            | RotationError::ArtifactEncodingError { .. }
            | RotationError::ClientError { .. } => ErrorKind::Configuration,
            RotationError::LoadBalancerLookupError { .. }
            | RotationError::LoadBalancerNotFound { .. }
            | RotationError::NoHttpsService { .. }
            | RotationError::CertificateLookupError { .. }
            | RotationError::CertificateNotFound { .. } => ErrorKind::Lookup,
            RotationError::PublishError { .. } => ErrorKind::Publish,
            RotationError::AttachError { .. } => ErrorKind::Attach,
            RotationError::DetachError { .. } => ErrorKind::Detach,
        }
    }

    /// Name of the step that failed, as reported in the diagnostic record.
    pub fn step(&self) -> &'static str {
        match self {
            RotationError::MissingConfigError { .. }
            | RotationError::InvalidConfigValueError { .. }
            | RotationError::ClientError { .. } => "load configuration",
            RotationError::ArtifactError { .. } | RotationError::ArtifactEncodingError { .. } => {
                "read renewed artifacts"
            }
            RotationError::LoadBalancerLookupError { .. }
            | RotationError::LoadBalancerNotFound { .. } => "get load balancer",
            RotationError::NoHttpsService { .. } => "select https service",
            RotationError::CertificateLookupError { .. }
            | RotationError::CertificateNotFound { .. } => "get bound certificate",
            RotationError::PublishError { .. } => "create certificate",
            RotationError::AttachError { source, .. } if source.is_unconfirmed() => {
                "attach new certificate (unconfirmed)"
            }
            RotationError::AttachError { .. } => "attach new certificate",
            RotationError::DetachError { source, .. } if source.is_unconfirmed() => {
                "detach old certificate (unconfirmed)"
            }
            RotationError::DetachError { .. } => "detach old certificate",
        }
    }

    /// True when a load-balancer update may or may not have taken effect.
    pub fn is_unconfirmed(&self) -> bool {
        match self {
            RotationError::AttachError { source, .. }
            | RotationError::DetachError { source, .. } => source.is_unconfirmed(),
            _ => false,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        if self.is_unconfirmed() {
            return match self.kind() {
                ErrorKind::Detach => {
                    "Outcome unknown: the update did not settle before the timeout and may still apply, so the old certificate may already be unbound; inspect the service's certificates before rerunning the hook"
                }
                _ => {
                    "Outcome unknown: the update did not settle before the timeout and may still apply, so the new certificate may already be bound; inspect the service's certificates before rerunning the hook"
                }
            };
        }

        match self.kind() {
            ErrorKind::Configuration => {
                "Check RENEWED_LINEAGE, RENEWED_DOMAINS, HETZNER_TOKEN, HETZNER_LB_ID and the PEM files in the lineage directory"
            }
            ErrorKind::Lookup => {
                "Verify the load balancer id, its HTTPS service and that the token may read certificates"
            }
            ErrorKind::Publish => {
                "Nothing was changed on the load balancer; fix the certificate material or token and rerun the hook"
            }
            ErrorKind::Attach => {
                "The service still serves its previous certificates; the uploaded certificate is unbound and can be retried"
            }
            ErrorKind::Detach => {
                "The new certificate is serving alongside the old one; remove the old certificate from the service or rerun the hook"
            }
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::Configuration => 2,
            ErrorKind::Lookup => 3,
            ErrorKind::Publish => 4,
            ErrorKind::Attach => 5,
            ErrorKind::Detach => 6,
        }
    }
}

pub type Result<T> = std::result::Result<T, RotationError>;
