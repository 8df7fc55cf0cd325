//! Hetzner Cloud JSON bodies, kept apart from the domain model.

use crate::domain::model::{
    Action, ActionError, ActionStatus, Certificate, CertificateCreateOpts, CertificateRef,
    LoadBalancer, Service, ServiceProtocol, ServiceUpdate,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct LoadBalancerEnvelope {
    pub load_balancer: LoadBalancerSchema,
}

#[derive(Debug, Deserialize)]
pub struct LoadBalancerSchema {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub services: Vec<ServiceSchema>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolSchema {
    Tcp,
    Http,
    Https,
}

#[derive(Debug, Deserialize)]
pub struct ServiceSchema {
    pub protocol: ProtocolSchema,
    pub listen_port: u16,
    #[serde(default)]
    pub destination_port: u16,
    #[serde(default)]
    pub http: Option<ServiceHttpSchema>,
}

#[derive(Debug, Deserialize)]
pub struct ServiceHttpSchema {
    #[serde(default)]
    pub certificates: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CertificateEnvelope {
    pub certificate: CertificateSchema,
}

#[derive(Debug, Deserialize)]
pub struct CertificateSchema {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde(default)]
    pub domain_names: Vec<String>,
    #[serde(default)]
    pub fingerprint: Option<String>,
    #[serde(default)]
    pub not_valid_after: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct CreateCertificateRequest<'a> {
    pub name: &'a str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub certificate: &'a str,
    pub private_key: &'a str,
    pub labels: &'a HashMap<String, String>,
    pub domain_names: &'a [String],
}

#[derive(Debug, Serialize)]
pub struct UpdateServiceRequest {
    pub listen_port: u16,
    pub protocol: ProtocolSchema,
    pub http: UpdateServiceHttp,
}

#[derive(Debug, Serialize)]
pub struct UpdateServiceHttp {
    pub certificates: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ActionEnvelope {
    pub action: ActionSchema,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatusSchema {
    Running,
    Success,
    Error,
}

#[derive(Debug, Deserialize)]
pub struct ActionSchema {
    pub id: i64,
    #[serde(default)]
    pub command: String,
    pub status: ActionStatusSchema,
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub error: Option<ErrorBody>,
}

impl From<ProtocolSchema> for ServiceProtocol {
    fn from(protocol: ProtocolSchema) -> Self {
        match protocol {
            ProtocolSchema::Tcp => ServiceProtocol::Tcp,
            ProtocolSchema::Http => ServiceProtocol::Http,
            ProtocolSchema::Https => ServiceProtocol::Https,
        }
    }
}

impl From<ServiceProtocol> for ProtocolSchema {
    fn from(protocol: ServiceProtocol) -> Self {
        match protocol {
            ServiceProtocol::Tcp => ProtocolSchema::Tcp,
            ServiceProtocol::Http => ProtocolSchema::Http,
            ServiceProtocol::Https => ProtocolSchema::Https,
        }
    }
}

impl From<LoadBalancerSchema> for LoadBalancer {
    fn from(lb: LoadBalancerSchema) -> Self {
        LoadBalancer {
            id: lb.id,
            name: lb.name,
            services: lb.services.into_iter().map(Service::from).collect(),
        }
    }
}

impl From<ServiceSchema> for Service {
    fn from(service: ServiceSchema) -> Self {
        let certificates = service
            .http
            .map(|http| {
                http.certificates
                    .into_iter()
                    .map(|id| CertificateRef { id })
                    .collect()
            })
            .unwrap_or_default();

        Service {
            listen_port: service.listen_port,
            destination_port: service.destination_port,
            protocol: service.protocol.into(),
            certificates,
        }
    }
}

impl From<CertificateSchema> for Certificate {
    fn from(cert: CertificateSchema) -> Self {
        Certificate {
            id: cert.id,
            name: cert.name,
            domain_names: cert.domain_names,
            labels: cert.labels,
            fingerprint: cert.fingerprint,
            not_valid_after: cert.not_valid_after,
        }
    }
}

impl From<ActionSchema> for Action {
    fn from(action: ActionSchema) -> Self {
        Action {
            id: action.id,
            command: action.command,
            status: match action.status {
                ActionStatusSchema::Running => ActionStatus::Running,
                ActionStatusSchema::Success => ActionStatus::Success,
                ActionStatusSchema::Error => ActionStatus::Error,
            },
            progress: action.progress,
            error: action.error.map(|e| ActionError {
                code: e.code,
                message: e.message,
            }),
        }
    }
}

impl<'a> From<&'a CertificateCreateOpts> for CreateCertificateRequest<'a> {
    fn from(opts: &'a CertificateCreateOpts) -> Self {
        CreateCertificateRequest {
            name: &opts.name,
            kind: "uploaded",
            certificate: &opts.certificate,
            private_key: &opts.private_key,
            labels: &opts.labels,
            domain_names: &opts.domain_names,
        }
    }
}

impl From<&ServiceUpdate> for UpdateServiceRequest {
    fn from(update: &ServiceUpdate) -> Self {
        UpdateServiceRequest {
            listen_port: update.listen_port,
            protocol: update.protocol.into(),
            http: UpdateServiceHttp {
                certificates: update.certificates.iter().map(|c| c.id).collect(),
            },
        }
    }
}
